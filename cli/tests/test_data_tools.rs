use std::fs;
use std::path::Path;

use serde_json::Value;
use tempfile::TempDir;

use tadabbur_cli::data_tools::{add_tag_fields_in_dir, convert_legacy_dir, flip_brackets_in_dir, json_files};

fn setup() -> TempDir {
    unsafe {
        std::env::set_var("DISABLE_LOG", "true");
        std::env::set_var("TADABBUR_DIR", std::env::temp_dir().join("tadabbur-cli-tests"));
    }
    tempfile::tempdir().expect("Can't create temp dir")
}

fn read_json(path: &Path) -> Value {
    let s = fs::read_to_string(path).expect("Can't read file");
    serde_json::from_str(&s).expect("Invalid JSON")
}

#[test]
fn test_flip_brackets_only_touches_english_commentary() {
    let tmp = setup();
    let data_dir = tmp.path().join("data");
    fs::create_dir_all(&data_dir).expect("Can't create dir");

    let original = r#"{
  "juz": 1,
  "items": [
    {
      "qNum": 1,
      "question_en": "Q ﴿a﴾",
      "answer": {
        "ayah_ar": "﴿نص﴾",
        "commentary_ar": "﴿شرح﴾",
        "commentary_en": "See ﴾text﴿ here"
      }
    },
    {
      "qNum": 2,
      "answer": { "commentary_en": "" }
    }
  ]
}"#;
    fs::write(data_dir.join("juz-01.json"), original).expect("Can't write");
    fs::write(data_dir.join("juz-02.json"), r#"{ "juz": 2, "items": [] }"#).expect("Can't write");
    fs::write(data_dir.join("notes.json"), "not json").expect("Can't write");

    let report = flip_brackets_in_dir(&data_dir).expect("Flip failed");

    assert_eq!(report.changed.len(), 1);
    assert_eq!(report.total_swaps(), 2);
    assert_eq!(report.skipped.len(), 1);
    let root = tmp.path().canonicalize().expect("Can't resolve temp dir");
    assert_eq!(report.backup_dir, root.join("data_backup"));

    let data = read_json(&data_dir.join("juz-01.json"));
    let answer = &data["items"][0]["answer"];
    assert_eq!(answer["commentary_en"], "See ﴿text﴾ here");
    assert_eq!(answer["commentary_ar"], "﴿شرح﴾");
    assert_eq!(answer["ayah_ar"], "﴿نص﴾");
    assert_eq!(data["items"][0]["question_en"], "Q ﴿a﴾");

    let backup = fs::read_to_string(report.backup_dir.join("juz-01.json")).expect("Missing backup");
    assert_eq!(backup, original);
    assert!(!report.backup_dir.join("juz-02.json").exists());
}

#[test]
fn test_flip_brackets_relative_dir_names_backup_after_real_dir() {
    let tmp = setup();
    let data_dir = tmp.path().join("data");
    fs::create_dir_all(data_dir.join("sub")).expect("Can't create dir");
    fs::write(
        data_dir.join("juz-05.json"),
        r#"{"juz":5,"items":[{"qNum":1,"answer":{"commentary_en":"﴾x﴿"}}]}"#,
    ).expect("Can't write");

    // Same shape as running the tool with `.` or `..` as the directory
    let report = flip_brackets_in_dir(&data_dir.join("sub").join("..")).expect("Flip failed");

    let root = tmp.path().canonicalize().expect("Can't resolve temp dir");
    assert_eq!(report.backup_dir, root.join("data_backup"));
    assert_eq!(report.changed.len(), 1);
    assert!(report.backup_dir.join("juz-05.json").exists());

    let data = read_json(&data_dir.join("juz-05.json"));
    assert_eq!(data["items"][0]["answer"]["commentary_en"], "﴿x﴾");
}

#[test]
fn test_add_tags_keeps_existing_values() {
    let tmp = setup();
    let dir = tmp.path();

    fs::write(dir.join("juz-01.json"), r#"{"juz":1,"items":[{"qNum":1,"difficulty":"hard"},{"qNum":2}]}"#)
        .expect("Can't write");
    fs::write(dir.join("juz-02.json"), r#"{"juz":2,"items":[{"qNum":1,"difficulty":"","theme":"Faith"}]}"#)
        .expect("Can't write");

    let report = add_tag_fields_in_dir(dir).expect("Add tags failed");
    assert_eq!(report.updated, vec![dir.join("juz-01.json")]);
    assert_eq!(report.unchanged, vec![dir.join("juz-02.json")]);

    let raw = fs::read_to_string(dir.join("juz-01.json")).expect("Can't read");
    assert!(raw.ends_with("}\n"));
    let data: Value = serde_json::from_str(&raw).expect("Invalid JSON");
    assert_eq!(data["items"][0]["difficulty"], "hard");
    assert_eq!(data["items"][0]["theme"], "");
    assert_eq!(data["items"][1]["difficulty"], "");

    // Field order of the existing keys is kept
    let keys: Vec<&String> = data["items"][0].as_object().expect("Not an object").keys().collect();
    assert_eq!(keys, vec!["qNum", "difficulty", "theme"]);

    // Second run has nothing to do
    let report = add_tag_fields_in_dir(dir).expect("Add tags failed");
    assert!(report.updated.is_empty());
}

#[test]
fn test_add_tags_empty_dir_fails() {
    let tmp = setup();
    assert!(add_tag_fields_in_dir(tmp.path()).is_err());
    assert!(add_tag_fields_in_dir(&tmp.path().join("missing")).is_err());
}

#[test]
fn test_convert_legacy_dir() {
    let tmp = setup();
    let input = tmp.path().join("data");
    let output = tmp.path().join("data_v2");
    fs::create_dir_all(&input).expect("Can't create dir");

    fs::write(input.join("juz-03.json"), r#"{
  "juz": 3,
  "items": [
    {
      "qNum": 1,
      "question_ar": "سؤال",
      "question_en": "Question",
      "answer": {
        "surah": "آل عمران",
        "ayah": "84–86",
        "ayah_ar": "﴿نص﴾",
        "ayah_en": "dropped"
      }
    },
    {
      "qNum": 2,
      "answer": { "surah": "البقرة", "ayah": 255 }
    }
  ]
}"#).expect("Can't write");
    fs::write(input.join("bonus.json"), "{}").expect("Can't write");

    let report = convert_legacy_dir(&input, &output).expect("Convert failed");
    assert_eq!(report.converted.len(), 1);

    let data = read_json(&output.join("juz-03.json"));
    assert_eq!(data["juz"], 3);
    let a1 = &data["items"][0]["answer"];
    assert_eq!(a1["surah"], 3);
    assert_eq!(a1["ayahs"], serde_json::json!([84, 85, 86]));
    assert_eq!(a1["ayah_ar"], "﴿نص﴾");
    assert_eq!(a1["commentary_en"], "");
    assert!(a1.get("ayah_en").is_none());

    let a2 = &data["items"][1]["answer"];
    assert_eq!(a2["surah"], 2);
    assert_eq!(a2["ayahs"], serde_json::json!([255]));

    assert!(!output.join("bonus.json").exists());
}

#[test]
fn test_json_files_sorted() {
    let tmp = setup();
    for name in ["juz-10.json", "juz-02.json", "readme.txt", "bonus.json"] {
        fs::write(tmp.path().join(name), "{}").expect("Can't write");
    }
    let files = json_files(tmp.path(), "juz-").expect("List failed");
    let names: Vec<String> = files.iter()
        .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().to_string()))
        .collect();
    assert_eq!(names, vec!["juz-02.json", "juz-10.json"]);
}
