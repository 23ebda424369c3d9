//! Maintenance passes over the section JSON files in a content directory.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use serde_json::{json, Map, Value};
use walkdir::WalkDir;

use tadabbur_backend::chapter_names::CHAPTER_COUNT;
use tadabbur_backend::helpers::swap_quranic_brackets;
use tadabbur_backend::logger::info;
use tadabbur_backend::reference::{chapter_number_from_arabic_name, parse_verse_numbers};

#[derive(Debug, Default)]
pub struct FlipReport {
    /// Changed files with the number of bracket characters flipped in each
    pub changed: Vec<(PathBuf, usize)>,
    pub skipped: Vec<(PathBuf, String)>,
    pub backup_dir: PathBuf,
}

impl FlipReport {
    pub fn total_swaps(&self) -> usize {
        self.changed.iter().map(|(_, n)| n).sum()
    }
}

#[derive(Debug, Default)]
pub struct AddTagsReport {
    pub updated: Vec<PathBuf>,
    pub unchanged: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
}

#[derive(Debug, Default)]
pub struct ConvertReport {
    pub converted: Vec<(PathBuf, PathBuf)>,
}

/// The *.json files directly inside dir, sorted by name.
pub fn json_files(dir: &Path, prefix: &str) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        bail!("Directory not found: {}", dir.display());
    }

    let mut files: Vec<PathBuf> = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy();
        if entry.file_type().is_file() && name.starts_with(prefix) && name.ends_with(".json") {
            files.push(entry.path().to_path_buf());
        }
    }
    files.sort();
    Ok(files)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

fn write_pretty_json(path: &Path, value: &Value) -> Result<()> {
    let mut s = serde_json::to_string_pretty(value)?;
    s.push('\n');
    fs::write(path, s).with_context(|| format!("Failed to write {}", path.display()))
}

fn items_mut(data: &mut Value) -> Option<&mut Vec<Value>> {
    data.get_mut("items").and_then(|v| v.as_array_mut())
}

/// Swap ﴿ and ﴾ in every answer.commentary_en, leaving all other fields alone.
///
/// The original of each changed file is copied to a sibling `<dir>_backup` first.
/// Relative paths such as `.` are resolved first, so the backup is named after the real directory.
pub fn flip_brackets_in_dir(dir: &Path) -> Result<FlipReport> {
    let files = json_files(dir, "")?;
    let dir = dir.canonicalize()
        .with_context(|| format!("Failed to resolve {}", dir.display()))?;

    let dir_name = dir.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .ok_or_else(|| anyhow!("Can't name a backup for {}", dir.display()))?;
    let backup_dir = dir.with_file_name(format!("{}_backup", dir_name));
    fs::create_dir_all(&backup_dir)
        .with_context(|| format!("Failed to create {}", backup_dir.display()))?;

    let mut report = FlipReport {
        backup_dir,
        ..Default::default()
    };

    for path in files {
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let mut data: Value = match serde_json::from_str(&raw) {
            Ok(v) => v,
            Err(e) => {
                report.skipped.push((path, format!("invalid JSON ({})", e)));
                continue;
            }
        };

        let items = match items_mut(&mut data) {
            Some(items) => items,
            None => {
                report.skipped.push((path, "missing/invalid 'items' array".to_string()));
                continue;
            }
        };

        let mut file_swaps = 0;
        for item in items.iter_mut() {
            let answer = match item.get_mut("answer").and_then(|a| a.as_object_mut()) {
                Some(a) => a,
                None => continue,
            };
            let swapped = match answer.get("commentary_en").and_then(|c| c.as_str()) {
                Some(text) if !text.is_empty() => swap_quranic_brackets(text),
                _ => continue,
            };
            if swapped.1 > 0 {
                answer.insert("commentary_en".to_string(), Value::String(swapped.0));
                file_swaps += swapped.1;
            }
        }

        if file_swaps > 0 {
            let backup_path = report.backup_dir.join(file_name(&path));
            fs::write(&backup_path, &raw)
                .with_context(|| format!("Failed to write {}", backup_path.display()))?;
            write_pretty_json(&path, &data)?;

            info(&format!("Flipped {} bracket chars in {}", file_swaps, path.display()));
            report.changed.push((path, file_swaps));
        }
    }

    Ok(report)
}

/// Add empty difficulty and theme fields to items that don't have them.
/// Existing values are never overwritten.
pub fn add_tag_fields_in_dir(dir: &Path) -> Result<AddTagsReport> {
    let files = json_files(dir, "")?;
    if files.is_empty() {
        bail!("No .json files found in: {}", dir.display());
    }

    let mut report = AddTagsReport::default();

    for path in files {
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let mut data: Value = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        let items = match items_mut(&mut data) {
            Some(items) => items,
            None => {
                report.skipped.push(path);
                continue;
            }
        };

        let mut changed = false;
        for item in items.iter_mut().filter_map(|i| i.as_object_mut()) {
            for field in ["difficulty", "theme"] {
                if !item.contains_key(field) {
                    item.insert(field.to_string(), Value::String(String::new()));
                    changed = true;
                }
            }
        }

        if changed {
            write_pretty_json(&path, &data)?;
            info(&format!("Added tag fields: {}", path.display()));
            report.updated.push(path);
        } else {
            report.unchanged.push(path);
        }
    }

    Ok(report)
}

fn chapter_number(value: Option<&Value>) -> Option<u32> {
    match value {
        Some(Value::Number(n)) => n.as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .filter(|n| (1..=CHAPTER_COUNT).contains(n)),
        Some(Value::String(s)) => chapter_number_from_arabic_name(s),
        _ => None,
    }
}

fn verse_numbers(value: Option<&Value>) -> Vec<u32> {
    match value {
        Some(Value::Array(list)) => list.iter()
            .filter_map(|v| match v {
                Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
                Value::String(s) => s.trim().parse::<u32>().ok(),
                _ => None,
            })
            .collect(),
        Some(Value::Number(n)) => n.as_u64().and_then(|n| u32::try_from(n).ok()).into_iter().collect(),
        Some(Value::String(s)) => parse_verse_numbers(s),
        _ => Vec::new(),
    }
}

fn str_field(obj: &Map<String, Value>, key: &str) -> Value {
    obj.get(key).cloned().unwrap_or_else(|| Value::String(String::new()))
}

/// Convert one legacy section file, where answers name the chapter in
/// Arabic and give verses as text such as "84–85".
pub fn convert_legacy_value(data: &Value, source_name: &str) -> Result<Value> {
    let empty = Map::new();
    let mut items: Vec<Value> = Vec::new();

    for item in data.get("items").and_then(|v| v.as_array()).into_iter().flatten() {
        let item = item.as_object().unwrap_or(&empty);
        let answer = item.get("answer").and_then(|a| a.as_object()).unwrap_or(&empty);

        let surah = chapter_number(answer.get("surah")).ok_or_else(|| {
            let name = answer.get("surah").and_then(|v| v.as_str()).unwrap_or_default();
            anyhow!("Unknown surah name: '{}' in {}", name, source_name)
        })?;

        let ayahs = verse_numbers(answer.get("ayahs").or_else(|| answer.get("ayah")));

        let mut new_item = json!({
            "qNum": item.get("qNum").cloned().unwrap_or(Value::Null),
            "question_ar": str_field(item, "question_ar"),
            "question_en": str_field(item, "question_en"),
        });
        if let Some(obj) = new_item.as_object_mut() {
            for field in ["difficulty", "theme"] {
                if let Some(v) = item.get(field) {
                    obj.insert(field.to_string(), v.clone());
                }
            }
            obj.insert("answer".to_string(), json!({
                "surah": surah,
                "ayahs": ayahs,
                "ayah_ar": str_field(answer, "ayah_ar"),
                "commentary_ar": str_field(answer, "commentary_ar"),
                "commentary_en": str_field(answer, "commentary_en"),
            }));
        }

        items.push(new_item);
    }

    Ok(json!({
        "juz": data.get("juz").cloned().unwrap_or(Value::Null),
        "items": items,
    }))
}

/// Convert every juz-*.json in input_dir into output_dir.
pub fn convert_legacy_dir(input_dir: &Path, output_dir: &Path) -> Result<ConvertReport> {
    let files = json_files(input_dir, "juz-")?;
    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;

    let mut report = ConvertReport::default();

    for in_file in files {
        let raw = fs::read_to_string(&in_file)
            .with_context(|| format!("Failed to read {}", in_file.display()))?;
        let data: Value = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse {}", in_file.display()))?;

        let name = file_name(&in_file);
        let converted = convert_legacy_value(&data, &name)?;

        let out_file = output_dir.join(&name);
        write_pretty_json(&out_file, &converted)?;
        info(&format!("Converted {} -> {}", in_file.display(), out_file.display()));
        report.converted.push((in_file, out_file));
    }

    Ok(report)
}
