use std::fs;
use std::path::{Path, PathBuf};
use std::process::exit;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dotenvy::dotenv;

use tadabbur_backend::app_settings::AppSettings;
use tadabbur_backend::content_loader::{default_content_source, ContentSource, DirSource, HttpSource};
use tadabbur_backend::html_content::{home_html_page, section_html_page};
use tadabbur_backend::logger::set_log_level_str;
use tadabbur_backend::section_view::SectionView;
use tadabbur_backend::types::LanguageMode;
use tadabbur_backend::{get_settings_path, init_app_globals};

use tadabbur_cli::data_tools::{add_tag_fields_in_dir, convert_legacy_dir, flip_brackets_in_dir};
use tadabbur_cli::text_output::{section_list_text, section_text};

#[derive(Parser, Debug)]
#[command(author, version, about = "Tadabbur CLI", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Base URL of the static site serving /data and /quran.
    /// Takes precedence over --content-dir.
    #[arg(long, global = true, value_name = "URL", env = "TADABBUR_CONTENT_URL")]
    content_url: Option<String>,

    /// Local directory laid out like the static site.
    #[arg(long, global = true, value_name = "DIRECTORY_PATH", env = "TADABBUR_CONTENT_DIR")]
    content_dir: Option<PathBuf>,

    /// Log level: silent, error, warn, info or debug. Overrides LOG_LEVEL.
    #[arg(long, global = true, value_name = "LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by the commands that display a section.
#[derive(clap::Args, Debug)]
struct ViewArgs {
    /// Juz number 1-30, or "bonus"
    key: String,

    /// Language to show: both, ar or en. Defaults to the saved setting.
    #[arg(long, value_name = "MODE")]
    lang: Option<LanguageMode>,

    /// Only show questions containing this text, in either language
    #[arg(long, value_name = "TEXT")]
    search: Option<String>,

    /// Question numbers to show expanded
    #[arg(long, value_name = "Q_NUM", num_args = 1..)]
    open: Vec<u32>,

    /// Expand every question
    #[arg(long, default_value_t = false)]
    expand_all: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the sections
    List,

    /// Print a section as text
    #[command(arg_required_else_help = true)]
    Show {
        #[command(flatten)]
        view: ViewArgs,
    },

    /// Render a section as an HTML page
    #[command(arg_required_else_help = true)]
    Html {
        #[command(flatten)]
        view: ViewArgs,

        /// Write to this file instead of stdout
        #[arg(long, value_name = "FILE_PATH")]
        out: Option<PathBuf>,
    },

    /// Render the section listing as an HTML page
    HtmlHome {
        /// Write to this file instead of stdout
        #[arg(long, value_name = "FILE_PATH")]
        out: Option<PathBuf>,
    },

    /// Swap ﴿ and ﴾ in the English commentary of every section file in a directory
    #[command(arg_required_else_help = true)]
    FlipBrackets {
        #[arg(value_name = "DIRECTORY_PATH")]
        dir: PathBuf,
    },

    /// Add empty difficulty and theme fields to questions missing them
    #[command(arg_required_else_help = true)]
    AddTags {
        #[arg(value_name = "DIRECTORY_PATH")]
        dir: PathBuf,
    },

    /// Convert legacy section files with Arabic chapter names to numbered chapters
    #[command(arg_required_else_help = true)]
    Convert {
        #[arg(value_name = "INPUT_DIR")]
        input_dir: PathBuf,

        #[arg(value_name = "OUTPUT_DIR")]
        output_dir: PathBuf,
    },
}

fn content_source(content_url: Option<String>, content_dir: Option<PathBuf>) -> Box<dyn ContentSource> {
    match (content_url, content_dir) {
        (Some(url), _) => Box::new(HttpSource::new(&url)),
        (None, Some(dir)) => Box::new(DirSource::new(&dir)),
        (None, None) => default_content_source(),
    }
}

fn load_settings() -> AppSettings {
    let loaded = get_settings_path().and_then(|p| AppSettings::load(&p));
    match loaded {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Warning: using default settings: {}", e);
            AppSettings::default()
        }
    }
}

fn build_view(source: &dyn ContentSource, args: &ViewArgs, settings: &AppSettings) -> SectionView {
    let mut view = SectionView::with_language(args.lang.unwrap_or(settings.language_mode));
    view.open_section(source, &args.key);

    if let Some(q) = &args.search {
        view.set_search(q);
    }
    if args.expand_all {
        view.expand_all();
    }
    for q_num in args.open.iter() {
        if !view.is_open(*q_num) {
            view.toggle_open(*q_num);
        }
    }
    view
}

fn write_output(out: Option<&Path>, content: &str) -> Result<()> {
    match out {
        Some(path) => {
            fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Wrote {}", path.display());
        }
        None => print!("{}", content),
    }
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let settings = load_settings();

    match cli.command {
        Commands::List => {
            println!("{}", section_list_text());
        }

        Commands::Show { view } => {
            let source = content_source(cli.content_url, cli.content_dir);
            let v = build_view(source.as_ref(), &view, &settings);
            print!("{}", section_text(&v));
            if v.error().is_some() {
                exit(1);
            }
        }

        Commands::Html { view, out } => {
            let source = content_source(cli.content_url, cli.content_dir);
            let v = build_view(source.as_ref(), &view, &settings);
            let html = section_html_page(&v, &settings)?;
            write_output(out.as_deref(), &html)?;
        }

        Commands::HtmlHome { out } => {
            let html = home_html_page(&settings)?;
            write_output(out.as_deref(), &html)?;
        }

        Commands::FlipBrackets { dir } => {
            let report = flip_brackets_in_dir(&dir)?;
            for (path, reason) in report.skipped.iter() {
                println!("[SKIP] {}: {}", path.display(), reason);
            }
            for (path, n) in report.changed.iter() {
                println!("[UPDATED] {}: flipped {} bracket char(s) in commentary_en", path.display(), n);
            }
            println!("\nDone.");
            println!("Files changed: {}", report.changed.len());
            println!("Total bracket chars flipped: {}", report.total_swaps());
            println!("Backups saved to: {}", report.backup_dir.display());
        }

        Commands::AddTags { dir } => {
            let report = add_tag_fields_in_dir(&dir)?;
            for path in report.skipped.iter() {
                println!("Skipping (no items[]): {}", path.display());
            }
            for path in report.unchanged.iter() {
                println!("No changes: {}", path.display());
            }
            for path in report.updated.iter() {
                println!("Updated: {}", path.display());
            }
            println!("\nDone. Modified {} file(s).", report.updated.len());
        }

        Commands::Convert { input_dir, output_dir } => {
            let report = convert_legacy_dir(&input_dir, &output_dir)?;
            for (from, to) in report.converted.iter() {
                println!("Converted {} -> {}", from.display(), to.display());
            }
        }
    }

    Ok(())
}

fn main() {
    // The .env file may set TADABBUR_CONTENT_DIR or TADABBUR_CONTENT_URL,
    // which clap then picks up through `env = ...`.
    if dotenv().is_err() {
        eprintln!("Info: No .env file found or failed to load.");
    }

    let cli = Cli::parse();
    init_app_globals();

    if let Some(level) = &cli.log_level {
        if !set_log_level_str(level) {
            eprintln!("Warning: unknown log level '{}', keeping the default", level);
        }
    }

    if let Err(e) = run(cli) {
        eprintln!("Error executing command: {:#}", e);
        exit(1);
    }
}
