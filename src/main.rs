//! Episode Sorter CLI
//!
//! Moves or copies TV episode files into show and season folders.

use clap::Parser;
use env_logger::Env;
use log::{error, info};
use std::path::PathBuf;
use std::process::ExitCode;

use episode_sorter::{OrganizeConfig, Organizer, ProgressReporter, ReportFormat};

const ABOUT: &str = r#"
Episode Sorter - sorts TV episodes into show and season folders

Examples:
  episode_sorter ~/Movies/Cinema                       copy episodes into "TV Shows"
  episode_sorter ~/Movies/Cinema --move                move them and clean up
  episode_sorter /media -f Series --dry-run            show what would happen
  episode_sorter /media --ignore Downloads --json      JSON progress and summary
"#;

/// Sorts TV episode files into show and season folders
#[derive(Parser)]
#[command(name = "episode_sorter")]
#[command(author, version, about = ABOUT, long_about = None)]
struct Cli {
    /// Directory to scan (`~` is expanded)
    root: PathBuf,

    /// Move files instead of copying them, then remove emptied folders
    #[arg(short = 'm', long = "move")]
    move_files: bool,

    /// Destination folder created inside the root
    #[arg(short = 'f', long, default_value = "TV Shows")]
    tv_shows_folder: String,

    /// Extra file or directory names to skip (repeatable)
    #[arg(short = 'i', long = "ignore")]
    ignore: Vec<String>,

    /// Leave destinations with different content untouched
    #[arg(long)]
    no_overwrite: bool,

    /// Print the plan without touching any file
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// JSON progress on stderr and a JSON summary on stdout
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut builder = OrganizeConfig::builder()
        .root(cli.root)
        .leave_originals(!cli.move_files)
        .tv_shows_folder(cli.tv_shows_folder)
        .overwrite(!cli.no_overwrite)
        .dry_run(cli.dry_run);
    for name in cli.ignore {
        builder = builder.add_ignored_name(name);
    }
    let config = builder.build();
    info!("Config: {:?}", config);

    let format = if cli.json {
        ReportFormat::Json
    } else {
        ReportFormat::Text
    };
    let organizer = Organizer::new(config).with_reporter(ProgressReporter::new(format));

    let report = match organizer.run() {
        Ok(report) => report,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    if cli.json {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                error!("Failed to serialize report: {}", e);
                return ExitCode::FAILURE;
            }
        }
    } else {
        println!("Done:");
        println!("  Scanned files: {}", report.scanned_files);
        println!("  Episodes matched: {}", report.matched_files);
        println!("  Without season marker: {}", report.unmatched_files);
        println!("  Copied: {}", report.copied);
        println!("  Moved: {}", report.moved);
        println!("  Skipped: {}", report.skipped);
        println!("  Removed dirs: {}", report.removed_dirs.len());
        println!("  Duration: {}ms", report.duration_ms);
    }

    ExitCode::SUCCESS
}
