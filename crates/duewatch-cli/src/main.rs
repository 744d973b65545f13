mod display;

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use duewatch_changes::ChangeDetector;
use duewatch_core::extract_deadlines;
use duewatch_store::FileStore;
use tracing_subscriber::EnvFilter;

const DEFAULT_STORE_PATH: &str = "./duewatch-snapshots.json";

#[derive(Parser)]
#[command(name = "duewatch", version, about = "Course-outline deadline extraction and change tracking")]
struct Cli {
    /// Snapshot store file.
    #[arg(long, global = true, env = "DUEWATCH_STORE", default_value = DEFAULT_STORE_PATH)]
    store: PathBuf,

    /// Resolution date (YYYY-MM-DD) used to infer missing years. Defaults to today (UTC).
    #[arg(long, global = true, env = "DUEWATCH_NOW")]
    now: Option<String>,

    /// Output format.
    #[arg(long, global = true, value_enum, default_value_t = Format::Text)]
    format: Format,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Print the normalized deadlines found in a document.
    Extract {
        /// Text file to read, or `-` for stdin.
        input: PathBuf,
    },
    /// Extract deadlines and compare them with the course's last snapshot.
    Detect {
        #[arg(long)]
        course: String,
        /// Text file to read, or `-` for stdin.
        input: PathBuf,
    },
    /// Print the stored snapshot for a course.
    Show {
        #[arg(long)]
        course: String,
    },
    /// Delete the stored snapshot for a course.
    Forget {
        #[arg(long)]
        course: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();
    tracing::debug!("duewatch v{}", env!("CARGO_PKG_VERSION"));

    let now = resolution_time(cli.now.as_deref())?;

    match &cli.command {
        Command::Extract { input } => {
            let text = read_input(input)?;
            let deadlines = extract_deadlines(&text, now);
            match cli.format {
                Format::Json => println!("{}", serde_json::to_string_pretty(&deadlines)?),
                Format::Text => print!("{}", display::render_deadlines(&deadlines)),
            }
        }
        Command::Detect { course, input } => {
            let text = read_input(input)?;
            let deadlines = extract_deadlines(&text, now);
            let detector = ChangeDetector::new(FileStore::open(&cli.store));
            let report = detector.detect_changes_at(course, &deadlines, now).await;
            match cli.format {
                Format::Json => println!("{}", serde_json::to_string_pretty(&report)?),
                Format::Text => print!("{}", display::render_report(course, &report)),
            }
        }
        Command::Show { course } => {
            let detector = ChangeDetector::new(FileStore::open(&cli.store));
            let snapshot = detector
                .snapshot(course)
                .await
                .with_context(|| format!("reading snapshot store {}", cli.store.display()))?;
            match (snapshot, cli.format) {
                (None, _) => eprintln!("No snapshot stored for {course}"),
                (Some(s), Format::Json) => println!("{}", serde_json::to_string_pretty(&s)?),
                (Some(s), Format::Text) => print!("{}", display::render_snapshot(course, &s)),
            }
        }
        Command::Forget { course } => {
            let detector = ChangeDetector::new(FileStore::open(&cli.store));
            let removed = detector
                .forget(course)
                .await
                .with_context(|| format!("updating snapshot store {}", cli.store.display()))?;
            if removed {
                println!("Removed snapshot for {course}");
            } else {
                println!("No snapshot stored for {course}");
            }
        }
    }

    Ok(())
}

/// `RUST_LOG` wins; otherwise `DUEWATCH_LOG` (default `info`). Logs go to stderr.
fn init_logging() {
    let filter = match std::env::var("RUST_LOG") {
        Ok(rust_log) => EnvFilter::new(rust_log),
        Err(_) => {
            let level = std::env::var("DUEWATCH_LOG").unwrap_or_else(|_| "info".to_string());
            EnvFilter::new(level.to_lowercase())
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Pinned date at midnight UTC, or the current instant.
fn resolution_time(pinned: Option<&str>) -> anyhow::Result<DateTime<Utc>> {
    match pinned {
        Some(s) => {
            let date = NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
                .with_context(|| format!("invalid --now date {s:?}, expected YYYY-MM-DD"))?;
            let midnight = date
                .and_hms_opt(0, 0, 0)
                .context("midnight is always a valid time")?;
            Ok(midnight.and_utc())
        }
        None => Ok(Utc::now()),
    }
}

fn read_input(path: &Path) -> anyhow::Result<String> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("reading stdin")?;
        return Ok(text);
    }
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pinned_resolution_time() {
        let now = resolution_time(Some("2024-10-05")).unwrap();
        assert_eq!(now.to_rfc3339(), "2024-10-05T00:00:00+00:00");
    }

    #[test]
    fn bad_resolution_time() {
        assert!(resolution_time(Some("10/05/2024")).is_err());
    }

    #[test]
    fn reads_input_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("outline.txt");
        std::fs::write(&path, "Quiz 1 due Sept 20").unwrap();
        assert_eq!(read_input(&path).unwrap(), "Quiz 1 due Sept 20");
        assert!(read_input(&tmp.path().join("missing.txt")).is_err());
    }

    #[test]
    fn cli_parses_detect() {
        let cli = Cli::try_parse_from([
            "duewatch",
            "--now",
            "2024-09-01",
            "--format",
            "json",
            "detect",
            "--course",
            "CS101",
            "outline.txt",
        ])
        .unwrap();
        assert!(cli.format == Format::Json);
        assert_eq!(cli.now.as_deref(), Some("2024-09-01"));
        match cli.command {
            Command::Detect { course, input } => {
                assert_eq!(course, "CS101");
                assert_eq!(input, PathBuf::from("outline.txt"));
            }
            _ => panic!("expected detect"),
        }
    }

    #[tokio::test]
    async fn detect_round_trip_through_file_store() {
        let tmp = tempfile::TempDir::new().unwrap();
        let store_path = tmp.path().join("snapshots.json");
        let now = resolution_time(Some("2024-09-01")).unwrap();

        let detector = ChangeDetector::new(FileStore::open(&store_path));
        let first = extract_deadlines("Essay due Oct 1\nQuiz 1 due Sept 20", now);
        let report = detector.detect_changes_at("CS101", &first, now).await;
        assert!(report.is_first_scrape);
        assert_eq!(report.added.len(), 2);

        // Fresh detector over the same file sees the stored snapshot.
        let detector = ChangeDetector::new(FileStore::open(&store_path));
        let second = extract_deadlines("Essay due Oct 8\nQuiz 1 due Sept 20", now);
        let report = detector.detect_changes_at("CS101", &second, now).await;
        assert!(report.has_changes);
        assert_eq!(report.modified.len(), 1);
        assert_eq!(report.modified[0].new.title, "Essay");
    }
}
