use anyhow::Result;
use clap::Parser;
use rayon::prelude::*;
use std::path::PathBuf;
use std::time::Instant;
use walkdir::WalkDir;

use routetui::cases::{FileSource, QueueDirectory, ScanOutcome, ScanReport, scan_task};
use routetui::config::Config;
use routetui::logging;

/// Batch-analyze saved case message payloads
#[derive(Parser, Debug)]
#[command(about)]
struct Args {
    /// JSON files, or directories searched for *.json
    #[arg(required = true)]
    paths: Vec<String>,

    /// Print one JSON report per line instead of a summary
    #[arg(long)]
    json: bool,

    /// Config file (default: ~/.config/routetui/config.toml)
    #[arg(long)]
    config: Option<String>,
}

fn main() -> Result<()> {
    logging::init_stderr_logging();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load_from(&PathBuf::from(shellexpand::tilde(path).into_owned()))?,
        None => Config::load(),
    };
    let directory = QueueDirectory::from_config(&config.directory);

    let files = collect_files(&args.paths);
    tracing::info!(files = files.len(), "Scanning case files");

    let start = Instant::now();
    let reports: Vec<ScanReport> = files
        .par_iter()
        .map(|path| {
            let source = FileSource::new(path);
            let task_id = source.case_id();
            tracing::debug!(path = %source.path().display(), case_id = %task_id, "Scanning file");
            scan_task(&source, &task_id, &directory)
        })
        .collect();
    let duration = start.elapsed();

    if args.json {
        for report in &reports {
            println!("{}", serde_json::to_string(report)?);
        }
        return Ok(());
    }

    let mut escalated = 0;
    for report in &reports {
        match &report.outcome {
            ScanOutcome::NoCase => println!("{}: no case", report.task_id),
            ScanOutcome::Analyzed(analysis) => {
                let escalation = &analysis.escalation;
                if escalation.needs_warning() {
                    escalated += 1;
                }
                println!(
                    "{}: {} transfers {} {} (current: {})",
                    analysis.case_id,
                    analysis.transfer_count,
                    escalation.tier.icon(),
                    escalation.tier.label(),
                    escalation.current_queue_label
                );
                let route: Vec<&str> = analysis.flow.iter().map(|e| e.label.as_str()).collect();
                if !route.is_empty() {
                    println!("    {}", route.join(" → "));
                }
            }
        }
    }

    println!(
        "\nScanned {} cases in {:?}, {} need escalation",
        reports.len(),
        duration,
        escalated
    );
    Ok(())
}

/// Expand the arguments into a sorted list of JSON files
fn collect_files(paths: &[String]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for path in paths {
        let path = PathBuf::from(shellexpand::tilde(path).into_owned());
        if path.is_file() {
            files.push(path);
            continue;
        }
        for entry in WalkDir::new(&path).follow_links(false) {
            match entry {
                Ok(entry) => {
                    let is_json = entry.path().extension().is_some_and(|ext| ext == "json");
                    if entry.file_type().is_file() && is_json {
                        files.push(entry.into_path());
                    }
                }
                Err(e) => tracing::warn!("Skipping {}: {}", path.display(), e),
            }
        }
    }
    files.sort();
    files
}
