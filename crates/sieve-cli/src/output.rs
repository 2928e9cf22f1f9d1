//! Final scan summary, as text or JSON.

use colored::Colorize;
use sieve_core::{NoticeLevel, ScanReport};

pub fn print_text(report: &ScanReport) {
    for notice in &report.notices {
        let label = match notice.level {
            NoticeLevel::Error => "error".red().bold(),
            NoticeLevel::Warning => "warning".yellow().bold(),
        };
        eprintln!("{}: {}: {}", label, notice.file.display(), notice.message);
    }

    if report.has_mismatches() {
        println!(
            "{} {}",
            "Mismatched files moved to:".bold(),
            report.quarantine_dir.display()
        );
        for record in &report.records {
            println!("  {} ({})", record.original.display(), record.verdict);
        }
    } else {
        println!("{}", "No mismatched files found.".green());
    }

    println!(
        "{}",
        format!(
            "Checked {} of {} files, {} quarantined, {} skipped in {} ms",
            report.files_checked,
            report.files_total,
            report.records.len(),
            report.files_skipped,
            report.elapsed_ms
        )
        .dimmed()
    );

    let collisions = report.collision_count();
    let failures = report.failure_count();
    if collisions > 0 || failures > 0 {
        println!(
            "{} name collision(s), {} failure(s); see notices above",
            collisions, failures
        );
    }
}

pub fn print_json(report: &ScanReport) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}
