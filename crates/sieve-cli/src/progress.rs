//! Progress reporting for the scan

use std::path::Path;

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use sieve_core::{FileOutcome, RelocationOutcome, ScanObserver};

/// Progress bar driven by scan events.
pub struct ProgressReporter {
    bar: ProgressBar,
    verbose: bool,
}

impl ProgressReporter {
    /// Creates a reporter drawing to stderr.
    pub fn new(verbose: bool) -> Self {
        let bar = ProgressBar::new(0);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{msg}\n{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} files ({eta})")
        {
            bar.set_style(style.progress_chars("#>-"));
        }
        bar.set_message("Scanning Directory");
        Self { bar, verbose }
    }

    /// Creates a reporter that draws nothing, for machine-readable output.
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
            verbose: false,
        }
    }
}

impl ScanObserver for ProgressReporter {
    fn on_start(&self, total_files: usize) {
        self.bar.set_length(total_files as u64);
    }

    fn on_file(&self, path: &Path, outcome: &FileOutcome) {
        self.bar.inc(1);
        if self.verbose {
            let line = file_line(path, outcome);
            // A hidden bar (stderr not a terminal) discards println output.
            if self.bar.is_hidden() {
                eprintln!("{}", line);
            } else {
                self.bar.println(line);
            }
        }
    }

    fn on_finish(&self) {
        self.bar.finish_and_clear();
    }
}

fn file_line(path: &Path, outcome: &FileOutcome) -> String {
    let path = path.display();
    match outcome {
        FileOutcome::Classified(c) => match &c.relocation {
            Some(RelocationOutcome::Moved(record)) => format!(
                "{} {} -> {}",
                c.verdict.to_string().red(),
                path,
                record.destination.display()
            ),
            Some(RelocationOutcome::Collision { .. }) => {
                format!("{} {} (name taken, left in place)", c.verdict.to_string().yellow(), path)
            }
            None => format!("{} {}", c.verdict.to_string().dimmed(), path),
        },
        FileOutcome::Failed(message) => format!("{} {}: {}", "failed".red().bold(), path, message),
    }
}
