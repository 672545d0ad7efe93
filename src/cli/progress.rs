//! Progress display for the stats scan.

use indicatif::{ProgressBar, ProgressStyle};
use voxboard::BatchObserver;

/// Progress bar advanced once per completed batch.
pub struct ScanProgress {
    bar: ProgressBar,
}

impl ScanProgress {
    pub fn new() -> Self {
        // Length is unknown until discovery finishes; set on first batch.
        let bar = ProgressBar::new(0);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {wide_msg}")
        {
            bar.set_style(style.progress_chars("█▓░"));
        }
        bar.set_message("Discovering players...");
        Self { bar }
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl BatchObserver for ScanProgress {
    fn batch_completed(&self, completed: usize, total: usize) {
        self.bar.set_length(total as u64);
        self.bar.set_position(completed as u64);
        self.bar.set_message(scan_message(completed, total));
    }
}

pub fn scan_message(completed: usize, total: usize) -> String {
    let percent = if total == 0 {
        100.0
    } else {
        completed as f64 * 100.0 / total as f64
    };
    format!("Scanned {}/{} players - {:.0}%", completed, total, percent)
}
