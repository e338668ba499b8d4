//! Progress reporting for capture runs

use indicatif::{ProgressBar, ProgressStyle};

/// Receives `(completed, total)` once per finished preview descriptor
pub trait ProgressSink {
    fn update(&mut self, current: usize, total: usize);

    /// Called once after the last descriptor
    fn finish(&mut self) {}
}

/// Terminal progress bar
pub struct TerminalProgress {
    bar: ProgressBar,
}

impl TerminalProgress {
    pub fn new() -> Self {
        let bar = ProgressBar::new(0);
        if let Ok(style) = ProgressStyle::with_template("{bar:40} {pos}/{len} previews {msg}") {
            bar.set_style(style);
        }
        Self { bar }
    }
}

impl Default for TerminalProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for TerminalProgress {
    fn update(&mut self, current: usize, total: usize) {
        self.bar.set_length(total as u64);
        self.bar.set_position(current as u64);
    }

    fn finish(&mut self) {
        self.bar.finish_with_message("done");
    }
}

/// Progress written to the log, for non-interactive runs
#[derive(Debug, Default)]
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn update(&mut self, current: usize, total: usize) {
        log::info!("Captured preview {}/{}", current, total);
    }
}
