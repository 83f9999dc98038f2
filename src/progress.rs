//! Progress reporting for solves, and user-requested early termination.

use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Receives progress from a solve.
///
/// Returning `false` from either method asks the solve to stop early. Solves
/// may run on several threads at once, hence `Sync`.
pub trait Progress: Sync {
    fn numerical_progress(&self, theme: &str, percent: f64) -> bool {
        log::debug!("{}: {:.0}%", theme, percent);
        true
    }

    fn mip_progress(&self, theme: &str, lower_bound: f64, upper_bound: f64) -> bool {
        log::debug!("{}: bounds [{}, {}]", theme, lower_bound, upper_bound);
        true
    }
}

/// Logs progress through `log` and never stops a solve
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgress;

impl Progress for LogProgress {}

/// Relative gap between the bounds, as a percentage of the upper bound
pub fn percent_error(lower_bound: f64, upper_bound: f64) -> String {
    debug_assert!(lower_bound <= upper_bound + 1e-9 * upper_bound.abs().max(1.0));
    let gap = if upper_bound == 0.0 {
        0.0
    } else {
        100.0 * (upper_bound - lower_bound) / upper_bound
    };
    format!("{:.2}%", gap)
}

/// Shows MIP progress on a spinner and stops the solve once a stop file
/// appears on disk.
pub struct StopFileProgress {
    stop_file: PathBuf,
    bar: ProgressBar,
}

impl StopFileProgress {
    pub fn new<P: AsRef<Path>>(stop_file: P) -> Self {
        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner} [{elapsed_precise}] {msg}") {
            bar.set_style(style);
        }
        bar.enable_steady_tick(Duration::from_millis(200));
        StopFileProgress { stop_file: stop_file.as_ref().to_path_buf(), bar }
    }

    /// A progress without a spinner, for non-interactive runs
    pub fn hidden<P: AsRef<Path>>(stop_file: P) -> Self {
        StopFileProgress { stop_file: stop_file.as_ref().to_path_buf(), bar: ProgressBar::hidden() }
    }

    /// Delete a stop file left over from an earlier run.
    ///
    /// Returns whether one was removed.
    pub fn clear_stale(&self) -> Result<bool, String> {
        if !self.stop_file.exists() {
            return Ok(false);
        }
        std::fs::remove_file(&self.stop_file)
            .map_err(|e| format!("Failed to remove {:?}: {}", self.stop_file, e))?;
        Ok(true)
    }

    pub fn stop_requested(&self) -> bool {
        self.stop_file.exists()
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl Progress for StopFileProgress {
    fn numerical_progress(&self, theme: &str, percent: f64) -> bool {
        self.bar.set_message(format!("{} {:.0}%", theme, percent));
        !self.stop_requested()
    }

    fn mip_progress(&self, theme: &str, lower_bound: f64, upper_bound: f64) -> bool {
        let line = format!(
            "{:<30}:{:<20}:{}",
            theme,
            "Percent Error",
            percent_error(lower_bound, upper_bound)
        );
        self.bar.println(&line);
        self.bar.set_message(line);
        !self.stop_requested()
    }
}
