#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Shared CLI utilities for the `GeoSpy` tools.
//!
//! [`init_logger`] sets up `indicatif-log-bridge` so that `log::info!` and
//! friends are suspended while the [`Spinner`] redraws.

use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};

pub use indicatif::MultiProgress;

/// A spinner shown while waiting on a slow call (e.g. the vision provider).
pub struct Spinner {
    bar: ProgressBar,
    started: Instant,
}

impl Spinner {
    /// Adds a spinner with `message` to `multi` and starts ticking.
    #[must_use]
    pub fn start(multi: &MultiProgress, message: &str) -> Self {
        let bar = multi.add(ProgressBar::new_spinner());
        bar.enable_steady_tick(Duration::from_millis(100));
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg} [{elapsed}]")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(message.to_string());

        Self {
            bar,
            started: Instant::now(),
        }
    }

    /// Time since the spinner started.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Stops the spinner, leaving `message` and the elapsed time on screen.
    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(format!(
            "{message} ({:.1}s)",
            self.elapsed().as_secs_f64()
        ));
    }

    /// Stops the spinner and removes it.
    pub fn finish_and_clear(&self) {
        self.bar.finish_and_clear();
    }
}

/// Initializes the global logger wrapped in `indicatif-log-bridge` so that
/// `log::info!` and friends are suspended while progress bars redraw.
///
/// Returns the [`MultiProgress`] that all progress bars must be added to.
#[must_use]
pub fn init_logger() -> MultiProgress {
    let multi = MultiProgress::new();

    let logger = pretty_env_logger::formatted_builder()
        .parse_env("RUST_LOG")
        .build();
    let level = logger.filter();

    indicatif_log_bridge::LogWrapper::new(multi.clone(), logger)
        .try_init()
        .ok(); // Already set in tests.

    log::set_max_level(level);

    multi
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spinner_reports_elapsed_time() {
        let multi = MultiProgress::with_draw_target(indicatif::ProgressDrawTarget::hidden());
        let spinner = Spinner::start(&multi, "Analyzing");
        std::thread::sleep(Duration::from_millis(5));
        spinner.finish("Done");
        assert!(spinner.elapsed() >= Duration::from_millis(5));
    }

    #[test]
    fn init_logger_is_idempotent() {
        let _ = init_logger();
        let _ = init_logger();
    }
}
