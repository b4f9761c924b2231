#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Shared CLI utilities for the resilience map tools.
//!
//! Provides `indicatif` progress bars behind the store's
//! [`ProgressCallback`] trait, plus [`init_logger`], which routes `log`
//! output through `indicatif-log-bridge` so log lines do not tear the
//! bars.

use std::sync::Arc;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use resilience_map_store::progress::ProgressCallback;

pub use indicatif::MultiProgress;

/// An `indicatif` [`ProgressBar`] that implements [`ProgressCallback`].
pub struct IndicatifProgress {
    bar: ProgressBar,
    /// Applied when `set_total()` reports a length.
    sized_style: ProgressStyle,
}

impl IndicatifProgress {
    /// A bar for dataset loading. Spins until the loader reports how many
    /// files it will read, then counts them.
    #[must_use]
    pub fn load_bar(multi: &MultiProgress, message: &str) -> Arc<dyn ProgressCallback> {
        let bar = multi.add(ProgressBar::new_spinner());
        bar.enable_steady_tick(Duration::from_millis(120));
        bar.set_style(style("{spinner:.cyan} {msg}", ProgressStyle::default_spinner()));
        bar.set_message(message.to_string());

        Arc::new(Self {
            bar,
            sized_style: style("  {msg} {wide_bar:.cyan/dim} {pos}/{len} files", bar_fallback()),
        })
    }

    /// A bar over a known number of steps, such as the 41 treatments.
    #[must_use]
    pub fn steps_bar(
        multi: &MultiProgress,
        message: &str,
        total: u64,
    ) -> Arc<dyn ProgressCallback> {
        let sized_style = style(
            "{msg:<16} {wide_bar:.green/dim} {pos:>2}/{len} [{elapsed}]",
            bar_fallback(),
        );
        let bar = multi.add(ProgressBar::new(total).with_style(sized_style.clone()));
        bar.set_message(message.to_string());

        Arc::new(Self { bar, sized_style })
    }
}

fn style(template: &str, fallback: ProgressStyle) -> ProgressStyle {
    ProgressStyle::with_template(template).unwrap_or(fallback)
}

fn bar_fallback() -> ProgressStyle {
    ProgressStyle::default_bar().progress_chars("=>-")
}

impl ProgressCallback for IndicatifProgress {
    fn set_total(&self, total: u64) {
        self.bar.set_style(self.sized_style.clone());
        self.bar.set_length(total);
        self.bar.reset();
    }

    fn inc(&self, delta: u64) {
        self.bar.inc(delta);
    }

    fn set_message(&self, msg: String) {
        self.bar.set_message(msg);
    }

    fn finish(&self, msg: String) {
        self.bar.finish_with_message(msg);
    }

    fn finish_and_clear(&self) {
        self.bar.finish_and_clear();
    }
}

/// Initializes the global logger wrapped in `indicatif-log-bridge`.
///
/// Returns the [`MultiProgress`] that all progress bars must be added to.
#[must_use]
pub fn init_logger() -> MultiProgress {
    let multi = MultiProgress::new();

    let logger = pretty_env_logger::formatted_builder()
        .parse_env("RUST_LOG")
        .build();
    let level = logger.filter();

    // Already set in tests
    indicatif_log_bridge::LogWrapper::new(multi.clone(), logger)
        .try_init()
        .ok();

    log::set_max_level(level);

    multi
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_bar_tracks_progress() {
        let multi = MultiProgress::with_draw_target(indicatif::ProgressDrawTarget::hidden());
        let progress = IndicatifProgress::steps_bar(&multi, "Treatments", 41);
        progress.inc(3);
        progress.set_message("t_3".to_string());
        progress.finish("done".to_string());
    }

    #[test]
    fn load_bar_switches_to_bar_on_total() {
        let multi = MultiProgress::with_draw_target(indicatif::ProgressDrawTarget::hidden());
        let progress = IndicatifProgress::load_bar(&multi, "Loading");
        progress.set_total(3);
        progress.inc(3);
        progress.finish_and_clear();
    }
}
