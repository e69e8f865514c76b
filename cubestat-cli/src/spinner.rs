//! Spinner shown while a long-running step is in flight.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

pub(crate) struct Spinner {
    bar: ProgressBar,
}

impl Spinner {
    /// Start a spinner with `msg`. When `quiet` is true nothing is drawn.
    pub(crate) fn start(msg: impl Into<String>, quiet: bool) -> Self {
        let bar = if quiet {
            ProgressBar::with_draw_target(None, ProgressDrawTarget::hidden())
        } else {
            ProgressBar::new_spinner()
        };
        if let Ok(style) = ProgressStyle::with_template("  {spinner:.cyan} {msg} ({elapsed})") {
            bar.set_style(style.tick_chars("/-\\|"));
        }
        bar.set_message(msg.into());
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar }
    }

    /// Stop ticking and clear the line.
    pub(crate) fn finish(self) {
        self.bar.finish_and_clear();
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        if !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
    }
}
