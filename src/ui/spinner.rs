//! Progress spinner for blocking network and subprocess calls
//!
//! The spinner ticks on indicatif's own thread; dropping or stopping it
//! clears the line.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use crate::config::SPINNER_TICK_MS;

/// Ticks used while probing mirrors (last entry is the finished state)
pub const BAR_TICKS: &[&str] = &["-", "\\", "|", "/", "✔"];

/// Ticks used while assessing risk
pub const BRACKET_TICKS: &[&str] = &["[|]", "[/]", "[-]", "[\\]", "[✔]"];

pub struct Spinner {
	bar: ProgressBar,
}

impl Spinner {
	/// `template` uses indicatif syntax, e.g. `"    [{spinner}] {msg}"`
	pub fn start(message: impl Into<String>, template: &str, ticks: &[&str]) -> Self {
		let bar = ProgressBar::new_spinner();
		let style = ProgressStyle::default_spinner()
			.tick_strings(ticks)
			.template(template)
			.unwrap_or_else(|_| ProgressStyle::default_spinner());
		bar.set_style(style);
		bar.set_message(message.into());
		bar.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
		Self { bar }
	}

	pub fn stop(self) {
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

/// Runs `work` while a spinner shows `message`
pub fn with_spinner<T>(message: impl Into<String>, template: &str, ticks: &[&str], work: impl FnOnce() -> T) -> T {
	let spinner = Spinner::start(message, template, ticks);
	let result = work();
	spinner.stop();
	result
}
