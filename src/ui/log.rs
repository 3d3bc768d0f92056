//! Unified logging system
//!
//! Console lines are colored; success and error lines also land in the
//! dated log file through `tracing`.

use colored::*;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::logger::single_line;

static VERBOSE: AtomicBool = AtomicBool::new(false);

const LOGO: &[&str] = &[
	"            +++++++++++++++++     ",
	"         +++++++++++++++++++++++  ",
	"       +++++++++++++++++++++++++++",
	"      ++++++++++++++++++++++++++  ",
	"     +++++++++++++++++++++++ P    ",
	"    ++++++++++++++++++++++ A      ",
	"    ++++++++++++++++++++ C        ",
	"    +++++++++++++++++       {version}",
	"    ++++++++++++++++++++ T        ",
	"    ++++++++++++++++++++++ O      ",
	"     +++++++++++++++++++++++ L    ",
	"      ++++++++++++++++++++++++++  ",
	"       +++++++++++++++++++++++++++",
	"         +++++++++++++++++++++++  ",
	"            +++++++++++++++++     ",
];

const LOGO_START: (u8, u8, u8) = (255, 255, 25);
const LOGO_END: (u8, u8, u8) = (255, 150, 40);

/// Linear blend between two RGB colors, `factor` in 0.0..=1.0
pub fn gradient(start: (u8, u8, u8), end: (u8, u8, u8), factor: f32) -> (u8, u8, u8) {
	let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * factor) as u8;
	(mix(start.0, end.0), mix(start.1, end.1), mix(start.2, end.2))
}

pub fn print_logo() {
	let last = (LOGO.len() - 1) as f32;
	for (i, line) in LOGO.iter().enumerate() {
		let (r, g, b) = gradient(LOGO_START, LOGO_END, i as f32 / last);
		let line = line.replace("{version}", env!("CARGO_PKG_VERSION"));
		println!("{}", line.truecolor(r, g, b));
	}
}

pub struct Log;

impl Log {
	pub fn set_verbose(enabled: bool) {
		VERBOSE.store(enabled, Ordering::Relaxed);
	}

	pub fn is_verbose() -> bool {
		VERBOSE.load(Ordering::Relaxed)
	}
}

pub fn info(msg: &str) {
	println!("{} {}", "ℹ".bright_blue().bold(), msg.bright_white());
}

pub fn success(msg: &str) {
	println!("{} {}", "✓".bright_green().bold(), msg.green().bold());
	tracing::info!("{}", single_line(msg));
}

pub fn warn(msg: &str) {
	println!("{} {}", "⚠".bright_yellow().bold(), msg.yellow());
	tracing::warn!("{}", single_line(msg));
}

pub fn error(msg: &str) {
	eprintln!("{} {}", "✗".bright_red().bold(), msg.red().bold());
	tracing::error!("{}", single_line(msg));
}

pub fn debug(msg: &str) {
	tracing::debug!("{}", single_line(msg));
	if Log::is_verbose() {
		println!("{} {}", "⚙".bright_black().bold(), msg.dimmed());
	}
}

/// Section header, e.g. "Package Statistics"
pub fn header(text: &str) {
	println!("\n{}\n", text.bright_yellow().bold());
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_gradient_endpoints() {
		assert_eq!(gradient(LOGO_START, LOGO_END, 0.0), LOGO_START);
		assert_eq!(gradient(LOGO_START, LOGO_END, 1.0), LOGO_END);
	}

	#[test]
	fn test_gradient_midpoint() {
		assert_eq!(gradient((0, 0, 0), (200, 100, 50), 0.5), (100, 50, 25));
	}
}
