// Logger - dated log file under the cache directory

use chrono::Local;
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::Level;
use tracing_subscriber::fmt::time::ChronoLocal;

use crate::config;

/// Installs the file subscriber for today's log.
///
/// Returns the log path, or `None` when the directory or file cannot be
/// opened. Commands still run in that case, only without a file log.
pub fn init(verbose: bool) -> Option<PathBuf> {
	let dir = config::log_dir()?;
	fs::create_dir_all(&dir).ok()?;

	let path = dir.join(log_file_name(Local::now().date_naive()));
	let file = OpenOptions::new().create(true).append(true).open(&path).ok()?;

	let level = if verbose { Level::DEBUG } else { Level::INFO };

	tracing_subscriber::fmt()
		.with_writer(Mutex::new(file))
		.with_ansi(false)
		.with_target(false)
		.with_max_level(level)
		.with_timer(ChronoLocal::new("%I:%M:%S %p".to_string()))
		.try_init()
		.ok()?;

	Some(path)
}

pub fn log_file_name(date: chrono::NaiveDate) -> String {
	format!("{}.log", date.format("%Y-%m-%d"))
}

/// Log records are single-line.
pub fn single_line(message: &str) -> String {
	message.replace(['\n', '\r'], "")
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_log_file_name_is_dated() {
		let date = chrono::NaiveDate::from_ymd_opt(2025, 7, 23).unwrap();
		assert_eq!(log_file_name(date), "2025-07-23.log");
	}

	#[test]
	fn test_single_line_strips_breaks() {
		assert_eq!(single_line("\nFailed to upgrade\r\n"), "Failed to upgrade");
	}
}
