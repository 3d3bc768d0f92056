//! systemd (or SysV init) services

use anyhow::Result;
use colored::Color;
use std::path::Path;

use crate::core::exec;
use crate::ui::format::capitalize;

/// `systemctl status` exit code for an unknown unit
const STATUS_NO_SUCH_UNIT: i32 = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Service {
	pub name: String,
	pub state: String,
}

/// Rows of `systemctl list-unit-files --type=service`
pub fn parse_unit_files(stdout: &str) -> Vec<Service> {
	stdout
		.lines()
		.filter(|line| line.contains(".service") && !line.starts_with("UNIT FILE"))
		.filter_map(|line| {
			let mut parts = line.split_whitespace();
			let name = parts.next()?;
			let state = parts.next()?;
			Some(Service { name: name.to_string(), state: capitalize(state) })
		})
		.collect()
}

fn init_d_services(dir: &Path) -> Vec<Service> {
	let mut services: Vec<Service> = std::fs::read_dir(dir)
		.map(|rd| {
			rd.filter_map(|e| e.ok())
				.map(|e| Service { name: e.file_name().to_string_lossy().into_owned(), state: "Unknown".to_string() })
				.collect()
		})
		.unwrap_or_default();
	services.sort_by(|a, b| a.name.cmp(&b.name));
	services
}

/// systemd unit files, or `/etc/init.d` scripts without systemd.
/// `None` when neither exists.
pub fn list(init_d: &Path) -> Result<Option<Vec<Service>>> {
	if exec::has_program("systemctl") {
		let out = exec::capture("systemctl", &["list-unit-files", "--type=service", "--no-pager"])?;
		return Ok(Some(parse_unit_files(&out.stdout)));
	}
	if init_d.is_dir() {
		return Ok(Some(init_d_services(init_d)));
	}
	Ok(None)
}

pub fn state_color(state: &str) -> Color {
	match state.to_lowercase().as_str() {
		"enabled" => Color::Green,
		"disabled" => Color::Red,
		"static" | "alias" => Color::Cyan,
		"generated" | "enabled-runtime" => Color::Magenta,
		"indirect" => Color::Yellow,
		_ => Color::White,
	}
}

/// Line color for `systemctl status` output
pub fn status_line_color(line: &str) -> Option<Color> {
	if line.contains("Active:") {
		Some(Color::Green)
	} else if line.contains("Loaded:") {
		Some(Color::Cyan)
	} else if line.contains("Main PID:") {
		Some(Color::Magenta)
	} else {
		None
	}
}

/// Line color for journal output
pub fn log_line_color(line: &str) -> Option<Color> {
	let lower = line.to_lowercase();
	if lower.contains("error") {
		Some(Color::Red)
	} else if lower.contains("warning") {
		Some(Color::Yellow)
	} else {
		None
	}
}

/// `systemctl status NAME` output, `None` when the unit does not exist
pub fn status(name: &str) -> Result<Option<String>> {
	let out = exec::capture("systemctl", &["status", name, "--no-pager"])?;
	if out.code == Some(STATUS_NO_SUCH_UNIT) || out.stdout.trim().is_empty() {
		return Ok(None);
	}
	Ok(Some(out.stdout))
}

/// Last `lines` journal entries, `None` when there are none
pub fn logs(name: &str, lines: usize) -> Result<Option<String>> {
	let count = lines.to_string();
	let out = exec::capture("journalctl", &["-u", name, "-n", count.as_str(), "--no-pager"])?;
	if !out.success() || out.stdout.trim().is_empty() {
		return Ok(None);
	}
	Ok(Some(out.stdout))
}
