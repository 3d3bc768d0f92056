//! Install/upgrade history and version lists
//!
//! pacman history comes from `/var/log/pacman.log`, apt history from the
//! stanzas of `/var/log/apt/history.log`.

use chrono::{DateTime, NaiveDateTime};
use std::collections::HashSet;
use std::fmt;

use crate::core::exec;
use crate::core::manager::Manager;
use crate::core::package::strip_arch;
use crate::core::search::name_from_line;

const HISTORY_DISPLAY_FORMAT: &str = "%d %b %Y, %I:%M %p";

const OFFSET_TIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%z", "%a %d %b %Y %H:%M:%S %z", "%Y-%m-%d %H:%M:%S%z"];

const NAIVE_TIME_FORMATS: &[&str] = &[
	"%Y-%m-%d %H:%M:%S",
	"%Y-%m-%dT%H:%M:%S",
	"%d-%m-%Y %H:%M:%S",
	"%m/%d/%Y %H:%M:%S",
	"%Y-%m-%d %H:%M",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
	Installed,
	Upgraded,
}

impl fmt::Display for Action {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Action::Installed => f.write_str("Installed"),
			Action::Upgraded => f.write_str("Upgraded"),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEvent {
	pub action: Action,
	/// `VER` for installs, `OLD -> NEW` for upgrades
	pub version: String,
	pub time: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct History {
	pub events: Vec<HistoryEvent>,
	/// Last command line that mentioned the package
	pub command: Option<String>,
}

/// One step of the version tree; `to` is set for upgrades
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionStep {
	pub from: String,
	pub to: Option<String>,
}

impl VersionStep {
	pub fn is_current(&self, current: &str) -> bool {
		self.to.as_deref().unwrap_or(&self.from) == current
	}
}

/// Reformats a log timestamp, or returns it unchanged when no format fits
pub fn format_history_time(timestamp: &str) -> String {
	let normalized = timestamp.split_whitespace().collect::<Vec<_>>().join(" ");

	if let Some(dt) = OFFSET_TIME_FORMATS.iter().find_map(|fmt| DateTime::parse_from_str(&normalized, fmt).ok()) {
		return dt.format(HISTORY_DISPLAY_FORMAT).to_string();
	}
	if let Some(dt) = NAIVE_TIME_FORMATS.iter().find_map(|fmt| NaiveDateTime::parse_from_str(&normalized, fmt).ok()) {
		return dt.format(HISTORY_DISPLAY_FORMAT).to_string();
	}
	timestamp.to_string()
}

/// `[2024-06-18T10:15:32+0300] [ALPM] upgraded vim (9.0-1 -> 9.1-1)` ->
/// (timestamp, tag, message)
fn split_pacman_line(line: &str) -> Option<(&str, &str, &str)> {
	let rest = line.strip_prefix('[')?;
	let (time, rest) = rest.split_once("] [")?;
	let (tag, message) = rest.split_once("] ")?;
	Some((time, tag, message))
}

/// `installed vim (9.1-1)` / `upgraded vim (9.0-1 -> 9.1-1)` for `package`
fn parse_alpm_message(message: &str, package: &str) -> Option<(Action, String)> {
	let (verb, rest) = message.split_once(' ')?;
	let action = match verb {
		"installed" => Action::Installed,
		"upgraded" => Action::Upgraded,
		_ => return None,
	};
	let (name, version) = rest.split_once(' ')?;
	if name != package {
		return None;
	}
	let version = version.trim().strip_prefix('(')?.strip_suffix(')')?;
	Some((action, version.to_string()))
}

fn mentions_package(command: &str, package: &str) -> bool {
	command.split_whitespace().any(|token| token == package)
}

pub fn parse_pacman_history(log: &str, package: &str) -> History {
	let mut history = History::default();

	for line in log.lines() {
		let Some((time, tag, message)) = split_pacman_line(line) else {
			continue;
		};

		match tag {
			"PACMAN" => {
				if let Some(cmd) = message.strip_prefix("Running '").and_then(|m| m.strip_suffix('\'')) {
					if mentions_package(cmd, package) {
						history.command = Some(cmd.to_string());
					}
				}
			}
			"ALPM" => {
				if let Some((action, version)) = parse_alpm_message(message, package) {
					history.events.push(HistoryEvent { action, version, time: format_history_time(time) });
				}
			}
			_ => {}
		}
	}

	history
}

/// Splits `a:amd64 (1.0), b:amd64 (2.0, automatic)` into (name, inner) pairs
fn split_apt_entries(value: &str) -> Vec<(String, String)> {
	value
		.split("), ")
		.filter_map(|entry| {
			let (name, inner) = entry.split_once(" (")?;
			let inner = inner.trim_end_matches(')');
			Some((strip_arch(name.trim()).to_string(), inner.to_string()))
		})
		.collect()
}

fn apt_event(field: &str, inner: &str) -> Option<(Action, String)> {
	let parts: Vec<&str> = inner.split(", ").map(str::trim).collect();
	match (field, parts.as_slice()) {
		("Upgrade", [old, new]) => Some((Action::Upgraded, format!("{} -> {}", old, new))),
		("Install", [version]) | ("Install", [version, "automatic"]) => Some((Action::Installed, version.to_string())),
		_ => None,
	}
}

pub fn parse_apt_history(log: &str, package: &str) -> History {
	let mut history = History::default();

	for stanza in log.split("\n\n") {
		let mut start = "";
		let mut command = None;
		let mut events = Vec::new();

		for line in stanza.lines() {
			let Some((key, value)) = line.split_once(": ") else {
				continue;
			};
			match key {
				"Start-Date" => start = value.trim(),
				"Commandline" => command = Some(value.trim()),
				"Install" | "Upgrade" => {
					for (name, inner) in split_apt_entries(value) {
						if name != package {
							continue;
						}
						if let Some(event) = apt_event(key, &inner) {
							events.push(event);
						}
					}
				}
				_ => {}
			}
		}

		if let Some(cmd) = command.filter(|c| mentions_package(c, package)) {
			history.command = Some(cmd.to_string());
		}
		let time = format_history_time(start);
		for (action, version) in events {
			history.events.push(HistoryEvent { action, version, time: time.clone() });
		}
	}

	history
}

/// Keeps the first occurrence of each item
pub fn dedup_ordered<T: Clone + Eq + std::hash::Hash>(items: Vec<T>) -> Vec<T> {
	let mut seen = HashSet::new();
	items.into_iter().filter(|item| seen.insert(item.clone())).collect()
}

/// Version steps seen in a pacman history
pub fn pacman_version_steps(history: &History) -> Vec<VersionStep> {
	let steps = history
		.events
		.iter()
		.map(|event| match event.version.split_once(" -> ") {
			Some((from, to)) => VersionStep { from: from.to_string(), to: Some(to.to_string()) },
			None => VersionStep { from: event.version.clone(), to: None },
		})
		.collect();
	dedup_ordered(steps)
}

/// Version column of `apt-cache madison` lines (`pkg | ver | source`)
pub fn parse_madison(stdout: &str) -> Vec<String> {
	let versions = stdout
		.lines()
		.filter_map(|line| line.split('|').nth(1))
		.map(|v| v.trim().to_string())
		.filter(|v| !v.is_empty())
		.collect();
	dedup_ordered(versions)
}

/// Versions from `pacman -Ss` name lines whose package is exactly `package`
pub fn parse_pacman_versions(stdout: &str, package: &str) -> Vec<String> {
	let versions = stdout
		.lines()
		.filter(|line| !line.starts_with(char::is_whitespace))
		.filter(|line| name_from_line(line, Manager::Pacman) == package)
		.filter_map(|line| line.split_whitespace().nth(1))
		.map(str::to_string)
		.collect();
	dedup_ordered(versions)
}

pub fn history(manager: Manager, package: &str, log_path: &str) -> std::io::Result<History> {
	let log = std::fs::read_to_string(log_path)?;
	Ok(match manager {
		Manager::Pacman => parse_pacman_history(&log, package),
		Manager::Apt => parse_apt_history(&log, package),
	})
}

/// Installed version, if any
pub fn current_version(manager: Manager, package: &str) -> Option<String> {
	let stdout = match manager {
		Manager::Pacman => exec::stdout_or_empty("pacman", &["-Q", package]),
		Manager::Apt => exec::stdout_or_empty("dpkg-query", &["-W", "--showformat=${Version}", package]),
	};
	let version = match manager {
		Manager::Pacman => stdout.split_whitespace().nth(1).unwrap_or(""),
		Manager::Apt => stdout.trim(),
	};
	(!version.is_empty()).then(|| version.to_string())
}

/// Version tree for `history`: log steps (pacman) or repository versions (apt)
pub fn version_tree(manager: Manager, package: &str, history: &History) -> Vec<VersionStep> {
	match manager {
		Manager::Pacman => pacman_version_steps(history),
		Manager::Apt => parse_madison(&exec::stdout_or_empty("apt-cache", &["madison", package]))
			.into_iter()
			.map(|from| VersionStep { from, to: None })
			.collect(),
	}
}

/// Versions available from the repositories
pub fn available_versions(manager: Manager, package: &str) -> Vec<String> {
	match manager {
		Manager::Pacman => parse_pacman_versions(&exec::stdout_or_empty("pacman", &["-Ss", package]), package),
		Manager::Apt => parse_madison(&exec::stdout_or_empty("apt-cache", &["madison", package])),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const PACMAN_LOG: &str = "\
[2024-06-18T10:15:30+0300] [PACMAN] Running 'pacman -S vim'
[2024-06-18T10:15:32+0300] [ALPM] installed vim (9.1.0-1)
[2024-06-18T10:15:33+0300] [ALPM] installed vim-runtime (9.1.0-1)
[2024-07-01T08:00:00+0300] [PACMAN] Running 'pacman -Syu'
[2024-07-01T08:00:05+0300] [ALPM] upgraded vim (9.1.0-1 -> 9.1.0500-1)
[2024-07-01T08:00:06+0300] [ALPM] upgraded vim-runtime (9.1.0-1 -> 9.1.0500-1)
[2024-07-01T08:00:07+0300] [ALPM-SCRIPTLET] >>> vim done
";

	const APT_LOG: &str = "\
Start-Date: 2024-06-18  10:15:32
Commandline: apt install vim
Requested-By: user (1000)
Install: vim:amd64 (2:8.2.3995-1ubuntu2.16), vim-runtime:amd64 (2:8.2.3995-1ubuntu2.16, automatic)
End-Date: 2024-06-18  10:15:40

Start-Date: 2024-07-01  08:00:00
Commandline: apt upgrade -y
Upgrade: vim-runtime:amd64 (2:8.2.3995-1ubuntu2.16, 2:8.2.3995-1ubuntu2.17), vim:amd64 (2:8.2.3995-1ubuntu2.16, 2:8.2.3995-1ubuntu2.17)
End-Date: 2024-07-01  08:00:10
";

	#[test]
	fn test_format_history_time() {
		assert_eq!(format_history_time("2024-06-18T10:15:32+0300"), "18 Jun 2024, 10:15 AM");
		assert_eq!(format_history_time("2024-06-18  22:15:32"), "18 Jun 2024, 10:15 PM");
		assert_eq!(format_history_time("someday"), "someday");
	}

	#[test]
	fn test_pacman_history_exact_name() {
		let history = parse_pacman_history(PACMAN_LOG, "vim");
		assert_eq!(history.events.len(), 2);
		assert_eq!(history.events[0].action, Action::Installed);
		assert_eq!(history.events[0].version, "9.1.0-1");
		assert_eq!(history.events[1].action, Action::Upgraded);
		assert_eq!(history.events[1].version, "9.1.0-1 -> 9.1.0500-1");
		assert_eq!(history.command.as_deref(), Some("pacman -S vim"));
	}

	#[test]
	fn test_apt_history() {
		let history = parse_apt_history(APT_LOG, "vim");
		assert_eq!(history.events.len(), 2);
		assert_eq!(history.events[0].action, Action::Installed);
		assert_eq!(history.events[0].version, "2:8.2.3995-1ubuntu2.16");
		assert_eq!(history.events[0].time, "18 Jun 2024, 10:15 AM");
		assert_eq!(history.events[1].version, "2:8.2.3995-1ubuntu2.16 -> 2:8.2.3995-1ubuntu2.17");
		assert_eq!(history.command.as_deref(), Some("apt install vim"));

		let runtime = parse_apt_history(APT_LOG, "vim-runtime");
		assert_eq!(runtime.events[0].action, Action::Installed);
		assert!(runtime.command.is_none());
	}

	#[test]
	fn test_version_steps() {
		let history = parse_pacman_history(PACMAN_LOG, "vim");
		let steps = pacman_version_steps(&history);
		assert_eq!(steps.len(), 2);
		assert!(steps[1].is_current("9.1.0500-1"));
		assert!(!steps[0].is_current("9.1.0500-1"));
	}

	#[test]
	fn test_parse_madison() {
		let out = "\
       vim | 2:8.2.3995-1ubuntu2.17 | http://archive.ubuntu.com/ubuntu jammy-updates/main amd64 Packages
       vim | 2:8.2.3995-1ubuntu2.17 | http://security.ubuntu.com/ubuntu jammy-security/main amd64 Packages
       vim | 2:8.2.3995-1ubuntu2 | http://archive.ubuntu.com/ubuntu jammy/main amd64 Packages
";
		assert_eq!(parse_madison(out), vec!["2:8.2.3995-1ubuntu2.17", "2:8.2.3995-1ubuntu2"]);
	}

	#[test]
	fn test_parse_pacman_versions() {
		let out = "\
extra/vim 9.1.0500-1 [installed]
    Vi Improved
extra/vim-airline 0.11-5
    Status line
";
		assert_eq!(parse_pacman_versions(out, "vim"), vec!["9.1.0500-1"]);
	}
}
