//! Outdated, orphaned and optional-dependency heavy packages

use anyhow::Result;

use crate::core::exec;
use crate::core::manager::Manager;
use crate::core::package::{parse_blocks, strip_arch};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutdatedPackage {
	pub name: String,
	pub current: String,
	pub candidate: String,
	/// apt suite list (`jammy-updates,jammy-security`); empty on pacman
	pub suite: String,
}

impl OutdatedPackage {
	pub fn is_security(&self) -> bool {
		self.suite.split(',').any(|s| s.contains("-security"))
	}
}

/// `pacman -Qu` lines: `name old -> new [ignored]`
pub fn parse_pacman_outdated(stdout: &str) -> Vec<OutdatedPackage> {
	stdout
		.lines()
		.filter_map(|line| {
			let parts: Vec<&str> = line.split_whitespace().collect();
			match parts.as_slice() {
				[name, current, "->", candidate, ..] => Some(OutdatedPackage {
					name: name.to_string(),
					current: current.to_string(),
					candidate: candidate.to_string(),
					suite: String::new(),
				}),
				_ => None,
			}
		})
		.collect()
}

/// `apt list --upgradable` lines: `name/suite new arch [upgradable from: old]`
pub fn parse_apt_upgradable(stdout: &str) -> Vec<OutdatedPackage> {
	stdout
		.lines()
		.filter(|line| !line.starts_with("Listing") && !line.starts_with("WARNING"))
		.filter_map(|line| {
			let (head, tail) = line.split_once(" [upgradable from: ")?;
			let current = tail.trim_end().trim_end_matches(']').to_string();
			let mut parts = head.split_whitespace();
			let (name, suite) = parts.next()?.split_once('/')?;
			let candidate = parts.next()?.to_string();
			Some(OutdatedPackage { name: name.to_string(), current, candidate, suite: suite.to_string() })
		})
		.collect()
}

/// Refreshes apt lists quietly, then reads the upgradable set
pub fn apt_upgradable() -> Result<Vec<OutdatedPackage>> {
	exec::run_privileged_quiet(&["apt", "update"])?;
	Ok(parse_apt_upgradable(&exec::stdout_or_empty("apt", &["list", "--upgradable"])))
}

pub fn outdated(manager: Manager) -> Result<Vec<OutdatedPackage>> {
	match manager {
		Manager::Pacman => Ok(parse_pacman_outdated(&exec::stdout_or_empty("pacman", &["-Qu"]))),
		Manager::Apt => apt_upgradable(),
	}
}

/// `Remv name [version]` lines of a simulated autoremove
pub fn parse_autoremove(stdout: &str) -> Vec<String> {
	stdout
		.lines()
		.filter_map(|line| line.strip_prefix("Remv "))
		.filter_map(|rest| rest.split_whitespace().next())
		.map(|name| strip_arch(name).to_string())
		.collect()
}

pub fn parse_name_lines(stdout: &str) -> Vec<String> {
	stdout.lines().map(str::trim).filter(|l| !l.is_empty()).map(str::to_string).collect()
}

pub fn unused(manager: Manager) -> Vec<String> {
	match manager {
		Manager::Pacman => parse_name_lines(&exec::stdout_or_empty("pacman", &["-Qdtq"])),
		Manager::Apt => parse_autoremove(&exec::stdout_or_empty("apt-get", &["-s", "autoremove"])),
	}
}

/// pacman blocks whose `Optional Deps` is not `None`
pub fn parse_pacman_bloat(stdout: &str) -> Vec<String> {
	parse_blocks(stdout)
		.into_iter()
		.filter(|block| block.get("Optional Deps").is_some_and(|v| v.trim() != "None"))
		.filter_map(|block| block.get("Name").cloned())
		.collect()
}

/// `name\trecommends\tsuggests` lines with either list non-empty
pub fn parse_dpkg_bloat(stdout: &str) -> Vec<String> {
	stdout
		.lines()
		.filter_map(|line| {
			let mut cols = line.split('\t');
			let name = cols.next()?.trim();
			let has_optional = cols.any(|c| !c.trim().is_empty());
			(has_optional && !name.is_empty()).then(|| strip_arch(name).to_string())
		})
		.collect()
}

pub fn bloat(manager: Manager) -> Vec<String> {
	match manager {
		Manager::Pacman => parse_pacman_bloat(&exec::stdout_or_empty("pacman", &["-Qi"])),
		Manager::Apt => parse_dpkg_bloat(&exec::stdout_or_empty(
			"dpkg-query",
			&["-W", "--showformat=${binary:Package}\\t${Recommends}\\t${Suggests}\\n"],
		)),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_parse_pacman_outdated() {
		let out = "linux 6.9.7.arch1-1 -> 6.9.8.arch1-1\nfirefox 127.0-1 -> 128.0-1 [ignored]\ngarbage\n";
		let pkgs = parse_pacman_outdated(out);
		assert_eq!(pkgs.len(), 2);
		assert_eq!(pkgs[0].name, "linux");
		assert_eq!(pkgs[0].current, "6.9.7.arch1-1");
		assert_eq!(pkgs[1].candidate, "128.0-1");
		assert!(!pkgs[0].is_security());
	}

	#[test]
	fn test_parse_apt_upgradable() {
		let out = "\
Listing...
openssl/jammy-updates,jammy-security 3.0.2-0ubuntu1.16 amd64 [upgradable from: 3.0.2-0ubuntu1.15]
tzdata/jammy-updates 2024a-0ubuntu0.22.04.1 all [upgradable from: 2023c-0ubuntu0.22.04.2]
";
		let pkgs = parse_apt_upgradable(out);
		assert_eq!(pkgs.len(), 2);
		assert_eq!(pkgs[0].name, "openssl");
		assert_eq!(pkgs[0].candidate, "3.0.2-0ubuntu1.16");
		assert_eq!(pkgs[0].current, "3.0.2-0ubuntu1.15");
		assert!(pkgs[0].is_security());
		assert!(!pkgs[1].is_security());
	}

	#[test]
	fn test_parse_autoremove() {
		let out = "\
Reading package lists...
The following packages will be REMOVED:
  linux-headers-6.5.0-14
Remv linux-headers-6.5.0-14-generic [6.5.0-14.14~22.04.1]
Remv libfoo1:amd64 [1.0-1]
";
		assert_eq!(parse_autoremove(out), vec!["linux-headers-6.5.0-14-generic", "libfoo1"]);
	}

	#[test]
	fn test_parse_pacman_bloat() {
		let out = "\
Name            : mpv
Optional Deps   : youtube-dl: for video-sharing websites playback

Name            : zlib
Optional Deps   : None
";
		assert_eq!(parse_pacman_bloat(out), vec!["mpv"]);
	}

	#[test]
	fn test_parse_dpkg_bloat() {
		let out = "curl\t\tlibcurl4-doc\nzlib1g\t\t\nvim:amd64\tvim-runtime\t\n";
		assert_eq!(parse_dpkg_bloat(out), vec!["curl", "vim"]);
	}

	#[test]
	fn test_parse_name_lines() {
		assert_eq!(parse_name_lines("a\n\n b \n"), vec!["a", "b"]);
	}
}
