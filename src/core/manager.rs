//! Package manager detection and per-manager command lines

use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

use crate::core::exec;

#[derive(Debug, Error)]
pub enum ManagerError {
	#[error("No supported package manager found (apt/pacman).")]
	NotFound,
}

/// The two supported package manager families
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Manager {
	/// Debian, Ubuntu and derivatives (apt, dpkg)
	Apt,
	/// Arch, Manjaro and derivatives
	Pacman,
}

impl fmt::Display for Manager {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

impl Manager {
	/// Detects the system manager; apt wins when both are installed
	pub fn detect() -> Result<Self, ManagerError> {
		Self::detect_with(exec::has_program)
	}

	pub fn detect_with(available: impl Fn(&str) -> bool) -> Result<Self, ManagerError> {
		if available("apt") {
			Ok(Manager::Apt)
		} else if available("pacman") {
			Ok(Manager::Pacman)
		} else {
			Err(ManagerError::NotFound)
		}
	}

	/// Uses the explicit choice when given, otherwise detects
	pub fn resolve(choice: Option<Manager>) -> Result<Self, ManagerError> {
		match choice {
			Some(manager) => Ok(manager),
			None => Self::detect(),
		}
	}

	pub fn name(&self) -> &'static str {
		match self {
			Manager::Apt => "apt",
			Manager::Pacman => "pacman",
		}
	}

	/// Explicitly (user) installed package names
	pub fn user_packages(&self) -> HashSet<String> {
		let stdout = match self {
			Manager::Pacman => exec::stdout_or_empty("pacman", &["-Qe"]),
			Manager::Apt => exec::stdout_or_empty("apt-mark", &["showmanual"]),
		};
		parse_user_packages(&stdout)
	}

	pub fn package_exists(&self, package: &str) -> bool {
		let result = match self {
			Manager::Pacman => exec::capture("pacman", &["-Qi", package]),
			Manager::Apt => exec::capture("dpkg", &["-s", package]),
		};
		result.map(|out| out.success()).unwrap_or(false)
	}

	pub fn install_args(&self, package: &str) -> Vec<String> {
		match self {
			Manager::Apt => args(&["apt", "install", package, "-y"]),
			Manager::Pacman => args(&["pacman", "-S", package]),
		}
	}

	pub fn uninstall_args(&self, package: &str) -> Vec<String> {
		match self {
			Manager::Apt => args(&["apt", "remove", package, "-y"]),
			Manager::Pacman => args(&["pacman", "-R", package]),
		}
	}

	pub fn update_args(&self) -> Vec<String> {
		match self {
			Manager::Apt => args(&["apt", "update"]),
			Manager::Pacman => args(&["pacman", "-Sy"]),
		}
	}

	pub fn upgrade_args(&self) -> Vec<String> {
		match self {
			Manager::Apt => args(&["apt", "upgrade", "-y"]),
			Manager::Pacman => args(&["pacman", "-Syu"]),
		}
	}

	/// Cache cleanup commands, run in order
	pub fn clean_steps(&self) -> Vec<Vec<String>> {
		match self {
			Manager::Apt => vec![args(&["apt-get", "clean"]), args(&["apt-get", "autoremove", "-y"])],
			Manager::Pacman => vec![args(&["pacman", "-Scc", "--noconfirm"])],
		}
	}
}

fn args(parts: &[&str]) -> Vec<String> {
	parts.iter().map(|p| p.to_string()).collect()
}

/// First column of each non-empty line (`pacman -Qe` prints "name version",
/// `apt-mark showmanual` prints the bare name)
pub fn parse_user_packages(stdout: &str) -> HashSet<String> {
	stdout
		.lines()
		.filter_map(|line| line.split_whitespace().next())
		.map(str::to_string)
		.collect()
}
