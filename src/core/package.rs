//! Installed package collection
//!
//! pacman reports everything through `pacman -Qi` blocks. apt needs two
//! sources: `dpkg-query` for names and sizes and the timestamps of the
//! `/var/lib/dpkg/info/<name>.list` files for install and update dates.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use std::collections::{HashMap, HashSet};
use std::os::unix::fs::MetadataExt;
use std::path::Path;

use crate::cli::SortKey;
use crate::config::DPKG_INFO_DIR;
use crate::core::exec;
use crate::core::manager::Manager;
use crate::ui;

/// How dates are shown in listings
pub const DISPLAY_DATE_FORMAT: &str = "%a %d %b %Y %I:%M:%S %p";

const SIZE_UNITS: &[(&str, u32)] = &[("B", 0), ("KiB", 1), ("MiB", 2), ("GiB", 3), ("TiB", 4)];

const OFFSET_FORMATS: &[&str] = &["%a %d %b %Y %I:%M:%S %p %z", "%a %d %b %Y %H:%M:%S %z"];

const LOCAL_FORMATS: &[&str] = &["%a %d %b %Y %I:%M:%S %p", "%a %d %b %Y %H:%M:%S", "%Y-%m-%d %H:%M:%S"];

#[derive(Debug, Clone, PartialEq)]
pub struct Package {
	pub name: String,
	pub size: Option<u64>,
	pub installed: Option<DateTime<Local>>,
	pub updated: Option<DateTime<Local>>,
	pub is_user: bool,
}

impl Package {
	pub fn size_text(&self) -> String {
		self.size.map(ui::format::format_size).unwrap_or_else(|| "N/A".to_string())
	}

	pub fn installed_text(&self) -> String {
		date_text(self.installed.as_ref())
	}

	pub fn updated_text(&self) -> String {
		date_text(self.updated.as_ref())
	}
}

pub fn date_text(date: Option<&DateTime<Local>>) -> String {
	date.map(|d| d.format(DISPLAY_DATE_FORMAT).to_string()).unwrap_or_else(|| "N/A".to_string())
}

/// Which side of the user/system split to keep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PackageFilter {
	#[default]
	All,
	User,
	System,
}

/// One `pacman -Qi` style block: field name to value, continuation lines joined
pub type Block = HashMap<String, String>;

/// Splits `Key : value` output into blank-line separated blocks.
///
/// Lines starting with whitespace continue the previous field (pacman wraps
/// long `Optional Deps` and `Required By` values this way).
pub fn parse_blocks(stdout: &str) -> Vec<Block> {
	let mut blocks = Vec::new();
	let mut current = Block::new();
	let mut last_key: Option<String> = None;

	for line in stdout.lines() {
		if line.trim().is_empty() {
			if !current.is_empty() {
				blocks.push(std::mem::take(&mut current));
			}
			last_key = None;
			continue;
		}

		if line.starts_with(char::is_whitespace) {
			if let Some(value) = last_key.as_ref().and_then(|k| current.get_mut(k)) {
				value.push('\n');
				value.push_str(line.trim());
			}
			continue;
		}

		if let Some((key, value)) = line.split_once(':') {
			let key = key.trim().to_string();
			current.insert(key.clone(), value.trim().to_string());
			last_key = Some(key);
		}
	}

	if !current.is_empty() {
		blocks.push(current);
	}

	blocks
}

/// Parses `12.34 MiB` into bytes
pub fn parse_size(text: &str) -> Option<u64> {
	let mut parts = text.split_whitespace();
	let value: f64 = parts.next()?.replace(',', ".").parse().ok()?;
	let unit = parts.next().unwrap_or("B");
	let exponent = SIZE_UNITS.iter().find(|(name, _)| *name == unit)?.1;
	Some((value * 1024f64.powi(exponent as i32)).round() as u64)
}

/// `+03` at the end of a date becomes `+0300`
fn normalize_offset(text: &str) -> String {
	if let Some((head, last)) = text.rsplit_once(' ') {
		let bytes = last.as_bytes();
		if bytes.len() == 3 && (bytes[0] == b'+' || bytes[0] == b'-') && bytes[1..].iter().all(u8::is_ascii_digit) {
			return format!("{} {}00", head, last);
		}
	}
	text.to_string()
}

/// Drops a trailing zone abbreviation such as `UTC` or `EEST`
fn strip_zone_name(text: &str) -> Option<&str> {
	let (head, last) = text.rsplit_once(' ')?;
	let is_zone = last.len() >= 2 && last.chars().all(|c| c.is_ascii_uppercase()) && last != "AM" && last != "PM";
	is_zone.then_some(head)
}

fn parse_local(text: &str) -> Option<DateTime<Local>> {
	LOCAL_FORMATS.iter().find_map(|fmt| {
		NaiveDateTime::parse_from_str(text, fmt).ok().and_then(|naive| Local.from_local_datetime(&naive).earliest())
	})
}

/// Parses a package date as printed by pacman or written by pactool
pub fn parse_date(text: &str) -> Option<DateTime<Local>> {
	let text = normalize_offset(text.trim());

	let with_offset = OFFSET_FORMATS
		.iter()
		.find_map(|fmt| DateTime::parse_from_str(&text, fmt).ok())
		.map(|d| d.with_timezone(&Local));

	with_offset.or_else(|| parse_local(&text)).or_else(|| strip_zone_name(&text).and_then(parse_local))
}

fn parse_date_logged(text: &str) -> Option<DateTime<Local>> {
	let parsed = parse_date(text);
	if parsed.is_none() {
		tracing::error!("Failed to parse date ({})", text);
		ui::debug(&format!("Failed to parse date ({})", text));
	}
	parsed
}

/// Builds packages from `pacman -Qi` output
pub fn parse_pacman_packages(stdout: &str) -> Vec<Package> {
	parse_blocks(stdout)
		.into_iter()
		.filter_map(|block| {
			let name = block.get("Name")?.clone();
			let size = block.get("Installed Size").and_then(|s| parse_size(s));
			let date = block.get("Install Date").and_then(|d| parse_date_logged(d));
			Some(Package { name, size, installed: date, updated: date, is_user: false })
		})
		.collect()
}

/// One `dpkg-query` line: binary name (possibly `name:arch`) and size in KiB
pub fn parse_dpkg_line(line: &str) -> Option<(String, u64)> {
	let mut parts = line.split_whitespace();
	let name = parts.next()?.to_string();
	let kib: u64 = parts.next()?.parse().ok()?;
	Some((name, kib))
}

/// `libc6:amd64` -> `libc6`
pub fn strip_arch(name: &str) -> &str {
	name.split_once(':').map(|(base, _)| base).unwrap_or(name)
}

fn file_times(path: &Path) -> (Option<DateTime<Local>>, Option<DateTime<Local>>) {
	match std::fs::metadata(path) {
		Ok(meta) => (
			Local.timestamp_opt(meta.ctime(), 0).single(),
			Local.timestamp_opt(meta.mtime(), 0).single(),
		),
		Err(_) => (None, None),
	}
}

/// Builds packages from `dpkg-query` output, dating each from its file list
pub fn parse_apt_packages(stdout: &str, info_dir: &Path) -> Vec<Package> {
	stdout
		.lines()
		.filter_map(parse_dpkg_line)
		.map(|(binary, kib)| {
			let (installed, updated) = file_times(&info_dir.join(format!("{}.list", binary)));
			Package {
				name: strip_arch(&binary).to_string(),
				size: Some(kib * 1024),
				installed,
				updated,
				is_user: false,
			}
		})
		.collect()
}

/// Every installed package, tagged user/system
pub fn collect(manager: Manager) -> Result<Vec<Package>> {
	let mut packages = match manager {
		Manager::Pacman => {
			let out = exec::capture("pacman", &["-Qi"])?;
			if !out.success() {
				bail!("pacman -Qi failed: {}", out.stderr.trim());
			}
			parse_pacman_packages(&out.stdout)
		}
		Manager::Apt => {
			let out = exec::capture("dpkg-query", &["-W", "--showformat=${binary:Package} ${Installed-Size}\\n"])
				.context("Failed to query dpkg")?;
			if !out.success() {
				bail!("dpkg-query failed: {}", out.stderr.trim());
			}
			parse_apt_packages(&out.stdout, Path::new(DPKG_INFO_DIR))
		}
	};

	tag_user_packages(&mut packages, &manager.user_packages());
	Ok(packages)
}

pub fn tag_user_packages(packages: &mut [Package], user: &HashSet<String>) {
	for pkg in packages.iter_mut() {
		pkg.is_user = user.contains(&pkg.name);
	}
}

pub fn filter_packages(packages: Vec<Package>, filter: PackageFilter) -> Vec<Package> {
	match filter {
		PackageFilter::All => packages,
		PackageFilter::User => packages.into_iter().filter(|p| p.is_user).collect(),
		PackageFilter::System => packages.into_iter().filter(|p| !p.is_user).collect(),
	}
}

/// Ascending sort; missing sizes and dates come first
pub fn sort_packages(packages: &mut [Package], key: SortKey, reverse: bool) {
	match key {
		SortKey::Name => packages.sort_by_key(|p| p.name.to_lowercase()),
		SortKey::Size => packages.sort_by_key(|p| p.size),
		SortKey::InstallDate => packages.sort_by_key(|p| p.installed),
		SortKey::UpdateDate => packages.sort_by_key(|p| p.updated),
		SortKey::Type => packages.sort_by_key(|p| (!p.is_user, p.name.to_lowercase())),
	}
	if reverse {
		packages.reverse();
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::Datelike;

	const PACMAN_QI: &str = "\
Name            : bash
Version         : 5.2.026-2
Installed Size  : 9.25 MiB
Install Date    : Tue 18 Jun 2024 10:15:32 AM +03
Optional Deps   : bash-completion: for tab completion
                  sh: shell [installed]

Name            : firefox
Version         : 128.0-1
Installed Size  : 245.10 MiB
Install Date    : Wed 10 Jul 2024 09:01:02 PM EEST

Name            : zlib
Installed Size  : 512.00 KiB
Install Date    : not a date
";

	fn pkg(name: &str, size: Option<u64>, is_user: bool) -> Package {
		Package { name: name.to_string(), size, installed: None, updated: None, is_user }
	}

	#[test]
	fn test_parse_blocks_continuations() {
		let blocks = parse_blocks(PACMAN_QI);
		assert_eq!(blocks.len(), 3);
		assert_eq!(blocks[0]["Name"], "bash");
		assert_eq!(blocks[0]["Optional Deps"], "bash-completion: for tab completion\nsh: shell [installed]");
	}

	#[test]
	fn test_parse_size_units() {
		assert_eq!(parse_size("512.00 B"), Some(512));
		assert_eq!(parse_size("1.50 KiB"), Some(1536));
		assert_eq!(parse_size("2.00 MiB"), Some(2 * 1024 * 1024));
		assert_eq!(parse_size("1.00 TiB"), Some(1u64 << 40));
		assert_eq!(parse_size("lots"), None);
		assert_eq!(parse_size("3 parsecs"), None);
	}

	#[test]
	fn test_parse_date_formats() {
		let bare = parse_date("Tue 18 Jun 2024 10:15:32 AM +03").unwrap();
		assert_eq!(bare.with_timezone(&chrono::Utc).format("%H:%M").to_string(), "07:15");

		let full = parse_date("Tue 18 Jun 2024 10:15:32 +0200").unwrap();
		assert_eq!(full.with_timezone(&chrono::Utc).format("%H:%M").to_string(), "08:15");

		let zone = parse_date("Wed 10 Jul 2024 09:01:02 PM EEST").unwrap();
		assert_eq!(zone.format("%Y-%m-%d %H:%M:%S").to_string(), "2024-07-10 21:01:02");

		let plain = parse_date("2023-01-05 08:00:00").unwrap();
		assert_eq!(plain.year(), 2023);

		assert!(parse_date("yesterday").is_none());
	}

	#[test]
	fn test_parse_pacman_packages() {
		let packages = parse_pacman_packages(PACMAN_QI);
		assert_eq!(packages.len(), 3);
		assert_eq!(packages[0].name, "bash");
		assert_eq!(packages[0].size, parse_size("9.25 MiB"));
		assert!(packages[0].installed.is_some());
		assert_eq!(packages[0].installed, packages[0].updated);
		assert!(packages[2].installed.is_none());
		assert_eq!(packages[2].installed_text(), "N/A");
	}

	#[test]
	fn test_parse_apt_packages() {
		let dir = tempfile::tempdir().unwrap();
		std::fs::write(dir.path().join("libc6:amd64.list"), "/lib\n").unwrap();

		let out = "libc6:amd64 13050\ncurl 500\nbroken line\n";
		let packages = parse_apt_packages(out, dir.path());
		assert_eq!(packages.len(), 2);
		assert_eq!(packages[0].name, "libc6");
		assert_eq!(packages[0].size, Some(13050 * 1024));
		assert!(packages[0].installed.is_some());
		assert!(packages[1].updated.is_none());
		assert_eq!(packages[1].updated_text(), "N/A");
	}

	#[test]
	fn test_filter_and_tag() {
		let mut packages = vec![pkg("vim", None, false), pkg("glibc", None, false)];
		let user: HashSet<String> = ["vim".to_string()].into_iter().collect();
		tag_user_packages(&mut packages, &user);

		let users = filter_packages(packages.clone(), PackageFilter::User);
		assert_eq!(users.len(), 1);
		assert_eq!(users[0].name, "vim");

		let system = filter_packages(packages, PackageFilter::System);
		assert_eq!(system[0].name, "glibc");
	}

	#[test]
	fn test_sort_by_size_missing_first() {
		let mut packages = vec![pkg("a", Some(10), false), pkg("b", None, false), pkg("c", Some(2 << 20), false)];
		sort_packages(&mut packages, SortKey::Size, false);
		let names: Vec<_> = packages.iter().map(|p| p.name.as_str()).collect();
		assert_eq!(names, ["b", "a", "c"]);

		sort_packages(&mut packages, SortKey::Size, true);
		assert_eq!(packages[0].name, "c");
	}

	#[test]
	fn test_sort_by_name_ignores_case() {
		let mut packages = vec![pkg("b", None, false), pkg("A", None, false), pkg("c", None, false)];
		sort_packages(&mut packages, SortKey::Name, false);
		let names: Vec<_> = packages.iter().map(|p| p.name.as_str()).collect();
		assert_eq!(names, ["A", "b", "c"]);
	}

	#[test]
	fn test_sort_by_dates_missing_first() {
		let day = |d: u32| Local.with_ymd_and_hms(2024, 6, d, 12, 0, 0).single();
		let mut packages = vec![pkg("A", None, false), pkg("b", None, false), pkg("c", None, false)];
		packages[1].installed = day(20);
		packages[2].installed = day(5);
		packages[1].updated = day(3);
		packages[2].updated = day(25);

		sort_packages(&mut packages, SortKey::InstallDate, false);
		let names: Vec<_> = packages.iter().map(|p| p.name.as_str()).collect();
		assert_eq!(names, ["A", "c", "b"]);

		sort_packages(&mut packages, SortKey::UpdateDate, false);
		let names: Vec<_> = packages.iter().map(|p| p.name.as_str()).collect();
		assert_eq!(names, ["A", "b", "c"]);

		sort_packages(&mut packages, SortKey::UpdateDate, true);
		assert_eq!(packages[0].name, "c");
	}

	#[test]
	fn test_sort_by_type_users_first() {
		let mut packages = vec![pkg("Zsh", None, true), pkg("bash", None, false), pkg("alacritty", None, true)];
		sort_packages(&mut packages, SortKey::Type, false);
		let names: Vec<_> = packages.iter().map(|p| p.name.as_str()).collect();
		assert_eq!(names, ["alacritty", "Zsh", "bash"]);
	}
}
