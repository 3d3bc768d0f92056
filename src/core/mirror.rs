//! Mirror lists: discovery, probing and timestamped backups

use anyhow::{Context, Result};
use chrono::{DateTime, Local, NaiveDateTime};
use reqwest::blocking::Client;
use reqwest::header::LAST_MODIFIED;
use std::collections::HashSet;
use std::ffi::OsStr;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::config::{
	APT_SOURCES_DIR, APT_SOURCES_LIST, MIRROR_BACKUP_EXT, MIRROR_BACKUP_FORMAT, MIRROR_TEST_ARCH, MIRROR_TEST_REPO,
	OS_RELEASE, PACMAN_MIRRORLIST,
};
use crate::core::exec;
use crate::core::manager::Manager;

const FRIENDLY_BACKUP_FORMAT: &str = "%A, %d %B %Y at %I:%M:%S %p";
const URL_SCHEMES: &[&str] = &["http://", "https://", "ftp://"];

/// The file a manager reads its mirrors from
pub fn mirror_list_path(manager: Manager) -> &'static str {
	match manager {
		Manager::Apt => APT_SOURCES_LIST,
		Manager::Pacman => PACMAN_MIRRORLIST,
	}
}

fn is_url(token: &str) -> bool {
	URL_SCHEMES.iter().any(|scheme| token.starts_with(scheme))
}

/// One-line `deb [opts] URL suite components` entries
pub fn parse_sources_list(text: &str) -> Vec<String> {
	let mut urls = Vec::new();
	for line in text.lines().map(str::trim) {
		if !(line.starts_with("deb ") || line.starts_with("deb-src ")) {
			continue;
		}

		let mut in_options = false;
		for token in line.split_whitespace().skip(1) {
			if token.starts_with('[') {
				in_options = !token.ends_with(']');
				continue;
			}
			if in_options {
				in_options = !token.ends_with(']');
				continue;
			}
			if is_url(token) {
				urls.push(token.to_string());
			}
			break;
		}
	}
	urls
}

/// `URIs:` fields of deb822 `.sources` files
pub fn parse_deb822(text: &str) -> Vec<String> {
	text.lines()
		.filter_map(|line| line.trim().strip_prefix("URIs:"))
		.flat_map(|value| value.split_whitespace())
		.filter(|token| is_url(token))
		.map(str::to_string)
		.collect()
}

/// Uncommented `Server = URL` lines
pub fn parse_pacman_mirrorlist(text: &str) -> Vec<String> {
	text.lines()
		.map(str::trim)
		.filter(|line| !line.starts_with('#'))
		.filter_map(|line| {
			let (key, value) = line.split_once('=')?;
			(key.trim() == "Server").then(|| value.trim().to_string())
		})
		.filter(|url| !url.is_empty())
		.collect()
}

fn dedup(urls: Vec<String>) -> Vec<String> {
	let mut seen = HashSet::new();
	urls.into_iter().filter(|u| seen.insert(u.clone())).collect()
}

fn apt_mirrors(list: &Path, dir: &Path) -> Vec<String> {
	let mut urls = fs::read_to_string(list).map(|t| parse_sources_list(&t)).unwrap_or_default();

	let mut entries: Vec<PathBuf> = fs::read_dir(dir)
		.map(|rd| rd.filter_map(|e| e.ok()).map(|e| e.path()).collect())
		.unwrap_or_default();
	entries.sort();

	for path in entries {
		let Ok(text) = fs::read_to_string(&path) else {
			continue;
		};
		match path.extension().and_then(|e| e.to_str()) {
			Some("list") => urls.extend(parse_sources_list(&text)),
			Some("sources") => urls.extend(parse_deb822(&text)),
			_ => {}
		}
	}

	urls
}

pub fn mirrors(manager: Manager) -> Result<Vec<String>> {
	let urls = match manager {
		Manager::Apt => apt_mirrors(Path::new(APT_SOURCES_LIST), Path::new(APT_SOURCES_DIR)),
		Manager::Pacman => {
			let text = fs::read_to_string(PACMAN_MIRRORLIST)
				.with_context(|| format!("Failed to read {}", PACMAN_MIRRORLIST))?;
			parse_pacman_mirrorlist(&text)
		}
	};
	Ok(dedup(urls))
}

/// Fills pacman's `$repo`/`$arch` placeholders with a fixed test target
pub fn probe_url(url: &str) -> String {
	url.replace("$repo", MIRROR_TEST_REPO).replace("$arch", MIRROR_TEST_ARCH)
}

#[derive(Debug, Clone, PartialEq)]
pub enum MirrorStatus {
	Up { latency_ms: f64, last_modified: String },
	Unreachable,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MirrorProbe {
	pub url: String,
	pub status: MirrorStatus,
}

impl MirrorProbe {
	pub fn is_up(&self) -> bool {
		matches!(self.status, MirrorStatus::Up { .. })
	}
}

/// GETs the mirror; any transport error or non-success status is unreachable
pub fn probe(client: &Client, url: &str) -> MirrorProbe {
	let start = Instant::now();
	let status = match client.get(probe_url(url)).send().and_then(|r| r.error_for_status()) {
		Ok(response) => {
			let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
			let last_modified = response
				.headers()
				.get(LAST_MODIFIED)
				.and_then(|v| v.to_str().ok())
				.unwrap_or("N/A")
				.to_string();
			MirrorStatus::Up { latency_ms, last_modified }
		}
		Err(e) => {
			tracing::debug!("Mirror {} unreachable: {}", url, e);
			MirrorStatus::Unreachable
		}
	};
	MirrorProbe { url: url.to_string(), status }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Summary {
	AllUp,
	AllDown,
	Mixed { up: usize, down: usize },
}

pub fn summarize(probes: &[MirrorProbe]) -> Summary {
	let up = probes.iter().filter(|p| p.is_up()).count();
	let down = probes.len() - up;
	if down == 0 {
		Summary::AllUp
	} else if up == 0 {
		Summary::AllDown
	} else {
		Summary::Mixed { up, down }
	}
}

pub fn backup_file_name(now: DateTime<Local>) -> String {
	format!("{}.{}", now.format(MIRROR_BACKUP_FORMAT), MIRROR_BACKUP_EXT)
}

/// Copies `source` into `dir` under a timestamped name
pub fn create_backup(source: &Path, dir: &Path, now: DateTime<Local>) -> Result<PathBuf> {
	fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
	let target = dir.join(backup_file_name(now));
	fs::copy(source, &target).with_context(|| format!("Failed to copy {}", source.display()))?;
	Ok(target)
}

/// Backup files in `dir`, sorted by name (oldest first)
pub fn list_backups(dir: &Path) -> Vec<PathBuf> {
	let mut backups: Vec<PathBuf> = fs::read_dir(dir)
		.map(|rd| rd.filter_map(|e| e.ok()).map(|e| e.path()).filter(|p| p.is_file()).collect())
		.unwrap_or_default();
	backups.sort();
	backups
}

/// `Wednesday, 23 July 2025 at 02:15:00 PM` from the file name, else its mtime
pub fn friendly_backup_name(path: &Path) -> Option<String> {
	let from_name = path
		.file_stem()
		.and_then(|s| s.to_str())
		.and_then(|stem| NaiveDateTime::parse_from_str(stem, MIRROR_BACKUP_FORMAT).ok())
		.map(|dt| dt.format(FRIENDLY_BACKUP_FORMAT).to_string());

	from_name.or_else(|| {
		let modified = fs::metadata(path).and_then(|m| m.modified()).ok()?;
		Some(DateTime::<Local>::from(modified).format(FRIENDLY_BACKUP_FORMAT).to_string())
	})
}

/// Copies a backup over the live list, retrying with `sudo cp` when denied
pub fn restore_backup(backup: &Path, target: &Path) -> Result<()> {
	match fs::copy(backup, target) {
		Ok(_) => Ok(()),
		Err(e) if e.kind() == ErrorKind::PermissionDenied => {
			exec::run_privileged(&[OsStr::new("cp"), backup.as_os_str(), target.as_os_str()])
				.context("Failed to restore backup with sudo")?;
			Ok(())
		}
		Err(e) => Err(e).with_context(|| format!("Failed to write {}", target.display())),
	}
}

/// `VERSION_CODENAME` from os-release text, `stable` when absent
pub fn parse_codename(os_release: &str) -> String {
	os_release
		.lines()
		.filter_map(|line| line.strip_prefix("VERSION_CODENAME="))
		.map(|v| v.trim().trim_matches('"').to_string())
		.find(|v| !v.is_empty())
		.unwrap_or_else(|| "stable".to_string())
}

pub fn codename() -> String {
	parse_codename(&fs::read_to_string(OS_RELEASE).unwrap_or_default())
}

/// Tool that rewrites the mirror list for `manager`
pub fn ranking_tool(manager: Manager) -> &'static str {
	match manager {
		Manager::Apt => "netselect-apt",
		Manager::Pacman => "reflector",
	}
}

/// Privileged command that writes the fastest mirrors
pub fn ranking_command(manager: Manager, latest: &str, codename: &str) -> Vec<String> {
	let parts: Vec<&str> = match manager {
		Manager::Pacman => vec!["reflector", "--latest", latest, "--sort", "rate", "--save", PACMAN_MIRRORLIST],
		Manager::Apt => vec!["netselect-apt", "-n", "-o", APT_SOURCES_LIST, codename],
	};
	parts.into_iter().map(str::to_string).collect()
}
