//! Repository search through `apt search` / `pacman -Ss`

use anyhow::{bail, Result};

use crate::core::exec;
use crate::core::manager::Manager;

const APT_BANNERS: &[&str] = &["Sorting...", "Full Text Search...", "Listing..."];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
	/// The raw name line, e.g. `extra/vim 9.1.0-1 [installed]`
	pub line: String,
	pub description: String,
}

impl SearchHit {
	pub fn package_name(&self, manager: Manager) -> &str {
		name_from_line(&self.line, manager)
	}

	/// Lines this hit takes on screen (name, `Description:` label and text)
	pub fn height(&self) -> usize {
		if self.description.is_empty() { 1 } else { 3 }
	}
}

/// `repo/name ver` (pacman) or `name/suite ver arch` (apt) -> `name`
pub fn name_from_line(line: &str, manager: Manager) -> &str {
	let token = line.split_whitespace().next().unwrap_or("");
	match (manager, token.split_once('/')) {
		(Manager::Pacman, Some((_, name))) => name,
		(Manager::Apt, Some((name, _))) => name,
		(_, None) => token,
	}
}

fn is_banner(line: &str) -> bool {
	APT_BANNERS.iter().any(|b| line.trim() == *b)
}

/// Pairs each name line with the indented description line that follows it
pub fn parse_search(stdout: &str) -> Vec<SearchHit> {
	let lines: Vec<&str> = stdout
		.lines()
		.map(str::trim_end)
		.filter(|l| !l.trim().is_empty() && !is_banner(l))
		.collect();

	let mut hits = Vec::new();
	let mut i = 0;
	while i < lines.len() {
		let line = lines[i];
		i += 1;
		if line.starts_with(char::is_whitespace) {
			continue;
		}

		let mut description = String::new();
		if let Some(next) = lines.get(i).filter(|l| l.starts_with(char::is_whitespace)) {
			description = next.trim().to_string();
			i += 1;
		}
		hits.push(SearchHit { line: line.to_string(), description });
	}

	hits
}

pub fn search(manager: Manager, term: &str) -> Result<Vec<SearchHit>> {
	let out = match manager {
		Manager::Apt => exec::capture("apt", &["search", term])?,
		Manager::Pacman => exec::capture("pacman", &["-Ss", term])?,
	};

	match (manager, out.code) {
		(_, Some(0)) => Ok(parse_search(&out.stdout)),
		(Manager::Pacman, Some(1)) => Ok(Vec::new()),
		_ => bail!("Search for '{}' failed: {}", term, out.stderr.trim()),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_parse_pacman_search() {
		let out = "\
extra/vim 9.1.0-1 [installed]
    Vi Improved, a highly configurable, improved version of the vi text editor
extra/vim-airline 0.11-5
    Lean & mean status/tabline for vim that's light as air
core/nodesc 1.0-1
";
		let hits = parse_search(out);
		assert_eq!(hits.len(), 3);
		assert_eq!(hits[0].package_name(Manager::Pacman), "vim");
		assert_eq!(hits[1].description, "Lean & mean status/tabline for vim that's light as air");
		assert_eq!(hits[2].description, "");
		assert_eq!(hits[2].height(), 1);
	}

	#[test]
	fn test_parse_apt_search_drops_banners() {
		let out = "\
Sorting...
Full Text Search...
vim/jammy-updates,jammy-security 2:8.2.3995-1ubuntu2.17 amd64 [installed]
  Vi IMproved - enhanced vi editor

vim-gtk3/jammy-updates 2:8.2.3995-1ubuntu2.17 amd64
  Vi IMproved - enhanced vi editor - with GTK3 GUI
";
		let hits = parse_search(out);
		assert_eq!(hits.len(), 2);
		assert_eq!(hits[0].package_name(Manager::Apt), "vim");
		assert_eq!(hits[1].package_name(Manager::Apt), "vim-gtk3");
		assert_eq!(hits[1].height(), 3);
	}

	#[test]
	fn test_name_from_line_without_slash() {
		assert_eq!(name_from_line("plain 1.0", Manager::Apt), "plain");
		assert_eq!(name_from_line("", Manager::Pacman), "");
	}
}
