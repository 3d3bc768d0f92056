//! Package details, reverse dependencies and file lists

use anyhow::Result;
use std::collections::{HashMap, HashSet};

use crate::core::exec;
use crate::core::manager::Manager;
use crate::core::package::{parse_blocks, Block};

const PACMAN_INFO_FIELDS: &[&str] = &["Name", "Version", "Installed Size", "Install Date"];
const APT_INFO_FIELDS: &[&str] = &["Package", "Version", "Installed-Size", "Description"];

/// Selected fields of one package, in display order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageInfo {
	pub fields: Vec<(String, String)>,
	pub depends: Vec<String>,
}

fn list_or_empty(value: Option<&String>) -> Option<&str> {
	value.map(|v| v.trim()).filter(|v| !v.is_empty() && *v != "None")
}

/// `pacman -Qi PKG` -> info
pub fn parse_pacman_info(stdout: &str) -> Option<PackageInfo> {
	let block = parse_blocks(stdout).into_iter().next()?;
	let fields = select_fields(&block, PACMAN_INFO_FIELDS);
	let depends = list_or_empty(block.get("Depends On"))
		.map(|v| v.split_whitespace().map(str::to_string).collect())
		.unwrap_or_default();
	Some(PackageInfo { fields, depends })
}

/// First stanza of `apt-cache show PKG` -> info
pub fn parse_apt_info(stdout: &str) -> Option<PackageInfo> {
	let block = parse_blocks(stdout).into_iter().next()?;
	let mut fields = select_fields(&block, APT_INFO_FIELDS);
	if !fields.iter().any(|(k, _)| k == "Description") {
		if let Some(desc) = block.get("Description-en") {
			fields.push(("Description".to_string(), first_line(desc)));
		}
	}
	let depends = list_or_empty(block.get("Depends"))
		.map(|v| v.split(',').map(|d| d.trim().to_string()).filter(|d| !d.is_empty()).collect())
		.unwrap_or_default();
	Some(PackageInfo { fields, depends })
}

fn first_line(value: &str) -> String {
	value.lines().next().unwrap_or("").to_string()
}

fn select_fields(block: &Block, keys: &[&str]) -> Vec<(String, String)> {
	keys.iter()
		.filter_map(|key| block.get(*key).map(|v| (key.to_string(), first_line(v))))
		.collect()
}

pub fn info(manager: Manager, package: &str) -> Result<Option<PackageInfo>> {
	Ok(match manager {
		Manager::Pacman => parse_pacman_info(&exec::capture("pacman", &["-Qi", package])?.stdout),
		Manager::Apt => parse_apt_info(&exec::capture("apt-cache", &["show", package])?.stdout),
	})
}

/// Reverse dependency map from every `pacman -Qi` block's `Required By`
pub fn parse_pacman_required_by(stdout: &str) -> HashMap<String, Vec<String>> {
	parse_blocks(stdout)
		.into_iter()
		.filter_map(|block| {
			let name = block.get("Name")?.clone();
			let required = list_or_empty(block.get("Required By"))
				.map(|v| v.split_whitespace().map(str::to_string).collect())
				.unwrap_or_default();
			Some((name, required))
		})
		.collect()
}

/// `apt-cache rdepends --installed PKG` -> direct dependents of PKG
pub fn parse_apt_rdepends(stdout: &str, package: &str) -> Vec<String> {
	let mut seen = HashSet::new();
	stdout
		.lines()
		.map(|l| l.trim().trim_start_matches('|').trim())
		.filter(|l| !l.is_empty() && *l != package && !l.ends_with("Depends:"))
		.filter(|l| seen.insert(l.to_string()))
		.map(str::to_string)
		.collect()
}

/// Where reverse dependencies come from
pub enum ReverseDeps {
	/// Preloaded from a single `pacman -Qi`
	Map(HashMap<String, Vec<String>>),
	/// Queried per node with `apt-cache rdepends`
	AptLazy,
}

impl ReverseDeps {
	pub fn load(manager: Manager) -> Result<Self> {
		Ok(match manager {
			Manager::Pacman => ReverseDeps::Map(parse_pacman_required_by(&exec::capture("pacman", &["-Qi"])?.stdout)),
			Manager::Apt => ReverseDeps::AptLazy,
		})
	}

	pub fn dependents(&self, package: &str) -> Vec<String> {
		match self {
			ReverseDeps::Map(map) => map.get(package).cloned().unwrap_or_default(),
			ReverseDeps::AptLazy => {
				let stdout = exec::stdout_or_empty("apt-cache", &["rdepends", "--installed", package]);
				parse_apt_rdepends(&stdout, package)
			}
		}
	}
}

/// Depth-first walk from `root`; each node appears once, so cycles end
pub fn walk_tree(root: &str, mut dependents: impl FnMut(&str) -> Vec<String>) -> Vec<(usize, String)> {
	let mut visited = HashSet::new();
	let mut out = Vec::new();
	let mut stack = vec![(0usize, root.to_string())];

	while let Some((depth, name)) = stack.pop() {
		if !visited.insert(name.clone()) {
			continue;
		}
		let children = dependents(&name);
		out.push((depth, name));
		for child in children.into_iter().rev() {
			if !visited.contains(&child) {
				stack.push((depth + 1, child));
			}
		}
	}

	out
}

/// `pacman -Ql` prints `pkg /path`; `dpkg -L` prints bare paths
pub fn parse_file_list(stdout: &str, manager: Manager) -> Vec<String> {
	stdout
		.lines()
		.filter_map(|line| match manager {
			Manager::Pacman => line.split_once(' ').map(|(_, path)| path.trim()),
			Manager::Apt => Some(line.trim()),
		})
		.filter(|path| !path.is_empty())
		.map(str::to_string)
		.collect()
}

pub fn files(manager: Manager, package: &str) -> Result<Vec<String>> {
	let stdout = match manager {
		Manager::Pacman => exec::capture("pacman", &["-Ql", package])?.stdout,
		Manager::Apt => exec::capture("dpkg", &["-L", package])?.stdout,
	};
	Ok(parse_file_list(&stdout, manager))
}
