//! Bloat, unused and outdated package reports

use anyhow::Result;
use colored::*;
use std::collections::HashSet;

use crate::core::updates::{self, OutdatedPackage};
use crate::core::Manager;
use crate::ui::format::{self, max_width};
use crate::ui::{self, Pager};

/// Numbered name list colored by user/system, paged
fn print_names(names: &[String], limit: Option<usize>, user: &HashSet<String>) -> Result<()> {
	let index_width = names.len().to_string().len();

	Pager::packages().run(names, limit, |_| 1, |page, start, _, _| {
		for (i, name) in page.iter().enumerate() {
			let index = format!("{:>width$}", start + i + 1, width = index_width);
			println!("  {}. {}", index.white().bold(), format::package_name(name, user.contains(name)));
		}
	})?;
	Ok(())
}

pub fn bloat(manager: Manager, limit: Option<usize>) -> Result<()> {
	ui::header("Analyzing for bloat (packages carrying optional dependencies)");

	let names = updates::bloat(manager);
	if names.is_empty() {
		ui::success("No bloat detected.");
		return Ok(());
	}

	println!("{}\n", "Packages with optional dependencies:".yellow());
	print_names(&names, limit, &manager.user_packages())?;
	println!();
	Ok(())
}

pub fn unused(manager: Manager, limit: Option<usize>) -> Result<()> {
	ui::header("Finding unused (orphan) packages");

	let names = updates::unused(manager);
	if names.is_empty() {
		ui::success("No unused packages found.");
		return Ok(());
	}

	println!("{}\n", "Unused packages:".yellow());
	print_names(&names, limit, &HashSet::new())?;
	println!();
	Ok(())
}

struct OutdatedColumns {
	index: usize,
	name: usize,
	current: usize,
}

fn print_outdated(index: usize, pkg: &OutdatedPackage, columns: &OutdatedColumns, user: &HashSet<String>) {
	println!(
		"  {}. {} {} -> {}",
		format!("{:>width$}", index, width = columns.index).white().bold(),
		format::package_name(&format!("{:<width$}", pkg.name, width = columns.name), user.contains(&pkg.name)),
		format!("{:<width$}", pkg.current, width = columns.current).cyan(),
		pkg.candidate.yellow(),
	);
}

pub fn outdated(manager: Manager, limit: Option<usize>) -> Result<()> {
	ui::header("Checking for outdated packages");

	let packages = updates::outdated(manager)?;
	if packages.is_empty() {
		ui::success("All packages are up-to-date.");
		return Ok(());
	}

	let columns = OutdatedColumns {
		index: packages.len().to_string().len(),
		name: max_width(packages.iter().map(|p| p.name.as_str())),
		current: max_width(packages.iter().map(|p| p.current.as_str())),
	};
	let user = manager.user_packages();

	println!("{}\n", format::heading("Outdated Packages:"));
	Pager::packages().run(&packages, limit, |_| 1, |page, start, _, _| {
		for (i, pkg) in page.iter().enumerate() {
			print_outdated(start + i + 1, pkg, &columns, &user);
		}
	})?;
	println!();
	Ok(())
}
