//! Inspection commands - files, why, info, history and versions of one package

use anyhow::{Context, Result};
use colored::*;

use crate::commands::ensure_installed;
use crate::config::{APT_HISTORY_LOG, PACMAN_LOG, RISK_TIMEOUT};
use crate::core::cve::{self, RiskLevel};
use crate::core::deps::{self, ReverseDeps};
use crate::core::history::{self, History};
use crate::core::{http, Manager};
use crate::ui::format::{self, TAB4, TAB8};
use crate::ui::spinner::{with_spinner, BRACKET_TICKS};
use crate::ui;

pub fn files(manager: Manager, package: &str) -> Result<()> {
	ensure_installed(manager, package)?;

	let files = deps::files(manager, package)?;
	if files.is_empty() {
		ui::warn(&format!("No files found for package '{}'.", package));
		return Ok(());
	}

	ui::header(&format!("Files installed by '{}':", package));
	for file in &files {
		println!("{}{}", TAB4, file);
	}
	println!();
	Ok(())
}

/// Tree prefix for a node at `depth`; the root has none
fn tree_prefix(depth: usize) -> String {
	match depth {
		0 => String::new(),
		d => format!("{}└─ ", TAB4.repeat(d - 1)),
	}
}

pub fn why(manager: Manager, package: &str) -> Result<()> {
	ensure_installed(manager, package)?;

	let reverse = ReverseDeps::load(manager)?;
	let tree = deps::walk_tree(package, |name| reverse.dependents(name));

	if tree.len() <= 1 {
		ui::info(&format!("Nothing depends on '{}'. It was installed explicitly or is an orphan.", package));
		return Ok(());
	}

	ui::header(&format!("Packages depending on '{}':", package));
	for (depth, name) in &tree {
		let name = if *depth == 0 { name.green().bold() } else { name.green() };
		println!("{}{}", tree_prefix(*depth), name);
	}
	println!();
	Ok(())
}

pub fn info(manager: Manager, package: &str) -> Result<()> {
	ensure_installed(manager, package)?;

	let Some(info) = deps::info(manager, package)? else {
		ui::warn(&format!("No information available for '{}'.", package));
		return Ok(());
	};

	ui::header("Package Information:");
	for (key, value) in &info.fields {
		println!("{} {}", format!("{}:", key).cyan(), value.white());
	}

	if !info.depends.is_empty() {
		println!("{}", "Depends On:".cyan());
		for dep in &info.depends {
			println!("  └─ {}", dep.green());
		}
	}
	println!();
	Ok(())
}

fn history_log(manager: Manager) -> &'static str {
	match manager {
		Manager::Pacman => PACMAN_LOG,
		Manager::Apt => APT_HISTORY_LOG,
	}
}

fn print_events(history: &History) {
	if history.events.is_empty() {
		ui::warn("No install or upgrade events found.");
		return;
	}

	for event in &history.events {
		println!(
			"{}{} {} on {}",
			TAB4,
			event.action.to_string().white().bold(),
			event.version.cyan(),
			event.time.yellow(),
		);
	}

	if let Some(command) = &history.command {
		println!("\n{}{}", TAB4, "Command used:".bright_white().bold());
		println!("{}{}", TAB8, command.magenta());
	}
}

fn print_version_tree(manager: Manager, package: &str, history: &History) {
	let steps = history::version_tree(manager, package, history);
	if steps.is_empty() {
		return;
	}
	let current = history::current_version(manager, package).unwrap_or_default();

	println!("\n{}", format!("{}Version Tree:", TAB4).bright_yellow().bold());
	for (i, step) in steps.iter().enumerate() {
		let branch = if i + 1 == steps.len() { "└─" } else { "├─" };
		let label = match &step.to {
			Some(to) => format!("{} -> {}", step.from, to),
			None => step.from.clone(),
		};
		let marker = if step.is_current(&current) { " (current)".green().bold().to_string() } else { String::new() };
		println!("{}{} {}{}", TAB8, branch, label.cyan(), marker);
	}
}

pub fn history(manager: Manager, package: &str) -> Result<()> {
	ensure_installed(manager, package)?;

	let log = history_log(manager);
	let history = history::history(manager, package, log).with_context(|| format!("Failed to read {}", log))?;

	ui::header(&format!("Package Version History for '{}':", package));
	print_events(&history);
	print_version_tree(manager, package, &history);
	println!();
	Ok(())
}

fn risk_color(risk: RiskLevel) -> Color {
	match risk {
		RiskLevel::Low => Color::Green,
		RiskLevel::Medium => Color::Yellow,
		RiskLevel::High => Color::Red,
		RiskLevel::Unknown => Color::White,
	}
}

pub fn versions(manager: Manager, package: &str, assess_risk: bool) -> Result<()> {
	let versions = history::available_versions(manager, package);
	if versions.is_empty() {
		ui::warn(&format!("No versions found for '{}'.", package));
		return Ok(());
	}

	ui::header(&format!("Available versions for '{}':", package));
	let width = format::max_width(versions.iter().map(String::as_str));

	if !assess_risk {
		for version in &versions {
			println!("{}{}", TAB4, version.cyan());
		}
		println!();
		return Ok(());
	}

	let client = http::client(RISK_TIMEOUT)?;
	for version in &versions {
		let (risk, count) = with_spinner(
			format!("Assessing {} {}", package, version),
			"    {spinner} {msg}",
			BRACKET_TICKS,
			|| cve::assess_risk(&client, package, version),
		);
		let detail = match risk {
			RiskLevel::Unknown => risk.to_string(),
			_ => format!("{} ({} CVEs)", risk, count),
		};
		println!("{}{}  {}", TAB4, format!("{:<width$}", version, width = width).cyan(), detail.color(risk_color(risk)));
	}
	println!();
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_tree_prefix() {
		assert_eq!(tree_prefix(0), "");
		assert_eq!(tree_prefix(1), "└─ ");
		assert_eq!(tree_prefix(3), "        └─ ");
	}

	#[test]
	fn test_history_log_per_manager() {
		assert_eq!(history_log(Manager::Pacman), "/var/log/pacman.log");
		assert_eq!(history_log(Manager::Apt), "/var/log/apt/history.log");
	}
}
