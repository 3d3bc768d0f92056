//! Mirrors command - test, rank, back up and restore the mirror list

use anyhow::{Context, Result};
use chrono::Local;
use colored::*;
use std::path::{Path, PathBuf};

use crate::config::{self, MIRROR_TIMEOUT, REFLECTOR_LATEST};
use crate::core::mirror::{self, MirrorProbe, MirrorStatus, Summary};
use crate::core::{exec, http, Manager};
use crate::ui::format::TAB4;
use crate::ui::spinner::{with_spinner, BAR_TICKS};
use crate::ui::{self, prompt};

fn backup_dir() -> Result<PathBuf> {
	config::mirror_backup_dir().context("No cache directory available for mirror backups")
}

fn print_probe(probe: &MirrorProbe) {
	match &probe.status {
		MirrorStatus::Up { latency_ms, last_modified } => println!(
			"{}{} {}  {}  Last-Modified: {}",
			TAB4,
			"✔".green().bold(),
			probe.url.white(),
			format!("{:.0} ms", latency_ms).cyan(),
			last_modified.yellow(),
		),
		MirrorStatus::Unreachable => {
			println!("{}{} {}  {}", TAB4, "✘".red().bold(), probe.url.white(), "Unreachable".red())
		}
	}
}

pub fn show(manager: Manager) -> Result<()> {
	let urls = mirror::mirrors(manager)?;
	if urls.is_empty() {
		ui::warn(&format!("No mirrors configured in {}", mirror::mirror_list_path(manager)));
		return Ok(());
	}

	ui::header(&format!("Testing {} mirrors", urls.len()));
	let client = http::client(MIRROR_TIMEOUT)?;

	let mut probes = Vec::with_capacity(urls.len());
	for url in &urls {
		let probe = with_spinner(format!("Testing {}", url), "    [{spinner}] {msg}", BAR_TICKS, || {
			mirror::probe(&client, url)
		});
		print_probe(&probe);
		probes.push(probe);
	}
	println!();

	match mirror::summarize(&probes) {
		Summary::AllUp => ui::success("All mirrors are up."),
		Summary::AllDown => ui::error("All mirrors are down."),
		Summary::Mixed { up, down } => ui::warn(&format!("{} up and {} down.", up, down)),
	}
	Ok(())
}

pub fn backup(manager: Manager) -> Result<()> {
	let source = mirror::mirror_list_path(manager);
	let target = mirror::create_backup(Path::new(source), &backup_dir()?, Local::now())?;
	ui::success(&format!("Backed up {} to {}", source, target.display()));
	Ok(())
}

/// 1-based ID typed by the user -> index into the backup list
fn parse_choice(answer: &str, count: usize) -> Option<usize> {
	answer.trim().parse::<usize>().ok().filter(|id| (1..=count).contains(id)).map(|id| id - 1)
}

pub fn revert(manager: Manager) -> Result<()> {
	let backups = mirror::list_backups(&backup_dir()?);
	if backups.is_empty() {
		ui::warn("No mirror backups found. Create one with 'pactool mirrors backup'.");
		return Ok(());
	}

	ui::header("Mirror backups");
	for (i, path) in backups.iter().enumerate() {
		let name = mirror::friendly_backup_name(path).unwrap_or_else(|| "(Unrecognised Backup)".to_string());
		println!("{}[{}] {}  {}", TAB4, (i + 1).to_string().bold(), name.yellow(), path.display().to_string().dimmed());
	}

	let Some(answer) = prompt::read_line(&format!("\n{} ", "Backup ID to restore (enter to cancel) >".yellow()))? else {
		return Ok(());
	};
	if answer.is_empty() {
		ui::info("Cancelled");
		return Ok(());
	}
	let Some(index) = parse_choice(&answer, backups.len()) else {
		ui::warn(&format!("Invalid backup ID '{}'", answer));
		return Ok(());
	};

	let target = mirror::mirror_list_path(manager);
	mirror::restore_backup(&backups[index], Path::new(target))?;
	ui::success(&format!("Restored {} from {}", target, backups[index].display()));

	if prompt::confirm("Test the restored mirrors now?")? {
		show(manager)?;
	}
	Ok(())
}

pub fn update(manager: Manager) -> Result<()> {
	let tool = mirror::ranking_tool(manager);
	if !exec::has_program(tool) {
		ui::warn(&format!("'{}' is required to rank mirrors but is not installed.", tool));
		if !prompt::confirm(&format!("Install {} now?", tool))? {
			return Ok(());
		}
		exec::run_privileged(&manager.install_args(tool)).with_context(|| format!("Failed to install {}", tool))?;
	}

	backup(manager)?;

	ui::info(&format!("Ranking mirrors with {}", tool));
	let command = mirror::ranking_command(manager, REFLECTOR_LATEST, &mirror::codename());
	exec::run_privileged(&command).context("Failed to update the mirror list")?;
	ui::success(&format!("Mirror list updated: {}", mirror::mirror_list_path(manager)));
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_parse_choice() {
		assert_eq!(parse_choice("1", 3), Some(0));
		assert_eq!(parse_choice(" 3 ", 3), Some(2));
		assert_eq!(parse_choice("0", 3), None);
		assert_eq!(parse_choice("4", 3), None);
		assert_eq!(parse_choice("latest", 3), None);
	}
}
