//! Kernels command - remove old kernels, back up the running one

use anyhow::{bail, Context, Result};
use colored::*;
use std::ffi::OsStr;
use std::path::Path;

use crate::config::{BOOT_DIR, KERNEL_BACKUP_DIR};
use crate::core::{exec, kernel, Manager};
use crate::ui::format::TAB4;
use crate::ui::{self, prompt};

/// Privileged removal command for the listed kernels
fn removal_command(manager: Manager, kernels: &[String]) -> Vec<String> {
	match manager {
		Manager::Pacman => ["pacman", "-Rns"].iter().map(|s| s.to_string()).chain(kernels.iter().cloned()).collect(),
		Manager::Apt => ["apt-get", "autoremove", "--purge", "-y"].iter().map(|s| s.to_string()).collect(),
	}
}

pub fn cleanup(manager: Manager) -> Result<()> {
	let release = kernel::running_release()?;
	ui::info(&format!("Running kernel: {}", release));

	let candidates = match manager {
		Manager::Pacman => kernel::pacman_cleanup_candidates(&release),
		Manager::Apt => kernel::apt_cleanup_candidates(&release),
	};

	if candidates.is_empty() {
		ui::success("No old kernels to remove.");
		return Ok(());
	}

	ui::header("Kernels other than the running one");
	for name in &candidates {
		println!("{}{}", TAB4, name.yellow());
	}

	if !prompt::confirm("Remove these kernels?")? {
		ui::info("Cancelled");
		return Ok(());
	}

	exec::run_privileged(&removal_command(manager, &candidates)).context("Failed to remove old kernels")?;
	ui::success("Old kernels removed.");
	Ok(())
}

pub fn backup() -> Result<()> {
	let release = kernel::running_release()?;
	let image = kernel::kernel_image(Path::new(BOOT_DIR), &release);
	if !image.exists() {
		bail!("Kernel image not found: {}", image.display());
	}

	let target = kernel::backup_target(Path::new(KERNEL_BACKUP_DIR), &image, &release);
	if target.exists() && !prompt::confirm(&format!("{} already exists. Overwrite?", target.display()))? {
		ui::info("Cancelled");
		return Ok(());
	}

	exec::run_privileged(&["mkdir", "-p", KERNEL_BACKUP_DIR]).context("Failed to create the backup directory")?;
	exec::run_privileged(&[OsStr::new("cp"), image.as_os_str(), target.as_os_str()])
		.context("Failed to copy the kernel image")?;

	ui::success(&format!("Backed up {} to {}", image.display(), target.display()));
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_removal_command() {
		let kernels = vec!["linux-lts".to_string(), "linux-zen".to_string()];
		assert_eq!(removal_command(Manager::Pacman, &kernels), ["pacman", "-Rns", "linux-lts", "linux-zen"]);
		assert_eq!(removal_command(Manager::Apt, &kernels), ["apt-get", "autoremove", "--purge", "-y"]);
	}
}
