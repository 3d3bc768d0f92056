//! Install, uninstall, update, upgrade and clean

use anyhow::{Context, Result};

use crate::core::{exec, Manager};
use crate::ui;

fn run_step(args: &[String], failure: &str) -> Result<()> {
	exec::run_privileged(args).context(failure.to_string())
}

pub fn install(manager: Manager, package: &str) -> Result<()> {
	ui::info(&format!("Using {} to install '{}'", manager, package));
	run_step(&manager.install_args(package), &format!("Failed to install '{}'", package))?;
	ui::success(&format!("Successfully installed '{}'", package));
	Ok(())
}

pub fn uninstall(manager: Manager, package: &str) -> Result<()> {
	ui::info(&format!("Using {} to uninstall '{}'", manager, package));
	run_step(&manager.uninstall_args(package), &format!("Failed to uninstall '{}'", package))?;
	ui::success(&format!("Successfully uninstalled '{}'", package));
	Ok(())
}

pub fn update(manager: Manager) -> Result<()> {
	ui::info(&format!("Using {} to update package lists", manager));
	run_step(&manager.update_args(), "Failed to update package lists")?;
	ui::success("Package lists updated successfully");
	Ok(())
}

pub fn upgrade(manager: Manager) -> Result<()> {
	ui::info(&format!("Using {} to upgrade packages", manager));
	run_step(&manager.upgrade_args(), "Failed to upgrade packages")?;
	ui::success("Packages upgraded successfully");
	Ok(())
}

pub fn clean(manager: Manager) -> Result<()> {
	ui::info(&format!("Cleaning {} package cache", manager));
	for step in manager.clean_steps() {
		run_step(&step, "Failed to clean the package cache")?;
	}
	ui::success(&format!("{} package cache cleaned", manager));
	Ok(())
}
