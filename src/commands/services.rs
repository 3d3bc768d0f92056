//! Services command - list, status and journal

use anyhow::{bail, Result};
use colored::*;
use std::path::Path;

use crate::config::INIT_D_DIR;
use crate::core::service::{self, Service};
use crate::ui::format::{self, max_width, TAB4};
use crate::ui::{self, Pager};

pub fn list() -> Result<()> {
	let Some(services) = service::list(Path::new(INIT_D_DIR))? else {
		bail!("No service manager found (systemd or /etc/init.d).");
	};

	if services.is_empty() {
		ui::warn("No services found.");
		return Ok(());
	}

	let width = max_width(services.iter().map(|s| s.name.as_str()));
	ui::header("Services");

	Pager::packages().run(&services, None, |_| 1, |page, start, page_no, total| {
		if total > 1 {
			println!("{}\n", format::heading(&format!("Page {} of {}", page_no, total)));
		}
		for (i, Service { name, state }) in page.iter().enumerate() {
			println!(
				"{}{} {}  {}",
				TAB4,
				format!("{:<4}", start + i + 1).bold(),
				format!("{:<width$}", name, width = width).white(),
				state.color(service::state_color(state)).bold(),
			);
		}
	})?;

	Ok(())
}

fn print_colored(text: &str, color_of: impl Fn(&str) -> Option<Color>) {
	for line in text.lines() {
		match color_of(line) {
			Some(color) => println!("{}", line.color(color)),
			None => println!("{}", line),
		}
	}
}

pub fn info(name: &str) -> Result<()> {
	let Some(status) = service::status(name)? else {
		bail!("Service '{}' not found.", name);
	};

	ui::header(&format!("Status of '{}'", name));
	print_colored(&status, service::status_line_color);
	println!();
	Ok(())
}

pub fn logs(name: &str, lines: usize) -> Result<()> {
	let Some(logs) = service::logs(name, lines)? else {
		ui::warn(&format!("No logs found for '{}'.", name));
		return Ok(());
	};

	ui::header(&format!("Last {} log entries of '{}'", lines, name));
	print_colored(&logs, service::log_line_color);
	println!();
	Ok(())
}
