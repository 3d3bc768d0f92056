//! About command

use colored::*;

use crate::config::{DESCRIPTION, RELEASE_DATE};
use crate::ui::format::{TAB4, TAB8};
use crate::ui;

const FEATURES: &[&str] = &[
	"Package listing with pagination, sorting and user/system filters",
	"Search, install, uninstall, update and upgrade packages",
	"Mirror management: test, rank, back up and revert mirror lists",
	"Kernel utilities: remove old kernels and back up the running one",
	"Vulnerability checks (CVEs) and security package overview",
];

const USAGE: &[&str] = &["pactool list --sort size --reverse", "pactool search firefox", "pactool upgrade"];

fn section(title: &str, lines: &[&str]) {
	println!("{}{}", TAB4, title.bright_white().bold());
	for line in lines {
		println!("{}{}", TAB8, line);
	}
	println!();
}

pub fn run() {
	ui::print_logo();
	println!();

	let features: Vec<String> = FEATURES.iter().map(|f| format!("- {}", f)).collect();
	let features: Vec<&str> = features.iter().map(String::as_str).collect();
	let version = format!("Release {}", env!("CARGO_PKG_VERSION"));
	let released = format!("Released on {}", RELEASE_DATE);

	section("What is pactool?", &[DESCRIPTION, "Supports Arch Linux, Manjaro, Debian, Ubuntu and derivatives."]);
	section("Key Features:", &features);
	section("Basic Usage:", USAGE);
	section("Author:", &[env!("CARGO_PKG_AUTHORS")]);
	section("Version:", &[version.as_str(), released.as_str()]);
}
