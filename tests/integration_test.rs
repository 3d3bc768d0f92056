// Integration tests for pactool

use assert_cmd::Command;
use chrono::Local;
use predicates::prelude::*;
use std::fs;

fn pactool(cache: &tempfile::TempDir) -> Command {
	let mut cmd = Command::cargo_bin("pactool").unwrap();
	cmd.env("PACTOOL_CACHE_DIR", cache.path()).env_remove("PACTOOL_MANAGER").env("NO_COLOR", "1");
	cmd
}

#[test]
fn test_help_display() {
	let cache = tempfile::tempdir().unwrap();
	pactool(&cache)
		.arg("--help")
		.assert()
		.success()
		.stdout(predicate::str::contains("list").and(predicate::str::contains("mirrors")).and(predicate::str::contains("security")));
}

#[test]
fn test_version_display() {
	let cache = tempfile::tempdir().unwrap();
	pactool(&cache)
		.arg("--version")
		.assert()
		.success()
		.stdout(predicate::str::contains("pactool").and(predicate::str::contains(env!("CARGO_PKG_VERSION"))));
}

#[test]
fn test_no_arguments_prints_help() {
	let cache = tempfile::tempdir().unwrap();
	pactool(&cache).assert().success().stdout(predicate::str::contains("Usage"));
}

#[test]
fn test_about() {
	let cache = tempfile::tempdir().unwrap();
	pactool(&cache)
		.arg("about")
		.assert()
		.success()
		.stdout(predicate::str::contains("Key Features").and(predicate::str::contains("Released on")));
}

#[test]
fn test_unknown_subcommand_is_usage_error() {
	let cache = tempfile::tempdir().unwrap();
	pactool(&cache).arg("frobnicate").assert().code(2);
}

#[test]
fn test_user_and_system_conflict() {
	let cache = tempfile::tempdir().unwrap();
	pactool(&cache).args(["list", "--user", "--system"]).assert().code(2);
}

#[test]
fn test_unknown_manager_rejected() {
	let cache = tempfile::tempdir().unwrap();
	pactool(&cache).args(["--manager", "dnf", "update"]).assert().code(2);
}

#[test]
fn test_dry_run_install_prints_command() {
	let cache = tempfile::tempdir().unwrap();
	pactool(&cache)
		.args(["--dry-run", "--manager", "pacman", "install", "htop"])
		.assert()
		.success()
		.stdout(predicate::str::contains("[dry-run] sudo pacman -S htop"));
}

#[test]
fn test_dry_run_clean_runs_every_step() {
	let cache = tempfile::tempdir().unwrap();
	pactool(&cache)
		.args(["--dry-run", "--manager", "apt", "clean"])
		.assert()
		.success()
		.stdout(
			predicate::str::contains("[dry-run] sudo apt-get clean")
				.and(predicate::str::contains("[dry-run] sudo apt-get autoremove -y")),
		);
}

#[test]
fn test_log_file_written_to_cache_dir() {
	let cache = tempfile::tempdir().unwrap();
	pactool(&cache).args(["--dry-run", "--manager", "apt", "update"]).assert().success();

	let log = cache.path().join("logs").join(format!("{}.log", Local::now().format("%Y-%m-%d")));
	let text = fs::read_to_string(log).unwrap();
	assert!(text.contains("Package lists updated successfully"));
}

#[test]
fn test_mirror_revert_without_backups() {
	let cache = tempfile::tempdir().unwrap();
	pactool(&cache)
		.args(["--manager", "pacman", "mirrors", "revert"])
		.assert()
		.success()
		.stdout(predicate::str::contains("No mirror backups found"));
}

#[test]
fn test_mirror_revert_lists_backups_and_cancels() {
	let cache = tempfile::tempdir().unwrap();
	let backups = cache.path().join("mirrors");
	fs::create_dir_all(&backups).unwrap();
	fs::write(backups.join("2025-07-23_14-15-00.list"), "Server = https://mirror.example/$repo/os/$arch\n").unwrap();

	pactool(&cache)
		.args(["--manager", "pacman", "mirrors", "revert"])
		.write_stdin("\n")
		.assert()
		.success()
		.stdout(
			predicate::str::contains("Wednesday, 23 July 2025 at 02:15:00 PM")
				.and(predicate::str::contains("Cancelled")),
		);
}

#[test]
fn test_no_manager_exits_one() {
	let cache = tempfile::tempdir().unwrap();
	let empty_bin = tempfile::tempdir().unwrap();
	pactool(&cache)
		.env("PATH", empty_bin.path())
		.arg("list")
		.assert()
		.code(1)
		.stderr(predicate::str::contains("No supported package manager found (apt/pacman)."));

	let log = cache.path().join("logs").join(format!("{}.log", Local::now().format("%Y-%m-%d")));
	let text = fs::read_to_string(log).unwrap();
	assert!(text.contains("ERROR") && text.contains("No supported package manager found"));
}
