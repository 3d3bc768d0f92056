//! Subprocess execution

use std::ffi::OsStr;
use std::process::{Command, Stdio};
use thiserror::Error;

use crate::config;
use crate::ui;

#[derive(Debug, Error)]
pub enum ExecError {
	#[error("failed to run '{program}': {source}")]
	Spawn {
		program: String,
		#[source]
		source: std::io::Error,
	},

	#[error("'{command}' exited with status {code}")]
	Failed { command: String, code: i32 },
}

/// Captured result of a finished command
#[derive(Debug, Clone, Default)]
pub struct Captured {
	pub code: Option<i32>,
	pub stdout: String,
	pub stderr: String,
}

impl Captured {
	pub fn success(&self) -> bool {
		self.code == Some(0)
	}
}

fn command_line<S: AsRef<OsStr>>(program: &str, args: &[S]) -> String {
	let mut line = program.to_string();
	for arg in args {
		line.push(' ');
		line.push_str(&arg.as_ref().to_string_lossy());
	}
	line
}

/// Runs a read-only query and captures its output. A non-zero exit is not an
/// error here; callers inspect `code`.
pub fn capture<S: AsRef<OsStr>>(program: &str, args: &[S]) -> Result<Captured, ExecError> {
	ui::debug(&format!("Running: {}", command_line(program, args)));

	let output = Command::new(program)
		.args(args)
		.stdin(Stdio::null())
		.output()
		.map_err(|source| ExecError::Spawn { program: program.to_string(), source })?;

	Ok(Captured {
		code: output.status.code(),
		stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
		stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
	})
}

/// Captured stdout, or an empty string when the program is missing
pub fn stdout_or_empty<S: AsRef<OsStr>>(program: &str, args: &[S]) -> String {
	match capture(program, args) {
		Ok(out) => out.stdout,
		Err(e) => {
			ui::debug(&e.to_string());
			String::new()
		}
	}
}

/// Runs `sudo <args>` attached to the terminal so the user sees prompts.
///
/// Under `--dry-run` the command line is printed instead.
pub fn run_privileged<S: AsRef<OsStr>>(args: &[S]) -> Result<(), ExecError> {
	privileged(args, false)
}

/// Like `run_privileged` with output discarded
pub fn run_privileged_quiet<S: AsRef<OsStr>>(args: &[S]) -> Result<(), ExecError> {
	privileged(args, true)
}

fn privileged<S: AsRef<OsStr>>(args: &[S], quiet: bool) -> Result<(), ExecError> {
	let line = command_line("sudo", args);

	if config::is_dry_run() {
		ui::info(&format!("[dry-run] {}", line));
		return Ok(());
	}

	tracing::info!("Running: {}", line);

	let mut command = Command::new("sudo");
	command.args(args);
	if quiet {
		command.stdout(Stdio::null()).stderr(Stdio::null());
	}

	let status = command
		.status()
		.map_err(|source| ExecError::Spawn { program: "sudo".to_string(), source })?;

	if status.success() {
		Ok(())
	} else {
		Err(ExecError::Failed { command: line, code: status.code().unwrap_or(-1) })
	}
}

/// Whether `program` is on PATH
pub fn has_program(program: &str) -> bool {
	which::which(program).is_ok()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_command_line() {
		assert_eq!(command_line("sudo", &["pacman", "-S", "vim"]), "sudo pacman -S vim");
		assert_eq!(command_line::<&str>("uname", &[]), "uname");
	}

	#[test]
	fn test_capture_missing_program() {
		let err = capture("pactool-definitely-missing-binary", &["--help"]).unwrap_err();
		assert!(matches!(err, ExecError::Spawn { .. }));
	}

	#[test]
	fn test_stdout_or_empty_missing_program() {
		assert_eq!(stdout_or_empty("pactool-definitely-missing-binary", &["-x"]), "");
	}
}
