//! Interactive prompts on stdin

use anyhow::Result;
use colored::Colorize;
use std::io::{self, Write};

/// Reads one trimmed line. `None` when stdin is closed.
pub fn read_line(prompt: &str) -> Result<Option<String>> {
	print!("{}", prompt);
	io::stdout().flush()?;

	let mut input = String::new();
	if io::stdin().read_line(&mut input)? == 0 {
		println!();
		return Ok(None);
	}
	Ok(Some(input.trim().to_string()))
}

/// `[y/N]` question, anything but "y" is a no
pub fn confirm(question: &str) -> Result<bool> {
	let prompt = format!("\n{} ", format!("{} [y/N] >", question).yellow());
	let answer = read_line(&prompt)?;
	println!();
	Ok(answer.is_some_and(|a| is_yes(&a)))
}

pub fn is_yes(answer: &str) -> bool {
	answer.trim().eq_ignore_ascii_case("y")
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_is_yes() {
		assert!(is_yes("y"));
		assert!(is_yes(" Y "));
		assert!(!is_yes("yes"));
		assert!(!is_yes(""));
		assert!(!is_yes("n"));
	}
}
