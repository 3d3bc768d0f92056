//! Text formatting helpers shared by every command

use colored::*;

pub const TAB4: &str = "    ";
pub const TAB8: &str = "        ";

const SIZE_UNITS: &[&str] = &["B", "KiB", "MiB", "GiB"];

/// Formats a byte count as `1.50 MiB` (two decimals, B up to GiB)
pub fn format_size(bytes: u64) -> String {
	let mut size = bytes as f64;
	let mut unit = 0;
	while size >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
		size /= 1024.0;
		unit += 1;
	}
	format!("{:.2} {}", size, SIZE_UNITS[unit])
}

/// Splits a formatted size into its value and unit columns
pub fn split_size(formatted: &str) -> (String, String) {
	match formatted.split_once(' ') {
		Some((value, unit)) => (value.to_string(), unit.to_string()),
		None => (formatted.to_string(), String::new()),
	}
}

pub fn user_package(text: &str) -> ColoredString {
	text.magenta().bold()
}

pub fn system_package(text: &str) -> ColoredString {
	text.blue().bold()
}

pub fn package_name(text: &str, is_user: bool) -> ColoredString {
	if is_user {
		user_package(text)
	} else {
		system_package(text)
	}
}

pub fn size(text: &str) -> ColoredString {
	text.green().bold()
}

pub fn date(text: &str) -> ColoredString {
	text.yellow().bold()
}

pub fn heading(text: &str) -> ColoredString {
	text.bright_yellow().bold()
}

pub fn print_legend() {
	println!("{} User package", user_package("■"));
	println!("{} System package", system_package("■"));
}

/// Splits `text` into (segment, is_match) pairs for a case-insensitive keyword
pub fn highlight_spans<'a>(text: &'a str, keyword: &str) -> Vec<(&'a str, bool)> {
	if keyword.is_empty() {
		return vec![(text, false)];
	}

	let lower_text = text.to_lowercase();
	let lower_key = keyword.to_lowercase();

	// Lowercasing can change byte lengths outside ASCII; fall back to no highlight.
	if lower_text.len() != text.len() || lower_key.len() != keyword.len() {
		return vec![(text, false)];
	}

	let mut spans = Vec::new();
	let mut start = 0;
	while let Some(offset) = lower_text[start..].find(&lower_key) {
		let idx = start + offset;
		if idx > start {
			spans.push((&text[start..idx], false));
		}
		spans.push((&text[idx..idx + lower_key.len()], true));
		start = idx + lower_key.len();
	}
	if start < text.len() {
		spans.push((&text[start..], false));
	}
	spans
}

/// Highlights every case-insensitive match of `keyword` in bold green
pub fn highlight(text: &str, keyword: &str) -> String {
	highlight_spans(text, keyword)
		.into_iter()
		.map(|(segment, matched)| {
			if matched {
				segment.green().bold().to_string()
			} else {
				segment.to_string()
			}
		})
		.collect()
}

/// Greedy word wrap. Continuation lines are indented to the prefix width.
pub fn wrap(text: &str, width: usize, prefix: &str) -> Vec<String> {
	let indent = " ".repeat(prefix.chars().count());
	let width = width.max(prefix.chars().count() + 10);

	let mut lines = Vec::new();
	let mut current = prefix.to_string();
	let mut current_len = prefix.chars().count();
	let mut has_word = false;

	for word in text.split_whitespace() {
		let word_len = word.chars().count();
		if has_word && current_len + 1 + word_len > width {
			lines.push(current);
			current = indent.clone();
			current_len = indent.len();
			has_word = false;
		}
		if has_word {
			current.push(' ');
			current_len += 1;
		}
		current.push_str(word);
		current_len += word_len;
		has_word = true;
	}

	if has_word || lines.is_empty() {
		lines.push(current);
	}
	lines
}

/// Current terminal (columns, rows), 80x24 when not attached to a terminal
pub fn terminal_size() -> (usize, usize) {
	let (cols, rows) = crossterm::terminal::size().unwrap_or(crate::config::DEFAULT_TERMINAL_SIZE);
	let (default_cols, default_rows) = crate::config::DEFAULT_TERMINAL_SIZE;
	let cols = if cols == 0 { default_cols } else { cols };
	let rows = if rows == 0 { default_rows } else { rows };
	(cols as usize, rows as usize)
}

/// Upper-cases the first character and lower-cases the rest
pub fn capitalize(text: &str) -> String {
	let mut chars = text.chars();
	match chars.next() {
		Some(first) => first.to_uppercase().chain(chars.flat_map(|c| c.to_lowercase())).collect(),
		None => String::new(),
	}
}

/// Width of the widest item, for column alignment
pub fn max_width<'a>(items: impl IntoIterator<Item = &'a str>) -> usize {
	items.into_iter().map(|s| s.chars().count()).max().unwrap_or(0)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_format_size_units() {
		assert_eq!(format_size(512), "512.00 B");
		assert_eq!(format_size(1536), "1.50 KiB");
		assert_eq!(format_size(5 * 1024 * 1024), "5.00 MiB");
		assert_eq!(format_size(3 * 1024 * 1024 * 1024), "3.00 GiB");
	}

	#[test]
	fn test_format_size_caps_at_gib() {
		assert_eq!(format_size(2048 * 1024 * 1024 * 1024), "2048.00 GiB");
	}

	#[test]
	fn test_split_size() {
		assert_eq!(split_size("1.50 MiB"), ("1.50".to_string(), "MiB".to_string()));
		assert_eq!(split_size("N/A"), ("N/A".to_string(), String::new()));
	}

	#[test]
	fn test_highlight_spans_case_insensitive() {
		let spans = highlight_spans("Firefox web browser (firefox)", "FIREFOX");
		assert_eq!(
			spans,
			vec![
				("Firefox", true),
				(" web browser (", false),
				("firefox", true),
				(")", false),
			]
		);
	}

	#[test]
	fn test_highlight_spans_no_match() {
		assert_eq!(highlight_spans("vim", "emacs"), vec![("vim", false)]);
		assert_eq!(highlight_spans("vim", ""), vec![("vim", false)]);
	}

	#[test]
	fn test_wrap_hanging_indent() {
		let lines = wrap("one two three four five six", 30, "  Details: ");
		assert_eq!(lines, vec!["  Details: one two three four", "           five six"]);
		assert!(lines.iter().all(|l| l.chars().count() <= 30));
	}

	#[test]
	fn test_wrap_empty_text_keeps_prefix() {
		assert_eq!(wrap("", 40, "> "), vec!["> ".to_string()]);
	}

	#[test]
	fn test_capitalize() {
		assert_eq!(capitalize("enabled"), "Enabled");
		assert_eq!(capitalize("HIGH RISK"), "High risk");
		assert_eq!(capitalize(""), "");
	}
}
