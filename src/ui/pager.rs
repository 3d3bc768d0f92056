//! Terminal pagination
//!
//! Items are grouped into pages by their estimated line count so that each
//! page fits the terminal height minus a reserve for headers and the prompt.

use anyhow::Result;
use colored::Colorize;
use std::ops::Range;

use crate::config::{CVE_PAGE_RESERVE, PACKAGE_PAGE_RESERVE};
use crate::ui::format::terminal_size;
use crate::ui::prompt;

/// How a paging session ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
	Finished,
	Quit,
	Keyword(String),
}

/// What the user typed at a page prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageAction {
	Continue,
	Quit,
	Keyword(String),
}

/// Greedy page split: each page takes items while their heights fit in
/// `budget`, and always holds at least one item.
pub fn plan_pages(heights: &[usize], budget: usize) -> Vec<Range<usize>> {
	let mut pages = Vec::new();
	let mut start = 0;

	while start < heights.len() {
		let mut end = start;
		let mut used = 0;
		while end < heights.len() {
			let needed = heights[end];
			if end > start && used + needed > budget {
				break;
			}
			used += needed;
			end += 1;
		}
		pages.push(start..end);
		start = end;
	}

	pages
}

/// Interprets a prompt answer. Closed stdin quits.
pub fn parse_answer(input: Option<&str>, allow_keyword: bool) -> PageAction {
	match input.map(str::trim) {
		None => PageAction::Quit,
		Some("") => PageAction::Continue,
		Some(s) if s.eq_ignore_ascii_case("q") => PageAction::Quit,
		Some(s) if allow_keyword => PageAction::Keyword(s.to_string()),
		Some(_) => PageAction::Continue,
	}
}

/// Applies `-n`: a positive limit truncates, zero and absent keep everything
pub fn apply_limit<T>(items: &[T], limit: Option<usize>) -> &[T] {
	match limit {
		Some(n) if n > 0 => &items[..n.min(items.len())],
		_ => items,
	}
}

pub struct Pager {
	reserve: usize,
	keyword_prompt: bool,
}

impl Pager {
	/// Package listings: no keyword prompt, nothing after the last page
	pub fn packages() -> Self {
		Self { reserve: PACKAGE_PAGE_RESERVE, keyword_prompt: false }
	}

	/// Package search: asks for a new keyword between pages and after the last
	pub fn search() -> Self {
		Self { reserve: PACKAGE_PAGE_RESERVE, keyword_prompt: true }
	}

	/// CVE listings: like search, with a smaller reserve
	pub fn cves() -> Self {
		Self { reserve: CVE_PAGE_RESERVE, keyword_prompt: true }
	}

	/// Pages through `items`.
	///
	/// `show` receives the page slice, the index of its first item, the page
	/// number and the page count. `limit == Some(0)` renders everything as a
	/// single page.
	pub fn run<T>(
		&self,
		items: &[T],
		limit: Option<usize>,
		estimate: impl Fn(&T) -> usize,
		mut show: impl FnMut(&[T], usize, usize, usize),
	) -> Result<PageOutcome> {
		let items = apply_limit(items, limit);

		let pages = if limit == Some(0) {
			if items.is_empty() { Vec::new() } else { vec![0..items.len()] }
		} else {
			let (_, rows) = terminal_size();
			let budget = rows.saturating_sub(self.reserve).max(1);
			let heights: Vec<usize> = items.iter().map(&estimate).collect();
			plan_pages(&heights, budget)
		};

		let total = pages.len();
		for (i, range) in pages.into_iter().enumerate() {
			let start = range.start;
			show(&items[range], start, i + 1, total);

			let last = i + 1 == total;
			if last && !self.keyword_prompt {
				break;
			}

			match self.ask()? {
				PageAction::Quit => return Ok(PageOutcome::Quit),
				PageAction::Keyword(keyword) => return Ok(PageOutcome::Keyword(keyword)),
				PageAction::Continue if last => return Ok(PageOutcome::Finished),
				PageAction::Continue => println!(),
			}
		}

		Ok(PageOutcome::Finished)
	}

	fn ask(&self) -> Result<PageAction> {
		let hint = if self.keyword_prompt {
			"Press enter to continue | 'Q' to quit | or type a new keyword"
		} else {
			"Press enter to continue | 'Q' to quit"
		};
		println!("\n{}\n", hint.bright_yellow().bold());

		let answer = prompt::read_line(&format!("{}", "--> ".bright_yellow().bold()))?;
		Ok(parse_answer(answer.as_deref(), self.keyword_prompt))
	}
}
