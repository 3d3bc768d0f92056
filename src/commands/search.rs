//! Search command - repository search with keyword refinement

use anyhow::Result;
use colored::*;
use std::collections::HashSet;

use crate::core::search::{self, SearchHit};
use crate::core::Manager;
use crate::ui::format::{self, TAB4, TAB8};
use crate::ui::{self, PageOutcome, Pager};

/// Name line with keyword matches in green and the rest in the package color
fn highlight_line(text: &str, keyword: &str, is_user: bool) -> String {
	format::highlight_spans(text, keyword)
		.into_iter()
		.map(|(segment, matched)| {
			if matched {
				segment.green().bold().to_string()
			} else {
				format::package_name(segment, is_user).to_string()
			}
		})
		.collect()
}

fn print_hit(index: usize, hit: &SearchHit, keyword: &str, manager: Manager, user: &HashSet<String>) {
	let is_user = user.contains(hit.package_name(manager));
	println!("({}) {}", index, highlight_line(&hit.line, keyword, is_user));

	if !hit.description.is_empty() {
		println!("{}Description:", TAB8);
		println!("{}{}{}", TAB8, TAB4, format::highlight(&hit.description, keyword));
	}
}

/// Searches for `term`; typing a keyword at a page prompt starts a new search
pub fn run(manager: Manager, term: &str, limit: Option<usize>) -> Result<()> {
	let user = manager.user_packages();
	let mut term = term.to_string();

	loop {
		let hits = search::search(manager, &term)?;
		if hits.is_empty() {
			ui::warn(&format!("No packages found for \"{}\"", term));
			return Ok(());
		}

		let outcome = Pager::search().run(&hits, limit, SearchHit::height, |page, start, page_no, total| {
			let title = format!("Showing results for \"{}\" - Page {} of {}", term, page_no, total);
			println!("\n{}\n", format::heading(&title));
			for (i, hit) in page.iter().enumerate() {
				print_hit(start + i + 1, hit, &term, manager, &user);
			}
		})?;

		match outcome {
			PageOutcome::Keyword(keyword) => term = keyword,
			PageOutcome::Finished | PageOutcome::Quit => return Ok(()),
		}
	}
}
