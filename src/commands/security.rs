//! Security command - security upgrades, audits and CVE lookups

use anyhow::{Context, Result};
use chrono::Local;
use colored::*;

use crate::config::{NVD_DETAIL_URL, NVD_TIMEOUT};
use crate::core::audit::{self, AuditRisk};
use crate::core::cve::{self, Cve};
use crate::core::{exec, http, updates, Manager};
use crate::ui::format::{self, terminal_size, TAB4, TAB8};
use crate::ui::spinner::{with_spinner, BAR_TICKS};
use crate::ui::{self, prompt, PageOutcome, Pager};

const DETAILS_PREFIX: &str = "  Details: ";

pub fn upgrade(manager: Manager) -> Result<()> {
	match manager {
		Manager::Apt => {
			ui::info("Refreshing package lists");
			let security: Vec<String> = updates::apt_upgradable()?
				.into_iter()
				.filter(|p| p.is_security())
				.map(|p| p.name)
				.collect();

			if security.is_empty() {
				ui::success("No security updates available.");
				return Ok(());
			}

			ui::header(&format!("{} security updates", security.len()));
			for name in &security {
				println!("{}{}", TAB4, name.yellow());
			}
			println!();

			let mut args: Vec<String> = ["apt-get", "install", "--only-upgrade", "-y"].iter().map(|s| s.to_string()).collect();
			args.extend(security);
			exec::run_privileged(&args).context("Failed to install security updates")?;
		}
		Manager::Pacman => {
			ui::warn("pacman does not tag security updates; running a full system upgrade.");
			exec::run_privileged(&["pacman", "-Syu", "--noconfirm"]).context("Failed to upgrade packages")?;
		}
	}

	ui::success("Security updates installed.");
	Ok(())
}

fn risk_badge(risk: AuditRisk) -> ColoredString {
	let label = risk.label();
	match risk {
		AuditRisk::High => label.red().bold(),
		AuditRisk::Medium => label.yellow().bold(),
		AuditRisk::Low => label.green().bold(),
		AuditRisk::None => label.normal(),
	}
}

/// Installed apt packages that came from a security pocket
fn apt_security_lines(stdout: &str) -> Vec<&str> {
	stdout
		.lines()
		.filter(|line| !line.starts_with("Listing") && line.contains("security"))
		.collect()
}

pub fn packages(manager: Manager) -> Result<()> {
	let user = manager.user_packages();

	match manager {
		Manager::Apt => {
			let stdout = exec::stdout_or_empty("apt", &["list", "--installed"]);
			let lines = apt_security_lines(&stdout);
			if lines.is_empty() {
				ui::info("No installed packages from security repositories.");
				return Ok(());
			}

			ui::header("Installed packages from security repositories");
			for line in lines {
				let name = line.split('/').next().unwrap_or(line);
				let rest = &line[name.len()..];
				println!("{}{}{}", TAB4, format::package_name(name, user.contains(name)), rest.dimmed());
			}
		}
		Manager::Pacman => {
			if !exec::has_program("arch-audit") {
				ui::warn("'arch-audit' is required to audit pacman packages but is not installed.");
				if !prompt::confirm("Install arch-audit now?")? {
					return Ok(());
				}
				exec::run_privileged(&manager.install_args("arch-audit")).context("Failed to install arch-audit")?;
			}

			let out = exec::capture::<&str>("arch-audit", &[])?;
			let entries = audit::parse(&out.stdout);
			if entries.is_empty() {
				ui::success("No vulnerable packages found.");
				return Ok(());
			}

			ui::header("Vulnerable packages");
			format::print_legend();
			println!();
			for entry in &entries {
				println!(
					"{}{} {} {}",
					TAB4,
					format::package_name(&entry.package, user.contains(&entry.package)),
					entry.issue.white(),
					risk_badge(entry.risk),
				);
			}
		}
	}

	println!();
	Ok(())
}

fn description_lines(cve: &Cve, width: usize) -> Vec<String> {
	format::wrap(&cve::clip_description(cve.description()), width, DETAILS_PREFIX)
}

/// Screen lines one CVE takes, used to fit pages
fn cve_height(cve: &Cve, deep: bool, width: usize) -> usize {
	let base = 4 + description_lines(cve, width).len();
	if deep {
		base + 5 + cve.references.len().max(1)
	} else {
		base
	}
}

fn print_impact(cve: &Cve) {
	let impact = cve.impact();
	println!("{}{}", TAB4, "Impact".bright_white().bold());
	println!("{}├─ Score:         {}", TAB4, impact.score.red().bold());
	println!("{}├─ Attack Vector: {}", TAB4, impact.attack_vector.yellow());
	println!("{}├─ Severity:      {}", TAB4, impact.severity.red());
	println!("{}└─ References:", TAB4);
	if impact.references.is_empty() {
		println!("{}{}{}", TAB8, TAB4, "N/A".dimmed());
	}
	for reference in &impact.references {
		println!("{}{}{}", TAB8, TAB4, reference.blue().underline());
	}
}

fn highlight_id(id: &str, keyword: &str) -> String {
	format::highlight_spans(id, keyword)
		.into_iter()
		.map(|(segment, matched)| {
			if matched {
				segment.green().bold().to_string()
			} else {
				segment.red().bold().to_string()
			}
		})
		.collect()
}

/// Highlights a wrapped description line, leaving the label and indent alone
fn highlight_description(line: &str, keyword: &str) -> String {
	let split = DETAILS_PREFIX.len().min(line.len());
	let (prefix, text) = line.split_at(split);
	format!("{}{}", prefix, format::highlight(text, keyword))
}

fn print_cve(index: usize, cve: &Cve, keyword: &str, deep: bool, width: usize) {
	println!("({}) {}", index, highlight_id(&cve.id, keyword));
	println!(
		"{}Published: {}  Last Modified: {}",
		TAB4,
		cve.published_text().yellow(),
		cve.last_modified_text().yellow()
	);
	for line in description_lines(cve, width) {
		println!("{}", highlight_description(&line, keyword));
	}
	println!("{}Link: {}", TAB4, format!("{}/{}", NVD_DETAIL_URL, cve.id).blue().underline());
	if deep {
		print_impact(cve);
	}
	println!();
}

fn print_summary(package: &str, cves: &[Cve]) {
	let counts = cve::count_recent(cves, Local::now().date_naive());
	ui::header(&format!("Summary for '{}'", package));
	println!("{}Total CVEs found        ->  {}", TAB4, cves.len().to_string().white().bold());
	println!("{}Published past year     ->  {}", TAB4, counts.year.to_string().red());
	println!("{}Published past 6 months ->  {}", TAB4, counts.half_year.to_string().yellow());
	println!("{}Published past 30 days  ->  {}", TAB4, counts.month.to_string().green());
	println!();
}

/// Fetches CVEs for `package` and pages through them. A keyword typed at a
/// prompt filters the fetched set; one that matches nothing asks again.
pub fn vuln(package: &str, deep: bool, keyword: Option<String>, limit: Option<usize>) -> Result<()> {
	let client = http::client(NVD_TIMEOUT)?;
	let cves = with_spinner(format!("Fetching CVEs for '{}'", package), "[{spinner}] {msg}", BAR_TICKS, || {
		cve::fetch(&client, package)
	})?;

	if cves.is_empty() {
		ui::success(&format!("No known CVEs for '{}'.", package));
		return Ok(());
	}

	let (width, _) = terminal_size();
	let mut keyword = keyword.unwrap_or_default();

	loop {
		let selected = cve::select(&cves, keyword, |missed| {
			ui::warn(&format!("No CVEs match '{}'.", missed));
			prompt::read_line(&format!("{} ", "New keyword (blank shows all) >".yellow()))
		})?;
		let Some((current, shown)) = selected else {
			break;
		};
		keyword = current;

		let title = if keyword.is_empty() {
			format!("Vulnerabilities for '{}'", package)
		} else {
			format!("Vulnerabilities for '{}' matching \"{}\"", package, keyword)
		};

		let outcome = Pager::cves().run(
			&shown,
			limit,
			|c| cve_height(c, deep, width),
			|page, start, page_no, total| {
				println!("\n{}\n", format::heading(&format!("{} - Page {} of {}", title, page_no, total)));
				for (i, c) in page.iter().enumerate() {
					print_cve(start + i + 1, c, &keyword, deep, width);
				}
			},
		)?;

		match outcome {
			PageOutcome::Keyword(next) => keyword = next,
			PageOutcome::Finished | PageOutcome::Quit => break,
		}
	}

	print_summary(package, &cves);
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_keyword_skips_details_label() {
		let line = format!("{}Details about the flaw", DETAILS_PREFIX);
		let lit = highlight_description(&line, "details");
		assert_eq!(lit, format!("{}{}", DETAILS_PREFIX, format::highlight("Details about the flaw", "details")));

		let indent = " ".repeat(DETAILS_PREFIX.len());
		let continued = format!("{}more details", indent);
		assert!(highlight_description(&continued, "details").starts_with(&indent));
	}

	#[test]
	fn test_apt_security_lines() {
		let out = "\
Listing...
openssl/jammy-updates,jammy-security,now 3.0.2-0ubuntu1.15 amd64 [installed]
vim/jammy,now 2:8.2.3995-1ubuntu2 amd64 [installed]
libssl3/jammy-security,now 3.0.2-0ubuntu1.15 amd64 [installed,automatic]
";
		let lines = apt_security_lines(out);
		assert_eq!(lines.len(), 2);
		assert!(lines[0].starts_with("openssl/"));
		assert!(lines[1].starts_with("libssl3/"));
	}

	#[test]
	fn test_cve_height_grows_with_deep_view() {
		let cve: Cve = serde_json::from_str(
			r#"{"id": "CVE-2024-0001", "descriptions": [{"lang": "en", "value": "Short text."}],
			"references": [{"url": "https://a.example"}, {"url": "https://b.example"}]}"#,
		)
		.unwrap();
		assert_eq!(cve_height(&cve, false, 80), 5);
		assert_eq!(cve_height(&cve, true, 80), 12);
	}
}
