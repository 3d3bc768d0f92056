//! `arch-audit` output

use crate::ui::format::capitalize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditRisk {
	High,
	Medium,
	Low,
	None,
}

impl AuditRisk {
	pub fn label(&self) -> &'static str {
		match self {
			AuditRisk::High => "[High Risk]",
			AuditRisk::Medium => "[Medium Risk]",
			AuditRisk::Low => "[Low Risk]",
			AuditRisk::None => "",
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEntry {
	pub package: String,
	pub issue: String,
	pub risk: AuditRisk,
}

const RISK_PHRASES: &[(&str, AuditRisk)] = &[
	("high risk", AuditRisk::High),
	("medium risk", AuditRisk::Medium),
	("low risk", AuditRisk::Low),
];

/// Finds the risk phrase anywhere in `issue` and removes it, keeping any
/// `Update to ...` note that follows.
fn split_risk(issue: &str) -> (String, AuditRisk) {
	let lower = issue.to_lowercase();
	for (phrase, risk) in RISK_PHRASES {
		let Some(start) = lower.find(phrase) else {
			continue;
		};
		let tail = &lower[start + phrase.len()..];
		let tail = tail.strip_prefix('!').unwrap_or(tail);
		let tail = tail.strip_prefix('.').unwrap_or(tail).trim();

		let head = capitalize(lower[..start].trim_end());
		let issue = if tail.is_empty() { head } else { format!("{} {}", head, tail) };
		return (issue, *risk);
	}
	(issue.to_string(), AuditRisk::None)
}

/// `PKG is affected by ISSUE. High risk!` -> entry with the risk phrase removed
pub fn parse_line(line: &str) -> Option<AuditEntry> {
	let (package, rest) = line.trim().split_once(" is ")?;
	let (issue, risk) = split_risk(&capitalize(rest.trim()));

	Some(AuditEntry { package: package.trim().to_string(), issue, risk })
}

pub fn parse(stdout: &str) -> Vec<AuditEntry> {
	stdout.lines().filter(|l| !l.trim().is_empty()).filter_map(parse_line).collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_parse_audit_lines() {
		let out = "\
openssl is affected by arbitrary code execution. High risk!
libxml2 is affected by denial of service. Medium risk!
curl is affected by information disclosure. Low risk!
zstd is affected by something unusual.

not an audit line
";
		let entries = parse(out);
		assert_eq!(entries.len(), 4);
		assert_eq!(entries[0].package, "openssl");
		assert_eq!(entries[0].issue, "Affected by arbitrary code execution.");
		assert_eq!(entries[0].risk, AuditRisk::High);
		assert_eq!(entries[1].risk, AuditRisk::Medium);
		assert_eq!(entries[2].issue, "Affected by information disclosure.");
		assert_eq!(entries[3].risk, AuditRisk::None);
		assert_eq!(entries[3].issue, "Affected by something unusual.");
	}

	#[test]
	fn test_risk_before_update_note() {
		let entry = parse_line("openssl is affected by denial of service. High risk!. Update to 3.1.1-1!").unwrap();
		assert_eq!(entry.package, "openssl");
		assert_eq!(entry.risk, AuditRisk::High);
		assert_eq!(entry.issue, "Affected by denial of service. update to 3.1.1-1!");

		let entry = parse_line("curl is affected by information disclosure. Low risk! Update to 8.9.0-1!").unwrap();
		assert_eq!(entry.risk, AuditRisk::Low);
		assert_eq!(entry.issue, "Affected by information disclosure. update to 8.9.0-1!");
	}
}
