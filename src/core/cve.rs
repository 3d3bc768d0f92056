//! CVE lookups against the NVD 2.0 API

use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use reqwest::blocking::Client;
use serde::Deserialize;
use std::fmt;

use crate::config::{
	nvd_api_key, CVE_DESCRIPTION_LIMIT, CVE_WINDOW_HALF_YEAR, CVE_WINDOW_MONTH, CVE_WINDOW_YEAR, NVD_API_URL,
};

const CVE_DATE_FORMAT: &str = "%Y, %B %d";
const CLIPPED_SUFFIX: &str = "... [See More at CVE Link]";

#[derive(Debug, Deserialize)]
struct NvdResponse {
	#[serde(default)]
	vulnerabilities: Vec<NvdItem>,
}

#[derive(Debug, Deserialize)]
struct NvdItem {
	cve: Cve,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Cve {
	pub id: String,
	#[serde(default)]
	pub published: Option<String>,
	#[serde(default)]
	pub last_modified: Option<String>,
	#[serde(default)]
	pub descriptions: Vec<Description>,
	#[serde(default)]
	pub references: Vec<Reference>,
	#[serde(default)]
	pub metrics: Metrics,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Description {
	#[serde(default)]
	pub lang: String,
	pub value: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Reference {
	pub url: String,
	#[serde(default)]
	pub source: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Metrics {
	#[serde(rename = "cvssMetricV31", default)]
	pub v31: Vec<CvssMetric>,
	#[serde(rename = "cvssMetricV30", default)]
	pub v30: Vec<CvssMetric>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CvssMetric {
	pub cvss_data: CvssData,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CvssData {
	#[serde(default)]
	pub base_score: Option<f64>,
	#[serde(default)]
	pub attack_vector: Option<String>,
	#[serde(default)]
	pub base_severity: Option<String>,
}

/// What the deep view prints for one CVE
#[derive(Debug, Clone, PartialEq)]
pub struct Impact {
	pub score: String,
	pub attack_vector: String,
	pub severity: String,
	pub references: Vec<String>,
}

impl Cve {
	/// English description when present, else the first one
	pub fn description(&self) -> &str {
		self.descriptions
			.iter()
			.find(|d| d.lang == "en")
			.or_else(|| self.descriptions.first())
			.map(|d| d.value.as_str())
			.unwrap_or("")
	}

	pub fn published_text(&self) -> String {
		format_nvd_date(self.published.as_deref())
	}

	pub fn last_modified_text(&self) -> String {
		format_nvd_date(self.last_modified.as_deref())
	}

	pub fn published_date(&self) -> Option<NaiveDate> {
		self.published.as_deref().and_then(parse_nvd_date)
	}

	/// Case-insensitive match on id, descriptions, dates and references
	pub fn matches(&self, keyword: &str) -> bool {
		let keyword = keyword.to_lowercase();
		let hit = |text: &str| text.to_lowercase().contains(&keyword);

		hit(&self.id)
			|| self.descriptions.iter().any(|d| hit(&d.value))
			|| self.published.as_deref().is_some_and(hit)
			|| self.last_modified.as_deref().is_some_and(hit)
			|| self.references.iter().any(|r| hit(&r.url) || r.source.as_deref().is_some_and(hit))
	}

	pub fn impact(&self) -> Impact {
		let cvss = self.metrics.v31.first().or_else(|| self.metrics.v30.first()).map(|m| &m.cvss_data);
		let na = || "N/A".to_string();

		Impact {
			score: cvss.and_then(|c| c.base_score).map(|s| format!("{:.1}", s)).unwrap_or_else(na),
			attack_vector: cvss.and_then(|c| c.attack_vector.clone()).unwrap_or_else(na),
			severity: cvss.and_then(|c| c.base_severity.clone()).unwrap_or_else(na),
			references: self.references.iter().map(|r| r.url.clone()).collect(),
		}
	}
}

/// NVD timestamps look like `2024-04-03T15:15:50.000`, sometimes with a zone
fn parse_nvd_date(text: &str) -> Option<NaiveDate> {
	if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
		return Some(dt.date_naive());
	}
	NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f").ok().map(|dt| dt.date())
}

/// `2024, April 03`; unparseable text is returned as is, missing is `N/A`
pub fn format_nvd_date(text: Option<&str>) -> String {
	match text {
		None | Some("") => "N/A".to_string(),
		Some(raw) => parse_nvd_date(raw).map(|d| d.format(CVE_DATE_FORMAT).to_string()).unwrap_or_else(|| raw.to_string()),
	}
}

/// Cuts descriptions over the display limit
pub fn clip_description(text: &str) -> String {
	if text.chars().count() <= CVE_DESCRIPTION_LIMIT {
		return text.to_string();
	}
	let cut: String = text.chars().take(CVE_DESCRIPTION_LIMIT).collect();
	format!("{}{}", cut, CLIPPED_SUFFIX)
}

/// CVEs published within the last year, half year and month
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecentCounts {
	pub year: usize,
	pub half_year: usize,
	pub month: usize,
}

pub fn count_recent(cves: &[Cve], today: NaiveDate) -> RecentCounts {
	let mut counts = RecentCounts::default();
	for date in cves.iter().filter_map(Cve::published_date) {
		let age = (today - date).num_days();
		if age < CVE_WINDOW_YEAR {
			counts.year += 1;
		}
		if age < CVE_WINDOW_HALF_YEAR {
			counts.half_year += 1;
		}
		if age < CVE_WINDOW_MONTH {
			counts.month += 1;
		}
	}
	counts
}

pub fn filter<'a>(cves: &'a [Cve], keyword: &str) -> Vec<&'a Cve> {
	cves.iter().filter(|c| c.matches(keyword)).collect()
}

/// CVEs to show for `keyword`, a blank keyword showing all of them.
///
/// When nothing matches, `ask` is called with the unmatched keyword and its
/// answer is tried next. `None` from `ask` (stdin closed) ends the selection.
pub fn select<'a>(
	cves: &'a [Cve],
	keyword: String,
	mut ask: impl FnMut(&str) -> Result<Option<String>>,
) -> Result<Option<(String, Vec<&'a Cve>)>> {
	let mut keyword = keyword;
	loop {
		let shown = if keyword.is_empty() { cves.iter().collect() } else { filter(cves, &keyword) };
		if !shown.is_empty() {
			return Ok(Some((keyword, shown)));
		}
		match ask(&keyword)? {
			Some(next) => keyword = next,
			None => return Ok(None),
		}
	}
}

pub fn parse_response(body: &str) -> Result<Vec<Cve>> {
	let response: NvdResponse = serde_json::from_str(body).context("Unexpected NVD response")?;
	Ok(response.vulnerabilities.into_iter().map(|item| item.cve).collect())
}

/// Keyword search; the term is URL-encoded by the query builder
pub fn fetch(client: &Client, term: &str) -> Result<Vec<Cve>> {
	let mut request = client.get(NVD_API_URL).query(&[("keywordSearch", term)]);
	if let Some(key) = nvd_api_key() {
		request = request.header("apiKey", key);
	}

	let response = request.send().context("Failed to reach the NVD API")?;
	if !response.status().is_success() {
		bail!("NVD API returned {}", response.status());
	}
	let body = response.text().context("Failed to read NVD response")?;
	parse_response(&body)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskLevel {
	Low,
	Medium,
	High,
	Unknown,
}

impl RiskLevel {
	pub fn from_count(count: usize) -> Self {
		match count {
			0 => RiskLevel::Low,
			1..=5 => RiskLevel::Medium,
			_ => RiskLevel::High,
		}
	}
}

impl fmt::Display for RiskLevel {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			RiskLevel::Low => "Low risk",
			RiskLevel::Medium => "Medium risk",
			RiskLevel::High => "High risk",
			RiskLevel::Unknown => "Unknown",
		})
	}
}

/// Risk for one package version; a failed request is `Unknown` with no count
pub fn assess_risk(client: &Client, package: &str, version: &str) -> (RiskLevel, usize) {
	match fetch(client, &format!("{} {}", package, version)) {
		Ok(cves) => (RiskLevel::from_count(cves.len()), cves.len()),
		Err(e) => {
			tracing::warn!("Risk lookup for {} {} failed: {:#}", package, version, e);
			(RiskLevel::Unknown, 0)
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const SAMPLE: &str = r#"{
		"resultsPerPage": 2,
		"vulnerabilities": [
			{"cve": {
				"id": "CVE-2024-3094",
				"published": "2024-03-29T17:15:21.150",
				"lastModified": "2024-04-10T08:00:00.000",
				"descriptions": [
					{"lang": "es", "value": "Código malicioso"},
					{"lang": "en", "value": "Malicious code was discovered in the upstream tarballs of xz"}
				],
				"metrics": {"cvssMetricV31": [{"cvssData": {"baseScore": 10.0, "attackVector": "NETWORK", "baseSeverity": "CRITICAL"}}]},
				"references": [{"url": "https://www.openwall.com/lists/oss-security/2024/03/29/4", "source": "cve@mitre.org"}]
			}},
			{"cve": {
				"id": "CVE-2015-4035",
				"published": "2015-05-22T10:59:00.000",
				"descriptions": [{"lang": "en", "value": "scripts/xzgrep in XZ Utils allows command execution"}]
			}}
		]
	}"#;

	#[test]
	fn test_parse_response() {
		let cves = parse_response(SAMPLE).unwrap();
		assert_eq!(cves.len(), 2);
		assert_eq!(cves[0].description(), "Malicious code was discovered in the upstream tarballs of xz");
		assert_eq!(cves[0].published_text(), "2024, March 29");
		assert_eq!(cves[1].last_modified_text(), "N/A");
	}

	#[test]
	fn test_impact() {
		let cves = parse_response(SAMPLE).unwrap();
		let impact = cves[0].impact();
		assert_eq!(impact.score, "10.0");
		assert_eq!(impact.attack_vector, "NETWORK");
		assert_eq!(impact.severity, "CRITICAL");
		assert_eq!(impact.references.len(), 1);

		let bare = cves[1].impact();
		assert_eq!(bare.score, "N/A");
		assert!(bare.references.is_empty());
	}

	#[test]
	fn test_keyword_filter() {
		let cves = parse_response(SAMPLE).unwrap();
		assert_eq!(filter(&cves, "XZGREP").len(), 1);
		assert_eq!(filter(&cves, "openwall").len(), 1);
		assert_eq!(filter(&cves, "2015-05").len(), 1);
		assert_eq!(filter(&cves, "cve-20").len(), 2);
		assert!(filter(&cves, "openssl").is_empty());
	}

	#[test]
	fn test_select_blank_keyword_shows_all() {
		let cves = parse_response(SAMPLE).unwrap();
		let (keyword, shown) = select(&cves, String::new(), |_| panic!("no prompt expected")).unwrap().unwrap();
		assert_eq!(keyword, "");
		assert_eq!(shown.len(), 2);
	}

	#[test]
	fn test_select_asks_again_until_match() {
		let cves = parse_response(SAMPLE).unwrap();
		let mut answers = vec![Some("xzgrep".to_string()), Some("nothing here".to_string())];
		let mut asked = Vec::new();

		let (keyword, shown) = select(&cves, "openssl".to_string(), |missed| {
			asked.push(missed.to_string());
			Ok(answers.pop().flatten())
		})
		.unwrap()
		.unwrap();

		assert_eq!(asked, ["openssl", "nothing here"]);
		assert_eq!(keyword, "xzgrep");
		assert_eq!(shown.len(), 1);
		assert_eq!(shown[0].id, "CVE-2015-4035");
	}

	#[test]
	fn test_select_blank_answer_shows_all() {
		let cves = parse_response(SAMPLE).unwrap();
		let (_, shown) = select(&cves, "openssl".to_string(), |_| Ok(Some(String::new()))).unwrap().unwrap();
		assert_eq!(shown.len(), 2);
	}

	#[test]
	fn test_select_closed_stdin_ends() {
		let cves = parse_response(SAMPLE).unwrap();
		assert!(select(&cves, "openssl".to_string(), |_| Ok(None)).unwrap().is_none());
	}

	#[test]
	fn test_count_recent() {
		let cves = parse_response(SAMPLE).unwrap();
		let today = NaiveDate::from_ymd_opt(2024, 4, 15).unwrap();
		let counts = count_recent(&cves, today);
		assert_eq!(counts, RecentCounts { year: 1, half_year: 1, month: 1 });

		let later = NaiveDate::from_ymd_opt(2024, 8, 1).unwrap();
		assert_eq!(count_recent(&cves, later), RecentCounts { year: 1, half_year: 1, month: 0 });
	}

	#[test]
	fn test_clip_description() {
		let short = "short";
		assert_eq!(clip_description(short), "short");

		let long = "x".repeat(600);
		let clipped = clip_description(&long);
		assert!(clipped.ends_with(CLIPPED_SUFFIX));
		assert_eq!(clipped.chars().count(), 500 + CLIPPED_SUFFIX.len());
	}

	#[test]
	fn test_format_nvd_date() {
		assert_eq!(format_nvd_date(Some("2024-04-03T15:15:50.000")), "2024, April 03");
		assert_eq!(format_nvd_date(Some("2024-04-03T15:15:50Z")), "2024, April 03");
		assert_eq!(format_nvd_date(Some("garbage")), "garbage");
		assert_eq!(format_nvd_date(None), "N/A");
	}

	#[test]
	fn test_risk_levels() {
		assert_eq!(RiskLevel::from_count(0), RiskLevel::Low);
		assert_eq!(RiskLevel::from_count(5), RiskLevel::Medium);
		assert_eq!(RiskLevel::from_count(6), RiskLevel::High);
		assert_eq!(RiskLevel::Unknown.to_string(), "Unknown");
	}
}
