//! List and stats commands - installed packages

use anyhow::Result;
use colored::*;

use crate::cli::SortKey;
use crate::core::package::{self, PackageFilter};
use crate::core::stats::{self, PackageStats};
use crate::core::{Manager, Package};
use crate::ui::format::{self, format_size, max_width, split_size, TAB4, TAB8};
use crate::ui::pager::apply_limit;
use crate::ui::{self, Pager};

/// Column widths shared by every page so rows line up across pages
struct Columns {
	name: usize,
	size_value: usize,
	size_unit: usize,
	date: usize,
}

impl Columns {
	fn measure(packages: &[Package]) -> Self {
		let sizes: Vec<(String, String)> = packages.iter().map(|p| split_size(&p.size_text())).collect();
		let dates: Vec<String> = packages.iter().flat_map(|p| [p.installed_text(), p.updated_text()]).collect();

		Self {
			name: max_width(packages.iter().map(|p| p.name.as_str())),
			size_value: max_width(sizes.iter().map(|(v, _)| v.as_str())) + 2,
			size_unit: max_width(sizes.iter().map(|(_, u)| u.as_str())),
			date: max_width(dates.iter().map(String::as_str)),
		}
	}
}

fn print_row(index: usize, pkg: &Package, columns: &Columns) {
	let (value, unit) = split_size(&pkg.size_text());
	let name = format!("{:<width$}", pkg.name, width = columns.name);
	let size = format!("{:<vw$} {:<uw$}", value, unit, vw = columns.size_value, uw = columns.size_unit);

	println!(
		"{} {}  {}  Installed {}  Updated {}",
		format!("{:<4}", index).bold(),
		format::package_name(&name, pkg.is_user),
		format::size(&size),
		format::date(&format!("{:<width$}", pkg.installed_text(), width = columns.date)),
		format::date(&format!("{:<width$}", pkg.updated_text(), width = columns.date)),
	);
}

pub fn run(manager: Manager, limit: Option<usize>, sort: Option<SortKey>, reverse: bool, filter: PackageFilter) -> Result<()> {
	let packages = package::collect(manager)?;
	let mut packages = package::filter_packages(packages, filter);

	if packages.is_empty() {
		ui::warn("No packages found.");
		return Ok(());
	}

	match sort {
		Some(key) => package::sort_packages(&mut packages, key, reverse),
		None if reverse => packages.reverse(),
		None => {}
	}

	let columns = Columns::measure(&packages);
	format::print_legend();
	println!();

	Pager::packages().run(&packages, limit, |_| 1, |page, start, page_no, total| {
		if total > 1 {
			println!("{}\n", format::heading(&format!("Page {} of {}", page_no, total)));
		}
		for (i, pkg) in page.iter().enumerate() {
			print_row(start + i + 1, pkg, &columns);
		}
	})?;

	Ok(())
}

fn count_line(label: &str, value: ColoredString) {
	println!("{}{:<21}->  {}", TAB4, label, value);
}

/// `name (detail)` for an extreme, `N/A` when no package qualifies
fn extreme_line(label: &str, pkg: Option<&Package>, detail: impl Fn(&Package) -> ColoredString) {
	match pkg {
		Some(p) => println!("{}{:<17}->  {} ({})", TAB8, label, format::package_name(&p.name, p.is_user), detail(p)),
		None => println!("{}{:<17}->  {}", TAB8, label, "N/A".dimmed()),
	}
}

fn print_stats(stats: &PackageStats) {
	count_line("Total packages", stats.total.to_string().white().bold());
	count_line("User-installed", format::user_package(&stats.user.to_string()));
	count_line("System dependencies", format::system_package(&stats.system.to_string()));
	println!();

	count_line("Total size", format::size(&format_size(stats.total_size)));
	count_line("User-installed size", format::size(&format_size(stats.user_size)));
	count_line("System size", format::size(&format_size(stats.system_size)));
	println!();

	let size = |p: &Package| format::size(&p.size_text());
	println!("{}{}", TAB4, "Size:".bold());
	extreme_line("Largest package", stats.largest, size);
	extreme_line("Smallest package", stats.smallest, size);
	println!();

	println!("{}{}", TAB4, "Installation Dates:".bold());
	extreme_line("Oldest installed", stats.oldest_installed, |p| format::date(&p.installed_text()));
	extreme_line("Latest installed", stats.latest_installed, |p| format::date(&p.installed_text()));
	println!();

	println!("{}{}", TAB4, "Update Dates:".bold());
	extreme_line("Oldest updated", stats.oldest_updated, |p| format::date(&p.updated_text()));
	extreme_line("Latest updated", stats.latest_updated, |p| format::date(&p.updated_text()));
	println!();
}

pub fn stats(manager: Manager, limit: Option<usize>) -> Result<()> {
	let packages = package::collect(manager)?;
	let packages = apply_limit(&packages, limit);

	if packages.is_empty() {
		ui::warn("No packages found.");
		return Ok(());
	}

	ui::header("Package Statistics");
	print_stats(&stats::compute(packages));
	Ok(())
}
