//! Aggregate package statistics

use chrono::{DateTime, Local};

use crate::core::package::Package;

#[derive(Debug, Clone, Default)]
pub struct PackageStats<'a> {
	pub total: usize,
	pub user: usize,
	pub system: usize,
	pub total_size: u64,
	pub user_size: u64,
	pub system_size: u64,
	pub largest: Option<&'a Package>,
	pub smallest: Option<&'a Package>,
	pub oldest_installed: Option<&'a Package>,
	pub latest_installed: Option<&'a Package>,
	pub oldest_updated: Option<&'a Package>,
	pub latest_updated: Option<&'a Package>,
}

fn extremes<'a, K: Ord + Copy>(
	packages: &'a [Package],
	key: impl Fn(&Package) -> Option<K>,
) -> (Option<&'a Package>, Option<&'a Package>) {
	let dated = packages.iter().filter_map(|p| key(p).map(|k| (k, p)));
	let min = dated.clone().min_by_key(|(k, _)| *k).map(|(_, p)| p);
	let max = dated.max_by_key(|(k, _)| *k).map(|(_, p)| p);
	(min, max)
}

fn installed(p: &Package) -> Option<DateTime<Local>> {
	p.installed
}

fn updated(p: &Package) -> Option<DateTime<Local>> {
	p.updated
}

/// Packages without a size or date are left out of the matching extremes
pub fn compute(packages: &[Package]) -> PackageStats<'_> {
	let user = packages.iter().filter(|p| p.is_user).count();
	let total_size: u64 = packages.iter().filter_map(|p| p.size).sum();
	let user_size: u64 = packages.iter().filter(|p| p.is_user).filter_map(|p| p.size).sum();

	let (smallest, largest) = extremes(packages, |p| p.size);
	let (oldest_installed, latest_installed) = extremes(packages, installed);
	let (oldest_updated, latest_updated) = extremes(packages, updated);

	PackageStats {
		total: packages.len(),
		user,
		system: packages.len() - user,
		total_size,
		user_size,
		system_size: total_size - user_size,
		largest,
		smallest,
		oldest_installed,
		latest_installed,
		oldest_updated,
		latest_updated,
	}
}
