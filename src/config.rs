//! Application configuration and constants

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::OnceLock;
use std::time::Duration;

static CUSTOM_CACHE_DIR: OnceLock<PathBuf> = OnceLock::new();
static DRY_RUN: AtomicBool = AtomicBool::new(false);

// === Release ===
pub const RELEASE_DATE: &str = "23/7/2025";
pub const DESCRIPTION: &str = "A cross-distro package management helper for Linux systems.";

// === System Files ===
pub const APT_SOURCES_LIST: &str = "/etc/apt/sources.list";
pub const APT_SOURCES_DIR: &str = "/etc/apt/sources.list.d";
pub const PACMAN_MIRRORLIST: &str = "/etc/pacman.d/mirrorlist";
pub const PACMAN_LOG: &str = "/var/log/pacman.log";
pub const APT_HISTORY_LOG: &str = "/var/log/apt/history.log";
pub const DPKG_INFO_DIR: &str = "/var/lib/dpkg/info";
pub const OS_RELEASE: &str = "/etc/os-release";
pub const INIT_D_DIR: &str = "/etc/init.d";
pub const BOOT_DIR: &str = "/boot";
pub const KERNEL_BACKUP_DIR: &str = "/boot/pactool/backup";

// === Cache Layout ===
pub const LOG_SUBDIR: &str = "logs";
pub const MIRROR_BACKUP_SUBDIR: &str = "mirrors";
pub const MIRROR_BACKUP_EXT: &str = "list";
pub const MIRROR_BACKUP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

// === Network ===
pub const NVD_API_URL: &str = "https://services.nvd.nist.gov/rest/json/cves/2.0";
pub const NVD_DETAIL_URL: &str = "https://nvd.nist.gov/vuln/detail";
pub const NVD_API_KEY_ENV: &str = "NVD_API_KEY";
pub const USER_AGENT: &str = concat!("pactool/", env!("CARGO_PKG_VERSION"));
pub const MIRROR_TIMEOUT: Duration = Duration::from_secs(5);
pub const NVD_TIMEOUT: Duration = Duration::from_secs(30);
pub const RISK_TIMEOUT: Duration = Duration::from_secs(10);

// === Mirror Probing ===
pub const MIRROR_TEST_REPO: &str = "core";
pub const MIRROR_TEST_ARCH: &str = "x86_64";
pub const REFLECTOR_LATEST: &str = "10";

// === Display ===
pub const PACKAGE_PAGE_RESERVE: usize = 10;
pub const CVE_PAGE_RESERVE: usize = 5;
pub const DEFAULT_TERMINAL_SIZE: (u16, u16) = (80, 24);
pub const CVE_DESCRIPTION_LIMIT: usize = 500;
pub const DEFAULT_LOG_LINES: usize = 20;
pub const SPINNER_TICK_MS: u64 = 100;

// === CVE Windows (days) ===
pub const CVE_WINDOW_YEAR: i64 = 365;
pub const CVE_WINDOW_HALF_YEAR: i64 = 180;
pub const CVE_WINDOW_MONTH: i64 = 30;

pub fn set_cache_dir(path: PathBuf) {
	let _ = CUSTOM_CACHE_DIR.set(path);
}

pub fn set_dry_run(enabled: bool) {
	DRY_RUN.store(enabled, Ordering::Relaxed);
}

pub fn is_dry_run() -> bool {
	DRY_RUN.load(Ordering::Relaxed)
}

/// Cache root (--cache-dir, PACTOOL_CACHE_DIR, or the platform cache dir)
pub fn cache_dir() -> Option<PathBuf> {
	if let Some(custom) = CUSTOM_CACHE_DIR.get() {
		return Some(custom.clone());
	}

	if let Ok(env_path) = std::env::var("PACTOOL_CACHE_DIR") {
		if !env_path.is_empty() {
			return Some(PathBuf::from(env_path));
		}
	}

	directories::ProjectDirs::from("", "", "pactool").map(|dirs| dirs.cache_dir().to_path_buf())
}

pub fn log_dir() -> Option<PathBuf> {
	cache_dir().map(|d| d.join(LOG_SUBDIR))
}

pub fn mirror_backup_dir() -> Option<PathBuf> {
	cache_dir().map(|d| d.join(MIRROR_BACKUP_SUBDIR))
}

pub fn nvd_api_key() -> Option<String> {
	std::env::var(NVD_API_KEY_ENV).ok().filter(|k| !k.trim().is_empty())
}
