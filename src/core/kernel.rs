//! Installed kernels and kernel image backups

use anyhow::{bail, Result};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::core::exec;

/// pacman kernel packages besides plain `linux`
const PACMAN_KERNEL_SUFFIXES: &[&str] = &["lts", "zen", "hardened", "rt", "rt-lts"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KernelFlavor {
	Linux,
	Lts,
	Zen,
	Hardened,
}

impl KernelFlavor {
	/// Flavor from the `uname -r` suffix (`6.9.7-zen1-1-zen` is zen)
	pub fn from_release(release: &str) -> Self {
		match release.rsplit('-').next().unwrap_or("") {
			"zen" => KernelFlavor::Zen,
			"lts" => KernelFlavor::Lts,
			"hardened" => KernelFlavor::Hardened,
			_ => KernelFlavor::Linux,
		}
	}

	/// Arch package (and `/boot/vmlinuz-*` suffix) for this flavor
	pub fn package_name(&self) -> &'static str {
		match self {
			KernelFlavor::Linux => "linux",
			KernelFlavor::Lts => "linux-lts",
			KernelFlavor::Zen => "linux-zen",
			KernelFlavor::Hardened => "linux-hardened",
		}
	}
}

impl fmt::Display for KernelFlavor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.package_name())
	}
}

pub fn running_release() -> Result<String> {
	let out = exec::capture("uname", &["-r"])?;
	let release = out.stdout.trim();
	if !out.success() || release.is_empty() {
		bail!("Could not determine the running kernel");
	}
	Ok(release.to_string())
}

/// `linux` or `linux-<flavor>`; headers, firmware, docs and api-headers are not kernels
pub fn is_pacman_kernel(name: &str) -> bool {
	name == "linux" || name.strip_prefix("linux-").is_some_and(|rest| PACMAN_KERNEL_SUFFIXES.contains(&rest))
}

/// Installed kernels other than the one running
pub fn removable_pacman_kernels(installed: &str, running: KernelFlavor) -> Vec<String> {
	installed
		.lines()
		.map(str::trim)
		.filter(|name| is_pacman_kernel(name) && *name != running.package_name())
		.map(str::to_string)
		.collect()
}

pub fn pacman_cleanup_candidates(release: &str) -> Vec<String> {
	let installed = exec::stdout_or_empty("pacman", &["-Qq"]);
	removable_pacman_kernels(&installed, KernelFlavor::from_release(release))
}

/// `name status` lines for `linux-image-*`; versioned, installed images not
/// matching `release`
pub fn removable_apt_images(stdout: &str, release: &str) -> Vec<String> {
	stdout
		.lines()
		.filter_map(|line| {
			let (name, status) = line.split_once(' ')?;
			let versioned = name.strip_prefix("linux-image-")?.starts_with(|c: char| c.is_ascii_digit());
			let installed = status.trim() == "install ok installed";
			(versioned && installed && !name.contains(release)).then(|| name.to_string())
		})
		.collect()
}

pub fn apt_cleanup_candidates(release: &str) -> Vec<String> {
	let stdout = exec::stdout_or_empty("dpkg-query", &["-W", "--showformat=${Package} ${Status}\\n", "linux-image-*"]);
	removable_apt_images(&stdout, release)
}

/// Debian keeps `vmlinuz-<release>`, Arch `vmlinuz-<package>`
pub fn kernel_image(boot: &Path, release: &str) -> PathBuf {
	let versioned = boot.join(format!("vmlinuz-{}", release));
	if versioned.exists() {
		versioned
	} else {
		boot.join(format!("vmlinuz-{}", KernelFlavor::from_release(release).package_name()))
	}
}

pub fn backup_target(backup_dir: &Path, image: &Path, release: &str) -> PathBuf {
	let image_name = image.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
	backup_dir.join(format!("{}-{}", image_name, release))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_flavor_from_release() {
		assert_eq!(KernelFlavor::from_release("6.9.7-zen1-1-zen"), KernelFlavor::Zen);
		assert_eq!(KernelFlavor::from_release("6.6.36-1-lts"), KernelFlavor::Lts);
		assert_eq!(KernelFlavor::from_release("6.9.7-hardened1-1-hardened"), KernelFlavor::Hardened);
		assert_eq!(KernelFlavor::from_release("6.9.7-arch1-1"), KernelFlavor::Linux);
		assert_eq!(KernelFlavor::from_release("6.1.0-21-amd64"), KernelFlavor::Linux);
	}

	#[test]
	fn test_removable_pacman_kernels() {
		let installed = "linux\nlinux-headers\nlinux-lts\nlinux-lts-headers\nlinux-firmware\nlinux-api-headers\nlinux-zen\nvim\n";
		let old = removable_pacman_kernels(installed, KernelFlavor::Lts);
		assert_eq!(old, vec!["linux", "linux-zen"]);
	}

	#[test]
	fn test_removable_apt_images() {
		let out = "\
linux-image-6.1.0-20-amd64 install ok installed
linux-image-6.1.0-21-amd64 install ok installed
linux-image-6.1.0-18-amd64 deinstall ok config-files
linux-image-amd64 install ok installed
";
		assert_eq!(removable_apt_images(out, "6.1.0-21-amd64"), vec!["linux-image-6.1.0-20-amd64"]);
	}

	#[test]
	fn test_kernel_image_paths() {
		let boot = tempfile::tempdir().unwrap();
		let arch = kernel_image(boot.path(), "6.9.7-zen1-1-zen");
		assert_eq!(arch, boot.path().join("vmlinuz-linux-zen"));

		std::fs::write(boot.path().join("vmlinuz-6.1.0-21-amd64"), b"").unwrap();
		let debian = kernel_image(boot.path(), "6.1.0-21-amd64");
		assert_eq!(debian, boot.path().join("vmlinuz-6.1.0-21-amd64"));

		let target = backup_target(Path::new("/boot/pactool/backup"), &arch, "6.9.7-zen1-1-zen");
		assert_eq!(target, Path::new("/boot/pactool/backup/vmlinuz-linux-zen-6.9.7-zen1-1-zen"));
	}
}
