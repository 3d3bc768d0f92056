//! # Command Implementations
//!
//! Each submodule handles one CLI command family (listing, inspection,
//! services, mirrors, kernels, security).

pub mod about;
pub mod inspect;
pub mod kernels;
pub mod list;
pub mod maintenance;
pub mod manage;
pub mod mirrors;
pub mod search;
pub mod security;
pub mod services;

use anyhow::{bail, Result};

use crate::core::Manager;

/// Fails with "Package 'x' not found." unless `package` is installed
pub fn ensure_installed(manager: Manager, package: &str) -> Result<()> {
	if !manager.package_exists(package) {
		bail!("Package '{}' not found.", package);
	}
	Ok(())
}
