//! Core domain: subprocess plumbing, parsers for package manager output and
//! the records they produce

pub mod audit;
pub mod cve;
pub mod deps;
pub mod exec;
pub mod history;
pub mod http;
pub mod kernel;
pub mod manager;
pub mod mirror;
pub mod package;
pub mod search;
pub mod service;
pub mod stats;
pub mod updates;

pub use manager::{Manager, ManagerError};
pub use package::Package;
