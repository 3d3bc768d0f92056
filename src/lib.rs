//! # pactool Library
//!
//! A cross-distro package management helper that drives apt or pacman and
//! renders their output as colored, paged listings.

pub mod cli;
pub mod commands;
pub mod config;
pub mod core;
pub mod logger;
pub mod ui;
