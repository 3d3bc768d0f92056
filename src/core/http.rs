//! Shared blocking HTTP client setup

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use std::time::Duration;

use crate::config::USER_AGENT;

pub fn client(timeout: Duration) -> Result<Client> {
	Client::builder()
		.user_agent(USER_AGENT)
		.timeout(timeout)
		.build()
		.context("Failed to create HTTP client")
}
