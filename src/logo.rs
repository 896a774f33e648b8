// src/logo.rs
//! Company logo lookup: a single HEAD probe against a logo CDN. The
//! crawl only ever consumes a URL-or-none value from here.

use reqwest::Client;
use std::time::Duration;
use tracing::warn;

const DEFAULT_LOGO_BASE: &str = "https://logo.clearbit.com";

pub struct LogoClient {
    client: Client,
    base_url: String,
}

impl LogoClient {
    pub fn new() -> anyhow::Result<Self> {
        Self::with_base_url(DEFAULT_LOGO_BASE.to_string())
    }

    pub fn with_base_url(base_url: String) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self { client, base_url })
    }

    /// Guess the company's domain from its display name and probe the
    /// CDN for a logo. Any failure yields None; a missing logo never
    /// blocks publishing.
    pub async fn lookup(&self, company_name: &str) -> Option<String> {
        let domain = format!("{}.com", company_name.to_lowercase().replace(' ', ""));
        let logo_url = format!("{}/{}", self.base_url, domain);

        match self.client.head(&logo_url).send().await {
            Ok(response) if response.status().is_success() => Some(logo_url),
            _ => {
                warn!("Could not find logo for {}.", company_name);
                None
            }
        }
    }
}
