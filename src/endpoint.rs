// src/endpoint.rs
//! Derives the machine search/detail API endpoints of a recruiting portal
//! from its human-facing search URL. No network access; a URL that does
//! not parse is a configuration error and is never retried.

use anyhow::{Context, Result};
use reqwest::Url;

/// API surface of one portal, derived once per site before crawling.
/// The search and detail endpoints are guaranteed to share the same
/// tenant/site pair because both are built from the same parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEndpoint {
    pub tenant: String,
    pub site: String,
    origin: String,
}

impl ResolvedEndpoint {
    /// Derive tenant and site from a base URL of the shape
    /// `https://<tenant>.<cluster>.../<site>`, where the site segment may
    /// carry a leading `en-US/` locale marker.
    pub fn resolve(base_url: &str) -> Result<Self> {
        let url = Url::parse(base_url)
            .with_context(|| format!("Invalid site base URL: {}", base_url))?;

        let host = url
            .host_str()
            .with_context(|| format!("Site base URL has no host: {}", base_url))?;

        let tenant = host
            .split('.')
            .next()
            .unwrap_or(host)
            .to_string();

        let path = url.path().trim_matches('/');
        let site = match path.split_once("en-US/") {
            Some((_, rest)) => rest.to_string(),
            None => path.to_string(),
        };

        let origin = match url.port() {
            Some(port) => format!("{}://{}:{}", url.scheme(), host, port),
            None => format!("{}://{}", url.scheme(), host),
        };

        Ok(Self {
            tenant,
            site,
            origin,
        })
    }

    /// Paginated search endpoint (POST, JSON body).
    pub fn search_url(&self) -> String {
        format!(
            "{}/wday/cxs/{}/{}/jobs",
            self.origin, self.tenant, self.site
        )
    }

    /// Detail endpoint for one posting (GET). `external_path` is the
    /// posting's relative path as reported by the search API, including
    /// its leading slash.
    pub fn detail_url(&self, external_path: &str) -> String {
        format!(
            "{}/wday/cxs/{}/{}/job{}",
            self.origin, self.tenant, self.site, external_path
        )
    }

    /// Human-facing apply link for one posting.
    pub fn apply_link(&self, slug: &str, requisition_id: &str) -> String {
        format!(
            "{}/en-US/{}/details/{}?q={}",
            self.origin, self.site, slug, requisition_id
        )
    }
}

/// Split a posting's external path into its slug (last path segment) and
/// the trailing requisition id after the final underscore. Without an
/// underscore, slug and id coincide.
pub fn split_requisition(external_path: &str) -> (String, String) {
    let slug = external_path.rsplit('/').next().unwrap_or(external_path);
    match slug.rsplit_once('_') {
        Some((_, id)) => (slug.to_string(), id.to_string()),
        None => (slug.to_string(), slug.to_string()),
    }
}
