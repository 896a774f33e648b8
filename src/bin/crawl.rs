// src/bin/crawl.rs
//! Operator CLI: crawl the configured sites for one day's postings and
//! print the normalized records as JSON, without publishing anything.

use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use jobscout::config::AppConfig;
use jobscout::crawler::{Crawler, JobRecord};
use jobscout::endpoint::ResolvedEndpoint;

#[derive(Parser)]
#[command(name = "crawl")]
#[command(about = "Crawl configured career sites for one day's postings")]
struct Cli {
    /// Target date is today minus this many days
    #[arg(long, default_value_t = 0)]
    days_ago: i64,

    /// Only crawl the site with this display name
    #[arg(long)]
    site: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("jobscout=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load()?;

    let reference = Utc::now().date_naive();
    let target = reference - chrono::Duration::days(cli.days_ago);

    let crawler = Crawler::new(config.crawl_settings())?;
    let mut all_records: Vec<JobRecord> = Vec::new();

    for site in config.sites.iter().filter(|s| {
        cli.site
            .as_deref()
            .map_or(true, |name| name.eq_ignore_ascii_case(&s.name))
    }) {
        let endpoint = ResolvedEndpoint::resolve(&site.url)?;
        let mut records = crawler.crawl_site(site, &endpoint, target, reference).await;
        all_records.append(&mut records);
    }

    println!("{}", serde_json::to_string_pretty(&all_records)?);
    Ok(())
}
