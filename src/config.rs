// src/config.rs
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

use crate::crawler::CrawlSettings;

/// Standard facet identifier restricting Workday-style search results to
/// India.
pub const INDIA_COUNTRY_FACET_ID: &str = "c4f78be1a8f14da0ab49ce1162348a5e";

/// One recruiting portal to crawl, as supplied by configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteDescriptor {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_sites")]
    pub sites: Vec<SiteDescriptor>,
    #[serde(default)]
    pub crawl: CrawlConfig,
    #[serde(default)]
    pub publish: PublishConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    pub country_facet: String,
    pub page_limit: u32,
    pub location_keyword: String,
    /// Postings with no recognizable posted-on text count as posted
    /// "today" when true. This mirrors the upstream portals' blank-date
    /// quirk; set to false to crawl strictly dated postings.
    pub include_undated: bool,
    pub fetch_timeout_secs: u64,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            country_facet: INDIA_COUNTRY_FACET_ID.to_string(),
            page_limit: 20,
            location_keyword: "india".to_string(),
            include_undated: true,
            fetch_timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PublishConfig {
    pub api_base: String,
    /// Attempts per record when the publishing endpoint reports a quota
    /// rejection.
    pub max_retries: u32,
    pub retry_delay_secs: u64,
    /// Jittered pause between successive publishes, drawn uniformly from
    /// this range.
    pub min_post_delay_secs: u64,
    pub max_post_delay_secs: u64,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            api_base: "https://www.googleapis.com/blogger/v3".to_string(),
            max_retries: 3,
            retry_delay_secs: 60,
            min_post_delay_secs: 30,
            max_post_delay_secs: 60,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            sites: default_sites(),
            crawl: CrawlConfig::default(),
            publish: PublishConfig::default(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    local: AppConfig,
    production: AppConfig,
}

impl AppConfig {
    /// Load configuration for the current environment from `config.yaml`.
    /// Falls back to the built-in defaults when no file is present, so
    /// the CLI and tests run configless.
    pub fn load() -> Result<Self> {
        let environment = Self::get_environment();
        let config_path = PathBuf::from("config.yaml");

        if !config_path.exists() {
            info!("No config.yaml found, using built-in defaults");
            return Ok(Self::default());
        }

        info!("Loading configuration for environment: {}", environment);
        let config_content =
            std::fs::read_to_string(&config_path).context("Failed to read config.yaml")?;
        let config_file: ConfigFile =
            serde_yaml::from_str(&config_content).context("Failed to parse config.yaml")?;

        Ok(match environment.as_str() {
            "production" => config_file.production,
            _ => config_file.local,
        })
    }

    fn get_environment() -> String {
        std::env::var("JOBSCOUT_ENV")
            .or_else(|_| std::env::var("ENVIRONMENT"))
            .or_else(|_| std::env::var("ENV"))
            .unwrap_or_else(|_| "local".to_string())
    }

    pub fn crawl_settings(&self) -> CrawlSettings {
        CrawlSettings {
            country_facet: self.crawl.country_facet.clone(),
            page_limit: self.crawl.page_limit,
            location_keyword: self.crawl.location_keyword.clone(),
            include_undated: self.crawl.include_undated,
            fetch_timeout: Duration::from_secs(self.crawl.fetch_timeout_secs),
        }
    }
}

fn default_sites() -> Vec<SiteDescriptor> {
    [
        ("Boeing", "https://boeing.wd1.myworkdayjobs.com/EXTERNAL_CAREERS"),
        ("3M", "https://3m.wd1.myworkdayjobs.com/search"),
        ("Adobe", "https://adobe.wd5.myworkdayjobs.com/external_experienced"),
        ("NVIDIA", "https://nvidia.wd5.myworkdayjobs.com/NVIDIAExternalCareerSite"),
        ("Salesforce", "https://salesforce.wd12.myworkdayjobs.com/External_Career_Site"),
        ("Target", "https://target.wd5.myworkdayjobs.com/targetcareers"),
        ("Walmart", "https://walmart.wd5.myworkdayjobs.com/WalmartExternal"),
        ("Chevron", "https://chevron.wd5.myworkdayjobs.com/jobs"),
        ("Deloitte", "https://deloitteie.wd3.myworkdayjobs.com/Early_Careers"),
        ("Puma", "https://puma.wd3.myworkdayjobs.com/Jobs_at_Puma"),
        ("Sanofi", "https://sanofi.wd3.myworkdayjobs.com/SanofiCareers"),
        ("Comcast", "https://comcast.wd5.myworkdayjobs.com/Comcast_Careers"),
        ("Abbott", "https://abbott.wd5.myworkdayjobs.com/abbottcareers"),
        ("Amgen", "https://amgen.wd1.myworkdayjobs.com/Careers"),
        ("American Electric Power", "https://aep.wd1.myworkdayjobs.com/AEPCareerSite"),
        ("Applied Materials", "https://amat.wd1.myworkdayjobs.com/External"),
        ("Arrow Electronics", "https://arrow.wd1.myworkdayjobs.com/AC"),
        ("Assurant", "https://assurant.wd1.myworkdayjobs.com/Assurant_Careers"),
        ("AT&T", "https://att.wd1.myworkdayjobs.com/ATTGeneral"),
        ("Avis Budget Group", "https://avisbudget.wd1.myworkdayjobs.com/ABG_Careers"),
        ("BlackRock", "https://blackrock.wd1.myworkdayjobs.com/BlackRock_Professional"),
        ("Bupa", "https://bupa.wd3.myworkdayjobs.com/EXT_CAREER"),
        ("Cognizant", "https://collaborative.wd1.myworkdayjobs.com/AllOpenings"),
    ]
    .into_iter()
    .map(|(name, url)| SiteDescriptor {
        name: name.to_string(),
        url: url.to_string(),
    })
    .collect()
}
