// src/extract.rs
//! Fetches one posting's detail document and heuristically pulls
//! structured attributes out of its HTML-bearing free-text description.
//!
//! Everything here is best-effort, duck-typed parsing over unstructured
//! text. Failures never cross this boundary: a posting whose detail
//! document cannot be fetched or parsed degrades to placeholder values.

use regex::Regex;
use reqwest::Client;
use scraper::Html;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::warn;

static SKILL_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    // An identifier-like token (alphanumeric plus +.#, optionally
    // slash-joined) immediately followed by a list delimiter.
    Regex::new(r"(?i)\b([A-Za-z0-9+.#]+(?:/[A-Za-z0-9+.#]+)?)\s*(?:,|\.|;|\(|\)|\s(?:and|or)\s)")
        .expect("valid regex")
});

static NUMERIC_ONLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+$").expect("valid regex"));

static EXPERIENCE_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(\d+\s*-\s*\d+\s*(?:year[s]?)?(?:\s*of\s*experience)?|\d+\s*\+\s*(?:year[s]?)?(?:\s*of\s*experience)?)",
    )
    .expect("valid regex")
});

pub const NOT_SPECIFIED: &str = "Not specified";

const MAX_SKILLS: usize = 5;

/// Attributes extracted from one detail document.
#[derive(Debug, Clone, PartialEq)]
pub struct JobDetails {
    /// Description as published, HTML and all.
    pub description: String,
    /// Tag-stripped text the heuristics ran over.
    pub cleaned_description: String,
    pub skills: Vec<String>,
    pub experience_range: String,
}

/// Context for building a placeholder when the detail fetch degrades.
pub struct PostingContext<'a> {
    pub title: &'a str,
    pub location: &'a str,
    pub company: &'a str,
}

impl PostingContext<'_> {
    fn placeholder_description(&self) -> String {
        format!(
            "{} - {}. Exciting opportunity at {} in India.",
            self.title, self.location, self.company
        )
    }
}

pub struct DetailExtractor {
    client: Client,
}

impl DetailExtractor {
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent("Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36")
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }

    /// Fetch and extract one posting's details. Any fetch or parse
    /// failure yields the placeholder built from `context` instead of an
    /// error.
    pub async fn extract(&self, detail_url: &str, context: &PostingContext<'_>) -> JobDetails {
        match self.fetch_description(detail_url).await {
            Ok(Some(description)) => {
                let cleaned = strip_html(&description);
                JobDetails {
                    skills: extract_skills(&cleaned),
                    experience_range: extract_experience_range(&cleaned),
                    description,
                    cleaned_description: cleaned,
                }
            }
            Ok(None) => {
                // Document fetched but carried no description field.
                let description = context.placeholder_description();
                JobDetails {
                    cleaned_description: description.clone(),
                    skills: extract_skills(&description),
                    experience_range: extract_experience_range(&description),
                    description,
                }
            }
            Err(e) => {
                warn!("Could not fetch details for {}: {}", context.title, e);
                degraded_details(context)
            }
        }
    }

    async fn fetch_description(&self, detail_url: &str) -> anyhow::Result<Option<String>> {
        let response = self.client.get(detail_url).send().await?;
        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("detail endpoint returned {}", status);
        }

        let body: serde_json::Value = response.json().await?;
        Ok(body["jobPostingInfo"]["jobDescription"]
            .as_str()
            .map(|s| s.to_string()))
    }
}

/// Placeholder details for a posting whose document could not be used.
pub fn degraded_details(context: &PostingContext<'_>) -> JobDetails {
    let description = context.placeholder_description();
    JobDetails {
        cleaned_description: description.clone(),
        description,
        skills: vec![NOT_SPECIFIED.to_string()],
        experience_range: NOT_SPECIFIED.to_string(),
    }
}

/// Drop HTML tags, keeping the text content with collapsed whitespace.
pub fn strip_html(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let text = fragment
        .root_element()
        .text()
        .collect::<Vec<_>>()
        .join(" ");
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Scan a cleaned description for skill-looking tokens. Candidates
/// shorter than three characters or purely numeric are discarded;
/// duplicates keep their first occurrence; at most five survive.
pub fn extract_skills(text: &str) -> Vec<String> {
    let mut skills: Vec<String> = Vec::new();
    for caps in SKILL_TOKEN.captures_iter(text) {
        let token = &caps[1];
        if token.len() <= 2 || NUMERIC_ONLY.is_match(token) {
            continue;
        }
        if skills.iter().any(|s| s == token) {
            continue;
        }
        skills.push(token.to_string());
        if skills.len() == MAX_SKILLS {
            break;
        }
    }
    skills
}

/// First "N-M years" or "N+ years" shaped substring, else "Not specified".
pub fn extract_experience_range(text: &str) -> String {
    EXPERIENCE_RANGE
        .find(text)
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| NOT_SPECIFIED.to_string())
}
