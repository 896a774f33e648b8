// src/crawler.rs
//! Date-scoped incremental crawl of one portal's paginated search API.
//!
//! Per site the crawl is a small state machine: fetch a page, filter it
//! into an immutable [`PageOutcome`], then decide whether to advance the
//! cursor or terminate. Postings are assumed roughly recency-ordered, so
//! a posting provably older than the target window ends pagination after
//! the current page. Search failures terminate the site with whatever was
//! accumulated; partial results are valid output, never an error.

use std::time::Duration;

use anyhow::Result;
use chrono::NaiveDate;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::classify::{classify_experience, ExperienceLevel};
use crate::config::SiteDescriptor;
use crate::dates::{decode_posted, DateSource};
use crate::endpoint::{split_requisition, ResolvedEndpoint};
use crate::extract::{DetailExtractor, PostingContext};

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Tunables for one crawl run.
#[derive(Debug, Clone)]
pub struct CrawlSettings {
    /// Opaque facet identifier restricting search results to one country.
    pub country_facet: String,
    /// Page size for the search API.
    pub page_limit: u32,
    /// Postings whose location text does not contain this (lowercase)
    /// keyword are skipped.
    pub location_keyword: String,
    /// Whether postings with no recognizable date text count as posted on
    /// the reference date. The upstream text is sometimes blank; this
    /// makes the historically-implicit "blank means today" policy an
    /// explicit knob.
    pub include_undated: bool,
    /// Timeout for search and detail fetches.
    pub fetch_timeout: Duration,
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self {
            country_facet: crate::config::INDIA_COUNTRY_FACET_ID.to_string(),
            page_limit: 20,
            location_keyword: "india".to_string(),
            include_undated: true,
            fetch_timeout: Duration::from_secs(10),
        }
    }
}

/// Canonical, normalized output record for one matched posting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobRecord {
    pub title: String,
    /// Description as published (HTML-bearing).
    pub description: String,
    pub apply_link: String,
    pub posted_date: NaiveDate,
    #[serde(rename = "exp")]
    pub experience_level: ExperienceLevel,
    pub company: String,
    pub location: String,
    pub skills: Vec<String>,
    #[serde(rename = "experience")]
    pub experience_range: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawPosting {
    #[serde(default)]
    pub title: String,
    #[serde(rename = "externalPath", default)]
    pub external_path: String,
    #[serde(rename = "locationsText", default)]
    pub locations_text: String,
    #[serde(rename = "postedOn", default)]
    pub posted_on: String,
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    #[serde(rename = "appliedFacets")]
    applied_facets: AppliedFacets<'a>,
    limit: u32,
    offset: u32,
    #[serde(rename = "searchText")]
    search_text: &'a str,
}

#[derive(Serialize)]
struct AppliedFacets<'a> {
    #[serde(rename = "locationCountry")]
    location_country: [&'a str; 1],
}

#[derive(Debug, Default, Deserialize)]
struct SearchResponse {
    #[serde(rename = "jobPostings", default)]
    job_postings: Vec<RawPosting>,
    #[serde(default)]
    total: u32,
}

/// A posting that survived filtering and awaits detail extraction.
#[derive(Debug, Clone, PartialEq)]
struct MatchedPosting {
    title: String,
    location: String,
    apply_link: String,
    detail_url: String,
}

/// Immutable result of filtering one page.
#[derive(Debug)]
struct PageOutcome {
    matched: Vec<MatchedPosting>,
    /// Set when a posting on this page is older than the target window,
    /// meaning later pages cannot contain matches.
    past_target: bool,
}

/// Cursor decision after one page.
#[derive(Debug, PartialEq, Eq)]
enum CrawlStep {
    Continue { offset: u32 },
    Terminated,
}

fn filter_page(
    postings: &[RawPosting],
    endpoint: &ResolvedEndpoint,
    target: NaiveDate,
    reference: NaiveDate,
    settings: &CrawlSettings,
) -> PageOutcome {
    let target_days_ago = (reference - target).num_days();
    let mut matched = Vec::new();
    let mut past_target = false;

    for posting in postings {
        if posting.external_path.is_empty() {
            continue;
        }
        if !posting
            .locations_text
            .to_lowercase()
            .contains(&settings.location_keyword)
        {
            continue;
        }

        let decoded = decode_posted(&posting.posted_on, reference);
        let undated_excluded =
            decoded.source == DateSource::Unspecified && !settings.include_undated;
        if decoded.date != target || undated_excluded {
            if decoded.days_ago > target_days_ago {
                past_target = true;
            }
            continue;
        }

        let (slug, requisition_id) = split_requisition(&posting.external_path);
        let title = if posting.title.is_empty() {
            "Unknown Title".to_string()
        } else {
            posting.title.clone()
        };

        matched.push(MatchedPosting {
            title,
            location: posting.locations_text.clone(),
            apply_link: endpoint.apply_link(&slug, &requisition_id),
            detail_url: endpoint.detail_url(&posting.external_path),
        });
    }

    PageOutcome {
        matched,
        past_target,
    }
}

fn advance(offset: u32, limit: u32, page_count: usize, total: u32, past_target: bool) -> CrawlStep {
    if page_count == 0 || past_target {
        return CrawlStep::Terminated;
    }
    let next = offset + limit;
    if next >= total {
        CrawlStep::Terminated
    } else {
        CrawlStep::Continue { offset: next }
    }
}

pub struct Crawler {
    client: Client,
    extractor: DetailExtractor,
    settings: CrawlSettings,
}

impl Crawler {
    pub fn new(settings: CrawlSettings) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(settings.fetch_timeout)
            .build()?;
        let extractor = DetailExtractor::new(settings.fetch_timeout)?;
        Ok(Self {
            client,
            extractor,
            settings,
        })
    }

    /// Crawl one site for postings published exactly on `target`.
    /// `reference` is the crawl's notion of "today"; relative posted-on
    /// text is decoded against it, never against the wall clock.
    pub async fn crawl_site(
        &self,
        site: &SiteDescriptor,
        endpoint: &ResolvedEndpoint,
        target: NaiveDate,
        reference: NaiveDate,
    ) -> Vec<JobRecord> {
        let search_url = endpoint.search_url();
        let mut records = Vec::new();
        let mut offset = 0;

        loop {
            let page = match self.fetch_page(&search_url, offset).await {
                Ok(page) => page,
                Err(e) => {
                    error!("Failed to fetch jobs for {}: {}", site.name, e);
                    break;
                }
            };

            let outcome = filter_page(&page.job_postings, endpoint, target, reference, &self.settings);

            for posting in &outcome.matched {
                let context = PostingContext {
                    title: &posting.title,
                    location: &posting.location,
                    company: &site.name,
                };
                let details = self.extractor.extract(&posting.detail_url, &context).await;
                let experience_level =
                    classify_experience(&posting.title, &details.cleaned_description);

                records.push(JobRecord {
                    title: posting.title.clone(),
                    description: details.description,
                    apply_link: posting.apply_link.clone(),
                    posted_date: target,
                    experience_level,
                    company: site.name.clone(),
                    location: posting.location.clone(),
                    skills: details.skills,
                    experience_range: details.experience_range,
                });
            }

            match advance(
                offset,
                self.settings.page_limit,
                page.job_postings.len(),
                page.total,
                outcome.past_target,
            ) {
                CrawlStep::Continue { offset: next } => offset = next,
                CrawlStep::Terminated => break,
            }
        }

        info!(
            "{}: {} posting(s) matched {}",
            site.name,
            records.len(),
            target
        );
        records
    }

    async fn fetch_page(&self, search_url: &str, offset: u32) -> Result<SearchResponse> {
        let request = SearchRequest {
            applied_facets: AppliedFacets {
                location_country: [self.settings.country_facet.as_str()],
            },
            limit: self.settings.page_limit,
            offset,
            search_text: "",
        };

        let response = self.client.post(search_url).json(&request).send().await?;
        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("search endpoint returned {}", status);
        }

        Ok(response.json::<SearchResponse>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn posting(title: &str, path: &str, location: &str, posted_on: &str) -> RawPosting {
        RawPosting {
            title: title.to_string(),
            external_path: path.to_string(),
            locations_text: location.to_string(),
            posted_on: posted_on.to_string(),
        }
    }

    fn endpoint() -> ResolvedEndpoint {
        ResolvedEndpoint::resolve("https://acme.wd5.example.com/careers").unwrap()
    }

    #[test]
    fn test_filter_page_matches_target_date() {
        let reference = d(2024, 3, 5);
        let postings = vec![
            posting("A", "/job/Pune/A_R-1", "Pune, India", "Posted 2 Days Ago"),
            posting("B", "/job/Pune/B_R-2", "Pune, India", "Posted Today"),
        ];
        let outcome = filter_page(
            &postings,
            &endpoint(),
            d(2024, 3, 3),
            reference,
            &CrawlSettings::default(),
        );
        assert_eq!(outcome.matched.len(), 1);
        assert_eq!(outcome.matched[0].title, "A");
        assert!(!outcome.past_target);
    }

    #[test]
    fn test_filter_page_skips_foreign_locations() {
        let postings = vec![posting("A", "/job/Austin/A_R-1", "Austin, TX", "Today")];
        let outcome = filter_page(
            &postings,
            &endpoint(),
            d(2024, 3, 5),
            d(2024, 3, 5),
            &CrawlSettings::default(),
        );
        assert!(outcome.matched.is_empty());
    }

    #[test]
    fn test_filter_page_flags_past_target() {
        let postings = vec![posting(
            "Old",
            "/job/Pune/Old_R-9",
            "Pune, India",
            "Posted 30 Days Ago",
        )];
        let outcome = filter_page(
            &postings,
            &endpoint(),
            d(2024, 3, 3),
            d(2024, 3, 5),
            &CrawlSettings::default(),
        );
        assert!(outcome.matched.is_empty());
        assert!(outcome.past_target);
    }

    #[test]
    fn test_filter_page_undated_policy() {
        let postings = vec![posting("A", "/job/Pune/A_R-1", "Pune, India", "")];

        let mut settings = CrawlSettings::default();
        let outcome = filter_page(&postings, &endpoint(), d(2024, 3, 5), d(2024, 3, 5), &settings);
        assert_eq!(outcome.matched.len(), 1);

        settings.include_undated = false;
        let outcome = filter_page(&postings, &endpoint(), d(2024, 3, 5), d(2024, 3, 5), &settings);
        assert!(outcome.matched.is_empty());
    }

    #[test]
    fn test_advance_decisions() {
        assert_eq!(advance(0, 20, 20, 100, false), CrawlStep::Continue { offset: 20 });
        assert_eq!(advance(0, 20, 0, 100, false), CrawlStep::Terminated);
        assert_eq!(advance(0, 20, 20, 100, true), CrawlStep::Terminated);
        assert_eq!(advance(80, 20, 20, 100, false), CrawlStep::Terminated);
        assert_eq!(advance(0, 20, 20, 20, false), CrawlStep::Terminated);
    }

    mod http {
        use super::*;

        fn site(server_url: &str) -> (SiteDescriptor, ResolvedEndpoint) {
            let url = format!("{}/careers", server_url);
            let endpoint = ResolvedEndpoint::resolve(&url).unwrap();
            (
                SiteDescriptor {
                    name: "Acme".to_string(),
                    url,
                },
                endpoint,
            )
        }

        fn search_body(postings: serde_json::Value, total: u32) -> String {
            serde_json::json!({ "jobPostings": postings, "total": total }).to_string()
        }

        #[tokio::test]
        async fn test_stops_after_page_past_target_date() {
            let mut server = mockito::Server::new_async().await;
            let (site, endpoint) = site(&server.url());

            // First page is already older than the target; no further
            // page may be requested.
            let first = server
                .mock("POST", "/wday/cxs/127/careers/jobs")
                .match_body(Matcher::PartialJson(serde_json::json!({"offset": 0})))
                .with_status(200)
                .with_header("content-type", "application/json")
                .with_body(search_body(
                    serde_json::json!([{
                        "title": "Old Role",
                        "externalPath": "/job/Pune/Old-Role_R-9",
                        "locationsText": "Pune, India",
                        "postedOn": "Posted 10 Days Ago"
                    }]),
                    100,
                ))
                .create_async()
                .await;
            let second = server
                .mock("POST", "/wday/cxs/127/careers/jobs")
                .match_body(Matcher::PartialJson(serde_json::json!({"offset": 20})))
                .expect(0)
                .create_async()
                .await;

            let crawler = Crawler::new(CrawlSettings::default()).unwrap();
            let records = crawler
                .crawl_site(&site, &endpoint, d(2024, 3, 3), d(2024, 3, 5))
                .await;

            assert!(records.is_empty());
            first.assert_async().await;
            second.assert_async().await;
        }

        #[tokio::test]
        async fn test_search_failure_yields_partial_results() {
            let mut server = mockito::Server::new_async().await;
            let (site, endpoint) = site(&server.url());

            let _mock = server
                .mock("POST", "/wday/cxs/127/careers/jobs")
                .with_status(503)
                .create_async()
                .await;

            let crawler = Crawler::new(CrawlSettings::default()).unwrap();
            let records = crawler
                .crawl_site(&site, &endpoint, d(2024, 3, 5), d(2024, 3, 5))
                .await;
            assert!(records.is_empty());
        }

        #[tokio::test]
        async fn test_crawl_is_idempotent_against_fixed_responses() {
            let mut server = mockito::Server::new_async().await;
            let (site, endpoint) = site(&server.url());

            let _search = server
                .mock("POST", "/wday/cxs/127/careers/jobs")
                .with_status(200)
                .with_header("content-type", "application/json")
                .with_body(search_body(
                    serde_json::json!([{
                        "title": "Platform Engineer",
                        "externalPath": "/job/Bengaluru/Platform-Engineer_JR-77",
                        "locationsText": "Bengaluru, India",
                        "postedOn": "Posted Today"
                    }]),
                    1,
                ))
                .expect(2)
                .create_async()
                .await;

            let _detail = server
                .mock(
                    "GET",
                    "/wday/cxs/127/careers/job/job/Bengaluru/Platform-Engineer_JR-77",
                )
                .with_status(200)
                .with_header("content-type", "application/json")
                .with_body(
                    serde_json::json!({
                        "jobPostingInfo": {
                            "jobDescription": "<p>Kubernetes, Terraform, and Go. 4-6 years of experience.</p>"
                        }
                    })
                    .to_string(),
                )
                .expect(2)
                .create_async()
                .await;

            let crawler = Crawler::new(CrawlSettings::default()).unwrap();
            let first = crawler
                .crawl_site(&site, &endpoint, d(2024, 3, 5), d(2024, 3, 5))
                .await;
            let second = crawler
                .crawl_site(&site, &endpoint, d(2024, 3, 5), d(2024, 3, 5))
                .await;

            assert_eq!(first.len(), 1);
            assert_eq!(first, second);
            assert_eq!(
                serde_json::to_string(&first).unwrap(),
                serde_json::to_string(&second).unwrap()
            );

            let record = &first[0];
            assert_eq!(record.posted_date, d(2024, 3, 5));
            assert_eq!(record.company, "Acme");
            assert_eq!(record.experience_level, ExperienceLevel::Years(6));
            assert!(record.skills.contains(&"Kubernetes".to_string()));
            assert!(record
                .apply_link
                .contains("/en-US/careers/details/Platform-Engineer_JR-77?q=JR-77"));
        }
    }
}
