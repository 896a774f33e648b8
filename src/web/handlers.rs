// src/web/handlers.rs

use std::time::Duration;

use chrono::Utc;
use rand::seq::SliceRandom;
use rand::Rng;
use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use rocket::State;
use tracing::{error, info, warn};

use crate::article;
use crate::config::{AppConfig, SiteDescriptor};
use crate::crawler::Crawler;
use crate::endpoint::ResolvedEndpoint;
use crate::logo::LogoClient;
use crate::publish::{validate_blog_id, BlogPublisher, PublishError};
use crate::tags;
use crate::web::types::{ErrorResponse, PostJobsRequest, RunSummary};

/// Crawl every configured site for the target date and publish each
/// matched record. Single-site and single-record failures are logged and
/// skipped; the response always carries the count of successful posts.
pub async fn post_jobs_handler(
    request: Json<PostJobsRequest>,
    config: &State<AppConfig>,
) -> Result<Json<RunSummary>, Custom<Json<ErrorResponse>>> {
    // Configuration errors fail fast, before any network activity, and
    // are rejected with a 400 rather than a dressed-up 200.
    if let Err(e) = validate_blog_id(&request.blog_id) {
        return Err(Custom(
            Status::BadRequest,
            Json(ErrorResponse::new(
                e.to_string(),
                "INVALID_BLOG_ID".to_string(),
                vec![
                    "Check your blog dashboard under Settings > Basic > Blog ID".to_string(),
                ],
            )),
        ));
    }

    let mut resolved: Vec<(SiteDescriptor, ResolvedEndpoint)> = Vec::new();
    for site in &config.sites {
        match ResolvedEndpoint::resolve(&site.url) {
            Ok(endpoint) => resolved.push((site.clone(), endpoint)),
            Err(e) => {
                return Err(Custom(
                    Status::BadRequest,
                    Json(ErrorResponse::new(
                        e.to_string(),
                        "INVALID_SITE_URL".to_string(),
                        vec![format!("Fix the configured URL for site '{}'", site.name)],
                    )),
                ));
            }
        }
    }

    let reference = Utc::now().date_naive();
    let target = reference - chrono::Duration::days(request.days_ago);
    info!(
        "Fetching jobs posted {} days ago ({})...",
        request.days_ago, target
    );

    let crawler = match Crawler::new(config.crawl_settings()) {
        Ok(crawler) => crawler,
        Err(e) => return Err(service_error(e)),
    };
    let logo_client = match LogoClient::new() {
        Ok(client) => client,
        Err(e) => return Err(service_error(e)),
    };
    let publisher = match BlogPublisher::new(
        config.publish.api_base.clone(),
        request.blog_id.clone(),
        request.access_token.clone(),
        config.publish.max_retries,
        Duration::from_secs(config.publish.retry_delay_secs),
    ) {
        Ok(publisher) => publisher,
        Err(e) => return Err(service_error(e)),
    };

    // Fresh shuffled run order per request; the configured roster is
    // never mutated.
    let mut run_order = resolved;
    {
        let mut rng = rand::thread_rng();
        run_order.shuffle(&mut rng);
    }

    let mut posted_count = 0u32;
    for (site, endpoint) in &run_order {
        info!("Processing {}...", site.name);
        let records = crawler.crawl_site(site, endpoint, target, reference).await;

        for record in records {
            let logo_url = logo_client.lookup(&site.name).await;
            let post_title = article::post_title(&record);
            let content_html = article::render_article(&record, logo_url.as_deref());
            let labels = tags::generate_tags(&post_title);

            info!("Creating post for: {}", post_title);
            match publisher.publish(&post_title, &content_html, &labels).await {
                Ok(post) => {
                    posted_count += 1;
                    if let Some(url) = post.url {
                        info!("Posted! Post URL: {}", url);
                    }
                }
                Err(PublishError::QuotaExhausted { attempts }) => {
                    warn!(
                        "Dropping '{}' after {} quota-limited attempts",
                        post_title, attempts
                    );
                }
                Err(e) => error!("Failed to post {}: {}", post_title, e),
            }

            // Jittered pause between publishes; the publishing endpoint
            // is the rate-limited party, not the portals.
            let delay = {
                let lo = config.publish.min_post_delay_secs;
                let hi = config.publish.max_post_delay_secs.max(lo);
                rand::thread_rng().gen_range(lo..=hi)
            };
            info!("Waiting {} seconds before next post...", delay);
            tokio::time::sleep(Duration::from_secs(delay)).await;
        }
    }

    Ok(Json(RunSummary {
        status: "success".to_string(),
        posted_count,
    }))
}

fn service_error(e: anyhow::Error) -> Custom<Json<ErrorResponse>> {
    error!("Service initialization failed: {}", e);
    Custom(
        Status::InternalServerError,
        Json(ErrorResponse::new(
            e.to_string(),
            "SERVICE_ERROR".to_string(),
            vec!["Try again in a few moments".to_string()],
        )),
    )
}
