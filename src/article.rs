// src/article.rs
//! Turns a normalized job record into the published post: a derived
//! title and an HTML article body.

use regex::Regex;
use std::sync::LazyLock;

use crate::crawler::JobRecord;

static TITLE_QUALIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+-\s+.*").expect("valid regex"));

/// Post title: the job title with any trailing " - qualifier" stripped,
/// suffixed with the classified experience level.
pub fn post_title(record: &JobRecord) -> String {
    let base = TITLE_QUALIFIER.replace(&record.title, "");
    format!("{} - {}", base.trim(), record.experience_level)
}

/// Render the HTML article body for one record. The description is
/// embedded as published (it may carry its own markup).
pub fn render_article(record: &JobRecord, logo_url: Option<&str>) -> String {
    let mut html = format!("<h2>{}</h2>\n", post_title(record));

    if let Some(logo) = logo_url {
        html.push_str(&format!(
            "<img src='{}' alt='{} logo' style='max-width:100px;height:auto;margin-bottom:20px;'>\n",
            logo, record.company
        ));
    }

    html.push_str(&format!(
        "<h3>{} - {}</h3>\n",
        record.company, record.posted_date
    ));
    html.push_str(&format!("{}\n", record.description));
    html.push_str(&format!(
        "<p><strong>Location:</strong> {}</p>\n",
        record.location
    ));
    html.push_str(&format!(
        "<p><strong>Skills:</strong> {}</p>\n",
        record.skills.join(", ")
    ));
    html.push_str(&format!(
        "<p><strong>Experience:</strong> {}</p>\n",
        record.experience_range
    ));
    html.push_str(&format!(
        "<p><strong>Apply Now:</strong> <a href='{}'>Apply Link</a></p>\n",
        record.apply_link
    ));

    html
}
