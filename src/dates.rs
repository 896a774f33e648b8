// src/dates.rs
//! Decoding of the free-text "posted on" indicator portals attach to a
//! posting ("Posted 3 Days Ago", "Posted Today", sometimes a literal date).

use chrono::{Duration, NaiveDate};
use regex::Regex;
use std::sync::LazyLock;

static LITERAL_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{4}-\d{2}-\d{2}").expect("valid regex"));

static DAYS_AGO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:posted\s+)?(\d+)\s+day[s]?\s+ago").expect("valid regex"));

/// Where the decoded date came from. `Unspecified` marks postings whose
/// text carried no recognizable date; whether those count as posted
/// "today" is a crawl-level policy decision, not something this module
/// silently assumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateSource {
    Literal,
    Today,
    Relative,
    Unspecified,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedPosted {
    pub date: NaiveDate,
    pub days_ago: i64,
    pub source: DateSource,
}

/// Decode a posted-indicator string against a reference "today".
///
/// Precedence: an embedded `YYYY-MM-DD` literal wins over any relative
/// phrase also present; then the token "today"; then "N day(s) ago";
/// otherwise the reference date itself with `DateSource::Unspecified`.
/// Pure — never consults the wall clock.
pub fn decode_posted(text: &str, reference: NaiveDate) -> DecodedPosted {
    if let Some(m) = LITERAL_DATE.find(text) {
        if let Ok(date) = NaiveDate::parse_from_str(m.as_str(), "%Y-%m-%d") {
            return DecodedPosted {
                date,
                days_ago: (reference - date).num_days(),
                source: DateSource::Literal,
            };
        }
    }

    if text.to_lowercase().contains("today") {
        return DecodedPosted {
            date: reference,
            days_ago: 0,
            source: DateSource::Today,
        };
    }

    if let Some(caps) = DAYS_AGO.captures(text) {
        if let Ok(n) = caps[1].parse::<i64>() {
            return DecodedPosted {
                date: reference - Duration::days(n),
                days_ago: n,
                source: DateSource::Relative,
            };
        }
    }

    DecodedPosted {
        date: reference,
        days_ago: 0,
        source: DateSource::Unspecified,
    }
}
