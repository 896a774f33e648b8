// src/classify.rs

use regex::Regex;
use serde::{Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;

static YEARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)[ -]?year[s]?").expect("valid regex"));

const FRESHER_KEYWORDS: &[&str] = &[
    "fresher",
    "entry level",
    "0-1 year",
    "junior",
    "intern",
    "graduate",
    "fresh graduate",
];

const SENIOR_KEYWORDS: &[&str] = &["senior", "lead", "manager", "2+", "3+"];

/// Coarse seniority bucket for a posting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExperienceLevel {
    Fresher,
    Years(u32),
    Experienced,
}

impl fmt::Display for ExperienceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExperienceLevel::Fresher => write!(f, "fresher"),
            ExperienceLevel::Years(n) => write!(f, "{}exp", n),
            ExperienceLevel::Experienced => write!(f, "exp"),
        }
    }
}

impl Serialize for ExperienceLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Classify a posting from its title and (tag-stripped) description.
///
/// The fresher check runs before the numeric-years check on purpose:
/// entry-level postings routinely say "0-1 year" right next to "fresher",
/// and the years pattern must not capture those.
pub fn classify_experience(title: &str, description: &str) -> ExperienceLevel {
    let text = format!("{} {}", title, description).to_lowercase();

    if FRESHER_KEYWORDS.iter().any(|kw| text.contains(kw)) {
        return ExperienceLevel::Fresher;
    }

    if let Some(caps) = YEARS.captures(&text) {
        if let Ok(years) = caps[1].parse::<u32>() {
            return ExperienceLevel::Years(years);
        }
    }

    if SENIOR_KEYWORDS.iter().any(|kw| text.contains(kw)) {
        return ExperienceLevel::Experienced;
    }

    ExperienceLevel::Fresher
}
