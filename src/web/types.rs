// src/web/types.rs

use rocket::serde::{Deserialize, Serialize};

#[derive(Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct PostJobsRequest {
    /// Numeric identifier of the target blog.
    pub blog_id: String,
    /// Target date is today minus this many days.
    #[serde(default)]
    pub days_ago: i64,
    /// OAuth bearer token for the publishing endpoint.
    pub access_token: String,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct RunSummary {
    pub status: String,
    pub posted_count: u32,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub error_code: String,
    pub suggestions: Vec<String>,
}

impl ErrorResponse {
    pub fn new(error: String, error_code: String, suggestions: Vec<String>) -> Self {
        Self {
            success: false,
            error,
            error_code,
            suggestions,
        }
    }
}
