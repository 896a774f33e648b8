// src/publish.rs
//! Publishing collaborator: creates one post per job record on the blog
//! backend, retrying quota rejections with a fixed backoff. Exhausting
//! the retry budget drops that single record; it is never fatal to the
//! run.

use regex::Regex;
use reqwest::{Client, StatusCode};
use serde_json::json;
use std::sync::LazyLock;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

static NUMERIC_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+$").expect("valid regex"));

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("quota exhausted after {attempts} attempts")]
    QuotaExhausted { attempts: u32 },
    #[error("publish rejected ({status}): {body}")]
    Rejected { status: StatusCode, body: String },
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Reference to a successfully created post.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishedPost {
    pub id: Option<String>,
    pub url: Option<String>,
}

/// The target blog identifier must be a single numeric value; anything
/// else is a configuration error caught before any network activity.
pub fn validate_blog_id(blog_id: &str) -> anyhow::Result<()> {
    if !NUMERIC_ID.is_match(blog_id) {
        anyhow::bail!(
            "Invalid blog ID '{}'. It should be a single numeric value (e.g., 7594720483112523181).",
            blog_id
        );
    }
    Ok(())
}

pub struct BlogPublisher {
    client: Client,
    api_base: String,
    blog_id: String,
    access_token: String,
    max_retries: u32,
    retry_delay: Duration,
}

impl BlogPublisher {
    pub fn new(
        api_base: String,
        blog_id: String,
        access_token: String,
        max_retries: u32,
        retry_delay: Duration,
    ) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            api_base,
            blog_id,
            access_token,
            max_retries,
            retry_delay,
        })
    }

    /// Create one post. Quota rejections are retried with a fixed delay
    /// up to the configured attempt count; any other rejection is fatal
    /// for this record only.
    pub async fn publish(
        &self,
        title: &str,
        content_html: &str,
        labels: &[String],
    ) -> Result<PublishedPost, PublishError> {
        let url = format!("{}/blogs/{}/posts/", self.api_base, self.blog_id);
        let body = json!({
            "kind": "blogger#post",
            "blog": { "id": self.blog_id },
            "title": title,
            "content": content_html,
            "labels": labels,
        });

        for attempt in 1..=self.max_retries {
            let response = self
                .client
                .post(&url)
                .bearer_auth(&self.access_token)
                .query(&[("isDraft", "false")])
                .json(&body)
                .send()
                .await?;

            let status = response.status();
            if status.is_success() {
                let created: serde_json::Value = response.json().await.unwrap_or_default();
                return Ok(PublishedPost {
                    id: created["id"].as_str().map(|s| s.to_string()),
                    url: created["url"].as_str().map(|s| s.to_string()),
                });
            }

            let error_body = response.text().await.unwrap_or_default();
            if is_quota_rejection(status, &error_body) {
                warn!(
                    "Quota exceeded for '{}'. Retrying after {:?} ({}/{})...",
                    title, self.retry_delay, attempt, self.max_retries
                );
                if attempt < self.max_retries {
                    tokio::time::sleep(self.retry_delay).await;
                }
                continue;
            }

            return Err(PublishError::Rejected {
                status,
                body: error_body,
            });
        }

        Err(PublishError::QuotaExhausted {
            attempts: self.max_retries,
        })
    }
}

fn is_quota_rejection(status: StatusCode, body: &str) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS
        || (status == StatusCode::FORBIDDEN
            && (body.contains("quotaExceeded") || body.contains("rateLimitExceeded")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn publisher(server: &mockito::Server, max_retries: u32) -> BlogPublisher {
        BlogPublisher::new(
            server.url(),
            "123456".to_string(),
            "test-token".to_string(),
            max_retries,
            Duration::from_millis(0),
        )
        .unwrap()
    }

    #[test]
    fn test_validate_blog_id() {
        assert!(validate_blog_id("7594720483112523181").is_ok());
        assert!(validate_blog_id("my-blog").is_err());
        assert!(validate_blog_id("123 456").is_err());
        assert!(validate_blog_id("").is_err());
    }

    #[tokio::test]
    async fn test_publish_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/blogs/123456/posts/")
            .match_header("authorization", "Bearer test-token")
            .match_query(mockito::Matcher::UrlEncoded(
                "isDraft".into(),
                "false".into(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id":"99","url":"https://blog.example.com/p/99"}"#)
            .create_async()
            .await;

        let result = publisher(&server, 3)
            .publish("Title", "<p>body</p>", &["tag".to_string()])
            .await
            .unwrap();
        assert_eq!(result.url.as_deref(), Some("https://blog.example.com/p/99"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_publish_retries_quota_until_exhaustion() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/blogs/123456/posts/")
            .match_query(mockito::Matcher::Any)
            .with_status(403)
            .with_body(r#"{"error":{"errors":[{"reason":"rateLimitExceeded"}]}}"#)
            .expect(3)
            .create_async()
            .await;

        let err = publisher(&server, 3)
            .publish("T", "<p>b</p>", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, PublishError::QuotaExhausted { attempts: 3 }));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_publish_treats_429_as_quota() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/blogs/123456/posts/")
            .match_query(mockito::Matcher::Any)
            .with_status(429)
            .with_body("slow down")
            .expect(2)
            .create_async()
            .await;

        let err = publisher(&server, 2)
            .publish("T", "<p>b</p>", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, PublishError::QuotaExhausted { attempts: 2 }));
    }

    #[tokio::test]
    async fn test_publish_fatal_rejection_is_not_retried() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/blogs/123456/posts/")
            .match_query(mockito::Matcher::Any)
            .with_status(401)
            .with_body("bad token")
            .expect(1)
            .create_async()
            .await;

        let err = publisher(&server, 3)
            .publish("T", "<p>b</p>", &[])
            .await
            .unwrap_err();
        match err {
            PublishError::Rejected { status, .. } => assert_eq!(status, StatusCode::UNAUTHORIZED),
            other => panic!("expected Rejected, got {:?}", other),
        }
        mock.assert_async().await;
    }
}
