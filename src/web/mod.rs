// src/web/mod.rs

pub mod handlers;
pub mod types;

pub use types::*;

use anyhow::Result;
use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::{Header, Status};
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use rocket::{catchers, get, options, post, routes, Request, Response, State};
use tracing::info;

use crate::config::AppConfig;

// CORS Fairing
pub struct Cors;

#[rocket::async_trait]
impl Fairing for Cors {
    fn info(&self) -> Info {
        Info {
            name: "Add CORS headers to responses",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, _request: &'r Request<'_>, response: &mut Response<'r>) {
        response.set_header(Header::new("Access-Control-Allow-Origin", "*"));
        response.set_header(Header::new(
            "Access-Control-Allow-Methods",
            "POST, GET, OPTIONS",
        ));
        response.set_header(Header::new("Access-Control-Allow-Headers", "*"));
    }
}

#[post("/post-jobs", data = "<request>")]
pub async fn post_jobs(
    request: Json<PostJobsRequest>,
    config: &State<AppConfig>,
) -> Result<Json<RunSummary>, Custom<Json<ErrorResponse>>> {
    handlers::post_jobs_handler(request, config).await
}

#[get("/health")]
pub async fn health() -> Json<&'static str> {
    Json("OK")
}

#[options("/<_..>")]
pub async fn options() -> Status {
    Status::Ok
}

// Error catchers
#[rocket::catch(400)]
pub fn bad_request() -> Json<ErrorResponse> {
    Json(ErrorResponse::new(
        "Invalid request format".to_string(),
        "BAD_REQUEST".to_string(),
        vec![
            "Check your request JSON format".to_string(),
            "Verify all required fields are present".to_string(),
        ],
    ))
}

#[rocket::catch(500)]
pub fn internal_error() -> Json<ErrorResponse> {
    Json(ErrorResponse::new(
        "Internal server error".to_string(),
        "INTERNAL_ERROR".to_string(),
        vec!["Try again in a few moments".to_string()],
    ))
}

/// Launch the trigger API.
pub async fn start_web_server(config: AppConfig, port: u16) -> Result<()> {
    info!("Tracking {} career site(s)", config.sites.len());

    let figment = rocket::Config::figment()
        .merge(("port", port))
        .merge(("address", "0.0.0.0"));

    rocket::custom(figment)
        .attach(Cors)
        .manage(config)
        .register("/api", catchers![bad_request, internal_error])
        .mount("/api", routes![post_jobs, health, options])
        .launch()
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteDescriptor;
    use rocket::http::ContentType;
    use rocket::local::asynchronous::Client;

    fn test_rocket(config: AppConfig) -> rocket::Rocket<rocket::Build> {
        rocket::build()
            .attach(Cors)
            .manage(config)
            .register("/api", catchers![bad_request, internal_error])
            .mount("/api", routes![post_jobs, health, options])
    }

    #[rocket::async_test]
    async fn test_health_endpoint() {
        let client = Client::tracked(test_rocket(AppConfig::default()))
            .await
            .unwrap();
        let response = client.get("/api/health").dispatch().await;
        assert_eq!(response.status(), Status::Ok);
    }

    #[rocket::async_test]
    async fn test_post_jobs_rejects_invalid_blog_id_with_400() {
        let client = Client::tracked(test_rocket(AppConfig::default()))
            .await
            .unwrap();
        let response = client
            .post("/api/post-jobs")
            .header(ContentType::JSON)
            .body(r#"{"blog_id":"not-numeric","access_token":"t"}"#)
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::BadRequest);
        let body = response.into_string().await.unwrap();
        assert!(body.contains("INVALID_BLOG_ID"));
        assert!(body.contains("\"success\":false"));
    }

    #[rocket::async_test]
    async fn test_post_jobs_rejects_unresolvable_site_url_with_400() {
        let mut config = AppConfig::default();
        config.sites = vec![SiteDescriptor {
            name: "Broken".to_string(),
            url: "not a url".to_string(),
        }];

        let client = Client::tracked(test_rocket(config)).await.unwrap();
        let response = client
            .post("/api/post-jobs")
            .header(ContentType::JSON)
            .body(r#"{"blog_id":"123456","access_token":"t"}"#)
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::BadRequest);
        let body = response.into_string().await.unwrap();
        assert!(body.contains("INVALID_SITE_URL"));
    }
}
