// src/lib.rs
//! Discovers job postings published on a specific calendar date across
//! independently-hosted recruiting portals, normalizes them into
//! canonical records, and republishes each record as a formatted blog
//! post.

pub mod article;
pub mod classify;
pub mod config;
pub mod crawler;
pub mod dates;
pub mod endpoint;
pub mod extract;
pub mod logo;
pub mod publish;
pub mod tags;
pub mod web;

pub use config::AppConfig;
pub use web::start_web_server;
