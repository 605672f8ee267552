#![doc = "The `skygate` library crate."]
#![doc = ""]
#![doc = "Session-guarded authentication pages, account endpoints, and an authenticated API"]
#![doc = "route that fetches public Bluesky content, moderates it, and returns it with a"]
#![doc = "canonical web link. The binary (`main.rs`) wires these modules into an Actix server."]

pub mod auth;
pub mod bluesky;
pub mod config;
pub mod db;
pub mod error;
pub mod ingestion;
pub mod models;
pub mod moderation;
pub mod pages;
pub mod routes;

pub use crate::error::AppError;
pub use crate::ingestion::{ContentIngestor, ContentRequest, IngestedContent};
