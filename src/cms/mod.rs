//! Content store access.
//!
//! This module queries the headless CMS over its GROQ HTTP API and decodes
//! the startup summary projection into typed records.

mod client;
mod queries;
mod types;

pub use client::CmsClient;
pub use types::StartupRecord;

use async_trait::async_trait;

use crate::error::FetchError;

/// Source of startup records for the listing page.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Fetch startups, filtered by `search` when present, newest first.
    async fn fetch_startups(&self, search: Option<&str>) -> Result<Vec<StartupRecord>, FetchError>;
}
