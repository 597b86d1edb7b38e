use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error};
use url::Url;
use uuid::Uuid;

use super::queries::STARTUPS_QUERY;
use super::types::{decode_startups, QueryResponse, StartupRecord};
use super::ContentSource;
use crate::config::CmsConfig;
use crate::error::FetchError;

/// Default version (from Cargo.toml)
const DEFAULT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build the User-Agent string sent to the content store
fn build_user_agent() -> String {
    std::env::var("PITCHBOARD_USER_AGENT")
        .unwrap_or_else(|_| format!("pitchboard/{}", DEFAULT_VERSION))
}

/// Content store client for GROQ queries over HTTP.
///
/// One instance is shared for the process lifetime so the underlying
/// `reqwest::Client` can pool connections.
pub struct CmsClient {
    client: Client,
    user_agent: String,
    query_url: Url,
    read_token: Option<String>,
}

impl CmsClient {
    /// Create a new client from validated configuration
    pub fn new(config: &CmsConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .context("Failed to build HTTP client")?;

        let query_url = Self::build_query_url(&config.base_url, &config.api_version, &config.dataset)?;

        Ok(Self {
            client,
            user_agent: build_user_agent(),
            query_url,
            read_token: config.read_token.clone(),
        })
    }

    /// `{base}/v{version}/data/query/{dataset}`
    fn build_query_url(base_url: &Url, api_version: &str, dataset: &str) -> Result<Url> {
        let version = api_version.trim_start_matches('v');
        let endpoint = format!("v{}/data/query/{}", version, dataset);
        base_url
            .join(&endpoint)
            .with_context(|| format!("Failed to build URL for endpoint: {}", endpoint))
    }

    /// Query endpoint this client talks to
    pub fn query_url(&self) -> &Url {
        &self.query_url
    }

    /// Run a GROQ query and return the raw `result` value.
    ///
    /// Each parameter is JSON-encoded and sent as `$name=<json>`, so `None`
    /// becomes `null` and strings keep their quotes.
    pub async fn query<P>(&self, groq: &str, params: &[(&str, P)]) -> Result<Option<Value>, FetchError>
    where
        P: Serialize,
    {
        let mut url = self.query_url.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("query", groq);
            for (name, value) in params {
                let encoded = serde_json::to_string(value).map_err(|e| {
                    FetchError::Transport(format!("Failed to encode parameter ${}: {}", name, e))
                })?;
                pairs.append_pair(&format!("${}", name), &encoded);
            }
        }

        let request_id = Uuid::new_v4().to_string();
        debug!("=== CMS Query ===");
        debug!("URL: {}", self.query_url);
        debug!("Request ID: {}", request_id);

        let mut request = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .header("User-Agent", &self.user_agent)
            .header("x-request-id", &request_id);

        if let Some(token) = &self.read_token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        let response = request.send().await?;
        let status = response.status();
        debug!("=== CMS Response ===");
        debug!("Status: {}", status);

        let body = response.text().await?;

        if !status.is_success() {
            // Query errors come back as 4xx with the error envelope
            if let Ok(QueryResponse {
                error: Some(err), ..
            }) = serde_json::from_str::<QueryResponse>(&body)
            {
                let err = err.into_fetch_error();
                error!("CMS query rejected: {}", err);
                return Err(err);
            }

            error!("CMS request failed with status {}: {}", status, body);
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: QueryResponse = serde_json::from_str(&body).map_err(|e| {
            error!("CMS response is not a query envelope: {}", e);
            FetchError::InvalidResponse(e.to_string())
        })?;

        if let Some(err) = envelope.error {
            return Err(err.into_fetch_error());
        }

        if let Some(ms) = envelope.ms {
            debug!("Query took {}ms server-side", ms);
        }

        Ok(envelope.result)
    }
}

#[async_trait]
impl ContentSource for CmsClient {
    async fn fetch_startups(&self, search: Option<&str>) -> Result<Vec<StartupRecord>, FetchError> {
        let result = self.query(STARTUPS_QUERY, &[("search", search)]).await?;
        decode_startups(result)
    }
}

impl std::fmt::Debug for CmsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CmsClient")
            .field("query_url", &self.query_url.as_str())
            .field("read_token", &self.read_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}
