//! Session lookup for the current request.
//!
//! In production the session comes from the auth provider's session endpoint,
//! keyed by the request's cookies. For local development and the CLI a
//! session can instead be stored as JSON in `~/.pitchboard/session.json` or
//! passed through the `PITCHBOARD_SESSION` environment variable.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};
use url::Url;

/// Environment variable holding a development session as JSON
pub const SESSION_ENV: &str = "PITCHBOARD_SESSION";

/// Session endpoint path relative to the auth provider base URL
const SESSION_ENDPOINT: &str = "api/auth/session";

/// Signed-in user details attached to a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Authenticated-user context for one request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<SessionUser>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<String>,
}

impl Session {
    /// Display name, if the provider sent one
    pub fn display_name(&self) -> Option<&str> {
        self.user
            .as_ref()
            .and_then(|u| u.name.as_deref())
            .filter(|n| !n.trim().is_empty())
    }
}

/// Parse a session payload.
///
/// Auth providers answer `{}` when nobody is signed in, so a payload without
/// an `id` (or with a blank one) is "no session" rather than an error.
pub fn parse_session(raw: &str) -> Result<Option<Session>> {
    #[derive(Deserialize)]
    struct RawSession {
        #[serde(default)]
        id: Option<String>,
        #[serde(default)]
        user: Option<SessionUser>,
        #[serde(default)]
        expires: Option<String>,
    }

    let raw: Option<RawSession> =
        serde_json::from_str(raw).context("Failed to parse session JSON")?;

    Ok(raw.and_then(|s| match s.id {
        Some(id) if !id.trim().is_empty() => Some(Session {
            id,
            user: s.user,
            expires: s.expires,
        }),
        _ => None,
    }))
}

/// Lookup of the session attached to a request.
#[async_trait]
pub trait SessionSource: Send + Sync {
    /// Resolve the session for a request carrying `cookie`, if any.
    async fn current_session(&self, cookie: Option<&str>) -> Result<Option<Session>>;
}

/// Session lookup against a remote auth provider.
pub struct RemoteSessionSource {
    client: Client,
    session_url: Url,
}

impl RemoteSessionSource {
    /// Create a lookup for the provider rooted at `auth_url`
    pub fn new(auth_url: &Url, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        let session_url = auth_url
            .join(SESSION_ENDPOINT)
            .with_context(|| format!("Failed to build session URL from: {}", auth_url))?;

        Ok(Self {
            client,
            session_url,
        })
    }
}

#[async_trait]
impl SessionSource for RemoteSessionSource {
    async fn current_session(&self, cookie: Option<&str>) -> Result<Option<Session>> {
        // Without cookies the provider can only answer "signed out"
        let Some(cookie) = cookie.filter(|c| !c.is_empty()) else {
            return Ok(None);
        };

        debug!("Looking up session at {}", self.session_url);

        let response = self
            .client
            .get(self.session_url.clone())
            .header("Accept", "application/json")
            .header("Cookie", cookie)
            .send()
            .await
            .with_context(|| format!("Failed to send request to {}", self.session_url))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            anyhow::bail!(
                "Session lookup failed with status {}: {}",
                status,
                error_text
            );
        }

        let body = response
            .text()
            .await
            .context("Failed to read session response")?;
        parse_session(&body)
    }
}

/// Development session store
///
/// Manages a session in ~/.pitchboard/session.json (or a custom cache directory).
#[derive(Debug, Clone)]
pub struct LocalSessionStore {
    session_path: PathBuf,
    env_key: String,
}

impl LocalSessionStore {
    /// Create a new session store
    ///
    /// # Arguments
    /// * `cache_dir` - Optional custom cache directory. Defaults to ~/.pitchboard
    pub fn new(cache_dir: Option<PathBuf>) -> Result<Self> {
        let base_dir = match cache_dir {
            Some(dir) => dir,
            None => dirs::home_dir()
                .context("Could not determine home directory")?
                .join(".pitchboard"),
        };

        std::fs::create_dir_all(&base_dir)
            .with_context(|| format!("Failed to create cache directory: {:?}", base_dir))?;

        Ok(Self {
            session_path: base_dir.join("session.json"),
            env_key: SESSION_ENV.to_string(),
        })
    }

    #[cfg(test)]
    fn with_env_key(mut self, key: &str) -> Self {
        self.env_key = key.to_string();
        self
    }

    /// Get the session file path
    pub fn session_path(&self) -> &PathBuf {
        &self.session_path
    }

    /// Get the current session
    ///
    /// Priority:
    /// 1. PITCHBOARD_SESSION environment variable (JSON format)
    /// 2. session.json file
    ///
    /// An invalid session file is removed.
    pub fn get_session(&self) -> Result<Option<Session>> {
        self.load_session(true)
    }

    fn load_session(&self, discard_invalid: bool) -> Result<Option<Session>> {
        if let Ok(env_session) = std::env::var(&self.env_key) {
            match parse_session(&env_session) {
                Ok(Some(session)) => return Ok(Some(session)),
                Ok(None) => warn!("{} is set but carries no session id", self.env_key),
                Err(e) => warn!("Ignoring {}: {:#}", self.env_key, e),
            }
        }

        if !self.session_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&self.session_path)
            .with_context(|| format!("Failed to read session file: {:?}", self.session_path))?;

        match parse_session(&content) {
            Ok(Some(session)) => Ok(Some(session)),
            Ok(None) | Err(_) if !discard_invalid => {
                warn!("Ignoring invalid session file {:?}", self.session_path);
                Ok(None)
            }
            Ok(None) | Err(_) => {
                warn!("Invalid session data found, removing session file");
                if let Err(e) = self.remove_session() {
                    error!("Failed to remove invalid session file: {:#}", e);
                }
                Ok(None)
            }
        }
    }

    /// Check whether a session is available
    pub fn is_logged_in(&self) -> bool {
        matches!(self.get_session(), Ok(Some(_)))
    }

    /// Save a new session
    pub fn save_session(&self, session: &Session) -> Result<()> {
        if session.id.trim().is_empty() {
            anyhow::bail!("Session id must not be empty");
        }

        let content =
            serde_json::to_string_pretty(session).context("Failed to serialize session data")?;

        std::fs::write(&self.session_path, content)
            .with_context(|| format!("Failed to write session file: {:?}", self.session_path))?;

        info!("Session saved successfully");
        debug!("Session saved to {:?}", self.session_path);

        Ok(())
    }

    /// Remove the current session
    pub fn remove_session(&self) -> Result<()> {
        if self.session_path.exists() {
            std::fs::remove_file(&self.session_path).with_context(|| {
                format!("Failed to remove session file: {:?}", self.session_path)
            })?;
        }

        info!("Session removed successfully");

        Ok(())
    }
}

#[async_trait]
impl SessionSource for LocalSessionStore {
    /// Reads off the async runtime and leaves an invalid file in place;
    /// only the CLI commands clean it up.
    async fn current_session(&self, _cookie: Option<&str>) -> Result<Option<Session>> {
        let store = self.clone();
        tokio::task::spawn_blocking(move || store.load_session(false))
            .await
            .context("Session lookup task failed")?
    }
}
