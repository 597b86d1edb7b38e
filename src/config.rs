//! Runtime configuration.
//!
//! Every setting can come from a command-line flag or the matching
//! environment variable. [`Settings`] is the raw clap view; [`Config`] is the
//! validated form the rest of the crate consumes.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Args;
use url::Url;

/// Default bind address for the HTTP server
pub const DEFAULT_BIND: &str = "0.0.0.0:3000";

/// Default content store dataset
pub const DEFAULT_DATASET: &str = "production";

/// Default content store API version
pub const DEFAULT_API_VERSION: &str = "2024-10-14";

/// Default outbound request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Raw settings as parsed by clap.
#[derive(Debug, Clone, Default, Args)]
pub struct Settings {
    /// Address the HTTP server listens on
    #[arg(long, env = "PITCHBOARD_BIND", global = true)]
    pub bind: Option<String>,

    /// Content store project id
    #[arg(long, env = "SANITY_PROJECT_ID", global = true)]
    pub project_id: Option<String>,

    /// Content store dataset
    #[arg(long, env = "SANITY_DATASET", global = true)]
    pub dataset: Option<String>,

    /// Content store API version (date form, e.g. 2024-10-14)
    #[arg(long, env = "SANITY_API_VERSION", global = true)]
    pub api_version: Option<String>,

    /// Query the CDN host instead of the live API
    #[arg(long, env = "SANITY_USE_CDN", global = true)]
    pub use_cdn: bool,

    /// Override the content store base URL (self-hosted or local fakes)
    #[arg(long, env = "SANITY_API_HOST", global = true)]
    pub api_host: Option<String>,

    /// Read token for private datasets
    #[arg(long, env = "SANITY_API_READ_TOKEN", global = true, hide_env_values = true)]
    pub read_token: Option<String>,

    /// Base URL of the auth provider exposing /api/auth/session
    #[arg(long, env = "AUTH_URL", global = true)]
    pub auth_url: Option<String>,

    /// Directory for the local development session. Defaults to ~/.pitchboard
    #[arg(long, env = "PITCHBOARD_CACHE_DIR", global = true)]
    pub cache_dir: Option<String>,

    /// Outbound request timeout in seconds
    #[arg(long, env = "PITCHBOARD_TIMEOUT_SECS", global = true)]
    pub timeout_secs: Option<u64>,
}

/// Content store connection settings.
#[derive(Clone)]
pub struct CmsConfig {
    pub base_url: Url,
    pub dataset: String,
    pub api_version: String,
    pub read_token: Option<String>,
    pub timeout: Duration,
}

impl std::fmt::Debug for CmsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CmsConfig")
            .field("base_url", &self.base_url.as_str())
            .field("dataset", &self.dataset)
            .field("api_version", &self.api_version)
            .field("read_token", &self.read_token.as_ref().map(|_| "[REDACTED]"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Validated runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub bind: SocketAddr,
    pub cms: CmsConfig,
    pub auth_url: Option<Url>,
    pub cache_dir: Option<PathBuf>,
}

impl Config {
    /// Validate raw settings, filling in defaults.
    pub fn from_settings(settings: Settings) -> Result<Self> {
        let bind = settings.bind.as_deref().unwrap_or(DEFAULT_BIND);
        let bind: SocketAddr = bind
            .parse()
            .with_context(|| format!("Invalid bind address: {}", bind))?;

        let timeout = Duration::from_secs(settings.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS));
        if timeout.is_zero() {
            bail!("Timeout must be at least one second");
        }

        let base_url = cms_base_url(
            settings.api_host.as_deref(),
            settings.project_id.as_deref(),
            settings.use_cdn,
        )?;

        let dataset = non_blank(settings.dataset).unwrap_or_else(|| DEFAULT_DATASET.to_string());
        let api_version = non_blank(settings.api_version)
            .unwrap_or_else(|| DEFAULT_API_VERSION.to_string());

        let auth_url = non_blank(settings.auth_url)
            .map(|raw| parse_base_url(&raw).with_context(|| format!("Invalid auth URL: {}", raw)))
            .transpose()?;

        Ok(Self {
            bind,
            cms: CmsConfig {
                base_url,
                dataset,
                api_version,
                read_token: non_blank(settings.read_token),
                timeout,
            },
            auth_url,
            cache_dir: cache_dir(settings.cache_dir),
        })
    }
}

/// Resolve the content store base URL.
///
/// An explicit host wins; otherwise the project id selects the hosted API or CDN.
fn cms_base_url(api_host: Option<&str>, project_id: Option<&str>, use_cdn: bool) -> Result<Url> {
    if let Some(host) = api_host.map(str::trim).filter(|h| !h.is_empty()) {
        return parse_base_url(host).with_context(|| format!("Invalid API host: {}", host));
    }

    let project_id = match project_id.map(str::trim) {
        Some(id) if !id.is_empty() => id,
        _ => bail!("A content store project id is required (--project-id or SANITY_PROJECT_ID)"),
    };

    if !project_id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-')
    {
        bail!("Invalid project id: {}", project_id);
    }

    let domain = if use_cdn { "apicdn" } else { "api" };
    parse_base_url(&format!("https://{}.{}.sanity.io", project_id, domain))
}

/// Parse a URL meant to be joined against, ensuring a trailing slash so
/// relative joins append instead of replacing the last segment.
pub(crate) fn parse_base_url(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw)?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Cache directory from a raw flag value; blank means the default.
pub(crate) fn cache_dir(raw: Option<String>) -> Option<PathBuf> {
    non_blank(raw).map(PathBuf::from)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings_with_project(id: &str) -> Settings {
        Settings {
            project_id: Some(id.to_string()),
            ..Settings::default()
        }
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_settings(settings_with_project("abc123")).unwrap();
        assert_eq!(config.bind.to_string(), DEFAULT_BIND);
        assert_eq!(config.cms.dataset, "production");
        assert_eq!(config.cms.api_version, "2024-10-14");
        assert_eq!(config.cms.timeout, Duration::from_secs(30));
        assert_eq!(config.cms.base_url.as_str(), "https://abc123.api.sanity.io/");
        assert!(config.auth_url.is_none());
        assert!(config.cache_dir.is_none());
    }

    #[test]
    fn test_cdn_host() {
        let mut settings = settings_with_project("abc123");
        settings.use_cdn = true;
        let config = Config::from_settings(settings).unwrap();
        assert_eq!(
            config.cms.base_url.as_str(),
            "https://abc123.apicdn.sanity.io/"
        );
    }

    #[test]
    fn test_api_host_override() {
        let settings = Settings {
            api_host: Some("http://127.0.0.1:9000/cms".to_string()),
            ..Settings::default()
        };
        let config = Config::from_settings(settings).unwrap();
        assert_eq!(config.cms.base_url.as_str(), "http://127.0.0.1:9000/cms/");
    }

    #[test]
    fn test_missing_project_id() {
        let err = Config::from_settings(Settings::default()).unwrap_err();
        assert!(err.to_string().contains("project id is required"));
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(Config::from_settings(settings_with_project("bad/id")).is_err());

        let mut settings = settings_with_project("abc123");
        settings.bind = Some("not-an-address".to_string());
        assert!(Config::from_settings(settings).is_err());

        let mut settings = settings_with_project("abc123");
        settings.timeout_secs = Some(0);
        assert!(Config::from_settings(settings).is_err());

        let mut settings = settings_with_project("abc123");
        settings.auth_url = Some("::nope".to_string());
        assert!(Config::from_settings(settings).is_err());
    }

    #[test]
    fn test_blank_values_fall_back() {
        let mut settings = settings_with_project("abc123");
        settings.dataset = Some("  ".to_string());
        settings.read_token = Some(String::new());
        settings.auth_url = Some("https://auth.example.com".to_string());
        let config = Config::from_settings(settings).unwrap();
        assert_eq!(config.cms.dataset, "production");
        assert!(config.cms.read_token.is_none());
        assert_eq!(
            config.auth_url.as_ref().map(Url::as_str),
            Some("https://auth.example.com/")
        );
    }

    #[test]
    fn test_cache_dir() {
        assert_eq!(cache_dir(None), None);
        assert_eq!(cache_dir(Some("   ".to_string())), None);
        assert_eq!(
            cache_dir(Some(" /tmp/pitchboard ".to_string())),
            Some(PathBuf::from("/tmp/pitchboard"))
        );
    }

    #[test]
    fn test_debug_redacts_token() {
        let mut settings = settings_with_project("abc123");
        settings.read_token = Some("sk-secret".to_string());
        let config = Config::from_settings(settings).unwrap();
        let debug_str = format!("{:?}", config);
        assert!(!debug_str.contains("sk-secret"));
        assert!(debug_str.contains("[REDACTED]"));
    }
}
