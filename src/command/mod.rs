mod login;
mod logout;
mod search;
mod serve;
mod status;

pub use login::run_login;
pub use logout::run_logout;
pub use search::run_search;
pub use serve::run_serve;
pub use status::run_status;

use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use crate::cms::CmsClient;
use crate::config::Config;
use crate::listing::ListingResolver;
use crate::session::{LocalSessionStore, RemoteSessionSource, SessionSource};

/// Wire the resolver to the collaborators named in `config`.
///
/// Sessions come from the auth provider when one is configured, otherwise
/// from the local development store.
fn build_resolver(config: &Config) -> Result<ListingResolver> {
    let content = CmsClient::new(&config.cms)?;
    info!("Content store: {}", content.query_url());

    let sessions: Arc<dyn SessionSource> = match &config.auth_url {
        Some(auth_url) => {
            info!("Session lookup via {}", auth_url);
            Arc::new(RemoteSessionSource::new(auth_url, config.cms.timeout)?)
        }
        None => {
            info!("No auth provider configured, using the local development session");
            Arc::new(LocalSessionStore::new(config.cache_dir.clone())?)
        }
    };

    Ok(ListingResolver::new(Arc::new(content), sessions))
}
