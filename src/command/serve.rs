use std::sync::Arc;

use anyhow::Result;

use super::build_resolver;
use crate::config::{Config, Settings};
use crate::server::{self, AppState};

pub async fn run_serve(settings: Settings) -> Result<()> {
    let config = Config::from_settings(settings)?;
    let resolver = build_resolver(&config)?;

    server::serve(config.bind, Arc::new(AppState { resolver })).await
}
