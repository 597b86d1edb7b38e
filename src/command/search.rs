use anyhow::{Context, Result};

use super::build_resolver;
use crate::config::{Config, Settings};
use crate::listing::{Outcome, EMPTY_MESSAGE};
use crate::render::format_date;

/// Resolve one listing outside the server and print it.
pub async fn run_search(settings: Settings, query: Option<String>, json: bool) -> Result<()> {
    let config = Config::from_settings(settings)?;
    let resolver = build_resolver(&config)?;

    let model = resolver.resolve(query.as_deref(), None).await;

    if json {
        let out = serde_json::to_string_pretty(&model).context("Failed to serialize results")?;
        println!("{}", out);
        return Ok(());
    }

    if let Some(name) = model.session.as_ref().map(|s| s.display_name().unwrap_or(s.id.as_str())) {
        println!("Signed in as {}\n", name);
    }

    println!("{}\n", model.heading());

    match model.outcome() {
        Outcome::Cards(items) => {
            for item in items {
                let title = item.title.as_deref().unwrap_or("(untitled)");
                let date = item.created_at.as_deref().map(format_date).unwrap_or_default();
                println!("  {}  [{}]", title, item.id);
                println!(
                    "      {} | {} views | {}",
                    item.category.as_deref().unwrap_or("-"),
                    item.views.unwrap_or(0),
                    date
                );
            }
            println!("\n{} startup(s)", items.len());
        }
        Outcome::Failed(message) => println!("❌ {}", message),
        Outcome::Empty => println!("{}", EMPTY_MESSAGE),
    }

    Ok(())
}
