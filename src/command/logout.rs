use anyhow::Result;

use crate::config::cache_dir;
use crate::session::LocalSessionStore;

pub async fn run_logout(raw_cache_dir: Option<String>) -> Result<()> {
    let session_store = LocalSessionStore::new(cache_dir(raw_cache_dir))?;

    if !session_store.is_logged_in() {
        println!("No development session to remove.");
        return Ok(());
    }

    session_store.remove_session()?;
    println!("✅ Development session removed.");

    Ok(())
}
