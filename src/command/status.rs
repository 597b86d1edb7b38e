use anyhow::Result;

use crate::config::cache_dir;
use crate::session::LocalSessionStore;

pub async fn run_status(raw_cache_dir: Option<String>) -> Result<()> {
    let session_store = LocalSessionStore::new(cache_dir(raw_cache_dir))?;

    match session_store.get_session()? {
        Some(session) => {
            println!("✅ Development session active");
            println!("   Session ID: {}", session.id);
            if let Some(name) = session.display_name() {
                println!("   Name: {}", name);
            }
            if let Some(expires) = &session.expires {
                println!("   Expires: {}", expires);
            }
            println!("   File: {}", session_store.session_path().display());
        }
        None => {
            println!("❌ No development session");
            println!("   Run 'pitchboard login --id <ID>' to create one.");
        }
    }

    Ok(())
}
