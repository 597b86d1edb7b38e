use std::io::{self, Write};

use anyhow::Result;

use crate::config::cache_dir;
use crate::session::{LocalSessionStore, Session, SessionUser};

/// Store a development session so the listing page renders as signed in
/// without a running auth provider.
pub async fn run_login(
    raw_cache_dir: Option<String>,
    id: String,
    name: Option<String>,
    email: Option<String>,
) -> Result<()> {
    let session_store = LocalSessionStore::new(cache_dir(raw_cache_dir))?;

    if session_store.is_logged_in() {
        println!("⚠️  A development session already exists.");

        print!("Replace it? [y/N]: ");
        io::stdout().flush()?;

        let mut answer = String::new();
        io::stdin().read_line(&mut answer)?;
        let answer = answer.trim().to_lowercase();

        if answer != "y" && answer != "yes" {
            println!("Cancelled. Your existing session remains active.");
            return Ok(());
        }
    }

    let user = (name.is_some() || email.is_some()).then(|| SessionUser {
        name,
        email,
        image: None,
    });

    session_store.save_session(&Session {
        id,
        user,
        expires: None,
    })?;

    println!(
        "✅ Development session saved to {}",
        session_store.session_path().display()
    );

    Ok(())
}
