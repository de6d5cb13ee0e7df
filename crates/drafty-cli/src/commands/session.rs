//! Session command handlers
//!
//! The session is recorded in the config file: `login` stores the user ID
//! (and optionally an email), `logout` removes them.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use drafty_core::{Config, ConfigSession, SessionProvider, Workspace};

use crate::output::{Output, OutputFormat};

fn config_save_path(config_path: Option<&PathBuf>) -> PathBuf {
    config_path
        .cloned()
        .unwrap_or_else(Config::config_file_path)
}

/// Sign in as `uid`
pub fn login(
    uid: String,
    email: Option<String>,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    let uid = uid.trim().to_string();
    if uid.is_empty() {
        bail!("User ID cannot be empty");
    }

    let mut config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;
    config.uid = Some(uid.clone());
    config.email = email.filter(|e| !e.trim().is_empty());
    config
        .save_to_path(&config_save_path(config_path))
        .context("Failed to save configuration")?;

    // Opening the workspace migrates any legacy notes for this user
    let workspace = Workspace::open_with_config(&config).context("Failed to open data")?;
    let books = workspace.collections().books.len();

    output.success(&format!(
        "Signed in as {} ({} notebook(s))",
        config.email.as_deref().unwrap_or(&uid),
        books
    ));
    Ok(())
}

/// Sign out of the current session
pub fn logout(config_path: Option<&PathBuf>, output: &Output) -> Result<()> {
    let mut config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    let mut provider = ConfigSession::from_config(&config);
    let Some(session) = provider.current() else {
        output.message("Not signed in.");
        return Ok(());
    };

    let mut workspace = Workspace::open_with_config(&config).context("Failed to open data")?;
    let result = workspace.sign_out(&mut provider);

    config.uid = None;
    config.email = None;
    config
        .save_to_path(&config_save_path(config_path))
        .context("Failed to save configuration")?;
    result.context("Sign-out did not complete cleanly")?;

    output.success(&format!("Signed out {}", session.display_name()));
    Ok(())
}

/// Show the current session
pub fn whoami(config: &Config, output: &Output) -> Result<()> {
    let session = ConfigSession::from_config(config).current();

    match output.format {
        OutputFormat::Json => output.json(&serde_json::json!({
            "uid": session.as_ref().map(|s| s.uid.as_str()),
            "email": session.as_ref().and_then(|s| s.email.as_deref()),
        })),
        OutputFormat::Quiet => {
            if let Some(session) = &session {
                println!("{}", session.uid);
            }
        }
        OutputFormat::Human => match &session {
            Some(session) => {
                println!("Signed in as {}", session.display_name());
                println!("  uid: {}", session.uid);
            }
            None => println!("Not signed in."),
        },
    }
    Ok(())
}
