//! Preference command handlers

use anyhow::{anyhow, Context, Result};

use drafty_core::preferences::PREFERENCE_NAMES;
use drafty_core::PreferenceError;

use super::FileWorkspace;
use crate::output::{Output, OutputFormat};

/// Show all stored preferences
pub fn show(workspace: &FileWorkspace, output: &Output) -> Result<()> {
    let prefs = workspace
        .preferences()
        .context("Failed to load preferences")?;

    match output.format {
        OutputFormat::Json => output.json(&prefs),
        OutputFormat::Quiet => {
            for (name, value) in prefs.entries() {
                println!("{}={}", name, value);
            }
        }
        OutputFormat::Human => {
            println!("Preferences:");
            for (name, value) in prefs.entries() {
                let shown = if value.is_empty() { "(not set)" } else { &value };
                println!("  {:<12} {}", name, shown);
            }
        }
    }
    Ok(())
}

/// Change a single preference
pub fn set(workspace: &mut FileWorkspace, key: String, value: String, output: &Output) -> Result<()> {
    let mut prefs = workspace
        .preferences()
        .context("Failed to load preferences")?;

    prefs.set(&key, &value).map_err(|e| match e {
        PreferenceError::UnknownKey(_) => {
            anyhow!("{}\nValid preferences: {}", e, PREFERENCE_NAMES.join(", "))
        }
        e => e.into(),
    })?;

    workspace
        .save_preferences(&prefs)
        .context("Failed to save preferences")?;

    let stored = prefs
        .entries()
        .into_iter()
        .find(|(name, _)| *name == key)
        .map(|(_, v)| v)
        .unwrap_or(value);
    output.success(&format!("Set {} = {}", key, stored));
    Ok(())
}
