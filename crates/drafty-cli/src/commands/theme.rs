//! Theme command handlers
//!
//! Themes are global preferences; they are not tied to the signed-in user.

use anyhow::{Context, Result};

use drafty_core::theme::{resolve_theme, THEMES};
use drafty_core::{Preferences, ThemeMode};

use super::FileWorkspace;
use crate::output::{Output, OutputFormat};

/// Show the active theme and its resolved colors
pub fn show(workspace: &FileWorkspace, output: &Output) -> Result<()> {
    let prefs = workspace
        .preferences()
        .context("Failed to load preferences")?;
    let resolved = prefs.resolved_theme();

    match output.format {
        OutputFormat::Json => output.json(&resolved),
        OutputFormat::Quiet => println!("{} {}", resolved.theme, resolved.mode),
        OutputFormat::Human => {
            println!("Theme:  {} ({})", resolved.theme, resolved.mode);
            println!(
                "Accent: {}{}",
                resolved.accent,
                if prefs.accent.is_some() { " (custom)" } else { "" }
            );
            println!();
            for (name, value) in resolved.css_variables() {
                println!("  {:<16} {}", name, value);
            }
        }
    }
    Ok(())
}

/// List the available themes
pub fn list(workspace: &FileWorkspace, output: &Output) -> Result<()> {
    let current = workspace
        .preferences()
        .context("Failed to load preferences")?
        .theme;

    match output.format {
        OutputFormat::Json => {
            let themes: Vec<_> = THEMES
                .iter()
                .map(|t| {
                    serde_json::json!({
                        "key": t.key,
                        "name": t.name,
                        "accent": t.colors.accent,
                        "active": t.key == current,
                    })
                })
                .collect();
            output.json(&themes);
        }
        OutputFormat::Quiet => {
            for theme in THEMES.iter() {
                println!("{}", theme.key);
            }
        }
        OutputFormat::Human => {
            for theme in THEMES.iter() {
                let marker = if theme.key == current { "*" } else { " " };
                println!(
                    "{} {:<10} {:<12} {}",
                    marker, theme.key, theme.name, theme.colors.accent
                );
            }
        }
    }
    Ok(())
}

/// Load, change and save preferences in one step
fn update(
    workspace: &mut FileWorkspace,
    change: impl FnOnce(&mut Preferences) -> Result<()>,
) -> Result<Preferences> {
    let mut prefs = workspace
        .preferences()
        .context("Failed to load preferences")?;
    change(&mut prefs)?;
    workspace
        .save_preferences(&prefs)
        .context("Failed to save preferences")?;
    Ok(prefs)
}

/// Switch to a named theme
pub fn set(workspace: &mut FileWorkspace, name: String, output: &Output) -> Result<()> {
    let prefs = update(workspace, |p| Ok(p.set("theme", &name)?))?;
    output.success(&format!("Theme set to {}", prefs.theme));
    Ok(())
}

/// Switch between light and dark mode
pub fn mode(workspace: &mut FileWorkspace, mode: ThemeMode, output: &Output) -> Result<()> {
    let prefs = update(workspace, |p| {
        p.theme_mode = mode;
        Ok(())
    })?;
    output.success(&format!("Theme mode set to {}", prefs.theme_mode));
    Ok(())
}

/// Set or clear the accent color override
pub fn accent(workspace: &mut FileWorkspace, color: Option<String>, output: &Output) -> Result<()> {
    let value = color.unwrap_or_default();
    let prefs = update(workspace, |p| Ok(p.set("accent", &value)?))?;

    match prefs.accent {
        Some(accent) => output.success(&format!("Accent set to {}", accent)),
        None => output.success("Accent reset to the theme default"),
    }
    Ok(())
}

/// Print the CSS variables for the active (or given) theme
pub fn css(
    workspace: &FileWorkspace,
    name: Option<String>,
    mode: Option<ThemeMode>,
) -> Result<()> {
    let prefs = workspace
        .preferences()
        .context("Failed to load preferences")?;

    let resolved = match (name, mode) {
        (None, None) => prefs.resolved_theme(),
        (name, mode) => resolve_theme(
            &name.map(|n| n.to_lowercase()).unwrap_or(prefs.theme),
            mode.unwrap_or(prefs.theme_mode),
            prefs.accent.as_deref(),
        ),
    };

    print!("{}", resolved.to_css());
    Ok(())
}
