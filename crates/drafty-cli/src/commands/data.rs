//! Data management command handlers
//!
//! Export, import and clear whole collections.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

use drafty_core::CollectionKind;

use super::FileWorkspace;
use crate::editor::approve;
use crate::output::Output;

/// Where an export should be written
fn export_path(out: Option<PathBuf>, file_name: &str) -> PathBuf {
    match out {
        Some(path) if path.is_dir() => path.join(file_name),
        Some(path) => path,
        None => PathBuf::from(file_name),
    }
}

/// Export a collection to a JSON file (or stdout)
pub fn export(
    workspace: &FileWorkspace,
    kind: CollectionKind,
    out: Option<PathBuf>,
    stdout: bool,
    output: &Output,
) -> Result<()> {
    let file = workspace
        .export(kind)
        .with_context(|| format!("Failed to export {}", kind))?;

    if stdout {
        println!("{}", String::from_utf8_lossy(&file.bytes));
        return Ok(());
    }

    let path = export_path(out, &file.file_name);
    fs::write(&path, &file.bytes)
        .with_context(|| format!("Failed to write export file: {:?}", path))?;

    output.success(&format!("Exported {} to {}", kind, path.display()));
    if output.is_quiet() {
        println!("{}", path.display());
    }
    Ok(())
}

/// Replace a collection with the contents of a JSON file
pub fn import(
    workspace: &mut FileWorkspace,
    kind: CollectionKind,
    file: PathBuf,
    output: &Output,
) -> Result<()> {
    let bytes = fs::read(&file).with_context(|| format!("Failed to read {:?}", file))?;

    let summary = format!("Import will replace all stored {}.", kind);
    if !approve(output, &summary, "Continue?")? {
        return Ok(());
    }

    workspace
        .import(kind, &bytes)
        .with_context(|| format!("Failed to import {} from {}", kind, file.display()))?;

    output.success(&format!("Imported {} from {}", kind, file.display()));
    Ok(())
}

/// Delete a collection
pub fn clear(workspace: &mut FileWorkspace, kind: CollectionKind, output: &Output) -> Result<()> {
    let mut summary = format!("This permanently deletes all stored {}.", kind);
    if kind == CollectionKind::Books {
        summary.push_str("\nFlashcards and projects are kept but may reference missing books.");
    }
    if !approve(output, &summary, "Are you sure?")? {
        return Ok(());
    }

    workspace
        .clear(kind)
        .with_context(|| format!("Failed to clear {}", kind))?;

    output.success(&format!("Cleared {}", kind));
    Ok(())
}
