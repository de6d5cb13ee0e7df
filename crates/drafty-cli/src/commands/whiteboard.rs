//! Whiteboard command handlers
//!
//! The whiteboard is a single image stored as a `data:` URL. Images are
//! read from and written to ordinary files here.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};

use super::FileWorkspace;
use crate::editor::approve;
use crate::output::Output;

/// Guess an image MIME type from the file extension
fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());
    match ext.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        _ => "image/png",
    }
}

/// Encode image bytes as a base64 data URL
pub fn to_data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

/// Decode a base64 data URL into its MIME type and bytes
pub fn from_data_url(url: &str) -> Result<(String, Vec<u8>)> {
    let Some(rest) = url.strip_prefix("data:") else {
        bail!("Whiteboard is not a data URL");
    };
    let Some((meta, payload)) = rest.split_once(',') else {
        bail!("Malformed data URL: missing ','");
    };
    let Some(mime) = meta.strip_suffix(";base64") else {
        bail!("Unsupported data URL encoding: {}", meta);
    };
    let bytes = STANDARD
        .decode(payload.trim())
        .context("Whiteboard image is not valid base64")?;
    Ok((mime.to_string(), bytes))
}

/// Show the whiteboard, or write its image to a file
pub fn show(workspace: &FileWorkspace, out: Option<PathBuf>, output: &Output) -> Result<()> {
    let Some(payload) = workspace.whiteboard()? else {
        output.message("The whiteboard is empty.");
        return Ok(());
    };

    if let Some(path) = out {
        let (_, bytes) = from_data_url(&payload)?;
        fs::write(&path, &bytes)
            .with_context(|| format!("Failed to write image: {:?}", path))?;
        output.success(&format!("Wrote {} bytes to {}", bytes.len(), path.display()));
        return Ok(());
    }

    if output.is_json() {
        output.json(&serde_json::json!({
            "whiteboard": payload,
            "size": payload.len(),
        }));
        return Ok(());
    }
    if output.is_quiet() {
        println!("{}", payload);
        return Ok(());
    }

    match from_data_url(&payload) {
        Ok((mime, bytes)) => println!("Whiteboard: {} image, {} bytes", mime, bytes.len()),
        Err(_) => println!("Whiteboard: {} characters of raw data", payload.len()),
    }
    Ok(())
}

/// Replace the whiteboard with an image file
pub fn set(workspace: &mut FileWorkspace, file: PathBuf, output: &Output) -> Result<()> {
    let bytes = fs::read(&file).with_context(|| format!("Failed to read image: {:?}", file))?;
    if bytes.is_empty() {
        bail!("Image file is empty: {}", file.display());
    }

    let url = to_data_url(mime_for(&file), &bytes);
    workspace
        .save_whiteboard(&url)
        .context("Failed to save whiteboard")?;

    output.success(&format!("Saved whiteboard from {}", file.display()));
    Ok(())
}

/// Erase the whiteboard
pub fn clear(workspace: &mut FileWorkspace, output: &Output) -> Result<()> {
    if !approve(output, "The stored drawing will be erased.", "Clear the whiteboard?")? {
        return Ok(());
    }

    workspace
        .clear_whiteboard()
        .context("Failed to clear whiteboard")?;
    output.success("Cleared whiteboard");
    Ok(())
}
