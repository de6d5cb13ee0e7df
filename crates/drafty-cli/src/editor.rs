//! Page editing and confirmation prompts
//!
//! `page edit` without `--content` hands the page body to an external
//! editor in a scratch file named after the page. Rich (HTML) bodies get an
//! `.html` suffix so editors pick the right highlighting; plain bodies get
//! `.txt`.

use std::env;
use std::ffi::OsString;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{bail, Context, Result};

use drafty_core::Page;

use crate::output::Output;

/// Editors tried, in order, when neither $VISUAL nor $EDITOR is set
const FALLBACK_EDITORS: [&str; 4] = ["nano", "vim", "vi", "notepad"];

/// How a page body is presented in the scratch file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyFormat {
    Html,
    Text,
}

impl BodyFormat {
    /// Rich editor output always starts with a tag
    pub fn detect(content: &str) -> Self {
        let trimmed = content.trim_start();
        if trimmed.starts_with('<') && trimmed.contains('>') {
            BodyFormat::Html
        } else {
            BodyFormat::Text
        }
    }

    fn suffix(self) -> &'static str {
        match self {
            BodyFormat::Html => ".html",
            BodyFormat::Text => ".txt",
        }
    }
}

/// Edit a page body in the user's editor
///
/// Returns `None` when the body comes back unchanged.
pub fn edit_page(page: &Page) -> Result<Option<String>> {
    let editor = find_editor()?;
    let format = BodyFormat::detect(&page.content);

    let mut scratch = tempfile::Builder::new()
        .prefix(&format!("drafty-{}-", file_stem(&page.name)))
        .suffix(format.suffix())
        .tempfile()
        .context("Failed to create scratch file")?;
    scratch
        .write_all(page.content.as_bytes())
        .and_then(|_| scratch.flush())
        .context("Failed to write scratch file")?;

    run_editor(&editor, scratch.path())?;

    let edited = fs::read_to_string(scratch.path())
        .with_context(|| format!("Failed to read {}", scratch.path().display()))?;
    let edited = settle(&page.content, edited);

    Ok((edited != page.content).then_some(edited))
}

/// Drop the final newline most editors append on save
fn settle(original: &str, mut edited: String) -> String {
    if !original.ends_with('\n') && edited.ends_with('\n') {
        edited.pop();
        if edited.ends_with('\r') {
            edited.pop();
        }
    }
    edited
}

/// File-name-safe form of a page name
fn file_stem(name: &str) -> String {
    let stem: String = name
        .chars()
        .map(|c| if c.is_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect();
    let stem = stem.trim_matches('-');
    if stem.is_empty() {
        "page".to_string()
    } else {
        stem.chars().take(32).collect()
    }
}

/// The editor command line, split into program and arguments
#[derive(Debug, Clone, PartialEq, Eq)]
struct EditorCommand {
    program: String,
    args: Vec<String>,
}

impl EditorCommand {
    /// Parse `$EDITOR`-style values such as `code --wait`
    fn parse(value: &str) -> Option<Self> {
        let mut parts = value.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
        })
    }
}

fn find_editor() -> Result<EditorCommand> {
    for var in ["VISUAL", "EDITOR"] {
        if let Some(editor) = env::var(var).ok().as_deref().and_then(EditorCommand::parse) {
            return Ok(editor);
        }
    }

    let path = env::var_os("PATH").unwrap_or_default();
    FALLBACK_EDITORS
        .iter()
        .find(|name| on_path(&path, name).is_some())
        .and_then(|name| EditorCommand::parse(name))
        .context(
            "No editor found. Set $EDITOR (for example `export EDITOR=nano`) or pass --content.",
        )
}

/// Locate `program` in a PATH-style list of directories
fn on_path(path: &OsString, program: &str) -> Option<PathBuf> {
    env::split_paths(path)
        .flat_map(|dir| {
            let plain = dir.join(program);
            let exe = dir.join(format!("{}.exe", program));
            [plain, exe]
        })
        .find(|candidate| candidate.is_file())
}

fn run_editor(editor: &EditorCommand, file: &Path) -> Result<()> {
    let status = Command::new(&editor.program)
        .args(&editor.args)
        .arg(file)
        .status()
        .with_context(|| format!("Failed to run editor: {}", editor.program))?;

    if !status.success() {
        bail!(
            "Editor '{}' exited with {}; the page was not changed.",
            editor.program,
            status
        );
    }
    Ok(())
}

/// Check whether stdin is an interactive terminal
fn is_interactive() -> bool {
    atty::is(atty::Stream::Stdin)
}

/// Ask before a destructive change
///
/// JSON and quiet output never prompt. In human output, `summary` is
/// printed and the user must answer yes; without a terminal the change
/// is refused.
pub fn approve(output: &Output, summary: &str, question: &str) -> Result<bool> {
    if !output.should_prompt() {
        return Ok(true);
    }

    println!("{}", summary);
    let approved = if is_interactive() {
        ask(question, &mut io::stdin().lock(), &mut io::stdout())?
    } else {
        println!("Not a terminal; use --quiet or --json to skip confirmation.");
        false
    };

    if !approved {
        println!("Cancelled.");
    }
    Ok(approved)
}

fn ask(question: &str, input: &mut impl BufRead, out: &mut impl Write) -> Result<bool> {
    write!(out, "{} [y/N] ", question)?;
    out.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(matches!(
        answer.trim().to_lowercase().as_str(),
        "y" | "yes"
    ))
}
