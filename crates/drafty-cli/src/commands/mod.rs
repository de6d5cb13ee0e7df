//! Command handlers

use anyhow::{bail, Result};

use drafty_core::{Book, Collections, FileStore, Flashcard, Page, Project, Workspace};

pub mod book;
pub mod card;
pub mod config;
pub mod data;
pub mod page;
pub mod prefs;
pub mod project;
pub mod session;
pub mod status;
pub mod study;
pub mod theme;
pub mod whiteboard;

/// Workspace over the on-disk data directory
pub type FileWorkspace = Workspace<FileStore>;

/// Something that can be picked by ID on the command line
pub trait Identified {
    fn id(&self) -> &str;
    fn label(&self) -> &str;
}

impl Identified for Book {
    fn id(&self) -> &str {
        &self.id
    }
    fn label(&self) -> &str {
        &self.name
    }
}

impl Identified for Page {
    fn id(&self) -> &str {
        &self.id
    }
    fn label(&self) -> &str {
        &self.name
    }
}

impl Identified for Project {
    fn id(&self) -> &str {
        &self.id
    }
    fn label(&self) -> &str {
        &self.name
    }
}

impl Identified for Flashcard {
    fn id(&self) -> &str {
        &self.id
    }
    fn label(&self) -> &str {
        &self.front
    }
}

/// Resolve a user-supplied reference to an item's full ID
///
/// Accepts, in order: the exact ID, a 1-based position as shown by the
/// list commands, a unique ID suffix, or a unique ID prefix.
pub fn resolve<'a, T: Identified>(items: &'a [T], query: &str, kind: &str) -> Result<&'a T> {
    let query = query.trim();
    if query.is_empty() {
        bail!("No {} given", kind);
    }

    if let Some(item) = items.iter().find(|i| i.id() == query) {
        return Ok(item);
    }

    if let Ok(position) = query.parse::<usize>() {
        if (1..=items.len()).contains(&position) {
            return Ok(&items[position - 1]);
        }
    }

    if let Some(item) = unique_match(items, query, kind, |id| id.ends_with(query))? {
        return Ok(item);
    }
    if let Some(item) = unique_match(items, query, kind, |id| id.starts_with(query))? {
        return Ok(item);
    }

    bail!("No {} found matching: {}", kind, query)
}

fn unique_match<'a, T: Identified>(
    items: &'a [T],
    query: &str,
    kind: &str,
    matches_id: impl Fn(&str) -> bool,
) -> Result<Option<&'a T>> {
    let matches: Vec<&T> = items.iter().filter(|i| matches_id(i.id())).collect();
    match matches.len() {
        0 => Ok(None),
        1 => Ok(Some(matches[0])),
        _ => {
            eprintln!("Multiple {}s match '{}':", kind, query);
            for item in &matches {
                eprintln!("  {} - {}", item.id(), item.label());
            }
            bail!("Ambiguous ID. Please provide more characters.");
        }
    }
}

/// Resolve a book reference
pub fn resolve_book<'a>(collections: &'a Collections, query: &str) -> Result<&'a Book> {
    resolve(&collections.books, query, "book")
}

/// Resolve a page reference within a book
pub fn resolve_page<'a>(book: &'a Book, query: &str) -> Result<&'a Page> {
    resolve(&book.pages, query, "page")
}

/// Resolve a project reference
pub fn resolve_project<'a>(collections: &'a Collections, query: &str) -> Result<&'a Project> {
    resolve(&collections.projects, query, "project")
}

/// Resolve a flashcard reference
pub fn resolve_card<'a>(collections: &'a Collections, query: &str) -> Result<&'a Flashcard> {
    resolve(&collections.flashcards, query, "flashcard")
}
