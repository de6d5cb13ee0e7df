//! Flashcard command handlers

use anyhow::{bail, Context, Result};

use drafty_core::{CardFilter, Collections, Mutation};

use super::{resolve_book, resolve_card, FileWorkspace};
use crate::editor::approve;
use crate::output::Output;

/// Turn an optional `--book` reference into a card filter
pub fn filter_for(collections: &Collections, book: Option<&str>) -> Result<CardFilter> {
    match book {
        None | Some("all") => Ok(CardFilter::All),
        Some(b) => Ok(CardFilter::Book(resolve_book(collections, b)?.id.clone())),
    }
}

/// Add a flashcard, optionally scoped to a book
pub fn add(
    workspace: &mut FileWorkspace,
    front: String,
    back: String,
    book: Option<String>,
    output: &Output,
) -> Result<()> {
    let book_id = match filter_for(workspace.collections(), book.as_deref())? {
        CardFilter::All => None,
        CardFilter::Book(id) => Some(id),
    };

    let changes = workspace
        .apply(Mutation::CreateFlashcard {
            front,
            back,
            book_id,
        })
        .context("Failed to add flashcard")?;

    let Some(card_id) = changes.created else {
        bail!("A flashcard needs a front or a back");
    };

    output.success(&format!("Added flashcard: {}", card_id));
    if output.is_quiet() {
        println!("{}", card_id);
    }
    Ok(())
}

/// List flashcards, optionally for one book
pub fn list(workspace: &FileWorkspace, book: Option<String>, output: &Output) -> Result<()> {
    let collections = workspace.collections();
    let filter = filter_for(collections, book.as_deref())?;
    output.print_cards(&collections.flashcards_for(&filter));
    Ok(())
}

/// Delete a flashcard
pub fn delete(workspace: &mut FileWorkspace, id: String, output: &Output) -> Result<()> {
    let card = resolve_card(workspace.collections(), &id)?;
    let card_id = card.id.clone();

    let summary = format!("Delete flashcard: {} → {}", card.front, card.back);
    if !approve(output, &summary, "Are you sure?")? {
        return Ok(());
    }

    workspace
        .apply(Mutation::DeleteFlashcard {
            card_id: card_id.clone(),
        })
        .context("Failed to delete flashcard")?;

    output.success(&format!("Deleted flashcard: {}", card_id));
    Ok(())
}
