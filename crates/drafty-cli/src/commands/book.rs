//! Book command handlers

use anyhow::{Context, Result};

use drafty_core::{BookPatch, CardFilter, Mutation};

use super::{resolve_book, FileWorkspace};
use crate::editor::approve;
use crate::output::Output;

/// Create a new book, optionally naming it
pub fn create(workspace: &mut FileWorkspace, name: Option<String>, output: &Output) -> Result<()> {
    let changes = workspace
        .apply(Mutation::CreateBook)
        .context("Failed to create book")?;
    let book_id = changes
        .created
        .context("Book was not created")?;

    if let Some(name) = name {
        workspace
            .apply(Mutation::UpdateBook {
                book_id: book_id.clone(),
                patch: BookPatch::rename(name),
            })
            .context("Failed to name book")?;
    }

    output.success(&format!("Created book: {}", book_id));
    if let Some(book) = workspace.collections().get_book(&book_id) {
        if !output.is_quiet() {
            output.print_book(book, 0);
        }
    }
    Ok(())
}

/// List all books
pub fn list(workspace: &FileWorkspace, output: &Output) -> Result<()> {
    output.print_books(&workspace.collections().books);
    Ok(())
}

/// Show a single book with its pages
pub fn show(workspace: &FileWorkspace, id: String, output: &Output) -> Result<()> {
    let collections = workspace.collections();
    let book = resolve_book(collections, &id)?;
    let cards = collections
        .flashcards_for(&CardFilter::Book(book.id.clone()))
        .len();
    output.print_book(book, cards);
    Ok(())
}

/// Rename a book
pub fn rename(workspace: &mut FileWorkspace, id: String, name: String, output: &Output) -> Result<()> {
    let book_id = resolve_book(workspace.collections(), &id)?.id.clone();

    workspace
        .apply(Mutation::UpdateBook {
            book_id: book_id.clone(),
            patch: BookPatch::rename(name.clone()),
        })
        .context("Failed to rename book")?;

    output.success(&format!("Renamed book {} to '{}'", book_id, name));
    Ok(())
}

/// Delete a book along with its flashcards and project memberships
pub fn delete(workspace: &mut FileWorkspace, id: String, output: &Output) -> Result<()> {
    let collections = workspace.collections();
    let book = resolve_book(collections, &id)?;
    let book_id = book.id.clone();

    let cards = collections
        .flashcards_for(&CardFilter::Book(book_id.clone()))
        .len();
    let projects = collections
        .projects
        .iter()
        .filter(|p| p.contains(&book_id))
        .count();
    let summary = format!(
        "Delete book: {} ({} page(s), {} flashcard(s), in {} project(s))",
        book.name,
        book.pages.len(),
        cards,
        projects
    );
    if !approve(output, &summary, "Are you sure?")? {
        return Ok(());
    }

    workspace
        .apply(Mutation::DeleteBook {
            book_id: book_id.clone(),
        })
        .context("Failed to delete book")?;

    output.success(&format!("Deleted book: {}", book_id));
    Ok(())
}
