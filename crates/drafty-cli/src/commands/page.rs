//! Page command handlers
//!
//! Pages live inside a book; every command takes the book first.

use anyhow::{Context, Result};

use drafty_core::{Mutation, PagePatch};

use super::{resolve_book, resolve_page, FileWorkspace};
use crate::editor::{approve, edit_page};
use crate::output::Output;

/// Resolve book and page references to their full IDs
fn resolve_ids(workspace: &FileWorkspace, book: &str, page: &str) -> Result<(String, String)> {
    let book = resolve_book(workspace.collections(), book)?;
    let page = resolve_page(book, page)?;
    Ok((book.id.clone(), page.id.clone()))
}

/// Add a page to the front of a book
pub fn create(
    workspace: &mut FileWorkspace,
    book: String,
    name: Option<String>,
    output: &Output,
) -> Result<()> {
    let book_id = resolve_book(workspace.collections(), &book)?.id.clone();

    let changes = workspace
        .apply(Mutation::CreatePage {
            book_id: book_id.clone(),
        })
        .context("Failed to create page")?;
    let page_id = changes.created.context("Page was not created")?;

    if let Some(name) = name {
        workspace
            .apply(Mutation::UpdatePage {
                book_id,
                page_id: page_id.clone(),
                patch: PagePatch::rename(name),
            })
            .context("Failed to name page")?;
    }

    output.success(&format!("Created page: {}", page_id));
    if output.is_quiet() {
        println!("{}", page_id);
    }
    Ok(())
}

/// List the pages of a book
pub fn list(workspace: &FileWorkspace, book: String, output: &Output) -> Result<()> {
    let book = resolve_book(workspace.collections(), &book)?;
    output.print_pages(book);
    Ok(())
}

/// Show a page's content
pub fn show(workspace: &FileWorkspace, book: String, page: String, output: &Output) -> Result<()> {
    let book = resolve_book(workspace.collections(), &book)?;
    let page = resolve_page(book, &page)?;
    output.print_page(book, page);
    Ok(())
}

/// Replace a page's content, from `--content` or the editor
pub fn edit(
    workspace: &mut FileWorkspace,
    book: String,
    page: String,
    content: Option<String>,
    output: &Output,
) -> Result<()> {
    let (book_id, page_id) = resolve_ids(workspace, &book, &page)?;

    let content = match content {
        Some(c) => c,
        None => {
            let page = workspace
                .collections()
                .get_book(&book_id)
                .and_then(|b| b.get_page(&page_id))
                .context("Page disappeared while editing")?;
            match edit_page(page).context("Failed to edit page")? {
                Some(edited) => edited,
                None => {
                    output.message("No changes made.");
                    return Ok(());
                }
            }
        }
    };

    workspace
        .apply(Mutation::UpdatePage {
            book_id,
            page_id: page_id.clone(),
            patch: PagePatch::content(content),
        })
        .context("Failed to save page")?;

    output.success(&format!("Saved page: {}", page_id));
    Ok(())
}

/// Rename a page
pub fn rename(
    workspace: &mut FileWorkspace,
    book: String,
    page: String,
    name: String,
    output: &Output,
) -> Result<()> {
    let (book_id, page_id) = resolve_ids(workspace, &book, &page)?;

    workspace
        .apply(Mutation::UpdatePage {
            book_id,
            page_id: page_id.clone(),
            patch: PagePatch::rename(name.clone()),
        })
        .context("Failed to rename page")?;

    output.success(&format!("Renamed page {} to '{}'", page_id, name));
    Ok(())
}

/// Delete a page from a book
pub fn delete(workspace: &mut FileWorkspace, book: String, page: String, output: &Output) -> Result<()> {
    let (book_id, page_id) = resolve_ids(workspace, &book, &page)?;

    let name = workspace
        .collections()
        .get_book(&book_id)
        .and_then(|b| b.get_page(&page_id))
        .map(|p| p.name.clone())
        .unwrap_or_default();
    if !approve(output, &format!("Delete page: {}", name), "Are you sure?")? {
        return Ok(());
    }

    workspace
        .apply(Mutation::DeletePage {
            book_id,
            page_id: page_id.clone(),
        })
        .context("Failed to delete page")?;

    output.success(&format!("Deleted page: {}", page_id));
    Ok(())
}
