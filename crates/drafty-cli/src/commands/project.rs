//! Project command handlers
//!
//! Projects group books by reference; removing a book from a project
//! never deletes the book.

use anyhow::{bail, Context, Result};

use drafty_core::{Mutation, Project};

use super::{resolve_book, resolve_project, FileWorkspace};
use crate::editor::approve;
use crate::output::Output;

/// Which membership change to make
#[derive(Debug, Clone, Copy)]
pub enum Membership {
    Add,
    Remove,
    Toggle,
}

/// Create a new project, optionally naming it
pub fn create(workspace: &mut FileWorkspace, name: Option<String>, output: &Output) -> Result<()> {
    let changes = workspace
        .apply(Mutation::CreateProject)
        .context("Failed to create project")?;
    let project_id = changes.created.context("Project was not created")?;

    if let Some(name) = name {
        workspace
            .apply(Mutation::RenameProject {
                project_id: project_id.clone(),
                name,
            })
            .context("Failed to name project")?;
    }

    output.success(&format!("Created project: {}", project_id));
    if output.is_quiet() {
        println!("{}", project_id);
    }
    Ok(())
}

/// List all projects
pub fn list(workspace: &FileWorkspace, output: &Output) -> Result<()> {
    output.print_projects(&workspace.collections().projects);
    Ok(())
}

/// Show a project and its notebooks
pub fn show(workspace: &FileWorkspace, id: String, output: &Output) -> Result<()> {
    let collections = workspace.collections();
    let project = resolve_project(collections, &id)?;
    let books = collections.project_books(&project.id);
    output.print_project(project, &books);
    Ok(())
}

/// Rename a project
pub fn rename(
    workspace: &mut FileWorkspace,
    id: String,
    name: String,
    output: &Output,
) -> Result<()> {
    let project_id = resolve_project(workspace.collections(), &id)?.id.clone();

    workspace
        .apply(Mutation::RenameProject {
            project_id: project_id.clone(),
            name: name.clone(),
        })
        .context("Failed to rename project")?;

    output.success(&format!("Renamed project {} to '{}'", project_id, name));
    Ok(())
}

/// Add, remove or toggle a book's membership in a project
pub fn membership(
    workspace: &mut FileWorkspace,
    project: String,
    book: String,
    change: Membership,
    output: &Output,
) -> Result<()> {
    let collections = workspace.collections();
    let project = resolve_project(collections, &project)?;
    let project_id = project.id.clone();

    // Removal accepts IDs of books that no longer exist
    let (book_id, book_name) = match resolve_book(collections, &book) {
        Ok(b) => (b.id.clone(), b.name.clone()),
        Err(_) if !matches!(change, Membership::Add) && project.contains(&book) => {
            (book.clone(), book.clone())
        }
        Err(e) => return Err(e),
    };
    let was_member = project.contains(&book_id);

    let mutation = match change {
        Membership::Add => Mutation::AddBookToProject {
            project_id: project_id.clone(),
            book_id,
        },
        Membership::Remove => Mutation::RemoveBookFromProject {
            project_id: project_id.clone(),
            book_id,
        },
        Membership::Toggle => Mutation::ToggleProjectBook {
            project_id: project_id.clone(),
            book_id,
        },
    };

    let changes = workspace
        .apply(mutation)
        .context("Failed to update project")?;

    if changes.is_empty() {
        match change {
            Membership::Add => output.message(&format!("'{}' is already in the project.", book_name)),
            Membership::Remove => {
                output.message(&format!("'{}' is not in the project.", book_name))
            }
            Membership::Toggle => bail!("Could not update project {}", project_id),
        }
        return Ok(());
    }

    let verb = if was_member { "Removed" } else { "Added" };
    let preposition = if was_member { "from" } else { "to" };
    output.success(&format!(
        "{} '{}' {} project {}",
        verb, book_name, preposition, project_id
    ));
    Ok(())
}

/// Delete a project (its books are kept)
pub fn delete(workspace: &mut FileWorkspace, id: String, output: &Output) -> Result<()> {
    let project: &Project = resolve_project(workspace.collections(), &id)?;
    let project_id = project.id.clone();

    let summary = format!(
        "Delete project: {} ({} notebook(s) will be kept)",
        project.name,
        project.book_ids.len()
    );
    if !approve(output, &summary, "Are you sure?")? {
        return Ok(());
    }

    workspace
        .apply(Mutation::DeleteProject {
            project_id: project_id.clone(),
        })
        .context("Failed to delete project")?;

    output.success(&format!("Deleted project: {}", project_id));
    Ok(())
}
