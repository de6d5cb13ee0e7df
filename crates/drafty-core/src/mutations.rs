//! In-memory state transitions
//!
//! Every user action is a [`Mutation`] applied to [`Collections`] together
//! with the active [`Selection`]. Applying returns the set of collection
//! kinds that changed so the caller can persist exactly those.
//!
//! Mutations that target a missing entity, or that would insert invalid
//! data, are no-ops and return an empty [`Changes`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Book, Collections, Flashcard, Page, Project};
use crate::storage::CollectionKind;

/// Currently active book, page and project
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    pub book_id: Option<String>,
    pub page_id: Option<String>,
    pub project_id: Option<String>,
}

impl Selection {
    /// Clear every selected id
    pub fn clear(&mut self) {
        *self = Selection::default();
    }

    /// Select a book and its first page
    ///
    /// Returns false (and changes nothing) if the book does not exist.
    pub fn select_book(&mut self, collections: &Collections, book_id: &str) -> bool {
        let Some(book) = collections.get_book(book_id) else {
            return false;
        };
        self.book_id = Some(book.id.clone());
        self.page_id = book.first_page().map(|p| p.id.clone());
        true
    }

    /// Select a page, making its book the active book
    pub fn select_page(&mut self, collections: &Collections, book_id: &str, page_id: &str) -> bool {
        let Some(book) = collections.get_book(book_id) else {
            return false;
        };
        if book.get_page(page_id).is_none() {
            return false;
        }
        self.book_id = Some(book.id.clone());
        self.page_id = Some(page_id.to_string());
        true
    }

    /// Select a project
    pub fn select_project(&mut self, collections: &Collections, project_id: &str) -> bool {
        if collections.get_project(project_id).is_none() {
            return false;
        }
        self.project_id = Some(project_id.to_string());
        true
    }

    /// Resolve the selected book
    pub fn book<'a>(&self, collections: &'a Collections) -> Option<&'a Book> {
        collections.get_book(self.book_id.as_deref()?)
    }

    /// Resolve the selected page within the selected book
    pub fn page<'a>(&self, collections: &'a Collections) -> Option<&'a Page> {
        self.book(collections)?.get_page(self.page_id.as_deref()?)
    }

    /// Resolve the selected project
    pub fn project<'a>(&self, collections: &'a Collections) -> Option<&'a Project> {
        collections.get_project(self.project_id.as_deref()?)
    }
}

/// Partial update of a book
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookPatch {
    pub name: Option<String>,
    /// Replacement page list
    pub pages: Option<Vec<Page>>,
}

impl BookPatch {
    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            pages: None,
        }
    }
}

/// Partial update of a page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PagePatch {
    pub name: Option<String>,
    pub content: Option<String>,
}

impl PagePatch {
    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            content: None,
        }
    }

    pub fn content(content: impl Into<String>) -> Self {
        Self {
            name: None,
            content: Some(content.into()),
        }
    }
}

/// A user action on the collections
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    CreateBook,
    UpdateBook {
        book_id: String,
        patch: BookPatch,
    },
    DeleteBook {
        book_id: String,
    },
    CreatePage {
        book_id: String,
    },
    UpdatePage {
        book_id: String,
        page_id: String,
        patch: PagePatch,
    },
    DeletePage {
        book_id: String,
        page_id: String,
    },
    CreateProject,
    RenameProject {
        project_id: String,
        name: String,
    },
    /// Remove the book if it is a member, otherwise add it
    ToggleProjectBook {
        project_id: String,
        book_id: String,
    },
    AddBookToProject {
        project_id: String,
        book_id: String,
    },
    RemoveBookFromProject {
        project_id: String,
        book_id: String,
    },
    DeleteProject {
        project_id: String,
    },
    CreateFlashcard {
        front: String,
        back: String,
        book_id: Option<String>,
    },
    DeleteFlashcard {
        card_id: String,
    },
}

/// Which collections a mutation touched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Changes {
    pub books: bool,
    pub projects: bool,
    pub flashcards: bool,
    /// ID of the entity created by the mutation, if any
    pub created: Option<String>,
}

impl Changes {
    /// Nothing changed
    pub fn none() -> Self {
        Self::default()
    }

    fn books() -> Self {
        Self {
            books: true,
            ..Self::default()
        }
    }

    fn projects() -> Self {
        Self {
            projects: true,
            ..Self::default()
        }
    }

    fn flashcards() -> Self {
        Self {
            flashcards: true,
            ..Self::default()
        }
    }

    fn with_created(mut self, id: impl Into<String>) -> Self {
        self.created = Some(id.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        !self.books && !self.projects && !self.flashcards
    }

    /// Changed collection kinds, in storage order
    pub fn kinds(&self) -> Vec<CollectionKind> {
        let mut kinds = Vec::new();
        if self.books {
            kinds.push(CollectionKind::Books);
        }
        if self.projects {
            kinds.push(CollectionKind::Projects);
        }
        if self.flashcards {
            kinds.push(CollectionKind::Flashcards);
        }
        kinds
    }
}

/// Which flashcards to show
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CardFilter {
    #[default]
    All,
    Book(String),
}

/// Index to select after removing the item at `removed_idx`
fn clamped_index(removed_idx: usize, remaining: usize) -> Option<usize> {
    (remaining > 0).then(|| removed_idx.min(remaining - 1))
}

impl Collections {
    /// Selection right after loading: first book, its first page, first project
    pub fn initial_selection(&self) -> Selection {
        let book = self.books.first();
        Selection {
            book_id: book.map(|b| b.id.clone()),
            page_id: book.and_then(|b| b.first_page()).map(|p| p.id.clone()),
            project_id: self.projects.first().map(|p| p.id.clone()),
        }
    }

    /// Member books of a project, skipping IDs that no longer resolve
    pub fn project_books(&self, project_id: &str) -> Vec<&Book> {
        self.get_project(project_id)
            .map(|project| {
                project
                    .book_ids
                    .iter()
                    .filter_map(|id| self.get_book(id))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Flashcards matching `filter`
    ///
    /// A filter naming a book that does not exist shows all cards.
    pub fn flashcards_for(&self, filter: &CardFilter) -> Vec<&Flashcard> {
        match filter {
            CardFilter::Book(book_id) if self.get_book(book_id).is_some() => self
                .flashcards
                .iter()
                .filter(|c| c.book_id.as_deref() == Some(book_id.as_str()))
                .collect(),
            _ => self.flashcards.iter().collect(),
        }
    }

    /// Apply a mutation, returning what changed
    pub fn apply(
        &mut self,
        selection: &mut Selection,
        mutation: Mutation,
        now: DateTime<Utc>,
    ) -> Changes {
        match mutation {
            Mutation::CreateBook => self.create_book(selection, now),
            Mutation::UpdateBook { book_id, patch } => self.update_book(&book_id, patch, now),
            Mutation::DeleteBook { book_id } => self.delete_book(selection, &book_id),
            Mutation::CreatePage { book_id } => self.create_page(selection, &book_id, now),
            Mutation::UpdatePage {
                book_id,
                page_id,
                patch,
            } => self.update_page(&book_id, &page_id, patch, now),
            Mutation::DeletePage { book_id, page_id } => {
                self.delete_page(selection, &book_id, &page_id, now)
            }
            Mutation::CreateProject => self.create_project(selection, now),
            Mutation::RenameProject { project_id, name } => {
                self.rename_project(&project_id, name, now)
            }
            Mutation::ToggleProjectBook {
                project_id,
                book_id,
            } => {
                let is_member = self
                    .get_project(&project_id)
                    .is_some_and(|p| p.contains(&book_id));
                if is_member {
                    self.remove_book_from_project(&project_id, &book_id, now)
                } else {
                    self.add_book_to_project(&project_id, &book_id, now)
                }
            }
            Mutation::AddBookToProject {
                project_id,
                book_id,
            } => self.add_book_to_project(&project_id, &book_id, now),
            Mutation::RemoveBookFromProject {
                project_id,
                book_id,
            } => self.remove_book_from_project(&project_id, &book_id, now),
            Mutation::DeleteProject { project_id } => self.delete_project(selection, &project_id),
            Mutation::CreateFlashcard {
                front,
                back,
                book_id,
            } => self.create_flashcard(front, back, book_id, now),
            Mutation::DeleteFlashcard { card_id } => self.delete_flashcard(&card_id),
        }
    }

    fn book_mut(&mut self, book_id: &str) -> Option<&mut Book> {
        self.books.iter_mut().find(|b| b.id == book_id)
    }

    fn project_mut(&mut self, project_id: &str) -> Option<&mut Project> {
        self.projects.iter_mut().find(|p| p.id == project_id)
    }

    // ==================== Books ====================

    fn create_book(&mut self, selection: &mut Selection, now: DateTime<Utc>) -> Changes {
        let book = Book::new(now);
        selection.book_id = Some(book.id.clone());
        selection.page_id = book.first_page().map(|p| p.id.clone());
        let id = book.id.clone();
        self.books.insert(0, book);
        Changes::books().with_created(id)
    }

    fn update_book(&mut self, book_id: &str, patch: BookPatch, now: DateTime<Utc>) -> Changes {
        let Some(book) = self.book_mut(book_id) else {
            return Changes::none();
        };
        if let Some(name) = patch.name {
            book.name = name;
        }
        if let Some(pages) = patch.pages {
            book.pages = pages;
        }
        book.updated_at = now;
        Changes::books()
    }

    fn delete_book(&mut self, selection: &mut Selection, book_id: &str) -> Changes {
        let Some(idx) = self.books.iter().position(|b| b.id == book_id) else {
            return Changes::none();
        };
        self.books.remove(idx);

        let mut changes = Changes::books();

        for project in &mut self.projects {
            if project.contains(book_id) {
                project.book_ids.retain(|id| id != book_id);
                changes.projects = true;
            }
        }

        let before = self.flashcards.len();
        self.flashcards
            .retain(|c| c.book_id.as_deref() != Some(book_id));
        changes.flashcards = self.flashcards.len() != before;

        if selection.book_id.as_deref() == Some(book_id) {
            let next = clamped_index(idx, self.books.len()).map(|i| &self.books[i]);
            selection.book_id = next.map(|b| b.id.clone());
            selection.page_id = next.and_then(|b| b.first_page()).map(|p| p.id.clone());
        }

        changes
    }

    // ==================== Pages ====================

    fn create_page(
        &mut self,
        selection: &mut Selection,
        book_id: &str,
        now: DateTime<Utc>,
    ) -> Changes {
        let Some(book) = self.book_mut(book_id) else {
            return Changes::none();
        };
        let page = Page::new_for(&book.id, now);
        let page_id = page.id.clone();
        book.pages.insert(0, page);
        book.updated_at = now;

        selection.book_id = Some(book_id.to_string());
        selection.page_id = Some(page_id.clone());
        Changes::books().with_created(page_id)
    }

    fn update_page(
        &mut self,
        book_id: &str,
        page_id: &str,
        patch: PagePatch,
        now: DateTime<Utc>,
    ) -> Changes {
        let Some(book) = self.book_mut(book_id) else {
            return Changes::none();
        };
        let Some(page) = book.pages.iter_mut().find(|p| p.id == page_id) else {
            return Changes::none();
        };
        if let Some(name) = patch.name {
            page.name = name;
        }
        if let Some(content) = patch.content {
            page.content = content;
        }
        page.updated_at = now;
        book.updated_at = now;
        Changes::books()
    }

    fn delete_page(
        &mut self,
        selection: &mut Selection,
        book_id: &str,
        page_id: &str,
        now: DateTime<Utc>,
    ) -> Changes {
        let Some(book) = self.book_mut(book_id) else {
            return Changes::none();
        };
        let Some(idx) = book.pages.iter().position(|p| p.id == page_id) else {
            return Changes::none();
        };
        book.pages.remove(idx);
        book.updated_at = now;

        if selection.page_id.as_deref() == Some(page_id) {
            selection.page_id =
                clamped_index(idx, book.pages.len()).map(|i| book.pages[i].id.clone());
        }
        Changes::books()
    }

    // ==================== Projects ====================

    fn create_project(&mut self, selection: &mut Selection, now: DateTime<Utc>) -> Changes {
        let project = Project::new(now);
        let id = project.id.clone();
        selection.project_id = Some(id.clone());
        self.projects.insert(0, project);
        Changes::projects().with_created(id)
    }

    fn rename_project(&mut self, project_id: &str, name: String, now: DateTime<Utc>) -> Changes {
        let Some(project) = self.project_mut(project_id) else {
            return Changes::none();
        };
        project.name = name;
        project.updated_at = now;
        Changes::projects()
    }

    fn add_book_to_project(
        &mut self,
        project_id: &str,
        book_id: &str,
        now: DateTime<Utc>,
    ) -> Changes {
        if self.get_book(book_id).is_none() {
            return Changes::none();
        }
        let Some(project) = self.project_mut(project_id) else {
            return Changes::none();
        };
        if project.contains(book_id) {
            return Changes::none();
        }
        project.book_ids.insert(0, book_id.to_string());
        project.updated_at = now;
        Changes::projects()
    }

    fn remove_book_from_project(
        &mut self,
        project_id: &str,
        book_id: &str,
        now: DateTime<Utc>,
    ) -> Changes {
        let Some(project) = self.project_mut(project_id) else {
            return Changes::none();
        };
        if !project.contains(book_id) {
            return Changes::none();
        }
        project.book_ids.retain(|id| id != book_id);
        project.updated_at = now;
        Changes::projects()
    }

    fn delete_project(&mut self, selection: &mut Selection, project_id: &str) -> Changes {
        let Some(idx) = self.projects.iter().position(|p| p.id == project_id) else {
            return Changes::none();
        };
        self.projects.remove(idx);

        if selection.project_id.as_deref() == Some(project_id) {
            selection.project_id =
                clamped_index(idx, self.projects.len()).map(|i| self.projects[i].id.clone());
        }
        Changes::projects()
    }

    // ==================== Flashcards ====================

    fn create_flashcard(
        &mut self,
        front: String,
        back: String,
        book_id: Option<String>,
        now: DateTime<Utc>,
    ) -> Changes {
        if Flashcard::is_blank(&front, &back) {
            return Changes::none();
        }
        if let Some(id) = book_id.as_deref() {
            if self.get_book(id).is_none() {
                return Changes::none();
            }
        }
        let card = Flashcard::new(front, back, book_id, now);
        let id = card.id.clone();
        self.flashcards.insert(0, card);
        Changes::flashcards().with_created(id)
    }

    fn delete_flashcard(&mut self, card_id: &str) -> Changes {
        let before = self.flashcards.len();
        self.flashcards.retain(|c| c.id != card_id);
        if self.flashcards.len() == before {
            return Changes::none();
        }
        Changes::flashcards()
    }
}
