//! Data models for Drafty
//!
//! Defines the core data structures: Book, Page, Project and Flashcard,
//! plus the legacy single-level note format that is migrated into books.
//!
//! Field names serialize in camelCase so collections written by earlier
//! versions of Drafty load unchanged.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Name given to the first page of every new or migrated book
pub const FIRST_PAGE_NAME: &str = "Page 1";
/// Name given to new books
pub const UNTITLED_BOOK: &str = "Untitled Book";
/// Name given to pages added after the first
pub const UNTITLED_PAGE: &str = "Untitled Page";
/// Name given to new projects
pub const UNTITLED_PROJECT: &str = "Untitled Project";

/// Generate a new time-ordered identifier
pub fn new_id() -> String {
    Uuid::now_v7().to_string()
}

/// A single editable text unit within a book
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    /// Unique identifier
    pub id: String,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Page body content
    #[serde(default)]
    pub content: String,
    /// When this page was created
    #[serde(default = "Utc::now", deserialize_with = "lenient_timestamp")]
    pub created_at: DateTime<Utc>,
    /// When this page was last updated
    #[serde(default = "Utc::now", deserialize_with = "lenient_timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl Page {
    /// Create the first page of a book (`{book_id}-p1`)
    pub fn first_for(book_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            id: format!("{}-p1", book_id),
            name: FIRST_PAGE_NAME.to_string(),
            content: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Create an additional, untitled page for a book
    pub fn new_for(book_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            id: format!("{}-p{}", book_id, Uuid::now_v7().simple()),
            name: UNTITLED_PAGE.to_string(),
            content: String::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// A top-level note document containing an ordered list of pages
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Unique identifier
    pub id: String,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Pages, in display order
    #[serde(default)]
    pub pages: Vec<Page>,
    /// When this book was created
    #[serde(default = "Utc::now", deserialize_with = "lenient_timestamp")]
    pub created_at: DateTime<Utc>,
    /// When this book or any of its pages was last updated
    #[serde(default = "Utc::now", deserialize_with = "lenient_timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl Book {
    /// Create a new untitled book with a single default page
    pub fn new(now: DateTime<Utc>) -> Self {
        let id = new_id();
        let first_page = Page::first_for(&id, now);
        Self {
            id,
            name: UNTITLED_BOOK.to_string(),
            pages: vec![first_page],
            created_at: now,
            updated_at: now,
        }
    }

    /// Get a page by ID
    pub fn get_page(&self, page_id: &str) -> Option<&Page> {
        self.pages.iter().find(|p| p.id == page_id)
    }

    /// The first page, if any
    pub fn first_page(&self) -> Option<&Page> {
        self.pages.first()
    }
}

/// A named grouping that references zero or more books by ID
///
/// Projects do not own books. `book_ids` may contain IDs of books that no
/// longer exist; readers must skip them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Unique identifier
    pub id: String,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Member books, most recently added first
    #[serde(default)]
    pub book_ids: Vec<String>,
    /// When this project was created
    #[serde(default = "Utc::now", deserialize_with = "lenient_timestamp")]
    pub created_at: DateTime<Utc>,
    /// When this project was last updated
    #[serde(default = "Utc::now", deserialize_with = "lenient_timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Create a new, empty, untitled project
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            id: new_id(),
            name: UNTITLED_PROJECT.to_string(),
            book_ids: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Check whether a book is a member of this project
    pub fn contains(&self, book_id: &str) -> bool {
        self.book_ids.iter().any(|id| id == book_id)
    }
}

/// A question/answer pair, optionally scoped to a book
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Flashcard {
    /// Unique identifier
    pub id: String,
    /// Question side
    #[serde(default)]
    pub front: String,
    /// Answer side
    #[serde(default)]
    pub back: String,
    /// Owning book; `None` means the card is unscoped
    #[serde(default)]
    pub book_id: Option<String>,
    /// When this card was created
    #[serde(default = "Utc::now", deserialize_with = "lenient_timestamp")]
    pub created_at: DateTime<Utc>,
    /// When this card was last updated
    #[serde(default = "Utc::now", deserialize_with = "lenient_timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl Flashcard {
    /// Create a new card
    pub fn new(
        front: impl Into<String>,
        back: impl Into<String>,
        book_id: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: new_id(),
            front: front.into(),
            back: back.into(),
            book_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// True when both sides are empty after trimming whitespace
    pub fn is_blank(front: &str, back: &str) -> bool {
        front.trim().is_empty() && back.trim().is_empty()
    }
}

/// Pre-migration, single-level note
///
/// Only `id` is required; anything else may be missing or empty in data
/// written by old clients.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct LegacyNote {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl LegacyNote {
    /// Convert into a book holding exactly one page
    ///
    /// The page ID is derived from the note ID (`{id}-p1`). Missing or
    /// unparseable timestamps default to `now`.
    pub fn into_book(self, now: DateTime<Utc>) -> Book {
        let created_at = parse_timestamp(self.created_at.as_deref()).unwrap_or(now);
        let updated_at = parse_timestamp(self.updated_at.as_deref()).unwrap_or(now);
        let name = match self.title {
            Some(t) if !t.is_empty() => t,
            _ => UNTITLED_BOOK.to_string(),
        };

        let page = Page {
            id: format!("{}-p1", self.id),
            name: FIRST_PAGE_NAME.to_string(),
            content: self.content.unwrap_or_default(),
            created_at,
            updated_at,
        };

        Book {
            id: self.id,
            name,
            pages: vec![page],
            created_at,
            updated_at,
        }
    }
}

/// Parse the timestamp formats found in stored data
///
/// Accepts RFC 3339, ISO-8601 date-times without an offset (taken as UTC)
/// and bare dates (midnight UTC).
fn parse_timestamp(value: Option<&str>) -> Option<DateTime<Utc>> {
    let value = value?.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Deserialize an entity timestamp without ever rejecting the entity
///
/// Strings go through [`parse_timestamp`], numbers are epoch milliseconds.
/// Anything else, including `null`, becomes the current time.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    let parsed = match value {
        Some(serde_json::Value::String(s)) => parse_timestamp(Some(&s)),
        Some(serde_json::Value::Number(n)) => n
            .as_i64()
            .and_then(|millis| Utc.timestamp_millis_opt(millis).single()),
        _ => None,
    };
    Ok(parsed.unwrap_or_else(Utc::now))
}

/// The in-memory state of one user's collections
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collections {
    pub books: Vec<Book>,
    pub projects: Vec<Project>,
    pub flashcards: Vec<Flashcard>,
}

impl Collections {
    /// Get a book by ID
    pub fn get_book(&self, book_id: &str) -> Option<&Book> {
        self.books.iter().find(|b| b.id == book_id)
    }

    /// Get a project by ID
    pub fn get_project(&self, project_id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == project_id)
    }

    /// Get a flashcard by ID
    pub fn get_flashcard(&self, card_id: &str) -> Option<&Flashcard> {
        self.flashcards.iter().find(|c| c.id == card_id)
    }

    /// Check if all collections are empty
    pub fn is_empty(&self) -> bool {
        self.books.is_empty() && self.projects.is_empty() && self.flashcards.is_empty()
    }
}
