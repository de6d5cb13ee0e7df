//! Drafty Core Library
//!
//! This crate provides the core functionality for Drafty, a personal
//! notebook organizer: books of pages, projects that group books,
//! flashcards and a whiteboard, all stored per user.
//!
//! # Architecture
//!
//! - **Storage**: a flat string key/value store, one key per collection
//!   and user (`drafty-{kind}-{uid}`)
//! - **Mutations**: pure transitions over the in-memory collections
//! - **Workspace**: applies mutations and saves what changed
//!
//! # Quick Start
//!
//! ```text
//! let mut workspace = Workspace::open_with_config(&config)?;
//!
//! // Create a book and rename it
//! let book_id = workspace.apply(Mutation::CreateBook)?.created;
//!
//! // Query
//! let books = &workspace.collections().books;
//! ```
//!
//! # Modules
//!
//! - `workspace`: Unified interface (main entry point)
//! - `models`: Data structures for books, pages, projects and flashcards
//! - `mutations`: Mutation commands and selection handling
//! - `storage`: Key/value backends, persistence and legacy migration
//! - `theme` / `color`: Theme resolution and color math
//! - `study`: Flashcard study cycling
//! - `preferences`: Global display preferences
//! - `session`: Signed-in user handling
//! - `config`: Application configuration

pub mod color;
pub mod config;
pub mod models;
pub mod mutations;
pub mod preferences;
pub mod session;
pub mod storage;
pub mod study;
pub mod theme;
pub mod workspace;

pub use config::Config;
pub use models::{Book, Collections, Flashcard, LegacyNote, Page, Project};
pub use mutations::{BookPatch, CardFilter, Changes, Mutation, PagePatch, Selection};
pub use preferences::{PreferenceError, Preferences};
pub use session::{ConfigSession, Session, SessionError, SessionProvider};
pub use storage::{
    CollectionKind, CollectionStore, FileStore, ImportError, KeyValueStore, MemoryStore,
    StorageError, StorageStats,
};
pub use study::StudyCycler;
pub use theme::{apply_theme, resolve_theme, ResolvedTheme, StyleSink, ThemeMode};
pub use workspace::{Workspace, WorkspaceError};
