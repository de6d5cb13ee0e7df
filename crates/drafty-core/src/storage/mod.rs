//! Storage layer
//!
//! Handles per-user persistence of collections on a flat key/value store.
//!
//! ## Architecture
//!
//! - **Backend**: a `KeyValueStore` holding raw strings, either files on
//!   disk (`FileStore`) or an in-memory map (`MemoryStore`)
//! - **Collections**: JSON encoding, legacy migration, export, import and
//!   clear on top of any backend (`CollectionStore`)
//!
//! Every key is namespaced per user: `drafty-{kind}-{uid}`.

pub mod backend;
pub mod collections;
pub mod error;
pub mod keys;
pub mod persistence;

pub use backend::{KeyValueStore, MemoryStore};
pub use collections::{CollectionStore, ExportFile, KeyStats, StorageStats};
pub use error::{ImportError, StorageError, StorageResult};
pub use keys::{export_file_name, CollectionKind, StorageKey};
pub use persistence::FileStore;
