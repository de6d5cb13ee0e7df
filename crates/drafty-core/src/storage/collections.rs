//! Per-user collection persistence
//!
//! Loads, saves, exports, imports and clears the books, projects,
//! flashcards and whiteboard of one user, and performs the one-time
//! migration of legacy single-level notes into books.
//!
//! Reads fail soft: a missing or malformed value becomes an empty
//! collection and a logged error, never an `Err` to the caller. Inside a
//! well-formed list, entries that do not match the expected shape are
//! logged and skipped; their siblings still load.

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::models::{Book, Collections, LegacyNote};

use super::backend::KeyValueStore;
use super::error::{ImportError, StorageError, StorageResult};
use super::keys::{export_file_name, CollectionKind, StorageKey};

/// A collection serialized for download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    /// Suggested file name (`drafty-{kind}-{uid}.json`)
    pub file_name: String,
    /// Pretty-printed JSON
    pub bytes: Vec<u8>,
}

/// Size of one stored key
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyStats {
    pub key: String,
    /// Size in bytes, `None` if the key is absent
    pub size: Option<u64>,
}

/// Storage statistics for one user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StorageStats {
    pub keys: Vec<KeyStats>,
}

impl StorageStats {
    /// Total bytes across all present keys
    pub fn total_size(&self) -> u64 {
        self.keys.iter().filter_map(|k| k.size).sum()
    }

    /// Human-readable total size
    pub fn total_size_human(&self) -> String {
        format_size(self.total_size())
    }
}

fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Collection-level operations over a key/value backend
#[derive(Debug, Clone)]
pub struct CollectionStore<S> {
    backend: S,
}

impl<S: KeyValueStore> CollectionStore<S> {
    pub fn new(backend: S) -> Self {
        Self { backend }
    }

    /// Get the underlying backend
    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Get mutable access to the underlying backend
    pub fn backend_mut(&mut self) -> &mut S {
        &mut self.backend
    }

    /// Consume the store, returning the backend
    pub fn into_inner(self) -> S {
        self.backend
    }

    /// Load books, projects and flashcards for `uid`
    ///
    /// Absent or unparseable values become empty collections. When no books
    /// are stored, legacy notes are migrated first.
    pub fn load_collections(&mut self, uid: &str) -> Collections {
        let mut books: Vec<Book> = self.load_list(&StorageKey::user(CollectionKind::Books, uid));
        if books.is_empty() {
            books = self.migrate_legacy_notes(uid, &books);
        }

        let projects = self.load_list(&StorageKey::user(CollectionKind::Projects, uid));
        let flashcards = self.load_list(&StorageKey::user(CollectionKind::Flashcards, uid));

        let collections = Collections {
            books,
            projects,
            flashcards,
        };
        debug!(
            uid,
            books = collections.books.len(),
            projects = collections.projects.len(),
            flashcards = collections.flashcards.len(),
            "loaded collections"
        );
        collections
    }

    /// Convert legacy notes into one-page books
    ///
    /// Only runs when `existing_books` is empty. The migrated books are
    /// written to the books key so later loads skip migration; the legacy
    /// key itself is left in place. Returns an empty list when there is
    /// nothing to migrate.
    pub fn migrate_legacy_notes(&mut self, uid: &str, existing_books: &[Book]) -> Vec<Book> {
        if !existing_books.is_empty() {
            return Vec::new();
        }

        let legacy: Vec<LegacyNote> = self.load_list(&StorageKey::legacy_notes(uid));
        if legacy.is_empty() {
            return Vec::new();
        }

        let now = Utc::now();
        let books: Vec<Book> = legacy.into_iter().map(|n| n.into_book(now)).collect();

        if let Err(e) = self.save_collection(uid, CollectionKind::Books, &books) {
            warn!(uid, error = %e, "failed to persist migrated books");
        }
        info!(uid, count = books.len(), "migrated legacy notes into books");
        books
    }

    /// Serialize `value` and write it to the key for `kind`
    pub fn save_collection<T: Serialize + ?Sized>(
        &mut self,
        uid: &str,
        kind: CollectionKind,
        value: &T,
    ) -> StorageResult<()> {
        let json =
            serde_json::to_string(value).map_err(|source| StorageError::Serialize { kind, source })?;
        self.backend.set(&StorageKey::user(kind, uid), &json)
    }

    /// Write every collection in `collections` that appears in `kinds`
    pub fn save_kinds(
        &mut self,
        uid: &str,
        collections: &Collections,
        kinds: &[CollectionKind],
    ) -> StorageResult<()> {
        for kind in kinds {
            match kind {
                CollectionKind::Books => self.save_collection(uid, *kind, &collections.books)?,
                CollectionKind::Projects => {
                    self.save_collection(uid, *kind, &collections.projects)?
                }
                CollectionKind::Flashcards => {
                    self.save_collection(uid, *kind, &collections.flashcards)?
                }
                CollectionKind::Whiteboard => {}
            }
        }
        Ok(())
    }

    /// Read the persisted value of `kind` as a pretty JSON document
    pub fn export_collection(&self, uid: &str, kind: CollectionKind) -> StorageResult<ExportFile> {
        let key = StorageKey::user(kind, uid);
        let value = match self.backend.get(&key)? {
            None => kind.empty_value(),
            Some(raw) => match serde_json::from_str::<serde_json::Value>(&raw) {
                Ok(v) => v,
                // Older clients stored the whiteboard data URL unquoted
                Err(_) if kind == CollectionKind::Whiteboard => serde_json::Value::String(raw),
                Err(source) => {
                    return Err(StorageError::CorruptValue {
                        key: key.to_string(),
                        source,
                    })
                }
            },
        };

        let bytes = serde_json::to_vec_pretty(&value)
            .map_err(|source| StorageError::Serialize { kind, source })?;

        Ok(ExportFile {
            file_name: export_file_name(kind, uid),
            bytes,
        })
    }

    /// Replace the stored value of `kind` with the JSON in `bytes`
    ///
    /// The JSON is not validated against the collection's shape. If it does
    /// not parse, storage is left untouched.
    pub fn import_collection(
        &mut self,
        uid: &str,
        kind: CollectionKind,
        bytes: &[u8],
    ) -> Result<(), ImportError> {
        let value: serde_json::Value = serde_json::from_slice(bytes).map_err(|source| {
            error!(uid, %kind, error = %source, "import rejected: invalid JSON");
            ImportError::InvalidJson { kind, source }
        })?;

        self.save_collection(uid, kind, &value)?;
        info!(uid, %kind, "imported collection");
        Ok(())
    }

    /// Delete the stored value of `kind`
    ///
    /// Clearing books also deletes the legacy notes so they are not
    /// migrated back on the next load.
    pub fn clear_collection(&mut self, uid: &str, kind: CollectionKind) -> StorageResult<()> {
        self.backend.remove(&StorageKey::user(kind, uid))?;
        if kind == CollectionKind::Books {
            self.backend.remove(&StorageKey::legacy_notes(uid))?;
        }
        info!(uid, %kind, "cleared collection");
        Ok(())
    }

    /// Load the whiteboard image payload, if any
    pub fn load_whiteboard(&self, uid: &str) -> Option<String> {
        let key = StorageKey::user(CollectionKind::Whiteboard, uid);
        let raw = match self.backend.get(&key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                error!(key = %key, error = %e, "failed to read whiteboard");
                return None;
            }
        };

        let payload = match serde_json::from_str::<serde_json::Value>(&raw) {
            Ok(serde_json::Value::String(payload)) => payload,
            _ => raw,
        };
        (!payload.is_empty()).then_some(payload)
    }

    /// Store the whiteboard image payload
    pub fn save_whiteboard(&mut self, uid: &str, payload: &str) -> StorageResult<()> {
        self.save_collection(uid, CollectionKind::Whiteboard, payload)
    }

    /// Sizes of every key belonging to `uid`
    pub fn storage_stats(&self, uid: &str) -> StorageResult<StorageStats> {
        let mut keys: Vec<StorageKey> = CollectionKind::ALL
            .iter()
            .map(|kind| StorageKey::user(*kind, uid))
            .collect();
        keys.push(StorageKey::legacy_notes(uid));

        let keys = keys
            .into_iter()
            .map(|key| {
                Ok(KeyStats {
                    size: self.backend.size_of(&key)?,
                    key: key.to_string(),
                })
            })
            .collect::<StorageResult<Vec<_>>>()?;

        Ok(StorageStats { keys })
    }

    /// Read a JSON list, dropping entries that do not deserialize as `T`
    fn load_list<T: DeserializeOwned>(&self, key: &StorageKey) -> Vec<T> {
        let entries: Vec<serde_json::Value> = self.load_json(key);
        let total = entries.len();

        let items: Vec<T> = entries
            .into_iter()
            .enumerate()
            .filter_map(|(index, entry)| match serde_json::from_value(entry) {
                Ok(item) => Some(item),
                Err(e) => {
                    warn!(key = %key, index, error = %e, "skipping malformed entry");
                    None
                }
            })
            .collect();

        if items.len() < total {
            error!(key = %key, skipped = total - items.len(), "dropped malformed entries");
        }
        items
    }

    /// Read and parse a JSON value, substituting the default on any failure
    fn load_json<T: DeserializeOwned + Default>(&self, key: &StorageKey) -> T {
        let raw = match self.backend.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return T::default(),
            Err(e) => {
                error!(key = %key, error = %e, "failed to read storage key");
                return T::default();
            }
        };

        if raw.trim().is_empty() {
            return T::default();
        }

        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                error!(key = %key, error = %e, "failed to parse storage key");
                T::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Flashcard, Project};
    use crate::storage::backend::MemoryStore;
    use serde_json::json;

    const UID: &str = "user-1";

    fn store() -> CollectionStore<MemoryStore> {
        CollectionStore::new(MemoryStore::new())
    }

    fn put(store: &mut CollectionStore<MemoryStore>, key: StorageKey, value: serde_json::Value) {
        store.backend_mut().set(&key, &value.to_string()).unwrap();
    }

    fn legacy_notes() -> serde_json::Value {
        json!([
            {"id": "n1", "title": "First", "content": "alpha",
             "createdAt": "2023-01-01T00:00:00.000Z", "updatedAt": "2023-01-02T00:00:00.000Z"},
            {"id": "n2", "title": "Second", "content": "beta", "format": "html"},
            {"id": "n3", "content": "gamma"}
        ])
    }

    #[test]
    fn test_load_empty_store() {
        let mut store = store();
        let collections = store.load_collections(UID);
        assert!(collections.is_empty());
        // Nothing to migrate, nothing written
        assert!(store.backend().is_empty());
    }

    #[test]
    fn test_load_malformed_json_degrades_to_empty() {
        let mut store = store();
        let now = Utc::now();
        store
            .backend_mut()
            .set(&StorageKey::user(CollectionKind::Books, UID), "{not json")
            .unwrap();
        store
            .save_collection(UID, CollectionKind::Projects, &vec![Project::new(now)])
            .unwrap();
        store
            .backend_mut()
            .set(&StorageKey::user(CollectionKind::Flashcards, UID), "42")
            .unwrap();

        let collections = store.load_collections(UID);
        assert!(collections.books.is_empty());
        assert_eq!(collections.projects.len(), 1);
        assert!(collections.flashcards.is_empty());
    }

    #[test]
    fn test_bad_entry_keeps_siblings() {
        let mut store = store();
        put(
            &mut store,
            StorageKey::user(CollectionKind::Books, UID),
            json!([
                {"id": "good", "name": "Good", "pages": [],
                 "createdAt": "2024-01-01T00:00:00.000Z", "updatedAt": "2024-01-01T00:00:00.000Z"},
                {"id": "odd", "name": "Odd", "pages": [],
                 "createdAt": "2024-01-01", "updatedAt": "2024-01-01"},
                {"name": "no id"}
            ]),
        );
        put(
            &mut store,
            StorageKey::user(CollectionKind::Projects, UID),
            json!([
                {"id": "p1", "name": "Kept", "bookIds": ["good"], "color": null},
                {"id": "p2", "name": "Broken", "bookIds": "good"}
            ]),
        );
        put(
            &mut store,
            StorageKey::user(CollectionKind::Flashcards, UID),
            json!([
                7,
                {"id": "c1", "front": "Q", "back": "A", "createdAt": 1704067200000_i64}
            ]),
        );

        let collections = store.load_collections(UID);
        let book_ids: Vec<&str> = collections.books.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(book_ids, ["good", "odd"]);
        assert_eq!(collections.projects.len(), 1);
        assert_eq!(collections.projects[0].id, "p1");
        assert_eq!(collections.flashcards.len(), 1);
        assert_eq!(collections.flashcards[0].id, "c1");

        // Saving what was loaded keeps the valid entries
        store
            .save_kinds(UID, &collections, &CollectionKind::ALL)
            .unwrap();
        assert_eq!(store.load_collections(UID), collections);
    }

    #[test]
    fn test_legacy_note_without_id_is_skipped() {
        let mut store = store();
        put(
            &mut store,
            StorageKey::legacy_notes(UID),
            json!([{"title": "orphan"}, {"id": "n1", "content": "kept"}]),
        );

        let collections = store.load_collections(UID);
        assert_eq!(collections.books.len(), 1);
        assert_eq!(collections.books[0].id, "n1");
        assert_eq!(collections.books[0].pages[0].content, "kept");
    }

    #[test]
    fn test_migration_creates_one_book_per_note() {
        let mut store = store();
        put(&mut store, StorageKey::legacy_notes(UID), legacy_notes());

        let collections = store.load_collections(UID);
        assert_eq!(collections.books.len(), 3);
        for (book, content) in collections.books.iter().zip(["alpha", "beta", "gamma"]) {
            assert_eq!(book.pages.len(), 1);
            assert_eq!(book.pages[0].content, content);
            assert_eq!(book.pages[0].id, format!("{}-p1", book.id));
            assert_eq!(book.pages[0].name, "Page 1");
        }
        assert_eq!(collections.books[2].name, "Untitled Book");

        // Migration was persisted and the legacy key left alone
        let key = StorageKey::user(CollectionKind::Books, UID);
        assert!(store.backend().contains(&key).unwrap());
        assert!(store.backend().contains(&StorageKey::legacy_notes(UID)).unwrap());
    }

    #[test]
    fn test_migration_is_idempotent() {
        let mut store = store();
        put(&mut store, StorageKey::legacy_notes(UID), legacy_notes());

        let first = store.load_collections(UID);
        let second = store.load_collections(UID);
        assert_eq!(first.books, second.books);
        assert_eq!(second.books.len(), 3);
    }

    #[test]
    fn test_migration_skipped_when_books_exist() {
        let mut store = store();
        let existing = vec![Book::new(Utc::now())];
        store
            .save_collection(UID, CollectionKind::Books, &existing)
            .unwrap();
        put(&mut store, StorageKey::legacy_notes(UID), legacy_notes());

        let collections = store.load_collections(UID);
        assert_eq!(collections.books, existing);
        assert!(store.migrate_legacy_notes(UID, &existing).is_empty());
    }

    #[test]
    fn test_migration_without_legacy_data() {
        let mut store = store();
        assert!(store.migrate_legacy_notes(UID, &[]).is_empty());
        assert!(store.backend().is_empty());
    }

    #[test]
    fn test_users_are_isolated() {
        let mut store = store();
        store
            .save_collection("alice", CollectionKind::Books, &vec![Book::new(Utc::now())])
            .unwrap();

        assert_eq!(store.load_collections("alice").books.len(), 1);
        assert!(store.load_collections("bob").books.is_empty());
    }

    #[test]
    fn test_export_names_and_pretty_prints() {
        let mut store = store();
        let cards = vec![Flashcard::new("Q", "A", None, Utc::now())];
        store
            .save_collection(UID, CollectionKind::Flashcards, &cards)
            .unwrap();

        let export = store
            .export_collection(UID, CollectionKind::Flashcards)
            .unwrap();
        assert_eq!(export.file_name, "drafty-flashcards-user-1.json");
        let text = String::from_utf8(export.bytes).unwrap();
        assert!(text.contains("\n  {"));
        let parsed: Vec<Flashcard> = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, cards);
    }

    #[test]
    fn test_export_absent_collection() {
        let store = store();
        let books = store.export_collection(UID, CollectionKind::Books).unwrap();
        assert_eq!(books.bytes, b"[]");
        let board = store
            .export_collection(UID, CollectionKind::Whiteboard)
            .unwrap();
        assert_eq!(board.bytes, b"\"\"");
    }

    #[test]
    fn test_export_import_round_trip_all_kinds() {
        let now = Utc::now();
        let mut book = Book::new(now);
        book.name = "Round trip".to_string();
        let mut project = Project::new(now);
        project.book_ids.push(book.id.clone());
        let card = Flashcard::new("front", "back", Some(book.id.clone()), now);

        let mut source = store();
        source
            .save_collection(UID, CollectionKind::Books, &vec![book])
            .unwrap();
        source
            .save_collection(UID, CollectionKind::Projects, &vec![project])
            .unwrap();
        source
            .save_collection(UID, CollectionKind::Flashcards, &vec![card])
            .unwrap();
        source
            .save_whiteboard(UID, "data:image/png;base64,AAAA")
            .unwrap();

        let mut target = store();
        for kind in CollectionKind::ALL {
            let export = source.export_collection(UID, kind).unwrap();
            target.import_collection(UID, kind, &export.bytes).unwrap();

            let key = StorageKey::user(kind, UID);
            let a: serde_json::Value =
                serde_json::from_str(&source.backend().get(&key).unwrap().unwrap()).unwrap();
            let b: serde_json::Value =
                serde_json::from_str(&target.backend().get(&key).unwrap().unwrap()).unwrap();
            assert_eq!(a, b, "round trip mismatch for {}", kind);
        }

        assert_eq!(source.load_collections(UID), target.load_collections(UID));
        assert_eq!(
            target.load_whiteboard(UID).as_deref(),
            Some("data:image/png;base64,AAAA")
        );
    }

    #[test]
    fn test_import_invalid_json_leaves_storage() {
        let mut store = store();
        let books = vec![Book::new(Utc::now())];
        store
            .save_collection(UID, CollectionKind::Books, &books)
            .unwrap();

        let err = store
            .import_collection(UID, CollectionKind::Books, b"{ nope")
            .unwrap_err();
        assert!(matches!(err, ImportError::InvalidJson { .. }));
        assert_eq!(store.load_collections(UID).books, books);
    }

    #[test]
    fn test_import_overwrites_without_validation() {
        let mut store = store();
        store
            .save_collection(UID, CollectionKind::Projects, &vec![Project::new(Utc::now())])
            .unwrap();

        store
            .import_collection(UID, CollectionKind::Projects, br#"{"not": "a list"}"#)
            .unwrap();

        let raw = store
            .backend()
            .get(&StorageKey::user(CollectionKind::Projects, UID))
            .unwrap()
            .unwrap();
        assert_eq!(raw, r#"{"not":"a list"}"#);
        // Wrong shape degrades to empty on load
        assert!(store.load_collections(UID).projects.is_empty());
    }

    #[test]
    fn test_clear_books_also_clears_legacy_notes() {
        let mut store = store();
        put(&mut store, StorageKey::legacy_notes(UID), legacy_notes());
        assert_eq!(store.load_collections(UID).books.len(), 3);

        store.clear_collection(UID, CollectionKind::Books).unwrap();
        assert!(store.backend().is_empty());
        assert!(store.load_collections(UID).books.is_empty());
    }

    #[test]
    fn test_clear_other_kind_keeps_legacy_notes() {
        let mut store = store();
        put(&mut store, StorageKey::legacy_notes(UID), legacy_notes());
        store
            .save_collection(UID, CollectionKind::Flashcards, &Vec::<Flashcard>::new())
            .unwrap();

        store
            .clear_collection(UID, CollectionKind::Flashcards)
            .unwrap();
        assert!(store.backend().contains(&StorageKey::legacy_notes(UID)).unwrap());
    }

    #[test]
    fn test_whiteboard_reads_unquoted_payload() {
        let mut store = store();
        let key = StorageKey::user(CollectionKind::Whiteboard, UID);
        store
            .backend_mut()
            .set(&key, "data:image/png;base64,iVBORw0KGgo=")
            .unwrap();

        assert_eq!(
            store.load_whiteboard(UID).as_deref(),
            Some("data:image/png;base64,iVBORw0KGgo=")
        );
        let export = store
            .export_collection(UID, CollectionKind::Whiteboard)
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&export.bytes).unwrap();
        assert_eq!(value, json!("data:image/png;base64,iVBORw0KGgo="));
    }

    #[test]
    fn test_export_corrupt_collection_errors() {
        let mut store = store();
        store
            .backend_mut()
            .set(&StorageKey::user(CollectionKind::Books, UID), "[oops")
            .unwrap();
        let err = store
            .export_collection(UID, CollectionKind::Books)
            .unwrap_err();
        assert!(matches!(err, StorageError::CorruptValue { .. }));
    }

    #[test]
    fn test_storage_stats() {
        let mut store = store();
        store.save_whiteboard(UID, "abc").unwrap();
        let stats = store.storage_stats(UID).unwrap();
        assert_eq!(stats.keys.len(), 5);
        assert_eq!(stats.total_size(), 5); // "\"abc\""
        assert_eq!(stats.total_size_human(), "5 B");
    }
}
