//! Unified workspace interface
//!
//! The `Workspace` binds a session to its collections and coordinates:
//! - In-memory state (collections plus the active selection)
//! - Persistence (one key per collection kind, namespaced by user)
//!
//! ## Session
//!
//! Collections are only loaded while a session is bound. Without one,
//! everything is empty and per-user operations fail with
//! [`SessionError::NoSession`].
//!
//! ## Usage
//!
//! ```ignore
//! let mut workspace = Workspace::open_with_config(&config)?;
//!
//! // Every mutation is saved before `apply` returns
//! let changes = workspace.apply(Mutation::CreateBook)?;
//!
//! let books = &workspace.collections().books;
//! ```

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, error, info};

use crate::config::Config;
use crate::models::Collections;
use crate::mutations::{Changes, Mutation, Selection};
use crate::preferences::Preferences;
use crate::session::{ConfigSession, Session, SessionError, SessionProvider};
use crate::storage::{
    CollectionKind, CollectionStore, ExportFile, FileStore, ImportError, KeyValueStore,
    StorageError, StorageStats,
};

/// Errors surfaced by the workspace API
#[derive(Error, Debug)]
pub enum WorkspaceError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Import(#[from] ImportError),

    #[error(transparent)]
    Session(#[from] SessionError),
}

impl WorkspaceError {
    /// A hint to show alongside the error, if there is one
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            WorkspaceError::Storage(e) | WorkspaceError::Import(ImportError::Storage(e)) => {
                e.recovery_suggestion()
            }
            WorkspaceError::Import(ImportError::InvalidJson { .. }) => {
                Some("Choose a file produced by `drafty data export`.")
            }
            WorkspaceError::Session(SessionError::NoSession) => {
                Some("Sign in with `drafty login <uid>` or pass --uid.")
            }
            WorkspaceError::Session(SessionError::SignOut(_)) => None,
        }
    }
}

/// A user's collections bound to a storage backend
pub struct Workspace<S: KeyValueStore> {
    store: CollectionStore<S>,
    session: Option<Session>,
    collections: Collections,
    selection: Selection,
}

impl Workspace<FileStore> {
    /// Open the configured data directory with the configured session
    pub fn open_with_config(config: &Config) -> Result<Self, WorkspaceError> {
        let backend = FileStore::from_config(config)?;
        Ok(Self::with_provider(backend, &ConfigSession::from_config(config)))
    }
}

impl<S: KeyValueStore> Workspace<S> {
    /// Create a workspace with no session bound
    pub fn new(backend: S) -> Self {
        Self {
            store: CollectionStore::new(backend),
            session: None,
            collections: Collections::default(),
            selection: Selection::default(),
        }
    }

    /// Create a workspace and bind `session`
    pub fn open(backend: S, session: Option<Session>) -> Self {
        let mut workspace = Self::new(backend);
        workspace.switch_session(session);
        workspace
    }

    /// Create a workspace bound to the provider's current session
    pub fn with_provider(backend: S, provider: &impl SessionProvider) -> Self {
        Self::open(backend, provider.current())
    }

    /// Bind a different session, or none
    ///
    /// Binding a session loads its collections (migrating legacy notes if
    /// needed) and selects the first book, its first page and the first
    /// project.
    pub fn switch_session(&mut self, session: Option<Session>) {
        self.session = session;
        match &self.session {
            Some(session) => {
                self.collections = self.store.load_collections(&session.uid);
                self.selection = self.collections.initial_selection();
                info!(uid = %session.uid, "session bound");
            }
            None => {
                self.collections = Collections::default();
                self.selection.clear();
                debug!("no session bound");
            }
        }
    }

    /// End the session through `provider`
    ///
    /// The workspace is left without a session even if the provider fails;
    /// the provider's error is returned afterwards.
    pub fn sign_out(&mut self, provider: &mut impl SessionProvider) -> Result<(), SessionError> {
        let result = provider.sign_out();
        if let Err(e) = &result {
            error!(error = %e, "sign-out failed");
        }
        self.switch_session(None);
        result
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// ID of the signed-in user
    pub fn uid(&self) -> Result<&str, SessionError> {
        self.session
            .as_ref()
            .map(|s| s.uid.as_str())
            .ok_or(SessionError::NoSession)
    }

    fn owned_uid(&self) -> Result<String, SessionError> {
        self.uid().map(str::to_string)
    }

    pub fn collections(&self) -> &Collections {
        &self.collections
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Get the collection store
    pub fn store(&self) -> &CollectionStore<S> {
        &self.store
    }

    // ==================== Selection ====================

    pub fn select_book(&mut self, book_id: &str) -> bool {
        self.selection.select_book(&self.collections, book_id)
    }

    pub fn select_page(&mut self, book_id: &str, page_id: &str) -> bool {
        self.selection.select_page(&self.collections, book_id, page_id)
    }

    pub fn select_project(&mut self, project_id: &str) -> bool {
        self.selection.select_project(&self.collections, project_id)
    }

    // ==================== Mutations ====================

    /// Apply a mutation and save every collection it changed
    pub fn apply(&mut self, mutation: Mutation) -> Result<Changes, WorkspaceError> {
        self.apply_at(mutation, Utc::now())
    }

    /// Apply a mutation with an explicit timestamp
    pub fn apply_at(
        &mut self,
        mutation: Mutation,
        now: DateTime<Utc>,
    ) -> Result<Changes, WorkspaceError> {
        let uid = self.owned_uid()?;
        let changes = self.collections.apply(&mut self.selection, mutation, now);
        if changes.is_empty() {
            debug!("mutation had no effect");
            return Ok(changes);
        }

        self.store
            .save_kinds(&uid, &self.collections, &changes.kinds())?;
        debug!(uid = %uid, kinds = ?changes.kinds(), "saved changes");
        Ok(changes)
    }

    // ==================== Data management ====================

    /// Export one collection as a pretty JSON file
    pub fn export(&self, kind: CollectionKind) -> Result<ExportFile, WorkspaceError> {
        Ok(self.store.export_collection(self.uid()?, kind)?)
    }

    /// Replace one collection with imported JSON, then reload
    pub fn import(&mut self, kind: CollectionKind, bytes: &[u8]) -> Result<(), WorkspaceError> {
        let uid = self.owned_uid()?;
        self.store.import_collection(&uid, kind, bytes)?;
        self.reload();
        Ok(())
    }

    /// Delete one collection from storage, then reload
    pub fn clear(&mut self, kind: CollectionKind) -> Result<(), WorkspaceError> {
        let uid = self.owned_uid()?;
        self.store.clear_collection(&uid, kind)?;
        self.reload();
        Ok(())
    }

    /// Storage usage of the signed-in user
    pub fn stats(&self) -> Result<StorageStats, WorkspaceError> {
        Ok(self.store.storage_stats(self.uid()?)?)
    }

    /// Re-read collections from storage, keeping the selection where it
    /// still resolves
    pub fn reload(&mut self) {
        let Some(uid) = self.session.as_ref().map(|s| s.uid.clone()) else {
            self.switch_session(None);
            return;
        };

        let previous = std::mem::take(&mut self.selection);
        self.collections = self.store.load_collections(&uid);
        self.selection = self.collections.initial_selection();

        if let Some(book_id) = previous.book_id.as_deref() {
            let kept_page = previous
                .page_id
                .as_deref()
                .is_some_and(|page_id| self.select_page(book_id, page_id));
            if !kept_page {
                self.select_book(book_id);
            }
        }
        if let Some(project_id) = previous.project_id.as_deref() {
            self.select_project(project_id);
        }
    }

    // ==================== Whiteboard ====================

    /// The stored whiteboard image, if any
    pub fn whiteboard(&self) -> Result<Option<String>, WorkspaceError> {
        Ok(self.store.load_whiteboard(self.uid()?))
    }

    /// Replace the stored whiteboard image
    pub fn save_whiteboard(&mut self, payload: &str) -> Result<(), WorkspaceError> {
        let uid = self.owned_uid()?;
        self.store.save_whiteboard(&uid, payload)?;
        Ok(())
    }

    pub fn clear_whiteboard(&mut self) -> Result<(), WorkspaceError> {
        self.clear(CollectionKind::Whiteboard)
    }

    // ==================== Preferences ====================

    /// Global display preferences (no session required)
    pub fn preferences(&self) -> Result<Preferences, WorkspaceError> {
        Ok(Preferences::load(self.store.backend())?)
    }

    pub fn save_preferences(&mut self, preferences: &Preferences) -> Result<(), WorkspaceError> {
        preferences.save(self.store.backend_mut())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mutations::{BookPatch, PagePatch};
    use crate::storage::{MemoryStore, StorageKey};
    use crate::theme::ThemeMode;
    use tempfile::TempDir;

    fn test_config(temp_dir: &TempDir, uid: Option<&str>) -> Config {
        Config {
            data_dir: temp_dir.path().to_path_buf(),
            uid: uid.map(str::to_string),
            email: None,
            log_file: None,
        }
    }

    fn memory_workspace(uid: &str) -> Workspace<MemoryStore> {
        Workspace::open(MemoryStore::new(), Some(Session::new(uid)))
    }

    #[test]
    fn test_error_suggestions() {
        let mut signed_out = Workspace::new(MemoryStore::new());
        let err = signed_out.apply(Mutation::CreateBook).unwrap_err();
        assert!(err.recovery_suggestion().unwrap().contains("drafty login"));

        let mut workspace = memory_workspace("u1");
        let err = workspace
            .import(CollectionKind::Books, b"{ nope")
            .unwrap_err();
        assert!(err.recovery_suggestion().unwrap().contains("export"));

        let err = WorkspaceError::from(StorageError::CorruptValue {
            key: "drafty-books-u1".to_string(),
            source: serde_json::from_str::<serde_json::Value>("[").unwrap_err(),
        });
        assert!(err.recovery_suggestion().unwrap().contains("clear the collection"));
    }

    struct FailingProvider;

    impl SessionProvider for FailingProvider {
        fn current(&self) -> Option<Session> {
            Some(Session::new("flaky"))
        }

        fn sign_out(&mut self) -> Result<(), SessionError> {
            Err(SessionError::SignOut("network down".to_string()))
        }
    }

    #[test]
    fn test_open_creates_empty_workspace() {
        let temp_dir = TempDir::new().unwrap();
        let workspace = Workspace::open_with_config(&test_config(&temp_dir, Some("u1"))).unwrap();

        assert_eq!(workspace.uid().unwrap(), "u1");
        assert!(workspace.collections().is_empty());
        assert_eq!(workspace.selection(), &Selection::default());
    }

    #[test]
    fn test_changes_persist_across_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir, Some("u1"));

        let book_id;
        {
            let mut workspace = Workspace::open_with_config(&config).unwrap();
            book_id = workspace.apply(Mutation::CreateBook).unwrap().created.unwrap();
            workspace
                .apply(Mutation::UpdateBook {
                    book_id: book_id.clone(),
                    patch: BookPatch::rename("Physics"),
                })
                .unwrap();
        }

        assert!(temp_dir.path().join("drafty-books-u1.json").exists());

        let workspace = Workspace::open_with_config(&config).unwrap();
        let book = workspace.collections().get_book(&book_id).unwrap();
        assert_eq!(book.name, "Physics");
        assert_eq!(workspace.selection().book_id.as_deref(), Some(book_id.as_str()));
    }

    #[test]
    fn test_apply_saves_only_changed_kinds() {
        let mut workspace = memory_workspace("u1");
        workspace.apply(Mutation::CreateProject).unwrap();

        let backend = workspace.store().backend();
        assert!(backend
            .contains(&StorageKey::user(CollectionKind::Projects, "u1"))
            .unwrap());
        assert!(!backend
            .contains(&StorageKey::user(CollectionKind::Books, "u1"))
            .unwrap());
    }

    #[test]
    fn test_noop_mutation_writes_nothing() {
        let mut workspace = memory_workspace("u1");
        let changes = workspace
            .apply(Mutation::UpdatePage {
                book_id: "missing".to_string(),
                page_id: "missing-p1".to_string(),
                patch: PagePatch::content("x"),
            })
            .unwrap();
        assert!(changes.is_empty());
        assert!(workspace.store().backend().is_empty());
    }

    #[test]
    fn test_no_session_refuses_user_operations() {
        let mut workspace = Workspace::new(MemoryStore::new());
        assert!(matches!(
            workspace.apply(Mutation::CreateBook),
            Err(WorkspaceError::Session(SessionError::NoSession))
        ));
        assert!(workspace.export(CollectionKind::Books).is_err());
        assert!(workspace.whiteboard().is_err());
        assert!(workspace.collections().is_empty());
        // Preferences are global
        assert!(workspace.preferences().is_ok());
    }

    #[test]
    fn test_switch_session_isolates_users() {
        let mut workspace = memory_workspace("alice");
        workspace.apply(Mutation::CreateBook).unwrap();
        workspace.apply(Mutation::CreateBook).unwrap();

        workspace.switch_session(Some(Session::new("bob")));
        assert!(workspace.collections().books.is_empty());
        assert!(workspace.selection().book_id.is_none());
        workspace.apply(Mutation::CreateProject).unwrap();

        workspace.switch_session(Some(Session::new("alice")));
        assert_eq!(workspace.collections().books.len(), 2);
        assert!(workspace.collections().projects.is_empty());
        assert_eq!(
            workspace.selection().book_id.as_deref(),
            Some(workspace.collections().books[0].id.as_str())
        );
    }

    #[test]
    fn test_sign_out_clears_even_on_failure() {
        let mut provider = FailingProvider;
        let mut workspace = Workspace::with_provider(MemoryStore::new(), &provider);
        workspace.apply(Mutation::CreateBook).unwrap();

        let result = workspace.sign_out(&mut provider);
        assert!(matches!(result, Err(SessionError::SignOut(_))));
        assert!(workspace.session().is_none());
        assert!(workspace.collections().is_empty());
        assert_eq!(workspace.selection(), &Selection::default());
    }

    #[test]
    fn test_sign_out_with_config_session() {
        let mut provider = ConfigSession::new(Some(Session::new("u1")));
        let mut workspace = Workspace::with_provider(MemoryStore::new(), &provider);
        workspace.sign_out(&mut provider).unwrap();
        assert!(workspace.uid().is_err());
    }

    #[test]
    fn test_import_reloads_collections() {
        let mut source = memory_workspace("u1");
        source.apply(Mutation::CreateBook).unwrap();
        let export = source.export(CollectionKind::Books).unwrap();

        let mut target = memory_workspace("u1");
        target.import(CollectionKind::Books, &export.bytes).unwrap();
        assert_eq!(target.collections().books, source.collections().books);
        assert_eq!(target.selection().book_id, source.selection().book_id);
    }

    #[test]
    fn test_failed_import_keeps_state() {
        let mut workspace = memory_workspace("u1");
        workspace.apply(Mutation::CreateBook).unwrap();
        let before = workspace.collections().clone();

        let err = workspace
            .import(CollectionKind::Books, b"not json at all")
            .unwrap_err();
        assert!(matches!(
            err,
            WorkspaceError::Import(ImportError::InvalidJson { .. })
        ));
        assert_eq!(workspace.collections(), &before);
    }

    #[test]
    fn test_clear_reloads_and_reselects() {
        let mut workspace = memory_workspace("u1");
        workspace.apply(Mutation::CreateBook).unwrap();
        workspace.apply(Mutation::CreateProject).unwrap();

        workspace.clear(CollectionKind::Books).unwrap();
        assert!(workspace.collections().books.is_empty());
        assert!(workspace.selection().book_id.is_none());
        assert_eq!(workspace.collections().projects.len(), 1);
        assert!(workspace.selection().project_id.is_some());
    }

    #[test]
    fn test_whiteboard() {
        let mut workspace = memory_workspace("u1");
        assert!(workspace.whiteboard().unwrap().is_none());

        workspace
            .save_whiteboard("data:image/png;base64,AAAA")
            .unwrap();
        assert_eq!(
            workspace.whiteboard().unwrap().as_deref(),
            Some("data:image/png;base64,AAAA")
        );

        workspace.clear_whiteboard().unwrap();
        assert!(workspace.whiteboard().unwrap().is_none());
    }

    #[test]
    fn test_preferences_round_trip() {
        let mut workspace = Workspace::new(MemoryStore::new());
        let mut prefs = workspace.preferences().unwrap();
        prefs.set("theme-mode", "light").unwrap();
        workspace.save_preferences(&prefs).unwrap();

        assert_eq!(workspace.preferences().unwrap().theme_mode, ThemeMode::Light);
    }

    #[test]
    fn test_stats_require_session() {
        let workspace = memory_workspace("u1");
        assert_eq!(workspace.stats().unwrap().total_size(), 0);
        assert!(Workspace::new(MemoryStore::new()).stats().is_err());
    }
}
