//! Storage key layout
//!
//! Every per-user value lives under `drafty-{kind}-{uid}`. Global
//! preferences live under `drafty-{name}` with no user scope.

use serde::{Deserialize, Serialize};

/// Prefix shared by every key Drafty writes
pub const KEY_PREFIX: &str = "drafty";

/// A per-user collection that can be saved, exported, imported or cleared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionKind {
    Books,
    Projects,
    Flashcards,
    Whiteboard,
}

impl CollectionKind {
    /// All kinds, in display order
    pub const ALL: [CollectionKind; 4] = [
        CollectionKind::Books,
        CollectionKind::Projects,
        CollectionKind::Flashcards,
        CollectionKind::Whiteboard,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CollectionKind::Books => "books",
            CollectionKind::Projects => "projects",
            CollectionKind::Flashcards => "flashcards",
            CollectionKind::Whiteboard => "whiteboard",
        }
    }

    /// Value exported when nothing is stored yet
    pub fn empty_value(&self) -> serde_json::Value {
        match self {
            CollectionKind::Whiteboard => serde_json::Value::String(String::new()),
            _ => serde_json::Value::Array(Vec::new()),
        }
    }
}

impl std::fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CollectionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "books" => Ok(CollectionKind::Books),
            "projects" => Ok(CollectionKind::Projects),
            "flashcards" => Ok(CollectionKind::Flashcards),
            "whiteboard" => Ok(CollectionKind::Whiteboard),
            _ => Err(format!(
                "Unknown collection: '{}' (expected books, projects, flashcards or whiteboard)",
                s
            )),
        }
    }
}

/// A fully qualified storage key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StorageKey(String);

impl StorageKey {
    /// Key of a collection owned by `uid`
    pub fn user(kind: CollectionKind, uid: &str) -> Self {
        Self(format!("{}-{}-{}", KEY_PREFIX, kind.as_str(), uid))
    }

    /// Key of the legacy single-level notes of `uid`
    pub fn legacy_notes(uid: &str) -> Self {
        Self(format!("{}-notes-{}", KEY_PREFIX, uid))
    }

    /// Key of a global, non user-scoped value
    pub fn global(name: &str) -> Self {
        Self(format!("{}-{}", KEY_PREFIX, name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for StorageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// File name used when exporting a collection
pub fn export_file_name(kind: CollectionKind, uid: &str) -> String {
    format!("{}-{}-{}.json", KEY_PREFIX, kind.as_str(), uid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_keys() {
        assert_eq!(
            StorageKey::user(CollectionKind::Books, "u1").as_str(),
            "drafty-books-u1"
        );
        assert_eq!(
            StorageKey::user(CollectionKind::Projects, "u1").as_str(),
            "drafty-projects-u1"
        );
        assert_eq!(
            StorageKey::user(CollectionKind::Flashcards, "u1").as_str(),
            "drafty-flashcards-u1"
        );
        assert_eq!(
            StorageKey::user(CollectionKind::Whiteboard, "u1").as_str(),
            "drafty-whiteboard-u1"
        );
        assert_eq!(StorageKey::legacy_notes("u1").as_str(), "drafty-notes-u1");
    }

    #[test]
    fn test_keys_differ_per_user() {
        for kind in CollectionKind::ALL {
            assert_ne!(StorageKey::user(kind, "alice"), StorageKey::user(kind, "bob"));
        }
    }

    #[test]
    fn test_global_key() {
        assert_eq!(StorageKey::global("theme-mode").as_str(), "drafty-theme-mode");
    }

    #[test]
    fn test_export_file_name() {
        assert_eq!(
            export_file_name(CollectionKind::Flashcards, "abc"),
            "drafty-flashcards-abc.json"
        );
    }

    #[test]
    fn test_kind_parse_round_trip() {
        for kind in CollectionKind::ALL {
            assert_eq!(kind.as_str().parse::<CollectionKind>().unwrap(), kind);
        }
        assert!("notes".parse::<CollectionKind>().is_err());
    }
}
