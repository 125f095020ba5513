//! The JSON collection store backing the service.
//!
//! All application data lives in one JSON document file (default
//! `./db.json`) holding named collections. This service reads the `recipes`
//! collection and owns the `shoppingLists` collection; any other collection
//! in the file (tags, books, favorites, ...) belongs to the surrounding
//! system and is carried through every rewrite untouched.
//!
//! The main components are:
//! - `Store`: a clonable handle around the shared collections, injected into
//!   the Actix application state in `main.rs`. Mutations take the write lock,
//!   apply the change in memory and rewrite the file before returning, so
//!   concurrent requests can never interleave partial writes.
//! - `StoreError`: the failure modes surfaced to the HTTP layer.
//!
//! File writes go through a temp file in the target directory followed by a
//! rename, so a crash mid-write leaves the previous collection file intact.

use common::model::recipe::Recipe;
use common::model::shopping_list::ShoppingListRecord;
use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::error::Error;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::NamedTempFile;
use tokio::sync::RwLock;

/// Failure modes of the collection store.
#[derive(Debug)]
pub enum StoreError {
    /// No shopping-list record with the requested id exists.
    NotFound(String),
    /// A record with the same id already exists. Ids are reserved before the
    /// document is rendered, so hitting this means two generations raced on
    /// the same second-resolution timestamp.
    DuplicateId(String),
    /// Reading or writing the collection file failed.
    Io(String),
    /// The collection file holds JSON this service cannot interpret.
    Corrupt(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::NotFound(id) => write!(f, "no shopping list record with id {}", id),
            StoreError::DuplicateId(id) => {
                write!(f, "a shopping list record with id {} already exists", id)
            }
            StoreError::Io(err) => write!(f, "collection file I/O failed: {}", err),
            StoreError::Corrupt(err) => write!(f, "collection file is not readable: {}", err),
        }
    }
}

impl Error for StoreError {}

/// On-disk shape of the collection file. Unknown collections are captured by
/// the flattened map and written back verbatim.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Collections {
    #[serde(default)]
    recipes: Vec<Value>,
    #[serde(default, rename = "shoppingLists")]
    shopping_lists: Vec<ShoppingListRecord>,
    #[serde(flatten)]
    other: Map<String, Value>,
}

/// A thread-safe, clonable handle to the shared collection file.
///
/// Created once in `main.rs` and shared across the Actix application as
/// `web::Data`. Reads take the read lock; `append_record` and `update_notes`
/// take the write lock for the whole read-modify-write-flush cycle, which
/// serializes them with respect to each other.
#[derive(Clone)]
pub struct Store {
    path: Arc<PathBuf>,
    collections: Arc<RwLock<Collections>>,
}

impl Store {
    /// Opens the collection file, creating an empty one if it does not exist
    /// yet.
    pub fn open(path: impl AsRef<Path>) -> Result<Store, StoreError> {
        let path = path.as_ref().to_path_buf();
        let collections = if path.exists() {
            let raw = fs::read_to_string(&path).map_err(|err| StoreError::Io(err.to_string()))?;
            serde_json::from_str(&raw).map_err(|err| StoreError::Corrupt(err.to_string()))?
        } else {
            let empty = Collections::default();
            write_collections(&path, &empty)?;
            empty
        };
        Ok(Store {
            path: Arc::new(path),
            collections: Arc::new(RwLock::new(collections)),
        })
    }

    /// Resolves recipe ids against the recipe collection, preserving request
    /// order. Unknown ids and records the aggregator cannot read are skipped
    /// with a warning; the caller decides whether an empty result is fatal.
    pub async fn recipes_by_ids(&self, ids: &[String]) -> Vec<Recipe> {
        let collections = self.collections.read().await;
        let mut selected = Vec::new();
        for id in ids {
            let found = collections
                .recipes
                .iter()
                .find(|value| value.get("id").and_then(Value::as_str) == Some(id.as_str()));
            match found {
                Some(value) => match serde_json::from_value::<Recipe>(value.clone()) {
                    Ok(recipe) => selected.push(recipe),
                    Err(err) => warn!("skipping unreadable recipe record {}: {}", id, err),
                },
                None => warn!("requested recipe {} not found", id),
            }
        }
        selected
    }

    /// Returns the stored recipe records verbatim.
    pub async fn raw_recipes(&self) -> Vec<Value> {
        self.collections.read().await.recipes.clone()
    }

    /// Returns one stored recipe record verbatim, if present.
    pub async fn raw_recipe(&self, id: &str) -> Option<Value> {
        self.collections
            .read()
            .await
            .recipes
            .iter()
            .find(|value| value.get("id").and_then(Value::as_str) == Some(id))
            .cloned()
    }

    /// Returns every shopping-list generation record. Filtering by username
    /// is a caller concern.
    pub async fn list_records(&self) -> Vec<ShoppingListRecord> {
        self.collections.read().await.shopping_lists.clone()
    }

    /// Picks the first record id not yet taken: `base`, then `base-2`,
    /// `base-3`, ... Called before the document is rendered so the record id
    /// and the document filename stay in lockstep.
    pub async fn free_record_id(&self, base: &str) -> String {
        let collections = self.collections.read().await;
        if !collections.shopping_lists.iter().any(|r| r.id == base) {
            return base.to_string();
        }
        let mut n = 2;
        loop {
            let candidate = format!("{}-{}", base, n);
            if !collections.shopping_lists.iter().any(|r| r.id == candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    /// Appends a generation record and rewrites the collection file.
    ///
    /// Must only be called after the document the record points to has been
    /// fully written; the collection never references a missing file. If the
    /// file write fails the in-memory state is rolled back and nothing is
    /// persisted.
    pub async fn append_record(&self, record: ShoppingListRecord) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        if collections.shopping_lists.iter().any(|r| r.id == record.id) {
            return Err(StoreError::DuplicateId(record.id));
        }
        collections.shopping_lists.push(record);
        if let Err(err) = write_collections(&self.path, &collections) {
            collections.shopping_lists.pop();
            return Err(err);
        }
        Ok(())
    }

    /// Replaces the notes of an existing record and rewrites the collection
    /// file. Every other field is left untouched.
    pub async fn update_notes(
        &self,
        id: &str,
        notes: &str,
    ) -> Result<ShoppingListRecord, StoreError> {
        let mut collections = self.collections.write().await;
        let position = match collections.shopping_lists.iter().position(|r| r.id == id) {
            Some(position) => position,
            None => return Err(StoreError::NotFound(id.to_string())),
        };
        let previous = std::mem::replace(
            &mut collections.shopping_lists[position].notes,
            notes.to_string(),
        );
        if let Err(err) = write_collections(&self.path, &collections) {
            collections.shopping_lists[position].notes = previous;
            return Err(err);
        }
        Ok(collections.shopping_lists[position].clone())
    }
}

/// Serializes the collections into a temp file next to `path`, then renames
/// it over the target. The rename keeps readers from ever seeing a partial
/// file.
fn write_collections(path: &Path, collections: &Collections) -> Result<(), StoreError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|err| StoreError::Io(err.to_string()))?;
    let mut tmp = NamedTempFile::new_in(dir).map_err(|err| StoreError::Io(err.to_string()))?;
    serde_json::to_writer_pretty(tmp.as_file_mut(), collections)
        .map_err(|err| StoreError::Io(err.to_string()))?;
    tmp.as_file_mut()
        .flush()
        .map_err(|err| StoreError::Io(err.to_string()))?;
    tmp.persist(path).map_err(|err| StoreError::Io(err.to_string()))?;
    Ok(())
}
