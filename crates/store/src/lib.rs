//! # TeeWatch Store
//!
//! Durable storage for watch requests, the notification history and the
//! global preferences. Everything lives in one JSON document that is
//! rewritten in full after every mutation.
//!
//! ## Guarantees
//!
//! - Reads fail soft: a missing document is created with defaults, and
//!   records that no longer fit the schema are skipped rather than
//!   discarding the whole document.
//! - A damaged document is copied to `<name>.json.corrupt` before the first
//!   rewrite, and a mutation that cannot read or back up the file is refused.
//! - Writes are logged, never raised, so a storage hiccup does not break the
//!   check pipeline.
//! - Load, mutate and save run under one lock, held across processes through
//!   an advisory file lock, so concurrent check cycles never lose each
//!   other's notifications.

pub mod document;
pub mod file_store;
pub mod lock;
pub mod mock;
pub mod repositories;

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use teewatch_core::{
    errors::WatchResult,
    models::{Notification, Preferences, PreferencesUpdate, WatchRequest},
};

pub use document::{MAX_NOTIFICATIONS, ParsedDocument, StoreDocument};
pub use file_store::JsonFileStore;

/// Operations the rest of the system needs from the record store.
#[async_trait]
pub trait WatchStore: Send + Sync {
    /// Whole document. Never fails; falls back to defaults.
    async fn load_all(&self) -> StoreDocument;

    async fn find_request(&self, id: &str) -> Option<WatchRequest>;

    async fn active_requests(&self) -> Vec<WatchRequest>;

    async fn preferences(&self) -> Preferences;

    /// Replace by id if present, else append.
    async fn upsert_request(&self, request: WatchRequest) -> WatchRequest;

    /// Fails with `NotFound` and leaves the document untouched when `id` is unknown.
    async fn delete_request(&self, id: &str) -> WatchResult<WatchRequest>;

    /// Flips active/paused. Fails with `NotFound` when `id` is unknown.
    async fn toggle_request(&self, id: &str) -> WatchResult<WatchRequest>;

    /// Prepends `batch` to the newest-first history and trims it to
    /// [`MAX_NOTIFICATIONS`]. Returns the retained count.
    async fn append_notifications(&self, batch: Vec<Notification>) -> usize;

    async fn update_preferences(&self, update: PreferencesUpdate) -> Preferences;
}

/// Opens the JSON document store at `path`.
pub fn create_store(path: impl Into<PathBuf>) -> Arc<dyn WatchStore> {
    Arc::new(JsonFileStore::new(path))
}
