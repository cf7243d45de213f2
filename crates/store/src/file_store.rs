use std::path::{Path, PathBuf};

use async_trait::async_trait;
use eyre::{Result, WrapErr};
use teewatch_core::{
    errors::{WatchError, WatchResult},
    models::{Notification, Preferences, PreferencesUpdate, WatchRequest},
};
use tokio::sync::Mutex;
use tracing::{debug, error, warn};

use crate::{
    WatchStore,
    document::StoreDocument,
    lock::DocumentLock,
    repositories::{notifications, watch_requests},
};

/// [`WatchStore`] backed by a single pretty-printed JSON file.
///
/// Every operation holds the same mutex for its whole load, mutate and save
/// sequence, so writers inside one process are serialized. An advisory lock
/// on `<name>.json.lock` serializes separate processes sharing the file.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn ensure_parent(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .wrap_err_with(|| format!("Failed to create {}", parent.display()))?;
        }
        Ok(())
    }

    fn lock_path(&self) -> PathBuf {
        self.path.with_extension("json.lock")
    }

    fn backup_path(&self) -> PathBuf {
        self.path.with_extension("json.corrupt")
    }

    async fn try_read(&self) -> Result<Loaded> {
        if !tokio::fs::try_exists(&self.path).await? {
            return Ok(Loaded::Missing);
        }

        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .wrap_err_with(|| format!("Failed to read {}", self.path.display()))?;

        let loaded = match StoreDocument::parse(&raw) {
            Ok(parsed) if parsed.problems.is_empty() => Loaded::Clean(parsed.document),
            Ok(parsed) => Loaded::Damaged {
                document: parsed.document,
                problems: parsed.problems,
            },
            Err(e) => Loaded::Damaged {
                document: StoreDocument::default(),
                problems: vec![format!("{:#}", e)],
            },
        };

        Ok(loaded)
    }

    async fn try_write(&self, document: &StoreDocument) -> Result<()> {
        self.ensure_parent().await?;

        let json = serde_json::to_string_pretty(document)?;
        let staging = self.path.with_extension("json.tmp");

        tokio::fs::write(&staging, json)
            .await
            .wrap_err_with(|| format!("Failed to write {}", staging.display()))?;
        tokio::fs::rename(&staging, &self.path)
            .await
            .wrap_err_with(|| format!("Failed to replace {}", self.path.display()))?;

        Ok(())
    }

    /// Loads the document for reading only, creating it with defaults when it
    /// does not exist. Any failure yields an in-memory default document, and a
    /// damaged file is never rewritten from here.
    async fn read(&self) -> StoreDocument {
        match self.try_read().await {
            Ok(Loaded::Clean(document)) => document,
            Ok(Loaded::Missing) => {
                debug!("Initializing store at {}", self.path.display());
                let document = StoreDocument::default();
                self.write(&document).await;
                document
            }
            Ok(Loaded::Damaged { document, problems }) => {
                warn!(
                    path = %self.path.display(),
                    skipped = problems.len(),
                    "Store document is damaged; reading the records that parse: {}",
                    problems.join("; ")
                );
                document
            }
            Err(e) => {
                warn!("Falling back to an empty store: {:#}", e);
                StoreDocument::default()
            }
        }
    }

    /// Loads the document ahead of a rewrite. A damaged file is copied aside
    /// first so the records that could not be read are not lost; if it cannot
    /// be read or backed up the mutation is refused.
    async fn read_for_update(&self) -> Result<StoreDocument> {
        match self.try_read().await? {
            Loaded::Missing => Ok(StoreDocument::default()),
            Loaded::Clean(document) => Ok(document),
            Loaded::Damaged { document, problems } => {
                let backup = self.backup_path();
                tokio::fs::copy(&self.path, &backup)
                    .await
                    .wrap_err_with(|| format!("Failed to back up {}", self.path.display()))?;

                warn!(
                    path = %self.path.display(),
                    backup = %backup.display(),
                    skipped = problems.len(),
                    "Rewriting damaged store document: {}",
                    problems.join("; ")
                );
                Ok(document)
            }
        }
    }

    async fn write(&self, document: &StoreDocument) {
        if let Err(e) = self.try_write(document).await {
            error!("Failed to write store: {:#}", e);
        }
    }

    /// Runs `change` against the current document under both the in-process
    /// mutex and the cross-process file lock, then persists the result.
    /// Nothing is written when `change` fails or the document cannot be
    /// loaded safely.
    async fn mutate<T>(
        &self,
        change: impl FnOnce(&mut StoreDocument) -> WatchResult<T> + Send,
    ) -> WatchResult<T> {
        let _guard = self.lock.lock().await;

        let loaded = async {
            self.ensure_parent().await?;
            let file_lock = DocumentLock::acquire(self.lock_path()).await?;
            let document = self.read_for_update().await?;
            Ok::<_, eyre::Report>((file_lock, document))
        }
        .await;

        let (_file_lock, mut document) = match loaded {
            Ok(loaded) => loaded,
            Err(e) => {
                error!("Refusing to modify store: {:#}", e);
                return Err(WatchError::Store(e));
            }
        };

        let value = change(&mut document)?;
        self.write(&document).await;

        Ok(value)
    }

    async fn snapshot(&self) -> StoreDocument {
        let _guard = self.lock.lock().await;

        let file_lock = match self.ensure_parent().await {
            Ok(()) => DocumentLock::acquire(self.lock_path()).await,
            Err(e) => Err(e),
        };
        if let Err(e) = &file_lock {
            warn!("Reading store without the file lock: {:#}", e);
        }

        self.read().await
    }
}

/// Outcome of loading the document from disk.
#[derive(Debug)]
enum Loaded {
    Missing,
    Clean(StoreDocument),
    /// Parsed, but some records or the whole document had to be dropped.
    Damaged {
        document: StoreDocument,
        problems: Vec<String>,
    },
}

#[async_trait]
impl WatchStore for JsonFileStore {
    async fn load_all(&self) -> StoreDocument {
        self.snapshot().await
    }

    async fn find_request(&self, id: &str) -> Option<WatchRequest> {
        watch_requests::find(&self.snapshot().await, id).cloned()
    }

    async fn active_requests(&self) -> Vec<WatchRequest> {
        watch_requests::active(&self.snapshot().await)
    }

    async fn preferences(&self) -> Preferences {
        self.snapshot().await.settings
    }

    async fn upsert_request(&self, request: WatchRequest) -> WatchRequest {
        let stored = request.clone();
        let replaced = self
            .mutate(|document| Ok(watch_requests::upsert(document, request)))
            .await
            .unwrap_or(false);

        debug!(request_id = %stored.id, replaced, "Saved watch request");
        stored
    }

    async fn delete_request(&self, id: &str) -> WatchResult<WatchRequest> {
        let removed = self
            .mutate(|document| watch_requests::remove(document, id))
            .await?;

        debug!(request_id = %id, "Deleted watch request");
        Ok(removed)
    }

    async fn toggle_request(&self, id: &str) -> WatchResult<WatchRequest> {
        let toggled = self
            .mutate(|document| watch_requests::toggle(document, id))
            .await?;

        debug!(request_id = %id, status = ?toggled.status, "Toggled watch request");
        Ok(toggled)
    }

    async fn append_notifications(&self, batch: Vec<Notification>) -> usize {
        let added = batch.len();
        let total = self
            .mutate(|document| Ok(notifications::prepend(document, batch)))
            .await
            .unwrap_or_default();

        debug!(added, total, "Recorded notifications");
        total
    }

    async fn update_preferences(&self, update: PreferencesUpdate) -> Preferences {
        let fallback = Preferences::default();
        self.mutate(|document| {
            document.settings.merge(update);
            Ok(document.settings.clone())
        })
        .await
        .unwrap_or(fallback)
    }
}
