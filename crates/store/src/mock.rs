use async_trait::async_trait;
use mockall::mock;
use teewatch_core::{
    errors::WatchResult,
    models::{Notification, Preferences, PreferencesUpdate, WatchRequest},
};

use crate::{WatchStore, document::StoreDocument};

// Mock store for testing code that depends on `WatchStore`
mock! {
    pub Store {}

    #[async_trait]
    impl WatchStore for Store {
        async fn load_all(&self) -> StoreDocument;

        async fn find_request(&self, id: &str) -> Option<WatchRequest>;

        async fn active_requests(&self) -> Vec<WatchRequest>;

        async fn preferences(&self) -> Preferences;

        async fn upsert_request(&self, request: WatchRequest) -> WatchRequest;

        async fn delete_request(&self, id: &str) -> WatchResult<WatchRequest>;

        async fn toggle_request(&self, id: &str) -> WatchResult<WatchRequest>;

        async fn append_notifications(&self, batch: Vec<Notification>) -> usize;

        async fn update_preferences(&self, update: PreferencesUpdate) -> Preferences;
    }
}
