use teewatch_core::models::Notification;

use crate::document::{MAX_NOTIFICATIONS, StoreDocument};

/// Puts `batch` in front of the existing newest-first history, keeping the
/// batch's own order, then evicts everything past [`MAX_NOTIFICATIONS`].
/// Returns the number of notifications retained.
pub fn prepend(document: &mut StoreDocument, batch: Vec<Notification>) -> usize {
    if batch.is_empty() {
        return document.notifications.len();
    }

    let existing = std::mem::take(&mut document.notifications);
    let mut merged = batch;
    merged.extend(existing);
    merged.truncate(MAX_NOTIFICATIONS);

    document.notifications = merged;
    document.notifications.len()
}

pub fn for_request<'a>(document: &'a StoreDocument, request_id: &str) -> Vec<&'a Notification> {
    document
        .notifications
        .iter()
        .filter(|notification| notification.watch_request_id == request_id)
        .collect()
}
