use teewatch_core::{
    errors::{WatchError, WatchResult},
    models::WatchRequest,
};

use crate::document::StoreDocument;

fn not_found(id: &str) -> WatchError {
    WatchError::NotFound(format!("Watch request with ID {} not found", id))
}

pub fn find<'a>(document: &'a StoreDocument, id: &str) -> Option<&'a WatchRequest> {
    document.alerts.iter().find(|request| request.id == id)
}

pub fn active(document: &StoreDocument) -> Vec<WatchRequest> {
    document
        .alerts
        .iter()
        .filter(|request| request.is_active())
        .cloned()
        .collect()
}

/// Replaces the request with the same id, or appends it. Returns `true` when
/// an existing request was replaced.
pub fn upsert(document: &mut StoreDocument, request: WatchRequest) -> bool {
    match document.alerts.iter_mut().find(|existing| existing.id == request.id) {
        Some(existing) => {
            *existing = request;
            true
        }
        None => {
            document.alerts.push(request);
            false
        }
    }
}

pub fn remove(document: &mut StoreDocument, id: &str) -> WatchResult<WatchRequest> {
    let index = document
        .alerts
        .iter()
        .position(|request| request.id == id)
        .ok_or_else(|| not_found(id))?;

    Ok(document.alerts.remove(index))
}

/// Flips active and paused.
pub fn toggle(document: &mut StoreDocument, id: &str) -> WatchResult<WatchRequest> {
    let request = document
        .alerts
        .iter_mut()
        .find(|request| request.id == id)
        .ok_or_else(|| not_found(id))?;

    request.status = request.status.toggled();
    Ok(request.clone())
}
