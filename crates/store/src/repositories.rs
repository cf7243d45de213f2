//! Pure mutations over a loaded [`StoreDocument`](crate::document::StoreDocument).
//!
//! The file-backed store wraps each of these in a locked load, mutate and
//! save sequence.

pub mod notifications;
pub mod watch_requests;
