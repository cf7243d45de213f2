//! # TeeWatch Core
//!
//! Domain types and the pure parts of the tee time monitoring pipeline:
//!
//! - **Models**: watch requests, notifications, preferences, status events and
//!   the scheduler records surfaced to operators
//! - **Extract**: normalizes the loosely structured search agent response into
//!   a canonical list of matches
//! - **Notifications**: turns matches into durable notification records
//! - **Prompts**: renders the natural-language instructions sent to the
//!   search and email agents
//!
//! Nothing in this crate performs I/O.

pub mod errors;
pub mod extract;
pub mod models;
pub mod notifications;
pub mod prompts;
