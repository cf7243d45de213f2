pub mod notification;
pub mod preferences;
pub mod schedule;
pub mod status;
pub mod tee_time;
pub mod watch_request;

pub use notification::Notification;
pub use preferences::{Preferences, PreferencesUpdate};
pub use schedule::{ExecutionLog, Schedule};
pub use status::{CheckPhase, Delivery, StatusEvent, StatusKind};
pub use tee_time::TeeTimeMatch;
pub use watch_request::{CheckFrequency, NewWatchRequest, TimeWindow, WatchRequest, WatchStatus};
