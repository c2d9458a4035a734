//! Multi-item selection under a changing filter, and sequential batch
//! operations over the visible selection with progress, partial-failure
//! tracking and short-lived notifications.

pub mod controller;
pub mod executor;
pub mod notify;
pub mod outcome;
pub mod projector;
pub mod selection;

pub use controller::{BatchAction, BatchTicket, BulkController, ControllerSettings, JobState};
pub use executor::{BatchEvent, BatchExecutor, BatchOptions, BatchReport, Progress};
pub use notify::{Notification, NotificationChannel, NotificationId, Severity};
pub use outcome::{ItemOutcome, OutcomeAggregator, Summary};
pub use projector::{Projection, Selectable, ViewFilter, ViewProjector};
pub use selection::{SelectionSnapshot, SelectionStore};
