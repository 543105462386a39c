//! Push notification fan-out for quest assignments.
//!
//! This crate provides:
//! - `PushTransport` trait for pluggable push gateways
//! - Expo push gateway transport
//! - Minijinja template rendering for notification title/body
//! - `NotificationDispatcher` that submits one batch per cycle and never fails

pub mod dispatcher;
pub mod expo;
pub mod templating;
pub mod traits;

pub use dispatcher::{DispatchOutcome, NotificationDispatcher};
pub use expo::ExpoPushTransport;
pub use templating::{NotificationTemplates, TemplateRenderer};
pub use traits::{NotifyError, PushMessage, PushTransport};
