//! UsQuest HTTP service: cron-triggered quest cycles over a shared
//! storage backend, with push notification fan-out.

pub mod api;
pub mod cli;
pub mod cycle;
pub mod router;
pub mod scheduler;
pub mod startup;
pub mod state;

pub use cycle::{CycleError, CycleReport, QuestCycle};
pub use router::build_router;
pub use state::AppState;
