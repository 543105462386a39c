pub mod catalog;
pub mod config;
pub mod error;
pub mod quest;

pub use catalog::{QuestCatalog, QuestSelector};
pub use config::Config;
pub use error::*;
pub use quest::*;
