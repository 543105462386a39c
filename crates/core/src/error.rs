use thiserror::Error;

use crate::quest::Frequency;

#[derive(Error, Debug)]
pub enum QuestError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("catalog parse error: {0}")]
    CatalogParse(#[from] serde_yaml::Error),

    #[error("no quests configured for class '{0}'")]
    EmptyCatalog(Frequency),

    #[error("duplicate quest id '{id}' in class '{class}'")]
    DuplicateQuestId { class: Frequency, id: String },

    #[error("invalid quest in class '{class}': {reason}")]
    InvalidQuest { class: Frequency, reason: String },

    #[error("unknown quest frequency: {0}")]
    UnknownFrequency(String),
}
