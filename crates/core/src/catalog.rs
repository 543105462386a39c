//! Static quest catalog and random quest selection.
//!
//! The catalog is parsed once at startup (builtin YAML or a file given by
//! `QUEST_CATALOG_PATH`) and shared read-only behind an `Arc`.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::QuestError;
use crate::quest::{Frequency, QuestDefinition};

const BUILTIN_CATALOG: &str = include_str!("../quests.yaml");

/// Immutable mapping from quest class to its ordered quest definitions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestCatalog {
    classes: BTreeMap<Frequency, Vec<QuestDefinition>>,
}

impl QuestCatalog {
    /// Catalog shipped with the binary.
    pub fn builtin() -> Result<Self, QuestError> {
        Self::from_yaml_str(BUILTIN_CATALOG)
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self, QuestError> {
        let raw = std::fs::read_to_string(path)?;
        let catalog = Self::from_yaml_str(&raw)?;
        info!(
            path = %path.display(),
            quests = catalog.len(),
            "loaded quest catalog"
        );
        Ok(catalog)
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self, QuestError> {
        let catalog: Self = serde_yaml::from_str(raw)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Build a catalog in code. Runs the same validation as the YAML loaders.
    pub fn from_classes(
        classes: impl IntoIterator<Item = (Frequency, Vec<QuestDefinition>)>,
    ) -> Result<Self, QuestError> {
        let catalog = Self {
            classes: classes.into_iter().collect(),
        };
        catalog.validate()?;
        Ok(catalog)
    }

    fn validate(&self) -> Result<(), QuestError> {
        for (&class, quests) in &self.classes {
            let mut seen = HashSet::with_capacity(quests.len());
            for quest in quests {
                if quest.id.trim().is_empty() {
                    return Err(QuestError::InvalidQuest {
                        class,
                        reason: "quest id is empty".into(),
                    });
                }
                if quest.title.trim().is_empty() {
                    return Err(QuestError::InvalidQuest {
                        class,
                        reason: format!("quest '{}' has an empty title", quest.id),
                    });
                }
                if !seen.insert(quest.id.as_str()) {
                    return Err(QuestError::DuplicateQuestId {
                        class,
                        id: quest.id.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Quests of one class, in catalog order. Unknown classes are empty.
    pub fn quests(&self, class: Frequency) -> &[QuestDefinition] {
        self.classes.get(&class).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.classes.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Uniform random pick over one class of the catalog.
///
/// Draws are independent: a quest can come up twice in a row.
#[derive(Debug, Clone)]
pub struct QuestSelector {
    catalog: Arc<QuestCatalog>,
}

impl QuestSelector {
    pub fn new(catalog: Arc<QuestCatalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &QuestCatalog {
        &self.catalog
    }

    pub fn select(&self, class: Frequency) -> Result<&QuestDefinition, QuestError> {
        self.select_with(class, &mut rand::thread_rng())
    }

    pub fn select_with<R: Rng + ?Sized>(
        &self,
        class: Frequency,
        rng: &mut R,
    ) -> Result<&QuestDefinition, QuestError> {
        self.catalog
            .quests(class)
            .choose(rng)
            .ok_or(QuestError::EmptyCatalog(class))
    }
}
