use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::QuestError;

/// Quest class: how often a quest of this kind is assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
}

impl Frequency {
    pub const ALL: [Frequency; 2] = [Frequency::Daily, Frequency::Weekly];

    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
        }
    }

    /// Advisory lifetime of an assignment of this class.
    pub fn expires_in_hours(&self) -> u32 {
        match self {
            Frequency::Daily => 24,
            Frequency::Weekly => 24 * 7,
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = QuestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            other => Err(QuestError::UnknownFrequency(other.to_string())),
        }
    }
}

/// Media the couple answers a quest with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestType {
    Photo,
    Text,
    Video,
    Audio,
    Irl,
}

impl QuestType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestType::Photo => "photo",
            QuestType::Text => "text",
            QuestType::Video => "video",
            QuestType::Audio => "audio",
            QuestType::Irl => "irl",
        }
    }
}

impl fmt::Display for QuestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single entry of the quest catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestDefinition {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub quest_type: QuestType,
}

/// Durable record that a quest was activated for everyone at a point in time.
///
/// Field names match the `global_quests` documents read by the mobile app.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentRecord {
    pub quest_id: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub quest_type: QuestType,
    pub frequency: Frequency,
    pub assigned_at: DateTime<Utc>,
    pub expires_in_hours: u32,
}

impl AssignmentRecord {
    /// Build the record for `definition` assigned at `assigned_at`.
    pub fn new(definition: &QuestDefinition, frequency: Frequency, assigned_at: DateTime<Utc>) -> Self {
        Self {
            quest_id: definition.id.clone(),
            title: definition.title.clone(),
            description: definition.description.clone(),
            quest_type: definition.quest_type,
            frequency,
            assigned_at,
            expires_in_hours: frequency.expires_in_hours(),
        }
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.assigned_at + Duration::hours(i64::from(self.expires_in_hours))
    }

    /// Expiry is advisory: nothing removes a record once this turns false.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn goblin_cam() -> QuestDefinition {
        QuestDefinition {
            id: "daily_goblincam".into(),
            title: "Goblin Cam".into(),
            description: "You have 5 seconds to take a selfie.".into(),
            quest_type: QuestType::Photo,
        }
    }

    #[test]
    fn expiry_table() {
        assert_eq!(Frequency::Daily.expires_in_hours(), 24);
        assert_eq!(Frequency::Weekly.expires_in_hours(), 168);
    }

    #[test]
    fn frequency_parses_case_insensitively() {
        assert_eq!("Daily".parse::<Frequency>().unwrap(), Frequency::Daily);
        assert_eq!(" weekly ".parse::<Frequency>().unwrap(), Frequency::Weekly);
        assert!(matches!(
            "monthly".parse::<Frequency>(),
            Err(QuestError::UnknownFrequency(s)) if s == "monthly"
        ));
    }

    #[test]
    fn record_mirrors_definition() {
        let def = goblin_cam();
        let now = Utc::now();
        let record = AssignmentRecord::new(&def, Frequency::Weekly, now);

        assert_eq!(record.quest_id, def.id);
        assert_eq!(record.title, def.title);
        assert_eq!(record.description, def.description);
        assert_eq!(record.quest_type, def.quest_type);
        assert_eq!(record.frequency, Frequency::Weekly);
        assert_eq!(record.assigned_at, now);
        assert_eq!(record.expires_in_hours, 168);
    }

    #[test]
    fn record_serializes_with_app_field_names() {
        let record = AssignmentRecord::new(&goblin_cam(), Frequency::Daily, Utc::now());
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["quest_id"], "daily_goblincam");
        assert_eq!(json["type"], "photo");
        assert_eq!(json["frequency"], "daily");
        assert_eq!(json["expires_in_hours"], 24);
        assert!(json.get("quest_type").is_none());
    }

    #[test]
    fn active_window() {
        let record = AssignmentRecord::new(&goblin_cam(), Frequency::Daily, Utc::now());
        assert!(record.is_active_at(record.assigned_at + Duration::hours(23)));
        assert!(!record.is_active_at(record.assigned_at + Duration::hours(24)));
    }
}
