//! The canonical participant record consumed by the validator.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::sport::SportLabel;

/// A participant as normalized from the membership system.
///
/// `chmeetings_id`, `first_name` and `last_name` are required; everything
/// else is optional. Blank strings are treated as absent. Unknown keys are
/// kept in `extra` and ignored by validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participant {
    pub chmeetings_id: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub gender: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub birthdate: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub primary_sport: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub secondary_sport: Option<String>,
    #[serde(default, deserialize_with = "event_list")]
    pub other_events: Vec<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub photo_url: Option<String>,
    /// `None` when the consent form status is unknown.
    #[serde(default)]
    pub consent_status: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Participant {
    /// Coerce a raw key-value record into a participant.
    ///
    /// Returns the deserializer's message on structural failure (missing
    /// identity fields or wrongly-typed values).
    pub fn from_record(record: &Map<String, Value>) -> Result<Self, String> {
        serde_json::from_value(Value::Object(record.clone())).map_err(|e| e.to_string())
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Primary and secondary sport labels, skipping unselected ones.
    pub fn selected_sports(&self) -> impl Iterator<Item = SportLabel<'_>> {
        [self.primary_sport.as_deref(), self.secondary_sport.as_deref()]
            .into_iter()
            .flatten()
            .filter_map(SportLabel::parse)
    }

    /// Every sport the participant is entered in: primary, secondary and each
    /// additional event label, in that order.
    pub fn all_sports(&self) -> Vec<SportLabel<'_>> {
        self.selected_sports()
            .chain(self.other_events.iter().filter_map(|e| SportLabel::parse(e)))
            .collect()
    }
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

/// Additional events arrive either as one comma-separated string or as a list.
fn event_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Events {
        Text(String),
        List(Vec<String>),
    }

    let events = match Option::<Events>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(Events::Text(text)) => text.split(',').map(str::to_string).collect(),
        Some(Events::List(list)) => list,
    };
    Ok(events
        .into_iter()
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty())
        .collect())
}
