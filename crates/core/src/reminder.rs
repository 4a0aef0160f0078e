//! Reminder statuses and the entity types a reminder can point at.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::validation::{validate_name, validate_optional_text};

/// Entity types a reminder may be attached to.
pub const RELATED_ENTITY_TYPES: &[&str] = &[
    "enquiry",
    "case",
    "contract",
    "freelancer",
    "mentor",
    "contact",
    "training_event",
    "invoice",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderStatus {
    Pending,
    Completed,
}

impl ReminderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ReminderStatus::Pending => "pending",
            ReminderStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for ReminderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReminderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ReminderStatus::Pending),
            "completed" => Ok(ReminderStatus::Completed),
            other => Err(format!("Invalid reminder status '{other}'")),
        }
    }
}

pub fn is_valid_related_entity_type(entity_type: &str) -> bool {
    RELATED_ENTITY_TYPES.contains(&entity_type)
}

/// Validate a manually created reminder.
///
/// The related entity is optional, but type and id must be given together.
pub fn validate_reminder(
    title: &str,
    description: Option<&str>,
    related_entity_type: Option<&str>,
    related_entity_id: Option<i64>,
) -> Result<(), String> {
    validate_name("Title", title)?;
    validate_optional_text("Description", description)?;
    match (related_entity_type, related_entity_id) {
        (None, None) => Ok(()),
        (Some(t), Some(_)) if is_valid_related_entity_type(t) => Ok(()),
        (Some(t), Some(_)) => Err(format!(
            "Invalid related entity type '{t}'. Must be one of: {}",
            RELATED_ENTITY_TYPES.join(", ")
        )),
        _ => Err("related_entity_type and related_entity_id must be given together".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unattached_reminder_is_valid() {
        assert!(validate_reminder("Call back", None, None, None).is_ok());
    }

    #[test]
    fn attached_reminder_needs_known_type() {
        assert!(validate_reminder("Call back", None, Some("case"), Some(4)).is_ok());
        assert!(validate_reminder("Call back", None, Some("planet"), Some(4)).is_err());
    }

    #[test]
    fn half_attached_reminder_rejected() {
        assert!(validate_reminder("Call back", None, Some("case"), None).is_err());
        assert!(validate_reminder("Call back", None, None, Some(4)).is_err());
    }

    #[test]
    fn blank_title_rejected() {
        assert!(validate_reminder(" ", None, None, None).is_err());
    }

    #[test]
    fn status_parses() {
        assert_eq!("pending".parse(), Ok(ReminderStatus::Pending));
        assert!("done".parse::<ReminderStatus>().is_err());
    }
}
