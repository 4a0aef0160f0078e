//! Training events and bulk participant import.
//!
//! Import rows are validated and persisted independently; one bad row never
//! stops the rest. Each row produces exactly one [`ImportRowResult`].

use serde::{Deserialize, Serialize};

use crate::csv::{CsvRecord, CsvTable};
use crate::types::{DbId, Timestamp};
use crate::validation::{validate_email, validate_name, validate_optional_text};

/// Maximum number of data rows accepted in one import.
pub const MAX_IMPORT_ROWS: usize = 2_000;

/// Header aliases accepted for the participant name column.
const NAME_COLUMNS: &[&str] = &["full_name", "name", "participant"];

/// Validate a training event's fields.
pub fn validate_event(
    title: &str,
    description: Option<&str>,
    starts_at: Timestamp,
    ends_at: Option<Timestamp>,
    capacity: Option<i32>,
) -> Result<(), String> {
    validate_name("Title", title)?;
    validate_optional_text("Description", description)?;
    if let Some(ends_at) = ends_at {
        if ends_at < starts_at {
            return Err("Event cannot end before it starts".to_string());
        }
    }
    if let Some(capacity) = capacity {
        if capacity < 1 {
            return Err("Capacity must be at least 1".to_string());
        }
    }
    Ok(())
}

/// A participant to add to an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantInput {
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub attended: bool,
}

impl ParticipantInput {
    pub fn validate(&self) -> Result<(), String> {
        validate_name("Full name", &self.full_name)?;
        validate_email("Email", &self.email)
    }

    /// Emails are compared case-insensitively within an event.
    pub fn normalized_email(&self) -> String {
        self.email.trim().to_ascii_lowercase()
    }
}

/// Outcome of importing one CSV row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportRowResult {
    /// Source line number (the header is line 1).
    pub row: usize,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub participant_id: Option<DbId>,
}

impl ImportRowResult {
    pub fn ok(row: usize, participant_id: DbId) -> Self {
        Self {
            row,
            success: true,
            error: None,
            participant_id: Some(participant_id),
        }
    }

    pub fn failed(row: usize, error: impl Into<String>) -> Self {
        Self {
            row,
            success: false,
            error: Some(error.into()),
            participant_id: None,
        }
    }
}

/// Summary counts for an import response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

pub fn summarize(results: &[ImportRowResult]) -> ImportSummary {
    let succeeded = results.iter().filter(|r| r.success).count();
    ImportSummary {
        total: results.len(),
        succeeded,
        failed: results.len() - succeeded,
    }
}

/// Check the table has the columns an import needs.
pub fn validate_import_table(table: &CsvTable) -> Result<(), String> {
    if !NAME_COLUMNS.iter().any(|c| table.column(c).is_some()) {
        return Err("CSV must have a 'full_name' (or 'name') column".to_string());
    }
    if table.column("email").is_none() {
        return Err("CSV must have an 'email' column".to_string());
    }
    if table.rows.len() > MAX_IMPORT_ROWS {
        return Err(format!(
            "CSV has {} rows; at most {MAX_IMPORT_ROWS} can be imported at once",
            table.rows.len()
        ));
    }
    Ok(())
}

/// Read one participant from a CSV record and validate it.
pub fn participant_from_record(
    table: &CsvTable,
    record: &CsvRecord,
) -> Result<ParticipantInput, String> {
    let full_name = NAME_COLUMNS
        .iter()
        .find_map(|c| table.value(record, c))
        .ok_or("Missing full name")?;
    let email = table.value(record, "email").ok_or("Missing email")?;
    let attended = match table.value(record, "attended") {
        None => false,
        Some(raw) => parse_flag(raw).ok_or_else(|| format!("Invalid attended value '{raw}'"))?,
    };

    let input = ParticipantInput {
        full_name: full_name.to_string(),
        email: email.to_string(),
        attended,
    };
    input.validate()?;
    Ok(input)
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "yes" | "y" | "true" | "1" => Some(true),
        "no" | "n" | "false" | "0" => Some(false),
        _ => None,
    }
}
