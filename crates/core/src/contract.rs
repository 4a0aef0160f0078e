//! Generated contract lifecycle.
//!
//! A contract starts as `draft` when generated from a template. Sending
//! requires every placeholder in the template to be filled.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Maximum length of a contract display name.
pub const MAX_CONTRACT_NAME_LENGTH: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContractStatus {
    Draft,
    Sent,
    Signed,
    Completed,
    Declined,
    Cancelled,
    Expired,
}

impl ContractStatus {
    pub const ALL: [ContractStatus; 7] = [
        ContractStatus::Draft,
        ContractStatus::Sent,
        ContractStatus::Signed,
        ContractStatus::Completed,
        ContractStatus::Declined,
        ContractStatus::Cancelled,
        ContractStatus::Expired,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ContractStatus::Draft => "draft",
            ContractStatus::Sent => "sent",
            ContractStatus::Signed => "signed",
            ContractStatus::Completed => "completed",
            ContractStatus::Declined => "declined",
            ContractStatus::Cancelled => "cancelled",
            ContractStatus::Expired => "expired",
        }
    }

    /// Transition rules:
    /// - `draft`  -> `sent`, `cancelled`
    /// - `sent`   -> `signed`, `declined`, `expired`, `cancelled`, `draft` (recall)
    /// - `signed` -> `completed`, `cancelled`
    /// - everything else is terminal
    pub fn valid_transitions(self) -> &'static [ContractStatus] {
        use ContractStatus::*;
        match self {
            Draft => &[Sent, Cancelled],
            Sent => &[Signed, Declined, Expired, Cancelled, Draft],
            Signed => &[Completed, Cancelled],
            Completed | Declined | Cancelled | Expired => &[],
        }
    }

    pub fn is_terminal(self) -> bool {
        self.valid_transitions().is_empty()
    }

    /// Filled data may only be edited before the contract is signed.
    pub fn is_editable(self) -> bool {
        matches!(self, ContractStatus::Draft | ContractStatus::Sent)
    }
}

impl fmt::Display for ContractStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContractStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContractStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("Invalid contract status '{s}'"))
    }
}

/// Validate a contract status change.
///
/// `missing_placeholders` is the list of template placeholders still
/// without a value; sending is refused while it is non-empty.
pub fn validate_transition(
    from: ContractStatus,
    to: ContractStatus,
    missing_placeholders: &[&str],
) -> Result<(), CoreError> {
    if from.is_terminal() {
        return Err(CoreError::Validation(format!(
            "Contract is {from}; its status can no longer change"
        )));
    }
    if !from.valid_transitions().contains(&to) {
        return Err(CoreError::Validation(format!(
            "Cannot transition contract from '{from}' to '{to}'"
        )));
    }
    if to == ContractStatus::Sent && !missing_placeholders.is_empty() {
        return Err(CoreError::Validation(format!(
            "Contract cannot be sent with unfilled fields: {}",
            missing_placeholders.join(", ")
        )));
    }
    Ok(())
}

/// Validate a contract name: non-blank and within the length limit.
pub fn validate_contract_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("Contract name cannot be empty".to_string());
    }
    if name.chars().count() > MAX_CONTRACT_NAME_LENGTH {
        return Err(format!(
            "Contract name exceeds maximum length of {MAX_CONTRACT_NAME_LENGTH} characters"
        ));
    }
    Ok(())
}

/// Filename for a downloaded contract document.
///
/// Keeps ASCII alphanumerics, `-` and `_`; everything else becomes `_`.
pub fn document_filename(name: &str, id: i64) -> String {
    let stem: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if stem.is_empty() {
        format!("contract-{id}.txt")
    } else {
        format!("{stem}-{id}.txt")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_can_be_sent_when_complete() {
        assert!(validate_transition(ContractStatus::Draft, ContractStatus::Sent, &[]).is_ok());
    }

    #[test]
    fn incomplete_draft_cannot_be_sent() {
        let err = validate_transition(ContractStatus::Draft, ContractStatus::Sent, &["fee"])
            .unwrap_err();
        assert!(err.to_string().contains("fee"));
    }

    #[test]
    fn cancelling_ignores_missing_fields() {
        assert!(
            validate_transition(ContractStatus::Draft, ContractStatus::Cancelled, &["fee"]).is_ok()
        );
    }

    #[test]
    fn draft_cannot_jump_to_signed() {
        assert!(validate_transition(ContractStatus::Draft, ContractStatus::Signed, &[]).is_err());
    }

    #[test]
    fn terminal_states_have_no_exits() {
        for status in [
            ContractStatus::Completed,
            ContractStatus::Declined,
            ContractStatus::Cancelled,
            ContractStatus::Expired,
        ] {
            assert!(status.is_terminal());
            assert!(!status.is_editable());
            let err = validate_transition(status, ContractStatus::Draft, &[]).unwrap_err();
            assert!(err.to_string().contains("can no longer change"));
        }
        assert!(!ContractStatus::Sent.is_terminal());
    }

    #[test]
    fn status_strings_round_trip() {
        for status in ContractStatus::ALL {
            assert_eq!(status.as_str().parse::<ContractStatus>(), Ok(status));
        }
        assert!("Draft".parse::<ContractStatus>().is_err());
    }

    #[test]
    fn filename_is_sanitised() {
        assert_eq!(
            document_filename("Jane Doe / 2026", 7),
            "Jane_Doe___2026-7.txt"
        );
        assert_eq!(document_filename("  ", 3), "contract-3.txt");
    }
}
