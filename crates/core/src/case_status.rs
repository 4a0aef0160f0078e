//! Case lifecycle state machine.
//!
//! Statuses are stored as their display labels (`"In Progress"`,
//! `"Closed – Resolved"`) in `cases.status`. The transition table here is the
//! single source of truth; handlers call [`plan_transition`] and persist the
//! resulting [`TransitionPlan`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Case lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CaseStatus {
    #[serde(rename = "New")]
    New,
    #[serde(rename = "Open")]
    Open,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "Awaiting Assessment")]
    AwaitingAssessment,
    #[serde(rename = "Active")]
    Active,
    #[serde(rename = "Paused")]
    Paused,
    #[serde(rename = "Escalated")]
    Escalated,
    #[serde(rename = "Closed")]
    Closed,
    #[serde(rename = "Closed – Resolved")]
    ClosedResolved,
    #[serde(rename = "Closed – Unresolved")]
    ClosedUnresolved,
}

impl CaseStatus {
    pub const ALL: [CaseStatus; 10] = [
        CaseStatus::New,
        CaseStatus::Open,
        CaseStatus::InProgress,
        CaseStatus::AwaitingAssessment,
        CaseStatus::Active,
        CaseStatus::Paused,
        CaseStatus::Escalated,
        CaseStatus::Closed,
        CaseStatus::ClosedResolved,
        CaseStatus::ClosedUnresolved,
    ];

    /// Label stored in the database and shown in the dashboard.
    pub fn label(self) -> &'static str {
        match self {
            CaseStatus::New => "New",
            CaseStatus::Open => "Open",
            CaseStatus::InProgress => "In Progress",
            CaseStatus::AwaitingAssessment => "Awaiting Assessment",
            CaseStatus::Active => "Active",
            CaseStatus::Paused => "Paused",
            CaseStatus::Escalated => "Escalated",
            CaseStatus::Closed => "Closed",
            CaseStatus::ClosedResolved => "Closed – Resolved",
            CaseStatus::ClosedUnresolved => "Closed – Unresolved",
        }
    }

    pub fn is_closed(self) -> bool {
        matches!(
            self,
            CaseStatus::Closed | CaseStatus::ClosedResolved | CaseStatus::ClosedUnresolved
        )
    }

    /// Statuses reachable in one step from `self`.
    pub fn valid_transitions(self) -> &'static [CaseStatus] {
        use CaseStatus::*;
        match self {
            New => &[Open],
            Open => &[InProgress, AwaitingAssessment],
            AwaitingAssessment => &[Active, InProgress],
            Active => &[
                InProgress,
                Paused,
                Escalated,
                ClosedResolved,
                ClosedUnresolved,
            ],
            InProgress => &[
                Paused,
                Escalated,
                Closed,
                ClosedResolved,
                ClosedUnresolved,
            ],
            Paused => &[InProgress],
            Escalated => &[InProgress, ClosedResolved, ClosedUnresolved],
            Closed | ClosedResolved | ClosedUnresolved => &[Open],
        }
    }

    pub fn can_transition_to(self, next: CaseStatus) -> bool {
        self.valid_transitions().contains(&next)
    }

    /// Actions the dashboard offers for a case in this status.
    pub fn available_actions(self) -> Vec<CaseAction> {
        CaseAction::ALL
            .into_iter()
            .filter(|action| action.applies_from(self))
            .collect()
    }
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for CaseStatus {
    type Err = String;

    /// Parses the stored label. The closed sub-states also accept a plain
    /// hyphen in place of the en dash.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalised = s.trim().replace(" - ", " – ");
        CaseStatus::ALL
            .into_iter()
            .find(|status| status.label() == normalised)
            .ok_or_else(|| format!("Invalid case status '{s}'"))
    }
}

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

/// A button-level action on a case. Each maps to exactly one target status
/// and is offered only from the statuses that may transition there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseAction {
    MarkOpen,
    StartWork,
    RequestAssessment,
    Activate,
    Pause,
    Resume,
    Escalate,
    Close,
    CloseResolved,
    CloseUnresolved,
    Reopen,
}

impl CaseAction {
    pub const ALL: [CaseAction; 11] = [
        CaseAction::MarkOpen,
        CaseAction::StartWork,
        CaseAction::RequestAssessment,
        CaseAction::Activate,
        CaseAction::Pause,
        CaseAction::Resume,
        CaseAction::Escalate,
        CaseAction::Close,
        CaseAction::CloseResolved,
        CaseAction::CloseUnresolved,
        CaseAction::Reopen,
    ];

    pub fn target(self) -> CaseStatus {
        match self {
            CaseAction::MarkOpen | CaseAction::Reopen => CaseStatus::Open,
            CaseAction::StartWork | CaseAction::Resume => CaseStatus::InProgress,
            CaseAction::RequestAssessment => CaseStatus::AwaitingAssessment,
            CaseAction::Activate => CaseStatus::Active,
            CaseAction::Pause => CaseStatus::Paused,
            CaseAction::Escalate => CaseStatus::Escalated,
            CaseAction::Close => CaseStatus::Closed,
            CaseAction::CloseResolved => CaseStatus::ClosedResolved,
            CaseAction::CloseUnresolved => CaseStatus::ClosedUnresolved,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CaseAction::MarkOpen => "Mark as Open",
            CaseAction::StartWork => "Start Work",
            CaseAction::RequestAssessment => "Request Assessment",
            CaseAction::Activate => "Mark as Active",
            CaseAction::Pause => "Pause",
            CaseAction::Resume => "Resume",
            CaseAction::Escalate => "Escalate",
            CaseAction::Close => "Close",
            CaseAction::CloseResolved => "Close as Resolved",
            CaseAction::CloseUnresolved => "Close as Unresolved",
            CaseAction::Reopen => "Reopen",
        }
    }

    /// Whether this action is offered for a case currently in `status`.
    pub fn applies_from(self, status: CaseStatus) -> bool {
        let allowed_source = match self {
            CaseAction::MarkOpen => status == CaseStatus::New,
            CaseAction::Reopen => status.is_closed(),
            CaseAction::StartWork => matches!(
                status,
                CaseStatus::Open | CaseStatus::AwaitingAssessment | CaseStatus::Active
            ),
            CaseAction::Resume => {
                matches!(status, CaseStatus::Paused | CaseStatus::Escalated)
            }
            _ => true,
        };
        allowed_source && status.can_transition_to(self.target())
    }
}

// ---------------------------------------------------------------------------
// Transition planning
// ---------------------------------------------------------------------------

/// Key lifecycle dates held on a case.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyDates {
    pub opened: Option<Timestamp>,
    pub review_due: Option<Timestamp>,
    pub closed: Option<Timestamp>,
}

/// The persisted result of a validated status change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionPlan {
    pub from: CaseStatus,
    pub to: CaseStatus,
    pub key_dates: KeyDates,
}

/// Validate a status change and compute the resulting key dates.
///
/// - Entering `Open` sets `opened` when it is still empty.
/// - Entering any closed status sets `closed` and requires outcome notes.
/// - Leaving a closed status clears `closed`.
pub fn plan_transition(
    from: CaseStatus,
    to: CaseStatus,
    current: KeyDates,
    outcome_notes: Option<&str>,
    now: Timestamp,
) -> Result<TransitionPlan, CoreError> {
    if !from.can_transition_to(to) {
        let allowed: Vec<&str> = from.valid_transitions().iter().map(|s| s.label()).collect();
        return Err(CoreError::Validation(format!(
            "Cannot move case from '{from}' to '{to}'. Allowed: {}",
            allowed.join(", ")
        )));
    }

    let mut key_dates = current;

    if to == CaseStatus::Open && key_dates.opened.is_none() {
        key_dates.opened = Some(now);
    }

    if to.is_closed() {
        let has_notes = outcome_notes.is_some_and(|n| !n.trim().is_empty());
        if !has_notes {
            return Err(CoreError::Validation(
                "Outcome notes are required to close a case".to_string(),
            ));
        }
        key_dates.closed = Some(now);
    } else if from.is_closed() {
        key_dates.closed = None;
    }

    Ok(TransitionPlan { from, to, key_dates })
}

// ---------------------------------------------------------------------------
// Case fields
// ---------------------------------------------------------------------------

/// Maximum length of a case reference number.
pub const MAX_CASE_REFERENCE_LENGTH: usize = 40;

/// Validate a client-supplied case reference: letters, digits, `-` and `/`.
pub fn validate_case_reference(reference: &str) -> Result<(), String> {
    let reference = reference.trim();
    if reference.is_empty() {
        return Err("Case reference number cannot be empty".to_string());
    }
    if reference.len() > MAX_CASE_REFERENCE_LENGTH {
        return Err(format!(
            "Case reference number exceeds maximum length of {MAX_CASE_REFERENCE_LENGTH} characters"
        ));
    }
    if !reference
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '/')
    {
        return Err("Case reference number may only contain letters, digits, '-' and '/'".to_string());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
