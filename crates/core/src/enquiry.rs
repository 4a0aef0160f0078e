//! Foster-carer enquiry pipeline and assessment follow-ups.
//!
//! An enquiry moves through fixed [`PipelineStage`]s. Initial and full
//! assessments are recorded as embedded documents; each submission produces
//! exactly one follow-up reminder from the static [`reminder_rule`] lookup.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::template::fill_template;
use crate::types::{DbId, Timestamp};

/// Entity type recorded on reminders created for enquiries.
pub const ENQUIRY_ENTITY_TYPE: &str = "enquiry";

/// Maximum length of assessment notes.
pub const MAX_ASSESSMENT_NOTES_LENGTH: usize = 20_000;

// ---------------------------------------------------------------------------
// Stages and statuses
// ---------------------------------------------------------------------------

/// Recruitment pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PipelineStage {
    #[serde(rename = "Inquiry")]
    Inquiry,
    #[serde(rename = "Application")]
    Application,
    #[serde(rename = "Assessment")]
    Assessment,
    #[serde(rename = "Mentoring")]
    Mentoring,
    #[serde(rename = "Final Approval")]
    FinalApproval,
}

impl PipelineStage {
    pub const ALL: [PipelineStage; 5] = [
        PipelineStage::Inquiry,
        PipelineStage::Application,
        PipelineStage::Assessment,
        PipelineStage::Mentoring,
        PipelineStage::FinalApproval,
    ];

    pub fn label(self) -> &'static str {
        match self {
            PipelineStage::Inquiry => "Inquiry",
            PipelineStage::Application => "Application",
            PipelineStage::Assessment => "Assessment",
            PipelineStage::Mentoring => "Mentoring",
            PipelineStage::FinalApproval => "Final Approval",
        }
    }

    pub fn next(self) -> Option<PipelineStage> {
        match self {
            PipelineStage::Inquiry => Some(PipelineStage::Application),
            PipelineStage::Application => Some(PipelineStage::Assessment),
            PipelineStage::Assessment => Some(PipelineStage::Mentoring),
            PipelineStage::Mentoring => Some(PipelineStage::FinalApproval),
            PipelineStage::FinalApproval => None,
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PipelineStage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PipelineStage::ALL
            .into_iter()
            .find(|stage| stage.label() == s)
            .ok_or_else(|| format!("Invalid pipeline stage '{s}'"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnquiryStatus {
    Open,
    OnHold,
    Declined,
    Approved,
    Withdrawn,
}

impl EnquiryStatus {
    pub const ALL: [EnquiryStatus; 5] = [
        EnquiryStatus::Open,
        EnquiryStatus::OnHold,
        EnquiryStatus::Declined,
        EnquiryStatus::Approved,
        EnquiryStatus::Withdrawn,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EnquiryStatus::Open => "open",
            EnquiryStatus::OnHold => "on_hold",
            EnquiryStatus::Declined => "declined",
            EnquiryStatus::Approved => "approved",
            EnquiryStatus::Withdrawn => "withdrawn",
        }
    }

    pub fn is_closed(self) -> bool {
        matches!(
            self,
            EnquiryStatus::Declined | EnquiryStatus::Approved | EnquiryStatus::Withdrawn
        )
    }
}

impl fmt::Display for EnquiryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EnquiryStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EnquiryStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("Invalid enquiry status '{s}'"))
    }
}

// ---------------------------------------------------------------------------
// Assessments
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentKind {
    Initial,
    Full,
}

impl AssessmentKind {
    pub fn label(self) -> &'static str {
        match self {
            AssessmentKind::Initial => "initial assessment",
            AssessmentKind::Full => "full assessment",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssessmentResult {
    Pass,
    Fail,
    Deferred,
}

impl AssessmentResult {
    pub fn as_str(self) -> &'static str {
        match self {
            AssessmentResult::Pass => "Pass",
            AssessmentResult::Fail => "Fail",
            AssessmentResult::Deferred => "Deferred",
        }
    }
}

impl fmt::Display for AssessmentResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An assessment as stored in `enquiries.initial_assessment` /
/// `enquiries.full_assessment`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentRecord {
    pub result: AssessmentResult,
    pub assessor: Option<String>,
    pub notes: Option<String>,
    pub submitted_by: DbId,
    pub submitted_at: Timestamp,
}

/// How an enquiry was closed, stored in `enquiries.case_closure`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClosureOutcome {
    Approved,
    Declined,
    Withdrawn,
}

impl ClosureOutcome {
    pub fn status(self) -> EnquiryStatus {
        match self {
            ClosureOutcome::Approved => EnquiryStatus::Approved,
            ClosureOutcome::Declined => EnquiryStatus::Declined,
            ClosureOutcome::Withdrawn => EnquiryStatus::Withdrawn,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseClosure {
    pub outcome: ClosureOutcome,
    pub reason: Option<String>,
    pub closed_by: DbId,
    pub closed_at: Timestamp,
}

/// Where an enquiry ends up after an assessment is submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionOutcome {
    pub stage: PipelineStage,
    pub status: EnquiryStatus,
}

/// Validate an assessment submission and compute the enquiry's new stage
/// and status.
///
/// - Initial assessments are accepted at `Inquiry` or `Application`.
/// - Full assessments need a passed initial assessment and stage `Assessment`.
/// - Pass advances the stage, Fail declines, Deferred puts the enquiry on hold.
pub fn apply_assessment(
    kind: AssessmentKind,
    result: AssessmentResult,
    stage: PipelineStage,
    status: EnquiryStatus,
    initial_passed: bool,
) -> Result<SubmissionOutcome, CoreError> {
    if status.is_closed() {
        return Err(CoreError::Validation(format!(
            "Enquiry is {status}; no further assessments can be recorded"
        )));
    }

    let pass_stage = match kind {
        AssessmentKind::Initial => {
            if stage > PipelineStage::Application {
                return Err(CoreError::Validation(format!(
                    "Initial assessment cannot be recorded at stage '{stage}'"
                )));
            }
            PipelineStage::Assessment
        }
        AssessmentKind::Full => {
            if !initial_passed {
                return Err(CoreError::Validation(
                    "Full assessment requires a passed initial assessment".to_string(),
                ));
            }
            if stage != PipelineStage::Assessment {
                return Err(CoreError::Validation(format!(
                    "Full assessment cannot be recorded at stage '{stage}'"
                )));
            }
            PipelineStage::Mentoring
        }
    };

    let outcome = match result {
        AssessmentResult::Pass => SubmissionOutcome {
            stage: pass_stage,
            status: EnquiryStatus::Open,
        },
        AssessmentResult::Fail => SubmissionOutcome {
            stage,
            status: EnquiryStatus::Declined,
        },
        AssessmentResult::Deferred => SubmissionOutcome {
            stage,
            status: EnquiryStatus::OnHold,
        },
    };
    Ok(outcome)
}

/// Move an enquiry one stage forward by hand.
///
/// Entering `Assessment` needs a passed initial assessment and leaving it
/// needs a passed full assessment, so an enquiry never sits at `Assessment`
/// without a way forward. `Final Approval` is the last stage and is finished
/// through closure instead.
pub fn advance_stage(
    stage: PipelineStage,
    status: EnquiryStatus,
    initial_passed: bool,
    full_passed: bool,
) -> Result<PipelineStage, CoreError> {
    if status.is_closed() {
        return Err(CoreError::Validation(format!(
            "Enquiry is {status} and cannot advance"
        )));
    }
    let next = stage.next().ok_or_else(|| {
        CoreError::Validation("Enquiry is already at Final Approval; close it instead".to_string())
    })?;
    if next == PipelineStage::Assessment && !initial_passed {
        return Err(CoreError::Validation(
            "A passed initial assessment is required before Assessment".to_string(),
        ));
    }
    if stage == PipelineStage::Assessment && !full_passed {
        return Err(CoreError::Validation(
            "A passed full assessment is required before Mentoring".to_string(),
        ));
    }
    Ok(next)
}

/// Validate closing an enquiry. Approval is only possible at Final Approval.
pub fn validate_closure(
    outcome: ClosureOutcome,
    stage: PipelineStage,
    status: EnquiryStatus,
) -> Result<(), CoreError> {
    if status.is_closed() {
        return Err(CoreError::Conflict(format!("Enquiry is already {status}")));
    }
    if outcome == ClosureOutcome::Approved && stage != PipelineStage::FinalApproval {
        return Err(CoreError::Validation(format!(
            "Enquiry can only be approved at Final Approval (currently '{stage}')"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Reminder lookup
// ---------------------------------------------------------------------------

/// A static follow-up definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReminderRule {
    pub title: &'static str,
    pub offset_days: i64,
    /// Filled with `applicant_name`, `result`, and `assessment`.
    pub description: &'static str,
}

const DECLINE_DESCRIPTION: &str =
    "{{applicant_name}} did not pass the {{assessment}} (result: {{result}}). \
     Send the decline email and record the reason on the enquiry.";

const DEFERRED_DESCRIPTION: &str =
    "The {{assessment}} for {{applicant_name}} was deferred. \
     Review whether the enquiry can resume.";

/// Follow-up reminder for an assessment result.
pub fn reminder_rule(kind: AssessmentKind, result: AssessmentResult) -> ReminderRule {
    match (kind, result) {
        (AssessmentKind::Initial, AssessmentResult::Pass) => ReminderRule {
            title: "Conduct Full Assessment",
            offset_days: 7,
            description: "{{applicant_name}} passed the initial assessment. \
                          Book and conduct the full assessment.",
        },
        (AssessmentKind::Full, AssessmentResult::Pass) => ReminderRule {
            title: "Assign Mentor",
            offset_days: 3,
            description: "{{applicant_name}} passed the full assessment. \
                          Assign a mentor to begin the mentoring stage.",
        },
        (_, AssessmentResult::Fail) => ReminderRule {
            title: "Send Decline Email",
            offset_days: 1,
            description: DECLINE_DESCRIPTION,
        },
        (_, AssessmentResult::Deferred) => ReminderRule {
            title: "Review Deferred Enquiry",
            offset_days: 30,
            description: DEFERRED_DESCRIPTION,
        },
    }
}

/// A reminder ready to be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowUp {
    pub title: String,
    pub description: String,
    pub due_at: Timestamp,
}

/// Build the follow-up reminder for an assessment submitted at `submitted_at`.
pub fn follow_up(
    kind: AssessmentKind,
    result: AssessmentResult,
    applicant_name: &str,
    submitted_at: Timestamp,
) -> FollowUp {
    let rule = reminder_rule(kind, result);
    let values: HashMap<String, String> = [
        ("applicant_name", applicant_name),
        ("result", result.as_str()),
        ("assessment", kind.label()),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    FollowUp {
        title: rule.title.to_string(),
        description: fill_template(rule.description, &values),
        due_at: submitted_at + Duration::days(rule.offset_days),
    }
}

/// Validate optional assessment notes.
pub fn validate_assessment_notes(notes: Option<&str>) -> Result<(), String> {
    if let Some(notes) = notes {
        if notes.len() > MAX_ASSESSMENT_NOTES_LENGTH {
            return Err(format!(
                "Assessment notes exceed maximum length of {MAX_ASSESSMENT_NOTES_LENGTH} characters"
            ));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::Utc;

    #[test]
    fn initial_pass_is_due_in_seven_days() {
        let now = Utc::now();
        let reminder = follow_up(
            AssessmentKind::Initial,
            AssessmentResult::Pass,
            "Jane Smith",
            now,
        );
        assert_eq!(reminder.title, "Conduct Full Assessment");
        assert_eq!(reminder.due_at, now + Duration::days(7));
        assert!(reminder.description.starts_with("Jane Smith passed"));
    }

    #[test]
    fn fail_is_due_next_day_for_both_kinds() {
        for kind in [AssessmentKind::Initial, AssessmentKind::Full] {
            let rule = reminder_rule(kind, AssessmentResult::Fail);
            assert_eq!(rule.title, "Send Decline Email");
            assert_eq!(rule.offset_days, 1);
        }
    }

    #[test]
    fn follow_up_description_has_no_unfilled_markers() {
        let reminder = follow_up(
            AssessmentKind::Full,
            AssessmentResult::Deferred,
            "Sam",
            Utc::now(),
        );
        assert!(!reminder.description.contains('['));
        assert!(reminder.description.contains("full assessment"));
    }

    #[test]
    fn initial_pass_moves_to_assessment() {
        let outcome = apply_assessment(
            AssessmentKind::Initial,
            AssessmentResult::Pass,
            PipelineStage::Inquiry,
            EnquiryStatus::Open,
            false,
        )
        .unwrap();
        assert_eq!(outcome.stage, PipelineStage::Assessment);
        assert_eq!(outcome.status, EnquiryStatus::Open);
    }

    #[test]
    fn fail_declines_without_moving() {
        let outcome = apply_assessment(
            AssessmentKind::Initial,
            AssessmentResult::Fail,
            PipelineStage::Application,
            EnquiryStatus::Open,
            false,
        )
        .unwrap();
        assert_eq!(outcome.stage, PipelineStage::Application);
        assert_eq!(outcome.status, EnquiryStatus::Declined);
    }

    #[test]
    fn deferred_puts_enquiry_on_hold() {
        let outcome = apply_assessment(
            AssessmentKind::Initial,
            AssessmentResult::Deferred,
            PipelineStage::Inquiry,
            EnquiryStatus::Open,
            false,
        )
        .unwrap();
        assert_eq!(outcome.status, EnquiryStatus::OnHold);
    }

    #[test]
    fn full_assessment_needs_initial_pass() {
        let result = apply_assessment(
            AssessmentKind::Full,
            AssessmentResult::Pass,
            PipelineStage::Assessment,
            EnquiryStatus::Open,
            false,
        );
        assert_matches!(result, Err(CoreError::Validation(_)));
    }

    #[test]
    fn full_pass_moves_to_mentoring() {
        let outcome = apply_assessment(
            AssessmentKind::Full,
            AssessmentResult::Pass,
            PipelineStage::Assessment,
            EnquiryStatus::OnHold,
            true,
        )
        .unwrap();
        assert_eq!(outcome.stage, PipelineStage::Mentoring);
        assert_eq!(outcome.status, EnquiryStatus::Open);
    }

    #[test]
    fn declined_enquiry_rejects_assessment() {
        let result = apply_assessment(
            AssessmentKind::Initial,
            AssessmentResult::Pass,
            PipelineStage::Inquiry,
            EnquiryStatus::Declined,
            false,
        );
        assert!(result.is_err());
    }

    #[test]
    fn initial_rejected_after_application() {
        let result = apply_assessment(
            AssessmentKind::Initial,
            AssessmentResult::Pass,
            PipelineStage::Mentoring,
            EnquiryStatus::Open,
            true,
        );
        assert!(result.is_err());
    }

    #[test]
    fn advance_walks_stages_in_order() {
        assert_eq!(
            advance_stage(PipelineStage::Inquiry, EnquiryStatus::Open, false, false).unwrap(),
            PipelineStage::Application
        );
        assert_eq!(
            advance_stage(PipelineStage::Mentoring, EnquiryStatus::Open, true, true).unwrap(),
            PipelineStage::FinalApproval
        );
    }

    #[test]
    fn advance_past_assessment_needs_full_pass() {
        assert!(
            advance_stage(PipelineStage::Assessment, EnquiryStatus::Open, true, false).is_err()
        );
        assert!(advance_stage(PipelineStage::Assessment, EnquiryStatus::Open, true, true).is_ok());
    }

    #[test]
    fn advance_into_assessment_needs_initial_pass() {
        let stage = advance_stage(PipelineStage::Inquiry, EnquiryStatus::Open, false, false)
            .unwrap();
        assert_matches!(
            advance_stage(stage, EnquiryStatus::Open, false, false),
            Err(CoreError::Validation(_))
        );

        // The initial assessment is still accepted at Application.
        let outcome = apply_assessment(
            AssessmentKind::Initial,
            AssessmentResult::Pass,
            stage,
            EnquiryStatus::Open,
            false,
        )
        .unwrap();
        assert_eq!(outcome.stage, PipelineStage::Assessment);
    }

    #[test]
    fn advance_from_final_approval_fails() {
        assert!(
            advance_stage(PipelineStage::FinalApproval, EnquiryStatus::Open, true, true).is_err()
        );
    }

    #[test]
    fn approval_only_at_final_stage() {
        assert!(validate_closure(
            ClosureOutcome::Approved,
            PipelineStage::Mentoring,
            EnquiryStatus::Open
        )
        .is_err());
        assert!(validate_closure(
            ClosureOutcome::Approved,
            PipelineStage::FinalApproval,
            EnquiryStatus::Open
        )
        .is_ok());
        assert!(validate_closure(
            ClosureOutcome::Withdrawn,
            PipelineStage::Inquiry,
            EnquiryStatus::OnHold
        )
        .is_ok());
    }

    #[test]
    fn closing_twice_is_a_conflict() {
        assert_matches!(
            validate_closure(
                ClosureOutcome::Withdrawn,
                PipelineStage::Inquiry,
                EnquiryStatus::Declined
            ),
            Err(CoreError::Conflict(_))
        );
    }

    #[test]
    fn stage_labels_round_trip() {
        for stage in PipelineStage::ALL {
            assert_eq!(stage.label().parse::<PipelineStage>(), Ok(stage));
        }
    }

    #[test]
    fn stages_are_ordered() {
        assert!(PipelineStage::Inquiry < PipelineStage::FinalApproval);
        assert!(PipelineStage::Application < PipelineStage::Assessment);
    }
}
