//! Caseworker assignment rules.
//!
//! A case holds a list of assigned caseworkers; at most one is the lead.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

/// One caseworker assignment on a case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub user_id: DbId,
    #[serde(default)]
    pub is_lead: bool,
}

/// Validate a full replacement assignment list.
///
/// Rejects duplicate users and more than one lead.
pub fn validate_assignments(assignments: &[Assignment]) -> Result<(), CoreError> {
    let leads = assignments.iter().filter(|a| a.is_lead).count();
    if leads > 1 {
        return Err(CoreError::Validation(format!(
            "A case can have at most one lead caseworker (got {leads})"
        )));
    }

    for (i, assignment) in assignments.iter().enumerate() {
        if assignments[..i]
            .iter()
            .any(|earlier| earlier.user_id == assignment.user_id)
        {
            return Err(CoreError::Validation(format!(
                "User {} is assigned more than once",
                assignment.user_id
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assign(user_id: DbId, is_lead: bool) -> Assignment {
        Assignment { user_id, is_lead }
    }

    #[test]
    fn single_lead_is_valid() {
        assert!(validate_assignments(&[assign(1, true), assign(2, false)]).is_ok());
    }

    #[test]
    fn no_lead_is_valid() {
        assert!(validate_assignments(&[assign(1, false)]).is_ok());
        assert!(validate_assignments(&[]).is_ok());
    }

    #[test]
    fn two_leads_rejected() {
        assert!(validate_assignments(&[assign(1, true), assign(2, true)]).is_err());
    }

    #[test]
    fn duplicate_user_rejected() {
        assert!(validate_assignments(&[assign(1, false), assign(1, false)]).is_err());
    }
}
