//! Freelancers, mentors, and contacts: the people the charity works with.

use crate::validation::{
    validate_name, validate_non_negative, validate_optional_email, validate_optional_phone,
    validate_optional_text,
};

/// Roles a freelancer can be engaged for.
pub const FREELANCER_ROLES: &[&str] = &["freelancer", "mentor", "delivery"];

/// Kinds of external contact.
pub const CONTACT_TYPES: &[&str] = &[
    "local_authority",
    "social_worker",
    "school",
    "health",
    "partner",
    "supplier",
    "other",
];

/// Maximum number of skills on a freelancer.
pub const MAX_SKILLS: usize = 50;

/// Upper bound on mentees per mentor.
pub const MAX_MENTEES_LIMIT: i32 = 50;

pub fn validate_freelancer_role(role: &str) -> Result<(), String> {
    if FREELANCER_ROLES.contains(&role) {
        Ok(())
    } else {
        Err(format!(
            "Invalid freelancer role '{role}'. Must be one of: {}",
            FREELANCER_ROLES.join(", ")
        ))
    }
}

pub fn validate_contact_type(contact_type: &str) -> Result<(), String> {
    if CONTACT_TYPES.contains(&contact_type) {
        Ok(())
    } else {
        Err(format!(
            "Invalid contact type '{contact_type}'. Must be one of: {}",
            CONTACT_TYPES.join(", ")
        ))
    }
}

/// Fields common to every directory entry. `full_name` is `None` on partial updates.
pub fn validate_person(
    full_name: Option<&str>,
    email: Option<&str>,
    phone: Option<&str>,
) -> Result<(), String> {
    if let Some(name) = full_name {
        validate_name("Full name", name)?;
    }
    validate_optional_email("Email", email)?;
    validate_optional_phone(phone)
}

pub fn validate_skills(skills: Option<&[String]>) -> Result<(), String> {
    let Some(skills) = skills else {
        return Ok(());
    };
    if skills.len() > MAX_SKILLS {
        return Err(format!("At most {MAX_SKILLS} skills can be listed"));
    }
    if skills.iter().any(|s| s.trim().is_empty()) {
        return Err("Skills cannot be blank".to_string());
    }
    Ok(())
}

pub fn validate_day_rate(day_rate_pence: Option<i64>) -> Result<(), String> {
    validate_non_negative("Day rate", day_rate_pence)
}

pub fn validate_max_mentees(max_mentees: Option<i32>) -> Result<(), String> {
    match max_mentees {
        Some(n) if !(0..=MAX_MENTEES_LIMIT).contains(&n) => Err(format!(
            "Max mentees must be between 0 and {MAX_MENTEES_LIMIT}"
        )),
        _ => Ok(()),
    }
}

pub fn validate_notes(notes: Option<&str>) -> Result<(), String> {
    validate_optional_text("Notes", notes)
}
