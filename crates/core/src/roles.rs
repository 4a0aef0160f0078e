//! Well-known role name constants.
//!
//! These must match the `CHECK` constraint on `users.role`.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_CASEWORKER: &str = "caseworker";
pub const ROLE_VIEWER: &str = "viewer";

/// All valid role names.
pub const VALID_ROLES: &[&str] = &[ROLE_ADMIN, ROLE_CASEWORKER, ROLE_VIEWER];

/// Validate that a role name is one of the known roles.
pub fn validate_role(role: &str) -> Result<(), String> {
    if VALID_ROLES.contains(&role) {
        Ok(())
    } else {
        Err(format!(
            "Invalid role '{role}'. Must be one of: {}",
            VALID_ROLES.join(", ")
        ))
    }
}

/// Whether the role may create or modify records.
pub fn can_write(role: &str) -> bool {
    role == ROLE_ADMIN || role == ROLE_CASEWORKER
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_roles_are_valid() {
        for role in VALID_ROLES {
            assert!(validate_role(role).is_ok());
        }
    }

    #[test]
    fn unknown_role_rejected() {
        assert!(validate_role("superuser").is_err());
        assert!(validate_role("Admin").is_err());
    }

    #[test]
    fn viewer_cannot_write() {
        assert!(can_write(ROLE_ADMIN));
        assert!(can_write(ROLE_CASEWORKER));
        assert!(!can_write(ROLE_VIEWER));
    }
}
