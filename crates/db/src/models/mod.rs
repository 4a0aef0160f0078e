//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches

pub mod case;
pub mod contact;
pub mod contract;
pub mod contract_template;
pub mod dashboard;
pub mod enquiry;
pub mod freelancer;
pub mod invoice;
pub mod mentor;
pub mod reminder;
pub mod training;
pub mod user;
