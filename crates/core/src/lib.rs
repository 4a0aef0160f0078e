//! Domain logic for the foster-carer CRM.
//!
//! No I/O lives here: state machines, the contract template engine, CSV
//! helpers, and field validation shared by the `db` and `api` crates.

pub mod case_status;
pub mod caseworkers;
pub mod contract;
pub mod csv;
pub mod directory;
pub mod enquiry;
pub mod error;
pub mod invoice;
pub mod reminder;
pub mod roles;
pub mod search;
pub mod template;
pub mod training;
pub mod types;
pub mod validation;
