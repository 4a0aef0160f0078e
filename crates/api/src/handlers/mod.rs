//! Request handlers, one submodule per resource.
//!
//! Handlers validate input with `fosterdesk_core`, delegate persistence to the
//! repositories in `fosterdesk_db`, and map failures through [`AppError`].
//! Every write takes [`RequireWriter`](crate::middleware::rbac::RequireWriter)
//! or [`RequireAdmin`](crate::middleware::rbac::RequireAdmin); reads take
//! [`AuthUser`](crate::middleware::auth::AuthUser).
//!
//! [`AppError`]: crate::error::AppError

pub mod auth;
pub mod cases;
pub mod contacts;
pub mod contract_templates;
pub mod contracts;
pub mod dashboard;
pub mod enquiries;
pub mod export;
pub mod freelancers;
pub mod invoices;
pub mod mentors;
pub mod reminders;
pub mod training;
pub mod users;
