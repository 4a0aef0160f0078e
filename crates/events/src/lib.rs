//! Event bus and email automation.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`PlatformEvent`]: the domain event envelope handlers publish.
//! - [`delivery`]: outbound email over SMTP behind the [`Mailer`] trait.
//! - [`EmailAutomation`]: subscriber that turns contract and enquiry events
//!   into emails.

pub mod automation;
pub mod bus;
pub mod delivery;

pub use automation::EmailAutomation;
pub use bus::{EventBus, PlatformEvent};
pub use delivery::email::{EmailConfig, EmailDelivery, EmailError, EmailMessage, Mailer};
