//! Email automation: turns bus events into outbound emails.
//!
//! | Event                           | Email                                     |
//! |---------------------------------|-------------------------------------------|
//! | `contract.sent`                 | contract link to `recipient_email`        |
//! | `enquiry.assessment_submitted`  | decline notice when the result is `Fail`  |
//! | `enquiry.closed`                | outcome notice for approved/declined      |
//!
//! Events without an address are skipped. Delivery failures are logged and
//! never retried; the triggering write has already committed.

use std::collections::HashMap;
use std::sync::Arc;

use fosterdesk_core::template::fill_template;
use tokio::sync::broadcast;

use crate::bus::{
    PlatformEvent, EVENT_ASSESSMENT_SUBMITTED, EVENT_CONTRACT_SENT, EVENT_ENQUIRY_CLOSED,
};
use crate::delivery::email::{EmailMessage, Mailer};

const CONTRACT_SENT_SUBJECT: &str = "Your contract: {{contract_name}}";
const CONTRACT_SENT_BODY: &str = "Hello,\n\n\
    Your contract \"{{contract_name}}\" is ready for review and signature.\n\
    You can download it at: {{document_url}}\n\n\
    Thank you.";

const ASSESSMENT_DECLINED_SUBJECT: &str = "Update on your fostering enquiry";
const ASSESSMENT_DECLINED_BODY: &str = "Dear {{applicant_name}},\n\n\
    Thank you for your interest in fostering with us. Following your {{assessment}}, \
    we are unable to take your application further at this time.\n\n\
    Kind regards.";

const ENQUIRY_APPROVED_SUBJECT: &str = "Your fostering application has been approved";
const ENQUIRY_APPROVED_BODY: &str = "Dear {{applicant_name}},\n\n\
    We are delighted to confirm that your application to foster has been approved. \
    Your caseworker will be in touch about next steps.\n\n\
    Kind regards.";

const ENQUIRY_DECLINED_SUBJECT: &str = "Update on your fostering application";
const ENQUIRY_DECLINED_BODY: &str = "Dear {{applicant_name}},\n\n\
    Thank you for the time you have given to your application. \
    We are unable to approve it at this time.\n\n\
    Kind regards.";

/// Subscriber that emails applicants and contract recipients.
pub struct EmailAutomation {
    mailer: Arc<dyn Mailer>,
}

impl EmailAutomation {
    pub fn new(mailer: Arc<dyn Mailer>) -> Self {
        Self { mailer }
    }

    /// Consume events until the bus is dropped.
    pub async fn run(self, mut receiver: broadcast::Receiver<PlatformEvent>) {
        tracing::info!("Email automation started");

        loop {
            match receiver.recv().await {
                Ok(event) => self.handle(&event).await,
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Email automation lagged, skipped events");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, email automation shutting down");
                    break;
                }
            }
        }
    }

    async fn handle(&self, event: &PlatformEvent) {
        let Some(message) = compose(event) else {
            return;
        };
        if let Err(e) = self.mailer.send(&message).await {
            tracing::error!(
                error = %e,
                event_type = %event.event_type,
                entity_id = ?event.source_entity_id,
                "Failed to send automated email",
            );
        }
    }
}

/// Build the email for an event, if it warrants one.
pub fn compose(event: &PlatformEvent) -> Option<EmailMessage> {
    let (to, subject, body) = match event.event_type.as_str() {
        EVENT_CONTRACT_SENT => (
            event.payload_str("recipient_email")?,
            CONTRACT_SENT_SUBJECT,
            CONTRACT_SENT_BODY,
        ),
        EVENT_ASSESSMENT_SUBMITTED if event.payload_str("result") == Some("Fail") => (
            event.payload_str("email")?,
            ASSESSMENT_DECLINED_SUBJECT,
            ASSESSMENT_DECLINED_BODY,
        ),
        EVENT_ENQUIRY_CLOSED => {
            let (subject, body) = match event.payload_str("outcome")? {
                "approved" => (ENQUIRY_APPROVED_SUBJECT, ENQUIRY_APPROVED_BODY),
                "declined" => (ENQUIRY_DECLINED_SUBJECT, ENQUIRY_DECLINED_BODY),
                _ => return None,
            };
            (event.payload_str("email")?, subject, body)
        }
        _ => return None,
    };

    let values = payload_values(event);
    Some(EmailMessage {
        to: to.to_string(),
        subject: fill_template(subject, &values),
        body: fill_template(body, &values),
    })
}

fn payload_values(event: &PlatformEvent) -> HashMap<String, String> {
    event
        .payload
        .as_object()
        .map(|obj| {
            obj.iter()
                .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                .collect()
        })
        .unwrap_or_default()
}
