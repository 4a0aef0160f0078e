//! Invoice lines, totals, and status lifecycle.
//!
//! Amounts are integer pence throughout.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Maximum number of lines on one invoice.
pub const MAX_INVOICE_LINES: usize = 200;

/// Maximum length of an invoice number.
pub const MAX_INVOICE_NUMBER_LENGTH: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceLine {
    pub description: String,
    pub quantity: i64,
    pub unit_price_pence: i64,
}

impl InvoiceLine {
    pub fn total_pence(&self) -> Option<i64> {
        self.quantity.checked_mul(self.unit_price_pence)
    }
}

/// Validate lines and return the invoice total.
pub fn compute_total(lines: &[InvoiceLine]) -> Result<i64, CoreError> {
    if lines.len() > MAX_INVOICE_LINES {
        return Err(CoreError::Validation(format!(
            "An invoice can have at most {MAX_INVOICE_LINES} lines"
        )));
    }

    let mut total: i64 = 0;
    for (i, line) in lines.iter().enumerate() {
        let n = i + 1;
        if line.description.trim().is_empty() {
            return Err(CoreError::Validation(format!(
                "Line {n}: description cannot be empty"
            )));
        }
        if line.quantity <= 0 {
            return Err(CoreError::Validation(format!(
                "Line {n}: quantity must be positive"
            )));
        }
        if line.unit_price_pence < 0 {
            return Err(CoreError::Validation(format!(
                "Line {n}: unit price cannot be negative"
            )));
        }
        total = line
            .total_pence()
            .and_then(|t| total.checked_add(t))
            .ok_or_else(|| CoreError::Validation(format!("Line {n}: amount is too large")))?;
    }
    Ok(total)
}

pub fn validate_invoice_number(number: &str) -> Result<(), String> {
    if number.trim().is_empty() {
        return Err("Invoice number cannot be empty".to_string());
    }
    if number.chars().count() > MAX_INVOICE_NUMBER_LENGTH {
        return Err(format!(
            "Invoice number exceeds maximum length of {MAX_INVOICE_NUMBER_LENGTH} characters"
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Draft,
    Sent,
    Paid,
    Overdue,
    Void,
}

impl InvoiceStatus {
    pub const ALL: [InvoiceStatus; 5] = [
        InvoiceStatus::Draft,
        InvoiceStatus::Sent,
        InvoiceStatus::Paid,
        InvoiceStatus::Overdue,
        InvoiceStatus::Void,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "draft",
            InvoiceStatus::Sent => "sent",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Overdue => "overdue",
            InvoiceStatus::Void => "void",
        }
    }

    pub fn valid_transitions(self) -> &'static [InvoiceStatus] {
        use InvoiceStatus::*;
        match self {
            Draft => &[Sent, Void],
            Sent => &[Paid, Overdue, Void],
            Overdue => &[Paid, Void],
            Paid | Void => &[],
        }
    }

    /// Lines and parties can only change while drafting.
    pub fn is_editable(self) -> bool {
        self == InvoiceStatus::Draft
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvoiceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        InvoiceStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("Invalid invoice status '{s}'"))
    }
}

/// Validate an invoice status change. Sending an invoice with no lines is refused.
pub fn validate_transition(
    from: InvoiceStatus,
    to: InvoiceStatus,
    line_count: usize,
) -> Result<(), CoreError> {
    if !from.valid_transitions().contains(&to) {
        return Err(CoreError::Validation(format!(
            "Cannot transition invoice from '{from}' to '{to}'"
        )));
    }
    if to == InvoiceStatus::Sent && line_count == 0 {
        return Err(CoreError::Validation(
            "Invoice cannot be sent without any lines".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn line(quantity: i64, unit_price_pence: i64) -> InvoiceLine {
        InvoiceLine {
            description: "Session".to_string(),
            quantity,
            unit_price_pence,
        }
    }

    #[test]
    fn total_sums_lines() {
        assert_eq!(compute_total(&[line(2, 15_000), line(1, 2_500)]).unwrap(), 32_500);
    }

    #[test]
    fn empty_invoice_totals_zero() {
        assert_eq!(compute_total(&[]).unwrap(), 0);
    }

    #[test]
    fn zero_quantity_rejected() {
        assert_matches!(compute_total(&[line(0, 100)]), Err(CoreError::Validation(_)));
    }

    #[test]
    fn negative_price_rejected() {
        assert!(compute_total(&[line(1, -1)]).is_err());
    }

    #[test]
    fn overflow_rejected() {
        assert!(compute_total(&[line(i64::MAX, 2)]).is_err());
        assert!(compute_total(&[line(1, i64::MAX), line(1, 1)]).is_err());
    }

    #[test]
    fn blank_description_rejected() {
        let mut l = line(1, 1);
        l.description = " ".to_string();
        let err = compute_total(&[line(1, 1), l]).unwrap_err();
        assert!(err.to_string().contains("Line 2"));
    }

    #[test]
    fn sent_can_be_paid_or_overdue() {
        assert!(validate_transition(InvoiceStatus::Sent, InvoiceStatus::Paid, 1).is_ok());
        assert!(validate_transition(InvoiceStatus::Sent, InvoiceStatus::Overdue, 1).is_ok());
        assert!(validate_transition(InvoiceStatus::Overdue, InvoiceStatus::Paid, 1).is_ok());
    }

    #[test]
    fn draft_cannot_be_paid() {
        assert!(validate_transition(InvoiceStatus::Draft, InvoiceStatus::Paid, 1).is_err());
    }

    #[test]
    fn cannot_send_empty_invoice() {
        assert!(validate_transition(InvoiceStatus::Draft, InvoiceStatus::Sent, 0).is_err());
    }

    #[test]
    fn paid_and_void_are_terminal() {
        assert!(InvoiceStatus::Paid.valid_transitions().is_empty());
        assert!(InvoiceStatus::Void.valid_transitions().is_empty());
        assert!(!InvoiceStatus::Sent.is_editable());
    }

    #[test]
    fn line_json_shape() {
        let l: InvoiceLine = serde_json::from_value(serde_json::json!({
            "description": "Training day",
            "quantity": 3,
            "unit_price_pence": 12000
        }))
        .unwrap();
        assert_eq!(l.total_pence(), Some(36_000));
    }
}
