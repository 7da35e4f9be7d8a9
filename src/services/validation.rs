//! Input checks for transaction payloads.
//!
//! All field problems are collected before returning so the client sees every
//! offending field in one response.

use chrono::{Datelike, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::Value;
use std::collections::HashMap;
use std::str::FromStr;

use super::ServiceError;
use crate::database::models::{NewTransaction, TransactionChanges, TransactionKind, TransactionPayload};

/// Largest value a NUMERIC(10, 2) column holds
const MAX_AMOUNT_CENTS: i64 = 99_999_999_99;
const MAX_DESCRIPTION_LEN: usize = 255;
const MIN_YEAR: i32 = 1;
const MAX_YEAR: i32 = 9999;

#[derive(Debug, Default)]
pub struct FieldErrors(HashMap<String, String>);

impl FieldErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_insert_with(|| message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_error(self, message: &str) -> ServiceError {
        ServiceError::validation(message, self.0)
    }

    pub fn into_result<T>(self, message: &str, value: T) -> Result<T, ServiceError> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self.into_error(message))
        }
    }
}

/// Blank strings count as absent; empty form inputs post them.
fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

pub fn parse_kind(raw: &str, errors: &mut FieldErrors) -> Option<TransactionKind> {
    match raw.trim().parse::<TransactionKind>() {
        Ok(kind) => Some(kind),
        Err(_) => {
            errors.add("type", "must be 'income' or 'expense'");
            None
        }
    }
}

/// Accepts a JSON number or numeric string; rounds to cents and requires a
/// positive value that fits the column.
pub fn parse_amount(raw: &Value, errors: &mut FieldErrors) -> Option<Decimal> {
    let parsed = match raw {
        Value::Number(n) => {
            let text = n.to_string();
            Decimal::from_str(&text).or_else(|_| Decimal::from_scientific(&text)).ok()
        }
        Value::String(s) => Decimal::from_str(s.trim()).ok(),
        _ => None,
    };

    let Some(amount) = parsed else {
        errors.add("amount", "must be a decimal number");
        return None;
    };

    let mut amount = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    amount.rescale(2);

    if amount <= Decimal::ZERO {
        errors.add("amount", "must be greater than zero");
        return None;
    }
    if amount > Decimal::new(MAX_AMOUNT_CENTS, 2) {
        errors.add("amount", "is too large");
        return None;
    }
    Some(amount)
}

/// Strict `YYYY-MM-DD`: four-digit year from 0001, zero-padded month and day.
pub fn parse_date(raw: &str, errors: &mut FieldErrors) -> Option<NaiveDate> {
    let raw = raw.trim();
    let parsed = if is_iso_date_shape(raw) {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .filter(|date| (MIN_YEAR..=MAX_YEAR).contains(&date.year()))
    } else {
        None
    };

    if parsed.is_none() {
        errors.add("date", "must be a calendar date in YYYY-MM-DD format");
    }
    parsed
}

fn is_iso_date_shape(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

/// Postgres text columns cannot hold NUL
fn contains_nul(value: &str) -> bool {
    value.contains('\0')
}

fn parse_description(raw: String, errors: &mut FieldErrors) -> Option<String> {
    let trimmed = raw.trim();
    if contains_nul(trimmed) {
        errors.add("description", "must not contain NUL characters");
    }
    if trimmed.chars().count() > MAX_DESCRIPTION_LEN {
        errors.add("description", format!("must be at most {} characters", MAX_DESCRIPTION_LEN));
    }
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Validate a create body. `type`, `amount` and `date` are required.
pub fn new_transaction(payload: TransactionPayload) -> Result<NewTransaction, ServiceError> {
    let mut errors = FieldErrors::default();

    let kind = match non_blank(payload.kind) {
        Some(raw) => parse_kind(&raw, &mut errors),
        None => {
            errors.add("type", "is required");
            None
        }
    };
    let amount = match payload.amount.as_ref().filter(|v| !is_blank(v)) {
        Some(raw) => parse_amount(raw, &mut errors),
        None => {
            errors.add("amount", "is required");
            None
        }
    };
    let date = match non_blank(payload.date) {
        Some(raw) => parse_date(&raw, &mut errors),
        None => {
            errors.add("date", "is required");
            None
        }
    };
    let description = payload
        .description
        .and_then(|raw| parse_description(raw, &mut errors));

    let (Some(kind), Some(amount), Some(date)) = (kind, amount, date) else {
        return Err(errors.into_error("Missing or invalid fields"));
    };

    errors.into_result(
        "Invalid fields",
        NewTransaction {
            kind,
            amount,
            description,
            date,
        },
    )
}

/// Validate an update body. Only supplied fields are checked and changed; a
/// supplied value is never ignored because it happens to be zero or empty.
pub fn transaction_changes(payload: TransactionPayload) -> Result<TransactionChanges, ServiceError> {
    let mut errors = FieldErrors::default();

    let kind = payload.kind.and_then(|raw| parse_kind(&raw, &mut errors));
    let amount = payload
        .amount
        .filter(|v| !v.is_null())
        .and_then(|raw| parse_amount(&raw, &mut errors));
    let date = payload.date.and_then(|raw| parse_date(&raw, &mut errors));
    let description = payload
        .description
        .map(|raw| parse_description(raw, &mut errors));

    errors.into_result(
        "Invalid fields",
        TransactionChanges {
            kind,
            amount,
            description,
            date,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: Value) -> TransactionPayload {
        serde_json::from_value(value).unwrap()
    }

    fn field_errors(err: ServiceError) -> HashMap<String, String> {
        match err {
            ServiceError::Validation { field_errors, .. } => field_errors,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn accepts_numeric_amount() {
        let tx = new_transaction(payload(json!({
            "type": "income", "amount": 100, "date": "2024-01-01"
        })))
        .unwrap();
        assert_eq!(tx.kind, TransactionKind::Income);
        assert_eq!(tx.amount.to_string(), "100.00");
        assert_eq!(tx.date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(tx.description, None);
    }

    #[test]
    fn accepts_string_amount_and_rounds_to_cents() {
        let tx = new_transaction(payload(json!({
            "type": "expense", "amount": "12.345", "date": "2024-02-29", "description": " lunch "
        })))
        .unwrap();
        assert_eq!(tx.amount.to_string(), "12.35");
        assert_eq!(tx.description.as_deref(), Some("lunch"));
    }

    #[test]
    fn reports_every_missing_field() {
        let errors = field_errors(new_transaction(payload(json!({}))).unwrap_err());
        assert!(errors.contains_key("type"));
        assert!(errors.contains_key("amount"));
        assert!(errors.contains_key("date"));
    }

    #[test]
    fn blank_strings_count_as_missing() {
        let errors = field_errors(
            new_transaction(payload(json!({"type": "", "amount": "", "date": "2024-01-01"}))).unwrap_err(),
        );
        assert_eq!(errors.get("type").map(String::as_str), Some("is required"));
        assert_eq!(errors.get("amount").map(String::as_str), Some("is required"));
    }

    #[test]
    fn rejects_unknown_kind_bad_date_and_non_positive_amount() {
        let errors = field_errors(
            new_transaction(payload(json!({"type": "transfer", "amount": -5, "date": "01/02/2024"})))
                .unwrap_err(),
        );
        assert_eq!(errors.len(), 3);

        let errors = field_errors(
            new_transaction(payload(json!({"type": "income", "amount": "abc", "date": "2024-13-01"})))
                .unwrap_err(),
        );
        assert!(errors.contains_key("amount"));
        assert!(errors.contains_key("date"));
    }

    #[test]
    fn dates_must_be_zero_padded_four_digit_years() {
        for raw in ["-5000-01-01", "+12345-01-01", "2024-1-1", "0000-01-01", "2024-02-30", "20240101"] {
            let mut errors = FieldErrors::default();
            assert_eq!(parse_date(raw, &mut errors), None, "{raw}");
            assert!(!errors.is_empty(), "{raw}");
        }

        let mut errors = FieldErrors::default();
        assert_eq!(
            parse_date("9999-12-31", &mut errors),
            NaiveDate::from_ymd_opt(9999, 12, 31)
        );
        assert_eq!(
            parse_date("0001-01-01", &mut errors),
            NaiveDate::from_ymd_opt(1, 1, 1)
        );
        assert!(errors.is_empty());
    }

    #[test]
    fn description_with_nul_is_rejected() {
        let errors = field_errors(
            new_transaction(payload(json!({
                "type": "income", "amount": 1, "date": "2024-01-01", "description": "a\0b"
            })))
            .unwrap_err(),
        );
        assert!(errors.contains_key("description"));

        let errors = field_errors(transaction_changes(payload(json!({"description": "\0"}))).unwrap_err());
        assert!(errors.contains_key("description"));
    }

    #[test]
    fn rejects_amount_overflowing_column() {
        let errors = field_errors(
            new_transaction(payload(json!({"type": "income", "amount": "100000000", "date": "2024-01-01"})))
                .unwrap_err(),
        );
        assert_eq!(errors.get("amount").map(String::as_str), Some("is too large"));
    }

    #[test]
    fn update_with_only_description() {
        let changes = transaction_changes(payload(json!({"description": "groceries"}))).unwrap();
        assert_eq!(
            changes,
            TransactionChanges {
                description: Some(Some("groceries".into())),
                ..Default::default()
            }
        );
    }

    #[test]
    fn update_with_zero_amount_is_rejected_not_ignored() {
        let errors = field_errors(transaction_changes(payload(json!({"amount": 0}))).unwrap_err());
        assert_eq!(errors.get("amount").map(String::as_str), Some("must be greater than zero"));
    }

    #[test]
    fn update_with_null_amount_is_no_change() {
        let changes = transaction_changes(payload(json!({"amount": null}))).unwrap();
        assert!(changes.is_empty());
    }

    #[test]
    fn update_with_empty_description_clears_it() {
        let changes = transaction_changes(payload(json!({"description": ""}))).unwrap();
        assert_eq!(changes.description, Some(None));
    }
}
