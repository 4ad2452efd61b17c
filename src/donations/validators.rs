// src/donations/validators.rs

use super::models::*;
use crate::common::{ApiError, ValidationResult, Validator};
use chrono::{DateTime, NaiveDate};
use serde_json::Value;

pub const MIN_DONOR_NAME_LEN: usize = 2;
pub const MAX_DONOR_NAME_LEN: usize = 100;
pub const MAX_QUANTITY: f64 = 1_000_000.0;

// ============================================================================
// Donation Validators
// ============================================================================

/// All four fields required; every problem is reported, not just the first
pub struct CreateDonationValidator;

impl Validator<DonationInput> for CreateDonationValidator {
    type Output = NewDonation;

    fn validate(&self, data: &DonationInput) -> Result<NewDonation, ApiError> {
        let mut result = ValidationResult::new();

        let donor_name = required(
            &mut result,
            "donor_name",
            "Donor name",
            &data.donor_name,
            parse_donor_name,
        );
        let donation_type = required(
            &mut result,
            "donation_type",
            "Donation type",
            &data.donation_type,
            parse_donation_type,
        );
        let quantity = required(
            &mut result,
            "quantity",
            "Quantity",
            &data.quantity,
            parse_quantity,
        );
        let date = required(&mut result, "date", "Date", &data.date, parse_date);

        match (donor_name, donation_type, quantity, date) {
            (Some(donor_name), Some(donation_type), Some(quantity), Some(date))
                if result.is_valid =>
            {
                Ok(NewDonation {
                    donor_name,
                    donation_type,
                    quantity,
                    date,
                })
            }
            _ => Err(ApiError::from(result)),
        }
    }
}

/// Every field optional; rules apply only to the ones supplied
pub struct UpdateDonationValidator;

impl Validator<DonationInput> for UpdateDonationValidator {
    type Output = DonationPatch;

    fn validate(&self, data: &DonationInput) -> Result<DonationPatch, ApiError> {
        if data.is_empty() {
            return Err(ApiError::InvalidArgument("no fields supplied".to_string()));
        }

        let mut result = ValidationResult::new();
        let patch = DonationPatch {
            donor_name: optional(&mut result, "donor_name", &data.donor_name, parse_donor_name),
            donation_type: optional(
                &mut result,
                "donation_type",
                &data.donation_type,
                parse_donation_type,
            ),
            quantity: optional(&mut result, "quantity", &data.quantity, parse_quantity),
            date: optional(&mut result, "date", &data.date, parse_date),
        };

        if result.is_valid {
            Ok(patch)
        } else {
            Err(ApiError::from(result))
        }
    }
}

pub fn validate_create(input: &DonationInput) -> Result<NewDonation, ApiError> {
    CreateDonationValidator.validate(input)
}

pub fn validate_update(input: &DonationInput) -> Result<DonationPatch, ApiError> {
    UpdateDonationValidator.validate(input)
}

/// Rules the store re-checks on an already typed record before writing it
pub fn check_record(record: &NewDonation) -> ValidationResult {
    let mut result = ValidationResult::new();

    if let Err(message) = check_donor_name(&record.donor_name) {
        result.add_error("donor_name", message);
    }
    if let Err(message) = check_quantity(record.quantity) {
        result.add_error("quantity", message);
    }

    result
}

// ============================================================================
// Field Rules
// ============================================================================

fn check_donor_name(name: &str) -> Result<(), &'static str> {
    // SQLite's length() stops at the first NUL, so control characters never reach it
    if name.chars().any(char::is_control) {
        return Err("Donor name must not contain control characters");
    }
    let len = name.trim().chars().count();
    if !(MIN_DONOR_NAME_LEN..=MAX_DONOR_NAME_LEN).contains(&len) {
        return Err("Donor name must be between 2 and 100 characters");
    }
    Ok(())
}

fn check_quantity(quantity: f64) -> Result<(), &'static str> {
    if !quantity.is_finite() {
        return Err("Quantity must be a number");
    }
    if quantity <= 0.0 {
        return Err("Quantity must be greater than 0");
    }
    if quantity > MAX_QUANTITY {
        return Err("Quantity must not exceed 1000000");
    }
    Ok(())
}

fn parse_donor_name(value: &Value) -> Result<String, &'static str> {
    let name = value.as_str().ok_or("Donor name must be a string")?;
    check_donor_name(name)?;
    Ok(name.trim().to_string())
}

fn parse_donation_type(value: &Value) -> Result<DonationType, &'static str> {
    const MESSAGE: &str =
        "Donation type must be one of: money, food, clothing, toys, books, household, other";
    let raw = value.as_str().ok_or(MESSAGE)?;
    raw.trim().parse().map_err(|_| MESSAGE)
}

fn parse_quantity(value: &Value) -> Result<f64, &'static str> {
    let quantity = match value {
        Value::Number(n) => n.as_f64().ok_or("Quantity must be a number")?,
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| "Quantity must be a number")?,
        _ => return Err("Quantity must be a number"),
    };
    check_quantity(quantity)?;
    Ok(quantity)
}

fn parse_date(value: &Value) -> Result<NaiveDate, &'static str> {
    const MESSAGE: &str = "Date must be a valid ISO 8601 date";
    let raw = value.as_str().ok_or(MESSAGE)?.trim();

    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|ts| ts.date_naive()))
        .map_err(|_| MESSAGE)
}

// ============================================================================
// Helper Functions
// ============================================================================

fn required<T>(
    result: &mut ValidationResult,
    field: &str,
    label: &str,
    value: &Option<Value>,
    parse: fn(&Value) -> Result<T, &'static str>,
) -> Option<T> {
    match value {
        None => {
            result.add_error(field, &format!("{} is required", label));
            None
        }
        Some(_) => optional(result, field, value, parse),
    }
}

fn optional<T>(
    result: &mut ValidationResult,
    field: &str,
    value: &Option<Value>,
    parse: fn(&Value) -> Result<T, &'static str>,
) -> Option<T> {
    let value = value.as_ref()?;
    match parse(value) {
        Ok(parsed) => Some(parsed),
        Err(message) => {
            result.add_error(field, message);
            None
        }
    }
}
