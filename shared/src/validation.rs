//! Declarative validation for submitted listings and corrections
//!
//! Each payload kind has a static table of field rules. A single generic
//! [`validate`] walks the table against the raw JSON payload, so type checks
//! (a `"yes"` where a boolean belongs) are caught before deserialization.
//! Every failing field is reported at once.

use serde_json::Value;
use std::borrow::Cow;
use validator::ValidationError;
pub use validator::ValidationErrors;

/// A single check applied to one payload field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Present, not null, and not blank when a string
    Required,
    /// String whose character count lies in `min..=max`
    Length { min: usize, max: usize },
    /// Well-formed email address
    Email,
    /// Well-formed absolute URL; blank strings are skipped
    Url,
    /// JSON boolean
    Boolean,
    /// JSON array of strings
    StringArray,
    /// JSON integer
    Integer,
}

/// The rules for one field, checked in order. The first failure wins.
#[derive(Debug, Clone, Copy)]
pub struct FieldRules {
    pub field: &'static str,
    pub rules: &'static [Rule],
}

const fn field(field: &'static str, rules: &'static [Rule]) -> FieldRules {
    FieldRules { field, rules }
}

pub const PHONE_LENGTH: Rule = Rule::Length { min: 10, max: 14 };
pub const ZIPCODE_LENGTH: Rule = Rule::Length { min: 5, max: 5 };

/// Public business submissions
pub static BUSINESS_RULES: &[FieldRules] = &[
    field("name", &[Rule::Required]),
    field("type", &[Rule::Required]),
    field("tags", &[Rule::StringArray]),
    field("phone", &[Rule::Required, PHONE_LENGTH]),
    field("email", &[Rule::Required, Rule::Email]),
    field("url", &[Rule::Url]),
    field("donateurl", &[Rule::Url]),
    field("address", &[Rule::Required]),
    field("city", &[Rule::Required]),
    field("state", &[Rule::Required]),
    field("zipcode", &[Rule::Required, ZIPCODE_LENGTH]),
    field("giftcard", &[Rule::Boolean]),
    field("takeout", &[Rule::Boolean]),
    field("delivery", &[Rule::Boolean]),
    field("closed", &[Rule::Boolean]),
];

/// Admin edits: a submission plus the target id and visibility flag
pub static BUSINESS_UPDATE_RULES: &[FieldRules] = &[
    field("id", &[Rule::Required, Rule::Integer]),
    field("active", &[Rule::Boolean]),
];

/// Proposed corrections
pub static CORRECTION_RULES: &[FieldRules] = &[
    field("business_id", &[Rule::Integer]),
    field("type", &[Rule::Required]),
    field("tags", &[Rule::StringArray]),
    field("url", &[Rule::Url]),
    field("donateurl", &[Rule::Url]),
    field("giftcard", &[Rule::Boolean]),
    field("takeout", &[Rule::Boolean]),
    field("delivery", &[Rule::Boolean]),
    field("closed", &[Rule::Boolean]),
];

/// Validate `payload` against every table in `tables`
pub fn validate(payload: &Value, tables: &[&[FieldRules]]) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let Some(object) = payload.as_object() else {
        errors.add("payload", error("object", "payload must be a JSON object"));
        return Err(errors);
    };

    for rules in tables.iter().flat_map(|table| table.iter()) {
        let value = object.get(rules.field).filter(|v| !v.is_null());
        if let Some(err) = check_field(value, rules.rules) {
            errors.add(rules.field, err);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate a public business submission
pub fn validate_business(payload: &Value) -> Result<(), ValidationErrors> {
    validate(payload, &[BUSINESS_RULES])
}

/// Validate an admin edit of an existing business
pub fn validate_business_update(payload: &Value) -> Result<(), ValidationErrors> {
    validate(payload, &[BUSINESS_RULES, BUSINESS_UPDATE_RULES])
}

/// Validate a proposed correction
pub fn validate_correction(payload: &Value) -> Result<(), ValidationErrors> {
    validate(payload, &[CORRECTION_RULES])
}

/// Names of the fields that failed, sorted
pub fn failed_fields(errors: &ValidationErrors) -> Vec<&'static str> {
    let mut fields: Vec<_> = errors.field_errors().into_keys().collect();
    fields.sort_unstable();
    fields
}

fn check_field(value: Option<&Value>, rules: &[Rule]) -> Option<ValidationError> {
    // null is treated as omitted
    let Some(value) = value.filter(|v| !v.is_null()) else {
        return rules
            .contains(&Rule::Required)
            .then(|| error("required", "field is required"));
    };

    rules.iter().find_map(|rule| check_rule(value, *rule))
}

fn check_rule(value: &Value, rule: Rule) -> Option<ValidationError> {
    match rule {
        Rule::Required => match value {
            Value::String(s) if s.trim().is_empty() => Some(error("required", "field is required")),
            _ => None,
        },
        Rule::Length { min, max } => {
            let Some(s) = value.as_str() else {
                return Some(error("type", "expected a string"));
            };
            let len = s.chars().count();
            if len < min || len > max {
                let mut err = error("length", &length_message(min, max));
                err.add_param(Cow::from("min"), &min);
                err.add_param(Cow::from("max"), &max);
                err.add_param(Cow::from("value"), &len);
                Some(err)
            } else {
                None
            }
        }
        Rule::Email => match value.as_str() {
            None => Some(error("type", "expected a string")),
            Some(s) if validator::validate_email(s) => None,
            Some(_) => Some(error("email", "invalid email address")),
        },
        Rule::Url => match value.as_str() {
            None => Some(error("type", "expected a string")),
            Some(s) if s.trim().is_empty() || validator::validate_url(s) => None,
            Some(_) => Some(error("url", "invalid absolute URL")),
        },
        Rule::Boolean => (!value.is_boolean()).then(|| error("type", "expected a boolean")),
        Rule::StringArray => match value.as_array() {
            Some(items) if items.iter().all(Value::is_string) => None,
            _ => Some(error("type", "expected an array of strings")),
        },
        Rule::Integer => (!(value.is_i64() || value.is_u64()))
            .then(|| error("type", "expected an integer")),
    }
}

fn length_message(min: usize, max: usize) -> String {
    if min == max {
        format!("must be exactly {} characters", min)
    } else {
        format!("must be between {} and {} characters", min, max)
    }
}

fn error(code: &'static str, message: &str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::from(message.to_string()));
    err
}
