use std::collections::HashMap;
use std::str::FromStr;

use rust_decimal::Decimal;

use crate::error::ApiError;

/// Field map produced by the external bill-extraction service. Keys are
/// free-form; the constants below are the ones the application interprets.
pub type ExtractedFields = HashMap<String, String>;

/// Candidate amount fields, tried in priority order: the INR-converted
/// amount wins over the raw one.
pub const AMOUNT_FIELDS: [&str; 3] = ["Bill Amount (INR)", "Bill Amount", "total"];

pub const DATE_FIELDS: [&str; 2] = ["Date", "date"];

pub const CATEGORY_FIELD: &str = "Bill Type";

pub const FALLBACK_CATEGORY: &str = "Other";

/// Monetary amount of a record. The first candidate field holding a
/// non-blank value is stripped of currency symbols and separators and
/// parsed; absent or unparseable values yield zero so one malformed record
/// never aborts aggregation over a whole collection.
pub fn extract_amount(fields: &ExtractedFields) -> Decimal {
    AMOUNT_FIELDS
        .iter()
        .find_map(|key| fields.get(*key).map(|v| v.trim()).filter(|v| !v.is_empty()))
        .map(parse_amount)
        .unwrap_or(Decimal::ZERO)
}

fn parse_amount(raw: &str) -> Decimal {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    Decimal::from_str(&cleaned).unwrap_or(Decimal::ZERO)
}

/// Category label for the breakdown chart; blank or missing "Bill Type"
/// falls back to "Other".
pub fn category(fields: &ExtractedFields) -> String {
    fields
        .get(CATEGORY_FIELD)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .unwrap_or(FALLBACK_CATEGORY)
        .to_string()
}

/// Submission-time validation: a bill must carry a date and an amount the
/// parser can read. Everything else the extractor produced is stored as-is.
pub fn validate(fields: &ExtractedFields) -> Result<(), ApiError> {
    if !DATE_FIELDS.iter().any(|key| fields.contains_key(*key)) {
        return Err(ApiError::Validation(
            "Invalid extracted data: Missing required field: Date".to_string(),
        ));
    }

    let has_amount_field = AMOUNT_FIELDS
        .iter()
        .any(|key| fields.get(*key).is_some_and(|v| !v.trim().is_empty()));
    if !has_amount_field {
        return Err(ApiError::Validation(
            "Invalid extracted data: Missing required field: Bill Amount".to_string(),
        ));
    }

    let parseable = AMOUNT_FIELDS.iter().any(|key| {
        fields.get(*key).is_some_and(|v| {
            let cleaned: String = v
                .chars()
                .filter(|c| c.is_ascii_digit() || *c == '.')
                .collect();
            Decimal::from_str(&cleaned).is_ok()
        })
    });
    if !parseable {
        return Err(ApiError::Validation(
            "Invalid extracted data: Bill Amount must contain a valid number".to_string(),
        ));
    }

    Ok(())
}
