//! Per-row validation rules.
//!
//! Rules run in a fixed order and stop at the first failure, so a row missing
//! both name and SKU always reports the name.

use crate::draft::DraftRecord;
use crate::error::ValidationError;

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Loose pre-filter used to pick upload candidates: name, price and SKU must
/// be non-blank. Looser than [`validate`] on purpose.
pub fn is_candidate(record: &DraftRecord) -> bool {
    !is_blank(&record.name) && !is_blank(&record.price) && !is_blank(&record.sku)
}

/// Checks one draft against the required-field and numeric-price rules.
pub fn validate(record: &DraftRecord) -> Result<(), ValidationError> {
    if is_blank(&record.name) {
        return Err(ValidationError::MissingName);
    }
    if is_blank(&record.price) {
        return Err(ValidationError::MissingPrice);
    }
    if is_blank(&record.sku) {
        return Err(ValidationError::MissingSku);
    }
    if is_blank(&record.description) {
        return Err(ValidationError::MissingDescription);
    }
    if is_blank(&record.short_description) {
        return Err(ValidationError::MissingShortDescription);
    }
    parse_price(&record.price)?;
    Ok(())
}

/// Parses a user-typed price. Only finite numbers are accepted.
pub fn parse_price(price: &str) -> Result<f64, ValidationError> {
    match price.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(ValidationError::InvalidPrice),
    }
}
