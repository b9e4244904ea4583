//! Request parameter checks. Everything here runs before any provider is contacted.

use crate::error::ApiError;
use crate::query::is_airport_code;
use chrono::NaiveDate;

/// Treat blank parameters the same as absent ones
pub fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Fail with a message listing every missing parameter by name
pub fn require_all<'a>(params: &[(&'static str, Option<&'a str>)]) -> Result<(), ApiError> {
    let missing: Vec<&str> = params
        .iter()
        .filter(|(_, v)| v.is_none())
        .map(|(name, _)| *name)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ApiError::InvalidInput(format!(
            "Missing required parameters: {}",
            missing.join(", ")
        )))
    }
}

pub fn airport_code(name: &str, value: &str) -> Result<String, ApiError> {
    if is_airport_code(value) {
        Ok(value.to_string())
    } else {
        Err(ApiError::InvalidInput(format!(
            "Invalid airport code for '{}': expected a 3-letter uppercase IATA code (e.g. JFK)",
            name
        )))
    }
}

fn is_date_shaped(value: &str) -> bool {
    let b = value.as_bytes();
    b.len() == 10
        && b[4] == b'-'
        && b[7] == b'-'
        && b.iter()
            .enumerate()
            .all(|(i, c)| i == 4 || i == 7 || c.is_ascii_digit())
}

/// `YYYY-MM-DD` that is also a real calendar day
pub fn date(name: &str, value: &str) -> Result<String, ApiError> {
    if is_date_shaped(value) && NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok() {
        Ok(value.to_string())
    } else {
        Err(ApiError::InvalidInput(format!(
            "Invalid date for '{}': expected format YYYY-MM-DD",
            name
        )))
    }
}

pub fn adults(value: Option<&str>) -> Result<u8, ApiError> {
    let value = value.unwrap_or("1");
    match value.parse::<u8>() {
        Ok(n) if (1..=9).contains(&n) => Ok(n),
        _ => Err(ApiError::InvalidInput(
            "Invalid value for 'adults': expected a number between 1 and 9".to_string(),
        )),
    }
}

pub fn currency(value: Option<&str>) -> Result<String, ApiError> {
    let value = value.unwrap_or("USD");
    if value.len() == 3 && value.bytes().all(|b| b.is_ascii_uppercase()) {
        Ok(value.to_string())
    } else {
        Err(ApiError::InvalidInput(
            "Invalid currency: expected a 3-letter uppercase ISO code (e.g. USD)".to_string(),
        ))
    }
}
