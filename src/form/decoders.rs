//! Fixed decoders used by `FormField`s. Each one takes the raw input as the
//! user typed it and returns the validated value or a display message.

use chrono::{NaiveDate, NaiveTime};

pub const MIN_OTHER_HAZARD_ENERGY_LEVEL: f64 = 500.0;

pub fn decode_required_text(raw: &String) -> Result<String, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err("This field is required".to_string());
    }
    Ok(trimmed.to_string())
}

pub fn decode_optional_text(raw: &String) -> Result<Option<String>, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        Ok(None)
    } else {
        Ok(Some(trimmed.to_string()))
    }
}

pub fn decode_date(raw: &String) -> Result<NaiveDate, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err("Observation date is required".to_string());
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map_err(|_| "Observation date must use YYYY-MM-DD".to_string())
}

pub fn decode_time(raw: &String) -> Result<NaiveTime, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err("Observation time is required".to_string());
    }
    NaiveTime::parse_from_str(trimmed, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
        .map_err(|_| "Observation time must use HH:MM".to_string())
}

/// Blank is "not entered"; anything else must be a non-negative number.
pub fn decode_energy_level(raw: &String) -> Result<Option<f64>, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => Ok(Some(value)),
        _ => Err("Energy level must be a positive number".to_string()),
    }
}

pub fn energy_level_validation(raw: &str) -> bool {
    raw.trim()
        .parse::<f64>()
        .map(|value| value.is_finite() && value >= MIN_OTHER_HAZARD_ENERGY_LEVEL)
        .unwrap_or(false)
}

fn decode_coordinate(raw: &str, limit: f64, label: &str) -> Result<Option<f64>, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() && value.abs() <= limit => Ok(Some(value)),
        _ => Err(format!("{label} must be a number between -{limit} and {limit}")),
    }
}

pub fn decode_latitude(raw: &String) -> Result<Option<f64>, String> {
    decode_coordinate(raw, 90.0, "Latitude")
}

pub fn decode_longitude(raw: &String) -> Result<Option<f64>, String> {
    decode_coordinate(raw, 180.0, "Longitude")
}
