//! Caller-supplied scalar fields: raw strings in, validated values out.

use crate::error::InputError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Form fields exactly as received from the transport.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawInput {
    pub file_type_encoded: Option<String>,
    pub downloads_mb: Option<String>,
    pub uploads_mb: Option<String>,
    pub login_hour: Option<String>,
    pub access_frequency: Option<String>,
}

/// Validated caller input. `login_hour` is guaranteed to be in 0..=23.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UserInput {
    pub file_type_encoded: i64,
    pub downloads_mb: f64,
    pub uploads_mb: f64,
    pub login_hour: u8,
    pub access_frequency: u64,
}

fn field<T: FromStr>(value: Option<&str>, name: &'static str) -> Result<T, InputError> {
    value
        .map(str::trim)
        .and_then(|v| v.parse().ok())
        .ok_or(InputError::InvalidField { field: name })
}

fn volume(value: Option<&str>, name: &'static str) -> Result<f64, InputError> {
    let mb: f64 = field(value, name)?;
    if !mb.is_finite() || mb < 0.0 {
        return Err(InputError::InvalidField { field: name });
    }
    Ok(mb)
}

/// Any well-formed integer is a valid hour token; magnitudes beyond `i64` saturate so
/// they still fail the range check rather than the parse.
fn hour(value: Option<&str>) -> Result<i64, InputError> {
    let invalid = InputError::InvalidField { field: "login_hour" };
    let v = value.map(str::trim).ok_or(invalid.clone())?;
    if let Ok(h) = v.parse::<i64>() {
        return Ok(h);
    }
    let (negative, digits) = match v.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, v.strip_prefix('+').unwrap_or(v)),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid);
    }
    Ok(if negative { i64::MIN } else { i64::MAX })
}

impl RawInput {
    /// Parse every field, then range-check the login hour.
    pub fn parse(&self) -> Result<UserInput, InputError> {
        let file_type_encoded = field(self.file_type_encoded.as_deref(), "file_type_encoded")?;
        let downloads_mb = volume(self.downloads_mb.as_deref(), "downloads_mb")?;
        let uploads_mb = volume(self.uploads_mb.as_deref(), "uploads_mb")?;
        let login_hour = hour(self.login_hour.as_deref())?;
        let access_frequency = field(self.access_frequency.as_deref(), "access_frequency")?;

        if !(0..=23).contains(&login_hour) {
            return Err(InputError::LoginHourOutOfRange(login_hour));
        }

        Ok(UserInput {
            file_type_encoded,
            downloads_mb,
            uploads_mb,
            login_hour: login_hour as u8,
            access_frequency,
        })
    }
}
