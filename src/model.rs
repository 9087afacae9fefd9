//! Data model shared by the sampler, evaluator, store and HTTP layer.

use serde::{Deserialize, Serialize};

use crate::error::SettingsError;

/// Timestamp carried by the shared reading while the wall clock is unknown.
pub const UNKNOWN_TIMESTAMP: &str = "unknown";

/// Wall-clock rendering used for readings and stored rows.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Maximum stored length of the alert recipient.
pub const PHONE_CAPACITY: usize = 20;

/// Phone number in a fixed-capacity buffer (no heap).
pub type PhoneNumber = heapless::String<PHONE_CAPACITY>;

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

/// One value per sensor channel.
///
/// The "current" instance lives in the application context and is
/// overwritten in place by the sampler.  A channel whose read fails keeps
/// its previous value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Reading {
    pub timestamp: String,
    pub temperature: f32,
    pub humidity: f32,
    pub weight: f32,
    pub air_quality: i32,
}

impl Default for Reading {
    fn default() -> Self {
        Self {
            timestamp: UNKNOWN_TIMESTAMP.to_string(),
            temperature: 0.0,
            humidity: 0.0,
            weight: 0.0,
            air_quality: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// The singleton alert settings record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// SMS recipient.  Empty means "not configured".
    pub phone_number: PhoneNumber,
    pub limit_temp: f32,
    pub limit_humidity: f32,
    pub limit_weight: f32,
    pub limit_air: i32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            phone_number: PhoneNumber::new(),
            limit_temp: 40.0,
            limit_humidity: 80.0,
            limit_weight: 100.0,
            limit_air: 400,
        }
    }
}

impl Settings {
    /// Build and validate settings from raw field values.
    pub fn new(
        phone: &str,
        limit_temp: f32,
        limit_humidity: f32,
        limit_weight: f32,
        limit_air: i32,
    ) -> Result<Self, SettingsError> {
        let settings = Self {
            phone_number: parse_phone(phone)?,
            limit_temp,
            limit_humidity,
            limit_weight,
            limit_air,
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Range-check every field.  Invalid values are rejected, never clamped.
    pub fn validate(&self) -> Result<(), SettingsError> {
        validate_phone(&self.phone_number)?;
        if !self.limit_temp.is_finite() {
            return Err(SettingsError::ValidationFailed("limit_temp must be a finite number"));
        }
        if !self.limit_humidity.is_finite() {
            return Err(SettingsError::ValidationFailed(
                "limit_humidity must be a finite number",
            ));
        }
        if !self.limit_weight.is_finite() {
            return Err(SettingsError::ValidationFailed("limit_weight must be a finite number"));
        }
        Ok(())
    }
}

/// Copy a phone number into its fixed-capacity buffer after validation.
pub fn parse_phone(raw: &str) -> Result<PhoneNumber, SettingsError> {
    let raw = raw.trim();
    validate_phone(raw)?;
    let mut phone = PhoneNumber::new();
    phone
        .push_str(raw)
        .map_err(|_| SettingsError::ValidationFailed("phone number longer than 20 characters"))?;
    Ok(phone)
}

fn validate_phone(phone: &str) -> Result<(), SettingsError> {
    if phone.len() > PHONE_CAPACITY {
        return Err(SettingsError::ValidationFailed("phone number longer than 20 characters"));
    }
    let digits = phone.strip_prefix('+').unwrap_or(phone);
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(SettingsError::ValidationFailed(
            "phone number must be digits with an optional leading '+'",
        ));
    }
    Ok(())
}
