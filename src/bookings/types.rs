use serde::Deserialize;
use serde_json::Value;

use crate::shared::AppError;
use crate::store::Fields;

/// Request payload for creating a booking.
/// `email` is required; every other field is stored as sent.
#[derive(Debug, Deserialize)]
pub struct NewBooking {
    pub email: String,
    #[serde(flatten)]
    pub details: Fields,
}

impl NewBooking {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.email.trim().is_empty() {
            return Err(AppError::Validation("email must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn into_fields(self) -> Fields {
        let mut fields = self.details;
        fields.insert("email".to_string(), Value::String(self.email));
        fields
    }
}

/// Request payload for `PATCH /bookings/:id`; only the status is writable
#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: String,
}

impl StatusUpdate {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.status.trim().is_empty() {
            return Err(AppError::Validation("status must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn into_fields(self) -> Fields {
        let mut fields = Fields::new();
        fields.insert("status".to_string(), Value::String(self.status));
        fields
    }
}

/// Query string for `GET /bookings`
#[derive(Debug, Default, Deserialize)]
pub struct BookingQuery {
    pub email: Option<String>,
}

impl BookingQuery {
    /// The email filter, if one was given; `?email=` counts as none
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref().filter(|email| !email.is_empty())
    }
}
