use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::pin::is_valid_pin;

/// Errors raised while reading authentication payloads.
#[derive(Debug, Error)]
pub enum AuthFormError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("PIN must be 4 to 8 digits")]
    InvalidPin,
    #[error("action is required")]
    EmptyAction,
}

pub type AuthFormResult<T> = Result<T, AuthFormError>;

#[derive(Debug, Deserialize, Validate)]
pub struct LoginForm {
    #[validate(length(min = 1, max = 128))]
    pub username: String,
    #[validate(length(min = 1, max = 256))]
    pub password: String,
}

impl LoginForm {
    /// Validated credentials with a trimmed username.
    pub fn into_credentials(self) -> AuthFormResult<(String, String)> {
        self.validate()?;
        Ok((self.username.trim().to_string(), self.password))
    }
}

/// PIN check guarding a terminal action.
#[derive(Debug, Deserialize, Validate)]
pub struct VerifyPinForm {
    pub staff_id: i32,
    pub pin: String,
    #[validate(length(min = 1, max = 64))]
    pub action: String,
    pub resource_id: Option<String>,
}

/// Validated PIN verification request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinVerification {
    pub staff_id: i32,
    pub pin: String,
    pub action: String,
    pub resource_id: Option<String>,
}

impl VerifyPinForm {
    pub fn into_verification(self) -> AuthFormResult<PinVerification> {
        self.validate()?;
        let action = self.action.trim().to_string();
        if action.is_empty() {
            return Err(AuthFormError::EmptyAction);
        }
        let pin = self.pin.trim().to_string();
        if !is_valid_pin(&pin) {
            return Err(AuthFormError::InvalidPin);
        }
        Ok(PinVerification {
            staff_id: self.staff_id,
            pin,
            action,
            resource_id: self
                .resource_id
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty()),
        })
    }
}

/// Payload of `POST /v1/auth/unlock` and `PUT /v1/staff/{id}/pin`.
#[derive(Debug, Deserialize)]
pub struct PinForm {
    pub pin: String,
}

impl PinForm {
    pub fn into_pin(self) -> AuthFormResult<String> {
        let pin = self.pin.trim().to_string();
        if !is_valid_pin(&pin) {
            return Err(AuthFormError::InvalidPin);
        }
        Ok(pin)
    }
}
