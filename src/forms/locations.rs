use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::location::{NewLocation, UpdateLocation};
use crate::forms::{optional_inline, sanitize_inline_text};

const NAME_MAX_LEN: u64 = 128;

#[derive(Debug, Error)]
pub enum LocationFormError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("location name cannot be empty")]
    EmptyName,
}

pub type LocationFormResult<T> = Result<T, LocationFormError>;

#[derive(Debug, Deserialize, Validate)]
pub struct AddLocationForm {
    #[validate(length(min = 1, max = NAME_MAX_LEN))]
    pub name: String,
    #[validate(length(max = 512))]
    pub address: Option<String>,
    #[validate(length(max = 32))]
    pub phone: Option<String>,
}

impl AddLocationForm {
    pub fn into_new_location(self, merchant_id: i32) -> LocationFormResult<NewLocation> {
        self.validate()?;
        let name = sanitize_inline_text(&self.name);
        if name.is_empty() {
            return Err(LocationFormError::EmptyName);
        }
        let mut location = NewLocation::new(merchant_id, name);
        location.address = optional_inline(self.address.as_deref());
        location.phone = optional_inline(self.phone.as_deref());
        Ok(location)
    }
}

/// Patch for a location. Empty `address`/`phone` clear the value.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct EditLocationForm {
    #[validate(length(min = 1, max = NAME_MAX_LEN))]
    pub name: Option<String>,
    #[validate(length(max = 512))]
    pub address: Option<String>,
    #[validate(length(max = 32))]
    pub phone: Option<String>,
    pub is_active: Option<bool>,
}

impl EditLocationForm {
    pub fn into_update_location(self) -> LocationFormResult<UpdateLocation> {
        self.validate()?;
        let name = match self.name {
            Some(name) => {
                let name = sanitize_inline_text(&name);
                if name.is_empty() {
                    return Err(LocationFormError::EmptyName);
                }
                Some(name)
            }
            None => None,
        };
        Ok(UpdateLocation {
            name,
            address: self.address.as_deref().map(sanitize_inline_text),
            phone: self.phone.as_deref().map(sanitize_inline_text),
            is_active: self.is_active,
            updated_at: None,
        })
    }
}
