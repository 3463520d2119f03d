use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::invoice::MAX_AMOUNT_CENTS;
use crate::domain::service::{NewService, UpdateService};
use crate::forms::{optional_inline, optional_multiline, sanitize_inline_text, sanitize_multiline_text};

const NAME_MAX_LEN: u64 = 128;

#[derive(Debug, Error)]
pub enum CatalogFormError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("service name cannot be empty")]
    EmptyName,
}

pub type CatalogFormResult<T> = Result<T, CatalogFormError>;

#[derive(Debug, Deserialize, Validate)]
pub struct AddServiceForm {
    #[validate(length(min = 1, max = NAME_MAX_LEN))]
    pub name: String,
    #[validate(length(max = 2048))]
    pub description: Option<String>,
    #[validate(length(max = 64))]
    pub category: Option<String>,
    #[validate(range(min = 5, max = 720))]
    pub duration_minutes: i32,
    #[validate(range(min = 0, max = 120))]
    pub padding_before_minutes: Option<i32>,
    #[validate(range(min = 0, max = 120))]
    pub padding_after_minutes: Option<i32>,
    #[validate(range(min = 0, max = MAX_AMOUNT_CENTS))]
    pub price_cents: i64,
    #[validate(range(min = 0, max = 10000))]
    pub tax_rate_bps: Option<i32>,
}

impl AddServiceForm {
    pub fn into_new_service(self, merchant_id: i32) -> CatalogFormResult<NewService> {
        self.validate()?;
        let name = sanitize_inline_text(&self.name);
        if name.is_empty() {
            return Err(CatalogFormError::EmptyName);
        }

        let mut service = NewService::new(merchant_id, name, self.duration_minutes, self.price_cents)
            .with_padding(
                self.padding_before_minutes.unwrap_or(0),
                self.padding_after_minutes.unwrap_or(0),
            )
            .with_tax_rate_bps(self.tax_rate_bps.unwrap_or(0));
        service.description = optional_multiline(self.description.as_deref());
        service.category = optional_inline(self.category.as_deref());
        Ok(service)
    }
}

/// Patch for a catalog entry. Empty `description`/`category` clear the value.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct EditServiceForm {
    #[validate(length(min = 1, max = NAME_MAX_LEN))]
    pub name: Option<String>,
    #[validate(length(max = 2048))]
    pub description: Option<String>,
    #[validate(length(max = 64))]
    pub category: Option<String>,
    #[validate(range(min = 5, max = 720))]
    pub duration_minutes: Option<i32>,
    #[validate(range(min = 0, max = 120))]
    pub padding_before_minutes: Option<i32>,
    #[validate(range(min = 0, max = 120))]
    pub padding_after_minutes: Option<i32>,
    #[validate(range(min = 0, max = MAX_AMOUNT_CENTS))]
    pub price_cents: Option<i64>,
    #[validate(range(min = 0, max = 10000))]
    pub tax_rate_bps: Option<i32>,
    pub is_active: Option<bool>,
}

impl EditServiceForm {
    pub fn into_update_service(self) -> CatalogFormResult<UpdateService> {
        self.validate()?;
        let name = match self.name.as_deref().map(sanitize_inline_text) {
            Some(name) if name.is_empty() => return Err(CatalogFormError::EmptyName),
            other => other,
        };

        Ok(UpdateService {
            name,
            description: self.description.as_deref().map(sanitize_multiline_text),
            category: self.category.as_deref().map(sanitize_inline_text),
            duration_minutes: self.duration_minutes,
            padding_before_minutes: self.padding_before_minutes,
            padding_after_minutes: self.padding_after_minutes,
            price_cents: self.price_cents,
            tax_rate_bps: self.tax_rate_bps,
            is_active: self.is_active,
            updated_at: None,
        })
    }
}

/// `GET /v1/services` filters.
#[derive(Debug, Default, Deserialize)]
pub struct ServiceQueryParams {
    pub category: Option<String>,
    pub active_only: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add_form() -> AddServiceForm {
        AddServiceForm {
            name: "  Cut &   Colour ".into(),
            description: Some("".into()),
            category: Some("Hair".into()),
            duration_minutes: 90,
            padding_before_minutes: None,
            padding_after_minutes: Some(15),
            price_cents: 12_000,
            tax_rate_bps: Some(1_000),
        }
    }

    #[test]
    fn add_form_builds_service() {
        let service = add_form().into_new_service(2).unwrap();
        assert_eq!(service.name, "Cut & Colour");
        assert_eq!(service.description, None);
        assert_eq!(service.category.as_deref(), Some("Hair"));
        assert_eq!(service.padding_before_minutes, 0);
        assert_eq!(service.padding_after_minutes, 15);
        assert_eq!(service.tax_rate_bps, 1_000);
    }

    #[test]
    fn add_form_enforces_ranges() {
        let mut form = add_form();
        form.duration_minutes = 4;
        assert!(form.into_new_service(2).is_err());

        let mut form = add_form();
        form.tax_rate_bps = Some(10_001);
        assert!(form.into_new_service(2).is_err());

        let mut form = add_form();
        form.price_cents = -1;
        assert!(form.into_new_service(2).is_err());
    }

    #[test]
    fn edit_form_keeps_clearing_values() {
        let form = EditServiceForm {
            category: Some(" ".into()),
            is_active: Some(false),
            ..Default::default()
        };
        let update = form.into_update_service().unwrap();
        assert_eq!(update.category.as_deref(), Some(""));
        assert_eq!(update.is_active, Some(false));
        assert_eq!(update.name, None);
    }
}
