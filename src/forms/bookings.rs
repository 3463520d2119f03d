use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidateEmail, ValidationErrors};

use crate::domain::booking::{BookingListQuery, BookingStatus};
use crate::domain::invoice::MAX_AMOUNT_CENTS;
use crate::forms::{
    deserialize_instant, deserialize_optional_instant, optional_inline, optional_multiline,
    parse_date, sanitize_inline_text,
};

#[derive(Debug, Error)]
pub enum BookingFormError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("At least one service is required")]
    NoServices,
    #[error("An override reason is required when overriding conflicts")]
    MissingOverrideReason,
    #[error("unknown booking status `{0}`")]
    InvalidStatus(String),
    #[error("invalid date `{0}`")]
    InvalidDate(String),
    #[error("Customer email or phone is required")]
    MissingContact,
    #[error("Customer first name is required")]
    MissingCustomerName,
    #[error("invalid email `{0}`")]
    InvalidEmail(String),
}

pub type BookingFormResult<T> = Result<T, BookingFormError>;

/// One requested service, optionally with its own staff, duration and price.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BookingServiceForm {
    pub service_id: i32,
    pub staff_id: Option<i32>,
    #[validate(range(min = 5, max = 720))]
    pub duration_minutes: Option<i32>,
    #[validate(range(min = 0, max = MAX_AMOUNT_CENTS))]
    pub price_cents: Option<i64>,
}

/// Validated booking request before services are resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingRequest {
    pub customer_id: i32,
    pub services: Vec<ServiceRequest>,
    pub staff_id: Option<i32>,
    pub start_time: NaiveDateTime,
    pub location_id: Option<i32>,
    pub notes: Option<String>,
    pub is_override: bool,
    pub override_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceRequest {
    pub service_id: i32,
    pub staff_id: Option<i32>,
    pub duration_minutes: Option<i32>,
    pub price_cents: Option<i64>,
}

impl From<BookingServiceForm> for ServiceRequest {
    fn from(form: BookingServiceForm) -> Self {
        Self {
            service_id: form.service_id,
            staff_id: form.staff_id,
            duration_minutes: form.duration_minutes,
            price_cents: form.price_cents,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateBookingForm {
    pub customer_id: i32,
    #[validate(nested)]
    pub services: Vec<BookingServiceForm>,
    pub staff_id: Option<i32>,
    #[serde(deserialize_with = "deserialize_instant")]
    pub start_time: NaiveDateTime,
    pub location_id: Option<i32>,
    #[validate(length(max = 4096))]
    pub notes: Option<String>,
    #[serde(default)]
    pub is_override: bool,
    #[validate(length(max = 512))]
    pub override_reason: Option<String>,
}

impl CreateBookingForm {
    pub fn into_request(self) -> BookingFormResult<BookingRequest> {
        self.validate()?;
        if self.services.is_empty() {
            return Err(BookingFormError::NoServices);
        }
        let override_reason = optional_inline(self.override_reason.as_deref());
        if self.is_override && override_reason.is_none() {
            return Err(BookingFormError::MissingOverrideReason);
        }

        Ok(BookingRequest {
            customer_id: self.customer_id,
            services: self.services.into_iter().map(ServiceRequest::from).collect(),
            staff_id: self.staff_id,
            start_time: self.start_time,
            location_id: self.location_id,
            notes: optional_multiline(self.notes.as_deref()),
            is_override: self.is_override,
            override_reason,
        })
    }
}

/// Changes to an existing booking. Absent fields stay as they are.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateBookingForm {
    #[serde(default, deserialize_with = "deserialize_optional_instant")]
    pub start_time: Option<NaiveDateTime>,
    pub staff_id: Option<i32>,
    pub customer_id: Option<i32>,
    pub location_id: Option<i32>,
    #[validate(length(max = 4096))]
    pub notes: Option<String>,
    pub is_override: Option<bool>,
    #[validate(length(max = 512))]
    pub override_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingChanges {
    pub start_time: Option<NaiveDateTime>,
    pub staff_id: Option<i32>,
    pub customer_id: Option<i32>,
    pub location_id: Option<i32>,
    /// `Some("")` clears the notes.
    pub notes: Option<String>,
    pub is_override: bool,
    pub override_reason: Option<String>,
}

impl BookingChanges {
    pub fn reschedules(&self) -> bool {
        self.start_time.is_some() || self.staff_id.is_some()
    }
}

impl UpdateBookingForm {
    pub fn into_changes(self) -> BookingFormResult<BookingChanges> {
        self.validate()?;
        let is_override = self.is_override.unwrap_or(false);
        let override_reason = optional_inline(self.override_reason.as_deref());
        if is_override && override_reason.is_none() {
            return Err(BookingFormError::MissingOverrideReason);
        }
        Ok(BookingChanges {
            start_time: self.start_time,
            staff_id: self.staff_id,
            customer_id: self.customer_id,
            location_id: self.location_id,
            notes: self
                .notes
                .as_deref()
                .map(|notes| optional_multiline(Some(notes)).unwrap_or_default()),
            is_override,
            override_reason,
        })
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct CancelBookingForm {
    #[validate(length(max = 512))]
    pub reason: Option<String>,
}

impl CancelBookingForm {
    pub fn into_reason(self) -> BookingFormResult<Option<String>> {
        self.validate()?;
        Ok(optional_inline(self.reason.as_deref()))
    }
}

/// `GET /v1/bookings` filters.
#[derive(Debug, Default, Deserialize)]
pub struct BookingQueryParams {
    #[serde(default, deserialize_with = "deserialize_optional_instant")]
    pub from: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "deserialize_optional_instant")]
    pub to: Option<NaiveDateTime>,
    pub staff_id: Option<i32>,
    pub customer_id: Option<i32>,
    pub status: Option<String>,
    pub page: Option<usize>,
}

impl BookingQueryParams {
    pub fn into_query(self, merchant_id: i32, per_page: usize) -> BookingFormResult<BookingListQuery> {
        let mut query = BookingListQuery::new(merchant_id);
        query.from = self.from;
        query.to = self.to;
        query.staff_id = self.staff_id;
        query.customer_id = self.customer_id;
        if let Some(status) = self.status.as_deref().filter(|value| !value.trim().is_empty()) {
            let parsed = status
                .parse::<BookingStatus>()
                .map_err(|_| BookingFormError::InvalidStatus(status.to_string()))?;
            query = query.status(parsed);
        }
        Ok(query.paginate(self.page.unwrap_or(1).max(1), per_page))
    }
}

/// `GET /v1/bookings/calendar` query.
#[derive(Debug, Deserialize)]
pub struct CalendarQueryParams {
    pub date: String,
    pub staff_id: Option<i32>,
}

impl CalendarQueryParams {
    pub fn local_date(&self) -> BookingFormResult<NaiveDate> {
        parse_date(&self.date).ok_or_else(|| BookingFormError::InvalidDate(self.date.clone()))
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PublicCustomerForm {
    #[validate(length(max = 64))]
    pub first_name: String,
    #[validate(length(max = 64))]
    pub last_name: Option<String>,
    pub email: Option<String>,
    #[validate(length(max = 32))]
    pub phone: Option<String>,
}

/// Contact details of a customer booking through the public API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicCustomer {
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct PublicBookingForm {
    pub service_id: i32,
    pub staff_id: Option<i32>,
    #[serde(deserialize_with = "deserialize_instant")]
    pub start_time: NaiveDateTime,
    #[validate(nested)]
    pub customer: PublicCustomerForm,
    #[validate(length(max = 4096))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicBookingRequest {
    pub service_id: i32,
    pub staff_id: Option<i32>,
    pub start_time: NaiveDateTime,
    pub customer: PublicCustomer,
    pub notes: Option<String>,
}

impl PublicBookingForm {
    pub fn into_request(self) -> BookingFormResult<PublicBookingRequest> {
        self.validate()?;
        let first_name = sanitize_inline_text(&self.customer.first_name);
        if first_name.is_empty() {
            return Err(BookingFormError::MissingCustomerName);
        }
        let email = self
            .customer
            .email
            .as_deref()
            .map(|email| email.trim().to_lowercase())
            .filter(|email| !email.is_empty());
        if let Some(email) = email.as_ref().filter(|email| !email.validate_email()) {
            return Err(BookingFormError::InvalidEmail(email.clone()));
        }
        let phone = optional_inline(self.customer.phone.as_deref());
        if email.is_none() && phone.is_none() {
            return Err(BookingFormError::MissingContact);
        }

        Ok(PublicBookingRequest {
            service_id: self.service_id,
            staff_id: self.staff_id,
            start_time: self.start_time,
            customer: PublicCustomer {
                first_name,
                last_name: optional_inline(self.customer.last_name.as_deref()),
                email,
                phone,
            },
            notes: optional_multiline(self.notes.as_deref()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn create_form_requires_services() {
        let form: CreateBookingForm = serde_json::from_value(json!({
            "customer_id": 1,
            "services": [],
            "start_time": "2025-03-03T09:00:00+11:00"
        }))
        .unwrap();
        assert!(matches!(form.into_request(), Err(BookingFormError::NoServices)));
    }

    #[test]
    fn create_form_converts_offsets_to_utc() {
        let form: CreateBookingForm = serde_json::from_value(json!({
            "customer_id": 1,
            "services": [{"service_id": 4, "duration_minutes": 45}],
            "start_time": "2025-03-03T09:00:00+11:00",
            "notes": "  "
        }))
        .unwrap();
        let request = form.into_request().unwrap();
        assert_eq!(request.start_time.to_string(), "2025-03-02 22:00:00");
        assert_eq!(request.services[0].duration_minutes, Some(45));
        assert_eq!(request.notes, None);
        assert!(!request.is_override);
    }

    #[test]
    fn override_needs_reason() {
        let form: CreateBookingForm = serde_json::from_value(json!({
            "customer_id": 1,
            "services": [{"service_id": 4}],
            "start_time": "2025-03-03T09:00:00Z",
            "is_override": true
        }))
        .unwrap();
        assert!(matches!(
            form.into_request(),
            Err(BookingFormError::MissingOverrideReason)
        ));
    }

    #[test]
    fn invalid_item_duration_is_rejected() {
        let form: CreateBookingForm = serde_json::from_value(json!({
            "customer_id": 1,
            "services": [{"service_id": 4, "duration_minutes": 1}],
            "start_time": "2025-03-03T09:00:00Z"
        }))
        .unwrap();
        assert!(matches!(
            form.into_request(),
            Err(BookingFormError::Validation(_))
        ));
    }

    #[test]
    fn public_form_needs_contact() {
        let form: PublicBookingForm = serde_json::from_value(json!({
            "service_id": 2,
            "start_time": "2025-03-03T09:00:00Z",
            "customer": {"first_name": "Ivy"}
        }))
        .unwrap();
        assert!(matches!(
            form.into_request(),
            Err(BookingFormError::MissingContact)
        ));

        let form: PublicBookingForm = serde_json::from_value(json!({
            "service_id": 2,
            "start_time": "2025-03-03T09:00:00Z",
            "customer": {"first_name": "Ivy", "email": "IVY@Mail.test"}
        }))
        .unwrap();
        let request = form.into_request().unwrap();
        assert_eq!(request.customer.email.as_deref(), Some("ivy@mail.test"));
    }

    #[test]
    fn list_params_parse_status() {
        let params = BookingQueryParams {
            status: Some("no-show".into()),
            page: Some(0),
            ..Default::default()
        };
        let query = params.into_query(3, 20).unwrap();
        assert_eq!(query.status, Some(BookingStatus::NoShow));
        assert_eq!(query.pagination.map(|p| p.page), Some(1));

        let params = BookingQueryParams {
            status: Some("lost".into()),
            ..Default::default()
        };
        assert!(params.into_query(3, 20).is_err());
    }

    #[test]
    fn update_form_reports_rescheduling() {
        let changes = UpdateBookingForm {
            notes: Some("  ".into()),
            ..Default::default()
        }
        .into_changes()
        .unwrap();
        assert!(!changes.reschedules());
        assert_eq!(changes.notes.as_deref(), Some(""));

        let changes = UpdateBookingForm {
            staff_id: Some(8),
            ..Default::default()
        }
        .into_changes()
        .unwrap();
        assert!(changes.reschedules());
    }
}
