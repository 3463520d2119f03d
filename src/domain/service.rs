use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Bookable service offered by a merchant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Service {
    pub id: i32,
    pub merchant_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub duration_minutes: i32,
    /// Preparation time reserved before the service starts.
    pub padding_before_minutes: i32,
    /// Clean-up time reserved after the service ends.
    pub padding_after_minutes: i32,
    pub price_cents: i64,
    /// Tax rate in basis points (1000 = 10%).
    pub tax_rate_bps: i32,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewService {
    pub merchant_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub duration_minutes: i32,
    pub padding_before_minutes: i32,
    pub padding_after_minutes: i32,
    pub price_cents: i64,
    pub tax_rate_bps: i32,
}

impl NewService {
    pub fn new(
        merchant_id: i32,
        name: impl Into<String>,
        duration_minutes: i32,
        price_cents: i64,
    ) -> Self {
        Self {
            merchant_id,
            name: name.into(),
            description: None,
            category: None,
            duration_minutes,
            padding_before_minutes: 0,
            padding_after_minutes: 0,
            price_cents,
            tax_rate_bps: 0,
        }
    }

    pub fn with_padding(mut self, before: i32, after: i32) -> Self {
        self.padding_before_minutes = before;
        self.padding_after_minutes = after;
        self
    }

    pub fn with_tax_rate_bps(mut self, tax_rate_bps: i32) -> Self {
        self.tax_rate_bps = tax_rate_bps;
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

/// Patch applied to an existing service. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateService {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub duration_minutes: Option<i32>,
    pub padding_before_minutes: Option<i32>,
    pub padding_after_minutes: Option<i32>,
    pub price_cents: Option<i64>,
    pub tax_rate_bps: Option<i32>,
    pub is_active: Option<bool>,
    pub updated_at: Option<NaiveDateTime>,
}

/// Query definition used to list the catalog of a merchant.
#[derive(Debug, Clone)]
pub struct ServiceListQuery {
    pub merchant_id: i32,
    pub active_only: bool,
    pub category: Option<String>,
}

impl ServiceListQuery {
    pub fn new(merchant_id: i32) -> Self {
        Self {
            merchant_id,
            active_only: false,
            category: None,
        }
    }

    pub fn active(mut self) -> Self {
        self.active_only = true;
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}
