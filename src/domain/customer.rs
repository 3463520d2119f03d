use chrono::NaiveDateTime;
use pushkind_common::pagination::Pagination;
use serde::{Deserialize, Serialize};

/// Lifecycle state of a customer record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomerStatus {
    Active,
    Deleted,
}

impl CustomerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CustomerStatus::Active => "active",
            CustomerStatus::Deleted => "deleted",
        }
    }

    pub fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("deleted") {
            CustomerStatus::Deleted
        } else {
            CustomerStatus::Active
        }
    }
}

/// Customer of a merchant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Customer {
    pub id: i32,
    pub merchant_id: i32,
    pub first_name: String,
    pub last_name: Option<String>,
    /// Lowercased email address.
    pub email: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,
    pub status: CustomerStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Customer {
    pub fn full_name(&self) -> String {
        match self.last_name.as_deref() {
            Some(last) if !last.is_empty() => format!("{} {}", self.first_name, last),
            _ => self.first_name.clone(),
        }
    }
}

/// Payload required to insert a new customer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCustomer {
    pub merchant_id: i32,
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,
}

impl NewCustomer {
    /// Build a customer payload with a trimmed first name.
    pub fn new(merchant_id: i32, first_name: impl Into<String>) -> Self {
        Self {
            merchant_id,
            first_name: first_name.into().trim().to_string(),
            last_name: None,
            email: None,
            phone: None,
            notes: None,
        }
    }

    pub fn with_last_name(mut self, last_name: impl Into<String>) -> Self {
        self.last_name = Some(last_name.into());
        self
    }

    /// Attach an email, normalised to lowercase.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into().trim().to_lowercase());
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into().trim().to_string());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Patch applied to an existing customer. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateCustomer {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,
    pub updated_at: Option<NaiveDateTime>,
}

/// Query definition used to list customers for a merchant.
#[derive(Debug, Clone)]
pub struct CustomerListQuery {
    pub merchant_id: i32,
    /// Case-insensitive substring matched against names, email and phone.
    pub search: Option<String>,
    pub pagination: Option<Pagination>,
}

impl CustomerListQuery {
    pub fn new(merchant_id: i32) -> Self {
        Self {
            merchant_id,
            search: None,
            pagination: None,
        }
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

/// Outcome of a bulk customer import.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct CustomerImportSummary {
    pub imported: usize,
    pub skipped: usize,
}
