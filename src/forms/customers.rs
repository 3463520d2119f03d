use std::io::{Read, Seek};

use actix_multipart::form::{MultipartForm, tempfile::TempFile};
use csv::{StringRecord, Trim};
use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidateEmail, ValidationErrors};

use crate::domain::customer::{NewCustomer, UpdateCustomer};
use crate::forms::{optional_inline, optional_multiline, sanitize_inline_text, sanitize_multiline_text};

const NAME_MAX_LEN: u64 = 64;

#[derive(Debug, Error)]
pub enum CustomerFormError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("first name cannot be empty")]
    EmptyName,
    #[error("invalid email `{0}`")]
    InvalidEmail(String),
}

pub type CustomerFormResult<T> = Result<T, CustomerFormError>;

#[derive(Debug, Deserialize, Validate)]
pub struct AddCustomerForm {
    #[validate(length(min = 1, max = NAME_MAX_LEN))]
    pub first_name: String,
    #[validate(length(max = NAME_MAX_LEN))]
    pub last_name: Option<String>,
    pub email: Option<String>,
    #[validate(length(max = 32))]
    pub phone: Option<String>,
    #[validate(length(max = 4096))]
    pub notes: Option<String>,
}

impl AddCustomerForm {
    pub fn into_new_customer(self, merchant_id: i32) -> CustomerFormResult<NewCustomer> {
        self.validate()?;
        let first_name = sanitize_inline_text(&self.first_name);
        if first_name.is_empty() {
            return Err(CustomerFormError::EmptyName);
        }

        let mut customer = NewCustomer::new(merchant_id, first_name);
        customer.last_name = optional_inline(self.last_name.as_deref());
        customer.email = normalize_email(self.email.as_deref())?.filter(|email| !email.is_empty());
        customer.phone = optional_inline(self.phone.as_deref());
        customer.notes = optional_multiline(self.notes.as_deref());
        Ok(customer)
    }
}

/// Patch for a customer. Empty optional strings clear the value.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct EditCustomerForm {
    #[validate(length(min = 1, max = NAME_MAX_LEN))]
    pub first_name: Option<String>,
    #[validate(length(max = NAME_MAX_LEN))]
    pub last_name: Option<String>,
    pub email: Option<String>,
    #[validate(length(max = 32))]
    pub phone: Option<String>,
    #[validate(length(max = 4096))]
    pub notes: Option<String>,
}

impl EditCustomerForm {
    pub fn into_update_customer(self) -> CustomerFormResult<UpdateCustomer> {
        self.validate()?;
        let first_name = match self.first_name.as_deref().map(sanitize_inline_text) {
            Some(name) if name.is_empty() => return Err(CustomerFormError::EmptyName),
            other => other,
        };

        Ok(UpdateCustomer {
            first_name,
            last_name: self.last_name.as_deref().map(sanitize_inline_text),
            email: normalize_email(self.email.as_deref())?,
            phone: self.phone.as_deref().map(sanitize_inline_text),
            notes: self.notes.as_deref().map(sanitize_multiline_text),
            updated_at: None,
        })
    }
}

fn normalize_email(raw: Option<&str>) -> CustomerFormResult<Option<String>> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let email = raw.trim().to_lowercase();
    if !email.is_empty() && !email.validate_email() {
        return Err(CustomerFormError::InvalidEmail(email));
    }
    Ok(Some(email))
}

/// `GET /v1/customers` query string.
#[derive(Debug, Default, Deserialize)]
pub struct CustomerQueryParams {
    pub search: Option<String>,
    pub page: Option<usize>,
}

#[derive(MultipartForm)]
/// Multipart form carrying a customer CSV export.
pub struct UploadCustomersForm {
    #[multipart(limit = "10MB")]
    pub csv: TempFile,
}

#[derive(Debug, Error)]
pub enum UploadCustomersFormError {
    #[error("Error reading csv file")]
    FileReadError,
    #[error("Error parsing csv file")]
    CsvParseError,
    #[error("csv file has no first_name column")]
    MissingFirstNameColumn,
}

impl From<std::io::Error> for UploadCustomersFormError {
    fn from(_: std::io::Error) -> Self {
        UploadCustomersFormError::FileReadError
    }
}

impl From<csv::Error> for UploadCustomersFormError {
    fn from(_: csv::Error) -> Self {
        UploadCustomersFormError::CsvParseError
    }
}

/// Rows accepted from an upload plus the number dropped for lacking a first name.
#[derive(Debug, Default)]
pub struct ParsedCustomerUpload {
    pub customers: Vec<NewCustomer>,
    pub skipped: usize,
}

impl UploadCustomersForm {
    pub fn into_new_customers(
        &mut self,
        merchant_id: i32,
    ) -> Result<ParsedCustomerUpload, UploadCustomersFormError> {
        self.csv.file.rewind()?;
        parse_customers(self.csv.file.by_ref(), merchant_id)
    }
}

#[derive(Debug, Default)]
struct CustomerColumns {
    first_name: Option<usize>,
    last_name: Option<usize>,
    email: Option<usize>,
    phone: Option<usize>,
    notes: Option<usize>,
}

impl CustomerColumns {
    fn locate(headers: &StringRecord) -> Self {
        let mut columns = CustomerColumns::default();
        for (index, header) in headers.iter().enumerate() {
            let key: String = header
                .chars()
                .filter(|ch| *ch != '_' && !ch.is_whitespace())
                .collect::<String>()
                .to_lowercase();
            let slot = match key.as_str() {
                "firstname" => &mut columns.first_name,
                "lastname" => &mut columns.last_name,
                "email" => &mut columns.email,
                "phone" => &mut columns.phone,
                "notes" => &mut columns.notes,
                _ => continue,
            };
            slot.get_or_insert(index);
        }
        columns
    }
}

fn cell(record: &StringRecord, index: Option<usize>) -> Option<&str> {
    index
        .and_then(|idx| record.get(idx))
        .filter(|value| !value.is_empty())
}

fn parse_customers<R: Read>(
    reader: R,
    merchant_id: i32,
) -> Result<ParsedCustomerUpload, UploadCustomersFormError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);

    let columns = CustomerColumns::locate(csv_reader.headers()?);
    if columns.first_name.is_none() {
        return Err(UploadCustomersFormError::MissingFirstNameColumn);
    }

    let mut parsed = ParsedCustomerUpload::default();
    for row in csv_reader.records() {
        let record = row?;
        let Some(first_name) = cell(&record, columns.first_name).map(sanitize_inline_text) else {
            parsed.skipped += 1;
            continue;
        };

        let mut customer = NewCustomer::new(merchant_id, first_name);
        if let Some(last_name) = cell(&record, columns.last_name) {
            customer = customer.with_last_name(sanitize_inline_text(last_name));
        }
        if let Some(email) = cell(&record, columns.email) {
            customer = customer.with_email(email);
        }
        if let Some(phone) = cell(&record, columns.phone) {
            customer = customer.with_phone(phone);
        }
        if let Some(notes) = cell(&record, columns.notes) {
            customer = customer.with_notes(sanitize_multiline_text(notes));
        }
        parsed.customers.push(customer);
    }

    Ok(parsed)
}
