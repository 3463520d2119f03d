use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::invoice::{
    InvoiceListQuery, InvoiceStatus, ItemDraft, MAX_AMOUNT_CENTS, PaymentMethod,
};
use crate::forms::{optional_inline, optional_multiline, sanitize_inline_text};

pub const DEFAULT_DUE_IN_DAYS: i64 = 30;
pub const MAX_INVOICE_ITEMS: u64 = 200;

#[derive(Debug, Error)]
pub enum InvoiceFormError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("Item description is required")]
    EmptyDescription,
    #[error("Invoice items are required when no booking is given")]
    NoItems,
    #[error("Item discount cannot exceed the line amount")]
    DiscountTooLarge,
    #[error("Item amount is too large")]
    AmountTooLarge,
    #[error("{0}")]
    InvalidMethod(String),
    #[error("unknown invoice status `{0}`")]
    InvalidStatus(String),
}

pub type InvoiceFormResult<T> = Result<T, InvoiceFormError>;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct InvoiceItemForm {
    #[validate(length(max = 256))]
    pub description: String,
    #[validate(range(min = 1, max = 10000))]
    pub quantity: Option<i32>,
    #[validate(range(min = 0, max = MAX_AMOUNT_CENTS))]
    pub unit_price_cents: i64,
    #[validate(range(min = 0, max = MAX_AMOUNT_CENTS))]
    pub discount_cents: Option<i64>,
    #[validate(range(min = 0, max = 10000))]
    pub tax_rate_bps: Option<i32>,
}

impl InvoiceItemForm {
    fn into_draft(self) -> InvoiceFormResult<ItemDraft> {
        self.validate()?;
        let description = sanitize_inline_text(&self.description);
        if description.is_empty() {
            return Err(InvoiceFormError::EmptyDescription);
        }
        let quantity = self.quantity.unwrap_or(1);
        let discount_cents = self.discount_cents.unwrap_or(0);
        let line_cents = i64::from(quantity)
            .checked_mul(self.unit_price_cents)
            .ok_or(InvoiceFormError::AmountTooLarge)?;
        if discount_cents > line_cents {
            return Err(InvoiceFormError::DiscountTooLarge);
        }
        Ok(ItemDraft {
            description,
            quantity,
            unit_price_cents: self.unit_price_cents,
            discount_cents,
            tax_rate_bps: self.tax_rate_bps.unwrap_or(0),
        })
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateInvoiceForm {
    pub customer_id: i32,
    pub booking_id: Option<i32>,
    #[validate(length(max = MAX_INVOICE_ITEMS))]
    pub items: Option<Vec<InvoiceItemForm>>,
    #[validate(range(min = 0, max = MAX_AMOUNT_CENTS))]
    pub discount_cents: Option<i64>,
    #[validate(range(min = 0, max = 365))]
    pub due_in_days: Option<i64>,
    #[validate(length(max = 4096))]
    pub notes: Option<String>,
}

/// Validated invoice request; `items` is `None` when they come from the booking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceRequest {
    pub customer_id: i32,
    pub booking_id: Option<i32>,
    pub items: Option<Vec<ItemDraft>>,
    pub discount_cents: i64,
    pub due_in_days: i64,
    pub notes: Option<String>,
}

impl CreateInvoiceForm {
    pub fn into_request(self) -> InvoiceFormResult<InvoiceRequest> {
        self.validate()?;
        let items = self
            .items
            .map(|items| {
                items
                    .into_iter()
                    .map(InvoiceItemForm::into_draft)
                    .collect::<InvoiceFormResult<Vec<_>>>()
            })
            .transpose()?;

        let has_items = items.as_ref().is_some_and(|items| !items.is_empty());
        if !has_items && self.booking_id.is_none() {
            return Err(InvoiceFormError::NoItems);
        }

        Ok(InvoiceRequest {
            customer_id: self.customer_id,
            booking_id: self.booking_id,
            items: items.filter(|items| !items.is_empty()),
            discount_cents: self.discount_cents.unwrap_or(0),
            due_in_days: self.due_in_days.unwrap_or(DEFAULT_DUE_IN_DAYS),
            notes: optional_multiline(self.notes.as_deref()),
        })
    }
}

/// `GET /v1/invoices` filters.
#[derive(Debug, Default, Deserialize)]
pub struct InvoiceQueryParams {
    pub status: Option<String>,
    pub customer_id: Option<i32>,
    pub page: Option<usize>,
}

impl InvoiceQueryParams {
    pub fn into_query(self, merchant_id: i32, per_page: usize) -> InvoiceFormResult<InvoiceListQuery> {
        let mut query = InvoiceListQuery::new(merchant_id);
        if let Some(status) = self.status.as_deref().filter(|value| !value.trim().is_empty()) {
            let parsed = status
                .parse::<InvoiceStatus>()
                .map_err(|_| InvoiceFormError::InvalidStatus(status.to_string()))?;
            query = query.status(parsed);
        }
        if let Some(customer_id) = self.customer_id {
            query = query.customer(customer_id);
        }
        Ok(query.paginate(self.page.unwrap_or(1).max(1), per_page))
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct PaymentForm {
    #[validate(range(min = 1, max = MAX_AMOUNT_CENTS))]
    pub amount_cents: i64,
    pub method: String,
    #[validate(length(max = 128))]
    pub reference: Option<String>,
}

/// Validated payment request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentRequest {
    pub amount_cents: i64,
    pub method: PaymentMethod,
    pub reference: Option<String>,
}

impl PaymentForm {
    pub fn into_request(self) -> InvoiceFormResult<PaymentRequest> {
        self.validate()?;
        let method = self
            .method
            .parse::<PaymentMethod>()
            .map_err(InvoiceFormError::InvalidMethod)?;
        Ok(PaymentRequest {
            amount_cents: self.amount_cents,
            method,
            reference: optional_inline(self.reference.as_deref()),
        })
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct RefundForm {
    #[validate(range(min = 1, max = MAX_AMOUNT_CENTS))]
    pub amount_cents: Option<i64>,
}

impl RefundForm {
    pub fn into_amount(self) -> InvoiceFormResult<Option<i64>> {
        self.validate()?;
        Ok(self.amount_cents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn booking_invoices_may_omit_items() {
        let form: CreateInvoiceForm = serde_json::from_value(json!({
            "customer_id": 3,
            "booking_id": 9
        }))
        .unwrap();
        let request = form.into_request().unwrap();
        assert_eq!(request.items, None);
        assert_eq!(request.due_in_days, DEFAULT_DUE_IN_DAYS);

        let form: CreateInvoiceForm = serde_json::from_value(json!({
            "customer_id": 3,
            "items": []
        }))
        .unwrap();
        assert!(matches!(form.into_request(), Err(InvoiceFormError::NoItems)));
    }

    #[test]
    fn items_default_quantity_and_tax() {
        let form: CreateInvoiceForm = serde_json::from_value(json!({
            "customer_id": 3,
            "items": [{"description": " Blow dry ", "unit_price_cents": 4500}],
            "discount_cents": 500
        }))
        .unwrap();
        let request = form.into_request().unwrap();
        let items = request.items.unwrap();
        assert_eq!(items[0].description, "Blow dry");
        assert_eq!(items[0].quantity, 1);
        assert_eq!(items[0].tax_rate_bps, 0);
        assert_eq!(request.discount_cents, 500);
    }

    #[test]
    fn item_discount_cannot_exceed_line() {
        let form: CreateInvoiceForm = serde_json::from_value(json!({
            "customer_id": 3,
            "items": [{"description": "Trim", "unit_price_cents": 1000, "discount_cents": 1001}]
        }))
        .unwrap();
        assert!(matches!(
            form.into_request(),
            Err(InvoiceFormError::DiscountTooLarge)
        ));
    }

    #[test]
    fn oversized_item_amounts_are_rejected() {
        let item = InvoiceItemForm {
            description: "Everything".into(),
            quantity: Some(2),
            unit_price_cents: i64::MAX,
            discount_cents: None,
            tax_rate_bps: None,
        };
        assert!(matches!(
            item.into_draft(),
            Err(InvoiceFormError::Validation(_))
        ));

        let item = InvoiceItemForm {
            description: "Everything".into(),
            quantity: Some(10_000),
            unit_price_cents: MAX_AMOUNT_CENTS,
            discount_cents: Some(MAX_AMOUNT_CENTS),
            tax_rate_bps: Some(10_000),
        };
        assert!(item.into_draft().is_ok());

        let form = CreateInvoiceForm {
            customer_id: 3,
            booking_id: None,
            items: None,
            discount_cents: Some(i64::MAX),
            due_in_days: None,
            notes: None,
        };
        assert!(matches!(
            form.into_request(),
            Err(InvoiceFormError::Validation(_))
        ));
    }

    #[test]
    fn payment_method_and_amount_are_checked() {
        let form = PaymentForm {
            amount_cents: 2500,
            method: "Bank_Transfer".into(),
            reference: Some("  ".into()),
        };
        let request = form.into_request().unwrap();
        assert_eq!(request.method, PaymentMethod::BankTransfer);
        assert_eq!(request.reference, None);

        let form = PaymentForm {
            amount_cents: 0,
            method: "cash".into(),
            reference: None,
        };
        assert!(matches!(
            form.into_request(),
            Err(InvoiceFormError::Validation(_))
        ));

        let form = PaymentForm {
            amount_cents: 100,
            method: "cheque".into(),
            reference: None,
        };
        assert!(matches!(
            form.into_request(),
            Err(InvoiceFormError::InvalidMethod(_))
        ));
    }
}
