use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;

use crate::domain::invoice::{
    Invoice as DomainInvoice, InvoiceItem as DomainInvoiceItem, InvoiceStatus,
    NewInvoice as DomainNewInvoice,
    NewInvoiceItem as DomainNewInvoiceItem, NewPayment as DomainNewPayment,
    Payment as DomainPayment, PaymentMethod, PaymentStatus,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::invoices)]
pub struct Invoice {
    pub id: i32,
    pub merchant_id: i32,
    pub customer_id: i32,
    pub booking_id: Option<i32>,
    pub invoice_number: String,
    pub status: String,
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,
    pub paid_cents: i64,
    pub due_date: NaiveDate,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable, Associations)]
#[diesel(table_name = crate::schema::invoice_items)]
#[diesel(belongs_to(Invoice, foreign_key = invoice_id))]
pub struct InvoiceItem {
    pub id: i32,
    pub invoice_id: i32,
    pub description: String,
    pub quantity: i32,
    pub unit_price_cents: i64,
    pub discount_cents: i64,
    pub tax_rate_bps: i32,
    pub tax_cents: i64,
    pub total_cents: i64,
    pub sort_order: i32,
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::payments)]
pub struct Payment {
    pub id: i32,
    pub merchant_id: i32,
    pub invoice_id: i32,
    pub amount_cents: i64,
    pub method: String,
    pub status: String,
    pub refunded_cents: i64,
    pub reference: Option<String>,
    pub processed_at: NaiveDateTime,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::invoices)]
pub struct NewInvoice<'a> {
    pub merchant_id: i32,
    pub customer_id: i32,
    pub booking_id: Option<i32>,
    pub invoice_number: &'a str,
    pub status: &'a str,
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,
    pub due_date: NaiveDate,
    pub notes: Option<&'a str>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::invoice_items)]
pub struct NewInvoiceItem<'a> {
    pub invoice_id: i32,
    pub description: &'a str,
    pub quantity: i32,
    pub unit_price_cents: i64,
    pub discount_cents: i64,
    pub tax_rate_bps: i32,
    pub tax_cents: i64,
    pub total_cents: i64,
    pub sort_order: i32,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::payments)]
pub struct NewPayment<'a> {
    pub merchant_id: i32,
    pub invoice_id: i32,
    pub amount_cents: i64,
    pub method: &'a str,
    pub reference: Option<&'a str>,
    pub processed_at: NaiveDateTime,
}

impl Invoice {
    pub fn into_domain(self, items: Vec<InvoiceItem>) -> DomainInvoice {
        let mut items: Vec<DomainInvoiceItem> = items.into_iter().map(Into::into).collect();
        items.sort_by_key(|item| (item.sort_order, item.id));

        DomainInvoice {
            id: self.id,
            merchant_id: self.merchant_id,
            customer_id: self.customer_id,
            booking_id: self.booking_id,
            invoice_number: self.invoice_number,
            status: self.status.parse().unwrap_or(InvoiceStatus::Draft),
            subtotal_cents: self.subtotal_cents,
            tax_cents: self.tax_cents,
            discount_cents: self.discount_cents,
            total_cents: self.total_cents,
            paid_cents: self.paid_cents,
            due_date: self.due_date,
            notes: self.notes,
            created_at: self.created_at,
            updated_at: self.updated_at,
            items,
        }
    }
}

impl From<InvoiceItem> for DomainInvoiceItem {
    fn from(value: InvoiceItem) -> Self {
        Self {
            id: value.id,
            invoice_id: value.invoice_id,
            description: value.description,
            quantity: value.quantity,
            unit_price_cents: value.unit_price_cents,
            discount_cents: value.discount_cents,
            tax_rate_bps: value.tax_rate_bps,
            tax_cents: value.tax_cents,
            total_cents: value.total_cents,
            sort_order: value.sort_order,
        }
    }
}

impl From<Payment> for DomainPayment {
    fn from(value: Payment) -> Self {
        Self {
            id: value.id,
            merchant_id: value.merchant_id,
            invoice_id: value.invoice_id,
            amount_cents: value.amount_cents,
            method: value.method.parse().unwrap_or(PaymentMethod::Cash),
            status: PaymentStatus::parse(&value.status),
            refunded_cents: value.refunded_cents,
            reference: value.reference,
            processed_at: value.processed_at,
            created_at: value.created_at,
        }
    }
}

impl<'a> NewInvoice<'a> {
    pub fn from_domain(value: &'a DomainNewInvoice, invoice_number: &'a str) -> Self {
        Self {
            merchant_id: value.merchant_id,
            customer_id: value.customer_id,
            booking_id: value.booking_id,
            invoice_number,
            status: value.status.as_str(),
            subtotal_cents: value.subtotal_cents,
            tax_cents: value.tax_cents,
            discount_cents: value.discount_cents,
            total_cents: value.total_cents,
            due_date: value.due_date,
            notes: value.notes.as_deref(),
        }
    }
}

impl<'a> NewInvoiceItem<'a> {
    pub fn from_domain(invoice_id: i32, value: &'a DomainNewInvoiceItem) -> Self {
        Self {
            invoice_id,
            description: value.description.as_str(),
            quantity: value.quantity,
            unit_price_cents: value.unit_price_cents,
            discount_cents: value.discount_cents,
            tax_rate_bps: value.tax_rate_bps,
            tax_cents: value.tax_cents,
            total_cents: value.total_cents,
            sort_order: value.sort_order,
        }
    }
}

impl<'a> From<&'a DomainNewPayment> for NewPayment<'a> {
    fn from(value: &'a DomainNewPayment) -> Self {
        Self {
            merchant_id: value.merchant_id,
            invoice_id: value.invoice_id,
            amount_cents: value.amount_cents,
            method: value.method.as_str(),
            reference: value.reference.as_deref(),
            processed_at: value.processed_at,
        }
    }
}
