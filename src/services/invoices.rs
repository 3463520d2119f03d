//! Invoices raised for customers and the payments recorded against them.

use chrono::{Duration, NaiveDateTime};
use pushkind_common::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated};
use pushkind_common::routes::check_role;
use serde::Serialize;

use crate::SERVICE_ACCESS_ROLE;
use crate::domain::auth::AuthenticatedUser;
use crate::domain::booking::Booking;
use crate::domain::invoice::{
    Invoice, InvoiceDetails, InvoiceStatus, ItemDraft, NewInvoice, NewPayment, Payment,
    PaymentReceipt, PaymentStatus, PaymentSummary, PaymentWriteOutcome, RefundWriteOutcome,
};
use crate::domain::timezone::local_date;
use crate::forms::invoices::{CreateInvoiceForm, InvoiceQueryParams, PaymentForm, RefundForm};
use crate::repository::{
    BookingReader, CatalogReader, CustomerReader, InvoiceReader, InvoiceWriter, MerchantReader,
};
use crate::services::merchants::authorized_merchant;
use crate::services::{ServiceError, ServiceResult};

/// Payment and invoice after a refund.
#[derive(Debug, Clone, Serialize)]
pub struct RefundReceipt {
    pub payment: Payment,
    pub invoice: Invoice,
}

/// One line per booked service at the booked price and the service's tax rate.
fn drafts_for_booking<R>(repo: &R, booking: &Booking) -> ServiceResult<Vec<ItemDraft>>
where
    R: CatalogReader + ?Sized,
{
    booking
        .services
        .iter()
        .map(|item| {
            let tax_rate_bps = repo
                .get_service_by_id(item.service_id, booking.merchant_id)?
                .map(|service| service.tax_rate_bps)
                .unwrap_or(0);
            Ok(ItemDraft {
                description: item.service_name.clone(),
                quantity: 1,
                unit_price_cents: item.price_cents,
                discount_cents: 0,
                tax_rate_bps,
            })
        })
        .collect()
}

/// Raise an invoice. Items default to the booking's services when a booking is given.
pub fn create_invoice<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: CreateInvoiceForm,
    now: NaiveDateTime,
) -> ServiceResult<Invoice>
where
    R: MerchantReader
        + CustomerReader
        + BookingReader
        + CatalogReader
        + InvoiceReader
        + InvoiceWriter
        + ?Sized,
{
    let merchant = authorized_merchant(repo, user)?;
    let request = form
        .into_request()
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    repo.get_customer_by_id(request.customer_id, merchant.id)?
        .ok_or(ServiceError::NotFound)?;

    let booking = match request.booking_id {
        Some(booking_id) => {
            let booking = repo
                .get_booking_by_id(booking_id, merchant.id)?
                .ok_or(ServiceError::NotFound)?;
            if booking.customer_id != request.customer_id {
                return Err(ServiceError::Form(
                    "Booking belongs to a different customer".to_string(),
                ));
            }
            if repo
                .find_active_invoice_for_booking(booking.id, merchant.id)?
                .is_some()
            {
                return Err(ServiceError::conflict(
                    "An invoice already exists for this booking",
                ));
            }
            Some(booking)
        }
        None => None,
    };

    let drafts = match (request.items, booking.as_ref()) {
        (Some(items), _) => items,
        (None, Some(booking)) => drafts_for_booking(repo, booking)?,
        (None, None) => {
            return Err(ServiceError::Form(
                "Invoice needs at least one item".to_string(),
            ));
        }
    };
    if drafts.is_empty() {
        return Err(ServiceError::Form(
            "Invoice needs at least one item".to_string(),
        ));
    }

    let due_date = local_date(merchant.tz(), now) + Duration::days(request.due_in_days);
    let mut new_invoice = NewInvoice::new(
        merchant.id,
        request.customer_id,
        drafts,
        request.discount_cents,
        due_date,
    )
    .map_err(|err| ServiceError::Form(err.to_string()))?
    .with_notes(request.notes);
    if let Some(booking) = booking.as_ref() {
        new_invoice = new_invoice.for_booking(booking.id);
    }

    let invoice = repo.create_invoice(&new_invoice)?;
    log::info!(
        "Created invoice {} for merchant {} totalling {} cents",
        invoice.invoice_number,
        merchant.id,
        invoice.total_cents
    );
    Ok(invoice)
}

pub fn list_invoices<R>(
    repo: &R,
    user: &AuthenticatedUser,
    params: InvoiceQueryParams,
) -> ServiceResult<Paginated<Invoice>>
where
    R: InvoiceReader + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }
    let page = params.page.unwrap_or(1).max(1);
    let query = params
        .into_query(user.merchant_id, DEFAULT_ITEMS_PER_PAGE)
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    let (total, invoices) = repo.list_invoices(query)?;
    let total_pages = total.div_ceil(DEFAULT_ITEMS_PER_PAGE);
    Ok(Paginated::new(invoices, page, total_pages))
}

/// Invoice with its payments, outstanding balance and overdue flag.
pub fn get_invoice<R>(
    repo: &R,
    user: &AuthenticatedUser,
    invoice_id: i32,
    now: NaiveDateTime,
) -> ServiceResult<InvoiceDetails>
where
    R: MerchantReader + InvoiceReader + ?Sized,
{
    let merchant = authorized_merchant(repo, user)?;
    let invoice = repo
        .get_invoice_by_id(invoice_id, merchant.id)?
        .ok_or(ServiceError::NotFound)?;
    let payments = repo.list_payments(invoice.id, merchant.id)?;
    let today = local_date(merchant.tz(), now);
    Ok(InvoiceDetails::new(invoice, payments, today))
}

pub fn void_invoice<R>(repo: &R, user: &AuthenticatedUser, invoice_id: i32) -> ServiceResult<Invoice>
where
    R: InvoiceReader + InvoiceWriter + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }
    let invoice = repo
        .get_invoice_by_id(invoice_id, user.merchant_id)?
        .ok_or(ServiceError::NotFound)?;
    if invoice.status == InvoiceStatus::Voided {
        return Err(ServiceError::Form("Invoice is already voided".to_string()));
    }

    let payments = repo.list_payments(invoice.id, user.merchant_id)?;
    if payments
        .iter()
        .any(|payment| payment.status == PaymentStatus::Completed)
    {
        return Err(ServiceError::Form(
            "Cannot void an invoice with completed payments".to_string(),
        ));
    }

    let voided = repo.void_invoice(invoice.id, user.merchant_id)?;
    log::info!("Voided invoice {}", voided.invoice_number);
    Ok(voided)
}

/// Take a payment. Anything above the balance comes back as change.
pub fn record_payment<R>(
    repo: &R,
    user: &AuthenticatedUser,
    invoice_id: i32,
    form: PaymentForm,
    now: NaiveDateTime,
) -> ServiceResult<PaymentReceipt>
where
    R: InvoiceWriter + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }
    let request = form
        .into_request()
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    let new_payment = NewPayment {
        merchant_id: user.merchant_id,
        invoice_id,
        amount_cents: request.amount_cents,
        method: request.method,
        reference: request.reference,
        processed_at: now,
    };

    match repo.record_payment(&new_payment)? {
        PaymentWriteOutcome::Recorded(receipt) => {
            log::info!(
                "Recorded {} cent {} payment on invoice {}",
                receipt.payment.amount_cents,
                receipt.payment.method.as_str(),
                receipt.invoice.invoice_number
            );
            if let Some(points) = receipt.loyalty_points_earned {
                log::info!(
                    "Customer {} earned {points} loyalty points",
                    receipt.invoice.customer_id
                );
            }
            Ok(receipt)
        }
        PaymentWriteOutcome::Rejected(message) => Err(ServiceError::Form(message)),
    }
}

/// Refund part or all of a payment. Without an amount the whole remainder is refunded.
pub fn refund_payment<R>(
    repo: &R,
    user: &AuthenticatedUser,
    payment_id: i32,
    form: RefundForm,
) -> ServiceResult<RefundReceipt>
where
    R: InvoiceWriter + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }
    let amount = form
        .into_amount()
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    match repo.refund_payment(payment_id, user.merchant_id, amount)? {
        RefundWriteOutcome::Refunded { payment, invoice } => {
            log::info!(
                "Refunded payment {} on invoice {}, {} cents refunded in total",
                payment.id,
                invoice.invoice_number,
                payment.refunded_cents
            );
            Ok(RefundReceipt { payment, invoice })
        }
        RefundWriteOutcome::Rejected(message) => Err(ServiceError::Form(message)),
    }
}

pub fn payment_summary<R>(
    repo: &R,
    user: &AuthenticatedUser,
    invoice_id: i32,
) -> ServiceResult<PaymentSummary>
where
    R: InvoiceReader + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }
    let invoice = repo
        .get_invoice_by_id(invoice_id, user.merchant_id)?
        .ok_or(ServiceError::NotFound)?;
    let payments = repo.list_payments(invoice.id, user.merchant_id)?;
    Ok(PaymentSummary::from_payments(invoice.id, &payments))
}
