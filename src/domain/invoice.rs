//! Invoices, invoice items and payments.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use pushkind_common::pagination::Pagination;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Upper bound for any single amount entered on a form, in cents.
pub const MAX_AMOUNT_CENTS: i64 = 100_000_000_000;

/// Invoice arithmetic left the range of `i64`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Invoice amounts are too large")]
pub struct AmountOverflow;

/// Lifecycle of an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Draft,
    Sent,
    PartiallyPaid,
    Paid,
    Voided,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "draft",
            InvoiceStatus::Sent => "sent",
            InvoiceStatus::PartiallyPaid => "partially_paid",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Voided => "voided",
        }
    }

    /// Status implied by the amount paid against a total.
    pub fn for_paid_amount(paid_cents: i64, total_cents: i64) -> Self {
        if paid_cents <= 0 {
            InvoiceStatus::Sent
        } else if paid_cents >= total_cents {
            InvoiceStatus::Paid
        } else {
            InvoiceStatus::PartiallyPaid
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvoiceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "draft" => Ok(InvoiceStatus::Draft),
            "sent" => Ok(InvoiceStatus::Sent),
            "partially_paid" => Ok(InvoiceStatus::PartiallyPaid),
            "paid" => Ok(InvoiceStatus::Paid),
            "voided" => Ok(InvoiceStatus::Voided),
            other => Err(format!("Unknown invoice status \"{other}\"")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
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

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Invoice {
    pub id: i32,
    pub merchant_id: i32,
    pub customer_id: i32,
    pub booking_id: Option<i32>,
    pub invoice_number: String,
    pub status: InvoiceStatus,
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,
    pub paid_cents: i64,
    pub due_date: NaiveDate,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    #[serde(default)]
    pub items: Vec<InvoiceItem>,
}

impl Invoice {
    pub fn balance_cents(&self) -> i64 {
        (self.total_cents - self.paid_cents).max(0)
    }

    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !matches!(self.status, InvoiceStatus::Paid | InvoiceStatus::Voided)
            && self.due_date < today
    }

    /// Whether the invoice can take another payment.
    pub fn accepts_payments(&self) -> bool {
        !matches!(self.status, InvoiceStatus::Paid | InvoiceStatus::Voided)
    }
}

/// Line item before tax and totals are worked out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemDraft {
    pub description: String,
    pub quantity: i32,
    pub unit_price_cents: i64,
    pub discount_cents: i64,
    pub tax_rate_bps: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewInvoiceItem {
    pub description: String,
    pub quantity: i32,
    pub unit_price_cents: i64,
    pub discount_cents: i64,
    pub tax_rate_bps: i32,
    pub tax_cents: i64,
    pub total_cents: i64,
    pub sort_order: i32,
}

/// Tax on a taxable amount in basis points, rounded half-up.
pub fn tax_cents(taxable_cents: i64, tax_rate_bps: i32) -> Result<i64, AmountOverflow> {
    let product = taxable_cents
        .checked_mul(i64::from(tax_rate_bps))
        .ok_or(AmountOverflow)?;
    let magnitude = product
        .checked_abs()
        .and_then(|value| value.checked_add(5_000))
        .ok_or(AmountOverflow)?
        / 10_000;
    Ok(if product >= 0 { magnitude } else { -magnitude })
}

impl NewInvoiceItem {
    pub fn from_draft(draft: ItemDraft, sort_order: i32) -> Result<Self, AmountOverflow> {
        let taxable = i64::from(draft.quantity)
            .checked_mul(draft.unit_price_cents)
            .and_then(|gross| gross.checked_sub(draft.discount_cents))
            .ok_or(AmountOverflow)?;
        let tax = tax_cents(taxable, draft.tax_rate_bps)?;
        Ok(Self {
            description: draft.description,
            quantity: draft.quantity,
            unit_price_cents: draft.unit_price_cents,
            discount_cents: draft.discount_cents,
            tax_rate_bps: draft.tax_rate_bps,
            tax_cents: tax,
            total_cents: taxable.checked_add(tax).ok_or(AmountOverflow)?,
            sort_order,
        })
    }

    pub fn taxable_cents(&self) -> i64 {
        self.total_cents - self.tax_cents
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewInvoice {
    pub merchant_id: i32,
    pub customer_id: i32,
    pub booking_id: Option<i32>,
    pub status: InvoiceStatus,
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,
    pub due_date: NaiveDate,
    pub notes: Option<String>,
    pub items: Vec<NewInvoiceItem>,
}

impl NewInvoice {
    /// Price the drafts and roll them up into invoice totals.
    ///
    /// The invoice number is assigned by the repository.
    pub fn new(
        merchant_id: i32,
        customer_id: i32,
        drafts: Vec<ItemDraft>,
        discount_cents: i64,
        due_date: NaiveDate,
    ) -> Result<Self, AmountOverflow> {
        let items = drafts
            .into_iter()
            .enumerate()
            .map(|(index, draft)| NewInvoiceItem::from_draft(draft, index as i32))
            .collect::<Result<Vec<_>, _>>()?;
        let subtotal = items
            .iter()
            .try_fold(0i64, |sum, item| sum.checked_add(item.taxable_cents()))
            .ok_or(AmountOverflow)?;
        let tax = items
            .iter()
            .try_fold(0i64, |sum, item| sum.checked_add(item.tax_cents))
            .ok_or(AmountOverflow)?;
        let total = subtotal
            .checked_add(tax)
            .and_then(|gross| gross.checked_sub(discount_cents))
            .ok_or(AmountOverflow)?
            .max(0);

        Ok(Self {
            merchant_id,
            customer_id,
            booking_id: None,
            status: InvoiceStatus::Sent,
            subtotal_cents: subtotal,
            tax_cents: tax,
            discount_cents,
            total_cents: total,
            due_date,
            notes: None,
            items,
        })
    }

    pub fn for_booking(mut self, booking_id: i32) -> Self {
        self.booking_id = Some(booking_id);
        self
    }

    pub fn with_notes(mut self, notes: Option<String>) -> Self {
        self.notes = notes;
        self
    }
}

/// Format the per-merchant invoice sequence.
pub fn format_invoice_number(sequence: i64) -> String {
    format!("INV-{sequence:06}")
}

/// Sequence encoded in an invoice number, if it follows the `INV-` format.
pub fn parse_invoice_sequence(number: &str) -> Option<i64> {
    number.strip_prefix("INV-")?.parse().ok()
}

#[derive(Debug, Clone, Default)]
pub struct InvoiceListQuery {
    pub merchant_id: i32,
    pub status: Option<InvoiceStatus>,
    pub customer_id: Option<i32>,
    pub pagination: Option<Pagination>,
}

impl InvoiceListQuery {
    pub fn new(merchant_id: i32) -> Self {
        Self {
            merchant_id,
            ..Default::default()
        }
    }

    pub fn status(mut self, status: InvoiceStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn customer(mut self, customer_id: i32) -> Self {
        self.customer_id = Some(customer_id);
        self
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    BankTransfer,
    DigitalWallet,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::BankTransfer => "bank_transfer",
            PaymentMethod::DigitalWallet => "digital_wallet",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cash" => Ok(PaymentMethod::Cash),
            "card" => Ok(PaymentMethod::Card),
            "bank_transfer" => Ok(PaymentMethod::BankTransfer),
            "digital_wallet" => Ok(PaymentMethod::DigitalWallet),
            other => Err(format!("Unknown payment method \"{other}\"")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Completed,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Completed => "completed",
            PaymentStatus::Refunded => "refunded",
        }
    }

    pub fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("refunded") {
            PaymentStatus::Refunded
        } else {
            PaymentStatus::Completed
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Payment {
    pub id: i32,
    pub merchant_id: i32,
    pub invoice_id: i32,
    pub amount_cents: i64,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    pub refunded_cents: i64,
    pub reference: Option<String>,
    pub processed_at: NaiveDateTime,
    pub created_at: NaiveDateTime,
}

impl Payment {
    pub fn refundable_cents(&self) -> i64 {
        if self.status == PaymentStatus::Completed {
            (self.amount_cents - self.refunded_cents).max(0)
        } else {
            0
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPayment {
    pub merchant_id: i32,
    pub invoice_id: i32,
    pub amount_cents: i64,
    pub method: PaymentMethod,
    pub reference: Option<String>,
    pub processed_at: NaiveDateTime,
}

/// How a tendered amount splits between the invoice and change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentAllocation {
    pub allocated_cents: i64,
    pub change_cents: i64,
    pub paid_cents: i64,
    pub status: InvoiceStatus,
}

pub fn allocate_payment(invoice: &Invoice, amount_cents: i64) -> PaymentAllocation {
    let allocated = amount_cents.min(invoice.balance_cents()).max(0);
    let paid = invoice.paid_cents + allocated;
    PaymentAllocation {
        allocated_cents: allocated,
        change_cents: amount_cents - allocated,
        paid_cents: paid,
        status: if paid >= invoice.total_cents {
            InvoiceStatus::Paid
        } else {
            InvoiceStatus::PartiallyPaid
        },
    }
}

/// Effect of a refund on the payment and its invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefundOutcome {
    pub refunded_cents: i64,
    pub payment_status: PaymentStatus,
    pub invoice_paid_cents: i64,
    pub invoice_status: InvoiceStatus,
}

/// Apply `amount_cents` (or the whole remainder) as a refund.
pub fn plan_refund(
    payment: &Payment,
    invoice: &Invoice,
    amount_cents: Option<i64>,
) -> Result<RefundOutcome, String> {
    let remainder = payment.refundable_cents();
    if remainder <= 0 {
        return Err("Payment has nothing left to refund".to_string());
    }
    let amount = amount_cents.unwrap_or(remainder);
    if amount <= 0 {
        return Err("Refund amount must be positive".to_string());
    }
    if amount > remainder {
        return Err("Refund amount exceeds refundable balance".to_string());
    }

    let refunded = payment.refunded_cents + amount;
    let paid = (invoice.paid_cents - amount).max(0);
    Ok(RefundOutcome {
        refunded_cents: refunded,
        payment_status: if refunded >= payment.amount_cents {
            PaymentStatus::Refunded
        } else {
            PaymentStatus::Completed
        },
        invoice_paid_cents: paid,
        invoice_status: InvoiceStatus::for_paid_amount(paid, invoice.total_cents),
    })
}

/// Totals of an invoice's payments.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct PaymentSummary {
    pub invoice_id: i32,
    pub total_paid_cents: i64,
    pub total_refunded_cents: i64,
    pub net_cents: i64,
    pub by_method: BTreeMap<String, i64>,
    pub payment_count: usize,
}

impl PaymentSummary {
    pub fn from_payments(invoice_id: i32, payments: &[Payment]) -> Self {
        let mut summary = PaymentSummary {
            invoice_id,
            payment_count: payments.len(),
            ..Default::default()
        };
        for payment in payments {
            summary.total_paid_cents += payment.amount_cents;
            summary.total_refunded_cents += payment.refunded_cents;
            *summary
                .by_method
                .entry(payment.method.as_str().to_string())
                .or_default() += payment.amount_cents - payment.refunded_cents;
        }
        summary.net_cents = summary.total_paid_cents - summary.total_refunded_cents;
        summary
    }
}

/// Invoice with everything needed for its detail view.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct InvoiceDetails {
    #[serde(flatten)]
    pub invoice: Invoice,
    pub payments: Vec<Payment>,
    pub balance_cents: i64,
    pub is_overdue: bool,
}

impl InvoiceDetails {
    pub fn new(invoice: Invoice, payments: Vec<Payment>, today: NaiveDate) -> Self {
        Self {
            balance_cents: invoice.balance_cents(),
            is_overdue: invoice.is_overdue(today),
            invoice,
            payments,
        }
    }
}

/// Result of recording a payment.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PaymentReceipt {
    pub payment: Payment,
    pub invoice: Invoice,
    pub change_cents: i64,
    pub loyalty_points_earned: Option<i32>,
}

/// Result of a payment write checked inside its transaction.
#[derive(Debug, Clone)]
pub enum PaymentWriteOutcome {
    Recorded(PaymentReceipt),
    Rejected(String),
}

/// Result of a refund write checked inside its transaction.
#[derive(Debug, Clone)]
pub enum RefundWriteOutcome {
    Refunded { payment: Payment, invoice: Invoice },
    Rejected(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn invoice(total: i64, paid: i64, status: InvoiceStatus) -> Invoice {
        let now = date(2025, 1, 1).and_hms_opt(0, 0, 0).unwrap();
        Invoice {
            id: 1,
            merchant_id: 1,
            customer_id: 1,
            booking_id: None,
            invoice_number: "INV-000001".into(),
            status,
            subtotal_cents: total,
            tax_cents: 0,
            discount_cents: 0,
            total_cents: total,
            paid_cents: paid,
            due_date: date(2025, 1, 31),
            notes: None,
            created_at: now,
            updated_at: now,
            items: vec![],
        }
    }

    fn payment(amount: i64, refunded: i64) -> Payment {
        let now = date(2025, 1, 1).and_hms_opt(0, 0, 0).unwrap();
        Payment {
            id: 7,
            merchant_id: 1,
            invoice_id: 1,
            amount_cents: amount,
            method: PaymentMethod::Card,
            status: PaymentStatus::Completed,
            refunded_cents: refunded,
            reference: None,
            processed_at: now,
            created_at: now,
        }
    }

    #[test]
    fn tax_rounds_half_up() {
        assert_eq!(tax_cents(1_005, 1_000), Ok(101));
        assert_eq!(tax_cents(1_004, 1_000), Ok(100));
        assert_eq!(tax_cents(5, 1_000), Ok(1));
        assert_eq!(tax_cents(0, 1_000), Ok(0));
        assert_eq!(tax_cents(-1_005, 1_000), Ok(-101));
    }

    #[test]
    fn oversized_amounts_are_rejected() {
        assert_eq!(tax_cents(i64::MAX / 2, 10_000), Err(AmountOverflow));

        let drafts = vec![ItemDraft {
            description: "Everything".into(),
            quantity: 3,
            unit_price_cents: i64::MAX / 2,
            discount_cents: 0,
            tax_rate_bps: 0,
        }];
        assert_eq!(
            NewInvoice::new(1, 2, drafts, 0, date(2025, 2, 1)),
            Err(AmountOverflow)
        );
    }

    #[test]
    fn invoice_totals_roll_up_items() {
        let drafts = vec![
            ItemDraft {
                description: "Cut".into(),
                quantity: 2,
                unit_price_cents: 5_000,
                discount_cents: 1_000,
                tax_rate_bps: 1_000,
            },
            ItemDraft {
                description: "Wash".into(),
                quantity: 1,
                unit_price_cents: 2_000,
                discount_cents: 0,
                tax_rate_bps: 0,
            },
        ];
        let invoice = NewInvoice::new(1, 2, drafts, 500, date(2025, 2, 1)).unwrap();

        assert_eq!(invoice.subtotal_cents, 11_000);
        assert_eq!(invoice.tax_cents, 900);
        assert_eq!(invoice.total_cents, 11_400);
        assert_eq!(invoice.items[0].total_cents, 9_900);
        assert_eq!(invoice.items[1].sort_order, 1);
    }

    #[test]
    fn invoice_total_never_negative() {
        let drafts = vec![ItemDraft {
            description: "Gift".into(),
            quantity: 1,
            unit_price_cents: 1_000,
            discount_cents: 0,
            tax_rate_bps: 0,
        }];
        let invoice = NewInvoice::new(1, 2, drafts, 5_000, date(2025, 2, 1)).unwrap();
        assert_eq!(invoice.total_cents, 0);
    }

    #[test]
    fn allocation_returns_change() {
        let invoice = invoice(10_000, 4_000, InvoiceStatus::PartiallyPaid);
        let allocation = allocate_payment(&invoice, 7_000);
        assert_eq!(allocation.allocated_cents, 6_000);
        assert_eq!(allocation.change_cents, 1_000);
        assert_eq!(allocation.paid_cents, 10_000);
        assert_eq!(allocation.status, InvoiceStatus::Paid);

        let partial = allocate_payment(&invoice, 1_000);
        assert_eq!(partial.status, InvoiceStatus::PartiallyPaid);
        assert_eq!(partial.change_cents, 0);
    }

    #[test]
    fn refund_defaults_to_remainder() {
        let invoice = invoice(10_000, 10_000, InvoiceStatus::Paid);
        let outcome = plan_refund(&payment(10_000, 2_000), &invoice, None).unwrap();
        assert_eq!(outcome.refunded_cents, 10_000);
        assert_eq!(outcome.payment_status, PaymentStatus::Refunded);
        assert_eq!(outcome.invoice_paid_cents, 2_000);
        assert_eq!(outcome.invoice_status, InvoiceStatus::PartiallyPaid);
    }

    #[test]
    fn refund_rejects_excess_amount() {
        let invoice = invoice(10_000, 10_000, InvoiceStatus::Paid);
        assert!(plan_refund(&payment(10_000, 0), &invoice, Some(10_001)).is_err());

        let mut refunded = payment(10_000, 10_000);
        refunded.status = PaymentStatus::Refunded;
        assert!(plan_refund(&refunded, &invoice, None).is_err());
    }

    #[test]
    fn full_refund_resets_invoice_to_sent() {
        let invoice = invoice(10_000, 10_000, InvoiceStatus::Paid);
        let outcome = plan_refund(&payment(10_000, 0), &invoice, None).unwrap();
        assert_eq!(outcome.invoice_status, InvoiceStatus::Sent);
    }

    #[test]
    fn summary_groups_by_method() {
        let mut cash = payment(3_000, 0);
        cash.method = PaymentMethod::Cash;
        let summary = PaymentSummary::from_payments(1, &[cash, payment(5_000, 1_000)]);
        assert_eq!(summary.total_paid_cents, 8_000);
        assert_eq!(summary.total_refunded_cents, 1_000);
        assert_eq!(summary.net_cents, 7_000);
        assert_eq!(summary.by_method.get("card"), Some(&4_000));
        assert_eq!(summary.by_method.get("cash"), Some(&3_000));
    }

    #[test]
    fn invoice_numbers() {
        assert_eq!(format_invoice_number(42), "INV-000042");
        assert_eq!(parse_invoice_sequence("INV-000042"), Some(42));
        assert_eq!(parse_invoice_sequence("X-1"), None);
    }

    #[test]
    fn overdue_only_when_unpaid() {
        assert!(invoice(100, 0, InvoiceStatus::Sent).is_overdue(date(2025, 2, 1)));
        assert!(!invoice(100, 100, InvoiceStatus::Paid).is_overdue(date(2025, 2, 1)));
        assert!(!invoice(100, 0, InvoiceStatus::Sent).is_overdue(date(2025, 1, 31)));
    }
}
