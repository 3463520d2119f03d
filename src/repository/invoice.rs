use std::collections::HashMap;

use chrono::Utc;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use pushkind_common::repository::errors::{RepositoryError, RepositoryResult};

use crate::{
    domain::invoice::{
        Invoice as DomainInvoice, InvoiceListQuery, InvoiceStatus, NewInvoice as DomainNewInvoice,
        NewPayment as DomainNewPayment, Payment as DomainPayment, PaymentReceipt,
        PaymentWriteOutcome, RefundWriteOutcome, allocate_payment,
        format_invoice_number, parse_invoice_sequence, plan_refund,
    },
    domain::loyalty::{
        LoyaltyProgram as DomainLoyaltyProgram, LoyaltyTransactionKind,
        NewLoyaltyCard as DomainNewLoyaltyCard,
        NewLoyaltyTransaction as DomainNewLoyaltyTransaction, generate_card_number,
    },
    models::invoice::{
        Invoice as DbInvoice, InvoiceItem as DbInvoiceItem, NewInvoice as DbNewInvoice,
        NewInvoiceItem as DbNewInvoiceItem, NewPayment as DbNewPayment, Payment as DbPayment,
    },
    models::loyalty::{
        LoyaltyCard as DbLoyaltyCard, LoyaltyProgram as DbLoyaltyProgram,
        NewLoyaltyCard as DbNewLoyaltyCard, NewLoyaltyTransaction as DbNewLoyaltyTransaction,
    },
    repository::{DieselRepository, InvoiceReader, InvoiceWriter},
};

fn attach_items(
    conn: &mut SqliteConnection,
    rows: Vec<DbInvoice>,
) -> RepositoryResult<Vec<DomainInvoice>> {
    use crate::schema::invoice_items;

    if rows.is_empty() {
        return Ok(vec![]);
    }

    let ids: Vec<i32> = rows.iter().map(|invoice| invoice.id).collect();
    let items = invoice_items::table
        .filter(invoice_items::invoice_id.eq_any(&ids))
        .load::<DbInvoiceItem>(conn)?;

    let mut items_map: HashMap<i32, Vec<DbInvoiceItem>> = HashMap::new();
    for item in items {
        items_map.entry(item.invoice_id).or_default().push(item);
    }

    Ok(rows
        .into_iter()
        .map(|invoice| {
            let items = items_map.remove(&invoice.id).unwrap_or_default();
            invoice.into_domain(items)
        })
        .collect())
}

fn load_invoice(
    conn: &mut SqliteConnection,
    invoice_id: i32,
    merchant_id: i32,
) -> RepositoryResult<Option<DomainInvoice>> {
    use crate::schema::invoices;

    let row = invoices::table
        .filter(invoices::id.eq(invoice_id))
        .filter(invoices::merchant_id.eq(merchant_id))
        .first::<DbInvoice>(conn)
        .optional()?;

    match row {
        Some(row) => Ok(attach_items(conn, vec![row])?.into_iter().next()),
        None => Ok(None),
    }
}

/// Credit the customer's card for a fully paid invoice.
fn earn_loyalty_points(
    conn: &mut SqliteConnection,
    invoice: &DomainInvoice,
) -> RepositoryResult<Option<i32>> {
    use crate::schema::{loyalty_cards, loyalty_programs, loyalty_transactions};

    let program: Option<DomainLoyaltyProgram> = loyalty_programs::table
        .filter(loyalty_programs::merchant_id.eq(invoice.merchant_id))
        .filter(loyalty_programs::is_active.eq(true))
        .first::<DbLoyaltyProgram>(conn)
        .optional()?
        .map(Into::into);

    let Some(program) = program else {
        return Ok(None);
    };

    // An invoice earns once, even if it is refunded and paid again.
    let already_earned: i64 = loyalty_transactions::table
        .filter(loyalty_transactions::invoice_id.eq(invoice.id))
        .filter(loyalty_transactions::kind.eq(LoyaltyTransactionKind::Earned.as_str()))
        .count()
        .get_result(conn)?;
    if already_earned > 0 {
        return Ok(None);
    }

    let points = program.points_for(invoice.total_cents);
    if points <= 0 {
        return Ok(None);
    }

    let now = Utc::now().naive_utc();
    let existing = loyalty_cards::table
        .filter(loyalty_cards::merchant_id.eq(invoice.merchant_id))
        .filter(loyalty_cards::customer_id.eq(invoice.customer_id))
        .first::<DbLoyaltyCard>(conn)
        .optional()?;

    let card = match existing {
        Some(card) => card,
        None => {
            let new_card = DomainNewLoyaltyCard {
                merchant_id: invoice.merchant_id,
                customer_id: invoice.customer_id,
                card_number: generate_card_number(&mut rand::thread_rng(), now),
            };
            diesel::insert_into(loyalty_cards::table)
                .values(&DbNewLoyaltyCard::from(&new_card))
                .get_result::<DbLoyaltyCard>(conn)?
        }
    };

    diesel::update(loyalty_cards::table.filter(loyalty_cards::id.eq(card.id)))
        .set((
            loyalty_cards::points.eq(card.points.saturating_add(points)),
            loyalty_cards::lifetime_points.eq(card.lifetime_points.saturating_add(points)),
            loyalty_cards::updated_at.eq(now),
        ))
        .execute(conn)?;

    let transaction = DomainNewLoyaltyTransaction {
        card_id: card.id,
        kind: LoyaltyTransactionKind::Earned,
        points,
        description: format!("Earned on invoice {}", invoice.invoice_number),
        invoice_id: Some(invoice.id),
    };
    diesel::insert_into(loyalty_transactions::table)
        .values(&DbNewLoyaltyTransaction::from(&transaction))
        .execute(conn)?;

    Ok(Some(points))
}

impl InvoiceReader for DieselRepository {
    fn get_invoice_by_id(
        &self,
        id: i32,
        merchant_id: i32,
    ) -> RepositoryResult<Option<DomainInvoice>> {
        let mut conn = self.conn()?;
        load_invoice(&mut conn, id, merchant_id)
    }

    fn list_invoices(
        &self,
        query: InvoiceListQuery,
    ) -> RepositoryResult<(usize, Vec<DomainInvoice>)> {
        use crate::schema::invoices;

        let mut conn = self.conn()?;

        let query_builder = || {
            let mut items = invoices::table
                .filter(invoices::merchant_id.eq(query.merchant_id))
                .into_boxed::<diesel::sqlite::Sqlite>();

            if let Some(status) = &query.status {
                items = items.filter(invoices::status.eq(status.as_str()));
            }

            if let Some(customer_id) = query.customer_id {
                items = items.filter(invoices::customer_id.eq(customer_id));
            }

            items
        };

        let total = query_builder().count().get_result::<i64>(&mut conn)? as usize;

        let mut items = query_builder().order((invoices::created_at.desc(), invoices::id.desc()));

        if let Some(pagination) = &query.pagination {
            let offset = ((pagination.page.max(1) - 1) * pagination.per_page) as i64;
            let limit = pagination.per_page as i64;
            items = items.offset(offset).limit(limit);
        }

        let rows = items.load::<DbInvoice>(&mut conn)?;
        let invoices = attach_items(&mut conn, rows)?;

        Ok((total, invoices))
    }

    fn find_active_invoice_for_booking(
        &self,
        booking_id: i32,
        merchant_id: i32,
    ) -> RepositoryResult<Option<DomainInvoice>> {
        use crate::schema::invoices;

        let mut conn = self.conn()?;
        let row = invoices::table
            .filter(invoices::booking_id.eq(booking_id))
            .filter(invoices::merchant_id.eq(merchant_id))
            .filter(invoices::status.ne(InvoiceStatus::Voided.as_str()))
            .order(invoices::id.desc())
            .first::<DbInvoice>(&mut conn)
            .optional()?;

        match row {
            Some(row) => Ok(attach_items(&mut conn, vec![row])?.into_iter().next()),
            None => Ok(None),
        }
    }

    fn list_payments(
        &self,
        invoice_id: i32,
        merchant_id: i32,
    ) -> RepositoryResult<Vec<DomainPayment>> {
        use crate::schema::payments;

        let mut conn = self.conn()?;
        let rows = payments::table
            .filter(payments::invoice_id.eq(invoice_id))
            .filter(payments::merchant_id.eq(merchant_id))
            .order((payments::processed_at.asc(), payments::id.asc()))
            .load::<DbPayment>(&mut conn)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    fn get_payment_by_id(
        &self,
        id: i32,
        merchant_id: i32,
    ) -> RepositoryResult<Option<DomainPayment>> {
        use crate::schema::payments;

        let mut conn = self.conn()?;
        let payment = payments::table
            .filter(payments::id.eq(id))
            .filter(payments::merchant_id.eq(merchant_id))
            .first::<DbPayment>(&mut conn)
            .optional()?;

        Ok(payment.map(Into::into))
    }
}

impl InvoiceWriter for DieselRepository {
    fn create_invoice(&self, new_invoice: &DomainNewInvoice) -> RepositoryResult<DomainInvoice> {
        use crate::schema::{invoice_items, invoices};

        let mut conn = self.conn()?;

        conn.immediate_transaction::<DomainInvoice, RepositoryError, _>(|conn| {
            let numbers = invoices::table
                .filter(invoices::merchant_id.eq(new_invoice.merchant_id))
                .select(invoices::invoice_number)
                .load::<String>(conn)?;
            let sequence = numbers
                .iter()
                .filter_map(|number| parse_invoice_sequence(number))
                .max()
                .unwrap_or(0)
                + 1;
            let invoice_number = format_invoice_number(sequence);

            let created = diesel::insert_into(invoices::table)
                .values(&DbNewInvoice::from_domain(new_invoice, &invoice_number))
                .get_result::<DbInvoice>(conn)?;

            let rows: Vec<DbNewInvoiceItem> = new_invoice
                .items
                .iter()
                .map(|item| DbNewInvoiceItem::from_domain(created.id, item))
                .collect();

            let items = if rows.is_empty() {
                vec![]
            } else {
                diesel::insert_into(invoice_items::table)
                    .values(&rows)
                    .get_results::<DbInvoiceItem>(conn)?
            };

            Ok(created.into_domain(items))
        })
    }

    fn void_invoice(&self, invoice_id: i32, merchant_id: i32) -> RepositoryResult<DomainInvoice> {
        use crate::schema::invoices;

        let mut conn = self.conn()?;

        let target = invoices::table
            .filter(invoices::id.eq(invoice_id))
            .filter(invoices::merchant_id.eq(merchant_id));

        let updated = diesel::update(target)
            .set((
                invoices::status.eq(InvoiceStatus::Voided.as_str()),
                invoices::updated_at.eq(Utc::now().naive_utc()),
            ))
            .get_result::<DbInvoice>(&mut conn)
            .optional()?
            .ok_or(RepositoryError::NotFound)?;

        attach_items(&mut conn, vec![updated])?
            .into_iter()
            .next()
            .ok_or(RepositoryError::NotFound)
    }

    fn record_payment(
        &self,
        new_payment: &DomainNewPayment,
    ) -> RepositoryResult<PaymentWriteOutcome> {
        use crate::schema::{invoices, payments};

        let mut conn = self.conn()?;

        conn.immediate_transaction::<PaymentWriteOutcome, RepositoryError, _>(|conn| {
            let invoice = load_invoice(conn, new_payment.invoice_id, new_payment.merchant_id)?
                .ok_or(RepositoryError::NotFound)?;

            if invoice.status == InvoiceStatus::Voided {
                return Ok(PaymentWriteOutcome::Rejected(
                    "Cannot record a payment on a voided invoice".to_string(),
                ));
            }
            if !invoice.accepts_payments() {
                return Ok(PaymentWriteOutcome::Rejected(
                    "Invoice is already paid".to_string(),
                ));
            }
            if new_payment.amount_cents <= 0 {
                return Ok(PaymentWriteOutcome::Rejected(
                    "Payment amount must be positive".to_string(),
                ));
            }

            let allocation = allocate_payment(&invoice, new_payment.amount_cents);
            if allocation.allocated_cents <= 0 {
                return Ok(PaymentWriteOutcome::Rejected(
                    "Invoice has no outstanding balance".to_string(),
                ));
            }

            let mut row = DbNewPayment::from(new_payment);
            row.amount_cents = allocation.allocated_cents;
            let payment = diesel::insert_into(payments::table)
                .values(&row)
                .get_result::<DbPayment>(conn)?;

            diesel::update(invoices::table.filter(invoices::id.eq(invoice.id)))
                .set((
                    invoices::paid_cents.eq(allocation.paid_cents),
                    invoices::status.eq(allocation.status.as_str()),
                    invoices::updated_at.eq(Utc::now().naive_utc()),
                ))
                .execute(conn)?;

            let invoice = load_invoice(conn, invoice.id, invoice.merchant_id)?
                .ok_or(RepositoryError::NotFound)?;

            let loyalty_points_earned = if invoice.status == InvoiceStatus::Paid {
                earn_loyalty_points(conn, &invoice)?
            } else {
                None
            };

            Ok(PaymentWriteOutcome::Recorded(PaymentReceipt {
                payment: payment.into(),
                invoice,
                change_cents: allocation.change_cents,
                loyalty_points_earned,
            }))
        })
    }

    fn refund_payment(
        &self,
        payment_id: i32,
        merchant_id: i32,
        amount_cents: Option<i64>,
    ) -> RepositoryResult<RefundWriteOutcome> {
        use crate::schema::{invoices, payments};

        let mut conn = self.conn()?;

        conn.immediate_transaction::<RefundWriteOutcome, RepositoryError, _>(|conn| {
            let payment: DomainPayment = payments::table
                .filter(payments::id.eq(payment_id))
                .filter(payments::merchant_id.eq(merchant_id))
                .first::<DbPayment>(conn)
                .optional()?
                .ok_or(RepositoryError::NotFound)?
                .into();

            let invoice = load_invoice(conn, payment.invoice_id, merchant_id)?
                .ok_or(RepositoryError::NotFound)?;

            let outcome = match plan_refund(&payment, &invoice, amount_cents) {
                Ok(outcome) => outcome,
                Err(message) => return Ok(RefundWriteOutcome::Rejected(message)),
            };

            let now = Utc::now().naive_utc();
            let payment = diesel::update(payments::table.filter(payments::id.eq(payment.id)))
                .set((
                    payments::refunded_cents.eq(outcome.refunded_cents),
                    payments::status.eq(outcome.payment_status.as_str()),
                ))
                .get_result::<DbPayment>(conn)?;

            diesel::update(invoices::table.filter(invoices::id.eq(invoice.id)))
                .set((
                    invoices::paid_cents.eq(outcome.invoice_paid_cents),
                    invoices::status.eq(outcome.invoice_status.as_str()),
                    invoices::updated_at.eq(now),
                ))
                .execute(conn)?;

            let invoice =
                load_invoice(conn, invoice.id, merchant_id)?.ok_or(RepositoryError::NotFound)?;

            Ok(RefundWriteOutcome::Refunded {
                payment: payment.into(),
                invoice,
            })
        })
    }
}

