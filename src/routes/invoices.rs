use actix_web::{HttpResponse, Responder, get, post, web};

use crate::domain::auth::AuthenticatedUser;
use crate::forms::invoices::{CreateInvoiceForm, InvoiceQueryParams, PaymentForm, RefundForm};
use crate::repository::DieselRepository;
use crate::routes::{error_response, now};
use crate::services::invoices;

#[post("/v1/invoices")]
/// Raise an invoice, generating lines from the booking when none are given.
pub async fn add_invoice(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    form: web::Json<CreateInvoiceForm>,
) -> impl Responder {
    match invoices::create_invoice(repo.get_ref(), &user, form.into_inner(), now()) {
        Ok(invoice) => HttpResponse::Created().json(invoice),
        Err(err) => error_response(err, "Failed to create invoice"),
    }
}

#[get("/v1/invoices")]
pub async fn list_invoices(
    params: web::Query<InvoiceQueryParams>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match invoices::list_invoices(repo.get_ref(), &user, params.into_inner()) {
        Ok(page) => HttpResponse::Ok().json(page),
        Err(err) => error_response(err, "Failed to list invoices"),
    }
}

#[get("/v1/invoices/{invoice_id}")]
pub async fn show_invoice(
    invoice_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match invoices::get_invoice(repo.get_ref(), &user, invoice_id.into_inner(), now()) {
        Ok(details) => HttpResponse::Ok().json(details),
        Err(err) => error_response(err, "Failed to load invoice"),
    }
}

#[post("/v1/invoices/{invoice_id}/void")]
pub async fn void_invoice(
    invoice_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match invoices::void_invoice(repo.get_ref(), &user, invoice_id.into_inner()) {
        Ok(invoice) => HttpResponse::Ok().json(invoice),
        Err(err) => error_response(err, "Failed to void invoice"),
    }
}

#[post("/v1/invoices/{invoice_id}/payments")]
pub async fn add_payment(
    invoice_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    form: web::Json<PaymentForm>,
) -> impl Responder {
    match invoices::record_payment(
        repo.get_ref(),
        &user,
        invoice_id.into_inner(),
        form.into_inner(),
        now(),
    ) {
        Ok(receipt) => HttpResponse::Created().json(receipt),
        Err(err) => error_response(err, "Failed to record payment"),
    }
}

#[get("/v1/invoices/{invoice_id}/payments/summary")]
pub async fn payment_summary(
    invoice_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match invoices::payment_summary(repo.get_ref(), &user, invoice_id.into_inner()) {
        Ok(summary) => HttpResponse::Ok().json(summary),
        Err(err) => error_response(err, "Failed to summarise payments"),
    }
}

#[post("/v1/payments/{payment_id}/refund")]
pub async fn refund_payment(
    payment_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    form: web::Json<RefundForm>,
) -> impl Responder {
    match invoices::refund_payment(
        repo.get_ref(),
        &user,
        payment_id.into_inner(),
        form.into_inner(),
    ) {
        Ok(receipt) => HttpResponse::Ok().json(receipt),
        Err(err) => error_response(err, "Failed to refund payment"),
    }
}
