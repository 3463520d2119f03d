use actix_multipart::form::MultipartForm;
use actix_web::{HttpResponse, Responder, delete, get, patch, post, web};

use crate::domain::auth::AuthenticatedUser;
use crate::forms::customers::{
    AddCustomerForm, CustomerQueryParams, EditCustomerForm, UploadCustomersForm,
};
use crate::forms::loyalty::{AdjustPointsForm, RedeemPointsForm};
use crate::repository::DieselRepository;
use crate::routes::error_response;
use crate::services::{customers, loyalty};

#[get("/v1/customers")]
/// Search customers by name, email or phone with pagination.
pub async fn list_customers(
    params: web::Query<CustomerQueryParams>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match customers::list_customers(repo.get_ref(), &user, params.into_inner()) {
        Ok(page) => HttpResponse::Ok().json(page),
        Err(err) => error_response(err, "Failed to list customers"),
    }
}

#[post("/v1/customers")]
pub async fn add_customer(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    form: web::Json<AddCustomerForm>,
) -> impl Responder {
    match customers::create_customer(repo.get_ref(), &user, form.into_inner()) {
        Ok(customer) => HttpResponse::Created().json(customer),
        Err(err) => error_response(err, "Failed to add customer"),
    }
}

#[post("/v1/customers/import")]
pub async fn import_customers(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    MultipartForm(mut form): MultipartForm<UploadCustomersForm>,
) -> impl Responder {
    match customers::import_customers(repo.get_ref(), &user, &mut form) {
        Ok(summary) => HttpResponse::Ok().json(summary),
        Err(err) => error_response(err, "Failed to import customers"),
    }
}

#[get("/v1/customers/{customer_id}")]
pub async fn show_customer(
    customer_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match customers::get_customer(repo.get_ref(), &user, customer_id.into_inner()) {
        Ok(customer) => HttpResponse::Ok().json(customer),
        Err(err) => error_response(err, "Failed to load customer"),
    }
}

#[patch("/v1/customers/{customer_id}")]
pub async fn update_customer(
    customer_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    form: web::Json<EditCustomerForm>,
) -> impl Responder {
    match customers::update_customer(
        repo.get_ref(),
        &user,
        customer_id.into_inner(),
        form.into_inner(),
    ) {
        Ok(customer) => HttpResponse::Ok().json(customer),
        Err(err) => error_response(err, "Failed to update customer"),
    }
}

#[delete("/v1/customers/{customer_id}")]
pub async fn delete_customer(
    customer_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match customers::delete_customer(repo.get_ref(), &user, customer_id.into_inner()) {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(err) => error_response(err, "Failed to delete customer"),
    }
}

#[get("/v1/customers/{customer_id}/loyalty")]
pub async fn customer_loyalty(
    customer_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match loyalty::customer_loyalty(repo.get_ref(), &user, customer_id.into_inner()) {
        Ok(overview) => HttpResponse::Ok().json(overview),
        Err(err) => error_response(err, "Failed to load loyalty card"),
    }
}

#[post("/v1/customers/{customer_id}/loyalty/redeem")]
pub async fn redeem_points(
    customer_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    form: web::Json<RedeemPointsForm>,
) -> impl Responder {
    match loyalty::redeem(
        repo.get_ref(),
        &user,
        customer_id.into_inner(),
        form.into_inner(),
    ) {
        Ok(receipt) => HttpResponse::Ok().json(receipt),
        Err(err) => error_response(err, "Failed to redeem points"),
    }
}

#[post("/v1/customers/{customer_id}/loyalty/adjust")]
pub async fn adjust_points(
    customer_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    form: web::Json<AdjustPointsForm>,
) -> impl Responder {
    match loyalty::adjust(
        repo.get_ref(),
        &user,
        customer_id.into_inner(),
        form.into_inner(),
    ) {
        Ok(receipt) => HttpResponse::Ok().json(receipt),
        Err(err) => error_response(err, "Failed to adjust points"),
    }
}
