//! Unauthenticated endpoints of the online booking page.
//!
//! The tenant comes from the `X-Merchant-Subdomain` header.

use actix_web::{HttpResponse, Responder, get, post, web};

use crate::domain::auth::MerchantSubdomain;
use crate::forms::availability::PublicAvailabilityQueryParams;
use crate::forms::bookings::PublicBookingForm;
use crate::repository::DieselRepository;
use crate::routes::{error_response, now};
use crate::services::{availability, bookings, public};

#[get("/v1/public/merchant")]
pub async fn show_merchant(
    subdomain: MerchantSubdomain,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match public::merchant_info(repo.get_ref(), &subdomain) {
        Ok(merchant) => HttpResponse::Ok().json(merchant),
        Err(err) => error_response(err, "Failed to load public merchant"),
    }
}

#[get("/v1/public/services")]
pub async fn list_services(
    subdomain: MerchantSubdomain,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match public::list_services(repo.get_ref(), &subdomain) {
        Ok(services) => HttpResponse::Ok().json(services),
        Err(err) => error_response(err, "Failed to list public services"),
    }
}

#[get("/v1/public/staff")]
pub async fn list_staff(
    subdomain: MerchantSubdomain,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match public::list_staff(repo.get_ref(), &subdomain) {
        Ok(staff) => HttpResponse::Ok().json(staff),
        Err(err) => error_response(err, "Failed to list public staff"),
    }
}

#[get("/v1/public/availability")]
pub async fn show_availability(
    params: web::Query<PublicAvailabilityQueryParams>,
    subdomain: MerchantSubdomain,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match availability::public_availability(repo.get_ref(), &subdomain, params.into_inner(), now())
    {
        Ok(slots) => HttpResponse::Ok().json(slots),
        Err(err) => error_response(err, "Failed to compute public availability"),
    }
}

#[post("/v1/public/bookings")]
pub async fn add_booking(
    subdomain: MerchantSubdomain,
    repo: web::Data<DieselRepository>,
    form: web::Json<PublicBookingForm>,
) -> impl Responder {
    match bookings::create_public_booking(repo.get_ref(), &subdomain, form.into_inner(), now()) {
        Ok(booking) => HttpResponse::Created().json(booking),
        Err(err) => error_response(err, "Failed to create public booking"),
    }
}
