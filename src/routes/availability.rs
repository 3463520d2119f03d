use actix_web::{HttpResponse, Responder, get, web};

use crate::domain::auth::AuthenticatedUser;
use crate::forms::availability::{AvailabilityQueryParams, CapacityQueryParams};
use crate::repository::DieselRepository;
use crate::routes::{error_response, now};
use crate::services::availability;

#[get("/v1/availability")]
/// Bookable slots of one staff member for a service over a date range.
pub async fn staff_availability(
    params: web::Query<AvailabilityQueryParams>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match availability::staff_availability(repo.get_ref(), &user, params.into_inner(), now()) {
        Ok(slots) => HttpResponse::Ok().json(slots),
        Err(err) => error_response(err, "Failed to compute availability"),
    }
}

#[get("/v1/availability/capacity")]
pub async fn unassigned_capacity(
    params: web::Query<CapacityQueryParams>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match availability::unassigned_capacity(repo.get_ref(), &user, params.into_inner()) {
        Ok(evaluation) => HttpResponse::Ok().json(evaluation),
        Err(err) => error_response(err, "Failed to evaluate capacity"),
    }
}
