use actix_web::{HttpResponse, Responder, get, patch, post, web};

use crate::domain::auth::AuthenticatedUser;
use crate::domain::booking::BookingTransition;
use crate::forms::bookings::{
    BookingQueryParams, CalendarQueryParams, CancelBookingForm, CreateBookingForm,
    UpdateBookingForm,
};
use crate::repository::DieselRepository;
use crate::routes::{error_response, now};
use crate::services::bookings;

#[post("/v1/bookings")]
/// Book services for an existing customer at the front desk.
pub async fn add_booking(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    form: web::Json<CreateBookingForm>,
) -> impl Responder {
    match bookings::create_booking(repo.get_ref(), &user, form.into_inner(), now()) {
        Ok(booking) => HttpResponse::Created().json(booking),
        Err(err) => error_response(err, "Failed to create booking"),
    }
}

#[get("/v1/bookings")]
pub async fn list_bookings(
    params: web::Query<BookingQueryParams>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match bookings::list_bookings(repo.get_ref(), &user, params.into_inner()) {
        Ok(page) => HttpResponse::Ok().json(page),
        Err(err) => error_response(err, "Failed to list bookings"),
    }
}

#[get("/v1/bookings/calendar")]
/// One local day of active bookings in per-staff columns.
pub async fn show_calendar(
    params: web::Query<CalendarQueryParams>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match bookings::calendar(repo.get_ref(), &user, params.into_inner()) {
        Ok(day) => HttpResponse::Ok().json(day),
        Err(err) => error_response(err, "Failed to load calendar"),
    }
}

#[get("/v1/bookings/{booking_id}")]
pub async fn show_booking(
    booking_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match bookings::get_booking(repo.get_ref(), &user, booking_id.into_inner()) {
        Ok(booking) => HttpResponse::Ok().json(booking),
        Err(err) => error_response(err, "Failed to load booking"),
    }
}

#[patch("/v1/bookings/{booking_id}")]
pub async fn update_booking(
    booking_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    form: web::Json<UpdateBookingForm>,
) -> impl Responder {
    match bookings::update_booking(
        repo.get_ref(),
        &user,
        booking_id.into_inner(),
        form.into_inner(),
        now(),
    ) {
        Ok(booking) => HttpResponse::Ok().json(booking),
        Err(err) => error_response(err, "Failed to update booking"),
    }
}

fn transition(
    repo: &DieselRepository,
    user: &AuthenticatedUser,
    booking_id: i32,
    transition: BookingTransition,
) -> HttpResponse {
    match bookings::transition_booking(repo, user, booking_id, transition, None, now()) {
        Ok(booking) => HttpResponse::Ok().json(booking),
        Err(err) => error_response(err, "Failed to change booking status"),
    }
}

#[post("/v1/bookings/{booking_id}/confirm")]
pub async fn confirm_booking(
    booking_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    transition(repo.get_ref(), &user, booking_id.into_inner(), BookingTransition::Confirm)
}

#[post("/v1/bookings/{booking_id}/start")]
pub async fn start_booking(
    booking_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    transition(repo.get_ref(), &user, booking_id.into_inner(), BookingTransition::Start)
}

#[post("/v1/bookings/{booking_id}/complete")]
pub async fn complete_booking(
    booking_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    transition(repo.get_ref(), &user, booking_id.into_inner(), BookingTransition::Complete)
}

#[post("/v1/bookings/{booking_id}/no-show")]
pub async fn no_show_booking(
    booking_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    transition(repo.get_ref(), &user, booking_id.into_inner(), BookingTransition::NoShow)
}

#[post("/v1/bookings/{booking_id}/cancel")]
pub async fn cancel_booking(
    booking_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    form: web::Json<CancelBookingForm>,
) -> impl Responder {
    match bookings::cancel_booking(
        repo.get_ref(),
        &user,
        booking_id.into_inner(),
        form.into_inner(),
        now(),
    ) {
        Ok(booking) => HttpResponse::Ok().json(booking),
        Err(err) => error_response(err, "Failed to cancel booking"),
    }
}
