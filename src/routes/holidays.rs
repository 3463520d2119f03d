use actix_web::{HttpResponse, Responder, delete, get, patch, post, web};

use crate::domain::auth::AuthenticatedUser;
use crate::forms::holidays::{AddHolidayForm, EditHolidayForm, SyncHolidaysForm};
use crate::repository::DieselRepository;
use crate::routes::{error_response, now};
use crate::services::holidays;

#[get("/v1/holidays")]
pub async fn list_holidays(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match holidays::list_holidays(repo.get_ref(), &user, now()) {
        Ok(overview) => HttpResponse::Ok().json(overview),
        Err(err) => error_response(err, "Failed to list holidays"),
    }
}

#[post("/v1/holidays")]
pub async fn add_holiday(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    form: web::Json<AddHolidayForm>,
) -> impl Responder {
    match holidays::create_holiday(repo.get_ref(), &user, form.into_inner()) {
        Ok(holiday) => HttpResponse::Created().json(holiday),
        Err(err) => error_response(err, "Failed to add holiday"),
    }
}

#[post("/v1/holidays/sync")]
/// Replace state-sourced holidays with the public holidays of a state and year.
pub async fn sync_holidays(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    form: web::Json<SyncHolidaysForm>,
) -> impl Responder {
    match holidays::sync_holidays(repo.get_ref(), &user, form.into_inner(), now()) {
        Ok(result) => HttpResponse::Ok().json(result),
        Err(err) => error_response(err, "Failed to sync holidays"),
    }
}

#[patch("/v1/holidays/{holiday_id}")]
pub async fn update_holiday(
    holiday_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    form: web::Json<EditHolidayForm>,
) -> impl Responder {
    match holidays::update_holiday(
        repo.get_ref(),
        &user,
        holiday_id.into_inner(),
        form.into_inner(),
    ) {
        Ok(holiday) => HttpResponse::Ok().json(holiday),
        Err(err) => error_response(err, "Failed to update holiday"),
    }
}

#[delete("/v1/holidays/{holiday_id}")]
pub async fn delete_holiday(
    holiday_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match holidays::delete_holiday(repo.get_ref(), &user, holiday_id.into_inner()) {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(err) => error_response(err, "Failed to delete holiday"),
    }
}
