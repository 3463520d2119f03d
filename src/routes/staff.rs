use actix_web::{HttpResponse, Responder, delete, get, patch, post, put, web};

use crate::domain::auth::AuthenticatedUser;
use crate::domain::pin::PinCipher;
use crate::forms::auth::PinForm;
use crate::forms::staff::{
    AddStaffForm, EditStaffForm, ReplaceSchedulesForm, ScheduleOverrideForm, StaffQueryParams,
};
use crate::repository::DieselRepository;
use crate::routes::error_response;
use crate::services::{pins, staff};

#[get("/v1/staff")]
pub async fn list_staff(
    params: web::Query<StaffQueryParams>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match staff::list_staff(repo.get_ref(), &user, params.active_only) {
        Ok(staff) => HttpResponse::Ok().json(staff),
        Err(err) => error_response(err, "Failed to list staff"),
    }
}

#[post("/v1/staff")]
pub async fn add_staff(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    form: web::Json<AddStaffForm>,
) -> impl Responder {
    match staff::create_staff(repo.get_ref(), &user, form.into_inner()) {
        Ok(staff) => HttpResponse::Created().json(staff),
        Err(err) => error_response(err, "Failed to add staff"),
    }
}

#[get("/v1/staff/{staff_id}")]
/// Staff member with their weekly schedule and overrides.
pub async fn show_staff(
    staff_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match staff::get_staff(repo.get_ref(), &user, staff_id.into_inner()) {
        Ok(details) => HttpResponse::Ok().json(details),
        Err(err) => error_response(err, "Failed to load staff"),
    }
}

#[patch("/v1/staff/{staff_id}")]
pub async fn update_staff(
    staff_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    form: web::Json<EditStaffForm>,
) -> impl Responder {
    match staff::update_staff(repo.get_ref(), &user, staff_id.into_inner(), form.into_inner()) {
        Ok(staff) => HttpResponse::Ok().json(staff),
        Err(err) => error_response(err, "Failed to update staff"),
    }
}

#[delete("/v1/staff/{staff_id}")]
pub async fn deactivate_staff(
    staff_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match staff::deactivate_staff(repo.get_ref(), &user, staff_id.into_inner()) {
        Ok(staff) => HttpResponse::Ok().json(staff),
        Err(err) => error_response(err, "Failed to deactivate staff"),
    }
}

#[put("/v1/staff/{staff_id}/pin")]
pub async fn set_pin(
    staff_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    cipher: web::Data<PinCipher>,
    form: web::Json<PinForm>,
) -> impl Responder {
    match pins::set_pin(
        repo.get_ref(),
        cipher.get_ref(),
        &user,
        staff_id.into_inner(),
        form.into_inner(),
    ) {
        Ok(staff) => HttpResponse::Ok().json(staff),
        Err(err) => error_response(err, "Failed to set PIN"),
    }
}

#[put("/v1/staff/{staff_id}/schedules")]
/// Replace the whole weekly schedule of a staff member.
pub async fn replace_schedules(
    staff_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    form: web::Json<ReplaceSchedulesForm>,
) -> impl Responder {
    match staff::replace_schedules(repo.get_ref(), &user, staff_id.into_inner(), form.into_inner())
    {
        Ok(schedules) => HttpResponse::Ok().json(schedules),
        Err(err) => error_response(err, "Failed to replace schedules"),
    }
}

#[put("/v1/staff/{staff_id}/overrides")]
pub async fn upsert_override(
    staff_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    form: web::Json<ScheduleOverrideForm>,
) -> impl Responder {
    match staff::upsert_override(repo.get_ref(), &user, staff_id.into_inner(), form.into_inner()) {
        Ok(entry) => HttpResponse::Ok().json(entry),
        Err(err) => error_response(err, "Failed to save schedule override"),
    }
}

#[delete("/v1/staff/{staff_id}/overrides/{date}")]
pub async fn delete_override(
    path: web::Path<(i32, String)>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let (staff_id, date) = path.into_inner();
    match staff::delete_override(repo.get_ref(), &user, staff_id, &date) {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(err) => error_response(err, "Failed to delete schedule override"),
    }
}
