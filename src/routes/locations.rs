use actix_web::{HttpResponse, Responder, delete, get, patch, post, web};

use crate::domain::auth::AuthenticatedUser;
use crate::forms::locations::{AddLocationForm, EditLocationForm};
use crate::repository::DieselRepository;
use crate::routes::error_response;
use crate::services::locations;

#[get("/v1/locations")]
pub async fn list_locations(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match locations::list_locations(repo.get_ref(), &user) {
        Ok(locations) => HttpResponse::Ok().json(locations),
        Err(err) => error_response(err, "Failed to list locations"),
    }
}

#[post("/v1/locations")]
pub async fn add_location(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    form: web::Json<AddLocationForm>,
) -> impl Responder {
    match locations::create_location(repo.get_ref(), &user, form.into_inner()) {
        Ok(location) => HttpResponse::Created().json(location),
        Err(err) => error_response(err, "Failed to add location"),
    }
}

#[patch("/v1/locations/{location_id}")]
pub async fn update_location(
    location_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    form: web::Json<EditLocationForm>,
) -> impl Responder {
    match locations::update_location(
        repo.get_ref(),
        &user,
        location_id.into_inner(),
        form.into_inner(),
    ) {
        Ok(location) => HttpResponse::Ok().json(location),
        Err(err) => error_response(err, "Failed to update location"),
    }
}

#[delete("/v1/locations/{location_id}")]
pub async fn delete_location(
    location_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match locations::delete_location(repo.get_ref(), &user, location_id.into_inner()) {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(err) => error_response(err, "Failed to delete location"),
    }
}
