use actix_web::{HttpResponse, Responder, delete, get, patch, post, web};

use crate::domain::auth::AuthenticatedUser;
use crate::forms::catalog::{AddServiceForm, EditServiceForm, ServiceQueryParams};
use crate::repository::DieselRepository;
use crate::routes::error_response;
use crate::services::catalog;

#[get("/v1/services")]
pub async fn list_services(
    params: web::Query<ServiceQueryParams>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match catalog::list_services(repo.get_ref(), &user, params.into_inner()) {
        Ok(services) => HttpResponse::Ok().json(services),
        Err(err) => error_response(err, "Failed to list services"),
    }
}

#[post("/v1/services")]
pub async fn add_service(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    form: web::Json<AddServiceForm>,
) -> impl Responder {
    match catalog::create_service(repo.get_ref(), &user, form.into_inner()) {
        Ok(service) => HttpResponse::Created().json(service),
        Err(err) => error_response(err, "Failed to add service"),
    }
}

#[get("/v1/services/{service_id}")]
pub async fn show_service(
    service_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match catalog::get_service(repo.get_ref(), &user, service_id.into_inner()) {
        Ok(service) => HttpResponse::Ok().json(service),
        Err(err) => error_response(err, "Failed to load service"),
    }
}

#[patch("/v1/services/{service_id}")]
pub async fn update_service(
    service_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    form: web::Json<EditServiceForm>,
) -> impl Responder {
    match catalog::update_service(
        repo.get_ref(),
        &user,
        service_id.into_inner(),
        form.into_inner(),
    ) {
        Ok(service) => HttpResponse::Ok().json(service),
        Err(err) => error_response(err, "Failed to update service"),
    }
}

#[delete("/v1/services/{service_id}")]
/// Services are deactivated, never removed, so past bookings keep their lines.
pub async fn deactivate_service(
    service_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match catalog::deactivate_service(repo.get_ref(), &user, service_id.into_inner()) {
        Ok(service) => HttpResponse::Ok().json(service),
        Err(err) => error_response(err, "Failed to deactivate service"),
    }
}
