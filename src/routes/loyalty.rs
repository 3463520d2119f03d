use actix_web::{HttpResponse, Responder, get, put, web};

use crate::domain::auth::AuthenticatedUser;
use crate::forms::loyalty::LoyaltyProgramForm;
use crate::repository::DieselRepository;
use crate::routes::error_response;
use crate::services::loyalty;

#[get("/v1/loyalty/program")]
/// The merchant's loyalty program, or `null` before one is configured.
pub async fn show_program(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match loyalty::get_program(repo.get_ref(), &user) {
        Ok(program) => HttpResponse::Ok().json(program),
        Err(err) => error_response(err, "Failed to load loyalty program"),
    }
}

#[put("/v1/loyalty/program")]
pub async fn save_program(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    form: web::Json<LoyaltyProgramForm>,
) -> impl Responder {
    match loyalty::save_program(repo.get_ref(), &user, form.into_inner()) {
        Ok(program) => HttpResponse::Ok().json(program),
        Err(err) => error_response(err, "Failed to save loyalty program"),
    }
}
