use actix_web::{HttpResponse, Responder, get, post, web};

use crate::domain::auth::AuthenticatedUser;
use crate::domain::pin::{PinAttemptTracker, PinCipher};
use crate::forms::auth::{LoginForm, PinForm, VerifyPinForm};
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::{error_response, now};
use crate::services::{auth as auth_service, pins};

#[post("/v1/auth/login")]
/// Exchange merchant credentials for a bearer token.
pub async fn login(
    repo: web::Data<DieselRepository>,
    config: web::Data<ServerConfig>,
    form: web::Json<LoginForm>,
) -> impl Responder {
    match auth_service::login(repo.get_ref(), config.get_ref(), form.into_inner(), now()) {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(err) => error_response(err, "Failed to log in"),
    }
}

#[get("/v1/auth/me")]
pub async fn me(user: AuthenticatedUser, repo: web::Data<DieselRepository>) -> impl Responder {
    match auth_service::current_merchant(repo.get_ref(), &user) {
        Ok(merchant) => HttpResponse::Ok().json(merchant),
        Err(err) => error_response(err, "Failed to load merchant"),
    }
}

#[post("/v1/auth/verify-pin")]
/// Check a staff PIN before a guarded terminal action.
pub async fn verify_pin(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    cipher: web::Data<PinCipher>,
    tracker: web::Data<PinAttemptTracker>,
    form: web::Json<VerifyPinForm>,
) -> impl Responder {
    match pins::verify_pin(
        repo.get_ref(),
        cipher.get_ref(),
        tracker.get_ref(),
        &user,
        form.into_inner(),
        now(),
    ) {
        Ok(check) => HttpResponse::Ok().json(check),
        Err(err) => error_response(err, "Failed to verify PIN"),
    }
}

#[post("/v1/auth/unlock")]
pub async fn unlock(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    cipher: web::Data<PinCipher>,
    tracker: web::Data<PinAttemptTracker>,
    form: web::Json<PinForm>,
) -> impl Responder {
    match pins::unlock(
        repo.get_ref(),
        cipher.get_ref(),
        tracker.get_ref(),
        &user,
        form.into_inner(),
        now(),
    ) {
        Ok(check) => HttpResponse::Ok().json(check),
        Err(err) => error_response(err, "Failed to unlock"),
    }
}

#[get("/v1/auth/pin-status")]
pub async fn pin_status(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    cipher: web::Data<PinCipher>,
) -> impl Responder {
    match pins::pin_status(repo.get_ref(), cipher.get_ref(), &user) {
        Ok(status) => HttpResponse::Ok().json(status),
        Err(err) => error_response(err, "Failed to load PIN status"),
    }
}
