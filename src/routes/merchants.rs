use actix_web::{HttpResponse, Responder, get, patch, web};

use crate::domain::auth::AuthenticatedUser;
use crate::forms::merchants::UpdateSettingsForm;
use crate::repository::DieselRepository;
use crate::routes::error_response;
use crate::services::merchants;

#[get("/v1/merchant")]
pub async fn show_merchant(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match merchants::get_merchant(repo.get_ref(), &user) {
        Ok(merchant) => HttpResponse::Ok().json(merchant),
        Err(err) => error_response(err, "Failed to load merchant"),
    }
}

#[patch("/v1/merchant/settings")]
/// Merge a partial settings payload into the merchant settings.
pub async fn update_settings(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    form: web::Json<UpdateSettingsForm>,
) -> impl Responder {
    match merchants::update_settings(repo.get_ref(), &user, form.into_inner()) {
        Ok(merchant) => HttpResponse::Ok().json(merchant),
        Err(err) => error_response(err, "Failed to update settings"),
    }
}
