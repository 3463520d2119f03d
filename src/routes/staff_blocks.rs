use actix_web::{HttpResponse, Responder, delete, get, post, web};

use crate::domain::auth::AuthenticatedUser;
use crate::forms::staff_blocks::{AddStaffBlockForm, StaffBlockQueryParams};
use crate::repository::DieselRepository;
use crate::routes::{error_response, now};
use crate::services::staff_blocks;

#[get("/v1/staff-blocks")]
pub async fn list_blocks(
    params: web::Query<StaffBlockQueryParams>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match staff_blocks::list_blocks(repo.get_ref(), &user, params.into_inner()) {
        Ok(blocks) => HttpResponse::Ok().json(blocks),
        Err(err) => error_response(err, "Failed to list staff blocks"),
    }
}

#[post("/v1/staff-blocks")]
/// Block out staff time, merging with adjacent blocks.
///
/// The response lists upcoming bookings that now fall inside the block.
pub async fn add_block(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    form: web::Json<AddStaffBlockForm>,
) -> impl Responder {
    match staff_blocks::create_block(repo.get_ref(), &user, form.into_inner(), now()) {
        Ok(outcome) => HttpResponse::Created().json(outcome),
        Err(err) => error_response(err, "Failed to add staff block"),
    }
}

#[delete("/v1/staff-blocks/{block_id}")]
pub async fn delete_block(
    block_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match staff_blocks::delete_block(repo.get_ref(), &user, block_id.into_inner()) {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(err) => error_response(err, "Failed to delete staff block"),
    }
}
