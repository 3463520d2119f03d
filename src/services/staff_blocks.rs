use chrono::NaiveDateTime;
use pushkind_common::routes::check_role;

use crate::SERVICE_ACCESS_ROLE;
use crate::domain::auth::AuthenticatedUser;
use crate::domain::booking::BookingListQuery;
use crate::domain::staff_block::{StaffBlock, StaffBlockOutcome};
use crate::forms::staff_blocks::{AddStaffBlockForm, StaffBlockQueryParams};
use crate::repository::{BookingReader, StaffBlockReader, StaffBlockWriter, StaffReader};
use crate::services::{ServiceError, ServiceResult};

/// Record time off for a staff member.
///
/// Blocks that overlap or touch the new range are merged into it. The outcome
/// lists upcoming active bookings the merged block now covers.
pub fn create_block<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: AddStaffBlockForm,
    now: NaiveDateTime,
) -> ServiceResult<StaffBlockOutcome>
where
    R: StaffReader + StaffBlockWriter + BookingReader + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }
    let new_block = form
        .into_new_block(user.merchant_id)
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    repo.get_staff_by_id(new_block.staff_id, user.merchant_id)?
        .ok_or(ServiceError::NotFound)?;

    let block = repo.create_staff_block(&new_block)?;

    let warnings = if block.end_time > now {
        let query = BookingListQuery::new(user.merchant_id)
            .staff(block.staff_id)
            .overlapping(block.start_time.max(now), block.end_time)
            .active();
        repo.list_bookings(query)?.1
    } else {
        Vec::new()
    };

    if !warnings.is_empty() {
        log::warn!(
            "Block {} for staff {} overlaps {} upcoming booking(s)",
            block.id,
            block.staff_id,
            warnings.len()
        );
    }

    Ok(StaffBlockOutcome { block, warnings })
}

pub fn list_blocks<R>(
    repo: &R,
    user: &AuthenticatedUser,
    params: StaffBlockQueryParams,
) -> ServiceResult<Vec<StaffBlock>>
where
    R: StaffBlockReader + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }
    repo.list_staff_blocks(params.into_query(user.merchant_id))
        .map_err(ServiceError::from)
}

pub fn delete_block<R>(repo: &R, user: &AuthenticatedUser, block_id: i32) -> ServiceResult<()>
where
    R: StaffBlockWriter + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }
    repo.delete_staff_block(block_id, user.merchant_id)
        .map_err(ServiceError::from)
}
