//! Terminal PIN checks, screen unlock and PIN assignment.

use std::collections::HashSet;

use chrono::NaiveDateTime;
use pushkind_common::routes::check_role;
use serde::Serialize;
use serde_json::json;

use crate::SERVICE_ACCESS_ROLE;
use crate::domain::audit::NewAuditLog;
use crate::domain::auth::AuthenticatedUser;
use crate::domain::pin::{FailedAttempt, PinAttemptTracker, PinCipher, locked_message};
use crate::domain::staff::{AccessLevel, Staff, StaffListQuery, StaffView};
use crate::forms::auth::{PinForm, VerifyPinForm};
use crate::repository::{AuditWriter, StaffReader, StaffWriter};
use crate::services::{ServiceError, ServiceResult};

const ACCOUNT_LOCKED_MESSAGE: &str = "Too many failed attempts. Account has been locked.";

/// Staff member identified by a PIN.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PinStaff {
    pub id: i32,
    pub first_name: String,
    pub last_name: Option<String>,
    pub access_level: AccessLevel,
    pub role: &'static str,
}

impl From<&Staff> for PinStaff {
    fn from(staff: &Staff) -> Self {
        Self {
            id: staff.id,
            first_name: staff.first_name.clone(),
            last_name: staff.last_name.clone(),
            access_level: staff.access_level,
            role: staff.access_level.role_name(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PinCheck {
    pub success: bool,
    pub staff: PinStaff,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct PinStatus {
    pub has_pins: bool,
    pub staff_count: usize,
    pub has_duplicates: bool,
}

fn ensure_unlocked(tracker: &PinAttemptTracker, key: &str, now: NaiveDateTime) -> ServiceResult<()> {
    match tracker.locked_minutes(key, now) {
        Some(minutes) => {
            log::warn!("PIN attempt on locked key {key}");
            Err(ServiceError::Locked(locked_message(minutes)))
        }
        None => Ok(()),
    }
}

fn failed_attempt(tracker: &PinAttemptTracker, key: &str, now: NaiveDateTime) -> ServiceError {
    match tracker.record_failure(key, now) {
        FailedAttempt::Locked => {
            log::warn!("Locking PIN key {key} after repeated failures");
            ServiceError::Locked(ACCOUNT_LOCKED_MESSAGE.to_string())
        }
        FailedAttempt::Remaining(remaining) => {
            let noun = if remaining == 1 { "attempt" } else { "attempts" };
            ServiceError::InvalidCredentials(format!("Invalid PIN. {remaining} {noun} remaining."))
        }
    }
}

/// Verify a staff PIN and check the staff member may perform `action`.
pub fn verify_pin<R>(
    repo: &R,
    cipher: &PinCipher,
    tracker: &PinAttemptTracker,
    user: &AuthenticatedUser,
    form: VerifyPinForm,
    now: NaiveDateTime,
) -> ServiceResult<PinCheck>
where
    R: StaffReader + AuditWriter + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }
    let request = form
        .into_verification()
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    let lock_key = format!("{}:{}", user.merchant_id, request.staff_id);
    ensure_unlocked(tracker, &lock_key, now)?;

    let staff = repo
        .get_staff_by_id(request.staff_id, user.merchant_id)?
        .filter(Staff::is_active)
        .ok_or_else(|| ServiceError::InvalidCredentials("Staff member not found".to_string()))?;

    let entity_id = request
        .resource_id
        .clone()
        .unwrap_or_else(|| request.action.clone());

    let pin_matches = staff
        .pin_cipher
        .as_deref()
        .is_some_and(|stored| cipher.matches(stored, &request.pin));
    if !pin_matches {
        repo.create_audit_log(
            &NewAuditLog::new(user.merchant_id, "pin.verify.failed", "action", &entity_id)
                .with_details(json!({ "attempted_action": request.action })),
        )?;
        return Err(failed_attempt(tracker, &lock_key, now));
    }
    tracker.clear(&lock_key);

    let required = AccessLevel::required_for(&request.action);
    if staff.access_level < required {
        repo.create_audit_log(
            &NewAuditLog::new(user.merchant_id, "action.unauthorized", "action", &entity_id)
                .by_staff(staff.id)
                .with_details(json!({
                    "attempted_action": request.action,
                    "staff_access_level": i32::from(staff.access_level),
                    "staff_name": staff.full_name(),
                })),
        )?;
        return Err(ServiceError::Forbidden(
            "You do not have permission to perform this action".to_string(),
        ));
    }

    repo.create_audit_log(
        &NewAuditLog::new(
            user.merchant_id,
            format!("action.{}", request.action),
            "action",
            &entity_id,
        )
        .by_staff(staff.id)
        .with_details(json!({
            "verified_action": request.action,
            "staff_name": staff.full_name(),
            "staff_access_level": i32::from(staff.access_level),
        })),
    )?;

    Ok(PinCheck {
        success: true,
        staff: PinStaff::from(&staff),
    })
}

fn active_staff_with_pins<R>(repo: &R, merchant_id: i32) -> ServiceResult<Vec<Staff>>
where
    R: StaffReader + ?Sized,
{
    let staff = repo.list_staff(StaffListQuery::new(merchant_id).active())?;
    Ok(staff.into_iter().filter(Staff::has_pin).collect())
}

/// Identify which active staff member owns `pin`.
pub fn unlock<R>(
    repo: &R,
    cipher: &PinCipher,
    tracker: &PinAttemptTracker,
    user: &AuthenticatedUser,
    form: PinForm,
    now: NaiveDateTime,
) -> ServiceResult<PinCheck>
where
    R: StaffReader + AuditWriter + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }
    let lock_key = format!("unlock:{}", user.merchant_id);
    ensure_unlocked(tracker, &lock_key, now)?;

    // A malformed PIN can never match; it still counts as a failed attempt.
    let pin = form.into_pin().ok();
    let matched = match pin {
        Some(pin) => active_staff_with_pins(repo, user.merchant_id)?
            .into_iter()
            .find(|staff| {
                staff
                    .pin_cipher
                    .as_deref()
                    .is_some_and(|stored| cipher.matches(stored, &pin))
            }),
        None => None,
    };
    let Some(staff) = matched else {
        return Err(failed_attempt(tracker, &lock_key, now));
    };

    tracker.clear(&lock_key);
    repo.create_audit_log(
        &NewAuditLog::new(user.merchant_id, "staff.unlock", "staff", staff.id)
            .by_staff(staff.id)
            .with_details(json!({ "staff_name": staff.full_name() })),
    )?;

    Ok(PinCheck {
        success: true,
        staff: PinStaff::from(&staff),
    })
}

/// Whether the merchant's active staff have PINs, and whether any repeat.
pub fn pin_status<R>(repo: &R, cipher: &PinCipher, user: &AuthenticatedUser) -> ServiceResult<PinStatus>
where
    R: StaffReader + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }
    let staff = active_staff_with_pins(repo, user.merchant_id)?;
    let mut seen = HashSet::new();
    let has_duplicates = staff
        .iter()
        .filter_map(|member| member.pin_cipher.as_deref())
        .filter_map(|stored| cipher.decrypt(stored).ok())
        .any(|pin| !seen.insert(pin));

    Ok(PinStatus {
        has_pins: !staff.is_empty(),
        staff_count: staff.len(),
        has_duplicates,
    })
}

/// Encrypt and store a staff PIN. PINs are unique among the merchant's active staff.
pub fn set_pin<R>(
    repo: &R,
    cipher: &PinCipher,
    user: &AuthenticatedUser,
    staff_id: i32,
    form: PinForm,
) -> ServiceResult<StaffView>
where
    R: StaffReader + StaffWriter + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }
    let pin = form
        .into_pin()
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    repo.get_staff_by_id(staff_id, user.merchant_id)?
        .ok_or(ServiceError::NotFound)?;

    let taken = active_staff_with_pins(repo, user.merchant_id)?
        .iter()
        .filter(|other| other.id != staff_id)
        .filter_map(|other| other.pin_cipher.as_deref())
        .any(|stored| cipher.matches(stored, &pin));
    if taken {
        return Err(ServiceError::conflict(
            "This PIN is already in use by another staff member",
        ));
    }

    let stored = cipher
        .encrypt(&pin)
        .map_err(|err| ServiceError::Form(err.to_string()))?;
    let staff = repo.set_staff_pin(staff_id, user.merchant_id, &stored)?;
    Ok(StaffView::from(staff))
}
