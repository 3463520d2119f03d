use pushkind_common::routes::check_role;
use serde::Serialize;

use crate::SERVICE_ACCESS_ROLE;
use crate::domain::auth::AuthenticatedUser;
use crate::domain::schedule::{ScheduleOverride, StaffSchedule};
use crate::domain::staff::{StaffListQuery, StaffStatus, StaffView, UpdateStaff};
use crate::forms::parse_date;
use crate::forms::staff::{
    AddStaffForm, EditStaffForm, ReplaceSchedulesForm, ScheduleOverrideForm,
};
use crate::repository::{StaffReader, StaffWriter};
use crate::services::{ServiceError, ServiceResult};

/// Staff member with their weekly schedule and date overrides.
#[derive(Debug, Clone, Serialize)]
pub struct StaffDetails {
    #[serde(flatten)]
    pub staff: StaffView,
    pub schedules: Vec<StaffSchedule>,
    pub overrides: Vec<ScheduleOverride>,
}

pub fn list_staff<R>(
    repo: &R,
    user: &AuthenticatedUser,
    active_only: bool,
) -> ServiceResult<Vec<StaffView>>
where
    R: StaffReader + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }
    let mut query = StaffListQuery::new(user.merchant_id);
    if active_only {
        query = query.active();
    }
    let staff = repo.list_staff(query)?;
    Ok(staff.into_iter().map(StaffView::from).collect())
}

pub fn get_staff<R>(repo: &R, user: &AuthenticatedUser, staff_id: i32) -> ServiceResult<StaffDetails>
where
    R: StaffReader + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }
    let staff = repo
        .get_staff_by_id(staff_id, user.merchant_id)?
        .ok_or(ServiceError::NotFound)?;
    let schedules = repo.list_staff_schedules(staff_id, user.merchant_id)?;
    let overrides = repo.list_schedule_overrides(staff_id, user.merchant_id)?;

    Ok(StaffDetails {
        staff: StaffView::from(staff),
        schedules,
        overrides,
    })
}

pub fn create_staff<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: AddStaffForm,
) -> ServiceResult<StaffView>
where
    R: StaffWriter + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }
    let new_staff = form
        .into_new_staff(user.merchant_id)
        .map_err(|err| ServiceError::Form(err.to_string()))?;
    let staff = repo.create_staff(&new_staff)?;
    log::info!("Created staff {} for merchant {}", staff.id, user.merchant_id);
    Ok(StaffView::from(staff))
}

pub fn update_staff<R>(
    repo: &R,
    user: &AuthenticatedUser,
    staff_id: i32,
    form: EditStaffForm,
) -> ServiceResult<StaffView>
where
    R: StaffWriter + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }
    let updates = form
        .into_update_staff()
        .map_err(|err| ServiceError::Form(err.to_string()))?;
    let staff = repo.update_staff(staff_id, user.merchant_id, &updates)?;
    Ok(StaffView::from(staff))
}

/// Staff are never removed; deleting marks them inactive.
pub fn deactivate_staff<R>(
    repo: &R,
    user: &AuthenticatedUser,
    staff_id: i32,
) -> ServiceResult<StaffView>
where
    R: StaffWriter + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }
    let updates = UpdateStaff {
        status: Some(StaffStatus::Inactive),
        ..UpdateStaff::default()
    };
    let staff = repo.update_staff(staff_id, user.merchant_id, &updates)?;
    log::info!("Deactivated staff {} for merchant {}", staff.id, user.merchant_id);
    Ok(StaffView::from(staff))
}

pub fn replace_schedules<R>(
    repo: &R,
    user: &AuthenticatedUser,
    staff_id: i32,
    form: ReplaceSchedulesForm,
) -> ServiceResult<Vec<StaffSchedule>>
where
    R: StaffWriter + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }
    let schedules = form
        .into_new_schedules(staff_id)
        .map_err(|err| ServiceError::Form(err.to_string()))?;
    repo.replace_staff_schedules(staff_id, user.merchant_id, &schedules)
        .map_err(ServiceError::from)
}

pub fn upsert_override<R>(
    repo: &R,
    user: &AuthenticatedUser,
    staff_id: i32,
    form: ScheduleOverrideForm,
) -> ServiceResult<ScheduleOverride>
where
    R: StaffWriter + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }
    let entry = form
        .into_new_override(staff_id)
        .map_err(|err| ServiceError::Form(err.to_string()))?;
    repo.upsert_schedule_override(user.merchant_id, &entry)
        .map_err(ServiceError::from)
}

pub fn delete_override<R>(
    repo: &R,
    user: &AuthenticatedUser,
    staff_id: i32,
    date: &str,
) -> ServiceResult<()>
where
    R: StaffWriter + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }
    let date =
        parse_date(date).ok_or_else(|| ServiceError::Form(format!("invalid date `{date}`")))?;
    repo.delete_schedule_override(staff_id, user.merchant_id, date)
        .map_err(ServiceError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::staff::{AccessLevel, Staff};
    use crate::forms::staff::ScheduleEntryForm;
    use crate::repository::mock::{MockStaffReader, MockStaffWriter};
    use chrono::NaiveDateTime;

    fn user() -> AuthenticatedUser {
        AuthenticatedUser {
            sub: "glow".into(),
            merchant_id: 2,
            email: "owner@glow.test".into(),
            name: "Glow".into(),
            roles: vec![SERVICE_ACCESS_ROLE.into()],
            exp: 0,
        }
    }

    fn staff(id: i32, status: StaffStatus) -> Staff {
        Staff {
            id,
            merchant_id: 2,
            first_name: "Mia".into(),
            last_name: Some("Tran".into()),
            email: None,
            phone: None,
            access_level: AccessLevel::Staff,
            status,
            calendar_color: Some("#ff9900".into()),
            pin_cipher: None,
            created_at: NaiveDateTime::default(),
            updated_at: NaiveDateTime::default(),
        }
    }

    #[test]
    fn users_without_role_are_rejected() {
        let repo = MockStaffReader::new();
        let mut outsider = user();
        outsider.roles.clear();
        assert!(matches!(
            list_staff(&repo, &outsider, false),
            Err(ServiceError::Unauthorized)
        ));
    }

    #[test]
    fn details_include_roster() {
        let mut repo = MockStaffReader::new();
        repo.expect_get_staff_by_id()
            .withf(|id, merchant_id| *id == 7 && *merchant_id == 2)
            .returning(|id, _| Ok(Some(staff(id, StaffStatus::Active))));
        repo.expect_list_staff_schedules().returning(|staff_id, _| {
            Ok(vec![StaffSchedule {
                id: 1,
                staff_id,
                day_of_week: 2,
                start_time: "09:00".into(),
                end_time: "17:00".into(),
            }])
        });
        repo.expect_list_schedule_overrides()
            .returning(|_, _| Ok(Vec::new()));

        let details = get_staff(&repo, &user(), 7).unwrap();
        assert_eq!(details.staff.staff.id, 7);
        assert_eq!(details.schedules.len(), 1);
        assert!(!details.staff.has_pin);
    }

    #[test]
    fn delete_marks_staff_inactive() {
        let mut repo = MockStaffWriter::new();
        repo.expect_update_staff()
            .withf(|id, merchant_id, updates| {
                *id == 7 && *merchant_id == 2 && updates.status == Some(StaffStatus::Inactive)
            })
            .returning(|id, _, _| Ok(staff(id, StaffStatus::Inactive)));

        let view = deactivate_staff(&repo, &user(), 7).unwrap();
        assert_eq!(view.staff.status, StaffStatus::Inactive);
    }

    #[test]
    fn overlapping_schedule_days_are_rejected_before_writing() {
        let repo = MockStaffWriter::new();
        let entry = |day| ScheduleEntryForm {
            day_of_week: day,
            start_time: "09:00".into(),
            end_time: "17:00".into(),
        };
        let form = ReplaceSchedulesForm {
            schedules: vec![entry(1), entry(1)],
        };
        assert!(matches!(
            replace_schedules(&repo, &user(), 7, form),
            Err(ServiceError::Form(_))
        ));
    }

    #[test]
    fn override_dates_must_parse() {
        let repo = MockStaffWriter::new();
        assert!(matches!(
            delete_override(&repo, &user(), 7, "2025-13-01"),
            Err(ServiceError::Form(_))
        ));
    }
}
