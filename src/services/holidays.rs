use chrono::{Datelike, NaiveDateTime};
use pushkind_common::routes::check_role;
use serde::Serialize;

use crate::SERVICE_ACCESS_ROLE;
use crate::domain::auth::AuthenticatedUser;
use crate::domain::holiday::{
    AustralianState, HolidaySource, HolidaySyncSummary, MerchantHoliday, PublicHoliday,
    australian_public_holidays,
};
use crate::domain::timezone::local_date;
use crate::forms::holidays::{AddHolidayForm, EditHolidayForm, SyncHolidaysForm};
use crate::repository::{HolidayReader, HolidayWriter, MerchantReader};
use crate::services::merchants::authorized_merchant;
use crate::services::{ServiceError, ServiceResult};

const DATE_TAKEN_MESSAGE: &str = "A holiday already exists on this date";

/// Holidays of a merchant with the state they were last synced from.
#[derive(Debug, Clone, Serialize)]
pub struct HolidayOverview {
    pub holidays: Vec<MerchantHoliday>,
    pub selected_state: Option<AustralianState>,
    pub year: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct HolidaySyncResult {
    pub state: AustralianState,
    pub year: i32,
    #[serde(flatten)]
    pub summary: HolidaySyncSummary,
    pub holidays: Vec<PublicHoliday>,
}

pub fn list_holidays<R>(
    repo: &R,
    user: &AuthenticatedUser,
    now: NaiveDateTime,
) -> ServiceResult<HolidayOverview>
where
    R: HolidayReader + MerchantReader + ?Sized,
{
    let merchant = authorized_merchant(repo, user)?;
    let mut holidays = repo.list_holidays(merchant.id)?;
    holidays.sort_by_key(|holiday| holiday.date);

    Ok(HolidayOverview {
        holidays,
        selected_state: merchant.settings.holiday_state,
        year: local_date(merchant.tz(), now).year(),
    })
}

/// Add a custom day off. Only one holiday may exist per date.
pub fn create_holiday<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: AddHolidayForm,
) -> ServiceResult<MerchantHoliday>
where
    R: HolidayReader + HolidayWriter + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }
    let new_holiday = form
        .into_new_holiday(user.merchant_id)
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    if repo
        .get_holiday_by_date(user.merchant_id, new_holiday.date)?
        .is_some()
    {
        return Err(ServiceError::conflict(DATE_TAKEN_MESSAGE));
    }

    repo.create_holiday(&new_holiday)
        .map_err(ServiceError::from)
}

/// Toggle, rename or move a holiday.
///
/// Holidays imported from a state calendar can only be toggled.
pub fn update_holiday<R>(
    repo: &R,
    user: &AuthenticatedUser,
    holiday_id: i32,
    form: EditHolidayForm,
) -> ServiceResult<MerchantHoliday>
where
    R: HolidayReader + HolidayWriter + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }
    let updates = form
        .into_update_holiday()
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    let holiday = repo
        .get_holiday_by_id(holiday_id, user.merchant_id)?
        .ok_or(ServiceError::NotFound)?;

    let renames = updates.name.as_ref().is_some_and(|name| *name != holiday.name);
    let moves = updates.date.is_some_and(|date| date != holiday.date);
    if (renames || moves) && holiday.source != HolidaySource::Custom {
        return Err(ServiceError::Form(
            "Only custom holidays can be renamed or moved".to_string(),
        ));
    }

    if let Some(date) = updates.date.filter(|_| moves) {
        let taken = repo
            .get_holiday_by_date(user.merchant_id, date)?
            .is_some_and(|other| other.id != holiday.id);
        if taken {
            return Err(ServiceError::conflict(DATE_TAKEN_MESSAGE));
        }
    }

    repo.update_holiday(holiday.id, user.merchant_id, &updates)
        .map_err(ServiceError::from)
}

pub fn delete_holiday<R>(repo: &R, user: &AuthenticatedUser, holiday_id: i32) -> ServiceResult<()>
where
    R: HolidayWriter + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }
    repo.delete_holiday(holiday_id, user.merchant_id)
        .map_err(ServiceError::from)
}

/// Reconcile the merchant's holidays with a state's public holidays for a year.
pub fn sync_holidays<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: SyncHolidaysForm,
    now: NaiveDateTime,
) -> ServiceResult<HolidaySyncResult>
where
    R: HolidayWriter + MerchantReader + ?Sized,
{
    let merchant = authorized_merchant(repo, user)?;
    let current_year = local_date(merchant.tz(), now).year();
    let (state, year) = form
        .into_target(current_year)
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    let holidays = australian_public_holidays(state, year);
    let summary = repo.sync_state_holidays(merchant.id, state, year, &holidays)?;
    log::info!(
        "Synced {state} holidays for {year} into merchant {}: {} created, {} updated, {} removed",
        merchant.id,
        summary.created,
        summary.updated,
        summary.removed
    );

    Ok(HolidaySyncResult {
        state,
        year,
        summary,
        holidays,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::domain::merchant::{Merchant, MerchantSettings};
    use crate::repository::mock::MockRepository;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn now() -> NaiveDateTime {
        // 14:00 UTC on New Year's Eve is already 2026 in Sydney.
        date(2025, 12, 31).and_hms_opt(14, 0, 0).expect("valid time")
    }

    fn user() -> AuthenticatedUser {
        AuthenticatedUser {
            sub: "glow".into(),
            merchant_id: 8,
            email: "owner@glow.test".into(),
            name: "Glow".into(),
            roles: vec![SERVICE_ACCESS_ROLE.into()],
            exp: 0,
        }
    }

    fn merchant() -> Merchant {
        Merchant {
            id: 8,
            name: "Glow".into(),
            subdomain: "glow".into(),
            email: "owner@glow.test".into(),
            username: "glow".into(),
            password_hash: String::new(),
            timezone: "Australia/Sydney".into(),
            currency: "AUD".into(),
            settings: MerchantSettings {
                holiday_state: Some(AustralianState::Vic),
                ..MerchantSettings::default()
            },
            created_at: now(),
            updated_at: now(),
        }
    }

    fn holiday(id: i32, day: NaiveDate, source: HolidaySource) -> MerchantHoliday {
        MerchantHoliday {
            id,
            merchant_id: 8,
            name: "Melbourne Cup".into(),
            date: day,
            is_day_off: true,
            source,
            state: (source == HolidaySource::State).then_some(AustralianState::Vic),
            created_at: now(),
            updated_at: now(),
        }
    }

    #[test]
    fn overview_uses_merchant_local_year() {
        let mut repo = MockRepository::new();
        repo.expect_get_merchant_by_id()
            .returning(|_| Ok(Some(merchant())));
        repo.expect_list_holidays().returning(|_| {
            Ok(vec![
                holiday(2, date(2026, 11, 3), HolidaySource::State),
                holiday(1, date(2026, 1, 26), HolidaySource::State),
            ])
        });

        let overview = list_holidays(&repo, &user(), now()).unwrap();
        assert_eq!(overview.year, 2026);
        assert_eq!(overview.selected_state, Some(AustralianState::Vic));
        assert_eq!(overview.holidays[0].id, 1);
    }

    #[test]
    fn duplicate_date_is_a_conflict() {
        let mut repo = MockRepository::new();
        repo.expect_get_holiday_by_date()
            .returning(|_, day| Ok(Some(holiday(5, day, HolidaySource::Custom))));

        let form = AddHolidayForm {
            name: "Staff party".into(),
            date: "2026-12-18".into(),
        };
        assert!(matches!(
            create_holiday(&repo, &user(), form),
            Err(ServiceError::Conflict { .. })
        ));
    }

    #[test]
    fn new_custom_holiday_is_a_day_off() {
        let mut repo = MockRepository::new();
        repo.expect_get_holiday_by_date().returning(|_, _| Ok(None));
        repo.expect_create_holiday()
            .withf(|new| {
                new.is_day_off && new.source == HolidaySource::Custom && new.name == "Staff party"
            })
            .returning(|new| {
                let mut created = holiday(9, new.date, HolidaySource::Custom);
                created.name = new.name.clone();
                Ok(created)
            });

        let form = AddHolidayForm {
            name: " Staff   party ".into(),
            date: "2026-12-18".into(),
        };
        let created = create_holiday(&repo, &user(), form).unwrap();
        assert_eq!(created.date, date(2026, 12, 18));
    }

    #[test]
    fn state_holidays_cannot_be_moved_but_can_be_toggled() {
        let mut repo = MockRepository::new();
        repo.expect_get_holiday_by_id()
            .returning(|id, _| Ok(Some(holiday(id, date(2026, 11, 3), HolidaySource::State))));
        repo.expect_update_holiday()
            .withf(|_, _, updates| updates.is_day_off == Some(false))
            .returning(|id, _, _| {
                let mut updated = holiday(id, date(2026, 11, 3), HolidaySource::State);
                updated.is_day_off = false;
                Ok(updated)
            });

        let moved = EditHolidayForm {
            date: Some("2026-11-04".into()),
            ..EditHolidayForm::default()
        };
        assert!(matches!(
            update_holiday(&repo, &user(), 3, moved),
            Err(ServiceError::Form(_))
        ));

        let toggled = EditHolidayForm {
            is_day_off: Some(false),
            ..EditHolidayForm::default()
        };
        assert!(!update_holiday(&repo, &user(), 3, toggled).unwrap().is_day_off);
    }

    #[test]
    fn moving_onto_another_holiday_is_a_conflict() {
        let mut repo = MockRepository::new();
        repo.expect_get_holiday_by_id()
            .returning(|id, _| Ok(Some(holiday(id, date(2026, 12, 18), HolidaySource::Custom))));
        repo.expect_get_holiday_by_date()
            .returning(|_, day| Ok(Some(holiday(99, day, HolidaySource::State))));

        let form = EditHolidayForm {
            date: Some("2026-12-25".into()),
            ..EditHolidayForm::default()
        };
        assert!(matches!(
            update_holiday(&repo, &user(), 4, form),
            Err(ServiceError::Conflict { .. })
        ));
    }

    #[test]
    fn sync_defaults_to_current_local_year() {
        let mut repo = MockRepository::new();
        repo.expect_get_merchant_by_id()
            .returning(|_| Ok(Some(merchant())));
        repo.expect_sync_state_holidays()
            .withf(|merchant_id, state, year, holidays| {
                *merchant_id == 8
                    && *state == AustralianState::Nsw
                    && *year == 2026
                    && holidays.iter().any(|h| h.date == date(2026, 4, 25))
            })
            .returning(|_, _, _, holidays| {
                Ok(HolidaySyncSummary {
                    created: holidays.len(),
                    ..HolidaySyncSummary::default()
                })
            });

        let form = SyncHolidaysForm {
            state: "nsw".into(),
            year: None,
        };
        let result = sync_holidays(&repo, &user(), form, now()).unwrap();
        assert_eq!(result.year, 2026);
        assert_eq!(result.summary.created, result.holidays.len());
    }

    #[test]
    fn unknown_state_is_rejected() {
        let mut repo = MockRepository::new();
        repo.expect_get_merchant_by_id()
            .returning(|_| Ok(Some(merchant())));
        let form = SyncHolidaysForm {
            state: "XYZ".into(),
            year: Some(2026),
        };
        assert!(matches!(
            sync_holidays(&repo, &user(), form, now()),
            Err(ServiceError::Form(_))
        ));
    }
}
