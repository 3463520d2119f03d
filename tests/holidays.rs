use pushkind_booking::domain::holiday::{AustralianState, HolidaySource};
use pushkind_booking::forms::bookings::{BookingServiceForm, CreateBookingForm};
use pushkind_booking::forms::holidays::{AddHolidayForm, EditHolidayForm, SyncHolidaysForm};
use pushkind_booking::repository::{DieselRepository, MerchantReader};
use pushkind_booking::services::{ServiceError, bookings, holidays};

mod common;

use common::{now, seed_customer, seed_merchant, seed_service, seed_staff, utc};

fn nsw_2025() -> SyncHolidaysForm {
    SyncHolidaysForm {
        state: "nsw".into(),
        year: Some(2025),
    }
}

#[test]
fn state_sync_closes_public_holidays_and_keeps_custom_days() {
    let test_db = common::TestDb::new("test_state_sync_keeps_custom_days.db");
    let repo = DieselRepository::new(test_db.pool());
    let (merchant, user) = seed_merchant(&repo, "glow");
    let alice = seed_staff(&repo, merchant.id, "Alice");
    let cut = seed_service(&repo, merchant.id, "Cut", 60, 6_000);
    let ava = seed_customer(&repo, merchant.id, "Ava");

    let custom = holidays::create_holiday(
        &repo,
        &user,
        AddHolidayForm {
            name: "Closed for Christmas".into(),
            date: "2025-12-25".into(),
        },
    )
    .unwrap();

    let synced = holidays::sync_holidays(&repo, &user, nsw_2025(), now()).unwrap();
    assert_eq!(synced.state, AustralianState::Nsw);
    assert_eq!(synced.summary.skipped_custom, 1);
    assert_eq!(synced.summary.created, synced.holidays.len() - 1);
    assert!(
        synced
            .holidays
            .iter()
            .any(|holiday| holiday.name == "Good Friday"
                && holiday.date.to_string() == "2025-04-18")
    );

    let stored = repo.get_merchant_by_id(merchant.id).unwrap().unwrap();
    assert_eq!(stored.settings.holiday_state, Some(AustralianState::Nsw));

    let overview = holidays::list_holidays(&repo, &user, now()).unwrap();
    let christmas = overview
        .holidays
        .iter()
        .find(|holiday| holiday.id == custom.id)
        .expect("custom holiday survives the sync");
    assert_eq!(christmas.name, "Closed for Christmas");
    assert_eq!(christmas.source, HolidaySource::Custom);

    let again = holidays::sync_holidays(&repo, &user, nsw_2025(), now()).unwrap();
    assert_eq!(again.summary.created, 0);
    assert_eq!(again.summary.updated, 0);
    assert_eq!(again.summary.removed, 0);

    // Good Friday, 10:00 in Sydney (UTC+10 after daylight saving ends).
    let good_friday = || CreateBookingForm {
        customer_id: ava.id,
        services: vec![BookingServiceForm {
            service_id: cut.id,
            staff_id: None,
            duration_minutes: None,
            price_cents: None,
        }],
        staff_id: Some(alice.id),
        start_time: utc(2025, 4, 18, 0, 0),
        location_id: None,
        notes: None,
        is_override: false,
        override_reason: None,
    };
    let err = bookings::create_booking(&repo, &user, good_friday(), now())
        .expect_err("closed on public holidays");
    assert!(
        matches!(err, ServiceError::Form(message) if message == "Business is closed on this day (Good Friday)")
    );

    let good_friday_holiday = overview
        .holidays
        .iter()
        .find(|holiday| holiday.name == "Good Friday")
        .unwrap();
    let err = holidays::update_holiday(
        &repo,
        &user,
        good_friday_holiday.id,
        EditHolidayForm {
            name: Some("Long weekend".into()),
            ..Default::default()
        },
    )
    .expect_err("state holidays keep their name");
    assert!(matches!(err, ServiceError::Form(_)));

    let opened = holidays::update_holiday(
        &repo,
        &user,
        good_friday_holiday.id,
        EditHolidayForm {
            is_day_off: Some(false),
            ..Default::default()
        },
    )
    .unwrap();
    assert!(!opened.is_day_off);
    assert!(bookings::create_booking(&repo, &user, good_friday(), now()).is_ok());
}

#[test]
fn one_holiday_per_date() {
    let test_db = common::TestDb::new("test_one_holiday_per_date.db");
    let repo = DieselRepository::new(test_db.pool());
    let (_, user) = seed_merchant(&repo, "glow");

    holidays::sync_holidays(&repo, &user, nsw_2025(), now()).unwrap();

    let err = holidays::create_holiday(
        &repo,
        &user,
        AddHolidayForm {
            name: "Staff day".into(),
            date: "2025-04-18".into(),
        },
    )
    .expect_err("Good Friday is already there");
    assert!(matches!(err, ServiceError::Conflict { .. }));

    let staff_day = holidays::create_holiday(
        &repo,
        &user,
        AddHolidayForm {
            name: "Staff day".into(),
            date: "2025-08-15".into(),
        },
    )
    .unwrap();
    holidays::delete_holiday(&repo, &user, staff_day.id).unwrap();

    let overview = holidays::list_holidays(&repo, &user, now()).unwrap();
    assert!(overview.holidays.iter().all(|holiday| holiday.id != staff_day.id));
    assert!(
        overview
            .holidays
            .windows(2)
            .all(|pair| pair[0].date <= pair[1].date)
    );
    assert_eq!(overview.selected_state, Some(AustralianState::Nsw));
    assert_eq!(overview.year, 2025);

    let err = holidays::sync_holidays(
        &repo,
        &user,
        SyncHolidaysForm {
            state: "Atlantis".into(),
            year: None,
        },
        now(),
    )
    .expect_err("unknown state");
    assert!(matches!(err, ServiceError::Form(_)));
}
