use chrono::Duration;
use pushkind_booking::domain::auth::MerchantSubdomain;
use pushkind_booking::domain::booking::{BookingSource, BookingStatus, BookingTransition};
use pushkind_booking::forms::bookings::{
    BookingServiceForm, CancelBookingForm, CreateBookingForm, PublicBookingForm,
    PublicCustomerForm, UpdateBookingForm,
};
use pushkind_booking::repository::{BookingReader, CustomerReader, DieselRepository};
use pushkind_booking::services::{ServiceError, bookings};

mod common;

use common::{monday_sydney, now, seed_customer, seed_merchant, seed_service, seed_staff};

fn booking_form(
    customer_id: i32,
    service_id: i32,
    staff_id: i32,
    start: chrono::NaiveDateTime,
) -> CreateBookingForm {
    CreateBookingForm {
        customer_id,
        services: vec![BookingServiceForm {
            service_id,
            staff_id: None,
            duration_minutes: None,
            price_cents: None,
        }],
        staff_id: Some(staff_id),
        start_time: start,
        location_id: None,
        notes: None,
        is_override: false,
        override_reason: None,
    }
}

#[test]
fn overlapping_bookings_conflict_unless_overridden() {
    let test_db = common::TestDb::new("test_overlapping_bookings_conflict.db");
    let repo = DieselRepository::new(test_db.pool());
    let (merchant, user) = seed_merchant(&repo, "glow");
    let alice = seed_staff(&repo, merchant.id, "Alice");
    let cut = seed_service(&repo, merchant.id, "Cut", 60, 6_000);
    let ava = seed_customer(&repo, merchant.id, "Ava");

    let first = bookings::create_booking(
        &repo,
        &user,
        booking_form(ava.id, cut.id, alice.id, monday_sydney(9, 0)),
        now(),
    )
    .unwrap();
    assert_eq!(first.status, BookingStatus::Confirmed);
    assert_eq!(first.source, BookingSource::InPerson);
    assert_eq!(first.end_time, monday_sydney(10, 0));
    assert_eq!(first.total_cents, 6_000);
    assert!(first.booking_number.starts_with("BK"));

    let err = bookings::create_booking(
        &repo,
        &user,
        booking_form(ava.id, cut.id, alice.id, monday_sydney(9, 30)),
        now(),
    )
    .expect_err("overlap must be refused");
    match err {
        ServiceError::Conflict { conflicts, .. } => {
            assert_eq!(conflicts.len(), 1);
            assert_eq!(conflicts[0].booking_id, Some(first.id));
            assert_eq!(conflicts[0].staff_id, alice.id);
        }
        other => panic!("expected a conflict, got {other:?}"),
    }

    // Back to back is fine: ranges are half-open.
    let second = bookings::create_booking(
        &repo,
        &user,
        booking_form(ava.id, cut.id, alice.id, monday_sydney(10, 0)),
        now(),
    )
    .unwrap();
    assert_eq!(second.start_time, first.end_time);

    let mut forced = booking_form(ava.id, cut.id, alice.id, monday_sydney(9, 30));
    forced.is_override = true;
    forced.override_reason = Some("Regular asked to squeeze in".into());
    let forced = bookings::create_booking(&repo, &user, forced, now()).unwrap();
    assert!(forced.is_override);
}

#[test]
fn cancelled_bookings_release_their_time() {
    let test_db = common::TestDb::new("test_cancelled_bookings_release_time.db");
    let repo = DieselRepository::new(test_db.pool());
    let (merchant, user) = seed_merchant(&repo, "glow");
    let alice = seed_staff(&repo, merchant.id, "Alice");
    let cut = seed_service(&repo, merchant.id, "Cut", 60, 6_000);
    let ava = seed_customer(&repo, merchant.id, "Ava");

    let booking = bookings::create_booking(
        &repo,
        &user,
        booking_form(ava.id, cut.id, alice.id, monday_sydney(11, 0)),
        now(),
    )
    .unwrap();

    let cancelled = bookings::cancel_booking(
        &repo,
        &user,
        booking.id,
        CancelBookingForm {
            reason: Some("Sick".into()),
        },
        now(),
    )
    .unwrap();
    assert_eq!(cancelled.status, BookingStatus::Cancelled);
    assert_eq!(cancelled.cancellation_reason.as_deref(), Some("Sick"));
    assert!(cancelled.cancelled_at.is_some());

    let rebooked = bookings::create_booking(
        &repo,
        &user,
        booking_form(ava.id, cut.id, alice.id, monday_sydney(11, 0)),
        now(),
    );
    assert!(rebooked.is_ok());

    let err = bookings::transition_booking(
        &repo,
        &user,
        booking.id,
        BookingTransition::Confirm,
        None,
        now(),
    )
    .expect_err("cancelled is terminal");
    assert!(matches!(err, ServiceError::Form(_)));
}

#[test]
fn rescheduling_rechecks_conflicts_but_ignores_itself() {
    let test_db = common::TestDb::new("test_rescheduling_rechecks_conflicts.db");
    let repo = DieselRepository::new(test_db.pool());
    let (merchant, user) = seed_merchant(&repo, "glow");
    let alice = seed_staff(&repo, merchant.id, "Alice");
    let cut = seed_service(&repo, merchant.id, "Cut", 60, 6_000);
    let ava = seed_customer(&repo, merchant.id, "Ava");

    let early = bookings::create_booking(
        &repo,
        &user,
        booking_form(ava.id, cut.id, alice.id, monday_sydney(9, 0)),
        now(),
    )
    .unwrap();
    let late = bookings::create_booking(
        &repo,
        &user,
        booking_form(ava.id, cut.id, alice.id, monday_sydney(10, 0)),
        now(),
    )
    .unwrap();

    let moved = bookings::update_booking(
        &repo,
        &user,
        late.id,
        UpdateBookingForm {
            start_time: Some(monday_sydney(10, 30)),
            ..Default::default()
        },
        now(),
    )
    .unwrap();
    assert_eq!(moved.start_time, monday_sydney(10, 30));
    assert_eq!(moved.end_time - moved.start_time, Duration::minutes(60));

    let err = bookings::update_booking(
        &repo,
        &user,
        late.id,
        UpdateBookingForm {
            start_time: Some(monday_sydney(9, 30)),
            ..Default::default()
        },
        now(),
    )
    .expect_err("moving onto the early booking must conflict");
    match err {
        ServiceError::Conflict { conflicts, .. } => {
            assert!(conflicts.iter().all(|c| c.booking_id == Some(early.id)));
        }
        other => panic!("expected a conflict, got {other:?}"),
    }

    let stored = repo.get_booking_by_id(late.id, merchant.id).unwrap().unwrap();
    assert_eq!(stored.start_time, monday_sydney(10, 30));
}

#[test]
fn bookings_outside_business_hours_are_refused() {
    let test_db = common::TestDb::new("test_bookings_outside_hours.db");
    let repo = DieselRepository::new(test_db.pool());
    let (merchant, user) = seed_merchant(&repo, "glow");
    let alice = seed_staff(&repo, merchant.id, "Alice");
    let cut = seed_service(&repo, merchant.id, "Cut", 60, 6_000);
    let ava = seed_customer(&repo, merchant.id, "Ava");

    let err = bookings::create_booking(
        &repo,
        &user,
        booking_form(ava.id, cut.id, alice.id, monday_sydney(16, 30)),
        now(),
    )
    .expect_err("ends after closing");
    assert!(matches!(err, ServiceError::Form(message) if message == "Booking is outside business hours"));
}

#[test]
fn public_bookings_pick_the_free_staff_member() {
    let test_db = common::TestDb::new("test_public_bookings_pick_free_staff.db");
    let repo = DieselRepository::new(test_db.pool());
    let (merchant, user) = seed_merchant(&repo, "glow");
    let alice = seed_staff(&repo, merchant.id, "Alice");
    let bob = seed_staff(&repo, merchant.id, "Bob");
    let cut = seed_service(&repo, merchant.id, "Cut", 60, 6_000);
    let ava = seed_customer(&repo, merchant.id, "Ava");

    bookings::create_booking(
        &repo,
        &user,
        booking_form(ava.id, cut.id, alice.id, monday_sydney(9, 0)),
        now(),
    )
    .unwrap();

    let subdomain = MerchantSubdomain::parse("Glow").unwrap();
    let public_form = || PublicBookingForm {
        service_id: cut.id,
        staff_id: None,
        start_time: monday_sydney(9, 0),
        customer: PublicCustomerForm {
            first_name: "Mia".into(),
            last_name: None,
            email: Some("Mia@Example.test".into()),
            phone: None,
        },
        notes: None,
    };

    let booking = bookings::create_public_booking(&repo, &subdomain, public_form(), now()).unwrap();
    assert_eq!(booking.staff_id, Some(bob.id));
    assert_eq!(booking.source, BookingSource::Online);
    assert_eq!(booking.status, BookingStatus::Confirmed);
    assert!(!booking.customer_requested_staff);

    let customer = repo
        .find_customer_by_email(merchant.id, "mia@example.test")
        .unwrap()
        .expect("customer created from the booking");
    assert_eq!(booking.customer_id, customer.id);

    // Both staff are now busy and unassigned bookings are off by default.
    let err = bookings::create_public_booking(&repo, &subdomain, public_form(), now())
        .expect_err("nobody is free");
    assert!(
        matches!(err, ServiceError::Conflict { message, .. } if message == bookings::NO_STAFF_AVAILABLE)
    );
}
