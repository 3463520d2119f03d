//! Helpers for integration tests.

#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

use pushkind_booking::domain::auth::AuthenticatedUser;
use pushkind_booking::domain::customer::{Customer, NewCustomer};
use pushkind_booking::domain::merchant::{Merchant, NewMerchant};
use pushkind_booking::domain::schedule::NewStaffSchedule;
use pushkind_booking::domain::service::{NewService, Service};
use pushkind_booking::domain::staff::{AccessLevel, NewStaff, Staff};
use pushkind_booking::repository::{
    CatalogWriter, CustomerWriter, DieselRepository, MerchantWriter, StaffWriter,
};
use pushkind_common::db::{DbPool, establish_connection_pool};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!(); // assumes migrations/ exists

/// Temporary database used in integration tests.
pub struct TestDb {
    filename: String,
    pool: DbPool,
}

impl TestDb {
    pub fn new(filename: &str) -> Self {
        std::fs::remove_file(filename).ok(); // Clean up old DB

        let pool =
            establish_connection_pool(filename).expect("Failed to establish SQLite connection.");
        let mut conn = pool
            .get()
            .expect("Failed to get SQLite connection from pool.");
        conn.run_pending_migrations(MIGRATIONS)
            .expect("Migrations failed");
        TestDb {
            filename: filename.to_string(),
            pool,
        }
    }
    pub fn pool(&self) -> DbPool {
        self.pool.clone()
    }
}

impl Drop for TestDb {
    fn drop(&mut self) {
        std::fs::remove_file(&self.filename).ok();
        std::fs::remove_file(format!("{}-shm", &self.filename)).ok();
        std::fs::remove_file(format!("{}-wal", &self.filename)).ok();
    }
}

pub fn utc(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hour, minute, 0))
        .expect("valid datetime")
}

/// Clock used by the tests: Saturday 1 March 2025, before every booking.
pub fn now() -> NaiveDateTime {
    utc(2025, 3, 1, 0, 0)
}

/// Monday 3 March 2025 at `hour`:`minute` in Sydney (UTC+11), as UTC.
pub fn monday_sydney(hour: u32, minute: u32) -> NaiveDateTime {
    utc(2025, 3, 3, hour, minute) - chrono::Duration::hours(11)
}

/// Merchant with default settings plus a bearer identity for it.
pub fn seed_merchant(repo: &DieselRepository, subdomain: &str) -> (Merchant, AuthenticatedUser) {
    let merchant = repo
        .create_merchant(&NewMerchant::new(
            "Glow Studio",
            subdomain,
            format!("owner@{subdomain}.test"),
            subdomain,
            "not-a-real-hash",
        ))
        .unwrap();
    let user = AuthenticatedUser::for_merchant(&merchant, now(), 12);
    (merchant, user)
}

/// Active staff member rostered Monday to Friday, 09:00 to 17:00.
pub fn seed_staff(repo: &DieselRepository, merchant_id: i32, first_name: &str) -> Staff {
    let staff = repo
        .create_staff(&NewStaff::new(merchant_id, first_name, AccessLevel::Staff))
        .unwrap();
    let week: Vec<NewStaffSchedule> = (1..=5)
        .map(|day_of_week| NewStaffSchedule {
            staff_id: staff.id,
            day_of_week,
            start_time: "09:00".into(),
            end_time: "17:00".into(),
        })
        .collect();
    repo.replace_staff_schedules(staff.id, merchant_id, &week)
        .unwrap();
    staff
}

pub fn seed_service(
    repo: &DieselRepository,
    merchant_id: i32,
    name: &str,
    minutes: i32,
    price_cents: i64,
) -> Service {
    repo.create_service(&NewService::new(merchant_id, name, minutes, price_cents))
        .unwrap()
}

pub fn seed_customer(repo: &DieselRepository, merchant_id: i32, first_name: &str) -> Customer {
    let email = format!("{}@example.test", first_name.to_lowercase());
    repo.create_customer(&NewCustomer::new(merchant_id, first_name).with_email(email))
        .unwrap()
}
