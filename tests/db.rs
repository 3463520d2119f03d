use diesel::prelude::*;

use pushkind_booking::schema::{bookings, merchants};

mod common;

#[test]
fn migrations_run_and_files_are_cleaned_up() {
    let base = "test_booking_migrations.db";

    {
        let test_db = common::TestDb::new(base);
        let mut conn = test_db.pool().get().expect("pooled connection");
        let merchant_count: i64 = merchants::table.count().get_result(&mut conn).unwrap();
        let booking_count: i64 = bookings::table.count().get_result(&mut conn).unwrap();
        assert_eq!(merchant_count, 0);
        assert_eq!(booking_count, 0);
    }

    assert!(!std::path::Path::new(base).exists());
    assert!(!std::path::Path::new(&format!("{base}-shm")).exists());
    assert!(!std::path::Path::new(&format!("{base}-wal")).exists());
}
