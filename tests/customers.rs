use std::io::{Seek, SeekFrom, Write};

use actix_multipart::form::tempfile::TempFile;
use tempfile::NamedTempFile;

use pushkind_booking::domain::customer::CustomerListQuery;
use pushkind_booking::forms::customers::UploadCustomersForm;
use pushkind_booking::repository::{CustomerReader, DieselRepository};
use pushkind_booking::services::{ServiceError, customers};

mod common;

use common::{seed_customer, seed_merchant};

fn upload(csv: &str) -> UploadCustomersForm {
    let mut file = NamedTempFile::new().expect("create temp file");
    file.write_all(csv.as_bytes()).expect("write csv file");
    file.as_file_mut()
        .seek(SeekFrom::Start(0))
        .expect("seek to start");
    UploadCustomersForm {
        csv: TempFile {
            file,
            content_type: None,
            file_name: Some("customers.csv".to_string()),
            size: csv.len(),
        },
    }
}

#[test]
fn import_skips_blank_names_and_known_contacts() {
    let test_db = common::TestDb::new("test_import_skips_known_contacts.db");
    let repo = DieselRepository::new(test_db.pool());
    let (merchant, user) = seed_merchant(&repo, "glow");
    seed_customer(&repo, merchant.id, "Ava");

    let mut form = upload(
        "First Name,Last Name,Email,Phone\n\
         Ava,Jones,AVA@example.test,\n\
         Leo,Park,LEO@example.test,0400000002\n\
         ,Nobody,nobody@example.test,\n\
         Leon,Park,leo@example.test,\n\
         Zoe,,,0400000003\n",
    );
    let summary = customers::import_customers(&repo, &user, &mut form).unwrap();
    assert_eq!(summary.imported, 2);
    assert_eq!(summary.skipped, 3);

    let (total, parks) = repo
        .list_customers(CustomerListQuery::new(merchant.id).search("park"))
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(parks[0].first_name, "Leo");
    assert_eq!(parks[0].email.as_deref(), Some("leo@example.test"));

    let zoe = repo
        .find_customer_by_phone(merchant.id, "0400000003")
        .unwrap()
        .expect("imported by phone");
    assert_eq!(zoe.first_name, "Zoe");
    assert_eq!(zoe.last_name, None);

    let mut form = upload("name,email\nMia,mia@example.test\n");
    let err = customers::import_customers(&repo, &user, &mut form)
        .expect_err("first name column is required");
    assert!(matches!(err, ServiceError::Form(_)));
}

#[test]
fn deleted_customers_drop_out_of_lookups() {
    let test_db = common::TestDb::new("test_deleted_customers_drop_out.db");
    let repo = DieselRepository::new(test_db.pool());
    let (merchant, user) = seed_merchant(&repo, "glow");
    let ava = seed_customer(&repo, merchant.id, "Ava");
    seed_customer(&repo, merchant.id, "Ben");

    let (total, _) = repo
        .list_customers(CustomerListQuery::new(merchant.id))
        .unwrap();
    assert_eq!(total, 2);

    customers::delete_customer(&repo, &user, ava.id).unwrap();

    let (total, remaining) = repo
        .list_customers(CustomerListQuery::new(merchant.id))
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(remaining[0].first_name, "Ben");
    assert!(
        repo.find_customer_by_email(merchant.id, "ava@example.test")
            .unwrap()
            .is_none()
    );

    let err = customers::delete_customer(&repo, &user, ava.id).expect_err("already deleted");
    assert!(matches!(err, ServiceError::NotFound));

    // Another merchant cannot reach these customers.
    let (_, stranger) = seed_merchant(&repo, "other");
    let err = customers::delete_customer(&repo, &stranger, remaining[0].id)
        .expect_err("scoped to the merchant");
    assert!(matches!(err, ServiceError::NotFound));
}
