use pushkind_common::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated};
use pushkind_common::routes::check_role;

use crate::SERVICE_ACCESS_ROLE;
use crate::domain::auth::AuthenticatedUser;
use crate::domain::customer::{Customer, CustomerImportSummary, CustomerListQuery};
use crate::forms::customers::{
    AddCustomerForm, CustomerQueryParams, EditCustomerForm, UploadCustomersForm,
};
use crate::repository::{CustomerReader, CustomerWriter};
use crate::services::{ServiceError, ServiceResult};

/// Customers matching the search, one page at a time.
pub fn list_customers<R>(
    repo: &R,
    user: &AuthenticatedUser,
    params: CustomerQueryParams,
) -> ServiceResult<Paginated<Customer>>
where
    R: CustomerReader + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    let page = params.page.unwrap_or(1).max(1);
    let mut query =
        CustomerListQuery::new(user.merchant_id).paginate(page, DEFAULT_ITEMS_PER_PAGE);
    if let Some(term) = params
        .search
        .as_deref()
        .map(str::trim)
        .filter(|term| !term.is_empty())
    {
        query = query.search(term);
    }

    let (total, customers) = repo.list_customers(query)?;
    let total_pages = total.div_ceil(DEFAULT_ITEMS_PER_PAGE);
    Ok(Paginated::new(customers, page, total_pages))
}

pub fn get_customer<R>(
    repo: &R,
    user: &AuthenticatedUser,
    customer_id: i32,
) -> ServiceResult<Customer>
where
    R: CustomerReader + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }
    repo.get_customer_by_id(customer_id, user.merchant_id)?
        .ok_or(ServiceError::NotFound)
}

pub fn create_customer<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: AddCustomerForm,
) -> ServiceResult<Customer>
where
    R: CustomerWriter + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }
    let new_customer = form
        .into_new_customer(user.merchant_id)
        .map_err(|err| ServiceError::Form(err.to_string()))?;
    repo.create_customer(&new_customer)
        .map_err(ServiceError::from)
}

pub fn update_customer<R>(
    repo: &R,
    user: &AuthenticatedUser,
    customer_id: i32,
    form: EditCustomerForm,
) -> ServiceResult<Customer>
where
    R: CustomerWriter + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }
    let updates = form
        .into_update_customer()
        .map_err(|err| ServiceError::Form(err.to_string()))?;
    repo.update_customer(customer_id, user.merchant_id, &updates)
        .map_err(ServiceError::from)
}

pub fn delete_customer<R>(
    repo: &R,
    user: &AuthenticatedUser,
    customer_id: i32,
) -> ServiceResult<()>
where
    R: CustomerWriter + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }
    repo.delete_customer(customer_id, user.merchant_id)
        .map_err(ServiceError::from)
}

/// Import customers from an uploaded CSV.
///
/// Rows without a first name and customers already known by email or phone
/// count as skipped.
pub fn import_customers<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: &mut UploadCustomersForm,
) -> ServiceResult<CustomerImportSummary>
where
    R: CustomerWriter + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    let parsed = form
        .into_new_customers(user.merchant_id)
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    let summary = if parsed.customers.is_empty() {
        CustomerImportSummary::default()
    } else {
        repo.import_customers(user.merchant_id, &parsed.customers)?
    };

    let summary = CustomerImportSummary {
        imported: summary.imported,
        skipped: summary.skipped + parsed.skipped,
    };
    log::info!(
        "Imported {} customer(s) for merchant {}, skipped {}",
        summary.imported,
        user.merchant_id,
        summary.skipped
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use actix_multipart::form::tempfile::TempFile;
    use chrono::NaiveDateTime;
    use pushkind_common::repository::errors::RepositoryError;
    use tempfile::NamedTempFile;

    use crate::domain::customer::CustomerStatus;
    use crate::repository::mock::{MockCustomerReader, MockCustomerWriter};

    fn user() -> AuthenticatedUser {
        AuthenticatedUser {
            sub: "glow".into(),
            merchant_id: 6,
            email: "owner@glow.test".into(),
            name: "Glow".into(),
            roles: vec![SERVICE_ACCESS_ROLE.into()],
            exp: 0,
        }
    }

    fn customer(id: i32) -> Customer {
        Customer {
            id,
            merchant_id: 6,
            first_name: "Noah".into(),
            last_name: Some("Singh".into()),
            email: Some("noah@example.com".into()),
            phone: None,
            notes: None,
            status: CustomerStatus::Active,
            created_at: NaiveDateTime::default(),
            updated_at: NaiveDateTime::default(),
        }
    }

    fn upload(contents: &str) -> UploadCustomersForm {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(contents.as_bytes()).expect("write csv");
        UploadCustomersForm {
            csv: TempFile {
                file,
                content_type: None,
                file_name: Some("customers.csv".into()),
                size: contents.len(),
            },
        }
    }

    #[test]
    fn list_paginates_and_trims_search() {
        let mut repo = MockCustomerReader::new();
        repo.expect_list_customers()
            .withf(|query| {
                query.merchant_id == 6
                    && query.search.as_deref() == Some("noah")
                    && query.pagination.as_ref().map(|p| p.page) == Some(2)
            })
            .returning(|_| Ok((DEFAULT_ITEMS_PER_PAGE + 1, vec![customer(1)])));

        let params = CustomerQueryParams {
            search: Some("  noah ".into()),
            page: Some(2),
        };
        let page = list_customers(&repo, &user(), params).unwrap();
        let value = serde_json::to_value(&page).unwrap();
        assert_eq!(value.get("page").and_then(|v| v.as_u64()), Some(2));
        assert_eq!(
            value.get("items").and_then(|v| v.as_array()).map(Vec::len),
            Some(1)
        );
    }

    #[test]
    fn missing_customer_is_not_found() {
        let mut repo = MockCustomerReader::new();
        repo.expect_get_customer_by_id().returning(|_, _| Ok(None));
        assert!(matches!(
            get_customer(&repo, &user(), 42),
            Err(ServiceError::NotFound)
        ));
    }

    #[test]
    fn import_adds_rows_without_names_to_skipped() {
        let mut repo = MockCustomerWriter::new();
        repo.expect_import_customers()
            .withf(|merchant_id, customers| *merchant_id == 6 && customers.len() == 2)
            .returning(|_, _| {
                Ok(CustomerImportSummary {
                    imported: 1,
                    skipped: 1,
                })
            });

        let mut form = upload(
            "firstName,last_name,Email,phone\n\
             Ana,Lee,ana@example.com,\n\
             ,Nobody,none@example.com,\n\
             Ben,,ben@example.com,0400 000 000\n",
        );
        let summary = import_customers(&repo, &user(), &mut form).unwrap();
        assert_eq!(
            summary,
            CustomerImportSummary {
                imported: 1,
                skipped: 2
            }
        );
    }

    #[test]
    fn deleting_unknown_customer_is_not_found() {
        let mut repo = MockCustomerWriter::new();
        repo.expect_delete_customer()
            .returning(|_, _| Err(RepositoryError::NotFound));
        assert!(matches!(
            delete_customer(&repo, &user(), 9),
            Err(ServiceError::NotFound)
        ));
    }
}
