use std::collections::HashSet;

use chrono::Utc;
use diesel::dsl::{exists, select};
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use pushkind_common::repository::errors::{RepositoryError, RepositoryResult};

use crate::{
    domain::customer::{
        Customer as DomainCustomer, CustomerImportSummary, CustomerListQuery, CustomerStatus,
        NewCustomer as DomainNewCustomer, UpdateCustomer as DomainUpdateCustomer,
    },
    models::customer::{
        Customer as DbCustomer, NewCustomer as DbNewCustomer, UpdateCustomer as DbUpdateCustomer,
    },
    repository::{CustomerReader, CustomerWriter, DieselRepository},
};

const DELETED: &str = "deleted";

impl CustomerReader for DieselRepository {
    fn get_customer_by_id(
        &self,
        id: i32,
        merchant_id: i32,
    ) -> RepositoryResult<Option<DomainCustomer>> {
        use crate::schema::customers;

        let mut conn = self.conn()?;
        let customer = customers::table
            .filter(customers::id.eq(id))
            .filter(customers::merchant_id.eq(merchant_id))
            .filter(customers::status.ne(DELETED))
            .first::<DbCustomer>(&mut conn)
            .optional()?;

        Ok(customer.map(Into::into))
    }

    fn find_customer_by_email(
        &self,
        merchant_id: i32,
        email: &str,
    ) -> RepositoryResult<Option<DomainCustomer>> {
        use crate::schema::customers;

        let normalized_email = email.trim().to_lowercase();

        let mut conn = self.conn()?;
        let customer = customers::table
            .filter(customers::merchant_id.eq(merchant_id))
            .filter(customers::email.eq(normalized_email))
            .filter(customers::status.ne(DELETED))
            .order(customers::id.asc())
            .first::<DbCustomer>(&mut conn)
            .optional()?;

        Ok(customer.map(Into::into))
    }

    fn find_customer_by_phone(
        &self,
        merchant_id: i32,
        phone: &str,
    ) -> RepositoryResult<Option<DomainCustomer>> {
        use crate::schema::customers;

        let mut conn = self.conn()?;
        let customer = customers::table
            .filter(customers::merchant_id.eq(merchant_id))
            .filter(customers::phone.eq(phone.trim()))
            .filter(customers::status.ne(DELETED))
            .order(customers::id.asc())
            .first::<DbCustomer>(&mut conn)
            .optional()?;

        Ok(customer.map(Into::into))
    }

    fn list_customers(
        &self,
        query: CustomerListQuery,
    ) -> RepositoryResult<(usize, Vec<DomainCustomer>)> {
        use crate::schema::customers;

        let mut conn = self.conn()?;

        let mut count_query = customers::table
            .filter(customers::merchant_id.eq(query.merchant_id))
            .filter(customers::status.ne(DELETED))
            .into_boxed::<diesel::sqlite::Sqlite>();

        if let Some(term) = query.search.as_ref() {
            let pattern = format!("%{}%", term);
            count_query = count_query.filter(
                customers::first_name
                    .like(pattern.clone())
                    .or(customers::last_name.like(pattern.clone()))
                    .or(customers::email.like(pattern.clone()))
                    .or(customers::phone.like(pattern)),
            );
        }

        let total = count_query.count().get_result::<i64>(&mut conn)? as usize;

        let mut items = customers::table
            .filter(customers::merchant_id.eq(query.merchant_id))
            .filter(customers::status.ne(DELETED))
            .into_boxed::<diesel::sqlite::Sqlite>();

        if let Some(term) = query.search.as_ref() {
            let pattern = format!("%{}%", term);
            items = items.filter(
                customers::first_name
                    .like(pattern.clone())
                    .or(customers::last_name.like(pattern.clone()))
                    .or(customers::email.like(pattern.clone()))
                    .or(customers::phone.like(pattern)),
            );
        }

        items = items.order((customers::first_name.asc(), customers::id.asc()));

        if let Some(pagination) = &query.pagination {
            let offset = ((pagination.page.max(1) - 1) * pagination.per_page) as i64;
            let limit = pagination.per_page as i64;
            items = items.offset(offset).limit(limit);
        }

        let db_customers = items.load::<DbCustomer>(&mut conn)?;

        if db_customers.is_empty() {
            return Ok((total, Vec::new()));
        }

        Ok((total, db_customers.into_iter().map(Into::into).collect()))
    }
}

impl CustomerWriter for DieselRepository {
    fn create_customer(
        &self,
        new_customer: &DomainNewCustomer,
    ) -> RepositoryResult<DomainCustomer> {
        use crate::schema::customers;

        let mut conn = self.conn()?;
        let db_new = DbNewCustomer::from(new_customer);

        let created = diesel::insert_into(customers::table)
            .values(&db_new)
            .get_result::<DbCustomer>(&mut conn)?;

        Ok(created.into())
    }

    fn update_customer(
        &self,
        customer_id: i32,
        merchant_id: i32,
        updates: &DomainUpdateCustomer,
    ) -> RepositoryResult<DomainCustomer> {
        use crate::schema::customers;

        let mut conn = self.conn()?;
        let db_updates = DbUpdateCustomer::from_domain(updates, Utc::now().naive_utc());

        let target = customers::table
            .filter(customers::id.eq(customer_id))
            .filter(customers::merchant_id.eq(merchant_id))
            .filter(customers::status.ne(DELETED));

        let updated = diesel::update(target)
            .set(&db_updates)
            .get_result::<DbCustomer>(&mut conn)
            .optional()?
            .ok_or(RepositoryError::NotFound)?;

        Ok(updated.into())
    }

    fn delete_customer(&self, customer_id: i32, merchant_id: i32) -> RepositoryResult<()> {
        use crate::schema::customers;

        let mut conn = self.conn()?;

        let target = customers::table
            .filter(customers::id.eq(customer_id))
            .filter(customers::merchant_id.eq(merchant_id))
            .filter(customers::status.ne(DELETED));

        let updated = diesel::update(target)
            .set((
                customers::status.eq(CustomerStatus::Deleted.as_str()),
                customers::updated_at.eq(Utc::now().naive_utc()),
            ))
            .execute(&mut conn)?;

        if updated == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    fn import_customers(
        &self,
        merchant_id: i32,
        new_customers: &[DomainNewCustomer],
    ) -> RepositoryResult<CustomerImportSummary> {
        use crate::schema::customers;

        let mut conn = self.conn()?;

        conn.transaction::<CustomerImportSummary, RepositoryError, _>(|conn| {
            let mut summary = CustomerImportSummary::default();
            let mut seen_emails: HashSet<String> = HashSet::new();
            let mut seen_phones: HashSet<String> = HashSet::new();

            for customer in new_customers {
                let email = customer.email.as_deref().filter(|email| !email.is_empty());
                let phone = customer.phone.as_deref().filter(|phone| !phone.is_empty());

                let duplicate_in_file = email.is_some_and(|email| seen_emails.contains(email))
                    || phone.is_some_and(|phone| seen_phones.contains(phone));

                if customer.first_name.is_empty()
                    || duplicate_in_file
                    || contact_exists(conn, merchant_id, email, phone)?
                {
                    summary.skipped += 1;
                    continue;
                }

                let payload = DomainNewCustomer {
                    merchant_id,
                    ..customer.clone()
                };
                diesel::insert_into(customers::table)
                    .values(&DbNewCustomer::from(&payload))
                    .execute(conn)?;

                if let Some(email) = email {
                    seen_emails.insert(email.to_string());
                }
                if let Some(phone) = phone {
                    seen_phones.insert(phone.to_string());
                }
                summary.imported += 1;
            }

            Ok(summary)
        })
    }
}

/// Whether a live customer of the merchant already uses `email` or `phone`.
fn contact_exists(
    conn: &mut SqliteConnection,
    merchant_id: i32,
    email: Option<&str>,
    phone: Option<&str>,
) -> RepositoryResult<bool> {
    use crate::schema::customers;

    if let Some(email) = email {
        let found: bool = select(exists(
            customers::table
                .filter(customers::merchant_id.eq(merchant_id))
                .filter(customers::status.ne(DELETED))
                .filter(customers::email.eq(email)),
        ))
        .get_result(conn)?;
        if found {
            return Ok(true);
        }
    }

    if let Some(phone) = phone {
        let found: bool = select(exists(
            customers::table
                .filter(customers::merchant_id.eq(merchant_id))
                .filter(customers::status.ne(DELETED))
                .filter(customers::phone.eq(phone)),
        ))
        .get_result(conn)?;
        if found {
            return Ok(true);
        }
    }

    Ok(false)
}
