use chrono::Utc;
use diesel::prelude::*;
use pushkind_common::repository::errors::{RepositoryError, RepositoryResult};

use crate::{
    domain::service::{
        NewService as DomainNewService, Service as DomainService, ServiceListQuery,
        UpdateService as DomainUpdateService,
    },
    models::service::{
        NewService as DbNewService, Service as DbService, UpdateService as DbUpdateService,
    },
    repository::{CatalogReader, CatalogWriter, DieselRepository},
};

impl CatalogReader for DieselRepository {
    fn get_service_by_id(&self, id: i32, merchant_id: i32) -> RepositoryResult<Option<DomainService>> {
        use crate::schema::services;

        let mut conn = self.conn()?;
        let service = services::table
            .filter(services::id.eq(id))
            .filter(services::merchant_id.eq(merchant_id))
            .first::<DbService>(&mut conn)
            .optional()?;

        Ok(service.map(Into::into))
    }

    fn list_services(&self, query: ServiceListQuery) -> RepositoryResult<Vec<DomainService>> {
        use crate::schema::services;

        let mut conn = self.conn()?;

        let mut items = services::table
            .filter(services::merchant_id.eq(query.merchant_id))
            .into_boxed::<diesel::sqlite::Sqlite>();

        if query.active_only {
            items = items.filter(services::is_active.eq(true));
        }

        if let Some(category) = query.category.as_ref() {
            items = items.filter(services::category.eq(category));
        }

        let rows = items
            .order((services::category.asc(), services::name.asc()))
            .load::<DbService>(&mut conn)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

impl CatalogWriter for DieselRepository {
    fn create_service(&self, new_service: &DomainNewService) -> RepositoryResult<DomainService> {
        use crate::schema::services;

        let mut conn = self.conn()?;
        let db_new = DbNewService::from(new_service);

        let created = diesel::insert_into(services::table)
            .values(&db_new)
            .get_result::<DbService>(&mut conn)?;

        Ok(created.into())
    }

    fn update_service(
        &self,
        service_id: i32,
        merchant_id: i32,
        updates: &DomainUpdateService,
    ) -> RepositoryResult<DomainService> {
        use crate::schema::services;

        let mut conn = self.conn()?;
        let db_updates = DbUpdateService::from_domain(updates, Utc::now().naive_utc());

        let target = services::table
            .filter(services::id.eq(service_id))
            .filter(services::merchant_id.eq(merchant_id));

        let updated = diesel::update(target)
            .set(&db_updates)
            .get_result::<DbService>(&mut conn)
            .optional()?
            .ok_or(RepositoryError::NotFound)?;

        Ok(updated.into())
    }
}
