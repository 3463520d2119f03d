use chrono::Utc;
use diesel::prelude::*;
use pushkind_common::repository::errors::{RepositoryError, RepositoryResult};

use crate::{
    domain::location::{
        Location as DomainLocation, NewLocation as DomainNewLocation,
        UpdateLocation as DomainUpdateLocation,
    },
    models::location::{
        Location as DbLocation, NewLocation as DbNewLocation, UpdateLocation as DbUpdateLocation,
    },
    repository::{DieselRepository, LocationReader, LocationWriter},
};

impl LocationReader for DieselRepository {
    fn get_location_by_id(
        &self,
        id: i32,
        merchant_id: i32,
    ) -> RepositoryResult<Option<DomainLocation>> {
        use crate::schema::locations;

        let mut conn = self.conn()?;
        let location = locations::table
            .filter(locations::id.eq(id))
            .filter(locations::merchant_id.eq(merchant_id))
            .first::<DbLocation>(&mut conn)
            .optional()?;

        Ok(location.map(Into::into))
    }

    fn list_locations(&self, merchant_id: i32) -> RepositoryResult<Vec<DomainLocation>> {
        use crate::schema::locations;

        let mut conn = self.conn()?;
        let rows = locations::table
            .filter(locations::merchant_id.eq(merchant_id))
            .order(locations::name.asc())
            .load::<DbLocation>(&mut conn)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

impl LocationWriter for DieselRepository {
    fn create_location(&self, new_location: &DomainNewLocation) -> RepositoryResult<DomainLocation> {
        use crate::schema::locations;

        let mut conn = self.conn()?;
        let db_new = DbNewLocation::from(new_location);

        let created = diesel::insert_into(locations::table)
            .values(&db_new)
            .get_result::<DbLocation>(&mut conn)?;

        Ok(created.into())
    }

    fn update_location(
        &self,
        location_id: i32,
        merchant_id: i32,
        updates: &DomainUpdateLocation,
    ) -> RepositoryResult<DomainLocation> {
        use crate::schema::locations;

        let mut conn = self.conn()?;
        let db_updates = DbUpdateLocation::from_domain(updates, Utc::now().naive_utc());

        let target = locations::table
            .filter(locations::id.eq(location_id))
            .filter(locations::merchant_id.eq(merchant_id));

        let updated = diesel::update(target)
            .set(&db_updates)
            .get_result::<DbLocation>(&mut conn)
            .optional()?
            .ok_or(RepositoryError::NotFound)?;

        Ok(updated.into())
    }

    fn delete_location(&self, location_id: i32, merchant_id: i32) -> RepositoryResult<()> {
        use crate::schema::locations;

        let mut conn = self.conn()?;

        let target = locations::table
            .filter(locations::id.eq(location_id))
            .filter(locations::merchant_id.eq(merchant_id));

        let deleted = diesel::delete(target).execute(&mut conn)?;
        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
