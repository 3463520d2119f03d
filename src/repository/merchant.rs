use chrono::Utc;
use diesel::prelude::*;
use pushkind_common::repository::errors::{RepositoryError, RepositoryResult};

use crate::{
    domain::merchant::{
        Merchant as DomainMerchant, MerchantSettings, NewMerchant as DomainNewMerchant,
    },
    models::merchant::{Merchant as DbMerchant, NewMerchant as DbNewMerchant},
    repository::{DieselRepository, MerchantReader, MerchantWriter},
};

impl MerchantReader for DieselRepository {
    fn get_merchant_by_id(&self, id: i32) -> RepositoryResult<Option<DomainMerchant>> {
        use crate::schema::merchants;

        let mut conn = self.conn()?;
        let merchant = merchants::table
            .filter(merchants::id.eq(id))
            .first::<DbMerchant>(&mut conn)
            .optional()?;

        Ok(merchant.map(Into::into))
    }

    fn get_merchant_by_username(&self, username: &str) -> RepositoryResult<Option<DomainMerchant>> {
        use crate::schema::merchants;

        let mut conn = self.conn()?;
        let merchant = merchants::table
            .filter(merchants::username.eq(username))
            .first::<DbMerchant>(&mut conn)
            .optional()?;

        Ok(merchant.map(Into::into))
    }

    fn get_merchant_by_subdomain(
        &self,
        subdomain: &str,
    ) -> RepositoryResult<Option<DomainMerchant>> {
        use crate::schema::merchants;

        let normalized = subdomain.trim().to_lowercase();

        let mut conn = self.conn()?;
        let merchant = merchants::table
            .filter(merchants::subdomain.eq(normalized))
            .first::<DbMerchant>(&mut conn)
            .optional()?;

        Ok(merchant.map(Into::into))
    }
}

impl MerchantWriter for DieselRepository {
    fn create_merchant(&self, new_merchant: &DomainNewMerchant) -> RepositoryResult<DomainMerchant> {
        use crate::schema::merchants;

        let mut conn = self.conn()?;
        let db_new = DbNewMerchant::from(new_merchant);

        let created = diesel::insert_into(merchants::table)
            .values(&db_new)
            .get_result::<DbMerchant>(&mut conn)?;

        Ok(created.into())
    }

    fn update_merchant_settings(
        &self,
        merchant_id: i32,
        settings: &MerchantSettings,
    ) -> RepositoryResult<DomainMerchant> {
        use crate::schema::merchants;

        let mut conn = self.conn()?;
        let updated = diesel::update(merchants::table.filter(merchants::id.eq(merchant_id)))
            .set((
                merchants::settings.eq(settings.to_json()),
                merchants::updated_at.eq(Utc::now().naive_utc()),
            ))
            .get_result::<DbMerchant>(&mut conn)
            .optional()?
            .ok_or(RepositoryError::NotFound)?;

        Ok(updated.into())
    }
}
