use std::collections::HashSet;

use chrono::{NaiveDate, Utc};
use diesel::prelude::*;
use pushkind_common::repository::errors::{RepositoryError, RepositoryResult};

use crate::{
    domain::holiday::{
        AustralianState, HolidaySource, HolidaySyncSummary,
        MerchantHoliday as DomainMerchantHoliday, NewMerchantHoliday as DomainNewMerchantHoliday,
        PublicHoliday, UpdateMerchantHoliday as DomainUpdateMerchantHoliday,
    },
    domain::merchant::MerchantSettings,
    models::holiday::{
        MerchantHoliday as DbMerchantHoliday, NewMerchantHoliday as DbNewMerchantHoliday,
        UpdateMerchantHoliday as DbUpdateMerchantHoliday,
    },
    repository::{DieselRepository, HolidayReader, HolidayWriter},
};

impl HolidayReader for DieselRepository {
    fn list_holidays(&self, merchant_id: i32) -> RepositoryResult<Vec<DomainMerchantHoliday>> {
        use crate::schema::merchant_holidays;

        let mut conn = self.conn()?;
        let rows = merchant_holidays::table
            .filter(merchant_holidays::merchant_id.eq(merchant_id))
            .order(merchant_holidays::date.asc())
            .load::<DbMerchantHoliday>(&mut conn)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    fn list_holidays_between(
        &self,
        merchant_id: i32,
        from: NaiveDate,
        to: NaiveDate,
    ) -> RepositoryResult<Vec<DomainMerchantHoliday>> {
        use crate::schema::merchant_holidays;

        let mut conn = self.conn()?;
        let rows = merchant_holidays::table
            .filter(merchant_holidays::merchant_id.eq(merchant_id))
            .filter(merchant_holidays::date.ge(from))
            .filter(merchant_holidays::date.le(to))
            .order(merchant_holidays::date.asc())
            .load::<DbMerchantHoliday>(&mut conn)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    fn get_holiday_by_id(
        &self,
        id: i32,
        merchant_id: i32,
    ) -> RepositoryResult<Option<DomainMerchantHoliday>> {
        use crate::schema::merchant_holidays;

        let mut conn = self.conn()?;
        let holiday = merchant_holidays::table
            .filter(merchant_holidays::id.eq(id))
            .filter(merchant_holidays::merchant_id.eq(merchant_id))
            .first::<DbMerchantHoliday>(&mut conn)
            .optional()?;

        Ok(holiday.map(Into::into))
    }

    fn get_holiday_by_date(
        &self,
        merchant_id: i32,
        date: NaiveDate,
    ) -> RepositoryResult<Option<DomainMerchantHoliday>> {
        use crate::schema::merchant_holidays;

        let mut conn = self.conn()?;
        let holiday = merchant_holidays::table
            .filter(merchant_holidays::merchant_id.eq(merchant_id))
            .filter(merchant_holidays::date.eq(date))
            .first::<DbMerchantHoliday>(&mut conn)
            .optional()?;

        Ok(holiday.map(Into::into))
    }
}

impl HolidayWriter for DieselRepository {
    fn create_holiday(
        &self,
        new_holiday: &DomainNewMerchantHoliday,
    ) -> RepositoryResult<DomainMerchantHoliday> {
        use crate::schema::merchant_holidays;

        let mut conn = self.conn()?;
        let created = diesel::insert_into(merchant_holidays::table)
            .values(&DbNewMerchantHoliday::from(new_holiday))
            .get_result::<DbMerchantHoliday>(&mut conn)?;

        Ok(created.into())
    }

    fn update_holiday(
        &self,
        holiday_id: i32,
        merchant_id: i32,
        updates: &DomainUpdateMerchantHoliday,
    ) -> RepositoryResult<DomainMerchantHoliday> {
        use crate::schema::merchant_holidays;

        let mut conn = self.conn()?;
        let db_updates = DbUpdateMerchantHoliday::from_domain(updates, Utc::now().naive_utc());

        let target = merchant_holidays::table
            .filter(merchant_holidays::id.eq(holiday_id))
            .filter(merchant_holidays::merchant_id.eq(merchant_id));

        let updated = diesel::update(target)
            .set(&db_updates)
            .get_result::<DbMerchantHoliday>(&mut conn)
            .optional()?
            .ok_or(RepositoryError::NotFound)?;

        Ok(updated.into())
    }

    fn delete_holiday(&self, holiday_id: i32, merchant_id: i32) -> RepositoryResult<()> {
        use crate::schema::merchant_holidays;

        let mut conn = self.conn()?;

        let target = merchant_holidays::table
            .filter(merchant_holidays::id.eq(holiday_id))
            .filter(merchant_holidays::merchant_id.eq(merchant_id));

        let deleted = diesel::delete(target).execute(&mut conn)?;
        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    fn sync_state_holidays(
        &self,
        merchant_id: i32,
        state: AustralianState,
        year: i32,
        holidays: &[PublicHoliday],
    ) -> RepositoryResult<HolidaySyncSummary> {
        use crate::schema::{merchant_holidays, merchants};

        let (Some(year_start), Some(year_end)) = (
            NaiveDate::from_ymd_opt(year, 1, 1),
            NaiveDate::from_ymd_opt(year, 12, 31),
        ) else {
            return Err(RepositoryError::NotFound);
        };

        let mut conn = self.conn()?;

        conn.transaction::<HolidaySyncSummary, RepositoryError, _>(|conn| {
            let settings_json = merchants::table
                .filter(merchants::id.eq(merchant_id))
                .select(merchants::settings)
                .first::<String>(conn)
                .optional()?
                .ok_or(RepositoryError::NotFound)?;

            let now = Utc::now().naive_utc();
            let mut summary = HolidaySyncSummary::default();

            let existing: Vec<DomainMerchantHoliday> = merchant_holidays::table
                .filter(merchant_holidays::merchant_id.eq(merchant_id))
                .filter(merchant_holidays::date.ge(year_start))
                .filter(merchant_holidays::date.le(year_end))
                .load::<DbMerchantHoliday>(conn)?
                .into_iter()
                .map(Into::into)
                .collect();

            for holiday in holidays {
                match existing.iter().find(|entry| entry.date == holiday.date) {
                    Some(entry) if entry.source == HolidaySource::Custom => {
                        summary.skipped_custom += 1;
                    }
                    Some(entry) => {
                        if entry.name != holiday.name || entry.state != Some(state) {
                            diesel::update(
                                merchant_holidays::table.filter(merchant_holidays::id.eq(entry.id)),
                            )
                            .set((
                                merchant_holidays::name.eq(holiday.name.as_str()),
                                merchant_holidays::state.eq(Some(state.as_str())),
                                merchant_holidays::updated_at.eq(now),
                            ))
                            .execute(conn)?;
                            summary.updated += 1;
                        }
                    }
                    None => {
                        let new_holiday = DomainNewMerchantHoliday {
                            merchant_id,
                            name: holiday.name.clone(),
                            date: holiday.date,
                            is_day_off: !holiday.part_day,
                            source: HolidaySource::State,
                            state: Some(state),
                        };
                        diesel::insert_into(merchant_holidays::table)
                            .values(&DbNewMerchantHoliday::from(&new_holiday))
                            .execute(conn)?;
                        summary.created += 1;
                    }
                }
            }

            let wanted: HashSet<NaiveDate> = holidays.iter().map(|holiday| holiday.date).collect();
            let stale: Vec<i32> = existing
                .iter()
                .filter(|entry| entry.source == HolidaySource::State)
                .filter(|entry| !wanted.contains(&entry.date))
                .map(|entry| entry.id)
                .collect();

            if !stale.is_empty() {
                summary.removed = diesel::delete(
                    merchant_holidays::table.filter(merchant_holidays::id.eq_any(&stale)),
                )
                .execute(conn)?;
            }

            let mut settings = MerchantSettings::from_json(&settings_json);
            settings.holiday_state = Some(state);
            diesel::update(merchants::table.filter(merchants::id.eq(merchant_id)))
                .set((
                    merchants::settings.eq(settings.to_json()),
                    merchants::updated_at.eq(now),
                ))
                .execute(conn)?;

            Ok(summary)
        })
    }
}
