use chrono::{NaiveDate, Utc};
use diesel::dsl::{exists, select};
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use pushkind_common::repository::errors::{RepositoryError, RepositoryResult};

use crate::{
    domain::schedule::{
        NewScheduleOverride as DomainNewScheduleOverride,
        NewStaffSchedule as DomainNewStaffSchedule, Roster,
        ScheduleOverride as DomainScheduleOverride, StaffSchedule as DomainStaffSchedule,
    },
    domain::staff::{
        NewStaff as DomainNewStaff, Staff as DomainStaff, StaffListQuery,
        UpdateStaff as DomainUpdateStaff,
    },
    models::schedule::{
        NewScheduleOverride as DbNewScheduleOverride, NewStaffSchedule as DbNewStaffSchedule,
        ScheduleOverride as DbScheduleOverride, StaffSchedule as DbStaffSchedule,
    },
    models::staff::{NewStaff as DbNewStaff, Staff as DbStaff, UpdateStaff as DbUpdateStaff},
    repository::{DieselRepository, StaffReader, StaffWriter},
};

impl StaffReader for DieselRepository {
    fn get_staff_by_id(&self, id: i32, merchant_id: i32) -> RepositoryResult<Option<DomainStaff>> {
        use crate::schema::staff;

        let mut conn = self.conn()?;
        let member = staff::table
            .filter(staff::id.eq(id))
            .filter(staff::merchant_id.eq(merchant_id))
            .first::<DbStaff>(&mut conn)
            .optional()?;

        Ok(member.map(Into::into))
    }

    fn list_staff(&self, query: StaffListQuery) -> RepositoryResult<Vec<DomainStaff>> {
        use crate::schema::staff;

        let mut conn = self.conn()?;

        let mut items = staff::table
            .filter(staff::merchant_id.eq(query.merchant_id))
            .into_boxed::<diesel::sqlite::Sqlite>();

        if let Some(status) = query.status {
            items = items.filter(staff::status.eq(status.as_str()));
        }

        let rows = items
            .order((staff::first_name.asc(), staff::id.asc()))
            .load::<DbStaff>(&mut conn)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    fn list_staff_schedules(
        &self,
        staff_id: i32,
        merchant_id: i32,
    ) -> RepositoryResult<Vec<DomainStaffSchedule>> {
        use crate::schema::staff_schedules;

        let mut conn = self.conn()?;
        ensure_staff_with_merchant(&mut conn, merchant_id, staff_id)?;

        let rows = staff_schedules::table
            .filter(staff_schedules::staff_id.eq(staff_id))
            .order(staff_schedules::day_of_week.asc())
            .load::<DbStaffSchedule>(&mut conn)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    fn list_schedule_overrides(
        &self,
        staff_id: i32,
        merchant_id: i32,
    ) -> RepositoryResult<Vec<DomainScheduleOverride>> {
        use crate::schema::schedule_overrides;

        let mut conn = self.conn()?;
        ensure_staff_with_merchant(&mut conn, merchant_id, staff_id)?;

        let rows = schedule_overrides::table
            .filter(schedule_overrides::staff_id.eq(staff_id))
            .order(schedule_overrides::date.asc())
            .load::<DbScheduleOverride>(&mut conn)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    fn load_roster(
        &self,
        merchant_id: i32,
        from: NaiveDate,
        to: NaiveDate,
    ) -> RepositoryResult<Roster> {
        use crate::schema::{schedule_overrides, staff, staff_schedules};

        let mut conn = self.conn()?;

        let staff_ids = staff::table
            .filter(staff::merchant_id.eq(merchant_id))
            .select(staff::id)
            .load::<i32>(&mut conn)?;

        if staff_ids.is_empty() {
            return Ok(Roster::default());
        }

        let schedules = staff_schedules::table
            .filter(staff_schedules::staff_id.eq_any(&staff_ids))
            .order((staff_schedules::staff_id.asc(), staff_schedules::day_of_week.asc()))
            .load::<DbStaffSchedule>(&mut conn)?;

        let overrides = schedule_overrides::table
            .filter(schedule_overrides::staff_id.eq_any(&staff_ids))
            .filter(schedule_overrides::date.ge(from))
            .filter(schedule_overrides::date.le(to))
            .load::<DbScheduleOverride>(&mut conn)?;

        Ok(Roster::new(
            schedules.into_iter().map(Into::into).collect(),
            overrides.into_iter().map(Into::into).collect(),
        ))
    }
}

impl StaffWriter for DieselRepository {
    fn create_staff(&self, new_staff: &DomainNewStaff) -> RepositoryResult<DomainStaff> {
        use crate::schema::staff;

        let mut conn = self.conn()?;
        let db_new = DbNewStaff::from(new_staff);

        let created = diesel::insert_into(staff::table)
            .values(&db_new)
            .get_result::<DbStaff>(&mut conn)?;

        Ok(created.into())
    }

    fn update_staff(
        &self,
        staff_id: i32,
        merchant_id: i32,
        updates: &DomainUpdateStaff,
    ) -> RepositoryResult<DomainStaff> {
        use crate::schema::staff;

        let mut conn = self.conn()?;
        let db_updates = DbUpdateStaff::from_domain(updates, Utc::now().naive_utc());

        let target = staff::table
            .filter(staff::id.eq(staff_id))
            .filter(staff::merchant_id.eq(merchant_id));

        let updated = diesel::update(target)
            .set(&db_updates)
            .get_result::<DbStaff>(&mut conn)
            .optional()?
            .ok_or(RepositoryError::NotFound)?;

        Ok(updated.into())
    }

    fn set_staff_pin(
        &self,
        staff_id: i32,
        merchant_id: i32,
        pin_cipher: &str,
    ) -> RepositoryResult<DomainStaff> {
        use crate::schema::staff;

        let mut conn = self.conn()?;

        let target = staff::table
            .filter(staff::id.eq(staff_id))
            .filter(staff::merchant_id.eq(merchant_id));

        let updated = diesel::update(target)
            .set((
                staff::pin_cipher.eq(Some(pin_cipher)),
                staff::updated_at.eq(Utc::now().naive_utc()),
            ))
            .get_result::<DbStaff>(&mut conn)
            .optional()?
            .ok_or(RepositoryError::NotFound)?;

        Ok(updated.into())
    }

    fn replace_staff_schedules(
        &self,
        staff_id: i32,
        merchant_id: i32,
        schedules: &[DomainNewStaffSchedule],
    ) -> RepositoryResult<Vec<DomainStaffSchedule>> {
        use crate::schema::staff_schedules;

        let mut conn = self.conn()?;

        conn.transaction::<Vec<DomainStaffSchedule>, RepositoryError, _>(|conn| {
            ensure_staff_with_merchant(conn, merchant_id, staff_id)?;

            diesel::delete(staff_schedules::table.filter(staff_schedules::staff_id.eq(staff_id)))
                .execute(conn)?;

            if !schedules.is_empty() {
                let payload: Vec<DbNewStaffSchedule> =
                    schedules.iter().map(DbNewStaffSchedule::from).collect();

                diesel::insert_into(staff_schedules::table)
                    .values(&payload)
                    .execute(conn)?;
            }

            let rows = staff_schedules::table
                .filter(staff_schedules::staff_id.eq(staff_id))
                .order(staff_schedules::day_of_week.asc())
                .load::<DbStaffSchedule>(conn)?;

            Ok(rows.into_iter().map(Into::into).collect())
        })
    }

    fn upsert_schedule_override(
        &self,
        merchant_id: i32,
        entry: &DomainNewScheduleOverride,
    ) -> RepositoryResult<DomainScheduleOverride> {
        use crate::schema::schedule_overrides;

        let mut conn = self.conn()?;

        conn.transaction::<DomainScheduleOverride, RepositoryError, _>(|conn| {
            ensure_staff_with_merchant(conn, merchant_id, entry.staff_id)?;

            let row = DbNewScheduleOverride::from(entry);
            let saved = diesel::insert_into(schedule_overrides::table)
                .values(&row)
                .on_conflict((schedule_overrides::staff_id, schedule_overrides::date))
                .do_update()
                .set(&row)
                .get_result::<DbScheduleOverride>(conn)?;

            Ok(saved.into())
        })
    }

    fn delete_schedule_override(
        &self,
        staff_id: i32,
        merchant_id: i32,
        date: NaiveDate,
    ) -> RepositoryResult<()> {
        use crate::schema::schedule_overrides;

        let mut conn = self.conn()?;
        ensure_staff_with_merchant(&mut conn, merchant_id, staff_id)?;

        let target = schedule_overrides::table
            .filter(schedule_overrides::staff_id.eq(staff_id))
            .filter(schedule_overrides::date.eq(date));

        let deleted = diesel::delete(target).execute(&mut conn)?;
        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}

fn ensure_staff_with_merchant(
    conn: &mut SqliteConnection,
    merchant_id: i32,
    staff_id: i32,
) -> RepositoryResult<()> {
    use crate::schema::staff;

    let exists: bool = select(exists(
        staff::table
            .filter(staff::id.eq(staff_id))
            .filter(staff::merchant_id.eq(merchant_id)),
    ))
    .get_result(conn)?;

    if exists {
        Ok(())
    } else {
        Err(RepositoryError::NotFound)
    }
}
