use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use pushkind_common::repository::errors::{RepositoryError, RepositoryResult};

use crate::{
    domain::availability::{TimeRange, merge_block_range},
    domain::staff_block::{
        NewStaffBlock as DomainNewStaffBlock, StaffBlock as DomainStaffBlock, StaffBlockListQuery,
    },
    models::staff_block::{NewStaffBlock as DbNewStaffBlock, StaffBlock as DbStaffBlock},
    repository::{DieselRepository, StaffBlockReader, StaffBlockWriter},
};

impl StaffBlockReader for DieselRepository {
    fn list_staff_blocks(
        &self,
        query: StaffBlockListQuery,
    ) -> RepositoryResult<Vec<DomainStaffBlock>> {
        use crate::schema::staff_blocks;

        let mut conn = self.conn()?;

        let mut items = staff_blocks::table
            .filter(staff_blocks::merchant_id.eq(query.merchant_id))
            .into_boxed::<diesel::sqlite::Sqlite>();

        if let Some(staff_id) = query.staff_id {
            items = items.filter(staff_blocks::staff_id.eq(staff_id));
        }

        if let Some(from) = query.from {
            items = items.filter(staff_blocks::end_time.gt(from));
        }

        if let Some(to) = query.to {
            items = items.filter(staff_blocks::start_time.lt(to));
        }

        let rows = items
            .order((staff_blocks::start_time.asc(), staff_blocks::id.asc()))
            .load::<DbStaffBlock>(&mut conn)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

impl StaffBlockWriter for DieselRepository {
    fn create_staff_block(
        &self,
        new_block: &DomainNewStaffBlock,
    ) -> RepositoryResult<DomainStaffBlock> {
        use crate::schema::staff_blocks;

        let mut conn = self.conn()?;

        conn.transaction::<DomainStaffBlock, RepositoryError, _>(|conn| {
            let requested = TimeRange::new(new_block.start_time, new_block.end_time);
            let mut merged = requested;

            let absorbed: Vec<DomainStaffBlock> = loop {
                let candidates = touching_blocks(conn, new_block, &merged)?;
                let (range, ids) = merge_block_range(requested, &candidates);
                if range == merged {
                    break candidates
                        .into_iter()
                        .filter(|block| ids.contains(&block.id))
                        .collect();
                }
                merged = range;
            };

            let reason = new_block
                .reason
                .clone()
                .or_else(|| absorbed.iter().find_map(|block| block.reason.clone()));

            if !absorbed.is_empty() {
                let ids: Vec<i32> = absorbed.iter().map(|block| block.id).collect();
                diesel::delete(staff_blocks::table.filter(staff_blocks::id.eq_any(&ids)))
                    .execute(conn)?;
            }

            let payload = DomainNewStaffBlock {
                start_time: merged.start,
                end_time: merged.end,
                reason,
                ..new_block.clone()
            };

            let created = diesel::insert_into(staff_blocks::table)
                .values(&DbNewStaffBlock::from(&payload))
                .get_result::<DbStaffBlock>(conn)?;

            Ok(created.into())
        })
    }

    fn delete_staff_block(&self, block_id: i32, merchant_id: i32) -> RepositoryResult<()> {
        use crate::schema::staff_blocks;

        let mut conn = self.conn()?;

        let target = staff_blocks::table
            .filter(staff_blocks::id.eq(block_id))
            .filter(staff_blocks::merchant_id.eq(merchant_id));

        let deleted = diesel::delete(target).execute(&mut conn)?;
        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}

/// Blocks of the same staff member overlapping or touching `range`.
fn touching_blocks(
    conn: &mut SqliteConnection,
    new_block: &DomainNewStaffBlock,
    range: &TimeRange,
) -> RepositoryResult<Vec<DomainStaffBlock>> {
    use crate::schema::staff_blocks;

    let rows = staff_blocks::table
        .filter(staff_blocks::merchant_id.eq(new_block.merchant_id))
        .filter(staff_blocks::staff_id.eq(new_block.staff_id))
        .filter(staff_blocks::start_time.le(range.end))
        .filter(staff_blocks::end_time.ge(range.start))
        .load::<DbStaffBlock>(conn)?;

    Ok(rows.into_iter().map(Into::into).collect())
}
