use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::staff_block::{NewStaffBlock as DomainNewStaffBlock, StaffBlock as DomainStaffBlock};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::staff_blocks)]
pub struct StaffBlock {
    pub id: i32,
    pub merchant_id: i32,
    pub staff_id: i32,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub reason: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::staff_blocks)]
pub struct NewStaffBlock<'a> {
    pub merchant_id: i32,
    pub staff_id: i32,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub reason: Option<&'a str>,
}

impl From<StaffBlock> for DomainStaffBlock {
    fn from(value: StaffBlock) -> Self {
        Self {
            id: value.id,
            merchant_id: value.merchant_id,
            staff_id: value.staff_id,
            start_time: value.start_time,
            end_time: value.end_time,
            reason: value.reason,
            created_at: value.created_at,
        }
    }
}

impl<'a> From<&'a DomainNewStaffBlock> for NewStaffBlock<'a> {
    fn from(value: &'a DomainNewStaffBlock) -> Self {
        Self {
            merchant_id: value.merchant_id,
            staff_id: value.staff_id,
            start_time: value.start_time,
            end_time: value.end_time,
            reason: value.reason.as_deref(),
        }
    }
}
