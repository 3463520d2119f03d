use chrono::NaiveDate;
use diesel::prelude::*;

use crate::domain::schedule::{
    NewScheduleOverride as DomainNewScheduleOverride, NewStaffSchedule as DomainNewStaffSchedule,
    ScheduleOverride as DomainScheduleOverride, StaffSchedule as DomainStaffSchedule,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::staff_schedules)]
pub struct StaffSchedule {
    pub id: i32,
    pub staff_id: i32,
    pub day_of_week: i32,
    pub start_time: String,
    pub end_time: String,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::staff_schedules)]
pub struct NewStaffSchedule<'a> {
    pub staff_id: i32,
    pub day_of_week: i32,
    pub start_time: &'a str,
    pub end_time: &'a str,
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::schedule_overrides)]
pub struct ScheduleOverride {
    pub id: i32,
    pub staff_id: i32,
    pub date: NaiveDate,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub reason: Option<String>,
}

#[derive(Insertable, AsChangeset)]
#[diesel(table_name = crate::schema::schedule_overrides, treat_none_as_null = true)]
pub struct NewScheduleOverride<'a> {
    pub staff_id: i32,
    pub date: NaiveDate,
    pub start_time: Option<&'a str>,
    pub end_time: Option<&'a str>,
    pub reason: Option<&'a str>,
}

impl From<StaffSchedule> for DomainStaffSchedule {
    fn from(value: StaffSchedule) -> Self {
        Self {
            id: value.id,
            staff_id: value.staff_id,
            day_of_week: value.day_of_week,
            start_time: value.start_time,
            end_time: value.end_time,
        }
    }
}

impl<'a> From<&'a DomainNewStaffSchedule> for NewStaffSchedule<'a> {
    fn from(value: &'a DomainNewStaffSchedule) -> Self {
        Self {
            staff_id: value.staff_id,
            day_of_week: value.day_of_week,
            start_time: value.start_time.as_str(),
            end_time: value.end_time.as_str(),
        }
    }
}

impl From<ScheduleOverride> for DomainScheduleOverride {
    fn from(value: ScheduleOverride) -> Self {
        Self {
            id: value.id,
            staff_id: value.staff_id,
            date: value.date,
            start_time: value.start_time,
            end_time: value.end_time,
            reason: value.reason,
        }
    }
}

impl<'a> From<&'a DomainNewScheduleOverride> for NewScheduleOverride<'a> {
    fn from(value: &'a DomainNewScheduleOverride) -> Self {
        Self {
            staff_id: value.staff_id,
            date: value.date,
            start_time: value.start_time.as_deref(),
            end_time: value.end_time.as_deref(),
            reason: value.reason.as_deref(),
        }
    }
}
