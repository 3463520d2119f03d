use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::availability::TimeRange;
use crate::domain::booking::Booking;

/// Period during which a staff member cannot take bookings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StaffBlock {
    pub id: i32,
    pub merchant_id: i32,
    pub staff_id: i32,
    /// UTC start of the block.
    pub start_time: NaiveDateTime,
    /// UTC end of the block (exclusive).
    pub end_time: NaiveDateTime,
    pub reason: Option<String>,
    pub created_at: NaiveDateTime,
}

impl StaffBlock {
    pub fn range(&self) -> TimeRange {
        TimeRange::new(self.start_time, self.end_time)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStaffBlock {
    pub merchant_id: i32,
    pub staff_id: i32,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub reason: Option<String>,
}

/// Query definition used to list blocks for a merchant.
#[derive(Debug, Clone)]
pub struct StaffBlockListQuery {
    pub merchant_id: i32,
    pub staff_id: Option<i32>,
    /// Only blocks ending after this instant.
    pub from: Option<NaiveDateTime>,
    /// Only blocks starting before this instant.
    pub to: Option<NaiveDateTime>,
}

impl StaffBlockListQuery {
    pub fn new(merchant_id: i32) -> Self {
        Self {
            merchant_id,
            staff_id: None,
            from: None,
            to: None,
        }
    }

    pub fn staff(mut self, staff_id: i32) -> Self {
        self.staff_id = Some(staff_id);
        self
    }

    /// Restrict to blocks overlapping `[from, to)`.
    pub fn overlapping(mut self, from: NaiveDateTime, to: NaiveDateTime) -> Self {
        self.from = Some(from);
        self.to = Some(to);
        self
    }
}

/// Result of recording a block: the merged block plus bookings it now hides.
#[derive(Debug, Clone, Serialize)]
pub struct StaffBlockOutcome {
    pub block: StaffBlock,
    pub warnings: Vec<Booking>,
}
