use std::fmt;
use std::str::FromStr;

use chrono::{Duration, NaiveDateTime};
use pushkind_common::pagination::Pagination;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::domain::availability::{StaffSegment, TimeRange};

/// Lifecycle state of a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
    NoShow,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::InProgress => "in_progress",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::NoShow => "no_show",
        }
    }

    /// Active bookings occupy staff time.
    pub fn is_active(&self) -> bool {
        !matches!(self, BookingStatus::Cancelled | BookingStatus::NoShow)
    }

    /// Terminal bookings accept no further changes.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BookingStatus::Completed | BookingStatus::Cancelled | BookingStatus::NoShow
        )
    }

    /// Statuses that still block time, as stored strings.
    pub fn active_values() -> [&'static str; 4] {
        [
            BookingStatus::Pending.as_str(),
            BookingStatus::Confirmed.as_str(),
            BookingStatus::InProgress.as_str(),
            BookingStatus::Completed.as_str(),
        ]
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "pending" => Ok(BookingStatus::Pending),
            "confirmed" => Ok(BookingStatus::Confirmed),
            "in_progress" => Ok(BookingStatus::InProgress),
            "completed" => Ok(BookingStatus::Completed),
            "cancelled" => Ok(BookingStatus::Cancelled),
            "no_show" => Ok(BookingStatus::NoShow),
            other => Err(format!("unknown booking status {other}")),
        }
    }
}

/// Requested change of booking status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingTransition {
    Confirm,
    Start,
    Complete,
    Cancel,
    NoShow,
}

impl BookingTransition {
    fn verb(&self) -> &'static str {
        match self {
            BookingTransition::Confirm => "confirm",
            BookingTransition::Start => "start",
            BookingTransition::Complete => "complete",
            BookingTransition::Cancel => "cancel",
            BookingTransition::NoShow => "mark as no-show",
        }
    }

    pub fn target(&self) -> BookingStatus {
        match self {
            BookingTransition::Confirm => BookingStatus::Confirmed,
            BookingTransition::Start => BookingStatus::InProgress,
            BookingTransition::Complete => BookingStatus::Completed,
            BookingTransition::Cancel => BookingStatus::Cancelled,
            BookingTransition::NoShow => BookingStatus::NoShow,
        }
    }

    /// Status reached from `current`, or the message explaining the refusal.
    pub fn apply(&self, current: BookingStatus) -> Result<BookingStatus, String> {
        use BookingStatus::*;

        let allowed = match self {
            BookingTransition::Confirm => matches!(current, Pending),
            BookingTransition::Start => matches!(current, Confirmed),
            BookingTransition::Complete => matches!(current, Confirmed | InProgress),
            BookingTransition::Cancel => matches!(current, Pending | Confirmed),
            BookingTransition::NoShow => matches!(current, Pending | Confirmed),
        };

        if allowed {
            Ok(self.target())
        } else {
            Err(format!(
                "Cannot {} booking in {} status",
                self.verb(),
                current.as_str()
            ))
        }
    }
}

/// Channel through which a booking was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingSource {
    Online,
    InPerson,
}

impl BookingSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingSource::Online => "online",
            BookingSource::InPerson => "in_person",
        }
    }

    pub fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("online") {
            BookingSource::Online
        } else {
            BookingSource::InPerson
        }
    }
}

/// Service performed as part of a booking.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BookingItem {
    pub id: i32,
    pub booking_id: i32,
    pub service_id: i32,
    pub service_name: String,
    /// Staff performing this service; falls back to the booking staff.
    pub staff_id: Option<i32>,
    pub price_cents: i64,
    pub duration_minutes: i32,
    pub padding_before_minutes: i32,
    pub padding_after_minutes: i32,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub sort_order: i32,
}

impl BookingItem {
    pub fn range(&self) -> TimeRange {
        TimeRange::new(self.start_time, self.end_time)
    }

    pub fn padded_range(&self) -> TimeRange {
        self.range().padded(
            i64::from(self.padding_before_minutes),
            i64::from(self.padding_after_minutes),
        )
    }
}

/// Scheduled appointment with its ordered services.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Booking {
    pub id: i32,
    pub merchant_id: i32,
    pub location_id: Option<i32>,
    pub customer_id: i32,
    pub staff_id: Option<i32>,
    pub booking_number: String,
    pub status: BookingStatus,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub total_cents: i64,
    pub notes: Option<String>,
    pub source: BookingSource,
    pub is_override: bool,
    pub override_reason: Option<String>,
    pub customer_requested_staff: bool,
    pub cancellation_reason: Option<String>,
    pub cancelled_at: Option<NaiveDateTime>,
    pub completed_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub services: Vec<BookingItem>,
}

impl Booking {
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    pub fn range(&self) -> TimeRange {
        TimeRange::new(self.start_time, self.end_time)
    }

    /// Staff responsible for `item`.
    pub fn effective_staff(&self, item: &BookingItem) -> Option<i32> {
        item.staff_id.or(self.staff_id)
    }

    /// Padded ranges during which `staff_id` is busy with this booking.
    pub fn occupied_ranges_for(&self, staff_id: i32) -> Vec<TimeRange> {
        self.services
            .iter()
            .filter(|item| self.effective_staff(item) == Some(staff_id))
            .map(BookingItem::padded_range)
            .collect()
    }

    /// Whether `staff_id` works on any service of this booking.
    pub fn involves_staff(&self, staff_id: i32) -> bool {
        self.staff_id == Some(staff_id)
            || self.services.iter().any(|item| item.staff_id == Some(staff_id))
    }

    /// Whether no service of the booking has a staff member.
    pub fn is_unassigned(&self) -> bool {
        self.services
            .iter()
            .all(|item| self.effective_staff(item).is_none())
    }

    /// Staff-assigned segments, without padding.
    pub fn staff_segments(&self) -> Vec<StaffSegment> {
        self.services
            .iter()
            .filter_map(|item| {
                self.effective_staff(item).map(|staff_id| StaffSegment {
                    staff_id,
                    range: item.range(),
                })
            })
            .collect()
    }
}

/// Service line resolved from the catalog before a booking is planned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedService {
    pub service_id: i32,
    pub service_name: String,
    pub staff_id: Option<i32>,
    pub price_cents: i64,
    pub duration_minutes: i32,
    pub padding_before_minutes: i32,
    pub padding_after_minutes: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBookingItem {
    pub service_id: i32,
    pub service_name: String,
    pub staff_id: Option<i32>,
    pub price_cents: i64,
    pub duration_minutes: i32,
    pub padding_before_minutes: i32,
    pub padding_after_minutes: i32,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub sort_order: i32,
}

/// Lay out services back to back starting at `start`.
pub fn plan_booking_items(start: NaiveDateTime, services: &[PlannedService]) -> Vec<NewBookingItem> {
    let mut cursor = start;
    services
        .iter()
        .enumerate()
        .map(|(index, service)| {
            let item_start = cursor;
            let item_end = item_start + Duration::minutes(i64::from(service.duration_minutes));
            cursor = item_end;
            NewBookingItem {
                service_id: service.service_id,
                service_name: service.service_name.clone(),
                staff_id: service.staff_id,
                price_cents: service.price_cents,
                duration_minutes: service.duration_minutes,
                padding_before_minutes: service.padding_before_minutes,
                padding_after_minutes: service.padding_after_minutes,
                start_time: item_start,
                end_time: item_end,
                sort_order: index as i32,
            }
        })
        .collect()
}

/// Payload required to insert a new booking with its services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBooking {
    pub merchant_id: i32,
    pub location_id: Option<i32>,
    pub customer_id: i32,
    pub staff_id: Option<i32>,
    pub booking_number: String,
    pub status: BookingStatus,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub total_cents: i64,
    pub notes: Option<String>,
    pub source: BookingSource,
    pub is_override: bool,
    pub override_reason: Option<String>,
    pub customer_requested_staff: bool,
    pub items: Vec<NewBookingItem>,
}

impl NewBooking {
    /// Build a booking from planned items; end and total follow the items.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        merchant_id: i32,
        customer_id: i32,
        staff_id: Option<i32>,
        booking_number: impl Into<String>,
        status: BookingStatus,
        source: BookingSource,
        start_time: NaiveDateTime,
        items: Vec<NewBookingItem>,
    ) -> Self {
        let end_time = items.last().map(|item| item.end_time).unwrap_or(start_time);
        let total_cents = items.iter().map(|item| item.price_cents).sum();
        Self {
            merchant_id,
            location_id: None,
            customer_id,
            staff_id,
            booking_number: booking_number.into(),
            status,
            start_time,
            end_time,
            total_cents,
            notes: None,
            source,
            is_override: false,
            override_reason: None,
            customer_requested_staff: staff_id.is_some(),
            items,
        }
    }

    /// Staff-assigned segments, without padding.
    pub fn staff_segments(&self) -> Vec<StaffSegment> {
        self.items
            .iter()
            .filter_map(|item| {
                item.staff_id.or(self.staff_id).map(|staff_id| StaffSegment {
                    staff_id,
                    range: TimeRange::new(item.start_time, item.end_time),
                })
            })
            .collect()
    }

    /// Whether any service is left without staff.
    pub fn has_unassigned_items(&self) -> bool {
        self.items
            .iter()
            .any(|item| item.staff_id.or(self.staff_id).is_none())
    }
}

/// New timing and staffing of an existing booking's services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RescheduledItem {
    pub id: i32,
    pub staff_id: Option<i32>,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
}

/// Time or staff change applied to an existing booking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingReschedule {
    pub staff_id: Option<i32>,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub is_override: bool,
    pub override_reason: Option<String>,
    pub items: Vec<RescheduledItem>,
    pub updated_at: NaiveDateTime,
}

impl BookingReschedule {
    /// Move `booking` to `start` and optionally hand it to `staff_id`.
    ///
    /// Services keep their durations and order. Reassignment moves every
    /// service to the new staff member.
    pub fn for_booking(
        booking: &Booking,
        start: NaiveDateTime,
        staff_id: Option<i32>,
        updated_at: NaiveDateTime,
    ) -> Self {
        let offset = start - booking.start_time;
        let reassigned = staff_id.is_some();
        let staff_id = staff_id.or(booking.staff_id);
        let items = booking
            .services
            .iter()
            .map(|item| RescheduledItem {
                id: item.id,
                staff_id: if reassigned { staff_id } else { item.staff_id },
                start_time: item.start_time + offset,
                end_time: item.end_time + offset,
            })
            .collect();

        Self {
            staff_id,
            start_time: booking.start_time + offset,
            end_time: booking.end_time + offset,
            is_override: booking.is_override,
            override_reason: booking.override_reason.clone(),
            items,
            updated_at,
        }
    }

    pub fn staff_segments(&self) -> Vec<StaffSegment> {
        self.items
            .iter()
            .filter_map(|item| {
                item.staff_id.or(self.staff_id).map(|staff_id| StaffSegment {
                    staff_id,
                    range: TimeRange::new(item.start_time, item.end_time),
                })
            })
            .collect()
    }
}

/// Non-scheduling fields changed on an existing booking.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateBookingDetails {
    pub customer_id: Option<i32>,
    pub notes: Option<String>,
    pub location_id: Option<i32>,
    pub updated_at: Option<NaiveDateTime>,
}

/// Status change persisted together with its timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingStatusChange {
    pub from: BookingStatus,
    pub to: BookingStatus,
    pub cancellation_reason: Option<String>,
    pub cancelled_at: Option<NaiveDateTime>,
    pub completed_at: Option<NaiveDateTime>,
    pub updated_at: NaiveDateTime,
}

impl BookingStatusChange {
    pub fn new(from: BookingStatus, to: BookingStatus, now: NaiveDateTime) -> Self {
        Self {
            from,
            to,
            cancellation_reason: None,
            cancelled_at: (to == BookingStatus::Cancelled).then_some(now),
            completed_at: (to == BookingStatus::Completed).then_some(now),
            updated_at: now,
        }
    }

    pub fn with_reason(mut self, reason: Option<String>) -> Self {
        self.cancellation_reason = reason;
        self
    }
}

/// What an existing booking or block collides with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    Booking,
    Block,
}

/// Existing booking or block overlapping a requested segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookingConflict {
    #[serde(rename = "type")]
    pub kind: ConflictKind,
    pub booking_id: Option<i32>,
    pub block_id: Option<i32>,
    pub booking_number: Option<String>,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub staff_id: i32,
    pub staff_name: String,
    pub reason: Option<String>,
}

/// Result of a write that checks for conflicts before storing.
#[derive(Debug, Clone)]
pub enum BookingWriteOutcome {
    Saved {
        booking: Booking,
        /// Conflicts accepted because the booking is an override.
        overridden: Vec<BookingConflict>,
    },
    Conflicts(Vec<BookingConflict>),
}

/// Query definition used to list bookings for a merchant.
#[derive(Debug, Clone)]
pub struct BookingListQuery {
    pub merchant_id: i32,
    /// Only bookings ending after this UTC instant.
    pub from: Option<NaiveDateTime>,
    /// Only bookings starting before this UTC instant.
    pub to: Option<NaiveDateTime>,
    pub staff_id: Option<i32>,
    pub customer_id: Option<i32>,
    pub status: Option<BookingStatus>,
    pub active_only: bool,
    pub pagination: Option<Pagination>,
}

impl BookingListQuery {
    pub fn new(merchant_id: i32) -> Self {
        Self {
            merchant_id,
            from: None,
            to: None,
            staff_id: None,
            customer_id: None,
            status: None,
            active_only: false,
            pagination: None,
        }
    }

    /// Restrict to bookings overlapping `[from, to)`.
    pub fn overlapping(mut self, from: NaiveDateTime, to: NaiveDateTime) -> Self {
        self.from = Some(from);
        self.to = Some(to);
        self
    }

    pub fn staff(mut self, staff_id: i32) -> Self {
        self.staff_id = Some(staff_id);
        self
    }

    pub fn customer(mut self, customer_id: i32) -> Self {
        self.customer_id = Some(customer_id);
        self
    }

    pub fn status(mut self, status: BookingStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Exclude cancelled and no-show bookings.
    pub fn active(mut self) -> Self {
        self.active_only = true;
        self
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

const BASE36: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Uppercase base-36 rendering of `value`.
pub fn to_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(BASE36[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    String::from_utf8(digits).unwrap_or_default()
}

/// `count` random uppercase base-36 characters.
pub fn random_base36<R: Rng + ?Sized>(rng: &mut R, count: usize) -> String {
    (0..count)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect()
}

/// Human-facing booking reference: `BK`, base-36 millis, five random chars.
pub fn generate_booking_number<R: Rng + ?Sized>(rng: &mut R, now: NaiveDateTime) -> String {
    let millis = now.and_utc().timestamp_millis().max(0) as u64;
    format!("BK{}{}", to_base36(millis), random_base36(rng, 5))
}
