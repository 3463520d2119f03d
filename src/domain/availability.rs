//! Slot generation, staff selection and capacity rules.
//!
//! Everything here is pure: callers load bookings, blocks and rosters and pass
//! them in. Instants are naive UTC; wall-clock inputs are converted with the
//! merchant time zone before comparison.

use std::collections::{BTreeMap, HashMap};

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use chrono_tz::Tz;
use serde::Serialize;

use crate::domain::booking::{Booking, BookingConflict, ConflictKind};
use crate::domain::schedule::format_hhmm;
use crate::domain::staff_block::StaffBlock;
use crate::domain::timezone::{local_to_utc, utc_to_local};

pub const PAST_SLOT_REASON: &str = "Slot is in the past";

/// Half-open UTC interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimeRange {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    pub fn overlaps(&self, other: &TimeRange) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Overlap that also accepts ranges sharing an endpoint.
    pub fn overlaps_or_touches(&self, other: &TimeRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    pub fn contains(&self, other: &TimeRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    pub fn union(&self, other: &TimeRange) -> TimeRange {
        TimeRange::new(self.start.min(other.start), self.end.max(other.end))
    }

    /// Extend the range by the given minutes on each side.
    pub fn padded(&self, before_minutes: i64, after_minutes: i64) -> TimeRange {
        TimeRange::new(
            self.start - Duration::minutes(before_minutes),
            self.end + Duration::minutes(after_minutes),
        )
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }
}

/// Time a staff member is unavailable, with the reason shown to users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusyInterval {
    pub range: TimeRange,
    pub reason: String,
}

/// Busy intervals of `staff_id`: padded segments of active bookings and blocks.
pub fn busy_intervals_for_staff(
    staff_id: i32,
    bookings: &[Booking],
    blocks: &[StaffBlock],
) -> Vec<BusyInterval> {
    let mut busy = Vec::new();

    for booking in bookings.iter().filter(|booking| booking.is_active()) {
        for range in booking.occupied_ranges_for(staff_id) {
            busy.push(BusyInterval {
                range,
                reason: format!("Conflicts with booking {}", booking.booking_number),
            });
        }
    }

    for block in blocks.iter().filter(|block| block.staff_id == staff_id) {
        let reason = match block.reason.as_deref().map(str::trim) {
            Some(reason) if !reason.is_empty() => format!("Staff unavailable: {reason}"),
            _ => "Staff unavailable".to_string(),
        };
        busy.push(BusyInterval {
            range: block.range(),
            reason,
        });
    }

    busy
}

/// Intersection of two local working windows.
pub fn intersect_windows(
    a: (NaiveTime, NaiveTime),
    b: (NaiveTime, NaiveTime),
) -> Option<(NaiveTime, NaiveTime)> {
    let start = a.0.max(b.0);
    let end = a.1.min(b.1);
    (start < end).then_some((start, end))
}

/// Bookable start time offered to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Slot {
    /// UTC start of the service.
    pub start_time: NaiveDateTime,
    /// UTC end of the service, excluding padding.
    pub end_time: NaiveDateTime,
    /// Local calendar date of the slot.
    pub date: NaiveDate,
    /// Local start time as `HH:MM`.
    pub time: String,
    pub available: bool,
    pub conflict_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub staff_id: Option<i32>,
}

/// Duration and spacing of the slots to generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotSpec {
    pub duration_minutes: i64,
    pub padding_before_minutes: i64,
    pub padding_after_minutes: i64,
    pub interval_minutes: i64,
}

impl SlotSpec {
    fn footprint_minutes(&self) -> i64 {
        self.padding_before_minutes + self.duration_minutes + self.padding_after_minutes
    }
}

/// Generate slots for one local day inside `window`.
///
/// A start `s` is offered while `s + padding + duration` still fits before the
/// window closes. Each slot is checked against `busy` using its padded range.
pub fn day_slots(
    tz: Tz,
    date: NaiveDate,
    window: (NaiveTime, NaiveTime),
    spec: &SlotSpec,
    busy: &[BusyInterval],
    now: NaiveDateTime,
) -> Vec<Slot> {
    let mut slots = Vec::new();
    if spec.duration_minutes <= 0 {
        return slots;
    }

    let close = date.and_time(window.1);
    let step = Duration::minutes(spec.interval_minutes.max(1));
    let footprint = Duration::minutes(spec.footprint_minutes());
    let mut local_start = date.and_time(window.0);

    while local_start + footprint <= close {
        let start = local_to_utc(tz, local_start);
        let end = start + Duration::minutes(spec.duration_minutes);
        let occupied = TimeRange::new(start, end)
            .padded(spec.padding_before_minutes, spec.padding_after_minutes);

        let conflict_reason = if start < now {
            Some(PAST_SLOT_REASON.to_string())
        } else {
            busy.iter()
                .find(|interval| interval.range.overlaps(&occupied))
                .map(|interval| interval.reason.clone())
        };

        slots.push(Slot {
            start_time: start,
            end_time: end,
            date,
            time: format_hhmm(local_start.time()),
            available: conflict_reason.is_none(),
            conflict_reason,
            staff_id: None,
        });

        local_start += step;
    }

    slots
}

/// Merge per-staff slot lists into one list keyed by start time.
///
/// A merged slot is available when at least one staff member is free; it then
/// names the first free staff member.
pub fn merge_staff_slots(per_staff: Vec<(i32, Vec<Slot>)>) -> Vec<Slot> {
    let mut merged: BTreeMap<NaiveDateTime, Slot> = BTreeMap::new();

    for (staff_id, slots) in per_staff {
        for mut slot in slots {
            if slot.available {
                slot.staff_id = Some(staff_id);
            }
            match merged.get_mut(&slot.start_time) {
                Some(existing) if !existing.available && slot.available => *existing = slot,
                Some(_) => {}
                None => {
                    merged.insert(slot.start_time, slot);
                }
            }
        }
    }

    merged.into_values().collect()
}

/// Availability facts about one staff member for a requested window.
#[derive(Debug, Clone)]
pub struct StaffCandidate {
    pub staff_id: i32,
    /// Whether the roster covers the whole window.
    pub on_shift: bool,
    pub busy: Vec<BusyInterval>,
    /// Active bookings already held on the local day.
    pub bookings_that_day: usize,
}

/// Pick the free staff member with the fewest bookings that day.
///
/// Ties resolve to the lowest id.
pub fn pick_next_available_staff(candidates: &[StaffCandidate], occupied: &TimeRange) -> Option<i32> {
    candidates
        .iter()
        .filter(|candidate| candidate.on_shift)
        .filter(|candidate| !candidate.busy.iter().any(|b| b.range.overlaps(occupied)))
        .min_by_key(|candidate| (candidate.bookings_that_day, candidate.staff_id))
        .map(|candidate| candidate.staff_id)
}

/// Facts needed to decide whether an unassigned booking fits.
#[derive(Debug, Clone, Default)]
pub struct CapacityInput {
    pub business_hours_configured: bool,
    /// Name of a day-off holiday on the booking date.
    pub day_off_holiday: Option<String>,
    pub business_open: bool,
    /// Bookable staff regardless of roster.
    pub bookable_staff_count: usize,
    /// Bookable staff whose shift contains the window.
    pub rostered_staff_count: usize,
    pub assigned_bookings_count: usize,
    pub unassigned_bookings_count: usize,
}

/// Result of an unassigned capacity evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapacityEvaluation {
    pub has_capacity: bool,
    pub rostered_staff_count: usize,
    pub assigned_bookings_count: usize,
    pub unassigned_bookings_count: usize,
    /// `None` when capacity is unbounded.
    pub remaining_capacity: Option<i64>,
    pub message: Option<String>,
}

impl CapacityEvaluation {
    fn closed(message: impl Into<String>) -> Self {
        Self {
            has_capacity: false,
            rostered_staff_count: 0,
            assigned_bookings_count: 0,
            unassigned_bookings_count: 0,
            remaining_capacity: Some(0),
            message: Some(message.into()),
        }
    }
}

pub fn evaluate_unassigned_capacity(input: &CapacityInput) -> CapacityEvaluation {
    if !input.business_hours_configured {
        return CapacityEvaluation {
            has_capacity: true,
            rostered_staff_count: 0,
            assigned_bookings_count: 0,
            unassigned_bookings_count: 0,
            remaining_capacity: None,
            message: None,
        };
    }

    if let Some(name) = input.day_off_holiday.as_deref() {
        return CapacityEvaluation::closed(format!("Business is closed on this day ({name})"));
    }

    if !input.business_open {
        return CapacityEvaluation::closed("Business is closed on this day");
    }

    if input.bookable_staff_count == 0 {
        return CapacityEvaluation::closed("No staff members are scheduled for this time slot.");
    }

    if input.rostered_staff_count == 0 {
        return CapacityEvaluation::closed("No staff members are available for this time slot.");
    }

    let remaining = input.rostered_staff_count as i64 - input.assigned_bookings_count as i64;
    let message = if remaining <= 0 {
        Some("All staff members are already booked for this time.")
    } else if input.unassigned_bookings_count as i64 >= remaining {
        Some("No unassigned capacity remaining for this time slot.")
    } else {
        None
    };

    CapacityEvaluation {
        has_capacity: message.is_none(),
        rostered_staff_count: input.rostered_staff_count,
        assigned_bookings_count: input.assigned_bookings_count,
        unassigned_bookings_count: input.unassigned_bookings_count,
        remaining_capacity: Some(remaining),
        message: message.map(str::to_string),
    }
}

/// Fold `range` together with every block that overlaps or touches it.
///
/// Returns the union and the ids of the absorbed blocks. Absorbing one block
/// can make the union reach another, so the fold repeats until stable.
pub fn merge_block_range(range: TimeRange, existing: &[StaffBlock]) -> (TimeRange, Vec<i32>) {
    let mut merged = range;
    let mut absorbed: Vec<i32> = Vec::new();

    loop {
        let mut grew = false;
        for block in existing {
            if absorbed.contains(&block.id) {
                continue;
            }
            if merged.overlaps_or_touches(&block.range()) {
                merged = merged.union(&block.range());
                absorbed.push(block.id);
                grew = true;
            }
        }
        if !grew {
            break;
        }
    }

    absorbed.sort_unstable();
    (merged, absorbed)
}

/// Staff-assigned segment of a booking being checked for conflicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaffSegment {
    pub staff_id: i32,
    pub range: TimeRange,
}

/// Conflicts between `segments` and existing bookings or blocks.
///
/// Comparison uses the plain segment ranges without padding. Each existing
/// booking or block is reported at most once per staff member.
pub fn find_booking_conflicts(
    segments: &[StaffSegment],
    bookings: &[Booking],
    blocks: &[StaffBlock],
    staff_names: &HashMap<i32, String>,
) -> Vec<BookingConflict> {
    let mut conflicts: Vec<BookingConflict> = Vec::new();
    let name_of = |staff_id: i32| staff_names.get(&staff_id).cloned().unwrap_or_default();

    for segment in segments {
        for booking in bookings.iter().filter(|booking| booking.is_active()) {
            let clashes = booking
                .services
                .iter()
                .filter(|item| booking.effective_staff(item) == Some(segment.staff_id))
                .any(|item| item.range().overlaps(&segment.range));
            let already = conflicts.iter().any(|conflict| {
                conflict.booking_id == Some(booking.id) && conflict.staff_id == segment.staff_id
            });
            if clashes && !already {
                conflicts.push(BookingConflict {
                    kind: ConflictKind::Booking,
                    booking_id: Some(booking.id),
                    block_id: None,
                    booking_number: Some(booking.booking_number.clone()),
                    start_time: booking.start_time,
                    end_time: booking.end_time,
                    staff_id: segment.staff_id,
                    staff_name: name_of(segment.staff_id),
                    reason: None,
                });
            }
        }

        for block in blocks.iter().filter(|block| block.staff_id == segment.staff_id) {
            let already = conflicts
                .iter()
                .any(|conflict| conflict.block_id == Some(block.id));
            if block.range().overlaps(&segment.range) && !already {
                conflicts.push(BookingConflict {
                    kind: ConflictKind::Block,
                    booking_id: None,
                    block_id: Some(block.id),
                    booking_number: None,
                    start_time: block.start_time,
                    end_time: block.end_time,
                    staff_id: block.staff_id,
                    staff_name: name_of(block.staff_id),
                    reason: block.reason.clone(),
                });
            }
        }
    }

    conflicts
}

/// Local date and wall-clock times of a UTC range.
///
/// `None` when the range crosses local midnight.
pub fn local_window(tz: Tz, range: &TimeRange) -> Option<(NaiveDate, NaiveTime, NaiveTime)> {
    let start = utc_to_local(tz, range.start);
    let end = utc_to_local(tz, range.end);
    (start.date() == end.date()).then(|| (start.date(), start.time(), end.time()))
}
