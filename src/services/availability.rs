//! Slot generation, next-available staff and unassigned capacity.

use std::collections::HashSet;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::domain::auth::{AuthenticatedUser, MerchantSubdomain};
use crate::domain::availability::{
    CapacityEvaluation, CapacityInput, Slot, SlotSpec, StaffCandidate, TimeRange,
    busy_intervals_for_staff, day_slots, evaluate_unassigned_capacity, intersect_windows,
    local_window, merge_staff_slots, pick_next_available_staff,
};
use crate::domain::booking::{Booking, BookingListQuery};
use crate::domain::holiday::MerchantHoliday;
use crate::domain::merchant::Merchant;
use crate::domain::schedule::Roster;
use crate::domain::service::Service;
use crate::domain::staff::{Staff, StaffListQuery};
use crate::domain::staff_block::{StaffBlock, StaffBlockListQuery};
use crate::domain::timezone::{local_date, local_day_bounds};
use crate::forms::availability::{
    AvailabilityQueryParams, CapacityQueryParams, PublicAvailabilityQueryParams,
};
use crate::repository::{
    BookingReader, CatalogReader, HolidayReader, MerchantReader, StaffBlockReader, StaffReader,
};
use crate::services::merchants::authorized_merchant;
use crate::services::public::tenant_merchant;
use crate::services::{ServiceError, ServiceResult};

/// Active service of the merchant, or `NotFound`.
pub(crate) fn bookable_service<R>(repo: &R, merchant_id: i32, service_id: i32) -> ServiceResult<Service>
where
    R: CatalogReader + ?Sized,
{
    repo.get_service_by_id(service_id, merchant_id)?
        .filter(|service| service.is_active)
        .ok_or(ServiceError::NotFound)
}

/// Day-off holiday on `date`, if any.
pub(crate) fn day_off(holidays: &[MerchantHoliday], date: NaiveDate) -> Option<&MerchantHoliday> {
    holidays
        .iter()
        .find(|holiday| holiday.date == date && holiday.is_day_off)
}

/// Business hours of `date` intersected with the staff member's shift.
fn working_window(
    merchant: &Merchant,
    roster: &Roster,
    staff_id: i32,
    date: NaiveDate,
) -> Option<(NaiveTime, NaiveTime)> {
    let shift = roster.shift(staff_id, date, &merchant.settings)?;
    match merchant.settings.opening_window(date.weekday()) {
        None => Some(shift),
        Some(None) => None,
        Some(Some(hours)) => intersect_windows(hours, shift),
    }
}

fn slot_spec(service: &Service, merchant: &Merchant) -> SlotSpec {
    SlotSpec {
        duration_minutes: i64::from(service.duration_minutes),
        padding_before_minutes: i64::from(service.padding_before_minutes),
        padding_after_minutes: i64::from(service.padding_after_minutes),
        interval_minutes: merchant.settings.slot_interval_minutes,
    }
}

/// Active bookings and blocks around `[from, to)`.
///
/// The window is widened by a day on each side so padded neighbours are seen.
fn load_busy<R>(
    repo: &R,
    merchant_id: i32,
    staff_id: Option<i32>,
    from: NaiveDateTime,
    to: NaiveDateTime,
) -> ServiceResult<(Vec<Booking>, Vec<StaffBlock>)>
where
    R: BookingReader + StaffBlockReader + ?Sized,
{
    let from = from - Duration::days(1);
    let to = to + Duration::days(1);

    let mut bookings = BookingListQuery::new(merchant_id)
        .overlapping(from, to)
        .active();
    let mut blocks = StaffBlockListQuery::new(merchant_id).overlapping(from, to);
    if let Some(staff_id) = staff_id {
        bookings = bookings.staff(staff_id);
        blocks = blocks.staff(staff_id);
    }

    let (_, bookings) = repo.list_bookings(bookings)?;
    let blocks = repo.list_staff_blocks(blocks)?;
    Ok((bookings, blocks))
}

/// Everything needed to lay out slots over a range of local dates.
struct SlotPlanner<'a> {
    merchant: &'a Merchant,
    roster: &'a Roster,
    holidays: &'a [MerchantHoliday],
    bookings: &'a [Booking],
    blocks: &'a [StaffBlock],
    spec: SlotSpec,
    now: NaiveDateTime,
}

impl SlotPlanner<'_> {
    fn staff_slots(&self, staff_id: i32, from: NaiveDate, to: NaiveDate) -> Vec<Slot> {
        let tz = self.merchant.tz();
        let busy = busy_intervals_for_staff(staff_id, self.bookings, self.blocks);

        from.iter_days()
            .take_while(|date| *date <= to)
            .filter(|date| day_off(self.holidays, *date).is_none())
            .filter_map(|date| {
                working_window(self.merchant, self.roster, staff_id, date)
                    .map(|window| (date, window))
            })
            .flat_map(|(date, window)| day_slots(tz, date, window, &self.spec, &busy, self.now))
            .collect()
    }
}

/// Slots of one staff member for one service over local dates `[from, to]`.
pub fn staff_availability<R>(
    repo: &R,
    user: &AuthenticatedUser,
    params: AvailabilityQueryParams,
    now: NaiveDateTime,
) -> ServiceResult<Vec<Slot>>
where
    R: MerchantReader
        + StaffReader
        + CatalogReader
        + BookingReader
        + StaffBlockReader
        + HolidayReader
        + ?Sized,
{
    let merchant = authorized_merchant(repo, user)?;
    let (from, to) = params
        .date_range()
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    let staff = repo
        .get_staff_by_id(params.staff_id, merchant.id)?
        .filter(Staff::is_active)
        .ok_or(ServiceError::NotFound)?;
    let service = bookable_service(repo, merchant.id, params.service_id)?;

    let tz = merchant.tz();
    let (range_start, _) = local_day_bounds(tz, from);
    let (_, range_end) = local_day_bounds(tz, to);

    let holidays = repo.list_holidays_between(merchant.id, from, to)?;
    let roster = repo.load_roster(merchant.id, from, to)?;
    let (bookings, blocks) = load_busy(repo, merchant.id, Some(staff.id), range_start, range_end)?;

    let planner = SlotPlanner {
        merchant: &merchant,
        roster: &roster,
        holidays: &holidays,
        bookings: &bookings,
        blocks: &blocks,
        spec: slot_spec(&service, &merchant),
        now,
    };
    Ok(planner.staff_slots(staff.id, from, to))
}

/// Slots offered on the public booking page for one local date.
///
/// Without a staff member the slots of every bookable staff member are merged.
pub fn public_availability<R>(
    repo: &R,
    subdomain: &MerchantSubdomain,
    params: PublicAvailabilityQueryParams,
    now: NaiveDateTime,
) -> ServiceResult<Vec<Slot>>
where
    R: MerchantReader
        + StaffReader
        + CatalogReader
        + BookingReader
        + StaffBlockReader
        + HolidayReader
        + ?Sized,
{
    let merchant = tenant_merchant(repo, subdomain)?;
    let date = params
        .local_date()
        .map_err(|err| ServiceError::Form(err.to_string()))?;
    let service = bookable_service(repo, merchant.id, params.service_id)?;

    let staff: Vec<Staff> = match params.staff_id {
        Some(staff_id) => vec![
            repo.get_staff_by_id(staff_id, merchant.id)?
                .filter(Staff::is_bookable)
                .ok_or(ServiceError::NotFound)?,
        ],
        None => repo
            .list_staff(StaffListQuery::new(merchant.id).active())?
            .into_iter()
            .filter(Staff::is_bookable)
            .collect(),
    };

    let (day_start, day_end) = local_day_bounds(merchant.tz(), date);
    let holidays = repo.list_holidays_between(merchant.id, date, date)?;
    let roster = repo.load_roster(merchant.id, date, date)?;
    let (bookings, blocks) = load_busy(repo, merchant.id, params.staff_id, day_start, day_end)?;

    let planner = SlotPlanner {
        merchant: &merchant,
        roster: &roster,
        holidays: &holidays,
        bookings: &bookings,
        blocks: &blocks,
        spec: slot_spec(&service, &merchant),
        now,
    };
    let per_staff = staff
        .iter()
        .map(|member| (member.id, planner.staff_slots(member.id, date, date)))
        .collect();
    Ok(merge_staff_slots(per_staff))
}

/// Free bookable staff member with the lightest day for `segment`.
///
/// `segment` is the plain service window and must be rostered; `occupied`
/// includes padding and must not collide with bookings or blocks.
pub(crate) fn next_available_staff<R>(
    repo: &R,
    merchant: &Merchant,
    segment: &TimeRange,
    occupied: &TimeRange,
) -> ServiceResult<Option<i32>>
where
    R: StaffReader + BookingReader + StaffBlockReader + ?Sized,
{
    let tz = merchant.tz();
    let Some((date, start, end)) = local_window(tz, segment) else {
        return Ok(None);
    };

    let staff: Vec<Staff> = repo
        .list_staff(StaffListQuery::new(merchant.id).active())?
        .into_iter()
        .filter(Staff::is_bookable)
        .collect();
    let roster = repo.load_roster(merchant.id, date, date)?;
    let (day_start, day_end) = local_day_bounds(tz, date);
    let day = TimeRange::new(day_start, day_end);
    let (bookings, blocks) = load_busy(repo, merchant.id, None, day_start, day_end)?;

    let candidates: Vec<StaffCandidate> = staff
        .iter()
        .map(|member| StaffCandidate {
            staff_id: member.id,
            on_shift: roster.covers(member.id, date, start, end, &merchant.settings),
            busy: busy_intervals_for_staff(member.id, &bookings, &blocks),
            bookings_that_day: bookings
                .iter()
                .filter(|booking| booking.involves_staff(member.id))
                .filter(|booking| booking.range().overlaps(&day))
                .count(),
        })
        .collect();

    Ok(pick_next_available_staff(&candidates, occupied))
}

/// Whether any service of `booking` is held by real staff rather than the placeholder.
fn held_by_staff(booking: &Booking, placeholders: &HashSet<i32>) -> bool {
    booking
        .services
        .iter()
        .filter_map(|item| booking.effective_staff(item))
        .chain(booking.staff_id)
        .any(|staff_id| !placeholders.contains(&staff_id))
}

/// Room for one more unassigned booking during `window`.
pub(crate) fn evaluate_capacity<R>(
    repo: &R,
    merchant: &Merchant,
    window: &TimeRange,
) -> ServiceResult<CapacityEvaluation>
where
    R: StaffReader + BookingReader + HolidayReader + ?Sized,
{
    let settings = &merchant.settings;
    if settings.business_hours.is_none() {
        return Ok(evaluate_unassigned_capacity(&CapacityInput::default()));
    }

    let tz = merchant.tz();
    let date = local_date(tz, window.start);
    let day_off_holiday = repo
        .get_holiday_by_date(merchant.id, date)?
        .filter(|holiday| holiday.is_day_off)
        .map(|holiday| holiday.name);
    let business_open = matches!(settings.opening_window(date.weekday()), Some(Some(_)));

    let staff = repo.list_staff(StaffListQuery::new(merchant.id))?;
    let placeholders: HashSet<i32> = staff
        .iter()
        .filter(|member| member.is_placeholder())
        .map(|member| member.id)
        .collect();
    let bookable: Vec<&Staff> = staff.iter().filter(|member| member.is_bookable()).collect();

    let roster = repo.load_roster(merchant.id, date, date)?;
    let rostered_staff_count = match local_window(tz, window) {
        Some((date, start, end)) => bookable
            .iter()
            .filter(|member| roster.covers(member.id, date, start, end, settings))
            .count(),
        None => 0,
    };

    let (_, bookings) = repo.list_bookings(
        BookingListQuery::new(merchant.id)
            .overlapping(window.start, window.end)
            .active(),
    )?;
    let assigned_bookings_count = bookings
        .iter()
        .filter(|booking| held_by_staff(booking, &placeholders))
        .count();

    Ok(evaluate_unassigned_capacity(&CapacityInput {
        business_hours_configured: true,
        day_off_holiday,
        business_open,
        bookable_staff_count: bookable.len(),
        rostered_staff_count,
        assigned_bookings_count,
        unassigned_bookings_count: bookings.len() - assigned_bookings_count,
    }))
}

pub fn unassigned_capacity<R>(
    repo: &R,
    user: &AuthenticatedUser,
    params: CapacityQueryParams,
) -> ServiceResult<CapacityEvaluation>
where
    R: MerchantReader + StaffReader + BookingReader + HolidayReader + ?Sized,
{
    let merchant = authorized_merchant(repo, user)?;
    let (start, end) = params
        .window()
        .map_err(|err| ServiceError::Form(err.to_string()))?;
    evaluate_capacity(repo, &merchant, &TimeRange::new(start, end))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    use crate::SERVICE_ACCESS_ROLE;
    use crate::domain::booking::{BookingItem, BookingSource, BookingStatus};
    use crate::domain::holiday::HolidaySource;
    use crate::domain::merchant::MerchantSettings;
    use crate::domain::schedule::StaffSchedule;
    use crate::domain::staff::{AccessLevel, StaffStatus};
    use crate::repository::mock::MockRepository;

    pub(crate) fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .and_then(|date| date.and_hms_opt(h, min, 0))
            .expect("valid datetime")
    }

    pub(crate) fn user() -> AuthenticatedUser {
        AuthenticatedUser {
            sub: "glow".into(),
            merchant_id: 3,
            email: "owner@glow.test".into(),
            name: "Glow".into(),
            roles: vec![SERVICE_ACCESS_ROLE.into()],
            exp: 0,
        }
    }

    pub(crate) fn merchant() -> Merchant {
        Merchant {
            id: 3,
            name: "Glow".into(),
            subdomain: "glow".into(),
            email: "owner@glow.test".into(),
            username: "glow".into(),
            password_hash: String::new(),
            timezone: "Australia/Sydney".into(),
            currency: "AUD".into(),
            settings: MerchantSettings {
                slot_interval_minutes: 60,
                allow_unassigned_bookings: true,
                ..MerchantSettings::default()
            },
            created_at: utc(2025, 1, 1, 0, 0),
            updated_at: utc(2025, 1, 1, 0, 0),
        }
    }

    pub(crate) fn staff(id: i32, first_name: &str) -> Staff {
        Staff {
            id,
            merchant_id: 3,
            first_name: first_name.into(),
            last_name: None,
            email: None,
            phone: None,
            access_level: AccessLevel::Staff,
            status: StaffStatus::Active,
            calendar_color: None,
            pin_cipher: None,
            created_at: utc(2025, 1, 1, 0, 0),
            updated_at: utc(2025, 1, 1, 0, 0),
        }
    }

    pub(crate) fn service(id: i32, minutes: i32) -> Service {
        Service {
            id,
            merchant_id: 3,
            name: "Cut".into(),
            description: None,
            category: None,
            duration_minutes: minutes,
            padding_before_minutes: 0,
            padding_after_minutes: 0,
            price_cents: 6_000,
            tax_rate_bps: 0,
            is_active: true,
            created_at: utc(2025, 1, 1, 0, 0),
            updated_at: utc(2025, 1, 1, 0, 0),
        }
    }

    /// Monday 09:00 to 12:00 for every listed staff member.
    pub(crate) fn monday_roster(staff_ids: &[i32]) -> Roster {
        let schedules = staff_ids
            .iter()
            .map(|staff_id| StaffSchedule {
                id: *staff_id,
                staff_id: *staff_id,
                day_of_week: 1,
                start_time: "09:00".into(),
                end_time: "12:00".into(),
            })
            .collect();
        Roster::new(schedules, Vec::new())
    }

    pub(crate) fn booking(
        id: i32,
        staff_id: Option<i32>,
        start: NaiveDateTime,
        minutes: i64,
    ) -> Booking {
        let end = start + Duration::minutes(minutes);
        Booking {
            id,
            merchant_id: 3,
            location_id: None,
            customer_id: 1,
            staff_id,
            booking_number: format!("BK{id}"),
            status: BookingStatus::Confirmed,
            start_time: start,
            end_time: end,
            total_cents: 6_000,
            notes: None,
            source: BookingSource::InPerson,
            is_override: false,
            override_reason: None,
            customer_requested_staff: staff_id.is_some(),
            cancellation_reason: None,
            cancelled_at: None,
            completed_at: None,
            created_at: start,
            updated_at: start,
            services: vec![BookingItem {
                id,
                booking_id: id,
                service_id: 1,
                service_name: "Cut".into(),
                staff_id,
                price_cents: 6_000,
                duration_minutes: minutes as i32,
                padding_before_minutes: 0,
                padding_after_minutes: 0,
                start_time: start,
                end_time: end,
                sort_order: 0,
            }],
        }
    }

    // Monday 3 March 2025 in Sydney is UTC+11: 09:00 local is 22:00 UTC on the 2nd.
    #[test]
    fn staff_slots_skip_booked_hours() {
        let mut repo = MockRepository::new();
        repo.expect_get_merchant_by_id()
            .returning(|_| Ok(Some(merchant())));
        repo.expect_get_staff_by_id()
            .returning(|id, _| Ok(Some(staff(id, "Ava"))));
        repo.expect_get_service_by_id()
            .returning(|id, _| Ok(Some(service(id, 60))));
        repo.expect_list_holidays_between()
            .returning(|_, _, _| Ok(Vec::new()));
        repo.expect_load_roster()
            .returning(|_, _, _| Ok(monday_roster(&[1])));
        repo.expect_list_bookings()
            .withf(|query| query.staff_id == Some(1) && query.active_only)
            .returning(|_| Ok((1, vec![booking(7, Some(1), utc(2025, 3, 2, 23, 0), 60)])));
        repo.expect_list_staff_blocks()
            .returning(|_| Ok(Vec::new()));

        let params = AvailabilityQueryParams {
            staff_id: 1,
            service_id: 2,
            from: "2025-03-03".into(),
            to: "2025-03-03".into(),
        };
        let slots = staff_availability(&repo, &user(), params, utc(2025, 3, 1, 0, 0)).unwrap();

        let times: Vec<&str> = slots.iter().map(|slot| slot.time.as_str()).collect();
        assert_eq!(times, vec!["09:00", "10:00", "11:00"]);
        assert!(slots[0].available);
        assert!(!slots[1].available);
        assert_eq!(
            slots[1].conflict_reason.as_deref(),
            Some("Conflicts with booking BK7")
        );
        assert_eq!(slots[0].start_time, utc(2025, 3, 2, 22, 0));
    }

    #[test]
    fn holidays_produce_no_slots() {
        let mut repo = MockRepository::new();
        repo.expect_get_merchant_by_id()
            .returning(|_| Ok(Some(merchant())));
        repo.expect_get_staff_by_id()
            .returning(|id, _| Ok(Some(staff(id, "Ava"))));
        repo.expect_get_service_by_id()
            .returning(|id, _| Ok(Some(service(id, 60))));
        repo.expect_list_holidays_between().returning(|merchant_id, _, _| {
            Ok(vec![MerchantHoliday {
                id: 1,
                merchant_id,
                name: "Labour Day".into(),
                date: NaiveDate::from_ymd_opt(2025, 3, 3).unwrap(),
                is_day_off: true,
                source: HolidaySource::State,
                state: None,
                created_at: utc(2025, 1, 1, 0, 0),
                updated_at: utc(2025, 1, 1, 0, 0),
            }])
        });
        repo.expect_load_roster()
            .returning(|_, _, _| Ok(monday_roster(&[1])));
        repo.expect_list_bookings()
            .returning(|_| Ok((0, Vec::new())));
        repo.expect_list_staff_blocks()
            .returning(|_| Ok(Vec::new()));

        let params = AvailabilityQueryParams {
            staff_id: 1,
            service_id: 2,
            from: "2025-03-03".into(),
            to: "2025-03-04".into(),
        };
        let slots = staff_availability(&repo, &user(), params, utc(2025, 3, 1, 0, 0)).unwrap();
        assert!(slots.is_empty());
    }

    #[test]
    fn next_available_prefers_lightest_day() {
        let mut repo = MockRepository::new();
        repo.expect_list_staff()
            .returning(|_| Ok(vec![staff(1, "Ava"), staff(2, "Ben"), staff(3, "Unassigned")]));
        repo.expect_load_roster()
            .returning(|_, _, _| Ok(monday_roster(&[1, 2, 3])));
        repo.expect_list_bookings().returning(|_| {
            Ok((1, vec![booking(7, Some(1), utc(2025, 3, 2, 23, 0), 60)]))
        });
        repo.expect_list_staff_blocks()
            .returning(|_| Ok(Vec::new()));

        // 09:00 to 09:30 local: both are free, Ava already has a booking that day.
        let segment = TimeRange::new(utc(2025, 3, 2, 22, 0), utc(2025, 3, 2, 22, 30));
        let picked = next_available_staff(&repo, &merchant(), &segment, &segment).unwrap();
        assert_eq!(picked, Some(2));
    }

    #[test]
    fn capacity_counts_rostered_staff_against_bookings() {
        let mut repo = MockRepository::new();
        repo.expect_get_merchant_by_id()
            .returning(|_| Ok(Some(merchant())));
        repo.expect_get_holiday_by_date().returning(|_, _| Ok(None));
        repo.expect_list_staff()
            .returning(|_| Ok(vec![staff(1, "Ava"), staff(2, "Ben"), staff(9, "Unassigned")]));
        repo.expect_load_roster()
            .returning(|_, _, _| Ok(monday_roster(&[1, 2])));
        repo.expect_list_bookings().returning(|_| {
            Ok((
                2,
                vec![
                    booking(7, Some(1), utc(2025, 3, 2, 22, 0), 60),
                    booking(8, Some(9), utc(2025, 3, 2, 22, 0), 60),
                ],
            ))
        });

        let params = CapacityQueryParams {
            start: utc(2025, 3, 2, 22, 0),
            end: utc(2025, 3, 2, 23, 0),
        };
        let evaluation = unassigned_capacity(&repo, &user(), params).unwrap();
        assert_eq!(evaluation.rostered_staff_count, 2);
        assert_eq!(evaluation.assigned_bookings_count, 1);
        assert_eq!(evaluation.unassigned_bookings_count, 1);
        assert_eq!(evaluation.remaining_capacity, Some(1));
        assert!(!evaluation.has_capacity);
        assert_eq!(
            evaluation.message.as_deref(),
            Some("No unassigned capacity remaining for this time slot.")
        );
    }

    #[test]
    fn capacity_is_unbounded_without_business_hours() {
        let mut repo = MockRepository::new();
        repo.expect_get_merchant_by_id().returning(|_| {
            let mut merchant = merchant();
            merchant.settings.business_hours = None;
            Ok(Some(merchant))
        });

        let params = CapacityQueryParams {
            start: utc(2025, 3, 2, 22, 0),
            end: utc(2025, 3, 2, 23, 0),
        };
        let evaluation = unassigned_capacity(&repo, &user(), params).unwrap();
        assert!(evaluation.has_capacity);
        assert_eq!(evaluation.remaining_capacity, None);
    }
}
