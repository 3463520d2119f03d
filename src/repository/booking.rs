use std::collections::HashMap;

use chrono::Utc;
use diesel::prelude::*;
use diesel::sqlite::{Sqlite, SqliteConnection};
use pushkind_common::repository::errors::{RepositoryError, RepositoryResult};

use crate::{
    domain::availability::{StaffSegment, find_booking_conflicts},
    domain::booking::{
        Booking as DomainBooking, BookingConflict, BookingListQuery, BookingReschedule,
        BookingStatus, BookingStatusChange, BookingWriteOutcome, NewBooking as DomainNewBooking,
        UpdateBookingDetails,
    },
    domain::staff_block::StaffBlock as DomainStaffBlock,
    models::booking::{
        Booking as DbBooking, BookingService as DbBookingService, NewBooking as DbNewBooking,
        NewBookingService as DbNewBookingService,
    },
    models::nullable_text,
    models::staff_block::StaffBlock as DbStaffBlock,
    repository::{BookingReader, BookingWriter, DieselRepository},
    schema::{booking_services, bookings},
};

impl BookingReader for DieselRepository {
    fn get_booking_by_id(&self, id: i32, merchant_id: i32) -> RepositoryResult<Option<DomainBooking>> {
        let mut conn = self.conn()?;
        load_booking(&mut conn, id, merchant_id)
    }

    fn list_bookings(&self, query: BookingListQuery) -> RepositoryResult<(usize, Vec<DomainBooking>)> {
        let mut conn = self.conn()?;

        let total = filtered_bookings(&query)
            .count()
            .get_result::<i64>(&mut conn)? as usize;

        let mut items = filtered_bookings(&query).order((bookings::start_time.asc(), bookings::id.asc()));

        if let Some(pagination) = &query.pagination {
            let offset = ((pagination.page.max(1) - 1) * pagination.per_page) as i64;
            let limit = pagination.per_page as i64;
            items = items.offset(offset).limit(limit);
        }

        let rows = items.load::<DbBooking>(&mut conn)?;
        if rows.is_empty() {
            return Ok((total, Vec::new()));
        }

        Ok((total, attach_services(&mut conn, rows)?))
    }
}

impl BookingWriter for DieselRepository {
    fn create_booking(&self, new_booking: &DomainNewBooking) -> RepositoryResult<BookingWriteOutcome> {
        let mut conn = self.conn()?;

        conn.immediate_transaction::<BookingWriteOutcome, RepositoryError, _>(|conn| {
            let segments = new_booking.staff_segments();
            let conflicts = conflicts_for(conn, new_booking.merchant_id, &segments, None)?;
            if !conflicts.is_empty() && !new_booking.is_override {
                return Ok(BookingWriteOutcome::Conflicts(conflicts));
            }

            let created = diesel::insert_into(bookings::table)
                .values(&DbNewBooking::from(new_booking))
                .get_result::<DbBooking>(conn)?;

            let booking_id = created.id;

            if !new_booking.items.is_empty() {
                let payload: Vec<DbNewBookingService> = new_booking
                    .items
                    .iter()
                    .map(|item| DbNewBookingService::from_domain(booking_id, item))
                    .collect();

                diesel::insert_into(booking_services::table)
                    .values(&payload)
                    .execute(conn)?;
            }

            let services = booking_services::table
                .filter(booking_services::booking_id.eq(booking_id))
                .load::<DbBookingService>(conn)?;

            Ok(BookingWriteOutcome::Saved {
                booking: created.into_domain(services),
                overridden: conflicts,
            })
        })
    }

    fn reschedule_booking(
        &self,
        booking_id: i32,
        merchant_id: i32,
        reschedule: &BookingReschedule,
    ) -> RepositoryResult<BookingWriteOutcome> {
        let mut conn = self.conn()?;

        conn.immediate_transaction::<BookingWriteOutcome, RepositoryError, _>(|conn| {
            if load_booking(conn, booking_id, merchant_id)?.is_none() {
                return Err(RepositoryError::NotFound);
            }

            let segments = reschedule.staff_segments();
            let conflicts = conflicts_for(conn, merchant_id, &segments, Some(booking_id))?;
            if !conflicts.is_empty() && !reschedule.is_override {
                return Ok(BookingWriteOutcome::Conflicts(conflicts));
            }

            diesel::update(
                bookings::table
                    .filter(bookings::id.eq(booking_id))
                    .filter(bookings::merchant_id.eq(merchant_id)),
            )
            .set((
                bookings::staff_id.eq(reschedule.staff_id),
                bookings::start_time.eq(reschedule.start_time),
                bookings::end_time.eq(reschedule.end_time),
                bookings::is_override.eq(reschedule.is_override),
                bookings::override_reason.eq(reschedule.override_reason.as_deref()),
                bookings::updated_at.eq(reschedule.updated_at),
            ))
            .execute(conn)?;

            for item in &reschedule.items {
                diesel::update(
                    booking_services::table
                        .filter(booking_services::id.eq(item.id))
                        .filter(booking_services::booking_id.eq(booking_id)),
                )
                .set((
                    booking_services::staff_id.eq(item.staff_id),
                    booking_services::start_time.eq(item.start_time),
                    booking_services::end_time.eq(item.end_time),
                ))
                .execute(conn)?;
            }

            let booking =
                load_booking(conn, booking_id, merchant_id)?.ok_or(RepositoryError::NotFound)?;

            Ok(BookingWriteOutcome::Saved {
                booking,
                overridden: conflicts,
            })
        })
    }

    fn update_booking_details(
        &self,
        booking_id: i32,
        merchant_id: i32,
        updates: &UpdateBookingDetails,
    ) -> RepositoryResult<DomainBooking> {
        let mut conn = self.conn()?;

        conn.transaction::<DomainBooking, RepositoryError, _>(|conn| {
            let updated = diesel::update(
                bookings::table
                    .filter(bookings::id.eq(booking_id))
                    .filter(bookings::merchant_id.eq(merchant_id)),
            )
            .set((
                updates.customer_id.map(|id| bookings::customer_id.eq(id)),
                nullable_text(&updates.notes).map(|notes| bookings::notes.eq(notes)),
                updates
                    .location_id
                    .map(|id| bookings::location_id.eq(Some(id))),
                bookings::updated_at.eq(updates.updated_at.unwrap_or_else(|| Utc::now().naive_utc())),
            ))
            .execute(conn)?;

            if updated == 0 {
                return Err(RepositoryError::NotFound);
            }

            load_booking(conn, booking_id, merchant_id)?.ok_or(RepositoryError::NotFound)
        })
    }

    fn change_booking_status(
        &self,
        booking_id: i32,
        merchant_id: i32,
        change: &BookingStatusChange,
    ) -> RepositoryResult<DomainBooking> {
        let mut conn = self.conn()?;

        conn.transaction::<DomainBooking, RepositoryError, _>(|conn| {
            let updated = diesel::update(
                bookings::table
                    .filter(bookings::id.eq(booking_id))
                    .filter(bookings::merchant_id.eq(merchant_id))
                    .filter(bookings::status.eq(change.from.as_str())),
            )
            .set((
                bookings::status.eq(change.to.as_str()),
                change
                    .cancellation_reason
                    .as_deref()
                    .map(|reason| bookings::cancellation_reason.eq(Some(reason))),
                change
                    .cancelled_at
                    .map(|at| bookings::cancelled_at.eq(Some(at))),
                change
                    .completed_at
                    .map(|at| bookings::completed_at.eq(Some(at))),
                bookings::updated_at.eq(change.updated_at),
            ))
            .execute(conn)?;

            if updated == 0 {
                return Err(RepositoryError::NotFound);
            }

            load_booking(conn, booking_id, merchant_id)?.ok_or(RepositoryError::NotFound)
        })
    }
}

fn filtered_bookings(query: &BookingListQuery) -> bookings::BoxedQuery<'static, Sqlite> {
    let mut items = bookings::table
        .filter(bookings::merchant_id.eq(query.merchant_id))
        .into_boxed::<Sqlite>();

    if let Some(from) = query.from {
        items = items.filter(bookings::end_time.gt(from));
    }

    if let Some(to) = query.to {
        items = items.filter(bookings::start_time.lt(to));
    }

    if let Some(staff_id) = query.staff_id {
        items = items.filter(
            bookings::staff_id.eq(staff_id).or(bookings::id.eq_any(
                booking_services::table
                    .filter(booking_services::staff_id.eq(staff_id))
                    .select(booking_services::booking_id),
            )),
        );
    }

    if let Some(customer_id) = query.customer_id {
        items = items.filter(bookings::customer_id.eq(customer_id));
    }

    if let Some(status) = query.status {
        items = items.filter(bookings::status.eq(status.as_str()));
    }

    if query.active_only {
        items = items.filter(bookings::status.eq_any(BookingStatus::active_values()));
    }

    items
}

fn load_booking(
    conn: &mut SqliteConnection,
    booking_id: i32,
    merchant_id: i32,
) -> RepositoryResult<Option<DomainBooking>> {
    let booking = bookings::table
        .filter(bookings::id.eq(booking_id))
        .filter(bookings::merchant_id.eq(merchant_id))
        .first::<DbBooking>(conn)
        .optional()?;

    let Some(booking) = booking else {
        return Ok(None);
    };

    let services = booking_services::table
        .filter(booking_services::booking_id.eq(booking.id))
        .load::<DbBookingService>(conn)?;

    Ok(Some(booking.into_domain(services)))
}

fn attach_services(
    conn: &mut SqliteConnection,
    rows: Vec<DbBooking>,
) -> RepositoryResult<Vec<DomainBooking>> {
    let booking_ids: Vec<i32> = rows.iter().map(|booking| booking.id).collect();

    let mut services_by_booking: HashMap<i32, Vec<DbBookingService>> = HashMap::new();

    if !booking_ids.is_empty() {
        let services = booking_services::table
            .filter(booking_services::booking_id.eq_any(&booking_ids))
            .load::<DbBookingService>(conn)?;

        for service in services {
            services_by_booking
                .entry(service.booking_id)
                .or_default()
                .push(service);
        }
    }

    Ok(rows
        .into_iter()
        .map(|booking| {
            let services = services_by_booking.remove(&booking.id).unwrap_or_default();
            booking.into_domain(services)
        })
        .collect())
}

/// Active bookings and blocks that collide with `segments`.
fn conflicts_for(
    conn: &mut SqliteConnection,
    merchant_id: i32,
    segments: &[StaffSegment],
    exclude_booking_id: Option<i32>,
) -> RepositoryResult<Vec<BookingConflict>> {
    use crate::schema::{staff, staff_blocks};

    let (Some(window_start), Some(window_end)) = (
        segments.iter().map(|segment| segment.range.start).min(),
        segments.iter().map(|segment| segment.range.end).max(),
    ) else {
        return Ok(Vec::new());
    };

    let mut staff_ids: Vec<i32> = segments.iter().map(|segment| segment.staff_id).collect();
    staff_ids.sort_unstable();
    staff_ids.dedup();

    let mut candidates = bookings::table
        .filter(bookings::merchant_id.eq(merchant_id))
        .filter(bookings::status.eq_any(BookingStatus::active_values()))
        .filter(bookings::start_time.lt(window_end))
        .filter(bookings::end_time.gt(window_start))
        .filter(
            bookings::staff_id.eq_any(&staff_ids).or(bookings::id.eq_any(
                booking_services::table
                    .filter(booking_services::staff_id.eq_any(&staff_ids))
                    .select(booking_services::booking_id),
            )),
        )
        .into_boxed::<Sqlite>();

    if let Some(exclude) = exclude_booking_id {
        candidates = candidates.filter(bookings::id.ne(exclude));
    }

    let rows = candidates.load::<DbBooking>(conn)?;
    let existing = attach_services(conn, rows)?;

    let blocks: Vec<DomainStaffBlock> = staff_blocks::table
        .filter(staff_blocks::merchant_id.eq(merchant_id))
        .filter(staff_blocks::staff_id.eq_any(&staff_ids))
        .filter(staff_blocks::start_time.lt(window_end))
        .filter(staff_blocks::end_time.gt(window_start))
        .load::<DbStaffBlock>(conn)?
        .into_iter()
        .map(Into::into)
        .collect();

    let staff_names: HashMap<i32, String> = staff::table
        .filter(staff::id.eq_any(&staff_ids))
        .select((staff::id, staff::first_name, staff::last_name))
        .load::<(i32, String, Option<String>)>(conn)?
        .into_iter()
        .map(|(id, first, last)| {
            let name = match last.as_deref().map(str::trim) {
                Some(last) if !last.is_empty() => format!("{first} {last}"),
                _ => first,
            };
            (id, name)
        })
        .collect();

    Ok(find_booking_conflicts(segments, &existing, &blocks, &staff_names))
}
