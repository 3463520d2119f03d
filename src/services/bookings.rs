//! Booking creation, rescheduling and lifecycle.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use pushkind_common::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated};
use pushkind_common::repository::errors::RepositoryError;
use pushkind_common::routes::check_role;
use serde::Serialize;

use crate::SERVICE_ACCESS_ROLE;
use crate::domain::auth::{AuthenticatedUser, MerchantSubdomain};
use crate::domain::availability::{StaffSegment, TimeRange, local_window};
use crate::domain::booking::{
    Booking, BookingListQuery, BookingReschedule, BookingSource, BookingStatus,
    BookingStatusChange, BookingTransition, BookingWriteOutcome, NewBooking, PlannedService,
    UpdateBookingDetails, generate_booking_number, plan_booking_items,
};
use crate::domain::customer::{Customer, NewCustomer};
use crate::domain::merchant::Merchant;
use crate::domain::staff::{Staff, StaffListQuery};
use crate::domain::timezone::{local_date, local_day_bounds};
use crate::forms::bookings::{
    BookingQueryParams, CalendarQueryParams, CancelBookingForm, CreateBookingForm,
    PublicBookingForm, PublicCustomer, ServiceRequest, UpdateBookingForm,
};
use crate::repository::{
    BookingReader, BookingWriter, CatalogReader, CustomerReader, CustomerWriter, HolidayReader,
    InvoiceReader, LocationReader, MerchantReader, StaffBlockReader, StaffReader,
};
use crate::services::availability::{bookable_service, evaluate_capacity, next_available_staff};
use crate::services::merchants::authorized_merchant;
use crate::services::public::tenant_merchant;
use crate::services::{ServiceError, ServiceResult};

pub const NO_STAFF_AVAILABLE: &str = "No staff available for the selected time";

/// Active bookings of one local day under a staff member.
#[derive(Debug, Clone, Serialize)]
pub struct CalendarColumn {
    /// `None` for the unassigned column.
    pub staff_id: Option<i32>,
    pub staff_name: String,
    pub bookings: Vec<Booking>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub columns: Vec<CalendarColumn>,
}

fn plan_services<R>(
    repo: &R,
    merchant_id: i32,
    requests: &[ServiceRequest],
) -> ServiceResult<Vec<PlannedService>>
where
    R: CatalogReader + ?Sized,
{
    requests
        .iter()
        .map(|request| {
            let service = repo
                .get_service_by_id(request.service_id, merchant_id)?
                .filter(|service| service.is_active)
                .ok_or_else(|| {
                    ServiceError::Form(format!("Service {} is not available", request.service_id))
                })?;
            Ok(PlannedService {
                service_id: service.id,
                service_name: service.name,
                staff_id: request.staff_id,
                price_cents: request.price_cents.unwrap_or(service.price_cents),
                duration_minutes: request.duration_minutes.unwrap_or(service.duration_minutes),
                padding_before_minutes: service.padding_before_minutes,
                padding_after_minutes: service.padding_after_minutes,
            })
        })
        .collect()
}

/// Holiday, business hours and roster checks skipped only by overrides.
///
/// `items` are the plain service windows; `segments` those with staff.
fn ensure_schedulable<R>(
    repo: &R,
    merchant: &Merchant,
    items: &[TimeRange],
    segments: &[StaffSegment],
) -> ServiceResult<()>
where
    R: HolidayReader + StaffReader + ?Sized,
{
    let Some(first) = items.first() else {
        return Ok(());
    };
    let tz = merchant.tz();
    let date = local_date(tz, first.start);

    if let Some(holiday) = repo
        .get_holiday_by_date(merchant.id, date)?
        .filter(|holiday| holiday.is_day_off)
    {
        return Err(ServiceError::Form(format!(
            "Business is closed on this day ({})",
            holiday.name
        )));
    }

    if let Some(hours) = merchant.settings.opening_window(date.weekday()) {
        let Some((open, close)) = hours else {
            return Err(ServiceError::Form(
                "Business is closed on this day".to_string(),
            ));
        };
        let within_hours = items.iter().all(|range| {
            matches!(local_window(tz, range), Some((day, start, end))
                if day == date && open <= start && end <= close)
        });
        if !within_hours {
            return Err(ServiceError::Form(
                "Booking is outside business hours".to_string(),
            ));
        }
    }

    if segments.is_empty() {
        return Ok(());
    }
    let roster = repo.load_roster(merchant.id, date, date)?;
    for segment in segments {
        let staff = repo
            .get_staff_by_id(segment.staff_id, merchant.id)?
            .ok_or_else(|| ServiceError::Form("Staff member not found".to_string()))?;
        if !staff.is_active() {
            return Err(ServiceError::Form(format!(
                "{} is not active",
                staff.full_name()
            )));
        }
        let rostered = local_window(tz, &segment.range).is_some_and(|(day, start, end)| {
            roster.covers(staff.id, day, start, end, &merchant.settings)
        });
        if !rostered {
            return Err(ServiceError::Form(format!(
                "{} is not rostered for the selected time",
                staff.full_name()
            )));
        }
    }
    Ok(())
}

/// Unassigned bookings need the setting and spare capacity.
fn ensure_unassigned_capacity<R>(
    repo: &R,
    merchant: &Merchant,
    window: &TimeRange,
) -> ServiceResult<()>
where
    R: StaffReader + BookingReader + HolidayReader + ?Sized,
{
    if !merchant.settings.allow_unassigned_bookings {
        return Err(ServiceError::Form(
            "A staff member is required for this booking".to_string(),
        ));
    }
    let evaluation = evaluate_capacity(repo, merchant, window)?;
    if evaluation.has_capacity {
        return Ok(());
    }
    Err(ServiceError::conflict(evaluation.message.unwrap_or_else(
        || "No unassigned capacity remaining for this time slot.".to_string(),
    )))
}

fn saved_booking(outcome: BookingWriteOutcome) -> ServiceResult<Booking> {
    match outcome {
        BookingWriteOutcome::Saved {
            booking,
            overridden,
        } => {
            if !overridden.is_empty() {
                log::warn!(
                    "Booking {} overrides {} conflict(s): {}",
                    booking.booking_number,
                    overridden.len(),
                    booking.override_reason.as_deref().unwrap_or_default()
                );
            }
            Ok(booking)
        }
        BookingWriteOutcome::Conflicts(conflicts) => Err(ServiceError::Conflict {
            message: "The selected time conflicts with existing bookings".to_string(),
            conflicts,
        }),
    }
}

fn item_ranges(booking: &NewBooking) -> Vec<TimeRange> {
    booking
        .items
        .iter()
        .map(|item| TimeRange::new(item.start_time, item.end_time))
        .collect()
}

/// Book services for an existing customer at the counter.
pub fn create_booking<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: CreateBookingForm,
    now: NaiveDateTime,
) -> ServiceResult<Booking>
where
    R: MerchantReader
        + CustomerReader
        + LocationReader
        + CatalogReader
        + StaffReader
        + BookingReader
        + BookingWriter
        + HolidayReader
        + ?Sized,
{
    let merchant = authorized_merchant(repo, user)?;
    let request = form
        .into_request()
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    repo.get_customer_by_id(request.customer_id, merchant.id)?
        .ok_or(ServiceError::NotFound)?;
    if let Some(location_id) = request.location_id {
        repo.get_location_by_id(location_id, merchant.id)?
            .ok_or(ServiceError::NotFound)?;
    }

    let planned = plan_services(repo, merchant.id, &request.services)?;
    let items = plan_booking_items(request.start_time, &planned);
    let number = generate_booking_number(&mut rand::thread_rng(), now);

    let mut new_booking = NewBooking::new(
        merchant.id,
        request.customer_id,
        request.staff_id,
        number,
        BookingStatus::Confirmed,
        BookingSource::InPerson,
        request.start_time,
        items,
    );
    new_booking.location_id = request.location_id;
    new_booking.notes = request.notes;
    new_booking.is_override = request.is_override;
    new_booking.override_reason = request.override_reason;

    if !new_booking.is_override {
        ensure_schedulable(
            repo,
            &merchant,
            &item_ranges(&new_booking),
            &new_booking.staff_segments(),
        )?;
    }
    if new_booking.has_unassigned_items() {
        let window = TimeRange::new(new_booking.start_time, new_booking.end_time);
        ensure_unassigned_capacity(repo, &merchant, &window)?;
    }

    let booking = saved_booking(repo.create_booking(&new_booking)?)?;
    log::info!(
        "Created booking {} for merchant {}",
        booking.booking_number,
        merchant.id
    );
    Ok(booking)
}

fn find_or_create_customer<R>(
    repo: &R,
    merchant_id: i32,
    contact: &PublicCustomer,
) -> ServiceResult<Customer>
where
    R: CustomerReader + CustomerWriter + ?Sized,
{
    if let Some(email) = contact.email.as_deref() {
        if let Some(customer) = repo.find_customer_by_email(merchant_id, email)? {
            return Ok(customer);
        }
    }
    if let Some(phone) = contact.phone.as_deref() {
        if let Some(customer) = repo.find_customer_by_phone(merchant_id, phone)? {
            return Ok(customer);
        }
    }

    let mut new_customer = NewCustomer::new(merchant_id, contact.first_name.as_str());
    new_customer.last_name = contact.last_name.clone();
    new_customer.email = contact.email.clone();
    new_customer.phone = contact.phone.clone();
    let customer = repo.create_customer(&new_customer)?;
    log::info!("Created customer {} from an online booking", customer.id);
    Ok(customer)
}

/// Online booking of a single service.
///
/// Without a requested staff member the next available one is assigned, or the
/// booking is left unassigned when the merchant allows it and has capacity.
pub fn create_public_booking<R>(
    repo: &R,
    subdomain: &MerchantSubdomain,
    form: PublicBookingForm,
    now: NaiveDateTime,
) -> ServiceResult<Booking>
where
    R: MerchantReader
        + CustomerReader
        + CustomerWriter
        + CatalogReader
        + StaffReader
        + StaffBlockReader
        + BookingReader
        + BookingWriter
        + HolidayReader
        + ?Sized,
{
    let merchant = tenant_merchant(repo, subdomain)?;
    let request = form
        .into_request()
        .map_err(|err| ServiceError::Form(err.to_string()))?;
    if request.start_time < now {
        return Err(ServiceError::Form(
            "Cannot book a time in the past".to_string(),
        ));
    }

    let service = bookable_service(repo, merchant.id, request.service_id)?;
    let planned = PlannedService {
        service_id: service.id,
        service_name: service.name.clone(),
        staff_id: None,
        price_cents: service.price_cents,
        duration_minutes: service.duration_minutes,
        padding_before_minutes: service.padding_before_minutes,
        padding_after_minutes: service.padding_after_minutes,
    };
    let items = plan_booking_items(request.start_time, &[planned]);
    let window = TimeRange::new(
        request.start_time,
        items.last().map(|item| item.end_time).unwrap_or(request.start_time),
    );

    let staff_id = match request.staff_id {
        Some(staff_id) => {
            repo.get_staff_by_id(staff_id, merchant.id)?
                .filter(Staff::is_bookable)
                .ok_or(ServiceError::NotFound)?;
            Some(staff_id)
        }
        None => {
            let occupied = window.padded(
                i64::from(service.padding_before_minutes),
                i64::from(service.padding_after_minutes),
            );
            match next_available_staff(repo, &merchant, &window, &occupied)? {
                Some(staff_id) => Some(staff_id),
                None if merchant.settings.allow_unassigned_bookings
                    && evaluate_capacity(repo, &merchant, &window)?.has_capacity =>
                {
                    None
                }
                None => return Err(ServiceError::conflict(NO_STAFF_AVAILABLE)),
            }
        }
    };

    let segments: Vec<StaffSegment> = staff_id
        .map(|staff_id| StaffSegment {
            staff_id,
            range: window,
        })
        .into_iter()
        .collect();
    ensure_schedulable(repo, &merchant, &[window], &segments)?;

    let customer = find_or_create_customer(repo, merchant.id, &request.customer)?;
    let status = if merchant.settings.auto_confirm_bookings {
        BookingStatus::Confirmed
    } else {
        BookingStatus::Pending
    };
    let number = generate_booking_number(&mut rand::thread_rng(), now);
    let mut new_booking = NewBooking::new(
        merchant.id,
        customer.id,
        staff_id,
        number,
        status,
        BookingSource::Online,
        request.start_time,
        items,
    );
    new_booking.customer_requested_staff = request.staff_id.is_some();
    new_booking.notes = request.notes;

    let booking = saved_booking(repo.create_booking(&new_booking)?)?;
    log::info!(
        "Online booking {} for merchant {} assigned to {:?}",
        booking.booking_number,
        merchant.id,
        booking.staff_id
    );
    Ok(booking)
}

pub fn get_booking<R>(repo: &R, user: &AuthenticatedUser, booking_id: i32) -> ServiceResult<Booking>
where
    R: BookingReader + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }
    repo.get_booking_by_id(booking_id, user.merchant_id)?
        .ok_or(ServiceError::NotFound)
}

pub fn list_bookings<R>(
    repo: &R,
    user: &AuthenticatedUser,
    params: BookingQueryParams,
) -> ServiceResult<Paginated<Booking>>
where
    R: BookingReader + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }
    let page = params.page.unwrap_or(1).max(1);
    let query = params
        .into_query(user.merchant_id, DEFAULT_ITEMS_PER_PAGE)
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    let (total, bookings) = repo.list_bookings(query)?;
    let total_pages = total.div_ceil(DEFAULT_ITEMS_PER_PAGE);
    Ok(Paginated::new(bookings, page, total_pages))
}

/// Active bookings of a local day grouped by staff member.
pub fn calendar<R>(
    repo: &R,
    user: &AuthenticatedUser,
    params: CalendarQueryParams,
) -> ServiceResult<CalendarDay>
where
    R: MerchantReader + StaffReader + BookingReader + ?Sized,
{
    let merchant = authorized_merchant(repo, user)?;
    let date = params
        .local_date()
        .map_err(|err| ServiceError::Form(err.to_string()))?;
    let (day_start, day_end) = local_day_bounds(merchant.tz(), date);

    let mut query = BookingListQuery::new(merchant.id)
        .overlapping(day_start, day_end)
        .active();
    if let Some(staff_id) = params.staff_id {
        query = query.staff(staff_id);
    }
    let (_, mut bookings) = repo.list_bookings(query)?;

    let staff: Vec<Staff> = repo
        .list_staff(StaffListQuery::new(merchant.id).active())?
        .into_iter()
        .filter(|member| member.is_bookable())
        .filter(|member| params.staff_id.is_none_or(|staff_id| staff_id == member.id))
        .collect();

    let mut columns: Vec<CalendarColumn> = staff
        .iter()
        .map(|member| {
            let (own, rest): (Vec<Booking>, Vec<Booking>) = bookings
                .drain(..)
                .partition(|booking| booking.staff_id == Some(member.id));
            bookings = rest;
            CalendarColumn {
                staff_id: Some(member.id),
                staff_name: member.full_name(),
                bookings: own,
            }
        })
        .collect();

    if params.staff_id.is_none() && !bookings.is_empty() {
        columns.push(CalendarColumn {
            staff_id: None,
            staff_name: "Unassigned".to_string(),
            bookings,
        });
    }

    Ok(CalendarDay { date, columns })
}

/// Reschedule, reassign or edit a booking.
///
/// Time and staff changes re-run the conflict check under the write lock.
pub fn update_booking<R>(
    repo: &R,
    user: &AuthenticatedUser,
    booking_id: i32,
    form: UpdateBookingForm,
    now: NaiveDateTime,
) -> ServiceResult<Booking>
where
    R: MerchantReader
        + CustomerReader
        + LocationReader
        + StaffReader
        + BookingReader
        + BookingWriter
        + HolidayReader
        + InvoiceReader
        + ?Sized,
{
    let merchant = authorized_merchant(repo, user)?;
    let changes = form
        .into_changes()
        .map_err(|err| ServiceError::Form(err.to_string()))?;
    let mut booking = repo
        .get_booking_by_id(booking_id, merchant.id)?
        .ok_or(ServiceError::NotFound)?;

    let customer_id = changes
        .customer_id
        .filter(|customer_id| *customer_id != booking.customer_id);
    if booking.status.is_terminal() && (changes.reschedules() || customer_id.is_some()) {
        return Err(ServiceError::Form(format!(
            "Cannot modify a {} booking",
            booking.status
        )));
    }

    if let Some(customer_id) = customer_id {
        repo.get_customer_by_id(customer_id, merchant.id)?
            .ok_or(ServiceError::NotFound)?;
        let paid = repo
            .find_active_invoice_for_booking(booking.id, merchant.id)?
            .is_some_and(|invoice| invoice.paid_cents > 0);
        if paid {
            return Err(ServiceError::Form(
                "Cannot change the customer of a booking with recorded payments".to_string(),
            ));
        }
    }
    if let Some(location_id) = changes.location_id {
        repo.get_location_by_id(location_id, merchant.id)?
            .ok_or(ServiceError::NotFound)?;
    }

    if changes.reschedules() {
        if let Some(staff_id) = changes.staff_id {
            repo.get_staff_by_id(staff_id, merchant.id)?
                .ok_or(ServiceError::NotFound)?;
        }
        let start = changes.start_time.unwrap_or(booking.start_time);
        let mut reschedule = BookingReschedule::for_booking(&booking, start, changes.staff_id, now);
        if changes.is_override {
            reschedule.is_override = true;
            reschedule.override_reason = changes.override_reason.clone();
        }

        if !reschedule.is_override {
            let ranges: Vec<TimeRange> = reschedule
                .items
                .iter()
                .map(|item| TimeRange::new(item.start_time, item.end_time))
                .collect();
            ensure_schedulable(repo, &merchant, &ranges, &reschedule.staff_segments())?;
        }

        booking = saved_booking(repo.reschedule_booking(booking.id, merchant.id, &reschedule)?)?;
        log::info!(
            "Rescheduled booking {} to {}",
            booking.booking_number,
            booking.start_time
        );
    }

    if customer_id.is_some() || changes.notes.is_some() || changes.location_id.is_some() {
        let updates = UpdateBookingDetails {
            customer_id,
            notes: changes.notes,
            location_id: changes.location_id,
            updated_at: Some(now),
        };
        booking = repo.update_booking_details(booking.id, merchant.id, &updates)?;
    }

    Ok(booking)
}

/// Move a booking along its status machine.
pub fn transition_booking<R>(
    repo: &R,
    user: &AuthenticatedUser,
    booking_id: i32,
    transition: BookingTransition,
    reason: Option<String>,
    now: NaiveDateTime,
) -> ServiceResult<Booking>
where
    R: BookingReader + BookingWriter + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }
    let booking = repo
        .get_booking_by_id(booking_id, user.merchant_id)?
        .ok_or(ServiceError::NotFound)?;
    let target = transition
        .apply(booking.status)
        .map_err(ServiceError::Form)?;

    let mut change = BookingStatusChange::new(booking.status, target, now);
    if transition == BookingTransition::Cancel {
        change = change.with_reason(reason);
    }

    let updated = repo
        .change_booking_status(booking.id, user.merchant_id, &change)
        .map_err(|err| match err {
            RepositoryError::NotFound => {
                ServiceError::conflict("Booking status changed, please reload and retry")
            }
            other => ServiceError::from(other),
        })?;
    log::info!(
        "Booking {} moved from {} to {}",
        updated.booking_number,
        booking.status,
        updated.status
    );
    Ok(updated)
}

pub fn cancel_booking<R>(
    repo: &R,
    user: &AuthenticatedUser,
    booking_id: i32,
    form: CancelBookingForm,
    now: NaiveDateTime,
) -> ServiceResult<Booking>
where
    R: BookingReader + BookingWriter + ?Sized,
{
    let reason = form
        .into_reason()
        .map_err(|err| ServiceError::Form(err.to_string()))?;
    transition_booking(
        repo,
        user,
        booking_id,
        BookingTransition::Cancel,
        reason,
        now,
    )
}
