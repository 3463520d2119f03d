use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::booking::{
    Booking as DomainBooking, BookingItem as DomainBookingItem, BookingSource, BookingStatus,
    NewBooking as DomainNewBooking, NewBookingItem as DomainNewBookingItem,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::bookings)]
pub struct Booking {
    pub id: i32,
    pub merchant_id: i32,
    pub location_id: Option<i32>,
    pub customer_id: i32,
    pub staff_id: Option<i32>,
    pub booking_number: String,
    pub status: String,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub total_cents: i64,
    pub notes: Option<String>,
    pub source: String,
    pub is_override: bool,
    pub override_reason: Option<String>,
    pub customer_requested_staff: bool,
    pub cancellation_reason: Option<String>,
    pub cancelled_at: Option<NaiveDateTime>,
    pub completed_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable, Associations)]
#[diesel(table_name = crate::schema::booking_services)]
#[diesel(belongs_to(Booking, foreign_key = booking_id))]
pub struct BookingService {
    pub id: i32,
    pub booking_id: i32,
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

#[derive(Insertable)]
#[diesel(table_name = crate::schema::bookings)]
pub struct NewBooking<'a> {
    pub merchant_id: i32,
    pub location_id: Option<i32>,
    pub customer_id: i32,
    pub staff_id: Option<i32>,
    pub booking_number: &'a str,
    pub status: &'a str,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub total_cents: i64,
    pub notes: Option<&'a str>,
    pub source: &'a str,
    pub is_override: bool,
    pub override_reason: Option<&'a str>,
    pub customer_requested_staff: bool,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::booking_services)]
pub struct NewBookingService<'a> {
    pub booking_id: i32,
    pub service_id: i32,
    pub service_name: &'a str,
    pub staff_id: Option<i32>,
    pub price_cents: i64,
    pub duration_minutes: i32,
    pub padding_before_minutes: i32,
    pub padding_after_minutes: i32,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub sort_order: i32,
}

impl Booking {
    pub fn into_domain(self, services: Vec<BookingService>) -> DomainBooking {
        let mut services: Vec<DomainBookingItem> = services.into_iter().map(Into::into).collect();
        services.sort_by_key(|item| (item.sort_order, item.id));

        DomainBooking {
            id: self.id,
            merchant_id: self.merchant_id,
            location_id: self.location_id,
            customer_id: self.customer_id,
            staff_id: self.staff_id,
            booking_number: self.booking_number,
            status: self.status.parse().unwrap_or(BookingStatus::Pending),
            start_time: self.start_time,
            end_time: self.end_time,
            total_cents: self.total_cents,
            notes: self.notes,
            source: BookingSource::parse(&self.source),
            is_override: self.is_override,
            override_reason: self.override_reason,
            customer_requested_staff: self.customer_requested_staff,
            cancellation_reason: self.cancellation_reason,
            cancelled_at: self.cancelled_at,
            completed_at: self.completed_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
            services,
        }
    }
}

impl From<BookingService> for DomainBookingItem {
    fn from(value: BookingService) -> Self {
        Self {
            id: value.id,
            booking_id: value.booking_id,
            service_id: value.service_id,
            service_name: value.service_name,
            staff_id: value.staff_id,
            price_cents: value.price_cents,
            duration_minutes: value.duration_minutes,
            padding_before_minutes: value.padding_before_minutes,
            padding_after_minutes: value.padding_after_minutes,
            start_time: value.start_time,
            end_time: value.end_time,
            sort_order: value.sort_order,
        }
    }
}

impl<'a> From<&'a DomainNewBooking> for NewBooking<'a> {
    fn from(value: &'a DomainNewBooking) -> Self {
        Self {
            merchant_id: value.merchant_id,
            location_id: value.location_id,
            customer_id: value.customer_id,
            staff_id: value.staff_id,
            booking_number: value.booking_number.as_str(),
            status: value.status.as_str(),
            start_time: value.start_time,
            end_time: value.end_time,
            total_cents: value.total_cents,
            notes: value.notes.as_deref(),
            source: value.source.as_str(),
            is_override: value.is_override,
            override_reason: value.override_reason.as_deref(),
            customer_requested_staff: value.customer_requested_staff,
        }
    }
}

impl<'a> NewBookingService<'a> {
    pub fn from_domain(booking_id: i32, value: &'a DomainNewBookingItem) -> Self {
        Self {
            booking_id,
            service_id: value.service_id,
            service_name: value.service_name.as_str(),
            staff_id: value.staff_id,
            price_cents: value.price_cents,
            duration_minutes: value.duration_minutes,
            padding_before_minutes: value.padding_before_minutes,
            padding_after_minutes: value.padding_after_minutes,
            start_time: value.start_time,
            end_time: value.end_time,
            sort_order: value.sort_order,
        }
    }
}
