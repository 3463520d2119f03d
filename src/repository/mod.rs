use chrono::NaiveDate;
use pushkind_common::db::{DbConnection, DbPool};
use pushkind_common::repository::errors::RepositoryResult;

use crate::domain::{
    audit::{AuditLog, NewAuditLog},
    booking::{
        Booking, BookingListQuery, BookingReschedule, BookingStatusChange, BookingWriteOutcome,
        NewBooking, UpdateBookingDetails,
    },
    customer::{Customer, CustomerImportSummary, CustomerListQuery, NewCustomer, UpdateCustomer},
    holiday::{
        AustralianState, HolidaySyncSummary, MerchantHoliday, NewMerchantHoliday, PublicHoliday,
        UpdateMerchantHoliday,
    },
    invoice::{
        Invoice, InvoiceListQuery, NewInvoice, NewPayment, Payment, PaymentWriteOutcome,
        RefundWriteOutcome,
    },
    location::{Location, NewLocation, UpdateLocation},
    loyalty::{
        AdjustmentOutcome, LoyaltyAdjustment, LoyaltyCard, LoyaltyProgram,
        LoyaltyProgramSettings, LoyaltyRedemption, LoyaltyTransaction, RedemptionOutcome,
    },
    merchant::{Merchant, MerchantSettings, NewMerchant},
    schedule::{NewScheduleOverride, NewStaffSchedule, Roster, ScheduleOverride, StaffSchedule},
    service::{NewService, Service, ServiceListQuery, UpdateService},
    staff::{NewStaff, Staff, StaffListQuery, UpdateStaff},
    staff_block::{NewStaffBlock, StaffBlock, StaffBlockListQuery},
};

pub mod audit;
pub mod booking;
pub mod catalog;
pub mod customer;
pub mod holiday;
pub mod invoice;
pub mod location;
pub mod loyalty;
pub mod merchant;
pub mod staff;
pub mod staff_block;

#[cfg(test)]
pub mod mock;

#[derive(Clone)]
/// Diesel-backed repository implementation that wraps an r2d2 pool.
pub struct DieselRepository {
    pool: DbPool, // r2d2::Pool is cheap to clone
}

impl DieselRepository {
    /// Create a new repository using the provided connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(self.pool.get()?)
    }
}

/// Lookups of tenant records.
pub trait MerchantReader {
    fn get_merchant_by_id(&self, id: i32) -> RepositoryResult<Option<Merchant>>;
    fn get_merchant_by_username(&self, username: &str) -> RepositoryResult<Option<Merchant>>;
    fn get_merchant_by_subdomain(&self, subdomain: &str) -> RepositoryResult<Option<Merchant>>;
}

pub trait MerchantWriter {
    fn create_merchant(&self, new_merchant: &NewMerchant) -> RepositoryResult<Merchant>;
    fn update_merchant_settings(
        &self,
        merchant_id: i32,
        settings: &MerchantSettings,
    ) -> RepositoryResult<Merchant>;
}

pub trait LocationReader {
    fn get_location_by_id(&self, id: i32, merchant_id: i32) -> RepositoryResult<Option<Location>>;
    fn list_locations(&self, merchant_id: i32) -> RepositoryResult<Vec<Location>>;
}

pub trait LocationWriter {
    fn create_location(&self, new_location: &NewLocation) -> RepositoryResult<Location>;
    fn update_location(
        &self,
        location_id: i32,
        merchant_id: i32,
        updates: &UpdateLocation,
    ) -> RepositoryResult<Location>;
    fn delete_location(&self, location_id: i32, merchant_id: i32) -> RepositoryResult<()>;
}

/// Staff records together with their rosters.
pub trait StaffReader {
    fn get_staff_by_id(&self, id: i32, merchant_id: i32) -> RepositoryResult<Option<Staff>>;
    fn list_staff(&self, query: StaffListQuery) -> RepositoryResult<Vec<Staff>>;
    fn list_staff_schedules(
        &self,
        staff_id: i32,
        merchant_id: i32,
    ) -> RepositoryResult<Vec<StaffSchedule>>;
    fn list_schedule_overrides(
        &self,
        staff_id: i32,
        merchant_id: i32,
    ) -> RepositoryResult<Vec<ScheduleOverride>>;
    /// Weekly schedules of every staff member plus overrides dated within `[from, to]`.
    fn load_roster(
        &self,
        merchant_id: i32,
        from: NaiveDate,
        to: NaiveDate,
    ) -> RepositoryResult<Roster>;
}

pub trait StaffWriter {
    fn create_staff(&self, new_staff: &NewStaff) -> RepositoryResult<Staff>;
    fn update_staff(
        &self,
        staff_id: i32,
        merchant_id: i32,
        updates: &UpdateStaff,
    ) -> RepositoryResult<Staff>;
    fn set_staff_pin(
        &self,
        staff_id: i32,
        merchant_id: i32,
        pin_cipher: &str,
    ) -> RepositoryResult<Staff>;
    /// Swap the whole weekly schedule of a staff member in one transaction.
    fn replace_staff_schedules(
        &self,
        staff_id: i32,
        merchant_id: i32,
        schedules: &[NewStaffSchedule],
    ) -> RepositoryResult<Vec<StaffSchedule>>;
    fn upsert_schedule_override(
        &self,
        merchant_id: i32,
        entry: &NewScheduleOverride,
    ) -> RepositoryResult<ScheduleOverride>;
    fn delete_schedule_override(
        &self,
        staff_id: i32,
        merchant_id: i32,
        date: NaiveDate,
    ) -> RepositoryResult<()>;
}

pub trait StaffBlockReader {
    fn list_staff_blocks(&self, query: StaffBlockListQuery) -> RepositoryResult<Vec<StaffBlock>>;
}

pub trait StaffBlockWriter {
    /// Insert a block, absorbing existing blocks that overlap or touch it.
    fn create_staff_block(&self, new_block: &NewStaffBlock) -> RepositoryResult<StaffBlock>;
    fn delete_staff_block(&self, block_id: i32, merchant_id: i32) -> RepositoryResult<()>;
}

/// Bookable services.
pub trait CatalogReader {
    fn get_service_by_id(&self, id: i32, merchant_id: i32) -> RepositoryResult<Option<Service>>;
    fn list_services(&self, query: ServiceListQuery) -> RepositoryResult<Vec<Service>>;
}

pub trait CatalogWriter {
    fn create_service(&self, new_service: &NewService) -> RepositoryResult<Service>;
    fn update_service(
        &self,
        service_id: i32,
        merchant_id: i32,
        updates: &UpdateService,
    ) -> RepositoryResult<Service>;
}

/// Customer lookups. Deleted customers are never returned.
pub trait CustomerReader {
    fn get_customer_by_id(&self, id: i32, merchant_id: i32) -> RepositoryResult<Option<Customer>>;
    fn find_customer_by_email(
        &self,
        merchant_id: i32,
        email: &str,
    ) -> RepositoryResult<Option<Customer>>;
    fn find_customer_by_phone(
        &self,
        merchant_id: i32,
        phone: &str,
    ) -> RepositoryResult<Option<Customer>>;
    fn list_customers(&self, query: CustomerListQuery)
    -> RepositoryResult<(usize, Vec<Customer>)>;
}

pub trait CustomerWriter {
    fn create_customer(&self, new_customer: &NewCustomer) -> RepositoryResult<Customer>;
    fn update_customer(
        &self,
        customer_id: i32,
        merchant_id: i32,
        updates: &UpdateCustomer,
    ) -> RepositoryResult<Customer>;
    /// Soft delete: the row stays with status `deleted`.
    fn delete_customer(&self, customer_id: i32, merchant_id: i32) -> RepositoryResult<()>;
    /// Insert customers whose email and phone are not yet known to the merchant.
    fn import_customers(
        &self,
        merchant_id: i32,
        customers: &[NewCustomer],
    ) -> RepositoryResult<CustomerImportSummary>;
}

pub trait BookingReader {
    fn get_booking_by_id(&self, id: i32, merchant_id: i32) -> RepositoryResult<Option<Booking>>;
    fn list_bookings(&self, query: BookingListQuery) -> RepositoryResult<(usize, Vec<Booking>)>;
}

/// Booking writes. Scheduling writes re-check conflicts under a write lock.
pub trait BookingWriter {
    fn create_booking(&self, new_booking: &NewBooking) -> RepositoryResult<BookingWriteOutcome>;
    fn reschedule_booking(
        &self,
        booking_id: i32,
        merchant_id: i32,
        reschedule: &BookingReschedule,
    ) -> RepositoryResult<BookingWriteOutcome>;
    fn update_booking_details(
        &self,
        booking_id: i32,
        merchant_id: i32,
        updates: &UpdateBookingDetails,
    ) -> RepositoryResult<Booking>;
    /// Apply a status change if the booking is still in `change.from`.
    fn change_booking_status(
        &self,
        booking_id: i32,
        merchant_id: i32,
        change: &BookingStatusChange,
    ) -> RepositoryResult<Booking>;
}

pub trait HolidayReader {
    fn list_holidays(&self, merchant_id: i32) -> RepositoryResult<Vec<MerchantHoliday>>;
    fn list_holidays_between(
        &self,
        merchant_id: i32,
        from: NaiveDate,
        to: NaiveDate,
    ) -> RepositoryResult<Vec<MerchantHoliday>>;
    fn get_holiday_by_id(
        &self,
        id: i32,
        merchant_id: i32,
    ) -> RepositoryResult<Option<MerchantHoliday>>;
    fn get_holiday_by_date(
        &self,
        merchant_id: i32,
        date: NaiveDate,
    ) -> RepositoryResult<Option<MerchantHoliday>>;
}

pub trait HolidayWriter {
    fn create_holiday(&self, new_holiday: &NewMerchantHoliday)
    -> RepositoryResult<MerchantHoliday>;
    fn update_holiday(
        &self,
        holiday_id: i32,
        merchant_id: i32,
        updates: &UpdateMerchantHoliday,
    ) -> RepositoryResult<MerchantHoliday>;
    fn delete_holiday(&self, holiday_id: i32, merchant_id: i32) -> RepositoryResult<()>;
    /// Reconcile state-sourced holidays of `year` with `holidays`.
    fn sync_state_holidays(
        &self,
        merchant_id: i32,
        state: AustralianState,
        year: i32,
        holidays: &[PublicHoliday],
    ) -> RepositoryResult<HolidaySyncSummary>;
}

pub trait InvoiceReader {
    fn get_invoice_by_id(&self, id: i32, merchant_id: i32) -> RepositoryResult<Option<Invoice>>;
    fn list_invoices(&self, query: InvoiceListQuery) -> RepositoryResult<(usize, Vec<Invoice>)>;
    /// The non-voided invoice raised for a booking, if any.
    fn find_active_invoice_for_booking(
        &self,
        booking_id: i32,
        merchant_id: i32,
    ) -> RepositoryResult<Option<Invoice>>;
    fn list_payments(&self, invoice_id: i32, merchant_id: i32) -> RepositoryResult<Vec<Payment>>;
    fn get_payment_by_id(&self, id: i32, merchant_id: i32) -> RepositoryResult<Option<Payment>>;
}

pub trait InvoiceWriter {
    /// Insert an invoice with the next number of the merchant's sequence.
    fn create_invoice(&self, new_invoice: &NewInvoice) -> RepositoryResult<Invoice>;
    fn void_invoice(&self, invoice_id: i32, merchant_id: i32) -> RepositoryResult<Invoice>;
    /// Allocate a payment and earn loyalty points in one transaction.
    fn record_payment(&self, new_payment: &NewPayment) -> RepositoryResult<PaymentWriteOutcome>;
    fn refund_payment(
        &self,
        payment_id: i32,
        merchant_id: i32,
        amount_cents: Option<i64>,
    ) -> RepositoryResult<RefundWriteOutcome>;
}

pub trait LoyaltyReader {
    fn get_loyalty_program(&self, merchant_id: i32) -> RepositoryResult<Option<LoyaltyProgram>>;
    fn get_loyalty_card(
        &self,
        merchant_id: i32,
        customer_id: i32,
    ) -> RepositoryResult<Option<LoyaltyCard>>;
    fn list_loyalty_transactions(&self, card_id: i32) -> RepositoryResult<Vec<LoyaltyTransaction>>;
}

pub trait LoyaltyWriter {
    fn save_loyalty_program(
        &self,
        settings: &LoyaltyProgramSettings,
    ) -> RepositoryResult<LoyaltyProgram>;
    fn redeem_loyalty_points(
        &self,
        redemption: &LoyaltyRedemption,
    ) -> RepositoryResult<RedemptionOutcome>;
    fn adjust_loyalty_points(
        &self,
        adjustment: &LoyaltyAdjustment,
    ) -> RepositoryResult<AdjustmentOutcome>;
}

pub trait AuditReader {
    fn list_audit_logs(&self, merchant_id: i32) -> RepositoryResult<Vec<AuditLog>>;
}

pub trait AuditWriter {
    fn create_audit_log(&self, entry: &NewAuditLog) -> RepositoryResult<AuditLog>;
}
