use chrono::NaiveDate;
use mockall::mock;

use super::{
    AuditReader, AuditWriter, BookingReader, BookingWriter, CatalogReader, CatalogWriter,
    CustomerReader, CustomerWriter, HolidayReader, HolidayWriter, InvoiceReader, InvoiceWriter,
    LocationReader, LocationWriter, LoyaltyReader, LoyaltyWriter, MerchantReader, MerchantWriter,
    StaffBlockReader, StaffBlockWriter, StaffReader, StaffWriter,
};
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
use pushkind_common::repository::errors::RepositoryResult;

mock! {
    pub MerchantReader {}

    impl MerchantReader for MerchantReader {
        fn get_merchant_by_id(&self, id: i32) -> RepositoryResult<Option<Merchant>>;
        fn get_merchant_by_username(&self, username: &str) -> RepositoryResult<Option<Merchant>>;
        fn get_merchant_by_subdomain(&self, subdomain: &str) -> RepositoryResult<Option<Merchant>>;
    }
}

mock! {
    pub MerchantWriter {}

    impl MerchantWriter for MerchantWriter {
        fn create_merchant(&self, new_merchant: &NewMerchant) -> RepositoryResult<Merchant>;
        fn update_merchant_settings(&self, merchant_id: i32, settings: &MerchantSettings) -> RepositoryResult<Merchant>;
    }
}

mock! {
    pub LocationReader {}

    impl LocationReader for LocationReader {
        fn get_location_by_id(&self, id: i32, merchant_id: i32) -> RepositoryResult<Option<Location>>;
        fn list_locations(&self, merchant_id: i32) -> RepositoryResult<Vec<Location>>;
    }
}

mock! {
    pub LocationWriter {}

    impl LocationWriter for LocationWriter {
        fn create_location(&self, new_location: &NewLocation) -> RepositoryResult<Location>;
        fn update_location(&self, location_id: i32, merchant_id: i32, updates: &UpdateLocation) -> RepositoryResult<Location>;
        fn delete_location(&self, location_id: i32, merchant_id: i32) -> RepositoryResult<()>;
    }
}

mock! {
    pub StaffReader {}

    impl StaffReader for StaffReader {
        fn get_staff_by_id(&self, id: i32, merchant_id: i32) -> RepositoryResult<Option<Staff>>;
        fn list_staff(&self, query: StaffListQuery) -> RepositoryResult<Vec<Staff>>;
        fn list_staff_schedules(&self, staff_id: i32, merchant_id: i32) -> RepositoryResult<Vec<StaffSchedule>>;
        fn list_schedule_overrides(&self, staff_id: i32, merchant_id: i32) -> RepositoryResult<Vec<ScheduleOverride>>;
        fn load_roster(&self, merchant_id: i32, from: NaiveDate, to: NaiveDate) -> RepositoryResult<Roster>;
    }
}

mock! {
    pub StaffWriter {}

    impl StaffWriter for StaffWriter {
        fn create_staff(&self, new_staff: &NewStaff) -> RepositoryResult<Staff>;
        fn update_staff(&self, staff_id: i32, merchant_id: i32, updates: &UpdateStaff) -> RepositoryResult<Staff>;
        fn set_staff_pin(&self, staff_id: i32, merchant_id: i32, pin_cipher: &str) -> RepositoryResult<Staff>;
        fn replace_staff_schedules(&self, staff_id: i32, merchant_id: i32, schedules: &[NewStaffSchedule]) -> RepositoryResult<Vec<StaffSchedule>>;
        fn upsert_schedule_override(&self, merchant_id: i32, entry: &NewScheduleOverride) -> RepositoryResult<ScheduleOverride>;
        fn delete_schedule_override(&self, staff_id: i32, merchant_id: i32, date: NaiveDate) -> RepositoryResult<()>;
    }
}

mock! {
    pub StaffBlockReader {}

    impl StaffBlockReader for StaffBlockReader {
        fn list_staff_blocks(&self, query: StaffBlockListQuery) -> RepositoryResult<Vec<StaffBlock>>;
    }
}

mock! {
    pub StaffBlockWriter {}

    impl StaffBlockWriter for StaffBlockWriter {
        fn create_staff_block(&self, new_block: &NewStaffBlock) -> RepositoryResult<StaffBlock>;
        fn delete_staff_block(&self, block_id: i32, merchant_id: i32) -> RepositoryResult<()>;
    }
}

mock! {
    pub CatalogReader {}

    impl CatalogReader for CatalogReader {
        fn get_service_by_id(&self, id: i32, merchant_id: i32) -> RepositoryResult<Option<Service>>;
        fn list_services(&self, query: ServiceListQuery) -> RepositoryResult<Vec<Service>>;
    }
}

mock! {
    pub CatalogWriter {}

    impl CatalogWriter for CatalogWriter {
        fn create_service(&self, new_service: &NewService) -> RepositoryResult<Service>;
        fn update_service(&self, service_id: i32, merchant_id: i32, updates: &UpdateService) -> RepositoryResult<Service>;
    }
}

mock! {
    pub CustomerReader {}

    impl CustomerReader for CustomerReader {
        fn get_customer_by_id(&self, id: i32, merchant_id: i32) -> RepositoryResult<Option<Customer>>;
        fn find_customer_by_email(&self, merchant_id: i32, email: &str) -> RepositoryResult<Option<Customer>>;
        fn find_customer_by_phone(&self, merchant_id: i32, phone: &str) -> RepositoryResult<Option<Customer>>;
        fn list_customers(&self, query: CustomerListQuery) -> RepositoryResult<(usize, Vec<Customer>)>;
    }
}

mock! {
    pub CustomerWriter {}

    impl CustomerWriter for CustomerWriter {
        fn create_customer(&self, new_customer: &NewCustomer) -> RepositoryResult<Customer>;
        fn update_customer(&self, customer_id: i32, merchant_id: i32, updates: &UpdateCustomer) -> RepositoryResult<Customer>;
        fn delete_customer(&self, customer_id: i32, merchant_id: i32) -> RepositoryResult<()>;
        fn import_customers(&self, merchant_id: i32, customers: &[NewCustomer]) -> RepositoryResult<CustomerImportSummary>;
    }
}

mock! {
    pub BookingReader {}

    impl BookingReader for BookingReader {
        fn get_booking_by_id(&self, id: i32, merchant_id: i32) -> RepositoryResult<Option<Booking>>;
        fn list_bookings(&self, query: BookingListQuery) -> RepositoryResult<(usize, Vec<Booking>)>;
    }
}

mock! {
    pub BookingWriter {}

    impl BookingWriter for BookingWriter {
        fn create_booking(&self, new_booking: &NewBooking) -> RepositoryResult<BookingWriteOutcome>;
        fn reschedule_booking(&self, booking_id: i32, merchant_id: i32, reschedule: &BookingReschedule) -> RepositoryResult<BookingWriteOutcome>;
        fn update_booking_details(&self, booking_id: i32, merchant_id: i32, updates: &UpdateBookingDetails) -> RepositoryResult<Booking>;
        fn change_booking_status(&self, booking_id: i32, merchant_id: i32, change: &BookingStatusChange) -> RepositoryResult<Booking>;
    }
}

mock! {
    pub HolidayReader {}

    impl HolidayReader for HolidayReader {
        fn list_holidays(&self, merchant_id: i32) -> RepositoryResult<Vec<MerchantHoliday>>;
        fn list_holidays_between(&self, merchant_id: i32, from: NaiveDate, to: NaiveDate) -> RepositoryResult<Vec<MerchantHoliday>>;
        fn get_holiday_by_id(&self, id: i32, merchant_id: i32) -> RepositoryResult<Option<MerchantHoliday>>;
        fn get_holiday_by_date(&self, merchant_id: i32, date: NaiveDate) -> RepositoryResult<Option<MerchantHoliday>>;
    }
}

mock! {
    pub HolidayWriter {}

    impl HolidayWriter for HolidayWriter {
        fn create_holiday(&self, new_holiday: &NewMerchantHoliday) -> RepositoryResult<MerchantHoliday>;
        fn update_holiday(&self, holiday_id: i32, merchant_id: i32, updates: &UpdateMerchantHoliday) -> RepositoryResult<MerchantHoliday>;
        fn delete_holiday(&self, holiday_id: i32, merchant_id: i32) -> RepositoryResult<()>;
        fn sync_state_holidays(&self, merchant_id: i32, state: AustralianState, year: i32, holidays: &[PublicHoliday]) -> RepositoryResult<HolidaySyncSummary>;
    }
}

mock! {
    pub InvoiceReader {}

    impl InvoiceReader for InvoiceReader {
        fn get_invoice_by_id(&self, id: i32, merchant_id: i32) -> RepositoryResult<Option<Invoice>>;
        fn list_invoices(&self, query: InvoiceListQuery) -> RepositoryResult<(usize, Vec<Invoice>)>;
        fn find_active_invoice_for_booking(&self, booking_id: i32, merchant_id: i32) -> RepositoryResult<Option<Invoice>>;
        fn list_payments(&self, invoice_id: i32, merchant_id: i32) -> RepositoryResult<Vec<Payment>>;
        fn get_payment_by_id(&self, id: i32, merchant_id: i32) -> RepositoryResult<Option<Payment>>;
    }
}

mock! {
    pub InvoiceWriter {}

    impl InvoiceWriter for InvoiceWriter {
        fn create_invoice(&self, new_invoice: &NewInvoice) -> RepositoryResult<Invoice>;
        fn void_invoice(&self, invoice_id: i32, merchant_id: i32) -> RepositoryResult<Invoice>;
        fn record_payment(&self, new_payment: &NewPayment) -> RepositoryResult<PaymentWriteOutcome>;
        fn refund_payment(&self, payment_id: i32, merchant_id: i32, amount_cents: Option<i64>) -> RepositoryResult<RefundWriteOutcome>;
    }
}

mock! {
    pub LoyaltyReader {}

    impl LoyaltyReader for LoyaltyReader {
        fn get_loyalty_program(&self, merchant_id: i32) -> RepositoryResult<Option<LoyaltyProgram>>;
        fn get_loyalty_card(&self, merchant_id: i32, customer_id: i32) -> RepositoryResult<Option<LoyaltyCard>>;
        fn list_loyalty_transactions(&self, card_id: i32) -> RepositoryResult<Vec<LoyaltyTransaction>>;
    }
}

mock! {
    pub LoyaltyWriter {}

    impl LoyaltyWriter for LoyaltyWriter {
        fn save_loyalty_program(&self, settings: &LoyaltyProgramSettings) -> RepositoryResult<LoyaltyProgram>;
        fn redeem_loyalty_points(&self, redemption: &LoyaltyRedemption) -> RepositoryResult<RedemptionOutcome>;
        fn adjust_loyalty_points(&self, adjustment: &LoyaltyAdjustment) -> RepositoryResult<AdjustmentOutcome>;
    }
}

mock! {
    pub AuditReader {}

    impl AuditReader for AuditReader {
        fn list_audit_logs(&self, merchant_id: i32) -> RepositoryResult<Vec<AuditLog>>;
    }
}

mock! {
    pub AuditWriter {}

    impl AuditWriter for AuditWriter {
        fn create_audit_log(&self, entry: &NewAuditLog) -> RepositoryResult<AuditLog>;
    }
}

/// One mock implementing every repository trait, for services that span several.
mock! {
    pub Repository {}

    impl MerchantReader for Repository {
        fn get_merchant_by_id(&self, id: i32) -> RepositoryResult<Option<Merchant>>;
        fn get_merchant_by_username(&self, username: &str) -> RepositoryResult<Option<Merchant>>;
        fn get_merchant_by_subdomain(&self, subdomain: &str) -> RepositoryResult<Option<Merchant>>;
    }

    impl MerchantWriter for Repository {
        fn create_merchant(&self, new_merchant: &NewMerchant) -> RepositoryResult<Merchant>;
        fn update_merchant_settings(&self, merchant_id: i32, settings: &MerchantSettings) -> RepositoryResult<Merchant>;
    }

    impl LocationReader for Repository {
        fn get_location_by_id(&self, id: i32, merchant_id: i32) -> RepositoryResult<Option<Location>>;
        fn list_locations(&self, merchant_id: i32) -> RepositoryResult<Vec<Location>>;
    }

    impl LocationWriter for Repository {
        fn create_location(&self, new_location: &NewLocation) -> RepositoryResult<Location>;
        fn update_location(&self, location_id: i32, merchant_id: i32, updates: &UpdateLocation) -> RepositoryResult<Location>;
        fn delete_location(&self, location_id: i32, merchant_id: i32) -> RepositoryResult<()>;
    }

    impl StaffReader for Repository {
        fn get_staff_by_id(&self, id: i32, merchant_id: i32) -> RepositoryResult<Option<Staff>>;
        fn list_staff(&self, query: StaffListQuery) -> RepositoryResult<Vec<Staff>>;
        fn list_staff_schedules(&self, staff_id: i32, merchant_id: i32) -> RepositoryResult<Vec<StaffSchedule>>;
        fn list_schedule_overrides(&self, staff_id: i32, merchant_id: i32) -> RepositoryResult<Vec<ScheduleOverride>>;
        fn load_roster(&self, merchant_id: i32, from: NaiveDate, to: NaiveDate) -> RepositoryResult<Roster>;
    }

    impl StaffWriter for Repository {
        fn create_staff(&self, new_staff: &NewStaff) -> RepositoryResult<Staff>;
        fn update_staff(&self, staff_id: i32, merchant_id: i32, updates: &UpdateStaff) -> RepositoryResult<Staff>;
        fn set_staff_pin(&self, staff_id: i32, merchant_id: i32, pin_cipher: &str) -> RepositoryResult<Staff>;
        fn replace_staff_schedules(&self, staff_id: i32, merchant_id: i32, schedules: &[NewStaffSchedule]) -> RepositoryResult<Vec<StaffSchedule>>;
        fn upsert_schedule_override(&self, merchant_id: i32, entry: &NewScheduleOverride) -> RepositoryResult<ScheduleOverride>;
        fn delete_schedule_override(&self, staff_id: i32, merchant_id: i32, date: NaiveDate) -> RepositoryResult<()>;
    }

    impl StaffBlockReader for Repository {
        fn list_staff_blocks(&self, query: StaffBlockListQuery) -> RepositoryResult<Vec<StaffBlock>>;
    }

    impl StaffBlockWriter for Repository {
        fn create_staff_block(&self, new_block: &NewStaffBlock) -> RepositoryResult<StaffBlock>;
        fn delete_staff_block(&self, block_id: i32, merchant_id: i32) -> RepositoryResult<()>;
    }

    impl CatalogReader for Repository {
        fn get_service_by_id(&self, id: i32, merchant_id: i32) -> RepositoryResult<Option<Service>>;
        fn list_services(&self, query: ServiceListQuery) -> RepositoryResult<Vec<Service>>;
    }

    impl CatalogWriter for Repository {
        fn create_service(&self, new_service: &NewService) -> RepositoryResult<Service>;
        fn update_service(&self, service_id: i32, merchant_id: i32, updates: &UpdateService) -> RepositoryResult<Service>;
    }

    impl CustomerReader for Repository {
        fn get_customer_by_id(&self, id: i32, merchant_id: i32) -> RepositoryResult<Option<Customer>>;
        fn find_customer_by_email(&self, merchant_id: i32, email: &str) -> RepositoryResult<Option<Customer>>;
        fn find_customer_by_phone(&self, merchant_id: i32, phone: &str) -> RepositoryResult<Option<Customer>>;
        fn list_customers(&self, query: CustomerListQuery) -> RepositoryResult<(usize, Vec<Customer>)>;
    }

    impl CustomerWriter for Repository {
        fn create_customer(&self, new_customer: &NewCustomer) -> RepositoryResult<Customer>;
        fn update_customer(&self, customer_id: i32, merchant_id: i32, updates: &UpdateCustomer) -> RepositoryResult<Customer>;
        fn delete_customer(&self, customer_id: i32, merchant_id: i32) -> RepositoryResult<()>;
        fn import_customers(&self, merchant_id: i32, customers: &[NewCustomer]) -> RepositoryResult<CustomerImportSummary>;
    }

    impl BookingReader for Repository {
        fn get_booking_by_id(&self, id: i32, merchant_id: i32) -> RepositoryResult<Option<Booking>>;
        fn list_bookings(&self, query: BookingListQuery) -> RepositoryResult<(usize, Vec<Booking>)>;
    }

    impl BookingWriter for Repository {
        fn create_booking(&self, new_booking: &NewBooking) -> RepositoryResult<BookingWriteOutcome>;
        fn reschedule_booking(&self, booking_id: i32, merchant_id: i32, reschedule: &BookingReschedule) -> RepositoryResult<BookingWriteOutcome>;
        fn update_booking_details(&self, booking_id: i32, merchant_id: i32, updates: &UpdateBookingDetails) -> RepositoryResult<Booking>;
        fn change_booking_status(&self, booking_id: i32, merchant_id: i32, change: &BookingStatusChange) -> RepositoryResult<Booking>;
    }

    impl HolidayReader for Repository {
        fn list_holidays(&self, merchant_id: i32) -> RepositoryResult<Vec<MerchantHoliday>>;
        fn list_holidays_between(&self, merchant_id: i32, from: NaiveDate, to: NaiveDate) -> RepositoryResult<Vec<MerchantHoliday>>;
        fn get_holiday_by_id(&self, id: i32, merchant_id: i32) -> RepositoryResult<Option<MerchantHoliday>>;
        fn get_holiday_by_date(&self, merchant_id: i32, date: NaiveDate) -> RepositoryResult<Option<MerchantHoliday>>;
    }

    impl HolidayWriter for Repository {
        fn create_holiday(&self, new_holiday: &NewMerchantHoliday) -> RepositoryResult<MerchantHoliday>;
        fn update_holiday(&self, holiday_id: i32, merchant_id: i32, updates: &UpdateMerchantHoliday) -> RepositoryResult<MerchantHoliday>;
        fn delete_holiday(&self, holiday_id: i32, merchant_id: i32) -> RepositoryResult<()>;
        fn sync_state_holidays(&self, merchant_id: i32, state: AustralianState, year: i32, holidays: &[PublicHoliday]) -> RepositoryResult<HolidaySyncSummary>;
    }

    impl InvoiceReader for Repository {
        fn get_invoice_by_id(&self, id: i32, merchant_id: i32) -> RepositoryResult<Option<Invoice>>;
        fn list_invoices(&self, query: InvoiceListQuery) -> RepositoryResult<(usize, Vec<Invoice>)>;
        fn find_active_invoice_for_booking(&self, booking_id: i32, merchant_id: i32) -> RepositoryResult<Option<Invoice>>;
        fn list_payments(&self, invoice_id: i32, merchant_id: i32) -> RepositoryResult<Vec<Payment>>;
        fn get_payment_by_id(&self, id: i32, merchant_id: i32) -> RepositoryResult<Option<Payment>>;
    }

    impl InvoiceWriter for Repository {
        fn create_invoice(&self, new_invoice: &NewInvoice) -> RepositoryResult<Invoice>;
        fn void_invoice(&self, invoice_id: i32, merchant_id: i32) -> RepositoryResult<Invoice>;
        fn record_payment(&self, new_payment: &NewPayment) -> RepositoryResult<PaymentWriteOutcome>;
        fn refund_payment(&self, payment_id: i32, merchant_id: i32, amount_cents: Option<i64>) -> RepositoryResult<RefundWriteOutcome>;
    }

    impl LoyaltyReader for Repository {
        fn get_loyalty_program(&self, merchant_id: i32) -> RepositoryResult<Option<LoyaltyProgram>>;
        fn get_loyalty_card(&self, merchant_id: i32, customer_id: i32) -> RepositoryResult<Option<LoyaltyCard>>;
        fn list_loyalty_transactions(&self, card_id: i32) -> RepositoryResult<Vec<LoyaltyTransaction>>;
    }

    impl LoyaltyWriter for Repository {
        fn save_loyalty_program(&self, settings: &LoyaltyProgramSettings) -> RepositoryResult<LoyaltyProgram>;
        fn redeem_loyalty_points(&self, redemption: &LoyaltyRedemption) -> RepositoryResult<RedemptionOutcome>;
        fn adjust_loyalty_points(&self, adjustment: &LoyaltyAdjustment) -> RepositoryResult<AdjustmentOutcome>;
    }

    impl AuditReader for Repository {
        fn list_audit_logs(&self, merchant_id: i32) -> RepositoryResult<Vec<AuditLog>>;
    }

    impl AuditWriter for Repository {
        fn create_audit_log(&self, entry: &NewAuditLog) -> RepositoryResult<AuditLog>;
    }
}
