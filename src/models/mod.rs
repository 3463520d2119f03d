//! Diesel row types and their conversions to domain values.

pub mod audit;
pub mod booking;
pub mod config;
pub mod customer;
pub mod holiday;
pub mod invoice;
pub mod location;
pub mod loyalty;
pub mod merchant;
pub mod schedule;
pub mod service;
pub mod staff;
pub mod staff_block;

/// Changeset value for a nullable text column.
///
/// `None` leaves the column untouched, an empty string clears it.
pub(crate) fn nullable_text(value: &Option<String>) -> Option<Option<&str>> {
    value
        .as_deref()
        .map(|text| if text.is_empty() { None } else { Some(text) })
}
