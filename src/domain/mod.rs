//! Domain types and pure business rules shared by the service layer.

pub mod audit;
pub mod auth;
pub mod availability;
pub mod booking;
pub mod customer;
pub mod holiday;
pub mod invoice;
pub mod location;
pub mod loyalty;
pub mod merchant;
pub mod pin;
pub mod schedule;
pub mod service;
pub mod staff;
pub mod staff_block;
pub mod timezone;
