//! Business operations shared by the HTTP handlers.

use pushkind_common::repository::errors::RepositoryError;
use thiserror::Error;

use crate::domain::booking::BookingConflict;

pub mod auth;
pub mod availability;
pub mod bookings;
pub mod catalog;
pub mod customers;
pub mod holidays;
pub mod invoices;
pub mod locations;
pub mod loyalty;
pub mod merchants;
pub mod pins;
pub mod public;
pub mod staff;
pub mod staff_blocks;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Unauthorized")]
    Unauthorized,
    /// Rejected credentials with a message shown to the caller.
    #[error("{0}")]
    InvalidCredentials(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("Not found")]
    NotFound,
    #[error("{0}")]
    Form(String),
    #[error("{message}")]
    Conflict {
        message: String,
        conflicts: Vec<BookingConflict>,
    },
    #[error("{0}")]
    Locked(String),
    #[error("repository error: {0}")]
    Repository(RepositoryError),
    #[error("{0}")]
    Internal(String),
}

impl ServiceError {
    /// Conflict without a list of colliding bookings.
    pub fn conflict(message: impl Into<String>) -> Self {
        ServiceError::Conflict {
            message: message.into(),
            conflicts: Vec::new(),
        }
    }
}

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => ServiceError::NotFound,
            other => ServiceError::Repository(other),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
