pub mod domain;
pub mod forms;
pub mod models;
pub mod repository;
pub mod routes;
pub mod schema;
pub mod services;

/// Role carried by merchant tokens and required by every back-office service.
pub const SERVICE_ACCESS_ROLE: &str = "merchant";
