//! # Invoice Core
//! 
//! Domain entities, ports and services for the invoice backend.

pub mod domain;
pub mod services;
pub mod repositories;
pub mod ports;
pub mod error;

// Re-export domain entities
pub use domain::*;
pub use error::{DomainError, FieldViolation};
