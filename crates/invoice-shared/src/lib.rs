//! # Invoice Shared
//! 
//! Shared configuration, telemetry, constants and helpers for the invoice backend.

pub mod constants;
pub mod utils;
pub mod telemetry;
pub mod config;
pub mod error;

pub use config::AppConfig;
pub use error::AppError;
