//! # Invoice Core - Domain Module
//! 
//! Domain entities for the invoice backend.

pub mod user;

pub use user::{PublicUser, ResetTokenRecord, User};
