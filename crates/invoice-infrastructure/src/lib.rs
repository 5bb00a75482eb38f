//! # Invoice Infrastructure
//! 
//! Adapters for the core ports: credential stores, mail transports and the
//! PDF renderer.

pub mod database;
pub mod error;
pub mod mail;
pub mod render;

pub use database::{create_pool, run_migrations, InMemoryUserRepository, PgUserRepository};
pub use error::InfraError;
pub use mail::{LogMailer, SmtpMailer};
pub use render::ChromiumPdfRenderer;
