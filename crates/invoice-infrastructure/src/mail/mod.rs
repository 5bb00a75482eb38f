//! Mail transports

pub mod log;
pub mod smtp;

pub use log::LogMailer;
pub use smtp::SmtpMailer;
