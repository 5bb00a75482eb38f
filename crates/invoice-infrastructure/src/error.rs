//! Adapter setup errors

use thiserror::Error;

#[derive(Error, Debug)]
pub enum InfraError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Mail transport error: {0}")]
    Mail(String),

    #[error("Renderer client error: {0}")]
    Renderer(String),
}
