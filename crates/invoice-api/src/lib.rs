//! # Invoice API
//! 
//! HTTP handlers, middleware, DTOs and the router.

pub mod dto;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::{build_router, HttpSettings};
pub use state::AppState;
