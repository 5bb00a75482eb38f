//! Application-wide constants

pub const DEFAULT_SESSION_TOKEN_EXPIRY: &str = "1h";
pub const DEFAULT_RESET_TOKEN_TTL_SECONDS: i64 = 15 * 60;
pub const RESET_TOKEN_BYTES: usize = 32;
pub const LOGIN_MAX_ATTEMPTS: u32 = 10;
pub const LOGIN_WINDOW_SECONDS: u64 = 15 * 60;
pub const DEFAULT_FRONTEND_URL: &str = "https://client-invoice-gen.vercel.app";
pub const DEFAULT_BODY_LIMIT_BYTES: usize = 10 * 1024 * 1024;
