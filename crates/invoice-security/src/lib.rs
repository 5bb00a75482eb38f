//! # Invoice Security
//! 
//! Security utilities: session token codec, password hashing, reset tokens.

pub mod jwt;
pub mod password;
pub mod reset_token;

pub use jwt::{JwtService, SessionClaims, SessionIdentity};
pub use password::PasswordService;
pub use reset_token::{IssuedResetToken, ResetTokenHasher};
