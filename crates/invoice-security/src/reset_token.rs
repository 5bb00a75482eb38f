//! Password reset tokens
//!
//! A reset token is 256 random bits, hex encoded. Only its keyed hash
//! (HMAC-SHA256) is ever stored, so a leaked table cannot be replayed
//! without the server-side key.

use hmac::{Hmac, Mac};
use invoice_shared::constants::RESET_TOKEN_BYTES;
use rand::Rng;
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

#[derive(Error, Debug)]
pub enum ResetTokenError {
    #[error("Invalid reset token key: {0}")]
    InvalidKey(String),
}

/// A freshly generated token: `plaintext` goes to the user, `hash` to the store.
#[derive(Debug, Clone)]
pub struct IssuedResetToken {
    pub plaintext: String,
    pub hash: String,
}

#[derive(Clone)]
pub struct ResetTokenHasher {
    mac: HmacSha256,
}

impl ResetTokenHasher {
    pub fn new(key: &str) -> Result<Self, ResetTokenError> {
        let mac = HmacSha256::new_from_slice(key.as_bytes())
            .map_err(|e| ResetTokenError::InvalidKey(e.to_string()))?;
        Ok(Self { mac })
    }

    pub fn issue(&self) -> IssuedResetToken {
        let mut bytes = [0u8; RESET_TOKEN_BYTES];
        rand::rng().fill(&mut bytes);
        let plaintext = hex::encode(bytes);
        let hash = self.hash(&plaintext);
        IssuedResetToken { plaintext, hash }
    }

    pub fn hash(&self, token: &str) -> String {
        let mut mac = self.mac.clone();
        mac.update(token.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }
}
