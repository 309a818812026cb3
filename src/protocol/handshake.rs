//! Handshake Message
//!
//! The first line a client sends is a JSON object carrying the shared
//! password. Fields other than `password` are ignored.
//!
//! ```text
//! {"password": "123"}
//! ```

use serde::Deserialize;
use thiserror::Error;

/// Errors that make a handshake line unusable.
#[derive(Debug, Error)]
pub enum HandshakeError {
    /// The line is not a JSON object with a string `password` field
    #[error("malformed handshake: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// The decoded handshake message.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Handshake {
    pub password: String,
}

impl Handshake {
    /// Decodes a handshake line.
    ///
    /// # Example
    ///
    /// ```
    /// use datastacks::protocol::Handshake;
    ///
    /// let hello = Handshake::parse(r#"{"password": "123", "client": "shell"}"#).unwrap();
    /// assert_eq!(hello.password, "123");
    /// ```
    pub fn parse(line: &str) -> Result<Self, HandshakeError> {
        Ok(serde_json::from_str(line.trim())?)
    }
}
