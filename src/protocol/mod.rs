//! Text Protocol Implementation
//!
//! DataStacks speaks a newline-delimited text protocol:
//!
//! 1. The client sends one JSON handshake line carrying the password.
//! 2. The server answers `OK` (or `UNAUTHORIZED` and closes).
//! 3. The client sends one command per line; the server answers one line each.
//!
//! ## Modules
//!
//! - `tokenizer`: Splits a command line into tokens, honoring double quotes
//! - `types`: Defines the `Reply` enum and its line serialization
//! - `handshake`: Decodes the JSON handshake message
//!
//! ## Example
//!
//! ```
//! use datastacks::protocol::{tokenize, Reply};
//!
//! let tokens = tokenize(r#"SET greeting "hello world""#);
//! assert_eq!(tokens, vec!["SET", "greeting", "hello world"]);
//!
//! let reply = Reply::scalar("hello world");
//! assert_eq!(&reply.serialize()[..], b"\"hello world\"\n");
//! ```

pub mod handshake;
pub mod tokenizer;
pub mod types;

// Re-export commonly used types for convenience
pub use handshake::{Handshake, HandshakeError};
pub use tokenizer::tokenize;
pub use types::Reply;
