//! Reply Types
//!
//! Every command produces exactly one [`Reply`], sent back as a single
//! newline-terminated line.
//!
//! ## Wire Format
//!
//! ```text
//! OK                 command succeeded
//! PONG               answer to PING
//! NULL               key absent or expired
//! ERROR              bad arity, bad TTL, wrong kind, unknown verb
//! UNAUTHORIZED       handshake password rejected
//! "value"            scalar value
//! "a" "b" "c"        list value
//! ```

use bytes::{BufMut, Bytes, BytesMut};
use std::fmt;

/// Line terminator appended to every reply.
pub const LINE_END: u8 = b'\n';

/// A reply to a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Ok,
    Pong,
    Null,
    Error,
    Unauthorized,
    /// A scalar value, rendered quoted.
    Scalar(String),
    /// A list value, rendered as space-separated quoted elements.
    List(Vec<String>),
}

impl Reply {
    /// Creates a scalar reply.
    pub fn scalar(value: impl Into<String>) -> Self {
        Reply::Scalar(value.into())
    }

    /// Creates a list reply.
    pub fn list<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Reply::List(values.into_iter().map(Into::into).collect())
    }

    /// Serializes the reply into a newline-terminated line.
    ///
    /// # Example
    /// ```
    /// use datastacks::protocol::Reply;
    ///
    /// assert_eq!(&Reply::list(["a", "b"]).serialize()[..], b"\"a\" \"b\"\n");
    /// ```
    pub fn serialize(&self) -> Bytes {
        let text = self.to_string();
        let mut buf = BytesMut::with_capacity(text.len() + 1);
        buf.put_slice(text.as_bytes());
        buf.put_u8(LINE_END);
        buf.freeze()
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Ok => f.write_str("OK"),
            Reply::Pong => f.write_str("PONG"),
            Reply::Null => f.write_str("NULL"),
            Reply::Error => f.write_str("ERROR"),
            Reply::Unauthorized => f.write_str("UNAUTHORIZED"),
            Reply::Scalar(value) => write!(f, "\"{}\"", value),
            Reply::List(values) => {
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "\"{}\"", value)?;
                }
                Ok(())
            }
        }
    }
}
