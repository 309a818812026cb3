//! Command Handler Module
//!
//! This module implements every DataStacks command. It tokenizes an incoming
//! line, validates arity, runs the command against the storage engine, and
//! returns the [`Reply`] to send back.
//!
//! ## Supported Commands
//!
//! - `GET key` - Get a key's value (`NULL` if absent or expired)
//! - `SET key value [value ...]` - Set a scalar, or a list when given several values
//! - `SETEX key seconds value [value ...]` - Like SET, with a TTL (0 = never expires)
//! - `PUSHBACK key value [value ...]` - Append to a list, creating it if needed
//! - `PUSHFRONT key value [value ...]` - Prepend to a list, creating it if needed
//! - `DEL key` - Delete a key (always `OK`)
//! - `PING` - Liveness check
//! - `DROPALL` - Delete every key
//!
//! Verbs are case-sensitive. Every failure is answered with `ERROR` and the
//! connection stays open.

use crate::protocol::{tokenize, Reply};
use crate::storage::{StorageEngine, StorageError, Value};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, trace};

/// Reasons a command is answered with `ERROR`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// The line contained no tokens
    #[error("empty command")]
    Empty,

    /// Too few tokens for the verb
    #[error("wrong number of arguments for '{0}' command")]
    WrongArity(String),

    /// SETEX seconds is not a non-negative integer
    #[error("invalid expire time '{0}'")]
    InvalidTtl(String),

    /// The storage engine rejected the operation
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Verb not recognized
    #[error("unknown command '{0}'")]
    Unknown(String),
}

/// Executes command lines against a shared storage engine.
#[derive(Clone)]
pub struct CommandHandler {
    storage: Arc<StorageEngine>,
}

impl CommandHandler {
    /// Creates a new command handler with the given storage engine.
    pub fn new(storage: Arc<StorageEngine>) -> Self {
        Self { storage }
    }

    /// Executes one command line and returns the reply.
    pub fn execute(&self, line: &str) -> Reply {
        let tokens = tokenize(line);

        match self.dispatch(&tokens) {
            Ok(reply) => {
                trace!(command = %line, reply = %reply, "Command executed");
                reply
            }
            Err(e) => {
                debug!(command = %line, error = %e, "Command failed");
                Reply::Error
            }
        }
    }

    /// Dispatches a tokenized command to its handler.
    pub fn dispatch(&self, tokens: &[String]) -> Result<Reply, CommandError> {
        let (verb, args) = tokens.split_first().ok_or(CommandError::Empty)?;

        // Every command takes a key except the two single-token ones
        if args.is_empty() && !matches!(verb.as_str(), "PING" | "DROPALL") {
            return Err(CommandError::WrongArity(verb.clone()));
        }

        match verb.as_str() {
            "GET" => self.cmd_get(args),
            "SET" => self.cmd_set(args),
            "SETEX" => self.cmd_setex(args),
            "PUSHBACK" => self.cmd_pushback(args),
            "PUSHFRONT" => self.cmd_pushfront(args),
            "DEL" => self.cmd_del(args),
            "PING" => Ok(Reply::Pong),
            "DROPALL" => self.cmd_dropall(),
            _ => Err(CommandError::Unknown(verb.clone())),
        }
    }

    /// Stores `values` under `key`: one value makes a scalar, more make a list.
    fn store(&self, key: &str, values: &[String], ttl: Duration) {
        match values {
            [value] => self.storage.set_scalar(key.to_string(), value.clone(), ttl),
            _ => self.storage.set_list(key.to_string(), values.to_vec(), ttl),
        };
    }

    /// GET key
    fn cmd_get(&self, args: &[String]) -> Result<Reply, CommandError> {
        let reply = match self.storage.get(&args[0]) {
            None => Reply::Null,
            Some(Value::Scalar(value)) => Reply::Scalar(value),
            Some(Value::List(values)) => Reply::List(values.into()),
        };
        Ok(reply)
    }

    /// SET key value [value ...]
    fn cmd_set(&self, args: &[String]) -> Result<Reply, CommandError> {
        let [key, values @ ..] = args else {
            return Err(CommandError::WrongArity("SET".into()));
        };
        if values.is_empty() {
            return Err(CommandError::WrongArity("SET".into()));
        }

        self.store(key, values, Duration::ZERO);
        Ok(Reply::Ok)
    }

    /// SETEX key seconds value [value ...]
    fn cmd_setex(&self, args: &[String]) -> Result<Reply, CommandError> {
        let [key, seconds, values @ ..] = args else {
            return Err(CommandError::WrongArity("SETEX".into()));
        };
        if values.is_empty() {
            return Err(CommandError::WrongArity("SETEX".into()));
        }

        let secs: u64 = seconds
            .parse()
            .map_err(|_| CommandError::InvalidTtl(seconds.clone()))?;

        self.store(key, values, Duration::from_secs(secs));
        debug!(key = %key, ttl_secs = secs, "Set with expiry");
        Ok(Reply::Ok)
    }

    /// PUSHBACK key value [value ...]
    ///
    /// Extra values only matter when the push creates the list.
    fn cmd_pushback(&self, args: &[String]) -> Result<Reply, CommandError> {
        let (key, values) = Self::push_args("PUSHBACK", args)?;
        self.storage.push_back(key, values)?;
        Ok(Reply::Ok)
    }

    /// PUSHFRONT key value [value ...]
    fn cmd_pushfront(&self, args: &[String]) -> Result<Reply, CommandError> {
        let (key, values) = Self::push_args("PUSHFRONT", args)?;
        self.storage.push_front(key, values)?;
        Ok(Reply::Ok)
    }

    fn push_args(verb: &str, args: &[String]) -> Result<(String, Vec<String>), CommandError> {
        match args {
            [key, values @ ..] if !values.is_empty() => Ok((key.clone(), values.to_vec())),
            _ => Err(CommandError::WrongArity(verb.into())),
        }
    }

    /// DEL key
    fn cmd_del(&self, args: &[String]) -> Result<Reply, CommandError> {
        self.storage.delete(&args[0]);
        Ok(Reply::Ok)
    }

    /// DROPALL
    fn cmd_dropall(&self) -> Result<Reply, CommandError> {
        self.storage.clear();
        debug!("Store cleared");
        Ok(Reply::Ok)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_handler() -> CommandHandler {
        let storage = Arc::new(StorageEngine::new());
        CommandHandler::new(storage)
    }

    fn tokens(line: &str) -> Vec<String> {
        tokenize(line)
    }

    #[test]
    fn test_ping() {
        let handler = create_handler();

        assert_eq!(handler.execute("PING"), Reply::Pong);
        assert_eq!(handler.execute("PING extra"), Reply::Pong);
    }

    #[test]
    fn test_set_get() {
        let handler = create_handler();

        assert_eq!(handler.execute(r#"SET foo "bar""#), Reply::Ok);
        assert_eq!(handler.execute("GET foo"), Reply::scalar("bar"));
        assert_eq!(handler.execute("GET foo").to_string(), "\"bar\"");
    }

    #[test]
    fn test_set_quoted_value_with_spaces() {
        let handler = create_handler();

        handler.execute(r#"SET greeting "hello world""#);
        assert_eq!(handler.execute("GET greeting"), Reply::scalar("hello world"));
    }

    #[test]
    fn test_set_many_values_makes_list() {
        let handler = create_handler();

        assert_eq!(handler.execute(r#"SET key "a" "b" c"#), Reply::Ok);
        assert_eq!(handler.execute("GET key"), Reply::list(["a", "b", "c"]));
        assert_eq!(handler.execute("GET key").to_string(), r#""a" "b" "c""#);
    }

    #[test]
    fn test_get_nonexistent() {
        let handler = create_handler();
        assert_eq!(handler.execute("GET nonexistent"), Reply::Null);
    }

    #[test]
    fn test_setex() {
        let handler = create_handler();

        assert_eq!(handler.execute(r#"SETEX t 100 "x""#), Reply::Ok);
        assert_eq!(handler.execute("GET t"), Reply::scalar("x"));

        assert_eq!(handler.execute("SETEX l 100 a b"), Reply::Ok);
        assert_eq!(handler.execute("GET l"), Reply::list(["a", "b"]));
    }

    #[test]
    fn test_setex_zero_never_expires() {
        let handler = create_handler();

        assert_eq!(handler.execute("SETEX t 0 x"), Reply::Ok);
        assert_eq!(handler.execute("GET t"), Reply::scalar("x"));
    }

    #[test]
    fn test_setex_invalid_ttl() {
        let handler = create_handler();

        assert_eq!(handler.execute("SETEX t abc x"), Reply::Error);
        assert_eq!(handler.execute("SETEX t -1 x"), Reply::Error);
        assert_eq!(handler.execute("SETEX t 10abc x"), Reply::Error);
        assert_eq!(
            handler.dispatch(&tokens("SETEX t 1.5 x")),
            Err(CommandError::InvalidTtl("1.5".into()))
        );
        assert_eq!(handler.execute("GET t"), Reply::Null);
    }

    #[test]
    fn test_setex_arity() {
        let handler = create_handler();

        assert_eq!(
            handler.dispatch(&tokens("SETEX t 10")),
            Err(CommandError::WrongArity("SETEX".into()))
        );
        assert_eq!(handler.execute("SETEX t"), Reply::Error);
    }

    #[test]
    fn test_pushback_scenario() {
        let handler = create_handler();

        assert_eq!(handler.execute(r#"PUSHBACK list "a""#), Reply::Ok);
        assert_eq!(handler.execute(r#"PUSHBACK list "b""#), Reply::Ok);
        assert_eq!(handler.execute("GET list").to_string(), r#""a" "b""#);

        assert_eq!(handler.execute("DEL list"), Reply::Ok);
        assert_eq!(handler.execute("GET list"), Reply::Null);
    }

    #[test]
    fn test_pushfront() {
        let handler = create_handler();

        handler.execute("PUSHFRONT list a");
        handler.execute("PUSHFRONT list b");
        handler.execute("PUSHBACK list c");
        assert_eq!(handler.execute("GET list"), Reply::list(["b", "a", "c"]));
    }

    #[test]
    fn test_push_creates_list_from_every_value() {
        let handler = create_handler();

        assert_eq!(handler.execute("PUSHFRONT list x y z"), Reply::Ok);
        assert_eq!(handler.execute("GET list"), Reply::list(["x", "y", "z"]));
    }

    #[test]
    fn test_push_onto_list_uses_first_value() {
        let handler = create_handler();

        handler.execute("PUSHBACK list c");
        assert_eq!(handler.execute("PUSHBACK list a b"), Reply::Ok);
        assert_eq!(handler.execute("GET list"), Reply::list(["c", "a"]));

        assert_eq!(handler.execute("PUSHFRONT list x y"), Reply::Ok);
        assert_eq!(handler.execute("GET list"), Reply::list(["x", "c", "a"]));
    }

    #[test]
    fn test_push_onto_scalar_is_error() {
        let handler = create_handler();

        handler.execute("SET key value");
        assert_eq!(handler.execute("PUSHBACK key a"), Reply::Error);
        assert_eq!(
            handler.dispatch(&tokens("PUSHFRONT key a")),
            Err(CommandError::Storage(StorageError::TypeMismatch("scalar")))
        );
        assert_eq!(handler.execute("GET key"), Reply::scalar("value"));
    }

    #[test]
    fn test_set_replaces_list() {
        let handler = create_handler();

        handler.execute("PUSHBACK key a");
        handler.execute("SET key plain");
        assert_eq!(handler.execute("GET key"), Reply::scalar("plain"));
    }

    #[test]
    fn test_del_absent_is_ok() {
        let handler = create_handler();
        assert_eq!(handler.execute("DEL missing"), Reply::Ok);
    }

    #[test]
    fn test_dropall() {
        let handler = create_handler();

        handler.execute("SET key1 value1");
        handler.execute("PUSHBACK key2 a");

        assert_eq!(handler.execute("DROPALL"), Reply::Ok);
        assert_eq!(handler.execute("GET key1"), Reply::Null);
        assert_eq!(handler.execute("GET key2"), Reply::Null);
    }

    #[test]
    fn test_arity_errors() {
        let handler = create_handler();

        assert_eq!(handler.execute("GET"), Reply::Error);
        assert_eq!(handler.execute("SET key"), Reply::Error);
        assert_eq!(handler.execute("PUSHBACK key"), Reply::Error);
        assert_eq!(handler.execute("PUSHFRONT key"), Reply::Error);
        assert_eq!(handler.execute("DEL"), Reply::Error);
        assert_eq!(
            handler.dispatch(&tokens("SET key")),
            Err(CommandError::WrongArity("SET".into()))
        );
    }

    #[test]
    fn test_empty_line() {
        let handler = create_handler();

        assert_eq!(handler.execute(""), Reply::Error);
        assert_eq!(handler.dispatch(&[]), Err(CommandError::Empty));
    }

    #[test]
    fn test_verbs_are_case_sensitive() {
        let handler = create_handler();

        assert_eq!(handler.execute("ping"), Reply::Error);
        assert_eq!(
            handler.dispatch(&tokens("get key")),
            Err(CommandError::Unknown("get".into()))
        );
    }

    #[test]
    fn test_unknown_command() {
        let handler = create_handler();

        assert_eq!(handler.execute("INCR counter"), Reply::Error);
        assert_eq!(
            handler.dispatch(&tokens("FLUSH everything")),
            Err(CommandError::Unknown("FLUSH".into()))
        );
    }
}
