//! Connection Handler Module
//!
//! This module handles individual client sessions. Each client gets its own
//! handler task that authenticates the client and then runs a loop, reading
//! command lines and sending replies.
//!
//! ## Session Lifecycle
//!
//! ```text
//! 1. Client connects (Unauthenticated)
//!        │
//!        ▼
//! 2. Read one handshake line: {"password": "..."}
//!        │
//!        ├── not JSON / no password ──> close, no reply
//!        ├── wrong password ──────────> "UNAUTHORIZED", close
//!        │
//!        ▼
//! 3. "OK" (Authenticated)
//!        │
//!        ▼
//! 4. ┌──────────────────────────────┐
//!    │  read line -> execute ->     │
//!    │  send reply -> loop back     │
//!    └──────────────────────────────┘
//!        │
//!        ▼
//! 5. Client disconnects / reset / error -> handler task ends
//! ```
//!
//! ## Buffer Management
//!
//! Incoming bytes accumulate in a `BytesMut` until a `\n` completes a line.
//! A trailing `\r` is dropped, so `\r\n` clients work too. Bytes left over
//! when the client half-closes are treated as one final line.

use crate::auth::AuthGate;
use crate::commands::CommandHandler;
use crate::protocol::{Handshake, HandshakeError, Reply};
use bytes::BytesMut;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufWriter};
use tokio::net::TcpStream;
use tracing::{debug, info, trace, warn};

/// Maximum length of a single line (64 KB)
const MAX_LINE_LENGTH: usize = 64 * 1024;

/// Initial buffer capacity
const INITIAL_BUFFER_SIZE: usize = 4096;

/// Statistics for connection handling
#[derive(Debug, Default)]
pub struct ConnectionStats {
    /// Total number of connections accepted
    pub connections_accepted: AtomicU64,
    /// Currently active connections
    pub active_connections: AtomicU64,
    /// Total commands processed
    pub commands_processed: AtomicU64,
    /// Handshakes rejected for a wrong password
    pub auth_failures: AtomicU64,
    /// Total bytes read
    pub bytes_read: AtomicU64,
    /// Total bytes written
    pub bytes_written: AtomicU64,
}

impl ConnectionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connection_opened(&self) {
        self.connections_accepted.fetch_add(1, Ordering::Relaxed);
        self.active_connections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn connection_closed(&self) {
        self.active_connections.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn command_processed(&self) {
        self.commands_processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn auth_failed(&self) {
        self.auth_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn bytes_read(&self, count: usize) {
        self.bytes_read.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn bytes_written(&self, count: usize) {
        self.bytes_written
            .fetch_add(count as u64, Ordering::Relaxed);
    }
}

/// Authentication state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Authenticated,
}

/// Handles a single client session.
///
/// Generic over the transport so sessions can run over TCP or any other
/// byte stream.
pub struct ConnectionHandler<S> {
    /// The transport for this session
    stream: BufWriter<S>,

    /// Client's address (for logging)
    addr: SocketAddr,

    /// Buffer for incoming data
    buffer: BytesMut,

    /// The command handler (shares the storage engine)
    command_handler: CommandHandler,

    /// Server-wide password gate
    auth: Arc<AuthGate>,

    /// Connection statistics (shared)
    stats: Arc<ConnectionStats>,

    state: SessionState,

    /// Commands processed on this session
    commands_processed: u64,
}

impl<S> ConnectionHandler<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Creates a new session handler in the `Unauthenticated` state.
    pub fn new(
        stream: S,
        addr: SocketAddr,
        command_handler: CommandHandler,
        auth: Arc<AuthGate>,
        stats: Arc<ConnectionStats>,
    ) -> Self {
        stats.connection_opened();

        Self {
            stream: BufWriter::new(stream),
            addr,
            buffer: BytesMut::with_capacity(INITIAL_BUFFER_SIZE),
            command_handler,
            auth,
            stats,
            state: SessionState::Unauthenticated,
            commands_processed: 0,
        }
    }

    /// Returns the current authentication state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Runs the session until the client disconnects or an error occurs.
    ///
    /// A connection reset by the peer counts as a graceful disconnect.
    pub async fn run(mut self) -> Result<(), ConnectionError> {
        info!(client = %self.addr, "Client connected");

        let result = match self.serve().await {
            Err(ConnectionError::IoError(e)) if e.kind() == std::io::ErrorKind::ConnectionReset => {
                debug!(client = %self.addr, "Connection reset by client");
                Ok(())
            }
            other => other,
        };

        match &result {
            Ok(()) => info!(
                client = %self.addr,
                commands = self.commands_processed,
                "Client disconnected"
            ),
            Err(e @ (ConnectionError::Handshake(_) | ConnectionError::AuthenticationFailed)) => {
                info!(client = %self.addr, error = %e, "Client rejected")
            }
            Err(e) => warn!(
                client = %self.addr,
                commands = self.commands_processed,
                error = %e,
                "Connection error"
            ),
        }

        self.stats.connection_closed();
        result
    }

    async fn serve(&mut self) -> Result<(), ConnectionError> {
        let Some(hello) = self.read_line().await? else {
            return Ok(());
        };
        self.authenticate(&hello).await?;

        while let Some(line) = self.read_line().await? {
            let reply = self.command_handler.execute(&line);
            self.commands_processed += 1;
            self.stats.command_processed();

            self.send_reply(&reply).await?;
        }

        Ok(())
    }

    /// Checks the handshake line and moves the session to `Authenticated`.
    async fn authenticate(&mut self, line: &str) -> Result<(), ConnectionError> {
        let hello = Handshake::parse(line)?;

        if !self.auth.verify(&hello.password) {
            self.stats.auth_failed();
            self.send_reply(&Reply::Unauthorized).await?;
            return Err(ConnectionError::AuthenticationFailed);
        }

        self.state = SessionState::Authenticated;
        debug!(client = %self.addr, "Client authorized");
        self.send_reply(&Reply::Ok).await
    }

    /// Reads the next line, without its terminator.
    ///
    /// Returns `None` once the client has closed its side and no bytes remain.
    async fn read_line(&mut self) -> Result<Option<String>, ConnectionError> {
        loop {
            if let Some(line) = self.take_line() {
                trace!(client = %self.addr, line = %line, "Read line");
                return Ok(Some(line));
            }

            if self.buffer.len() >= MAX_LINE_LENGTH {
                return Err(ConnectionError::LineTooLong(self.buffer.len()));
            }

            if self.buffer.capacity() - self.buffer.len() < 1024 {
                self.buffer.reserve(INITIAL_BUFFER_SIZE);
            }

            let n = self.stream.get_mut().read_buf(&mut self.buffer).await?;

            if n == 0 {
                if self.buffer.is_empty() {
                    return Ok(None);
                }
                // Final line without terminator
                let rest = self.buffer.split();
                return Ok(Some(decode_line(&rest)));
            }

            self.stats.bytes_read(n);
        }
    }

    /// Removes one complete line from the buffer, if there is one.
    fn take_line(&mut self) -> Option<String> {
        let end = self.buffer.iter().position(|&b| b == b'\n')?;
        let line = self.buffer.split_to(end + 1);
        Some(decode_line(&line[..end]))
    }

    /// Sends a reply to the client.
    async fn send_reply(&mut self, reply: &Reply) -> Result<(), ConnectionError> {
        let bytes = reply.serialize();
        self.stream.write_all(&bytes).await?;
        self.stream.flush().await?;
        self.stats.bytes_written(bytes.len());
        trace!(client = %self.addr, reply = %reply, "Sent reply");
        Ok(())
    }
}

fn decode_line(bytes: &[u8]) -> String {
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}

/// Errors that end a session.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    /// I/O error (network issue)
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The handshake line could not be decoded
    #[error(transparent)]
    Handshake(#[from] HandshakeError),

    /// The handshake password did not match
    #[error("authentication failed")]
    AuthenticationFailed,

    /// A line exceeded the maximum length
    #[error("line too long: {0} bytes buffered without a terminator")]
    LineTooLong(usize),
}

/// Handles a client connection.
///
/// This is a convenience function that creates a ConnectionHandler
/// and runs it to completion. Errors are logged by the handler.
pub async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    command_handler: CommandHandler,
    auth: Arc<AuthGate>,
    stats: Arc<ConnectionStats>,
) {
    let handler = ConnectionHandler::new(stream, addr, command_handler, auth, stats);
    let _ = handler.run().await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StorageEngine;
    use tokio::io::{AsyncBufReadExt, BufReader};
    use tokio::net::TcpListener;
    use tokio_test::io::Builder;

    const PASSWORD: &str = "123";
    const HELLO: &[u8] = b"{\"password\": \"123\"}\n";

    fn client_addr() -> SocketAddr {
        "127.0.0.1:50000".parse().unwrap()
    }

    fn session<S>(stream: S, stats: Arc<ConnectionStats>) -> ConnectionHandler<S>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let handler = CommandHandler::new(Arc::new(StorageEngine::new()));
        let auth = Arc::new(AuthGate::new(PASSWORD));
        ConnectionHandler::new(stream, client_addr(), handler, auth, stats)
    }

    #[tokio::test]
    async fn test_handshake_then_commands() {
        let mock = Builder::new()
            .read(HELLO)
            .write(b"OK\n")
            .read(b"SET foo \"bar\"\n")
            .write(b"OK\n")
            .read(b"GET foo\n")
            .write(b"\"bar\"\n")
            .read(b"PING\n")
            .write(b"PONG\n")
            .build();

        let stats = Arc::new(ConnectionStats::new());
        session(mock, Arc::clone(&stats)).run().await.unwrap();

        assert_eq!(stats.commands_processed.load(Ordering::Relaxed), 3);
        assert_eq!(stats.active_connections.load(Ordering::Relaxed), 0);
    }

    #[tokio::test]
    async fn test_wrong_password_replies_unauthorized_and_closes() {
        let mock = Builder::new()
            .read(b"{\"password\": \"nope\"}\n")
            .write(b"UNAUTHORIZED\n")
            .build();

        let stats = Arc::new(ConnectionStats::new());
        let result = session(mock, Arc::clone(&stats)).run().await;

        assert!(matches!(result, Err(ConnectionError::AuthenticationFailed)));
        assert_eq!(stats.auth_failures.load(Ordering::Relaxed), 1);
        assert_eq!(stats.commands_processed.load(Ordering::Relaxed), 0);
    }

    #[tokio::test]
    async fn test_malformed_handshake_closes_without_reply() {
        let mock = Builder::new().read(b"PING\n").build();

        let result = session(mock, Arc::new(ConnectionStats::new())).run().await;
        assert!(matches!(result, Err(ConnectionError::Handshake(_))));
    }

    #[tokio::test]
    async fn test_missing_password_field_closes_without_reply() {
        let mock = Builder::new().read(b"{\"pass\": \"123\"}\n").build();

        let result = session(mock, Arc::new(ConnectionStats::new())).run().await;
        assert!(matches!(result, Err(ConnectionError::Handshake(_))));
    }

    #[tokio::test]
    async fn test_disconnect_before_handshake() {
        let mock = Builder::new().build();

        let handler = session(mock, Arc::new(ConnectionStats::new()));
        assert_eq!(handler.state(), SessionState::Unauthenticated);
        assert!(handler.run().await.is_ok());
    }

    #[tokio::test]
    async fn test_lines_split_across_reads() {
        let mock = Builder::new()
            .read(b"{\"password\":")
            .read(b" \"123\"}\r\n")
            .write(b"OK\n")
            .read(b"PI")
            .read(b"NG\r\nGET missing\n")
            .write(b"PONG\n")
            .write(b"NULL\n")
            .build();

        session(mock, Arc::new(ConnectionStats::new()))
            .run()
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_final_line_without_terminator() {
        let mock = Builder::new()
            .read(HELLO)
            .write(b"OK\n")
            .read(b"PING")
            .write(b"PONG\n")
            .build();

        session(mock, Arc::new(ConnectionStats::new()))
            .run()
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_command_errors_keep_session_open() {
        let mock = Builder::new()
            .read(HELLO)
            .write(b"OK\n")
            .read(b"GET\n")
            .write(b"ERROR\n")
            .read(b"BOGUS key\n")
            .write(b"ERROR\n")
            .read(b"SETEX k soon v\n")
            .write(b"ERROR\n")
            .read(b"PING\n")
            .write(b"PONG\n")
            .build();

        session(mock, Arc::new(ConnectionStats::new()))
            .run()
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_connection_reset_is_graceful() {
        let mock = Builder::new()
            .read(HELLO)
            .write(b"OK\n")
            .read_error(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "reset",
            ))
            .build();

        assert!(session(mock, Arc::new(ConnectionStats::new()))
            .run()
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_line_too_long() {
        let long = vec![b'a'; MAX_LINE_LENGTH];
        let mock = Builder::new().read(HELLO).write(b"OK\n").read(&long).build();

        let result = session(mock, Arc::new(ConnectionStats::new())).run().await;
        assert!(matches!(result, Err(ConnectionError::LineTooLong(_))));
    }

    async fn create_test_server() -> (SocketAddr, Arc<StorageEngine>, Arc<ConnectionStats>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let storage = Arc::new(StorageEngine::new());
        let stats = Arc::new(ConnectionStats::new());
        let auth = Arc::new(AuthGate::new(PASSWORD));

        let storage_clone = Arc::clone(&storage);
        let stats_clone = Arc::clone(&stats);

        tokio::spawn(async move {
            while let Ok((stream, client_addr)) = listener.accept().await {
                let handler = CommandHandler::new(Arc::clone(&storage_clone));
                tokio::spawn(handle_connection(
                    stream,
                    client_addr,
                    handler,
                    Arc::clone(&auth),
                    Arc::clone(&stats_clone),
                ));
            }
        });

        (addr, storage, stats)
    }

    async fn request(
        reader: &mut BufReader<tokio::net::tcp::OwnedReadHalf>,
        writer: &mut tokio::net::tcp::OwnedWriteHalf,
        line: &str,
    ) -> String {
        writer.write_all(format!("{}\n", line).as_bytes()).await.unwrap();
        let mut reply = String::new();
        reader.read_line(&mut reply).await.unwrap();
        reply.trim_end().to_string()
    }

    #[tokio::test]
    async fn test_concurrent_clients_share_store() {
        let (addr, storage, stats) = create_test_server().await;

        let mut tasks = Vec::new();
        for i in 0..8 {
            tasks.push(tokio::spawn(async move {
                let (read_half, mut writer) = TcpStream::connect(addr).await.unwrap().into_split();
                let mut reader = BufReader::new(read_half);

                let hello = r#"{"password": "123"}"#;
                assert_eq!(request(&mut reader, &mut writer, hello).await, "OK");
                for j in 0..25 {
                    let line = format!("PUSHBACK shared c{}-{}", i, j);
                    assert_eq!(request(&mut reader, &mut writer, &line).await, "OK");
                }
            }));
        }

        for task in tasks {
            task.await.unwrap();
        }

        match storage.get("shared") {
            Some(crate::storage::Value::List(items)) => assert_eq!(items.len(), 200),
            other => panic!("expected a list, got {:?}", other),
        }
        assert_eq!(stats.connections_accepted.load(Ordering::Relaxed), 8);
        assert_eq!(stats.commands_processed.load(Ordering::Relaxed), 200);
    }
}
