//! Server Configuration
//!
//! Every option can be given as a command-line flag or through its
//! environment variable; flags win over the environment.
//!
//! | Flag                  | Environment                    | Default   |
//! |-----------------------|--------------------------------|-----------|
//! | `--host`              | `DATASTACKS_HOST`              | `0.0.0.0` |
//! | `--port`, `-p`        | `DATASTACKS_PORT`              | `3008`    |
//! | `--password`          | `DATASTACKS_PASSWORD`          | `123`     |
//! | `--sweep-interval-ms` | `DATASTACKS_SWEEP_INTERVAL_MS` | `0` (off) |

use crate::{DEFAULT_HOST, DEFAULT_PASSWORD, DEFAULT_PORT};
use clap::Parser;
use std::time::Duration;

/// Server configuration
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(
    name = "datastacks",
    version,
    about = "DataStacks - a password-gated in-memory key-value store"
)]
pub struct Config {
    /// Host to bind to
    #[arg(long, env = "DATASTACKS_HOST", default_value = DEFAULT_HOST)]
    pub host: String,

    /// Port to listen on
    #[arg(long, short, env = "DATASTACKS_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Shared password clients must present in their handshake
    #[arg(
        long,
        env = "DATASTACKS_PASSWORD",
        default_value = DEFAULT_PASSWORD,
        hide_env_values = true,
        hide_default_value = true
    )]
    pub password: String,

    /// Milliseconds between background sweeps of expired keys (0 disables sweeping)
    #[arg(long, env = "DATASTACKS_SWEEP_INTERVAL_MS", default_value_t = 0)]
    pub sweep_interval_ms: u64,
}

impl Config {
    /// Returns the bind address as a string
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Returns the sweep interval (zero when sweeping is disabled)
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_millis(self.sweep_interval_ms)
    }
}
