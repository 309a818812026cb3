//! DataStacks interactive client.
//!
//! Connects, authenticates, then either runs a single command given on the
//! command line or opens a `[datastacks] >` prompt.

use std::io::Write;
use std::time::Instant;

use anyhow::{bail, Context};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;

use datastacks::{DEFAULT_PASSWORD, DEFAULT_PORT};

#[derive(Parser, Debug)]
#[command(name = "datastacks-cli", about = "DataStacks CLI client")]
struct Args {
    #[arg(long, env = "DATASTACKS_HOST", default_value = "localhost")]
    host: String,
    #[arg(long, short, env = "DATASTACKS_PORT", default_value_t = DEFAULT_PORT)]
    port: u16,
    #[arg(long, env = "DATASTACKS_PASSWORD", default_value = DEFAULT_PASSWORD, hide_env_values = true)]
    password: String,

    /// Command to run directly (non-interactive mode)
    #[arg(trailing_var_arg = true)]
    command: Vec<String>,
}

struct Client {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl Client {
    async fn connect(addr: &str, password: &str) -> anyhow::Result<Self> {
        let stream = TcpStream::connect(addr)
            .await
            .with_context(|| format!("could not connect to {addr}"))?;
        let (read_half, writer) = stream.into_split();
        let mut client = Self {
            reader: BufReader::new(read_half),
            writer,
        };

        let hello = serde_json::json!({ "password": password }).to_string();
        match client.request(&hello).await?.as_str() {
            "OK" => Ok(client),
            other => bail!("authentication failed: {other}"),
        }
    }

    async fn request(&mut self, line: &str) -> anyhow::Result<String> {
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await?;

        let mut reply = String::new();
        if self.reader.read_line(&mut reply).await? == 0 {
            bail!("server closed the connection");
        }
        Ok(reply.trim_end_matches(['\r', '\n']).to_string())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let addr = format!("{}:{}", args.host, args.port);

    let mut client = Client::connect(&addr, &args.password).await?;

    if !args.command.is_empty() {
        // The shell already removed the user's quotes
        let line = args
            .command
            .iter()
            .map(|arg| {
                if arg.contains(' ') {
                    format!("\"{arg}\"")
                } else {
                    arg.clone()
                }
            })
            .collect::<Vec<_>>()
            .join(" ");
        println!("{}", client.request(&line).await?);
        return Ok(());
    }

    println!("Authorized!");

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("[datastacks] > ");
        std::io::stdout().flush()?;

        let Some(line) = stdin.next_line().await? else {
            break; // EOF
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "exit" {
            break;
        }

        let start = Instant::now();
        let reply = client.request(line).await?;
        println!("{reply}");
        println!("Elapsed: {:?}", start.elapsed());
    }

    Ok(())
}
