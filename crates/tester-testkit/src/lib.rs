//! tester-testkit: a tiny in-process RESP server for tests.
//!
//! `FakeRedis` understands PING, ECHO, SET (with PX/EX) and GET. A
//! [`Behavior`] other than `Correct` makes it misbehave in one specific way
//! so the stages can be checked against a broken server too.
//!
//! ```ignore
//! let server = FakeRedis::start(Behavior::Correct).await?;
//! let mut client = RespClient::connect(&server.addr()).await?;
//! ```

use resp_wire::{decode, encode_value, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    /// Follows the protocol.
    Correct,
    /// Accepts connections but never answers.
    Silent,
    /// Answers every command with its own name as a simple string.
    ParrotCommand,
    /// Stores keys but ignores PX/EX.
    IgnoreExpiry,
    /// Serves one connection at a time.
    SingleClient,
}

type Store = Arc<Mutex<HashMap<Vec<u8>, (Vec<u8>, Option<Instant>)>>>;

pub struct FakeRedis {
    addr: SocketAddr,
    received: Arc<Mutex<Vec<u8>>>,
    shutdown: CancellationToken,
}

impl FakeRedis {
    pub async fn start(behavior: Behavior) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let received = Arc::new(Mutex::new(Vec::new()));
        let shutdown = CancellationToken::new();
        let store: Store = Arc::default();

        let accept_received = received.clone();
        let accept_shutdown = shutdown.clone();
        tokio::spawn(async move {
            loop {
                let socket = tokio::select! {
                    _ = accept_shutdown.cancelled() => break,
                    accepted = listener.accept() => match accepted {
                        Ok((socket, _)) => socket,
                        Err(err) => {
                            tracing::warn!(%err, "fake redis accept failed");
                            continue;
                        }
                    },
                };

                let conn = serve(socket, behavior, store.clone(), accept_received.clone());
                let conn_shutdown = accept_shutdown.clone();
                if behavior == Behavior::SingleClient {
                    tokio::select! {
                        _ = conn_shutdown.cancelled() => break,
                        _ = conn => {}
                    }
                } else {
                    tokio::spawn(async move {
                        tokio::select! {
                            _ = conn_shutdown.cancelled() => {}
                            _ = conn => {}
                        }
                    });
                }
            }
        });

        Ok(Self {
            addr,
            received,
            shutdown,
        })
    }

    pub fn addr(&self) -> String {
        self.addr.to_string()
    }

    /// Every byte received so far, across all connections.
    pub fn received_bytes(&self) -> Vec<u8> {
        self.received
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl Drop for FakeRedis {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn serve(mut socket: TcpStream, behavior: Behavior, store: Store, received: Arc<Mutex<Vec<u8>>>) {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 4096];

    loop {
        let n = match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => n,
        };
        received
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .extend_from_slice(&chunk[..n]);
        buffer.extend_from_slice(&chunk[..n]);

        loop {
            let (request, used) = match decode(&buffer) {
                Ok(Some(found)) => found,
                Ok(None) => break,
                Err(_) => return,
            };
            buffer.drain(..used);

            if behavior == Behavior::Silent {
                continue;
            }
            let reply = respond(&request, behavior, &store);
            if socket.write_all(&encode_value(&reply)).await.is_err() {
                return;
            }
        }
    }
}

fn respond(request: &Value, behavior: Behavior, store: &Store) -> Value {
    let args: Vec<Vec<u8>> = match request {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::BulkString(b) => Some(b.clone()),
                _ => None,
            })
            .collect(),
        _ => return Value::error("ERR expected an array of bulk strings"),
    };
    let Some(command) = args.first() else {
        return Value::error("ERR empty command");
    };
    let command = String::from_utf8_lossy(command).to_ascii_uppercase();

    if behavior == Behavior::ParrotCommand {
        return Value::simple(command);
    }

    let mut store = store.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    match (command.as_str(), &args[1..]) {
        ("PING", []) => Value::simple("PONG"),
        ("PING", [msg]) => Value::bulk(msg),
        ("ECHO", [msg]) => Value::bulk(msg),
        ("SET", [key, value, options @ ..]) => {
            let expires_at = match options {
                [] => None,
                [unit, amount] if behavior != Behavior::IgnoreExpiry => {
                    let Some(amount) = std::str::from_utf8(amount).ok().and_then(|s| s.parse::<u64>().ok()) else {
                        return Value::error("ERR value is not an integer or out of range");
                    };
                    match String::from_utf8_lossy(unit).to_ascii_uppercase().as_str() {
                        "PX" => Some(Instant::now() + Duration::from_millis(amount)),
                        "EX" => Some(Instant::now() + Duration::from_secs(amount)),
                        _ => return Value::error("ERR syntax error"),
                    }
                }
                [_, _] => None,
                _ => return Value::error("ERR syntax error"),
            };
            store.insert(key.clone(), (value.clone(), expires_at));
            Value::simple("OK")
        }
        ("GET", [key]) => {
            let expired = matches!(store.get(key), Some((_, Some(deadline))) if Instant::now() >= *deadline);
            if expired {
                store.remove(key);
            }
            match store.get(key) {
                Some((value, _)) => Value::bulk(value),
                None => Value::NullBulkString,
            }
        }
        (other, _) => Value::error(format!("ERR unknown command '{}'", other.to_lowercase())),
    }
}
