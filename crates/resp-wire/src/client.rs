//! RESP client over TCP with optional observer callbacks
use crate::codec::{decode_partial, encode_command, Decoded};
use crate::error::RespError;
use crate::value::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio_util::sync::CancellationToken;

const READ_CHUNK: usize = 4096;

type SendCommandHook = Box<dyn Fn(&str, &[String]) + Send + Sync>;
type BytesHook = Box<dyn Fn(&[u8]) + Send + Sync>;
type ValueHook = Box<dyn Fn(&Value) + Send + Sync>;

/// Observers invoked synchronously around client I/O.
///
/// Every hook is optional; an absent hook is a no-op. Hooks cannot change
/// what the client sends, receives or returns.
#[derive(Default)]
pub struct RespClientCallbacks {
    pub on_send_command: Option<SendCommandHook>,
    pub on_bytes_sent: Option<BytesHook>,
    pub on_bytes_received: Option<BytesHook>,
    pub on_value_read: Option<ValueHook>,
}

impl RespClientCallbacks {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn on_send_command(mut self, f: impl Fn(&str, &[String]) + Send + Sync + 'static) -> Self {
        self.on_send_command = Some(Box::new(f));
        self
    }

    pub fn on_bytes_sent(mut self, f: impl Fn(&[u8]) + Send + Sync + 'static) -> Self {
        self.on_bytes_sent = Some(Box::new(f));
        self
    }

    pub fn on_bytes_received(mut self, f: impl Fn(&[u8]) + Send + Sync + 'static) -> Self {
        self.on_bytes_received = Some(Box::new(f));
        self
    }

    pub fn on_value_read(mut self, f: impl Fn(&Value) + Send + Sync + 'static) -> Self {
        self.on_value_read = Some(Box::new(f));
        self
    }
}

impl std::fmt::Debug for RespClientCallbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RespClientCallbacks")
            .field("on_send_command", &self.on_send_command.is_some())
            .field("on_bytes_sent", &self.on_bytes_sent.is_some())
            .field("on_bytes_received", &self.on_bytes_received.is_some())
            .field("on_value_read", &self.on_value_read.is_some())
            .finish()
    }
}

/// Bytes read but not yet decoded.
///
/// Remembers how long the buffer must grow before the pending value can
/// possibly be complete, so a large reply is decoded once rather than once
/// per socket read.
#[derive(Debug, Default)]
struct ReadBuffer {
    bytes: Vec<u8>,
    needed: usize,
}

impl ReadBuffer {
    fn extend(&mut self, chunk: &[u8]) {
        self.bytes.extend_from_slice(chunk);
    }

    fn next_value(&mut self) -> Result<Option<Value>, RespError> {
        if self.bytes.len() < self.needed {
            return Ok(None);
        }
        match decode_partial(&self.bytes)? {
            Decoded::Complete(value, used) => {
                self.bytes.drain(..used);
                self.needed = 0;
                Ok(Some(value))
            }
            Decoded::Incomplete { needed } => {
                self.needed = needed;
                Ok(None)
            }
        }
    }
}

/// A connection to a RESP server.
pub struct RespClient {
    stream: TcpStream,
    buffer: ReadBuffer,
    callbacks: RespClientCallbacks,
    cancel: CancellationToken,
}

impl RespClient {
    pub async fn connect(addr: &str) -> Result<Self, RespError> {
        Self::connect_with_callbacks(addr, RespClientCallbacks::none()).await
    }

    pub async fn connect_with_callbacks(
        addr: &str,
        callbacks: RespClientCallbacks,
    ) -> Result<Self, RespError> {
        let stream = TcpStream::connect(addr)
            .await
            .map_err(|source| RespError::Connect {
                addr: addr.to_string(),
                source,
            })?;
        tracing::trace!(%addr, "resp client connected");

        Ok(Self {
            stream,
            buffer: ReadBuffer::default(),
            callbacks,
            cancel: CancellationToken::new(),
        })
    }

    /// Ties every subsequent read and write to `token`.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub async fn send_command(&mut self, command: &str, args: &[String]) -> Result<(), RespError> {
        if let Some(hook) = &self.callbacks.on_send_command {
            hook(command, args);
        }

        let bytes = encode_command(command, args);
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Err(RespError::Cancelled),
            res = self.stream.write_all(&bytes) => res?,
        }

        if let Some(hook) = &self.callbacks.on_bytes_sent {
            hook(&bytes);
        }
        Ok(())
    }

    /// Reads exactly one value, buffering any bytes that follow it.
    pub async fn read_value(&mut self) -> Result<Value, RespError> {
        loop {
            if let Some(value) = self.buffer.next_value()? {
                if let Some(hook) = &self.callbacks.on_value_read {
                    hook(&value);
                }
                return Ok(value);
            }

            let mut chunk = [0u8; READ_CHUNK];
            let n = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Err(RespError::Cancelled),
                res = self.stream.read(&mut chunk) => res?,
            };
            if n == 0 {
                return Err(RespError::ConnectionClosed);
            }

            if let Some(hook) = &self.callbacks.on_bytes_received {
                hook(&chunk[..n]);
            }
            self.buffer.extend(&chunk[..n]);
        }
    }

    pub async fn send_and_read(&mut self, command: &str, args: &[String]) -> Result<Value, RespError> {
        self.send_command(command, args).await?;
        self.read_value().await
    }
}
