//! RESP wire layer: values, codec and client
//!
//! The client exposes four observer hooks (`RespClientCallbacks`) so callers
//! can log traffic without wrapping the socket themselves.

pub mod client;
pub mod codec;
pub mod error;
pub mod value;

pub use client::{RespClient, RespClientCallbacks};
pub use codec::{decode, decode_partial, encode_command, encode_value, Decoded};
pub use error::RespError;
pub use value::Value;
