//! Payload encodings.
//!
//! Payloads reach the store as JSON values. A [`Format`] turns such a value
//! into bytes and back; it is object safe so a backend can hand out
//! `&dyn Format`.

use pulse_core::Raw;
use serde_json::Value;
use thiserror::Error;

mod json;

pub use json::JsonFormat;

/// Encoding or decoding failure.
#[derive(Error, Debug)]
pub enum FormatError {
    /// A value could not be encoded.
    #[error(transparent)]
    Serialize(Box<dyn std::error::Error + Send + Sync>),

    /// Stored bytes could not be decoded into the requested type.
    #[error(transparent)]
    Deserialize(Box<dyn std::error::Error + Send + Sync>),
}

/// Byte encoding for stored payloads.
pub trait Format: std::fmt::Debug + Send + Sync {
    /// Encodes a value.
    fn encode(&self, value: &Value) -> Result<Raw, FormatError>;

    /// Decodes bytes written by [`encode`](Format::encode).
    fn decode(&self, data: &[u8]) -> Result<Value, FormatError>;

    /// Short name used in logs.
    fn name(&self) -> &'static str;
}
