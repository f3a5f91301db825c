//! Value: decoded RESP replies and their log rendering
use std::fmt;

/// A single decoded RESP reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// `+OK\r\n`
    SimpleString(String),
    /// `-ERR message\r\n`
    Error(String),
    /// `:42\r\n`
    Integer(i64),
    /// `$3\r\nfoo\r\n`
    BulkString(Vec<u8>),
    /// `$-1\r\n`
    NullBulkString,
    /// `*2\r\n...`
    Array(Vec<Value>),
    /// `*-1\r\n`
    NullArray,
}

impl Value {
    pub fn simple(s: impl Into<String>) -> Self {
        Value::SimpleString(s.into())
    }

    pub fn bulk(s: impl AsRef<[u8]>) -> Self {
        Value::BulkString(s.as_ref().to_vec())
    }

    pub fn error(s: impl Into<String>) -> Self {
        Value::Error(s.into())
    }

    /// Short name of the reply category, used in assertion messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::SimpleString(_) => "simple string",
            Value::Error(_) => "error",
            Value::Integer(_) => "integer",
            Value::BulkString(_) => "bulk string",
            Value::NullBulkString => "null bulk string",
            Value::Array(_) => "array",
            Value::NullArray => "null array",
        }
    }

    /// String payload of simple strings, errors and UTF-8 bulk strings.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::SimpleString(s) | Value::Error(s) => Some(s),
            Value::BulkString(b) => std::str::from_utf8(b).ok(),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::NullBulkString | Value::NullArray)
    }

    /// Human-readable rendering for logs. Never compare on this.
    pub fn formatted_string(&self) -> String {
        match self {
            Value::SimpleString(s) => format!("{:?}", s),
            Value::Error(s) => format!("{:?}", s),
            Value::Integer(n) => n.to_string(),
            Value::BulkString(b) => format!("{:?}", String::from_utf8_lossy(b)),
            Value::NullBulkString => format!("{:?}", "$-1\r\n"),
            Value::NullArray => format!("{:?}", "*-1\r\n"),
            Value::Array(items) => {
                let inner = items
                    .iter()
                    .map(Value::formatted_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("[{}]", inner)
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.formatted_string())
    }
}
