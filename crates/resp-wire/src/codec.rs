//! Codec: command encoding and incremental reply decoding
use crate::error::RespError;
use crate::value::Value;

const CRLF: &[u8] = b"\r\n";

/// Serializes a command as a RESP array of bulk strings.
pub fn encode_command(command: &str, args: &[String]) -> Vec<u8> {
    let mut out = Vec::with_capacity(16 + command.len() + args.iter().map(String::len).sum::<usize>());
    out.extend_from_slice(format!("*{}\r\n", args.len() + 1).as_bytes());
    push_bulk(&mut out, command.as_bytes());
    for arg in args {
        push_bulk(&mut out, arg.as_bytes());
    }
    out
}

/// Serializes a reply value, as a server would.
pub fn encode_value(value: &Value) -> Vec<u8> {
    let mut out = Vec::new();
    push_value(&mut out, value);
    out
}

fn push_value(out: &mut Vec<u8>, value: &Value) {
    match value {
        Value::SimpleString(s) => out.extend_from_slice(format!("+{}\r\n", s).as_bytes()),
        Value::Error(s) => out.extend_from_slice(format!("-{}\r\n", s).as_bytes()),
        Value::Integer(n) => out.extend_from_slice(format!(":{}\r\n", n).as_bytes()),
        Value::BulkString(b) => push_bulk(out, b),
        Value::NullBulkString => out.extend_from_slice(b"$-1\r\n"),
        Value::NullArray => out.extend_from_slice(b"*-1\r\n"),
        Value::Array(items) => {
            out.extend_from_slice(format!("*{}\r\n", items.len()).as_bytes());
            for item in items {
                push_value(out, item);
            }
        }
    }
}

fn push_bulk(out: &mut Vec<u8>, data: &[u8]) {
    out.extend_from_slice(format!("${}\r\n", data.len()).as_bytes());
    out.extend_from_slice(data);
    out.extend_from_slice(CRLF);
}

/// Largest bulk string or array length accepted from a server.
pub const MAX_LEN: i64 = 512 * 1024 * 1024;

/// Deepest array nesting accepted from a server.
pub const MAX_DEPTH: usize = 512;

/// Outcome of a decode attempt on a possibly partial buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    /// A value and the number of bytes it consumed.
    Complete(Value, usize),
    /// Nothing can be decoded until `buf` holds at least `needed` bytes.
    Incomplete { needed: usize },
}

/// Decodes one value from the front of `buf`.
///
/// Returns `Ok(None)` when `buf` holds only a prefix of a value, otherwise
/// the value and the number of bytes it consumed.
pub fn decode(buf: &[u8]) -> Result<Option<(Value, usize)>, RespError> {
    match decode_partial(buf)? {
        Decoded::Complete(value, used) => Ok(Some((value, used))),
        Decoded::Incomplete { .. } => Ok(None),
    }
}

/// Like [`decode`], but reports a lower bound on the bytes still required.
pub fn decode_partial(buf: &[u8]) -> Result<Decoded, RespError> {
    decode_at(buf, 0, 0)
}

fn decode_at(buf: &[u8], start: usize, depth: usize) -> Result<Decoded, RespError> {
    if depth > MAX_DEPTH {
        return Err(RespError::Decode(format!(
            "arrays nested deeper than {} levels",
            MAX_DEPTH
        )));
    }
    let more = Decoded::Incomplete { needed: buf.len() + 1 };
    let Some(&prefix) = buf.get(start) else {
        return Ok(more);
    };
    let Some((line, after_line)) = read_line(buf, start + 1) else {
        return Ok(more);
    };

    match prefix {
        b'+' => Ok(Decoded::Complete(Value::SimpleString(utf8(line)?), after_line)),
        b'-' => Ok(Decoded::Complete(Value::Error(utf8(line)?), after_line)),
        b':' => Ok(Decoded::Complete(Value::Integer(parse_int(line)?), after_line)),
        b'$' => {
            let len = parse_len(line, "bulk string")?;
            if len < 0 {
                return Ok(Decoded::Complete(Value::NullBulkString, after_line));
            }
            let end = after_line + len as usize;
            if buf.len() < end + CRLF.len() {
                return Ok(Decoded::Incomplete { needed: end + CRLF.len() });
            }
            if &buf[end..end + CRLF.len()] != CRLF {
                return Err(RespError::Decode(format!(
                    "bulk string of length {} is not terminated by CRLF",
                    len
                )));
            }
            Ok(Decoded::Complete(
                Value::BulkString(buf[after_line..end].to_vec()),
                end + CRLF.len(),
            ))
        }
        b'*' => {
            let count = parse_len(line, "array")?;
            if count < 0 {
                return Ok(Decoded::Complete(Value::NullArray, after_line));
            }
            // Every element takes at least three bytes, so never reserve
            // more than the buffer could possibly hold.
            let fits = (buf.len() - after_line) / 3;
            let mut items = Vec::with_capacity((count as usize).min(fits));
            let mut cursor = after_line;
            for _ in 0..count {
                match decode_at(buf, cursor, depth + 1)? {
                    Decoded::Complete(item, next) => {
                        items.push(item);
                        cursor = next;
                    }
                    incomplete => return Ok(incomplete),
                }
            }
            Ok(Decoded::Complete(Value::Array(items), cursor))
        }
        other => Err(RespError::Decode(format!(
            "unexpected type byte {:?}",
            other as char
        ))),
    }
}

fn parse_len(line: &[u8], kind: &str) -> Result<i64, RespError> {
    let len = parse_int(line)?;
    if len > MAX_LEN {
        return Err(RespError::Decode(format!(
            "{} length {} exceeds the {} byte limit",
            kind, len, MAX_LEN
        )));
    }
    Ok(len)
}

/// Returns the line starting at `from` (without CRLF) and the offset after it.
fn read_line(buf: &[u8], from: usize) -> Option<(&[u8], usize)> {
    let rest = buf.get(from..)?;
    let pos = rest.windows(2).position(|w| w == CRLF)?;
    Some((&rest[..pos], from + pos + CRLF.len()))
}

fn utf8(line: &[u8]) -> Result<String, RespError> {
    String::from_utf8(line.to_vec()).map_err(|e| RespError::Decode(e.to_string()))
}

fn parse_int(line: &[u8]) -> Result<i64, RespError> {
    std::str::from_utf8(line)
        .ok()
        .and_then(|s| s.parse::<i64>().ok())
        .ok_or_else(|| {
            RespError::Decode(format!(
                "invalid integer {:?}",
                String::from_utf8_lossy(line)
            ))
        })
}
