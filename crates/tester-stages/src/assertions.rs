//! Reply checks shared by the stages
use resp_wire::Value;
use tester_core::TesterError;

pub fn expect_simple_string(actual: &Value, expected: &str) -> Result<(), TesterError> {
    match actual {
        Value::SimpleString(s) if s == expected => Ok(()),
        Value::SimpleString(_) => Err(mismatch(&Value::simple(expected), actual)),
        _ => Err(wrong_type("simple string", &Value::simple(expected), actual)),
    }
}

pub fn expect_bulk_string(actual: &Value, expected: &str) -> Result<(), TesterError> {
    match actual {
        Value::BulkString(b) if b.as_slice() == expected.as_bytes() => Ok(()),
        Value::BulkString(_) => Err(mismatch(&Value::bulk(expected), actual)),
        _ => Err(wrong_type("bulk string", &Value::bulk(expected), actual)),
    }
}

pub fn expect_null_bulk_string(actual: &Value) -> Result<(), TesterError> {
    match actual {
        Value::NullBulkString => Ok(()),
        _ => Err(wrong_type("null bulk string", &Value::NullBulkString, actual)),
    }
}

fn mismatch(expected: &Value, actual: &Value) -> TesterError {
    TesterError::assertion(format!("Expected {}, got {}", expected, actual))
}

fn wrong_type(kind: &str, expected: &Value, actual: &Value) -> TesterError {
    TesterError::assertion(format!(
        "Expected {} {}, got {} {}",
        kind,
        expected,
        actual.type_name(),
        actual
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_string() {
        assert!(expect_simple_string(&Value::simple("PONG"), "PONG").is_ok());

        let err = expect_simple_string(&Value::simple("PING"), "PONG").unwrap_err();
        assert_eq!(err.to_string(), "Expected \"PONG\", got \"PING\"");

        let err = expect_simple_string(&Value::bulk("PONG"), "PONG").unwrap_err();
        assert_eq!(err.to_string(), "Expected simple string \"PONG\", got bulk string \"PONG\"");
    }

    #[test]
    fn test_bulk_and_null() {
        assert!(expect_bulk_string(&Value::bulk("mango"), "mango").is_ok());
        assert!(expect_bulk_string(&Value::bulk("apple"), "mango").is_err());
        assert!(expect_null_bulk_string(&Value::NullBulkString).is_ok());

        let err = expect_null_bulk_string(&Value::bulk("mango")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Expected null bulk string \"$-1\\r\\n\", got bulk string \"mango\""
        );
    }
}
