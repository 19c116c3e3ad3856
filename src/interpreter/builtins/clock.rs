//! Clock built-in function.
//!
//! `clock(unit?)` returns the wall-clock time since the Unix epoch, truncated to
//! the requested unit. Differences between two calls are what scripts use it for.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::interpreter::environment::Environment;
use crate::interpreter::value::Value;

/// Register all clock built-in functions.
pub fn register_clock_builtins(env: &mut Environment) {
    // clock(unit?) - 'hour', 'second', 'milli' (default), 'micro' or 'nano'
    env.define_value("clock", Value::native("clock", 1, |args| clock(args.first())));
}

fn clock(unit: Option<&Value>) -> Result<Value, String> {
    let unit = match unit {
        None | Some(Value::Null) => "milli",
        Some(value) => value.as_str().ok_or("Expected string.")?,
    };

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| e.to_string())?
        .as_nanos();

    let value = match unit {
        "hour" => nanos / 1_000_000_000 / 3600,
        "second" => nanos / 1_000_000_000,
        "milli" => nanos / 1_000_000,
        "micro" => nanos / 1_000,
        "nano" => nanos,
        _ => return Err("Invalid clock operation.".to_string()),
    };
    Ok(Value::number(value as f64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_units() {
        let milli = clock(None).unwrap().as_number().unwrap();
        let second = clock(Some(&Value::string("second"))).unwrap().as_number().unwrap();
        assert!(milli > 0.0);
        assert!((milli / 1000.0 - second).abs() < 5.0);
        assert!(clock(Some(&Value::string("nano"))).is_ok());
    }

    #[test]
    fn test_invalid_unit() {
        assert_eq!(
            clock(Some(&Value::string("week"))).unwrap_err(),
            "Invalid clock operation."
        );
    }
}
