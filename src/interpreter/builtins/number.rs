//! Number class: arithmetic, comparison and bitwise operators on f64.

use crate::interpreter::builtins::{arg, number_arg};
use crate::interpreter::value::{BuiltinInstance, Value};

pub const METHODS: &[(&str, usize)] = &[
    ("init", 1),
    ("__power__", 1),
    ("__modulus__", 1),
    ("__multiply__", 1),
    ("__divide__", 1),
    ("__add__", 1),
    ("__subtract__", 1),
    ("__pipe__", 1),
    ("__ampersand__", 1),
    ("__less__", 1),
    ("__lessequal__", 1),
    ("__greater__", 1),
    ("__greaterequal__", 1),
    ("__equal__", 1),
    ("__notequal__", 1),
    ("__negate__", 0),
    ("clone", 0),
    ("toString", 0),
];

const EXPECTED_NUMBER: &str = "Expected number.";

/// `Number(x)` from a number, a numeric string, a boolean or null.
pub fn construct(args: &[Value]) -> Result<BuiltinInstance, String> {
    let value = arg(args, 0).ok_or(EXPECTED_NUMBER)?;
    let number = match value {
        Value::Null => 0.0,
        Value::Builtin(BuiltinInstance::Number(n)) => *n,
        Value::Builtin(BuiltinInstance::Boolean(b)) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Value::Builtin(BuiltinInstance::String(s)) => {
            parse(s).ok_or("Expected a number, string, boolean or null.")?
        }
        _ => return Err("Expected a number, string, boolean or null.".to_string()),
    };
    Ok(BuiltinInstance::Number(number))
}

/// Numeric string conversion: surrounding whitespace is ignored and an empty
/// string is zero.
fn parse(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }
    match trimmed {
        "Infinity" | "+Infinity" => return Some(f64::INFINITY),
        "-Infinity" => return Some(f64::NEG_INFINITY),
        _ => {}
    }
    if trimmed.chars().any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E') {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| !n.is_nan())
}

/// Conversion to a signed 32-bit integer, wrapping like the bitwise operators
/// of most scripting languages.
fn to_int32(n: f64) -> i32 {
    if !n.is_finite() {
        return 0;
    }
    (n.trunc() as i64) as i32
}

pub fn call(n: f64, name: &str, args: &[Value]) -> Result<Value, String> {
    let result = match name {
        "__negate__" => Value::number(-n),
        "__power__" => Value::number(n.powf(number_arg(args, 0, EXPECTED_NUMBER)?)),
        "__multiply__" => Value::number(n * number_arg(args, 0, EXPECTED_NUMBER)?),
        "__add__" => Value::number(n + number_arg(args, 0, EXPECTED_NUMBER)?),
        "__subtract__" => Value::number(n - number_arg(args, 0, EXPECTED_NUMBER)?),
        "__divide__" => Value::number(n / non_zero(args)?),
        // Remainder keeps the dividend's sign.
        "__modulus__" => Value::number(n % non_zero(args)?),
        "__pipe__" => {
            let other = number_arg(args, 0, EXPECTED_NUMBER)?;
            Value::number((to_int32(n) | to_int32(other)) as f64)
        }
        "__ampersand__" => {
            let other = number_arg(args, 0, EXPECTED_NUMBER)?;
            Value::number((to_int32(n) & to_int32(other)) as f64)
        }
        "__less__" => Value::boolean(n < number_arg(args, 0, EXPECTED_NUMBER)?),
        "__lessequal__" => Value::boolean(n <= number_arg(args, 0, EXPECTED_NUMBER)?),
        "__greater__" => Value::boolean(n > number_arg(args, 0, EXPECTED_NUMBER)?),
        "__greaterequal__" => Value::boolean(n >= number_arg(args, 0, EXPECTED_NUMBER)?),
        _ => return Err(format!("Undefined method '{}'.", name)),
    };
    Ok(result)
}

fn non_zero(args: &[Value]) -> Result<f64, String> {
    let divisor = number_arg(args, 0, EXPECTED_NUMBER)?;
    if divisor == 0.0 {
        return Err("Division by zero.".to_string());
    }
    Ok(divisor)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(v: Result<Value, String>) -> f64 {
        v.unwrap().as_number().unwrap()
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(num(call(2.0, "__add__", &[Value::number(3.0)])), 5.0);
        assert_eq!(num(call(2.0, "__power__", &[Value::number(3.0)])), 8.0);
        assert_eq!(num(call(5.0, "__modulus__", &[Value::number(-3.0)])), 2.0);
        assert_eq!(num(call(-5.0, "__modulus__", &[Value::number(3.0)])), -2.0);
        assert_eq!(num(call(7.0, "__divide__", &[Value::number(2.0)])), 3.5);
        assert_eq!(num(call(4.0, "__negate__", &[])), -4.0);
    }

    #[test]
    fn test_bitwise() {
        assert_eq!(num(call(6.0, "__pipe__", &[Value::number(1.0)])), 7.0);
        assert_eq!(num(call(6.0, "__ampersand__", &[Value::number(3.0)])), 2.0);
        assert_eq!(num(call(4294967297.0, "__pipe__", &[Value::number(0.0)])), 1.0);
    }

    #[test]
    fn test_errors() {
        assert_eq!(
            call(1.0, "__add__", &[Value::string("a")]).unwrap_err(),
            "Expected number."
        );
        assert_eq!(
            call(1.0, "__divide__", &[Value::number(0.0)]).unwrap_err(),
            "Division by zero."
        );
        assert_eq!(
            call(1.0, "__modulus__", &[Value::number(0.0)]).unwrap_err(),
            "Division by zero."
        );
    }

    #[test]
    fn test_comparisons() {
        let less = call(1.0, "__less__", &[Value::number(2.0)]).unwrap();
        assert_eq!(less.as_bool(), Some(true));
        assert!(call(1.0, "__less__", &[Value::Null]).is_err());
    }

    #[test]
    fn test_construct() {
        let n = |args: &[Value]| match construct(args) {
            Ok(BuiltinInstance::Number(n)) => n,
            other => panic!("unexpected {:?}", other),
        };
        assert_eq!(n(&[Value::string(" 42 ")]), 42.0);
        assert_eq!(n(&[Value::string("")]), 0.0);
        assert_eq!(n(&[Value::boolean(true)]), 1.0);
        assert_eq!(n(&[Value::Null]), 0.0);
        assert_eq!(construct(&[]).unwrap_err(), "Expected number.");
        assert_eq!(
            construct(&[Value::string("abc")]).unwrap_err(),
            "Expected a number, string, boolean or null."
        );
    }
}
