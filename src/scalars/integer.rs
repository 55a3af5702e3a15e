use super::{Scalar, ScalarError};
use crate::value::Value;

/// Parse a wire integer: a native `Int`, a decimal `Str`, or a `0x`-prefixed
/// hex `Str` (optionally signed with a leading `-`).
fn parse_wire_int(wire: &Value) -> Result<i128, ScalarError> {
    match wire {
        Value::Int(i) => Ok(*i),
        Value::Str(s) => parse_int_str(s),
        _ => Err(ScalarError),
    }
}

fn parse_int_str(s: &str) -> Result<i128, ScalarError> {
    let (neg, rest) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    let magnitude = if let Some(hex) = rest.strip_prefix("0x").or_else(|| rest.strip_prefix("0X"))
    {
        if hex.is_empty() || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ScalarError);
        }
        i128::from_str_radix(hex, 16).map_err(|_| ScalarError)?
    } else {
        if rest.is_empty() || !rest.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ScalarError);
        }
        rest.parse::<i128>().map_err(|_| ScalarError)?
    };
    Ok(if neg { -magnitude } else { magnitude })
}

/// Dump to lowercase `0x`-hex with no leading zeros (except `0x0`), signed
/// with a leading `-` before the `0x` prefix.
fn dump_int(i: i128) -> Value {
    let (neg, magnitude) = if i < 0 {
        (true, i.unsigned_abs())
    } else {
        (false, i as u128)
    };
    let hex = format!("{magnitude:x}");
    if neg {
        Value::Str(format!("-0x{hex}"))
    } else {
        Value::Str(format!("0x{hex}"))
    }
}

/// Signed big integer, wire form `0x`-hex (optionally `-`-prefixed).
pub struct Integer;

impl Scalar for Integer {
    const NAME: &'static str = "Integer";

    fn load(wire: &Value) -> Result<Value, ScalarError> {
        Ok(Value::Int(parse_wire_int(wire)?))
    }

    fn dump(host: &Value) -> Result<Value, ScalarError> {
        Ok(dump_int(host.as_int().ok_or(ScalarError)?))
    }
}

/// Loads/dumps like [`Integer`] but additionally enforces a range predicate.
macro_rules! ranged_integer {
    ($name:ident, $doc:literal, $pred:expr) => {
        #[doc = $doc]
        pub struct $name;

        impl Scalar for $name {
            const NAME: &'static str = stringify!($name);

            fn load(wire: &Value) -> Result<Value, ScalarError> {
                let i = parse_wire_int(wire)?;
                let pred: fn(i128) -> bool = $pred;
                if !pred(i) {
                    return Err(ScalarError);
                }
                Ok(Value::Int(i))
            }

            fn dump(host: &Value) -> Result<Value, ScalarError> {
                let i = host.as_int().ok_or(ScalarError)?;
                let pred: fn(i128) -> bool = $pred;
                if !pred(i) {
                    return Err(ScalarError);
                }
                Ok(dump_int(i))
            }
        }
    };
}

ranged_integer!(PosInteger, "Strictly positive integer (`> 0`).", |i| i > 0);
ranged_integer!(NegInteger, "Strictly negative integer (`< 0`).", |i| i < 0);
ranged_integer!(NonNegInteger, "Non-negative integer (`>= 0`).", |i| i >= 0);
ranged_integer!(NonPosInteger, "Non-positive integer (`<= 0`).", |i| i <= 0);

/// Non-negative big integer denominated in loop (1 ICX = 10^18 loop).
pub struct Loop;

impl Scalar for Loop {
    const NAME: &'static str = "Loop";

    fn load(wire: &Value) -> Result<Value, ScalarError> {
        let i = parse_wire_int(wire)?;
        if i < 0 {
            return Err(ScalarError);
        }
        Ok(Value::Int(i))
    }

    fn dump(host: &Value) -> Result<Value, ScalarError> {
        let i = host.as_int().ok_or(ScalarError)?;
        if i < 0 {
            return Err(ScalarError);
        }
        Ok(dump_int(i))
    }
}
