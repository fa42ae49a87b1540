use crate::{PrismaValue, encode_bytes, stringify_datetime, stringify_decimal};
use serde_json::{Number, Value};

/// Largest magnitude JavaScript still prints without an exponent.
const JS_EXPONENT_THRESHOLD: f64 = 1e21;

/// Renders a float the way JavaScript's `Number.prototype.toString` does for the common cases:
/// integral values lose their fractional part and non-finite values become `null` (as in JSON).
pub fn js_number(float: f64) -> String {
    if !float.is_finite() {
        return "null".to_owned();
    }

    if float == 0.0 {
        return "0".to_owned();
    }

    if float.fract() == 0.0 && float.abs() < JS_EXPONENT_THRESHOLD {
        return format!("{float:.0}");
    }

    float.to_string()
}

/// Compact JSON, as produced by `JSON.stringify(value)`.
pub fn stringify_json(value: &Value) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "null".to_owned())
}

pub(crate) fn to_json(value: &PrismaValue) -> Value {
    match value {
        PrismaValue::Null => Value::Null,
        PrismaValue::Boolean(b) => Value::Bool(*b),
        PrismaValue::Int(i) => Value::Number(Number::from(*i)),
        PrismaValue::Float(f) => float_to_json(*f),
        PrismaValue::String(s) | PrismaValue::Enum(s) => Value::String(s.clone()),
        PrismaValue::DateTime(dt) => Value::String(stringify_datetime(dt)),
        PrismaValue::Decimal(dec) => Value::String(stringify_decimal(dec)),
        PrismaValue::BigInt(i) => Value::String(i.to_string()),
        PrismaValue::Bytes(bytes) => Value::String(encode_bytes(bytes)),
        PrismaValue::Json(json) => json.clone(),
        PrismaValue::List(items) => Value::Array(items.iter().map(to_json).collect()),
        PrismaValue::Object(obj) => Value::Object(obj.iter().map(|(k, v)| (k.clone(), to_json(v))).collect()),
    }
}

fn float_to_json(float: f64) -> Value {
    if float.fract() == 0.0 && float.abs() < i64::MAX as f64 {
        return Value::Number(Number::from(float as i64));
    }

    Number::from_f64(float).map(Value::Number).unwrap_or(Value::Null)
}
