mod decimal;
mod error;
mod json;
pub mod tagged;

use bigdecimal::BigDecimal;
use chrono::prelude::*;
use indexmap::IndexMap;
use std::{fmt, str::FromStr};

use base64::{Engine, engine::general_purpose::STANDARD};

pub use decimal::{DecimalLike, stringify_decimal};
pub use error::ConversionFailure;
pub use json::{js_number, stringify_json};

pub type PrismaValueResult<T> = std::result::Result<T, ConversionFailure>;
pub type PrismaListValue = Vec<PrismaValue>;
pub type PrismaObject = IndexMap<String, PrismaValue>;

/// A dynamically typed value as handed to the client by the caller, or as read back from the
/// engine. Absent keys ("undefined") are not represented: they are simply missing from the
/// surrounding map or modelled as `Option::None`.
#[derive(Debug, Clone, PartialEq)]
pub enum PrismaValue {
    Null,
    Boolean(bool),
    Int(i64),
    Float(f64),
    String(String),
    /// An explicit enum member, or one of the client's null sentinels (`JsonNull`, `DbNull`, ...).
    Enum(String),
    DateTime(DateTime<FixedOffset>),
    Decimal(BigDecimal),
    BigInt(i64),
    Bytes(Vec<u8>),
    /// An already parsed JSON document.
    Json(serde_json::Value),
    List(PrismaListValue),
    Object(PrismaObject),
}

/// Stringify a date to the following format
/// 1999-05-01T00:00:00.000Z
///
/// The date is converted to UTC first, the same way `Date.prototype.toJSON` does.
pub fn stringify_datetime(datetime: &DateTime<FixedOffset>) -> String {
    datetime.with_timezone(&Utc).to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parses an RFC 3339 and ISO 8601 date and time string such as 1996-12-19T16:39:57-08:00,
/// then returns a new DateTime with a parsed FixedOffset.
pub fn parse_datetime(datetime: &str) -> chrono::ParseResult<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(datetime)
}

pub fn encode_bytes(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

pub fn decode_bytes(s: impl AsRef<[u8]>) -> PrismaValueResult<Vec<u8>> {
    STANDARD
        .decode(s)
        .map_err(|_| ConversionFailure::new("base64 encoded bytes", "PrismaValue::Bytes"))
}

impl From<serde_json::Value> for PrismaValue {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => PrismaValue::Null,
            serde_json::Value::Bool(b) => PrismaValue::Boolean(b),
            serde_json::Value::Number(num) => match num.as_i64() {
                Some(i) => PrismaValue::Int(i),
                None => PrismaValue::Float(num.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => PrismaValue::String(s),
            serde_json::Value::Array(items) => PrismaValue::List(items.into_iter().map(PrismaValue::from).collect()),
            serde_json::Value::Object(obj) => {
                PrismaValue::Object(obj.into_iter().map(|(k, v)| (k, PrismaValue::from(v))).collect())
            }
        }
    }
}

impl PrismaValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PrismaValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// String content of either a plain string or an explicit enum value.
    pub fn as_enum_candidate(&self) -> Option<&str> {
        match self {
            PrismaValue::String(s) | PrismaValue::Enum(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&PrismaObject> {
        match self {
            PrismaValue::Object(obj) => Some(obj),
            _ => None,
        }
    }

    pub fn as_object_mut(&mut self) -> Option<&mut PrismaObject> {
        match self {
            PrismaValue::Object(obj) => Some(obj),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[PrismaValue]> {
        match self {
            PrismaValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            PrismaValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, PrismaValue::Null)
    }

    pub fn is_list(&self) -> bool {
        matches!(self, PrismaValue::List(_))
    }

    pub fn is_object(&self) -> bool {
        matches!(self, PrismaValue::Object(_))
    }

    /// Mirrors JavaScript truthiness: `null`, `false`, `0`, `NaN`, `0n` and the empty string are
    /// falsy, every other value (including empty objects and lists) is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            PrismaValue::Null => false,
            PrismaValue::Boolean(b) => *b,
            PrismaValue::Int(i) | PrismaValue::BigInt(i) => *i != 0,
            PrismaValue::Float(f) => *f != 0.0 && !f.is_nan(),
            PrismaValue::String(s) => !s.is_empty(),
            _ => true,
        }
    }

    /// Whether the value behaves like a JavaScript object (`typeof value === 'object'`), as
    /// opposed to a primitive. `null` counts as an object.
    pub fn is_object_like(&self) -> bool {
        !matches!(
            self,
            PrismaValue::Boolean(_)
                | PrismaValue::Int(_)
                | PrismaValue::Float(_)
                | PrismaValue::String(_)
                | PrismaValue::Enum(_)
                | PrismaValue::BigInt(_)
        )
    }

    /// Nesting depth of an object or list. A leaf counts as one level, every nested
    /// object-like child adds one.
    pub fn depth(&self) -> usize {
        let children: Box<dyn Iterator<Item = &PrismaValue>> = match self {
            PrismaValue::Object(obj) => Box::new(obj.values()),
            PrismaValue::List(items) => Box::new(items.iter()),
            _ => return 1,
        };

        children
            .filter(|child| child.is_object_like())
            .map(|child| child.depth() + 1)
            .fold(1, usize::max)
    }

    /// Reads a decimal.js style object (`{ d, e, s }`).
    pub fn as_decimal_like(&self) -> Option<BigDecimal> {
        match self {
            PrismaValue::Decimal(dec) => Some(dec.clone()),
            PrismaValue::Object(obj) => DecimalLike::from_object(obj).and_then(|like| like.to_big_decimal()),
            _ => None,
        }
    }

    /// Converts the value to JSON the way `JSON.stringify` would see it.
    pub fn to_json(&self) -> serde_json::Value {
        json::to_json(self)
    }

    pub fn new_datetime(datetime: &str) -> PrismaValueResult<PrismaValue> {
        parse_datetime(datetime)
            .map(PrismaValue::DateTime)
            .map_err(|_| ConversionFailure::new("string", "PrismaValue::DateTime"))
    }

    pub fn new_decimal(decimal: &str) -> PrismaValueResult<PrismaValue> {
        BigDecimal::from_str(decimal)
            .map(PrismaValue::Decimal)
            .map_err(|_| ConversionFailure::new("string", "PrismaValue::Decimal"))
    }
}

impl fmt::Display for PrismaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrismaValue::Null => "null".fmt(f),
            PrismaValue::Boolean(x) => x.fmt(f),
            PrismaValue::Int(x) | PrismaValue::BigInt(x) => x.fmt(f),
            PrismaValue::Float(x) => js_number(*x).fmt(f),
            PrismaValue::String(x) | PrismaValue::Enum(x) => x.fmt(f),
            PrismaValue::DateTime(x) => stringify_datetime(x).fmt(f),
            PrismaValue::Decimal(x) => stringify_decimal(x).fmt(f),
            PrismaValue::Bytes(b) => encode_bytes(b).fmt(f),
            other => stringify_json(&other.to_json()).fmt(f),
        }
    }
}

impl From<&str> for PrismaValue {
    fn from(s: &str) -> Self {
        PrismaValue::String(s.to_owned())
    }
}

impl From<String> for PrismaValue {
    fn from(s: String) -> Self {
        PrismaValue::String(s)
    }
}

impl From<bool> for PrismaValue {
    fn from(b: bool) -> Self {
        PrismaValue::Boolean(b)
    }
}

impl From<i32> for PrismaValue {
    fn from(i: i32) -> Self {
        PrismaValue::Int(i64::from(i))
    }
}

impl From<i64> for PrismaValue {
    fn from(i: i64) -> Self {
        PrismaValue::Int(i)
    }
}

impl From<f64> for PrismaValue {
    fn from(f: f64) -> Self {
        PrismaValue::Float(f)
    }
}

impl From<PrismaListValue> for PrismaValue {
    fn from(items: PrismaListValue) -> Self {
        PrismaValue::List(items)
    }
}

impl From<PrismaObject> for PrismaValue {
    fn from(obj: PrismaObject) -> Self {
        PrismaValue::Object(obj)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn depth_counts_nested_objects_and_lists() {
        assert_eq!(PrismaValue::from(json!("a")).depth(), 1);
        assert_eq!(PrismaValue::from(json!({ "a": 1 })).depth(), 1);
        assert_eq!(PrismaValue::from(json!({ "a": { "b": 1 } })).depth(), 2);
        assert_eq!(PrismaValue::from(json!({ "a": { "b": [{ "c": 1 }] } })).depth(), 4);
        assert_eq!(PrismaValue::from(json!({ "a": null })).depth(), 2);
    }

    #[test]
    fn truthiness_follows_javascript() {
        for falsy in [json!(null), json!(false), json!(0), json!(""), json!(0.0)] {
            assert!(!PrismaValue::from(falsy.clone()).is_truthy(), "{falsy} should be falsy");
        }

        for truthy in [json!({}), json!([]), json!("a"), json!(1), json!(true)] {
            assert!(PrismaValue::from(truthy.clone()).is_truthy(), "{truthy} should be truthy");
        }
    }

    #[test]
    fn datetimes_are_stringified_in_utc_with_millis() {
        let date = parse_datetime("1999-05-01T02:00:00+02:00").unwrap();
        assert_eq!(stringify_datetime(&date), "1999-05-01T00:00:00.000Z");
    }

    #[test]
    fn bytes_round_trip_through_base64() {
        let encoded = encode_bytes(&[1, 2, 3, 4]);
        assert_eq!(encoded, "AQIDBA==");
        assert_eq!(decode_bytes(&encoded).unwrap(), vec![1, 2, 3, 4]);
        assert!(decode_bytes("not base64!").is_err());
    }
}
