//! Decoding of `$type`-tagged JSON values, the encoding used to carry scalars JSON cannot
//! represent natively (`{ "$type": "BigInt", "value": "1" }`).

use bigdecimal::BigDecimal;
use serde_json::Value as JsonValue;
use std::str::FromStr;

use crate::{ConversionFailure, PrismaValue, PrismaValueResult, decode_bytes, parse_datetime};

pub mod custom_types {
    pub const TYPE: &str = "$type";
    pub const VALUE: &str = "value";

    pub const DATETIME: &str = "DateTime";
    pub const BIGINT: &str = "BigInt";
    pub const DECIMAL: &str = "Decimal";
    pub const BYTES: &str = "Bytes";
    pub const JSON: &str = "Json";
    pub const ENUM: &str = "Enum";
}

impl PrismaValue {
    /// Like `From<serde_json::Value>`, but decodes tagged objects into their typed variants.
    pub fn from_tagged_json(value: JsonValue) -> PrismaValueResult<PrismaValue> {
        match value {
            JsonValue::Array(items) => Ok(PrismaValue::List(
                items
                    .into_iter()
                    .map(PrismaValue::from_tagged_json)
                    .collect::<PrismaValueResult<_>>()?,
            )),
            JsonValue::Object(mut obj) => {
                let tag = obj.get(custom_types::TYPE).and_then(|t| t.as_str()).map(ToOwned::to_owned);

                let Some(tag) = tag else {
                    return obj
                        .into_iter()
                        .map(|(k, v)| Ok((k, PrismaValue::from_tagged_json(v)?)))
                        .collect::<PrismaValueResult<_>>()
                        .map(PrismaValue::Object);
                };

                let value = obj.remove(custom_types::VALUE);
                let as_str = |to: &'static str| {
                    value
                        .as_ref()
                        .and_then(|v| v.as_str())
                        .ok_or_else(|| ConversionFailure::new("tagged JSON value", to))
                };

                match tag.as_str() {
                    custom_types::DATETIME => parse_datetime(as_str("DateTime")?)
                        .map(PrismaValue::DateTime)
                        .map_err(|_| ConversionFailure::new("JSON date object", "PrismaValue::DateTime")),
                    custom_types::BIGINT => i64::from_str(as_str("BigInt")?)
                        .map(PrismaValue::BigInt)
                        .map_err(|_| ConversionFailure::new("JSON bigint value", "PrismaValue::BigInt")),
                    custom_types::DECIMAL => BigDecimal::from_str(as_str("Decimal")?)
                        .map(PrismaValue::Decimal)
                        .map_err(|_| ConversionFailure::new("JSON decimal value", "PrismaValue::Decimal")),
                    custom_types::BYTES => decode_bytes(as_str("Bytes")?).map(PrismaValue::Bytes),
                    custom_types::JSON => serde_json::from_str(as_str("Json")?)
                        .map(PrismaValue::Json)
                        .map_err(|_| ConversionFailure::new("JSON string", "PrismaValue::Json")),
                    custom_types::ENUM => Ok(PrismaValue::Enum(as_str("Enum")?.to_owned())),
                    _ => Err(ConversionFailure::new("unknown $type tag", "PrismaValue")),
                }
            }
            other => Ok(PrismaValue::from(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn decodes_tagged_scalars() {
        let value = PrismaValue::from_tagged_json(json!({
            "createdAt": { "$type": "DateTime", "value": "1900-10-10T01:10:10.001Z" },
            "big": { "$type": "BigInt", "value": "9223372036854775807" },
            "price": { "$type": "Decimal", "value": "123.45678910" },
            "blob": { "$type": "Bytes", "value": "AQIDBA==" },
            "meta": { "$type": "Json", "value": "{\"a\":1}" },
            "role": { "$type": "Enum", "value": "ADMIN" },
            "plain": [1, "two"]
        }))
        .unwrap();

        let obj = value.as_object().unwrap();

        assert_eq!(obj["createdAt"].to_string(), "1900-10-10T01:10:10.001Z");
        assert_eq!(obj["big"], PrismaValue::BigInt(i64::MAX));
        assert_eq!(obj["price"].to_string(), "123.4567891");
        assert_eq!(obj["blob"], PrismaValue::Bytes(vec![1, 2, 3, 4]));
        assert_eq!(obj["meta"], PrismaValue::Json(json!({ "a": 1 })));
        assert_eq!(obj["role"], PrismaValue::Enum("ADMIN".into()));
        assert_eq!(obj["plain"], PrismaValue::List(vec![PrismaValue::Int(1), "two".into()]));
    }

    #[test]
    fn unknown_tags_are_rejected() {
        let err = PrismaValue::from_tagged_json(json!({ "$type": "Foo", "value": "bar" })).unwrap_err();
        assert_eq!(err, ConversionFailure::new("unknown $type tag", "PrismaValue"));
    }
}
