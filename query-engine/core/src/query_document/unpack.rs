//! Maps an engine response onto the document's selection, turning the wire encodings of rich
//! scalars back into values.

use super::{Document, Field};
use crate::UnpackError;
use bigdecimal::BigDecimal;
use dmmf::TypeLocation;
use prisma_value::{PrismaValue, decode_bytes, parse_datetime};
use std::str::FromStr;

/// Reads the value at `path` (root field first) from `data` and deserializes the scalars of
/// the selection below it. Missing values come back as `Null`.
pub fn unpack(document: &Document<'_>, path: &[String], mut data: serde_json::Value) -> Result<PrismaValue, UnpackError> {
    let pointer: String = path
        .iter()
        .map(|segment| format!("/{}", segment.replace('~', "~0").replace('/', "~1")))
        .collect();

    let Some(result) = data.pointer_mut(&pointer).map(serde_json::Value::take) else {
        return Ok(PrismaValue::Null);
    };

    if !(result.is_object() || result.is_array()) {
        return Ok(PrismaValue::from(result));
    }

    let field = get_field(document, path)?;
    let mut result = PrismaValue::from(result);
    map_scalars(field, &mut result);

    Ok(result)
}

/// Follows `path` through the fields of the document.
pub fn get_field<'d, 'a>(document: &'d Document<'a>, path: &[String]) -> Result<&'d Field<'a>, UnpackError> {
    let (first, rest) = path.split_first().ok_or(UnpackError::EmptyPath)?;

    let mut pointer = document
        .children()
        .iter()
        .find(|child| child.name() == first)
        .ok_or_else(|| UnpackError::FieldNotFound {
            name: first.clone(),
            document: document.to_string(),
        })?;

    for key in rest {
        if pointer.children().is_none() {
            return Err(UnpackError::NoChildren {
                field: pointer.name().to_owned(),
                child: key.clone(),
            });
        }

        pointer = pointer.child(key).ok_or_else(|| UnpackError::ChildNotFound {
            child: key.clone(),
            field: pointer.name().to_owned(),
        })?;
    }

    Ok(pointer)
}

fn map_scalars(field: &Field<'_>, data: &mut PrismaValue) {
    let Some(children) = field.children() else {
        return;
    };

    if field.schema_field().is_none() {
        return;
    }

    for child in children {
        let Some(schema_field) = child.schema_field() else {
            continue;
        };

        let output_type = &schema_field.output_type;

        if output_type.location == TypeLocation::Scalar {
            if let Some(deserialize) = deserializer(&output_type.name) {
                for_each_entry(data, |entry| {
                    if let Some(value) = entry.as_object_mut().and_then(|o| o.get_mut(child.name())) {
                        apply(deserialize, child.name(), value);
                    }
                });
            }
        }

        if output_type.location == TypeLocation::OutputObjectTypes {
            for_each_entry(data, |entry| {
                if let Some(value) = entry.as_object_mut().and_then(|o| o.get_mut(child.name())) {
                    map_scalars(child, value);
                }
            });
        }
    }
}

/// Calls `f` for the value itself, or for every element of a list of rows.
fn for_each_entry(data: &mut PrismaValue, mut f: impl FnMut(&mut PrismaValue)) {
    match data {
        PrismaValue::List(entries) => entries.iter_mut().for_each(f),
        other => f(other),
    }
}

type Deserializer = fn(&PrismaValue) -> Option<PrismaValue>;

fn deserializer(type_name: &str) -> Option<Deserializer> {
    let deserialize: Deserializer = match type_name {
        "DateTime" => |value| {
            let dt = parse_datetime(value.as_str()?).ok()?;
            Some(PrismaValue::DateTime(dt))
        },
        "Json" => |value| {
            let json = serde_json::from_str(value.as_str()?).ok()?;
            Some(PrismaValue::Json(json))
        },
        "Bytes" => |value| decode_bytes(value.as_str()?).ok().map(PrismaValue::Bytes),
        "Decimal" => |value| match value {
            PrismaValue::String(_) | PrismaValue::Int(_) | PrismaValue::Float(_) => {
                BigDecimal::from_str(&value.to_string()).ok().map(PrismaValue::Decimal)
            }
            _ => None,
        },
        "BigInt" => |value| match value {
            PrismaValue::String(s) => s.parse().ok().map(PrismaValue::BigInt),
            PrismaValue::Int(i) => Some(PrismaValue::BigInt(*i)),
            _ => None,
        },
        _ => return None,
    };

    Some(deserialize)
}

/// Null values are left alone, scalar lists are mapped element by element.
fn apply(deserialize: Deserializer, field_name: &str, value: &mut PrismaValue) {
    let mut convert = |value: &mut PrismaValue| match deserialize(value) {
        Some(converted) => *value = converted,
        None => tracing::warn!(field = field_name, value = %value, "could not deserialize response scalar"),
    };

    match value {
        PrismaValue::Null => (),
        PrismaValue::List(items) => items.iter_mut().for_each(&mut convert),
        other => convert(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query_document::{make_document, test_utils::blog};
    use dmmf::RootType;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn rich_scalars_are_deserialized() {
        let dmmf = blog();
        let document = make_document(&dmmf, RootType::Query, "findManyUser", None);

        let data = json!({
            "findManyUser": [{
                "id": "1",
                "createdAt": "2020-01-02T03:04:05.000Z",
                "meta": "{\"a\":1}",
                "avatar": "AQID",
                "balance": "1.5",
                "big": "9007199254740993",
                "name": null,
            }]
        });

        let result = unpack(&document, &["findManyUser".to_owned()], data).unwrap();
        let row = result.as_list().unwrap()[0].as_object().unwrap();

        assert!(matches!(row["createdAt"], PrismaValue::DateTime(_)));
        assert_eq!(row["meta"], PrismaValue::Json(json!({ "a": 1 })));
        assert_eq!(row["avatar"], PrismaValue::Bytes(vec![1, 2, 3]));
        assert_eq!(row["balance"], PrismaValue::Decimal(BigDecimal::from_str("1.5").unwrap()));
        assert_eq!(row["big"], PrismaValue::BigInt(9007199254740993));
        assert_eq!(row["name"], PrismaValue::Null);
        assert_eq!(row["id"], PrismaValue::from("1"));
    }

    #[test]
    fn nested_relations_are_deserialized() {
        let dmmf = blog();
        let args = PrismaValue::from(json!({ "select": { "id": true, "author": { "select": { "createdAt": true } } } }));
        let document = make_document(&dmmf, RootType::Query, "findManyPost", Some(&args));

        let data = json!({ "findManyPost": [{ "id": 1, "author": { "createdAt": "2020-01-02T03:04:05.000Z" } }] });
        let result = unpack(&document, &["findManyPost".to_owned()], data).unwrap();

        let author = &result.as_list().unwrap()[0].as_object().unwrap()["author"];
        assert!(matches!(author.as_object().unwrap()["createdAt"], PrismaValue::DateTime(_)));
    }

    #[test]
    fn missing_and_scalar_results_pass_through() {
        let dmmf = blog();
        let document = make_document(&dmmf, RootType::Query, "findUniqueUser", None);
        let path = ["findUniqueUser".to_owned()];

        assert_eq!(unpack(&document, &path, json!({})).unwrap(), PrismaValue::Null);
        assert_eq!(unpack(&document, &path, json!({ "findUniqueUser": null })).unwrap(), PrismaValue::Null);
    }

    #[test]
    fn unknown_paths_are_reported() {
        let dmmf = blog();
        let document = make_document(&dmmf, RootType::Query, "findUniqueUser", None);

        let err = get_field(&document, &["findUniqueUser".to_owned(), "nope".to_owned()]).unwrap_err();
        assert_eq!(err.to_string(), "Can't find child nope of field findUniqueUser");

        let err = get_field(&document, &["findManyPost".to_owned()]).unwrap_err();
        assert!(matches!(err, UnpackError::FieldNotFound { .. }));
    }
}
