//! Classification of runtime values against the wire-level types of the schema, and the
//! "did you mean" suggestions used by the error messages.

use dmmf::{DmmfHelper, SchemaArgInputType, TypeNamespace};
use once_cell::sync::Lazy;
use prisma_value::{PrismaValue, parse_datetime};
use regex::Regex;

static RFC_3339: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{4}-(0[1-9]|1[012])-(0[1-9]|[12][0-9]|3[01])T([01][0-9]|2[0-3]):([0-5][0-9]):([0-5][0-9]|60))(\.\d{1,})?(([Z])|([+|-]([01][0-9]|2[0-3]):[0-5][0-9]))$").unwrap()
});

static UUID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[1-5][0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}$").unwrap());

static DECIMAL_STRING: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^-?(\d+(\.\d*)?|\.\d+)(e[+-]?\d+)?$").unwrap());

/// Prisma enums whose members are only accepted as explicit enum values, never as strings.
pub const SYMBOL_ENUMS: &[&str] = &["JsonNullValueInput", "NullableJsonNullValueInput", "JsonNullValueFilter"];

/// Scale applied to the input length when bounding the edit distance of a suggestion.
const SUGGESTION_LENGTH_FACTOR: f64 = 1.1;

pub fn wrap_with_list(name: &str, is_list: bool) -> String {
    if is_list {
        format!("List<{name}>")
    } else {
        name.to_owned()
    }
}

pub fn is_decimal_string(value: &str) -> bool {
    DECIMAL_STRING.is_match(value)
}

/// Whether the value is a member of the enum the input type points to.
pub fn is_valid_enum_value(value: &PrismaValue, input_type: Option<&SchemaArgInputType>, dmmf: &DmmfHelper) -> bool {
    let Some((input_type, id)) = input_type.and_then(|t| t.as_enum().map(|id| (t, id))) else {
        return false;
    };

    let schema_enum = &dmmf[id];

    if input_type.namespace == Some(TypeNamespace::Prisma) && SYMBOL_ENUMS.contains(&schema_enum.name.as_str()) {
        return matches!(value, PrismaValue::Enum(member) if schema_enum.contains(member));
    }

    value.as_enum_candidate().is_some_and(|member| schema_enum.contains(member))
}

/// The wire type a value would be sent as, e.g. `Int`, `DateTime` or `List<String | UUID>`.
/// The expected input type only matters for enums and decimal-like objects.
pub fn graphql_type(value: &PrismaValue, input_type: Option<&SchemaArgInputType>, dmmf: &DmmfHelper) -> String {
    let expects_decimal = input_type.is_some_and(|t| t.is_scalar("Decimal"));

    match value {
        PrismaValue::Null => "null".to_owned(),
        PrismaValue::BigInt(_) => "BigInt".to_owned(),
        PrismaValue::Decimal(_) => "Decimal".to_owned(),
        PrismaValue::Object(_) if expects_decimal && value.as_decimal_like().is_some() => "Decimal".to_owned(),
        PrismaValue::Bytes(_) => "Bytes".to_owned(),
        _ if is_valid_enum_value(value, input_type, dmmf) => input_type.map(|t| t.name.clone()).unwrap_or_default(),
        PrismaValue::List(items) => {
            let mut types: Vec<String> = Vec::new();

            for item in items {
                let typ = graphql_type(item, input_type, dmmf);

                if !types.contains(&typ) {
                    types.push(typ);
                }
            }

            if types.iter().any(|t| t == "Float") && types.iter().any(|t| t == "Int") {
                types = vec!["Float".to_owned()];
            }

            format!("List<{}>", types.join(" | "))
        }
        PrismaValue::Int(_) => "Int".to_owned(),
        PrismaValue::Float(f) if f.is_finite() && f.trunc() == *f => "Int".to_owned(),
        PrismaValue::Float(_) => "Float".to_owned(),
        PrismaValue::DateTime(_) => "DateTime".to_owned(),
        PrismaValue::String(s) if UUID.is_match(s) => "UUID".to_owned(),
        PrismaValue::String(s) if RFC_3339.is_match(s) && parse_datetime(s).is_ok() => "DateTime".to_owned(),
        PrismaValue::String(_) => "String".to_owned(),
        PrismaValue::Boolean(_) => "Boolean".to_owned(),
        PrismaValue::Enum(_) => "Symbol".to_owned(),
        PrismaValue::Object(_) | PrismaValue::Json(_) => "Json".to_owned(),
    }
}

/// Checks a scalar or enum value against one candidate input type, allowing the safe
/// coercions between wire types (`Int` into `Float`, `UUID` into `String`, ...). `null` always
/// passes here, nullability is checked before.
pub fn has_correct_scalar_type(value: &PrismaValue, input_type: &SchemaArgInputType, dmmf: &DmmfHelper) -> bool {
    let expected = wrap_with_list(&input_type.name, input_type.is_list);
    let actual = graphql_type(value, Some(input_type), dmmf);

    if actual == expected || (input_type.is_list && actual == "List<>") {
        return true;
    }

    match (actual.as_str(), expected.as_str()) {
        (actual, "Json") if actual != "Symbol" => true,
        ("Int", "BigInt")
        | ("List<Int>", "List<BigInt>")
        | ("List<BigInt | Int>", "List<BigInt>")
        | ("List<Int | BigInt>", "List<BigInt>") => true,
        ("Int" | "Float", "Decimal") => true,
        ("List<Int>" | "List<Float>", "List<Decimal>") => true,
        ("List<String>", "List<Decimal>") => value
            .as_list()
            .is_some_and(|items| items.iter().all(|item| item.as_str().is_some_and(is_decimal_string))),
        ("DateTime", "String")
        | ("List<DateTime>", "List<String>")
        | ("UUID", "String")
        | ("List<UUID>", "List<String>")
        | ("String", "ID")
        | ("List<String>", "List<ID>")
        | ("List<String>", "List<Json>")
        | ("List<String | UUID>" | "List<UUID | String>", "List<String>")
        | ("Int", "Float")
        | ("List<Int>", "List<Float>")
        | ("Int", "Long")
        | ("List<Int>", "List<Long>") => true,
        ("String", "Decimal") => value.as_str().is_some_and(is_decimal_string),
        _ => value.is_null(),
    }
}

/// The closest possibility by Levenshtein distance, if it is close enough to be a plausible
/// typo. On equal distance the first possibility wins.
pub fn get_suggestion<'p>(input: &str, possibilities: impl IntoIterator<Item = &'p str>) -> Option<String> {
    let possibilities: Vec<&str> = possibilities.into_iter().collect();

    let mut best_distance = possibilities
        .iter()
        .map(|p| p.chars().count() as f64 * 3.0)
        .fold(input.chars().count() as f64 * SUGGESTION_LENGTH_FACTOR, f64::min);
    let mut best = None;

    for possibility in possibilities {
        let distance = strsim::levenshtein(input, possibility) as f64;

        if distance < best_distance {
            best_distance = distance;
            best = Some(possibility);
        }
    }

    best.map(ToOwned::to_owned)
}
