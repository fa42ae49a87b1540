use super::{ArgError, InvalidArgError, PathSegment, TAB_SIZE, indent};
use bigdecimal::BigDecimal;
use dmmf::{SchemaArg, SchemaArgInputType, TypeLocation};
use prisma_value::{PrismaValue, encode_bytes, stringify_decimal, stringify_json};
use std::{fmt, str::FromStr};

#[derive(Debug, Clone)]
pub enum ArgValue<'a> {
    /// A scalar, enum or JSON value, including scalar lists.
    Scalar(PrismaValue),
    Object(Args<'a>),
    List(Vec<ArgListItem<'a>>),
}

/// An element of a list of input objects.
#[derive(Debug, Clone)]
pub enum ArgListItem<'a> {
    Scalar(PrismaValue),
    Object(Args<'a>),
    /// An element that is not an object, kept as an `InvalidType` placeholder.
    Invalid(Box<Arg<'a>>),
}

impl ArgListItem<'_> {
    fn has_error(&self) -> bool {
        match self {
            ArgListItem::Scalar(_) => false,
            ArgListItem::Object(args) => args.has_invalid_arg(),
            ArgListItem::Invalid(_) => true,
        }
    }

    fn is_object_like(&self) -> bool {
        match self {
            ArgListItem::Scalar(value) => value.is_object_like(),
            ArgListItem::Object(_) | ArgListItem::Invalid(_) => true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Args<'a> {
    args: Vec<Arg<'a>>,
    has_invalid_arg: bool,
}

impl<'a> Args<'a> {
    pub fn new(args: Vec<Arg<'a>>) -> Self {
        let has_invalid_arg = args.iter().any(Arg::has_error);

        Self { args, has_invalid_arg }
    }

    pub fn has_invalid_arg(&self) -> bool {
        self.has_invalid_arg
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arg<'a>> {
        self.args.iter()
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Arg<'a>> {
        self.args.iter().find(|arg| arg.key == key)
    }

    pub fn collect_errors(&self) -> Vec<ArgError<'a>> {
        if !self.has_invalid_arg {
            return Vec::new();
        }

        self.args.iter().flat_map(Arg::collect_errors).collect()
    }
}

impl fmt::Display for Args<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self
            .args
            .iter()
            .map(ToString::to_string)
            .filter(|arg| !arg.is_empty())
            .collect();

        f.write_str(&rendered.join("\n"))
    }
}

/// One `key: value` pair of an argument list. A `None` value stands for an argument that was
/// not provided; it only exists to carry a `MissingArg` error and is never serialized.
#[derive(Debug, Clone)]
pub struct Arg<'a> {
    key: String,
    value: Option<ArgValue<'a>>,
    error: Option<InvalidArgError<'a>>,
    schema_arg: Option<&'a SchemaArg>,
    input_type: Option<&'a SchemaArgInputType>,
    has_error: bool,
}

impl<'a> Arg<'a> {
    pub fn new(key: impl Into<String>, value: Option<ArgValue<'a>>) -> Self {
        let mut arg = Self {
            key: key.into(),
            value,
            error: None,
            schema_arg: None,
            input_type: None,
            has_error: false,
        };

        arg.has_error = arg.compute_has_error();
        arg
    }

    pub fn with_error(mut self, error: impl Into<Option<InvalidArgError<'a>>>) -> Self {
        self.error = error.into();
        self.has_error = self.compute_has_error();
        self
    }

    pub fn with_schema_arg(mut self, schema_arg: &'a SchemaArg) -> Self {
        self.schema_arg = Some(schema_arg);
        self
    }

    pub fn with_input_type(mut self, input_type: impl Into<Option<&'a SchemaArgInputType>>) -> Self {
        self.input_type = input_type.into();
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> Option<&ArgValue<'a>> {
        self.value.as_ref()
    }

    pub fn error(&self) -> Option<&InvalidArgError<'a>> {
        self.error.as_ref()
    }

    pub fn schema_arg(&self) -> Option<&'a SchemaArg> {
        self.schema_arg
    }

    pub fn input_type(&self) -> Option<&'a SchemaArgInputType> {
        self.input_type
    }

    pub fn is_enum(&self) -> bool {
        self.input_type.is_some_and(|t| t.location == TypeLocation::EnumTypes)
    }

    pub fn has_error(&self) -> bool {
        self.has_error
    }

    fn compute_has_error(&self) -> bool {
        self.error.is_some()
            || match &self.value {
                Some(ArgValue::Object(args)) => args.has_invalid_arg(),
                Some(ArgValue::List(items)) => items.iter().any(ArgListItem::has_error),
                _ => false,
            }
    }

    pub fn collect_errors(&self) -> Vec<ArgError<'a>> {
        if !self.has_error {
            return Vec::new();
        }

        let key = PathSegment::Key(self.key.clone());
        let mut errors = Vec::new();

        if let Some(error) = &self.error {
            errors.push(ArgError {
                path: vec![key.clone()],
                error: error.clone(),
            });
        }

        match &self.value {
            Some(ArgValue::Object(args)) => {
                errors.extend(
                    args.collect_errors()
                        .into_iter()
                        .map(|e| e.prefixed(std::slice::from_ref(&key))),
                );
            }
            Some(ArgValue::List(items)) => {
                for (idx, item) in items.iter().enumerate() {
                    let prefix = [key.clone(), PathSegment::Index(idx)];

                    match item {
                        ArgListItem::Object(args) => {
                            errors.extend(args.collect_errors().into_iter().map(|e| e.prefixed(&prefix)));
                        }
                        // The placeholder carries the list's key, its errors sit at the index itself.
                        ArgListItem::Invalid(arg) => {
                            errors.extend(arg.collect_errors().into_iter().map(|mut e| {
                                e.path.remove(0);
                                e.prefixed(&prefix)
                            }));
                        }
                        ArgListItem::Scalar(_) => (),
                    }
                }
            }
            _ => (),
        }

        errors
    }

    fn is_json(&self) -> bool {
        self.input_type.is_some_and(|t| t.is_scalar("Json"))
    }

    fn render_list(&self, items: Vec<(String, bool)>) -> String {
        let is_scalar = !items.iter().any(|(_, object_like)| *object_like);
        let rendered: Vec<String> = items.into_iter().map(|(s, _)| s).collect();

        if is_scalar {
            format!("{}: [{}]", self.key, rendered.join(", "))
        } else {
            format!("{}: [\n{}\n]", self.key, indent(&rendered.join(",\n"), TAB_SIZE))
        }
    }
}

impl fmt::Display for Arg<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            None => Ok(()),
            Some(ArgValue::Object(args)) => {
                write!(f, "{}: {{\n{}\n}}", self.key, indent(&args.to_string(), TAB_SIZE))
            }
            Some(ArgValue::List(items)) => {
                let items = items
                    .iter()
                    .map(|item| {
                        let rendered = match item {
                            ArgListItem::Scalar(value) => stringify(value, self.input_type),
                            ArgListItem::Object(args) => format!("{{\n{}\n}}", indent(&args.to_string(), TAB_SIZE)),
                            ArgListItem::Invalid(arg) => match arg.value() {
                                Some(ArgValue::Scalar(value)) => stringify(value, arg.input_type()),
                                _ => "null".to_owned(),
                            },
                        };

                        (rendered, item.is_object_like())
                    })
                    .collect();

                f.write_str(&self.render_list(items))
            }
            Some(ArgValue::Scalar(PrismaValue::List(values))) if !self.is_json() => {
                let items = values
                    .iter()
                    .map(|value| (stringify(value, self.input_type), value.is_object_like()))
                    .collect();

                f.write_str(&self.render_list(items))
            }
            Some(ArgValue::Scalar(value)) => write!(f, "{}: {}", self.key, stringify(value, self.input_type)),
        }
    }
}

/// Encodes one value in the engine's text protocol.
pub(crate) fn stringify(value: &PrismaValue, input_type: Option<&SchemaArgInputType>) -> String {
    let expects = |name: &str| input_type.is_some_and(|t| t.is_scalar(name));

    match value {
        PrismaValue::Bytes(bytes) => json_string(&encode_bytes(bytes)),
        PrismaValue::BigInt(i) => i.to_string(),
        // JSON travels as a string containing the document.
        _ if expects("Json") => match value {
            PrismaValue::Null => "null".to_owned(),
            PrismaValue::List(items) if input_type.is_some_and(|t| t.is_list) => {
                let encoded: Vec<String> = items.iter().map(|item| stringify_json(&item.to_json())).collect();
                serde_json::to_string(&encoded).unwrap_or_default()
            }
            _ => json_string(&stringify_json(&value.to_json())),
        },
        PrismaValue::Null => "null".to_owned(),
        PrismaValue::Decimal(dec) => stringify_decimal(dec),
        _ if expects("Decimal") => match decimal_value(value) {
            Some(dec) => stringify_decimal(&dec),
            None => pretty_json(value),
        },
        PrismaValue::String(s) | PrismaValue::Enum(s) if input_type.is_some_and(|t| t.location == TypeLocation::EnumTypes) => {
            s.clone()
        }
        _ => pretty_json(value),
    }
}

fn decimal_value(value: &PrismaValue) -> Option<BigDecimal> {
    match value {
        PrismaValue::Int(_) | PrismaValue::Float(_) | PrismaValue::String(_) => BigDecimal::from_str(&value.to_string()).ok(),
        other => other.as_decimal_like(),
    }
}

fn json_string(s: &str) -> String {
    serde_json::Value::String(s.to_owned()).to_string()
}

fn pretty_json(value: &PrismaValue) -> String {
    match value.to_json() {
        json @ (serde_json::Value::Object(_) | serde_json::Value::Array(_)) => {
            serde_json::to_string_pretty(&json).unwrap_or_else(|_| json.to_string())
        }
        other => stringify_json(&other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dmmf::InputTypeRef;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn scalar(name: &str, is_list: bool) -> SchemaArgInputType {
        SchemaArgInputType {
            name: name.to_owned(),
            typ: InputTypeRef::Scalar,
            is_list,
            location: TypeLocation::Scalar,
            namespace: None,
        }
    }

    #[test]
    fn scalars_use_the_wire_encoding() {
        let string = scalar("String", false);
        let json_type = scalar("Json", false);
        let decimal = scalar("Decimal", false);

        assert_eq!(stringify(&PrismaValue::from("a\"b"), Some(&string)), r#""a\"b""#);
        assert_eq!(stringify(&PrismaValue::BigInt(12), None), "12");
        assert_eq!(stringify(&PrismaValue::Bytes(vec![1, 2, 3]), None), r#""AQID""#);
        assert_eq!(stringify(&PrismaValue::Null, Some(&string)), "null");
        assert_eq!(
            stringify(&PrismaValue::from(json!({ "a": [1, "x"] })), Some(&json_type)),
            r#""{\"a\":[1,\"x\"]}""#
        );
        assert_eq!(stringify(&PrismaValue::from("123456789.12334"), Some(&decimal)), "123456789.12334");
        assert_eq!(stringify(&PrismaValue::from(12.3456), Some(&decimal)), "12.3456");
        assert_eq!(stringify(&PrismaValue::from(json!(1.5)), None), "1.5");
        assert_eq!(stringify(&PrismaValue::from(json!(3.0)), None), "3");
    }

    #[test]
    fn json_lists_encode_every_element() {
        let json_list = scalar("Json", true);
        let value = PrismaValue::from(json!([{ "a": 1 }, "b"]));

        assert_eq!(stringify(&value, Some(&json_list)), r#"["{\"a\":1}","\"b\""]"#);
    }

    #[test]
    fn scalar_lists_render_inline() {
        let string_list = scalar("String", true);
        let arg = Arg::new("tags", Some(ArgValue::Scalar(PrismaValue::from(json!(["a", "b"])))))
            .with_input_type(&string_list);

        assert_eq!(arg.to_string(), r#"tags: ["a", "b"]"#);
    }

    #[test]
    fn object_lists_render_one_element_per_block() {
        let id = Arg::new("id", Some(ArgValue::Scalar(PrismaValue::Int(1))));
        let arg = Arg::new("connect", Some(ArgValue::List(vec![ArgListItem::Object(Args::new(vec![id]))])));

        assert_eq!(arg.to_string(), "connect: [\n  {\n    id: 1\n  }\n]");
    }

    #[test]
    fn absent_args_are_not_rendered() {
        let args = Args::new(vec![
            Arg::new("take", Some(ArgValue::Scalar(PrismaValue::Int(2)))),
            Arg::new("skip", None),
        ]);

        assert_eq!(args.to_string(), "take: 2");
    }
}
