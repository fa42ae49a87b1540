//! Echoes a request's arguments as a JavaScript object literal, underlining invalid keys and
//! values and injecting placeholders for missing ones.

use colored::Colorize;
use once_cell::sync::Lazy;
use prisma_value::{PrismaValue, js_number, stringify_decimal, stringify_datetime, encode_bytes};
use regex::Regex;

const INDENT: &str = "  ";

static IDENTIFIER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*\??$").unwrap());

/// A placeholder for an argument the user has to (or may) provide.
#[derive(Debug, Clone, PartialEq)]
pub struct MissingItem {
    /// Dotted path of the item in the echoed object.
    pub path: String,
    pub is_required: bool,
    /// The expected type: a type name, or an object mapping field names to type names.
    pub value: PrismaValue,
}

#[derive(Debug, Clone, Copy)]
pub struct PrintJsonWithErrorsArgs<'a> {
    pub ast: &'a PrismaValue,
    pub key_paths: &'a [String],
    pub value_paths: &'a [String],
    pub missing_items: &'a [MissingItem],
}

pub fn print_json_with_errors(args: PrintJsonWithErrorsArgs<'_>) -> String {
    let mut ast = args.ast.clone();

    for item in args.missing_items {
        deep_set(&mut ast, &item.path, item.value.clone());
    }

    JsonPrinter { args }.value(&ast, &mut Vec::new(), 0, false)
}

/// Renders a value as a JavaScript object literal, without any annotation.
pub fn stringify_object(value: &PrismaValue) -> String {
    let args = PrintJsonWithErrorsArgs {
        ast: value,
        key_paths: &[],
        value_paths: &[],
        missing_items: &[],
    };

    JsonPrinter { args }.value(value, &mut Vec::new(), 0, false)
}

struct JsonPrinter<'a> {
    args: PrintJsonWithErrorsArgs<'a>,
}

impl JsonPrinter<'_> {
    fn value(&self, value: &PrismaValue, path: &mut Vec<String>, depth: usize, raw_strings: bool) -> String {
        match value {
            PrismaValue::Object(obj) if obj.is_empty() => "{}".to_owned(),
            PrismaValue::Object(obj) => {
                let entries: Vec<String> = obj
                    .iter()
                    .enumerate()
                    .map(|(idx, (key, value))| {
                        let eol = if idx + 1 < obj.len() { "," } else { "" };
                        path.push(key.clone());
                        let entry = self.entry(Some(key), value, path, depth + 1, eol, raw_strings);
                        path.pop();
                        entry
                    })
                    .collect();

                format!("{{\n{}\n{}}}", entries.join("\n"), INDENT.repeat(depth))
            }
            PrismaValue::List(items) if items.is_empty() => "[]".to_owned(),
            PrismaValue::List(items) => {
                let entries: Vec<String> = items
                    .iter()
                    .enumerate()
                    .map(|(idx, value)| {
                        let eol = if idx + 1 < items.len() { "," } else { "" };
                        path.push(idx.to_string());
                        let entry = self.entry(None, value, path, depth + 1, eol, raw_strings);
                        path.pop();
                        entry
                    })
                    .collect();

                format!("[\n{}\n{}]", entries.join("\n"), INDENT.repeat(depth))
            }
            PrismaValue::Json(json) => self.value(&PrismaValue::from(json.clone()), path, depth, raw_strings),
            scalar => scalar_literal(scalar, raw_strings),
        }
    }

    fn entry(
        &self,
        key: Option<&str>,
        value: &PrismaValue,
        path: &mut Vec<String>,
        depth: usize,
        eol: &str,
        raw_strings: bool,
    ) -> String {
        let indent = INDENT.repeat(depth);
        let dotted = path.join(".");
        let key = key.map(key_literal);

        if let Some(item) = self.args.missing_items.iter().find(|item| item.path == dotted) {
            let value_str = self.value(value, path, depth, true);
            let marker = if item.is_required { "+" } else { "?" };
            let optional_suffix = if item.is_required { "" } else { "?" };
            let line = match &key {
                Some(key) => format!("{indent}{key}{optional_suffix}: {value_str}{eol}"),
                None => format!("{indent}{value_str}{eol}"),
            };
            let line = prefix_lines(&line, marker);

            return if item.is_required {
                line.bright_green().to_string()
            } else {
                line.green().dimmed().to_string()
            };
        }

        let stringified = self.value(value, path, depth, raw_strings);
        let key_error = self.args.key_paths.contains(&dotted);
        let value_error = self.args.value_paths.contains(&dotted);

        let value_str = if value_error {
            stringified.bright_red().to_string()
        } else {
            stringified.clone()
        };

        let mut output = match &key {
            Some(key) if key_error => format!("{indent}{}: {value_str}{eol}", key.bright_red()),
            Some(key) => format!("{indent}{key}: {value_str}{eol}"),
            None => format!("{indent}{value_str}{eol}"),
        };

        if key_error || value_error {
            let key_len = key.as_ref().map(|k| k.chars().count()).unwrap_or(0);
            let key_scribbles = if key_error {
                "~".repeat(key_len).bright_red().to_string()
            } else {
                " ".repeat(key_len)
            };

            let value_scribbles = if value_error {
                let first_line = stringified.lines().next().unwrap_or_default();
                let separator = if key.is_some() { "  " } else { "" };
                format!("{separator}{}", "~".repeat(first_line.chars().count()).bright_red())
            } else {
                String::new()
            };

            let mut lines: Vec<String> = output.split('\n').map(ToOwned::to_owned).collect();
            lines.insert(1, format!("{indent}{key_scribbles}{value_scribbles}"));
            output = lines.join("\n");
        }

        output
    }
}

fn key_literal(key: &str) -> String {
    if IDENTIFIER.is_match(key) {
        key.to_owned()
    } else {
        quote(key)
    }
}

fn scalar_literal(value: &PrismaValue, raw_strings: bool) -> String {
    match value {
        PrismaValue::String(s) if raw_strings => s.clone(),
        PrismaValue::String(s) => quote(s),
        PrismaValue::Null => "null".to_owned(),
        PrismaValue::Boolean(b) => b.to_string(),
        PrismaValue::Int(i) => i.to_string(),
        PrismaValue::Float(f) => js_number(*f),
        PrismaValue::BigInt(i) => format!("{i}n"),
        PrismaValue::Enum(e) => e.clone(),
        PrismaValue::DateTime(dt) => format!("new Date('{}')", stringify_datetime(dt)),
        PrismaValue::Decimal(dec) => format!("new Prisma.Decimal('{}')", stringify_decimal(dec)),
        PrismaValue::Bytes(bytes) => format!("Buffer.from('{}', 'base64')", encode_bytes(bytes)),
        other => other.to_string(),
    }
}

fn quote(s: &str) -> String {
    let escaped = s
        .replace('\\', "\\\\")
        .replace('\'', "\\'")
        .replace('\n', "\\n")
        .replace('\r', "\\r");

    format!("'{escaped}'")
}

/// Replaces the first column of every line with the given marker.
fn prefix_lines(s: &str, marker: &str) -> String {
    s.split('\n')
        .map(|line| match line.char_indices().nth(1) {
            Some((idx, _)) => format!("{marker}{}", &line[idx..]),
            None => marker.to_owned(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn deep_set(target: &mut PrismaValue, path: &str, value: PrismaValue) {
    let segments: Vec<&str> = path.split('.').filter(|s| !s.is_empty()).collect();
    let Some((last, parents)) = segments.split_last() else {
        return;
    };

    let mut current = target;

    for segment in parents {
        current = match current {
            PrismaValue::List(items) => match segment.parse::<usize>().ok().and_then(|idx| items.get_mut(idx)) {
                Some(item) => item,
                None => return,
            },
            other => {
                if !other.is_object() {
                    *other = PrismaValue::Object(Default::default());
                }

                match other.as_object_mut() {
                    Some(obj) => obj
                        .entry((*segment).to_owned())
                        .or_insert_with(|| PrismaValue::Object(Default::default())),
                    None => return,
                }
            }
        };
    }

    if !current.is_object() {
        *current = PrismaValue::Object(Default::default());
    }

    if let Some(obj) = current.as_object_mut() {
        obj.insert((*last).to_owned(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strip_ansi;
    use expect_test::expect;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn print(ast: serde_json::Value, key_paths: &[&str], value_paths: &[&str], missing: &[MissingItem]) -> String {
        let ast = PrismaValue::from(ast);
        let key_paths: Vec<String> = key_paths.iter().map(|s| s.to_string()).collect();
        let value_paths: Vec<String> = value_paths.iter().map(|s| s.to_string()).collect();

        strip_ansi(&print_json_with_errors(PrintJsonWithErrorsArgs {
            ast: &ast,
            key_paths: &key_paths,
            value_paths: &value_paths,
            missing_items: missing,
        }))
    }

    #[test]
    fn echoes_plain_objects_as_literals() {
        let printed = print(json!({ "where": { "id": "1", "n": 1.5, "tags": [] }, "take": 10 }), &[], &[], &[]);

        assert_eq!(
            printed,
            indoc! {"
                {
                  where: {
                    id: '1',
                    n: 1.5,
                    tags: []
                  },
                  take: 10
                }"}
        );
    }

    #[test]
    fn underlines_invalid_keys_and_values() {
        let printed = print(
            json!({ "where": { "idd": "1", "email": 5 } }),
            &["where.idd"],
            &["where.email"],
            &[],
        );

        expect![[r#"
            {
              where: {
                idd: '1',
                ~~~
                email: 5
                       ~
              }
            }"#]]
        .assert_eq(&printed);
    }

    #[test]
    fn injects_missing_items_with_markers() {
        let missing = vec![
            MissingItem {
                path: "data.email".to_owned(),
                is_required: true,
                value: PrismaValue::from("String"),
            },
            MissingItem {
                path: "data.name".to_owned(),
                is_required: false,
                value: PrismaValue::from("String | null"),
            },
        ];

        let printed = print(json!({ "data": {} }), &[], &[], &missing);

        assert_eq!(
            printed,
            indoc! {"
                {
                  data: {
                +   email: String,
                ?   name?: String | null
                  }
                }"}
        );
    }

    #[test]
    fn missing_objects_render_their_shape() {
        let missing = vec![MissingItem {
            path: "data".to_owned(),
            is_required: true,
            value: PrismaValue::from(json!({ "title": "String", "published?": "Boolean" })),
        }];

        let printed = print(json!({}), &[], &[], &missing);

        assert_eq!(
            printed,
            indoc! {"
                {
                + data: {
                +   title: String,
                +   published?: Boolean
                + }
                }"}
        );
    }
}
