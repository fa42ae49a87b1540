use super::{
    ArgError, Document, FieldError, InvalidArgError, InvalidFieldError, PathSegment, indent,
    messages::{ErrorRenderer, TypeView, input_type_to_json, union_type_names},
};
use colored::Colorize;
use dmmf::SchemaField;
use itertools::Itertools;
use prisma_value::{PrismaObject, PrismaValue};
use user_facing_errors::{
    Callsite, ErrorFormat, MissingItem, PrintJsonWithErrorsArgs, PrintStackArgs, ValidationError,
    print_json_with_errors, print_stack, strip_ansi,
};

/// Where the problems of a document show up in the echoed input.
#[derive(Debug, Default)]
struct Annotations {
    key_paths: Vec<String>,
    value_paths: Vec<String>,
    missing_items: Vec<MissingItem>,
}

impl Document<'_> {
    /// Reports every problem recorded while the document was built as one error, rendered
    /// against `select`, the arguments the user passed. `original_method` names the client
    /// method (`user.findMany`) in the header.
    pub fn validate(
        &self,
        select: Option<&PrismaValue>,
        is_top_level_query: bool,
        original_method: Option<&str>,
        error_format: ErrorFormat,
        callsite: Option<&Callsite>,
    ) -> Result<(), ValidationError> {
        let empty = PrismaValue::Object(PrismaObject::new());
        let select = select.unwrap_or(&empty);

        let invalid_children: Vec<_> = self
            .children()
            .iter()
            .filter(|child| child.has_invalid_child() || child.has_invalid_arg())
            .collect();

        if invalid_children.is_empty() {
            return Ok(());
        }

        let is_set = |key: &str| select.as_object().and_then(|o| o.get(key)).is_some_and(PrismaValue::is_truthy);
        let prefix = if !is_set("select") && is_set("include") {
            "include"
        } else {
            "select"
        };

        let strip_root = |mut path: Vec<PathSegment>| {
            if !is_top_level_query && !path.is_empty() {
                path.remove(0);
            }
            path
        };

        let mut field_errors = Vec::new();
        let mut arg_errors = Vec::new();

        for child in invalid_children {
            let (fields, args) = child.collect_errors(prefix);

            field_errors.extend(fields.into_iter().map(|e| FieldError {
                path: strip_root(e.path),
                error: e.error,
            }));
            arg_errors.extend(args.into_iter().map(|e| ArgError {
                path: strip_root(e.path),
                error: e.error,
            }));
        }

        tracing::debug!(
            field_errors = field_errors.len(),
            arg_errors = arg_errors.len(),
            "query document failed validation"
        );

        let top_level_name = self.children().first().map(|c| c.name()).unwrap_or_default();
        let annotations = self.annotate(&field_errors, &arg_errors, select);

        let has_required_missing = arg_errors.iter().any(|e| is_missing(e, true));
        let has_optional_missing = arg_errors.iter().any(|e| is_missing(e, false));
        let has_missing = has_required_missing || has_optional_missing;

        let renderer = ErrorRenderer {
            dmmf: self.dmmf(),
            root_field: top_level_name,
            minimal: error_format == ErrorFormat::Minimal,
        };

        let arg_messages: Vec<String> = arg_errors
            .iter()
            .filter(|e| !is_missing(e, false))
            .map(|e| renderer.arg_error(e, has_missing))
            .collect();

        let field_messages: Vec<String> = field_errors
            .iter()
            .map(|e| renderer.field_error(e, !annotations.missing_items.is_empty()))
            .collect();

        let messages = format!("{}\n{}", arg_messages.join("\n"), field_messages.join("\n"));

        if error_format == ErrorFormat::Minimal {
            return Err(ValidationError::new(strip_ansi(&messages), error_format));
        }

        let query_name = if is_top_level_query {
            self.root_type().to_string()
        } else {
            top_level_name.to_owned()
        };
        let original_method = original_method.unwrap_or(&query_name);

        let stack = print_stack(PrintStackArgs {
            callsite,
            original_method,
            show_colors: error_format.show_colors(),
            is_validation_error: true,
        });

        let mut ast = if is_top_level_query {
            PrismaValue::Object(PrismaObject::from([(top_level_name.to_owned(), select.clone())]))
        } else {
            select.clone()
        };
        let mut annotations = annotations;

        // Aggregations are called without the `select` level, the echo leaves it out as well.
        if original_method.ends_with("aggregate") {
            ast = remove_select_from_object(&ast);
            annotations = annotations.without_select();
        }

        let json = print_json_with_errors(PrintJsonWithErrorsArgs {
            ast: &ast,
            key_paths: &annotations.key_paths,
            value_paths: &annotations.value_paths,
            missing_items: &annotations.missing_items,
        });

        let indented = indent(&json, stack.indent);
        let pad = " ".repeat(stack.indent);
        let echo = indented.strip_prefix(pad.as_str()).unwrap_or(&indented);

        let message = format!(
            "{}{echo}{}\n\n{messages}{}\n",
            stack.stack,
            stack.after_lines.dimmed(),
            legend(has_required_missing, has_optional_missing)
        );

        let message = if error_format == ErrorFormat::Pretty {
            message
        } else {
            strip_ansi(&message)
        };

        Err(ValidationError::new(message, error_format))
    }

    fn annotate(&self, field_errors: &[FieldError<'_>], arg_errors: &[ArgError<'_>], select: &PrismaValue) -> Annotations {
        let mut annotations = Annotations::default();
        let dmmf = self.dmmf();

        for error in field_errors {
            let path = normalize_path(&error.path, select);
            let dotted = join(&path);

            match &error.error {
                InvalidFieldError::InvalidFieldName {
                    output_type, is_include, ..
                } => {
                    let options = output_type
                        .iter()
                        .flat_map(|o| o.fields.iter())
                        .filter(|f| !is_include || f.is_relation());
                    annotations.suggest(&path, options);
                    annotations.key_paths.push(dotted);
                }
                InvalidFieldError::IncludeAndSelect { .. } => {
                    annotations.key_paths.push("select".to_owned());
                    annotations.key_paths.push("include".to_owned());
                }
                InvalidFieldError::EmptySelect { field }
                | InvalidFieldError::NoTrueSelect { field }
                | InvalidFieldError::EmptyInclude { field } => {
                    let relations_only = matches!(error.error, InvalidFieldError::EmptyInclude { .. });

                    if let Some(output) = field.output_type.as_object().map(|id| &dmmf[id]) {
                        let options = output.fields.iter().filter(|f| !relations_only || f.is_relation());
                        annotations.suggest(&path, options);
                    }

                    annotations.value_paths.push(dotted);
                }
                InvalidFieldError::InvalidFieldType { .. } => annotations.value_paths.push(dotted),
            }
        }

        for error in arg_errors {
            let dotted = join(&normalize_path(&error.path, select));

            match &error.error {
                InvalidArgError::InvalidName { .. } => annotations.key_paths.push(dotted),
                InvalidArgError::AtLeastOne { .. } => (),
                InvalidArgError::MissingArg { missing_arg, .. } => {
                    let value = match missing_arg.input_types.as_slice() {
                        [single] => {
                            let name_only = dotted.split("where.").count() == 2;
                            input_type_to_json(TypeView::of(single, dmmf), dmmf, true, name_only)
                        }
                        many => PrismaValue::from(union_type_names(many, dmmf)),
                    };

                    annotations.missing_items.push(MissingItem {
                        path: dotted,
                        is_required: missing_arg.is_required,
                        value,
                    });
                }
                _ => annotations.value_paths.push(dotted),
            }
        }

        annotations
    }
}

impl Annotations {
    /// Offers `fields` as optional `true` entries next to the last segment of `path`.
    fn suggest<'f>(&mut self, path: &[PathSegment], fields: impl Iterator<Item = &'f SchemaField>) {
        let parent = join(&path[..path.len().saturating_sub(1)]);

        for field in fields {
            let path = if parent.is_empty() {
                field.name.clone()
            } else {
                format!("{parent}.{}", field.name)
            };

            self.missing_items.push(MissingItem {
                path,
                is_required: false,
                value: PrismaValue::from("true"),
            });
        }
    }

    fn without_select(self) -> Self {
        Annotations {
            key_paths: self.key_paths.iter().map(|p| remove_select_from_path(p)).collect(),
            value_paths: self.value_paths.iter().map(|p| remove_select_from_path(p)).collect(),
            missing_items: self
                .missing_items
                .into_iter()
                .map(|item| MissingItem {
                    path: remove_select_from_path(&item.path),
                    ..item
                })
                .collect(),
        }
    }
}

fn is_missing(error: &ArgError<'_>, required: bool) -> bool {
    matches!(&error.error, InvalidArgError::MissingArg { missing_arg, .. } if missing_arg.is_required == required)
}

fn legend(has_required: bool, has_optional: bool) -> String {
    let mut legend = String::new();

    if has_required {
        legend.push_str(&format!(
            "\n{}{} {}",
            "Note: Lines with ".dimmed(),
            "+".bright_green(),
            "are required".dimmed()
        ));
    }

    if has_optional {
        if legend.is_empty() {
            legend.push('\n');
        }

        let optional = if has_required {
            format!(", lines with {} are optional", "?".green())
        } else {
            format!("Note: Lines with {} are optional", "?".green())
        };

        legend.push_str(&optional.dimmed().to_string());
        legend.push_str(&".".dimmed().to_string());
    }

    legend
}

/// Maps an error path onto what the user typed. Lists of one element may have been given as
/// the bare element, those `0` indices are dropped.
fn normalize_path(path: &[PathSegment], select: &PrismaValue) -> Vec<PathSegment> {
    let mut pointer = Some(select);
    let mut normalized = Vec::with_capacity(path.len());

    for segment in path {
        if *segment == PathSegment::Index(0) && !pointer.is_some_and(PrismaValue::is_list) {
            continue;
        }

        match segment {
            PathSegment::Key(key) if key == "select" => {
                pointer = child(pointer, "select")
                    .filter(|v| v.is_truthy())
                    .or_else(|| child(pointer, "include"));
            }
            PathSegment::Key(key) => {
                if let Some(next) = child(pointer, key).filter(|v| v.is_truthy()) {
                    pointer = Some(next);
                }
            }
            PathSegment::Index(idx) => {
                if let Some(next) = pointer.and_then(|p| p.as_list()).and_then(|l| l.get(*idx)).filter(|v| v.is_truthy()) {
                    pointer = Some(next);
                }
            }
        }

        normalized.push(segment.clone());
    }

    normalized
}

fn child<'v>(pointer: Option<&'v PrismaValue>, key: &str) -> Option<&'v PrismaValue> {
    pointer?.as_object()?.get(key)
}

fn join(path: &[PathSegment]) -> String {
    super::error::join_path(path)
}

fn remove_select_from_path(path: &str) -> String {
    path.split('.').filter(|p| *p != "select").join(".")
}

fn remove_select_from_object(value: &PrismaValue) -> PrismaValue {
    let Some(obj) = value.as_object() else {
        return value.clone();
    };

    let mut copy = PrismaObject::new();

    for (key, value) in obj {
        match (key.as_str(), value.as_object()) {
            ("select", Some(select)) => {
                for (sub_key, sub_value) in select {
                    copy.insert(sub_key.clone(), remove_select_from_object(sub_value));
                }
            }
            ("select", None) => (),
            _ => {
                copy.insert(key.clone(), remove_select_from_object(value));
            }
        }
    }

    PrismaValue::Object(copy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn path(segments: &[PathSegment]) -> Vec<PathSegment> {
        segments.to_vec()
    }

    #[test]
    fn normalize_path_drops_indices_of_auto_wrapped_lists() {
        let select = PrismaValue::from(json!({ "where": { "AND": { "id": "1" } } }));
        let normalized = normalize_path(
            &path(&["where".into(), "AND".into(), PathSegment::Index(0), "id".into()]),
            &select,
        );

        assert_eq!(join(&normalized), "where.AND.id");

        let select = PrismaValue::from(json!({ "where": { "AND": [{ "id": "1" }] } }));
        let normalized = normalize_path(
            &path(&["where".into(), "AND".into(), PathSegment::Index(0), "id".into()]),
            &select,
        );

        assert_eq!(join(&normalized), "where.AND.0.id");
    }

    #[test]
    fn aggregate_echo_drops_the_select_level() {
        let ast = PrismaValue::from(json!({ "select": { "_avg": { "select": { "balance": true } } }, "where": {} }));

        assert_eq!(
            remove_select_from_object(&ast).to_json(),
            json!({ "_avg": { "balance": true }, "where": {} })
        );
        assert_eq!(remove_select_from_path("select._avg.select.balance"), "_avg.balance");
    }

    #[test]
    fn legend_lists_the_markers_in_use() {
        let legend = |required, optional| strip_ansi(&legend(required, optional));

        assert_eq!(legend(false, false), "");
        assert_eq!(legend(true, false), "\nNote: Lines with + are required");
        assert_eq!(legend(false, true), "\nNote: Lines with ? are optional.");
        assert_eq!(legend(true, true), "\nNote: Lines with + are required, lines with ? are optional.");
    }
}
