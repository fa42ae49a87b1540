//! The sentences of a validation error, one per problem, and the renderings of input types they
//! refer to.

use super::{
    ArgError, FieldError, InputShape, InvalidArgError, InvalidFieldError, TAB_SIZE, coercion::graphql_type,
    coercion::wrap_with_list, error::join_path, indent,
};
use colored::Colorize;
use dmmf::{DmmfHelper, InputTypeRef, OutputType, SchemaArgInputType, SchemaEnum, SchemaField, TypeLocation};
use itertools::Itertools;
use prisma_value::{PrismaObject, PrismaValue};
use user_facing_errors::stringify_object;

/// An input type as the messages show it.
#[derive(Debug, Clone, Copy)]
pub(crate) enum TypeView<'a> {
    Scalar(&'a str),
    Enum(&'a SchemaEnum),
    Shape(InputShape<'a>),
}

impl<'a> TypeView<'a> {
    pub(crate) fn of(input_type: &'a SchemaArgInputType, dmmf: &'a DmmfHelper) -> Self {
        match input_type.typ {
            InputTypeRef::Scalar => TypeView::Scalar(&input_type.name),
            InputTypeRef::Enum(id) => TypeView::Enum(&dmmf[id]),
            InputTypeRef::Object(id) => TypeView::Shape(InputShape::Object(&dmmf[id])),
        }
    }

    fn name(&self) -> &'a str {
        match *self {
            TypeView::Scalar("Null") => "null",
            TypeView::Scalar(name) => name,
            TypeView::Enum(e) => &e.name,
            TypeView::Shape(shape) => shape.name(),
        }
    }
}

/// Renders an input type the way it would be declared, for "available args" listings.
pub(crate) fn stringify_input_type(view: TypeView<'_>, dmmf: &DmmfHelper, green_keys: bool) -> String {
    match view {
        TypeView::Scalar(name) => name.to_owned(),
        TypeView::Enum(e) => format!("enum {} {{\n{}\n}}", e.name, indent(&e.values.join(", "), TAB_SIZE)),
        TypeView::Shape(shape) => {
            let lines: Vec<String> = shape
                .fields()
                .iter()
                .map(|arg| {
                    let key = if green_keys {
                        arg.name.green().to_string()
                    } else {
                        arg.name.clone()
                    };

                    let types = arg
                        .input_types
                        .iter()
                        .map(|t| wrap_with_list(TypeView::of(t, dmmf).name(), t.is_list))
                        .join(" | ");

                    let optional = if arg.is_required { "" } else { "?" };
                    let line = format!("{key}{optional}: {}", types.white());

                    if arg.is_required {
                        line
                    } else {
                        line.dimmed().to_string()
                    }
                })
                .collect();

            format!(
                "{} {} {}\n{}\n{}",
                "type".dimmed(),
                shape.name().bold().dimmed(),
                "{".dimmed(),
                indent(&lines.join("\n"), TAB_SIZE),
                "}".dimmed()
            )
        }
    }
}

/// The placeholder shown for a missing argument: a type name, the values of an enum, or an
/// object mapping each field of an input object to its type names.
pub(crate) fn input_type_to_json(view: TypeView<'_>, dmmf: &DmmfHelper, is_required: bool, name_only: bool) -> PrismaValue {
    let shape = match view {
        TypeView::Scalar(_) => return PrismaValue::from(view.name()),
        TypeView::Enum(e) => return PrismaValue::from(e.values.join(" | ")),
        TypeView::Shape(shape) => shape,
    };

    if name_only {
        return PrismaValue::from(shape.name());
    }

    let is_object = |t: Option<&SchemaArgInputType>| t.is_some_and(|t| t.location == TypeLocation::InputObjectTypes);

    // All-relational required inputs are spelled out one level deeper, so the options are visible.
    let show_deep_type = is_required
        && shape
            .fields()
            .iter()
            .all(|arg| is_object(arg.input_types.first()) || is_object(arg.input_types.get(1)));

    let fields: PrismaObject = shape
        .fields()
        .iter()
        .map(|arg| {
            let types: Vec<String> = arg
                .input_types
                .iter()
                .map(|t| {
                    let view = TypeView::of(t, dmmf);

                    if !show_deep_type && !arg.is_required {
                        view.name().to_owned()
                    } else {
                        input_type_to_json(view, dmmf, arg.is_required, true).to_string()
                    }
                })
                .collect();

            let key = format!("{}{}", arg.name, if arg.is_required { "" } else { "?" });
            (key, PrismaValue::from(types.join(" | ")))
        })
        .collect();

    PrismaValue::Object(fields)
}

/// Union members by name, `[]` marking lists.
pub(crate) fn union_type_names(input_types: &[SchemaArgInputType], dmmf: &DmmfHelper) -> String {
    input_types
        .iter()
        .map(|t| {
            let name = TypeView::of(t, dmmf).name();

            if t.is_list && name != "null" {
                format!("{name}[]")
            } else {
                name.to_owned()
            }
        })
        .join(" | ")
}

pub(crate) struct ErrorRenderer<'a> {
    pub(crate) dmmf: &'a DmmfHelper,
    /// Name of the called root field, e.g. `findManyUser`.
    pub(crate) root_field: &'a str,
    pub(crate) minimal: bool,
}

impl ErrorRenderer<'_> {
    fn output_type_name<'f>(&self, field: &'f SchemaField) -> &'f str {
        &field.output_type.name
    }

    fn output_type(&self, field: &SchemaField) -> Option<&OutputType> {
        field.output_type.as_object().map(|id| &self.dmmf[id])
    }

    fn listed_in_green(&self, what: &str) -> String {
        if self.minimal {
            String::new()
        } else {
            format!(" Available {what} are listed in {}.", "green".bright_green().dimmed())
        }
    }

    pub(crate) fn field_error(&self, error: &FieldError<'_>, has_missing_items: bool) -> String {
        match &error.error {
            InvalidFieldError::EmptySelect { field } => format!(
                "The {} statement for type {} must not be empty.{}",
                "`select`".bright_red(),
                self.output_type_name(field).bold(),
                self.listed_in_green("options")
            ),
            InvalidFieldError::EmptyInclude { field } => {
                let has_relations = self
                    .output_type(field)
                    .is_some_and(|t| t.fields.iter().any(SchemaField::is_relation));

                if !has_missing_items || !has_relations {
                    format!(
                        "{} does not have any relation and therefore can't have an {} statement.",
                        self.output_type_name(field).bold(),
                        "`include`".bright_red()
                    )
                } else {
                    format!(
                        "The {} statement for type {} must not be empty.{}",
                        "`include`".bright_red(),
                        self.output_type_name(field).bold(),
                        self.listed_in_green("options")
                    )
                }
            }
            InvalidFieldError::NoTrueSelect { field } => format!(
                "The {} statement for type {} needs {}.",
                "`select`".bright_red(),
                self.output_type_name(field).bold(),
                "at least one truthy value".bold()
            ),
            InvalidFieldError::IncludeAndSelect { .. } => format!(
                "Please {} use {} or {}, but {} at the same time.",
                "either".bold(),
                "`include`".bright_green(),
                "`select`".bright_green(),
                "not both".bright_red()
            ),
            InvalidFieldError::InvalidFieldName {
                model_name,
                provided_name,
                did_you_mean,
                is_include,
                is_include_scalar,
                ..
            } => {
                let statement = if *is_include { "include" } else { "select" };
                let wording = if *is_include_scalar { "Invalid scalar" } else { "Unknown" };

                let additional = if self.minimal {
                    String::new()
                } else if *is_include && !has_missing_items {
                    format!("\nThis model has no relations, so you can't use {} with it.", "include".bright_red())
                } else {
                    self.listed_in_green("options")
                };

                let mut message = format!(
                    "{wording} field {} for {} statement on model {}.{additional}",
                    format!("`{provided_name}`").bright_red(),
                    statement.bold(),
                    model_name.bold().white()
                );

                if let Some(suggestion) = did_you_mean {
                    message.push_str(&format!(" Did you mean {}?", format!("`{suggestion}`").bright_green()));
                }

                if *is_include_scalar {
                    message.push_str(&format!(
                        "\nNote, that {} statements only accept relation fields.",
                        "include".bold()
                    ));
                }

                message
            }
            InvalidFieldError::InvalidFieldType {
                model_name,
                field_name,
                provided_value,
            } => format!(
                "Invalid value {} of type {} for field {} on model {}. Expected either {} or {}.",
                stringify_object(provided_value).bright_red(),
                graphql_type(provided_value, None, self.dmmf).bright_red(),
                field_name.bold(),
                model_name.bold().white(),
                "true".bright_green(),
                "false".bright_green()
            ),
        }
    }

    pub(crate) fn arg_error(&self, error: &ArgError<'_>, has_missing_items: bool) -> String {
        let path = join_path(&error.path);
        let for_path = |name: &str| {
            if error.path.len() == 1 && error.path[0].to_string() == name {
                String::new()
            } else {
                format!(" for {}", path.bold())
            }
        };

        match &error.error {
            InvalidArgError::InvalidName {
                provided_name,
                provided_value,
                did_you_mean_field,
                did_you_mean_arg,
                original_type,
                output_type,
            } => {
                let type_name = output_type.map(|t| t.name.as_str()).unwrap_or(original_type.name());
                let mut message = format!(
                    "Unknown arg {} in {} for type {}.",
                    format!("`{provided_name}`").bright_red(),
                    path.bold(),
                    type_name.bold()
                );

                let listing = || stringify_input_type(TypeView::Shape(*original_type), self.dmmf, true);

                if did_you_mean_field.is_some() {
                    let example = format!("{{ select: {{ {provided_name}: {provided_value} }} }}");
                    message.push_str(&format!(
                        "\n→ Did you forget to wrap it with `{}`? {}",
                        "select".bright_green(),
                        format!("e.g. {}", example.bright_green()).dimmed()
                    ));
                } else if let Some(suggestion) = did_you_mean_arg {
                    message.push_str(&format!(" Did you mean `{}`?", suggestion.bright_green()));

                    if !has_missing_items && !self.minimal {
                        message.push_str(&format!(" {}\n{}", "Available args:".dimmed(), listing()));
                    }
                } else if original_type.fields().is_empty() {
                    message.push_str(&format!(" The field {} has no arguments.", original_type.name().bold()));
                } else if !has_missing_items && !self.minimal {
                    message.push_str(&format!(" Available args:\n\n{}", listing()));
                }

                message
            }
            InvalidArgError::InvalidType {
                provided_value,
                arg_name,
                required_type,
            } => {
                let mut value = stringify_object(provided_value);
                let multiline = value.contains('\n');
                if multiline {
                    value = format!("\n{value}\n");
                }
                let space = if multiline { "" } else { " " };

                let best = required_type.best_fitting_type;
                let provided_type = graphql_type(provided_value, None, self.dmmf);
                let method = format!("prisma.{}", self.root_field);

                if let Some(id) = best.as_enum() {
                    let schema_enum = &self.dmmf[id];
                    let possible = schema_enum
                        .values
                        .iter()
                        .map(|v| format!("{}.{v}", schema_enum.name).bright_green().to_string())
                        .join(", ");

                    return format!(
                        "Argument {}: Provided value {}{space}of type {} on {} is not a {}.\n→ Possible values: {possible}",
                        arg_name.bold(),
                        value.bright_red(),
                        provided_type.bright_red(),
                        method.bold(),
                        wrap_with_list("enum", best.is_list).bright_green()
                    );
                }

                let type_listing = match TypeView::of(best, self.dmmf) {
                    view @ TypeView::Shape(_) => format!(":\n{}", stringify_input_type(view, self.dmmf, false)),
                    _ => ".".to_owned(),
                };

                let mut expected = required_type
                    .input_types
                    .iter()
                    .map(|t| {
                        wrap_with_list(TypeView::of(t, self.dmmf).name(), best.is_list)
                            .bright_green()
                            .to_string()
                    })
                    .join(" or ");
                expected.push_str(&type_listing);

                // With one alternative beside an object, show the object as well.
                if required_type.input_types.len() == 2 {
                    if let Some(object) = required_type.input_types.iter().find(|t| t.as_object().is_some()) {
                        expected.push('\n');
                        expected.push_str(&stringify_input_type(TypeView::of(object, self.dmmf), self.dmmf, true));
                    }
                }

                format!(
                    "Argument {}: Got invalid value {}{space}on {}. Provided {}, expected {expected}",
                    arg_name.bold(),
                    value.bright_red(),
                    method.bold(),
                    provided_type.bright_red()
                )
            }
            InvalidArgError::InvalidNullArg { name, .. } => format!(
                "Argument {}{} must not be {}. Please {} the argument instead.",
                name.bright_green(),
                for_path(name),
                "null".bold(),
                "omit".bold().bright_green()
            ),
            InvalidArgError::MissingArg { missing_name, .. } => {
                format!("Argument {}{} is missing.", missing_name.bright_green(), for_path(missing_name))
            }
            InvalidArgError::AtLeastOne { input_type, .. } => format!(
                "Argument {} of type {} needs {} argument.{}",
                path.bold(),
                input_type.name.bold(),
                "at least one".bright_green(),
                self.listed_in_green("args")
            ),
            InvalidArgError::AtMostOne {
                input_type,
                provided_keys,
                ..
            } => {
                let additional = if self.minimal {
                    String::new()
                } else {
                    format!(
                        " Please choose one. {} \n{}",
                        "Available args:".dimmed(),
                        stringify_input_type(TypeView::Shape(InputShape::Object(input_type)), self.dmmf, true)
                    )
                };

                let provided = provided_keys
                    .iter()
                    .map(|key| key.bright_red().to_string())
                    .join(" and ");

                format!(
                    "Argument {} of type {} needs {} argument, but you provided {provided}.{additional}",
                    path.bold(),
                    input_type.name.bold(),
                    "exactly one".bright_green()
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query_document::test_utils::blog;
    use expect_test::expect;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use user_facing_errors::strip_ansi;

    #[test]
    fn input_types_render_as_declarations() {
        let dmmf = blog();
        let order_by = dmmf.input_type("UserOrderByInput").unwrap();
        let rendered = strip_ansi(&stringify_input_type(
            TypeView::Shape(InputShape::Object(order_by)),
            &dmmf,
            true,
        ));

        assert!(rendered.starts_with("type UserOrderByInput {\n"));
        assert!(rendered.contains("  email?: SortOrder\n"));
        assert!(rendered.ends_with("\n}"));

        let sort_order = dmmf.enum_type("SortOrder").unwrap();
        assert_eq!(
            stringify_input_type(TypeView::Enum(sort_order), &dmmf, false),
            "enum SortOrder {\n  asc, desc\n}"
        );
    }

    #[test]
    fn missing_placeholders_project_input_types() {
        let dmmf = blog();
        let unique = dmmf.input_type("UserWhereUniqueInput").unwrap();
        let view = TypeView::Shape(InputShape::Object(unique));

        assert_eq!(
            input_type_to_json(view, &dmmf, true, false).to_json(),
            json!({ "id?": "String", "email?": "String" })
        );
        assert_eq!(input_type_to_json(view, &dmmf, true, true), PrismaValue::from("UserWhereUniqueInput"));
        assert_eq!(input_type_to_json(TypeView::Scalar("Null"), &dmmf, true, false), PrismaValue::from("null"));
    }

    #[test]
    fn order_by_listing_snapshot() {
        let dmmf = blog();
        let order_by = dmmf.input_type("UserOrderByInput").unwrap();
        let rendered = strip_ansi(&stringify_input_type(
            TypeView::Shape(InputShape::Object(order_by)),
            &dmmf,
            false,
        ));

        expect![[r#"
            type UserOrderByInput {
              id?: SortOrder
              email?: SortOrder
              name?: SortOrder
            }"#]]
        .assert_eq(&rendered);
    }
}
