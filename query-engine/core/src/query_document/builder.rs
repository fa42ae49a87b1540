//! Builds the document tree for one client call from the raw argument object: the selection
//! tree here, the argument lists in [`arguments`](super::arguments).

use super::{
    Args, Document, Field, InputShape, InvalidFieldError, SelectionKind,
    coercion::get_suggestion,
};
use dmmf::{DmmfHelper, OutputType, RootType, SchemaField, TypeLocation, TypeNamespace};
use prisma_value::{PrismaObject, PrismaValue};

/// Root fields that take a plain argument object even though their output is a scalar.
const SCALAR_ROOT_FIELDS: &[&str] = &["executeRaw", "queryRaw", "runCommandRaw", "count"];

/// Builds documents against one schema. Building never fails: problems are recorded on the
/// nodes of the tree and surface through [`Document::validate`].
#[derive(Debug, Clone, Copy)]
pub struct DocumentBuilder<'a> {
    pub(crate) dmmf: &'a DmmfHelper,
}

/// Builds the document for calling `root_field` with the given arguments (`where`, `select`,
/// `data`, ...).
pub fn make_document<'a>(
    dmmf: &'a DmmfHelper,
    root_type: RootType,
    root_field: &str,
    args: Option<&PrismaValue>,
) -> Document<'a> {
    DocumentBuilder::new(dmmf).make_document(root_type, root_field, args)
}

impl<'a> DocumentBuilder<'a> {
    pub fn new(dmmf: &'a DmmfHelper) -> Self {
        Self { dmmf }
    }

    pub fn make_document(&self, root_type: RootType, root_field: &str, args: Option<&PrismaValue>) -> Document<'a> {
        let args = args.cloned().unwrap_or_else(|| PrismaValue::Object(PrismaObject::new()));
        let selection = PrismaObject::from([(root_field.to_owned(), args)]);
        let children = self.selection_to_fields(&selection, self.dmmf.root_type(root_type));

        Document::new(root_type, children, self.dmmf)
    }

    /// Turns a selection object (field name to `true` or nested arguments) into fields of
    /// `output_type`.
    pub fn selection_to_fields(&self, selection: &PrismaObject, output_type: &'a OutputType) -> Vec<Field<'a>> {
        let mut fields = Vec::with_capacity(selection.len());

        for (name, value) in selection {
            let Some(schema_field) = output_type.field(name) else {
                let did_you_mean = get_suggestion(name, output_type.fields.iter().map(|f| f.name.as_str()));

                fields.push(Field::new(name).with_children(Vec::new()).with_error(
                    InvalidFieldError::InvalidFieldName {
                        model_name: output_type.name.clone(),
                        provided_name: name.clone(),
                        did_you_mean,
                        output_type: Some(output_type),
                        is_include: false,
                        is_include_scalar: false,
                    },
                ));

                continue;
            };

            if value.as_boolean().is_none() && !schema_field.is_relation() && !takes_arguments(output_type, schema_field) {
                fields.push(Field::new(name).with_children(Vec::new()).with_error(
                    InvalidFieldError::InvalidFieldType {
                        model_name: output_type.name.clone(),
                        field_name: name.clone(),
                        provided_value: value.clone(),
                    },
                ));

                continue;
            }

            if value.as_boolean() == Some(false) {
                continue;
            }

            fields.push(self.selected_field(name, value, schema_field));
        }

        fields
    }

    fn selected_field(&self, name: &str, value: &PrismaValue, schema_field: &'a SchemaField) -> Field<'a> {
        let field_output = schema_field.output_type.as_object().map(|id| &self.dmmf[id]);
        let obj = value.as_object();

        let args = obj.map(|obj| {
            let call_args: PrismaObject = obj
                .iter()
                .filter(|(key, _)| !matches!(key.as_str(), "select" | "include"))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect();

            self.object_to_args(&call_args, InputShape::FieldArgs(schema_field), field_output)
        });

        let select = obj.and_then(|obj| obj.get("select")).filter(|v| v.is_truthy());
        let include = obj.and_then(|obj| obj.get("include")).filter(|v| v.is_truthy());

        match (select, include) {
            (Some(_), Some(_)) => {
                let error = Field::new("include")
                    .with_args(Args::default())
                    .with_error(InvalidFieldError::IncludeAndSelect { field: schema_field });

                return Field::new(name).with_children(vec![error]);
            }
            (None, Some(include)) => {
                if let Some(error) = self.check_include(name, include, schema_field) {
                    return error;
                }
            }
            (Some(select), None) => {
                let values: Vec<&PrismaValue> = select.as_object().map(|o| o.values().collect()).unwrap_or_default();

                let error = if values.is_empty() {
                    Some(InvalidFieldError::EmptySelect { field: schema_field })
                } else if !values.iter().any(|v| v.is_truthy()) {
                    Some(InvalidFieldError::NoTrueSelect { field: schema_field })
                } else {
                    None
                };

                if let Some(error) = error {
                    let error = Field::new("select").with_args(Args::default()).with_error(error);

                    return Field::new(name)
                        .with_children(vec![error])
                        .with_selection_kind(SelectionKind::Select);
                }
            }
            (None, None) => (),
        }

        let selection_kind = match (select, include) {
            (Some(_), _) => Some(SelectionKind::Select),
            (None, Some(_)) => Some(SelectionKind::Include),
            _ => None,
        };

        let children = field_output.map(|output| {
            let default_selection = self.default_selection(output);

            let mut selection = match (select, include) {
                (Some(select), _) => select.as_object().cloned().unwrap_or_default(),
                (None, Some(include)) => deep_extend(default_selection, include),
                (None, None) => default_selection,
            };

            // Grouped fields replace the default selection, `include` keys are merged on top.
            if let Some(by) = group_by_fields(value, schema_field, output) {
                let by: PrismaObject = by
                    .into_iter()
                    .map(|field_name| (field_name.to_owned(), PrismaValue::Boolean(true)))
                    .collect();

                selection = match (select, include) {
                    (Some(_), _) => {
                        selection.extend(by);
                        selection
                    }
                    (None, Some(include)) => deep_extend(by, include),
                    (None, None) => by,
                };
            }

            self.selection_to_fields(&selection, output)
        });

        Field::new(name)
            .with_args(args)
            .with_children(children)
            .with_schema_field(schema_field)
            .with_selection_kind(selection_kind)
    }

    /// Empty includes, and include keys that are not relations of the field's type, are
    /// reported below the field carrying the `include`.
    fn check_include(&self, name: &str, include: &PrismaValue, schema_field: &'a SchemaField) -> Option<Field<'a>> {
        let keys: Vec<&String> = include.as_object().map(|o| o.keys().collect()).unwrap_or_default();

        if keys.is_empty() {
            let error = Field::new("include")
                .with_args(Args::default())
                .with_error(InvalidFieldError::EmptyInclude { field: schema_field });

            return Some(
                Field::new(name)
                    .with_children(vec![error])
                    .with_selection_kind(SelectionKind::Include),
            );
        }

        let output = schema_field.output_type.as_object().map(|id| &self.dmmf[id]);
        let model_name = output.map_or(&schema_field.output_type.name, |o| &o.name);
        let allowed: Vec<&str> = output
            .iter()
            .flat_map(|o| o.fields.iter())
            .filter(|f| f.is_relation())
            .map(|f| f.name.as_str())
            .collect();

        let invalid: Vec<Field<'a>> = keys
            .into_iter()
            .filter(|key| !allowed.contains(&key.as_str()))
            .map(|key| {
                Field::new(key.clone())
                    .with_args(Args::default())
                    .with_error(InvalidFieldError::InvalidFieldName {
                        model_name: model_name.clone(),
                        provided_name: key.clone(),
                        did_you_mean: get_suggestion(key, allowed.iter().copied()),
                        output_type: output,
                        is_include: true,
                        is_include_scalar: output.is_some_and(|o| o.field(key).is_some()),
                    })
            })
            .collect();

        if invalid.is_empty() {
            return None;
        }

        Some(
            Field::new(name)
                .with_children(invalid)
                .with_selection_kind(SelectionKind::Include),
        )
    }

    /// Every scalar and enum field, plus composite fields, of an output type.
    fn default_selection(&self, output: &OutputType) -> PrismaObject {
        output
            .fields
            .iter()
            .filter(|f| {
                matches!(f.output_type.location, TypeLocation::Scalar | TypeLocation::EnumTypes)
                    || self.dmmf.is_composite_type(&f.output_type.name)
            })
            .map(|f| (f.name.clone(), PrismaValue::Boolean(true)))
            .collect()
    }
}

fn takes_arguments(parent: &OutputType, field: &SchemaField) -> bool {
    parent.name == RootType::Query.type_name()
        || parent.name == RootType::Mutation.type_name()
        || SCALAR_ROOT_FIELDS.contains(&field.name.as_str())
        || field.name.starts_with("aggregate")
}

/// The `by` fields of a `groupBy` call, which are selected implicitly.
fn group_by_fields<'v>(value: &'v PrismaValue, field: &SchemaField, output: &OutputType) -> Option<Vec<&'v str>> {
    let by = value.as_object()?.get("by")?.as_list()?;

    let is_group_by = field.output_type.namespace == Some(TypeNamespace::Prisma)
        && field.is_relation()
        && output.name.ends_with("GroupByOutputType");

    is_group_by.then(|| by.iter().filter_map(PrismaValue::as_str).collect())
}

/// Merges `source` into `target`, recursing where both sides hold objects.
fn deep_extend(mut target: PrismaObject, source: &PrismaValue) -> PrismaObject {
    let Some(source) = source.as_object() else {
        return target;
    };

    for (key, value) in source {
        match (target.get_mut(key), value) {
            (Some(PrismaValue::Object(existing)), PrismaValue::Object(_)) => {
                let existing_obj = std::mem::take(existing);
                *existing = deep_extend(existing_obj, value);
            }
            _ => {
                target.insert(key.clone(), value.clone());
            }
        }
    }

    target
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn obj(value: serde_json::Value) -> PrismaObject {
        match PrismaValue::from(value) {
            PrismaValue::Object(obj) => obj,
            _ => unreachable!(),
        }
    }

    #[test]
    fn deep_extend_merges_nested_objects() {
        let merged = deep_extend(
            obj(json!({ "id": true, "posts": { "select": { "id": true } } })),
            &PrismaValue::from(json!({ "posts": { "select": { "title": true } }, "tags": true })),
        );

        assert_eq!(
            PrismaValue::Object(merged).to_json(),
            json!({ "id": true, "posts": { "select": { "id": true, "title": true } }, "tags": true })
        );
    }
}
