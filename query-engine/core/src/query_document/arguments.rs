//! Argument inference: matches raw values against the (possibly union) input types of the
//! schema and builds the [`Args`] of a field.

use super::{
    Arg, ArgError, ArgListItem, ArgValue, Args, DocumentBuilder, InputShape, InvalidArgError, RequiredType,
    coercion::{get_suggestion, has_correct_scalar_type},
};
use dmmf::{InputType, OutputType, SchemaArg, SchemaArgInputType, TypeLocation};
use prisma_value::{PrismaObject, PrismaValue};
use std::cmp::Ordering;

/// Marker in the name of the relation-unsafe variants of create and update inputs.
const UNCHECKED_MARKER: &str = "Unchecked";

/// The key whose list inputs are never wrapped, for compatibility with the engine.
const UNWRAPPED_LIST_KEY: &str = "updateMany";

impl<'a> DocumentBuilder<'a> {
    /// Matches `obj` against `shape`. Unknown keys become `InvalidName` errors, schema fields
    /// missing from `obj` are checked for being required.
    pub fn object_to_args(
        &self,
        obj: &PrismaObject,
        shape: InputShape<'a>,
        output_type: Option<&'a OutputType>,
    ) -> Args<'a> {
        let provided = obj.iter().map(|(key, value)| (key.as_str(), Some(value)));
        let absent = shape
            .fields()
            .iter()
            .filter(|field| !obj.contains_key(&field.name))
            .map(|field| (field.name.as_str(), None));

        let mut args = Vec::new();

        for (name, value) in provided.chain(absent) {
            match shape.field(name) {
                Some(schema_arg) => args.extend(self.value_to_arg(name, value, schema_arg)),
                None => args.push(unknown_arg(name, value, shape, output_type)),
            }
        }

        let constraints = shape.constraints();
        let below_min_fields = constraints.min_num_fields.is_some_and(|min| obj.len() < min);
        let has_missing = args.iter().any(|arg| {
            matches!(
                arg.error(),
                Some(InvalidArgError::MissingArg { .. } | InvalidArgError::AtLeastOne { .. })
            )
        });

        // List the optional neighbours as well, so the user sees every option.
        if below_min_fields || has_missing {
            let optional = shape
                .fields()
                .iter()
                .filter(|field| !field.is_required && obj.get(&field.name).is_none_or(PrismaValue::is_null));

            for field in optional {
                args.push(
                    Arg::new(field.name.clone(), None)
                        .with_error(InvalidArgError::MissingArg {
                            missing_name: field.name.clone(),
                            missing_arg: field,
                        })
                        .with_input_type(field.input_types.first()),
                );
            }
        }

        Args::new(args)
    }

    /// Tries every candidate type of a union argument. The first candidate without errors
    /// wins; otherwise the attempt with the lowest error score is kept. `None` when the
    /// argument is absent and optional.
    pub fn value_to_arg(&self, key: &str, value: Option<&PrismaValue>, arg: &'a SchemaArg) -> Option<Arg<'a>> {
        let mut attempts = Vec::with_capacity(arg.input_types.len());

        for input_type in &arg.input_types {
            let attempt = self.try_infer_args(key, value, arg, input_type)?;
            let errors = attempt.collect_errors();

            if errors.is_empty() {
                return Some(attempt);
            }

            let score = score(&errors, input_type);
            tracing::trace!(key, candidate = %input_type.name, score, "union candidate rejected");
            attempts.push((score, attempt));
        }

        attempts
            .into_iter()
            .min_by(|(a, _), (b, _)| a.partial_cmp(b).unwrap_or(Ordering::Equal))
            .map(|(_, attempt)| attempt)
    }

    fn try_infer_args(
        &self,
        key: &str,
        value: Option<&PrismaValue>,
        arg: &'a SchemaArg,
        input_type: &'a SchemaArgInputType,
    ) -> Option<Arg<'a>> {
        let Some(value) = value else {
            if !arg.is_required {
                return None;
            }

            return Some(
                Arg::new(key, None)
                    .with_error(InvalidArgError::MissingArg {
                        missing_name: key.to_owned(),
                        missing_arg: arg,
                    })
                    .with_input_type(input_type),
            );
        };

        let object_type = input_type.as_object().map(|id| &self.dmmf[id]);

        if value.is_null() && !arg.is_nullable && !arg.is_required {
            let at_least_one = object_type.is_some_and(|t| t.constraints.min_num_fields.is_some_and(|min| min > 0));

            if !at_least_one {
                return Some(
                    Arg::new(key, Some(ArgValue::Scalar(PrismaValue::Null)))
                        .with_error(InvalidArgError::InvalidNullArg {
                            name: key.to_owned(),
                            invalid_type: &arg.input_types,
                        })
                        .with_input_type(input_type),
                );
            }
        }

        if !input_type.is_list {
            return Some(match object_type {
                Some(object_type) => self.object_arg(key, value, arg, input_type, object_type),
                None => self.scalar_to_arg(key, value, arg, input_type),
            });
        }

        // A single item is as good as a list with that item.
        let value = match value {
            PrismaValue::List(_) => value.clone(),
            _ if key == UNWRAPPED_LIST_KEY => value.clone(),
            other => PrismaValue::List(vec![other.clone()]),
        };

        let object_type = match object_type {
            Some(object_type) if input_type.location == TypeLocation::InputObjectTypes => object_type,
            _ => return Some(self.scalar_to_arg(key, &value, arg, input_type)),
        };

        Some(self.object_list_arg(key, &value, arg, input_type, object_type))
    }

    fn object_arg(
        &self,
        key: &str,
        value: &PrismaValue,
        arg: &'a SchemaArg,
        input_type: &'a SchemaArgInputType,
        object_type: &'a InputType,
    ) -> Arg<'a> {
        let Some(obj) = value.as_object() else {
            return self.invalid_type_arg(key, value, arg, input_type);
        };

        let constraints = &object_type.constraints;
        let error = if obj.is_empty() && constraints.min_num_fields.is_some_and(|min| min > 0) {
            Some(InvalidArgError::AtLeastOne {
                key: key.to_owned(),
                input_type: object_type,
            })
        } else if obj.len() > 1 && constraints.max_num_fields.is_some_and(|max| max < 2) {
            Some(InvalidArgError::AtMostOne {
                key: key.to_owned(),
                input_type: object_type,
                provided_keys: obj.keys().cloned().collect(),
            })
        } else {
            None
        };

        let args = self.object_to_args(obj, InputShape::Object(object_type), None);

        Arg::new(key, Some(ArgValue::Object(args)))
            .with_error(error)
            .with_input_type(input_type)
            .with_schema_arg(arg)
    }

    fn object_list_arg(
        &self,
        key: &str,
        value: &PrismaValue,
        arg: &'a SchemaArg,
        input_type: &'a SchemaArgInputType,
        object_type: &'a InputType,
    ) -> Arg<'a> {
        let items: &[PrismaValue] = value.as_list().unwrap_or(std::slice::from_ref(value));
        let constraints = &object_type.constraints;

        let mut error = None;

        if constraints.min_num_fields.is_some_and(|min| min > 0)
            && items.iter().any(|item| !item.is_truthy() || key_count(item) == 0)
        {
            error = Some(InvalidArgError::AtLeastOne {
                key: key.to_owned(),
                input_type: object_type,
            });
        } else if constraints.max_num_fields.is_some_and(|max| max < 2) {
            let offending = items.iter().find(|item| !item.is_truthy() || key_count(item) != 1);

            if let Some(item) = offending.filter(|item| item.is_truthy()) {
                error = Some(InvalidArgError::AtMostOne {
                    key: key.to_owned(),
                    input_type: object_type,
                    provided_keys: item.as_object().map(|o| o.keys().cloned().collect()).unwrap_or_default(),
                });
            }
        }

        // A bare object given for the unwrapped key is accepted as one of the union's objects.
        if let Some(obj) = value.as_object() {
            for candidate in &arg.input_types {
                let Some(candidate_type) = candidate.as_object().map(|id| &self.dmmf[id]) else {
                    continue;
                };

                let args = self.object_to_args(obj, InputShape::Object(candidate_type), None);

                if args.collect_errors().is_empty() {
                    return Arg::new(key, Some(ArgValue::Object(args)))
                        .with_schema_arg(arg)
                        .with_input_type(candidate);
                }
            }
        }

        let list = items
            .iter()
            .map(|item| match item.as_object() {
                Some(obj) => ArgListItem::Object(self.object_to_args(obj, InputShape::Object(object_type), None)),
                None => ArgListItem::Invalid(Box::new(self.invalid_type_arg(key, item, arg, input_type))),
            })
            .collect();

        Arg::new(key, Some(ArgValue::List(list)))
            .with_error(error)
            .with_input_type(input_type)
            .with_schema_arg(arg)
    }

    fn scalar_to_arg(
        &self,
        key: &str,
        value: &PrismaValue,
        arg: &'a SchemaArg,
        input_type: &'a SchemaArgInputType,
    ) -> Arg<'a> {
        if has_correct_scalar_type(value, input_type, self.dmmf) {
            return Arg::new(key, Some(ArgValue::Scalar(value.clone())))
                .with_schema_arg(arg)
                .with_input_type(input_type);
        }

        self.invalid_type_arg(key, value, arg, input_type)
    }

    fn invalid_type_arg(
        &self,
        key: &str,
        value: &PrismaValue,
        arg: &'a SchemaArg,
        best_fitting_type: &'a SchemaArgInputType,
    ) -> Arg<'a> {
        Arg::new(key, Some(ArgValue::Scalar(value.clone())))
            .with_error(InvalidArgError::InvalidType {
                provided_value: value.clone(),
                arg_name: key.to_owned(),
                required_type: RequiredType {
                    input_types: &arg.input_types,
                    best_fitting_type,
                },
            })
            .with_input_type(best_fitting_type)
    }
}

fn unknown_arg<'a>(
    name: &str,
    value: Option<&PrismaValue>,
    shape: InputShape<'a>,
    output_type: Option<&'a OutputType>,
) -> Arg<'a> {
    let provided_value = value.cloned().unwrap_or(PrismaValue::Null);

    let did_you_mean_field = output_type
        .filter(|output| provided_value.as_boolean().is_some() && output.field(name).is_some())
        .map(|_| name.to_owned());

    let did_you_mean_arg = match did_you_mean_field {
        Some(_) => None,
        None => get_suggestion(
            name,
            shape.fields().iter().map(|f| f.name.as_str()).chain(std::iter::once("select")),
        ),
    };

    Arg::new(name, Some(ArgValue::Scalar(provided_value.clone()))).with_error(InvalidArgError::InvalidName {
        provided_name: name.to_owned(),
        provided_value,
        did_you_mean_field,
        did_you_mean_arg,
        original_type: shape,
        output_type,
    })
}

/// How implausible a candidate's errors make it. Deep type mismatches weigh exponentially
/// more, and missing or unknown names count double against unchecked input variants.
fn score(errors: &[ArgError<'_>], candidate: &SchemaArgInputType) -> f64 {
    let unchecked = candidate.name.contains(UNCHECKED_MARKER);

    let error_scores: f64 = errors
        .iter()
        .map(|e| {
            let mut score = match &e.error {
                InvalidArgError::InvalidType { provided_value, .. } => 2.0 * (provided_value.depth() as f64).exp() + 1.0,
                _ => 1.0,
            };

            score += (e.path.len() as f64).ln();

            if unchecked
                && matches!(
                    e.error,
                    InvalidArgError::MissingArg { .. } | InvalidArgError::InvalidName { .. }
                )
            {
                score *= 2.0;
            }

            score
        })
        .sum();

    errors.len() as f64 + error_scores
}

/// Number of keys `Object.keys` would report for the value.
fn key_count(value: &PrismaValue) -> usize {
    match value {
        PrismaValue::Object(obj) => obj.len(),
        PrismaValue::List(items) => items.len(),
        PrismaValue::String(s) => s.chars().count(),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query_document::{PathSegment, test_utils::blog};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn where_input_arg(dmmf: &dmmf::DmmfHelper) -> &SchemaArg {
        let (_, find_many) = dmmf.root_field("findManyUser").unwrap();
        find_many.arg("where").unwrap()
    }

    #[test]
    fn first_matching_candidate_wins() {
        let dmmf = blog();
        let builder = DocumentBuilder::new(&dmmf);
        let where_type = dmmf.input_type("UserWhereInput").unwrap();
        let email = where_type.field("email").unwrap();

        let arg = builder.value_to_arg("email", Some(&PrismaValue::from("a@b.c")), email).unwrap();
        assert_eq!(arg.input_type().unwrap().name, "String");
        assert!(!arg.has_error());

        let filter = PrismaValue::from(json!({ "contains": "b" }));
        let arg = builder.value_to_arg("email", Some(&filter), email).unwrap();
        assert_eq!(arg.input_type().unwrap().name, "StringFilter");
    }

    #[test]
    fn absent_optional_args_are_skipped() {
        let dmmf = blog();
        let builder = DocumentBuilder::new(&dmmf);

        assert!(builder.value_to_arg("where", None, where_input_arg(&dmmf)).is_none());
    }

    #[test]
    fn the_least_surprising_candidate_is_reported() {
        let dmmf = blog();
        let builder = DocumentBuilder::new(&dmmf);
        let where_type = dmmf.input_type("UserWhereInput").unwrap();
        let email = where_type.field("email").unwrap();

        // Valid for neither candidate: the unknown key in the filter object scores lower than
        // an object given where a string was expected.
        let value = PrismaValue::from(json!({ "contain": "b" }));
        let arg = builder.value_to_arg("email", Some(&value), email).unwrap();

        assert_eq!(arg.input_type().unwrap().name, "StringFilter");
        let errors = arg.collect_errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].path, vec![PathSegment::from("email"), PathSegment::from("contain")]);
        assert!(matches!(
            &errors[0].error,
            InvalidArgError::InvalidName { did_you_mean_arg: Some(s), .. } if s == "contains"
        ));
    }

    #[test]
    fn unchecked_variants_are_penalized() {
        let dmmf = blog();
        let builder = DocumentBuilder::new(&dmmf);
        let (_, create) = dmmf.root_field("createOneUser").unwrap();
        let data = create.arg("data").unwrap();

        // Missing `email` is an error for both variants, the checked one is preferred.
        let value = PrismaValue::from(json!({ "name": "Bob" }));
        let arg = builder.value_to_arg("data", Some(&value), data).unwrap();
        assert_eq!(arg.input_type().unwrap().name, "UserCreateInput");

        // A field only the unchecked variant declares.
        let value = PrismaValue::from(json!({ "email": "bob@example.com", "postCount": 1 }));
        let arg = builder.value_to_arg("data", Some(&value), data).unwrap();
        assert_eq!(arg.input_type().unwrap().name, "UserUncheckedCreateInput");
    }

    #[test]
    fn scores_grow_with_depth_and_path_length() {
        let dmmf = blog();
        let candidate = &where_input_arg(&dmmf).input_types[0];
        let shallow = ArgError {
            path: vec![PathSegment::from("a")],
            error: InvalidArgError::InvalidType {
                provided_value: PrismaValue::from(1),
                arg_name: "a".into(),
                required_type: RequiredType {
                    input_types: &where_input_arg(&dmmf).input_types,
                    best_fitting_type: candidate,
                },
            },
        };

        let mut deep = shallow.clone();
        if let InvalidArgError::InvalidType { provided_value, .. } = &mut deep.error {
            *provided_value = PrismaValue::from(json!({ "a": { "b": 1 } }));
        }

        let shallow_score = score(std::slice::from_ref(&shallow), candidate);
        assert!((shallow_score - (1.0 + 2.0 * 1f64.exp() + 1.0)).abs() < 1e-9);
        assert!(score(&[deep], candidate) > shallow_score);
    }

    #[test]
    fn single_objects_are_wrapped_for_list_inputs() {
        let dmmf = blog();
        let builder = DocumentBuilder::new(&dmmf);
        let nested = dmmf.input_type("PostCreateNestedManyWithoutAuthorInput").unwrap();
        let connect = nested.field("connect").unwrap();

        let single = builder
            .value_to_arg("connect", Some(&PrismaValue::from(json!({ "id": 1 }))), connect)
            .unwrap();
        let list = builder
            .value_to_arg("connect", Some(&PrismaValue::from(json!([{ "id": 1 }]))), connect)
            .unwrap();

        assert!(!single.has_error());
        assert_eq!(single.to_string(), list.to_string());
    }

    #[test]
    fn non_objects_in_object_lists_are_invalid() {
        let dmmf = blog();
        let builder = DocumentBuilder::new(&dmmf);
        let nested = dmmf.input_type("PostCreateNestedManyWithoutAuthorInput").unwrap();
        let connect = nested.field("connect").unwrap();

        let value = PrismaValue::from(json!([{ "id": 1 }, 5]));
        let arg = builder.value_to_arg("connect", Some(&value), connect).unwrap();
        let errors = arg.collect_errors();

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].path, vec![PathSegment::from("connect"), PathSegment::Index(1)]);
        assert!(matches!(errors[0].error, InvalidArgError::InvalidType { .. }));
    }

    #[test]
    fn null_is_rejected_for_non_nullable_optional_args() {
        let dmmf = blog();
        let builder = DocumentBuilder::new(&dmmf);
        let create = dmmf.input_type("UserCreateInput").unwrap();

        let role = create.field("role").unwrap();
        let arg = builder.value_to_arg("role", Some(&PrismaValue::Null), role).unwrap();
        assert!(matches!(arg.error(), Some(InvalidArgError::InvalidNullArg { .. })));

        let name = create.field("name").unwrap();
        let arg = builder.value_to_arg("name", Some(&PrismaValue::Null), name).unwrap();
        assert!(!arg.has_error());
    }
}
