//! Errors are carried on the nodes of the document tree while it is built, and only collected
//! (with their paths) when the document is validated.

use super::InputShape;
use dmmf::{InputType, OutputType, SchemaArg, SchemaArgInputType, SchemaField};
use itertools::Itertools;
use prisma_value::PrismaValue;
use std::fmt;

/// One step of an error path: an object key or a list index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::Key(key.to_owned())
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(key) => f.write_str(key),
            PathSegment::Index(idx) => idx.fmt(f),
        }
    }
}

pub(crate) fn join_path(path: &[PathSegment]) -> String {
    path.iter().map(ToString::to_string).join(".")
}

#[derive(Debug, Clone)]
pub enum InvalidFieldError<'a> {
    InvalidFieldName {
        model_name: String,
        provided_name: String,
        did_you_mean: Option<String>,
        /// `None` when the field carrying the statement doesn't return an object type.
        output_type: Option<&'a OutputType>,
        is_include: bool,
        /// The key names a scalar field, which `include` can't select.
        is_include_scalar: bool,
    },
    InvalidFieldType {
        model_name: String,
        field_name: String,
        provided_value: PrismaValue,
    },
    EmptySelect {
        field: &'a SchemaField,
    },
    NoTrueSelect {
        field: &'a SchemaField,
    },
    EmptyInclude {
        field: &'a SchemaField,
    },
    IncludeAndSelect {
        field: &'a SchemaField,
    },
}

/// The candidate types of a union argument, and the one the value was checked against.
#[derive(Debug, Clone, Copy)]
pub struct RequiredType<'a> {
    pub input_types: &'a [SchemaArgInputType],
    pub best_fitting_type: &'a SchemaArgInputType,
}

#[derive(Debug, Clone)]
pub enum InvalidArgError<'a> {
    InvalidName {
        provided_name: String,
        provided_value: PrismaValue,
        /// Set when a boolean was passed for a name that is a field of the output type.
        did_you_mean_field: Option<String>,
        did_you_mean_arg: Option<String>,
        original_type: InputShape<'a>,
        output_type: Option<&'a OutputType>,
    },
    MissingArg {
        missing_name: String,
        missing_arg: &'a SchemaArg,
    },
    InvalidType {
        provided_value: PrismaValue,
        arg_name: String,
        required_type: RequiredType<'a>,
    },
    AtMostOne {
        key: String,
        input_type: &'a InputType,
        provided_keys: Vec<String>,
    },
    AtLeastOne {
        key: String,
        input_type: &'a InputType,
    },
    InvalidNullArg {
        name: String,
        invalid_type: &'a [SchemaArgInputType],
    },
}

impl InvalidArgError<'_> {
    pub fn is_missing_arg(&self) -> bool {
        matches!(self, InvalidArgError::MissingArg { .. })
    }
}

#[derive(Debug, Clone)]
pub struct FieldError<'a> {
    pub path: Vec<PathSegment>,
    pub error: InvalidFieldError<'a>,
}

#[derive(Debug, Clone)]
pub struct ArgError<'a> {
    pub path: Vec<PathSegment>,
    pub error: InvalidArgError<'a>,
}

impl FieldError<'_> {
    pub(crate) fn prefixed(mut self, prefix: &[PathSegment]) -> Self {
        self.path.splice(0..0, prefix.iter().cloned());
        self
    }
}

impl ArgError<'_> {
    pub(crate) fn prefixed(mut self, prefix: &[PathSegment]) -> Self {
        self.path.splice(0..0, prefix.iter().cloned());
        self
    }
}
