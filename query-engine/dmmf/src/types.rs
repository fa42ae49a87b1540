//! The resolved schema graph. Type references point into the arenas of
//! [`DmmfHelper`](crate::DmmfHelper) through typed ids.

use crate::serialization_ast::{TypeLocation, TypeNamespace};
use std::{collections::HashMap, fmt};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InputObjectTypeId(pub(crate) usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OutputObjectTypeId(pub(crate) usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EnumTypeId(pub(crate) usize);

/// The two root types an operation can live on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RootType {
    Query,
    Mutation,
}

impl RootType {
    /// Name of the root output type in the schema.
    pub fn type_name(self) -> &'static str {
        match self {
            RootType::Query => "Query",
            RootType::Mutation => "Mutation",
        }
    }
}

impl fmt::Display for RootType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RootType::Query => f.write_str("query"),
            RootType::Mutation => f.write_str("mutation"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputTypeRef {
    Scalar,
    Enum(EnumTypeId),
    Object(InputObjectTypeId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputTypeRef {
    Scalar,
    Enum(EnumTypeId),
    Object(OutputObjectTypeId),
}

/// One member of an argument's type union.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaArgInputType {
    pub name: String,
    pub typ: InputTypeRef,
    pub is_list: bool,
    pub location: TypeLocation,
    pub namespace: Option<TypeNamespace>,
}

impl SchemaArgInputType {
    pub fn as_object(&self) -> Option<InputObjectTypeId> {
        match self.typ {
            InputTypeRef::Object(id) => Some(id),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<EnumTypeId> {
        match self.typ {
            InputTypeRef::Enum(id) => Some(id),
            _ => None,
        }
    }

    pub fn is_scalar(&self, name: &str) -> bool {
        self.typ == InputTypeRef::Scalar && self.name == name
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SchemaArg {
    pub name: String,
    pub is_required: bool,
    pub is_nullable: bool,
    pub input_types: Vec<SchemaArgInputType>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputTypeConstraints {
    pub min_num_fields: Option<usize>,
    pub max_num_fields: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InputType {
    pub name: String,
    pub constraints: InputTypeConstraints,
    pub fields: Vec<SchemaArg>,
    pub(crate) field_map: HashMap<String, usize>,
}

impl InputType {
    pub fn field(&self, name: &str) -> Option<&SchemaArg> {
        self.field_map.get(name).map(|idx| &self.fields[*idx])
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldOutputType {
    pub name: String,
    pub typ: OutputTypeRef,
    pub is_list: bool,
    pub location: TypeLocation,
    pub namespace: Option<TypeNamespace>,
}

impl FieldOutputType {
    pub fn as_object(&self) -> Option<OutputObjectTypeId> {
        match self.typ {
            OutputTypeRef::Object(id) => Some(id),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SchemaField {
    pub name: String,
    pub is_nullable: bool,
    pub output_type: FieldOutputType,
    pub args: Vec<SchemaArg>,
}

impl SchemaField {
    pub fn arg(&self, name: &str) -> Option<&SchemaArg> {
        self.args.iter().find(|arg| arg.name == name)
    }

    pub fn is_relation(&self) -> bool {
        self.output_type.location == TypeLocation::OutputObjectTypes
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutputType {
    pub name: String,
    pub fields: Vec<SchemaField>,
    pub(crate) field_map: HashMap<String, usize>,
}

impl OutputType {
    pub fn field(&self, name: &str) -> Option<&SchemaField> {
        self.field_map.get(name).map(|idx| &self.fields[*idx])
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaEnum {
    pub name: String,
    pub values: Vec<String>,
}

impl SchemaEnum {
    pub fn contains(&self, value: &str) -> bool {
        self.values.iter().any(|v| v == value)
    }
}
