use dmmf::{InputType, InputTypeConstraints, SchemaArg, SchemaField};

/// Something arguments are matched against: an input object type, or the argument list of an
/// output field (which behaves like an anonymous input object without constraints).
#[derive(Debug, Clone, Copy)]
pub enum InputShape<'a> {
    Object(&'a InputType),
    FieldArgs(&'a SchemaField),
}

impl<'a> InputShape<'a> {
    pub fn name(&self) -> &'a str {
        match self {
            InputShape::Object(input_type) => &input_type.name,
            InputShape::FieldArgs(field) => &field.name,
        }
    }

    pub fn fields(&self) -> &'a [SchemaArg] {
        match self {
            InputShape::Object(input_type) => &input_type.fields,
            InputShape::FieldArgs(field) => &field.args,
        }
    }

    pub fn field(&self, name: &str) -> Option<&'a SchemaArg> {
        match self {
            InputShape::Object(input_type) => input_type.field(name),
            InputShape::FieldArgs(field) => field.arg(name),
        }
    }

    pub fn constraints(&self) -> InputTypeConstraints {
        match self {
            InputShape::Object(input_type) => input_type.constraints.clone(),
            InputShape::FieldArgs(_) => InputTypeConstraints::default(),
        }
    }
}
