use super::{Field, TAB_SIZE, indent};
use dmmf::{DmmfHelper, RootType};
use std::fmt;

/// One request: an operation on a root type with its selected root field(s).
#[derive(Debug, Clone)]
pub struct Document<'a> {
    root_type: RootType,
    children: Vec<Field<'a>>,
    dmmf: &'a DmmfHelper,
}

impl<'a> Document<'a> {
    pub fn new(root_type: RootType, children: Vec<Field<'a>>, dmmf: &'a DmmfHelper) -> Self {
        Self {
            root_type,
            children,
            dmmf,
        }
    }

    pub fn root_type(&self) -> RootType {
        self.root_type
    }

    pub fn children(&self) -> &[Field<'a>] {
        &self.children
    }

    pub fn dmmf(&self) -> &'a DmmfHelper {
        self.dmmf
    }

    pub fn has_errors(&self) -> bool {
        self.children
            .iter()
            .any(|child| child.has_invalid_child() || child.has_invalid_arg() || child.error().is_some())
    }
}

impl fmt::Display for Document<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let children: Vec<String> = self.children.iter().map(ToString::to_string).collect();

        write!(f, "{} {{\n{}\n}}", self.root_type, indent(&children.join("\n"), TAB_SIZE))
    }
}
