use super::{ArgError, Args, FieldError, InvalidFieldError, PathSegment, TAB_SIZE, indent};
use dmmf::SchemaField;
use std::fmt;

/// Which statement a field's nested selection came from. Error paths go through it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionKind {
    Select,
    Include,
}

impl SelectionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SelectionKind::Select => "select",
            SelectionKind::Include => "include",
        }
    }
}

/// A node of the selection tree. Invalid fields stay in the tree with their error attached so
/// that every problem of a request is reported at once.
#[derive(Debug, Clone)]
pub struct Field<'a> {
    name: String,
    args: Option<Args<'a>>,
    children: Option<Vec<Field<'a>>>,
    error: Option<InvalidFieldError<'a>>,
    schema_field: Option<&'a SchemaField>,
    selection_kind: Option<SelectionKind>,
    has_invalid_child: bool,
    has_invalid_arg: bool,
}

impl<'a> Field<'a> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: None,
            children: None,
            error: None,
            schema_field: None,
            selection_kind: None,
            has_invalid_child: false,
            has_invalid_arg: false,
        }
    }

    pub fn with_args(mut self, args: impl Into<Option<Args<'a>>>) -> Self {
        self.args = args.into();
        self.has_invalid_arg = self.args.as_ref().is_some_and(Args::has_invalid_arg);
        self
    }

    pub fn with_children(mut self, children: impl Into<Option<Vec<Field<'a>>>>) -> Self {
        self.children = children.into();
        self.has_invalid_child = self.children.as_ref().is_some_and(|children| {
            children
                .iter()
                .any(|child| child.error.is_some() || child.has_invalid_arg || child.has_invalid_child)
        });
        self
    }

    pub fn with_error(mut self, error: InvalidFieldError<'a>) -> Self {
        self.error = Some(error);
        self
    }

    pub fn with_schema_field(mut self, schema_field: &'a SchemaField) -> Self {
        self.schema_field = Some(schema_field);
        self
    }

    pub fn with_selection_kind(mut self, kind: impl Into<Option<SelectionKind>>) -> Self {
        self.selection_kind = kind.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn args(&self) -> Option<&Args<'a>> {
        self.args.as_ref()
    }

    pub fn children(&self) -> Option<&[Field<'a>]> {
        self.children.as_deref()
    }

    pub fn child(&self, name: &str) -> Option<&Field<'a>> {
        self.children()?.iter().find(|child| child.name == name)
    }

    pub fn error(&self) -> Option<&InvalidFieldError<'a>> {
        self.error.as_ref()
    }

    pub fn schema_field(&self) -> Option<&'a SchemaField> {
        self.schema_field
    }

    pub fn has_invalid_child(&self) -> bool {
        self.has_invalid_child
    }

    pub fn has_invalid_arg(&self) -> bool {
        self.has_invalid_arg
    }

    /// Collects the errors of this field and everything below it. Paths from a field to its
    /// children go through the statement that selected them, `prefix` when it is not known.
    pub fn collect_errors(&self, prefix: &str) -> (Vec<FieldError<'a>>, Vec<ArgError<'a>>) {
        let mut field_errors = Vec::new();
        let mut arg_errors = Vec::new();
        let name = PathSegment::Key(self.name.clone());

        if let Some(error) = &self.error {
            field_errors.push(FieldError {
                path: vec![name.clone()],
                error: error.clone(),
            });
        }

        if let Some(children) = &self.children {
            let child_prefix = self.selection_kind.map(SelectionKind::as_str).unwrap_or(prefix);
            let path = [name.clone(), PathSegment::from(child_prefix)];

            for child in children {
                let (child_field_errors, child_arg_errors) = child.collect_errors(child_prefix);

                field_errors.extend(child_field_errors.into_iter().map(|e| e.prefixed(&path)));
                arg_errors.extend(child_arg_errors.into_iter().map(|e| e.prefixed(&path)));
            }
        }

        if let Some(args) = &self.args {
            arg_errors.extend(
                args.collect_errors()
                    .into_iter()
                    .map(|e| e.prefixed(std::slice::from_ref(&name))),
            );
        }

        (field_errors, arg_errors)
    }
}

impl fmt::Display for Field<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;

        if self.error.is_some() {
            return f.write_str(" # INVALID_FIELD");
        }

        if let Some(args) = self.args.as_ref().filter(|args| !args.is_empty()) {
            if args.len() == 1 {
                write!(f, "({args})")?;
            } else {
                write!(f, "(\n{}\n)", indent(&args.to_string(), TAB_SIZE))?;
            }
        }

        if let Some(children) = &self.children {
            let children: Vec<String> = children.iter().map(ToString::to_string).collect();
            write!(f, " {{\n{}\n}}", indent(&children.join("\n"), TAB_SIZE))?;
        }

        Ok(())
    }
}
