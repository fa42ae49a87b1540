//! The query document: the tree a client call is turned into before it is sent to the engine.
//!
//! Building ([`make_document`]) is total. Every problem with the input is recorded on the node
//! it concerns, and [`Document::validate`] later turns all of them into one rendered
//! [`ValidationError`](user_facing_errors::ValidationError). A valid document renders (through
//! `Display`) to the engine's text protocol, and [`unpack`] maps the engine's JSON response
//! back onto the selection.

mod args;
mod arguments;
mod builder;
mod coercion;
mod document;
mod error;
mod field;
mod input_shape;
mod messages;
mod unpack;
mod validation;

pub use args::{Arg, ArgListItem, ArgValue, Args};
pub use builder::{DocumentBuilder, make_document};
pub use coercion::{SYMBOL_ENUMS, get_suggestion, graphql_type, has_correct_scalar_type, wrap_with_list};
pub use document::Document;
pub use error::{ArgError, FieldError, InvalidArgError, InvalidFieldError, PathSegment, RequiredType};
pub use field::{Field, SelectionKind};
pub use input_shape::InputShape;
pub use unpack::{get_field, unpack};

/// Indentation width of the text protocol and of rendered messages.
pub(crate) const TAB_SIZE: usize = 2;

/// Indents every line that is not blank by `n` spaces.
pub(crate) fn indent(s: &str, n: usize) -> String {
    let pad = " ".repeat(n);

    s.split('\n')
        .map(|line| {
            if line.trim().is_empty() {
                line.to_owned()
            } else {
                format!("{pad}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
pub(crate) mod test_utils {
    use dmmf::DmmfHelper;

    pub(crate) fn blog() -> DmmfHelper {
        DmmfHelper::from_json_str(include_str!("../../../dmmf/test-files/blog.dmmf.json")).unwrap()
    }
}
