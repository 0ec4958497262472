//! Document → HAR request synthesis.
//!
//! Each builder is a pure function of the document and one path/method pair;
//! [`Synthesizer`] composes them.

mod auth;
pub mod base_url;
pub mod headers;
mod params;
pub mod path;
pub mod payload;
pub mod query;
pub mod request;

use serde_json::Value;

pub use base_url::base_url;
pub use query::QueryOverrides;
pub use request::{HTTP_METHODS, NO_DESCRIPTION, Synthesizer};

/// The pieces of the document one operation's builders read from.
pub struct OperationContext<'a> {
    pub document: &'a Value,
    pub path: &'a str,
    pub method: &'a str,
    pub path_item: &'a Value,
    pub operation: &'a Value,
}

#[cfg(test)]
pub(crate) fn with_operation<'a, R>(
    document: &'a Value,
    path: &'a str,
    method: &'a str,
    f: impl FnOnce(&OperationContext<'a>, &mut crate::parse::ref_resolve::RefResolver<'a>) -> R,
) -> R {
    let path_item = &document["paths"][path];
    let ctx = OperationContext {
        document,
        path,
        method,
        path_item,
        operation: &path_item[method],
    };
    let mut resolver = crate::parse::ref_resolve::RefResolver::new(document);
    f(&ctx, &mut resolver)
}
