use crate::parse::parameter::ParameterLocation;
use crate::parse::ref_resolve::RefResolver;

use super::OperationContext;
use super::params::{resolve_parameters, stringify};

/// Substitute `{name}` placeholders in the path template with the `example`
/// of the matching path parameter.
///
/// Unlike query and header merging, an operation that declares `parameters`
/// replaces the path-level list wholesale, even when its list is empty.
/// Placeholders without an example stay in the output.
pub fn render_path<'a>(ctx: &OperationContext<'a>, resolver: &mut RefResolver<'a>) -> String {
    let source = ctx
        .operation
        .get("parameters")
        .or_else(|| ctx.path_item.get("parameters"));

    let mut rendered = ctx.path.to_string();
    for param in resolve_parameters(resolver, source) {
        if !param.is_in(ParameterLocation::Path) {
            continue;
        }
        let Some(example) = param.example.as_ref() else {
            continue;
        };
        rendered = rendered.replace(&format!("{{{}}}", param.name), &stringify(example));
    }
    rendered
}
