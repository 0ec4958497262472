use log::{debug, warn};
use serde::Deserialize;
use serde_json::Value;

use crate::parse::ref_resolve::RefResolver;
use crate::parse::security::{AuthCandidate, SecurityScheme, scheme_table};

use super::OperationContext;

/// Credentials requested by the security requirements in effect for the
/// operation, in declaration order.
///
/// Operation-level `security` replaces the document-level list entirely, so
/// `security: []` on an operation turns authentication off. Requirements that
/// name an undefined or unusable scheme are logged and skipped.
pub(crate) fn security_candidates<'a>(
    ctx: &OperationContext<'a>,
    resolver: &mut RefResolver<'a>,
) -> Vec<AuthCandidate> {
    let requirements = ctx
        .operation
        .get("security")
        .or_else(|| ctx.document.get("security"))
        .and_then(Value::as_array);
    let Some(requirements) = requirements else {
        return Vec::new();
    };
    let table = scheme_table(ctx.document);

    let mut candidates = Vec::new();
    for requirement in requirements {
        let Some(names) = requirement.as_object() else {
            continue;
        };
        for name in names.keys() {
            let Some(entry) = table.and_then(|t| t.get(name)) else {
                warn!("security scheme `{name}` is not defined");
                continue;
            };
            let entry = match resolver.resolve_value(entry) {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("security scheme `{name}`: {e}");
                    continue;
                }
            };
            match SecurityScheme::deserialize(entry).map(|s| s.classify()) {
                Ok(Some(candidate)) => candidates.push(candidate),
                Ok(None) => debug!("security scheme `{name}` needs no synthesized credential"),
                Err(e) => warn!("security scheme `{name}` is malformed: {e}"),
            }
        }
    }
    candidates
}
