use log::warn;
use serde_json::Value;

use crate::har::NameValue;
use crate::parse::parameter::ParameterLocation;
use crate::parse::ref_resolve::RefResolver;
use crate::parse::security::{ApiKeyLocation, AuthCandidate};

use super::OperationContext;
use super::auth::security_candidates;
use super::params::{MergedEntries, operation_level, path_level, placeholder};
use super::query::API_KEY_PLACEHOLDER;

pub const BASIC_AUTH_PLACEHOLDER: &str = "Basic REPLACE_BASIC_AUTH";
pub const BEARER_PLACEHOLDER: &str = "Bearer REPLACE_BEARER_TOKEN";

/// Build the header list of one operation.
///
/// Order: `accept` per `consumes`, `content-type` per `produces`,
/// `content-type` per `requestBody.content` key, declared header parameters,
/// then at most one synthesized credential.
pub fn headers<'a>(ctx: &OperationContext<'a>, resolver: &mut RefResolver<'a>) -> Vec<NameValue> {
    let mut headers = Vec::new();

    for mime in media_list(ctx, "consumes") {
        headers.push(NameValue::new("accept", mime));
    }
    for mime in media_list(ctx, "produces") {
        headers.push(NameValue::new("content-type", mime));
    }
    for mime in request_body_types(ctx, resolver) {
        headers.push(NameValue::new("content-type", mime));
    }

    let mut declared = MergedEntries::default();
    for param in path_level(ctx, resolver) {
        if param.is_in(ParameterLocation::Header) {
            declared.insert(NameValue::new(param.name.clone(), placeholder(&param)));
        }
    }
    for param in operation_level(ctx, resolver) {
        if param.is_in(ParameterLocation::Header) {
            declared.override_with(NameValue::new(param.name.clone(), placeholder(&param)));
        }
    }
    for entry in declared.into_vec() {
        headers.retain(|h| !h.name.eq_ignore_ascii_case(&entry.name));
        headers.push(entry);
    }

    if let Some(auth) = auth_header(&security_candidates(ctx, resolver)) {
        if headers.iter().any(|h| h.name.eq_ignore_ascii_case(&auth.name)) {
            warn!(
                "{} {}: `{}` is declared explicitly, not synthesizing a credential",
                ctx.path, ctx.method, auth.name
            );
        } else {
            headers.push(auth);
        }
    }

    headers
}

/// The single credential header to add: Basic beats an API key, which beats
/// Bearer.
fn auth_header(candidates: &[AuthCandidate]) -> Option<NameValue> {
    if candidates.contains(&AuthCandidate::Basic) {
        return Some(NameValue::new("Authorization", BASIC_AUTH_PLACEHOLDER));
    }
    let api_key = candidates.iter().find_map(|c| match c {
        AuthCandidate::ApiKey {
            location: ApiKeyLocation::Header,
            name,
        } => Some(name),
        _ => None,
    });
    if let Some(name) = api_key {
        return Some(NameValue::new(name.clone(), API_KEY_PLACEHOLDER));
    }
    candidates
        .contains(&AuthCandidate::Bearer)
        .then(|| NameValue::new("Authorization", BEARER_PLACEHOLDER))
}

/// `consumes`/`produces` of the operation, else of the document.
fn media_list<'a>(ctx: &OperationContext<'a>, key: &str) -> Vec<&'a str> {
    ctx.operation
        .get(key)
        .or_else(|| ctx.document.get(key))
        .and_then(Value::as_array)
        .map(|list| list.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default()
}

fn request_body_types<'a>(
    ctx: &OperationContext<'a>,
    resolver: &mut RefResolver<'a>,
) -> Vec<&'a str> {
    let Some(body) = ctx.operation.get("requestBody") else {
        return Vec::new();
    };
    match resolver.resolve_value(body) {
        Ok(body) => body
            .get("content")
            .and_then(Value::as_object)
            .map(|content| content.keys().map(String::as_str).collect())
            .unwrap_or_default(),
        Err(e) => {
            warn!("{} {}: requestBody: {e}", ctx.path, ctx.method);
            Vec::new()
        }
    }
}
