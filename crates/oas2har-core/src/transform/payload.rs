use log::debug;
use serde_json::{Map, Value};
use url::form_urlencoded;

use crate::error::HarError;
use crate::har::{NameValue, PostData};
use crate::parse::parameter::{Parameter, ParameterLocation};
use crate::parse::ref_resolve::{RefResolver, ref_of};
use crate::sampler::{SampleOptions, SchemaSampler};

use super::OperationContext;
use super::params::{operation_level, path_level, placeholder, stringify};

pub const MULTIPART: &str = "multipart/form-data";
pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// Build the request body of one operation, or `None` when it declares none.
///
/// Swagger 2.0 `body`/`formData` parameters are scanned first, path level then
/// operation level; a 3.0 `requestBody` is applied last. Whatever is written
/// last wins, except that consecutive `formData` parameters accumulate into one
/// multipart body.
pub fn payload<'a, S: SchemaSampler + ?Sized>(
    ctx: &OperationContext<'a>,
    resolver: &mut RefResolver<'a>,
    sampler: &S,
    options: &SampleOptions,
) -> Result<Option<PostData>, HarError> {
    let mut payload: Option<PostData> = None;

    let params = path_level(ctx, resolver)
        .into_iter()
        .chain(operation_level(ctx, resolver));
    for param in params {
        match param.location {
            Some(ParameterLocation::Body) => {
                if let Some(body) = body_parameter(ctx, resolver, sampler, options, &param)? {
                    payload = Some(body);
                }
            }
            Some(ParameterLocation::FormData) => {
                let form = match payload.take() {
                    Some(existing) if existing.mime_type == MULTIPART => existing,
                    _ => PostData::multipart(),
                };
                let form = payload.insert(form);
                form.params
                    .push(NameValue::new(param.name.clone(), placeholder(&param)));
            }
            _ => {}
        }
    }

    if let Some(body) = ctx.operation.get("requestBody") {
        let body = resolver.resolve_value(body)?;
        if let Some(content) = body.get("content").and_then(Value::as_object) {
            for (mime, media) in content {
                if let Some(built) = media_payload(ctx, sampler, options, mime, media)? {
                    payload = Some(built);
                }
            }
        }
    }

    Ok(payload)
}

fn body_parameter<'a, S: SchemaSampler + ?Sized>(
    ctx: &OperationContext<'a>,
    resolver: &mut RefResolver<'a>,
    sampler: &S,
    options: &SampleOptions,
    param: &Parameter,
) -> Result<Option<PostData>, HarError> {
    let Some(schema) = param.schema.as_ref() else {
        debug!("{} {}: body parameter `{}` has no schema", ctx.path, ctx.method, param.name);
        return Ok(None);
    };
    let mut schema = match ref_of(schema) {
        Some(reference) => resolver.resolve(reference)?.clone(),
        None => schema.clone(),
    };
    if let Value::Object(obj) = &mut schema {
        obj.entry("type")
            .or_insert_with(|| Value::String("object".to_string()));
    }

    let sample = sampler.sample(&schema, options, ctx.document)?;
    Ok(Some(PostData::json(sample.to_string())))
}

/// One `requestBody.content` entry. Media types other than JSON, multipart
/// and url-encoded forms are skipped.
fn media_payload<S: SchemaSampler + ?Sized>(
    ctx: &OperationContext<'_>,
    sampler: &S,
    options: &SampleOptions,
    mime: &str,
    media: &Value,
) -> Result<Option<PostData>, HarError> {
    let essence = mime
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    if !matches!(
        essence.as_str(),
        "application/json" | "*/*" | MULTIPART | FORM_URLENCODED
    ) {
        debug!("{} {}: no body synthesis for {mime}", ctx.path, ctx.method);
        return Ok(None);
    }

    let sample = if let Some(example) = media.get("example") {
        example.clone()
    } else if let Some(schema) = media.get("schema") {
        sampler.sample(schema, options, ctx.document)?
    } else {
        debug!("{} {}: {mime} declares no schema", ctx.path, ctx.method);
        return Ok(None);
    };

    let built = match essence.as_str() {
        MULTIPART => {
            let mut form = PostData::multipart();
            form.params = fields(&sample)
                .map(|(name, value)| {
                    let shouted = stringify(value).to_uppercase();
                    NameValue::new(name.clone(), format!("SOME_{shouted}_VALUE"))
                })
                .collect();
            form
        }
        FORM_URLENCODED => {
            let params: Vec<NameValue> = fields(&sample)
                .map(|(name, value)| NameValue::new(name.clone(), stringify(value)))
                .collect();
            let mut serializer = form_urlencoded::Serializer::new(String::new());
            for param in &params {
                serializer.append_pair(&param.name, &param.value);
            }
            PostData {
                mime_type: FORM_URLENCODED.to_string(),
                text: Some(serializer.finish()),
                params,
            }
        }
        _ => PostData::json(sample.to_string()),
    };
    Ok(Some(built))
}

fn fields(sample: &Value) -> impl Iterator<Item = (&String, &Value)> {
    sample.as_object().into_iter().flat_map(Map::iter)
}
