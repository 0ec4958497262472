//! Schema sampling.
//!
//! The request builders never invent body values themselves: they hand a
//! schema to a [`SchemaSampler`] and serialize whatever comes back.
//! [`DefaultSampler`] is the stock implementation; callers that want
//! different fake data plug in their own through
//! [`Synthesizer::with_sampler`](crate::transform::Synthesizer::with_sampler).

use log::debug;
use serde_json::{Map, Value, json};

use crate::error::SampleError;
use crate::parse::parameter::first_type;
use crate::parse::ref_resolve::{RefResolver, ref_of};

/// Options passed to every sampling call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleOptions {
    /// Leave out properties marked `readOnly: true`.
    pub skip_read_only: bool,
    /// Leave out properties marked `writeOnly: true`.
    pub skip_write_only: bool,
    /// Deepest schema nesting sampled before giving up.
    pub max_depth: usize,
}

impl Default for SampleOptions {
    fn default() -> Self {
        Self {
            skip_read_only: true,
            skip_write_only: false,
            max_depth: 16,
        }
    }
}

/// Produces one representative value for a JSON schema.
///
/// `document` is the API document the schema came from; `$ref`s inside the
/// schema are resolved against it.
pub trait SchemaSampler {
    fn sample(
        &self,
        schema: &Value,
        options: &SampleOptions,
        document: &Value,
    ) -> Result<Value, SampleError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultSampler;

impl SchemaSampler for DefaultSampler {
    fn sample(
        &self,
        schema: &Value,
        options: &SampleOptions,
        document: &Value,
    ) -> Result<Value, SampleError> {
        let mut walk = Walk {
            resolver: RefResolver::new(document),
            options,
            stack: Vec::new(),
        };
        walk.sample(schema, 0)
    }
}

struct Walk<'a, 'o> {
    resolver: RefResolver<'a>,
    options: &'o SampleOptions,
    /// References currently being expanded on this branch.
    stack: Vec<String>,
}

impl Walk<'_, '_> {
    fn sample(&mut self, schema: &Value, depth: usize) -> Result<Value, SampleError> {
        if depth > self.options.max_depth {
            return Err(SampleError::DepthExceeded(self.options.max_depth));
        }

        if let Some(reference) = ref_of(schema) {
            let target = self
                .resolver
                .resolve(reference)
                .map_err(|e| SampleError::Reference(e.to_string()))?;
            if self.stack.iter().any(|r| r == reference) {
                debug!("recursive schema {reference}, sampling an empty value");
                return Ok(empty_value(target));
            }
            self.stack.push(reference.to_string());
            let sampled = self.sample(target, depth + 1);
            self.stack.pop();
            return sampled;
        }

        let Some(obj) = schema.as_object() else {
            return Ok(Value::Null);
        };

        if let Some(example) = obj.get("example") {
            return Ok(example.clone());
        }
        if let Some(first) = first_of(obj, "examples") {
            return Ok(first.clone());
        }
        if let Some(constant) = obj.get("const") {
            return Ok(constant.clone());
        }
        if let Some(default) = obj.get("default") {
            return Ok(default.clone());
        }
        if let Some(first) = first_of(obj, "enum") {
            return Ok(first.clone());
        }
        if let Some(parts) = obj.get("allOf").and_then(Value::as_array) {
            return self.sample_all_of(obj, parts, depth);
        }
        for key in ["oneOf", "anyOf"] {
            if let Some(first) = first_of(obj, key) {
                return self.sample(first, depth + 1);
            }
        }

        match schema_kind(obj) {
            Some("object") => self.sample_object(obj, depth),
            Some("array") => self.sample_array(obj, depth),
            Some("string") => sample_string(obj).map(Value::String),
            Some("integer") => sample_integer(obj),
            Some("number") => sample_number(obj),
            Some("boolean") => Ok(Value::Bool(true)),
            Some("null") | None => Ok(Value::Null),
            Some(other) => Err(SampleError::UnsupportedType(other.to_string())),
        }
    }

    fn sample_all_of(
        &mut self,
        obj: &Map<String, Value>,
        parts: &[Value],
        depth: usize,
    ) -> Result<Value, SampleError> {
        let mut merged = Map::new();
        let mut scalar = None;
        for part in parts {
            match self.sample(part, depth + 1)? {
                Value::Object(fields) => merged.extend(fields),
                other => scalar = Some(other),
            }
        }
        if obj.contains_key("properties") {
            if let Value::Object(own) = self.sample_object(obj, depth)? {
                merged.extend(own);
            }
        }
        match scalar {
            Some(value) if merged.is_empty() => Ok(value),
            _ => Ok(Value::Object(merged)),
        }
    }

    fn sample_object(
        &mut self,
        obj: &Map<String, Value>,
        depth: usize,
    ) -> Result<Value, SampleError> {
        let mut out = Map::new();

        if let Some(properties) = obj.get("properties").and_then(Value::as_object) {
            for (name, property) in properties {
                if self.options.skip_read_only && self.has_flag(property, "readOnly") {
                    continue;
                }
                if self.options.skip_write_only && self.has_flag(property, "writeOnly") {
                    continue;
                }
                out.insert(name.clone(), self.sample(property, depth + 1)?);
            }
        }

        if out.is_empty() {
            if let Some(extra) = obj.get("additionalProperties").filter(|v| v.is_object()) {
                let value = self.sample(extra, depth + 1)?;
                out.insert("property1".to_string(), value.clone());
                out.insert("property2".to_string(), value);
            }
        }

        Ok(Value::Object(out))
    }

    fn sample_array(
        &mut self,
        obj: &Map<String, Value>,
        depth: usize,
    ) -> Result<Value, SampleError> {
        match obj.get("items") {
            Some(Value::Array(tuple)) => tuple
                .iter()
                .map(|item| self.sample(item, depth + 1))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            Some(items) => {
                let count = capped(obj, "minItems", MAX_ITEMS)?.max(1);
                let item = self.sample(items, depth + 1)?;
                Ok(Value::Array(vec![item; count]))
            }
            None => Ok(Value::Array(Vec::new())),
        }
    }

    /// Whether `schema` (or the schema it references) sets `key: true`.
    fn has_flag(&mut self, schema: &Value, key: &str) -> bool {
        if let Some(flag) = schema.get(key).and_then(Value::as_bool) {
            return flag;
        }
        ref_of(schema)
            .and_then(|reference| self.resolver.resolve(reference).ok())
            .and_then(|target| target.get(key))
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}

fn first_of<'v>(obj: &'v Map<String, Value>, key: &str) -> Option<&'v Value> {
    obj.get(key)?.as_array()?.first()
}

fn schema_kind(obj: &Map<String, Value>) -> Option<&str> {
    if let Some(declared) = obj.get("type").and_then(first_type) {
        return Some(declared);
    }
    if obj.contains_key("properties") || obj.contains_key("additionalProperties") {
        Some("object")
    } else if obj.contains_key("items") {
        Some("array")
    } else {
        None
    }
}

fn empty_value(schema: &Value) -> Value {
    match schema.as_object().and_then(schema_kind) {
        Some("object") => Value::Object(Map::new()),
        Some("array") => Value::Array(Vec::new()),
        _ => Value::Null,
    }
}

fn sample_string(obj: &Map<String, Value>) -> Result<String, SampleError> {
    let format = obj.get("format").and_then(Value::as_str).unwrap_or_default();
    let formatted = match format {
        "email" => Some("user@example.com"),
        "date-time" => Some("2019-08-24T14:15:22Z"),
        "date" => Some("2019-08-24"),
        "time" => Some("14:15:22Z"),
        "uuid" => Some("095be615-a8ad-4c33-8e9c-c7612fbf6c9f"),
        "uri" | "url" => Some("http://example.com"),
        "hostname" => Some("example.com"),
        "ipv4" => Some("192.168.0.1"),
        "ipv6" => Some("2001:0db8:85a3:0000:0000:8a2e:0370:7334"),
        "password" => Some("pa$$word"),
        "byte" => Some("U3dhZ2dlciByb2Nrcw=="),
        _ => None,
    };
    if let Some(value) = formatted {
        return Ok(value.to_string());
    }

    let mut value = "string".to_string();
    let min = capped(obj, "minLength", MAX_LENGTH)?;
    if min > value.len() {
        value = value.repeat(min.div_ceil(value.len()));
        value.truncate(min);
    }
    if let Some(max) = obj.get("maxLength").and_then(Value::as_u64) {
        if max < value.len() as u64 {
            value.truncate(max as usize);
        }
    }
    Ok(value)
}

fn sample_integer(obj: &Map<String, Value>) -> Result<Value, SampleError> {
    let bounds = Bounds::of(obj);
    let candidate = match (bounds.lower, bounds.upper) {
        (Some((lo, true)), _) => lo.floor() + 1.0,
        (Some((lo, false)), _) => lo.ceil(),
        (None, Some((hi, true))) if !bounds.admits(0.0) => hi.ceil() - 1.0,
        (None, Some((hi, false))) if !bounds.admits(0.0) => hi.floor(),
        _ => 0.0,
    };
    if !bounds.admits(candidate) || !(-I64_LIMIT..I64_LIMIT).contains(&candidate) {
        return Err(SampleError::Unsatisfiable("integer"));
    }
    Ok(json!(candidate as i64))
}

fn sample_number(obj: &Map<String, Value>) -> Result<Value, SampleError> {
    let bounds = Bounds::of(obj);
    let candidate = match (bounds.lower, bounds.upper) {
        (Some((lo, false)), _) => lo,
        (Some((lo, true)), Some((hi, _))) => lo / 2.0 + hi / 2.0,
        (Some((lo, true)), None) => lo.floor() + 1.0,
        (None, Some((hi, true))) if !bounds.admits(0.0) => hi.ceil() - 1.0,
        (None, Some((hi, false))) if !bounds.admits(0.0) => hi,
        _ => 0.0,
    };
    if !candidate.is_finite() || !bounds.admits(candidate) {
        return Err(SampleError::Unsatisfiable("number"));
    }

    // Echo an inclusive bound as written so `minimum: 1` stays an integer.
    let echoed = ["minimum", "maximum"]
        .into_iter()
        .filter_map(|key| obj.get(key))
        .find(|bound| bound.as_f64() == Some(candidate));
    if let Some(bound) = echoed {
        return Ok(bound.clone());
    }
    if candidate == 0.0 {
        return Ok(json!(0));
    }
    Ok(json!(candidate))
}

/// Largest array or string a sample is allowed to grow to.
const MAX_ITEMS: u64 = 256;
const MAX_LENGTH: u64 = 4096;

// 2^63, the first f64 past `i64::MAX`.
const I64_LIMIT: f64 = 9_223_372_036_854_775_808.0;

/// A count keyword such as `minItems`, rejected above `limit`.
fn capped(
    obj: &Map<String, Value>,
    keyword: &'static str,
    limit: u64,
) -> Result<usize, SampleError> {
    match obj.get(keyword).and_then(Value::as_u64) {
        Some(value) if value > limit => Err(SampleError::LimitExceeded {
            keyword,
            value,
            limit,
        }),
        Some(value) => Ok(value as usize),
        None => Ok(0),
    }
}

/// Numeric range of a schema. The flag marks an exclusive bound.
struct Bounds {
    lower: Option<(f64, bool)>,
    upper: Option<(f64, bool)>,
}

impl Bounds {
    /// Reads both spellings: 3.0 boolean `exclusiveMinimum`/`exclusiveMaximum`
    /// next to `minimum`/`maximum`, and the numeric form used by 3.1.
    fn of(obj: &Map<String, Value>) -> Self {
        let lower = tighter(
            bound(obj, "minimum", "exclusiveMinimum"),
            obj.get("exclusiveMinimum").and_then(Value::as_f64).map(|v| (v, true)),
            |a, b| a > b,
        );
        let upper = tighter(
            bound(obj, "maximum", "exclusiveMaximum"),
            obj.get("exclusiveMaximum").and_then(Value::as_f64).map(|v| (v, true)),
            |a, b| a < b,
        );
        Self { lower, upper }
    }

    fn admits(&self, value: f64) -> bool {
        let above = match self.lower {
            Some((lo, true)) => value > lo,
            Some((lo, false)) => value >= lo,
            None => true,
        };
        let below = match self.upper {
            Some((hi, true)) => value < hi,
            Some((hi, false)) => value <= hi,
            None => true,
        };
        above && below
    }
}

fn bound(obj: &Map<String, Value>, key: &str, flag: &str) -> Option<(f64, bool)> {
    let value = obj.get(key)?.as_f64()?;
    let exclusive = obj.get(flag).and_then(Value::as_bool).unwrap_or(false);
    Some((value, exclusive))
}

/// The more restrictive of two bounds; on a tie the exclusive one.
fn tighter(
    a: Option<(f64, bool)>,
    b: Option<(f64, bool)>,
    stricter: fn(f64, f64) -> bool,
) -> Option<(f64, bool)> {
    match (a, b) {
        (Some(a), Some(b)) if stricter(b.0, a.0) || (b.0 == a.0 && b.1) => Some(b),
        (Some(a), _) => Some(a),
        (None, b) => b,
    }
}
