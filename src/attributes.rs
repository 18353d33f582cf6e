//! Attribute Pipeline
//!
//! Turns an [`ElementContext`] into the attribute text spliced into the
//! opening tag. Every value, built-in or custom, is HTML-escaped right before
//! it is written; that is what keeps option or prop content from breaking
//! out of the attribute.

use base64::{prelude::BASE64_STANDARD, Engine};
use lazy_static::lazy_static;
use log::warn;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::HashSet;

use crate::callbacks::invoke_guarded;
use crate::config::{EffectiveConfig, MetadataEncoding};
use crate::context::ElementContext;

pub const MAX_METADATA_BYTES: usize = 10 * 1024;
pub const TRUNCATION_SENTINEL: &str = "...[truncated]";
pub const MAX_CUSTOM_ATTRIBUTES: usize = 50;
pub const MAX_CUSTOM_VALUE_CHARS: usize = 1000;

/// Characters `encodeURIComponent` leaves alone.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

lazy_static! {
    static ref FORBIDDEN_KEYS: HashSet<&'static str> =
        ["__proto__", "constructor", "prototype"].into_iter().collect();
    static ref ATTRIBUTE_KEY_RE: Regex = Regex::new(r"^[A-Za-z0-9_][A-Za-z0-9_.:-]*$").unwrap();
}

/// Ordered `(key, raw value)` pairs, before escaping.
pub type AttributeValues = Vec<(String, String)>;

pub struct AttributePipeline<'c> {
    config: &'c EffectiveConfig,
}

impl<'c> AttributePipeline<'c> {
    pub fn new(config: &'c EffectiveConfig) -> Self {
        Self { config }
    }

    /// Attribute text without surrounding whitespace; empty when nothing is
    /// enabled.
    pub fn generate(&self, ctx: &ElementContext) -> String {
        let values = self.compute_values(ctx);
        self.render(&values)
    }

    pub fn compute_values(&self, ctx: &ElementContext) -> AttributeValues {
        let mut values = AttributeValues::new();

        let id = format!("{}:{}:{}", ctx.file_path, ctx.line, ctx.column);
        self.push_builtin(&mut values, "id", id);
        self.push_builtin(&mut values, "name", ctx.element_name.clone());
        self.push_builtin(&mut values, "path", ctx.file_path.clone());
        self.push_builtin(&mut values, "line", ctx.line.to_string());
        self.push_builtin(&mut values, "file", ctx.file_name.clone());
        self.push_builtin(&mut values, "component", ctx.element_name.clone());

        if self.config.attribute_enabled("metadata") {
            if let Some(json) = build_metadata(ctx) {
                values.push((
                    "metadata".to_string(),
                    encode_payload(&json, self.config.metadata_encoding),
                ));
            }
        }

        if self.config.include_source_map
            && self.config.attribute_enabled("sourcemap")
            && self.config.attribute_enabled("path")
        {
            values.push((
                "sourcemap".to_string(),
                format!("source://{}:{}:{}", ctx.file_path, ctx.line, ctx.column),
            ));
        }

        self.push_custom(&mut values, ctx);
        values
    }

    fn push_builtin(&self, values: &mut AttributeValues, key: &str, value: String) {
        if self.config.attribute_enabled(key) {
            values.push((key.to_string(), self.apply_transformer(key, value)));
        }
    }

    /// Non-string results and failures keep the original value.
    fn apply_transformer(&self, key: &str, value: String) -> String {
        let Some(transformer) = self.config.transformers.get(key) else {
            return value;
        };

        match invoke_guarded(|| transformer(&value)) {
            Ok(Value::String(transformed)) => transformed,
            Ok(other) => {
                warn!(attribute = key; "Transformer returned a non-string ({}), keeping original value", other);
                value
            }
            Err(e) => {
                warn!(attribute = key; "Transformer failed, keeping original value: {}", e);
                value
            }
        }
    }

    fn push_custom(&self, values: &mut AttributeValues, ctx: &ElementContext) {
        let Some(provider) = &self.config.custom_attributes else {
            return;
        };

        let entries = match invoke_guarded(|| provider(ctx)) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(
                    element = ctx.element_name.as_str(),
                    file = ctx.file_path.as_str(),
                    line = ctx.line;
                    "customAttributes failed, adding none: {}", e
                );
                return;
            }
        };

        let own_prefix = format!("{}-", self.config.prefix);
        let mut accepted = 0usize;

        for (raw_key, value) in entries {
            let key = raw_key.strip_prefix(&own_prefix).unwrap_or(&raw_key).to_string();
            if FORBIDDEN_KEYS.contains(raw_key.as_str()) || FORBIDDEN_KEYS.contains(key.as_str()) {
                warn!(key = raw_key.as_str(); "Dropping forbidden custom attribute key");
                continue;
            }
            if accepted >= MAX_CUSTOM_ATTRIBUTES {
                warn!(
                    element = ctx.element_name.as_str();
                    "More than {} custom attributes, ignoring the rest", MAX_CUSTOM_ATTRIBUTES
                );
                break;
            }

            if !ATTRIBUTE_KEY_RE.is_match(&key) {
                warn!(key = key.as_str(); "Dropping custom attribute with an invalid name");
                continue;
            }
            if values.iter().any(|(existing, _)| *existing == key) {
                warn!(key = key.as_str(); "Custom attribute clashes with a generated one, skipping");
                continue;
            }

            let value = match value {
                Value::Null => continue,
                Value::String(s) => s,
                other => other.to_string(),
            };

            values.push((key.clone(), truncate_custom_value(&key, value)));
            accepted += 1;
        }
    }

    pub fn render(&self, values: &AttributeValues) -> String {
        if values.is_empty() {
            return String::new();
        }

        if self.config.group_attributes {
            let grouped: Map<String, Value> = values
                .iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect();
            let json = Value::Object(grouped).to_string();
            let encoded = encode_payload(&json, self.config.metadata_encoding);
            return format!("{}=\"{}\"", self.config.prefix, escape_attribute(&encoded));
        }

        values
            .iter()
            .map(|(key, value)| {
                format!(
                    "{}-{}=\"{}\"",
                    self.config.prefix,
                    key,
                    escape_attribute(value)
                )
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn truncate_custom_value(key: &str, value: String) -> String {
    if value.chars().count() <= MAX_CUSTOM_VALUE_CHARS {
        return value;
    }
    warn!(key = key; "Custom attribute value longer than {} characters, truncating", MAX_CUSTOM_VALUE_CHARS);
    let mut truncated: String = value.chars().take(MAX_CUSTOM_VALUE_CHARS).collect();
    truncated.push_str("...");
    truncated
}

// ═══════════════════════════════════════════════════════════════════════════════
// METADATA
// ═══════════════════════════════════════════════════════════════════════════════

/// Props merged with text content (under `text`), serialized and bounded.
pub fn build_metadata(ctx: &ElementContext) -> Option<String> {
    let mut object = ctx.props.clone().unwrap_or_default();
    if let Some(text) = &ctx.content {
        object.insert("text".to_string(), Value::String(text.clone()));
    }
    if object.is_empty() {
        return None;
    }
    Some(bound_metadata(object))
}

/// Applied before encoding so every encoding sees the same cap.
pub fn bound_metadata(mut object: Map<String, Value>) -> String {
    let json = Value::Object(object.clone()).to_string();
    if json.len() <= MAX_METADATA_BYTES {
        return json;
    }

    object.insert("_truncated".to_string(), Value::Bool(true));
    object.insert("_originalSize".to_string(), Value::from(json.len()));
    let marked = Value::Object(object).to_string();
    if marked.len() <= MAX_METADATA_BYTES {
        return marked;
    }

    let mut cut = MAX_METADATA_BYTES;
    while !marked.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}{}", &marked[..cut], TRUNCATION_SENTINEL)
}

/// `none` leaves the JSON as is; quoting happens in [`escape_attribute`].
pub fn encode_payload(json: &str, encoding: MetadataEncoding) -> String {
    match encoding {
        MetadataEncoding::Json => utf8_percent_encode(json, URI_COMPONENT).to_string(),
        MetadataEncoding::Base64 => BASE64_STANDARD.encode(json.as_bytes()),
        MetadataEncoding::None => json.to_string(),
    }
}

pub fn escape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
