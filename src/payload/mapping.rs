//! Payload mapping schema.
//!
//! A mapping rule describes how the invoker should build one outbound HTTP
//! request for an incoming event. Rules live in an external file as an array
//! of `{"mapping": {...}}` records; see [`super::loader`] for how that file
//! is read.
//!
//! Fields that accept more than one shape in the file are modelled as
//! explicit enums so the invoker pattern-matches on the variant instead of
//! inspecting JSON types at run time:
//!
//! - `enabled` is an [`Enabled`]: a literal boolean or a dynamic expression
//! - `body`, `headers` and `query` are [`RequestPart`]s: a single template
//!   string or a string-to-string map
//!
//! # Example
//!
//! ```rust
//! use port_agent::payload::mapping::{ControlThePayloadConfig, Enabled, HttpMethod};
//!
//! let json = r#"[{"mapping": {"method": "POST", "url": "https://example.com/hook"}}]"#;
//! let rules: Vec<ControlThePayloadConfig> = serde_json::from_str(json).unwrap();
//!
//! assert_eq!(rules[0].mapping.method, Some(HttpMethod::Post));
//! assert_eq!(rules[0].mapping.enabled, Enabled::Literal(true));
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// HTTP methods a mapping may request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Post,
    Get,
    Delete,
    Put,
}

impl HttpMethod {
    /// Wire token for this method
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Post => "POST",
            Self::Get => "GET",
            Self::Delete => "DELETE",
            Self::Put => "PUT",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "POST" => Ok(Self::Post),
            "GET" => Ok(Self::Get),
            "DELETE" => Ok(Self::Delete),
            "PUT" => Ok(Self::Put),
            other => Err(format!(
                "unsupported method {:?}, expected one of POST, GET, DELETE, PUT",
                other
            )),
        }
    }
}

/// Whether a mapping applies
///
/// `Literal` is a fixed on/off switch. `Dynamic` carries an expression the
/// invoker evaluates per event; its syntax is owned by the invoker and is not
/// interpreted here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawEnabled", into = "RawEnabled")]
pub enum Enabled {
    Literal(bool),
    Dynamic(String),
}

impl Enabled {
    /// The fixed value, or `None` when the rule must be evaluated per event
    pub fn as_literal(&self) -> Option<bool> {
        match self {
            Self::Literal(value) => Some(*value),
            Self::Dynamic(_) => None,
        }
    }

    /// The expression to evaluate, if any
    pub fn as_dynamic(&self) -> Option<&str> {
        match self {
            Self::Literal(_) => None,
            Self::Dynamic(expr) => Some(expr),
        }
    }
}

impl Default for Enabled {
    fn default() -> Self {
        Self::Literal(true)
    }
}

impl fmt::Display for Enabled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(value) => write!(f, "{}", value),
            Self::Dynamic(expr) => f.write_str(expr),
        }
    }
}

/// On-disk shape of `enabled` before boolean tokens are recognised
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawEnabled {
    Bool(bool),
    Text(String),
}

impl From<RawEnabled> for Enabled {
    fn from(raw: RawEnabled) -> Self {
        match raw {
            RawEnabled::Bool(value) => Self::Literal(value),
            RawEnabled::Text(text) => match parse_bool_token(&text) {
                Some(value) => Self::Literal(value),
                None => Self::Dynamic(text),
            },
        }
    }
}

impl From<Enabled> for RawEnabled {
    fn from(enabled: Enabled) -> Self {
        match enabled {
            Enabled::Literal(value) => Self::Bool(value),
            Enabled::Dynamic(expr) => Self::Text(expr),
        }
    }
}

/// Recognise the string spellings of booleans accepted in mapping files
fn parse_bool_token(text: &str) -> Option<bool> {
    match text.to_ascii_lowercase().as_str() {
        "1" | "on" | "t" | "true" | "y" | "yes" => Some(true),
        "0" | "off" | "f" | "false" | "n" | "no" => Some(false),
        _ => None,
    }
}

/// Body, headers or query of the outbound request
///
/// `Template` is a single string rendered by the invoker into the whole
/// part. `KeyValue` is a structured map whose values are rendered one by
/// one. Template contents are not validated here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestPart {
    Template(String),
    KeyValue(BTreeMap<String, String>),
}

impl RequestPart {
    /// Template string, when this part is a single template
    pub fn as_template(&self) -> Option<&str> {
        match self {
            Self::Template(template) => Some(template),
            Self::KeyValue(_) => None,
        }
    }

    /// Key/value entries, when this part is structured
    pub fn as_key_value(&self) -> Option<&BTreeMap<String, String>> {
        match self {
            Self::Template(_) => None,
            Self::KeyValue(entries) => Some(entries),
        }
    }
}

/// One outbound request rule
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mapping {
    /// Whether the rule applies; defaults to `true`
    #[serde(default)]
    pub enabled: Enabled,

    /// HTTP method; `None` leaves the choice to the invoker
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<HttpMethod>,

    /// Target URL or URL template
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Request body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<RequestPart>,

    /// Request headers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<RequestPart>,

    /// Query string parameters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<RequestPart>,
}

impl Mapping {
    /// True when the rule is switched off with a literal `false`
    pub fn is_statically_disabled(&self) -> bool {
        self.enabled.as_literal() == Some(false)
    }
}

/// Wrapper record as it appears in the mapping file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlThePayloadConfig {
    pub mapping: Mapping,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> serde_json::Result<Mapping> {
        serde_json::from_value(value)
    }

    #[test]
    fn test_empty_mapping_defaults() {
        let mapping = parse(json!({})).unwrap();

        assert_eq!(mapping, Mapping::default());
        assert_eq!(mapping.enabled, Enabled::Literal(true));
        assert!(mapping.method.is_none());
        assert!(mapping.url.is_none());
        assert!(!mapping.is_statically_disabled());
    }

    #[test]
    fn test_method_tokens() {
        for (token, method) in [
            ("POST", HttpMethod::Post),
            ("GET", HttpMethod::Get),
            ("DELETE", HttpMethod::Delete),
            ("PUT", HttpMethod::Put),
        ] {
            let mapping = parse(json!({ "method": token })).unwrap();
            assert_eq!(mapping.method, Some(method));
            assert_eq!(method.to_string(), token);
            assert_eq!(token.parse::<HttpMethod>().unwrap(), method);
        }
    }

    #[test]
    fn test_method_outside_enumeration_rejected() {
        assert!(parse(json!({ "method": "PATCH" })).is_err());
        assert!(parse(json!({ "method": "post" })).is_err());
        assert!("PATCH".parse::<HttpMethod>().is_err());
    }

    #[test]
    fn test_null_method_is_absent() {
        let mapping = parse(json!({ "method": null })).unwrap();
        assert!(mapping.method.is_none());
    }

    #[test]
    fn test_enabled_literal_bool() {
        let mapping = parse(json!({ "enabled": false })).unwrap();
        assert_eq!(mapping.enabled, Enabled::Literal(false));
        assert!(mapping.is_statically_disabled());
    }

    #[test]
    fn test_enabled_boolean_strings_are_literal() {
        for (token, expected) in [("true", true), ("False", false), ("yes", true), ("0", false)] {
            let mapping = parse(json!({ "enabled": token })).unwrap();
            assert_eq!(mapping.enabled, Enabled::Literal(expected), "token {}", token);
        }
    }

    #[test]
    fn test_padded_boolean_string_is_dynamic() {
        let mapping = parse(json!({ "enabled": " yes " })).unwrap();

        assert_eq!(mapping.enabled, Enabled::Dynamic(" yes ".to_string()));
    }

    #[test]
    fn test_enabled_expression_is_dynamic() {
        let expr = ".action == \"deploy\"";
        let mapping = parse(json!({ "enabled": expr })).unwrap();

        assert_eq!(mapping.enabled, Enabled::Dynamic(expr.to_string()));
        assert_eq!(mapping.enabled.as_dynamic(), Some(expr));
        assert_eq!(mapping.enabled.as_literal(), None);
        assert!(!mapping.is_statically_disabled());
    }

    #[test]
    fn test_enabled_wrong_type_rejected() {
        assert!(parse(json!({ "enabled": 3 })).is_err());
        assert!(parse(json!({ "enabled": ["x"] })).is_err());
    }

    #[test]
    fn test_request_parts_template_and_key_value() {
        let mapping = parse(json!({
            "body": ".payload.properties",
            "headers": { "Authorization": "Bearer .secret", "X-Run": ".context.runId" },
            "query": { "q": ".payload.entity.identifier" }
        }))
        .unwrap();

        let body = mapping.body.unwrap();
        assert_eq!(body.as_template(), Some(".payload.properties"));
        assert!(body.as_key_value().is_none());

        let headers = mapping.headers.unwrap();
        let entries = headers.as_key_value().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries["X-Run"], ".context.runId");

        assert!(matches!(mapping.query, Some(RequestPart::KeyValue(_))));
    }

    #[test]
    fn test_request_part_non_string_values_rejected() {
        assert!(parse(json!({ "headers": { "X-Count": 1 } })).is_err());
        assert!(parse(json!({ "body": 42 })).is_err());
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let mapping = parse(json!({ "url": "https://x", "retries": 3 })).unwrap();
        assert_eq!(mapping.url.as_deref(), Some("https://x"));
    }

    #[test]
    fn test_serialization_omits_absent_fields() {
        let mapping = Mapping {
            method: Some(HttpMethod::Put),
            ..Mapping::default()
        };
        let value = serde_json::to_value(&mapping).unwrap();

        assert_eq!(value, json!({ "enabled": true, "method": "PUT" }));
    }

    #[test]
    fn test_dynamic_enabled_survives_reload() {
        let original = ControlThePayloadConfig {
            mapping: Mapping {
                enabled: Enabled::Dynamic(".event == \"RUN\"".to_string()),
                ..Mapping::default()
            },
        };
        let json = serde_json::to_string(&original).unwrap();
        let reloaded: ControlThePayloadConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(reloaded, original);
    }
}
