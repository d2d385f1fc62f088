//! Resource identifier parsing.
//!
//! Resource identifiers are URL paths made of alternating keys and values,
//! for example
//! `/subscriptions/{sub}/resourceGroups/{rg}/providers/Microsoft.Foo/bars/{bar}`.
//! A `providers/{namespace}` pair starts the type portion of the id.

use serde_json::Value;
use url::Url;

/// Key introducing a provider namespace.
pub const PROVIDERS_SEGMENT: &str = "providers";

/// Get the `body.id` string of a response example, or an empty string.
pub fn extract_response_id(response: &Value) -> String {
    response
        .get("body")
        .filter(|body| body.is_object())
        .and_then(|body| body.get("id"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_default()
}

/// Get the id of the parent resource, or an empty string when `id` has no
/// parent or cannot be parsed.
pub fn parent_identifier(id: &str) -> String {
    let Some(path) = request_uri_path(id) else {
        return String::new();
    };
    let components = split_components(&path);

    // The last pair is the resource itself.
    let mut end = components.len().saturating_sub(2);
    if end >= 2 && components[end - 2] == PROVIDERS_SEGMENT {
        end -= 2;
    }

    components[..end]
        .chunks_exact(2)
        .map(|pair| format!("/{}/{}", pair[0], pair[1]))
        .collect()
}

/// Decoded path of a request URI: an absolute URI or an absolute path.
///
/// The path is taken as written, without resolving dot segments or
/// rewriting separators. Opaque URIs such as `urn:a/b` have an empty path.
fn request_uri_path(id: &str) -> Option<String> {
    if id.is_empty() || id.chars().any(|c| c.is_ascii_control()) {
        return None;
    }
    let raw = id.split_once('?').map_or(id, |(path, _)| path);
    let path = if raw.starts_with('/') {
        raw
    } else {
        absolute_uri_path(id, raw)?
    };
    decode_path(path)
}

/// Raw path of `scheme:[//authority]path`, with the query already cut.
fn absolute_uri_path<'a>(id: &str, raw: &'a str) -> Option<&'a str> {
    let (scheme, rest) = raw.split_once(':')?;
    if !is_scheme(scheme) {
        return None;
    }
    let url = Url::parse(id).ok()?;
    if url.cannot_be_a_base() || !rest.starts_with('/') {
        return Some("");
    }
    match rest.strip_prefix("//") {
        Some(authority) if !authority.starts_with('/') => {
            Some(authority.find('/').map_or("", |start| &authority[start..]))
        }
        _ => Some(rest),
    }
}

fn is_scheme(scheme: &str) -> bool {
    let mut chars = scheme.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// Percent-decode a path, rejecting malformed escapes.
fn decode_path(path: &str) -> Option<String> {
    let bytes = path.as_bytes();
    for (index, _) in path.match_indices('%') {
        let escape = bytes.get(index + 1..index + 3)?;
        if !escape.iter().all(u8::is_ascii_hexdigit) {
            return None;
        }
    }
    let decoded = urlencoding::decode_binary(bytes);
    Some(String::from_utf8_lossy(&decoded).into_owned())
}

fn split_components(path: &str) -> Vec<&str> {
    let path = path.strip_prefix('/').unwrap_or(path);
    let path = path.strip_suffix('/').unwrap_or(path);
    path.split('/').collect()
}

/// A parsed resource identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceId {
    raw: String,
    segments: Vec<(String, String)>,
}

impl ResourceId {
    /// Parse an identifier made of complete key/value pairs.
    pub fn parse(id: &str) -> Option<Self> {
        let path = request_uri_path(id)?;
        let components = split_components(&path);
        if components.len() % 2 != 0 || components.iter().any(|c| c.is_empty()) {
            return None;
        }
        let segments = components
            .chunks_exact(2)
            .map(|pair| (pair[0].to_string(), pair[1].to_string()))
            .collect();
        Some(Self {
            raw: id.to_string(),
            segments,
        })
    }

    /// Ordered key/value pairs.
    pub fn segments(&self) -> &[(String, String)] {
        &self.segments
    }

    /// Name of the resource (the last value).
    pub fn name(&self) -> &str {
        self.segments
            .last()
            .map(|(_, value)| value.as_str())
            .unwrap_or_default()
    }

    /// Fully qualified resource type, e.g. `Microsoft.Foo/bars/subbars`.
    pub fn resource_type(&self) -> Option<String> {
        let providers = self
            .segments
            .iter()
            .rposition(|(key, _)| key == PROVIDERS_SEGMENT);

        match providers {
            Some(index) => {
                let namespace = &self.segments[index].1;
                let types: Vec<&str> = self.segments[index + 1..]
                    .iter()
                    .map(|(key, _)| key.as_str())
                    .collect();
                if types.is_empty() {
                    return None;
                }
                Some(format!("{}/{}", namespace, types.join("/")))
            }
            None => match self.segments.last().map(|(key, _)| key.as_str()) {
                Some("resourceGroups") => Some("Microsoft.Resources/resourceGroups".to_string()),
                Some("subscriptions") => Some("Microsoft.Resources/subscriptions".to_string()),
                _ => None,
            },
        }
    }

    /// Identifier of the parent resource; empty for top-level resources.
    pub fn parent_id(&self) -> String {
        parent_identifier(&self.raw)
    }
}

impl std::fmt::Display for ResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const BAR_ID: &str = "/subscriptions/s/resourceGroups/rg/providers/Microsoft.Foo/bars/b1";

    #[test]
    fn test_extract_response_id() {
        let response = json!({"body": {"id": BAR_ID, "name": "b1"}});
        assert_eq!(extract_response_id(&response), BAR_ID);
    }

    #[test]
    fn test_extract_response_id_shape_mismatch() {
        assert_eq!(extract_response_id(&json!({})), "");
        assert_eq!(extract_response_id(&json!({"body": {}})), "");
        assert_eq!(extract_response_id(&json!({"body": {"id": 42}})), "");
        assert_eq!(extract_response_id(&json!({"body": "id"})), "");
        assert_eq!(extract_response_id(&json!({"body": [{"id": BAR_ID}]})), "");
        assert_eq!(extract_response_id(&json!("body")), "");
        assert_eq!(extract_response_id(&Value::Null), "");
    }

    #[test]
    fn test_parent_of_child_resource() {
        let id = "/subscriptions/s1/resourceGroups/rg1/providers/Microsoft.Foo/bars/b1/subbars/sb1";
        assert_eq!(
            parent_identifier(id),
            "/subscriptions/s1/resourceGroups/rg1/providers/Microsoft.Foo/bars/b1"
        );
    }

    #[test]
    fn test_parent_skips_provider_pair() {
        assert_eq!(parent_identifier(BAR_ID), "/subscriptions/s/resourceGroups/rg");
        assert_eq!(
            parent_identifier("/subscriptions/s/providers/Microsoft.Foo/bars/b1"),
            "/subscriptions/s"
        );
        assert_eq!(parent_identifier("/providers/Microsoft.Foo/bars/b1"), "");
    }

    #[test]
    fn test_parent_of_extension_resource() {
        let id = format!("{}/providers/Microsoft.Bar/locks/l1", BAR_ID);
        assert_eq!(parent_identifier(&id), BAR_ID);
    }

    #[test]
    fn test_parent_of_top_level_resources() {
        assert_eq!(parent_identifier("/subscriptions/s1"), "");
        assert_eq!(
            parent_identifier("/subscriptions/s1/resourceGroups/rg1"),
            "/subscriptions/s1"
        );
        assert_eq!(parent_identifier("/"), "");
    }

    #[test]
    fn test_parent_ignores_trailing_slash_and_query() {
        let id = "/subscriptions/s/resourceGroups/rg/providers/Microsoft.Foo/bars/b1/?api-version=2021-01-01";
        assert_eq!(parent_identifier(id), "/subscriptions/s/resourceGroups/rg");
    }

    #[test]
    fn test_parent_from_absolute_url() {
        let id = format!("https://management.azure.com{}/subbars/sb1", BAR_ID);
        assert_eq!(parent_identifier(&id), BAR_ID);
    }

    #[test]
    fn test_parent_of_unparseable_id() {
        assert_eq!(parent_identifier(""), "");
        assert_eq!(parent_identifier("subscriptions/s/resourceGroups/rg"), "");
        assert_eq!(parent_identifier("/subscriptions/s\n/resourceGroups/rg"), "");
    }

    #[test]
    fn test_parent_decodes_escaped_segments() {
        let id = "/subscriptions/s/resourceGroups/my%20rg/providers/Microsoft.Foo/bars/b1/subbars/sb1";
        assert_eq!(
            parent_identifier(id),
            "/subscriptions/s/resourceGroups/my rg/providers/Microsoft.Foo/bars/b1"
        );
    }

    #[test]
    fn test_parent_keeps_path_as_written() {
        assert_eq!(
            parent_identifier("/subscriptions/s/resourceGroups/r\\g/providers/Microsoft.Foo/bars/b1"),
            "/subscriptions/s/resourceGroups/r\\g"
        );
        assert_eq!(
            parent_identifier("/subscriptions/s/resourceGroups/../providers/Microsoft.Foo/bars/b1"),
            "/subscriptions/s/resourceGroups/.."
        );
        let id = "https://management.azure.com/subscriptions/s/resourceGroups/../bars/b1";
        assert_eq!(parent_identifier(id), "/subscriptions/s/resourceGroups/..");
    }

    #[test]
    fn test_parent_of_opaque_uri() {
        assert_eq!(parent_identifier("urn:a/b/c/d/e/f"), "");
        assert_eq!(parent_identifier("https:subscriptions/s/resourceGroups/rg"), "");
        assert!(ResourceId::parse("urn:a/b/c/d").is_none());
    }

    #[test]
    fn test_parent_rejects_invalid_escapes() {
        assert_eq!(
            parent_identifier("/subscriptions/s/resourceGroups/r%zz/providers/Microsoft.Foo/bars/b1"),
            ""
        );
        assert_eq!(parent_identifier("/subscriptions/s/resourceGroups/rg/bars/b%2"), "");
        assert!(ResourceId::parse("/subscriptions/s/resourceGroups/r%zz").is_none());
    }

    #[test]
    fn test_resource_id_parse() {
        let id = ResourceId::parse(BAR_ID).unwrap();

        assert_eq!(id.segments().len(), 4);
        assert_eq!(id.segments()[2], ("providers".to_string(), "Microsoft.Foo".to_string()));
        assert_eq!(id.name(), "b1");
        assert_eq!(id.resource_type().as_deref(), Some("Microsoft.Foo/bars"));
        assert_eq!(id.parent_id(), "/subscriptions/s/resourceGroups/rg");
        assert_eq!(id.to_string(), BAR_ID);
    }

    #[test]
    fn test_resource_type_of_child_and_builtin_resources() {
        let child = ResourceId::parse(&format!("{}/subbars/sb1", BAR_ID)).unwrap();
        assert_eq!(child.resource_type().as_deref(), Some("Microsoft.Foo/bars/subbars"));

        let group = ResourceId::parse("/subscriptions/s/resourceGroups/rg").unwrap();
        assert_eq!(
            group.resource_type().as_deref(),
            Some("Microsoft.Resources/resourceGroups")
        );

        let odd = ResourceId::parse("/subscriptions/s/foo/bar").unwrap();
        assert_eq!(odd.resource_type(), None);
    }

    #[test]
    fn test_resource_id_rejects_incomplete_pairs() {
        assert!(ResourceId::parse("/subscriptions/s/resourceGroups").is_none());
        assert!(ResourceId::parse("relative/path").is_none());
        assert!(ResourceId::parse("/subscriptions//resourceGroups/rg").is_none());
    }
}
