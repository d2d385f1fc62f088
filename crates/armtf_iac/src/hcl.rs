//! Rendering JSON values as HCL expressions.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

const INDENT: &str = "  ";

fn identifier_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_-]*$").ok())
        .as_ref()
}

/// Render `value` as an HCL expression, nested at `depth` indentation levels.
pub fn render(value: &Value, depth: usize) -> String {
    match value {
        Value::Object(members) if members.is_empty() => "{}".to_string(),
        Value::Object(members) => {
            let inner = INDENT.repeat(depth + 1);
            let mut out = String::from("{\n");
            for (key, member) in members {
                out.push_str(&format!(
                    "{}{} = {}\n",
                    inner,
                    render_key(key),
                    render(member, depth + 1)
                ));
            }
            out.push_str(&INDENT.repeat(depth));
            out.push('}');
            out
        }
        Value::Array(elements) if elements.is_empty() => "[]".to_string(),
        Value::Array(elements) if elements.iter().all(is_scalar) => {
            let items: Vec<String> = elements.iter().map(|e| render(e, depth)).collect();
            format!("[{}]", items.join(", "))
        }
        Value::Array(elements) => {
            let inner = INDENT.repeat(depth + 1);
            let mut out = String::from("[\n");
            for element in elements {
                out.push_str(&format!("{}{},\n", inner, render(element, depth + 1)));
            }
            out.push_str(&INDENT.repeat(depth));
            out.push(']');
            out
        }
        Value::String(s) => quote(s),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
    }
}

/// Object keys stay bare when they are valid identifiers.
pub fn render_key(key: &str) -> String {
    match identifier_pattern() {
        Some(pattern) if pattern.is_match(key) => key.to_string(),
        _ => quote(key),
    }
}

/// Quote a string literal, escaping template sequences.
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '$' | '%' if chars.peek() == Some(&'{') => {
                out.push(c);
                out.push(c);
            }
            other => out.push(other),
        }
    }
    out.push('"');
    out
}

/// Escape template sequences in heredoc content.
pub fn escape_template(s: &str) -> String {
    s.replace("${", "$${").replace("%{", "%%{")
}

fn is_scalar(value: &Value) -> bool {
    !matches!(value, Value::Object(_) | Value::Array(_))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_scalars() {
        assert_eq!(render(&json!("westus"), 0), "\"westus\"");
        assert_eq!(render(&json!(3), 0), "3");
        assert_eq!(render(&json!(1.5), 0), "1.5");
        assert_eq!(render(&json!(false), 0), "false");
        assert_eq!(render(&Value::Null, 0), "null");
    }

    #[test]
    fn test_render_object() {
        let value = json!({"location": "westus", "properties": {"count": 2}});
        let expected = "{\n  location = \"westus\"\n  properties = {\n    count = 2\n  }\n}";

        assert_eq!(render(&value, 0), expected);
    }

    #[test]
    fn test_render_arrays() {
        assert_eq!(render(&json!(["1", "2"]), 0), "[\"1\", \"2\"]");
        assert_eq!(render(&json!([]), 0), "[]");
        assert_eq!(render(&json!([{"a": 1}]), 0), "[\n  {\n    a = 1\n  },\n]");
    }

    #[test]
    fn test_keys_are_quoted_when_needed() {
        assert_eq!(render_key("addressPrefix"), "addressPrefix");
        assert_eq!(render_key("odata.type"), "\"odata.type\"");
        assert_eq!(render_key("1st"), "\"1st\"");
        assert_eq!(render_key(""), "\"\"");
    }

    #[test]
    fn test_quote_escapes() {
        assert_eq!(quote("a\"b\\c\nd"), "\"a\\\"b\\\\c\\nd\"");
        assert_eq!(quote("${var.x} %{if}"), "\"$${var.x} %%{if}\"");
        assert_eq!(quote("cost $5"), "\"cost $5\"");
    }

    #[test]
    fn test_escape_template() {
        assert_eq!(escape_template("echo ${HOME} %{if x}"), "echo $${HOME} %%{if x}");
        assert_eq!(escape_template("cost $5 and 50%"), "cost $5 and 50%");
    }
}
