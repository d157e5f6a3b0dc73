//! URL, query string and form body construction

use serde_json::{Map as JsonMap, Value as JsonValue};

/// Percent-encode one query component
///
/// Unreserved characters and `/` are left as-is; everything else is
/// encoded from its UTF-8 bytes.
pub fn encode_component(text: &str) -> String {
    urlencoding::encode(text).replace("%2F", "/")
}

/// Text form of a wire value for the query string, form body or headers
///
/// `null` becomes empty text, booleans become `true`/`false` and numbers keep
/// their exact text. Arrays and objects are sent as JSON text.
pub fn value_text(value: &JsonValue) -> String {
    match value {
        JsonValue::Null => String::new(),
        JsonValue::Bool(b) => b.to_string(),
        JsonValue::Number(n) => n.to_string(),
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Render a query string in declaration order
///
/// ```
/// use kraken_rest::query::build_query;
/// use serde_json::json;
///
/// let query = json!({ "a": true, "b": null, "c": 3 });
/// assert_eq!(build_query(query.as_object().unwrap()), "a=true&b=&c=3");
/// ```
pub fn build_query(query: &JsonMap<String, JsonValue>) -> String {
    query
        .iter()
        .map(|(key, value)| {
            format!(
                "{}={}",
                encode_component(key),
                encode_component(&value_text(value))
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Join base URL, path and query
pub fn build_url(base_url: &str, path: &str, query: &JsonMap<String, JsonValue>) -> String {
    let mut url = format!("{}{}", base_url.trim_end_matches('/'), path);
    if !query.is_empty() {
        url.push('?');
        url.push_str(&build_query(query));
    }
    url
}

/// Substitute `{name}` placeholders in a path with path-located values
///
/// Values without a placeholder are not sent.
pub fn expand_path(path: &str, params: &JsonMap<String, JsonValue>) -> String {
    params.iter().fold(path.to_string(), |acc, (name, value)| {
        acc.replace(
            &format!("{{{}}}", name),
            &urlencoding::encode(&value_text(value)),
        )
    })
}

/// Flatten a wire map into ordered string pairs
pub fn to_pairs(map: &JsonMap<String, JsonValue>) -> Vec<(String, String)> {
    map.iter()
        .map(|(key, value)| (key.clone(), value_text(value)))
        .collect()
}
