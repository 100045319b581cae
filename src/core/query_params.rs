use std::collections::HashMap;

/// Parse the query string of a URI into decoded key-value pairs.
///
/// A repeated key keeps its last value; a bare flag maps to an empty string.
pub fn parse_query_params(uri: &str) -> HashMap<String, String> {
    let mut params = HashMap::new();

    let Some((_, query)) = uri.split_once('?') else {
        return params;
    };

    for param in query.split('&').filter(|p| !p.is_empty()) {
        match param.split_once('=') {
            Some((key, encoded_value)) => {
                params.insert(key.to_string(), decode(encoded_value));
            }
            None => {
                params.insert(param.to_string(), String::new());
            }
        }
    }

    params
}

/// Percent-decode one path segment or query value, keeping it as-is if malformed.
pub fn decode(value: &str) -> String {
    let value = value.replace('+', " ");
    let decoded = urlencoding::decode(&value).map(|d| d.into_owned());
    decoded.unwrap_or(value)
}

pub fn get_string(params: &HashMap<String, String>, key: &str) -> Option<String> {
    params.get(key).filter(|v| !v.is_empty()).cloned()
}
