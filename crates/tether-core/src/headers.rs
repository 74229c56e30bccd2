//! Header maps and merge helpers.

use std::collections::HashMap;

/// Header name to value.
pub type Headers = HashMap<String, String>;

/// Name of the authorization header.
pub const AUTHORIZATION: &str = "Authorization";

/// Merges `layers` in order; later layers win on identical names.
pub fn merge<'a>(layers: impl IntoIterator<Item = &'a Headers>) -> Headers {
    let mut merged = Headers::new();
    for layer in layers {
        merged.extend(layer.iter().map(|(k, v)| (k.clone(), v.clone())));
    }
    merged
}

/// Removes every header named `name`, compared ASCII case-insensitively.
pub fn remove_ignore_case(headers: &mut Headers, name: &str) {
    headers.retain(|k, _| !k.eq_ignore_ascii_case(name));
}

/// Looks up a header ASCII case-insensitively.
pub fn get_ignore_case<'a>(headers: &'a Headers, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}
