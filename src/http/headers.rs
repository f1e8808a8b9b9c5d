//! Header names and helpers shared by the pre-handler and the transport.

use std::collections::BTreeMap;

/// Header name → value, ordered for stable logging and comparison.
pub type Headers = BTreeMap<String, String>;

pub const CONTENT_TYPE: &str = "Content-Type";
pub const ACCEPT: &str = "Accept";
pub const AUTHORIZATION: &str = "Authorization";
pub const USER_AGENT: &str = "User-Agent";
pub const X_REQUEST_ID: &str = "X-Request-Id";
pub const X_FORWARDED_FOR: &str = "X-Forwarded-For";

pub const APPLICATION_JSON: &str = "application/json";

/// Set `name`, replacing any existing header that differs only in case.
pub fn insert_header(headers: &mut Headers, name: &str, value: &str) {
    headers.retain(|existing, _| !existing.eq_ignore_ascii_case(name));
    headers.insert(name.to_string(), value.to_string());
}

/// Remove `name` (case-insensitive) and return its value.
pub fn take_header(headers: &mut Headers, name: &str) -> Option<String> {
    let key = headers
        .keys()
        .find(|existing| existing.eq_ignore_ascii_case(name))?
        .clone();
    headers.remove(&key)
}

pub fn contains_header(headers: &Headers, name: &str) -> bool {
    headers.keys().any(|existing| existing.eq_ignore_ascii_case(name))
}
