//! Pattern-matching extraction of tokens the portal embeds in HTML bodies
//! and response headers.
//!
//! Every extractor is partial: it returns `None` instead of erroring, and the
//! caller decides whether a missing value is fatal. The patterns are a fixed
//! contract with the portal's current markup; when the portal changes, these
//! break by design.

use std::sync::LazyLock;

use regex::Regex;

static RWF_HASH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"'rwfHash'\s*:\s*'([a-f0-9]+)'").unwrap());

static SESSION_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"JSESSIONID=([A-Z0-9]+)").unwrap());

static FLOW_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_flowExecutionKey=([a-zA-Z0-9_-]+)").unwrap());

static FLOW_KEY_FIELD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)_flowExecutionKey" value="([a-zA-Z0-9_-]+)""#).unwrap());

fn capture(re: &Regex, input: &str) -> Option<String> {
    re.captures(input).map(|c| c[1].to_string())
}

/// Anti-forgery token embedded in an inline script on the login page.
pub fn hidden_token(html: &str) -> Option<String> {
    capture(&RWF_HASH, html)
}

/// Session identifier from a `Set-Cookie` header value.
pub fn session_id(set_cookie: &str) -> Option<String> {
    capture(&SESSION_ID, set_cookie)
}

/// Flow execution key from a redirect `Location` header.
pub fn flow_key_from_location(location: &str) -> Option<String> {
    capture(&FLOW_KEY, location)
}

/// Flow execution key from a hidden form field in inline HTML.
pub fn flow_key_from_html(html: &str) -> Option<String> {
    capture(&FLOW_KEY_FIELD, html)
}

/// `value` attribute of the element with the given id.
pub fn attribute_value(html: &str, element_id: &str) -> Option<String> {
    let pattern = format!(r#"(?i)id="{}"[^>]*value="([^"]+)""#, regex::escape(element_id));
    // Per-call compile; element ids are not a fixed set.
    let re = Regex::new(&pattern).ok()?;
    capture(&re, html)
}
