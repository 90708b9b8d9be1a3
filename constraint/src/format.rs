//! URL and URI format constraints.
//!
//! Both pass absent values. Only malformed syntax fails.

use crate::constraint::PropertyConstraint;
use kith_core::Value;
use url::Url;

/// Schemes accepted as URLs.
const URL_SCHEMES: &[&str] = &["http", "https", "ftp", "file", "jar", "mailto"];

/// The value must be an absolute URL with a supported scheme.
#[derive(Debug, Clone)]
pub struct UrlConstraint {
    message: String,
}

impl UrlConstraint {
    pub fn new() -> Self {
        Self {
            message: "is not a valid URL".to_string(),
        }
    }

    pub fn with_message(mut self, message: Option<&str>) -> Self {
        if let Some(message) = message {
            self.message = message.to_string();
        }
        self
    }
}

impl Default for UrlConstraint {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn is_valid_url(value: &str) -> bool {
    match Url::parse(value) {
        Ok(url) => URL_SCHEMES.contains(&url.scheme()),
        Err(_) => false,
    }
}

impl PropertyConstraint for UrlConstraint {
    fn kind(&self) -> &'static str {
        "url"
    }

    fn is_valid(&self, value: &Value) -> bool {
        match value {
            Value::String(s) => is_valid_url(s),
            _ => true,
        }
    }

    fn exception_message(&self, property: &str, value: &Value) -> String {
        format!("{} should be valid URL but was {}", property, value)
    }

    fn display_message(&self, _property: &str, _value: &Value) -> String {
        self.message.clone()
    }
}

/// The value must be a URI reference (RFC 3986). Relative references pass.
#[derive(Debug, Clone)]
pub struct UriConstraint {
    message: String,
}

impl UriConstraint {
    pub fn new() -> Self {
        Self {
            message: "is not a valid URI".to_string(),
        }
    }

    pub fn with_message(mut self, message: Option<&str>) -> Self {
        if let Some(message) = message {
            self.message = message.to_string();
        }
        self
    }
}

impl Default for UriConstraint {
    fn default() -> Self {
        Self::new()
    }
}

/// `ALPHA *( ALPHA / DIGIT / "+" / "-" / "." )`
fn is_scheme(scheme: &str) -> bool {
    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

fn is_uri_char(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || "-._~:/?#[]@!$&'()*+,;=".contains(c)
        || (!c.is_ascii() && !c.is_control() && !c.is_whitespace())
}

pub(crate) fn is_valid_uri(value: &str) -> bool {
    // Percent escapes must be complete.
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c == '%' {
            let hex_ok = matches!(
                (chars.next(), chars.next()),
                (Some(a), Some(b)) if a.is_ascii_hexdigit() && b.is_ascii_hexdigit()
            );
            if !hex_ok {
                return false;
            }
        } else if !is_uri_char(c) {
            return false;
        }
    }

    // A single fragment at most.
    let (before_fragment, fragment) = match value.split_once('#') {
        Some((head, tail)) => (head, Some(tail)),
        None => (value, None),
    };
    if fragment.is_some_and(|f| f.contains('#')) {
        return false;
    }

    // A colon before any '/', '?' starts a scheme, which must be well formed
    // and followed by something.
    let first_delim = before_fragment.find(['/', '?']).unwrap_or(before_fragment.len());
    if let Some(colon) = before_fragment[..first_delim].find(':') {
        let (scheme, rest) = (&before_fragment[..colon], &before_fragment[colon + 1..]);
        if !is_scheme(scheme) || (rest.is_empty() && fragment.is_none()) {
            return false;
        }
        return rest_is_valid(rest);
    }

    rest_is_valid(before_fragment)
}

/// Brackets may only appear around an IP literal host.
fn rest_is_valid(rest: &str) -> bool {
    let Some(after_slashes) = rest.strip_prefix("//") else {
        return !rest.contains(['[', ']']);
    };
    let authority_end = after_slashes.find(['/', '?']).unwrap_or(after_slashes.len());
    let (authority, path) = after_slashes.split_at(authority_end);
    if path.contains(['[', ']']) {
        return false;
    }
    let host_port = authority.rsplit_once('@').map(|(_, h)| h).unwrap_or(authority);
    if let Some(literal) = host_port.strip_prefix('[') {
        return match literal.split_once(']') {
            Some((ip, port)) => {
                !ip.is_empty()
                    && !ip.contains('[')
                    && (port.is_empty()
                        || port
                            .strip_prefix(':')
                            .is_some_and(|p| p.chars().all(|c| c.is_ascii_digit())))
            }
            None => false,
        };
    }
    !host_port.contains(['[', ']'])
}

impl PropertyConstraint for UriConstraint {
    fn kind(&self) -> &'static str {
        "uri"
    }

    fn is_valid(&self, value: &Value) -> bool {
        match value {
            Value::String(s) => is_valid_uri(s),
            _ => true,
        }
    }

    fn exception_message(&self, property: &str, value: &Value) -> String {
        format!("{} should be valid URI but was {}", property, value)
    }

    fn display_message(&self, _property: &str, _value: &Value) -> String {
        self.message.clone()
    }
}
