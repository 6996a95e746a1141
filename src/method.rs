//! HTTP method as a typed enum.
//!
//! Covers the RFC 9110 methods plus `PATCH` (RFC 5789). Besides the wire
//! representation, a method knows how to be recovered from a controller
//! handler name: `get_resource` is a `GET`, `delete` is a `DELETE`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A known HTTP method.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Connect,
    Delete,
    Get,
    Head,
    Options,
    Patch,
    Post,
    Put,
    Trace,
}

/// Handler-name prefixes that make a controller method routable, in match order.
const ROUTABLE_PREFIXES: [(&str, Method); 7] = [
    ("delete",  Method::Delete),
    ("get",     Method::Get),
    ("head",    Method::Head),
    ("options", Method::Options),
    ("patch",   Method::Patch),
    ("post",    Method::Post),
    ("put",     Method::Put),
];

impl Method {
    /// Returns the uppercase wire representation (e.g. `"GET"`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Connect => "CONNECT",
            Self::Delete  => "DELETE",
            Self::Get     => "GET",
            Self::Head    => "HEAD",
            Self::Options => "OPTIONS",
            Self::Patch   => "PATCH",
            Self::Post    => "POST",
            Self::Put     => "PUT",
            Self::Trace   => "TRACE",
        }
    }

    /// Splits a handler name into its verb and the remaining path suffix.
    ///
    /// The prefix must be followed by the end of the name or an underscore,
    /// so `get_items` yields `(Get, "items")` and `get` yields `(Get, "")`,
    /// while `getter` or `helper` yield `None`.
    pub fn from_handler_name(name: &str) -> Option<(Self, &str)> {
        ROUTABLE_PREFIXES.iter().find_map(|&(prefix, method)| {
            let rest = name.strip_prefix(prefix)?;
            if rest.is_empty() {
                Some((method, rest))
            } else {
                rest.strip_prefix('_').map(|suffix| (method, suffix))
            }
        })
    }

    /// `true` for verbs that change server state.
    pub fn is_mutating(self) -> bool {
        matches!(self, Self::Delete | Self::Patch | Self::Post | Self::Put)
    }
}

/// Parses an uppercase method string (e.g. `"GET"`). Case-sensitive per RFC 9110 §9.1.
impl FromStr for Method {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CONNECT" => Ok(Self::Connect),
            "DELETE"  => Ok(Self::Delete),
            "GET"     => Ok(Self::Get),
            "HEAD"    => Ok(Self::Head),
            "OPTIONS" => Ok(Self::Options),
            "PATCH"   => Ok(Self::Patch),
            "POST"    => Ok(Self::Post),
            "PUT"     => Ok(Self::Put),
            "TRACE"   => Ok(Self::Trace),
            _         => Err(()),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verb_prefix_requires_word_boundary() {
        assert_eq!(Method::from_handler_name("get"), Some((Method::Get, "")));
        assert_eq!(Method::from_handler_name("get_items"), Some((Method::Get, "items")));
        assert_eq!(Method::from_handler_name("post_bulk_import"), Some((Method::Post, "bulk_import")));
        assert_eq!(Method::from_handler_name("getter"), None);
        assert_eq!(Method::from_handler_name("helper"), None);
        assert_eq!(Method::from_handler_name("_get"), None);
    }

    #[test]
    fn mutating_verbs() {
        assert!(Method::Post.is_mutating());
        assert!(Method::Put.is_mutating());
        assert!(Method::Delete.is_mutating());
        assert!(!Method::Get.is_mutating());
        assert!(!Method::Head.is_mutating());
    }

    #[test]
    fn parses_wire_form_case_sensitively() {
        assert_eq!("PUT".parse::<Method>(), Ok(Method::Put));
        assert!("put".parse::<Method>().is_err());
        assert_eq!(serde_json::to_string(&Method::Get).unwrap(), r#""GET""#);
    }
}
