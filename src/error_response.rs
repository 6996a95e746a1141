//! Client-facing error contract.
//!
//! Every error a client sees has the same envelope:
//!
//! ```json
//! { "error": { "code": 1007, "message": "Not properly authenticated for this route" } }
//! ```
//!
//! `code` is omitted when the definition has no application code. The HTTP
//! status travels separately on the response.
//!
//! Definitions live in an [`ErrorResponseDictionary`] keyed by a symbolic name.
//! Messages are templates: `{name}` placeholders are replaced from the
//! caller's replacement pairs at emission time, and placeholders with no
//! replacement are left as written.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Halt};
use crate::response::Response;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("placeholder pattern is valid")
});

/// Keys of the definitions shipped in [`ErrorResponseDictionary::default`].
pub mod keys {
    pub const SYSTEM_ERROR: &str = "SYSTEM_ERROR";
    pub const NOT_AUTHORIZED: &str = "NOT_AUTHORIZED";
    pub const NO_ACCESS: &str = "NO_ACCESS";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const INVALID_JSON: &str = "INVALID_JSON";
    pub const ENTRY_EXISTS: &str = "ENTRY_EXISTS";
    pub const METHOD_NOT_ALLOWED: &str = "METHOD_NOT_ALLOWED";
    pub const INVALID_REQUEST: &str = "INVALID_REQUEST";
}

/// Application code of the fixed uncaught-failure response.
pub const SYSTEM_ERROR_CODE: i64 = 1020;
/// Message of the fixed uncaught-failure response.
pub const SYSTEM_ERROR_MESSAGE: &str = "A system error occurred";

// ── Definitions ───────────────────────────────────────────────────────────────

/// The serialized shape of an error definition, as written in config files
/// or supplied inline by a caller.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct ErrorDefinition {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<i64>,
    #[serde(alias = "http_status")]
    pub httpcode: u16,
}

impl ErrorDefinition {
    pub fn new(message: impl Into<String>, code: Option<i64>, httpcode: u16) -> Self {
        Self { message: message.into(), code, httpcode }
    }
}

/// A named, templated, status-bearing error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ErrorResponse {
    key: String,
    code: Option<i64>,
    message: String,
    http_status: u16,
}

impl ErrorResponse {
    /// Builds a response from a definition, rejecting an empty message or a
    /// status outside `100..=599`.
    pub fn from_definition(key: impl Into<String>, def: ErrorDefinition) -> Result<Self, Error> {
        let key = key.into();
        if def.message.trim().is_empty() {
            return Err(Error::ErrorDefinition { key, reason: "empty message".to_owned() });
        }
        if !(100..=599).contains(&def.httpcode) {
            return Err(Error::ErrorDefinition {
                key,
                reason: format!("http status {} out of range", def.httpcode),
            });
        }
        Ok(Self { key, code: def.code, message: def.message, http_status: def.httpcode })
    }

    /// Builds a response from an untyped JSON definition.
    pub fn from_value(key: impl Into<String>, value: serde_json::Value) -> Result<Self, Error> {
        let key = key.into();
        let def: ErrorDefinition = serde_json::from_value(value).map_err(|e| {
            Error::ErrorDefinition { key: key.clone(), reason: e.to_string() }
        })?;
        Self::from_definition(key, def)
    }

    pub fn key(&self) -> &str { &self.key }
    pub fn message_template(&self) -> &str { &self.message }
    pub fn http_status(&self) -> u16 { self.http_status }

    /// The application code, or `None` when unset or zero.
    pub fn code(&self) -> Option<i64> {
        self.code.filter(|&c| c != 0)
    }

    /// Substitutes `{name}` placeholders. Unknown placeholders stay verbatim.
    pub fn formatted_message(&self, replacements: &[(&str, &str)]) -> String {
        PLACEHOLDER
            .replace_all(&self.message, |caps: &Captures<'_>| {
                replacements
                    .iter()
                    .find(|(name, _)| *name == &caps[1])
                    .map_or_else(|| caps[0].to_owned(), |(_, value)| (*value).to_owned())
            })
            .into_owned()
    }

    /// The JSON envelope for this error.
    pub fn payload(&self, replacements: &[(&str, &str)]) -> ErrorPayload {
        ErrorPayload {
            error: ErrorBody { code: self.code(), message: self.formatted_message(replacements) },
        }
    }

    /// The envelope as a response carrying the configured status.
    pub fn to_response(&self, replacements: &[(&str, &str)]) -> Response {
        let body = serde_json::to_vec(&self.payload(replacements))
            .unwrap_or_else(|_| br#"{"error":{"message":"A system error occurred"}}"#.to_vec());
        Response::json(body).with_status_code(self.http_status)
    }
}

/// `{ "error": { "code"?, "message" } }`
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorPayload {
    pub error: ErrorBody,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<i64>,
    pub message: String,
}

// ── Error selection ───────────────────────────────────────────────────────────

/// What to emit: a dictionary key, or a key plus an inline definition to use
/// when the dictionary does not know the key.
#[derive(Clone, Debug)]
pub enum ErrorSpec {
    Key(String),
    Inline { key: String, definition: ErrorDefinition },
}

impl ErrorSpec {
    pub fn inline(key: impl Into<String>, definition: ErrorDefinition) -> Self {
        Self::Inline { key: key.into(), definition }
    }

    /// Reads a one-entry mapping `{ "KEY": { "message": .., "httpcode": .. } }`.
    pub fn from_value(value: serde_json::Value) -> Result<Self, Error> {
        let serde_json::Value::Object(map) = value else {
            return Err(Error::ErrorDefinition {
                key: String::new(),
                reason: "inline definition must be an object".to_owned(),
            });
        };
        let mut entries = map.into_iter();
        let (Some((key, def)), None) = (entries.next(), entries.next()) else {
            return Err(Error::ErrorDefinition {
                key: String::new(),
                reason: "inline definition must have exactly one key".to_owned(),
            });
        };
        let definition = serde_json::from_value(def).map_err(|e| {
            Error::ErrorDefinition { key: key.clone(), reason: e.to_string() }
        })?;
        Ok(Self::Inline { key, definition })
    }

    pub fn key(&self) -> &str {
        match self {
            Self::Key(key) | Self::Inline { key, .. } => key,
        }
    }
}

impl From<&str> for ErrorSpec {
    fn from(key: &str) -> Self { Self::Key(key.to_owned()) }
}

impl From<String> for ErrorSpec {
    fn from(key: String) -> Self { Self::Key(key) }
}

// ── Dictionary ────────────────────────────────────────────────────────────────

/// Mapping from error key to [`ErrorResponse`].
///
/// Read-only once the app is built; shared behind an `Arc`.
#[derive(Clone, Debug)]
pub struct ErrorResponseDictionary {
    entries: HashMap<String, ErrorResponse>,
}

impl ErrorResponseDictionary {
    /// An empty dictionary. Most apps want [`Default`] instead.
    pub fn empty() -> Self {
        Self { entries: HashMap::new() }
    }

    pub fn get_error_response(&self, key: &str) -> Option<&ErrorResponse> {
        self.entries.get(key)
    }

    /// Adds or replaces a definition.
    pub fn insert(&mut self, response: ErrorResponse) {
        self.entries.insert(response.key.clone(), response);
    }

    pub fn define(&mut self, key: impl Into<String>, def: ErrorDefinition) -> Result<(), Error> {
        self.insert(ErrorResponse::from_definition(key, def)?);
        Ok(())
    }

    /// Merges a `KEY -> definition` table, validating every entry first.
    pub fn extend_from_definitions(
        &mut self,
        defs: impl IntoIterator<Item = (String, ErrorDefinition)>,
    ) -> Result<(), Error> {
        let parsed = defs
            .into_iter()
            .map(|(key, def)| ErrorResponse::from_definition(key, def))
            .collect::<Result<Vec<_>, _>>()?;
        for response in parsed {
            self.insert(response);
        }
        Ok(())
    }

    /// Merges a JSON object of definitions.
    pub fn extend_from_json(&mut self, json: &str) -> Result<(), Error> {
        let defs: HashMap<String, ErrorDefinition> = serde_json::from_str(json)?;
        self.extend_from_definitions(defs)
    }

    pub fn len(&self) -> usize { self.entries.len() }
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    /// Resolves `spec`: dictionary first, then the inline definition.
    ///
    /// A bare key the dictionary does not know falls back to the system error
    /// so the client still gets a well-formed envelope.
    pub fn resolve(&self, spec: &ErrorSpec) -> ErrorResponse {
        if let Some(found) = self.entries.get(spec.key()) {
            return found.clone();
        }
        match spec {
            ErrorSpec::Inline { key, definition } => {
                ErrorResponse::from_definition(key.clone(), definition.clone())
                    .unwrap_or_else(|e| {
                        warn!(key = %key, "rejected inline error definition: {e}");
                        system_error()
                    })
            }
            ErrorSpec::Key(key) => {
                warn!(key = %key, "unknown error key");
                system_error()
            }
        }
    }

    /// Emits the error: builds the envelope, sets the status and returns the
    /// stop signal that ends the request.
    ///
    /// ```rust
    /// use docket::{ErrorResponseDictionary, ErrorDefinition};
    ///
    /// let mut errors = ErrorResponseDictionary::default();
    /// errors.define("GREETING", ErrorDefinition::new("Hello {name}", None, 418)).unwrap();
    ///
    /// let halt = errors.return_error("GREETING", &[("name", "X")]);
    /// assert_eq!(halt.response().status_code(), 418);
    /// assert_eq!(halt.response().body(), br#"{"error":{"message":"Hello X"}}"#);
    /// ```
    pub fn return_error(&self, spec: impl Into<ErrorSpec>, replacements: &[(&str, &str)]) -> Halt {
        let spec = spec.into();
        let response = self.resolve(&spec);
        debug!(key = %response.key(), status = response.http_status(), "returning error");
        Halt::new(response.key().to_owned(), response.to_response(replacements))
    }
}

impl Default for ErrorResponseDictionary {
    /// The baseline set every app starts with.
    fn default() -> Self {
        let mut dict = Self::empty();
        for (key, message, code, status) in [
            (keys::SYSTEM_ERROR,       SYSTEM_ERROR_MESSAGE,                        SYSTEM_ERROR_CODE, 500),
            (keys::NOT_AUTHORIZED,     "Not properly authenticated for this route", 1007,              401),
            (keys::NO_ACCESS,          "No Access",                                 1008,              403),
            (keys::NOT_FOUND,          "No resource found at {path}",               1004,              404),
            (keys::INVALID_JSON,       "Could not load model from json: {message}", 1001,              400),
            (keys::ENTRY_EXISTS,       "An entry with the id {id} already exists.", 1009,              409),
            (keys::METHOD_NOT_ALLOWED, "Method {method} is not allowed",            1005,              405),
            (keys::INVALID_REQUEST,    "Could not read request: {message}",         1002,              400),
        ] {
            dict.insert(ErrorResponse {
                key: key.to_owned(),
                code: Some(code),
                message: message.to_owned(),
                http_status: status,
            });
        }
        dict
    }
}

/// The fixed response for uncaught failures. Not overridable, so no
/// application detail can leak through it.
pub fn system_error() -> ErrorResponse {
    ErrorResponse {
        key: keys::SYSTEM_ERROR.to_owned(),
        code: Some(SYSTEM_ERROR_CODE),
        message: SYSTEM_ERROR_MESSAGE.to_owned(),
        http_status: 500,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn greeting() -> ErrorResponseDictionary {
        let mut dict = ErrorResponseDictionary::default();
        dict.define("KNOWN_KEY", ErrorDefinition::new("Hello {name}", None, 422)).unwrap();
        dict
    }

    #[test]
    fn replaces_known_placeholders() {
        let halt = greeting().return_error("KNOWN_KEY", &[("name", "X")]);
        assert_eq!(halt.response().body(), br#"{"error":{"message":"Hello X"}}"#);
        assert_eq!(halt.response().status_code(), 422);
        assert_eq!(halt.key(), "KNOWN_KEY");
    }

    #[test]
    fn missing_replacement_leaves_placeholder() {
        let halt = greeting().return_error("KNOWN_KEY", &[]);
        assert_eq!(halt.response().body(), br#"{"error":{"message":"Hello {name}"}}"#);
    }

    #[test]
    fn code_present_only_when_set() {
        let dict = ErrorResponseDictionary::default();
        let halt = dict.return_error(keys::NOT_AUTHORIZED, &[]);
        assert_eq!(
            halt.response().body(),
            br#"{"error":{"code":1007,"message":"Not properly authenticated for this route"}}"#
        );

        let zero = ErrorResponse::from_definition("Z", ErrorDefinition::new("z", Some(0), 400)).unwrap();
        assert_eq!(zero.code(), None);
    }

    #[test]
    fn dictionary_wins_over_inline_definition() {
        let spec = ErrorSpec::inline("KNOWN_KEY", ErrorDefinition::new("ignored", Some(1), 400));
        let halt = greeting().return_error(spec, &[("name", "Y")]);
        assert_eq!(halt.response().status_code(), 422);
        assert_eq!(halt.response().body(), br#"{"error":{"message":"Hello Y"}}"#);
    }

    #[test]
    fn inline_definition_used_when_key_unknown() {
        let spec = ErrorSpec::from_value(serde_json::json!({
            "ERRORDEF_NO_ACCESS": { "message": "No Access", "code": 1007, "httpcode": 402 }
        }))
        .unwrap();
        let halt = ErrorResponseDictionary::empty().return_error(spec, &[]);
        assert_eq!(halt.response().status_code(), 402);
        assert_eq!(halt.response().body(), br#"{"error":{"code":1007,"message":"No Access"}}"#);
    }

    #[test]
    fn inline_definitions_are_validated() {
        assert!(ErrorSpec::from_value(serde_json::json!({"A": {"message": "a"}})).is_err());
        assert!(ErrorSpec::from_value(serde_json::json!({"A": {}, "B": {}})).is_err());
        assert!(ErrorResponse::from_definition("A", ErrorDefinition::new("a", None, 42)).is_err());
        assert!(ErrorResponse::from_definition("A", ErrorDefinition::new(" ", None, 400)).is_err());
    }

    #[test]
    fn protocol_errors_ship_by_default() {
        let dict = ErrorResponseDictionary::default();
        let halt = dict.return_error(keys::METHOD_NOT_ALLOWED, &[("method", "BREW")]);
        assert_eq!(halt.response().status_code(), 405);
        assert_eq!(
            halt.response().body(),
            br#"{"error":{"code":1005,"message":"Method BREW is not allowed"}}"#
        );
        assert_eq!(dict.get_error_response(keys::INVALID_REQUEST).unwrap().http_status(), 400);
    }

    #[test]
    fn unknown_key_falls_back_to_system_error() {
        let halt = ErrorResponseDictionary::empty().return_error("NOPE", &[]);
        assert_eq!(halt.response().status_code(), 500);
        assert_eq!(
            halt.response().body(),
            br#"{"error":{"code":1020,"message":"A system error occurred"}}"#
        );
    }

    #[test]
    fn extends_from_json_and_overrides() {
        let mut dict = ErrorResponseDictionary::default();
        dict.extend_from_json(r#"{
            "NOT_FOUND": {"message": "Gone fishing", "httpcode": 404},
            "QUOTA":     {"message": "Quota {used}/{max}", "code": 2001, "http_status": 429}
        }"#).unwrap();
        assert_eq!(dict.get_error_response("NOT_FOUND").unwrap().code(), None);
        let quota = dict.get_error_response("QUOTA").unwrap();
        assert_eq!(quota.formatted_message(&[("used", "5"), ("max", "5")]), "Quota 5/5");
        assert_eq!(quota.http_status(), 429);
    }
}
