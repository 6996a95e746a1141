//! Error types.
//!
//! Three distinct things live here:
//!
//! - [`Error`]: infrastructure failures (binding a port, parsing config,
//!   registering a conflicting route, a cache backend refusing a write).
//! - [`Halt`]: the stop signal. Emitting an error response produces one; it
//!   unwinds to the request boundary and nothing in between may absorb it.
//! - [`Fault`]: what a handler returns on failure, either a `Halt` or an
//!   uncaught system error.
//!
//! `Halt` intentionally does not implement [`std::error::Error`]. That keeps it
//! out of `anyhow::Error`, `Box<dyn Error>` and the blanket `From` impl on
//! [`Fault`], so a `?` can only ever carry it as [`Fault::Halt`].

use std::fmt;

use crate::response::{IntoResponse, Response};

/// The error type returned by docket's fallible setup operations.
///
/// Application-level errors (401, 404, etc.) are expressed through the error
/// dictionary and [`Halt`], not as `Error`s.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid route `{path}`: {source}")]
    Route {
        path: String,
        #[source]
        source: matchit::InsertError,
    },

    #[error("docs path `{path}` is already routed to handler `{handler}`")]
    DocsPath { path: String, handler: String },

    #[error("invalid error definition `{key}`: {reason}")]
    ErrorDefinition { key: String, reason: String },

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config: {0}")]
    Config(#[from] toml::de::Error),

    #[error("invalid socket address `{0}`")]
    Address(String),

    #[error("telemetry: {0}")]
    Telemetry(String),
}

// ── Stop signal ───────────────────────────────────────────────────────────────

/// A terminal response that ends the current request.
///
/// Produced by [`ErrorResponseDictionary::return_error`](crate::ErrorResponseDictionary::return_error)
/// and by middleware that refuses a request. The carried response (body and
/// status) is exactly what the client receives.
pub struct Halt {
    key: String,
    response: Response,
}

impl Halt {
    pub fn new(key: impl Into<String>, response: Response) -> Self {
        Self { key: key.into(), response }
    }

    /// The error key that produced this halt.
    pub fn key(&self) -> &str { &self.key }

    pub fn response(&self) -> &Response { &self.response }
}

impl fmt::Debug for Halt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Halt")
            .field("key", &self.key)
            .field("status", &self.response.status)
            .finish()
    }
}

impl IntoResponse for Halt {
    fn into_response(self) -> Response { self.response }
}

// ── Handler failure ───────────────────────────────────────────────────────────

/// Why a handler did not produce a normal response.
///
/// Any `std::error::Error` converts into [`Fault::System`] with `?`;
/// [`Halt`] converts into [`Fault::Halt`].
#[derive(Debug)]
pub enum Fault {
    /// An error response was emitted; processing stops here.
    Halt(Halt),
    /// Anything not surfaced through the error dictionary.
    System(anyhow::Error),
}

impl Fault {
    pub fn system(err: impl Into<anyhow::Error>) -> Self {
        Self::System(err.into())
    }

    pub fn is_halt(&self) -> bool {
        matches!(self, Self::Halt(_))
    }
}

impl From<Halt> for Fault {
    fn from(h: Halt) -> Self {
        Self::Halt(h)
    }
}

impl<E> From<E> for Fault
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn from(e: E) -> Self {
        Self::System(anyhow::Error::new(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::Status;

    fn parse_then_halt(input: &str) -> Result<u32, Fault> {
        let n: u32 = input.parse()?;
        if n == 0 {
            Err(Halt::new("ZERO", Response::status(Status::BadRequest)))?;
        }
        Ok(n)
    }

    #[test]
    fn question_mark_keeps_halt_and_system_apart() {
        assert!(matches!(parse_then_halt("x"), Err(Fault::System(_))));
        assert!(parse_then_halt("0").unwrap_err().is_halt());
        assert_eq!(parse_then_halt("7").unwrap(), 7);
    }
}
