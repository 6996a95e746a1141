//! Read-only access policy.
//!
//! Requests with a mutating verb (`POST`, `PUT`, `PATCH`, `DELETE`) are refused
//! with the dictionary's `NOT_AUTHORIZED` error (401) before the controller
//! method runs. Reads pass through untouched. Individual handlers can be
//! exempted by name.
//!
//! In published documentation only `GET` routes survive.

use std::collections::HashSet;

use crate::controller::ControllerInfo;
use crate::error::Halt;
use crate::error_response::keys;
use crate::method::Method;
use crate::middleware::{DispatchContext, Middleware};
use crate::route::{DocRecord, RouteDescriptor};

#[derive(Debug, Default)]
pub struct ReadOnly {
    exempt: HashSet<String>,
}

impl ReadOnly {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lets the named handler through even though its verb mutates.
    pub fn exempt(mut self, handler: impl Into<String>) -> Self {
        self.exempt.insert(handler.into());
        self
    }
}

impl Middleware for ReadOnly {
    fn name(&self) -> &'static str {
        "read_only"
    }

    fn before_dispatch(&self, ctx: &DispatchContext<'_>) -> Result<(), Halt> {
        if ctx.route.http_method.is_mutating() && !self.exempt.contains(&ctx.route.handler) {
            return Err(ctx.errors.return_error(keys::NOT_AUTHORIZED, &[]));
        }
        Ok(())
    }

    fn document_method(
        &self,
        _controller: &ControllerInfo,
        route: &RouteDescriptor,
        doc: DocRecord,
    ) -> Option<DocRecord> {
        (route.http_method == Method::Get).then_some(doc)
    }
}
