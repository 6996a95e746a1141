//! Extensions: controllers, middleware and error definitions shipped as one
//! unit.
//!
//! [`AppBuilder::extension`](crate::AppBuilder::extension) merges an
//! extension at the point it is registered: its middleware joins the
//! app-wide chain after anything registered before it, its controllers are
//! published after earlier controllers, and its error definitions are added
//! to (or override entries in) the dictionary.
//!
//! ```rust
//! use std::sync::Arc;
//! use docket::App;
//! use docket::extension::RestAccess;
//! use docket::middleware::read_only::ReadOnly;
//!
//! let app = App::builder()
//!     .extension(RestAccess::new().read_only(ReadOnly::new().exempt("post_search")))
//!     .unwrap()
//!     .build()
//!     .unwrap();
//! assert_eq!(app.route_count(), 0);
//! ```

use std::sync::Arc;

use crate::controller::Controller;
use crate::error_response::ErrorDefinition;
use crate::middleware::Middleware;
use crate::middleware::read_only::ReadOnly;

pub trait Extension: Send + Sync + 'static {
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    fn controllers(&self) -> Vec<Arc<dyn Controller>> {
        Vec::new()
    }

    /// App-wide interceptors, in the order they should run.
    fn middleware(&self) -> Vec<Arc<dyn Middleware>> {
        Vec::new()
    }

    /// `KEY -> definition` pairs merged into the error dictionary.
    fn errors(&self) -> Vec<(String, ErrorDefinition)> {
        Vec::new()
    }
}

// ── REST access ───────────────────────────────────────────────────────────────

/// Access policies for REST controllers.
#[derive(Default)]
pub struct RestAccess {
    policies: Vec<Arc<dyn Middleware>>,
}

impl RestAccess {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read_only(mut self, policy: ReadOnly) -> Self {
        self.policies.push(Arc::new(policy));
        self
    }
}

impl Extension for RestAccess {
    fn name(&self) -> &'static str {
        "rest_access"
    }

    fn middleware(&self) -> Vec<Arc<dyn Middleware>> {
        self.policies.clone()
    }
}
