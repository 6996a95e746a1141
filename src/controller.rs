//! Controllers and their declared handlers.
//!
//! There is no runtime reflection: a controller lists its handlers up front,
//! each with the name that determines its verb and path, the names of its
//! path parameters in declaration order, and its descriptive comment.
//!
//! ```rust
//! use docket::{Context, Controller, Fault, HandlerDescriptor, Json, Request};
//!
//! struct Models;
//!
//! impl Controller for Models {
//!     fn base_path(&self) -> &str { "/models" }
//!
//!     fn handlers(&self) -> Vec<HandlerDescriptor> {
//!         vec![
//!             HandlerDescriptor::new("get", list)
//!                 .doc("Lists all models.\n@param page int? Page number"),
//!             HandlerDescriptor::new("get_resource", show)
//!                 .params(&["id"])
//!                 .doc("Fetches one model.\n@param id int Model identifier"),
//!         ]
//!     }
//! }
//!
//! async fn list(_ctx: Context, _req: Request) -> Result<Json<Vec<u32>>, Fault> {
//!     Ok(Json(vec![1, 2, 3]))
//! }
//!
//! async fn show(_ctx: Context, req: Request) -> Result<String, Fault> {
//!     Ok(format!("model {}", req.param("id").unwrap_or_default()))
//! }
//! ```
//!
//! These route to `GET /models` and `GET /models/{id}`. The verb prefix picks
//! the method, the rest of the name becomes a path segment (`get_stats` is
//! `GET /models/stats`) except for the `collection` and `resource` suffixes,
//! which only say what the handler operates on. Path parameters are appended
//! as `{name}` segments in declaration order.

use std::sync::Arc;

use crate::handler::{BoxedHandler, Handler};
use crate::middleware::Middleware;

/// A group of related HTTP operations under one base path.
pub trait Controller: Send + Sync + 'static {
    /// Path prefix shared by every route of this controller.
    fn base_path(&self) -> &str;

    /// The declared handlers, in the order their routes are published.
    fn handlers(&self) -> Vec<HandlerDescriptor>;

    /// Stable identity used as the route-table cache key.
    fn identity(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Interceptors that apply only to this controller. They run after the
    /// app-wide ones.
    fn middleware(&self) -> Vec<Arc<dyn Middleware>> {
        Vec::new()
    }
}

/// One declared controller method.
#[derive(Clone)]
pub struct HandlerDescriptor {
    pub(crate) name: &'static str,
    pub(crate) doc: &'static str,
    pub(crate) params: &'static [&'static str],
    pub(crate) handler: BoxedHandler,
}

impl HandlerDescriptor {
    pub fn new(name: &'static str, handler: impl Handler) -> Self {
        Self { name, doc: "", params: &[], handler: handler.into_boxed_handler() }
    }

    /// The descriptive comment block, in the annotation DSL.
    pub fn doc(mut self, doc: &'static str) -> Self {
        self.doc = doc;
        self
    }

    /// Path parameter names, in declaration order.
    pub fn params(mut self, params: &'static [&'static str]) -> Self {
        self.params = params;
        self
    }

    pub fn name(&self) -> &'static str { self.name }
    pub fn comment(&self) -> &'static str { self.doc }
    pub fn path_params(&self) -> &'static [&'static str] { self.params }
}

impl std::fmt::Debug for HandlerDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerDescriptor")
            .field("name", &self.name)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// What middleware and handlers may know about a controller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ControllerInfo {
    pub identity: &'static str,
    pub base_path: String,
}

impl ControllerInfo {
    pub fn of(controller: &dyn Controller) -> Self {
        Self { identity: controller.identity(), base_path: controller.base_path().to_owned() }
    }
}
