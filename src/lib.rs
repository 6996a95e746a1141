//! # docket
//!
//! A small REST toolkit. Controllers declare their handlers; the handler name
//! decides the verb and path, the handler's comment decides the published
//! documentation. Interceptors run around every call, and every client-facing
//! failure goes through one JSON error contract.
//!
//! ## The pieces
//!
//! - [`Controller`] + [`HandlerDescriptor`]: an explicit registration table,
//!   no runtime reflection
//! - [`AnnotationReader`]: turns declarations into [`RouteDescriptor`]s and
//!   caches them in a pluggable [`CacheStore`]
//! - [`MiddlewareChain`]: pre-dispatch short-circuits and documentation
//!   rewriting, in registration order
//! - [`ErrorResponseDictionary`]: symbolic error keys to templated,
//!   status-bearing responses; emitting one yields a [`Halt`]
//! - [`Extension`]: controllers, middleware and error definitions registered
//!   as one unit
//! - [`App`] / [`Server`]: assembly, dispatch and the hyper front end
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use docket::{App, Context, Controller, Fault, HandlerDescriptor, Json, Request, Server};
//! use docket::middleware::read_only::ReadOnly;
//!
//! struct Users;
//!
//! impl Controller for Users {
//!     fn base_path(&self) -> &str { "/users" }
//!
//!     fn handlers(&self) -> Vec<HandlerDescriptor> {
//!         vec![
//!             HandlerDescriptor::new("get", get_user)
//!                 .params(&["id"])
//!                 .doc("Fetches one user.\n@param id int User identifier"),
//!         ]
//!     }
//! }
//!
//! async fn get_user(ctx: Context, req: Request) -> Result<Json<serde_json::Value>, Fault> {
//!     let id = req.param("id").unwrap_or_default();
//!     if id == "0" {
//!         return Err(ctx.return_error("NOT_FOUND", &[("path", req.path())]).into());
//!     }
//!     Ok(Json(serde_json::json!({ "id": id })))
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), docket::Error> {
//!     let app = App::builder()
//!         .controller(Users)
//!         .middleware(ReadOnly::new())
//!         .docs_path("/docs")
//!         .build()?;
//!
//!     Server::bind("0.0.0.0:3000")?.serve(app).await
//! }
//! ```

mod app;
mod controller;
mod error;
mod handler;
mod method;
mod reader;
mod request;
mod response;
mod router;
mod server;
mod status;

pub mod annotation;
pub mod cache;
pub mod config;
pub mod error_response;
pub mod extension;
pub mod middleware;
pub mod route;
pub mod telemetry;

pub use app::{App, AppBuilder, Context};
pub use cache::{CacheStore, FileStore, MemoryStore};
pub use config::Config;
pub use controller::{Controller, ControllerInfo, HandlerDescriptor};
pub use error::{Error, Fault, Halt};
pub use error_response::{ErrorDefinition, ErrorResponse, ErrorResponseDictionary, ErrorSpec};
pub use extension::Extension;
pub use handler::Handler;
pub use method::Method;
pub use middleware::{DispatchContext, Middleware, MiddlewareChain};
pub use reader::{AnnotationReader, CachedRouteTable, RawComment};
pub use request::Request;
pub use response::{IntoResponse, Json, Response, ResponseBuilder};
pub use route::{DocRecord, ParamDoc, RouteDescriptor};
pub use server::Server;
pub use status::Status;
