//! Application assembly and request dispatch.
//!
//! An [`App`] is built once at startup from controllers, middleware, cache
//! repositories and an error dictionary. Building walks every controller's
//! route table and registers each route; after that the app is read-only and
//! can be shared across connections.
//!
//! Per request, [`App::call`]:
//!
//! 1. resolves `(verb, path)` to a route,
//! 2. runs the route's middleware chain (app-wide, then controller-scoped),
//! 3. invokes the controller method with a [`Context`],
//! 4. turns a [`Halt`] into its carried response and an uncaught failure into
//!    the fixed system error, unless the app runs in debug mode.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::cache::CacheStore;
use crate::config::{Config, SYSTEM_CACHE};
use crate::controller::{Controller, ControllerInfo};
use crate::error::{Error, Fault, Halt};
use crate::error_response::{self, ErrorResponseDictionary, ErrorSpec, keys};
use crate::extension::Extension;
use crate::method::Method;
use crate::middleware::{DispatchContext, Middleware, MiddlewareChain};
use crate::reader::AnnotationReader;
use crate::request::Request;
use crate::response::{IntoResponse, Json, Response};
use crate::route::{DocRecord, RouteDescriptor};
use crate::router::{RouteEntry, Router};

/// State shared by the app and every request context.
struct Shared {
    errors: ErrorResponseDictionary,
    caches: HashMap<String, Arc<dyn CacheStore>>,
    debug: bool,
}

// ── Context ───────────────────────────────────────────────────────────────────

/// What a controller method can reach while handling one request.
#[derive(Clone)]
pub struct Context {
    shared: Arc<Shared>,
    controller: Arc<ControllerInfo>,
    route: Arc<RouteDescriptor>,
}

impl Context {
    pub fn errors(&self) -> &ErrorResponseDictionary {
        &self.shared.errors
    }

    /// Emits an error response and returns the stop signal for it.
    ///
    /// ```rust,ignore
    /// return Err(ctx.return_error("ENTRY_EXISTS", &[("id", &id)]).into());
    /// ```
    pub fn return_error(&self, spec: impl Into<ErrorSpec>, replacements: &[(&str, &str)]) -> Halt {
        self.shared.errors.return_error(spec, replacements)
    }

    /// The controller that owns the active route.
    pub fn controller(&self) -> &ControllerInfo {
        &self.controller
    }

    pub fn route(&self) -> &RouteDescriptor {
        &self.route
    }

    pub fn cache_repository(&self, name: &str) -> Option<&Arc<dyn CacheStore>> {
        self.shared.caches.get(name)
    }

    pub fn is_debug(&self) -> bool {
        self.shared.debug
    }
}

// ── App ───────────────────────────────────────────────────────────────────────

/// One controller's published routes.
struct Published {
    controller: Arc<ControllerInfo>,
    routes: Vec<Arc<RouteDescriptor>>,
    chain: Arc<MiddlewareChain>,
}

/// The assembled application.
pub struct App {
    shared: Arc<Shared>,
    router: Router,
    published: Vec<Published>,
    docs_path: Option<String>,
}

impl App {
    pub fn builder() -> AppBuilder {
        AppBuilder::new()
    }

    pub fn is_debug(&self) -> bool {
        self.shared.debug
    }

    pub fn errors(&self) -> &ErrorResponseDictionary {
        &self.shared.errors
    }

    pub fn cache_repository(&self, name: &str) -> Option<&Arc<dyn CacheStore>> {
        self.shared.caches.get(name)
    }

    pub fn route_count(&self) -> usize {
        self.published.iter().map(|p| p.routes.len()).sum()
    }

    /// Published documentation, one record per route that no middleware
    /// suppressed, in controller then declaration order.
    pub fn documentation(&self) -> Vec<DocRecord> {
        self.published
            .iter()
            .flat_map(|p| {
                p.routes.iter().filter_map(|route| {
                    p.chain.run_document_method(&p.controller, route, DocRecord::from(route.as_ref()))
                })
            })
            .collect()
    }

    /// Dispatches one request in-process.
    ///
    /// `Err` is only possible in debug mode, where an uncaught handler
    /// failure is handed back untouched.
    pub async fn call(&self, mut req: Request) -> Result<Response, anyhow::Error> {
        let Ok(method) = req.method().parse::<Method>() else {
            debug!(method = req.method(), "unknown verb");
            let refused = self.shared.errors.return_error(keys::METHOD_NOT_ALLOWED, &[("method", req.method())]);
            return Ok(refused.into_response());
        };

        if method == Method::Get && self.docs_path.as_deref() == Some(req.path()) {
            return Ok(Json(self.documentation()).into_response());
        }

        let Some((entry, params)) = self.router.lookup(method, req.path()) else {
            debug!(%method, path = req.path(), "no route");
            let path = req.path().to_owned();
            return Ok(self.shared.errors.return_error(keys::NOT_FOUND, &[("path", path.as_str())]).into_response());
        };
        req.set_params(params);

        let ctx = DispatchContext {
            request: &req,
            controller: &entry.controller,
            route: &entry.route,
            errors: &self.shared.errors,
        };
        if let Err(halt) = entry.chain.run_pre_dispatch(&ctx) {
            return Ok(halt.into_response());
        }

        let context = Context {
            shared: Arc::clone(&self.shared),
            controller: Arc::clone(&entry.controller),
            route: Arc::clone(&entry.route),
        };
        let path = req.path().to_owned();

        match entry.handler.call(context, req).await {
            Ok(response) => Ok(response),
            Err(Fault::Halt(halt)) => Ok(halt.into_response()),
            Err(Fault::System(e)) if self.shared.debug => Err(e),
            Err(Fault::System(e)) => {
                error!(%method, path = %path, handler = %entry.route.handler, "uncaught handler failure: {e:#}");
                Ok(error_response::system_error().to_response(&[]))
            }
        }
    }
}

// ── Builder ───────────────────────────────────────────────────────────────────

/// Collects the parts of an [`App`].
pub struct AppBuilder {
    controllers: Vec<Arc<dyn Controller>>,
    chain: MiddlewareChain,
    errors: ErrorResponseDictionary,
    reader: AnnotationReader,
    caches: HashMap<String, Arc<dyn CacheStore>>,
    debug: bool,
    docs_path: Option<String>,
}

impl AppBuilder {
    pub fn new() -> Self {
        Self {
            controllers: Vec::new(),
            chain: MiddlewareChain::new(),
            errors: ErrorResponseDictionary::default(),
            reader: AnnotationReader::new(),
            caches: HashMap::new(),
            debug: false,
            docs_path: None,
        }
    }

    pub fn controller(mut self, controller: impl Controller) -> Self {
        self.controllers.push(Arc::new(controller));
        self
    }

    /// Registers an app-wide interceptor.
    pub fn middleware(mut self, middleware: impl Middleware) -> Self {
        self.chain.register(Arc::new(middleware));
        self
    }

    /// Replaces the error dictionary, dropping definitions merged earlier by
    /// extensions or config.
    pub fn errors(mut self, errors: ErrorResponseDictionary) -> Self {
        self.errors = errors;
        self
    }

    /// Merges an extension's error definitions, middleware and controllers,
    /// in that order. Fails without registering anything if one of its error
    /// definitions is invalid.
    pub fn extension(mut self, extension: impl Extension) -> Result<Self, Error> {
        self.errors.extend_from_definitions(extension.errors())?;
        for middleware in extension.middleware() {
            self.chain.register(middleware);
        }
        let controllers = extension.controllers();
        debug!(extension = extension.name(), controllers = controllers.len(), "extension registered");
        self.controllers.extend(controllers);
        Ok(self)
    }

    /// Adds a named cache repository. The one named `system` also backs the
    /// route-table cache.
    pub fn cache_repository(mut self, name: impl Into<String>, store: Arc<dyn CacheStore>) -> Self {
        let name = name.into();
        if name == SYSTEM_CACHE {
            self.reader.set_cache_repository(Arc::clone(&store));
        }
        self.caches.insert(name, store);
        self
    }

    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Serves the published documentation as JSON at `path`.
    pub fn docs_path(mut self, path: impl Into<String>) -> Self {
        self.docs_path = Some(path.into());
        self
    }

    /// Applies debug mode, docs path, cache repositories and error overrides.
    pub fn with_config(mut self, config: &Config) -> Result<Self, Error> {
        self.debug = config.debug;
        if let Some(path) = &config.docs_path {
            self.docs_path = Some(path.clone());
        }
        for (name, cache) in &config.cache {
            if let Some(store) = cache.open()? {
                self = self.cache_repository(name.clone(), store);
            }
        }
        self.errors.extend_from_definitions(config.errors.clone())?;
        Ok(self)
    }

    /// Materializes every controller's route table and registers it.
    pub fn build(self) -> Result<App, Error> {
        let mut router = Router::new();
        let mut published = Vec::with_capacity(self.controllers.len());

        for controller in &self.controllers {
            let info = Arc::new(ControllerInfo::of(controller.as_ref()));
            let chain = Arc::new(self.chain.extended(controller.middleware()));
            let handlers: HashMap<_, _> = controller
                .handlers()
                .into_iter()
                .map(|h| (h.name, h.handler))
                .collect();

            let mut routes = Vec::new();
            for route in self.reader.route_table(controller.as_ref()) {
                let Some(handler) = handlers.get(route.handler.as_str()) else {
                    warn!(controller = info.identity, handler = %route.handler, "cached route has no handler; skipping");
                    continue;
                };
                let route = Arc::new(route);
                debug!(method = %route.http_method, uri = %route.uri, handler = %route.handler, "route registered");
                router.insert(RouteEntry {
                    controller: Arc::clone(&info),
                    route: Arc::clone(&route),
                    chain: Arc::clone(&chain),
                    handler: Arc::clone(handler),
                })?;
                routes.push(route);
            }

            published.push(Published { controller: info, routes, chain });
        }

        if let Some(docs) = &self.docs_path {
            let shadowed = published
                .iter()
                .flat_map(|p| &p.routes)
                .find(|r| r.http_method == Method::Get && r.uri == *docs);
            if let Some(route) = shadowed {
                return Err(Error::DocsPath { path: docs.clone(), handler: route.handler.clone() });
            }
        }

        let app = App {
            shared: Arc::new(Shared { errors: self.errors, caches: self.caches, debug: self.debug }),
            router,
            published,
            docs_path: self.docs_path,
        };
        info!(controllers = app.published.len(), routes = app.route_count(), debug = app.is_debug(), "app assembled");
        Ok(app)
    }
}

impl Default for AppBuilder {
    fn default() -> Self { Self::new() }
}
