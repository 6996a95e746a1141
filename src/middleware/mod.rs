//! Middleware layer.
//!
//! An interceptor takes part in two moments of a route's life:
//!
//! 1. **Pre-dispatch**, before the controller method runs. Returning a
//!    [`Halt`] writes a terminal response; later interceptors and the method
//!    itself are skipped.
//! 2. **Documentation**, when routes are published for introspection. Each
//!    interceptor receives the current [`DocRecord`] and returns the next one,
//!    or `None` to drop the route from published docs.
//!
//! Both hooks run in registration order, and each interceptor sees the
//! result of the ones before it.
//!
//! Built-in middleware:
//! - [`read_only::ReadOnly`] - refuses mutating verbs and hides them from docs

pub mod read_only;

use std::sync::Arc;

use tracing::debug;

use crate::controller::ControllerInfo;
use crate::error::Halt;
use crate::error_response::ErrorResponseDictionary;
use crate::request::Request;
use crate::route::{DocRecord, RouteDescriptor};

/// Per-invocation state handed to [`Middleware::before_dispatch`].
pub struct DispatchContext<'a> {
    pub request: &'a Request,
    pub controller: &'a ControllerInfo,
    pub route: &'a RouteDescriptor,
    pub errors: &'a ErrorResponseDictionary,
}

/// A pluggable interceptor.
pub trait Middleware: Send + Sync + 'static {
    fn name(&self) -> &'static str;

    /// Runs before the target method. `Err` ends the request with the carried
    /// response.
    fn before_dispatch(&self, _ctx: &DispatchContext<'_>) -> Result<(), Halt> {
        Ok(())
    }

    /// Rewrites or suppresses the documentation for one route.
    fn document_method(
        &self,
        _controller: &ControllerInfo,
        _route: &RouteDescriptor,
        doc: DocRecord,
    ) -> Option<DocRecord> {
        Some(doc)
    }
}

/// Ordered set of interceptors.
#[derive(Clone, Default)]
pub struct MiddlewareChain {
    stages: Vec<Arc<dyn Middleware>>,
}

impl MiddlewareChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, middleware: Arc<dyn Middleware>) {
        self.stages.push(middleware);
    }

    /// This chain followed by `extra`.
    pub fn extended(&self, extra: impl IntoIterator<Item = Arc<dyn Middleware>>) -> Self {
        let mut stages = self.stages.clone();
        stages.extend(extra);
        Self { stages }
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|m| m.name()).collect()
    }

    pub fn len(&self) -> usize { self.stages.len() }
    pub fn is_empty(&self) -> bool { self.stages.is_empty() }

    /// Runs every pre-dispatch hook until one halts.
    pub fn run_pre_dispatch(&self, ctx: &DispatchContext<'_>) -> Result<(), Halt> {
        for stage in &self.stages {
            if let Err(halt) = stage.before_dispatch(ctx) {
                debug!(
                    middleware = stage.name(),
                    key = halt.key(),
                    path = ctx.request.path(),
                    "request short-circuited"
                );
                return Err(halt);
            }
        }
        Ok(())
    }

    /// Folds the documentation record through every hook. Once suppressed it
    /// stays suppressed.
    pub fn run_document_method(
        &self,
        controller: &ControllerInfo,
        route: &RouteDescriptor,
        doc: DocRecord,
    ) -> Option<DocRecord> {
        self.stages
            .iter()
            .try_fold(doc, |doc, stage| stage.document_method(controller, route, doc))
    }
}

impl std::fmt::Debug for MiddlewareChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::response::Response;
    use crate::status::Status;

    /// Records every hook call into a shared log.
    struct Probe {
        name: &'static str,
        log: Arc<Mutex<Vec<String>>>,
        halt: bool,
    }

    impl Middleware for Probe {
        fn name(&self) -> &'static str { self.name }

        fn before_dispatch(&self, _ctx: &DispatchContext<'_>) -> Result<(), Halt> {
            self.log.lock().unwrap().push(format!("pre:{}", self.name));
            if self.halt {
                return Err(Halt::new("STOP", Response::status(Status::Forbidden)));
            }
            Ok(())
        }

        fn document_method(
            &self,
            _controller: &ControllerInfo,
            _route: &RouteDescriptor,
            mut doc: DocRecord,
        ) -> Option<DocRecord> {
            self.log.lock().unwrap().push(format!("doc:{}", self.name));
            doc.synopsis.push_str(self.name);
            Some(doc)
        }
    }

    struct Suppress;

    impl Middleware for Suppress {
        fn name(&self) -> &'static str { "suppress" }

        fn document_method(&self, _: &ControllerInfo, _: &RouteDescriptor, _: DocRecord) -> Option<DocRecord> {
            None
        }
    }

    fn fixture() -> (ControllerInfo, RouteDescriptor, Request, ErrorResponseDictionary) {
        (
            ControllerInfo { identity: "tests::Things", base_path: "/things".to_owned() },
            RouteDescriptor::derive("/things", "get", &[], "Things: ").unwrap(),
            Request::new("GET", "/things"),
            ErrorResponseDictionary::default(),
        )
    }

    fn probe(name: &'static str, log: &Arc<Mutex<Vec<String>>>, halt: bool) -> Arc<dyn Middleware> {
        Arc::new(Probe { name, log: Arc::clone(log), halt })
    }

    #[test]
    fn pre_dispatch_stops_at_first_halt() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut chain = MiddlewareChain::new();
        chain.register(probe("a", &log, false));
        chain.register(probe("b", &log, true));
        chain.register(probe("c", &log, false));

        let (controller, route, request, errors) = fixture();
        let ctx = DispatchContext { request: &request, controller: &controller, route: &route, errors: &errors };
        let halt = chain.run_pre_dispatch(&ctx).unwrap_err();

        assert_eq!(halt.key(), "STOP");
        assert_eq!(*log.lock().unwrap(), vec!["pre:a", "pre:b"]);
    }

    #[test]
    fn documentation_folds_in_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut chain = MiddlewareChain::new();
        chain.register(probe("a", &log, false));
        chain.register(probe("b", &log, false));

        let (controller, route, _, _) = fixture();
        let doc = chain.run_document_method(&controller, &route, DocRecord::from(&route)).unwrap();
        assert_eq!(doc.synopsis, "Things:ab");
        assert_eq!(*log.lock().unwrap(), vec!["doc:a", "doc:b"]);
    }

    #[test]
    fn suppressed_docs_skip_later_hooks() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let chain = MiddlewareChain::new().extended([Arc::new(Suppress) as Arc<dyn Middleware>, probe("late", &log, false)]);

        let (controller, route, _, _) = fixture();
        assert!(chain.run_document_method(&controller, &route, DocRecord::from(&route)).is_none());
        assert!(log.lock().unwrap().is_empty());
        assert_eq!(chain.names(), vec!["suppress", "late"]);
    }
}
