//! Radix-tree route table.
//!
//! One tree per HTTP method. O(path-length) lookup. Built once when the app
//! is assembled; each leaf holds everything needed to dispatch the route.

use std::collections::HashMap;
use std::sync::Arc;

use matchit::Router as MatchitRouter;

use crate::controller::ControllerInfo;
use crate::error::Error;
use crate::handler::BoxedHandler;
use crate::method::Method;
use crate::middleware::MiddlewareChain;
use crate::route::RouteDescriptor;

/// A registered route and what to run for it.
pub(crate) struct RouteEntry {
    pub(crate) controller: Arc<ControllerInfo>,
    pub(crate) route: Arc<RouteDescriptor>,
    pub(crate) chain: Arc<MiddlewareChain>,
    pub(crate) handler: BoxedHandler,
}

#[derive(Default)]
pub(crate) struct Router {
    routes: HashMap<Method, MatchitRouter<Arc<RouteEntry>>>,
}

impl Router {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Registers `entry` under its route's verb and URI template.
    pub(crate) fn insert(&mut self, entry: RouteEntry) -> Result<(), Error> {
        let method = entry.route.http_method;
        let path = entry.route.uri.clone();
        self.routes
            .entry(method)
            .or_default()
            .insert(path.as_str(), Arc::new(entry))
            .map_err(|source| Error::Route { path, source })
    }

    pub(crate) fn lookup(
        &self,
        method: Method,
        path: &str,
    ) -> Option<(Arc<RouteEntry>, HashMap<String, String>)> {
        let tree = self.routes.get(&method)?;
        let matched = tree.at(path).ok()?;
        let entry = Arc::clone(matched.value);
        let params = matched.params.iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Some((entry, params))
    }
}
