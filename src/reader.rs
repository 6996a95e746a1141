//! Route-table reader with caching.
//!
//! [`AnnotationReader::route_table`] turns a controller's declared handlers
//! into ordered [`RouteDescriptor`]s. Results are stored in the attached cache
//! repository under the controller's identity and served from there on later
//! calls. The reader never invalidates an entry itself.
//!
//! Two requests may race to fill the same entry. Both parse the same
//! declarations into the same table, so the duplicate `put` is harmless.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::cache::CacheStore;
use crate::controller::Controller;
use crate::route::RouteDescriptor;

/// The cached value for one controller.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedRouteTable {
    pub routes: Vec<RouteDescriptor>,
    /// The comment block each routable handler was parsed from.
    pub comments: Vec<RawComment>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawComment {
    pub handler: String,
    pub text: String,
}

#[derive(Clone, Default)]
pub struct AnnotationReader {
    cache: Option<Arc<dyn CacheStore>>,
}

impl AnnotationReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_cache_repository(&mut self, repo: Arc<dyn CacheStore>) {
        self.cache = Some(repo);
    }

    pub fn cache_repository(&self) -> Option<&Arc<dyn CacheStore>> {
        self.cache.as_ref()
    }

    /// The ordered route table for `controller`.
    ///
    /// A cache hit is returned as stored. Cache backend failures are logged
    /// and treated as a miss.
    pub fn route_table(&self, controller: &dyn Controller) -> Vec<RouteDescriptor> {
        self.read(controller).routes
    }

    /// Like [`route_table`](Self::route_table) but with the raw comments.
    pub fn read(&self, controller: &dyn Controller) -> CachedRouteTable {
        let key = controller.identity();

        if let Some(hit) = self.lookup(key) {
            debug!(controller = key, routes = hit.routes.len(), "route table cache hit");
            return hit;
        }

        let table = parse_controller(controller);
        debug!(controller = key, routes = table.routes.len(), "route table parsed");

        if let Some(cache) = &self.cache {
            match serde_json::to_value(&table) {
                Ok(value) => {
                    if let Err(e) = cache.put(key, value) {
                        warn!(controller = key, "route table cache write failed: {e}");
                    }
                }
                Err(e) => warn!(controller = key, "route table not serializable: {e}"),
            }
        }

        table
    }

    fn lookup(&self, key: &str) -> Option<CachedRouteTable> {
        let cache = self.cache.as_ref()?;
        let value = match cache.get(key) {
            Ok(value) => value?,
            Err(e) => {
                warn!(controller = key, "route table cache read failed: {e}");
                return None;
            }
        };
        match serde_json::from_value(value) {
            Ok(table) => Some(table),
            Err(e) => {
                warn!(controller = key, "ignoring malformed route table cache entry: {e}");
                None
            }
        }
    }
}

impl std::fmt::Debug for AnnotationReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnnotationReader")
            .field("cached", &self.cache.is_some())
            .finish()
    }
}

/// Walks the declared handlers. Names without a verb prefix are skipped.
fn parse_controller(controller: &dyn Controller) -> CachedRouteTable {
    let base = controller.base_path();
    let mut routes = Vec::new();
    let mut comments = Vec::new();

    for handler in controller.handlers() {
        let Some(route) = RouteDescriptor::derive(base, handler.name(), handler.path_params(), handler.comment()) else {
            continue;
        };
        comments.push(RawComment { handler: route.handler.clone(), text: handler.comment().to_owned() });
        routes.push(route);
    }

    CachedRouteTable { routes, comments }
}
