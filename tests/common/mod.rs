//! Shared fixtures: a model controller backed by a counting fake store.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use docket::{Context, Controller, Fault, HandlerDescriptor, Json, Request, Status};
use serde_json::{Value, json};

/// Stand-in for a data connection; counts every lookup.
#[derive(Default)]
pub struct FakeStore {
    pub lookups: AtomicUsize,
    pub writes: AtomicUsize,
    rows: HashMap<u64, Value>,
}

impl FakeStore {
    pub fn with_row(id: u64, row: Value) -> Arc<Self> {
        let mut store = Self::default();
        store.rows.insert(id, row);
        Arc::new(store)
    }

    pub fn find_one_by_id(&self, id: u64) -> Option<Value> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.rows.get(&id).cloned()
    }

    pub fn insert(&self) {
        self.writes.fetch_add(1, Ordering::SeqCst);
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

/// REST controller over `/modelbs`.
pub struct ModelBs {
    pub store: Arc<FakeStore>,
}

impl Controller for ModelBs {
    fn base_path(&self) -> &str {
        "/modelbs"
    }

    fn handlers(&self) -> Vec<HandlerDescriptor> {
        let list = Arc::clone(&self.store);
        let show = Arc::clone(&self.store);
        let create = Arc::clone(&self.store);
        let remove = Arc::clone(&self.store);
        vec![
            HandlerDescriptor::new("get", move |_ctx: Context, _req: Request| {
                let store = Arc::clone(&list);
                async move {
                    store.lookups.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, Fault>(Json(json!([])))
                }
            })
            .doc("Lists every model."),
            HandlerDescriptor::new("get_resource", move |ctx: Context, req: Request| {
                let store = Arc::clone(&show);
                async move {
                    let id: u64 = req.param("id").unwrap_or_default().parse()?;
                    let row = store
                        .find_one_by_id(id)
                        .ok_or_else(|| ctx.return_error("NOT_FOUND", &[("path", req.path())]))?;
                    Ok::<_, Fault>(Json(row))
                }
            })
            .params(&["id"])
            .doc("Fetches one model.\n@param id int Model identifier"),
            HandlerDescriptor::new("post", move |_ctx: Context, _req: Request| {
                let store = Arc::clone(&create);
                async move {
                    store.insert();
                    Ok::<_, Fault>(Status::Created)
                }
            })
            .doc("Creates a model.\n@param name string Display name"),
            HandlerDescriptor::new("delete", move |_ctx: Context, _req: Request| {
                let store = Arc::clone(&remove);
                async move {
                    store.insert();
                    Ok::<_, Fault>(Status::NoContent)
                }
            })
            .params(&["id"]),
        ]
    }
}

/// A controller whose routes are reachable under `/justa`.
pub struct Justa;

impl Controller for Justa {
    fn base_path(&self) -> &str {
        "/justa"
    }

    fn handlers(&self) -> Vec<HandlerDescriptor> {
        vec![
            HandlerDescriptor::new("get_testfunc", |_ctx: Context, _req: Request| async {
                Ok::<_, Fault>("test")
            }),
            HandlerDescriptor::new("post_testfunc", |_ctx: Context, _req: Request| async {
                Ok::<_, Fault>("posted")
            })
            .doc("Posts a test value."),
        ]
    }
}

pub fn body_json(body: &[u8]) -> Value {
    serde_json::from_slice(body).expect("response body is json")
}
