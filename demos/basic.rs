//! Minimal docket example - a documented read/write controller behind a
//! read-only policy, with the docs endpoint enabled.
//!
//! Run with:
//!   cargo run --example basic
//!
//! Try:
//!   curl http://localhost:3000/users/42
//!   curl http://localhost:3000/users/0          # dictionary error, 404
//!   curl -X POST http://localhost:3000/users    # refused by ReadOnly, 401
//!   curl http://localhost:3000/docs

use std::sync::Arc;

use docket::extension::RestAccess;
use docket::middleware::read_only::ReadOnly;
use docket::telemetry::init_logging;
use docket::{
    App, Config, Context, Controller, Fault, HandlerDescriptor, Json, MemoryStore, Request,
    Server, Status,
};
use serde_json::json;

struct Users;

impl Controller for Users {
    fn base_path(&self) -> &str { "/users" }

    fn handlers(&self) -> Vec<HandlerDescriptor> {
        vec![
            HandlerDescriptor::new("get", get_user)
                .params(&["id"])
                .doc("Fetches one user.\n@param id int User identifier"),
            HandlerDescriptor::new("post", create_user)
                .doc("Creates a user.\n@param name string Display name"),
        ]
    }
}

// GET /users/{id}
async fn get_user(ctx: Context, req: Request) -> Result<Json<serde_json::Value>, Fault> {
    let id: u64 = req.param("id").unwrap_or_default().parse()?;
    if id == 0 {
        return Err(ctx.return_error("NOT_FOUND", &[("path", req.path())]).into());
    }
    Ok(Json(json!({ "id": id, "name": "alice" })))
}

// POST /users
async fn create_user(_ctx: Context, _req: Request) -> Result<Status, Fault> {
    Ok(Status::Created)
}

#[tokio::main]
async fn main() -> Result<(), docket::Error> {
    let config = Config::default().with_env();
    init_logging(&config.log)?;

    let app = App::builder()
        .with_config(&config)?
        .cache_repository("system", Arc::new(MemoryStore::new()))
        .controller(Users)
        .extension(RestAccess::new().read_only(ReadOnly::new()))?
        .docs_path("/docs")
        .build()?;

    Server::bind(&config.bind)?.serve(app).await
}
