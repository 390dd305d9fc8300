//! services/agent/src/bin/openapi.rs
//!
//! Writes the OpenAPI document for the dashboard API: the view, post and
//! connection routes plus their JSON payloads. The output goes to
//! `openapi.json` unless a path is passed as the first argument, and is
//! what dashboard clients are generated from.

use agent_lib::web::rest::ApiDoc;
use std::path::PathBuf;
use utoipa::OpenApi;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path: PathBuf = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "openapi.json".to_string())
        .into();

    let document = ApiDoc::openapi();
    let route_count = document.paths.paths.len();
    std::fs::write(&path, document.to_pretty_json()?)?;

    println!(
        "Wrote the dashboard API document ({} routes) to {}",
        route_count,
        path.display()
    );
    Ok(())
}
