use axum::{extract::State, Json};
use serde::Serialize;

use crate::revision::Revision;

#[derive(Debug, Serialize)]
pub struct VersionInfo {
    pub revision: String,
    pub version: &'static str,
}

pub async fn get_version(State(revision): State<Revision>) -> Json<VersionInfo> {
    Json(VersionInfo {
        revision: revision.to_string(),
        version: env!("CARGO_PKG_VERSION"),
    })
}
