//! Server-side RPC callers. A router is bound to the request's `AppContext`
//! with `caller(&ctx)`, mirroring how remote procedures are invoked from
//! route loaders.

pub mod dashboard_project;

pub use dashboard_project::{DashboardProjectCaller, DashboardProjectRouter};

use crate::services::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}
