pub mod auth;
pub mod config;
pub mod context;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod request;
pub mod rpc;
pub mod services;
pub mod state;

pub use handlers::app;
pub use state::AppState;
