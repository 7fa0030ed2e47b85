pub mod manager;
pub mod models;
pub mod service;

pub use manager::{DatabaseError, DatabaseManager};
pub use service::PgStore;
