pub mod origin;

pub use origin::{allowed_destinations, prevent_cross_origin_cookie, PolicyError, DASHBOARD_DESTINATIONS};
