pub mod authorization_token;
pub mod project;
pub mod user;

pub use authorization_token::AuthorizationToken;
pub use project::DashboardProject;
pub use user::User;
