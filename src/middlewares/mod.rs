pub mod auth;
pub mod cors;

pub use auth::{AuthMiddleware, bearer_token, current_user, optional_user};
pub use cors::create_cors;
