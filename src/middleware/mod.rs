mod auth;

pub use auth::{refresh_token, require_login};
