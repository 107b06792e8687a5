mod handler;
mod model;

pub use handler::{login, logout, me, send_code, sign, sign_count};
