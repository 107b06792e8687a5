pub mod entity;
pub mod geo;
pub mod lock;
pub mod session;
pub mod sign;
