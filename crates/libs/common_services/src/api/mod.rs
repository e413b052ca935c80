pub mod auth;
pub mod face;
