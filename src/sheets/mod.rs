pub mod auth;
pub mod client;
pub mod publisher;
pub mod range;
