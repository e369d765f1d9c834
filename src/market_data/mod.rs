pub mod alpaca;
pub mod base;
pub mod response;
