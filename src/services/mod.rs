pub mod scheduler;
pub mod trend_service;
