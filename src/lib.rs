pub mod analysis;
pub mod config;
pub mod errors;
pub mod market_data;
pub mod models;
pub mod sheets;
pub mod services;

// Re-exports for the binary and tests
pub use config::Config;
pub use errors::{Result, TrendBotError};
pub use models::analysis::{AnalysisResult, TrendLabel};
pub use models::bar::{Bar, BarSeries};
pub use services::scheduler::{CycleStats, Scheduler, Sleeper, TokioSleeper};
pub use services::trend_service::{CycleOutcome, TrendService};
