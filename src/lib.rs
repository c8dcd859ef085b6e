/*
 * Swaplens - A/B swap quote analysis reports
 * Core library exports and module declarations
 */

pub mod ab;
pub mod buckets;
pub mod chart;
pub mod filters;
pub mod loader;
pub mod metrics;
pub mod models;
pub mod report;

pub use ab::TradeGroup;
pub use loader::LoadReport;
pub use models::*;

/// Tracing setup shared by every report binary.
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "swaplens=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
