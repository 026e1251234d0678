pub mod error;
pub mod synthetic;

use crate::domain::MarketSnapshot;

pub use error::LoadFailure;
pub use synthetic::SyntheticMarket;

/// Produces complete market snapshots for the dashboard.
#[async_trait::async_trait]
pub trait SnapshotSource: Send + Sync {
    fn source_name(&self) -> &'static str;

    async fn generate(&self) -> anyhow::Result<MarketSnapshot>;
}
