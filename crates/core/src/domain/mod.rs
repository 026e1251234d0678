pub mod asset;
pub mod contract;
pub mod snapshot;

pub use asset::{Asset, AssetSelection, Timeframe};
pub use snapshot::{
    MarketSnapshot, Opportunity, PredictionRecord, PricePoint, PriceRecord, Sentiment,
    HISTORY_DAYS,
};
