use crate::domain::asset::Asset;
use crate::domain::snapshot::{MarketSnapshot, HISTORY_DAYS};
use anyhow::{bail, ensure};
use chrono::Duration;

impl MarketSnapshot {
    /// Checks the structural invariants every published snapshot must hold.
    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(
            self.prices.len() == Asset::ALL.len(),
            "snapshot must price exactly {} assets (got {})",
            Asset::ALL.len(),
            self.prices.len()
        );
        ensure!(
            self.predictions.len() == Asset::ALL.len(),
            "snapshot must predict exactly {} assets (got {})",
            Asset::ALL.len(),
            self.predictions.len()
        );
        ensure!(
            self.correlations.len() == Asset::ALL.len(),
            "correlation matrix must have {} rows (got {})",
            Asset::ALL.len(),
            self.correlations.len()
        );

        for asset in Asset::ALL {
            let Some(price) = self.prices.get(&asset) else {
                bail!("missing price record for {asset}");
            };
            ensure!(
                price.current > 0.0,
                "current price for {asset} must be positive (got {})",
                price.current
            );
            ensure!(
                price.volatility >= 0.0,
                "volatility for {asset} must be non-negative (got {})",
                price.volatility
            );
            ensure!(
                price.history.len() == HISTORY_DAYS,
                "history for {asset} must have {HISTORY_DAYS} points (got {})",
                price.history.len()
            );
            ensure!(
                price
                    .history
                    .windows(2)
                    .all(|w| w[1].date - w[0].date == Duration::days(1)),
                "history for {asset} must be daily points in chronological order"
            );
            ensure!(
                price.history.last().map(|p| p.date) == Some(self.generated_at),
                "history for {asset} must end at the generation time {}",
                self.generated_at
            );

            let Some(prediction) = self.predictions.get(&asset) else {
                bail!("missing prediction record for {asset}");
            };
            ensure!(
                (0.2..=1.0).contains(&prediction.confidence),
                "confidence for {asset} must be within [0.2, 1.0] (got {})",
                prediction.confidence
            );

            let Some(row) = self.correlations.get(&asset) else {
                bail!("missing correlation row for {asset}");
            };
            ensure!(
                row.len() == Asset::ALL.len(),
                "correlation row for {asset} must have {} columns (got {})",
                Asset::ALL.len(),
                row.len()
            );
            for (other, value) in row {
                if *other == asset {
                    ensure!(*value == 1.0, "correlation diagonal for {asset} must be 1 (got {value})");
                } else {
                    ensure!(
                        (-1.0..=1.0).contains(value),
                        "correlation {asset}/{other} out of range: {value}"
                    );
                }
            }
        }

        Ok(())
    }
}
