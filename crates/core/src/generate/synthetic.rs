use crate::domain::{
    Asset, MarketSnapshot, Opportunity, PredictionRecord, PricePoint, PriceRecord, Sentiment,
    HISTORY_DAYS,
};
use crate::generate::SnapshotSource;
use anyhow::anyhow;
use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;
use std::sync::Mutex;

pub const ALERT_VOLATILITY: f64 = 4.0;
pub const OPPORTUNITY_MIN_MOVE: f64 = 2.0;
pub const OPPORTUNITY_MIN_CONFIDENCE: f64 = 0.7;

const BASE_PRICE_RANGE: std::ops::Range<f64> = 100.0..1100.0;
const DAILY_CHANGE_RANGE: std::ops::Range<f64> = -5.0..5.0;
const VOLATILITY_RANGE: std::ops::Range<f64> = 1.0..6.0;
const HISTORY_STEP_RANGE: std::ops::Range<f64> = -0.05..0.05;
const FORECAST_RANGE: std::ops::Range<f64> = -2.5..2.5;
const CONFIDENCE_RANGE: std::ops::Range<f64> = 0.2..1.0;
const CORRELATION_RANGE: std::ops::Range<f64> = -1.0..1.0;

/// Fabricates market state from uniform random draws. There is no upstream
/// data: every field of the snapshot comes from the RNG and the clock.
#[derive(Debug)]
pub struct SyntheticMarket {
    rng: Mutex<StdRng>,
    seed: Option<u64>,
}

impl SyntheticMarket {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
            seed: None,
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            seed: Some(seed),
        }
    }

    pub fn from_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::new(),
        }
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn generate_with<R: Rng + ?Sized>(rng: &mut R, now: DateTime<Utc>) -> MarketSnapshot {
        let id = uuid::Builder::from_random_bytes(rng.gen()).into_uuid();

        let mut prices = BTreeMap::new();
        let mut predictions = BTreeMap::new();
        let mut alerts = Vec::new();
        let mut opportunities = Vec::new();

        for asset in Asset::ALL {
            let base_price = rng.gen_range(BASE_PRICE_RANGE);
            let change = rng.gen_range(DAILY_CHANGE_RANGE);
            let volatility = rng.gen_range(VOLATILITY_RANGE);
            let history = price_history(rng, base_price, now);

            let prediction = PredictionRecord {
                ai: rng.gen_range(FORECAST_RANGE),
                traditional: rng.gen_range(FORECAST_RANGE),
                confidence: rng.gen_range(CONFIDENCE_RANGE),
            };

            if volatility > ALERT_VOLATILITY {
                alerts.push(format!(
                    "High volatility detected in {asset}: {volatility:.2}%"
                ));
            }

            if prediction.ai.abs() > OPPORTUNITY_MIN_MOVE
                && prediction.confidence > OPPORTUNITY_MIN_CONFIDENCE
            {
                opportunities.push(Opportunity {
                    asset,
                    prediction: prediction.ai,
                    confidence: prediction.confidence,
                });
            }

            prices.insert(
                asset,
                PriceRecord {
                    current: base_price,
                    change,
                    volatility,
                    history,
                },
            );
            predictions.insert(asset, prediction);
        }

        // Each ordered pair is drawn on its own, so [a][b] and [b][a] differ.
        let mut correlations = BTreeMap::new();
        for a in Asset::ALL {
            let row: BTreeMap<Asset, f64> = Asset::ALL
                .iter()
                .map(|&b| {
                    let value = if a == b {
                        1.0
                    } else {
                        rng.gen_range(CORRELATION_RANGE)
                    };
                    (b, value)
                })
                .collect();
            correlations.insert(a, row);
        }

        let sentiment = Sentiment::ALL[rng.gen_range(0..Sentiment::ALL.len())];

        MarketSnapshot {
            id,
            generated_at: now,
            prices,
            predictions,
            sentiment,
            alerts,
            opportunities,
            correlations,
        }
    }
}

impl Default for SyntheticMarket {
    fn default() -> Self {
        Self::new()
    }
}

/// Random walk of `HISTORY_DAYS` daily closes; the last point is dated `now`.
fn price_history<R: Rng + ?Sized>(
    rng: &mut R,
    base_price: f64,
    now: DateTime<Utc>,
) -> Vec<PricePoint> {
    let mut price = base_price;
    (0..HISTORY_DAYS)
        .map(|i| {
            let step = rng.gen_range(HISTORY_STEP_RANGE);
            price *= 1.0 + step;
            let days_back = (HISTORY_DAYS - 1 - i) as i64;
            PricePoint {
                date: now - Duration::days(days_back),
                price,
                daily_return: step * 100.0,
            }
        })
        .collect()
}

#[async_trait::async_trait]
impl SnapshotSource for SyntheticMarket {
    fn source_name(&self) -> &'static str {
        "synthetic"
    }

    async fn generate(&self) -> anyhow::Result<MarketSnapshot> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| anyhow!("synthetic market rng lock poisoned"))?;
        let snapshot = Self::generate_with(&mut *rng, Utc::now());
        tracing::debug!(
            snapshot_id = %snapshot.id,
            alerts = snapshot.alerts.len(),
            opportunities = snapshot.opportunities.len(),
            sentiment = %snapshot.sentiment,
            "generated synthetic snapshot"
        );
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 27, 10, 0, 0).unwrap()
    }

    fn snapshots() -> impl Iterator<Item = MarketSnapshot> {
        (0..64u64).map(|seed| SyntheticMarket::generate_with(&mut StdRng::seed_from_u64(seed), now()))
    }

    #[test]
    fn every_asset_has_prices_predictions_and_correlations() {
        for s in snapshots() {
            assert_eq!(s.prices.keys().copied().collect::<Vec<_>>(), Asset::ALL.to_vec());
            assert_eq!(s.predictions.keys().copied().collect::<Vec<_>>(), Asset::ALL.to_vec());
            assert_eq!(s.correlations.len(), 8);
            for row in s.correlations.values() {
                assert_eq!(row.keys().copied().collect::<Vec<_>>(), Asset::ALL.to_vec());
            }
            for p in s.prices.values() {
                assert_eq!(p.history.len(), HISTORY_DAYS);
            }
        }
    }

    #[test]
    fn correlation_diagonal_is_one() {
        for s in snapshots() {
            for a in Asset::ALL {
                assert_eq!(s.correlation(a, a), Some(1.0));
            }
        }
    }

    #[test]
    fn draws_stay_within_ranges() {
        for s in snapshots() {
            for (asset, p) in &s.prices {
                assert!((100.0..1100.0).contains(&p.current), "{asset}");
                assert!((-5.0..5.0).contains(&p.change), "{asset}");
                assert!((1.0..6.0).contains(&p.volatility), "{asset}");
                for pt in &p.history {
                    assert!((-5.0..5.0).contains(&pt.daily_return));
                    assert!(pt.price > 0.0);
                }
            }
            for pred in s.predictions.values() {
                assert!((-2.5..2.5).contains(&pred.ai));
                assert!((-2.5..2.5).contains(&pred.traditional));
                assert!((0.2..1.0).contains(&pred.confidence));
            }
        }
    }

    #[test]
    fn history_walks_from_base_price_and_ends_today() {
        let s = SyntheticMarket::generate_with(&mut StdRng::seed_from_u64(3), now());
        for p in s.prices.values() {
            let last = p.history.last().unwrap();
            assert_eq!(last.date, now());
            assert_eq!(p.history[0].date, now() - Duration::days(29));

            let first = &p.history[0];
            let expected = p.current * (1.0 + first.daily_return / 100.0);
            assert!((first.price - expected).abs() < 1e-9);

            for w in p.history.windows(2) {
                let expected = w[0].price * (1.0 + w[1].daily_return / 100.0);
                assert!((w[1].price - expected).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn alert_present_iff_volatility_above_threshold() {
        for s in snapshots() {
            for (asset, p) in &s.prices {
                let needle = format!("in {asset}:");
                let has_alert = s.alerts.iter().any(|a| a.contains(&needle));
                assert_eq!(has_alert, p.volatility > ALERT_VOLATILITY, "{asset}");
            }
        }
    }

    #[test]
    fn alert_text_names_asset_and_volatility() {
        let s = snapshots()
            .find(|s| !s.alerts.is_empty())
            .expect("some seed produces an alert");
        let alert = &s.alerts[0];
        let asset = Asset::ALL
            .into_iter()
            .find(|a| s.prices[a].volatility > ALERT_VOLATILITY)
            .unwrap();
        assert_eq!(
            alert,
            &format!(
                "High volatility detected in {asset}: {:.2}%",
                s.prices[&asset].volatility
            )
        );
    }

    #[test]
    fn opportunity_present_iff_large_confident_forecast() {
        for s in snapshots() {
            for (asset, pred) in &s.predictions {
                let opp = s.opportunities.iter().find(|o| o.asset == *asset);
                let qualifies = pred.ai.abs() > OPPORTUNITY_MIN_MOVE
                    && pred.confidence > OPPORTUNITY_MIN_CONFIDENCE;
                assert_eq!(opp.is_some(), qualifies, "{asset}");
                if let Some(o) = opp {
                    assert_eq!(o.prediction, pred.ai);
                    assert_eq!(o.confidence, pred.confidence);
                }
            }
        }
    }

    #[test]
    fn alerts_and_opportunities_follow_universe_order() {
        for s in snapshots() {
            let order: Vec<usize> = s.opportunities.iter().map(|o| o.asset.index()).collect();
            let mut sorted = order.clone();
            sorted.sort();
            assert_eq!(order, sorted);
        }
    }

    #[test]
    fn same_seed_same_snapshot() {
        let a = SyntheticMarket::generate_with(&mut StdRng::seed_from_u64(11), now());
        let b = SyntheticMarket::generate_with(&mut StdRng::seed_from_u64(11), now());
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn seeded_source_advances_between_cycles() {
        let source = SyntheticMarket::seeded(5);
        assert_eq!(source.seed(), Some(5));
        let first = source.generate().await.unwrap();
        let second = source.generate().await.unwrap();
        assert_ne!(first.id, second.id);
        first.validate().unwrap();
        second.validate().unwrap();
    }
}
