use crate::domain::asset::Asset;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

pub const HISTORY_DAYS: usize = 30;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub prices: BTreeMap<Asset, PriceRecord>,
    pub predictions: BTreeMap<Asset, PredictionRecord>,
    pub sentiment: Sentiment,
    pub alerts: Vec<String>,
    pub opportunities: Vec<Opportunity>,
    pub correlations: BTreeMap<Asset, BTreeMap<Asset, f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    pub current: f64,
    /// Daily change, percent.
    pub change: f64,
    /// Percent.
    pub volatility: f64,
    /// Oldest first.
    pub history: Vec<PricePoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: DateTime<Utc>,
    pub price: f64,
    /// Day-over-day change, percent.
    #[serde(rename = "return")]
    pub daily_return: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub ai: f64,
    pub traditional: f64,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opportunity {
    pub asset: Asset,
    pub prediction: f64,
    pub confidence: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Bullish,
    Bearish,
    Neutral,
}

impl Sentiment {
    pub const ALL: [Sentiment; 3] = [Sentiment::Bullish, Sentiment::Bearish, Sentiment::Neutral];

    pub fn as_str(self) -> &'static str {
        match self {
            Sentiment::Bullish => "bullish",
            Sentiment::Bearish => "bearish",
            Sentiment::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PriceRecord {
    /// Arithmetic mean of the daily returns in `history`, percent.
    pub fn mean_return(&self) -> f64 {
        if self.history.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.history.iter().map(|p| p.daily_return).sum();
        sum / self.history.len() as f64
    }
}

impl MarketSnapshot {
    pub fn correlation(&self, a: Asset, b: Asset) -> Option<f64> {
        self.correlations.get(&a)?.get(&b).copied()
    }
}
