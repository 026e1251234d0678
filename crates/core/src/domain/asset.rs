use anyhow::bail;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the eight instruments the dashboard tracks.
///
/// Variant order is the universe order: ordered maps keyed by `Asset` iterate
/// SP500 first and USD_Index last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Asset {
    #[serde(rename = "SP500")]
    Sp500,
    #[serde(rename = "Gold")]
    Gold,
    #[serde(rename = "Bitcoin")]
    Bitcoin,
    #[serde(rename = "Ethereum")]
    Ethereum,
    #[serde(rename = "XRP")]
    Xrp,
    #[serde(rename = "JPY_USD")]
    JpyUsd,
    #[serde(rename = "EUR_USD")]
    EurUsd,
    #[serde(rename = "USD_Index")]
    UsdIndex,
}

impl Asset {
    pub const ALL: [Asset; 8] = [
        Asset::Sp500,
        Asset::Gold,
        Asset::Bitcoin,
        Asset::Ethereum,
        Asset::Xrp,
        Asset::JpyUsd,
        Asset::EurUsd,
        Asset::UsdIndex,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Asset::Sp500 => "SP500",
            Asset::Gold => "Gold",
            Asset::Bitcoin => "Bitcoin",
            Asset::Ethereum => "Ethereum",
            Asset::Xrp => "XRP",
            Asset::JpyUsd => "JPY_USD",
            Asset::EurUsd => "EUR_USD",
            Asset::UsdIndex => "USD_Index",
        }
    }

    /// Quote ticker of the market this asset follows.
    pub fn market_ticker(self) -> &'static str {
        match self {
            Asset::Sp500 => "^GSPC",
            Asset::Gold => "GC=F",
            Asset::Bitcoin => "BTC-USD",
            Asset::Ethereum => "ETH-USD",
            Asset::Xrp => "XRP-USD",
            Asset::JpyUsd => "JPY=X",
            Asset::EurUsd => "EURUSD=X",
            Asset::UsdIndex => "DX-Y.NYB",
        }
    }

    /// Position in the universe, used for palette lookups.
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Asset {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match Asset::ALL.iter().find(|a| a.as_str() == s) {
            Some(asset) => Ok(*asset),
            None => bail!("unknown asset symbol: {s:?}"),
        }
    }
}

/// The asset filter control: everything, or exactly one symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AssetSelection {
    #[default]
    All,
    One(Asset),
}

impl AssetSelection {
    pub fn assets(self) -> Vec<Asset> {
        match self {
            AssetSelection::All => Asset::ALL.to_vec(),
            AssetSelection::One(asset) => vec![asset],
        }
    }
}

impl fmt::Display for AssetSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetSelection::All => f.write_str("all"),
            AssetSelection::One(asset) => f.write_str(asset.as_str()),
        }
    }
}

impl FromStr for AssetSelection {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s == "all" {
            return Ok(AssetSelection::All);
        }
        Ok(AssetSelection::One(s.parse()?))
    }
}

impl Serialize for AssetSelection {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AssetSelection {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Chart timeframe selector. Carried through filters but not applied to any
/// rendered output yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "1d")]
    OneDay,
    #[serde(rename = "1w")]
    OneWeek,
    #[default]
    #[serde(rename = "1m")]
    OneMonth,
    #[serde(rename = "3m")]
    ThreeMonths,
    #[serde(rename = "1y")]
    OneYear,
}

impl Timeframe {
    pub const ALL: [Timeframe; 5] = [
        Timeframe::OneDay,
        Timeframe::OneWeek,
        Timeframe::OneMonth,
        Timeframe::ThreeMonths,
        Timeframe::OneYear,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Timeframe::OneDay => "1d",
            Timeframe::OneWeek => "1w",
            Timeframe::OneMonth => "1m",
            Timeframe::ThreeMonths => "3m",
            Timeframe::OneYear => "1y",
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        match Timeframe::ALL.iter().find(|t| t.as_str() == lower) {
            Some(tf) => Ok(*tf),
            None => bail!("unknown timeframe: {s:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbols_round_trip_through_from_str() {
        for asset in Asset::ALL {
            assert_eq!(asset.as_str().parse::<Asset>().unwrap(), asset);
        }
        assert!("DOGE".parse::<Asset>().is_err());
        assert!("gold".parse::<Asset>().is_err());
    }

    #[test]
    fn market_tickers_cover_the_universe() {
        let tickers: Vec<_> = Asset::ALL.iter().map(|a| a.market_ticker()).collect();
        assert_eq!(
            tickers,
            ["^GSPC", "GC=F", "BTC-USD", "ETH-USD", "XRP-USD", "JPY=X", "EURUSD=X", "DX-Y.NYB"]
        );
    }

    #[test]
    fn ordering_follows_universe_order() {
        let mut shuffled = vec![Asset::UsdIndex, Asset::Gold, Asset::Sp500, Asset::Xrp];
        shuffled.sort();
        assert_eq!(
            shuffled,
            vec![Asset::Sp500, Asset::Gold, Asset::Xrp, Asset::UsdIndex]
        );
        assert_eq!(Asset::UsdIndex.index(), 7);
    }

    #[test]
    fn serializes_as_symbol_including_map_keys() {
        assert_eq!(serde_json::to_string(&Asset::JpyUsd).unwrap(), "\"JPY_USD\"");

        let mut m = std::collections::BTreeMap::new();
        m.insert(Asset::UsdIndex, 1);
        assert_eq!(serde_json::to_string(&m).unwrap(), "{\"USD_Index\":1}");
    }

    #[test]
    fn selection_parses_all_and_symbols() {
        assert_eq!("all".parse::<AssetSelection>().unwrap(), AssetSelection::All);
        assert_eq!("".parse::<AssetSelection>().unwrap(), AssetSelection::All);
        assert_eq!(
            "Gold".parse::<AssetSelection>().unwrap(),
            AssetSelection::One(Asset::Gold)
        );
        assert!("Silver".parse::<AssetSelection>().is_err());

        assert_eq!(AssetSelection::All.assets().len(), 8);
        assert_eq!(AssetSelection::One(Asset::Xrp).assets(), vec![Asset::Xrp]);
    }

    #[test]
    fn timeframe_parses_case_insensitively_and_defaults_to_one_month() {
        assert_eq!("3M".parse::<Timeframe>().unwrap(), Timeframe::ThreeMonths);
        assert_eq!("1y".parse::<Timeframe>().unwrap(), Timeframe::OneYear);
        assert!("5y".parse::<Timeframe>().is_err());
        assert_eq!(Timeframe::default(), Timeframe::OneMonth);
    }
}
