use crate::domain::{Asset, AssetSelection, MarketSnapshot};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};

pub const PALETTE: [&str; 8] = [
    "#3498db", "#e74c3c", "#2ecc71", "#f39c12", "#9b59b6", "#1abc9c", "#e67e22", "#34495e",
];

fn color(i: usize) -> String {
    PALETTE[i % PALETTE.len()].to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Line,
    Bar,
    Scatter,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimePoint {
    pub x: DateTime<Utc>,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct XyPoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SeriesData {
    Values(Vec<f64>),
    Timed(Vec<TimePoint>),
    Xy(Vec<XyPoint>),
}

impl SeriesData {
    pub fn len(&self) -> usize {
        match self {
            SeriesData::Values(v) => v.len(),
            SeriesData::Timed(v) => v.len(),
            SeriesData::Xy(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Colors {
    One(String),
    PerPoint(Vec<String>),
}

/// One Chart.js dataset. Field names follow the Chart.js dataset schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub label: String,
    pub data: SeriesData,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_color: Option<String>,
    pub background_color: Colors,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tension: Option<f64>,
    /// Hover text per point; read by the page's tooltip callback.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tooltips: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
    pub show_legend: bool,
    pub time_x_axis: bool,
    pub x_title: Option<&'static str>,
    pub y_title: Option<&'static str>,
}

impl ChartSpec {
    fn new(kind: ChartKind) -> Self {
        Self {
            kind,
            labels: Vec::new(),
            datasets: Vec::new(),
            show_legend: false,
            time_x_axis: false,
            x_title: None,
            y_title: None,
        }
    }

    pub fn series_labels(&self) -> Vec<&str> {
        self.datasets.iter().map(|d| d.label.as_str()).collect()
    }

    /// Full Chart.js configuration object (`type`, `data`, `options`).
    pub fn to_chartjs(&self) -> Value {
        let mut data = json!({ "datasets": self.datasets });
        if !self.labels.is_empty() {
            data["labels"] = json!(self.labels);
        }

        let mut options = json!({
            "responsive": true,
            "maintainAspectRatio": false,
            "plugins": { "legend": { "display": self.show_legend } },
        });

        let mut scales = serde_json::Map::new();
        if self.time_x_axis {
            scales.insert(
                "x".to_string(),
                json!({ "type": "time", "time": { "unit": "day" } }),
            );
            scales.insert("y".to_string(), json!({ "beginAtZero": false }));
        }
        if let Some(title) = self.x_title {
            scales.insert("x".to_string(), json!({ "title": { "display": true, "text": title } }));
        }
        if let Some(title) = self.y_title {
            scales.insert("y".to_string(), json!({ "title": { "display": true, "text": title } }));
        }
        if !scales.is_empty() {
            options["scales"] = Value::Object(scales);
        }

        json!({
            "type": self.kind,
            "data": data,
            "options": options,
        })
    }
}

fn selected(snapshot: &MarketSnapshot, selection: AssetSelection) -> Vec<Asset> {
    selection
        .assets()
        .into_iter()
        .filter(|a| snapshot.prices.contains_key(a))
        .collect()
}

/// One line per selected asset, (date, price) over the history window.
pub fn price_history_chart(snapshot: &MarketSnapshot, selection: AssetSelection) -> ChartSpec {
    let assets = selected(snapshot, selection);
    let mut spec = ChartSpec::new(ChartKind::Line);
    spec.time_x_axis = true;
    spec.show_legend = assets.len() > 1;
    spec.datasets = assets
        .iter()
        .enumerate()
        .map(|(i, asset)| {
            let points = snapshot.prices[asset]
                .history
                .iter()
                .map(|p| TimePoint { x: p.date, y: p.price })
                .collect();
            Dataset {
                label: asset.to_string(),
                data: SeriesData::Timed(points),
                border_color: Some(color(i)),
                background_color: Colors::One(format!("{}20", color(i))),
                border_width: None,
                fill: Some(false),
                tension: Some(0.1),
                tooltips: Vec::new(),
            }
        })
        .collect();
    spec
}

/// One bar per selected asset, height = volatility.
pub fn volatility_chart(snapshot: &MarketSnapshot, selection: AssetSelection) -> ChartSpec {
    let assets = selected(snapshot, selection);
    let mut spec = ChartSpec::new(ChartKind::Bar);
    spec.labels = assets.iter().map(|a| a.to_string()).collect();
    spec.datasets = vec![Dataset {
        label: "Volatility (%)".to_string(),
        data: SeriesData::Values(assets.iter().map(|a| snapshot.prices[a].volatility).collect()),
        border_color: None,
        background_color: Colors::PerPoint((0..assets.len()).map(color).collect()),
        border_width: None,
        fill: None,
        tension: None,
        tooltips: Vec::new(),
    }];
    spec
}

/// Daily returns per selected asset, bucketed by history date.
pub fn returns_chart(snapshot: &MarketSnapshot, selection: AssetSelection) -> ChartSpec {
    let assets = selected(snapshot, selection);
    let mut spec = ChartSpec::new(ChartKind::Bar);
    spec.show_legend = assets.len() > 1;
    spec.labels = snapshot
        .prices
        .values()
        .next()
        .map(|first| {
            first
                .history
                .iter()
                .map(|p| p.date.format("%Y-%m-%d").to_string())
                .collect()
        })
        .unwrap_or_default();
    spec.datasets = assets
        .iter()
        .enumerate()
        .map(|(i, asset)| Dataset {
            label: asset.to_string(),
            data: SeriesData::Values(
                snapshot.prices[asset]
                    .history
                    .iter()
                    .map(|p| p.daily_return)
                    .collect(),
            ),
            border_color: Some(color(i)),
            background_color: Colors::One(format!("{}80", color(i))),
            border_width: Some(1),
            fill: None,
            tension: None,
            tooltips: Vec::new(),
        })
        .collect();
    spec
}

/// Volatility against mean daily return, always over the whole universe.
pub fn risk_return_chart(snapshot: &MarketSnapshot) -> ChartSpec {
    let mut points = Vec::with_capacity(snapshot.prices.len());
    let mut tooltips = Vec::with_capacity(snapshot.prices.len());
    for (asset, record) in &snapshot.prices {
        let point = XyPoint {
            x: record.volatility,
            y: record.mean_return(),
        };
        tooltips.push(format!(
            "{asset}: Risk {:.2}%, Return {:.2}%",
            point.x, point.y
        ));
        points.push(point);
    }

    let mut spec = ChartSpec::new(ChartKind::Scatter);
    spec.show_legend = true;
    spec.x_title = Some("Risk (Volatility %)");
    spec.y_title = Some("Return (%)");
    spec.datasets = vec![Dataset {
        label: "Risk vs Return".to_string(),
        background_color: Colors::PerPoint((0..points.len()).map(color).collect()),
        data: SeriesData::Xy(points),
        border_color: None,
        border_width: None,
        fill: None,
        tension: None,
        tooltips,
    }];
    spec
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::SyntheticMarket;
    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn snapshot() -> MarketSnapshot {
        let now = Utc.with_ymd_and_hms(2026, 2, 10, 15, 0, 0).unwrap();
        SyntheticMarket::generate_with(&mut StdRng::seed_from_u64(42), now)
    }

    #[test]
    fn price_chart_has_one_series_per_selected_asset() {
        let s = snapshot();
        let all = price_history_chart(&s, AssetSelection::All);
        assert_eq!(all.datasets.len(), 8);
        assert!(all.show_legend);
        assert!(all.datasets.iter().all(|d| d.data.len() == 30));

        let gold = price_history_chart(&s, AssetSelection::One(Asset::Gold));
        assert_eq!(gold.series_labels(), vec!["Gold"]);
        assert!(!gold.show_legend);
        assert_eq!(gold.datasets[0].border_color.as_deref(), Some(PALETTE[0]));
    }

    #[test]
    fn volatility_chart_bars_match_selection() {
        let s = snapshot();
        let spec = volatility_chart(&s, AssetSelection::One(Asset::Gold));
        assert_eq!(spec.labels, vec!["Gold".to_string()]);
        assert!(!spec.show_legend);
        assert_eq!(
            spec.datasets[0].data,
            SeriesData::Values(vec![s.prices[&Asset::Gold].volatility])
        );
    }

    #[test]
    fn returns_chart_uses_history_dates_as_labels() {
        let s = snapshot();
        let spec = returns_chart(&s, AssetSelection::All);
        assert_eq!(spec.labels.len(), 30);
        assert_eq!(spec.labels.last().map(String::as_str), Some("2026-02-10"));
        assert_eq!(spec.datasets.len(), 8);
        assert!(spec.show_legend);

        let single = returns_chart(&s, AssetSelection::One(Asset::Xrp));
        assert_eq!(single.series_labels(), vec!["XRP"]);
        assert!(!single.show_legend);
    }

    #[test]
    fn risk_return_ignores_selection_and_uses_mean_return() {
        let s = snapshot();
        let spec = risk_return_chart(&s);
        let ds = &spec.datasets[0];
        let SeriesData::Xy(points) = &ds.data else {
            panic!("scatter data must be xy points");
        };
        assert_eq!(points.len(), 8);

        let btc = &s.prices[&Asset::Bitcoin];
        let p = &points[Asset::Bitcoin.index()];
        assert_eq!(p.x, btc.volatility);
        assert!((p.y - btc.mean_return()).abs() < 1e-12);
        assert_eq!(
            ds.tooltips[Asset::Bitcoin.index()],
            format!("Bitcoin: Risk {:.2}%, Return {:.2}%", btc.volatility, btc.mean_return())
        );
    }

    #[test]
    fn chartjs_config_shape() {
        let s = snapshot();
        let price = price_history_chart(&s, AssetSelection::One(Asset::Sp500)).to_chartjs();
        assert_eq!(price["type"], "line");
        assert_eq!(price["options"]["scales"]["x"]["type"], "time");
        assert_eq!(price["options"]["plugins"]["legend"]["display"], false);
        assert_eq!(price["data"]["datasets"][0]["label"], "SP500");
        assert!(price["data"].get("labels").is_none());
        assert!(price["data"]["datasets"][0].get("tooltips").is_none());

        let scatter = risk_return_chart(&s).to_chartjs();
        assert_eq!(scatter["type"], "scatter");
        assert_eq!(scatter["options"]["scales"]["x"]["title"]["text"], "Risk (Volatility %)");
        assert_eq!(scatter["data"]["datasets"][0]["data"].as_array().unwrap().len(), 8);
        assert_eq!(scatter["data"]["datasets"][0]["tooltips"].as_array().unwrap().len(), 8);
    }
}
