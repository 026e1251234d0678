use crate::render::charts::ChartSpec;
use serde::Serialize;
use std::collections::BTreeMap;

/// Named display regions, serialized as their DOM element ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Region {
    LoadingIndicator,
    DashboardContent,
    SentimentIndicator,
    AlertsContainer,
    AlertsList,
    OpportunitiesList,
    RealTimeData,
    PredictionComparison,
    CorrelationMatrix,
}

impl Region {
    pub fn id(self) -> &'static str {
        match self {
            Region::LoadingIndicator => "loadingIndicator",
            Region::DashboardContent => "dashboardContent",
            Region::SentimentIndicator => "sentimentIndicator",
            Region::AlertsContainer => "alertsContainer",
            Region::AlertsList => "alertsList",
            Region::OpportunitiesList => "opportunitiesList",
            Region::RealTimeData => "realTimeData",
            Region::PredictionComparison => "predictionComparison",
            Region::CorrelationMatrix => "correlationMatrix",
        }
    }
}

/// The four chart canvases, serialized as their canvas ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum ChartSlot {
    #[serde(rename = "priceChart")]
    PriceHistory,
    #[serde(rename = "volatilityChart")]
    Volatility,
    #[serde(rename = "returnsChart")]
    Returns,
    #[serde(rename = "riskReturnChart")]
    RiskReturn,
}

impl ChartSlot {
    pub const ALL: [ChartSlot; 4] = [
        ChartSlot::PriceHistory,
        ChartSlot::Volatility,
        ChartSlot::Returns,
        ChartSlot::RiskReturn,
    ];

    pub fn canvas_id(self) -> &'static str {
        match self {
            ChartSlot::PriceHistory => "priceChart",
            ChartSlot::Volatility => "volatilityChart",
            ChartSlot::Returns => "returnsChart",
            ChartSlot::RiskReturn => "riskReturnChart",
        }
    }
}

/// Write-only display target the renderer pushes into.
pub trait DisplaySurface {
    fn set_html(&mut self, region: Region, html: String);

    fn set_visible(&mut self, region: Region, visible: bool);

    fn set_class(&mut self, region: Region, class: String);

    /// Disposes whatever chart is live in `slot`. No-op when the slot is empty.
    fn destroy_chart(&mut self, slot: ChartSlot);

    fn bind_chart(&mut self, slot: ChartSlot, spec: ChartSpec);
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RegionState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    #[serde(rename = "className", skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
}

/// Surface kept in memory. The api crate ships its `view()` to the browser,
/// which mirrors it onto the DOM.
#[derive(Debug, Clone, Default)]
pub struct MemorySurface {
    regions: BTreeMap<Region, RegionState>,
    charts: BTreeMap<ChartSlot, ChartSpec>,
    destroyed: u64,
    stale_binds: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SurfaceView {
    pub regions: BTreeMap<Region, RegionState>,
    pub charts: BTreeMap<ChartSlot, serde_json::Value>,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn region(&self, region: Region) -> Option<&RegionState> {
        self.regions.get(&region)
    }

    pub fn html(&self, region: Region) -> Option<&str> {
        self.regions.get(&region)?.html.as_deref()
    }

    pub fn is_visible(&self, region: Region) -> Option<bool> {
        self.regions.get(&region)?.visible
    }

    pub fn class(&self, region: Region) -> Option<&str> {
        self.regions.get(&region)?.class.as_deref()
    }

    pub fn chart(&self, slot: ChartSlot) -> Option<&ChartSpec> {
        self.charts.get(&slot)
    }

    pub fn live_charts(&self) -> usize {
        self.charts.len()
    }

    /// Number of charts disposed so far.
    pub fn destroyed_charts(&self) -> u64 {
        self.destroyed
    }

    /// Binds that landed on a slot whose previous chart was never destroyed.
    pub fn stale_binds(&self) -> u64 {
        self.stale_binds
    }

    pub fn view(&self) -> SurfaceView {
        SurfaceView {
            regions: self.regions.clone(),
            charts: self
                .charts
                .iter()
                .map(|(slot, spec)| (*slot, spec.to_chartjs()))
                .collect(),
        }
    }
}

impl DisplaySurface for MemorySurface {
    fn set_html(&mut self, region: Region, html: String) {
        self.regions.entry(region).or_default().html = Some(html);
    }

    fn set_visible(&mut self, region: Region, visible: bool) {
        self.regions.entry(region).or_default().visible = Some(visible);
    }

    fn set_class(&mut self, region: Region, class: String) {
        self.regions.entry(region).or_default().class = Some(class);
    }

    fn destroy_chart(&mut self, slot: ChartSlot) {
        if self.charts.remove(&slot).is_some() {
            self.destroyed += 1;
        }
    }

    fn bind_chart(&mut self, slot: ChartSlot, spec: ChartSpec) {
        if self.charts.insert(slot, spec).is_some() {
            tracing::warn!(canvas = slot.canvas_id(), "chart bound over a live chart");
            self.stale_binds += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_ids_match_serialized_keys() {
        for region in [
            Region::LoadingIndicator,
            Region::AlertsList,
            Region::CorrelationMatrix,
        ] {
            assert_eq!(
                serde_json::to_value(region).unwrap(),
                serde_json::Value::String(region.id().to_string())
            );
        }
        for slot in ChartSlot::ALL {
            assert_eq!(
                serde_json::to_value(slot).unwrap(),
                serde_json::Value::String(slot.canvas_id().to_string())
            );
        }
    }

    #[test]
    fn region_writes_merge() {
        let mut s = MemorySurface::new();
        s.set_html(Region::AlertsList, "<div></div>".to_string());
        s.set_visible(Region::AlertsList, false);
        let state = s.region(Region::AlertsList).unwrap();
        assert_eq!(state.html.as_deref(), Some("<div></div>"));
        assert_eq!(state.visible, Some(false));
        assert_eq!(state.class, None);
        assert_eq!(s.html(Region::RealTimeData), None);
    }

    #[test]
    fn destroy_on_empty_slot_is_noop() {
        let mut s = MemorySurface::new();
        s.destroy_chart(ChartSlot::Returns);
        assert_eq!(s.destroyed_charts(), 0);
        assert_eq!(s.live_charts(), 0);
    }
}
