pub mod charts;
pub mod format;
pub mod panels;
pub mod surface;

use crate::domain::{AssetSelection, MarketSnapshot, Timeframe};
use serde::{Deserialize, Serialize};

pub use charts::ChartSpec;
pub use surface::{ChartSlot, DisplaySurface, MemorySurface, Region, SurfaceView};

/// User filter controls. `timeframe` is accepted but no panel or chart reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Filter {
    pub asset: AssetSelection,
    pub timeframe: Timeframe,
}

/// Pushes every panel and chart for `snapshot` into `surface`.
pub fn render<D: DisplaySurface + ?Sized>(snapshot: &MarketSnapshot, filter: &Filter, surface: &mut D) {
    tracing::debug!(
        snapshot_id = %snapshot.id,
        asset = %filter.asset,
        timeframe = %filter.timeframe,
        "rendering dashboard"
    );

    render_sentiment(snapshot, surface);
    render_alerts(snapshot, surface);
    surface.set_html(
        Region::OpportunitiesList,
        panels::opportunities_list(&snapshot.opportunities),
    );
    surface.set_html(Region::RealTimeData, panels::real_time_data(snapshot));
    surface.set_html(
        Region::PredictionComparison,
        panels::prediction_comparison(snapshot),
    );
    surface.set_html(Region::CorrelationMatrix, panels::correlation_table(snapshot));
    render_charts(snapshot, filter.asset, surface);
}

fn render_sentiment<D: DisplaySurface + ?Sized>(snapshot: &MarketSnapshot, surface: &mut D) {
    let view = panels::sentiment(snapshot);
    surface.set_html(Region::SentimentIndicator, view.text);
    surface.set_class(Region::SentimentIndicator, view.class);
}

fn render_alerts<D: DisplaySurface + ?Sized>(snapshot: &MarketSnapshot, surface: &mut D) {
    surface.set_visible(Region::AlertsContainer, !snapshot.alerts.is_empty());
    surface.set_html(Region::AlertsList, panels::alerts_list(&snapshot.alerts));
}

/// Charts are torn down and rebuilt on every call, never patched in place.
pub fn render_charts<D: DisplaySurface + ?Sized>(
    snapshot: &MarketSnapshot,
    selection: AssetSelection,
    surface: &mut D,
) {
    let specs = [
        (
            ChartSlot::PriceHistory,
            charts::price_history_chart(snapshot, selection),
        ),
        (
            ChartSlot::Volatility,
            charts::volatility_chart(snapshot, selection),
        ),
        (ChartSlot::Returns, charts::returns_chart(snapshot, selection)),
        (ChartSlot::RiskReturn, charts::risk_return_chart(snapshot)),
    ];

    for (slot, spec) in specs {
        surface.destroy_chart(slot);
        surface.bind_chart(slot, spec);
    }
}

/// Toggles the loading indicator against the main content container.
pub fn show_loading<D: DisplaySurface + ?Sized>(surface: &mut D, loading: bool) {
    surface.set_visible(Region::LoadingIndicator, loading);
    surface.set_visible(Region::DashboardContent, !loading);
}
