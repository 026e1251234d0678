//! Dashboard page served at `/`.
//!
//! The server renders every region; the page script only fetches the view,
//! copies it onto the DOM and rebuilds the Chart.js charts.

use marketdash_core::domain::{Asset, Timeframe};
use marketdash_core::render::{ChartSlot, Region};
use std::time::Duration;

const STYLES: &str = r#"
    body { font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", sans-serif; margin: 0; background: #f4f6f8; color: #2c3e50; }
    header { display: flex; justify-content: space-between; align-items: center; padding: 16px 24px; background: #2c3e50; color: #fff; }
    header .controls { display: flex; gap: 8px; }
    .grid { display: grid; grid-template-columns: repeat(auto-fit, minmax(320px, 1fr)); gap: 16px; padding: 16px 24px; }
    .card { background: #fff; border-radius: 8px; padding: 16px; box-shadow: 0 1px 3px rgba(0,0,0,0.1); }
    .card h3 { margin-top: 0; }
    .chart-box { position: relative; height: 300px; }
    .sentiment-indicator { font-size: 1.5em; font-weight: bold; }
    .sentiment-indicator.bullish { color: #27ae60; }
    .sentiment-indicator.bearish { color: #c0392b; }
    .sentiment-indicator.neutral { color: #7f8c8d; }
    .alert-item { background: #fdecea; border-left: 4px solid #e74c3c; padding: 6px 10px; margin: 4px 0; }
    .opportunity-item { list-style: none; margin-bottom: 8px; }
    .confidence-bar { background: #ecf0f1; border-radius: 4px; height: 6px; overflow: hidden; margin-top: 4px; }
    .confidence-fill { background: #3498db; height: 100%; }
    .data-grid { display: grid; grid-template-columns: repeat(auto-fill, minmax(140px, 1fr)); gap: 8px; }
    .data-item, .prediction-item { border: 1px solid #ecf0f1; border-radius: 6px; padding: 8px; }
    .data-item h4, .prediction-item h4 { margin: 0 0 4px 0; }
    .data-value { font-size: 1.2em; font-weight: bold; }
    .positive { color: #27ae60; }
    .negative { color: #c0392b; }
    .prediction-values { display: flex; justify-content: space-between; font-size: 0.9em; }
    .correlation-table { border-collapse: collapse; font-size: 0.8em; width: 100%; }
    .correlation-table th, .correlation-table td { padding: 4px; text-align: center; border: 1px solid #ecf0f1; }
    .corr-high { background: #f5b7b1; }
    .corr-medium { background: #fad7a0; }
    .corr-low { background: #d5f5e3; }
    #loadingIndicator { padding: 48px; text-align: center; }
"#;

const SCRIPT: &str = r#"
const charts = {};

function currentQuery() {
    const asset = document.getElementById('assetSelect').value;
    const timeFrame = document.getElementById('timeFrame').value;
    return `asset=${encodeURIComponent(asset)}&timeframe=${encodeURIComponent(timeFrame)}`;
}

async function loadView() {
    try {
        const res = await fetch(`/api/dashboard?${currentQuery()}`);
        if (res.status === 503) {
            setTimeout(loadView, 1000);
            return;
        }
        if (!res.ok) {
            console.error('Error loading dashboard:', res.status, await res.text());
            return;
        }
        const body = await res.json();
        applyView(body.view);
        document.getElementById('refreshTime').textContent =
            `Updated ${new Date(body.generated_at).toLocaleTimeString()}`;
    } catch (error) {
        console.error('Error loading dashboard:', error);
    }
}

function applyView(view) {
    for (const [id, state] of Object.entries(view.regions)) {
        const el = document.getElementById(id);
        if (!el) continue;
        if (state.html !== undefined) el.innerHTML = state.html;
        if (state.visible !== undefined) el.style.display = state.visible ? 'block' : 'none';
        if (state.className !== undefined) el.className = state.className;
    }

    for (const [id, config] of Object.entries(view.charts)) {
        if (charts[id]) {
            charts[id].destroy();
        }
        const tooltips = config.data.datasets.some(ds => ds.tooltips);
        if (tooltips) {
            config.options.plugins.tooltip = {
                callbacks: { label: ctx => ctx.dataset.tooltips[ctx.dataIndex] }
            };
        }
        charts[id] = new Chart(document.getElementById(id).getContext('2d'), config);
    }
}

async function refreshData() {
    const response = await fetch('/api/refresh', { method: 'POST' });
    if (!response.ok) {
        console.error('Refresh failed:', response.status);
    }
    loadView();
}

document.addEventListener('DOMContentLoaded', function() {
    document.getElementById('assetSelect').addEventListener('change', loadView);
    document.getElementById('timeFrame').addEventListener('change', loadView);
    loadView();
    setInterval(loadView, REFRESH_MS);
});
"#;

fn asset_options() -> String {
    std::iter::once(r#"<option value="all">All assets</option>"#.to_string())
        .chain(
            Asset::ALL
                .iter()
                .map(|a| format!(r#"<option value="{a}">{a}</option>"#)),
        )
        .collect()
}

fn timeframe_options() -> String {
    Timeframe::ALL
        .iter()
        .map(|tf| {
            let selected = if *tf == Timeframe::default() { " selected" } else { "" };
            format!(
                r#"<option value="{tf}"{selected}>{}</option>"#,
                tf.as_str().to_ascii_uppercase()
            )
        })
        .collect()
}

fn card(title: &str, body: &str) -> String {
    format!(r#"<div class="card"><h3>{title}</h3>{body}</div>"#)
}

fn chart_card(title: &str, canvas_id: &str) -> String {
    card(
        title,
        &format!(r#"<div class="chart-box"><canvas id="{canvas_id}"></canvas></div>"#),
    )
}

fn body() -> String {
    let panels = [
        card(
            "Market Sentiment",
            &format!(r#"<div id="{}" class="sentiment-indicator">--</div>"#, Region::SentimentIndicator.id()),
        ),
        card(
            "Trading Opportunities",
            &format!(r#"<ul id="{}"></ul>"#, Region::OpportunitiesList.id()),
        ),
        card(
            "Real-Time Prices",
            &format!(r#"<div id="{}" class="data-grid"></div>"#, Region::RealTimeData.id()),
        ),
        card(
            "AI vs Traditional Predictions",
            &format!(r#"<div id="{}" class="data-grid"></div>"#, Region::PredictionComparison.id()),
        ),
        card(
            "Correlation Matrix",
            &format!(r#"<div id="{}"></div>"#, Region::CorrelationMatrix.id()),
        ),
        chart_card("Price History", ChartSlot::PriceHistory.canvas_id()),
        chart_card("Volatility", ChartSlot::Volatility.canvas_id()),
        chart_card("Daily Returns", ChartSlot::Returns.canvas_id()),
        chart_card("Risk vs Return", ChartSlot::RiskReturn.canvas_id()),
    ]
    .concat();

    format!(
        r#"
    <header>
        <div>
            <h1>AI-Enhanced Market Dashboard</h1>
            <span id="refreshTime">Loading...</span>
        </div>
        <div class="controls">
            <select id="assetSelect">{assets}</select>
            <select id="timeFrame">{timeframes}</select>
            <button onclick="refreshData()">Refresh</button>
        </div>
    </header>
    <div id="{loading}">Loading market data...</div>
    <div id="{content}" style="display: none">
        <div id="{alerts_container}" class="card" style="display: none; margin: 16px 24px 0">
            <h3>Alerts</h3>
            <div id="{alerts_list}"></div>
        </div>
        <div class="grid">{panels}</div>
    </div>
"#,
        assets = asset_options(),
        timeframes = timeframe_options(),
        loading = Region::LoadingIndicator.id(),
        content = Region::DashboardContent.id(),
        alerts_container = Region::AlertsContainer.id(),
        alerts_list = Region::AlertsList.id(),
        panels = panels,
    )
}

pub fn dashboard_html(refresh: Duration) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>AI-Enhanced Market Dashboard</title>
    <script src="https://cdn.jsdelivr.net/npm/chart.js@4"></script>
    <script src="https://cdn.jsdelivr.net/npm/chartjs-adapter-date-fns@3/dist/chartjs-adapter-date-fns.bundle.min.js"></script>
    <style>
{css}
    </style>
</head>
<body>
{html}
    <script>
const REFRESH_MS = {refresh_ms};
{js}
    </script>
</body>
</html>"#,
        css = STYLES,
        html = body(),
        refresh_ms = refresh.as_millis(),
        js = SCRIPT
    )
}
