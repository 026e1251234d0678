use crate::domain::{Asset, MarketSnapshot, Opportunity};
use crate::render::format::{bar_width, capitalize, currency, signed_pct, CorrelationBand};
use std::fmt::Write;

pub const MAX_OPPORTUNITIES: usize = 5;
pub const NO_OPPORTUNITIES: &str = "<li>No significant opportunities detected</li>";

pub struct SentimentView {
    pub text: String,
    pub class: String,
}

pub fn sentiment(snapshot: &MarketSnapshot) -> SentimentView {
    let label = snapshot.sentiment.as_str();
    SentimentView {
        text: capitalize(label),
        class: format!("sentiment-indicator {label}"),
    }
}

pub fn alerts_list(alerts: &[String]) -> String {
    alerts
        .iter()
        .map(|alert| format!("<div class=\"alert-item\">{alert}</div>"))
        .collect()
}

/// Highest-confidence opportunities first; ties keep generation order.
pub fn top_opportunities(opportunities: &[Opportunity]) -> Vec<&Opportunity> {
    let mut ranked: Vec<&Opportunity> = opportunities.iter().collect();
    ranked.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    ranked.truncate(MAX_OPPORTUNITIES);
    ranked
}

fn confidence_bar(confidence: f64) -> String {
    format!(
        "<div class=\"confidence-bar\"><div class=\"confidence-fill\" style=\"width: {}\"></div></div>",
        bar_width(confidence)
    )
}

pub fn opportunities_list(opportunities: &[Opportunity]) -> String {
    let top = top_opportunities(opportunities);
    if top.is_empty() {
        return NO_OPPORTUNITIES.to_string();
    }

    let mut html = String::new();
    for opp in top {
        let _ = write!(
            html,
            "<li class=\"opportunity-item\"><strong>{}</strong>: {}{}</li>",
            opp.asset,
            signed_pct(opp.prediction),
            confidence_bar(opp.confidence)
        );
    }
    html
}

pub fn real_time_data(snapshot: &MarketSnapshot) -> String {
    let mut html = String::new();
    for (asset, record) in &snapshot.prices {
        let direction = if record.change >= 0.0 { "positive" } else { "negative" };
        let _ = write!(
            html,
            "<div class=\"data-item\"><h4 title=\"{}\">{asset}</h4>\
             <div class=\"data-value\">{}</div>\
             <div class=\"data-change {direction}\">{}</div></div>",
            asset.market_ticker(),
            currency(record.current),
            signed_pct(record.change)
        );
    }
    html
}

pub fn prediction_comparison(snapshot: &MarketSnapshot) -> String {
    let mut html = String::new();
    for (asset, pred) in &snapshot.predictions {
        let _ = write!(
            html,
            "<div class=\"prediction-item\"><h4>{asset}</h4>\
             <div class=\"prediction-values\">\
             <span class=\"ai-prediction\">AI: {}</span>\
             <span class=\"traditional-prediction\">Trad: {}</span>\
             </div>{}</div>",
            signed_pct(pred.ai),
            signed_pct(pred.traditional),
            confidence_bar(pred.confidence)
        );
    }
    html
}

pub fn correlation_table(snapshot: &MarketSnapshot) -> String {
    let assets: Vec<Asset> = snapshot.correlations.keys().copied().collect();

    let mut html = String::from("<table class=\"correlation-table\"><tr><th></th>");
    for asset in &assets {
        let _ = write!(html, "<th>{asset}</th>");
    }
    html.push_str("</tr>");

    for row_asset in &assets {
        let _ = write!(html, "<tr><th>{row_asset}</th>");
        for col_asset in &assets {
            let value = snapshot
                .correlation(*row_asset, *col_asset)
                .unwrap_or_default();
            let band = CorrelationBand::classify(value);
            let _ = write!(html, "<td class=\"{}\">{value:.2}</td>", band.css_class());
        }
        html.push_str("</tr>");
    }

    html.push_str("</table>");
    html
}
