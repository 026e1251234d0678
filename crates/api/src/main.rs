use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Html,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use marketdash_core::domain::{AssetSelection, MarketSnapshot, Timeframe};
use marketdash_core::generate::{SnapshotSource, SyntheticMarket};
use marketdash_core::render::{Filter, MemorySurface, SurfaceView};
use marketdash_core::schedule::{RefreshRequest, RefreshScheduler, RefreshTrigger};
use marketdash_core::Dashboard;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

mod page;

type SharedDashboard = Arc<Mutex<Dashboard<SyntheticMarket, MemorySurface>>>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = marketdash_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let source = SyntheticMarket::from_seed(settings.market_seed);
    if let Some(seed) = source.seed() {
        tracing::info!(seed, "synthetic market seeded");
    }
    let dashboard: SharedDashboard = Arc::new(Mutex::new(Dashboard::new(source, MemorySurface::new())));

    let cycle_dashboard = dashboard.clone();
    let scheduler = RefreshScheduler::spawn(settings.refresh_interval, move |trigger| {
        let dashboard = cycle_dashboard.clone();
        async move {
            let mut dashboard = dashboard.lock().await;
            if let Err(failure) = dashboard.load_data().await {
                sentry_anyhow::capture_anyhow(&failure.cause);
                tracing::warn!(?trigger, "dashboard left on last snapshot");
            }
        }
    })?;

    let state = AppState {
        dashboard,
        refresh: scheduler.trigger(),
        refresh_interval: settings.refresh_interval,
    };

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], settings.port));
    tracing::info!(%addr, "api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scheduler.cancel().await?;
    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_page))
        .route("/healthz", get(healthz))
        .route("/api/dashboard", get(get_dashboard_view))
        .route("/api/snapshot", get(get_latest_snapshot))
        .route("/api/refresh", post(post_refresh))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Clone)]
struct AppState {
    dashboard: SharedDashboard,
    refresh: RefreshTrigger,
    refresh_interval: Duration,
}

async fn index_page(State(state): State<AppState>) -> Html<String> {
    Html(page::dashboard_html(state.refresh_interval))
}

#[derive(Debug, Default, Deserialize)]
struct FilterQuery {
    asset: Option<String>,
    timeframe: Option<String>,
}

impl FilterQuery {
    fn into_filter(self) -> anyhow::Result<Filter> {
        let mut filter = Filter::default();
        if let Some(asset) = self.asset {
            filter.asset = asset.parse::<AssetSelection>()?;
        }
        if let Some(timeframe) = self.timeframe {
            filter.timeframe = timeframe.parse::<Timeframe>()?;
        }
        Ok(filter)
    }
}

#[derive(Debug, Serialize)]
struct ApiView {
    snapshot_id: Uuid,
    generated_at: DateTime<Utc>,
    filter: Filter,
    view: SurfaceView,
}

async fn get_dashboard_view(
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> Result<Json<ApiView>, (StatusCode, String)> {
    let filter = query
        .into_filter()
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    let mut dashboard = state.dashboard.lock().await;
    let Some(snapshot) = dashboard.snapshot() else {
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            "market data not loaded yet".to_string(),
        ));
    };

    dashboard.set_filter(filter);

    Ok(Json(ApiView {
        snapshot_id: snapshot.id,
        generated_at: snapshot.generated_at,
        filter,
        view: dashboard.surface().view(),
    }))
}

#[derive(Debug, Serialize)]
struct ApiSnapshot {
    snapshot_id: Uuid,
    source: &'static str,
    snapshot: MarketSnapshot,
}

async fn get_latest_snapshot(
    State(state): State<AppState>,
) -> Result<Json<ApiSnapshot>, StatusCode> {
    let dashboard = state.dashboard.lock().await;
    let snapshot = dashboard
        .snapshot()
        .ok_or(StatusCode::SERVICE_UNAVAILABLE)?;

    Ok(Json(ApiSnapshot {
        snapshot_id: snapshot.id,
        source: dashboard.source().source_name(),
        snapshot: snapshot.as_ref().clone(),
    }))
}

#[derive(Debug, Serialize)]
struct ApiRefresh {
    refreshed: bool,
    coalesced: bool,
}

/// Responds once a cycle started after the request has finished, so a reload
/// right after this returns sees the new snapshot.
async fn post_refresh(State(state): State<AppState>) -> Result<(StatusCode, Json<ApiRefresh>), StatusCode> {
    let request = state.refresh.refresh_and_wait().await;
    if request == RefreshRequest::Stopped {
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    }

    let coalesced = request == RefreshRequest::Coalesced;
    tracing::info!(coalesced, "manual refresh completed");
    Ok((
        StatusCode::OK,
        Json(ApiRefresh {
            refreshed: true,
            coalesced,
        }),
    ))
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown requested");
}

fn init_sentry(settings: &marketdash_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
