use crate::domain::MarketSnapshot;
use crate::generate::{LoadFailure, SnapshotSource};
use crate::render::{self, DisplaySurface, Filter};
use anyhow::Context;
use std::sync::Arc;

/// Owns the current snapshot, the active filter and the display surface, and
/// runs generate+render cycles against them.
pub struct Dashboard<S, D> {
    source: S,
    surface: D,
    snapshot: Option<Arc<MarketSnapshot>>,
    filter: Filter,
}

impl<S: SnapshotSource, D: DisplaySurface> Dashboard<S, D> {
    pub fn new(source: S, surface: D) -> Self {
        Self {
            source,
            surface,
            snapshot: None,
            filter: Filter::default(),
        }
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }

    pub fn snapshot(&self) -> Option<Arc<MarketSnapshot>> {
        self.snapshot.clone()
    }

    pub fn filter(&self) -> Filter {
        self.filter
    }

    pub fn surface(&self) -> &D {
        &self.surface
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// One full cycle: regenerate, then render. On failure the previous
    /// snapshot and whatever is on the surface stay as they were.
    pub async fn load_data(&mut self) -> Result<Arc<MarketSnapshot>, LoadFailure> {
        render::show_loading(&mut self.surface, true);

        let result = self.next_snapshot().await;
        let outcome = match result {
            Ok(snapshot) => {
                let snapshot = Arc::new(snapshot);
                self.snapshot = Some(snapshot.clone());
                self.update_dashboard();
                tracing::info!(
                    snapshot_id = %snapshot.id,
                    source = self.source.source_name(),
                    alerts = snapshot.alerts.len(),
                    opportunities = snapshot.opportunities.len(),
                    "dashboard refreshed"
                );
                Ok(snapshot)
            }
            Err(err) => {
                let failure = LoadFailure::new(self.source.source_name(), err);
                tracing::error!(error = %failure, "error loading data");
                Err(failure)
            }
        };

        render::show_loading(&mut self.surface, false);
        outcome
    }

    async fn next_snapshot(&self) -> anyhow::Result<MarketSnapshot> {
        let snapshot = self
            .source
            .generate()
            .await
            .context("snapshot generation failed")?;
        snapshot
            .validate()
            .context("generated snapshot violates invariants")?;
        Ok(snapshot)
    }

    /// Render-only pass over the current snapshot. Returns false when no
    /// snapshot has been loaded yet.
    pub fn update_dashboard(&mut self) -> bool {
        match &self.snapshot {
            Some(snapshot) => {
                render::render(snapshot, &self.filter, &mut self.surface);
                true
            }
            None => false,
        }
    }

    /// Filter change from the user: store it and re-render without regenerating.
    pub fn set_filter(&mut self, filter: Filter) -> bool {
        self.filter = filter;
        self.update_dashboard()
    }
}
