#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! The owning context for one analysis session.
//!
//! A [`Session`] wires the canonical dataset, the state store, and the query
//! sync together: it recomputes the derived views from the current state on
//! demand, tracks the map viewport reported by the rendering collaborator,
//! and guarantees the render document is released exactly once per dataset,
//! on reload and on drop.

use incident_map_analytics::{
    CategoryCount, DEFAULT_TOP_LIMIT, HourCount, TimeBucket, distinct_categories,
    filter_features, hour_distribution, time_series, top_categories,
};
use incident_map_dataset::{Dataset, RenderDocument};
use incident_map_models::{
    AppState, ExtentBounds, ExtentMode, IncidentFeature, PeriodDelta, TimeExtent,
};
use incident_map_state::{AppStore, QuerySync};

/// Current-versus-previous-period headline numbers.
#[derive(Debug, Clone, PartialEq)]
pub struct KpiSnapshot {
    /// Features in the current window.
    pub total: u64,
    /// Features in the preceding window of the same length.
    pub previous_total: u64,
    /// Distinct categories in the current window.
    pub category_count: u64,
    /// Distinct categories in the preceding window.
    pub previous_category_count: u64,
    /// The current window.
    pub window: TimeExtent,
    /// The preceding window.
    pub previous_window: TimeExtent,
    /// Total change; `None` when the previous total is zero.
    pub total_delta: Option<PeriodDelta>,
    /// Category-count change; `None` when the previous count is zero.
    pub category_delta: Option<PeriodDelta>,
}

/// Everything the rendering collaborators consume, recomputed from one state
/// snapshot. Computing it twice from the same state yields identical output.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedViews {
    /// Features passing the current filters and window.
    pub features: Vec<IncidentFeature>,
    /// Sparse time-bucketed counts at the current granularity.
    pub series: Vec<TimeBucket>,
    /// Ranked category counts, truncated to the default limit.
    pub top_categories: Vec<CategoryCount>,
    /// 24-bucket hour-of-day histogram.
    pub hours: Vec<HourCount>,
    /// Current/previous period comparison.
    pub kpi: KpiSnapshot,
}

/// One loaded dataset plus the state driving every view of it.
#[derive(Debug)]
pub struct Session {
    dataset: Dataset,
    store: AppStore,
    sync: QuerySync,
    view_bounds: Option<ExtentBounds>,
}

impl Session {
    /// Creates a session over a freshly normalized dataset, decoding the
    /// initial state from `query` when one is supplied (the only decode the
    /// session ever performs).
    #[must_use]
    pub fn new(dataset: Dataset, query: Option<&str>) -> Self {
        let global = *dataset.extent();
        let initial = query.map_or_else(
            || AppState::with_defaults(&global),
            |query| incident_map_state::decode(query, &global),
        );
        Self {
            dataset,
            store: AppStore::new(initial, global),
            sync: QuerySync::new(),
            view_bounds: None,
        }
    }

    /// The canonical dataset.
    #[must_use]
    pub const fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Read-only view of the state store.
    #[must_use]
    pub const fn store(&self) -> &AppStore {
        &self.store
    }

    /// Mutable access to the store for running transitions.
    pub const fn store_mut(&mut self) -> &mut AppStore {
        &mut self.store
    }

    /// The render document for the map collaborator.
    #[must_use]
    pub const fn render_document(&self) -> &RenderDocument {
        self.dataset.document()
    }

    /// Records the viewport bounds reported by the map. Consumed by the
    /// filter only while the extent mode is `view`.
    pub const fn set_view_bounds(&mut self, bounds: Option<ExtentBounds>) {
        self.view_bounds = bounds;
    }

    /// The last viewport bounds reported, if any.
    #[must_use]
    pub const fn view_bounds(&self) -> Option<&ExtentBounds> {
        self.view_bounds.as_ref()
    }

    /// Encodes the current state for the address bar; `None` when the last
    /// handed-out query is still current.
    pub fn sync_query(&mut self) -> Option<String> {
        self.sync
            .sync(self.store.state(), self.store.global_extent())
    }

    /// Recomputes every derived view from the current state snapshot.
    #[must_use]
    pub fn derive(&self) -> DerivedViews {
        let state = self.store.state();
        let bounds = (state.filters.extent_mode == ExtentMode::View)
            .then_some(self.view_bounds.as_ref())
            .flatten();

        let features = filter_features(
            self.dataset.features(),
            &state.filters,
            &state.time_extent,
            bounds,
        );
        let previous_window = state.time_extent.previous_period();
        let previous = filter_features(
            self.dataset.features(),
            &state.filters,
            &previous_window,
            bounds,
        );

        let total = features.len() as u64;
        let previous_total = previous.len() as u64;
        let category_count = distinct_categories(&features) as u64;
        let previous_category_count = distinct_categories(&previous) as u64;

        let kpi = KpiSnapshot {
            total,
            previous_total,
            category_count,
            previous_category_count,
            window: state.time_extent,
            previous_window,
            total_delta: PeriodDelta::between(total, previous_total),
            category_delta: PeriodDelta::between(category_count, previous_category_count),
        };

        DerivedViews {
            series: time_series(&features, state.time_step),
            top_categories: top_categories(&features, DEFAULT_TOP_LIMIT),
            hours: hour_distribution(&features),
            features,
            kpi,
        }
    }

    /// Swaps in a reloaded dataset.
    ///
    /// The outgoing dataset's render document is released before the swap,
    /// and the current window is re-clamped into the new global extent.
    pub fn replace_dataset(&mut self, dataset: Dataset) {
        log::info!("replacing dataset, releasing outgoing render document");
        self.dataset.release_document();
        let global = *dataset.extent();
        self.dataset = dataset;
        self.store.set_global_extent(global);
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        // Release the final dataset's document; reloads released earlier ones.
        if !self.dataset.document().is_released() {
            self.dataset.release_document();
        }
    }
}
