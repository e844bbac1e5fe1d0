//! The state store and its named transitions.

use incident_map_models::{
    AppState, ExtentMode, FilterState, Lang, TimeExtent, TimeStep,
};

/// Owns the application state and the transitions that mutate it.
///
/// There is no global instance: the owning context constructs a store and
/// threads it explicitly. Each transition produces the next state atomically
/// and reports whether anything observable changed; the version counter only
/// moves on real changes, so downstream recomputation and query-string
/// writes can key off it.
#[derive(Debug, Clone, PartialEq)]
pub struct AppStore {
    state: AppState,
    global_extent: TimeExtent,
    version: u64,
}

impl AppStore {
    /// Creates a store over `initial`, clamping its window into
    /// `global_extent`.
    #[must_use]
    pub fn new(mut initial: AppState, global_extent: TimeExtent) -> Self {
        initial.time_extent = initial.time_extent.clamp_to(&global_extent);
        Self {
            state: initial,
            global_extent,
            version: 0,
        }
    }

    /// Creates a store with the default state for `global_extent`.
    #[must_use]
    pub fn with_defaults(global_extent: TimeExtent) -> Self {
        Self::new(AppState::with_defaults(&global_extent), global_extent)
    }

    /// Read-only view of the current state.
    #[must_use]
    pub const fn state(&self) -> &AppState {
        &self.state
    }

    /// The dataset's global time extent this store clamps against.
    #[must_use]
    pub const fn global_extent(&self) -> &TimeExtent {
        &self.global_extent
    }

    /// Monotonic change counter; bumped once per observable state change.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Replaces the interface language.
    pub fn set_lang(&mut self, lang: Lang) -> bool {
        self.replace(lang, |state| &mut state.lang)
    }

    /// Replaces the basemap id.
    pub fn set_basemap(&mut self, basemap: &str) -> bool {
        if self.state.basemap == basemap {
            return false;
        }
        self.state.basemap = basemap.to_string();
        self.version += 1;
        true
    }

    /// Sets the analysis window, clamped into the global extent.
    ///
    /// A clamped result identical to the current window is a no-op: no
    /// version bump, no downstream recomputation, no URL write. A requested
    /// window disjoint from the global extent reinstates the full extent.
    pub fn set_time_extent(&mut self, requested: TimeExtent) -> bool {
        let next = requested.clamp_to(&self.global_extent);
        self.replace(next, |state| &mut state.time_extent)
    }

    /// Replaces the category allow-list.
    pub fn set_categories(&mut self, categories: Vec<String>) -> bool {
        self.replace(categories, |state| &mut state.filters.categories)
    }

    /// Replaces the sheet allow-list.
    pub fn set_sheets(&mut self, sheets: Vec<String>) -> bool {
        self.replace(sheets, |state| &mut state.filters.sheets)
    }

    /// Replaces the spatial extent mode.
    pub fn set_extent_mode(&mut self, mode: ExtentMode) -> bool {
        self.replace(mode, |state| &mut state.filters.extent_mode)
    }

    /// Replaces the time-series granularity.
    ///
    /// Selecting `month` also resets the window to the default twelve-month
    /// window, even when the store is already on monthly granularity. The
    /// coupling is intentional: monthly is the dashboard's home view and
    /// re-selecting it returns to the home window.
    pub fn set_time_step(&mut self, step: TimeStep) -> bool {
        let window = if step == TimeStep::Month {
            TimeExtent::default_window(&self.global_extent)
        } else {
            self.state.time_extent
        };
        if self.state.time_step == step && self.state.time_extent == window {
            return false;
        }
        self.state.time_step = step;
        self.state.time_extent = window;
        self.version += 1;
        true
    }

    /// Restores the default filters, granularity, and window.
    pub fn reset_filters(&mut self) -> bool {
        let window = TimeExtent::default_window(&self.global_extent);
        if self.state.filters == FilterState::default()
            && self.state.time_step == TimeStep::Month
            && self.state.time_extent == window
        {
            return false;
        }
        self.state.filters = FilterState::default();
        self.state.time_step = TimeStep::Month;
        self.state.time_extent = window;
        self.version += 1;
        true
    }

    /// Swaps in a new global extent after a dataset reload, re-clamping the
    /// current window into it.
    pub fn set_global_extent(&mut self, global_extent: TimeExtent) -> bool {
        let next = self.state.time_extent.clamp_to(&global_extent);
        let changed = self.global_extent != global_extent || self.state.time_extent != next;
        self.global_extent = global_extent;
        self.state.time_extent = next;
        if changed {
            self.version += 1;
        }
        changed
    }

    fn replace<T: PartialEq>(
        &mut self,
        value: T,
        field: impl FnOnce(&mut AppState) -> &mut T,
    ) -> bool {
        let slot = field(&mut self.state);
        if *slot == value {
            return false;
        }
        *slot = value;
        self.version += 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, TimeZone as _, Utc};

    use super::*;

    fn utc(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn store() -> AppStore {
        AppStore::with_defaults(TimeExtent::new(utc(2022, 1, 1), utc(2023, 6, 1)))
    }

    #[test]
    fn set_time_extent_clamps_into_global() {
        let mut store = store();
        assert!(store.set_time_extent(TimeExtent::new(utc(2021, 1, 1), utc(2022, 6, 1))));
        assert_eq!(store.state().time_extent.start, utc(2022, 1, 1));
        assert_eq!(store.state().time_extent.end, utc(2022, 6, 1));
    }

    #[test]
    fn disjoint_request_reinstates_full_extent() {
        let mut store = store();
        assert!(store.set_time_extent(TimeExtent::new(utc(2019, 1, 1), utc(2020, 1, 1))));
        assert_eq!(store.state().time_extent, *store.global_extent());
    }

    #[test]
    fn identical_clamped_window_is_a_noop() {
        let mut store = store();
        assert!(store.set_time_extent(TimeExtent::new(utc(2022, 2, 1), utc(2022, 3, 1))));
        let version = store.version();

        // same window, also reached via clamping from outside the extent
        assert!(!store.set_time_extent(TimeExtent::new(utc(2022, 2, 1), utc(2022, 3, 1))));
        assert_eq!(store.version(), version);
    }

    #[test]
    fn window_always_within_global_and_ordered() {
        let mut store = store();
        let requests = [
            TimeExtent::new(utc(2021, 6, 1), utc(2024, 1, 1)),
            TimeExtent::new(utc(2022, 5, 1), utc(2022, 5, 2)),
            TimeExtent::new(utc(2025, 1, 1), utc(2026, 1, 1)),
        ];
        for requested in requests {
            store.set_time_extent(requested);
            let window = store.state().time_extent;
            assert!(window.start >= store.global_extent().start);
            assert!(window.end <= store.global_extent().end);
            assert!(window.start <= window.end);
        }
    }

    #[test]
    fn month_step_resets_window_even_when_already_month() {
        let mut store = store();
        store.set_time_extent(TimeExtent::new(utc(2023, 1, 1), utc(2023, 3, 1)));
        assert_eq!(store.state().time_step, TimeStep::Month);

        assert!(store.set_time_step(TimeStep::Month));
        let expected = TimeExtent::default_window(store.global_extent());
        assert_eq!(store.state().time_extent, expected);
    }

    #[test]
    fn non_month_step_keeps_window() {
        let mut store = store();
        store.set_time_extent(TimeExtent::new(utc(2023, 1, 1), utc(2023, 3, 1)));
        let window = store.state().time_extent;

        assert!(store.set_time_step(TimeStep::Week));
        assert_eq!(store.state().time_extent, window);
    }

    #[test]
    fn reset_filters_restores_defaults() {
        let mut store = store();
        store.set_categories(vec!["Theft".to_string()]);
        store.set_sheets(vec!["Sheet2".to_string()]);
        store.set_extent_mode(ExtentMode::View);
        store.set_time_step(TimeStep::Day);
        store.set_time_extent(TimeExtent::new(utc(2023, 1, 1), utc(2023, 2, 1)));

        assert!(store.reset_filters());
        assert_eq!(store.state().filters, FilterState::default());
        assert_eq!(store.state().time_step, TimeStep::Month);
        assert_eq!(
            store.state().time_extent,
            TimeExtent::default_window(store.global_extent())
        );

        // second reset changes nothing
        let version = store.version();
        assert!(!store.reset_filters());
        assert_eq!(store.version(), version);
    }

    #[test]
    fn noop_transitions_leave_version_untouched() {
        let mut store = store();
        let version = store.version();
        assert!(!store.set_lang(Lang::En));
        assert!(!store.set_basemap(incident_map_models::DEFAULT_BASEMAP));
        assert!(!store.set_categories(Vec::new()));
        assert!(!store.set_extent_mode(ExtentMode::All));
        assert_eq!(store.version(), version);

        assert!(store.set_lang(Lang::Es));
        assert_eq!(store.version(), version + 1);
    }

    #[test]
    fn global_extent_swap_reclamps_window() {
        let mut store = store();
        store.set_time_extent(TimeExtent::new(utc(2022, 6, 1), utc(2023, 6, 1)));

        let narrower = TimeExtent::new(utc(2022, 1, 1), utc(2022, 9, 1));
        assert!(store.set_global_extent(narrower));
        assert_eq!(store.state().time_extent.end, utc(2022, 9, 1));
        assert_eq!(store.state().time_extent.start, utc(2022, 6, 1));
    }
}
