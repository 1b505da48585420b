use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::DashboardConfig;
use crate::data::cache::DatasetCache;
use crate::data::error::DataLoadError;
use crate::data::filter::{FilterCriteria, ALL_BRANDS};
use crate::data::model::Dataset;
use crate::data::report::Report;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    /// Loaded datasets, one per source.
    cache: DatasetCache,

    /// Source of the dataset on screen.
    pub source: Option<PathBuf>,

    /// Loaded dataset (None until a file is opened).
    pub dataset: Option<Arc<Dataset>>,

    /// Brand selector options, [`ALL_BRANDS`] first.
    pub brand_options: Vec<String>,

    /// Fuel types observed at load, ascending.
    pub fuel_options: BTreeSet<String>,

    /// Slider limits: observed `(min, max)` car age.
    pub age_limits: (i32, i32),

    /// Current sidebar selection.
    pub criteria: FilterCriteria,

    /// Dataset after all filters.
    pub working: Dataset,

    /// Aggregates of `working`.
    pub report: Report,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        let window = config.age_window();
        Self {
            cache: DatasetCache::new(config.reference_year),
            config,
            source: None,
            dataset: None,
            brand_options: vec![ALL_BRANDS.to_string()],
            fuel_options: BTreeSet::new(),
            age_limits: window,
            criteria: FilterCriteria {
                brand: Some(ALL_BRANDS.to_string()),
                fuel_types: BTreeSet::new(),
                age_range: window,
            },
            working: Dataset::default(),
            report: Report::default(),
            status_message: None,
        }
    }

    /// Load `path` (from the cache when possible) and show it. On failure
    /// the error is reported and the previous dataset stays on screen.
    pub fn open(&mut self, path: &Path) -> Result<(), DataLoadError> {
        match self.cache.get_or_load(path) {
            Ok(dataset) => {
                log::debug!("{} source(s) cached", self.cache.len());
                self.set_dataset(path, dataset);
                Ok(())
            }
            Err(e) => {
                log::error!("Failed to load {}: {e}", path.display());
                self.status_message = Some(format!("Error: {e}"));
                Err(e)
            }
        }
    }

    /// Drop the cached copy of the current source and read it again.
    pub fn reload(&mut self) -> Result<(), DataLoadError> {
        let Some(path) = self.source.clone() else {
            return Ok(());
        };
        self.cache.invalidate(&path);
        self.open(&path)
    }

    /// Forget every cached source. The dataset on screen stays.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
        log::info!("Dataset cache cleared");
    }

    /// Ingest a newly loaded dataset and initialise the filters.
    fn set_dataset(&mut self, path: &Path, dataset: Arc<Dataset>) {
        self.brand_options = std::iter::once(ALL_BRANDS.to_string())
            .chain(dataset.brands())
            .collect();
        self.fuel_options = dataset.fuel_types();
        self.age_limits = dataset.age_bounds().unwrap_or(self.config.age_window());
        self.criteria = FilterCriteria::defaults_for(&dataset, self.config.age_window());

        self.source = Some(path.to_path_buf());
        self.dataset = Some(dataset);
        self.status_message = None;
        self.refilter();
    }

    /// Recompute the working set and its report after a criteria change.
    pub fn refilter(&mut self) {
        if let Some(ds) = &self.dataset {
            self.working = self.criteria.apply(ds);
            self.report = Report::build(&self.working, self.config.report_options());
        }
    }

    pub fn set_brand(&mut self, brand: &str) {
        self.criteria.brand = Some(brand.to_string());
        self.refilter();
    }

    /// Toggle a single fuel type in the selection.
    pub fn toggle_fuel_type(&mut self, fuel: &str) {
        if !self.criteria.fuel_types.remove(fuel) {
            self.criteria.fuel_types.insert(fuel.to_string());
        }
        self.refilter();
    }

    pub fn select_all_fuel_types(&mut self) {
        self.criteria.fuel_types = self.fuel_options.clone();
        self.refilter();
    }

    pub fn select_no_fuel_types(&mut self) {
        self.criteria.fuel_types.clear();
        self.refilter();
    }

    /// Set the age window. Moving one end past the other drags it along so
    /// the window never inverts.
    pub fn set_age_range(&mut self, lo: i32, hi: i32) {
        let (old_lo, _) = self.criteria.age_range;
        self.criteria.age_range = if lo <= hi {
            (lo, hi)
        } else if lo != old_lo {
            (lo, lo)
        } else {
            (hi, hi)
        };
        self.refilter();
    }

    /// Back to the selection a fresh load starts with.
    pub fn reset_filters(&mut self) {
        let Some(ds) = &self.dataset else {
            return;
        };
        self.criteria = FilterCriteria::defaults_for(ds, self.config.age_window());
        self.refilter();
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    const CSV: &str = "\
,brand,fuelType,vehicleType,gearbox,model,price,powerPS,yearOfRegistration
0,BMW,diesel,limousine,manual,3er,12000,150,2015
1,Audi,petrol,kombi,automatic,A4,3000,0,2000
2,BMW,petrol,limousine,automatic,5er,31000,190,2021
3,Opel,lpg,kleinwagen,manual,corsa,500,60,1985
";

    fn loaded(dir: &TempDir) -> (AppState, PathBuf) {
        let path = dir.path().join("cleaned_df.csv");
        fs::write(&path, CSV).unwrap();
        let mut state = AppState::new(DashboardConfig::default());
        state.open(&path).unwrap();
        (state, path)
    }

    #[test]
    fn open_initialises_filters_from_data() {
        let dir = TempDir::new().unwrap();
        let (state, _) = loaded(&dir);

        assert_eq!(state.brand_options, vec!["All", "Audi", "BMW", "Opel"]);
        assert_eq!(state.fuel_options.len(), 3);
        assert_eq!(state.age_limits, (4, 40));
        assert_eq!(state.criteria.age_range, (4, 30));
        // Opel (age 40) is outside the default window.
        assert_eq!(state.working.len(), 3);
        assert_eq!(state.report.top_models.len(), 3);
    }

    #[test]
    fn sidebar_changes_refilter() {
        let dir = TempDir::new().unwrap();
        let (mut state, _) = loaded(&dir);

        state.set_brand("BMW");
        assert_eq!(state.working.len(), 2);

        state.toggle_fuel_type("diesel");
        assert_eq!(state.working.len(), 1);
        assert_eq!(state.working.listings[0].model.as_deref(), Some("5er"));

        state.select_no_fuel_types();
        assert!(state.working.is_empty());
        assert!(state.report.fuel_share.is_empty());

        state.select_all_fuel_types();
        state.set_age_range(0, 5);
        assert_eq!(state.working.len(), 1);

        state.reset_filters();
        assert_eq!(state.working.len(), 3);
    }

    #[test]
    fn age_window_never_inverts() {
        let dir = TempDir::new().unwrap();
        let (mut state, _) = loaded(&dir);
        state.set_age_range(4, 30);
        state.set_age_range(35, 30);
        assert_eq!(state.criteria.age_range, (35, 35));
        state.set_age_range(35, 20);
        assert_eq!(state.criteria.age_range, (20, 20));
    }

    #[test]
    fn failed_open_keeps_previous_dataset() {
        let dir = TempDir::new().unwrap();
        let (mut state, path) = loaded(&dir);

        assert!(state.open(&dir.path().join("missing.zip")).is_err());
        assert!(state.status_message.is_some());
        assert_eq!(state.source.as_deref(), Some(path.as_path()));
        assert_eq!(state.dataset.as_ref().map(|d| d.len()), Some(4));
    }

    #[test]
    fn reload_rereads_the_source() {
        let dir = TempDir::new().unwrap();
        let (mut state, path) = loaded(&dir);

        fs::write(&path, format!("{CSV}4,Fiat,petrol,kleinwagen,manual,punto,900,60,2010\n")).unwrap();
        state.open(&path).unwrap();
        assert_eq!(state.dataset.as_ref().map(|d| d.len()), Some(4));

        state.reload().unwrap();
        assert_eq!(state.dataset.as_ref().map(|d| d.len()), Some(5));
        assert!(state.brand_options.contains(&"Fiat".to_string()));
    }

    #[test]
    fn cleared_cache_rereads_on_next_open() {
        let dir = TempDir::new().unwrap();
        let (mut state, path) = loaded(&dir);

        state.clear_cache();
        fs::remove_file(&path).unwrap();
        assert!(state.open(&path).is_err());
        assert_eq!(state.dataset.as_ref().map(|d| d.len()), Some(4));
    }
}
