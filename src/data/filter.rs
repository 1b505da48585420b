use std::collections::BTreeSet;

use super::model::Dataset;

/// Brand selector value meaning "no brand filter".
pub const ALL_BRANDS: &str = "All";

// ---------------------------------------------------------------------------
// Individual filter stages – each returns a new dataset
// ---------------------------------------------------------------------------

/// Keep rows whose brand equals `brand` exactly. `None` or [`ALL_BRANDS`]
/// keeps everything; rows without a brand never match a concrete brand.
pub fn filter_by_brand(dataset: &Dataset, brand: Option<&str>) -> Dataset {
    match brand {
        None | Some(ALL_BRANDS) => dataset.clone(),
        Some(wanted) => dataset.retain(|l| l.brand.as_deref() == Some(wanted)),
    }
}

/// Keep rows whose fuel type is selected. An empty selection keeps nothing.
pub fn filter_by_fuel_types(dataset: &Dataset, selected: &BTreeSet<String>) -> Dataset {
    dataset.retain(|l| {
        l.fuel_type
            .as_ref()
            .is_some_and(|fuel| selected.contains(fuel))
    })
}

/// Keep rows with `lo <= car_age <= hi`. The bounds are not repaired:
/// `lo > hi` simply matches nothing.
pub fn filter_by_age_range(dataset: &Dataset, lo: i32, hi: i32) -> Dataset {
    dataset.retain(|l| l.car_age.is_some_and(|age| lo <= age && age <= hi))
}

// ---------------------------------------------------------------------------
// Filter criteria: the whole sidebar selection
// ---------------------------------------------------------------------------

/// Current sidebar selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCriteria {
    /// `None` or [`ALL_BRANDS`] means every brand.
    pub brand: Option<String>,
    pub fuel_types: BTreeSet<String>,
    /// Inclusive `(lo, hi)` car age window.
    pub age_range: (i32, i32),
}

impl FilterCriteria {
    /// Initial selection for a freshly loaded dataset: every brand, every
    /// observed fuel type and the `window` clamped to the observed ages.
    pub fn defaults_for(dataset: &Dataset, window: (i32, i32)) -> Self {
        FilterCriteria {
            brand: Some(ALL_BRANDS.to_string()),
            fuel_types: dataset.fuel_types(),
            age_range: default_age_range(dataset, window),
        }
    }

    /// Run brand → fuel type → age range.
    pub fn apply(&self, dataset: &Dataset) -> Dataset {
        let by_brand = filter_by_brand(dataset, self.brand.as_deref());
        let by_fuel = filter_by_fuel_types(&by_brand, &self.fuel_types);
        let (lo, hi) = self.age_range;
        let working = filter_by_age_range(&by_fuel, lo, hi);
        log::debug!(
            "Filter pipeline: {} → brand {} → fuel {} → age {}",
            dataset.len(),
            by_brand.len(),
            by_fuel.len(),
            working.len()
        );
        working
    }
}

/// Clamp both ends of `window` into the observed age range. Datasets with
/// no ages keep the window as is.
pub fn default_age_range(dataset: &Dataset, window: (i32, i32)) -> (i32, i32) {
    match dataset.age_bounds() {
        Some((min, max)) => (window.0.clamp(min, max), window.1.clamp(min, max)),
        None => window,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::{bmw_audi, dataset, listing};
    use crate::data::model::Listing;

    fn mixed() -> Dataset {
        let mut ds = dataset(vec![
            listing("BMW", "diesel", 2015, 150.0, 12000.0, "manual", "3er", "limousine"),
            listing("Audi", "petrol", 2000, 0.0, 3000.0, "automatic", "A4", "kombi"),
            listing("BMW", "petrol", 2021, 190.0, 31000.0, "automatic", "5er", "limousine"),
            listing("bmw", "lpg", 1990, 90.0, 800.0, "manual", "3er", "coupe"),
        ]);
        ds.listings.push(Listing {
            year_of_registration: Some(2010),
            ..Default::default()
        });
        ds.listings.last_mut().unwrap().derive_age(2025);
        ds
    }

    #[test]
    fn all_brands_is_identity() {
        let ds = mixed();
        assert_eq!(filter_by_brand(&ds, Some(ALL_BRANDS)), ds);
        assert_eq!(filter_by_brand(&ds, None), ds);
    }

    #[test]
    fn brand_match_is_exact_and_case_sensitive() {
        let ds = mixed();
        let bmw = filter_by_brand(&ds, Some("BMW"));
        assert_eq!(bmw.len(), 2);
        assert!(bmw.listings.iter().all(|l| l.brand.as_deref() == Some("BMW")));
        assert_eq!(bmw.columns, ds.columns);
        assert!(filter_by_brand(&ds, Some("Opel")).is_empty());
    }

    #[test]
    fn empty_fuel_selection_keeps_nothing() {
        assert!(filter_by_fuel_types(&mixed(), &BTreeSet::new()).is_empty());
    }

    #[test]
    fn all_fuel_types_keep_rows_with_a_fuel_type() {
        let ds = mixed();
        let kept = filter_by_fuel_types(&ds, &ds.fuel_types());
        assert_eq!(kept.len(), 4);
        assert!(kept.listings.iter().all(|l| l.fuel_type.is_some()));
    }

    #[test]
    fn age_range_is_inclusive() {
        let ds = mixed();
        let kept = filter_by_age_range(&ds, 4, 15);
        let ages: Vec<_> = kept.listings.iter().map(|l| l.car_age).collect();
        assert_eq!(ages, vec![Some(10), Some(4), Some(15)]);
        assert!(kept
            .listings
            .iter()
            .all(|l| l.car_age.is_some_and(|a| (4..=15).contains(&a))));
    }

    #[test]
    fn observed_age_bounds_keep_every_aged_row() {
        let ds = mixed();
        let (min, max) = ds.age_bounds().unwrap();
        assert_eq!(filter_by_age_range(&ds, min, max), ds);
    }

    #[test]
    fn inverted_age_range_is_not_repaired() {
        assert!(filter_by_age_range(&mixed(), 20, 5).is_empty());
    }

    #[test]
    fn filters_are_idempotent() {
        let ds = mixed();
        let fuels: BTreeSet<String> = ["petrol".to_string()].into();

        let once = filter_by_brand(&ds, Some("BMW"));
        assert_eq!(filter_by_brand(&once, Some("BMW")), once);
        let once = filter_by_fuel_types(&ds, &fuels);
        assert_eq!(filter_by_fuel_types(&once, &fuels), once);
        let once = filter_by_age_range(&ds, 0, 20);
        assert_eq!(filter_by_age_range(&once, 0, 20), once);
    }

    #[test]
    fn filters_leave_input_untouched() {
        let ds = mixed();
        let before = ds.clone();
        let _ = filter_by_brand(&ds, Some("Audi"));
        let _ = filter_by_fuel_types(&ds, &BTreeSet::new());
        let _ = filter_by_age_range(&ds, 0, 1);
        assert_eq!(ds, before);
    }

    #[test]
    fn default_window_is_clamped_to_observed_ages() {
        let ds = mixed();
        // Observed ages run from 4 to 35.
        assert_eq!(default_age_range(&ds, (0, 30)), (4, 30));
        assert_eq!(default_age_range(&ds, (0, 50)), (4, 35));
        assert_eq!(default_age_range(&Dataset::default(), (0, 30)), (0, 30));
    }

    #[test]
    fn default_criteria_select_everything_in_window() {
        let ds = mixed();
        let criteria = FilterCriteria::defaults_for(&ds, (0, 30));
        assert_eq!(criteria.brand.as_deref(), Some(ALL_BRANDS));
        let fuels: Vec<_> = criteria.fuel_types.iter().cloned().collect();
        assert_eq!(fuels, vec!["diesel", "lpg", "petrol"]);

        // The 1990 listing (age 35) falls outside the default window, the
        // listing without a fuel type falls to the fuel stage.
        assert_eq!(criteria.apply(&ds).len(), 3);
    }

    #[test]
    fn reference_example_age_window() {
        let ds = bmw_audi();
        let ages: Vec<_> = ds.listings.iter().map(|l| l.car_age).collect();
        assert_eq!(ages, vec![Some(10), Some(25)]);

        let young = filter_by_age_range(&ds, 0, 15);
        assert_eq!(young.len(), 1);
        assert_eq!(young.listings[0].brand.as_deref(), Some("BMW"));
    }
}
