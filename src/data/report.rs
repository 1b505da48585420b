use std::collections::{BTreeMap, HashMap};

use super::model::Dataset;
use super::stats::{self, Bin, BoxStats, ColumnSummary};

// ---------------------------------------------------------------------------
// Aggregates over the working set
// ---------------------------------------------------------------------------

/// The `n` most frequent models, most frequent first. Equal counts keep the
/// order in which the models first appear. Rows without a model are ignored.
pub fn top_models(dataset: &Dataset, n: usize) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    let mut slot: HashMap<&str, usize> = HashMap::new();

    for model in dataset.listings.iter().filter_map(|l| l.model.as_deref()) {
        match slot.get(model) {
            Some(&i) => counts[i].1 += 1,
            None => {
                slot.insert(model, counts.len());
                counts.push((model.to_string(), 1));
            }
        }
    }

    // stable sort keeps first-seen order among ties
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.truncate(n);
    counts
}

/// Listing count per non-null fuel type.
pub fn fuel_share(dataset: &Dataset) -> BTreeMap<String, usize> {
    let mut share = BTreeMap::new();
    for fuel in dataset.listings.iter().filter_map(|l| l.fuel_type.as_ref()) {
        *share.entry(fuel.clone()).or_insert(0) += 1;
    }
    share
}

/// Rows usable by the age/price/power scatter: no nulls among `car_age`,
/// `price`, `gearbox` and `powerPS`, and a positive `powerPS`.
pub fn scatter_ready(dataset: &Dataset) -> Dataset {
    dataset
        .retain(|l| {
            l.car_age.is_some() && l.price.is_some() && l.gearbox.is_some() && l.power_ps.is_some()
        })
        .retain(|l| l.power_ps.is_some_and(|p| p > 0.0))
}

/// pandas-style `describe()` over every numeric column.
pub fn describe(dataset: &Dataset) -> Vec<ColumnSummary> {
    dataset
        .numeric_columns()
        .iter()
        .map(|col| {
            let values: Vec<f64> = dataset
                .listings
                .iter()
                .filter_map(|l| l.cell(col).as_f64())
                .collect();
            stats::summarize(col, &values)
        })
        .collect()
}

/// Price distribution.
pub fn price_histogram(dataset: &Dataset, bins: usize) -> Vec<Bin> {
    let prices: Vec<f64> = dataset.listings.iter().filter_map(|l| l.price).collect();
    stats::histogram(&prices, bins)
}

/// Price box statistics per vehicle type, sorted by vehicle type.
pub fn price_by_vehicle_type(dataset: &Dataset) -> Vec<(String, BoxStats)> {
    let mut groups: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for l in &dataset.listings {
        if let (Some(kind), Some(price)) = (l.vehicle_type.as_deref(), l.price) {
            groups.entry(kind).or_default().push(price);
        }
    }
    groups
        .into_iter()
        .filter_map(|(kind, prices)| Some((kind.to_string(), stats::box_stats(&prices)?)))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScatterPoint {
    pub car_age: f64,
    pub price: f64,
    pub power_ps: f64,
}

/// Scatter points of one gearbox.
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterSeries {
    pub gearbox: String,
    pub points: Vec<ScatterPoint>,
}

/// Price against age, one series per gearbox (sorted by name).
pub fn price_vs_age(dataset: &Dataset) -> Vec<ScatterSeries> {
    let ready = scatter_ready(dataset);
    let mut series: BTreeMap<String, Vec<ScatterPoint>> = BTreeMap::new();
    for l in &ready.listings {
        if let (Some(gearbox), Some(age), Some(price), Some(power)) =
            (&l.gearbox, l.car_age, l.price, l.power_ps)
        {
            series.entry(gearbox.clone()).or_default().push(ScatterPoint {
                car_age: age as f64,
                price,
                power_ps: power,
            });
        }
    }
    series
        .into_iter()
        .map(|(gearbox, points)| ScatterSeries { gearbox, points })
        .collect()
}

// ---------------------------------------------------------------------------
// Report – everything the main area displays
// ---------------------------------------------------------------------------

/// Sizes used when building a [`Report`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportOptions {
    pub histogram_bins: usize,
    pub top_models: usize,
}

/// Aggregates of one working set, rebuilt whenever the filters change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Report {
    pub summary: Vec<ColumnSummary>,
    pub price_histogram: Vec<Bin>,
    pub price_by_vehicle_type: Vec<(String, BoxStats)>,
    pub price_vs_age: Vec<ScatterSeries>,
    pub top_models: Vec<(String, usize)>,
    pub fuel_share: BTreeMap<String, usize>,
}

impl Report {
    pub fn build(working: &Dataset, options: ReportOptions) -> Self {
        Report {
            summary: describe(working),
            price_histogram: price_histogram(working, options.histogram_bins),
            price_by_vehicle_type: price_by_vehicle_type(working),
            price_vs_age: price_vs_age(working),
            top_models: top_models(working, options.top_models),
            fuel_share: fuel_share(working),
        }
    }
}
