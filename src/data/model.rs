use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

// ---------------------------------------------------------------------------
// Column names of the cleaned listings file
// ---------------------------------------------------------------------------

pub const BRAND: &str = "brand";
pub const FUEL_TYPE: &str = "fuelType";
pub const VEHICLE_TYPE: &str = "vehicleType";
pub const GEARBOX: &str = "gearbox";
pub const MODEL: &str = "model";
pub const PRICE: &str = "price";
pub const POWER_PS: &str = "powerPS";
pub const YEAR_OF_REGISTRATION: &str = "yearOfRegistration";
pub const CAR_AGE: &str = "car_age";

/// Columns every source must carry.
pub const REQUIRED_COLUMNS: [&str; 8] = [
    BRAND,
    FUEL_TYPE,
    VEHICLE_TYPE,
    GEARBOX,
    MODEL,
    PRICE,
    POWER_PS,
    YEAR_OF_REGISTRATION,
];

// ---------------------------------------------------------------------------
// CellValue – a single cell of a column the explorer does not model
// ---------------------------------------------------------------------------

/// A dynamically-typed cell mirroring the pandas dtypes a cleaned CSV
/// typically ends up with.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v:.2}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl CellValue {
    /// Guess the type of a raw text cell. Empty text is null.
    pub fn parse(s: &str) -> Self {
        if s.is_empty() {
            return CellValue::Null;
        }
        if let Ok(i) = s.parse::<i64>() {
            return CellValue::Integer(i);
        }
        if let Ok(f) = s.parse::<f64>() {
            return CellValue::Float(f);
        }
        match s {
            "true" | "True" => CellValue::Bool(true),
            "false" | "False" => CellValue::Bool(false),
            _ => CellValue::String(s.to_string()),
        }
    }

    /// Numeric view of the cell, used by the summary statistics.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) if !v.is_nan() => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

// ---------------------------------------------------------------------------
// Listing – one row of the cleaned dataset
// ---------------------------------------------------------------------------

/// One used-car listing. Every field is optional because the cleaned file
/// may still contain empty cells.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Listing {
    pub brand: Option<String>,
    pub fuel_type: Option<String>,
    pub vehicle_type: Option<String>,
    pub gearbox: Option<String>,
    pub model: Option<String>,
    pub price: Option<f64>,
    pub power_ps: Option<f64>,
    pub year_of_registration: Option<i32>,
    /// Derived at load time from `year_of_registration`.
    pub car_age: Option<i32>,
    /// Remaining source columns, keyed by header name.
    pub extra: BTreeMap<String, CellValue>,
}

impl Listing {
    /// Recompute `car_age` against the given reference year. An age that
    /// does not fit in `i32` is left null.
    pub fn derive_age(&mut self, reference_year: i32) {
        self.car_age = self
            .year_of_registration
            .and_then(|y| reference_year.checked_sub(y));
    }

    /// Display cell for a column name, `<null>` for empty or unknown cells.
    pub fn cell(&self, column: &str) -> CellValue {
        fn text(v: &Option<String>) -> CellValue {
            v.clone().map(CellValue::String).unwrap_or(CellValue::Null)
        }
        fn float(v: Option<f64>) -> CellValue {
            v.map(CellValue::Float).unwrap_or(CellValue::Null)
        }
        fn int(v: Option<i32>) -> CellValue {
            v.map(|i| CellValue::Integer(i as i64))
                .unwrap_or(CellValue::Null)
        }
        match column {
            BRAND => text(&self.brand),
            FUEL_TYPE => text(&self.fuel_type),
            VEHICLE_TYPE => text(&self.vehicle_type),
            GEARBOX => text(&self.gearbox),
            MODEL => text(&self.model),
            PRICE => float(self.price),
            POWER_PS => float(self.power_ps),
            YEAR_OF_REGISTRATION => int(self.year_of_registration),
            CAR_AGE => int(self.car_age),
            other => self.extra.get(other).cloned().unwrap_or(CellValue::Null),
        }
    }
}

// ---------------------------------------------------------------------------
// Dataset – a set of listings sharing one column layout
// ---------------------------------------------------------------------------

/// Loaded or filtered listings. Filtering never changes `columns`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    /// Column names in source order, `car_age` appended last.
    pub columns: Vec<String>,
    pub listings: Vec<Listing>,
}

impl Dataset {
    pub fn new(columns: Vec<String>, listings: Vec<Listing>) -> Self {
        Dataset { columns, listings }
    }

    /// New dataset with the same columns and the rows matching `keep`.
    pub fn retain<F>(&self, mut keep: F) -> Dataset
    where
        F: FnMut(&Listing) -> bool,
    {
        Dataset {
            columns: self.columns.clone(),
            listings: self.listings.iter().filter(|l| keep(l)).cloned().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }

    /// Sorted distinct non-null brands.
    pub fn brands(&self) -> BTreeSet<String> {
        self.listings.iter().filter_map(|l| l.brand.clone()).collect()
    }

    /// Sorted distinct non-null fuel types.
    pub fn fuel_types(&self) -> BTreeSet<String> {
        self.listings
            .iter()
            .filter_map(|l| l.fuel_type.clone())
            .collect()
    }

    /// Observed `(min, max)` car age, `None` when no row has an age.
    pub fn age_bounds(&self) -> Option<(i32, i32)> {
        self.listings
            .iter()
            .filter_map(|l| l.car_age)
            .fold(None, |acc, age| match acc {
                None => Some((age, age)),
                Some((lo, hi)) => Some((lo.min(age), hi.max(age))),
            })
    }

    /// Columns whose non-null cells are all numeric.
    pub fn numeric_columns(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|col| {
                let mut any = false;
                for l in &self.listings {
                    let cell = l.cell(col);
                    if cell.is_null() {
                        continue;
                    }
                    if cell.as_f64().is_none() {
                        return false;
                    }
                    any = true;
                }
                any || matches!(
                    col.as_str(),
                    PRICE | POWER_PS | YEAR_OF_REGISTRATION | CAR_AGE
                )
            })
            .cloned()
            .collect()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn listing(
        brand: &str,
        fuel: &str,
        year: i32,
        power: f64,
        price: f64,
        gearbox: &str,
        model: &str,
        vehicle: &str,
    ) -> Listing {
        let mut l = Listing {
            brand: Some(brand.to_string()),
            fuel_type: Some(fuel.to_string()),
            vehicle_type: Some(vehicle.to_string()),
            gearbox: Some(gearbox.to_string()),
            model: Some(model.to_string()),
            price: Some(price),
            power_ps: Some(power),
            year_of_registration: Some(year),
            ..Default::default()
        };
        l.derive_age(2025);
        l
    }

    pub(crate) fn dataset(listings: Vec<Listing>) -> Dataset {
        let mut columns: Vec<String> = REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect();
        columns.push(CAR_AGE.to_string());
        Dataset::new(columns, listings)
    }

    /// The two-row example used throughout the pipeline tests.
    pub(crate) fn bmw_audi() -> Dataset {
        dataset(vec![
            listing("BMW", "diesel", 2015, 150.0, 12000.0, "manual", "3er", "limousine"),
            listing("Audi", "petrol", 2000, 0.0, 3000.0, "automatic", "A4", "kombi"),
        ])
    }

    #[test]
    fn car_age_follows_reference_year() {
        let mut l = Listing {
            year_of_registration: Some(2001),
            ..Default::default()
        };
        for year in [2000, 2025, 2040] {
            l.derive_age(year);
            assert_eq!(l.car_age, Some(year - 2001));
        }
        l.year_of_registration = None;
        l.derive_age(2025);
        assert_eq!(l.car_age, None);

        l.year_of_registration = Some(-2_147_483_000);
        l.derive_age(2025);
        assert_eq!(l.car_age, None);
    }

    #[test]
    fn age_bounds_skip_null_ages() {
        let mut ds = bmw_audi();
        ds.listings.push(Listing::default());
        assert_eq!(ds.age_bounds(), Some((10, 25)));
        assert_eq!(Dataset::default().age_bounds(), None);
    }

    #[test]
    fn cell_values_parse_like_pandas() {
        assert_eq!(CellValue::parse(""), CellValue::Null);
        assert_eq!(CellValue::parse("42"), CellValue::Integer(42));
        assert_eq!(CellValue::parse("1.5"), CellValue::Float(1.5));
        assert_eq!(CellValue::parse("False"), CellValue::Bool(false));
        assert_eq!(CellValue::parse("ja"), CellValue::String("ja".into()));
    }

    #[test]
    fn numeric_columns_include_typed_and_extra_numbers() {
        let mut ds = bmw_audi();
        ds.columns.insert(0, "kilometer".to_string());
        ds.columns.insert(1, "notRepairedDamage".to_string());
        for l in &mut ds.listings {
            l.extra.insert("kilometer".into(), CellValue::Integer(150000));
            l.extra
                .insert("notRepairedDamage".into(), CellValue::String("nein".into()));
        }
        let numeric = ds.numeric_columns();
        assert!(numeric.contains(&"kilometer".to_string()));
        assert!(!numeric.contains(&"notRepairedDamage".to_string()));
        assert!(numeric.contains(&CAR_AGE.to_string()));
        assert!(!numeric.contains(&BRAND.to_string()));
    }
}
