use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::{can_cast_types, cast};
use arrow::datatypes::{
    DataType, Float32Type, Float64Type, Int16Type, Int32Type, Int64Type, UInt32Type,
};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use zip::ZipArchive;

use super::error::DataLoadError;
use super::model::{
    CellValue, Dataset, Listing, BRAND, CAR_AGE, FUEL_TYPE, GEARBOX, MODEL, POWER_PS, PRICE,
    REQUIRED_COLUMNS, VEHICLE_TYPE, YEAR_OF_REGISTRATION,
};

type Result<T> = std::result::Result<T, DataLoadError>;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a listings dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – pandas `to_csv()` output; the first column is the row index
/// * `.zip`     – an archive holding exactly one `.csv` member
/// * `.parquet` – pandas / polars parquet output
///
/// `car_age` is derived from `yearOfRegistration` against `reference_year`;
/// a `car_age` column present in the source is ignored.
pub fn load_file(path: &Path, reference_year: i32) -> Result<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "csv" => {
            let file = File::open(path).map_err(|e| DataLoadError::io(path, e))?;
            read_csv(file, reference_year)
        }
        "zip" => load_zip(path, reference_year),
        "parquet" | "pq" => load_parquet(path, reference_year),
        other => Err(DataLoadError::UnsupportedFormat(other.to_string())),
    }?;

    log::info!(
        "Loaded {} listings ({} columns) from {}",
        dataset.len(),
        dataset.columns.len(),
        path.display()
    );
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// Column layout shared by the CSV and parquet readers
// ---------------------------------------------------------------------------

/// One cell as handed over by a reader: raw CSV text or an already typed
/// arrow value.
enum SourceCell<'a> {
    Text(&'a str),
    Typed(CellValue),
}

impl SourceCell<'_> {
    fn text(self) -> Option<String> {
        match self {
            SourceCell::Text("") => None,
            SourceCell::Text(s) => Some(s.to_string()),
            SourceCell::Typed(CellValue::Null) => None,
            SourceCell::Typed(CellValue::String(s)) => Some(s),
            SourceCell::Typed(v) => Some(v.to_string()),
        }
    }

    fn number(self, row: usize, column: &str) -> Result<Option<f64>> {
        let invalid = |value: String| DataLoadError::InvalidValue {
            row,
            column: column.to_string(),
            value,
        };
        let raw = match self {
            SourceCell::Typed(CellValue::Null) => return Ok(None),
            SourceCell::Typed(CellValue::String(s)) => s,
            SourceCell::Typed(v) => return v.as_f64().map(Some).ok_or_else(|| invalid(v.to_string())),
            SourceCell::Text(s) => s.to_string(),
        };
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") {
            return Ok(None);
        }
        trimmed.parse::<f64>().map(Some).map_err(|_| invalid(raw.clone()))
    }

    fn year(self, row: usize, column: &str) -> Result<Option<i32>> {
        match self.number(row, column)? {
            None => Ok(None),
            Some(y) if y.fract() == 0.0 && y.abs() <= i32::MAX as f64 => Ok(Some(y as i32)),
            Some(y) => Err(DataLoadError::InvalidValue {
                row,
                column: column.to_string(),
                value: y.to_string(),
            }),
        }
    }

    fn value(self) -> CellValue {
        match self {
            SourceCell::Text(s) => CellValue::parse(s),
            SourceCell::Typed(v) => v,
        }
    }
}

/// Where each known column sits in the source, plus the columns carried
/// through untyped.
struct Layout {
    brand: usize,
    fuel_type: usize,
    vehicle_type: usize,
    gearbox: usize,
    model: usize,
    price: usize,
    power_ps: usize,
    year: usize,
    extras: Vec<(usize, String)>,
    /// Output column order: source order, `car_age` last.
    columns: Vec<String>,
}

impl Layout {
    /// `headers` holds `(source index, name)` for every usable column, index
    /// columns already removed.
    fn resolve(headers: &[(usize, String)]) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .find(|(_, h)| h == name)
                .map(|(i, _)| *i)
                .ok_or_else(|| DataLoadError::MissingColumn(name.to_string()))
        };

        let mut columns = Vec::with_capacity(headers.len() + 1);
        let mut extras = Vec::new();
        for (idx, name) in headers {
            if name == CAR_AGE {
                log::warn!("Ignoring source '{CAR_AGE}' column, it is derived at load");
                continue;
            }
            if !REQUIRED_COLUMNS.contains(&name.as_str()) {
                extras.push((*idx, name.clone()));
            }
            columns.push(name.clone());
        }
        columns.push(CAR_AGE.to_string());

        Ok(Layout {
            brand: find(BRAND)?,
            fuel_type: find(FUEL_TYPE)?,
            vehicle_type: find(VEHICLE_TYPE)?,
            gearbox: find(GEARBOX)?,
            model: find(MODEL)?,
            price: find(PRICE)?,
            power_ps: find(POWER_PS)?,
            year: find(YEAR_OF_REGISTRATION)?,
            extras,
            columns,
        })
    }

    fn listing<'a, F>(&self, row: usize, reference_year: i32, cell: F) -> Result<Listing>
    where
        F: Fn(usize) -> SourceCell<'a>,
    {
        let mut extra = BTreeMap::new();
        for (idx, name) in &self.extras {
            extra.insert(name.clone(), cell(*idx).value());
        }

        let year_of_registration = cell(self.year).year(row, YEAR_OF_REGISTRATION)?;
        if let Some(year) = year_of_registration {
            if reference_year.checked_sub(year).is_none() {
                return Err(DataLoadError::InvalidValue {
                    row,
                    column: YEAR_OF_REGISTRATION.to_string(),
                    value: year.to_string(),
                });
            }
        }

        let mut listing = Listing {
            brand: cell(self.brand).text(),
            fuel_type: cell(self.fuel_type).text(),
            vehicle_type: cell(self.vehicle_type).text(),
            gearbox: cell(self.gearbox).text(),
            model: cell(self.model).text(),
            price: cell(self.price).number(row, PRICE)?,
            power_ps: cell(self.power_ps).number(row, POWER_PS)?,
            year_of_registration,
            car_age: None,
            extra,
        };
        listing.derive_age(reference_year);
        Ok(listing)
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row, first column is the pandas row index and is
/// dropped. Works on any reader so zip members stream straight through.
fn read_csv<R: Read>(reader: R, reference_year: i32) -> Result<Dataset> {
    let mut reader = csv::Reader::from_reader(reader);
    let headers: Vec<(usize, String)> = reader
        .headers()?
        .iter()
        .enumerate()
        .skip(1)
        .map(|(i, h)| (i, h.trim().to_string()))
        .collect();

    let layout = Layout::resolve(&headers)?;

    let mut listings = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result?;
        let listing = layout.listing(row_no, reference_year, |idx| {
            SourceCell::Text(record.get(idx).unwrap_or(""))
        })?;
        listings.push(listing);
    }

    Ok(Dataset::new(layout.columns, listings))
}

// ---------------------------------------------------------------------------
// Zip loader
// ---------------------------------------------------------------------------

fn is_csv_member(name: &str) -> bool {
    !name.ends_with('/')
        && !name.starts_with("__MACOSX/")
        && name.to_ascii_lowercase().ends_with(".csv")
}

/// The archive must hold exactly one CSV member; anything else is skipped.
/// The archive handle is dropped before returning on every path.
fn load_zip(path: &Path, reference_year: i32) -> Result<Dataset> {
    let file = File::open(path).map_err(|e| DataLoadError::io(path, e))?;
    let mut archive = ZipArchive::new(file)?;

    let mut members = Vec::new();
    for name in archive.file_names() {
        if is_csv_member(name) {
            members.push(name.to_string());
        } else {
            log::warn!("Skipping non-CSV archive entry '{name}'");
        }
    }

    if members.len() > 1 {
        members.sort();
        return Err(DataLoadError::AmbiguousCsvMembers {
            path: PathBuf::from(path),
            members,
        });
    }
    let Some(name) = members.first() else {
        return Err(DataLoadError::NoCsvMember(path.to_path_buf()));
    };

    log::debug!("Reading '{name}' from {}", path.display());
    let member = archive.by_name(name)?;
    read_csv(member, reference_year)
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a parquet file written by pandas (`df.to_parquet()`) or polars.
/// Index columns stored as `__index_level_N__` are dropped.
fn load_parquet(path: &Path, reference_year: i32) -> Result<Dataset> {
    let file = File::open(path).map_err(|e| DataLoadError::io(path, e))?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;

    let headers: Vec<(usize, String)> = builder
        .schema()
        .fields()
        .iter()
        .enumerate()
        .filter(|(_, f)| !f.name().starts_with("__index_level_"))
        .map(|(i, f)| (i, f.name().clone()))
        .collect();
    let layout = Layout::resolve(&headers)?;

    let reader = builder.build()?;
    let mut listings = Vec::new();
    let mut row_offset = 0;

    for batch_result in reader {
        let batch = batch_result?;
        let columns = batch
            .columns()
            .iter()
            .map(normalize_column)
            .collect::<Result<Vec<_>>>()?;
        for row in 0..batch.num_rows() {
            let listing = layout.listing(row_offset + row, reference_year, |idx| {
                SourceCell::Typed(extract_cell(&columns[idx], row))
            })?;
            listings.push(listing);
        }
        row_offset += batch.num_rows();
    }

    Ok(Dataset::new(layout.columns, listings))
}

/// Cast a batch column to one of the types `extract_cell` reads.
///
/// Dictionary columns (pandas `category`) decode to their values, the
/// remaining integer widths widen to Int64 and anything else castable
/// (dates, timestamps, decimals) is rendered as text.
fn normalize_column(col: &ArrayRef) -> Result<ArrayRef> {
    let target = match col.data_type() {
        DataType::Utf8
        | DataType::LargeUtf8
        | DataType::Int16
        | DataType::Int32
        | DataType::UInt32
        | DataType::Int64
        | DataType::Float32
        | DataType::Float64
        | DataType::Boolean => return Ok(Arc::clone(col)),
        DataType::Dictionary(_, values) => {
            let decoded = cast(col, values.as_ref())?;
            return normalize_column(&decoded);
        }
        DataType::Int8 | DataType::UInt8 | DataType::UInt16 | DataType::UInt64 => {
            DataType::Int64
        }
        DataType::Float16 => DataType::Float64,
        other if can_cast_types(other, &DataType::Utf8) => DataType::Utf8,
        other => {
            log::warn!("Unsupported parquet column type {other:?}, cells read as null");
            return Ok(Arc::clone(col));
        }
    };
    Ok(cast(col, &target)?)
}

/// Extract a single cell from a normalized Arrow column at a given row.
fn extract_cell(col: &ArrayRef, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Null;
    }
    match col.data_type() {
        DataType::Utf8 => CellValue::String(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => CellValue::String(col.as_string::<i64>().value(row).to_string()),
        DataType::Int16 => CellValue::Integer(col.as_primitive::<Int16Type>().value(row) as i64),
        DataType::Int32 => CellValue::Integer(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::UInt32 => CellValue::Integer(col.as_primitive::<UInt32Type>().value(row) as i64),
        DataType::Int64 => CellValue::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::Float32 => {
            let v = col.as_primitive::<Float32Type>().value(row);
            if v.is_nan() {
                CellValue::Null
            } else {
                CellValue::Float(v as f64)
            }
        }
        DataType::Float64 => {
            let v = col.as_primitive::<Float64Type>().value(row);
            if v.is_nan() {
                CellValue::Null
            } else {
                CellValue::Float(v)
            }
        }
        DataType::Boolean => CellValue::Bool(col.as_boolean().value(row)),
        _ => CellValue::Null,
    }
}
