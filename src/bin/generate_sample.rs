use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use clap::Parser;
use parquet::arrow::ArrowWriter;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Write a synthetic cleaned listings dataset as CSV, zip and parquet.
#[derive(Debug, Parser)]
struct Args {
    /// Output directory.
    #[arg(default_value = ".")]
    out_dir: PathBuf,

    /// Number of listings.
    #[arg(long, default_value_t = 2000)]
    rows: usize,
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[(self.next_u64() % items.len() as u64) as usize]
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// brand, models, typical new price, typical power
const MAKES: [(&str, &[&str], f64, f64); 6] = [
    ("volkswagen", &["golf", "polo", "passat", "touran"], 24000.0, 105.0),
    ("bmw", &["3er", "5er", "1er", "x_reihe"], 38000.0, 170.0),
    ("opel", &["corsa", "astra", "zafira"], 18000.0, 90.0),
    ("audi", &["a4", "a3", "a6"], 36000.0, 150.0),
    ("mercedes_benz", &["c_klasse", "e_klasse", "a_klasse"], 40000.0, 160.0),
    ("ford", &["focus", "fiesta", "mondeo"], 19000.0, 95.0),
];
const FUEL_TYPES: [&str; 5] = ["benzin", "diesel", "lpg", "hybrid", "elektro"];
const VEHICLE_TYPES: [&str; 6] = ["limousine", "kleinwagen", "kombi", "bus", "cabrio", "coupe"];
const GEARBOXES: [&str; 2] = ["manuell", "automatik"];

#[derive(Default)]
struct Columns {
    brand: Vec<Option<String>>,
    fuel_type: Vec<Option<String>>,
    vehicle_type: Vec<String>,
    gearbox: Vec<String>,
    model: Vec<String>,
    price: Vec<i64>,
    power_ps: Vec<i64>,
    year: Vec<i64>,
    kilometer: Vec<i64>,
}

fn generate(rows: usize, rng: &mut SimpleRng) -> Columns {
    let mut cols = Columns::default();
    for _ in 0..rows {
        let (brand, models, new_price, power) = *rng.pick(&MAKES);
        let year = 1990 + (rng.next_u64() % 34) as i64;
        let age = (2025 - year) as f64;
        let depreciation = 0.85f64.powf(age);
        let price = (new_price * depreciation * rng.gauss(1.0, 0.15).max(0.2)).round() as i64;
        // A few listings carry the invalid zero-power sentinel.
        let power_ps = if rng.next_f64() < 0.05 {
            0
        } else {
            rng.gauss(power, power * 0.2).max(40.0).round() as i64
        };

        cols.brand
            .push((rng.next_f64() > 0.01).then(|| brand.to_string()));
        cols.fuel_type
            .push((rng.next_f64() > 0.02).then(|| rng.pick(&FUEL_TYPES).to_string()));
        cols.vehicle_type.push(rng.pick(&VEHICLE_TYPES).to_string());
        cols.gearbox.push(rng.pick(&GEARBOXES).to_string());
        cols.model.push(rng.pick(models).to_string());
        cols.price.push(price.max(100));
        cols.power_ps.push(power_ps);
        cols.year.push(year);
        cols.kilometer.push(5000 * (1 + (age as i64 * 3).min(29)));
    }
    cols
}

fn write_csv(cols: &Columns) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "",
        "brand",
        "fuelType",
        "vehicleType",
        "gearbox",
        "model",
        "price",
        "powerPS",
        "yearOfRegistration",
        "kilometer",
    ])?;
    for i in 0..cols.price.len() {
        writer.write_record([
            i.to_string(),
            cols.brand[i].clone().unwrap_or_default(),
            cols.fuel_type[i].clone().unwrap_or_default(),
            cols.vehicle_type[i].clone(),
            cols.gearbox[i].clone(),
            cols.model[i].clone(),
            cols.price[i].to_string(),
            cols.power_ps[i].to_string(),
            cols.year[i].to_string(),
            cols.kilometer[i].to_string(),
        ])?;
    }
    writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("flushing CSV buffer: {}", e.error()))
}

fn write_parquet(cols: &Columns, path: &Path) -> Result<()> {
    let text = |v: &[String]| -> ArrayRef {
        Arc::new(StringArray::from(v.iter().map(String::as_str).collect::<Vec<_>>()))
    };
    let nullable_text = |v: &[Option<String>]| -> ArrayRef {
        Arc::new(StringArray::from(v.iter().map(|s| s.as_deref()).collect::<Vec<_>>()))
    };

    let schema = Arc::new(Schema::new(vec![
        Field::new("__index_level_0__", DataType::Int64, false),
        Field::new("brand", DataType::Utf8, true),
        Field::new("fuelType", DataType::Utf8, true),
        Field::new("vehicleType", DataType::Utf8, false),
        Field::new("gearbox", DataType::Utf8, false),
        Field::new("model", DataType::Utf8, false),
        Field::new("price", DataType::Int64, false),
        Field::new("powerPS", DataType::Int64, false),
        Field::new("yearOfRegistration", DataType::Int64, false),
        Field::new("kilometer", DataType::Int64, false),
    ]));

    let index: Vec<i64> = (0..cols.price.len() as i64).collect();
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Int64Array::from(index)),
            nullable_text(&cols.brand),
            nullable_text(&cols.fuel_type),
            text(&cols.vehicle_type),
            text(&cols.gearbox),
            text(&cols.model),
            Arc::new(Int64Array::from(cols.price.clone())),
            Arc::new(Int64Array::from(cols.power_ps.clone())),
            Arc::new(Int64Array::from(cols.year.clone())),
            Arc::new(Int64Array::from(cols.kilometer.clone())),
        ],
    )
    .context("building record batch")?;

    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("creating {}", args.out_dir.display()))?;

    let mut rng = SimpleRng::new(42);
    let cols = generate(args.rows, &mut rng);
    let csv_bytes = write_csv(&cols)?;

    let csv_path = args.out_dir.join("cleaned_df.csv");
    std::fs::write(&csv_path, &csv_bytes)
        .with_context(|| format!("writing {}", csv_path.display()))?;

    let zip_path = args.out_dir.join("cleaned_df.zip");
    let zip_file =
        File::create(&zip_path).with_context(|| format!("creating {}", zip_path.display()))?;
    let mut zip = ZipWriter::new(zip_file);
    zip.start_file("cleaned_df.csv", SimpleFileOptions::default())
        .context("starting zip member")?;
    zip.write_all(&csv_bytes).context("writing zip member")?;
    zip.finish().context("finishing zip archive")?;

    let parquet_path = args.out_dir.join("cleaned_df.parquet");
    write_parquet(&cols, &parquet_path)?;

    println!(
        "Wrote {} listings to {}, {} and {}",
        args.rows,
        csv_path.display(),
        zip_path.display(),
        parquet_path.display()
    );
    Ok(())
}
