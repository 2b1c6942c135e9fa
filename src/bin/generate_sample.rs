use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

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
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
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

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }
}

fn grade(score: f64) -> &'static str {
    match score {
        s if s >= 85.0 => "A",
        s if s >= 70.0 => "B",
        s if s >= 55.0 => "C",
        s if s >= 40.0 => "D",
        _ => "F",
    }
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let schools = ["North", "South", "East", "West", "Central"];
    let cities = [
        "Aberdeen", "Bergen", "Cork", "Dresden", "Evora", "Florence", "Ghent", "Hamburg",
        "Innsbruck", "Jena", "Krakow", "Lyon",
    ];

    let rows = 120;
    let mut ids = Vec::with_capacity(rows);
    let mut scores = Vec::with_capacity(rows);
    let mut attendance = Vec::with_capacity(rows);
    let mut grades = Vec::with_capacity(rows);
    let mut school = Vec::with_capacity(rows);
    let mut city = Vec::with_capacity(rows);

    for i in 0..rows {
        let score = rng.gauss(68.0, 14.0).clamp(0.0, 100.0);
        ids.push(i as i64 + 1);
        scores.push((score * 10.0).round() / 10.0);
        attendance.push((rng.gauss(0.9, 0.06).clamp(0.4, 1.0) * 100.0).round() / 100.0);
        grades.push(grade(score));
        school.push(rng.pick(&schools));
        city.push(rng.pick(&cities));
    }

    let schema = Arc::new(Schema::new(vec![
        Field::new("student_id", DataType::Int64, false),
        Field::new("score", DataType::Float64, false),
        Field::new("attendance", DataType::Float64, false),
        Field::new("grade", DataType::Utf8, false),
        Field::new("school", DataType::Utf8, false),
        Field::new("city", DataType::Utf8, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Int64Array::from(ids.clone())),
            Arc::new(Float64Array::from(scores.clone())),
            Arc::new(Float64Array::from(attendance.clone())),
            Arc::new(StringArray::from(grades.clone())),
            Arc::new(StringArray::from(school.clone())),
            Arc::new(StringArray::from(city.clone())),
        ],
    )
    .context("building record batch")?;

    // Parquet
    let parquet_path = "sample_data.parquet";
    let file = std::fs::File::create(parquet_path).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;

    // CSV
    let csv_path = "sample_data.csv";
    let mut csv = csv::Writer::from_path(csv_path).context("creating CSV file")?;
    csv.write_record(["student_id", "score", "attendance", "grade", "school", "city"])?;
    for i in 0..rows {
        csv.write_record([
            ids[i].to_string(),
            scores[i].to_string(),
            attendance[i].to_string(),
            grades[i].to_string(),
            school[i].to_string(),
            city[i].to_string(),
        ])?;
    }
    csv.flush().context("flushing CSV file")?;

    println!("Wrote {rows} rows to {parquet_path} and {csv_path}");
    Ok(())
}
