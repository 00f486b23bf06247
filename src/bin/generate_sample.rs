//! Writes sample data for trying out the plotter.
//!
//! ```text
//! generate_sample --rows 500 --series 3 > waves.txt
//! generate_sample --format parquet --out waves.parquet
//! generate_sample --stream --interval-ms 20 | rusty-plotter -r 200
//! ```

use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use clap::{Parser, ValueEnum};
use parquet::arrow::ArrowWriter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Parquet,
}

#[derive(Parser, Debug)]
#[command(about = "Generate sample data for rusty-plotter")]
struct Args {
    /// Rows to generate
    #[arg(long, default_value_t = 500)]
    rows: usize,

    /// Signal columns after the leading time column
    #[arg(long, default_value_t = 3)]
    series: usize,

    /// Noise standard deviation
    #[arg(long, default_value_t = 0.05)]
    noise: f64,

    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Output file (stdout for text when omitted)
    #[arg(long)]
    out: Option<PathBuf>,

    /// Emit one value per line forever, for rolling plots
    #[arg(long)]
    stream: bool,

    /// Delay between streamed lines
    #[arg(long, default_value_t = 20)]
    interval_ms: u64,

    #[arg(long, default_value_t = 42)]
    seed: u64,
}

fn signal(t: f64, k: usize) -> f64 {
    let freq = 0.02 * (k + 1) as f64;
    (2.0 * std::f64::consts::PI * freq * t).sin() * (k + 1) as f64
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

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut rng = SimpleRng::new(args.seed);

    if args.stream {
        return stream(&args, &mut rng);
    }

    let columns: Vec<Vec<f64>> = std::iter::once((0..args.rows).map(|i| i as f64).collect::<Vec<f64>>())
        .chain((0..args.series).map(|k| {
            (0..args.rows)
                .map(|i| signal(i as f64, k) + rng.gauss(0.0, args.noise))
                .collect::<Vec<f64>>()
        }))
        .collect();

    match args.format {
        Format::Text => write_text(&args, &columns),
        Format::Parquet => write_parquet(&args, &columns),
    }
}

fn stream(args: &Args, rng: &mut SimpleRng) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for i in 0u64.. {
        let value = signal(i as f64, 0) + rng.gauss(0.0, args.noise);
        if writeln!(out, "{value:.6}").and_then(|_| out.flush()).is_err() {
            // Reader went away.
            return Ok(());
        }
        std::thread::sleep(Duration::from_millis(args.interval_ms));
    }
    Ok(())
}

fn write_text(args: &Args, columns: &[Vec<f64>]) -> Result<()> {
    let sink: Box<dyn Write> = match &args.out {
        Some(path) => Box::new(std::fs::File::create(path).context("creating output file")?),
        None => Box::new(std::io::stdout().lock()),
    };
    let mut out = BufWriter::new(sink);

    let header: Vec<String> = std::iter::once("t".to_string())
        .chain((0..columns.len() - 1).map(|k| format!("s{}", k + 1)))
        .collect();
    writeln!(out, "# {}", header.join(" "))?;
    for r in 0..args.rows {
        let row: Vec<String> = columns.iter().map(|c| format!("{:.6}", c[r])).collect();
        writeln!(out, "{}", row.join(" "))?;
    }
    out.flush()?;
    Ok(())
}

fn write_parquet(args: &Args, columns: &[Vec<f64>]) -> Result<()> {
    let output_path = args
        .out
        .clone()
        .unwrap_or_else(|| PathBuf::from("sample_data.parquet"));

    let names: Vec<String> = std::iter::once("t".to_string())
        .chain((0..columns.len() - 1).map(|k| format!("s{}", k + 1)))
        .collect();
    let schema = Arc::new(Schema::new(
        names
            .iter()
            .map(|n| Field::new(n, DataType::Float64, false))
            .collect::<Vec<_>>(),
    ));
    let arrays: Vec<ArrayRef> = columns
        .iter()
        .map(|c| Arc::new(Float64Array::from(c.clone())) as ArrayRef)
        .collect();

    let batch = RecordBatch::try_new(schema.clone(), arrays).context("building record batch")?;

    let file = std::fs::File::create(&output_path).context("creating output file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing parquet writer")?;

    println!(
        "Wrote {} rows x {} columns to {}",
        args.rows,
        columns.len(),
        output_path.display()
    );
    Ok(())
}
