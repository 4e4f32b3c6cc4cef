use std::fs::File;
use std::io::Write as _;

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate};

/// Price sources reporting in the sample archive.
const SOURCES: [&str; 7] = [
    "Binance", "Coinbase", "Kraken", "OKX", "Bybit", "Gate", "KuCoin",
];

/// Fixed-point scale of the raw `Price` column.
const PRICE_SCALE: f64 = 100_000_000.0;

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
    let mut rng = SimpleRng::new(42);

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["Block Timestamp", "Price", "Volume", "Source"])?;

    // Hourly grid over two weeks; the consensus price is a random walk.
    let start = NaiveDate::from_ymd_opt(2024, 1, 1)
        .context("bad start date")?
        .and_hms_opt(0, 0, 0)
        .context("bad start time")?;
    let mut consensus = 123.45;
    let mut row = 0usize;

    for hour in 0..(14 * 24) {
        let timestamp = start + Duration::hours(hour);
        consensus = (consensus + rng.gauss(0.0, 0.4)).max(1.0);

        // Every 11th hour only three sources report, which leaves the
        // timestamp below the 5-source quorum.
        let reporting = if hour % 11 == 10 { 3 } else { SOURCES.len() };

        for source in &SOURCES[..reporting] {
            let price = consensus + rng.gauss(0.0, 0.15);
            let raw_price = (price * PRICE_SCALE).round() as i64;

            // Occasional malformed volume, as seen in real archives.
            let volume = if row % 37 == 21 {
                "N/A".to_string()
            } else {
                format!("{:.4}", rng.next_f64() * 5_000.0)
            };

            writer.write_record([
                timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
                raw_price.to_string(),
                volume,
                source.to_string(),
            ])?;
            row += 1;
        }
    }

    let csv_bytes = writer
        .into_inner()
        .map_err(|e| e.into_error())
        .context("flushing CSV")?;

    std::fs::create_dir_all("sample_data").context("creating sample_data/")?;
    let file = File::create("sample_data/data.zip").context("creating data.zip")?;
    let mut zip = zip::ZipWriter::new(file);
    zip.start_file("data.csv", zip::write::SimpleFileOptions::default())
        .context("starting data.csv entry")?;
    zip.write_all(&csv_bytes).context("writing data.csv")?;
    zip.finish().context("finalizing archive")?;

    println!("Wrote sample_data/data.zip ({row} rows)");
    Ok(())
}
