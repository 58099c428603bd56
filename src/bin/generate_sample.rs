use std::fs::File;
use std::io::{BufWriter, Write};

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate};
use flate2::write::GzEncoder;
use flate2::Compression;

/// Relative pickup volume per hour of day (evening rush peaks at 17–18).
const HOURLY_WEIGHTS: [f64; 24] = [
    2.0, 1.3, 0.9, 0.9, 1.0, 1.5, 2.8, 3.6, 3.8, 3.1, 2.8, 2.9, //
    3.1, 3.2, 3.7, 4.2, 4.7, 5.2, 5.1, 4.6, 4.3, 4.2, 3.8, 2.9,
];

/// (lat, lon, std-dev in degrees, weight) of pickup hotspots.
const HOTSPOTS: [(f64, f64, f64, f64); 4] = [
    (40.7549, -73.9840, 0.020, 0.60), // Midtown
    (40.7194, -74.0020, 0.015, 0.25), // Lower Manhattan
    (40.6437, -73.7823, 0.006, 0.10), // JFK
    (40.7769, -73.8740, 0.004, 0.05), // LaGuardia
];

const BASES: [&str; 5] = ["B02512", "B02598", "B02617", "B02682", "B02764"];

/// SplitMix64: one word of state, deterministic for a given seed.
struct SplitMix(u64);

impl SplitMix {
    fn next_u64(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9e37_79b9_7f4a_7c15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
        z ^ (z >> 31)
    }

    /// Uniform in `[0, 1)`.
    fn unit(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 * f64::EPSILON / 2.0
    }

    fn below(&mut self, n: u64) -> u64 {
        self.next_u64() % n
    }

    /// Approximately normal: sum of twelve uniforms (Irwin-Hall), recentred.
    fn normal(&mut self, mean: f64, std_dev: f64) -> f64 {
        let z: f64 = (0..12).map(|_| self.unit()).sum::<f64>() - 6.0;
        mean + std_dev * z
    }

    /// Index drawn proportionally to `weights`.
    fn weighted(&mut self, weights: impl Iterator<Item = f64> + Clone) -> usize {
        let total: f64 = weights.clone().sum();
        let mut pick = self.unit() * total;
        let mut last = 0;
        for (i, w) in weights.enumerate() {
            last = i;
            if pick < w {
                return i;
            }
            pick -= w;
        }
        last
    }
}

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let output_path = args
        .next()
        .unwrap_or_else(|| "sample_pickups.csv.gz".to_string());
    let rows: usize = match args.next() {
        Some(n) => n.parse().with_context(|| format!("invalid row count '{n}'"))?,
        None => 50_000,
    };

    let mut rng = SplitMix(42);
    let month_start = NaiveDate::from_ymd_opt(2014, 9, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .context("invalid start date")?;

    let file = File::create(&output_path).with_context(|| format!("creating {output_path}"))?;
    let encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
    let mut writer = csv::Writer::from_writer(encoder);
    writer.write_record(["Date/Time", "Lat", "Lon", "Base"])?;

    for _ in 0..rows {
        let day = rng.below(30) as i64;
        let hour = rng.weighted(HOURLY_WEIGHTS.iter().copied()) as i64;
        let second = rng.below(3600) as i64;
        let ts = month_start
            + Duration::days(day)
            + Duration::hours(hour)
            + Duration::seconds(second);

        let spot = rng.weighted(HOTSPOTS.iter().map(|h| h.3));
        let (lat, lon, spread, _) = HOTSPOTS[spot];
        let base = BASES[rng.below(BASES.len() as u64) as usize];

        writer.write_record([
            ts.format("%-m/%-d/%Y %-H:%M:%S").to_string(),
            format!("{:.4}", rng.normal(lat, spread)),
            format!("{:.4}", rng.normal(lon, spread)),
            base.to_string(),
        ])?;
    }

    let encoder = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("flushing CSV: {}", e.error()))?;
    let mut file = encoder.finish().context("finishing gzip stream")?;
    file.flush().with_context(|| format!("flushing {output_path}"))?;

    println!("Wrote {rows} pickups to {output_path}");
    Ok(())
}
