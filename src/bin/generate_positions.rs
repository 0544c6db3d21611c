use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Builder, ListBuilder};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use serde::Serialize;

const HELIX_POINTS: usize = 60;
const CLUSTER_POINTS: usize = 20;
/// Indices of the helix points that get a neighbourhood file `<index + 1>.json`.
const CLUSTER_CENTRES: [usize; 2] = [29, 49];

#[derive(Serialize)]
struct Record {
    position: [f64; 3],
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

    fn jitter(&mut self, p: [f64; 3], std_dev: f64) -> [f64; 3] {
        [
            self.gauss(p[0], std_dev),
            self.gauss(p[1], std_dev),
            self.gauss(p[2], std_dev),
        ]
    }
}

fn helix(n: usize, rng: &mut SimpleRng) -> Vec<[f64; 3]> {
    (0..n)
        .map(|i| {
            let t = i as f64 / n as f64 * 4.0 * std::f64::consts::PI;
            rng.jitter([5.0 * t.cos(), 5.0 * t.sin(), 0.8 * t], 0.15)
        })
        .collect()
}

fn write_json(path: &str, positions: &[[f64; 3]]) -> Result<()> {
    let records: Vec<Record> = positions
        .iter()
        .map(|&position| Record { position })
        .collect();
    let file = std::fs::File::create(path).with_context(|| format!("creating {path}"))?;
    serde_json::to_writer_pretty(file, &records).with_context(|| format!("writing {path}"))?;
    log::info!("Wrote {} positions to {path}", records.len());
    Ok(())
}

fn write_parquet(path: &str, positions: &[[f64; 3]]) -> Result<()> {
    let mut builder = ListBuilder::new(Float64Builder::new());
    for p in positions {
        builder.values().append_slice(p);
        builder.append(true);
    }
    let array = builder.finish();

    let schema = Arc::new(Schema::new(vec![Field::new(
        "position",
        DataType::List(Arc::new(Field::new("item", DataType::Float64, true))),
        false,
    )]));
    let batch = RecordBatch::try_new(schema.clone(), vec![Arc::new(array)])
        .context("building record batch")?;

    let file = std::fs::File::create(path).with_context(|| format!("creating {path}"))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    log::info!("Wrote {} positions to {path}", positions.len());
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let mut rng = SimpleRng::new(42);

    let positions = helix(HELIX_POINTS, &mut rng);
    write_json("p.json", &positions)?;
    write_parquet("p.parquet", &positions)?;

    for centre in CLUSTER_CENTRES {
        let cluster: Vec<[f64; 3]> = (0..CLUSTER_POINTS)
            .map(|_| rng.jitter(positions[centre], 0.6))
            .collect();
        write_json(&format!("{}.json", centre + 1), &cluster)?;
    }
    Ok(())
}
