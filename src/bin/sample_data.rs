//! Write a synthetic `data.txt` in the simulation output format, so the
//! plotter can be tried without a simulation run.

use std::{
    fs::File,
    io::{BufWriter, Write},
};

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

const DATA_FILE: &str = "data.txt";
const POINTS: usize = 5000;
const DT: f64 = 0.01;

/// Golden angle, radians.  Spreads successive points evenly over the
/// unit disc (Vogel spiral), which reads like a relaxed particle cloud.
const GOLDEN_ANGLE: f64 = 2.399_963_229_728_653;

fn record(i: usize) -> (f64, f64, f64) {
    let t = i as f64 * DT;
    let r = (i as f64 / POINTS as f64).sqrt();
    let theta = i as f64 * GOLDEN_ANGLE;
    (t, r * theta.cos(), r * theta.sin())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let file = File::create(DATA_FILE)
        .with_context(|| format!("cannot create {}", DATA_FILE))?;
    let mut out = BufWriter::new(file);

    writeln!(out, "# t x y")?;
    for i in 0..POINTS {
        let (t, x, y) = record(i);
        writeln!(out, "{:+.8} {:+.8} {:+.8}", t, x, y)?;
    }
    out.flush()?;

    info!(points = POINTS, "wrote {}", DATA_FILE);
    Ok(())
}
