//! Scatter-plot `data.txt` from the working directory.

use anyhow::Context;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use dataplot::{self as plt, Columns, Series};

/// Input file, resolved against the working directory.
const DATA_FILE: &str = "data.txt";

/// Token positions extracted from each record.  A build-time constant:
/// the default build plots the spatial pair of three-column `t x y`
/// records, the `leading-columns` build plots the first two tokens.
#[cfg(not(feature = "leading-columns"))]
const COLUMNS: Columns = Columns::SPATIAL;
#[cfg(feature = "leading-columns")]
const COLUMNS: Columns = Columns::LEADING;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let series = Series::from_path(DATA_FILE, COLUMNS)
        .with_context(|| format!("cannot plot {}", DATA_FILE))?;
    info!(points = series.len(), "loaded {}", DATA_FILE);

    plt::rc_font("sans-serif", 20.)?;
    plt::rc_usetex(true)?;

    let (_fig, [[mut ax]]) = plt::subplots()?;
    ax.set_xlabel("$x$").set_ylabel("$y$");
    ax.xy(series.x(), series.y()).fmt("o").markersize(0.4).plot();

    debug!("entering the GUI event loop");
    plt::show()?;
    Ok(())
}
