use std::path::Path;

use anyhow::{Context, Result};
use posplot::{app, plot, PlotConfig};

/// Sources plotted on every run, the first one doubling as the highlight reference.
const SOURCES: [&str; 3] = ["p.json", "30.json", "50.json"];

/// Records of `p.json` drawn again with large markers.
const HIGHLIGHTS: [usize; 2] = [29, 49];

/// Optional overrides merged over the built-in config.
const CONFIG_FILE: &str = "posplot.json";

fn main() -> Result<()> {
    env_logger::init();

    let defaults = PlotConfig {
        highlights: HIGHLIGHTS.to_vec(),
        ..Default::default()
    };
    let config = PlotConfig::load_or(Path::new(CONFIG_FILE), defaults)
        .context("loading plot config")?;

    let figure = plot(&SOURCES, config).context("plotting positions")?;

    // The figure is already on disk; a missing display only skips the viewer.
    if let Err(e) = app::run(figure) {
        log::warn!("viewer unavailable: {e}");
    }
    Ok(())
}
