//! The figures: each module loads its data, reshapes it and draws it.
//!
//! Data handling is kept apart from drawing so that it can be checked
//! without Matplotlib.

use std::{fs, path::{Path, PathBuf}};
use tracing::info;
use crate::{
    config::{BatchConfig, FigureConfig},
    plt::{self, Figure},
    Error,
};

pub mod contour;
pub mod energy;
pub mod filling;
pub mod phase_diagram;

/// Render the figure described by `cfg` and return the path of the
/// written image.
pub fn generate(cfg: &FigureConfig) -> Result<PathBuf, Error> {
    render(cfg, false)
}

/// Render `cfg`.  With `keep_open`, the figure stays registered with
/// pyplot so that a later [`plt::show`] displays it.
pub fn render(cfg: &FigureConfig, keep_open: bool) -> Result<PathBuf, Error> {
    match cfg {
        FigureConfig::PhaseDiagram(c) => phase_diagram::render(c, keep_open),
        FigureConfig::Filling(c) => filling::render(c, keep_open),
        FigureConfig::Energy(c) => energy::render(c, keep_open),
        FigureConfig::Contour(c) => contour::render(c, keep_open),
    }
}

/// Render every figure of `batch`, then show them if requested.
pub fn run_batch(batch: &BatchConfig) -> Result<Vec<PathBuf>, Error> {
    let outputs = batch.figures.iter()
        .map(|f| render(f, batch.show))
        .collect::<Result<Vec<_>, _>>()?;
    if batch.show {
        plt::show()?;
    }
    Ok(outputs)
}

/// How a figure is written to disk.
#[derive(Debug, Clone, Copy, Default)]
struct SaveOptions {
    dpi: Option<f64>,
    bbox_tight: bool,
    keep_open: bool,
}

fn save(fig: Figure, path: &Path, opts: SaveOptions) -> Result<(), Error> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(|e| Error::Io {
            path: dir.to_path_buf(), source: e })?;
    }
    let mut savefig = fig.save();
    if let Some(dpi) = opts.dpi {
        savefig.dpi(dpi);
    }
    if opts.bbox_tight {
        savefig.bbox_tight();
    }
    savefig.to_file(path)?;
    info!(path = %path.display(), "figure saved");
    if opts.keep_open { Ok(()) } else { fig.close() }
}
