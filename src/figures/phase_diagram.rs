//! Heatmap of a quantity over the filling `n` and the exchange
//! coupling `j`, interpolated from one data file per `j`.

use std::path::PathBuf;
use tracing::info;
use crate::{
    config::PhaseDiagramConfig,
    interp::{Grid, SampleCollection},
    observable::FillingTable,
    plt::{self, Layout},
    table, Error,
};
use super::{save, SaveOptions};

/// The data file of every coupling of the sweep.
pub fn file_list(cfg: &PhaseDiagramConfig) -> Vec<(f64, PathBuf)> {
    cfg.j.values().into_iter()
        .map(|j| (j, cfg.data.with_j(j).path()))
        .collect()
}

/// Gather `(n, j, quantity)` samples from all available files.  The
/// `j = 0` case is known to vanish identically and is not read: it gets
/// zeros on the `n` axis of the first available file.
pub fn collect_samples(cfg: &PhaseDiagramConfig) -> Result<SampleCollection, Error> {
    let files = file_list(cfg);
    let candidates: Vec<&PathBuf> = files.iter()
        .filter(|(j, _)| *j != 0.)
        .map(|(_, p)| p)
        .collect();
    let template = table::n_axis_template(&candidates)?;

    let absent = table::missing(&candidates);
    info!(files = files.len(), missing = absent.len(), "loading data files");
    let mut samples = SampleCollection::new();
    for (j, path) in &files {
        if *j == 0. {
            info!("j = 0: adding a zero series");
            samples.push_series(0., &template, &vec![0.; template.len()]);
            continue
        }
        let Some(t) = FillingTable::load_or_skip(path, &[cfg.quantity], false)?
        else { continue };
        samples.push_series(*j, &t.n()?, &cfg.quantity.evaluate(&t)?);
    }
    Ok(samples)
}

/// Samples interpolated on `cfg.n_points` fillings times the couplings.
pub fn build_grid(cfg: &PhaseDiagramConfig) -> Result<Grid, Error> {
    let samples = collect_samples(cfg)?;
    info!(samples = samples.len(), "interpolating");
    samples.interpolate(cfg.n_points)
}

pub fn render(cfg: &PhaseDiagramConfig, keep_open: bool) -> Result<PathBuf, Error> {
    let grid = build_grid(cfg)?;

    plt::rc_defaults()?;
    let layout = Layout { figsize: Some((cfg.figsize[0], cfg.figsize[1])),
                          ..Layout::default() };
    let (fig, mut axes) = plt::subplots(&layout)?;
    let ax = &mut axes[0];
    let image = ax.imshow(&grid.z)
        .extent(grid.extent())
        .origin_lower()
        .aspect_auto()
        .cmap(&cfg.cmap)
        .clim(-cfg.color_range, cfg.color_range)
        .plot()?;
    ax.tick_labelsize(cfg.labelsize)?;
    fig.colorbar(&image, Some(cfg.labelsize))?;
    if let Some([left, right]) = cfg.xlim {
        ax.set_xlim(left, right)?;
    }
    if let Some([bottom, top]) = cfg.ylim {
        ax.set_ylim(bottom, top)?;
    }
    fig.tight_layout(None)?;

    let output = cfg.output_path();
    save(fig, &output, SaveOptions { keep_open, ..SaveOptions::default() })?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{fs, path::Path};
    use crate::{config::JSweep, figures::fixtures::filling_file,
                filename::DataFileSpec, observable::Observable};

    const NS: [f64; 5] = [0., 0.25, 0.5, 0.75, 1.];

    fn config(dir: &Path) -> PhaseDiagramConfig {
        PhaseDiagramConfig {
            data: DataFileSpec { dir: dir.to_path_buf(), ..DataFileSpec::default() },
            j: JSweep { start: 0., step: 0.25, count: 3 },
            quantity: Observable::QmdY,
            output: Some(dir.join("out").join("qmd_y.png")),
            ..PhaseDiagramConfig::default()
        }
    }

    /// Data files at j = 0.25 and 0.5 with `qmd_y = j (1 + n)`.  The
    /// j = 0 file is garbage: reading it would fail.
    fn populate(cfg: &PhaseDiagramConfig) {
        for (j, path) in file_list(cfg) {
            if j == 0. {
                fs::write(&path, "not,a,table\n").expect("write");
            } else {
                filling_file(&path, &NS,
                             |n| [-n, 0., 0., 0., 0., j * (1. + n)]);
            }
        }
    }

    #[test]
    fn zero_coupling_is_synthesized() -> Result<(), Error> {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = config(dir.path());
        populate(&cfg);
        let samples = collect_samples(&cfg)?;
        assert_eq!(samples.len(), 15);
        let zero: Vec<_> = samples.samples().iter().filter(|s| s.y == 0.).collect();
        assert_eq!(zero.len(), NS.len());
        assert!(zero.iter().all(|s| s.z == 0.));
        assert_eq!(zero.iter().map(|s| s.x).collect::<Vec<_>>(), NS.to_vec());
        Ok(())
    }

    #[test]
    fn grid_over_three_couplings() -> Result<(), Error> {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = config(dir.path());
        populate(&cfg);
        let grid = build_grid(&cfg)?;
        assert_eq!(grid.z.dim(), (3, 500));
        assert_eq!(grid.y, vec![0., 0.25, 0.5]);
        assert_eq!(grid.extent(), [0., 1., 0., 0.5]);
        assert!(grid.z.row(0).iter().all(|&z| z == 0.));
        // Samples at j = 0.5 are reproduced at the ends of the row.
        let top = grid.row(0.5).expect("row at j = 0.5");
        approx::assert_abs_diff_eq!(top[0], 0.5, epsilon = 1e-12);
        approx::assert_abs_diff_eq!(top[499], 1.0, epsilon = 1e-12);
        Ok(())
    }

    #[test]
    fn missing_files_are_skipped() -> Result<(), Error> {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = PhaseDiagramConfig {
            j: JSweep { start: 0., step: 0.25, count: 4 },
            ..config(dir.path())
        };
        // Nothing at j = 0.75.
        populate(&PhaseDiagramConfig { j: JSweep { count: 3, ..cfg.j }, ..cfg.clone() });
        let grid = build_grid(&cfg)?;
        assert_eq!(grid.y, vec![0., 0.25, 0.5]);
        Ok(())
    }

    #[test]
    fn no_file_at_all() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(matches!(build_grid(&config(dir.path())), Err(Error::NoDataFiles)));
    }

    #[test]
    fn renders_png() -> Result<(), Error> {
        if !plt::available() { return Ok(()) }
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = config(dir.path());
        populate(&cfg);
        let out = render(&cfg, false)?;
        assert!(out.exists());
        Ok(())
    }
}
