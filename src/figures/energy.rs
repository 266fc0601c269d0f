//! Energy of each spin configuration relative to a reference one, as a
//! function of the filling.

use std::path::PathBuf;
use tracing::debug;
use crate::{
    config::EnergyConfig,
    observable::{Column, FillingTable, Observable},
    plt::{self, Layout},
    Error,
};
use super::{filling::{series_legend, Curve}, save, SaveOptions};

const ENERGY: [Observable; 1] = [Observable::Energy];

/// `energy - reference` over the common prefix of both series.
pub fn relative(energy: &[f64], reference: &[f64]) -> Vec<f64> {
    energy.iter().zip(reference).map(|(e, r)| e - r).collect()
}

/// Load the relative energy of every series.  The reference file must
/// exist; other missing files are skipped.
pub fn load_curves(cfg: &EnergyConfig) -> Result<Vec<Curve>, Error> {
    let path = cfg.data.with_prefix(&cfg.reference).path();
    let reference = FillingTable::load(&path, &ENERGY, false)?
        .column(Column::Energy)?;
    let mut curves = Vec::with_capacity(cfg.series.len());
    for (i, entry) in cfg.series.iter().enumerate() {
        let path = cfg.data.with_prefix(&entry.prefix).path();
        let Some(t) = FillingTable::load_or_skip(&path, &ENERGY, false)?
        else { continue };
        let de = relative(&Observable::Energy.evaluate(&t)?, &reference);
        let mut n = t.n()?;
        if n.len() != de.len() {
            debug!(series = %entry.prefix, rows = n.len(), kept = de.len(),
                   "series longer than the reference, truncating");
            n.truncate(de.len());
        }
        curves.push(Curve { series: i, n, values: vec![de] });
    }
    Ok(curves)
}

pub fn render(cfg: &EnergyConfig, keep_open: bool) -> Result<PathBuf, Error> {
    let curves = load_curves(cfg)?;
    if curves.is_empty() {
        return Err(Error::NoDataFiles)
    }
    let style = &cfg.style;

    plt::rc_defaults()?;
    plt::rc("font.size", style.font_size)?;
    let palette = plt::colormap(&style.cmap, cfg.series.len())?;
    let layout = Layout { figsize: Some((style.figsize[0], style.figsize[1])),
                          ..Layout::default() };
    let (fig, mut axes) = plt::subplots(&layout)?;
    let ax = &mut axes[0];
    for c in &curves {
        ax.xy(&c.n, &c.values[0]).color(palette[c.series])
            .linewidth(style.linewidth).plot()?;
    }
    ax.set_ylabel("energy")?.set_xlabel("n")?.grid(true)?;
    fig.suptitle(&style.title, Some(style.title_fontsize))?;
    series_legend(&fig, &cfg.series, &palette, style)?;
    fig.tight_layout(Some([0., 0.14, 1., 0.93]))?;

    save(fig, &cfg.output, SaveOptions { dpi: Some(style.dpi), keep_open,
                                         ..SaveOptions::default() })?;
    Ok(cfg.output.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use crate::{figures::fixtures::filling_file, filename::DataFileSpec,
                spin::SpinConfig};

    fn config(dir: &Path) -> EnergyConfig {
        EnergyConfig {
            data: DataFileSpec { dir: dir.to_path_buf(),
                                 ..EnergyConfig::default().data },
            series: vec![SpinConfig::Twin.into(), SpinConfig::Sato.into(),
                         SpinConfig::Fm.into()],
            output: dir.join("e.png"),
            ..EnergyConfig::default()
        }
    }

    #[test]
    fn relative_uses_common_length() {
        assert_eq!(relative(&[1., 2., 3.], &[0.5, 0.5]), vec![0.5, 1.5]);
        assert!(relative(&[1.], &[]).is_empty());
    }

    #[test]
    fn energies_relative_to_reference() -> Result<(), Error> {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = config(dir.path());
        let path = |p: &str| cfg.data.with_prefix(p).path();
        filling_file(&path("FmTmd"), &[0., 0.5], |n| [-n, 0., 0., 0., 0., 0.]);
        filling_file(&path("TwinTmd"), &[0., 0.5, 1.],
                     |n| [1. - 2. * n, 0., 0., 0., 0., 0.]);
        let curves = load_curves(&cfg)?;
        // Sato is missing.
        assert_eq!(curves.iter().map(|c| c.series).collect::<Vec<_>>(), vec![0, 2]);
        assert_eq!(curves[0].n, vec![0., 0.5]);
        assert_eq!(curves[0].values[0], vec![1., 0.5]);
        assert_eq!(curves[1].values[0], vec![0., 0.]);
        Ok(())
    }

    #[test]
    fn missing_reference_is_fatal() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = config(dir.path());
        filling_file(&cfg.data.with_prefix("TwinTmd").path(), &[0.],
                     |_| [0.; 6]);
        assert!(matches!(load_curves(&cfg), Err(Error::FileNotFound(_))));
    }

    #[test]
    fn renders_png() -> Result<(), Error> {
        if !plt::available() { return Ok(()) }
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = config(dir.path());
        let path = |p: &str| cfg.data.with_prefix(p).path();
        filling_file(&path("FmTmd"), &[0., 0.5, 1.], |n| [-n, 0., 0., 0., 0., 0.]);
        filling_file(&path("SatoTmd"), &[0., 0.5, 1.], |n| [n, 0., 0., 0., 0., 0.]);
        let out = render(&cfg, false)?;
        assert!(out.exists());
        Ok(())
    }
}
