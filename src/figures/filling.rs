//! Stacked panels of summed quantities versus the filling `n`, one line
//! per spin configuration, optionally overlaid with markers colored by
//! the most stable configuration at each filling.

use std::path::PathBuf;
use tracing::info;
use crate::{
    config::{FillingConfig, OverlayStyle, SeriesEntry},
    limits::RunningRange,
    observable::{FillingTable, Observable},
    plt::{self, Color, Figure, Layout, Legend},
    spin::{marker_color, SpinConfig, StableLabel},
    Error,
};
use super::{save, SaveOptions};

/// The panels' values of one data series.
#[derive(Debug, Clone)]
pub struct Curve {
    /// Index of the series in the configuration, which picks its color.
    pub series: usize,
    pub n: Vec<f64>,
    /// One vector per panel.
    pub values: Vec<Vec<f64>>,
}

impl Curve {
    fn from_table(series: usize, t: &FillingTable, panels: &[Observable])
                  -> Result<Curve, Error> {
        Ok(Curve {
            series,
            n: t.n()?,
            values: panels.iter().map(|o| o.evaluate(t))
                .collect::<Result<_, _>>()?,
        })
    }
}

/// Stable-configuration markers: panel values and the label at each `n`.
#[derive(Debug, Clone)]
pub struct Markers {
    pub curve: Curve,
    pub labels: Vec<StableLabel>,
}

/// Load every configured series; missing files are skipped.
pub fn load_curves(cfg: &FillingConfig) -> Result<Vec<Curve>, Error> {
    let mut curves = Vec::with_capacity(cfg.series.len());
    for (i, entry) in cfg.series.iter().enumerate() {
        let path = cfg.data.with_prefix(&entry.prefix).path();
        if let Some(t) = FillingTable::load_or_skip(&path, &cfg.panels, false)? {
            curves.push(Curve::from_table(i, &t, &cfg.panels)?);
        }
    }
    Ok(curves)
}

pub fn load_markers(cfg: &FillingConfig) -> Result<Option<Markers>, Error> {
    let Some(prefix) = &cfg.stable else { return Ok(None) };
    let path = cfg.data.with_prefix(prefix).path();
    let Some(t) = FillingTable::load_or_skip(&path, &cfg.panels, true)?
    else { return Ok(None) };
    Ok(Some(Markers {
        curve: Curve::from_table(usize::MAX, &t, &cfg.panels)?,
        labels: t.stable_labels()?,
    }))
}

/// Running range of each panel over all `curves`.
pub fn panel_ranges(curves: &[Curve], panels: usize) -> Vec<RunningRange> {
    let mut ranges = vec![RunningRange::default(); panels];
    for c in curves {
        for (range, values) in ranges.iter_mut().zip(&c.values) {
            range.update(values)
        }
    }
    ranges
}

/// Colors of the stable markers: the color of the matching series, the
/// neutral color otherwise.
pub fn marker_colors(series: &[SeriesEntry], palette: &[Color],
                     labels: &[StableLabel]) -> Vec<Color> {
    let (spins, colors): (Vec<SpinConfig>, Vec<Color>) = series.iter()
        .zip(palette)
        .filter_map(|(s, &c)| SpinConfig::from_prefix(&s.prefix).map(|sc| (sc, c)))
        .unzip();
    labels.iter().map(|&l| marker_color(l, &spins, &colors)).collect()
}

/// Colored patches naming the series, below the panels.
pub(crate) fn series_legend(fig: &Figure, series: &[SeriesEntry],
                            palette: &[Color], style: &OverlayStyle)
                            -> Result<(), Error> {
    let entries: Vec<(Color, &str)> = palette.iter().copied()
        .zip(series.iter().map(|s| s.label.as_str()))
        .collect();
    fig.legend(&entries, &Legend {
        title: style.legend_title.as_deref(),
        loc: "lower center",
        ncol: style.legend_ncol.max(1),
        frameon: false,
        fontsize: Some(style.legend_fontsize),
        title_fontsize: Some(style.legend_fontsize + 2.),
    })
}

pub fn render(cfg: &FillingConfig, keep_open: bool) -> Result<PathBuf, Error> {
    let curves = load_curves(cfg)?;
    if curves.is_empty() {
        return Err(Error::NoDataFiles)
    }
    let markers = load_markers(cfg)?;
    let ranges = panel_ranges(&curves, cfg.panels.len());
    let style = &cfg.style;

    plt::rc_defaults()?;
    plt::rc("font.size", style.font_size)?;
    let palette = plt::colormap(&style.cmap, cfg.series.len())?;
    let layout = Layout { nrows: cfg.panels.len().max(1), ncols: 1,
                          figsize: Some((style.figsize[0], style.figsize[1])),
                          sharex: true };
    let (fig, mut axes) = plt::subplots(&layout)?;

    for c in &curves {
        for (ax, y) in axes.iter_mut().zip(&c.values) {
            ax.xy(&c.n, y).color(palette[c.series])
                .linewidth(style.linewidth).plot()?;
        }
    }
    if let Some(m) = &markers {
        let colors = marker_colors(&cfg.series, &palette, &m.labels);
        info!(points = colors.len(), "stable configuration markers");
        for (ax, y) in axes.iter_mut().zip(&m.curve.values) {
            ax.scatter(&m.curve.n, y).colors(&colors)
                .size(cfg.marker_size).alpha(cfg.marker_alpha).plot()?;
        }
    }
    for ((ax, obs), range) in axes.iter_mut().zip(&cfg.panels).zip(&ranges) {
        let (bottom, top) = range.ylim();
        ax.set_ylim(bottom, top)?;
        if let Some([left, right]) = cfg.xlim {
            ax.set_xlim(left, right)?;
        }
        ax.set_ylabel(obs.label())?.grid(true)?;
    }
    if let Some(ax) = axes.last_mut() {
        ax.set_xlabel("n")?;
    }
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
    use std::{fs, path::Path};
    use crate::{figures::fixtures::filling_file, filename::DataFileSpec,
                spin::NEUTRAL};

    const NS: [f64; 3] = [0., 0.5, 1.];

    fn config(dir: &Path) -> FillingConfig {
        FillingConfig {
            data: DataFileSpec { dir: dir.to_path_buf(), ..DataFileSpec::default() },
            series: vec![SpinConfig::Fm.into(), SpinConfig::Twin.into(),
                         SpinConfig::Sato.into()],
            panels: vec![Observable::Bc, Observable::BcdRotated],
            output: dir.join("figure").join("filling.png"),
            ..FillingConfig::default()
        }
    }

    /// Fm and Twin files exist, Sato is missing.
    fn populate(cfg: &FillingConfig) {
        let path = |p: &str| cfg.data.with_prefix(p).path();
        filling_file(&path("FmTmd"), &NS, |n| [0., n, 0., 2., 0., 0.]);
        filling_file(&path("TwinTmd"), &NS, |n| [0., -3. * n, 2., 0., 0., 0.]);
        let stable = "0,0,0,0,0,0,0,FmTmd\n0.5,0,0,0,0,0,0,TwinTmd\n1,0,0,0,0,0,0\n";
        fs::write(path("stable"), stable).expect("write");
    }

    #[test]
    fn curves_skip_missing_series() -> Result<(), Error> {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = config(dir.path());
        populate(&cfg);
        let curves = load_curves(&cfg)?;
        assert_eq!(curves.iter().map(|c| c.series).collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(curves[0].n, NS.to_vec());
        assert_eq!(curves[1].values[0], vec![0., -1.5, -3.]);
        let ranges = panel_ranges(&curves, 2);
        assert_eq!(ranges[0], RunningRange { min: -3., max: 1. });
        assert_eq!(ranges[0].ylim(), (-2., 2.));
        // bcd_y / 2 + bcd_x √3 / 2 is 1 for Fm and √3 for Twin.
        approx::assert_abs_diff_eq!(ranges[1].min, 1., epsilon = 1e-12);
        approx::assert_abs_diff_eq!(ranges[1].max, 3f64.sqrt(), epsilon = 1e-12);
        Ok(())
    }

    #[test]
    fn markers_follow_series_colors() -> Result<(), Error> {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = config(dir.path());
        populate(&cfg);
        let m = load_markers(&cfg)?.expect("stable file");
        assert_eq!(m.labels, vec![StableLabel::Known(SpinConfig::Fm),
                                  StableLabel::Known(SpinConfig::Twin),
                                  StableLabel::Unknown]);
        let palette = [Color::Named("red"), Color::Named("green"),
                       Color::Named("blue")];
        assert_eq!(marker_colors(&cfg.series, &palette, &m.labels),
                   vec![Color::Named("red"), Color::Named("green"), NEUTRAL]);
        Ok(())
    }

    #[test]
    fn no_markers_without_stable_file() -> Result<(), Error> {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = config(dir.path());
        assert!(load_markers(&cfg)?.is_none());
        assert!(load_markers(&FillingConfig { stable: None, ..cfg })?.is_none());
        Ok(())
    }

    #[test]
    fn nothing_to_draw() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(matches!(render(&config(dir.path()), false),
                         Err(Error::NoDataFiles)));
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
