//! Constant-energy contours in the first Brillouin zone, colored by
//! spin, with the zone boundary drawn on top.

use std::path::{Path, PathBuf};
use tracing::info;
use crate::{
    config::ContourConfig,
    plt::{self, Color, Layout},
    table::{self, Schema},
    Error,
};
use super::{save, SaveOptions};

const COLUMNS: [&str; 9] = ["energy", "line_start_kx", "line_start_ky",
                            "line_end_kx", "line_end_ky", "bcd_x", "bcd_y",
                            "spin", "band_index"];

/// One line segment of a contour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub energy: f64,
    pub start: (f64, f64),
    pub end: (f64, f64),
    /// Berry curvature dipole carried by the segment.
    pub bcd: (f64, f64),
    pub spin: i64,
    pub band: i64,
}

/// Label stored as a float; non-finite values map to [`NO_LABEL`].
fn label(v: f64) -> i64 {
    if v.is_finite() { v as i64 } else { NO_LABEL }
}

/// Spin or band of a segment whose field was not a number.
pub const NO_LABEL: i64 = -1;

/// Read all segments of the contour file `path`.
pub fn load_segments(path: impl AsRef<Path>) -> Result<Vec<Segment>, Error> {
    let path = path.as_ref();
    let df = table::read_table(path, &Schema::floats(&COLUMNS))?;
    let cols = COLUMNS.iter()
        .map(|c| table::floats(&df, c))
        .collect::<Result<Vec<_>, _>>()?;
    let segments: Vec<Segment> = (0 .. df.height())
        .map(|i| Segment {
            energy: cols[0][i],
            start: (cols[1][i], cols[2][i]),
            end: (cols[3][i], cols[4][i]),
            bcd: (cols[5][i], cols[6][i]),
            spin: label(cols[7][i]),
            band: label(cols[8][i]),
        })
        .collect();
    if segments.is_empty() {
        return Err(Error::NoContourSegments(path.to_path_buf()))
    }
    Ok(segments)
}

/// The energy among `segments` closest to `target`.  Ties go to the
/// first segment.
pub fn nearest_energy(segments: &[Segment], target: f64) -> Option<f64> {
    let mut best: Option<(f64, f64)> = None;
    for s in segments {
        let d = (s.energy - target).abs();
        if best.map_or(true, |(bd, _)| d < bd) {
            best = Some((d, s.energy));
        }
    }
    best.map(|(_, e)| e)
}

/// Segments of one band and spin.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub band: i64,
    pub spin: i64,
    pub segments: Vec<Segment>,
}

impl Group {
    /// All segments as a single polyline, consecutive segments being
    /// separated by NaN so that they are not joined.
    pub fn polyline(&self) -> (Vec<f64>, Vec<f64>) {
        let n = 3 * self.segments.len();
        let (mut x, mut y) = (Vec::with_capacity(n), Vec::with_capacity(n));
        for (i, s) in self.segments.iter().enumerate() {
            if i > 0 {
                x.push(f64::NAN);
                y.push(f64::NAN);
            }
            x.extend([s.start.0, s.end.0]);
            y.extend([s.start.1, s.end.1]);
        }
        (x, y)
    }
}

/// Segments at exactly `energy`, grouped by (band, spin) in order of
/// first appearance.
pub fn groups_at(segments: &[Segment], energy: f64) -> Vec<Group> {
    let mut groups: Vec<Group> = Vec::new();
    for s in segments.iter().filter(|s| s.energy == energy) {
        match groups.iter_mut().find(|g| g.band == s.band && g.spin == s.spin) {
            Some(g) => g.segments.push(*s),
            None => groups.push(Group { band: s.band, spin: s.spin,
                                        segments: vec![*s] }),
        }
    }
    groups
}

pub fn spin_color(spin: i64) -> Color {
    match spin {
        1 => Color::Named("red"),
        0 => Color::Named("blue"),
        _ => Color::Named("gray"),
    }
}

fn set_style() -> Result<(), Error> {
    plt::rc_defaults()?;
    plt::rc("font.family", "serif")?;
    plt::rc("font.serif", vec!["Computer Modern Roman", "DejaVu Serif"])?;
    plt::rc("mathtext.fontset", "cm")?;
    plt::rc("axes.labelsize", 24)?;
    plt::rc("xtick.labelsize", 16)?;
    plt::rc("ytick.labelsize", 16)?;
    plt::rc("legend.fontsize", 14)
}

pub fn render(cfg: &ContourConfig, keep_open: bool) -> Result<PathBuf, Error> {
    let input = cfg.input_path();
    let segments = load_segments(&input)?;
    let energy = nearest_energy(&segments, cfg.target_energy)
        .ok_or_else(|| Error::NoContourSegments(input.clone()))?;
    let groups = groups_at(&segments, energy);
    info!(target = cfg.target_energy, closest = energy,
          pairs = groups.len(), "closest contour energy");
    for g in &groups {
        info!(band = g.band, spin = g.spin, segments = g.segments.len(),
              "contour group");
    }

    set_style()?;
    let layout = Layout { figsize: Some((cfg.figsize[0], cfg.figsize[1])),
                          ..Layout::default() };
    let (fig, mut axes) = plt::subplots(&layout)?;
    let ax = &mut axes[0];
    for g in &groups {
        let (x, y) = g.polyline();
        ax.xy(&x, &y).color(spin_color(g.spin))
            .alpha(cfg.alpha).linewidth(cfg.linewidth).plot()?;
    }
    let lim = cfg.zone_size.axis_limit();
    let ticks = cfg.zone_size.ticks();
    ax.set_xlabel("$k_x$")?.set_ylabel("$k_y$")?
        .set_xlim(-lim, lim)?.set_ylim(-lim, lim)?
        .grid(false)?.set_aspect_equal()?
        .set_xticks(&ticks)?.set_yticks(&ticks)?;
    fig.tight_layout(None)?;

    let (hx, hy): (Vec<f64>, Vec<f64>) =
        cfg.zone_size.hexagon().into_iter().unzip();
    ax.xy(&hx, &hy).color(Color::Named("black"))
        .linestyle("--").linewidth(2.).plot()?;

    let output = cfg.output_path();
    save(fig, &output, SaveOptions { dpi: Some(cfg.dpi), bbox_tight: true,
                                     keep_open })?;
    Ok(output)
}
