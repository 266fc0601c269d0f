//! Figure descriptions, read from TOML.
//!
//! Every field has a default so a configuration only needs to state
//! what differs from the standard figures:
//!
//! ```toml
//! show = false
//!
//! [[figure]]
//! kind = "phase-diagram"
//! quantity = "bcd-x"
//!
//! [[figure]]
//! kind = "contour"
//! model = "uuudddtmd"
//! target_energy = -1.15
//! ```

use std::{fs, path::{Path, PathBuf}};
use serde::{Deserialize, Serialize};
use crate::{
    bz::ZoneSize,
    filename::DataFileSpec,
    filename::format_param,
    observable::Observable,
    spin::SpinConfig,
    Error,
};

/// A list of figures to render in one run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Open the figures in a window once all of them are saved.
    pub show: bool,
    #[serde(rename = "figure")]
    pub figures: Vec<FigureConfig>,
}

impl BatchConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, Error> {
        Ok(toml::from_str(s)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| Error::Io {
            path: path.to_path_buf(), source: e })?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum FigureConfig {
    /// Heatmap of one quantity over filling × exchange coupling.
    PhaseDiagram(PhaseDiagramConfig),
    /// Stacked panels of quantities versus filling, one line per
    /// configuration.
    Filling(FillingConfig),
    /// Energy of each configuration relative to a reference one.
    Energy(EnergyConfig),
    /// Constant-energy contours over the Brillouin zone.
    Contour(ContourConfig),
}

impl FigureConfig {
    /// Default configuration of the figure `kind`, as named in TOML.
    pub fn default_of(kind: &str) -> Option<FigureConfig> {
        Some(match kind {
            "phase-diagram" => FigureConfig::PhaseDiagram(Default::default()),
            "filling" => FigureConfig::Filling(Default::default()),
            "energy" => FigureConfig::Energy(Default::default()),
            "contour" => FigureConfig::Contour(Default::default()),
            _ => return None,
        })
    }
}

/// Evenly spaced exchange couplings `start + i step`, `i < count`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JSweep {
    pub start: f64,
    pub step: f64,
    pub count: usize,
}

impl JSweep {
    /// The couplings, rounded to the two decimals file names carry.
    pub fn values(&self) -> Vec<f64> {
        (0 .. self.count)
            .map(|i| ((self.start + self.step * i as f64) * 100.).round() / 100.)
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhaseDiagramConfig {
    /// File parameters; `j` is replaced by each value of the sweep.
    pub data: DataFileSpec,
    pub j: JSweep,
    pub quantity: Observable,
    /// Number of resampled points along `n`.
    pub n_points: usize,
    /// The color scale spans `[-color_range, color_range]`.
    pub color_range: f64,
    pub cmap: String,
    pub xlim: Option<[f64; 2]>,
    pub ylim: Option<[f64; 2]>,
    pub figsize: [f64; 2],
    pub labelsize: f64,
    /// Defaults to `<quantity>_interpolated_plot.png`.
    pub output: Option<PathBuf>,
}

impl Default for PhaseDiagramConfig {
    fn default() -> Self {
        PhaseDiagramConfig {
            data: DataFileSpec::default(),
            j: JSweep { start: 0., step: 0.01, count: 50 },
            quantity: Observable::QmdY,
            n_points: 500,
            color_range: 5.,
            cmap: "bwr".to_string(),
            xlim: Some([0., 1.]),
            ylim: Some([0., 0.5]),
            figsize: [10., 8.],
            labelsize: 24.,
            output: None,
        }
    }
}

impl PhaseDiagramConfig {
    pub fn output_path(&self) -> PathBuf {
        self.output.clone().unwrap_or_else(|| PathBuf::from(format!(
            "{}_interpolated_plot.png", self.quantity.key())))
    }
}

/// One data series: the file tag and its legend label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesEntry {
    pub prefix: String,
    pub label: String,
}

impl From<SpinConfig> for SeriesEntry {
    fn from(c: SpinConfig) -> Self {
        SeriesEntry { prefix: c.prefix().to_string(),
                      label: c.pattern().to_string() }
    }
}

/// Look of the overlay figures.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayStyle {
    /// Colormap the series colors are sampled from.
    pub cmap: String,
    pub title: String,
    pub title_fontsize: f64,
    pub font_size: f64,
    pub linewidth: f64,
    pub legend_title: Option<String>,
    pub legend_ncol: usize,
    pub legend_fontsize: f64,
    pub figsize: [f64; 2],
    pub dpi: f64,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        OverlayStyle {
            cmap: "gist_rainbow".to_string(),
            title: "bc bcd qmd".to_string(),
            title_fontsize: 28.,
            font_size: 24.,
            linewidth: 1.,
            legend_title: Some("Spin configuration".to_string()),
            legend_ncol: 3,
            legend_fontsize: 20.,
            figsize: [14., 16.],
            dpi: 300.,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FillingConfig {
    /// File parameters; `prefix` is replaced by each series' own.
    pub data: DataFileSpec,
    pub series: Vec<SeriesEntry>,
    /// One panel per quantity, top to bottom.
    pub panels: Vec<Observable>,
    /// Tag of the aggregated file whose `stable` column colors the
    /// markers drawn over the lines.
    pub stable: Option<String>,
    pub marker_size: f64,
    pub marker_alpha: f64,
    pub xlim: Option<[f64; 2]>,
    pub style: OverlayStyle,
    pub output: PathBuf,
}

impl Default for FillingConfig {
    fn default() -> Self {
        let data = DataFileSpec::default();
        let output = PathBuf::from(format!(
            "figure_qmd/stable_lambda{}_j{}.png",
            format_param(data.lambda), format_param(data.j)));
        FillingConfig {
            data,
            series: SpinConfig::ALL.into_iter().map(SeriesEntry::from).collect(),
            panels: vec![Observable::Bc, Observable::BcdX, Observable::BcdRotated,
                         Observable::QmdX, Observable::QmdRotated],
            stable: Some("stable".to_string()),
            marker_size: 15.,
            marker_alpha: 0.7,
            xlim: Some([0., 1.]),
            style: OverlayStyle::default(),
            output,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnergyConfig {
    pub data: DataFileSpec,
    pub series: Vec<SeriesEntry>,
    /// Tag of the series whose energy is subtracted.
    pub reference: String,
    pub style: OverlayStyle,
    pub output: PathBuf,
}

impl Default for EnergyConfig {
    fn default() -> Self {
        let series = [SpinConfig::Uuuddd, SpinConfig::Twin, SpinConfig::One2,
                      SpinConfig::Tri1, SpinConfig::Fm, SpinConfig::Sato];
        EnergyConfig {
            data: DataFileSpec {
                j: 0.25,
                mesh_x: 1000,
                mesh_y: 1000,
                main_mesh: None,
                ..DataFileSpec::default()
            },
            series: series.into_iter().map(SeriesEntry::from).collect(),
            reference: SpinConfig::Fm.prefix().to_string(),
            style: OverlayStyle {
                cmap: "rainbow".to_string(),
                legend_ncol: 1,
                ..OverlayStyle::default()
            },
            output: PathBuf::from("figure_qmd/stable_e.png"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContourConfig {
    /// Model tag, used for the default input and output names.
    pub model: String,
    /// Defaults to `contour_lines_<model>.dat`.
    pub input: Option<PathBuf>,
    /// Contours at the energy closest to this one are drawn.
    pub target_energy: f64,
    pub zone_size: ZoneSize,
    pub linewidth: f64,
    pub alpha: f64,
    pub figsize: [f64; 2],
    pub dpi: f64,
    /// Defaults to `contour_visualization_<model>_<target_energy>.png`.
    pub output: Option<PathBuf>,
}

impl Default for ContourConfig {
    fn default() -> Self {
        ContourConfig {
            model: "uuudddtmd".to_string(),
            input: None,
            target_energy: -1.15,
            zone_size: ZoneSize::Six,
            linewidth: 1.2,
            alpha: 0.8,
            figsize: [6., 6.],
            dpi: 300.,
            output: None,
        }
    }
}

impl ContourConfig {
    pub fn input_path(&self) -> PathBuf {
        self.input.clone().unwrap_or_else(|| PathBuf::from(format!(
            "contour_lines_{}.dat", self.model)))
    }

    pub fn output_path(&self) -> PathBuf {
        self.output.clone().unwrap_or_else(|| PathBuf::from(format!(
            "contour_visualization_{}_{}.png", self.model, self.target_energy)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_batch() -> Result<(), Error> {
        let cfg = BatchConfig::from_toml_str(r#"
            [[figure]]
            kind = "phase-diagram"
            quantity = "bcd-x"

            [[figure]]
            kind = "contour"
            zone_size = 2
            target_energy = -1.29
        "#)?;
        assert!(!cfg.show);
        assert_eq!(cfg.figures.len(), 2);
        match &cfg.figures[0] {
            FigureConfig::PhaseDiagram(p) => {
                assert_eq!(p.quantity, Observable::BcdX);
                assert_eq!(p.n_points, 500);
                assert_eq!(p.output_path(),
                           PathBuf::from("bcd_x_interpolated_plot.png"));
            }
            other => panic!("unexpected {other:?}"),
        }
        match &cfg.figures[1] {
            FigureConfig::Contour(c) => {
                assert_eq!(c.zone_size, ZoneSize::Two);
                assert_eq!(c.input_path(), PathBuf::from("contour_lines_uuudddtmd.dat"));
                assert_eq!(c.output_path(),
                           PathBuf::from("contour_visualization_uuudddtmd_-1.29.png"));
            }
            other => panic!("unexpected {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn invalid_zone_size_is_rejected() {
        let r = BatchConfig::from_toml_str("[[figure]]\nkind = \"contour\"\nzone_size = 4\n");
        assert!(matches!(r, Err(Error::Config(_))));
    }

    #[test]
    fn nested_tables() -> Result<(), Error> {
        let cfg = BatchConfig::from_toml_str(r#"
            show = true

            [[figure]]
            kind = "filling"
            panels = ["bc", "bcd-x", "bcd-y"]
            output = "figure/test.png"

            [figure.data]
            dir = "data"
            prefix = "unused"
            lambda = 0.3
            j = 0.25
            mesh_x = 1000
            mesh_y = 1000
            div = 300

            [[figure.series]]
            prefix = "TwinTmd"
            label = "Twin"

            [figure.style]
            cmap = "rainbow"
        "#)?;
        assert!(cfg.show);
        let FigureConfig::Filling(f) = &cfg.figures[0] else {
            panic!("expected a filling figure")
        };
        assert_eq!(f.panels.len(), 3);
        assert_eq!(f.data.threshold_exp, None);
        assert_eq!(f.series, vec![SeriesEntry { prefix: "TwinTmd".into(),
                                                label: "Twin".into() }]);
        assert_eq!(f.style.cmap, "rainbow");
        assert_eq!(f.style.dpi, 300.);
        assert_eq!(f.stable.as_deref(), Some("stable"));
        Ok(())
    }

    #[test]
    fn defaults_round_trip() -> Result<(), Error> {
        for kind in ["phase-diagram", "filling", "energy", "contour"] {
            let batch = BatchConfig {
                show: false,
                figures: vec![FigureConfig::default_of(kind).expect("known kind")],
            };
            let text = batch.to_toml().expect("serialize");
            let back = BatchConfig::from_toml_str(&text)?;
            assert_eq!(back.figures.len(), 1);
            assert_eq!(back.to_toml().expect("serialize"), text);
        }
        assert!(FigureConfig::default_of("pie").is_none());
        Ok(())
    }

    #[test]
    fn default_outputs() {
        assert_eq!(FillingConfig::default().output,
                   PathBuf::from("figure_qmd/stable_lambda0p30_j0p10.png"));
        assert_eq!(EnergyConfig::default().output,
                   PathBuf::from("figure_qmd/stable_e.png"));
    }

    #[test]
    fn j_sweep() {
        let j = JSweep { start: 0., step: 0.01, count: 50 }.values();
        assert_eq!(j.len(), 50);
        assert_eq!(j[0], 0.0);
        assert_eq!(j[7], 0.07);
        assert_eq!(j[29], 0.29);
        assert_eq!(j[49], 0.49);
    }
}
