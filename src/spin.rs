//! Candidate spin configurations of the six-site unit cell and the
//! colors of the "most stable configuration" markers.

use serde::{Deserialize, Serialize};
use crate::plt::Color;

/// Color of markers whose stable configuration is unknown.
pub const NEUTRAL: Color = Color::Named("black");

/// The candidate spin orderings compared by the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpinConfig {
    Fm,
    One1,
    One2,
    Twin,
    Tri1,
    Uuuddd,
    Tri2,
    Sato,
}

impl SpinConfig {
    pub const ALL: [SpinConfig; 8] = [
        SpinConfig::Fm,
        SpinConfig::One1,
        SpinConfig::One2,
        SpinConfig::Twin,
        SpinConfig::Tri1,
        SpinConfig::Uuuddd,
        SpinConfig::Tri2,
        SpinConfig::Sato,
    ];

    /// Tag used in data file names and in the `stable` column.
    pub fn prefix(self) -> &'static str {
        match self {
            SpinConfig::Fm => "FmTmd",
            SpinConfig::One1 => "One1Tmd",
            SpinConfig::One2 => "One2Tmd",
            SpinConfig::Twin => "TwinTmd",
            SpinConfig::Tri1 => "Tri1Tmd",
            SpinConfig::Uuuddd => "UuudddTmd",
            SpinConfig::Tri2 => "Tri2Tmd",
            SpinConfig::Sato => "SatoTmd",
        }
    }

    /// Up/down pattern of the six sites, used as legend label.
    pub fn pattern(self) -> &'static str {
        match self {
            SpinConfig::Fm => "DDDDDD",
            SpinConfig::One1 => "UDDDDD",
            SpinConfig::One2 => "DUDDDD",
            SpinConfig::Twin => "UUDDDD",
            SpinConfig::Tri1 => "UDUDDD",
            SpinConfig::Uuuddd => "UUUDDD",
            SpinConfig::Tri2 => "DUDUDD",
            SpinConfig::Sato => "UDUDUD",
        }
    }

    pub fn from_prefix(s: &str) -> Option<SpinConfig> {
        SpinConfig::ALL.into_iter().find(|c| c.prefix() == s)
    }
}

/// Entry of the `stable` column of the aggregated data file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StableLabel {
    Known(SpinConfig),
    /// Absent or unrecognized label.
    Unknown,
}

impl StableLabel {
    pub fn parse(label: Option<&str>) -> StableLabel {
        label.map(str::trim)
            .and_then(SpinConfig::from_prefix)
            .map_or(StableLabel::Unknown, StableLabel::Known)
    }
}

/// Marker color of `label`: the color of its configuration's series in
/// `series` (paired with `palette`), or [`NEUTRAL`].
pub fn marker_color(label: StableLabel, series: &[SpinConfig],
                    palette: &[Color]) -> Color {
    match label {
        StableLabel::Known(c) => series.iter()
            .position(|&s| s == c)
            .and_then(|i| palette.get(i).copied())
            .unwrap_or(NEUTRAL),
        StableLabel::Unknown => NEUTRAL,
    }
}
