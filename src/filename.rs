//! Paths of the data files written by the simulation.

use std::path::PathBuf;
use serde::{Deserialize, Serialize};

/// Physical and numerical parameters identifying one data file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataFileSpec {
    /// Directory holding the data files.
    pub dir: PathBuf,
    /// Model / spin configuration tag, e.g. `"FmTmd"` or `"stable"`.
    pub prefix: String,
    /// Spin-orbit coupling λ.
    pub lambda: f64,
    /// Exchange coupling j.
    pub j: f64,
    pub mesh_x: usize,
    pub mesh_y: usize,
    /// Number of energy subdivisions of the contour maps.
    pub div: usize,
    /// Berry curvature threshold `10^-t`, encoded as `_thresh10em<t>`.
    #[serde(default)]
    pub threshold_exp: Option<u32>,
    /// Main mesh multiplier, encoded as `_main_mesh<m>`.
    #[serde(default)]
    pub main_mesh: Option<usize>,
}

impl Default for DataFileSpec {
    fn default() -> Self {
        DataFileSpec {
            dir: PathBuf::from("compare_6_spinmodel"),
            prefix: "stable".to_string(),
            lambda: 0.3,
            j: 0.1,
            mesh_x: 400,
            mesh_y: 400,
            div: 307,
            threshold_exp: Some(12),
            main_mesh: Some(10),
        }
    }
}

/// Format a coupling the way the simulation does in file names: two
/// decimals with the point replaced by `p`.
///
/// ```
/// assert_eq!(bcdplot::filename::format_param(0.3), "0p30");
/// assert_eq!(bcdplot::filename::format_param(0.25), "0p25");
/// ```
pub fn format_param(v: f64) -> String {
    format!("{:.2}", v).replace('.', "p")
}

impl DataFileSpec {
    /// File name, without directory.
    pub fn file_name(&self) -> String {
        let mut name = format!(
            "data_{}_lambda{}_j{}_mesh_x{}_mesh_y{}_div{}",
            self.prefix, format_param(self.lambda), format_param(self.j),
            self.mesh_x, self.mesh_y, self.div);
        if let Some(t) = self.threshold_exp {
            name.push_str(&format!("_thresh10em{}", t));
        }
        if let Some(m) = self.main_mesh {
            name.push_str(&format!("_main_mesh{}", m));
        }
        name.push_str(".dat");
        name
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(self.file_name())
    }

    /// Same parameters for another configuration tag.
    pub fn with_prefix(&self, prefix: &str) -> Self {
        DataFileSpec { prefix: prefix.to_string(), ..self.clone() }
    }

    /// Same parameters at exchange coupling `j`.
    pub fn with_j(&self, j: f64) -> Self {
        DataFileSpec { j, ..self.clone() }
    }
}
