//! Figures for Berry-curvature-dipole (BCD) and quantum-metric-dipole
//! (QMD) studies of spin configurations on the honeycomb lattice.
//!
//! Usage
//! -----
//!
//! Every figure is described by a [`FigureConfig`] and rendered with
//! [`generate`], which loads the tabular data written by the
//! simulation, reshapes it and draws it with [Matplotlib][].
//!
//! ```no_run
//! let cfg = bcdplot::FigureConfig::PhaseDiagram(Default::default());
//! let png = bcdplot::generate(&cfg)?;
//! println!("wrote {}", png.display());
//! # Ok::<(), bcdplot::Error>(())
//! ```
//!
//! [Matplotlib]: https://matplotlib.org/

use std::{
    fmt::{Display, Formatter},
    path::PathBuf,
};
use pyo3::PyErr;
use polars_core::error::PolarsError;

pub mod bz;
pub mod config;
pub mod figures;
pub mod filename;
pub mod interp;
pub mod limits;
pub mod observable;
pub mod plt;
pub mod spin;
pub mod table;

pub use config::{BatchConfig, FigureConfig};
pub use figures::generate;

/// Possible errors while building a figure.
#[derive(Debug)]
pub enum Error {
    /// The Python library "matplotlib" was not found.
    NoMatplotlib,
    /// The path contains an element that is not a directory or does
    /// not exist.
    FileNotFound(PathBuf),
    /// Permission denied to access or create the filesystem path.
    PermissionDenied(PathBuf),
    /// Other I/O failures.
    Io { path: PathBuf, source: std::io::Error },
    /// A data file row could not be parsed.
    Parse { path: PathBuf, line: usize, message: String },
    /// None of the candidate data files exists, so there is no axis to
    /// build the figure on.
    NoDataFiles,
    /// No sample was collected before interpolation.
    NoSamples,
    /// The scattered samples could not be triangulated.
    Interpolation(String),
    /// Brillouin zones are only defined for system sizes 2 and 6.
    InvalidZoneSize(u8),
    /// The contour file holds no line segment.
    NoContourSegments(PathBuf),
    /// Invalid TOML configuration.
    Config(toml::de::Error),
    Polars(PolarsError),
    /// Other Python errors.
    Python(PyErr),
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        match self {
            Error::NoMatplotlib =>
                write!(f, "The matplotlib library has not been found.\n\
Please install it.  See https://matplotlib.org/\n\
If you use Anaconda, see https://github.com/PyO3/pyo3/issues/1554"),
            Error::FileNotFound(p) =>
                write!(f, "{}: a path element is not a directory or does \
                           not exist", p.display()),
            Error::PermissionDenied(p) =>
                write!(f, "{}: permission denied", p.display()),
            Error::Io { path, source } =>
                write!(f, "{}: {}", path.display(), source),
            Error::Parse { path, line, message } =>
                write!(f, "{}:{}: {}", path.display(), line, message),
            Error::NoDataFiles =>
                write!(f, "no usable data file was found"),
            Error::NoSamples =>
                write!(f, "no data to plot"),
            Error::Interpolation(msg) =>
                write!(f, "interpolation failed: {}", msg),
            Error::InvalidZoneSize(s) =>
                write!(f, "system size should be 2 or 6, got {}", s),
            Error::NoContourSegments(p) =>
                write!(f, "{}: no contour segment", p.display()),
            Error::Config(e) =>
                write!(f, "invalid configuration: {}", e),
            Error::Polars(e) =>
                write!(f, "data frame error: {}", e),
            Error::Python(e) =>
                write!(f, "Python error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io { source, .. } => Some(source),
            Error::Config(e) => Some(e),
            Error::Polars(e) => Some(e),
            Error::Python(e) => Some(e),
            _ => None,
        }
    }
}

impl From<PyErr> for Error {
    fn from(e: PyErr) -> Self {
        Error::Python(e)
    }
}

impl From<PolarsError> for Error {
    fn from(e: PolarsError) -> Self {
        Error::Polars(e)
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Config(e)
    }
}

impl From<spade::InsertionError> for Error {
    fn from(e: spade::InsertionError) -> Self {
        Error::Interpolation(format!("{:?}", e))
    }
}
