//! Y-axis ranges of the overlay panels.

/// Ranges narrower than this are drawn in a fixed tiny window.
pub const FLAT_RANGE: f64 = 2e-5;
/// Ranges wider than this are drawn in a fixed wide window.
pub const WIDE_RANGE: f64 = 10.;

/// Symmetric y limits for data spanning `[ymin, ymax]`.
///
/// A (nearly) flat series gets `(-1e-5, 1e-5)`, an outlier-dominated
/// one `(-5, 5)` and anything else `(-range/2, range/2)`.
///
/// ```
/// use bcdplot::limits::symmetric_ylim;
/// assert_eq!(symmetric_ylim(0., 1e-6), (-1e-5, 1e-5));
/// assert_eq!(symmetric_ylim(-20., 20.), (-5., 5.));
/// assert_eq!(symmetric_ylim(-1., 3.), (-2., 2.));
/// ```
pub fn symmetric_ylim(ymin: f64, ymax: f64) -> (f64, f64) {
    let range = ymax - ymin;
    if range < FLAT_RANGE {
        (-1e-5, 1e-5)
    } else if range > WIDE_RANGE {
        (-5., 5.)
    } else {
        (-range / 2., range / 2.)
    }
}

/// Running minimum and maximum of the values seen so far.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunningRange {
    pub min: f64,
    pub max: f64,
}

impl Default for RunningRange {
    fn default() -> Self {
        RunningRange { min: f64::INFINITY, max: f64::NEG_INFINITY }
    }
}

impl RunningRange {
    /// Account for `values`; `NaN`s are ignored.
    pub fn update(&mut self, values: &[f64]) {
        for &v in values.iter().filter(|v| !v.is_nan()) {
            self.min = self.min.min(v);
            self.max = self.max.max(v);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min > self.max
    }

    /// The y limits for everything seen so far.  Without any value, the
    /// flat window is used.
    pub fn ylim(&self) -> (f64, f64) {
        if self.is_empty() {
            symmetric_ylim(0., 0.)
        } else {
            symmetric_ylim(self.min, self.max)
        }
    }
}
