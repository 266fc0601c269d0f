//! Linear interpolation of scattered samples onto a regular grid.
//!
//! The samples are `(x, y, z)` triples where `x` is continuous (the
//! filling `n`) and `y` takes a few discrete values (the coupling `j`).
//! The target grid resamples `x` evenly and keeps one row per distinct
//! `y`.  Values are interpolated linearly inside the triangles of the
//! Delaunay triangulation of the samples; grid points outside their
//! convex hull are `NaN`.

use ndarray::Array2;
use spade::{DelaunayTriangulation, FloatTriangulation, HasPosition, Point2,
            Triangulation};
use crate::Error;

/// `n` evenly spaced values from `start` to `stop`, both included.
///
/// ```
/// use bcdplot::interp::linspace;
/// assert_eq!(linspace(0., 1., 5), vec![0., 0.25, 0.5, 0.75, 1.]);
/// assert_eq!(linspace(2., 3., 1), vec![2.]);
/// ```
pub fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => vec![],
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            (0 .. n).map(|i| if i == n - 1 { stop }
                             else { start + step * i as f64 })
                .collect()
        }
    }
}

/// Sorted distinct values, ignoring `NaN`s.
pub fn distinct_sorted(values: impl IntoIterator<Item = f64>) -> Vec<f64> {
    let mut v: Vec<f64> = values.into_iter().filter(|x| !x.is_nan()).collect();
    v.sort_by(f64::total_cmp);
    v.dedup();
    v
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl HasPosition for Sample {
    type Scalar = f64;

    fn position(&self) -> Point2<f64> {
        Point2::new(self.x, self.y)
    }
}

/// Samples gathered across data files.
#[derive(Debug, Clone, Default)]
pub struct SampleCollection {
    samples: Vec<Sample>,
}

/// Values on a regular grid, `z[[iy, ix]]` being the value at
/// `(x[ix], y[iy])`.
#[derive(Debug, Clone)]
pub struct Grid {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Array2<f64>,
}

impl Grid {
    /// `[x_min, x_max, y_min, y_max]`, the extent of the grid.
    pub fn extent(&self) -> [f64; 4] {
        let first_last = |v: &[f64]| (v.first().copied().unwrap_or(f64::NAN),
                                      v.last().copied().unwrap_or(f64::NAN));
        let (x0, x1) = first_last(&self.x);
        let (y0, y1) = first_last(&self.y);
        [x0, x1, y0, y1]
    }

    /// The row of values at `y`, if it is one of the grid rows.
    pub fn row(&self, y: f64) -> Option<Vec<f64>> {
        let iy = self.y.iter().position(|&v| v == y)?;
        Some(self.z.row(iy).to_vec())
    }
}

impl SampleCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, x: f64, y: f64, z: f64) {
        self.samples.push(Sample { x, y, z })
    }

    /// Add the series `zs(xs)` measured at `y`.  Extra values of the
    /// longer slice are ignored.
    pub fn push_series(&mut self, y: f64, xs: &[f64], zs: &[f64]) {
        for (&x, &z) in xs.iter().zip(zs) {
            self.push(x, y, z)
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Interpolate the samples on a grid of `nx` evenly spaced `x`
    /// values spanning the observed range, times the distinct `y`
    /// values.
    pub fn interpolate(&self, nx: usize) -> Result<Grid, Error> {
        if self.samples.is_empty() {
            return Err(Error::NoSamples)
        }
        let (xmin, xmax) = self.samples.iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY),
                  |(lo, hi), s| (lo.min(s.x), hi.max(s.x)));
        let x = linspace(xmin, xmax, nx);
        let y = distinct_sorted(self.samples.iter().map(|s| s.y));

        let mut triangulation: DelaunayTriangulation<Sample> =
            DelaunayTriangulation::new();
        for s in &self.samples {
            triangulation.insert(*s)?;
        }
        let barycentric = triangulation.barycentric();
        let mut z = Array2::from_elem((y.len(), x.len()), f64::NAN);
        for (iy, &yv) in y.iter().enumerate() {
            for (ix, &xv) in x.iter().enumerate() {
                if let Some(v) = barycentric.interpolate(
                    |vertex| vertex.data().z, Point2::new(xv, yv)) {
                    z[[iy, ix]] = v;
                }
            }
        }
        Ok(Grid { x, y, z })
    }
}
