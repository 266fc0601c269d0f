//! Bindings to the parts of the [Matplotlib][] Python library the
//! figures are drawn with.
//!
//! The interface stays close to Matplotlib's explicit one while keeping
//! a Rust flavor: data is borrowed, options are set through builders
//! and the final `.plot()` performs the Python call.
//!
//! [Matplotlib]: https://matplotlib.org/

use std::path::{Path, PathBuf};
use lazy_static::lazy_static;
use ndarray::Array2;
use numpy::{PyArray1, PyArray2};
use pyo3::{
    prelude::*,
    exceptions::{PyFileNotFoundError, PyPermissionError},
    types::PyDict,
};
use crate::{interp::linspace, Error};

/// Call the method `$m` of the Python object `$obj` with positional
/// arguments only, discarding the result.
macro_rules! meth {
    ($obj: expr, $m: ident, $py: ident -> $args: expr) => {
        Python::with_gil(|$py| {
            $obj.call_method1($py, stringify!($m), $args)
                .map(|_| ())
                .map_err(Error::from)
        })
    };
    ($obj: expr, $m: ident, $args: expr) => {
        Python::with_gil(|py| {
            $obj.call_method1(py, stringify!($m), $args)
                .map(|_| ())
                .map_err(Error::from)
        })
    };
}

/// Import and return a handle to the module `$m`.
macro_rules! pyimport { ($m: literal) => {
    Python::with_gil(|py|
        PyModule::import_bound(py, $m).map(Bound::unbind))
}}

lazy_static! {
    static ref MATPLOTLIB: Result<Py<PyModule>, PyErr> = {
        pyimport!("matplotlib")
    };
    static ref PYPLOT: Result<Py<PyModule>, PyErr> = {
        pyimport!("matplotlib.pyplot")
    };
    static ref PATCHES: Result<Py<PyModule>, PyErr> = {
        pyimport!("matplotlib.patches")
    };
}

/// Return a handle to the module `$m`.
/// ⚠ This may try to lock Python's GIL.  Make sure it is executed
/// outside a call to `Python::with_gil`.
macro_rules! pymod { ($m: ident) => {
    $m.as_ref().map_err(|_| Error::NoMatplotlib)
}}

/// Whether the Matplotlib modules could be imported.
pub fn available() -> bool {
    PYPLOT.is_ok() && PATCHES.is_ok() && MATPLOTLIB.is_ok()
}

/// A Matplotlib color specification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Color {
    /// Red, green, blue and alpha channels, each in `[0, 1]`.
    Rgba([f64; 4]),
    /// Any color name Matplotlib understands (`"black"`, `"#1f77b4"`,...).
    Named(&'static str),
}

impl ToPyObject for Color {
    fn to_object(&self, py: Python<'_>) -> PyObject {
        match self {
            Color::Rgba([r, g, b, a]) => (*r, *g, *b, *a).to_object(py),
            Color::Named(name) => name.to_object(py),
        }
    }
}

/// Trait expressing that `Self` can be converted to a `numpy.ndarray`.
pub trait Data {
    fn to_numpy(&self, py: Python<'_>) -> PyObject;
}

impl<T> Data for T where T: AsRef<[f64]> + ?Sized {
    fn to_numpy(&self, py: Python<'_>) -> PyObject {
        PyArray1::from_slice_bound(py, self.as_ref()).into_any().unbind()
    }
}

#[derive(Debug)]
pub struct Axes {
    ax: PyObject,
}

/// The top level container for all the plot elements.
#[derive(Debug)]
pub struct Figure {
    fig: PyObject, // instance of matplotlib.figure.Figure
}

/// Handle to the `AxesImage` returned by [`Imshow::plot`], needed to
/// attach a color bar.
pub struct Image {
    im: PyObject,
}

/// Grid of subplots to create with [`subplots`].
#[derive(Debug, Clone)]
pub struct Layout {
    pub nrows: usize,
    pub ncols: usize,
    /// Width and height in inches.
    pub figsize: Option<(f64, f64)>,
    pub sharex: bool,
}

impl Default for Layout {
    fn default() -> Self {
        Layout { nrows: 1, ncols: 1, figsize: None, sharex: false }
    }
}

/// Figure level legend built from colored patches.
#[derive(Debug, Clone)]
pub struct Legend<'a> {
    pub title: Option<&'a str>,
    pub loc: &'a str,
    pub ncol: usize,
    pub frameon: bool,
    pub fontsize: Option<f64>,
    pub title_fontsize: Option<f64>,
}

/// Create a figure together with `layout.nrows × layout.ncols` axes,
/// returned in row-major order.
///
/// Return an error if Matplotlib is not present on the system.
pub fn subplots(layout: &Layout) -> Result<(Figure, Vec<Axes>), Error> {
    let pyplot = pymod!(PYPLOT)?;
    Python::with_gil(|py| {
        let kwargs = PyDict::new_bound(py);
        kwargs.set_item("sharex", layout.sharex)?;
        // Always get a 2D array of axes back.
        kwargs.set_item("squeeze", false)?;
        if let Some(size) = layout.figsize {
            kwargs.set_item("figsize", size)?;
        }
        let out = pyplot.bind(py).call_method(
            "subplots", (layout.nrows, layout.ncols), Some(&kwargs))?;
        let fig = out.get_item(0)?;
        let axes = out.get_item(1)?
            .call_method0("flatten")?
            .iter()?
            .map(|ax| ax.map(|ax| Axes { ax: ax.unbind() }))
            .collect::<PyResult<Vec<_>>>()?;
        Ok((Figure { fig: fig.unbind() }, axes))
    })
}

/// Display all open figures.
pub fn show() -> Result<(), Error> {
    let pyplot = pymod!(PYPLOT)?;
    meth!(pyplot, show, ())
}

/// Restore Matplotlib's default `rcParams`.
pub fn rc_defaults() -> Result<(), Error> {
    let mpl = pymod!(MATPLOTLIB)?;
    meth!(mpl, rcdefaults, ())
}

/// Set `matplotlib.rcParams[key] = value`.
pub fn rc<V: ToPyObject>(key: &str, value: V) -> Result<(), Error> {
    let mpl = pymod!(MATPLOTLIB)?;
    Python::with_gil(|py| {
        mpl.bind(py).getattr("rcParams")?.set_item(key, value)?;
        Ok(())
    })
}

/// Sample `n` evenly spaced colors from the colormap `name`
/// (`"rainbow"`, `"gist_rainbow"`,...), like `cmap(np.linspace(0, 1, n))`.
pub fn colormap(name: &str, n: usize) -> Result<Vec<Color>, Error> {
    let mpl = pymod!(MATPLOTLIB)?;
    Python::with_gil(|py| {
        let cmap = mpl.bind(py).getattr("colormaps")?.get_item(name)?;
        linspace(0., 1., n).into_iter()
            .map(|t| -> Result<Color, Error> {
                let (r, g, b, a): (f64, f64, f64, f64) =
                    cmap.call1((t,))?.extract()?;
                Ok(Color::Rgba([r, g, b, a]))
            })
            .collect()
    })
}

impl Figure {
    pub fn suptitle(&self, title: &str, fontsize: Option<f64>)
                    -> Result<(), Error> {
        Python::with_gil(|py| {
            let kwargs = PyDict::new_bound(py);
            if let Some(size) = fontsize {
                kwargs.set_item("fontsize", size)?;
            }
            self.fig.bind(py).call_method("suptitle", (title,), Some(&kwargs))?;
            Ok(())
        })
    }

    /// Add a color bar for `image`.
    pub fn colorbar(&self, image: &Image, labelsize: Option<f64>)
                    -> Result<(), Error> {
        Python::with_gil(|py| {
            let cbar = self.fig.bind(py)
                .call_method1("colorbar", (image.im.clone_ref(py),))?;
            if let Some(size) = labelsize {
                let kwargs = PyDict::new_bound(py);
                kwargs.set_item("labelsize", size)?;
                cbar.getattr("ax")?.call_method("tick_params", (), Some(&kwargs))?;
            }
            Ok(())
        })
    }

    /// Draw a legend made of one colored patch per `(color, label)`.
    pub fn legend(&self, entries: &[(Color, &str)], legend: &Legend<'_>)
                  -> Result<(), Error> {
        let patches = pymod!(PATCHES)?;
        Python::with_gil(|py| {
            let patch = patches.bind(py).getattr("Patch")?;
            let mut handles = Vec::with_capacity(entries.len());
            for (color, label) in entries {
                let kw = PyDict::new_bound(py);
                kw.set_item("color", color)?;
                kw.set_item("label", *label)?;
                handles.push(patch.call((), Some(&kw))?.unbind());
            }
            let kwargs = PyDict::new_bound(py);
            kwargs.set_item("handles", handles)?;
            kwargs.set_item("loc", legend.loc)?;
            kwargs.set_item("ncol", legend.ncol)?;
            kwargs.set_item("frameon", legend.frameon)?;
            if let Some(title) = legend.title {
                kwargs.set_item("title", title)?;
            }
            if let Some(size) = legend.fontsize {
                kwargs.set_item("fontsize", size)?;
            }
            if let Some(size) = legend.title_fontsize {
                kwargs.set_item("title_fontsize", size)?;
            }
            self.fig.bind(py).call_method("legend", (), Some(&kwargs))?;
            Ok(())
        })
    }

    /// Adjust the padding between and around subplots.  `rect` is the
    /// `(left, bottom, right, top)` box, in figure coordinates, the
    /// subplots must fit into.
    pub fn tight_layout(&self, rect: Option<[f64; 4]>) -> Result<(), Error> {
        Python::with_gil(|py| {
            let kwargs = PyDict::new_bound(py);
            if let Some(rect) = rect {
                kwargs.set_item("rect", rect.to_vec())?;
            }
            self.fig.bind(py).call_method("tight_layout", (), Some(&kwargs))?;
            Ok(())
        })
    }

    pub fn save(&self) -> Savefig {
        Savefig { fig: Python::with_gil(|py| self.fig.clone_ref(py)),
                  dpi: None,
                  bbox_tight: false }
    }

    /// Release the figure from pyplot's figure manager.
    pub fn close(self) -> Result<(), Error> {
        let pyplot = pymod!(PYPLOT)?;
        meth!(pyplot, close, py -> (self.fig.clone_ref(py),))
    }
}

pub struct Savefig {
    fig: PyObject,
    dpi: Option<f64>,
    bbox_tight: bool,
}

impl Savefig {
    pub fn dpi(&mut self, dpi: f64) -> &mut Self {
        if dpi > 0. {
            self.dpi = Some(dpi);
        } else {
            self.dpi = None;
        }
        self
    }

    /// Crop the saved image to the drawn content (`bbox_inches="tight"`).
    pub fn bbox_tight(&mut self) -> &mut Self {
        self.bbox_tight = true;
        self
    }

    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<(), Error> {
        let path = path.as_ref();
        Python::with_gil(|py| {
            let kwargs = PyDict::new_bound(py);
            if let Some(dpi) = self.dpi {
                kwargs.set_item("dpi", dpi)?;
            }
            if self.bbox_tight {
                kwargs.set_item("bbox_inches", "tight")?;
            }
            self.fig.bind(py)
                .call_method("savefig", (path,), Some(&kwargs))
                .map_err(|e| {
                    if e.is_instance_of::<PyFileNotFoundError>(py) {
                        Error::FileNotFound(PathBuf::from(path))
                    } else if e.is_instance_of::<PyPermissionError>(py) {
                        Error::PermissionDenied(PathBuf::from(path))
                    } else {
                        Error::Python(e)
                    }
                })?;
            Ok(())
        })
    }
}

impl Axes {
    /// Plot `y` versus `x` as lines and/or markers.
    #[must_use]
    pub fn xy<'a, D>(&'a mut self, x: &'a D, y: &'a D) -> XY<'a, D>
    where D: Data + ?Sized {
        // We mutably borrow `self` to reflect that the final `.plot()`
        // will mutate the underlying Python object.
        XY { axes: self, options: PlotOptions::new(), x, y }
    }

    /// Scatter plot of `y` versus `x`.
    #[must_use]
    pub fn scatter<'a, D>(&'a mut self, x: &'a D, y: &'a D) -> Scatter<'a, D>
    where D: Data + ?Sized {
        Scatter { axes: self, x, y, colors: None, size: None, alpha: None }
    }

    /// Display `z` as an image, `z[[row, col]]` being drawn at
    /// (`col`, `row`).
    #[must_use]
    pub fn imshow<'a>(&'a mut self, z: &'a Array2<f64>) -> Imshow<'a> {
        Imshow { axes: self, z, extent: None, origin_lower: false,
                 aspect_auto: false, cmap: None, vmin: None, vmax: None }
    }

    pub fn set_xlim(&mut self, left: f64, right: f64)
                    -> Result<&mut Self, Error> {
        meth!(self.ax, set_xlim, (left, right))?;
        Ok(self)
    }

    pub fn set_ylim(&mut self, bottom: f64, top: f64)
                    -> Result<&mut Self, Error> {
        meth!(self.ax, set_ylim, (bottom, top))?;
        Ok(self)
    }

    pub fn set_xticks(&mut self, ticks: &[f64]) -> Result<&mut Self, Error> {
        meth!(self.ax, set_xticks, (ticks.to_vec(),))?;
        Ok(self)
    }

    pub fn set_yticks(&mut self, ticks: &[f64]) -> Result<&mut Self, Error> {
        meth!(self.ax, set_yticks, (ticks.to_vec(),))?;
        Ok(self)
    }

    /// Use the same scaling on both axes.
    pub fn set_aspect_equal(&mut self) -> Result<&mut Self, Error> {
        meth!(self.ax, set_aspect, ("equal",))?;
        Ok(self)
    }

    pub fn grid(&mut self, visible: bool) -> Result<&mut Self, Error> {
        meth!(self.ax, grid, (visible,))?;
        Ok(self)
    }

    pub fn set_xlabel(&mut self, label: &str) -> Result<&mut Self, Error> {
        meth!(self.ax, set_xlabel, (label,))?;
        Ok(self)
    }

    pub fn set_ylabel(&mut self, label: &str) -> Result<&mut Self, Error> {
        meth!(self.ax, set_ylabel, (label,))?;
        Ok(self)
    }

    /// Set the font size of the major tick labels of both axes.
    pub fn tick_labelsize(&mut self, size: f64) -> Result<&mut Self, Error> {
        Python::with_gil(|py| {
            let kwargs = PyDict::new_bound(py);
            kwargs.set_item("axis", "both")?;
            kwargs.set_item("which", "major")?;
            kwargs.set_item("labelsize", size)?;
            self.ax.bind(py).call_method("tick_params", (), Some(&kwargs))?;
            Ok::<(), Error>(())
        })?;
        Ok(self)
    }
}

#[derive(Clone)]
struct PlotOptions<'a> {
    color: Option<Color>,
    alpha: Option<f64>,
    linestyle: Option<&'a str>,
    linewidth: Option<f64>,
}

impl<'a> PlotOptions<'a> {
    fn new() -> PlotOptions<'static> {
        PlotOptions { color: None, alpha: None, linestyle: None,
                      linewidth: None }
    }

    fn kwargs<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyDict>> {
        let kwargs = PyDict::new_bound(py);
        if let Some(c) = self.color {
            kwargs.set_item("color", c)?;
        }
        if let Some(a) = self.alpha {
            kwargs.set_item("alpha", a)?;
        }
        if let Some(s) = self.linestyle {
            kwargs.set_item("linestyle", s)?;
        }
        if let Some(w) = self.linewidth {
            kwargs.set_item("linewidth", w)?;
        }
        Ok(kwargs)
    }
}

pub struct XY<'a, D>
where D: ?Sized {
    axes: &'a Axes,
    options: PlotOptions<'a>,
    x: &'a D,
    y: &'a D,
}

impl<'a, D> XY<'a, D>
where D: Data + ?Sized {
    #[must_use]
    pub fn color(mut self, color: Color) -> Self {
        self.options.color = Some(color);
        self
    }

    #[must_use]
    pub fn alpha(mut self, alpha: f64) -> Self {
        self.options.alpha = Some(alpha);
        self
    }

    /// Line style such as `"-"`, `"--"` or `":"`.
    #[must_use]
    pub fn linestyle(mut self, style: &'a str) -> Self {
        self.options.linestyle = Some(style);
        self
    }

    #[must_use]
    pub fn linewidth(mut self, w: f64) -> Self {
        self.options.linewidth = Some(w);
        self
    }

    /// Plot the data with the options specified in [`XY`].
    pub fn plot(self) -> Result<(), Error> {
        Python::with_gil(|py| {
            let xn = self.x.to_numpy(py);
            let yn = self.y.to_numpy(py);
            let kwargs = self.options.kwargs(py)?;
            self.axes.ax.bind(py).call_method("plot", (xn, yn), Some(&kwargs))?;
            Ok(())
        })
    }
}

pub struct Scatter<'a, D>
where D: ?Sized {
    axes: &'a Axes,
    x: &'a D,
    y: &'a D,
    colors: Option<&'a [Color]>,
    size: Option<f64>,
    alpha: Option<f64>,
}

impl<'a, D> Scatter<'a, D>
where D: Data + ?Sized {
    /// One color per point.
    #[must_use]
    pub fn colors(mut self, colors: &'a [Color]) -> Self {
        self.colors = Some(colors);
        self
    }

    /// Marker size in points².
    #[must_use]
    pub fn size(mut self, s: f64) -> Self {
        self.size = Some(s);
        self
    }

    #[must_use]
    pub fn alpha(mut self, alpha: f64) -> Self {
        self.alpha = Some(alpha);
        self
    }

    pub fn plot(self) -> Result<(), Error> {
        Python::with_gil(|py| {
            let xn = self.x.to_numpy(py);
            let yn = self.y.to_numpy(py);
            let kwargs = PyDict::new_bound(py);
            if let Some(colors) = self.colors {
                kwargs.set_item("color", colors.to_vec())?;
            }
            if let Some(s) = self.size {
                kwargs.set_item("s", s)?;
            }
            if let Some(a) = self.alpha {
                kwargs.set_item("alpha", a)?;
            }
            self.axes.ax.bind(py).call_method("scatter", (xn, yn), Some(&kwargs))?;
            Ok(())
        })
    }
}

pub struct Imshow<'a> {
    axes: &'a Axes,
    z: &'a Array2<f64>,
    extent: Option<[f64; 4]>,
    origin_lower: bool,
    aspect_auto: bool,
    cmap: Option<&'a str>,
    vmin: Option<f64>,
    vmax: Option<f64>,
}

impl<'a> Imshow<'a> {
    /// Data coordinates `[left, right, bottom, top]` of the image.
    #[must_use]
    pub fn extent(mut self, extent: [f64; 4]) -> Self {
        self.extent = Some(extent);
        self
    }

    /// Put row 0 at the bottom of the axes.
    #[must_use]
    pub fn origin_lower(mut self) -> Self {
        self.origin_lower = true;
        self
    }

    /// Let the pixels be non-square so the image fills the axes.
    #[must_use]
    pub fn aspect_auto(mut self) -> Self {
        self.aspect_auto = true;
        self
    }

    #[must_use]
    pub fn cmap(mut self, name: &'a str) -> Self {
        self.cmap = Some(name);
        self
    }

    /// Value range mapped onto the colormap.
    #[must_use]
    pub fn clim(mut self, vmin: f64, vmax: f64) -> Self {
        self.vmin = Some(vmin);
        self.vmax = Some(vmax);
        self
    }

    pub fn plot(self) -> Result<Image, Error> {
        Python::with_gil(|py| {
            let z = PyArray2::from_array_bound(py, self.z).into_any().unbind();
            let kwargs = PyDict::new_bound(py);
            if let Some(extent) = self.extent {
                kwargs.set_item("extent", extent.to_vec())?;
            }
            if self.origin_lower {
                kwargs.set_item("origin", "lower")?;
            }
            if self.aspect_auto {
                kwargs.set_item("aspect", "auto")?;
            }
            if let Some(cmap) = self.cmap {
                kwargs.set_item("cmap", cmap)?;
            }
            if let Some(vmin) = self.vmin {
                kwargs.set_item("vmin", vmin)?;
            }
            if let Some(vmax) = self.vmax {
                kwargs.set_item("vmax", vmax)?;
            }
            let im = self.axes.ax.bind(py).call_method("imshow", (z,), Some(&kwargs))?;
            Ok(Image { im: im.unbind() })
        })
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    /// Matplotlib is an external runtime dependency; rendering tests
    /// pass vacuously without it.
    fn matplotlib() -> bool {
        if !available() {
            eprintln!("matplotlib not importable, skipping");
        }
        available()
    }

    #[test]
    fn a_basic_png() -> Result<(), Error> {
        if !matplotlib() { return Ok(()) }
        let dir = tempfile::tempdir().expect("tempdir");
        let (fig, mut axes) = subplots(&Layout::default())?;
        axes[0].xy(&[1., 2., 3., 4.], &[1., 4., 2., 3.])
            .color(Color::Named("red")).plot()?;
        let path = dir.path().join("a_basic.png");
        fig.save().dpi(50.).to_file(&path)?;
        assert!(path.exists());
        fig.close()
    }

    #[test]
    fn a_column_of_panels() -> Result<(), Error> {
        if !matplotlib() { return Ok(()) }
        let layout = Layout { nrows: 3, ncols: 1, sharex: true,
                              ..Layout::default() };
        let (fig, axes) = subplots(&layout)?;
        assert_eq!(axes.len(), 3);
        fig.close()
    }

    #[test]
    fn colormap_samples_endpoints() -> Result<(), Error> {
        if !matplotlib() { return Ok(()) }
        let colors = colormap("gray", 3)?;
        assert_eq!(colors.len(), 3);
        assert_eq!(colors[0], Color::Rgba([0., 0., 0., 1.]));
        assert_eq!(colors[2], Color::Rgba([1., 1., 1., 1.]));
        Ok(())
    }

    #[test]
    fn saving_into_a_missing_directory_fails() -> Result<(), Error> {
        if !matplotlib() { return Ok(()) }
        let dir = tempfile::tempdir().expect("tempdir");
        let (fig, _axes) = subplots(&Layout::default())?;
        let path = dir.path().join("no").join("such").join("dir.png");
        match fig.save().to_file(&path) {
            Err(Error::FileNotFound(p)) => assert_eq!(p, path),
            other => panic!("unexpected {other:?}"),
        }
        fig.close()
    }
}
