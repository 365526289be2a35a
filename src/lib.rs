//! Scatter plots of column-oriented text data, rendered with [Matplotlib][].
//!
//! The crate has two halves: [`Series`] extracts two numeric columns from a
//! whitespace-delimited text file, and the plotting types ([`Figure`],
//! [`Axes`], [`rc_font`], [`show`], ...) drive the Python Matplotlib library
//! through an explicit interface while keeping a Rust flavor.  Data is handed
//! to Python without copying.
//!
//! [Matplotlib]: https://matplotlib.org/

use std::{
    fmt::{Display, Formatter},
    mem::swap,
    path::Path,
};
use lazy_static::lazy_static;
use pyo3::{
    prelude::*,
    intern,
    exceptions::{PyFileNotFoundError, PyPermissionError},
    types::PyDict,
};
use numpy::{
    PyArray1,
    PyArray2,
};

mod series;

pub use series::{Columns, Series};

macro_rules! getattr {
    ($py: ident, $lib: expr, $f: literal) => {
        $lib.getattr($py, intern!($py, $f)).unwrap()
    };
}

macro_rules! meth {
    ($obj: expr, $m: ident, $args: expr) => {
        Python::with_gil(|py| {
            $obj.call_method1(py, intern!(py, stringify!($m)), $args)
        })
    };
}

/// Possible errors of plotting and data-reading functions.
#[derive(Debug)]
pub enum Error {
    /// The Python library "matplotlib" was not found.
    NoMatplotlib,
    /// The path contains an element that is not a directory or does
    /// not exist.
    FileNotFoundError,
    /// Permission denied to access or create the filesystem path.
    PermissionError,
    /// Other Python errors.
    Python(PyErr),
    /// The data file could not be opened or read.
    Io(std::io::Error),
    /// A data record has no token at a required column.
    MissingColumn {
        /// 1-based line number of the offending record.
        line: usize,
        /// 0-based index of the missing column.
        column: usize,
    },
    /// A required token of a data record is not a number.
    InvalidNumber {
        /// 1-based line number of the offending record.
        line: usize,
        /// The token that failed to parse as a float.
        token: String,
    },
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        match self {
            Error::NoMatplotlib =>
                write!(f, "The matplotlib library has not been found.\n\
Please install it.  See https://matplotlib.org/\n\
If you use Anaconda, see https://github.com/PyO3/pyo3/issues/1554"),
            Error::FileNotFoundError =>
                write!(f, "A path contains an element that is not a \
                           directory or does not exist"),
            Error::PermissionError =>
                write!(f, "Permission denied to access or create the \
                           filesystem path"),
            Error::Python(e) =>
                write!(f, "Python error: {}", e),
            Error::Io(e) =>
                write!(f, "Cannot read the data file: {}", e),
            Error::MissingColumn { line, column } =>
                write!(f, "Line {}: no token at column {}", line, column),
            Error::InvalidNumber { line, token } =>
                write!(f, "Line {}: token {:?} is not a number", line, token),
        }
    }
}

impl std::error::Error for Error {}

/// Import and return a handle to the module `$m`.
macro_rules! pyimport { ($m: literal) => {
    Python::with_gil(|py|
        PyModule::import(py, intern!(py, $m)).map(|m| m.into()))
}}

lazy_static! {
    // Import matplotlib modules.
    static ref MATPLOTLIB: Result<Py<PyModule>, PyErr> = {
        pyimport!("matplotlib")
    };
    static ref PYPLOT: Result<Py<PyModule>, PyErr> = {
        pyimport!("matplotlib.pyplot")
    };
    static ref NUMPY: Result<Numpy, PyErr> = {
        Ok(Numpy {
            numpy: pyimport!("numpy.ctypeslib")?,
            ctypes: pyimport!("ctypes")?,
        })
    };
}

/// Return a handle to the module `$m`.
/// ⚠ This may try to lock Python's GIL.  Make sure it is executed
/// outside a call to `Python::with_gil`.
macro_rules! pymod { ($m: ident) => {
    $m.as_ref().map_err(|_| Error::NoMatplotlib)
}}


/// Represent a "connection" to the `numpy` module to be able to
/// perform copy-free conversions of data.
#[derive(Clone)]
pub struct Numpy {
    numpy: Py<PyModule>,
    ctypes: Py<PyModule>,
}

/// Trait expressing that `Self` can be converted to a numpy.ndarray
/// (without copying).  `Numpy` is a handle to the numpy library.
pub trait Data {
    fn to_numpy(&self, py: Python, p: &Numpy) -> PyObject;
}

impl<T> Data for T where T: AsRef<[f64]> + ?Sized {
    fn to_numpy(&self, py: Python, p: &Numpy) -> PyObject {
        let x = self.as_ref();
        // ctypes.POINTER(ctypes.c_double)
        let ty = getattr!(py, p.ctypes, "POINTER")
            .call1(py, (getattr!(py, p.ctypes, "c_double"),)).unwrap();
        // ctypes.cast(x.as_ptr(), ty)
        let ptr = getattr!(py, p.ctypes, "cast")
            .call1(py, (x.as_ptr() as usize, ty)).unwrap();
        // numpy.ctypeslib.as_array(ptr, shape=(x.len(),))
        getattr!(py, p.numpy, "as_array")
            .call1(py, (ptr, (x.len(),))).unwrap()
    }
}

/// A single plotting area inside a figure.
#[derive(Debug, Clone)]
pub struct Axes {
    ax: PyObject,
}

/// The top level container for all the plot elements.
#[derive(Debug)]
pub struct Figure {
    fig: PyObject, // instance of matplotlib.figure.Figure
}

#[inline(always)]
fn grid<const R: usize, const C: usize, U>(
    f: impl Fn(usize, usize) -> U) -> [[U; C]; R] {
    let mut r = 0;
    [(); R].map(|_| {
        let mut c = 0;
        let row = [(); C].map(|_| {
            let y = f(r, c);
            c += 1;
            y });
        r += 1;
        row })
}

impl Figure {
    /// Add a grid of axes to the figure and return them, row major.
    ///
    /// Return an error if Matplotlib is not present on the system.
    pub fn subplots<const R: usize, const C: usize>(
        &self) -> Result<[[Axes; C]; R], Error> {
        Python::with_gil(|py| {
            let axs = self.fig
                .call_method1(py, "subplots", (R, C))
                .map_err(|e| Error::Python(e))?;
            let axes;
            if R == 1 {
                if C == 1 {
                    axes = grid(|_,_| Axes { ax: axs.clone() });
                } else { // C > 1
                    let axg: &PyArray1<PyObject> = axs.downcast(py).unwrap();
                    axes = grid(|_,c| {
                        let ax = axg.get_owned(c).unwrap();
                        Axes { ax } });
                }
            } else { // R > 1
                if C == 1 {
                    let axg: &PyArray1<PyObject> = axs.downcast(py).unwrap();
                    axes = grid(|r,_| {
                        let ax = axg.get_owned(r).unwrap();
                        Axes { ax } });
                } else { // C > 1
                    let axg: &PyArray2<PyObject> = axs.downcast(py).unwrap();
                    axes = grid(|r, c| {
                        let ax = axg.get_owned([r, c]).unwrap();
                        Axes { ax } });
                }
            }
            Ok(axes)
        })
    }

    pub fn save(&self) -> Savefig {
        Savefig { fig: self.fig.clone(), dpi: None }
    }
}

/// Save a figure to a file.  Created by [`Figure::save`].
pub struct Savefig {
    fig: PyObject,
    dpi: Option<f64>,
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

    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<(), Error> {
        Python::with_gil(|py| {
            let kwargs = PyDict::new(py);
            if let Some(dpi) = self.dpi {
                kwargs.set_item("dpi", dpi).unwrap()
            }
            self.fig.call_method(
                py, intern!(py, "savefig"),
                (path.as_ref(),), Some(kwargs)
            ).map_err(|e| {
                    if e.is_instance_of::<PyFileNotFoundError>(py) {
                        Error::FileNotFoundError
                    } else if e.is_instance_of::<PyPermissionError>(py) {
                        Error::PermissionError
                    } else {
                        Error::Python(e)
                    }
                })
        })?;
        Ok(())
    }
}


/// Set the global font family and size.
///
/// The setting applies to text created after the call, the way
/// `matplotlib.rc("font", ...)` does.
pub fn rc_font(family: &str, size: f64) -> Result<(), Error> {
    let mpl = pymod!(MATPLOTLIB)?;
    Python::with_gil(|py| {
        let kwargs = PyDict::new(py);
        kwargs.set_item("family", family).unwrap();
        kwargs.set_item("size", size).unwrap();
        mpl.call_method(py, intern!(py, "rc"), ("font",), Some(kwargs))
            .map_err(|e| Error::Python(e))?;
        Ok(())
    })
}

/// Enable or disable TeX rendering of all text (`matplotlib.rc("text",
/// usetex=...)`).  Rendering with `true` requires a working LaTeX
/// installation.
pub fn rc_usetex(enable: bool) -> Result<(), Error> {
    let mpl = pymod!(MATPLOTLIB)?;
    Python::with_gil(|py| {
        let kwargs = PyDict::new(py);
        kwargs.set_item("usetex", enable).unwrap();
        mpl.call_method(py, intern!(py, "rc"), ("text",), Some(kwargs))
            .map_err(|e| Error::Python(e))?;
        Ok(())
    })
}

/// Return a new figure registered with pyplot.
pub fn figure() -> Result<Figure, Error> {
    let pyplot = pymod!(PYPLOT)?;
    Python::with_gil(|py| {
        let fig = getattr!(py, pyplot, "figure")
            .call0(py).map_err(|e| Error::Python(e))?;
        Ok(Figure { fig: fig.into() })
    })
}

/// Return a new figure together with a grid of axes.
///
/// # Example
///
/// ```no_run
/// use dataplot as plt;
/// let (fig, [[mut ax]]) = plt::subplots()?;
/// ax.xy(&[1., 2., 3., 4.], &[1., 4., 2., 3.]).fmt("o").plot();
/// fig.save().to_file("target/points.pdf")?;
/// # Ok::<(), dataplot::Error>(())
/// ```
pub fn subplots<const R: usize, const C: usize>(
) -> Result<(Figure, [[Axes; C]; R]), Error> {
    let fig = figure()?;
    let ax = fig.subplots()?;
    Ok((fig, ax))
}

/// Display all open figures and run the GUI event loop.  Blocks until
/// every figure window has been closed.
pub fn show() -> Result<(), Error> {
    let pyplot = pymod!(PYPLOT)?;
    Python::with_gil(|py| {
        getattr!(py, pyplot, "show").call0(py)
            .map_err(|e| Error::Python(e))?;
        Ok(())
    })
}


impl Axes {
    /// Plot `y` versus `x` as lines and/or markers.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use dataplot as plt;
    /// let (fig, [[mut ax]]) = plt::subplots()?;
    /// ax.xy(&[1., 2., 3., 4.], &[1., 4., 2., 3.]).fmt("o").markersize(0.4).plot();
    /// plt::show()?;
    /// # Ok::<(), dataplot::Error>(())
    /// ```
    #[must_use]
    pub fn xy<'a, D>(&'a mut self, x: &'a D, y: &'a D) -> XY<'a, D>
    where D: Data + ?Sized {
        // The chain leading to plot starts with the data (using this
        // function) so that additional data may be added, sharing
        // common options.  We also mutably borrow `self` to reflect that
        // the final `.plot()` will mutate the underlying Python object.
        XY { axes: self,
             options: PlotOptions::new(),
             data: (x, y),
             prev_data: vec![] }
    }

    pub fn set_title(&mut self, v: &str) -> &mut Self {
        meth!(self.ax, set_title, (v,)).unwrap();
        self
    }

    pub fn grid(&mut self) -> &mut Self {
        meth!(self.ax, grid, (true,)).unwrap();
        self
    }

    /// Set the label of the x-axis.  Math-mode text such as `"$x$"` is
    /// typeset by Matplotlib.
    pub fn set_xlabel(&mut self, label: &str) -> &mut Self {
        meth!(self.ax, set_xlabel, (label,)).unwrap();
        self
    }

    /// Set the label of the y-axis.  Math-mode text such as `"$y$"` is
    /// typeset by Matplotlib.
    pub fn set_ylabel(&mut self, label: &str) -> &mut Self {
        meth!(self.ax, set_ylabel, (label,)).unwrap();
        self
    }
}

#[derive(Clone)]
struct PlotOptions<'a> {
    fmt: &'a str,
    label: &'a str,
    linewidth: Option<f64>,
    markersize: Option<f64>,
}

impl<'a> PlotOptions<'a> {
    fn new() -> PlotOptions<'static> {
        PlotOptions { fmt: "", label: "", linewidth: None, markersize: None }
    }

    fn kwargs(&'a self, py: Python<'a>) -> &'a PyDict {
        let kwargs = PyDict::new(py);
        if !self.label.is_empty() {
            kwargs.set_item("label", self.label).unwrap()
        }
        if let Some(w) = self.linewidth {
            kwargs.set_item("linewidth", w).unwrap()
        }
        if let Some(s) = self.markersize {
            kwargs.set_item("markersize", s).unwrap()
        }
        kwargs
    }

    fn plot_xy<D>(&self, py: Python<'_>, numpy: &Numpy, axes: &Axes,
        x: &D, y: &D)
    where D: Data + ?Sized {
        let xn = x.to_numpy(py, numpy);
        let yn = y.to_numpy(py, numpy);
        axes.ax.call_method(py, "plot", (xn, yn, self.fmt),
                            Some(self.kwargs(py))).unwrap();
    }
}

/// Options of a `y` versus `x` plot.  Created by [`Axes::xy`]; nothing
/// is drawn until the final [`plot`][XY::plot] call.
pub struct XY<'a, D>
where D: ?Sized {
    axes: &'a Axes,
    // Latest data and its setting.
    options: PlotOptions<'a>,
    data: (&'a D, &'a D),
    // Previous data with their settings.
    prev_data: Vec<(PlotOptions<'a>, (&'a D, &'a D))>,
}

impl<'a, D> XY<'a, D>
where D: Data + ?Sized {
    /// Set the format string, e.g. `"o"` for circular markers with no
    /// connecting line, `"r."` for red dots.
    #[must_use]
    pub fn fmt(mut self, fmt: &'a str) -> Self {
        self.options.fmt = fmt;
        self
    }

    #[must_use]
    pub fn label(mut self, label: &'a str) -> Self {
        self.options.label = label;
        self
    }

    #[must_use]
    pub fn linewidth(mut self, w: f64) -> Self {
        self.options.linewidth = Some(w);
        self
    }

    /// Set the marker size in points.  Matplotlib accepts fractional
    /// sizes; large point clouds read best well below 1.
    #[must_use]
    pub fn markersize(mut self, s: f64) -> Self {
        self.options.markersize = Some(s);
        self
    }

    /// Plot the data with the options specified in [`XY`].
    pub fn plot(self) {
        let numpy = pymod!(NUMPY).unwrap();
        Python::with_gil(|py| {
            for (opt, (x, y)) in self.prev_data.iter() {
                opt.plot_xy(py, numpy, self.axes, *x, *y)
            }
            let (x, y) = self.data;
            self.options.plot_xy(py, numpy, self.axes, x, y)
        })
    }

    /// Add the dataset (`x`, `y`).
    #[must_use]
    pub fn xy(&mut self, x: &'a D, y: &'a D) -> &mut Self {
        let mut data = (x, y);
        swap(&mut data, &mut self.data);
        self.prev_data.push((self.options.clone(), data));
        self
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[ignore = "requires a Python installation with Matplotlib"]
    fn a_scatter_pdf() -> Result<(), Error> {
        let (fig, [[mut ax]]) = subplots()?;
        ax.set_xlabel("$x$").set_ylabel("$y$");
        ax.xy(&[1., 2., 3., 4.], &[1., 4., 2., 3.])
            .fmt("o").markersize(0.4).plot();
        fig.save().to_file("target/a_scatter.pdf")?;
        Ok(())
    }

    #[test]
    #[ignore = "requires a Python installation with Matplotlib"]
    fn a_font_rc_applies() -> Result<(), Error> {
        rc_font("sans-serif", 20.)?;
        let (fig, [[mut ax]]) = subplots()?;
        ax.set_title("sans-serif, 20pt");
        ax.xy(&[0., 1.], &[0., 1.]).plot();
        fig.save().to_file("target/a_font_rc.pdf")?;
        Ok(())
    }

    #[test]
    #[ignore = "requires a Python installation with Matplotlib"]
    fn save_to_missing_dir_fails() -> Result<(), Error> {
        let (fig, [[mut ax]]) = subplots()?;
        ax.xy(&[0., 1.], &[1., 0.]).plot();
        match fig.save().to_file("target/no/such/dir/plot.pdf") {
            Err(Error::FileNotFoundError) => Ok(()),
            Err(e) => Err(e),
            Ok(()) => panic!("saving to a missing directory succeeded"),
        }
    }
}
