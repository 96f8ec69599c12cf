//! Type conversion utilities for FFI boundary
//!
//! Converts between host scalars and the Python objects placed in the
//! reference and payload lists handed to the slave's `get_*`/`set_*` methods.

use pyo3::prelude::*;
use pyo3::types::{PyBool, PyFloat, PyString};
use pyo3::IntoPyObjectExt;
use serde::{Deserialize, Serialize};

/// Index of one variable slot in the slave's variable table, scoped per kind
pub type ValueReference = u32;

/// Variable kinds exchanged with the slave
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    Integer,
    Real,
    Boolean,
    String,
}

impl ValueKind {
    /// Name of the slave method that fills a payload list for this kind
    pub fn getter(&self) -> &'static str {
        match self {
            ValueKind::Integer => "get_integer",
            ValueKind::Real => "get_real",
            ValueKind::Boolean => "get_boolean",
            ValueKind::String => "get_string",
        }
    }

    /// Name of the slave method that applies a payload list for this kind
    pub fn setter(&self) -> &'static str {
        match self {
            ValueKind::Integer => "set_integer",
            ValueKind::Real => "set_real",
            ValueKind::Boolean => "set_boolean",
            ValueKind::String => "set_string",
        }
    }
}

mod sealed {
    pub trait Sealed {}

    impl Sealed for i32 {}
    impl Sealed for f64 {}
    impl Sealed for bool {}
    impl Sealed for String {}
    impl Sealed for &str {}
}

/// Host scalar that can be written into a slave payload list
pub trait ToSlave: sealed::Sealed {
    const KIND: ValueKind;

    fn to_py<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyAny>>;
}

/// Host scalar that can be read back out of a slave payload list
pub trait FromSlave: ToSlave + Sized {
    /// Value placed in the payload list before the slave fills it
    fn placeholder(py: Python<'_>) -> PyResult<Bound<'_, PyAny>>;

    fn from_py(value: &Bound<'_, PyAny>) -> PyResult<Self>;
}

impl ToSlave for i32 {
    const KIND: ValueKind = ValueKind::Integer;

    fn to_py<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyAny>> {
        (*self).into_bound_py_any(py)
    }
}

impl FromSlave for i32 {
    fn placeholder(py: Python<'_>) -> PyResult<Bound<'_, PyAny>> {
        0i32.into_bound_py_any(py)
    }

    /// Converts to a C `long` first, then truncates to 32 bits
    fn from_py(value: &Bound<'_, PyAny>) -> PyResult<Self> {
        let wide: i64 = value.extract()?;
        Ok(wide as i32)
    }
}

impl ToSlave for f64 {
    const KIND: ValueKind = ValueKind::Real;

    fn to_py<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyAny>> {
        Ok(PyFloat::new(py, *self).into_any())
    }
}

impl FromSlave for f64 {
    fn placeholder(py: Python<'_>) -> PyResult<Bound<'_, PyAny>> {
        Ok(PyFloat::new(py, 0.0).into_any())
    }

    fn from_py(value: &Bound<'_, PyAny>) -> PyResult<Self> {
        value.extract()
    }
}

impl ToSlave for bool {
    const KIND: ValueKind = ValueKind::Boolean;

    fn to_py<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyAny>> {
        Ok(PyBool::new(py, *self).to_owned().into_any())
    }
}

impl FromSlave for bool {
    /// Boolean payloads start out as the integer `0`, not `False`
    fn placeholder(py: Python<'_>) -> PyResult<Bound<'_, PyAny>> {
        0i32.into_bound_py_any(py)
    }

    fn from_py(value: &Bound<'_, PyAny>) -> PyResult<Self> {
        value.is_truthy()
    }
}

impl ToSlave for String {
    const KIND: ValueKind = ValueKind::String;

    fn to_py<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyAny>> {
        Ok(PyString::new(py, self).into_any())
    }
}

impl FromSlave for String {
    fn placeholder(py: Python<'_>) -> PyResult<Bound<'_, PyAny>> {
        Ok(PyString::new(py, "").into_any())
    }

    fn from_py(value: &Bound<'_, PyAny>) -> PyResult<Self> {
        value.extract()
    }
}

impl ToSlave for &str {
    const KIND: ValueKind = ValueKind::String;

    fn to_py<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyAny>> {
        Ok(PyString::new(py, self).into_any())
    }
}
