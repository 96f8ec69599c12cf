//! Error types and exception translation
//!
//! Every call into the interpreter is checked. A failed call is turned into a
//! [`FatalError`] carrying the representation of the raised exception, and the
//! interpreter's exception indicator is cleared so the next, unrelated call
//! starts from a clean state.

use pyo3::prelude::*;
use std::fmt;
use thiserror::Error;

/// Prefix shared by all messages derived from a Python exception
const MESSAGE_PREFIX: &str = "An error occurred: ";

/// Step of bridge construction that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStage {
    /// Extending `sys.path` with the resource directory
    SearchPath,
    /// Importing the slave module
    Import,
    /// Looking up the slave class on the module
    ClassLookup,
    /// Calling the class with no arguments
    Instantiate,
    /// Calling `define()` on the new instance
    Define,
}

impl LoadStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoadStage::SearchPath => "search path",
            LoadStage::Import => "import",
            LoadStage::ClassLookup => "class lookup",
            LoadStage::Instantiate => "instantiate",
            LoadStage::Define => "define",
        }
    }
}

impl fmt::Display for LoadStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal failure reported to the host
///
/// The host is expected to discard the simulation instance after receiving
/// one; the slave's internal state is unspecified from then on.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FatalError {
    #[error("Failed to load slave ({stage}): {message}")]
    Load { stage: LoadStage, message: String },

    #[error("Call to '{method}' failed: {message}")]
    Call { method: &'static str, message: String },
}

impl FatalError {
    /// Human-readable message without the stage or method prefix
    pub fn message(&self) -> &str {
        match self {
            FatalError::Load { message, .. } | FatalError::Call { message, .. } => message,
        }
    }

    pub(crate) fn load(py: Python<'_>, stage: LoadStage, err: PyErr) -> Self {
        FatalError::Load {
            stage,
            message: take_exception_message(py, err),
        }
    }

    pub(crate) fn call(py: Python<'_>, method: &'static str, err: PyErr) -> Self {
        FatalError::Call {
            method,
            message: take_exception_message(py, err),
        }
    }

    /// Failure detected on the Rust side before or after the interpreter call
    pub(crate) fn rejected(method: &'static str, reason: impl fmt::Display) -> Self {
        FatalError::Call {
            method,
            message: format!("{}{}", MESSAGE_PREFIX, reason),
        }
    }
}

/// Build the message for a captured exception and clear the indicator
///
/// Consumes the exception so its type, value and traceback references are
/// released before returning.
fn take_exception_message(py: Python<'_>, err: PyErr) -> String {
    let repr = err
        .value(py)
        .repr()
        .map(|text| text.to_string_lossy().into_owned())
        .ok();
    drop(err);

    // repr() failing or a misbehaving callee may leave another exception set
    if PyErr::take(py).is_some() {
        tracing::debug!("discarded secondary exception while translating failure");
    }

    match repr {
        Some(text) => format!("{}{}", MESSAGE_PREFIX, text),
        None => format!("{}unknown error", MESSAGE_PREFIX),
    }
}
