//! Process-wide interpreter state
//!
//! The embedded interpreter is initialized once by the process entry point and
//! outlives every bridge. Bridges never initialize or finalize it themselves;
//! instead they require an [`InterpreterContext`] at construction time as proof
//! that initialization already happened.

use pyo3::Python;

/// Token proving that the embedded interpreter has been initialized
///
/// # Example
/// ```no_run
/// use pyslave_bridge::{InterpreterContext, SlaveBridge};
///
/// let context = InterpreterContext::initialize();
/// let bridge = SlaveBridge::new(&context, "/path/to/resources")?;
/// # Ok::<(), pyslave_bridge::FatalError>(())
/// ```
#[derive(Debug)]
pub struct InterpreterContext {
    _private: (),
}

impl InterpreterContext {
    /// Initialize the embedded interpreter if this process has not done so yet
    ///
    /// Repeated calls are cheap and return a fresh token for the same
    /// interpreter. The interpreter is never finalized by this crate.
    pub fn initialize() -> Self {
        Python::initialize();
        tracing::debug!(version = %Self::interpreter_version(), "embedded interpreter ready");
        Self { _private: () }
    }

    /// Version string reported by the embedded interpreter
    pub fn interpreter_version() -> String {
        Python::attach(|py| py.version().to_string())
    }
}
