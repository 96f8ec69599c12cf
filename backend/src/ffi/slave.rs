//! Bridge to a Python slave instance
//!
//! This module provides the host-facing wrapper around one instance of a
//! user-supplied Python class. Every method performs exactly one blocking call
//! into the interpreter.

use pyo3::prelude::*;
use pyo3::types::{PyList, PyModule};
use pyo3::IntoPyObjectExt;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use super::types::{FromSlave, ToSlave, ValueReference};
use crate::context::InterpreterContext;
use crate::descriptor::ResourceDescriptor;
use crate::error::{FatalError, LoadStage};

/// Owned references to the module, class and instance of one slave
#[derive(Debug)]
struct SlaveHandles {
    instance: Py<PyAny>,
    class: Py<PyAny>,
    module: Py<PyModule>,
}

impl SlaveHandles {
    /// Import the module, instantiate the class and call `define()`
    ///
    /// Handles acquired before a failing step are dropped on return.
    fn load(
        py: Python<'_>,
        resource_path: &Path,
        descriptor: &ResourceDescriptor,
    ) -> Result<Self, FatalError> {
        extend_search_path(py, resource_path)
            .map_err(|e| FatalError::load(py, LoadStage::SearchPath, e))?;

        let module = PyModule::import(py, descriptor.module_name())
            .map_err(|e| FatalError::load(py, LoadStage::Import, e))?;
        let class = module
            .getattr(descriptor.class_name())
            .map_err(|e| FatalError::load(py, LoadStage::ClassLookup, e))?;
        let instance = class
            .call0()
            .map_err(|e| FatalError::load(py, LoadStage::Instantiate, e))?;
        instance
            .call_method0("define")
            .map_err(|e| FatalError::load(py, LoadStage::Define, e))?;

        Ok(SlaveHandles {
            instance: instance.unbind(),
            class: class.unbind(),
            module: module.unbind(),
        })
    }

    /// Release one reference to each handle, instance first
    fn release(self, _py: Python<'_>) {
        let SlaveHandles {
            instance,
            class,
            module,
        } = self;
        drop(instance);
        drop(class);
        drop(module);
    }
}

/// Append the resource directory to `sys.path` unless already present
fn extend_search_path(py: Python<'_>, resource_path: &Path) -> PyResult<()> {
    let entry = resource_path.as_os_str().into_bound_py_any(py)?;
    let sys_path = py.import("sys")?.getattr("path")?;
    if !sys_path.contains(&entry)? {
        sys_path.call_method1("append", (entry,))?;
    }
    Ok(())
}

/// Host-side bridge to one Python slave instance
///
/// Created once per simulation instance. Forwards lifecycle calls and typed
/// variable access to the held instance and converts every Python exception
/// into a [`FatalError`].
///
/// # Example
///
/// ```no_run
/// use pyslave_bridge::{InterpreterContext, SlaveBridge};
///
/// let context = InterpreterContext::initialize();
/// let bridge = SlaveBridge::new(&context, "/path/to/resources")?;
///
/// bridge.setup_experiment(0.0)?;
/// bridge.enter_initialization_mode()?;
/// bridge.set_real(&[0], &[1.5])?;
/// bridge.exit_initialization_mode()?;
///
/// if bridge.do_step(0.0, 0.1)? {
///     let outputs = bridge.get_integer(&[0, 1])?;
///     println!("outputs: {:?}", outputs);
/// }
/// bridge.terminate()?;
/// # Ok::<(), pyslave_bridge::FatalError>(())
/// ```
#[derive(Debug)]
pub struct SlaveBridge {
    instance_id: Uuid,
    resource_path: PathBuf,
    descriptor: ResourceDescriptor,
    handles: Option<SlaveHandles>,
}

impl SlaveBridge {
    /// Load the slave named by the descriptor files in `resource_path`
    ///
    /// # Errors
    ///
    /// Returns `FatalError::Load` if:
    /// - The module cannot be imported (including an empty or missing name)
    /// - The class is not an attribute of the module
    /// - Instantiating the class or calling `define()` raises
    pub fn new(
        context: &InterpreterContext,
        resource_path: impl AsRef<Path>,
    ) -> Result<Self, FatalError> {
        let resource_path = resource_path.as_ref();
        let descriptor = ResourceDescriptor::read(resource_path);
        Self::with_descriptor(context, resource_path, descriptor)
    }

    /// Load a slave whose module and class names are already known
    pub fn with_descriptor(
        _context: &InterpreterContext,
        resource_path: impl AsRef<Path>,
        descriptor: ResourceDescriptor,
    ) -> Result<Self, FatalError> {
        let resource_path = resource_path.as_ref().to_path_buf();
        let instance_id = Uuid::new_v4();

        let handles = Python::attach(|py| SlaveHandles::load(py, &resource_path, &descriptor))
            .map_err(|error| {
                tracing::warn!(
                    instance = %instance_id,
                    module = descriptor.module_name(),
                    class = descriptor.class_name(),
                    %error,
                    "failed to load slave"
                );
                error
            })?;

        tracing::info!(
            instance = %instance_id,
            module = descriptor.module_name(),
            class = descriptor.class_name(),
            path = %resource_path.display(),
            "slave loaded"
        );

        Ok(SlaveBridge {
            instance_id,
            resource_path,
            descriptor,
            handles: Some(handles),
        })
    }

    /// Identifier used to correlate log records of this instance
    pub fn instance_id(&self) -> Uuid {
        self.instance_id
    }

    pub fn resource_path(&self) -> &Path {
        &self.resource_path
    }

    pub fn descriptor(&self) -> &ResourceDescriptor {
        &self.descriptor
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    pub fn setup_experiment(&self, start_time: f64) -> Result<(), FatalError> {
        self.invoke("setup_experiment", |slave| {
            slave.call_method1("setup_experiment", (start_time,))?;
            Ok(())
        })
    }

    pub fn enter_initialization_mode(&self) -> Result<(), FatalError> {
        self.invoke("enter_initialization_mode", |slave| {
            slave.call_method0("enter_initialization_mode")?;
            Ok(())
        })
    }

    pub fn exit_initialization_mode(&self) -> Result<(), FatalError> {
        self.invoke("exit_initialization_mode", |slave| {
            slave.call_method0("exit_initialization_mode")?;
            Ok(())
        })
    }

    /// Advance the slave by one step
    ///
    /// # Returns
    ///
    /// Truthiness of whatever `do_step` returned: `None`, `0`, `""` and other
    /// falsy values yield `false`.
    pub fn do_step(&self, current_time: f64, step_size: f64) -> Result<bool, FatalError> {
        self.invoke("do_step", |slave| {
            slave
                .call_method1("do_step", (current_time, step_size))?
                .is_truthy()
        })
    }

    pub fn reset(&self) -> Result<(), FatalError> {
        self.invoke("reset", |slave| {
            slave.call_method0("reset")?;
            Ok(())
        })
    }

    pub fn terminate(&self) -> Result<(), FatalError> {
        self.invoke("terminate", |slave| {
            slave.call_method0("terminate")?;
            Ok(())
        })
    }

    // ========================================================================
    // Variable access
    // ========================================================================

    /// Read the current values of `refs`
    ///
    /// Calls `get_<kind>(refs, values)` with `values` pre-filled by
    /// placeholders. The slave writes into `values` in place; the list is then
    /// read back element by element.
    pub fn get<T>(&self, refs: &[ValueReference]) -> Result<Vec<T>, FatalError>
    where
        T: FromSlave + Send,
    {
        let method = T::KIND.getter();
        tracing::debug!(instance = %self.instance_id, method, count = refs.len(), "reading values");

        self.invoke(method, |slave| {
            let py = slave.py();
            let references = PyList::new(py, refs.iter().copied())?;
            let placeholders = refs
                .iter()
                .map(|_| T::placeholder(py))
                .collect::<PyResult<Vec<_>>>()?;
            let values = PyList::new(py, placeholders)?;

            slave.call_method1(method, (&references, &values))?;

            (0..refs.len())
                .map(|index| T::from_py(&values.get_item(index)?))
                .collect()
        })
    }

    /// Read the current values of `refs` into a caller-owned buffer
    ///
    /// # Errors
    ///
    /// Fails without calling the slave if `out` and `refs` differ in length.
    pub fn get_into<T>(&self, refs: &[ValueReference], out: &mut [T]) -> Result<(), FatalError>
    where
        T: FromSlave + Send,
    {
        if refs.len() != out.len() {
            return Err(FatalError::rejected(
                T::KIND.getter(),
                format!("{} references but room for {} values", refs.len(), out.len()),
            ));
        }

        for (slot, value) in out.iter_mut().zip(self.get::<T>(refs)?) {
            *slot = value;
        }
        Ok(())
    }

    /// Apply `values` to `refs`, positionally
    ///
    /// # Errors
    ///
    /// Fails without calling the slave if `refs` and `values` differ in length.
    pub fn set<T>(&self, refs: &[ValueReference], values: &[T]) -> Result<(), FatalError>
    where
        T: ToSlave + Sync,
    {
        let method = T::KIND.setter();
        if refs.len() != values.len() {
            return Err(FatalError::rejected(
                method,
                format!("{} references but {} values", refs.len(), values.len()),
            ));
        }
        tracing::debug!(instance = %self.instance_id, method, count = refs.len(), "writing values");

        self.invoke(method, |slave| {
            let py = slave.py();
            let references = PyList::new(py, refs.iter().copied())?;
            let payload = values
                .iter()
                .map(|value| value.to_py(py))
                .collect::<PyResult<Vec<_>>>()?;
            let payload = PyList::new(py, payload)?;

            slave.call_method1(method, (references, payload))?;
            Ok(())
        })
    }

    pub fn get_integer(&self, refs: &[ValueReference]) -> Result<Vec<i32>, FatalError> {
        self.get(refs)
    }

    pub fn get_real(&self, refs: &[ValueReference]) -> Result<Vec<f64>, FatalError> {
        self.get(refs)
    }

    pub fn get_boolean(&self, refs: &[ValueReference]) -> Result<Vec<bool>, FatalError> {
        self.get(refs)
    }

    pub fn get_string(&self, refs: &[ValueReference]) -> Result<Vec<String>, FatalError> {
        self.get(refs)
    }

    pub fn set_integer(&self, refs: &[ValueReference], values: &[i32]) -> Result<(), FatalError> {
        self.set(refs, values)
    }

    pub fn set_real(&self, refs: &[ValueReference], values: &[f64]) -> Result<(), FatalError> {
        self.set(refs, values)
    }

    pub fn set_boolean(&self, refs: &[ValueReference], values: &[bool]) -> Result<(), FatalError> {
        self.set(refs, values)
    }

    pub fn set_string<S>(&self, refs: &[ValueReference], values: &[S]) -> Result<(), FatalError>
    where
        S: AsRef<str>,
    {
        let values: Vec<&str> = values.iter().map(AsRef::as_ref).collect();
        self.set(refs, &values)
    }

    /// Run one call against the held instance with the interpreter attached
    ///
    /// Any `PyErr` is translated into a `FatalError::Call`, which also clears
    /// the interpreter's exception indicator.
    fn invoke<R, F>(&self, method: &'static str, call: F) -> Result<R, FatalError>
    where
        R: Send,
        F: for<'py> FnOnce(&Bound<'py, PyAny>) -> PyResult<R> + Send,
    {
        Python::attach(|py| {
            let handles = self
                .handles
                .as_ref()
                .ok_or_else(|| FatalError::rejected(method, "slave instance has been released"))?;

            call(handles.instance.bind(py)).map_err(|err| {
                let error = FatalError::call(py, method, err);
                tracing::warn!(
                    instance = %self.instance_id,
                    method,
                    message = error.message(),
                    "slave call failed"
                );
                error
            })
        })
    }
}

impl Drop for SlaveBridge {
    fn drop(&mut self) {
        if let Some(handles) = self.handles.take() {
            Python::attach(|py| handles.release(py));
            tracing::debug!(instance = %self.instance_id, "slave handles released");
        }
    }
}
