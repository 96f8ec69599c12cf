//! Python Slave Bridge - Rust Core
//!
//! Drives a co-simulation slave written as a Python class through a fixed,
//! language-neutral interface: lifecycle calls plus typed variable access by
//! value reference.
//!
//! # Architecture
//!
//! - **context**: Explicit handle on the process-wide embedded interpreter
//! - **descriptor**: Resource directory descriptor files (module and class name)
//! - **error**: `FatalError` and the exception translation protocol
//! - **ffi**: The bridge itself and the scalar marshalling it relies on
//!
//! # Critical Invariants
//!
//! 1. Construction is atomic: a bridge exists only if every load step succeeded
//! 2. The interpreter's exception indicator is cleared after every failed call
//! 3. Reference and value batches always have equal lengths

#![deny(unsafe_code)]

// Module declarations
pub mod context;
pub mod descriptor;
pub mod error;
pub mod ffi;

// Re-exports for convenience
pub use context::InterpreterContext;
pub use descriptor::{ResourceDescriptor, SLAVE_CLASS_FILE, SLAVE_MODULE_FILE};
pub use error::{FatalError, LoadStage};
pub use ffi::slave::SlaveBridge;
pub use ffi::types::{FromSlave, ToSlave, ValueKind, ValueReference};
