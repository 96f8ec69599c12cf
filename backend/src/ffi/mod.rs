//! FFI (Foreign Function Interface) module
//!
//! Embedded-interpreter boundary between the host and a Python slave.
//!
//! # Design Principles
//!
//! 1. **Minimal boundary**: Only the fixed lifecycle and accessor methods cross it
//! 2. **Simple types**: `i32`, `f64`, `bool` and UTF-8 strings on the host side
//! 3. **Lists at the boundary**: References and payloads travel as Python lists
//! 4. **Safe errors**: Every Python exception becomes a `FatalError`
//! 5. **Copies out**: Values read from the slave are copied into host memory

pub mod slave;
pub mod types;
