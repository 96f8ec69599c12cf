//! Resource directory descriptor
//!
//! Export tooling writes two single-line text files into the resource
//! directory naming the Python module to import and the class to instantiate.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// File holding the name of the module to import
pub const SLAVE_MODULE_FILE: &str = "slavemodule.txt";

/// File holding the name of the class to instantiate
pub const SLAVE_CLASS_FILE: &str = "slaveclass.txt";

/// Module and class names of a slave
///
/// # Example
/// ```
/// use pyslave_bridge::ResourceDescriptor;
///
/// let descriptor = ResourceDescriptor::new("slave", "Slave");
/// assert_eq!(descriptor.module_name(), "slave");
/// assert_eq!(descriptor.class_name(), "Slave");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDescriptor {
    module_name: String,
    class_name: String,
}

impl ResourceDescriptor {
    pub fn new(module_name: impl Into<String>, class_name: impl Into<String>) -> Self {
        Self {
            module_name: module_name.into(),
            class_name: class_name.into(),
        }
    }

    /// Read both descriptor files from a resource directory
    ///
    /// No validation is performed: a missing or unreadable file yields an
    /// empty name, which later fails at import or attribute lookup.
    pub fn read(resource_path: impl AsRef<Path>) -> Self {
        let resource_path = resource_path.as_ref();
        Self {
            module_name: first_line(&resource_path.join(SLAVE_MODULE_FILE)),
            class_name: first_line(&resource_path.join(SLAVE_CLASS_FILE)),
        }
    }

    pub fn module_name(&self) -> &str {
        &self.module_name
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }
}

/// First line of a file without its terminator, or empty if unreadable
fn first_line(path: &Path) -> String {
    let mut line = String::new();
    if let Ok(file) = File::open(path) {
        if BufReader::new(file).read_line(&mut line).is_err() {
            line.clear();
        }
    }

    // CRLF files written on Windows
    let trimmed = line.strip_suffix('\n').unwrap_or(&line);
    let trimmed = trimmed.strip_suffix('\r').unwrap_or(trimmed);
    trimmed.to_string()
}
