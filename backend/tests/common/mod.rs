//! Shared fixtures for bridge integration tests
//!
//! Each fixture writes a throw-away resource directory holding the two
//! descriptor files and a Python module. Module names are unique per fixture
//! because the interpreter caches imported modules for the whole process.

#![allow(dead_code)]

use pyslave_bridge::{InterpreterContext, SlaveBridge, SLAVE_CLASS_FILE, SLAVE_MODULE_FILE};
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use uuid::Uuid;

/// Slave with plain storage semantics for all four kinds
///
/// Setters reject payload elements of the wrong Python type so tests can
/// observe the conversions the bridge performs. Lifecycle calls leave traces
/// in reserved slots:
/// - real 100: last `setup_experiment` start time
/// - real 101 / 102: last `do_step` current time / step size
/// - boolean 100: inside initialization mode
/// - string 100: last lifecycle call
pub const STORAGE_SLAVE: &str = r#"
class Slave:
    def __init__(self):
        self.integers = {}
        self.reals = {}
        self.booleans = {}
        self.strings = {}
        self.counter = 0

    def define(self):
        self.integers[0] = 0

    def setup_experiment(self, start_time):
        self.reals[100] = start_time
        self.strings[100] = "setup_experiment"

    def enter_initialization_mode(self):
        self.booleans[100] = True
        self.strings[100] = "enter_initialization_mode"

    def exit_initialization_mode(self):
        self.booleans[100] = False
        self.strings[100] = "exit_initialization_mode"

    def do_step(self, current_time, step_size):
        self.counter += 1
        self.integers[0] = self.counter
        self.reals[101] = current_time
        self.reals[102] = step_size
        return self.counter > 0

    def reset(self):
        self.counter = 0
        self.integers[0] = 0
        self.strings[100] = "reset"

    def terminate(self):
        self.strings[100] = "terminate"

    @staticmethod
    def _fill(table, refs, values, default):
        for i, ref in enumerate(refs):
            if type(ref) is not int:
                raise TypeError("reference must be int")
            values[i] = table.get(ref, default)

    @staticmethod
    def _store(table, refs, values, kind):
        for ref, value in zip(refs, values):
            if type(value) is not kind:
                raise TypeError("expected %s, got %s" % (kind.__name__, type(value).__name__))
            table[ref] = value

    def get_integer(self, refs, values):
        self._fill(self.integers, refs, values, 0)

    def get_real(self, refs, values):
        self._fill(self.reals, refs, values, 0.0)

    def get_boolean(self, refs, values):
        self._fill(self.booleans, refs, values, False)

    def get_string(self, refs, values):
        self._fill(self.strings, refs, values, "")

    def set_integer(self, refs, values):
        self._store(self.integers, refs, values, int)

    def set_real(self, refs, values):
        self._store(self.reals, refs, values, float)

    def set_boolean(self, refs, values):
        self._store(self.booleans, refs, values, bool)

    def set_string(self, refs, values):
        self._store(self.strings, refs, values, str)
"#;

/// Temporary resource directory with a slave module in it
pub struct SlaveFixture {
    dir: TempDir,
    module: String,
}

impl SlaveFixture {
    /// Fixture for `STORAGE_SLAVE`
    pub fn storage() -> Self {
        Self::with_source("Slave", STORAGE_SLAVE)
    }

    /// Fixture whose module holds `source`, naming `class_name` as the slave
    pub fn with_source(class_name: &str, source: &str) -> Self {
        let module = format!("slave_{}", Uuid::new_v4().simple());
        Self::named(&module, class_name, source)
    }

    /// Fixture with an explicit module name
    ///
    /// Only one fixture per test binary may use a given name.
    pub fn named(module: &str, class_name: &str, source: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(SLAVE_MODULE_FILE), format!("{}\n", module)).unwrap();
        fs::write(dir.path().join(SLAVE_CLASS_FILE), format!("{}\n", class_name)).unwrap();
        fs::write(dir.path().join(format!("{}.py", module)), source).unwrap();
        SlaveFixture {
            dir,
            module: module.to_string(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn load(&self) -> Result<SlaveBridge, pyslave_bridge::FatalError> {
        let context = InterpreterContext::initialize();
        SlaveBridge::new(&context, self.path())
    }

    pub fn bridge(&self) -> SlaveBridge {
        self.load().expect("slave should load")
    }
}

/// Slave whose `do_step` returns the given Python expression
pub fn stepping_slave(return_expr: &str) -> SlaveFixture {
    let source = format!(
        r#"
class Stepper:
    def define(self):
        pass

    def do_step(self, current_time, step_size):
        return {}
"#,
        return_expr
    );
    SlaveFixture::with_source("Stepper", &source)
}
