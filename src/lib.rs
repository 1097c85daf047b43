// FFI Facade: The main entry point for Python.
// This file uses `pyo3` to define the `_core` Python
// module and expose Rust structs and functions as Python objects.

pub mod analysis;
pub mod bindings;
pub mod display;
pub mod ingest;
pub mod schema;
pub mod store;
pub mod tables;

use pyo3::prelude::*;

/// A simple function to confirm the Rust core is callable from Python.
#[pyfunction]
fn rust_core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

// --- Module Definition ---
/// This function defines the `vigil._core` Python module.
/// The name `_core` is chosen to indicate it's an internal, compiled component.
#[pymodule]
fn _core(_py: Python, m: &Bound<'_, PyModule>) -> PyResult<()> {
    let version_fn = wrap_pyfunction!(rust_core_version, m)?;
    m.add_function(version_fn)?;
    m.add_class::<bindings::PyDashboard>()?;
    Ok(())
}
