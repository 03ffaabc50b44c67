//! Python bindings for qrng via PyO3.
//!
//! Exposes a `Context` class plus module-level functions that take a context
//! as their first argument, so scripts can use either style:
//!
//! ```python
//! import qrng
//! ctx = qrng.init()
//! qrng.generate_range32(ctx, 1, 6)
//! ctx.generate_range32(1, 6)
//! ```

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::{PyByteArray, PyBytes, PyDict, PyList};

use qrng_core::{QrngError, QuantumRng};

fn to_py_err(err: QrngError) -> PyErr {
    PyValueError::new_err(err.to_string())
}

/// Run `op` over a copy of a bytearray's contents and write the result back.
fn with_bytearray<F>(buf: &Bound<'_, PyByteArray>, op: F) -> PyResult<()>
where
    F: FnOnce(&mut [u8]) -> qrng_core::Result<()>,
{
    let mut data = buf.to_vec();
    op(&mut data).map_err(to_py_err)?;
    // SAFETY: the GIL is held and no Python code runs between borrowing the
    // buffer and the copy, so the bytearray cannot be resized or aliased.
    unsafe { buf.as_bytes_mut() }.copy_from_slice(&data);
    Ok(())
}

/// Quantum-inspired random number generator context.
#[pyclass(name = "Context")]
struct PyContext {
    inner: QuantumRng,
}

#[pymethods]
impl PyContext {
    /// Create a context. Without a seed, 32 bytes are drawn from the OS.
    #[new]
    #[pyo3(signature = (seed=None))]
    fn new(seed: Option<&[u8]>) -> PyResult<Self> {
        let inner = match seed {
            Some(s) => QuantumRng::with_seed(s),
            None => QuantumRng::from_os_seed().map_err(to_py_err)?,
        };
        Ok(Self { inner })
    }

    /// Mix new seed material into the context.
    fn reseed(&mut self, seed: &[u8]) -> PyResult<()> {
        self.inner.reseed(seed).map_err(to_py_err)
    }

    fn generate_bytes<'py>(&mut self, py: Python<'py>, n: usize) -> PyResult<Bound<'py, PyBytes>> {
        let data = self.inner.generate_bytes(n).map_err(to_py_err)?;
        Ok(PyBytes::new(py, &data))
    }

    fn generate_uint64(&mut self) -> u64 {
        self.inner.generate_uint64()
    }

    fn generate_double(&mut self) -> f64 {
        self.inner.generate_double()
    }

    fn generate_range32(&mut self, min: i32, max: i32) -> PyResult<i32> {
        self.inner.generate_range32(min, max).map_err(to_py_err)
    }

    fn generate_range64(&mut self, min: u64, max: u64) -> PyResult<u64> {
        self.inner.generate_range64(min, max).map_err(to_py_err)
    }

    /// Estimated entropy per bit of the current state.
    fn get_entropy_estimate(&mut self) -> f64 {
        self.inner.entropy_estimate()
    }

    /// Entangle two equal-length bytearrays in place.
    fn entangle_states(
        &mut self,
        state_a: &Bound<'_, PyByteArray>,
        state_b: &Bound<'_, PyByteArray>,
    ) -> PyResult<()> {
        let mut b = state_b.to_vec();
        with_bytearray(state_a, |a| self.inner.entangle_states(a, &mut b))?;
        // SAFETY: GIL held; no Python code runs during the copy.
        unsafe { state_b.as_bytes_mut() }.copy_from_slice(&b);
        Ok(())
    }

    /// Measure a bytearray in place.
    fn measure_state(&mut self, state: &Bound<'_, PyByteArray>) -> PyResult<()> {
        with_bytearray(state, |s| self.inner.measure_state(s))
    }

    /// Circuit steps run so far.
    #[getter]
    fn steps(&self) -> u64 {
        self.inner.steps()
    }

    fn __repr__(&self) -> String {
        format!("{:?}", self.inner)
    }
}

/// Create a new OS-seeded context.
#[pyfunction]
fn init() -> PyContext {
    PyContext {
        inner: qrng_core::init(),
    }
}

#[pyfunction]
fn generate_bytes<'py>(
    py: Python<'py>,
    mut ctx: PyRefMut<'_, PyContext>,
    n: usize,
) -> PyResult<Bound<'py, PyBytes>> {
    ctx.generate_bytes(py, n)
}

#[pyfunction]
fn generate_uint64(mut ctx: PyRefMut<'_, PyContext>) -> u64 {
    ctx.generate_uint64()
}

#[pyfunction]
fn generate_double(mut ctx: PyRefMut<'_, PyContext>) -> f64 {
    ctx.generate_double()
}

#[pyfunction]
fn generate_range32(mut ctx: PyRefMut<'_, PyContext>, min: i32, max: i32) -> PyResult<i32> {
    ctx.generate_range32(min, max)
}

#[pyfunction]
fn generate_range64(mut ctx: PyRefMut<'_, PyContext>, min: u64, max: u64) -> PyResult<u64> {
    ctx.generate_range64(min, max)
}

#[pyfunction]
fn get_entropy_estimate(mut ctx: PyRefMut<'_, PyContext>) -> f64 {
    ctx.get_entropy_estimate()
}

#[pyfunction]
fn entangle_states(
    mut ctx: PyRefMut<'_, PyContext>,
    state_a: &Bound<'_, PyByteArray>,
    state_b: &Bound<'_, PyByteArray>,
) -> PyResult<()> {
    ctx.entangle_states(state_a, state_b)
}

#[pyfunction]
fn measure_state(mut ctx: PyRefMut<'_, PyContext>, state: &Bound<'_, PyByteArray>) -> PyResult<()> {
    ctx.measure_state(state)
}

/// Description of an error code.
#[pyfunction]
fn error_string(code: i32) -> &'static str {
    qrng_core::error_string(code)
}

/// Run the randomness test battery on a bytes object.
#[pyfunction]
fn run_all_tests<'py>(py: Python<'py>, data: &[u8]) -> PyResult<Bound<'py, PyList>> {
    let results = qrng_tests::run_all_tests(data);
    let list = PyList::empty(py);
    for r in &results {
        let d = PyDict::new(py);
        d.set_item("name", &r.name)?;
        d.set_item("passed", r.passed)?;
        d.set_item("p_value", r.p_value)?;
        d.set_item("statistic", r.statistic)?;
        d.set_item("details", &r.details)?;
        d.set_item("grade", r.grade.to_string())?;
        list.append(d)?;
    }
    Ok(list)
}

/// Quality score (0-100) from `run_all_tests` output.
#[pyfunction]
fn calculate_quality_score(results: &Bound<'_, PyList>) -> PyResult<f64> {
    let mut rust_results = Vec::with_capacity(results.len());
    for item in results.iter() {
        let d = item.downcast::<PyDict>()?;
        let grade: String = d
            .get_item("grade")?
            .map(|v| v.extract::<String>())
            .unwrap_or(Ok("F".to_string()))?;
        rust_results.push(qrng_tests::TestResult {
            name: d
                .get_item("name")?
                .map(|v| v.extract::<String>())
                .unwrap_or(Ok(String::new()))?,
            passed: d
                .get_item("passed")?
                .map(|v| v.extract::<bool>())
                .unwrap_or(Ok(false))?,
            p_value: d.get_item("p_value")?.and_then(|v| v.extract::<f64>().ok()),
            statistic: 0.0,
            details: String::new(),
            grade: grade.chars().next().unwrap_or('F'),
        });
    }
    Ok(qrng_tests::calculate_quality_score(&rust_results))
}

/// Quick quality report of a byte string.
#[pyfunction]
fn quality_report<'py>(py: Python<'py>, data: &[u8]) -> PyResult<Bound<'py, PyDict>> {
    let report = qrng_core::quality_report(data);
    let d = PyDict::new(py);
    d.set_item("samples", report.samples)?;
    d.set_item("unique_values", report.unique_values)?;
    d.set_item("shannon_entropy", report.shannon_entropy)?;
    d.set_item("min_entropy", report.min_entropy)?;
    d.set_item("compression_ratio", report.compression_ratio)?;
    d.set_item("quality_score", report.quality_score)?;
    d.set_item("grade", report.grade.to_string())?;
    Ok(d)
}

/// Library version.
#[pyfunction]
fn version() -> &'static str {
    qrng_core::VERSION
}

/// Python module definition.
#[pymodule]
fn qrng(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add("__version__", qrng_core::VERSION)?;
    m.add_class::<PyContext>()?;
    m.add_function(wrap_pyfunction!(init, m)?)?;
    m.add_function(wrap_pyfunction!(generate_bytes, m)?)?;
    m.add_function(wrap_pyfunction!(generate_uint64, m)?)?;
    m.add_function(wrap_pyfunction!(generate_double, m)?)?;
    m.add_function(wrap_pyfunction!(generate_range32, m)?)?;
    m.add_function(wrap_pyfunction!(generate_range64, m)?)?;
    m.add_function(wrap_pyfunction!(get_entropy_estimate, m)?)?;
    m.add_function(wrap_pyfunction!(entangle_states, m)?)?;
    m.add_function(wrap_pyfunction!(measure_state, m)?)?;
    m.add_function(wrap_pyfunction!(error_string, m)?)?;
    m.add_function(wrap_pyfunction!(run_all_tests, m)?)?;
    m.add_function(wrap_pyfunction!(calculate_quality_score, m)?)?;
    m.add_function(wrap_pyfunction!(quality_report, m)?)?;
    m.add_function(wrap_pyfunction!(version, m)?)?;
    Ok(())
}
