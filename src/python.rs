use crate::{LayoutAdjuster, PrintPrepError, PrepareReport};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList, PyModule};

#[pyfunction]
#[pyo3(signature = (html, resize_events=0, break_every=5, label_threshold=16, debug_log=None))]
fn prepare_html<'py>(
    py: Python<'py>,
    html: String,
    resize_events: usize,
    break_every: usize,
    label_threshold: usize,
    debug_log: Option<String>,
) -> PyResult<(String, Bound<'py, PyDict>)> {
    let mut builder = LayoutAdjuster::builder()
        .break_every(break_every)
        .label_threshold(label_threshold);
    if let Some(path) = debug_log {
        builder = builder.debug_log(path);
    }
    let adjuster = builder.build().map_err(to_py_err)?;
    let prepared = py.allow_threads(|| adjuster.prepare(&html, resize_events));
    let report = report_to_py(py, &prepared.report)?;
    Ok((prepared.html, report))
}

fn report_to_py<'py>(py: Python<'py>, report: &PrepareReport) -> PyResult<Bound<'py, PyDict>> {
    let out = PyDict::new_bound(py);
    for (name, set) in [
        ("blocks", &report.page_breaks.blocks),
        ("rows", &report.page_breaks.rows),
    ] {
        let entry = PyDict::new_bound(py);
        entry.set_item("matched", set.matched)?;
        entry.set_item("marked", set.marked)?;
        entry.set_item("changed", set.changed)?;
        out.set_item(name, entry)?;
    }
    match &report.label {
        Some(label) => {
            let entry = PyDict::new_bound(py);
            entry.set_item("char_count", label.char_count)?;
            entry.set_item("enlarged", label.enlarged)?;
            entry.set_item("changed", label.changed)?;
            out.set_item("label", entry)?;
        }
        None => out.set_item("label", py.None())?,
    }
    let events = PyList::empty_bound(py);
    for event in &report.events {
        events.append(event.as_str())?;
    }
    out.set_item("events", events)?;
    let failures = PyList::empty_bound(py);
    for failure in &report.failures {
        let entry = PyDict::new_bound(py);
        entry.set_item("event", failure.event.as_str())?;
        entry.set_item("message", failure.message.clone())?;
        failures.append(entry)?;
    }
    out.set_item("failures", failures)?;
    out.set_item("elapsed_ms", report.elapsed_ms)?;
    out.set_item("output_sha256", report.output_sha256.clone())?;
    Ok(out)
}

#[pymodule]
fn _printfit(_py: Python<'_>, module: &Bound<'_, PyModule>) -> PyResult<()> {
    module.add_function(wrap_pyfunction!(prepare_html, module)?)?;
    Ok(())
}

fn to_py_err(err: PrintPrepError) -> PyErr {
    PyValueError::new_err(err.to_string())
}
