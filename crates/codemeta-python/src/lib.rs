//! PyO3 bindings for the CodeMeta analysis engine.

use std::collections::BTreeMap;
use std::path::Path;

use pyo3::exceptions::PyRuntimeError;
use pyo3::prelude::*;
use pyo3::types::PyDict;
use serde::Serialize;

use codemeta_core::config::AnalysisConfig;
use codemeta_core::output::modules_json;
use codemeta_core::query::{self, CodeMeta};
use codemeta_core::{pipeline, Namespace};

/// Python-visible analysis configuration.
#[pyclass(name = "AnalysisConfig")]
#[derive(Clone)]
struct PyAnalysisConfig {
    #[pyo3(get, set)]
    root_namespace: String,
    #[pyo3(get, set)]
    exclude_patterns: Vec<String>,
    #[pyo3(get, set)]
    max_file_size: Option<u64>,
    #[pyo3(get, set)]
    resolution: f64,
    #[pyo3(get, set)]
    parallel: bool,
}

#[pymethods]
impl PyAnalysisConfig {
    #[new]
    #[pyo3(signature = (
        root_namespace = String::new(),
        exclude_patterns = Vec::new(),
        max_file_size = None,
        resolution = 1.0,
        parallel = true,
    ))]
    fn new(
        root_namespace: String,
        exclude_patterns: Vec<String>,
        max_file_size: Option<u64>,
        resolution: f64,
        parallel: bool,
    ) -> Self {
        Self {
            root_namespace,
            exclude_patterns,
            max_file_size,
            resolution,
            parallel,
        }
    }
}

impl PyAnalysisConfig {
    fn into_config(self, language: &str, root_folder: &str) -> AnalysisConfig {
        AnalysisConfig {
            language: language.to_string(),
            root_folder: root_folder.to_string(),
            root_namespace: self.root_namespace,
            exclude_patterns: self.exclude_patterns,
            max_file_size: self.max_file_size,
            resolution: self.resolution,
            parallel: self.parallel,
            ..Default::default()
        }
    }
}

fn runtime_error(e: impl std::fmt::Display) -> PyErr {
    PyRuntimeError::new_err(e.to_string())
}

/// Serialize to JSON then parse into a Python object.
fn to_python<T: Serialize + ?Sized>(py: Python<'_>, value: &T) -> PyResult<PyObject> {
    let json_str = serde_json::to_string(value).map_err(runtime_error)?;
    let json_module = py.import("json")?;
    Ok(json_module.call_method1("loads", (json_str,))?.unbind())
}

/// Analyse a source tree and return the full result as a Python dict.
#[pyfunction]
#[pyo3(signature = (language, path, config = None, progress = None))]
fn analyze(
    py: Python<'_>,
    language: &str,
    path: &str,
    config: Option<PyAnalysisConfig>,
    progress: Option<PyObject>,
) -> PyResult<Py<PyDict>> {
    let analysis_config = config
        .unwrap_or_else(|| PyAnalysisConfig::new(String::new(), Vec::new(), None, 1.0, true))
        .into_config(language, path);

    // Wrap the Python callable as a Rust ProgressCallback
    let progress_callback = progress.map(|py_cb| -> pipeline::ProgressCallback {
        Box::new(move |phase: &str, label: &str| {
            Python::with_gil(|py| {
                let _ = py_cb.call1(py, (phase, label));
            });
        })
    });

    let result = pipeline::run_pipeline(&analysis_config, progress_callback).map_err(runtime_error)?;
    to_python(py, &result)?.extract::<Py<PyDict>>(py)
}

/// Query views over a resolved namespace mapping.
#[pyclass(name = "CodeMeta")]
struct PyCodeMeta {
    namespaces: BTreeMap<String, Namespace>,
}

#[pymethods]
impl PyCodeMeta {
    /// Build, resolve and wrap the metadata of one source tree.
    #[new]
    #[pyo3(signature = (language, path, root_namespace = String::new()))]
    fn new(language: &str, path: &str, root_namespace: String) -> PyResult<Self> {
        let mut namespaces = codemeta_core::build_metadata(language, path).map_err(runtime_error)?;
        codemeta_core::resolve(&mut namespaces, &root_namespace);
        Ok(Self { namespaces })
    }

    fn list_namespaces(&self, py: Python<'_>) -> PyResult<PyObject> {
        to_python(py, &CodeMeta::new(&self.namespaces).list_namespaces())
    }

    fn get_namespace_meta(&self, py: Python<'_>, namespace: &str) -> PyResult<PyObject> {
        to_python(py, &CodeMeta::new(&self.namespaces).get_namespace_meta(namespace))
    }

    fn get_children_namespaces(&self, namespace: &str) -> Vec<String> {
        CodeMeta::new(&self.namespaces).get_children_namespaces(namespace)
    }

    fn get_namespaces_meta(&self, py: Python<'_>, namespaces: Vec<String>) -> PyResult<PyObject> {
        to_python(py, &CodeMeta::new(&self.namespaces).get_namespaces_meta(&namespaces))
    }

    fn get_classes_meta(&self, py: Python<'_>, fully_qualified_names: Vec<String>) -> PyResult<PyObject> {
        to_python(py, &CodeMeta::new(&self.namespaces).get_classes_meta(&fully_qualified_names))
    }

    /// Module partition as `{id: [namespace, ...]}`.
    fn detect_modules(&self, py: Python<'_>) -> PyResult<PyObject> {
        let partition = CodeMeta::new(&self.namespaces).detect_modules();
        to_python(py, &modules_json(&partition))
    }

    fn to_dict(&self, py: Python<'_>) -> PyResult<PyObject> {
        to_python(py, &self.namespaces)
    }
}

/// Concatenate the given files under `root` with `// File:` banners.
#[pyfunction]
fn read_sources(root: &str, paths: Vec<String>) -> String {
    query::read_sources(Path::new(root), &paths)
}

/// Return the CodeMeta engine version.
#[pyfunction]
fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// CodeMeta Rust analysis engine.
#[pymodule]
fn _codemeta_rust(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(analyze, m)?)?;
    m.add_function(wrap_pyfunction!(read_sources, m)?)?;
    m.add_function(wrap_pyfunction!(version, m)?)?;
    m.add_class::<PyAnalysisConfig>()?;
    m.add_class::<PyCodeMeta>()?;
    Ok(())
}
