//! JSON serialisation of analysis results and module partitions.

use std::collections::{BTreeMap, HashMap};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::process::Command;

use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};

use crate::config::{AnalysisConfig, AnalysisResult, Language};
use crate::error::{AnalysisError, Result};
use crate::metadata::Namespace;
use crate::phases::modules::ModulePartition;

/// Try to get the current git commit hash (first 12 chars).
fn get_commit_hash(root_folder: &str) -> Option<String> {
    Command::new("git")
        .args(["rev-parse", "HEAD"])
        .current_dir(root_folder)
        .output()
        .ok()
        .and_then(|output| {
            if output.status.success() {
                let hash = String::from_utf8_lossy(&output.stdout).trim().to_string();
                Some(hash[..hash.len().min(12)].to_string())
            } else {
                None
            }
        })
}

/// Assemble the AnalysisResult from the phase outputs.
pub fn build_result(
    config: &AnalysisConfig,
    language: Language,
    file_count: usize,
    namespaces: BTreeMap<String, Namespace>,
    modules: ModulePartition,
    timings: &HashMap<String, f64>,
    total_ms: f64,
) -> AnalysisResult {
    let root_path = Path::new(&config.root_folder)
        .canonicalize()
        .unwrap_or_else(|_| Path::new(&config.root_folder).to_path_buf());

    let mut metadata = HashMap::new();
    metadata.insert("language".to_string(), json!(language.as_str()));
    metadata.insert(
        "root_folder".to_string(),
        json!(root_path.to_string_lossy()),
    );
    metadata.insert("root_namespace".to_string(), json!(config.root_namespace));
    metadata.insert("analysed_at".to_string(), json!(Utc::now().to_rfc3339()));
    metadata.insert(
        "codemeta_version".to_string(),
        json!(env!("CARGO_PKG_VERSION")),
    );
    metadata.insert(
        "commit_hash".to_string(),
        get_commit_hash(&config.root_folder).map_or(Value::Null, Value::String),
    );
    metadata.insert(
        "analysis_duration_ms".to_string(),
        json!((total_ms * 10.0).round() / 10.0),
    );
    metadata.insert(
        "phase_timings".to_string(),
        serde_json::to_value(timings).unwrap_or_default(),
    );

    let classes: usize = namespaces.values().map(|ns| ns.classes.len()).sum();
    let methods: usize = namespaces.values().map(Namespace::method_count).sum();
    let invocations: usize = namespaces
        .values()
        .flat_map(|ns| ns.classes.values())
        .flat_map(|c| c.methods.iter())
        .map(|m| m.invoked_methods.len())
        .sum();

    let mut stats = HashMap::new();
    stats.insert("files".to_string(), json!(file_count));
    stats.insert("namespaces".to_string(), json!(namespaces.len()));
    stats.insert("classes".to_string(), json!(classes));
    stats.insert("methods".to_string(), json!(methods));
    stats.insert("invocations".to_string(), json!(invocations));
    stats.insert("modules".to_string(), json!(modules.len()));
    stats.insert("modularity".to_string(), json!(modules.modularity));

    AnalysisResult {
        version: "1.0".to_string(),
        metadata,
        stats,
        namespaces,
        modules,
    }
}

/// Render a module partition as `{ "id": [namespace, ...] }` with sorted members.
pub fn modules_json(partition: &ModulePartition) -> Value {
    let map: serde_json::Map<String, Value> = partition
        .modules
        .iter()
        .map(|(id, members)| (id.to_string(), json!(members)))
        .collect();
    Value::Object(map)
}

/// Write any serialisable value to a pretty-printed JSON file.
pub fn write_output<T: Serialize + ?Sized>(value: &T, output_path: &str) -> Result<()> {
    let to_output_error = |message: String| AnalysisError::Output {
        path: output_path.to_string(),
        message,
    };

    if let Some(parent) = Path::new(output_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| to_output_error(e.to_string()))?;
        }
    }
    let file = std::fs::File::create(output_path).map_err(|e| to_output_error(e.to_string()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value).map_err(|e| to_output_error(e.to_string()))?;
    writer.flush().map_err(|e| to_output_error(e.to_string()))
}
