//! Sequential phase orchestrator with timing.

use std::collections::{BTreeMap, HashMap};
use std::time::Instant;

use crate::config::{AnalysisConfig, AnalysisResult, Language};
use crate::error::Result;
use crate::metadata::Namespace;
use crate::output::build_result;
use crate::phases;
use crate::phases::modules::ModulePartition;
use crate::phases::structure::SourceFile;

/// Phase labels for progress reporting.
const PHASE_LABELS: &[(&str, &str)] = &[
    ("structure", "Mapping file tree"),
    ("parsing", "Parsing source files"),
    ("references", "Resolving references"),
    ("modules", "Detecting modules"),
];

/// Progress callback type: (phase_name, label).
pub type ProgressCallback = Box<dyn FnMut(&str, &str)>;

/// State threaded through the phases.
struct PipelineState {
    language: Language,
    files: Vec<SourceFile>,
    namespaces: BTreeMap<String, Namespace>,
    modules: ModulePartition,
}

/// Type alias for phase function closures to keep signatures readable.
type PhaseFn = fn(&AnalysisConfig, &mut PipelineState) -> Result<()>;

/// Execute the four-phase analysis pipeline and return the result.
pub fn run_pipeline(
    config: &AnalysisConfig,
    mut progress_callback: Option<ProgressCallback>,
) -> Result<AnalysisResult> {
    let mut state = PipelineState {
        language: config.language()?,
        files: Vec::new(),
        namespaces: BTreeMap::new(),
        modules: ModulePartition::default(),
    };
    let mut timings: HashMap<String, f64> = HashMap::new();
    let total_start = Instant::now();

    let phase_fns: [(&str, PhaseFn); 4] = [
        ("structure", |config, state| {
            state.files = phases::structure::run_structure_phase(config, state.language)?;
            Ok(())
        }),
        ("parsing", |config, state| {
            state.namespaces = phases::parsing::run_parsing_phase(config, state.language, &state.files)?;
            Ok(())
        }),
        ("references", |config, state| {
            phases::references::resolve(&mut state.namespaces, &config.root_namespace);
            Ok(())
        }),
        ("modules", |config, state| {
            state.modules = phases::modules::run_modules_phase(config, &state.namespaces);
            Ok(())
        }),
    ];

    for (name, phase_fn) in phase_fns {
        if let Some(ref mut cb) = progress_callback {
            let label = PHASE_LABELS
                .iter()
                .find(|(n, _)| *n == name)
                .map(|(_, l)| *l)
                .unwrap_or(name);
            cb(name, label);
        }

        let start = Instant::now();
        phase_fn(config, &mut state)?;
        let elapsed = start.elapsed().as_secs_f64();
        log::debug!("Phase {name} finished in {:.1} ms", elapsed * 1000.0);
        timings.insert(name.to_string(), elapsed);
    }

    let total_ms = total_start.elapsed().as_secs_f64() * 1000.0;

    Ok(build_result(
        config,
        state.language,
        state.files.len(),
        state.namespaces,
        state.modules,
        &timings,
        total_ms,
    ))
}
