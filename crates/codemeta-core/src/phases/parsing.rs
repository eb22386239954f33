//! Phase 2: Parse every source file and merge the fragments by namespace.

use std::borrow::Cow;
use std::collections::BTreeMap;

use rayon::prelude::*;

use crate::config::{AnalysisConfig, Language};
use crate::error::{AnalysisError, Result};
use crate::languages::{AdapterRegistry, LanguageAdapter};
use crate::metadata::Namespace;
use crate::phases::structure::{self, SourceFile};

/// Build the merged namespace mapping for every `language` file under `root_folder`.
pub fn build_metadata(language: &str, root_folder: &str) -> Result<BTreeMap<String, Namespace>> {
    let config = AnalysisConfig {
        language: language.to_string(),
        root_folder: root_folder.to_string(),
        ..Default::default()
    };
    let language = config.language()?;
    let files = structure::run_structure_phase(&config, language)?;
    run_parsing_phase(&config, language, &files)
}

/// Run the parsing phase over already-enumerated files.
///
/// Files are parsed in parallel when `config.parallel` is set; fragments are
/// always merged one at a time in relative-path order. The first file that
/// cannot be read or parsed aborts the run.
pub fn run_parsing_phase(
    config: &AnalysisConfig,
    language: Language,
    files: &[SourceFile],
) -> Result<BTreeMap<String, Namespace>> {
    let registry = AdapterRegistry::new();
    let adapter = registry.get(language);

    let fragments: Vec<Result<Namespace>> = if config.parallel {
        files.par_iter().map(|f| parse_file(adapter, f)).collect()
    } else {
        files.iter().map(|f| parse_file(adapter, f)).collect()
    };

    let mut namespaces: BTreeMap<String, Namespace> = BTreeMap::new();
    for (file, fragment) in files.iter().zip(fragments) {
        let fragment = fragment.inspect_err(|e| {
            log::error!("Error processing file {}: {e}", file.relative_path);
        })?;
        merge_into(&mut namespaces, fragment)?;
    }

    log::info!(
        "Parsed {} files into {} namespaces",
        files.len(),
        namespaces.len()
    );
    Ok(namespaces)
}

/// Merge one fragment into the mapping, creating the entry on first sight.
pub fn merge_into(namespaces: &mut BTreeMap<String, Namespace>, fragment: Namespace) -> Result<()> {
    match namespaces.get_mut(&fragment.name) {
        Some(existing) => existing.merge(fragment),
        None => {
            namespaces.insert(fragment.name.clone(), fragment);
            Ok(())
        }
    }
}

fn parse_file(adapter: &dyn LanguageAdapter, file: &SourceFile) -> Result<Namespace> {
    let bytes = std::fs::read(&file.absolute_path).map_err(|source| AnalysisError::FileAccess {
        path: file.relative_path.clone(),
        source,
    })?;
    let text = match std::str::from_utf8(&bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(e) => {
            log::warn!(
                "{} is not valid UTF-8 ({e}); invalid bytes replaced before parsing",
                file.relative_path
            );
            String::from_utf8_lossy(&bytes)
        }
    };
    log::debug!("Parsing {} ({} bytes)", file.relative_path, file.size);
    adapter.parse_source(&text, &file.relative_path)
}
