//! Phase 1: Walk the file tree and collect source files for one language.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::config::{AnalysisConfig, Language};
use crate::error::{AnalysisError, Result};

/// A source file selected for parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Path relative to the root folder, `/`-separated.
    pub relative_path: String,
    pub absolute_path: PathBuf,
    pub size: u64,
}

/// Check that `root_folder` exists and is a directory.
pub fn validate_root(root_folder: &str) -> Result<&Path> {
    let root = Path::new(root_folder);
    if !root.exists() {
        return Err(AnalysisError::RootFolder {
            path: root_folder.to_string(),
            message: "does not exist".to_string(),
        });
    }
    if !root.is_dir() {
        return Err(AnalysisError::RootFolder {
            path: root_folder.to_string(),
            message: "is not a directory".to_string(),
        });
    }
    Ok(root)
}

/// Run the structure phase: enumerate files of `language` under the root, sorted by relative path.
///
/// Every matching file is collected unless `config.exclude_patterns` names
/// one of its path components or it exceeds `config.max_file_size`. Symlinks
/// to files are followed; an unreadable directory aborts the run.
pub fn run_structure_phase(config: &AnalysisConfig, language: Language) -> Result<Vec<SourceFile>> {
    let root = validate_root(&config.root_folder)?;

    let mut files = Vec::new();
    let mut skipped = 0usize;

    for entry in WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_excluded(e.file_name(), &config.exclude_patterns))
    {
        let entry = entry.map_err(|e| {
            let path = e
                .path()
                .map(|p| p.to_string_lossy().to_string())
                .unwrap_or_else(|| config.root_folder.clone());
            AnalysisError::FileAccess {
                path,
                source: e.into(),
            }
        })?;

        let abs_path = entry.path();
        let is_file = entry.file_type().is_file() || (entry.path_is_symlink() && abs_path.is_file());
        if !is_file {
            continue;
        }

        let ext = abs_path
            .extension()
            .map(|e| e.to_string_lossy().to_string())
            .unwrap_or_default();
        if !language.matches_extension(&ext) {
            continue;
        }

        let size = std::fs::metadata(abs_path)
            .map_err(|source| AnalysisError::FileAccess {
                path: abs_path.to_string_lossy().to_string(),
                source,
            })?
            .len();
        let rel_path = abs_path
            .strip_prefix(root)
            .unwrap_or(abs_path)
            .to_string_lossy()
            .replace('\\', "/");

        if let Some(limit) = config.max_file_size.filter(|&limit| size > limit) {
            log::warn!("Skipping {rel_path}: {size} bytes exceeds the {limit} byte limit");
            skipped += 1;
            continue;
        }

        files.push(SourceFile {
            relative_path: rel_path,
            absolute_path: abs_path.to_path_buf(),
            size,
        });
    }

    files.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
    log::info!(
        "Found {} {} files under {} ({skipped} skipped as oversized)",
        files.len(),
        language.display_name(),
        config.root_folder
    );
    Ok(files)
}

fn is_excluded(name: &OsStr, exclude_patterns: &[String]) -> bool {
    let name = name.to_string_lossy();
    exclude_patterns.iter().any(|p| name == p.as_str())
}
