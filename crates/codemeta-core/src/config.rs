//! Run configuration, supported languages and the analysis result type.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};
use crate::metadata::Namespace;
use crate::phases::modules::ModulePartition;

/// A source language the analyser has an adapter for.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Java,
    Kotlin,
    Php,
    Python,
}

impl Language {
    pub const ALL: [Language; 4] = [Self::Java, Self::Kotlin, Self::Php, Self::Python];

    /// Identifier accepted on the command line and in configs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Java => "java",
            Self::Kotlin => "kotlin",
            Self::Php => "php",
            Self::Python => "python",
        }
    }

    /// Human-readable language name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Java => "Java",
            Self::Kotlin => "Kotlin",
            Self::Php => "PHP",
            Self::Python => "Python",
        }
    }

    /// File extensions (without the dot) handled by this language.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Self::Java => &["java"],
            Self::Kotlin => &["kt", "kts"],
            Self::Php => &["php"],
            Self::Python => &["py"],
        }
    }

    /// Parse a language identifier (case-insensitive).
    pub fn from_identifier(id: &str) -> Result<Self> {
        let lowered = id.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|l| l.as_str() == lowered)
            .ok_or_else(|| AnalysisError::UnsupportedLanguage {
                language: id.to_string(),
            })
    }

    pub fn matches_extension(&self, ext: &str) -> bool {
        self.extensions().iter().any(|e| e.eq_ignore_ascii_case(ext))
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration for an analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub root_folder: String,
    #[serde(default)]
    pub root_namespace: String,
    pub output_path: Option<String>,
    pub modules_output_path: Option<String>,
    #[serde(default)]
    pub exclude_patterns: Vec<String>,
    /// Files larger than this many bytes are skipped. `None` keeps every file.
    #[serde(default)]
    pub max_file_size: Option<u64>,
    #[serde(default = "default_resolution")]
    pub resolution: f64,
    #[serde(default = "default_parallel")]
    pub parallel: bool,
    #[serde(default)]
    pub verbose: bool,
    #[serde(default)]
    pub quiet: bool,
}

fn default_resolution() -> f64 {
    1.0
}
fn default_parallel() -> bool {
    true
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            language: String::new(),
            root_folder: String::new(),
            root_namespace: String::new(),
            output_path: None,
            modules_output_path: None,
            exclude_patterns: Vec::new(),
            max_file_size: None,
            resolution: default_resolution(),
            parallel: default_parallel(),
            verbose: false,
            quiet: false,
        }
    }
}

impl AnalysisConfig {
    /// Resolve the configured language identifier.
    pub fn language(&self) -> Result<Language> {
        Language::from_identifier(&self.language)
    }
}

/// Result of an analysis run.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    pub version: String,
    pub metadata: HashMap<String, serde_json::Value>,
    pub stats: HashMap<String, serde_json::Value>,
    pub namespaces: BTreeMap<String, Namespace>,
    pub modules: ModulePartition,
}
