//! Error types and exit codes for codemeta analysis runs.

use std::process::ExitCode;

use thiserror::Error;

/// Everything that can abort (or be logged during) an analysis run.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Unsupported language: {language}")]
    UnsupportedLanguage { language: String },

    #[error("Class '{class}' does not exist in namespace '{namespace}'")]
    UnknownClass { namespace: String, class: String },

    #[error("Cannot merge namespace '{found}' into namespace '{expected}'")]
    NamespaceMismatch { expected: String, found: String },

    #[error("Failed to read {path}: {source}")]
    FileAccess {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {message}")]
    ParseFailure { path: String, message: String },

    #[error("Invalid root folder {path}: {message}")]
    RootFolder { path: String, message: String },

    #[error("Failed to write {path}: {message}")]
    Output { path: String, message: String },
}

impl AnalysisError {
    /// Process exit code for the CLI:
    /// - 1: I/O or output failure
    /// - 2: unsupported language / bad root folder
    /// - 3: parse failure
    /// - 4: internal invariant violation
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::FileAccess { .. } | Self::Output { .. } => ExitCode::from(1),
            Self::UnsupportedLanguage { .. } | Self::RootFolder { .. } => ExitCode::from(2),
            Self::ParseFailure { .. } => ExitCode::from(3),
            Self::UnknownClass { .. } | Self::NamespaceMismatch { .. } => ExitCode::from(4),
        }
    }
}

/// Result alias used throughout the core.
pub type Result<T> = std::result::Result<T, AnalysisError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_context() {
        let err = AnalysisError::UnknownClass {
            namespace: "com.acme".to_string(),
            class: "Ghost".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Class 'Ghost' does not exist in namespace 'com.acme'"
        );

        let err = AnalysisError::NamespaceMismatch {
            expected: "a".to_string(),
            found: "b".to_string(),
        };
        assert!(err.to_string().contains("'b'"));
    }

    #[test]
    fn exit_codes_distinguish_kinds() {
        let unsupported = AnalysisError::UnsupportedLanguage {
            language: "cobol".to_string(),
        };
        let parse = AnalysisError::ParseFailure {
            path: "a.java".to_string(),
            message: "boom".to_string(),
        };
        assert_eq!(unsupported.exit_code(), ExitCode::from(2));
        assert_eq!(parse.exit_code(), ExitCode::from(3));
    }
}
