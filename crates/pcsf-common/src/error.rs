use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ForestError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed row in {file} at line {line}: {reason}")]
    MalformedRow {
        file: String,
        line: u64,
        reason: String,
    },

    #[error(
        "Interactome has {edges} edges; random terminal sampling needs at least {required}. \
         Disable random_terminals_repetitions or supply a larger interactome."
    )]
    InteractomeTooSmall { edges: usize, required: usize },

    #[error("Solver failed on {trial}: {reason}")]
    Solver { trial: String, reason: String },

    #[error("Invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ForestError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ForestError::Io { path: path.into(), source }
    }

    pub fn malformed(file: impl Into<String>, line: u64, reason: impl Into<String>) -> Self {
        ForestError::MalformedRow {
            file: file.into(),
            line,
            reason: reason.into(),
        }
    }

    pub fn invalid_parameter(name: impl Into<String>, reason: impl Into<String>) -> Self {
        ForestError::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ForestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_row_names_file_and_line() {
        let err = ForestError::malformed("edges.tsv", 12, "expected 3 columns, found 2");
        let msg = err.to_string();
        assert!(msg.contains("edges.tsv"));
        assert!(msg.contains("line 12"));
        assert!(msg.contains("expected 3 columns"));
    }

    #[test]
    fn test_too_small_message_is_actionable() {
        let err = ForestError::InteractomeTooSmall { edges: 49, required: 50 };
        let msg = err.to_string();
        assert!(msg.contains("49"));
        assert!(msg.contains("random_terminals_repetitions"));
    }
}
