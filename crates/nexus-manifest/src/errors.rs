use crate::validation::ValidationReport;
use std::io;
use thiserror::Error;

/// Errors that can occur while reading or writing manifest documents
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to parse manifest: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid manifest: {0}")]
    InvalidManifest(String),
}

/// Outcome of a rejected publish
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PublishError {
    #[error("Manifest '{namespace}' rejected with {} validation error(s):\n{report}", .report.len())]
    Rejected {
        namespace: String,
        report: ValidationReport,
    },
}

impl PublishError {
    pub fn report(&self) -> &ValidationReport {
        match self {
            PublishError::Rejected { report, .. } => report,
        }
    }
}

/// Failures of the external analysis service
#[derive(Error, Debug)]
pub enum ProducerError {
    #[error("Source code cannot be empty")]
    EmptySource,

    #[error("No response from analysis service")]
    NoResponse,

    #[error("Analysis service returned an unparseable manifest: {0}")]
    Unparseable(#[from] serde_json::Error),

    #[error("Failed to analyze code. Please check your analysis service and try again.")]
    Failed { detail: String },
}
