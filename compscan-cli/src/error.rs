//! CLI-specific error types and exit code mapping

use compscan_core::error::{CompscanError, PatternError};
use compscan_pattern_engine::PatternEngineError;

/// CLI-specific error type.
///
/// Each variant carries enough context for a user-friendly message.
/// The `exit_code()` method maps errors to process exit codes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// A subcommand-specific operation failed.
    #[error("{0}")]
    Command(String),

    /// A descriptor produced by a contributor is misconfigured; the pass was aborted.
    #[error("descriptor configuration error: {0}")]
    Descriptor(String),

    /// Contributor rule file error.
    #[error("rule error: {0}")]
    Rule(String),

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (file read, stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped domain error from compscan-core.
    #[error("{0}")]
    Core(CompscanError),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                               |
    /// |------|---------------------------------------|
    /// | 0    | Success                               |
    /// | 1    | General / command error               |
    /// | 2    | Configuration error                   |
    /// | 4    | Descriptor configuration error        |
    /// | 10   | IO error                              |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 2,
            Self::Descriptor(_) => 4,
            Self::Io(_) => 10,
            Self::Core(CompscanError::Config(_)) => 2,
            Self::Core(CompscanError::Pattern(PatternError::Descriptor(_))) => 4,
            Self::Core(CompscanError::Io(_)) => 10,
            Self::JsonSerialize(_)
            | Self::Command(_)
            | Self::Rule(_)
            | Self::Core(_) => 1,
        }
    }
}

impl From<CompscanError> for CliError {
    fn from(e: CompscanError) -> Self {
        match e {
            CompscanError::Io(io) => Self::Io(io),
            other => Self::Core(other),
        }
    }
}

impl From<PatternEngineError> for CliError {
    fn from(e: PatternEngineError) -> Self {
        if e.is_descriptor_config() {
            return Self::Descriptor(e.to_string());
        }
        match e {
            PatternEngineError::Config { .. } => Self::Config(e.to_string()),
            PatternEngineError::RuleLoad { .. } => Self::Rule(e.to_string()),
            other => Self::Command(other.to_string()),
        }
    }
}
