use thiserror::Error;

use super::config::ConfigError;
use crate::core::model::ModelError;
use crate::core::numbering::CdrError;
use crate::core::tokenizer::TokenizerError;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Tokenization failed: {0}")]
    Tokenizer(#[from] TokenizerError),

    #[error("Separator token '{separator}' not found in the tokenized sequence")]
    BoundaryNotFound { separator: String },

    #[error(
        "Mutable segment has {residues} residues but {tokens} tokens; residue indices cannot be mapped to token positions"
    )]
    TokenizationMismatch { residues: usize, tokens: usize },

    #[error("CDR identification failed: {0}")]
    Cdr(#[from] CdrError),

    #[error("Mask strategy '{0}' is not supported")]
    UnsupportedStrategy(&'static str),

    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Sample {sample} violates the sampling contract at token {position}: {reason}")]
    ContractViolation {
        sample: usize,
        position: usize,
        reason: String,
    },

    #[error("Number of outputs must be greater than zero, got {0}")]
    InvalidOutputCount(usize),

    #[error("Internal logic error: {0}")]
    Internal(String),
}

/// Coarse classification used by callers to decide who is at fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request itself is wrong; fixing the input fixes the failure.
    Configuration,
    /// The tokenizer or the engine disagrees with itself.
    Environment,
    /// The model failed to answer.
    Model,
    /// The model answered, but broke the fill contract.
    ContractViolation,
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::Config(_)
            | EngineError::Tokenizer(_)
            | EngineError::Cdr(_)
            | EngineError::UnsupportedStrategy(_)
            | EngineError::InvalidOutputCount(_) => ErrorKind::Configuration,
            EngineError::BoundaryNotFound { .. }
            | EngineError::TokenizationMismatch { .. }
            | EngineError::Internal(_) => ErrorKind::Environment,
            EngineError::Model(_) => ErrorKind::Model,
            EngineError::ContractViolation { .. } => ErrorKind::ContractViolation,
        }
    }
}
