//! # Model Seam
//!
//! The masked language model is an external collaborator. The engine needs exactly two
//! things from it:
//!
//! - [`Scorer`]: the probability the model assigns to the token actually present at every
//!   position of a sequence.
//! - [`Sampler`]: fill every mask token of a sequence, `n` independent times.
//!
//! Both calls may be slow; the engine neither retries nor times them out.
//!
//! [`background::BackgroundModel`] is a context-free reference model built on amino-acid
//! background frequencies. It is useful for wiring, tests and offline dry runs; it knows
//! nothing about binding.

pub mod background;

use crate::core::models::sequence::TokenId;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModelError {
    #[error("Model inference failed: {0}")]
    Inference(String),

    #[error("Model returned {actual} scores for a sequence of {expected} tokens")]
    ScoreLengthMismatch { expected: usize, actual: usize },

    #[error("Model returned {actual} sampled sequences, {expected} were requested")]
    SampleCountMismatch { expected: usize, actual: usize },
}

pub trait Scorer {
    /// Scores a tokenized sequence.
    ///
    /// # Arguments
    ///
    /// * `tokens` - The full tokenized sequence, special tokens included.
    ///
    /// # Return
    ///
    /// One probability per input token: the model's probability for the token observed at
    /// that position.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError`] if inference fails.
    fn score(&self, tokens: &[TokenId]) -> Result<Vec<f64>, ModelError>;
}

pub trait Sampler {
    /// Resolves every mask token in `masked`, `n` times.
    ///
    /// # Arguments
    ///
    /// * `masked` - The tokenized sequence with the positions to resample set to the mask
    ///   token.
    /// * `n` - Number of independent samples to draw.
    ///
    /// # Return
    ///
    /// `n` token sequences of the same length as `masked`. Positions that were not masked
    /// must be returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError`] if inference fails.
    fn fill(&mut self, masked: &[TokenId], n: usize) -> Result<Vec<Vec<TokenId>>, ModelError>;
}
