//! # Engine Module
//!
//! The decision logic of uncertainty-guided mutation, from a validated request to verified
//! candidate sequences.
//!
//! ## Pipeline
//!
//! 1. **Assembly** ([`assembler`]) - Tokenizes `target + separator + mutable` and records
//!    where the mutable segment starts and ends.
//! 2. **Uncertainty** ([`uncertainty`]) - Turns the model's self-probabilities into
//!    `1 - p` per mutable position.
//! 3. **Selection** ([`selection`]) - An ordered cascade of strategies (CDR regions,
//!    explicit residues, uncertainty top-k/threshold); the first configured one decides.
//! 4. **Masking** ([`masking`]) - Replaces the chosen tokens with the mask token.
//! 5. **Sampling** ([`sampler`]) - Delegates filling to the model and verifies that only
//!    chosen positions changed.
//!
//! Supporting modules: [`config`] (request configuration and its builder), [`error`]
//! (error taxonomy), [`progress`] (progress callbacks).
//!
//! Every component is a pure function of its inputs; nothing is cached between requests.

pub mod assembler;
pub mod config;
pub mod error;
pub mod masking;
pub mod progress;
pub mod sampler;
pub mod selection;
pub mod uncertainty;
