//! # UGM Core Library
//!
//! Uncertainty-guided mutation of peptide and protein-scaffold sequences with a masked
//! protein language model.
//!
//! A request pairs a fixed *target* sequence with a *mutable* peptide or scaffold. The
//! combined sequence is scored by the model, the per-position confidence is turned into an
//! uncertainty signal, a subset of mutable positions is chosen for resampling, and the
//! model fills the masked positions to produce candidate sequences. The target is never
//! modified.
//!
//! ## Architectural Philosophy
//!
//! - **[`core`]: The Foundation.** Stateless domain data (modalities, CDR regions, combined
//!   sequences), the read-only template and CDR tables, and the seams to external
//!   collaborators (tokenizer, scorer/sampler, antibody numbering).
//!
//! - **[`engine`]: The Logic Core.** Configuration and validation, sequence assembly,
//!   uncertainty estimation, the position-selection cascade, masking, and sampled-output
//!   verification.
//!
//! - **[`workflows`]: The Public API.** [`workflows::mutate::run`] ties `core` and `engine`
//!   together into a single request/response call.

pub mod core;
pub mod engine;
pub mod workflows;
