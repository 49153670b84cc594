//! # Workflows Module
//!
//! High-level entry points that run a complete mutation request.
//!
//! ## Overview
//!
//! A workflow takes a validated configuration plus the external collaborators (tokenizer,
//! model, CDR locator, scaffold registry) and drives the engine from scaffold resolution
//! to verified candidate sequences, reporting progress along the way.
//!
//! ## Architecture
//!
//! - **Mutation Workflow** ([`mutate`]) - Scaffold resolution, scoring, position
//!   selection, masking, and sampling for one target/mutable pair.
//!
//! Every configuration problem that can be detected without the model is reported before
//! the model is first called.

pub mod mutate;
