//! # Core Module
//!
//! Domain data structures and the interfaces to the collaborators the engine depends on.
//!
//! - **Domain models** ([`models`]) - Modalities, CDR names and regions, combined sequences
//! - **Scaffold templates** ([`scaffold`]) - The modality template table and the registry
//!   that resolves which mutable sequence a request uses
//! - **Tokenization** ([`tokenizer`]) - The tokenizer seam and a residue-level reference
//!   tokenizer
//! - **CDR identification** ([`numbering`]) - Numbering-based and fixed-offset CDR locators
//! - **Model seam** ([`model`]) - Scorer and sampler traits plus a background-frequency
//!   reference model
//!
//! Everything here is either immutable process-wide data or created fresh per request.

pub mod model;
pub mod models;
pub mod numbering;
pub mod scaffold;
pub mod tokenizer;
