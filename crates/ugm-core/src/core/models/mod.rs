//! # Core Models Module
//!
//! Plain data types shared by every layer of the library.
//!
//! - [`modality`] - Scaffold modalities (affibody, nanobody, affitin, custom)
//! - [`cdr`] - CDR names, half-open CDR regions and the set of three regions of a nanobody
//! - [`sequence`] - Token ids and the tokenized target + separator + mutable sequence

pub mod cdr;
pub mod modality;
pub mod sequence;
