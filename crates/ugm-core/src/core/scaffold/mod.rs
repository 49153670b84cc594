//! Scaffold templates and mutable-sequence resolution.
//!
//! [`templates`] holds the read-only modality → template table. [`registry`] resolves the
//! mutable segment of a request from either an explicit sequence or a template.

pub mod registry;
pub mod templates;
