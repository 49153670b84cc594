//! # CDR Identification Module
//!
//! Locates the three complementarity-determining regions of a nanobody scaffold.
//!
//! Two interchangeable strategies sit behind the [`CdrLocator`] capability:
//!
//! - [`numbering_based::NumberingBasedLocator`] asks an external antibody-numbering
//!   collaborator for the CDR substrings and finds them verbatim in the scaffold. When the
//!   collaborator fails, or reports loops that cannot be found, it degrades to the
//!   fixed-offset table and records why in the returned [`CdrLocation`].
//! - [`fixed_offset::FixedOffsetLocator`] uses approximate IMGT offsets, clamped to the
//!   scaffold length.
//!
//! Which one a caller gets is decided once, at construction time, by [`select_locator`].
//!
//! Whatever the strategy, the regions come back ordered CDR1 < CDR2 < CDR3, disjoint, and
//! inside `[0, len]`.

pub mod fixed_offset;
pub mod numbering_based;

use crate::core::models::cdr::CdrRegions;
use crate::core::models::modality::Modality;
use fixed_offset::FixedOffsetLocator;
use numbering_based::{AntibodyNumberer, NumberingBasedLocator};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum NumberingScheme {
    #[default]
    Imgt,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Unsupported numbering scheme '{0}'. Only 'imgt' is available")]
pub struct ParseNumberingSchemeError(pub String);

impl FromStr for NumberingScheme {
    type Err = ParseNumberingSchemeError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "imgt" => Ok(NumberingScheme::Imgt),
            _ => Err(ParseNumberingSchemeError(s.to_string())),
        }
    }
}

impl fmt::Display for NumberingScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumberingScheme::Imgt => f.write_str("imgt"),
        }
    }
}

/// Which strategy actually produced a set of regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LocatorStrategy {
    Numbering,
    FixedOffset,
}

impl fmt::Display for LocatorStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocatorStrategy::Numbering => f.write_str("numbering"),
            LocatorStrategy::FixedOffset => f.write_str("fixed-offset"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CdrLocation {
    pub regions: CdrRegions,
    pub strategy: LocatorStrategy,
    /// Set when a numbering-based locator had to fall back to fixed offsets.
    pub fallback_reason: Option<String>,
}

impl CdrLocation {
    pub fn used_fallback(&self) -> bool {
        self.fallback_reason.is_some()
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CdrError {
    #[error("CDR identification is only supported for the nanobody modality, got '{0}'")]
    UnsupportedModality(Modality),
}

/// The CDR-location capability.
pub trait CdrLocator: Send + Sync {
    /// Locates CDR1-3 in `sequence`.
    ///
    /// # Errors
    ///
    /// Implementations that degrade gracefully never fail; the error type exists for
    /// locators that cannot.
    fn locate(&self, sequence: &str, scheme: NumberingScheme) -> Result<CdrLocation, CdrError>;

    fn strategy(&self) -> LocatorStrategy;
}

/// Picks the locator once: numbering-based when a numbering collaborator is available,
/// fixed offsets otherwise.
pub fn select_locator(numberer: Option<Box<dyn AntibodyNumberer>>) -> Box<dyn CdrLocator> {
    match numberer {
        Some(numberer) => {
            debug!("Antibody numbering collaborator available; using numbering-based CDR locator.");
            Box::new(NumberingBasedLocator::new(numberer))
        }
        None => {
            debug!("No antibody numbering collaborator; using fixed-offset CDR locator.");
            Box::new(FixedOffsetLocator::new())
        }
    }
}

/// Locates the CDRs of a nanobody scaffold, rejecting modalities without CDRs.
pub fn identify_nanobody_cdrs(
    locator: &dyn CdrLocator,
    modality: Modality,
    sequence: &str,
) -> Result<CdrLocation, CdrError> {
    if !modality.has_cdrs() {
        return Err(CdrError::UnsupportedModality(modality));
    }
    locator.locate(sequence, NumberingScheme::Imgt)
}
