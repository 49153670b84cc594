use super::{CdrError, CdrLocation, CdrLocator, LocatorStrategy, NumberingScheme};
use crate::core::models::cdr::{CdrName, CdrRegion, CdrRegions};

/// Approximate IMGT CDR boundaries for a VHH, 0-indexed and half-open.
pub const IMGT_CDR_OFFSETS: [(CdrName, usize, usize); 3] = [
    (CdrName::Cdr1, 26, 35),
    (CdrName::Cdr2, 49, 65),
    (CdrName::Cdr3, 94, 102),
];

#[derive(Debug, Clone, Copy, Default)]
pub struct FixedOffsetLocator;

impl FixedOffsetLocator {
    pub fn new() -> Self {
        Self
    }

    /// Regions from the offset table, clamped so shorter scaffolds never go out of bounds.
    pub fn regions(&self, sequence: &str) -> CdrRegions {
        let [cdr1, cdr2, cdr3] =
            IMGT_CDR_OFFSETS.map(|(name, start, end)| CdrRegion::from_bounds(name, start, end, sequence));
        CdrRegions { cdr1, cdr2, cdr3 }
    }
}

impl CdrLocator for FixedOffsetLocator {
    fn locate(&self, sequence: &str, _scheme: NumberingScheme) -> Result<CdrLocation, CdrError> {
        Ok(CdrLocation {
            regions: self.regions(sequence),
            strategy: LocatorStrategy::FixedOffset,
            fallback_reason: None,
        })
    }

    fn strategy(&self) -> LocatorStrategy {
        LocatorStrategy::FixedOffset
    }
}
