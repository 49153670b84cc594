use super::fixed_offset::FixedOffsetLocator;
use super::{CdrError, CdrLocation, CdrLocator, LocatorStrategy, NumberingScheme};
use crate::core::models::cdr::{CdrName, CdrRegion, CdrRegions};
use thiserror::Error;
use tracing::{debug, instrument, warn};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NumberingError {
    #[error("Numbering collaborator unavailable: {0}")]
    Unavailable(String),

    #[error("Numbering failed: {0}")]
    Failed(String),

    #[error("{name} was reported empty")]
    EmptyRegion { name: CdrName },

    #[error("{name} '{region}' not found verbatim in the scaffold")]
    RegionNotFound { name: CdrName, region: String },
}

/// CDR substrings as reported by a numbering tool.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CdrSequences {
    pub cdr1: String,
    pub cdr2: String,
    pub cdr3: String,
}

/// External antibody-numbering capability (e.g. an IMGT numbering tool).
pub trait AntibodyNumberer: Send + Sync {
    fn number(&self, sequence: &str, scheme: NumberingScheme)
    -> Result<CdrSequences, NumberingError>;
}

pub struct NumberingBasedLocator {
    numberer: Box<dyn AntibodyNumberer>,
    fallback: FixedOffsetLocator,
}

impl NumberingBasedLocator {
    pub fn new(numberer: Box<dyn AntibodyNumberer>) -> Self {
        Self {
            numberer,
            fallback: FixedOffsetLocator::new(),
        }
    }

    fn locate_verbatim(
        &self,
        sequence: &str,
        scheme: NumberingScheme,
    ) -> Result<CdrRegions, NumberingError> {
        let reported = self.numberer.number(sequence, scheme)?;

        let mut cursor = 0;
        let mut find = |name: CdrName, region: &str| -> Result<CdrRegion, NumberingError> {
            if region.is_empty() {
                return Err(NumberingError::EmptyRegion { name });
            }
            let start = sequence
                .get(cursor..)
                .and_then(|rest| rest.find(region))
                .map(|offset| cursor + offset)
                .ok_or_else(|| NumberingError::RegionNotFound {
                    name,
                    region: region.to_string(),
                })?;
            let end = start + region.len();
            cursor = end;
            Ok(CdrRegion::from_bounds(name, start, end, sequence))
        };

        Ok(CdrRegions {
            cdr1: find(CdrName::Cdr1, &reported.cdr1)?,
            cdr2: find(CdrName::Cdr2, &reported.cdr2)?,
            cdr3: find(CdrName::Cdr3, &reported.cdr3)?,
        })
    }
}

impl CdrLocator for NumberingBasedLocator {
    #[instrument(level = "debug", skip_all, fields(len = sequence.len(), %scheme))]
    fn locate(&self, sequence: &str, scheme: NumberingScheme) -> Result<CdrLocation, CdrError> {
        match self.locate_verbatim(sequence, scheme) {
            Ok(regions) => {
                debug!(
                    cdr1 = %regions.cdr1.sequence,
                    cdr2 = %regions.cdr2.sequence,
                    cdr3 = %regions.cdr3.sequence,
                    "CDRs located by numbering."
                );
                Ok(CdrLocation {
                    regions,
                    strategy: LocatorStrategy::Numbering,
                    fallback_reason: None,
                })
            }
            Err(e) => {
                warn!(
                    "Numbering-based CDR identification failed ({}). Falling back to fixed IMGT offsets.",
                    e
                );
                Ok(CdrLocation {
                    regions: self.fallback.regions(sequence),
                    strategy: LocatorStrategy::FixedOffset,
                    fallback_reason: Some(e.to_string()),
                })
            }
        }
    }

    fn strategy(&self) -> LocatorStrategy {
        LocatorStrategy::Numbering
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Scripted(Result<CdrSequences, NumberingError>);

    impl AntibodyNumberer for Scripted {
        fn number(
            &self,
            _sequence: &str,
            _scheme: NumberingScheme,
        ) -> Result<CdrSequences, NumberingError> {
            self.0.clone()
        }
    }

    fn cdrs(cdr1: &str, cdr2: &str, cdr3: &str) -> CdrSequences {
        CdrSequences {
            cdr1: cdr1.into(),
            cdr2: cdr2.into(),
            cdr3: cdr3.into(),
        }
    }

    fn locator(answer: Result<CdrSequences, NumberingError>) -> NumberingBasedLocator {
        NumberingBasedLocator::new(Box::new(Scripted(answer)))
    }

    #[test]
    fn reported_loops_are_located_with_half_open_bounds() {
        let locator = locator(Ok(cdrs("GFTF", "ISGS", "ARDY")));
        let sequence = "QVQGFTFSWISGSKKARDYWGQ";
        let location = locator.locate(sequence, NumberingScheme::Imgt).unwrap();

        assert_eq!(location.strategy, LocatorStrategy::Numbering);
        assert!(!location.used_fallback());
        assert_eq!((location.regions.cdr1.start, location.regions.cdr1.end), (3, 7));
        assert_eq!((location.regions.cdr2.start, location.regions.cdr2.end), (9, 13));
        assert_eq!((location.regions.cdr3.start, location.regions.cdr3.end), (15, 19));
        assert!(location.regions.is_well_formed(sequence.len()));
    }

    #[test]
    fn later_loops_are_searched_after_earlier_ones() {
        let locator = locator(Ok(cdrs("AA", "CC", "AA")));
        let location = locator.locate("AAGCCGAA", NumberingScheme::Imgt).unwrap();
        assert_eq!(location.regions.cdr3.start, 6);
        assert!(location.regions.is_well_formed(8));
    }

    #[test]
    fn collaborator_failure_falls_back_to_fixed_offsets() {
        let locator = locator(Err(NumberingError::Unavailable("not installed".into())));
        let sequence = "A".repeat(120);
        let location = locator.locate(&sequence, NumberingScheme::Imgt).unwrap();

        assert_eq!(location.strategy, LocatorStrategy::FixedOffset);
        assert!(location.used_fallback());
        assert!(location.fallback_reason.unwrap().contains("not installed"));
        assert_eq!((location.regions.cdr2.start, location.regions.cdr2.end), (49, 65));
    }

    #[test]
    fn unlocatable_loop_falls_back_and_clamps_to_sequence() {
        let locator = locator(Ok(cdrs("GFTF", "NOTTHERE", "ARDY")));
        let sequence = "QVQGFTFSWISGSKKARDYWGQ";
        let location = locator.locate(sequence, NumberingScheme::Imgt).unwrap();

        assert_eq!(location.strategy, LocatorStrategy::FixedOffset);
        assert!(location.fallback_reason.as_deref().unwrap().contains("CDR2"));
        assert!(location.regions.is_well_formed(sequence.len()));
        assert!(location.regions.iter().all(|r| r.end <= sequence.len()));
    }

    #[test]
    fn empty_reported_loop_falls_back() {
        let locator = locator(Ok(cdrs("GFTF", "ISGS", "")));
        let location = locator
            .locate("QVQGFTFSWISGSKKARDYWGQ", NumberingScheme::Imgt)
            .unwrap();
        assert_eq!(location.strategy, LocatorStrategy::FixedOffset);
        assert!(location.fallback_reason.unwrap().contains("CDR3"));
    }
}
