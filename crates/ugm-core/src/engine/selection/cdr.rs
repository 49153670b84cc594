use super::{Selection, SelectionRequest, SelectionStrategy};
use crate::core::numbering::{CdrLocator, identify_nanobody_cdrs};
use crate::engine::config::{ConfigError, SelectionConfig};
use crate::engine::error::EngineError;
use crate::engine::uncertainty::UncertaintyVector;
use tracing::info;

/// Resamples every residue of the requested CDR loops.
pub struct CdrRegionStrategy<'a> {
    locator: &'a dyn CdrLocator,
}

impl<'a> CdrRegionStrategy<'a> {
    pub fn new(locator: &'a dyn CdrLocator) -> Self {
        Self { locator }
    }
}

impl SelectionStrategy for CdrRegionStrategy<'_> {
    fn name(&self) -> &'static str {
        "cdr"
    }

    fn is_configured(&self, config: &SelectionConfig) -> bool {
        config.cdr_regions.is_some()
    }

    fn validate(&self, request: &SelectionRequest) -> Result<(), EngineError> {
        match &request.config.cdr_regions {
            Some(names) if !names.is_empty() => {}
            _ => return Err(ConfigError::MissingCdrConfiguration.into()),
        }
        if !request.modality.has_cdrs() {
            return Err(ConfigError::InvalidModalityForCdr(request.modality).into());
        }
        request.residues_to_tokens(&[]).map(|_| ())
    }

    fn select(
        &self,
        request: &SelectionRequest,
        _uncertainty: &UncertaintyVector,
    ) -> Result<Selection, EngineError> {
        self.validate(request)?;
        let names = request.config.cdr_regions.as_deref().unwrap_or_default();

        let location =
            identify_nanobody_cdrs(self.locator, request.modality, request.mutable_sequence)?;
        let residues = location.regions.residues_for(names);
        info!(
            regions = ?names,
            strategy = %location.strategy,
            fallback = location.used_fallback(),
            residues = residues.len(),
            "Selecting CDR residues."
        );

        Ok(Selection {
            positions: request.residues_to_tokens(&residues)?,
            strategy: self.name(),
            cdr_location: Some(location),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::cdr::CdrName;
    use crate::core::models::modality::Modality;
    use crate::core::numbering::LocatorStrategy;
    use crate::core::numbering::NumberingScheme;
    use crate::core::numbering::fixed_offset::FixedOffsetLocator;
    use crate::core::numbering::numbering_based::{
        AntibodyNumberer, CdrSequences, NumberingBasedLocator, NumberingError,
    };
    use crate::core::scaffold::templates::default_template;

    fn config(names: Vec<CdrName>) -> SelectionConfig {
        SelectionConfig {
            cdr_regions: Some(names),
            ..SelectionConfig::default()
        }
    }

    fn request<'a>(
        config: &'a SelectionConfig,
        modality: Modality,
        sequence: &'a str,
    ) -> SelectionRequest<'a> {
        SelectionRequest {
            modality,
            config,
            mutable_sequence: sequence,
            mutable_start: 10,
            mutable_token_len: sequence.len(),
        }
    }

    #[test]
    fn fixed_offset_cdr1_covers_imgt_positions() {
        let scaffold = default_template(Modality::Nanobody).unwrap();
        let config = config(vec![CdrName::Cdr1]);
        let req = request(&config, Modality::Nanobody, scaffold);
        let uncertainty = UncertaintyVector::from(vec![0.0; scaffold.len()]);
        let locator = FixedOffsetLocator::new();

        let selection = CdrRegionStrategy::new(&locator)
            .select(&req, &uncertainty)
            .unwrap();

        assert_eq!(selection.positions.relative_to(10), (26..35).collect::<Vec<_>>());
        let location = selection.cdr_location.unwrap();
        assert_eq!(location.strategy, LocatorStrategy::FixedOffset);
        assert_eq!(location.regions.cdr1.sequence, "ERTFSTYAM");
    }

    #[test]
    fn several_regions_are_unioned() {
        let scaffold = default_template(Modality::Nanobody).unwrap();
        let config = config(vec![CdrName::Cdr3, CdrName::Cdr1]);
        let req = request(&config, Modality::Nanobody, scaffold);
        let uncertainty = UncertaintyVector::from(vec![0.0; scaffold.len()]);
        let locator = FixedOffsetLocator::new();

        let selection = CdrRegionStrategy::new(&locator)
            .select(&req, &uncertainty)
            .unwrap();
        let expected: Vec<usize> = (26..35).chain(94..102).collect();
        assert_eq!(selection.positions.relative_to(10), expected);
    }

    struct Numbered;

    impl AntibodyNumberer for Numbered {
        fn number(
            &self,
            _sequence: &str,
            _scheme: NumberingScheme,
        ) -> Result<CdrSequences, NumberingError> {
            Ok(CdrSequences {
                cdr1: "GFTF".into(),
                cdr2: "ISGS".into(),
                cdr3: "ARDY".into(),
            })
        }
    }

    #[test]
    fn numbering_locator_drives_selection_when_available() {
        let scaffold = "QVQGFTFSWISGSKKARDYWGQ";
        let config = config(vec![CdrName::Cdr3]);
        let req = request(&config, Modality::Nanobody, scaffold);
        let uncertainty = UncertaintyVector::from(vec![0.0; scaffold.len()]);
        let locator = NumberingBasedLocator::new(Box::new(Numbered));

        let selection = CdrRegionStrategy::new(&locator)
            .select(&req, &uncertainty)
            .unwrap();
        assert_eq!(selection.positions.relative_to(10), vec![15, 16, 17, 18]);
        assert!(!selection.cdr_location.unwrap().used_fallback());
    }

    #[test]
    fn non_nanobody_modality_is_rejected() {
        let config = config(vec![CdrName::Cdr1]);
        let req = request(&config, Modality::Custom, "HELVELLA");
        let locator = FixedOffsetLocator::new();
        assert_eq!(
            CdrRegionStrategy::new(&locator).validate(&req),
            Err(EngineError::Config(ConfigError::InvalidModalityForCdr(
                Modality::Custom
            )))
        );
    }

    #[test]
    fn empty_region_list_is_rejected() {
        let config = config(Vec::new());
        let req = request(&config, Modality::Nanobody, "HELVELLA");
        let locator = FixedOffsetLocator::new();
        let strategy = CdrRegionStrategy::new(&locator);
        assert!(strategy.is_configured(&config));
        assert_eq!(
            strategy.validate(&req),
            Err(EngineError::Config(ConfigError::MissingCdrConfiguration))
        );
    }
}
