use super::{Selection, SelectionRequest, SelectionStrategy};
use crate::engine::config::SelectionConfig;
use crate::engine::error::EngineError;
use crate::engine::uncertainty::UncertaintyVector;

/// Resamples exactly the residue indices the caller listed.
pub struct ExplicitResidueStrategy;

impl SelectionStrategy for ExplicitResidueStrategy {
    fn name(&self) -> &'static str {
        "residues"
    }

    fn is_configured(&self, config: &SelectionConfig) -> bool {
        config.residues.is_some()
    }

    fn validate(&self, request: &SelectionRequest) -> Result<(), EngineError> {
        let residues = request.config.residues.as_deref().unwrap_or_default();
        request.residues_to_tokens(residues).map(|_| ())
    }

    fn select(
        &self,
        request: &SelectionRequest,
        _uncertainty: &UncertaintyVector,
    ) -> Result<Selection, EngineError> {
        let residues = request.config.residues.as_deref().unwrap_or_default();
        Ok(Selection {
            positions: request.residues_to_tokens(residues)?,
            strategy: self.name(),
            cdr_location: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::modality::Modality;
    use crate::engine::config::ConfigError;

    fn request<'a>(config: &'a SelectionConfig, sequence: &'a str) -> SelectionRequest<'a> {
        SelectionRequest {
            modality: Modality::Custom,
            config,
            mutable_sequence: sequence,
            mutable_start: 4,
            mutable_token_len: sequence.len(),
        }
    }

    #[test]
    fn listed_residues_are_selected_sorted_and_unique() {
        let config = SelectionConfig {
            residues: Some(vec![6, 0, 4, 2, 4]),
            ..SelectionConfig::default()
        };
        let req = request(&config, "HELVELLA");
        let selection = ExplicitResidueStrategy
            .select(&req, &UncertaintyVector::from(vec![0.0; 8]))
            .unwrap();

        assert_eq!(selection.positions.as_slice(), &[4, 6, 8, 10]);
        assert_eq!(selection.positions.relative_to(4), vec![0, 2, 4, 6]);
        assert!(selection.cdr_location.is_none());
    }

    #[test]
    fn empty_list_selects_nothing() {
        let config = SelectionConfig {
            residues: Some(Vec::new()),
            ..SelectionConfig::default()
        };
        let req = request(&config, "HELVELLA");
        assert!(ExplicitResidueStrategy.is_configured(&config));
        let selection = ExplicitResidueStrategy
            .select(&req, &UncertaintyVector::from(vec![0.0; 8]))
            .unwrap();
        assert!(selection.positions.is_empty());
    }

    #[test]
    fn out_of_range_residue_fails_validation() {
        let config = SelectionConfig {
            residues: Some(vec![1, 12]),
            ..SelectionConfig::default()
        };
        let req = request(&config, "HELVELLA");
        assert_eq!(
            ExplicitResidueStrategy.validate(&req),
            Err(EngineError::Config(ConfigError::ResidueOutOfRange {
                index: 12,
                len: 8
            }))
        );
    }
}
