use super::{PositionSet, Selection, SelectionRequest, SelectionStrategy};
use crate::engine::config::{MaskStrategy, SelectionConfig};
use crate::engine::error::EngineError;
use crate::engine::uncertainty::UncertaintyVector;
use tracing::debug;

/// Absorbs float noise such as `0.3 * 10 = 3.0000000000000004` before rounding up.
const RATIO_EPSILON: f64 = 1e-9;

/// Number of positions top-k masking takes out of `count`.
///
/// `ceil(ratio * count)`, at least one when `ratio > 0` and there is anything to take,
/// never more than `count`.
pub fn top_k_count(count: usize, ratio: f64) -> usize {
    if count == 0 || ratio.is_nan() || ratio <= 0.0 {
        return 0;
    }
    let k = (ratio * count as f64 - RATIO_EPSILON).ceil().max(1.0) as usize;
    k.min(count)
}

/// Relative indices of the `top_k_count` most uncertain positions, ascending.
///
/// Ties are broken by the lower index.
pub fn top_k_positions(uncertainty: &UncertaintyVector, ratio: f64) -> Vec<usize> {
    let k = top_k_count(uncertainty.len(), ratio);
    let mut ranked: Vec<(usize, f64)> = uncertainty.iter().enumerate().collect();
    ranked.sort_by(|(ia, a), (ib, b)| b.total_cmp(a).then(ia.cmp(ib)));

    let mut chosen: Vec<usize> = ranked.into_iter().take(k).map(|(i, _)| i).collect();
    chosen.sort_unstable();
    chosen
}

/// Relative indices whose uncertainty is strictly above `threshold`.
pub fn threshold_positions(uncertainty: &UncertaintyVector, threshold: f64) -> Vec<usize> {
    uncertainty
        .iter()
        .enumerate()
        .filter(|&(_, u)| u > threshold)
        .map(|(i, _)| i)
        .collect()
}

/// Masks the positions the model is least sure about.
pub struct UncertaintyStrategy;

impl SelectionStrategy for UncertaintyStrategy {
    fn name(&self) -> &'static str {
        "uncertainty"
    }

    fn is_configured(&self, _config: &SelectionConfig) -> bool {
        true
    }

    fn validate(&self, request: &SelectionRequest) -> Result<(), EngineError> {
        match request.config.mask_strategy {
            MaskStrategy::Entropy => Err(EngineError::UnsupportedStrategy(
                MaskStrategy::Entropy.as_str(),
            )),
            MaskStrategy::TopK | MaskStrategy::Threshold => Ok(()),
        }
    }

    fn select(
        &self,
        request: &SelectionRequest,
        uncertainty: &UncertaintyVector,
    ) -> Result<Selection, EngineError> {
        let config = request.config;
        let relative = match config.mask_strategy {
            MaskStrategy::TopK => top_k_positions(uncertainty, config.mask_ratio),
            MaskStrategy::Threshold => {
                threshold_positions(uncertainty, config.uncertainty_threshold)
            }
            MaskStrategy::Entropy => {
                return Err(EngineError::UnsupportedStrategy(
                    MaskStrategy::Entropy.as_str(),
                ));
            }
        };
        debug!(
            mask_strategy = %config.mask_strategy,
            selected = relative.len(),
            of = uncertainty.len(),
            "Uncertainty-guided selection."
        );

        Ok(Selection {
            positions: PositionSet::from_indices(
                relative.into_iter().map(|i| request.mutable_start + i),
            ),
            strategy: self.name(),
            cdr_location: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::modality::Modality;

    fn request(config: &SelectionConfig, len: usize) -> SelectionRequest<'_> {
        SelectionRequest {
            modality: Modality::Custom,
            config,
            mutable_sequence: "",
            mutable_start: 3,
            mutable_token_len: len,
        }
    }

    #[test]
    fn top_k_count_rounds_up_with_a_floor_of_one() {
        assert_eq!(top_k_count(8, 0.25), 2);
        assert_eq!(top_k_count(10, 0.3), 3);
        assert_eq!(top_k_count(10, 0.25), 3);
        assert_eq!(top_k_count(3, 0.01), 1);
        assert_eq!(top_k_count(5, 1.0), 5);
        assert_eq!(top_k_count(5, 0.0), 0);
        assert_eq!(top_k_count(0, 0.5), 0);
    }

    #[test]
    fn top_k_takes_the_most_uncertain_positions() {
        let u = UncertaintyVector::from(vec![0.1, 0.8, 0.2, 0.3, 0.9, 0.05, 0.4, 0.2]);
        assert_eq!(top_k_positions(&u, 0.25), vec![1, 4]);
    }

    #[test]
    fn top_k_breaks_ties_by_lowest_index() {
        let u = UncertaintyVector::from(vec![0.5, 0.7, 0.7, 0.7, 0.1]);
        assert_eq!(top_k_positions(&u, 0.4), vec![1, 2]);
    }

    #[test]
    fn threshold_is_strict_and_may_select_nothing() {
        let u = UncertaintyVector::from(vec![0.5, 0.51, 0.2, 0.99]);
        assert_eq!(threshold_positions(&u, 0.5), vec![1, 3]);
        assert!(threshold_positions(&u, 0.99).is_empty());
    }

    #[test]
    fn selection_is_offset_by_the_mutable_start() {
        let config = SelectionConfig {
            mask_strategy: MaskStrategy::Threshold,
            uncertainty_threshold: 0.6,
            ..SelectionConfig::default()
        };
        let u = UncertaintyVector::from(vec![0.9, 0.1, 0.7]);
        let selection = UncertaintyStrategy.select(&request(&config, 3), &u).unwrap();
        assert_eq!(selection.positions.as_slice(), &[3, 5]);
        assert!(selection.positions.iter().all(|p| p >= 3));
    }

    #[test]
    fn entropy_is_reported_as_unsupported() {
        let config = SelectionConfig {
            mask_strategy: MaskStrategy::Entropy,
            ..SelectionConfig::default()
        };
        let req = request(&config, 2);
        assert_eq!(
            UncertaintyStrategy.validate(&req),
            Err(EngineError::UnsupportedStrategy("entropy"))
        );
        assert_eq!(
            UncertaintyStrategy.select(&req, &UncertaintyVector::from(vec![0.4, 0.6])),
            Err(EngineError::UnsupportedStrategy("entropy"))
        );
    }
}
