//! # Position Selection
//!
//! Decides which token positions of the mutable segment get resampled.
//!
//! ## Architecture
//!
//! Each policy is a [`SelectionStrategy`]. A [`PositionSelector`] holds an ordered list of
//! them and hands a request to the first one whose configuration is present:
//!
//! 1. [`cdr::CdrRegionStrategy`] - CDR region names (nanobodies only)
//! 2. [`residues::ExplicitResidueStrategy`] - explicit residue indices
//! 3. [`uncertainty::UncertaintyStrategy`] - top-k or threshold on the uncertainty vector
//!
//! Later strategies are never consulted once an earlier one is configured, and the winner
//! is chosen from the configuration alone, so it can be validated before the model runs.
//!
//! All returned positions are absolute token indices inside the mutable segment.

pub mod cdr;
pub mod residues;
pub mod uncertainty;

use super::config::{ConfigError, SelectionConfig};
use super::error::EngineError;
use super::uncertainty::UncertaintyVector;
use crate::core::models::modality::Modality;
use crate::core::numbering::{CdrLocation, CdrLocator};
use serde::Serialize;
use std::ops::Range;
use tracing::{debug, info, instrument};

/// Sorted, duplicate-free token indices.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct PositionSet(Vec<usize>);

impl PositionSet {
    pub fn from_indices(indices: impl IntoIterator<Item = usize>) -> Self {
        let mut positions: Vec<usize> = indices.into_iter().collect();
        positions.sort_unstable();
        positions.dedup();
        Self(positions)
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, position: usize) -> bool {
        self.0.binary_search(&position).is_ok()
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter().copied()
    }

    /// Positions relative to `start`, i.e. residue indices within the mutable sequence.
    pub fn relative_to(&self, start: usize) -> Vec<usize> {
        self.0.iter().map(|&p| p.saturating_sub(start)).collect()
    }
}

/// Everything a strategy may look at, apart from the uncertainty vector.
#[derive(Debug, Clone, Copy)]
pub struct SelectionRequest<'a> {
    pub modality: Modality,
    pub config: &'a SelectionConfig,
    pub mutable_sequence: &'a str,
    pub mutable_start: usize,
    pub mutable_token_len: usize,
}

impl SelectionRequest<'_> {
    pub fn mutable_range(&self) -> Range<usize> {
        self.mutable_start..self.mutable_start + self.mutable_token_len
    }

    /// Maps residue indices of the mutable sequence onto token indices.
    ///
    /// # Errors
    ///
    /// - [`EngineError::TokenizationMismatch`] if the mutable segment is not one token per
    ///   residue, since the mapping would then be meaningless.
    /// - [`ConfigError::ResidueOutOfRange`] for an index past the end of the sequence.
    pub fn residues_to_tokens(&self, residues: &[usize]) -> Result<PositionSet, EngineError> {
        let residue_count = self.mutable_sequence.chars().count();
        if residue_count != self.mutable_token_len {
            return Err(EngineError::TokenizationMismatch {
                residues: residue_count,
                tokens: self.mutable_token_len,
            });
        }
        residues
            .iter()
            .map(|&index| {
                if index < residue_count {
                    Ok(self.mutable_start + index)
                } else {
                    Err(ConfigError::ResidueOutOfRange {
                        index,
                        len: residue_count,
                    }
                    .into())
                }
            })
            .collect::<Result<Vec<_>, EngineError>>()
            .map(PositionSet::from_indices)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Selection {
    pub positions: PositionSet,
    pub strategy: &'static str,
    /// Present when CDR regions drove the selection.
    pub cdr_location: Option<CdrLocation>,
}

pub trait SelectionStrategy {
    fn name(&self) -> &'static str;

    /// Whether this strategy's configuration is present in `config`.
    fn is_configured(&self, config: &SelectionConfig) -> bool;

    /// Checks that the strategy can run on this request, without looking at model output.
    ///
    /// # Errors
    ///
    /// Returns an [`EngineError`] of configuration kind when it cannot.
    fn validate(&self, _request: &SelectionRequest) -> Result<(), EngineError> {
        Ok(())
    }

    /// Chooses token positions for `request`.
    ///
    /// # Arguments
    ///
    /// * `request` - The configuration and the mutable segment's location.
    /// * `uncertainty` - One value per mutable token, relative to `request.mutable_start`.
    ///
    /// # Return
    ///
    /// The selected positions; may be empty.
    ///
    /// # Errors
    ///
    /// Returns an [`EngineError`] when the configuration cannot be applied.
    fn select(
        &self,
        request: &SelectionRequest,
        uncertainty: &UncertaintyVector,
    ) -> Result<Selection, EngineError>;
}

/// Ordered strategy cascade; the first configured strategy wins.
pub struct PositionSelector<'a> {
    strategies: Vec<Box<dyn SelectionStrategy + 'a>>,
}

impl<'a> PositionSelector<'a> {
    /// CDR regions, then explicit residues, then uncertainty.
    pub fn new(locator: &'a dyn CdrLocator) -> Self {
        Self::with_strategies(vec![
            Box::new(cdr::CdrRegionStrategy::new(locator)),
            Box::new(residues::ExplicitResidueStrategy),
            Box::new(uncertainty::UncertaintyStrategy),
        ])
    }

    pub fn with_strategies(strategies: Vec<Box<dyn SelectionStrategy + 'a>>) -> Self {
        Self { strategies }
    }

    /// The strategy that will handle `config`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Internal`] if no strategy is configured, which cannot happen
    /// with the standard cascade since uncertainty selection is always available.
    pub fn active(&self, config: &SelectionConfig) -> Result<&dyn SelectionStrategy, EngineError> {
        for strategy in &self.strategies {
            if strategy.is_configured(config) {
                return Ok(strategy.as_ref());
            }
        }
        Err(EngineError::Internal(
            "no selection strategy is configured".into(),
        ))
    }

    pub fn validate(&self, request: &SelectionRequest) -> Result<&'static str, EngineError> {
        let strategy = self.active(request.config)?;
        strategy.validate(request)?;
        Ok(strategy.name())
    }

    #[instrument(level = "debug", skip_all, fields(mutable_start = request.mutable_start))]
    pub fn select(
        &self,
        request: &SelectionRequest,
        uncertainty: &UncertaintyVector,
    ) -> Result<Selection, EngineError> {
        if uncertainty.len() != request.mutable_token_len {
            return Err(EngineError::Internal(format!(
                "uncertainty covers {} positions, mutable segment has {} tokens",
                uncertainty.len(),
                request.mutable_token_len
            )));
        }

        let strategy = self.active(request.config)?;
        debug!(strategy = strategy.name(), "Selecting positions.");
        strategy.validate(request)?;
        let selection = strategy.select(request, uncertainty)?;

        let range = request.mutable_range();
        if let Some(stray) = selection.positions.iter().find(|p| !range.contains(p)) {
            return Err(EngineError::Internal(format!(
                "strategy '{}' selected token {} outside the mutable segment {:?}",
                strategy.name(),
                stray,
                range
            )));
        }

        if selection.positions.is_empty() {
            info!(
                strategy = strategy.name(),
                "No positions selected; outputs will repeat the mutable sequence."
            );
        } else {
            debug!(
                count = selection.positions.len(),
                positions = ?selection.positions.as_slice(),
                "Positions selected."
            );
        }
        Ok(selection)
    }
}
