use crate::core::model::{ModelError, Sampler, Scorer};
use crate::core::models::modality::Modality;
use crate::core::numbering::{CdrLocation, CdrLocator};
use crate::core::scaffold::registry::ScaffoldRegistry;
use crate::core::tokenizer::Tokenizer;
use crate::engine::assembler::SequenceAssembler;
use crate::engine::config::{ConfigError, MutationConfig};
use crate::engine::error::EngineError;
use crate::engine::masking::mask_positions;
use crate::engine::progress::{Phase, ProgressReporter};
use crate::engine::sampler::MutationSampler;
use crate::engine::selection::{PositionSelector, PositionSet, SelectionRequest};
use crate::engine::uncertainty::UncertaintyVector;
use serde::Serialize;
use tracing::{debug, info, instrument};

/// The collaborators a request runs against.
#[derive(Clone, Copy)]
pub struct MutationContext<'a> {
    pub tokenizer: &'a dyn Tokenizer,
    pub registry: &'a ScaffoldRegistry,
    pub locator: &'a dyn CdrLocator,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MutationResult {
    pub modality: Modality,
    /// The resolved mutable sequence (explicit input or template).
    pub mutable_sequence: String,
    /// `target + separator + mutable`, untokenized.
    pub combined_sequence: String,
    /// Token index of the first mutable token.
    pub mutable_start_index: usize,
    /// One value per mutable token.
    pub uncertainty: UncertaintyVector,
    pub selection_strategy: &'static str,
    /// Absolute token indices that were resampled.
    pub selected_positions: PositionSet,
    pub cdr_location: Option<CdrLocation>,
    pub masked_sequence: String,
    pub generated_sequences: Vec<String>,
}

impl MutationResult {
    /// Selected positions as residue indices of the mutable sequence.
    pub fn selected_residues(&self) -> Vec<usize> {
        self.selected_positions.relative_to(self.mutable_start_index)
    }
}

#[instrument(skip_all, name = "mutation_workflow", fields(modality = %config.modality))]
pub fn run<M: Scorer + Sampler>(
    config: &MutationConfig,
    context: &MutationContext,
    model: &mut M,
    reporter: &ProgressReporter,
) -> Result<MutationResult, EngineError> {
    info!("Starting mutation workflow.");

    // === Phase 1: resolve the scaffold and check everything the model is not needed for ===
    let (mutable_sequence, combined) =
        reporter.phase(Phase::ResolvingScaffold, || -> Result<_, EngineError> {
        if config.num_outputs == 0 {
            return Err(EngineError::InvalidOutputCount(config.num_outputs));
        }
        let mutable = context
            .registry
            .resolve(&config.source)
            .map_err(ConfigError::from)?;
        config.validate_against(mutable.chars().count())?;
        let combined =
            SequenceAssembler::new(context.tokenizer).assemble(&config.target, &mutable)?;
        Ok((mutable, combined))
    })?;

    let selector = PositionSelector::new(context.locator);
    let request = SelectionRequest {
        modality: config.modality,
        config: &config.selection,
        mutable_sequence: &mutable_sequence,
        mutable_start: combined.mutable_start_index(),
        mutable_token_len: combined.mutable_len(),
    };
    let strategy = selector.validate(&request)?;
    info!(
        strategy,
        mutable_start = combined.mutable_start_index(),
        mutable_len = combined.mutable_len(),
        "Scaffold resolved."
    );

    // === Phase 2: score the combined sequence ===
    let uncertainty = reporter.phase(Phase::Scoring, || -> Result<_, EngineError> {
        let scores = model.score(combined.tokens())?;
        if scores.len() != combined.len() {
            return Err(ModelError::ScoreLengthMismatch {
                expected: combined.len(),
                actual: scores.len(),
            }
            .into());
        }
        let uncertainty = UncertaintyVector::from_probabilities(&scores[combined.mutable_range()]);
        debug!(mean = ?uncertainty.mean(), "Uncertainty computed.");
        Ok(uncertainty)
    })?;

    // === Phase 3: choose the positions to resample ===
    let selection = reporter.phase(Phase::SelectingPositions, || {
        selector.select(&request, &uncertainty)
    })?;

    // === Phase 4: mask and sample ===
    let (masked, generated_sequences) =
        reporter.phase(Phase::Sampling, || -> Result<_, EngineError> {
        let masked = mask_positions(context.tokenizer, &combined, &selection.positions)?;
        let outputs = MutationSampler::new(context.tokenizer).sample(
            &mut *model,
            &combined,
            &masked,
            &selection.positions,
            config.num_outputs,
            reporter,
        )?;
        Ok((masked, outputs))
    })?;

    info!(
        selected = selection.positions.len(),
        generated = generated_sequences.len(),
        "Mutation workflow finished."
    );

    Ok(MutationResult {
        modality: config.modality,
        combined_sequence: combined.text().to_string(),
        mutable_start_index: combined.mutable_start_index(),
        mutable_sequence,
        uncertainty,
        selection_strategy: selection.strategy,
        selected_positions: selection.positions,
        cdr_location: selection.cdr_location,
        masked_sequence: masked.text().to_string(),
        generated_sequences,
    })
}
