use super::error::EngineError;
use super::masking::MaskedSequence;
use super::progress::{Progress, ProgressReporter};
use super::selection::PositionSet;
use crate::core::model::{ModelError, Sampler};
use crate::core::models::sequence::{CombinedSequence, TokenId};
use crate::core::tokenizer::Tokenizer;
use tracing::{error, info, instrument};

/// Turns a masked sequence into `n` verified candidate mutable sequences.
///
/// The model only fills masks; this type enforces that it did nothing else. Every sample
/// must keep the combined length, leave every unselected token untouched, and put a real
/// residue at every selected position.
pub struct MutationSampler<'a> {
    tokenizer: &'a dyn Tokenizer,
}

impl<'a> MutationSampler<'a> {
    pub fn new(tokenizer: &'a dyn Tokenizer) -> Self {
        Self { tokenizer }
    }

    /// Samples `n` candidates and returns their mutable segments, decoded.
    ///
    /// With nothing selected the model is not called and every candidate is the original
    /// mutable sequence.
    ///
    /// # Errors
    ///
    /// - [`EngineError::InvalidOutputCount`] if `n` is zero.
    /// - [`EngineError::Model`] if the model fails or returns the wrong number of samples.
    /// - [`EngineError::ContractViolation`] if a sample breaks the fill contract.
    #[instrument(level = "debug", skip_all, fields(n = n, selected = positions.len()))]
    pub fn sample(
        &self,
        model: &mut dyn Sampler,
        combined: &CombinedSequence,
        masked: &MaskedSequence,
        positions: &PositionSet,
        n: usize,
        reporter: &ProgressReporter,
    ) -> Result<Vec<String>, EngineError> {
        if n == 0 {
            return Err(EngineError::InvalidOutputCount(n));
        }

        reporter.report(Progress::TaskStart {
            total_steps: n as u64,
        });

        let original = self.tokenizer.decode(combined.mutable_tokens(), true);
        if positions.is_empty() {
            info!("Nothing selected; skipping the model and repeating the mutable sequence.");
            let outputs = (0..n)
                .map(|_| {
                    reporter.report(Progress::TaskIncrement);
                    original.clone()
                })
                .collect();
            reporter.report(Progress::TaskFinish);
            return Ok(outputs);
        }

        let samples = model.fill(masked.tokens(), n)?;
        if samples.len() != n {
            return Err(ModelError::SampleCountMismatch {
                expected: n,
                actual: samples.len(),
            }
            .into());
        }

        let mut outputs = Vec::with_capacity(n);
        for (index, sample) in samples.iter().enumerate() {
            if let Err(e) = self.verify(index, sample, combined, positions) {
                error!("{}", e);
                return Err(e);
            }
            outputs.push(self.tokenizer.decode(&sample[combined.mutable_range()], true));
            reporter.report(Progress::TaskIncrement);
        }

        reporter.report(Progress::TaskFinish);
        Ok(outputs)
    }

    fn verify(
        &self,
        sample: usize,
        tokens: &[TokenId],
        combined: &CombinedSequence,
        positions: &PositionSet,
    ) -> Result<(), EngineError> {
        if tokens.len() != combined.len() {
            return Err(EngineError::ContractViolation {
                sample,
                position: tokens.len().min(combined.len()),
                reason: format!(
                    "length {} differs from the combined length {}",
                    tokens.len(),
                    combined.len()
                ),
            });
        }

        for (position, (&original, &filled)) in combined.tokens().iter().zip(tokens).enumerate() {
            if positions.contains(position) {
                if self.tokenizer.is_special(filled) {
                    return Err(EngineError::ContractViolation {
                        sample,
                        position,
                        reason: "selected position was left as a special token".into(),
                    });
                }
            } else if original != filled {
                let region = if combined.is_mutable_position(position) {
                    "unselected mutable"
                } else {
                    "target"
                };
                return Err(EngineError::ContractViolation {
                    sample,
                    position,
                    reason: format!("{} token changed from {} to {}", region, original, filled),
                });
            }
        }
        Ok(())
    }
}
