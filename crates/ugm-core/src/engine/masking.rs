use super::error::EngineError;
use super::selection::PositionSet;
use crate::core::models::sequence::{CombinedSequence, TokenId};
use crate::core::tokenizer::Tokenizer;
use tracing::trace;

/// The combined sequence with the selected positions replaced by the mask token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskedSequence {
    tokens: Vec<TokenId>,
    text: String,
}

impl MaskedSequence {
    pub fn tokens(&self) -> &[TokenId] {
        &self.tokens
    }

    /// Decoded form, special tokens included.
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Replaces the selected positions of `combined` with the tokenizer's mask token.
///
/// Pure: `combined` is left untouched. An empty `positions` yields an unmasked copy.
///
/// # Errors
///
/// Returns [`EngineError::Internal`] if a position lies outside the mutable segment.
pub fn mask_positions(
    tokenizer: &dyn Tokenizer,
    combined: &CombinedSequence,
    positions: &PositionSet,
) -> Result<MaskedSequence, EngineError> {
    if let Some(stray) = positions.iter().find(|&p| !combined.is_mutable_position(p)) {
        return Err(EngineError::Internal(format!(
            "refusing to mask token {} outside the mutable segment {:?}",
            stray,
            combined.mutable_range()
        )));
    }

    let mask = tokenizer.mask_token();
    let mut tokens = combined.tokens().to_vec();
    for position in positions.iter() {
        tokens[position] = mask;
    }
    let text = tokenizer.decode(&tokens, false);
    trace!(masked = positions.len(), %text, "Masked sequence built.");

    Ok(MaskedSequence { tokens, text })
}
