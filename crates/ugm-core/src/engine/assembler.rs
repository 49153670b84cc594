use super::config::ConfigError;
use super::error::EngineError;
use crate::core::models::sequence::{CombinedSequence, TokenId};
use crate::core::tokenizer::Tokenizer;
use tracing::{debug, instrument};

/// Joins a target and a mutable segment into one tokenized sequence and finds where the
/// mutable segment lives inside it.
pub struct SequenceAssembler<'a> {
    tokenizer: &'a dyn Tokenizer,
}

impl<'a> SequenceAssembler<'a> {
    pub fn new(tokenizer: &'a dyn Tokenizer) -> Self {
        Self { tokenizer }
    }

    /// Builds `target + separator + mutable` and tokenizes it.
    ///
    /// The mutable segment starts at the first token after the first separator token and
    /// ends at the first special token after that (usually the end-of-sequence marker the
    /// tokenizer appends), or at the end of the stream.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::EmbeddedSeparator`] if either input already contains the separator
    ///   literal.
    /// - [`ConfigError::EmbeddedSpecialToken`] if either input encodes to a special token
    ///   beyond the tokenizer's own framing. Such a token would cut the mutable segment
    ///   short or end up in the target.
    /// - [`EngineError::Tokenizer`] if the text cannot be tokenized.
    /// - [`EngineError::BoundaryNotFound`] if the separator token does not survive
    ///   tokenization.
    #[instrument(level = "debug", skip_all, fields(target_len = target.len(), mutable_len = mutable.len()))]
    pub fn assemble(&self, target: &str, mutable: &str) -> Result<CombinedSequence, EngineError> {
        let separator = self.tokenizer.separator_literal();
        if target.contains(separator) {
            return Err(ConfigError::EmbeddedSeparator("target").into());
        }
        if mutable.contains(separator) {
            return Err(ConfigError::EmbeddedSeparator("mutable").into());
        }
        let framing = self.special_count(&self.tokenizer.encode("")?);
        if self.special_count(&self.tokenizer.encode(target)?) > framing {
            return Err(ConfigError::EmbeddedSpecialToken("target").into());
        }
        if self.special_count(&self.tokenizer.encode(mutable)?) > framing {
            return Err(ConfigError::EmbeddedSpecialToken("mutable").into());
        }

        let text = format!("{}{}{}", target, separator, mutable);
        let tokens = self.tokenizer.encode(&text)?;

        let separator_token = self.tokenizer.separator_token();
        let boundary = tokens
            .iter()
            .position(|&t| t == separator_token)
            .ok_or_else(|| EngineError::BoundaryNotFound {
                separator: separator.to_string(),
            })?;

        let mutable_start = boundary + 1;
        let mutable_end = tokens[mutable_start..]
            .iter()
            .position(|&t| self.tokenizer.is_special(t))
            .map_or(tokens.len(), |offset| mutable_start + offset);

        debug!(
            tokens = tokens.len(),
            mutable_start, mutable_end, "Assembled combined sequence."
        );
        Ok(CombinedSequence::new(text, tokens, mutable_start, mutable_end))
    }

    /// Special tokens in an encoded stream, framing included.
    fn special_count(&self, tokens: &[TokenId]) -> usize {
        tokens.iter().filter(|&&t| self.tokenizer.is_special(t)).count()
    }
}
