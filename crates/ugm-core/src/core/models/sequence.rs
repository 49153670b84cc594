use std::ops::Range;

pub type TokenId = u32;

/// `target + separator + mutable`, tokenized.
///
/// `mutable_start` is the first token strictly after the separator and `mutable_end` the
/// first special token after it (or the end of the stream). Both are computed fresh for
/// every request by the assembler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombinedSequence {
    text: String,
    tokens: Vec<TokenId>,
    mutable_start: usize,
    mutable_end: usize,
}

impl CombinedSequence {
    pub(crate) fn new(
        text: String,
        tokens: Vec<TokenId>,
        mutable_start: usize,
        mutable_end: usize,
    ) -> Self {
        debug_assert!(mutable_start <= mutable_end && mutable_end <= tokens.len());
        Self {
            text,
            tokens,
            mutable_start,
            mutable_end,
        }
    }

    /// The untokenized input, separator literal included.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn tokens(&self) -> &[TokenId] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn mutable_start_index(&self) -> usize {
        self.mutable_start
    }

    pub fn mutable_range(&self) -> Range<usize> {
        self.mutable_start..self.mutable_end
    }

    pub fn mutable_tokens(&self) -> &[TokenId] {
        &self.tokens[self.mutable_range()]
    }

    pub fn mutable_len(&self) -> usize {
        self.mutable_end - self.mutable_start
    }

    pub fn is_mutable_position(&self, token_index: usize) -> bool {
        self.mutable_range().contains(&token_index)
    }
}
