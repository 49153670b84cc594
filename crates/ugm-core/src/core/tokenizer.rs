//! Tokenizer seam and a residue-level reference tokenizer.
//!
//! The engine only needs to turn text into token ids and back, and to know which ids are
//! the separator, the mask, and special tokens in general. [`ResidueTokenizer`] follows the
//! ESM convention: one token per residue, a `<cls>` token in front and an `<eos>` token at
//! the end, and `<eos>` doubling as the target/mutable separator.

use crate::core::models::sequence::TokenId;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenizerError {
    #[error("Unknown residue '{residue}' at character {position}")]
    UnknownResidue { residue: char, position: usize },

    #[error("Unknown or unterminated special token starting at character {position}: '{literal}'")]
    UnknownSpecialToken { literal: String, position: usize },
}

pub trait Tokenizer {
    fn encode(&self, text: &str) -> Result<Vec<TokenId>, TokenizerError>;

    fn decode(&self, tokens: &[TokenId], skip_special: bool) -> String;

    /// Token placed between the target and the mutable segment.
    fn separator_token(&self) -> TokenId;

    /// Text form of the separator, as it must appear in the untokenized input.
    fn separator_literal(&self) -> &str;

    fn mask_token(&self) -> TokenId;

    fn is_special(&self, token: TokenId) -> bool;
}

const CLS: TokenId = 0;
const PAD: TokenId = 1;
const EOS: TokenId = 2;
const UNK: TokenId = 3;
const FIRST_RESIDUE: TokenId = 4;

const SPECIAL_LITERALS: [(&str, TokenId); 4] =
    [("<cls>", CLS), ("<pad>", PAD), ("<eos>", EOS), ("<unk>", UNK)];

/// Residue alphabet in ESM-2 vocabulary order.
pub const RESIDUE_ALPHABET: &str = "LAGVSERTIDPKQNFYMHWCXBUZO";

const MASK: TokenId = FIRST_RESIDUE + RESIDUE_ALPHABET.len() as TokenId;

#[derive(Debug, Clone, Copy, Default)]
pub struct ResidueTokenizer;

impl ResidueTokenizer {
    pub fn new() -> Self {
        Self
    }

    pub fn residue_token(&self, residue: char) -> Option<TokenId> {
        RESIDUE_ALPHABET
            .find(residue)
            .map(|idx| FIRST_RESIDUE + idx as TokenId)
    }

    pub fn token_residue(&self, token: TokenId) -> Option<char> {
        token
            .checked_sub(FIRST_RESIDUE)
            .and_then(|idx| RESIDUE_ALPHABET.as_bytes().get(idx as usize))
            .map(|&b| b as char)
    }

    pub fn vocab_size(&self) -> usize {
        MASK as usize + 1
    }

    fn literal(&self, token: TokenId) -> String {
        if token == MASK {
            return "<mask>".to_string();
        }
        if let Some((literal, _)) = SPECIAL_LITERALS.iter().find(|(_, id)| *id == token) {
            return literal.to_string();
        }
        self.token_residue(token)
            .map(String::from)
            .unwrap_or_else(|| "<unk>".to_string())
    }
}

impl Tokenizer for ResidueTokenizer {
    fn encode(&self, text: &str) -> Result<Vec<TokenId>, TokenizerError> {
        let mut tokens = Vec::with_capacity(text.len() + 2);
        tokens.push(CLS);

        let mut rest = text.char_indices().peekable();
        while let Some((position, c)) = rest.next() {
            if c == '<' {
                let tail = &text[position..];
                let literal = tail
                    .find('>')
                    .map(|end| &tail[..=end])
                    .unwrap_or(tail);
                let token = match literal {
                    "<mask>" => Some(MASK),
                    _ => SPECIAL_LITERALS
                        .iter()
                        .find(|(lit, _)| *lit == literal)
                        .map(|(_, id)| *id),
                }
                .ok_or_else(|| TokenizerError::UnknownSpecialToken {
                    literal: literal.to_string(),
                    position,
                })?;
                tokens.push(token);
                while rest.next_if(|(p, _)| *p < position + literal.len()).is_some() {}
                continue;
            }
            let token = self
                .residue_token(c)
                .ok_or(TokenizerError::UnknownResidue {
                    residue: c,
                    position,
                })?;
            tokens.push(token);
        }

        tokens.push(EOS);
        Ok(tokens)
    }

    fn decode(&self, tokens: &[TokenId], skip_special: bool) -> String {
        tokens
            .iter()
            .filter(|&&t| !(skip_special && self.is_special(t)))
            .map(|&t| self.literal(t))
            .collect()
    }

    fn separator_token(&self) -> TokenId {
        EOS
    }

    fn separator_literal(&self) -> &str {
        "<eos>"
    }

    fn mask_token(&self) -> TokenId {
        MASK
    }

    fn is_special(&self, token: TokenId) -> bool {
        token < FIRST_RESIDUE || token >= MASK
    }
}
