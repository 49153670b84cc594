use super::{ModelError, Sampler, Scorer};
use crate::core::models::sequence::TokenId;
use crate::core::tokenizer::{ResidueTokenizer, Tokenizer};
use phf::{Map, phf_map};
use rand::SeedableRng;
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use tracing::{instrument, trace};

/// UniProtKB/Swiss-Prot amino-acid composition, in percent.
static BACKGROUND_FREQUENCIES: Map<char, f64> = phf_map! {
    'A' => 8.25, 'R' => 5.53, 'N' => 4.06, 'D' => 5.45, 'C' => 1.37,
    'Q' => 3.93, 'E' => 6.75, 'G' => 7.07, 'H' => 2.27, 'I' => 5.96,
    'L' => 9.66, 'K' => 5.84, 'M' => 2.42, 'F' => 3.86, 'P' => 4.70,
    'S' => 6.56, 'T' => 5.34, 'W' => 1.08, 'Y' => 2.92, 'V' => 6.87,
};

const STANDARD_RESIDUES: [char; 20] = [
    'A', 'R', 'N', 'D', 'C', 'Q', 'E', 'G', 'H', 'I', 'L', 'K', 'M', 'F', 'P', 'S', 'T', 'W',
    'Y', 'V',
];

/// Probability given to ambiguous or non-standard residue codes.
const NON_STANDARD_PROBABILITY: f64 = 0.001;

pub fn background_frequency(residue: char) -> Option<f64> {
    BACKGROUND_FREQUENCIES.get(&residue).map(|pct| pct / 100.0)
}

/// Position-independent reference model: every residue is scored by its background
/// frequency, and masked positions are drawn from the same distribution.
#[derive(Debug, Clone)]
pub struct BackgroundModel {
    tokenizer: ResidueTokenizer,
    rng: StdRng,
}

impl BackgroundModel {
    pub fn new(tokenizer: ResidueTokenizer) -> Self {
        Self {
            tokenizer,
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_seed(tokenizer: ResidueTokenizer, seed: u64) -> Self {
        Self {
            tokenizer,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Scorer for BackgroundModel {
    fn score(&self, tokens: &[TokenId]) -> Result<Vec<f64>, ModelError> {
        Ok(tokens
            .iter()
            .map(|&token| {
                if self.tokenizer.is_special(token) {
                    return 1.0;
                }
                self.tokenizer
                    .token_residue(token)
                    .and_then(background_frequency)
                    .unwrap_or(NON_STANDARD_PROBABILITY)
            })
            .collect())
    }
}

impl Sampler for BackgroundModel {
    #[instrument(level = "debug", skip_all, fields(len = masked.len(), n = n))]
    fn fill(&mut self, masked: &[TokenId], n: usize) -> Result<Vec<Vec<TokenId>>, ModelError> {
        let weights = STANDARD_RESIDUES.map(|r| background_frequency(r).unwrap_or(0.0));
        let dist = WeightedIndex::new(weights).map_err(|e| ModelError::Inference(e.to_string()))?;

        let candidates = STANDARD_RESIDUES
            .iter()
            .map(|&r| {
                self.tokenizer.residue_token(r).ok_or_else(|| {
                    ModelError::Inference(format!("residue '{}' missing from vocabulary", r))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mask = self.tokenizer.mask_token();
        let samples = (0..n)
            .map(|_| {
                masked
                    .iter()
                    .map(|&token| {
                        if token == mask {
                            candidates[dist.sample(&mut self.rng)]
                        } else {
                            token
                        }
                    })
                    .collect::<Vec<_>>()
            })
            .collect::<Vec<_>>();

        trace!("Drew {} background samples.", samples.len());
        Ok(samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn background_frequencies_sum_to_one() {
        let total: f64 = STANDARD_RESIDUES
            .iter()
            .filter_map(|&r| background_frequency(r))
            .sum();
        assert!((total - 1.0).abs() < 2e-3);
    }

    #[test]
    fn score_uses_background_frequency_and_ignores_specials() {
        let tokenizer = ResidueTokenizer::new();
        let model = BackgroundModel::with_seed(tokenizer, 7);
        let tokens = tokenizer.encode("LW<eos>X").unwrap();
        let scores = model.score(&tokens).unwrap();

        assert_eq!(scores.len(), tokens.len());
        assert_eq!(scores[0], 1.0);
        assert!((scores[1] - 0.0966).abs() < 1e-12);
        assert!((scores[2] - 0.0108).abs() < 1e-12);
        assert_eq!(scores[3], 1.0);
        assert_eq!(scores[4], NON_STANDARD_PROBABILITY);
    }

    #[test]
    fn fill_only_replaces_mask_tokens() {
        let tokenizer = ResidueTokenizer::new();
        let mut model = BackgroundModel::with_seed(tokenizer, 11);
        let masked = tokenizer.encode("AC<eos>H<mask>L<mask>").unwrap();
        let samples = model.fill(&masked, 4).unwrap();

        assert_eq!(samples.len(), 4);
        for sample in &samples {
            assert_eq!(sample.len(), masked.len());
            for (i, (&orig, &new)) in masked.iter().zip(sample).enumerate() {
                if orig == tokenizer.mask_token() {
                    assert!(!tokenizer.is_special(new), "position {} left unresolved", i);
                } else {
                    assert_eq!(orig, new);
                }
            }
        }
    }

    #[test]
    fn same_seed_gives_same_samples() {
        let tokenizer = ResidueTokenizer::new();
        let masked = tokenizer.encode("<mask><mask><mask><mask>").unwrap();
        let a = BackgroundModel::with_seed(tokenizer, 42).fill(&masked, 3).unwrap();
        let b = BackgroundModel::with_seed(tokenizer, 42).fill(&masked, 3).unwrap();
        assert_eq!(a, b);
    }
}
