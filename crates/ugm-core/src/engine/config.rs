use crate::core::models::cdr::{CdrName, ParseCdrNameError};
use crate::core::models::modality::{Modality, ParseModalityError};
use crate::core::scaffold::registry::{MutableSource, ScaffoldError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_MASK_RATIO: f64 = 0.3;
pub const DEFAULT_UNCERTAINTY_THRESHOLD: f64 = 0.5;
pub const DEFAULT_NUM_OUTPUTS: usize = 10;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Target sequence is empty")]
    EmptyTarget,

    #[error("The {0} sequence contains the separator token")]
    EmbeddedSeparator(&'static str),

    #[error("The {0} sequence contains a special token literal such as <mask> or <pad>")]
    EmbeddedSpecialToken(&'static str),

    #[error(transparent)]
    Scaffold(#[from] ScaffoldError),

    #[error(transparent)]
    UnknownModality(#[from] ParseModalityError),

    #[error(transparent)]
    UnknownCdrName(#[from] ParseCdrNameError),

    #[error(transparent)]
    UnknownMaskStrategy(#[from] ParseMaskStrategyError),

    #[error("CDR regions can only be targeted for the nanobody modality, got '{0}'")]
    InvalidModalityForCdr(Modality),

    #[error("CDR-based selection requested without any region names. Use e.g. [\"CDR1\", \"CDR3\"]")]
    MissingCdrConfiguration,

    #[error("Mask ratio must be within [0, 1], got {0}")]
    InvalidMaskRatio(f64),

    #[error("Uncertainty threshold must be a finite number, got {0}")]
    InvalidThreshold(f64),

    #[error("Number of outputs must be greater than zero, got {0}")]
    InvalidOutputCount(usize),

    #[error("Residue index {index} is outside the mutable sequence of length {len}")]
    ResidueOutOfRange { index: usize, len: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MaskStrategy {
    #[default]
    #[serde(alias = "top_k")]
    TopK,
    Threshold,
    Entropy,
}

impl MaskStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            MaskStrategy::TopK => "top-k",
            MaskStrategy::Threshold => "threshold",
            MaskStrategy::Entropy => "entropy",
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Unknown mask strategy '{0}'. Expected one of: top-k, threshold, entropy")]
pub struct ParseMaskStrategyError(pub String);

impl FromStr for MaskStrategy {
    type Err = ParseMaskStrategyError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "top_k" | "top-k" | "topk" => Ok(MaskStrategy::TopK),
            "threshold" => Ok(MaskStrategy::Threshold),
            "entropy" => Ok(MaskStrategy::Entropy),
            _ => Err(ParseMaskStrategyError(s.to_string())),
        }
    }
}

impl fmt::Display for MaskStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which positions to resample, in priority order: CDR regions, explicit residues,
/// then uncertainty-guided masking.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionConfig {
    pub cdr_regions: Option<Vec<CdrName>>,
    /// 0-indexed within the mutable sequence.
    pub residues: Option<Vec<usize>>,
    pub mask_strategy: MaskStrategy,
    pub mask_ratio: f64,
    pub uncertainty_threshold: f64,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            cdr_regions: None,
            residues: None,
            mask_strategy: MaskStrategy::default(),
            mask_ratio: DEFAULT_MASK_RATIO,
            uncertainty_threshold: DEFAULT_UNCERTAINTY_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MutationConfig {
    pub target: String,
    pub source: MutableSource,
    pub modality: Modality,
    pub selection: SelectionConfig,
    pub num_outputs: usize,
}

impl MutationConfig {
    /// Checks the parts of the request that depend on the resolved mutable sequence.
    ///
    /// # Arguments
    ///
    /// * `mutable_len` - Residue count of the resolved mutable sequence.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ResidueOutOfRange`] for the first explicit residue index that
    /// does not fall inside the mutable sequence. Residues are not checked when CDR regions
    /// are configured, since they are never used then.
    pub fn validate_against(&self, mutable_len: usize) -> Result<(), ConfigError> {
        if self.selection.cdr_regions.is_some() {
            return Ok(());
        }
        if let Some(index) = self
            .selection
            .residues
            .iter()
            .flatten()
            .find(|&&index| index >= mutable_len)
        {
            return Err(ConfigError::ResidueOutOfRange {
                index: *index,
                len: mutable_len,
            });
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MutationConfigBuilder {
    target: Option<String>,
    mutable_sequence: Option<String>,
    modality: Option<Modality>,
    use_template: bool,
    override_template: Option<String>,
    residues_to_mutate: Option<Vec<usize>>,
    cdr_regions: Option<Vec<String>>,
    mask_strategy: Option<MaskStrategy>,
    mask_ratio: Option<f64>,
    uncertainty_threshold: Option<f64>,
    num_outputs: Option<usize>,
}

impl MutationConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn target(mut self, sequence: impl Into<String>) -> Self {
        self.target = Some(sequence.into());
        self
    }
    pub fn mutable_sequence(mut self, sequence: impl Into<String>) -> Self {
        self.mutable_sequence = Some(sequence.into());
        self
    }
    pub fn modality(mut self, modality: Modality) -> Self {
        self.modality = Some(modality);
        self
    }
    pub fn use_template(mut self, use_template: bool) -> Self {
        self.use_template = use_template;
        self
    }
    pub fn override_template(mut self, template: impl Into<String>) -> Self {
        self.override_template = Some(template.into());
        self
    }
    pub fn residues_to_mutate(mut self, residues: Vec<usize>) -> Self {
        self.residues_to_mutate = Some(residues);
        self
    }
    pub fn cdr_regions<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.cdr_regions = Some(names.into_iter().map(|s| s.as_ref().to_string()).collect());
        self
    }
    pub fn mask_strategy(mut self, strategy: MaskStrategy) -> Self {
        self.mask_strategy = Some(strategy);
        self
    }
    pub fn mask_ratio(mut self, ratio: f64) -> Self {
        self.mask_ratio = Some(ratio);
        self
    }
    pub fn uncertainty_threshold(mut self, threshold: f64) -> Self {
        self.uncertainty_threshold = Some(threshold);
        self
    }
    pub fn num_outputs(mut self, n: usize) -> Self {
        self.num_outputs = Some(n);
        self
    }

    /// Validates everything that does not depend on the resolved mutable sequence.
    pub fn build(self) -> Result<MutationConfig, ConfigError> {
        let target = self.target.ok_or(ConfigError::MissingParameter("target"))?;
        if target.trim().is_empty() {
            return Err(ConfigError::EmptyTarget);
        }

        let modality = self.modality.unwrap_or_default();
        let source = MutableSource::from_parts(
            self.mutable_sequence.as_deref(),
            modality,
            self.use_template,
            self.override_template.as_deref(),
        )?;

        let cdr_regions = self
            .cdr_regions
            .map(|names| {
                names
                    .iter()
                    .map(|name| name.parse::<CdrName>())
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()?;
        if let Some(names) = &cdr_regions {
            if names.is_empty() {
                return Err(ConfigError::MissingCdrConfiguration);
            }
            if !modality.has_cdrs() {
                return Err(ConfigError::InvalidModalityForCdr(modality));
            }
        }

        let mask_ratio = self.mask_ratio.unwrap_or(DEFAULT_MASK_RATIO);
        if !(0.0..=1.0).contains(&mask_ratio) {
            return Err(ConfigError::InvalidMaskRatio(mask_ratio));
        }
        let uncertainty_threshold = self
            .uncertainty_threshold
            .unwrap_or(DEFAULT_UNCERTAINTY_THRESHOLD);
        if !uncertainty_threshold.is_finite() {
            return Err(ConfigError::InvalidThreshold(uncertainty_threshold));
        }
        let num_outputs = self.num_outputs.unwrap_or(DEFAULT_NUM_OUTPUTS);
        if num_outputs == 0 {
            return Err(ConfigError::InvalidOutputCount(num_outputs));
        }

        Ok(MutationConfig {
            target,
            source,
            modality,
            selection: SelectionConfig {
                cdr_regions,
                residues: self.residues_to_mutate,
                mask_strategy: self.mask_strategy.unwrap_or_default(),
                mask_ratio,
                uncertainty_threshold,
            },
            num_outputs,
        })
    }
}
