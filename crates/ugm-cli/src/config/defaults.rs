use ugm::core::models::modality::Modality;
use ugm::engine::config::{
    DEFAULT_MASK_RATIO, DEFAULT_NUM_OUTPUTS, DEFAULT_UNCERTAINTY_THRESHOLD, MaskStrategy,
};

/// Values used when neither the config file, `--set`, nor a flag provides one.
#[derive(Debug, Clone, PartialEq)]
pub struct DefaultsConfig {
    pub modality: Modality,
    pub use_template: bool,
    pub mask_strategy: MaskStrategy,
    pub mask_ratio: f64,
    pub uncertainty_threshold: f64,
    pub num_outputs: usize,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            modality: Modality::Custom,
            use_template: false,
            mask_strategy: MaskStrategy::TopK,
            mask_ratio: DEFAULT_MASK_RATIO,
            uncertainty_threshold: DEFAULT_UNCERTAINTY_THRESHOLD,
            num_outputs: DEFAULT_NUM_OUTPUTS,
        }
    }
}
