use std::path::PathBuf;
use ugm::core::scaffold::registry::ScaffoldRegistry;
use ugm::engine::config as core_config;

pub struct AppConfig {
    pub core_config: core_config::MutationConfig,
    pub registry: ScaffoldRegistry,
    pub seed: Option<u64>,
    pub output: Option<PathBuf>,
}
