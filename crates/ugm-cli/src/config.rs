pub mod defaults;
pub mod models;

use crate::cli::MutateArgs;
use crate::error::{CliError, Result};
use defaults::DefaultsConfig;
use models::AppConfig;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;
use ugm::core::models::modality::{Modality, ParseModalityError};
use ugm::core::scaffold::registry::ScaffoldRegistry;
use ugm::engine::config as core_config;

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialSequencesConfig {
    target: Option<String>,
    mutable_sequence: Option<String>,
    modality: Option<String>,
    use_template: Option<bool>,
    override_template: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialSelectionConfig {
    residues: Option<Vec<usize>>,
    cdr_regions: Option<Vec<String>>,
    mask_strategy: Option<String>,
    mask_ratio: Option<f64>,
    uncertainty_threshold: Option<f64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialGenerationConfig {
    num_outputs: Option<usize>,
    seed: Option<u64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialMutationConfig {
    sequences: Option<PartialSequencesConfig>,
    selection: Option<PartialSelectionConfig>,
    generation: Option<PartialGenerationConfig>,
    /// Modality name to scaffold; shadows the built-in template for this run.
    templates: Option<BTreeMap<String, String>>,
}

fn parse_value<T: FromStr>(key: &str, value: &str, kind: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        CliError::Config(format!("Invalid {} value for {}: {}", kind, key, value))
    })
}

fn parse_list<T: FromStr>(key: &str, value: &str, kind: &str) -> Result<Vec<T>> {
    value
        .split(',')
        .filter(|item| !item.trim().is_empty())
        .map(|item| parse_value(key, item, kind))
        .collect()
}

fn parse_modality(value: &str) -> Result<Modality> {
    value
        .parse()
        .map_err(|e: ParseModalityError| CliError::Config(e.to_string()))
}

impl PartialMutationConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    /// Layers defaults, this file, `--set` values and explicit flags, in increasing
    /// precedence, into a validated configuration.
    pub fn merge_with_cli(mut self, args: &MutateArgs) -> Result<AppConfig> {
        self.apply_set_values(&args.set_values)?;

        let defaults = DefaultsConfig::default();
        let sequences = self.sequences.take().unwrap_or_default();
        let selection = self.selection.take().unwrap_or_default();
        let generation = self.generation.take().unwrap_or_default();

        let target = args.target.clone().or(sequences.target).ok_or_else(|| {
            CliError::Config(
                "A target sequence is required either in the config file (`sequences.target`) or via --target."
                    .to_string(),
            )
        })?;

        let modality = match args.modality {
            Some(modality) => modality,
            None => sequences
                .modality
                .as_deref()
                .map(parse_modality)
                .transpose()?
                .unwrap_or(defaults.modality),
        };

        let mask_strategy = match args.mask_strategy {
            Some(strategy) => strategy,
            None => selection
                .mask_strategy
                .as_deref()
                .map(|s| parse_value::<core_config::MaskStrategy>("mask-strategy", s, "strategy"))
                .transpose()?
                .unwrap_or(defaults.mask_strategy),
        };

        let mut builder = core_config::MutationConfigBuilder::new()
            .target(target)
            .modality(modality)
            .use_template(
                args.use_template || sequences.use_template.unwrap_or(defaults.use_template),
            )
            .mask_strategy(mask_strategy)
            .mask_ratio(
                args.mask_ratio
                    .or(selection.mask_ratio)
                    .unwrap_or(defaults.mask_ratio),
            )
            .uncertainty_threshold(
                args.uncertainty_threshold
                    .or(selection.uncertainty_threshold)
                    .unwrap_or(defaults.uncertainty_threshold),
            )
            .num_outputs(
                args.num_outputs
                    .or(generation.num_outputs)
                    .unwrap_or(defaults.num_outputs),
            );

        if let Some(sequence) = args.mutable_sequence.clone().or(sequences.mutable_sequence) {
            builder = builder.mutable_sequence(sequence);
        }
        if let Some(template) = args.override_template.clone().or(sequences.override_template) {
            builder = builder.override_template(template);
        }
        if let Some(residues) = args.residues.clone().or(selection.residues) {
            builder = builder.residues_to_mutate(residues);
        }
        if let Some(names) = args.cdr_regions.clone().or(selection.cdr_regions) {
            builder = builder.cdr_regions(names);
        }

        let core_config = builder
            .build()
            .map_err(|e| CliError::Config(e.to_string()))?;

        let mut registry = ScaffoldRegistry::new();
        for (name, template) in self.templates.take().unwrap_or_default() {
            let modality = parse_modality(&name)?;
            debug!("Registering custom template for modality '{}'.", modality);
            registry.register(modality, template);
        }

        Ok(AppConfig {
            core_config,
            registry,
            seed: args.seed.or(generation.seed),
            output: args.output.clone(),
        })
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let Some((key, value_str)) = kv_pair.split_once('=') else {
                return Err(CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                )));
            };

            match key {
                "sequences.target" => {
                    self.sequences.get_or_insert_with(Default::default).target =
                        Some(value_str.to_string());
                }
                "sequences.mutable-sequence" => {
                    self.sequences.get_or_insert_with(Default::default).mutable_sequence =
                        Some(value_str.to_string());
                }
                "sequences.modality" => {
                    self.sequences.get_or_insert_with(Default::default).modality =
                        Some(value_str.to_string());
                }
                "sequences.use-template" => {
                    self.sequences.get_or_insert_with(Default::default).use_template =
                        Some(parse_value(key, value_str, "boolean")?);
                }
                "sequences.override-template" => {
                    self.sequences.get_or_insert_with(Default::default).override_template =
                        Some(value_str.to_string());
                }
                "selection.residues" => {
                    self.selection
                        .get_or_insert_with(Default::default)
                        .residues = Some(parse_list(key, value_str, "integer")?);
                }
                "selection.cdr-regions" => {
                    self.selection
                        .get_or_insert_with(Default::default)
                        .cdr_regions = Some(parse_list(key, value_str, "region")?);
                }
                "selection.mask-strategy" => {
                    self.selection
                        .get_or_insert_with(Default::default)
                        .mask_strategy = Some(value_str.to_string());
                }
                "selection.mask-ratio" => {
                    self.selection
                        .get_or_insert_with(Default::default)
                        .mask_ratio = Some(parse_value(key, value_str, "float")?);
                }
                "selection.uncertainty-threshold" => {
                    self.selection
                        .get_or_insert_with(Default::default)
                        .uncertainty_threshold = Some(parse_value(key, value_str, "float")?);
                }
                "generation.num-outputs" => {
                    self.generation
                        .get_or_insert_with(Default::default)
                        .num_outputs = Some(parse_value(key, value_str, "integer")?);
                }
                "generation.seed" => {
                    self.generation.get_or_insert_with(Default::default).seed =
                        Some(parse_value(key, value_str, "integer")?);
                }
                _ => {
                    if let Some(modality) = key.strip_prefix("templates.") {
                        self.templates
                            .get_or_insert_with(Default::default)
                            .insert(modality.to_string(), value_str.to_string());
                    } else {
                        return Err(CliError::Config(format!(
                            "Unsupported configuration key for --set: '{}'",
                            key
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use once_cell::sync::Lazy;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::{TempDir, tempdir};
    use ugm::core::models::cdr::CdrName;
    use ugm::core::scaffold::registry::MutableSource;
    use ugm::engine::config::MaskStrategy;

    static TEST_DIR: Lazy<TempDir> = Lazy::new(|| tempdir().expect("Failed to create temp dir"));

    fn write_config_file(name: &str, content: &str) -> PathBuf {
        let file_path = TEST_DIR.path().join(name);
        fs::write(&file_path, content).unwrap();
        file_path
    }

    fn mutate_args(extra: &[&str]) -> MutateArgs {
        let mut args = vec!["ugm", "mutate"];
        args.extend_from_slice(extra);
        match Cli::parse_from(args).command {
            Commands::Mutate(args) => args,
            _ => panic!("Expected 'mutate' subcommand"),
        }
    }

    #[test]
    fn file_values_are_merged_with_defaults() {
        let config_path = write_config_file(
            "config_defaults.toml",
            r#"
        [sequences]
        target = "MKTAYIAKQR"
        mutable-sequence = "HELVELLA"

        [selection]
        mask-ratio = 0.5
        "#,
        );
        let args = mutate_args(&["-c", config_path.to_str().unwrap()]);

        let app = PartialMutationConfig::from_file(&config_path)
            .unwrap()
            .merge_with_cli(&args)
            .unwrap();

        let config = app.core_config;
        assert_eq!(config.target, "MKTAYIAKQR");
        assert_eq!(config.source, MutableSource::Explicit("HELVELLA".into()));
        assert_eq!(config.modality, Modality::Custom);
        assert_eq!(config.selection.mask_ratio, 0.5);
        assert_eq!(config.selection.mask_strategy, MaskStrategy::TopK);
        assert_eq!(config.selection.uncertainty_threshold, 0.5);
        assert_eq!(config.num_outputs, 10);
        assert_eq!(app.seed, None);
    }

    #[test]
    fn cli_args_override_file_values() {
        let config_path = write_config_file(
            "config_override.toml",
            r#"
        [sequences]
        target = "MKTAYIAKQR"
        mutable-sequence = "HELVELLA"

        [generation]
        num-outputs = 5 # Will be overridden
        seed = 1
        "#,
        );
        let args = mutate_args(&[
            "-c",
            config_path.to_str().unwrap(),
            "-n",
            "2",
            "--mask-strategy",
            "threshold",
            "--peptide",
            "GSGSGS",
        ]);

        let app = PartialMutationConfig::from_file(&config_path)
            .unwrap()
            .merge_with_cli(&args)
            .unwrap();

        assert_eq!(app.core_config.num_outputs, 2);
        assert_eq!(
            app.core_config.selection.mask_strategy,
            MaskStrategy::Threshold
        );
        assert_eq!(
            app.core_config.source,
            MutableSource::Explicit("GSGSGS".into())
        );
        assert_eq!(app.seed, Some(1));
    }

    #[test]
    fn both_top_k_spellings_are_accepted_from_files() {
        let config_path = write_config_file(
            "config_top_k.toml",
            r#"
        [sequences]
        target = "MKTAYIAKQR"
        mutable-sequence = "HELVELLA"

        [selection]
        mask-strategy = "top_k"
        "#,
        );
        let args = mutate_args(&["-c", config_path.to_str().unwrap()]);
        let app = PartialMutationConfig::from_file(&config_path)
            .unwrap()
            .merge_with_cli(&args)
            .unwrap();
        assert_eq!(app.core_config.selection.mask_strategy, MaskStrategy::TopK);

        #[derive(Deserialize)]
        struct Strategies {
            snake: MaskStrategy,
            kebab: MaskStrategy,
        }
        let parsed: Strategies = toml::from_str("snake = \"top_k\"\nkebab = \"top-k\"").unwrap();
        assert_eq!(parsed.snake, MaskStrategy::TopK);
        assert_eq!(parsed.kebab, MaskStrategy::TopK);
    }

    #[test]
    fn set_values_override_file_but_not_flags() {
        let config_path = write_config_file(
            "config_set.toml",
            r#"
        [sequences]
        target = "MKTAYIAKQR"
        modality = "nanobody"
        use-template = true

        [selection]
        mask-ratio = 0.1
        "#,
        );
        let args = mutate_args(&[
            "-c",
            config_path.to_str().unwrap(),
            "-S",
            "selection.mask-ratio=0.4",
            "-S",
            "selection.cdr-regions=CDR1,CDR3",
            "-S",
            "generation.num-outputs=7",
            "-n",
            "3",
        ]);

        let app = PartialMutationConfig::from_file(&config_path)
            .unwrap()
            .merge_with_cli(&args)
            .unwrap();

        let config = app.core_config;
        assert_eq!(config.selection.mask_ratio, 0.4);
        assert_eq!(
            config.selection.cdr_regions,
            Some(vec![CdrName::Cdr1, CdrName::Cdr3])
        );
        assert_eq!(config.num_outputs, 3);
        assert_eq!(config.modality, Modality::Nanobody);
    }

    #[test]
    fn custom_templates_are_registered() {
        let config_path = write_config_file(
            "config_templates.toml",
            r#"
        [sequences]
        target = "MKTAYIAKQR"
        modality = "custom"
        use-template = true

        [templates]
        custom = "GSGSGSGS"
        "#,
        );
        let args = mutate_args(&["-c", config_path.to_str().unwrap()]);

        let app = PartialMutationConfig::from_file(&config_path)
            .unwrap()
            .merge_with_cli(&args)
            .unwrap();

        assert_eq!(app.registry.template(Modality::Custom), Some("GSGSGSGS"));
        assert_eq!(
            app.registry.resolve(&app.core_config.source),
            Ok("GSGSGSGS".to_string())
        );
    }

    #[test]
    fn missing_target_returns_config_error() {
        let args = mutate_args(&["--peptide", "HELVELLA"]);
        let result = PartialMutationConfig::default().merge_with_cli(&args);
        match result {
            Err(CliError::Config(msg)) => assert!(msg.contains("target")),
            other => panic!("Expected a config error, got {:?}", other.err()),
        }
    }

    #[test]
    fn cdr_regions_for_custom_modality_fail_during_merge() {
        let args = mutate_args(&["-t", "MKT", "--peptide", "HELVELLA", "--cdr", "CDR1"]);
        let result = PartialMutationConfig::default().merge_with_cli(&args);
        assert!(matches!(result, Err(CliError::Config(msg)) if msg.contains("nanobody")));
    }

    #[test]
    fn unknown_file_keys_are_rejected() {
        let config_path = write_config_file(
            "config_unknown.toml",
            r#"
        [selection]
        mask-fraction = 0.2
        "#,
        );
        let result = PartialMutationConfig::from_file(&config_path);
        assert!(matches!(result, Err(CliError::FileParsing { .. })));
    }

    #[test]
    fn malformed_set_values_are_rejected() {
        let mut partial = PartialMutationConfig::default();
        assert!(matches!(
            partial.apply_set_values(&["selection.mask-ratio".to_string()]),
            Err(CliError::Config(_))
        ));
        assert!(matches!(
            partial.apply_set_values(&["selection.mask-ratio=high".to_string()]),
            Err(CliError::Config(_))
        ));
        assert!(matches!(
            partial.apply_set_values(&["generation.temperature=1.0".to_string()]),
            Err(CliError::Config(msg)) if msg.contains("Unsupported")
        ));
    }
}
