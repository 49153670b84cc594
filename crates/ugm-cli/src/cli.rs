use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use ugm::core::models::modality::Modality;
use ugm::engine::config::MaskStrategy;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "UGM Developers",
    version,
    about = "UGM CLI - Uncertainty-guided mutation of peptides and protein scaffolds against a fixed target sequence.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate mutated candidates of a peptide or scaffold for a target sequence.
    Mutate(MutateArgs),
    /// Print the built-in scaffold template of a modality (all templates if none is given).
    Template(TemplateArgs),
    /// Locate CDR1-3 in a nanobody sequence.
    Cdrs(CdrsArgs),
}

/// Arguments for the `mutate` subcommand.
#[derive(Args, Debug)]
pub struct MutateArgs {
    // --- Sequences ---
    /// Target protein sequence. Never modified.
    #[arg(short, long, value_name = "SEQUENCE")]
    pub target: Option<String>,

    /// Peptide or scaffold sequence to mutate.
    #[arg(short, long, visible_alias = "peptide", value_name = "SEQUENCE")]
    pub mutable_sequence: Option<String>,

    /// Binder modality: affibody, nanobody, affitin or custom.
    #[arg(long, value_name = "MODALITY")]
    pub modality: Option<Modality>,

    /// Use the modality's scaffold template as the mutable sequence.
    #[arg(long)]
    pub use_template: bool,

    /// Scaffold to use instead of the modality's built-in template.
    #[arg(long, value_name = "SEQUENCE")]
    pub override_template: Option<String>,

    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    // --- Selection ---
    /// Residue indices (0-based, within the mutable sequence) to resample.
    /// Takes precedence over uncertainty-guided masking.
    #[arg(short, long, value_name = "INDEX", value_delimiter = ',', num_args(1..))]
    pub residues: Option<Vec<usize>>,

    /// CDR regions to resample (nanobody only), e.g. CDR1,CDR3.
    /// Takes precedence over --residues.
    #[arg(long = "cdr", value_name = "NAME", value_delimiter = ',', num_args(1..))]
    pub cdr_regions: Option<Vec<String>>,

    /// Uncertainty masking strategy: top-k or threshold.
    #[arg(long, value_name = "STRATEGY")]
    pub mask_strategy: Option<MaskStrategy>,

    /// Fraction of mutable positions masked by top-k.
    #[arg(long, value_name = "FLOAT")]
    pub mask_ratio: Option<f64>,

    /// Uncertainty above which a position is masked by threshold.
    #[arg(long, value_name = "FLOAT")]
    pub uncertainty_threshold: Option<f64>,

    // --- Generation ---
    /// Number of candidate sequences to generate.
    #[arg(short, long, value_name = "INT")]
    pub num_outputs: Option<usize>,

    /// Seed for the sampling RNG, for reproducible runs.
    #[arg(long, value_name = "INT")]
    pub seed: Option<u64>,

    /// Write the generated candidates to a CSV file.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S selection.mask-ratio=0.2
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `template` subcommand.
#[derive(Args, Debug)]
pub struct TemplateArgs {
    /// Modality whose template to print.
    #[arg(value_name = "MODALITY")]
    pub modality: Option<Modality>,
}

/// Arguments for the `cdrs` subcommand.
#[derive(Args, Debug)]
pub struct CdrsArgs {
    /// Nanobody sequence. Defaults to the built-in nanobody template.
    #[arg(value_name = "SEQUENCE")]
    pub sequence: Option<String>,

    /// Also list the residue indices covered by these regions, e.g. CDR1,CDR3.
    #[arg(long = "residues-for", value_name = "NAME", value_delimiter = ',', num_args(1..))]
    pub residues_for: Option<Vec<String>>,
}
