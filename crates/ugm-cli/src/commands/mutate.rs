use crate::cli::MutateArgs;
use crate::config::PartialMutationConfig;
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use serde::Serialize;
use std::path::Path;
use tracing::{info, warn};
use ugm::core::model::background::BackgroundModel;
use ugm::core::numbering::select_locator;
use ugm::core::tokenizer::ResidueTokenizer;
use ugm::engine::progress::ProgressReporter;
use ugm::workflows::{self, mutate::MutationContext, mutate::MutationResult};

#[derive(Debug, Serialize)]
struct CandidateRecord<'a> {
    index: usize,
    sequence: &'a str,
    num_mutations: usize,
    mutations: String,
    selected_residues: String,
}

pub fn run(args: MutateArgs, quiet: bool) -> Result<()> {
    let partial_config = match &args.config {
        Some(path) => PartialMutationConfig::from_file(path)?,
        None => PartialMutationConfig::default(),
    };
    info!("Merging configuration from file and CLI arguments...");
    let app_config = partial_config.merge_with_cli(&args)?;

    let tokenizer = ResidueTokenizer::new();
    let locator = select_locator(None);
    let mut model = match app_config.seed {
        Some(seed) => BackgroundModel::with_seed(tokenizer, seed),
        None => BackgroundModel::new(tokenizer),
    };
    info!("Using the background-frequency reference model.");

    let progress_handler = if quiet {
        CliProgressHandler::hidden()
    } else {
        CliProgressHandler::new()
    };
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());
    let context = MutationContext {
        tokenizer: &tokenizer,
        registry: &app_config.registry,
        locator: locator.as_ref(),
    };

    println!("Starting uncertainty-guided mutation...");
    let result =
        workflows::mutate::run(&app_config.core_config, &context, &mut model, &reporter)?;

    print_summary(&result);

    if let Some(path) = &app_config.output {
        write_candidates(path, &result)?;
        println!(
            "✓ {} candidate(s) written to: {}",
            result.generated_sequences.len(),
            path.display()
        );
    }

    Ok(())
}

/// Point mutations from `original` to `candidate`, 1-based (e.g. `H1W`).
fn describe_mutations(original: &str, candidate: &str) -> Vec<String> {
    original
        .chars()
        .zip(candidate.chars())
        .enumerate()
        .filter(|(_, (from, to))| from != to)
        .map(|(i, (from, to))| format!("{}{}{}", from, i + 1, to))
        .collect()
}

fn join_indices(indices: &[usize]) -> String {
    indices
        .iter()
        .map(usize::to_string)
        .collect::<Vec<_>>()
        .join(";")
}

fn print_summary(result: &MutationResult) {
    let selected = result.selected_residues();
    println!(
        "Modality: {} | mutable length: {} | strategy: {}",
        result.modality,
        result.mutable_sequence.chars().count(),
        result.selection_strategy
    );
    if let Some(location) = &result.cdr_location {
        if let Some(reason) = &location.fallback_reason {
            warn!("CDRs located with fixed offsets: {}", reason);
        }
        for region in location.regions.iter() {
            println!(
                "  {} [{}, {}): {}",
                region.name, region.start, region.end, region.sequence
            );
        }
    }

    if selected.is_empty() {
        println!("Warning: no positions were selected; every candidate equals the input.");
    } else {
        println!(
            "Resampled {} position(s): {}",
            selected.len(),
            join_indices(&selected)
        );
    }

    for (i, candidate) in result.generated_sequences.iter().enumerate() {
        let mutations = describe_mutations(&result.mutable_sequence, candidate);
        println!(
            "  Candidate {:>3}: {} ({} mutation(s))",
            i + 1,
            candidate,
            mutations.len()
        );
    }
}

fn write_candidates(path: &Path, result: &MutationResult) -> Result<()> {
    info!("Writing candidates to {:?}", path);
    let mut writer = csv::Writer::from_path(path)?;
    let selected = join_indices(&result.selected_residues());

    for (i, candidate) in result.generated_sequences.iter().enumerate() {
        let mutations = describe_mutations(&result.mutable_sequence, candidate);
        writer.serialize(CandidateRecord {
            index: i + 1,
            sequence: candidate,
            num_mutations: mutations.len(),
            mutations: mutations.join(";"),
            selected_residues: selected.clone(),
        })?;
    }
    writer.flush().map_err(CliError::Io)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ugm::core::models::modality::Modality;
    use ugm::engine::selection::PositionSet;
    use ugm::engine::uncertainty::UncertaintyVector;

    fn result() -> MutationResult {
        MutationResult {
            modality: Modality::Custom,
            mutable_sequence: "HELVELLA".into(),
            combined_sequence: "MKT<eos>HELVELLA".into(),
            mutable_start_index: 5,
            uncertainty: UncertaintyVector::from(vec![0.5; 8]),
            selection_strategy: "residues",
            selected_positions: PositionSet::from_indices([5, 7]),
            cdr_location: None,
            masked_sequence: "<cls>MKT<eos><mask>E<mask>VELLA<eos>".into(),
            generated_sequences: vec!["WEWVELLA".into(), "HELVELLA".into()],
        }
    }

    #[test]
    fn mutations_use_one_based_notation() {
        assert_eq!(
            describe_mutations("HELVELLA", "WEWVELLA"),
            vec!["H1W".to_string(), "L3W".to_string()]
        );
        assert!(describe_mutations("HELVELLA", "HELVELLA").is_empty());
    }

    #[test]
    fn candidates_are_written_as_csv_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("candidates.csv");

        write_candidates(&path, &result()).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(
            lines[0],
            "index,sequence,num_mutations,mutations,selected_residues"
        );
        assert_eq!(lines[1], "1,WEWVELLA,2,H1W;L3W,0;2");
        assert_eq!(lines[2], "2,HELVELLA,0,,0;2");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn unwritable_output_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = write_candidates(dir.path(), &result());
        assert!(result.is_err());
    }
}
