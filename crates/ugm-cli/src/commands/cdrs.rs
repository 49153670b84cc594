use crate::cli::CdrsArgs;
use crate::error::{CliError, Result};
use tracing::{info, warn};
use ugm::core::models::cdr::CdrName;
use ugm::core::models::modality::Modality;
use ugm::core::numbering::{CdrLocation, identify_nanobody_cdrs, select_locator};
use ugm::core::scaffold::registry::ScaffoldRegistry;
use ugm::core::tokenizer::{ResidueTokenizer, Tokenizer};
use ugm::engine::error::EngineError;

pub fn run(args: CdrsArgs) -> Result<()> {
    let registry = ScaffoldRegistry::new();
    let sequence = match args.sequence {
        Some(sequence) => sequence.trim().to_string(),
        None => {
            info!("No sequence given; using the nanobody template.");
            registry
                .template(Modality::Nanobody)
                .map(str::to_string)
                .ok_or_else(|| CliError::Config("No nanobody template is available.".into()))?
        }
    };

    let location = locate(&sequence)?;
    if let Some(reason) = &location.fallback_reason {
        warn!("Falling back to fixed IMGT offsets: {}", reason);
    }

    println!(
        "Sequence length: {} | strategy: {}",
        sequence.chars().count(),
        location.strategy
    );
    for region in location.regions.iter() {
        println!(
            "{}\t[{}, {})\t{}",
            region.name, region.start, region.end, region.sequence
        );
    }

    if let Some(names) = args.residues_for {
        let names = names
            .iter()
            .map(|name| name.parse::<CdrName>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| CliError::Argument(e.to_string()))?;
        let residues = location.regions.residues_for(&names);
        println!(
            "Residues: {}",
            residues
                .iter()
                .map(usize::to_string)
                .collect::<Vec<_>>()
                .join(",")
        );
    }
    Ok(())
}

fn locate(sequence: &str) -> Result<CdrLocation> {
    ResidueTokenizer::new()
        .encode(sequence)
        .map_err(EngineError::from)?;
    let locator = select_locator(None);
    Ok(identify_nanobody_cdrs(locator.as_ref(), Modality::Nanobody, sequence)
        .map_err(EngineError::from)?)
}
