use crate::cli::TemplateArgs;
use crate::error::{CliError, Result};
use tracing::info;
use ugm::core::models::modality::Modality;
use ugm::core::scaffold::registry::ScaffoldRegistry;

pub fn run(args: TemplateArgs) -> Result<()> {
    let registry = ScaffoldRegistry::new();

    match args.modality {
        Some(modality) => {
            let template = registry.template(modality).ok_or_else(|| {
                CliError::Argument(format!(
                    "Modality '{}' has no built-in template. Available: {}",
                    modality,
                    available(&registry).join(", ")
                ))
            })?;
            info!("Printing the {} template ({} residues).", modality, template.len());
            println!("{}", template);
        }
        None => {
            for modality in Modality::ALL {
                if let Some(template) = registry.template(modality) {
                    println!(">{} length={}", modality, template.len());
                    println!("{}", template);
                }
            }
        }
    }
    Ok(())
}

fn available(registry: &ScaffoldRegistry) -> Vec<&'static str> {
    Modality::ALL
        .into_iter()
        .filter(|m| registry.template(*m).is_some())
        .map(|m| m.as_str())
        .collect()
}
