use super::templates::default_template;
use crate::core::models::modality::Modality;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScaffoldError {
    #[error("No mutable sequence provided. Supply a peptide/scaffold sequence or request a template")]
    MissingSequence,

    #[error("Modality '{0}' has no template. Choose affibody, nanobody or affitin, or provide an override template")]
    UnknownModality(Modality),
}

/// Where the mutable segment of a request comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutableSource {
    Explicit(String),
    Template {
        modality: Modality,
        override_template: Option<String>,
    },
}

impl MutableSource {
    /// Normalizes the loose "sequence or template" interface into a source.
    ///
    /// Empty strings count as absent, so an empty override falls back to the modality
    /// template and an empty explicit sequence without `use_template` is rejected here.
    pub fn from_parts(
        explicit: Option<&str>,
        modality: Modality,
        use_template: bool,
        override_template: Option<&str>,
    ) -> Result<Self, ScaffoldError> {
        if use_template {
            return Ok(MutableSource::Template {
                modality,
                override_template: non_empty(override_template).map(str::to_string),
            });
        }
        non_empty(explicit)
            .map(|seq| MutableSource::Explicit(seq.to_string()))
            .ok_or(ScaffoldError::MissingSequence)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

/// Named scaffold templates.
///
/// Starts from the built-in table; templates registered on an instance shadow the
/// built-in ones for that instance only.
#[derive(Debug, Clone, Default)]
pub struct ScaffoldRegistry {
    custom: HashMap<Modality, String>,
}

impl ScaffoldRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, modality: Modality, template: impl Into<String>) {
        self.custom.insert(modality, template.into());
    }

    pub fn template(&self, modality: Modality) -> Option<&str> {
        self.custom
            .get(&modality)
            .map(String::as_str)
            .or_else(|| default_template(modality))
    }

    pub fn resolve(&self, source: &MutableSource) -> Result<String, ScaffoldError> {
        match source {
            MutableSource::Explicit(seq) if seq.trim().is_empty() => {
                Err(ScaffoldError::MissingSequence)
            }
            MutableSource::Explicit(seq) => Ok(seq.clone()),
            MutableSource::Template {
                override_template: Some(template),
                ..
            } if !template.trim().is_empty() => Ok(template.clone()),
            MutableSource::Template { modality, .. } => self
                .template(*modality)
                .map(str::to_string)
                .ok_or(ScaffoldError::UnknownModality(*modality)),
        }
    }
}
