use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Structural class of the mutable segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    Affibody,
    Nanobody,
    Affitin,
    #[default]
    Custom,
}

impl Modality {
    pub const ALL: [Modality; 4] = [
        Modality::Affibody,
        Modality::Nanobody,
        Modality::Affitin,
        Modality::Custom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Modality::Affibody => "affibody",
            Modality::Nanobody => "nanobody",
            Modality::Affitin => "affitin",
            Modality::Custom => "custom",
        }
    }

    /// Only single-domain antibodies carry CDR loops in this model.
    pub fn has_cdrs(&self) -> bool {
        matches!(self, Modality::Nanobody)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Invalid modality '{0}'. Expected one of: affibody, nanobody, affitin, custom")]
pub struct ParseModalityError(pub String);

impl FromStr for Modality {
    type Err = ParseModalityError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "affibody" => Ok(Modality::Affibody),
            "nanobody" | "vhh" => Ok(Modality::Nanobody),
            "affitin" => Ok(Modality::Affitin),
            "custom" => Ok(Modality::Custom),
            _ => Err(ParseModalityError(s.to_string())),
        }
    }
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_str_is_case_insensitive_and_trims() {
        assert_eq!(" Nanobody ".parse::<Modality>(), Ok(Modality::Nanobody));
        assert_eq!("AFFIBODY".parse::<Modality>(), Ok(Modality::Affibody));
        assert_eq!("vhh".parse::<Modality>(), Ok(Modality::Nanobody));
    }

    #[test]
    fn from_str_rejects_unknown_names() {
        let err = "darpin".parse::<Modality>().unwrap_err();
        assert_eq!(err, ParseModalityError("darpin".to_string()));
        assert!(err.to_string().contains("darpin"));
    }

    #[test]
    fn display_round_trips_through_from_str() {
        for modality in Modality::ALL {
            assert_eq!(modality.to_string().parse::<Modality>(), Ok(modality));
        }
    }

    #[test]
    fn default_is_custom_and_only_nanobody_has_cdrs() {
        assert_eq!(Modality::default(), Modality::Custom);
        assert!(Modality::Nanobody.has_cdrs());
        assert!(!Modality::Affibody.has_cdrs());
        assert!(!Modality::Custom.has_cdrs());
    }
}
