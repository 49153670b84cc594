use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::ops::Range;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CdrName {
    #[serde(rename = "CDR1")]
    Cdr1,
    #[serde(rename = "CDR2")]
    Cdr2,
    #[serde(rename = "CDR3")]
    Cdr3,
}

impl CdrName {
    pub const ALL: [CdrName; 3] = [CdrName::Cdr1, CdrName::Cdr2, CdrName::Cdr3];

    pub fn as_str(&self) -> &'static str {
        match self {
            CdrName::Cdr1 => "CDR1",
            CdrName::Cdr2 => "CDR2",
            CdrName::Cdr3 => "CDR3",
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Unknown CDR region '{0}'. Expected one of: CDR1, CDR2, CDR3")]
pub struct ParseCdrNameError(pub String);

impl FromStr for CdrName {
    type Err = ParseCdrNameError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CDR1" | "1" => Ok(CdrName::Cdr1),
            "CDR2" | "2" => Ok(CdrName::Cdr2),
            "CDR3" | "3" => Ok(CdrName::Cdr3),
            _ => Err(ParseCdrNameError(s.to_string())),
        }
    }
}

impl fmt::Display for CdrName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A CDR loop as a half-open residue interval `[start, end)` of the mutable segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CdrRegion {
    pub name: CdrName,
    pub start: usize,
    pub end: usize,
    pub sequence: String,
}

impl CdrRegion {
    /// Builds the region by slicing `scaffold`. Bounds are clamped to the scaffold length.
    pub fn from_bounds(name: CdrName, start: usize, end: usize, scaffold: &str) -> Self {
        let len = scaffold.len();
        let end = end.min(len);
        let start = start.min(end);
        Self {
            name,
            start,
            end,
            sequence: scaffold.get(start..end).unwrap_or_default().to_string(),
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn residues(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// The three CDR loops of a single-domain antibody.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CdrRegions {
    pub cdr1: CdrRegion,
    pub cdr2: CdrRegion,
    pub cdr3: CdrRegion,
}

impl CdrRegions {
    pub fn get(&self, name: CdrName) -> &CdrRegion {
        match name {
            CdrName::Cdr1 => &self.cdr1,
            CdrName::Cdr2 => &self.cdr2,
            CdrName::Cdr3 => &self.cdr3,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &CdrRegion> {
        [&self.cdr1, &self.cdr2, &self.cdr3].into_iter()
    }

    /// Sorted, duplicate-free residue indices covered by the requested regions.
    pub fn residues_for(&self, names: &[CdrName]) -> Vec<usize> {
        names
            .iter()
            .flat_map(|&name| self.get(name).residues())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Ordered CDR1 < CDR2 < CDR3, non-overlapping, and inside `[0, sequence_len]`.
    pub fn is_well_formed(&self, sequence_len: usize) -> bool {
        let in_bounds = self
            .iter()
            .all(|r| r.start <= r.end && r.end <= sequence_len);
        in_bounds && self.cdr1.end <= self.cdr2.start && self.cdr2.end <= self.cdr3.start
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn regions() -> CdrRegions {
        let scaffold = "ABCDEFGHIJKLMNOP";
        CdrRegions {
            cdr1: CdrRegion::from_bounds(CdrName::Cdr1, 1, 4, scaffold),
            cdr2: CdrRegion::from_bounds(CdrName::Cdr2, 6, 8, scaffold),
            cdr3: CdrRegion::from_bounds(CdrName::Cdr3, 10, 13, scaffold),
        }
    }

    #[test]
    fn cdr_name_parses_common_spellings() {
        assert_eq!("CDR1".parse::<CdrName>(), Ok(CdrName::Cdr1));
        assert_eq!("cdr2".parse::<CdrName>(), Ok(CdrName::Cdr2));
        assert_eq!(" 3 ".parse::<CdrName>(), Ok(CdrName::Cdr3));
    }

    #[test]
    fn cdr_name_rejects_names_outside_the_three_loops() {
        let err = "CDR4".parse::<CdrName>().unwrap_err();
        assert_eq!(err, ParseCdrNameError("CDR4".to_string()));
    }

    #[test]
    fn from_bounds_slices_the_scaffold() {
        let region = CdrRegion::from_bounds(CdrName::Cdr1, 2, 5, "ABCDEFG");
        assert_eq!(region.sequence, "CDE");
        assert_eq!(region.len(), 3);
        assert_eq!(region.residues(), 2..5);
    }

    #[test]
    fn from_bounds_clamps_to_short_scaffolds() {
        let region = CdrRegion::from_bounds(CdrName::Cdr3, 94, 102, "ABCDE");
        assert_eq!((region.start, region.end), (5, 5));
        assert!(region.is_empty());
        assert_eq!(region.sequence, "");

        let partial = CdrRegion::from_bounds(CdrName::Cdr2, 3, 10, "ABCDE");
        assert_eq!((partial.start, partial.end), (3, 5));
        assert_eq!(partial.sequence, "DE");
    }

    #[test]
    fn residues_for_unions_requested_regions_in_order() {
        let regions = regions();
        assert_eq!(
            regions.residues_for(&[CdrName::Cdr3, CdrName::Cdr1, CdrName::Cdr3]),
            vec![1, 2, 3, 10, 11, 12]
        );
        assert!(regions.residues_for(&[]).is_empty());
    }

    #[test]
    fn is_well_formed_detects_overlap_and_out_of_bounds() {
        let mut regions = regions();
        assert!(regions.is_well_formed(16));
        assert!(!regions.is_well_formed(12));

        regions.cdr2.start = 3;
        assert!(!regions.is_well_formed(16));
    }
}
