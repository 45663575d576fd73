//! Sales region definitions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Geographic region of a company's headquarters.
///
/// These are the regions the dashboard offers for selection. Dataset records
/// keep the raw label, so a file may carry labels outside this list; whether
/// such a label is usable is decided by the fitted encoder, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Region {
    /// North America
    NorthAmerica,

    /// Europe
    Europe,

    /// Asia
    Asia,
}

impl Region {
    /// Returns all regions in display order.
    pub fn all() -> Vec<Self> {
        vec![Self::NorthAmerica, Self::Europe, Self::Asia]
    }

    /// Returns the label used in dataset files.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::NorthAmerica => "North America",
            Self::Europe => "Europe",
            Self::Asia => "Asia",
        }
    }

    /// Parse a region from its dataset label (case-insensitive, surrounding
    /// whitespace ignored).
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::all()
            .into_iter()
            .find(|region| region.label().eq_ignore_ascii_case(label))
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Error returned when a string is not a known region label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRegion(pub String);

impl fmt::Display for UnknownRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown region: {}", self.0)
    }
}

impl std::error::Error for UnknownRegion {}

impl FromStr for Region {
    type Err = UnknownRegion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s).ok_or_else(|| UnknownRegion(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_all_regions() {
        assert_eq!(Region::all().len(), 3);
    }

    #[rstest]
    #[case("North America", Region::NorthAmerica)]
    #[case("europe", Region::Europe)]
    #[case("  ASIA ", Region::Asia)]
    fn test_from_label(#[case] label: &str, #[case] expected: Region) {
        assert_eq!(Region::from_label(label), Some(expected));
    }

    #[test]
    fn test_unknown_label() {
        assert_eq!(Region::from_label("Mars"), None);
        assert!("Mars".parse::<Region>().is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Region::NorthAmerica), "North America");
    }
}
