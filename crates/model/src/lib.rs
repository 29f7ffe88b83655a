//! Pure domain types shared across the workspace. No I/O here.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The five Big-Five traits, in the fixed order every code uses.
pub const TRAIT_NAMES: [&str; 5] = [
    "openness",
    "conscientiousness",
    "extraversion",
    "agreeableness",
    "neuroticism",
];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TraitCodeError {
    #[error("unknown trait level: {0}")]
    UnknownLevel(String),

    #[error("expected 5 hyphen-separated levels, got {0}")]
    WrongArity(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraitLevel {
    Low,
    Medium,
    High,
}

impl TraitLevel {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

impl FromStr for TraitLevel {
    type Err = TraitCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(TraitCodeError::UnknownLevel(other.to_string())),
        }
    }
}

impl fmt::Display for TraitLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Five ordered trait levels (O-C-E-A-N), the universal lookup key.
///
/// Renders as `"High-Low-Medium-High-Low"`. Request-time lookups stay on the
/// raw string form so malformed input misses the maps instead of erroring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TraitCode {
    pub openness: TraitLevel,
    pub conscientiousness: TraitLevel,
    pub extraversion: TraitLevel,
    pub agreeableness: TraitLevel,
    pub neuroticism: TraitLevel,
}

impl TraitCode {
    #[must_use]
    pub const fn new(levels: [TraitLevel; 5]) -> Self {
        Self {
            openness: levels[0],
            conscientiousness: levels[1],
            extraversion: levels[2],
            agreeableness: levels[3],
            neuroticism: levels[4],
        }
    }

}

impl FromStr for TraitCode {
    type Err = TraitCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('-').collect();
        if parts.len() != 5 {
            return Err(TraitCodeError::WrongArity(parts.len()));
        }
        let mut levels = [TraitLevel::Medium; 5];
        for (slot, part) in levels.iter_mut().zip(&parts) {
            *slot = part.parse()?;
        }
        Ok(Self::new(levels))
    }
}

impl fmt::Display for TraitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{}-{}-{}",
            self.openness,
            self.conscientiousness,
            self.extraversion,
            self.agreeableness,
            self.neuroticism
        )
    }
}
