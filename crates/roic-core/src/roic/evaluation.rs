use std::fmt;

use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::Rate;

/// Lower bound of the `excellent` band.
pub const EXCELLENT_THRESHOLD: Rate = dec!(0.15);
/// Lower bound of the `good` band.
pub const GOOD_THRESHOLD: Rate = dec!(0.10);
/// Lower bound of the `average` band.
pub const AVERAGE_THRESHOLD: Rate = dec!(0.05);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoicLevel {
    Excellent,
    Good,
    Average,
    Poor,
}

impl RoicLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::Average => "average",
            Self::Poor => "poor",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Excellent => "Excellent (15% or above)",
            Self::Good => "Good (10-15%)",
            Self::Average => "Average (5-10%)",
            Self::Poor => "Needs improvement (below 5%)",
        }
    }
}

impl fmt::Display for RoicLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoicEvaluation {
    pub level: RoicLevel,
    pub description: String,
}

/// Place a ROIC value in one of four bands. Each band includes its lower bound;
/// everything under 5%, negatives included, is `poor`.
pub fn classify(roic: Rate) -> RoicEvaluation {
    let level = if roic >= EXCELLENT_THRESHOLD {
        RoicLevel::Excellent
    } else if roic >= GOOD_THRESHOLD {
        RoicLevel::Good
    } else if roic >= AVERAGE_THRESHOLD {
        RoicLevel::Average
    } else {
        RoicLevel::Poor
    };
    RoicEvaluation {
        level,
        description: level.description().to_string(),
    }
}
