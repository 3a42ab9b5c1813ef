//! The mode registry — a closed set of optimization styles.
//!
//! Unknown identifiers never fail a request: anything the registry does not
//! recognize resolves to [`OptimizationMode::Standard`].

use serde::Serialize;

use crate::optimizer::prompts;

/// A named stylistic preset controlling how a raw prompt is rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum OptimizationMode {
    Standard,
    Concise,
    DeepDive,
    Creative,
    Technical,
    Academic,
    Business,
    Educational,
}

impl OptimizationMode {
    /// All modes in advertised order.
    pub fn all() -> &'static [OptimizationMode] {
        use OptimizationMode::*;
        &[
            Standard, Concise, DeepDive, Creative, Technical, Academic, Business, Educational,
        ]
    }

    /// Resolves a freeform identifier (e.g. from an HTTP body) to a mode.
    /// Unrecognized values degrade silently to `Standard` — never an error.
    pub fn resolve(identifier: &str) -> Self {
        match identifier {
            "standard" => Self::Standard,
            "concise" => Self::Concise,
            "deep-dive" => Self::DeepDive,
            "creative" => Self::Creative,
            "technical" => Self::Technical,
            "academic" => Self::Academic,
            "business" => Self::Business,
            "educational" => Self::Educational,
            _ => Self::Standard,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Concise => "concise",
            Self::DeepDive => "deep-dive",
            Self::Creative => "creative",
            Self::Technical => "technical",
            Self::Academic => "academic",
            Self::Business => "business",
            Self::Educational => "educational",
        }
    }

    /// The instruction fragment appended to the base optimizer prompt for
    /// this mode. Exhaustive by construction: every mode has an entry.
    pub fn enhancement(&self) -> &'static str {
        match self {
            Self::Standard => prompts::STANDARD_ENHANCEMENT,
            Self::Concise => prompts::CONCISE_ENHANCEMENT,
            Self::DeepDive => prompts::DEEP_DIVE_ENHANCEMENT,
            Self::Creative => prompts::CREATIVE_ENHANCEMENT,
            Self::Technical => prompts::TECHNICAL_ENHANCEMENT,
            Self::Academic => prompts::ACADEMIC_ENHANCEMENT,
            Self::Business => prompts::BUSINESS_ENHANCEMENT,
            Self::Educational => prompts::EDUCATIONAL_ENHANCEMENT,
        }
    }
}
