//! Likelihood Utilities - Parsing of DLP likelihood levels
//!
//! Cloud DLP assigns every finding an ordinal likelihood. Inspection requests
//! carry a minimum likelihood, and findings below it are dropped server side.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Likelihood that a finding matches its info type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Likelihood {
    #[default]
    #[serde(rename = "LIKELIHOOD_UNSPECIFIED")]
    Unspecified,
    VeryUnlikely,
    Unlikely,
    Possible,
    Likely,
    VeryLikely,
}

impl Likelihood {
    /// All accepted values, weakest first
    pub const ALL: [Likelihood; 6] = [
        Likelihood::Unspecified,
        Likelihood::VeryUnlikely,
        Likelihood::Unlikely,
        Likelihood::Possible,
        Likelihood::Likely,
        Likelihood::VeryLikely,
    ];

    /// Wire name used by the DLP API
    pub fn as_str(&self) -> &'static str {
        match self {
            Likelihood::Unspecified => "LIKELIHOOD_UNSPECIFIED",
            Likelihood::VeryUnlikely => "VERY_UNLIKELY",
            Likelihood::Unlikely => "UNLIKELY",
            Likelihood::Possible => "POSSIBLE",
            Likelihood::Likely => "LIKELY",
            Likelihood::VeryLikely => "VERY_LIKELY",
        }
    }
}

impl fmt::Display for Likelihood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned for an unrecognised likelihood name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown likelihood '{0}' (expected one of {accepted})", accepted = accepted_names())]
pub struct UnknownLikelihood(pub String);

fn accepted_names() -> String {
    Likelihood::ALL
        .iter()
        .map(Likelihood::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse a likelihood name
///
/// Case-insensitive; `-` may stand in for `_`, and `UNSPECIFIED` is accepted
/// as shorthand for `LIKELIHOOD_UNSPECIFIED`.
///
/// # Examples
/// ```
/// use bucketscan::likelihood::Likelihood;
///
/// assert_eq!("possible".parse::<Likelihood>(), Ok(Likelihood::Possible));
/// assert_eq!("very-likely".parse::<Likelihood>(), Ok(Likelihood::VeryLikely));
/// assert!("sometimes".parse::<Likelihood>().is_err());
/// ```
impl FromStr for Likelihood {
    type Err = UnknownLikelihood;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase().replace('-', "_");
        match normalized.as_str() {
            "LIKELIHOOD_UNSPECIFIED" | "UNSPECIFIED" => Ok(Likelihood::Unspecified),
            "VERY_UNLIKELY" => Ok(Likelihood::VeryUnlikely),
            "UNLIKELY" => Ok(Likelihood::Unlikely),
            "POSSIBLE" => Ok(Likelihood::Possible),
            "LIKELY" => Ok(Likelihood::Likely),
            "VERY_LIKELY" => Ok(Likelihood::VeryLikely),
            _ => Err(UnknownLikelihood(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_likelihood() {
        assert_eq!("VERY_UNLIKELY".parse(), Ok(Likelihood::VeryUnlikely));
        assert_eq!("unlikely".parse(), Ok(Likelihood::Unlikely));
        assert_eq!("Likely".parse(), Ok(Likelihood::Likely));
        assert_eq!("LIKELIHOOD_UNSPECIFIED".parse(), Ok(Likelihood::Unspecified));
        assert_eq!("unspecified".parse(), Ok(Likelihood::Unspecified));
        assert_eq!(" possible ".parse(), Ok(Likelihood::Possible));
    }

    #[test]
    fn test_unknown_likelihood_lists_accepted_values() {
        let err = "CERTAIN".parse::<Likelihood>().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("CERTAIN"));
        assert!(message.contains("VERY_LIKELY"));
    }

    #[test]
    fn test_unknown_likelihood_message() {
        let err = UnknownLikelihood("SOMETIMES".to_string());
        assert_eq!(
            err.to_string(),
            "unknown likelihood 'SOMETIMES' (expected one of LIKELIHOOD_UNSPECIFIED, \
             VERY_UNLIKELY, UNLIKELY, POSSIBLE, LIKELY, VERY_LIKELY)"
        );
        let source: &dyn std::error::Error = &err;
        assert!(source.source().is_none());
    }

    #[test]
    fn test_wire_names() -> Result<(), serde_json::Error> {
        assert_eq!(
            serde_json::to_string(&Likelihood::Unspecified)?,
            "\"LIKELIHOOD_UNSPECIFIED\""
        );
        assert_eq!(serde_json::to_string(&Likelihood::VeryLikely)?, "\"VERY_LIKELY\"");
        let parsed: Likelihood = serde_json::from_str("\"POSSIBLE\"")?;
        assert_eq!(parsed, Likelihood::Possible);
        Ok(())
    }
}
