//! Content spaces and the promotion ladder.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An isolated staging area holding its own copy of catalog content.
///
/// Content flows draft → test → custom; each step is an explicit
/// promotion. The draft space is the one the synchronization run writes
/// into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpaceName {
    /// Where synchronized content lands.
    Draft,
    /// Staging area for validation.
    Test,
    /// The space downstream consumers read.
    Custom,
}

/// Error returned when a space token cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown space: {input}")]
pub struct ParseSpaceError {
    /// The token that failed to parse.
    pub input: String,
}

impl SpaceName {
    /// All spaces, in promotion order.
    pub const ALL: [SpaceName; 3] = [SpaceName::Draft, SpaceName::Test, SpaceName::Custom];

    /// The lowercase token used on the wire and in persisted documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Test => "test",
            Self::Custom => "custom",
        }
    }

    /// The space this one promotes into, `None` at the end of the ladder.
    pub fn promote(&self) -> Option<SpaceName> {
        match self {
            Self::Draft => Some(Self::Test),
            Self::Test => Some(Self::Custom),
            Self::Custom => None,
        }
    }
}

impl std::str::FromStr for SpaceName {
    type Err = ParseSpaceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "test" => Ok(Self::Test),
            "custom" => Ok(Self::Custom),
            _ => Err(ParseSpaceError {
                input: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for SpaceName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn promotion_ladder() {
        assert_eq!(SpaceName::Draft.promote(), Some(SpaceName::Test));
        assert_eq!(SpaceName::Test.promote(), Some(SpaceName::Custom));
        assert_eq!(SpaceName::Custom.promote(), None);
    }

    #[test]
    fn from_str_accepts_lowercase_only() {
        assert_eq!("draft".parse::<SpaceName>().unwrap(), SpaceName::Draft);
        assert_eq!("test".parse::<SpaceName>().unwrap(), SpaceName::Test);
        assert_eq!("custom".parse::<SpaceName>().unwrap(), SpaceName::Custom);
        let err = "Production".parse::<SpaceName>().unwrap_err();
        assert_eq!(err.to_string(), "unknown space: Production");
    }

    #[test]
    fn serde_round_trip() {
        for space in SpaceName::ALL {
            let text = serde_json::to_string(&space).unwrap();
            let back: SpaceName = serde_json::from_str(&text).unwrap();
            assert_eq!(back, space);
        }
    }
}
