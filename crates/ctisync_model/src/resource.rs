//! Catalog resource types.

use serde::{Deserialize, Serialize};

/// The kinds of content document the catalog distributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    /// Detection rule.
    Rule,
    /// Log decoder.
    Decoder,
    /// Integration bundling decoders, rules and kvdbs.
    Integration,
    /// Key-value database.
    Kvdb,
    /// Space-level policy referencing integrations.
    Policy,
    /// Indicator of compromise.
    Ioc,
    /// Event filter.
    Filter,
}

impl ResourceType {
    /// All resource types, in catalog listing order.
    pub const ALL: [ResourceType; 7] = [
        ResourceType::Rule,
        ResourceType::Decoder,
        ResourceType::Integration,
        ResourceType::Kvdb,
        ResourceType::Policy,
        ResourceType::Ioc,
        ResourceType::Filter,
    ];

    /// Parse a lowercase type token. Returns `None` for unknown tokens.
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "rule" => Some(Self::Rule),
            "decoder" => Some(Self::Decoder),
            "integration" => Some(Self::Integration),
            "kvdb" => Some(Self::Kvdb),
            "policy" => Some(Self::Policy),
            "ioc" => Some(Self::Ioc),
            "filter" => Some(Self::Filter),
            _ => None,
        }
    }

    /// The lowercase token used on the wire and in persisted documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rule => "rule",
            Self::Decoder => "decoder",
            Self::Integration => "integration",
            Self::Kvdb => "kvdb",
            Self::Policy => "policy",
            Self::Ioc => "ioc",
            Self::Filter => "filter",
        }
    }

    /// Whether documents of this type take part in space promotion.
    ///
    /// IoCs live only in the synchronized space and are never promoted;
    /// policies are promoted but only ever as an update of the target
    /// space's singleton policy.
    pub fn promotable(&self) -> bool {
        !matches!(self, Self::Ioc)
    }
}

impl std::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
