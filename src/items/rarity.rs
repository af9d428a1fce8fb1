//! Rarity tiers
//!
//! Ordered tiers sampled at roll time. Index order matters: the rarity model
//! biases weights by distance from the middle tier.

use serde::{Deserialize, Serialize};

/// Item rarity tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum Rarity {
    #[default]
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
    Mythic,
}

impl Rarity {
    /// All tiers, lowest first
    pub const ALL: [Rarity; 6] = [
        Rarity::Common,
        Rarity::Uncommon,
        Rarity::Rare,
        Rarity::Epic,
        Rarity::Legendary,
        Rarity::Mythic,
    ];

    /// Number of tiers
    pub const COUNT: usize = Self::ALL.len();

    /// Get rarity name
    pub fn name(&self) -> &'static str {
        match self {
            Rarity::Common => "Common",
            Rarity::Uncommon => "Uncommon",
            Rarity::Rare => "Rare",
            Rarity::Epic => "Epic",
            Rarity::Legendary => "Legendary",
            Rarity::Mythic => "Mythic",
        }
    }

    /// Persisted identifier (upper case)
    pub fn id(&self) -> &'static str {
        match self {
            Rarity::Common => "COMMON",
            Rarity::Uncommon => "UNCOMMON",
            Rarity::Rare => "RARE",
            Rarity::Epic => "EPIC",
            Rarity::Legendary => "LEGENDARY",
            Rarity::Mythic => "MYTHIC",
        }
    }

    /// Tier index (0 = Common)
    pub fn index(&self) -> usize {
        match self {
            Rarity::Common => 0,
            Rarity::Uncommon => 1,
            Rarity::Rare => 2,
            Rarity::Epic => 3,
            Rarity::Legendary => 4,
            Rarity::Mythic => 5,
        }
    }

    /// Tier for an index, if in range
    pub fn from_index(index: usize) -> Option<Rarity> {
        Self::ALL.get(index).copied()
    }

    /// Parse a persisted or configured id. Case and surrounding whitespace are ignored.
    pub fn from_id(raw: &str) -> Option<Rarity> {
        let normalized = raw.trim().to_ascii_uppercase();
        Self::ALL.iter().copied().find(|r| r.id() == normalized)
    }

    /// Parse with the safe default for unknown values
    pub fn from_id_or_default(raw: &str) -> Rarity {
        Self::from_id(raw).unwrap_or_default()
    }
}

impl std::fmt::Display for Rarity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_round_trip() {
        for rarity in Rarity::ALL {
            assert_eq!(Rarity::from_index(rarity.index()), Some(rarity));
        }
        assert_eq!(Rarity::from_index(6), None);
    }

    #[test]
    fn test_parse_is_lenient() {
        assert_eq!(Rarity::from_id(" legendary "), Some(Rarity::Legendary));
        assert_eq!(Rarity::from_id("Mythic"), Some(Rarity::Mythic));
        assert_eq!(Rarity::from_id("vocational"), None);
        assert_eq!(Rarity::from_id_or_default("garbage"), Rarity::Common);
    }

    #[test]
    fn test_ordering() {
        assert!(Rarity::Common < Rarity::Uncommon);
        assert!(Rarity::Legendary < Rarity::Mythic);
    }
}
