//! Per-instance roll metadata
//!
//! The versioned record attached to a rolled item stack, and its forward-only
//! migration. Values are replaced wholesale on change, never shared mutably.

use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use super::rarity::Rarity;
use super::stats::ItemizedStatBlock;

/// Schema version written by this build
pub const CURRENT_SCHEMA_VERSION: i64 = 3;

/// Game-loop channel that produced an item instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum RollSource {
    #[default]
    Crafted,
    Dropped,
    MonsterDrop,
    ContainerLoot,
    QuestReward,
    SlayerShop,
    Fishing,
    StarterKit,
    WorldPickup,
}

impl RollSource {
    pub const ALL: [RollSource; 9] = [
        RollSource::Crafted,
        RollSource::Dropped,
        RollSource::MonsterDrop,
        RollSource::ContainerLoot,
        RollSource::QuestReward,
        RollSource::SlayerShop,
        RollSource::Fishing,
        RollSource::StarterKit,
        RollSource::WorldPickup,
    ];

    /// Persisted id, also used as the rarity weight table key
    pub fn id(&self) -> &'static str {
        match self {
            RollSource::Crafted => "crafted",
            RollSource::Dropped => "dropped",
            RollSource::MonsterDrop => "monster_drop",
            RollSource::ContainerLoot => "container_loot",
            RollSource::QuestReward => "quest_reward",
            RollSource::SlayerShop => "slayer_shop",
            RollSource::Fishing => "fishing",
            RollSource::StarterKit => "starter_kit",
            RollSource::WorldPickup => "world_pickup",
        }
    }

    pub fn from_id(raw: &str) -> Option<RollSource> {
        let normalized = raw.trim().to_ascii_lowercase();
        Self::ALL.iter().copied().find(|s| s.id() == normalized)
    }

    pub fn index(&self) -> usize {
        Self::ALL.iter().position(|s| s == self).unwrap_or(0)
    }
}

/// Elemental tag imbued onto an item
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum CatalystAffinity {
    #[default]
    None,
    Water,
    Fire,
    Air,
    Earth,
}

impl CatalystAffinity {
    pub const ALL: [CatalystAffinity; 5] = [
        CatalystAffinity::None,
        CatalystAffinity::Water,
        CatalystAffinity::Fire,
        CatalystAffinity::Air,
        CatalystAffinity::Earth,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            CatalystAffinity::None => "NONE",
            CatalystAffinity::Water => "WATER",
            CatalystAffinity::Fire => "FIRE",
            CatalystAffinity::Air => "AIR",
            CatalystAffinity::Earth => "EARTH",
        }
    }

    pub fn from_id(raw: &str) -> Option<CatalystAffinity> {
        let normalized = raw.trim().to_ascii_uppercase();
        Self::ALL.iter().copied().find(|c| c.id() == normalized)
    }

    /// Word inserted into display names
    pub fn display_word(&self) -> &'static str {
        match self {
            CatalystAffinity::None => "",
            CatalystAffinity::Water => "Wave",
            CatalystAffinity::Fire => "Flame",
            CatalystAffinity::Air => "Gale",
            CatalystAffinity::Earth => "Stone",
        }
    }

    pub fn is_none(&self) -> bool {
        *self == CatalystAffinity::None
    }
}

/// Four coarse bonus rolls kept for the legacy summary display
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LegacyRolls {
    pub damage: f64,
    pub defence: f64,
    pub healing: f64,
    pub utility: f64,
}

/// Roll state persisted on an item instance
#[derive(Debug, Clone, PartialEq)]
pub struct ItemInstanceMetadata {
    pub version: i64,
    pub rarity: Rarity,
    pub catalyst: CatalystAffinity,
    pub source: RollSource,
    pub seed: u64,
    /// Cosmetic prefix word, empty when none was rolled
    pub prefix: String,
    pub legacy: LegacyRolls,
    pub flat_rolls: ItemizedStatBlock,
    pub percent_rolls: ItemizedStatBlock,
    pub dropped_penalty: f64,
    socket_capacity: u32,
    socketed_gems: Vec<String>,
    /// Persisted fields this build does not understand, carried through untouched
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Default for ItemInstanceMetadata {
    fn default() -> Self {
        Self {
            version: CURRENT_SCHEMA_VERSION,
            rarity: Rarity::Common,
            catalyst: CatalystAffinity::None,
            source: RollSource::Crafted,
            seed: 0,
            prefix: String::new(),
            legacy: LegacyRolls::default(),
            flat_rolls: ItemizedStatBlock::new(),
            percent_rolls: ItemizedStatBlock::new(),
            dropped_penalty: 0.0,
            socket_capacity: 0,
            socketed_gems: Vec::new(),
            extra: BTreeMap::new(),
        }
    }
}

impl ItemInstanceMetadata {
    pub fn new(rarity: Rarity, source: RollSource) -> Self {
        Self {
            rarity,
            source,
            ..Self::default()
        }
    }

    pub fn socket_capacity(&self) -> u32 {
        self.socket_capacity
    }

    /// Set capacity. Never drops below the number of gems already socketed.
    pub fn set_socket_capacity(&mut self, capacity: u32) {
        self.socket_capacity = capacity.max(self.socketed_count());
    }

    pub fn socketed_gems(&self) -> &[String] {
        &self.socketed_gems
    }

    pub fn socketed_count(&self) -> u32 {
        u32::try_from(self.socketed_gems.len()).unwrap_or(u32::MAX)
    }

    pub fn open_sockets(&self) -> u32 {
        self.socket_capacity.saturating_sub(self.socketed_count())
    }

    /// Append a gem if a socket is open
    pub fn push_socketed_gem(&mut self, gem_id: &str) -> bool {
        let gem_id = gem_id.trim();
        if gem_id.is_empty() || self.open_sockets() == 0 {
            return false;
        }
        self.socketed_gems.push(gem_id.to_ascii_lowercase());
        true
    }

    /// Remove and return every socketed gem, in socket order
    pub fn take_socketed_gems(&mut self) -> Vec<String> {
        std::mem::take(&mut self.socketed_gems)
    }

    /// Restore a persisted gem list. Capacity grows to fit rather than losing gems.
    pub fn restore_sockets(&mut self, capacity: u32, gems: Vec<String>) {
        self.socketed_gems = gems
            .into_iter()
            .map(|g| g.trim().to_ascii_lowercase())
            .filter(|g| !g.is_empty())
            .collect();
        self.socket_capacity = capacity.max(self.socketed_count());
    }

    /// Penalty clamped into [0, 1]
    pub fn clamped_dropped_penalty(&self) -> f64 {
        if self.dropped_penalty.is_finite() {
            self.dropped_penalty.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    pub fn is_current(&self) -> bool {
        self.version == CURRENT_SCHEMA_VERSION
    }
}

impl Hash for ItemInstanceMetadata {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.version.hash(state);
        self.rarity.hash(state);
        self.catalyst.hash(state);
        self.source.hash(state);
        self.seed.hash(state);
        self.prefix.hash(state);
        for roll in [self.legacy.damage, self.legacy.defence, self.legacy.healing, self.legacy.utility] {
            roll.to_bits().hash(state);
        }
        for (stat, value) in self.flat_rolls.iter() {
            stat.hash(state);
            value.to_bits().hash(state);
        }
        // separator so a flat roll can't alias a percent roll of the same stat
        0xFFu8.hash(state);
        for (stat, value) in self.percent_rolls.iter() {
            stat.hash(state);
            value.to_bits().hash(state);
        }
        self.dropped_penalty.to_bits().hash(state);
        self.socket_capacity.hash(state);
        self.socketed_gems.hash(state);
        for (key, value) in &self.extra {
            key.hash(state);
            value.to_string().hash(state);
        }
    }
}

/// Bring metadata up to the current schema.
///
/// Never lowers a version and never drops fields. Versions newer than this
/// build understands are returned unchanged.
pub fn migrate(metadata: &ItemInstanceMetadata) -> ItemInstanceMetadata {
    if metadata.version > CURRENT_SCHEMA_VERSION {
        return metadata.clone();
    }

    let mut migrated = metadata.clone();
    migrated.version = CURRENT_SCHEMA_VERSION;

    if !migrated.dropped_penalty.is_finite() {
        migrated.dropped_penalty = 0.0;
    }
    migrated.prefix = migrated.prefix.trim().to_string();

    // capacity must cover what is already socketed
    let gems = migrated.take_socketed_gems();
    let capacity = migrated.socket_capacity;
    migrated.restore_sockets(capacity, gems);

    migrated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::stats::ItemizedStat;

    fn sample() -> ItemInstanceMetadata {
        let mut meta = ItemInstanceMetadata::new(Rarity::Rare, RollSource::Dropped);
        meta.version = 1;
        meta.flat_rolls.set(ItemizedStat::PhysicalDamage, 3.5);
        meta.percent_rolls.set(ItemizedStat::AttackSpeed, 0.04);
        meta.restore_sockets(1, vec!["rock_gem_ruby".into()]);
        meta
    }

    #[test]
    fn test_migrate_raises_version() {
        let migrated = migrate(&sample());
        assert_eq!(migrated.version, CURRENT_SCHEMA_VERSION);
        assert_eq!(migrated.rarity, Rarity::Rare);
        assert_eq!(migrated.flat_rolls.get(ItemizedStat::PhysicalDamage), 3.5);
    }

    #[test]
    fn test_migrate_unset_version() {
        let mut meta = sample();
        meta.version = 0;
        assert_eq!(migrate(&meta).version, CURRENT_SCHEMA_VERSION);
        meta.version = -4;
        assert_eq!(migrate(&meta).version, CURRENT_SCHEMA_VERSION);
    }

    #[test]
    fn test_migrate_is_idempotent() {
        let mut meta = sample();
        meta.dropped_penalty = f64::NAN;
        meta.prefix = "  Keen ".into();
        let once = migrate(&meta);
        let twice = migrate(&once);
        assert_eq!(once, twice);
        assert_eq!(once.prefix, "Keen");
        assert_eq!(once.dropped_penalty, 0.0);
    }

    #[test]
    fn test_future_version_passes_through() {
        let mut meta = sample();
        meta.version = CURRENT_SCHEMA_VERSION + 7;
        meta.extra.insert("enchant_level".into(), serde_json::json!(4));
        let migrated = migrate(&meta);
        assert_eq!(migrated, meta);
    }

    #[test]
    fn test_socket_capacity_invariant() {
        let mut meta = ItemInstanceMetadata::default();
        meta.restore_sockets(0, vec!["rock_gem_a".into(), "rock_gem_b".into()]);
        assert_eq!(meta.socket_capacity(), 2);
        meta.set_socket_capacity(1);
        assert_eq!(meta.socket_capacity(), 2);
        assert!(!meta.push_socketed_gem("rock_gem_c"));
    }

    #[test]
    fn test_parse_enums_with_defaults() {
        assert_eq!(RollSource::from_id("MONSTER_DROP"), Some(RollSource::MonsterDrop));
        assert_eq!(RollSource::from_id("pickpocket"), None);
        assert_eq!(CatalystAffinity::from_id("fire"), Some(CatalystAffinity::Fire));
        assert_eq!(CatalystAffinity::from_id("lightning"), None);
    }
}
