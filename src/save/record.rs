//! Persisted metadata record
//!
//! The JSON shape item metadata is stored in. Enums are stored as raw
//! strings so unknown values decode to safe defaults instead of failing the
//! whole item, and fields this build doesn't know are carried through.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::items::{
    migrate, CatalystAffinity, ItemInstanceMetadata, ItemizedStat, ItemizedStatBlock, LegacyRolls, Rarity, RollSource,
};

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("invalid metadata record: {0}")]
    Json(#[from] serde_json::Error),
}

/// Wire form of `ItemInstanceMetadata`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataRecord {
    pub version: i64,
    pub rarity: String,
    pub catalyst: String,
    pub source: String,
    pub seed: u64,
    pub prefix: String,
    pub damage_roll: f64,
    pub defence_roll: f64,
    pub healing_roll: f64,
    pub utility_roll: f64,
    pub flat_rolls: BTreeMap<String, f64>,
    pub percent_rolls: BTreeMap<String, f64>,
    pub dropped_penalty: f64,
    pub socket_capacity: u32,
    pub socketed_gems: Vec<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

fn block_to_map(block: &ItemizedStatBlock) -> BTreeMap<String, f64> {
    block.iter().map(|(stat, value)| (stat.id().to_string(), value)).collect()
}

fn map_to_block(map: &BTreeMap<String, f64>) -> ItemizedStatBlock {
    let mut block = ItemizedStatBlock::new();
    for (id, value) in map {
        match ItemizedStat::from_id(id) {
            Some(stat) => block.set(stat, *value),
            None => log::warn!("Dropping roll for unknown stat '{}'", id),
        }
    }
    block
}

impl MetadataRecord {
    pub fn from_metadata(metadata: &ItemInstanceMetadata) -> Self {
        Self {
            version: metadata.version,
            rarity: metadata.rarity.id().to_string(),
            catalyst: metadata.catalyst.id().to_string(),
            source: metadata.source.id().to_string(),
            seed: metadata.seed,
            prefix: metadata.prefix.clone(),
            damage_roll: metadata.legacy.damage,
            defence_roll: metadata.legacy.defence,
            healing_roll: metadata.legacy.healing,
            utility_roll: metadata.legacy.utility,
            flat_rolls: block_to_map(&metadata.flat_rolls),
            percent_rolls: block_to_map(&metadata.percent_rolls),
            dropped_penalty: metadata.dropped_penalty,
            socket_capacity: metadata.socket_capacity(),
            socketed_gems: metadata.socketed_gems().to_vec(),
            extra: metadata.extra.clone(),
        }
    }

    /// Convert to metadata as stored, without migrating. Unknown enum values
    /// fall back to Common / no catalyst / crafted.
    pub fn to_metadata(&self) -> ItemInstanceMetadata {
        let mut metadata = ItemInstanceMetadata::new(
            Rarity::from_id(&self.rarity).unwrap_or_default(),
            RollSource::from_id(&self.source).unwrap_or_default(),
        );
        metadata.version = self.version;
        metadata.catalyst = CatalystAffinity::from_id(&self.catalyst).unwrap_or_default();
        metadata.seed = self.seed;
        metadata.prefix = self.prefix.clone();
        metadata.legacy = LegacyRolls {
            damage: self.damage_roll,
            defence: self.defence_roll,
            healing: self.healing_roll,
            utility: self.utility_roll,
        };
        metadata.flat_rolls = map_to_block(&self.flat_rolls);
        metadata.percent_rolls = map_to_block(&self.percent_rolls);
        metadata.dropped_penalty = self.dropped_penalty;
        metadata.restore_sockets(self.socket_capacity, self.socketed_gems.clone());
        metadata.extra = self.extra.clone();
        metadata
    }
}

/// Serialize metadata to its JSON record
pub fn encode_metadata(metadata: &ItemInstanceMetadata) -> Result<String, RecordError> {
    Ok(serde_json::to_string(&MetadataRecord::from_metadata(metadata))?)
}

/// Parse a JSON record and bring it up to the current schema
pub fn decode_metadata(json: &str) -> Result<ItemInstanceMetadata, RecordError> {
    let record: MetadataRecord = serde_json::from_str(json)?;
    Ok(migrate(&record.to_metadata()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::CURRENT_SCHEMA_VERSION;

    fn sample() -> ItemInstanceMetadata {
        let mut meta = ItemInstanceMetadata::new(Rarity::Legendary, RollSource::Dropped);
        meta.catalyst = CatalystAffinity::Earth;
        meta.seed = 99;
        meta.prefix = "Warding".to_string();
        meta.legacy.defence = 0.07;
        meta.flat_rolls.set(ItemizedStat::PhysicalDefence, 4.5);
        meta.percent_rolls.set(ItemizedStat::MaxHp, 0.08);
        meta.dropped_penalty = 0.10;
        meta.restore_sockets(2, vec!["rock_gem_diamond".to_string()]);
        meta
    }

    #[test]
    fn test_encode_decode() {
        let meta = sample();
        let json = encode_metadata(&meta).unwrap();
        assert!(json.contains("\"rarity\":\"LEGENDARY\""));
        assert_eq!(decode_metadata(&json).unwrap(), meta);
    }

    #[test]
    fn test_unknown_enums_default() {
        let json = r#"{"version":3,"rarity":"VOCATIONAL","catalyst":"SHADOW","source":"alchemy"}"#;
        let meta = decode_metadata(json).unwrap();
        assert_eq!(meta.rarity, Rarity::Common);
        assert_eq!(meta.catalyst, CatalystAffinity::None);
        assert_eq!(meta.source, RollSource::Crafted);
    }

    #[test]
    fn test_missing_fields_migrate() {
        let meta = decode_metadata(r#"{"rarity":"rare","socketed_gems":["Rock_Gem_Ruby"]}"#).unwrap();
        assert_eq!(meta.version, CURRENT_SCHEMA_VERSION);
        assert_eq!(meta.rarity, Rarity::Rare);
        assert_eq!(meta.socketed_gems(), ["rock_gem_ruby".to_string()]);
        assert_eq!(meta.socket_capacity(), 1);
    }

    #[test]
    fn test_unknown_fields_survive() {
        let json = r#"{"version":3,"rarity":"EPIC","enchant_level":4,"owner":{"name":"Tamsin"}}"#;
        let meta = decode_metadata(json).unwrap();
        assert_eq!(meta.extra.get("enchant_level"), Some(&serde_json::json!(4)));

        let again: serde_json::Value = serde_json::from_str(&encode_metadata(&meta).unwrap()).unwrap();
        assert_eq!(again["owner"]["name"], "Tamsin");
    }

    #[test]
    fn test_future_version_passes_through() {
        let json = format!(r#"{{"version":{},"rarity":"MYTHIC","dropped_penalty":0.25}}"#, CURRENT_SCHEMA_VERSION + 5);
        let meta = decode_metadata(&json).unwrap();
        assert_eq!(meta.version, CURRENT_SCHEMA_VERSION + 5);
        assert_eq!(meta.dropped_penalty, 0.25);
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(matches!(decode_metadata("{not json"), Err(RecordError::Json(_))));
    }
}
