//! Configuration data
//!
//! Itemization tables loaded from external RON files, so balance can be
//! tuned without a rebuild.

pub mod config;
pub mod loader;

pub use config::{
    CatalystConfig, EligibilityConfig, GemSocketConfig, ItemizationConfig, PercentRollDefinition, PrefixConfig,
    PrefixWord, RarityModelConfig, RarityWeights, RollConstraint, RollTypeWeights, SpecializedStatsConfig,
};
pub use loader::{default_config_path, export_default_config, load_config, load_config_or_default, ConfigError, ConfigStore};
