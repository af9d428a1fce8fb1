//! Affixforge - item affix rolling and stat resolution
//!
//! Rolls rarity, prefixes and specialized stats onto gear instances, sockets
//! gems and imbues catalysts, and resolves it all into per-player stat blocks.

pub mod crafting;
pub mod data;
pub mod items;
pub mod resolve;
pub mod rolls;
pub mod save;

// Re-export commonly used types
pub use crafting::ActionOutcome;
pub use data::{ConfigStore, ItemizationConfig};
pub use items::{
    ActorId, Archetype, CatalystAffinity, Equipment, ItemContainer, ItemInstanceMetadata, ItemStack, ItemizedStat,
    ItemizedStatBlock, Rarity, RollSource,
};
pub use resolve::{resolve, resolve_stack, ItemStatResolution, PlayerItemizationStats, PlayerStatsCache};
pub use rolls::{roll_if_eligible, GenerationContext, GenerationDiagnostics, PendingRollCoordinator};
