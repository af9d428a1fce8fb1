//! Item system
//!
//! Closed item taxonomies, per-instance roll metadata, stacks and the
//! container and equipment views the engine runs against.

pub mod archetype;
pub mod eligibility;
pub mod equipment;
pub mod metadata;
pub mod naming;
pub mod rarity;
pub mod stack;
pub mod stats;

pub use archetype::Archetype;
pub use eligibility::is_eligible;
pub use equipment::{ArmorSlot, Equipment};
pub use metadata::{migrate, CatalystAffinity, ItemInstanceMetadata, LegacyRolls, RollSource, CURRENT_SCHEMA_VERSION};
pub use rarity::Rarity;
pub use stack::{ItemContainer, ItemStack, SlotContainer, Transaction};
pub use stats::{EffectiveItemStats, ItemizedStat, ItemizedStatBlock, StatFamily};

/// Identifier for an actor (player) owning equipment and pending rolls
pub type ActorId = u64;
