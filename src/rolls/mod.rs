//! Roll generation
//!
//! Rarity sampling, first-time stat rolls, diagnostics counters and the
//! pending craft-roll coordinator.

pub mod coordinator;
pub mod diagnostics;
pub mod generation;
pub mod rarity_model;

pub use coordinator::{PendingCraftRoll, PendingRollCoordinator};
pub use diagnostics::{DiagnosticsSnapshot, GenerationDiagnostics, SourceSnapshot};
pub use generation::{
    create_crafted_item, create_dropped_item, roll_if_eligible, roll_new_instance, roll_prefix, roll_stat_pool,
    StatPoolRoll, DROPPED_GEAR_STAT_PENALTY, LEGACY_ROLL_MAX,
};
pub use rarity_model::{roll_rarity, GenerationContext, RarityRollResult, RarityRollTrace};
