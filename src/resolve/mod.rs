//! Stat resolution
//!
//! Per-item resolution, the legacy summary, the stat contract table and the
//! per-actor aggregation cache.

pub mod contracts;
pub mod legacy;
pub mod pipeline;
pub mod player;

pub use contracts::{stat_contract, stat_contracts, StatContract, StatPool};
pub use legacy::{legacy_base, resolve_legacy};
pub use pipeline::{base_stats, resolve, resolve_stack, ItemStatResolution};
pub use player::{aggregate, equipment_fingerprint, PlayerItemizationStats, PlayerStatsCache};
