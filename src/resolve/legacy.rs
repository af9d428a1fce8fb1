//! Legacy 4-axis summary
//!
//! The coarse damage/defence/healing/utility figures shown before specialized
//! stats existed. Still used for tooltips and the player snapshot totals.

use crate::items::{CatalystAffinity, EffectiveItemStats, ItemInstanceMetadata, Rarity};

/// Category base values before rarity and rolls
pub fn legacy_base(item_id: &str) -> EffectiveItemStats {
    let id = item_id.trim().to_ascii_lowercase();
    if id.is_empty() {
        return EffectiveItemStats::default();
    }

    if id.starts_with("weapon_") {
        EffectiveItemStats::new(12.0, 2.0, 0.0, 2.0)
    } else if id.starts_with("armor_") {
        EffectiveItemStats::new(1.0, 10.0, 0.0, 1.0)
    } else if id.starts_with("tool_") {
        EffectiveItemStats::new(3.0, 3.0, 0.0, 6.0)
    } else if id.contains("staff") || id.contains("wand") {
        EffectiveItemStats::new(8.0, 3.0, 6.0, 3.0)
    } else {
        EffectiveItemStats::new(1.0, 1.0, 0.0, 0.0)
    }
}

/// Legacy multiplier per rarity
pub fn legacy_rarity_multiplier(rarity: Rarity) -> f64 {
    match rarity {
        Rarity::Common => 1.00,
        Rarity::Uncommon => 1.10,
        Rarity::Rare => 1.22,
        Rarity::Epic => 1.36,
        Rarity::Legendary => 1.52,
        Rarity::Mythic => 1.70,
    }
}

/// Legacy summary of an item. Unrolled items get the bare category base.
pub fn resolve_legacy(item_id: &str, metadata: Option<&ItemInstanceMetadata>) -> EffectiveItemStats {
    let base = legacy_base(item_id);
    let Some(metadata) = metadata else {
        return base;
    };

    let mult = legacy_rarity_multiplier(metadata.rarity);
    let legacy = &metadata.legacy;
    let mut damage = base.damage * mult * (1.0 + legacy.damage);
    let mut defence = base.defence * mult * (1.0 + legacy.defence);
    let mut healing = base.healing * mult * (1.0 + legacy.healing);
    let mut utility = base.utility * mult * (1.0 + legacy.utility);

    match metadata.catalyst {
        CatalystAffinity::Water => {
            healing *= 1.20;
            utility *= 1.10;
        }
        CatalystAffinity::Fire => damage *= 1.20,
        CatalystAffinity::Earth => defence *= 1.20,
        CatalystAffinity::Air | CatalystAffinity::None => {}
    }

    let keep = 1.0 - metadata.clamped_dropped_penalty();
    EffectiveItemStats::new(damage * keep, defence * keep, healing * keep, utility * keep)
}
