//! Stat resolution
//!
//! Combines archetype base values, rolls, socketed gems, rarity and the
//! dropped-gear penalty into one sparse stat block. No randomness and no
//! side effects; the same inputs always give the same block.

use serde::{Deserialize, Serialize};

use crate::crafting::gems::socket_bonuses;
use crate::data::ItemizationConfig;
use crate::items::{
    is_eligible, Archetype, EffectiveItemStats, ItemInstanceMetadata, ItemStack, ItemizedStat, ItemizedStatBlock,
    Rarity,
};

/// Everything resolution produced for one item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemStatResolution {
    pub item_id: String,
    pub archetype: Archetype,
    pub rarity: Rarity,
    pub tier_scalar: f64,
    /// Archetype base after tier scaling
    pub base: ItemizedStatBlock,
    pub socket_bonus: ItemizedStatBlock,
    pub resolved: ItemizedStatBlock,
    pub base_summary: EffectiveItemStats,
    pub summary: EffectiveItemStats,
    pub rarity_scalar: f64,
    pub dropped_keep: f64,
}

impl ItemStatResolution {
    /// Resolution of an item that contributes nothing
    pub fn empty(item_id: &str) -> Self {
        Self {
            item_id: item_id.to_string(),
            archetype: Archetype::Generic,
            rarity: Rarity::Common,
            tier_scalar: 1.0,
            base: ItemizedStatBlock::new(),
            socket_bonus: ItemizedStatBlock::new(),
            resolved: ItemizedStatBlock::new(),
            base_summary: EffectiveItemStats::default(),
            summary: EffectiveItemStats::default(),
            rarity_scalar: 1.0,
            dropped_keep: 1.0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.resolved.is_empty()
    }
}

/// Archetype base block for an item, tier-scaled. Max HP never has a base value.
pub fn base_stats(item_id: &str, archetype: Archetype, config: &ItemizationConfig) -> ItemizedStatBlock {
    let tier_scalar = config.stats.tier_scalar(item_id);
    config
        .stats
        .base_stats_for(archetype)
        .into_iter()
        .filter(|(stat, _)| *stat != ItemizedStat::MaxHp)
        .map(|(stat, value)| (stat, value * tier_scalar))
        .collect()
}

/// Resolve rolled metadata against an item id
pub fn resolve(item_id: &str, metadata: &ItemInstanceMetadata, config: &ItemizationConfig) -> ItemStatResolution {
    let archetype = Archetype::resolve(item_id);
    let tier_scalar = config.stats.tier_scalar(item_id);
    let base = base_stats(item_id, archetype, config);
    let socket_bonus = socket_bonuses(&config.gem_sockets, archetype, metadata.socketed_gems());
    let rarity_scalar = config.stats.rarity_scalar(metadata.rarity);
    let dropped_keep = 1.0 - metadata.clamped_dropped_penalty();

    let mut resolved = ItemizedStatBlock::new();
    for stat in ItemizedStat::ALL {
        let additive = base.get(stat) + metadata.flat_rolls.get(stat) + socket_bonus.get(stat);
        let value = additive * (1.0 + metadata.percent_rolls.get(stat)) * rarity_scalar * dropped_keep;
        if value.is_finite() && value > 0.0 {
            resolved.set(stat, value);
        }
    }

    ItemStatResolution {
        item_id: item_id.to_string(),
        archetype,
        rarity: metadata.rarity,
        tier_scalar,
        base_summary: base.summary(),
        summary: resolved.summary(),
        base,
        socket_bonus,
        resolved,
        rarity_scalar,
        dropped_keep,
    }
}

/// Resolve a stack. Ineligible or empty stacks resolve to nothing; eligible
/// stacks that were never rolled resolve as plain Common items.
pub fn resolve_stack(stack: Option<&ItemStack>, config: &ItemizationConfig) -> ItemStatResolution {
    let Some(stack) = stack.filter(|s| !s.is_empty()) else {
        return ItemStatResolution::empty("");
    };
    if !is_eligible(&stack.item_id, &config.eligibility) {
        return ItemStatResolution::empty(&stack.item_id);
    }
    match &stack.metadata {
        Some(metadata) => resolve(&stack.item_id, metadata, config),
        None => resolve(&stack.item_id, &ItemInstanceMetadata::default(), config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::RollSource;

    fn rolled(source: RollSource, penalty: f64) -> ItemInstanceMetadata {
        let mut meta = ItemInstanceMetadata::new(Rarity::Epic, source);
        meta.flat_rolls.set(ItemizedStat::PhysicalDamage, 3.25);
        meta.flat_rolls.set(ItemizedStat::MaxHp, 14.0);
        meta.percent_rolls.set(ItemizedStat::PhysicalDamage, 0.12);
        meta.percent_rolls.set(ItemizedStat::AttackSpeed, 0.03);
        meta.flat_rolls.set(ItemizedStat::AttackSpeed, 0.04);
        meta.dropped_penalty = penalty;
        meta.restore_sockets(2, vec!["rock_gem_ruby".to_string()]);
        meta
    }

    #[test]
    fn test_resolve_is_pure() {
        let config = ItemizationConfig::default();
        let meta = rolled(RollSource::Crafted, 0.0);
        let a = resolve("weapon_sword_iron", &meta, &config);
        let b = resolve("weapon_sword_iron", &meta, &config);
        assert_eq!(a, b);
        for ((sa, va), (sb, vb)) in a.resolved.iter().zip(b.resolved.iter()) {
            assert_eq!(sa, sb);
            assert_eq!(va.to_bits(), vb.to_bits());
        }
    }

    #[test]
    fn test_dropped_penalty_scales_every_stat() {
        let config = ItemizationConfig::default();
        let crafted = resolve("weapon_sword_iron", &rolled(RollSource::Crafted, 0.0), &config);
        let dropped = resolve("weapon_sword_iron", &rolled(RollSource::Dropped, 0.10), &config);

        assert!((dropped.dropped_keep - 0.90).abs() < 1e-12);
        assert_eq!(crafted.resolved.len(), dropped.resolved.len());
        for (stat, value) in crafted.resolved.iter() {
            let ratio = dropped.resolved.get(stat) / value;
            assert!((ratio - 0.90).abs() < 1e-12, "{:?} ratio {}", stat, ratio);
        }
    }

    #[test]
    fn test_formula() {
        let config = ItemizationConfig::default();
        let meta = rolled(RollSource::Crafted, 0.0);
        let res = resolve("weapon_sword_iron", &meta, &config);

        let base = res.base.get(ItemizedStat::PhysicalDamage);
        let socket = res.socket_bonus.get(ItemizedStat::PhysicalDamage);
        assert_eq!(socket, 1.5);
        let expected = (base + 3.25 + socket) * 1.12 * res.rarity_scalar;
        assert!((res.resolved.get(ItemizedStat::PhysicalDamage) - expected).abs() < 1e-12);
        assert_eq!(res.rarity_scalar, 1.18);
    }

    #[test]
    fn test_max_hp_has_no_base() {
        let config = ItemizationConfig::default();
        let plain = resolve("armor_iron_chest", &ItemInstanceMetadata::default(), &config);
        assert_eq!(plain.base.get(ItemizedStat::MaxHp), 0.0);
        assert_eq!(plain.resolved.get(ItemizedStat::MaxHp), 0.0);

        let mut meta = rolled(RollSource::Crafted, 0.0);
        meta.restore_sockets(2, Vec::new());
        let res = resolve("armor_iron_chest", &meta, &config);
        assert!((res.resolved.get(ItemizedStat::MaxHp) - 14.0 * 1.18).abs() < 1e-9);
    }

    #[test]
    fn test_non_positive_values_are_omitted() {
        let config = ItemizationConfig::default();
        let mut meta = ItemInstanceMetadata::default();
        meta.flat_rolls.set(ItemizedStat::CastSpeed, -0.5);
        let res = resolve("weapon_sword_iron", &meta, &config);
        assert_eq!(res.resolved.get(ItemizedStat::CastSpeed), 0.0);
        assert!(res.resolved.iter().all(|(_, v)| v > 0.0));
    }

    #[test]
    fn test_resolve_stack_variants() {
        let config = ItemizationConfig::default();
        assert!(resolve_stack(None, &config).is_empty());
        assert!(resolve_stack(Some(&ItemStack::new("ingredient_bar_copper", 3)), &config).is_empty());

        let unrolled = resolve_stack(Some(&ItemStack::new("weapon_sword_iron", 1)), &config);
        assert_eq!(unrolled.rarity, Rarity::Common);
        assert_eq!(unrolled.resolved, unrolled.base);
    }
}
