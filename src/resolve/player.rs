//! Player stat aggregation
//!
//! Sums the resolved stats of everything an actor has equipped and derives
//! the clamped multipliers gameplay systems read. Snapshots are cached per
//! actor and reused until the equipment fingerprint changes.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use dashmap::DashMap;
use serde::Serialize;

use crate::data::ItemizationConfig;
use crate::items::{ActorId, Archetype, EffectiveItemStats, Equipment, ItemizedStat, ItemizedStatBlock, StatFamily};

use super::contracts::stat_contract;
use super::legacy::resolve_legacy;
use super::pipeline::resolve_stack;

/// Aggregated item stats of one actor
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlayerItemizationStats {
    pub fingerprint: u64,

    pub held_summary: EffectiveItemStats,
    pub armor_summary: EffectiveItemStats,
    pub total_summary: EffectiveItemStats,

    pub held_stats: ItemizedStatBlock,
    pub armor_stats: ItemizedStatBlock,
    /// Armor plus the defensive stats of a held shield
    pub defensive_stats: ItemizedStatBlock,
    pub total_stats: ItemizedStatBlock,

    pub physical_damage_multiplier: f64,
    pub magical_damage_multiplier: f64,
    pub physical_defence_reduction: f64,
    pub magical_defence_reduction: f64,
    pub physical_crit_chance: f64,
    pub magical_crit_chance: f64,
    pub crit_bonus_multiplier: f64,
    pub movement_speed_bonus: f64,
    pub attack_speed_bonus: f64,
    pub cast_speed_bonus: f64,
    pub healing_power_multiplier: f64,
    pub healing_crit_chance: f64,
    pub healing_crit_bonus: f64,
    pub mana_cost_reduction: f64,
    pub reflect_damage: f64,
    pub max_hp_bonus: f64,
    pub hp_regen: f64,
    pub mana_regen: f64,
    pub stamina_regen: f64,
    pub block_break_speed: f64,
    pub rare_drop_chance: f64,
    pub double_drop_chance: f64,
}

fn is_defensive(stat: ItemizedStat) -> bool {
    matches!(
        stat.family(),
        StatFamily::DefensePhysical | StatFamily::DefenseMagical | StatFamily::DefenseCore
    )
}

fn add_summary(a: EffectiveItemStats, b: EffectiveItemStats) -> EffectiveItemStats {
    EffectiveItemStats::new(a.damage + b.damage, a.defence + b.defence, a.healing + b.healing, a.utility + b.utility)
}

/// Hash of the held item and every armor slot, in slot order
pub fn equipment_fingerprint(equipment: &Equipment) -> u64 {
    let mut hasher = DefaultHasher::new();
    17u64.hash(&mut hasher);
    equipment.held().filter(|s| !s.is_empty()).hash(&mut hasher);
    for (slot, stack) in equipment.armor_slots() {
        slot.hash(&mut hasher);
        stack.filter(|s| !s.is_empty()).hash(&mut hasher);
    }
    hasher.finish()
}

/// Build a fresh snapshot from equipment
pub fn aggregate(equipment: &Equipment, config: &ItemizationConfig) -> PlayerItemizationStats {
    use ItemizedStat::*;

    let held = resolve_stack(equipment.held(), config);
    let held_summary = equipment
        .held()
        .filter(|_| !held.item_id.is_empty())
        .map(|s| resolve_legacy(&s.item_id, s.metadata.as_ref()))
        .unwrap_or_default();

    let mut armor_stats = ItemizedStatBlock::new();
    let mut armor_summary = EffectiveItemStats::default();
    for stack in equipment.armor_pieces() {
        let resolution = resolve_stack(Some(stack), config);
        if resolution.item_id.is_empty() {
            continue;
        }
        armor_stats.merge(&resolution.resolved);
        armor_summary = add_summary(armor_summary, resolve_legacy(&stack.item_id, stack.metadata.as_ref()));
    }

    let held_stats = held.resolved;
    let mut defensive_stats = armor_stats.clone();
    if held.archetype == Archetype::WeaponShield {
        for (stat, value) in held_stats.iter().filter(|(s, _)| is_defensive(*s)) {
            defensive_stats.add(stat, value);
        }
    }
    let mut total_stats = held_stats.clone();
    total_stats.merge(&armor_stats);

    let h = |s| held_stats.get(s);
    let d = |s| defensive_stats.get(s);
    let t = |s| total_stats.get(s);
    let clamp = |s, v| stat_contract(s).clamp(v);

    PlayerItemizationStats {
        fingerprint: equipment_fingerprint(equipment),
        held_summary,
        armor_summary,
        total_summary: add_summary(held_summary, armor_summary),

        physical_damage_multiplier: clamp(
            PhysicalDamage,
            1.0 + h(PhysicalDamage) * 0.02 + h(PhysicalPenetration) * 0.01 + h(AttackSpeed) * 0.20,
        ),
        magical_damage_multiplier: clamp(
            MagicalDamage,
            1.0 + h(MagicalDamage) * 0.02 + h(MagicalPenetration) * 0.01 + h(CastSpeed) * 0.20,
        ),
        physical_defence_reduction: clamp(
            PhysicalDefence,
            d(PhysicalDefence) * 0.004
                + d(BlockEfficiency) * 0.010
                + d(CritReduction) * 0.005
                + d(MaxHp) * 0.0008
                + d(HpRegen) * 0.020,
        ),
        magical_defence_reduction: clamp(
            MagicalDefence,
            d(MagicalDefence) * 0.004
                + d(BlockEfficiency) * 0.006
                + d(CritReduction) * 0.005
                + d(MaxHp) * 0.0008
                + d(HpRegen) * 0.020,
        ),
        physical_crit_chance: clamp(PhysicalCritChance, h(PhysicalCritChance)),
        magical_crit_chance: clamp(MagicalCritChance, h(MagicalCritChance)),
        crit_bonus_multiplier: clamp(CritBonus, 1.0 + h(CritBonus)),
        movement_speed_bonus: clamp(MovementSpeed, t(MovementSpeed)),
        attack_speed_bonus: clamp(AttackSpeed, t(AttackSpeed)),
        cast_speed_bonus: clamp(CastSpeed, t(CastSpeed)),
        healing_power_multiplier: clamp(HealingPower, 1.0 + t(HealingPower) * 0.05),
        healing_crit_chance: clamp(HealingCritChance, t(HealingCritChance)),
        healing_crit_bonus: clamp(HealingCritBonus, t(HealingCritBonus)),
        mana_cost_reduction: clamp(ManaCostReduction, t(ManaCostReduction)),
        reflect_damage: clamp(ReflectDamage, d(ReflectDamage)),
        max_hp_bonus: clamp(MaxHp, t(MaxHp)),
        hp_regen: clamp(HpRegen, t(HpRegen)),
        mana_regen: clamp(ManaRegen, t(ManaRegen)),
        stamina_regen: clamp(StaminaRegen, t(StaminaRegen)),
        block_break_speed: clamp(BlockBreakSpeed, h(BlockBreakSpeed)),
        rare_drop_chance: clamp(RareDropChance, h(RareDropChance)),
        double_drop_chance: clamp(DoubleDropChance, h(DoubleDropChance)),

        held_stats,
        armor_stats,
        defensive_stats,
        total_stats,
    }
}

/// Per-actor snapshot cache, safe to share between threads
#[derive(Debug, Default)]
pub struct PlayerStatsCache {
    entries: DashMap<ActorId, Arc<PlayerItemizationStats>>,
}

impl PlayerStatsCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached snapshot if the equipment is unchanged, otherwise a fresh one
    pub fn get_or_recompute(
        &self,
        actor: ActorId,
        equipment: &Equipment,
        config: &ItemizationConfig,
    ) -> Arc<PlayerItemizationStats> {
        let fingerprint = equipment_fingerprint(equipment);
        if let Some(cached) = self.entries.get(&actor) {
            if cached.fingerprint == fingerprint {
                return Arc::clone(cached.value());
            }
        }

        let stats = Arc::new(aggregate(equipment, config));
        self.entries.insert(actor, Arc::clone(&stats));

        let message = format!(
            "[Stats] recompute actor={} pDmgX={:.3} mDmgX={:.3} pDefRed={:.3} mDefRed={:.3} move={:.3} maxHp={:.3}",
            actor,
            stats.physical_damage_multiplier,
            stats.magical_damage_multiplier,
            stats.physical_defence_reduction,
            stats.magical_defence_reduction,
            stats.movement_speed_bonus,
            stats.max_hp_bonus
        );
        if config.debug_logging {
            log::info!("{}", message);
        } else {
            log::debug!("{}", message);
        }
        stats
    }

    /// Cached snapshot without recomputing
    pub fn get(&self, actor: ActorId) -> Option<Arc<PlayerItemizationStats>> {
        self.entries.get(&actor).map(|e| Arc::clone(e.value()))
    }

    /// Forget one actor
    pub fn clear(&self, actor: ActorId) {
        self.entries.remove(&actor);
    }

    /// Forget everything, e.g. after a config reload
    pub fn clear_all(&self) {
        self.entries.clear();
    }

    /// Keep only actors the predicate accepts
    pub fn retain(&self, mut keep: impl FnMut(ActorId) -> bool) {
        self.entries.retain(|actor, _| keep(*actor));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::{ArmorSlot, ItemInstanceMetadata, ItemStack, Rarity, RollSource};

    fn rolled(item_id: &str, stats: &[(ItemizedStat, f64)]) -> ItemStack {
        let mut meta = ItemInstanceMetadata::new(Rarity::Common, RollSource::Crafted);
        for (stat, value) in stats {
            meta.flat_rolls.set(*stat, *value);
        }
        ItemStack::new(item_id, 1).with_metadata(meta)
    }

    fn kitted() -> Equipment {
        let mut equipment = Equipment::new();
        equipment.hold(Some(rolled("weapon_sword_iron", &[(ItemizedStat::PhysicalCritChance, 0.05)])));
        equipment.equip(ArmorSlot::Chest, rolled("armor_iron_chest", &[(ItemizedStat::MaxHp, 20.0)]));
        equipment
    }

    #[test]
    fn test_cache_reuses_snapshot() {
        let config = ItemizationConfig::default();
        let cache = PlayerStatsCache::new();
        let equipment = kitted();

        let a = cache.get_or_recompute(1, &equipment, &config);
        let b = cache.get_or_recompute(1, &equipment, &config);
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_cache_invalidates_on_change() {
        let config = ItemizationConfig::default();
        let cache = PlayerStatsCache::new();
        let mut equipment = kitted();
        let a = cache.get_or_recompute(1, &equipment, &config);

        let mut sword = equipment.held().cloned().unwrap();
        sword.quantity = 2;
        equipment.hold(Some(sword.clone()));
        let b = cache.get_or_recompute(1, &equipment, &config);
        assert!(!Arc::ptr_eq(&a, &b));

        let mut meta = sword.metadata.clone().unwrap();
        meta.prefix = "Keen".to_string();
        equipment.hold(Some(sword.with_metadata(meta)));
        let c = cache.get_or_recompute(1, &equipment, &config);
        assert!(!Arc::ptr_eq(&b, &c));
        assert_ne!(b.fingerprint, c.fingerprint);
    }

    #[test]
    fn test_fingerprint_depends_on_slot() {
        let mut a = Equipment::new();
        a.equip(ArmorSlot::Head, ItemStack::new("armor_iron_head", 1));
        let mut b = Equipment::new();
        b.equip(ArmorSlot::Legs, ItemStack::new("armor_iron_head", 1));
        assert_ne!(equipment_fingerprint(&a), equipment_fingerprint(&b));
        assert_eq!(equipment_fingerprint(&a), equipment_fingerprint(&a.clone()));
    }

    #[test]
    fn test_aggregate_pools() {
        let config = ItemizationConfig::default();
        let stats = aggregate(&kitted(), &config);
        // base crit from the sword plus the rolled 0.05
        assert_eq!(stats.physical_crit_chance, stats.held_stats.get(ItemizedStat::PhysicalCritChance));
        assert!(stats.physical_crit_chance > 0.05);
        assert!((stats.max_hp_bonus - 20.0).abs() < 1e-9);
        assert!(stats.physical_damage_multiplier > 1.0);
        assert!(stats.physical_defence_reduction > 0.0);
        assert_eq!(stats.armor_stats.get(ItemizedStat::PhysicalCritChance), 0.0);
    }

    #[test]
    fn test_derived_values_are_clamped() {
        let config = ItemizationConfig::default();
        let mut equipment = Equipment::new();
        equipment.hold(Some(rolled(
            "weapon_sword_iron",
            &[
                (ItemizedStat::PhysicalDamage, 1000.0),
                (ItemizedStat::PhysicalCritChance, 5.0),
                (ItemizedStat::MovementSpeed, 3.0),
            ],
        )));
        equipment.equip(ArmorSlot::Chest, rolled("armor_iron_chest", &[(ItemizedStat::PhysicalDefence, 1000.0)]));

        let stats = aggregate(&equipment, &config);
        assert_eq!(stats.physical_damage_multiplier, 4.0);
        assert_eq!(stats.physical_crit_chance, 0.60);
        assert_eq!(stats.movement_speed_bonus, 0.80);
        assert_eq!(stats.physical_defence_reduction, 0.70);
        let crit_bonus = stats.held_stats.get(ItemizedStat::CritBonus);
        assert!((stats.crit_bonus_multiplier - (1.0 + crit_bonus)).abs() < 1e-12);
    }

    #[test]
    fn test_armor_attack_speed_counts_toward_bonus() {
        let config = ItemizationConfig::default();
        let mut equipment = Equipment::new();
        equipment.equip(
            ArmorSlot::Chest,
            rolled("armor_leather_chest", &[(ItemizedStat::AttackSpeed, 0.1), (ItemizedStat::CastSpeed, 0.05)]),
        );

        let stats = aggregate(&equipment, &config);
        assert!(stats.attack_speed_bonus >= 0.1 - 1e-12);
        assert_eq!(stats.attack_speed_bonus, stats.total_stats.get(ItemizedStat::AttackSpeed));
        assert!(stats.cast_speed_bonus >= 0.05 - 1e-12);
        // the damage multipliers only read the held item
        assert_eq!(stats.physical_damage_multiplier, 1.0);
        assert_eq!(stats.magical_damage_multiplier, 1.0);
    }

    #[test]
    fn test_held_shield_joins_defensive_pool() {
        let config = ItemizationConfig::default();
        let mut equipment = Equipment::new();
        equipment.hold(Some(rolled(
            "weapon_shield_iron",
            &[(ItemizedStat::PhysicalDefence, 10.0), (ItemizedStat::BlockEfficiency, 0.05)],
        )));
        let with_shield = aggregate(&equipment, &config);
        assert!(with_shield.defensive_stats.get(ItemizedStat::BlockEfficiency) > 0.0);
        assert!(with_shield.physical_defence_reduction > 0.0);

        equipment.hold(Some(rolled("weapon_sword_iron", &[(ItemizedStat::PhysicalDefence, 10.0)])));
        let with_sword = aggregate(&equipment, &config);
        assert_eq!(with_sword.defensive_stats.get(ItemizedStat::PhysicalDefence), 0.0);
    }

    #[test]
    fn test_clear_and_retain() {
        let config = ItemizationConfig::default();
        let cache = PlayerStatsCache::new();
        let equipment = kitted();
        for actor in 1..=4 {
            cache.get_or_recompute(actor, &equipment, &config);
        }
        cache.clear(1);
        assert!(cache.get(1).is_none());
        cache.retain(|actor| actor % 2 == 0);
        assert_eq!(cache.len(), 2);
        assert!(cache.get(2).is_some());
        assert!(cache.get(3).is_none());
    }
}
