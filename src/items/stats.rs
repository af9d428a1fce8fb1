//! Specialized stats
//!
//! The closed stat taxonomy, the sparse per-stat block and the 4-axis summary
//! projection used for simple display.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::archetype::Archetype;

/// Magnitudes at or below this are treated as zero and pruned
pub const STAT_EPSILON: f64 = 1e-9;

/// Grouping used by display and by the summary projection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatFamily {
    OffensePhysical,
    OffenseMagical,
    DefensePhysical,
    DefenseMagical,
    DefenseCore,
    Healing,
    Utility,
}

/// A single specialized stat
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ItemizedStat {
    PhysicalDamage,
    MagicalDamage,
    PhysicalCritChance,
    MagicalCritChance,
    CritBonus,
    PhysicalPenetration,
    MagicalPenetration,
    PhysicalDefence,
    MagicalDefence,
    BlockEfficiency,
    ReflectDamage,
    CritReduction,
    MaxHp,
    HpRegen,
    HealingPower,
    HealingCritChance,
    HealingCritBonus,
    ManaCostReduction,
    ManaRegen,
    StaminaRegen,
    MovementSpeed,
    AttackSpeed,
    CastSpeed,
    BlockBreakSpeed,
    RareDropChance,
    DoubleDropChance,
}

impl ItemizedStat {
    pub const ALL: [ItemizedStat; 26] = [
        ItemizedStat::PhysicalDamage,
        ItemizedStat::MagicalDamage,
        ItemizedStat::PhysicalCritChance,
        ItemizedStat::MagicalCritChance,
        ItemizedStat::CritBonus,
        ItemizedStat::PhysicalPenetration,
        ItemizedStat::MagicalPenetration,
        ItemizedStat::PhysicalDefence,
        ItemizedStat::MagicalDefence,
        ItemizedStat::BlockEfficiency,
        ItemizedStat::ReflectDamage,
        ItemizedStat::CritReduction,
        ItemizedStat::MaxHp,
        ItemizedStat::HpRegen,
        ItemizedStat::HealingPower,
        ItemizedStat::HealingCritChance,
        ItemizedStat::HealingCritBonus,
        ItemizedStat::ManaCostReduction,
        ItemizedStat::ManaRegen,
        ItemizedStat::StaminaRegen,
        ItemizedStat::MovementSpeed,
        ItemizedStat::AttackSpeed,
        ItemizedStat::CastSpeed,
        ItemizedStat::BlockBreakSpeed,
        ItemizedStat::RareDropChance,
        ItemizedStat::DoubleDropChance,
    ];

    /// Persisted / configured id
    pub fn id(&self) -> &'static str {
        match self {
            ItemizedStat::PhysicalDamage => "physical_damage",
            ItemizedStat::MagicalDamage => "magical_damage",
            ItemizedStat::PhysicalCritChance => "physical_crit_chance",
            ItemizedStat::MagicalCritChance => "magical_crit_chance",
            ItemizedStat::CritBonus => "crit_bonus",
            ItemizedStat::PhysicalPenetration => "physical_penetration",
            ItemizedStat::MagicalPenetration => "magical_penetration",
            ItemizedStat::PhysicalDefence => "physical_defence",
            ItemizedStat::MagicalDefence => "magical_defence",
            ItemizedStat::BlockEfficiency => "block_efficiency",
            ItemizedStat::ReflectDamage => "reflect_damage",
            ItemizedStat::CritReduction => "crit_reduction",
            ItemizedStat::MaxHp => "max_hp",
            ItemizedStat::HpRegen => "hp_regen",
            ItemizedStat::HealingPower => "healing_power",
            ItemizedStat::HealingCritChance => "healing_crit_chance",
            ItemizedStat::HealingCritBonus => "healing_crit_bonus",
            ItemizedStat::ManaCostReduction => "mana_cost_reduction",
            ItemizedStat::ManaRegen => "mana_regen",
            ItemizedStat::StaminaRegen => "stamina_regen",
            ItemizedStat::MovementSpeed => "movement_speed",
            ItemizedStat::AttackSpeed => "attack_speed",
            ItemizedStat::CastSpeed => "cast_speed",
            ItemizedStat::BlockBreakSpeed => "block_break_speed",
            ItemizedStat::RareDropChance => "rare_drop_chance",
            ItemizedStat::DoubleDropChance => "double_drop_chance",
        }
    }

    pub fn from_id(raw: &str) -> Option<ItemizedStat> {
        let normalized = raw.trim().to_ascii_lowercase();
        Self::ALL.iter().copied().find(|s| s.id() == normalized)
    }

    pub fn family(&self) -> StatFamily {
        use ItemizedStat::*;
        match self {
            PhysicalDamage | PhysicalCritChance | CritBonus | PhysicalPenetration => StatFamily::OffensePhysical,
            MagicalDamage | MagicalCritChance | MagicalPenetration => StatFamily::OffenseMagical,
            PhysicalDefence => StatFamily::DefensePhysical,
            MagicalDefence => StatFamily::DefenseMagical,
            BlockEfficiency | ReflectDamage | CritReduction | MaxHp | HpRegen => StatFamily::DefenseCore,
            HealingPower | HealingCritChance | HealingCritBonus | ManaCostReduction => StatFamily::Healing,
            ManaRegen | StaminaRegen | MovementSpeed | AttackSpeed | CastSpeed | BlockBreakSpeed
            | RareDropChance | DoubleDropChance => StatFamily::Utility,
        }
    }

    /// Whether the stat is shown as a percentage
    pub fn is_percent_primary(&self) -> bool {
        use ItemizedStat::*;
        !matches!(
            self,
            PhysicalDamage | MagicalDamage | PhysicalDefence | MagicalDefence | MaxHp | HpRegen | HealingPower
                | ManaRegen | StaminaRegen
        )
    }

    /// Fallback magnitude for flat rolls when an archetype table has no entry
    pub fn flat_reference(&self) -> f64 {
        use ItemizedStat::*;
        match self {
            PhysicalDamage | MagicalDamage => 8.0,
            PhysicalCritChance | MagicalCritChance => 0.05,
            CritBonus => 0.15,
            PhysicalPenetration | MagicalPenetration => 0.06,
            PhysicalDefence | MagicalDefence => 6.0,
            BlockEfficiency => 0.06,
            ReflectDamage => 0.04,
            CritReduction => 0.05,
            MaxHp => 10.0,
            HpRegen => 0.08,
            HealingPower => 0.10,
            HealingCritChance => 0.05,
            HealingCritBonus => 0.10,
            ManaCostReduction => 0.06,
            ManaRegen | StaminaRegen => 0.08,
            MovementSpeed | AttackSpeed | CastSpeed => 0.04,
            BlockBreakSpeed => 0.08,
            RareDropChance | DoubleDropChance => 0.03,
        }
    }

    /// Whether items of this archetype may carry the stat
    pub fn allowed_for(&self, archetype: Archetype) -> bool {
        match self {
            ItemizedStat::CritReduction => archetype.is_armor(),
            ItemizedStat::BlockEfficiency => archetype == Archetype::WeaponShield,
            ItemizedStat::BlockBreakSpeed | ItemizedStat::RareDropChance | ItemizedStat::DoubleDropChance => {
                archetype == Archetype::Tool
            }
            _ => true,
        }
    }
}

/// Sparse stat -> value map. Near-zero entries are pruned on write so two
/// blocks with the same effective content compare equal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemizedStatBlock {
    values: BTreeMap<ItemizedStat, f64>,
}

impl ItemizedStatBlock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, stat: ItemizedStat) -> f64 {
        self.values.get(&stat).copied().unwrap_or(0.0)
    }

    /// Set a value, dropping it if it is effectively zero or not finite
    pub fn set(&mut self, stat: ItemizedStat, value: f64) {
        if !value.is_finite() || value.abs() <= STAT_EPSILON {
            self.values.remove(&stat);
        } else {
            self.values.insert(stat, value);
        }
    }

    pub fn add(&mut self, stat: ItemizedStat, delta: f64) {
        let current = self.get(stat);
        self.set(stat, current + delta);
    }

    /// Add every entry of another block
    pub fn merge(&mut self, other: &ItemizedStatBlock) {
        for (stat, value) in other.iter() {
            self.add(stat, value);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (ItemizedStat, f64)> + '_ {
        self.values.iter().map(|(s, v)| (*s, *v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Collapse into the display summary
    pub fn summary(&self) -> EffectiveItemStats {
        EffectiveItemStats::project(self)
    }
}

impl FromIterator<(ItemizedStat, f64)> for ItemizedStatBlock {
    fn from_iter<I: IntoIterator<Item = (ItemizedStat, f64)>>(iter: I) -> Self {
        let mut block = ItemizedStatBlock::new();
        for (stat, value) in iter {
            block.add(stat, value);
        }
        block
    }
}

/// Four-axis display summary. Gameplay code reads the sparse block instead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EffectiveItemStats {
    pub damage: f64,
    pub defence: f64,
    pub healing: f64,
    pub utility: f64,
}

impl EffectiveItemStats {
    pub fn new(damage: f64, defence: f64, healing: f64, utility: f64) -> Self {
        Self { damage, defence, healing, utility }
    }

    /// Fixed weighted projection of a stat block onto the four axes
    pub fn project(block: &ItemizedStatBlock) -> Self {
        use ItemizedStat::*;
        let v = |s| block.get(s);

        let damage = v(PhysicalDamage)
            + v(MagicalDamage)
            + 4.0 * (v(PhysicalPenetration) + v(MagicalPenetration))
            + 2.0 * (v(CritBonus) + v(PhysicalCritChance) + v(MagicalCritChance));

        let defence = v(PhysicalDefence)
            + v(MagicalDefence)
            + 0.1 * v(MaxHp)
            + v(HpRegen)
            + 4.0 * (v(BlockEfficiency) + v(ReflectDamage) + v(CritReduction));

        let healing = v(HealingPower)
            + 4.0 * (v(HealingCritChance) + v(HealingCritBonus) + v(ManaCostReduction));

        let utility = v(ManaRegen)
            + v(StaminaRegen)
            + 4.0
                * (v(MovementSpeed)
                    + v(AttackSpeed)
                    + v(CastSpeed)
                    + v(BlockBreakSpeed)
                    + v(RareDropChance)
                    + v(DoubleDropChance));

        Self { damage, defence, healing, utility }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_prunes_near_zero() {
        let mut block = ItemizedStatBlock::new();
        block.set(ItemizedStat::MaxHp, 5.0);
        block.set(ItemizedStat::ManaRegen, 1e-12);
        block.set(ItemizedStat::CastSpeed, f64::NAN);
        assert_eq!(block.len(), 1);

        block.add(ItemizedStat::MaxHp, -5.0);
        assert!(block.is_empty());
        assert_eq!(block, ItemizedStatBlock::new());
    }

    #[test]
    fn test_stat_ids_parse() {
        for stat in ItemizedStat::ALL {
            assert_eq!(ItemizedStat::from_id(stat.id()), Some(stat));
        }
        assert_eq!(ItemizedStat::from_id(" Physical_Damage "), Some(ItemizedStat::PhysicalDamage));
        assert_eq!(ItemizedStat::from_id("strength"), None);
    }

    #[test]
    fn test_archetype_restrictions() {
        assert!(ItemizedStat::BlockEfficiency.allowed_for(Archetype::WeaponShield));
        assert!(!ItemizedStat::BlockEfficiency.allowed_for(Archetype::WeaponMelee));
        assert!(ItemizedStat::CritReduction.allowed_for(Archetype::ArmorLight));
        assert!(!ItemizedStat::CritReduction.allowed_for(Archetype::Tool));
        assert!(ItemizedStat::RareDropChance.allowed_for(Archetype::Tool));
        assert!(!ItemizedStat::RareDropChance.allowed_for(Archetype::ArmorHeavy));
    }

    #[test]
    fn test_damage_projection() {
        let block: ItemizedStatBlock = [
            (ItemizedStat::PhysicalDamage, 10.0),
            (ItemizedStat::PhysicalPenetration, 0.5),
            (ItemizedStat::CritBonus, 0.25),
        ]
        .into_iter()
        .collect();

        let summary = block.summary();
        assert!((summary.damage - (10.0 + 2.0 + 0.5)).abs() < 1e-9);
        assert_eq!(summary.healing, 0.0);
    }
}
