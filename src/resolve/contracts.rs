//! Stat contracts
//!
//! What each specialized stat means to the gameplay systems that consume it,
//! which equipment pool feeds it, and the range its derived value is clamped to.

use serde::Serialize;

use crate::items::ItemizedStat;

/// Which equipped items feed a stat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum StatPool {
    /// The held item only
    Held,
    /// Armor pieces plus a held shield
    Defensive,
    /// Everything equipped
    Total,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StatContract {
    pub stat: ItemizedStat,
    pub pool: StatPool,
    /// Runtime effect driven by the stat
    pub effect: &'static str,
    /// Derived value the consumer computes
    pub formula: &'static str,
    pub min: f64,
    pub max: f64,
}

impl StatContract {
    /// Clamp a derived value into this contract's range. NaN maps to the minimum.
    pub fn clamp(&self, value: f64) -> f64 {
        if value.is_nan() {
            return self.min;
        }
        value.clamp(self.min, self.max)
    }
}

const DAMAGE_MULT: (f64, f64) = (0.20, 4.00);
const DEFENCE_REDUCTION: (f64, f64) = (0.0, 0.70);
const CRIT_CHANCE: (f64, f64) = (0.0, 0.60);
const SPEED: (f64, f64) = (-0.20, 0.80);
const UNBOUNDED: (f64, f64) = (0.0, f64::INFINITY);

/// Contract for one stat
pub fn stat_contract(stat: ItemizedStat) -> StatContract {
    use ItemizedStat::*;
    use StatPool::*;

    let (pool, effect, formula, (min, max)) = match stat {
        PhysicalDamage => (
            Held,
            "physical damage multiplier",
            "1 + physical_damage*0.02 + physical_penetration*0.01 + attack_speed*0.20",
            DAMAGE_MULT,
        ),
        MagicalDamage => (
            Held,
            "magical damage multiplier",
            "1 + magical_damage*0.02 + magical_penetration*0.01 + cast_speed*0.20",
            DAMAGE_MULT,
        ),
        PhysicalPenetration => (Held, "physical damage multiplier", "physical_penetration*0.01", DAMAGE_MULT),
        MagicalPenetration => (Held, "magical damage multiplier", "magical_penetration*0.01", DAMAGE_MULT),
        PhysicalCritChance => (Held, "physical crit chance bonus", "physical_crit_chance", CRIT_CHANCE),
        MagicalCritChance => (Held, "magical crit chance bonus", "magical_crit_chance", CRIT_CHANCE),
        CritBonus => (Held, "crit damage multiplier", "1 + crit_bonus", (1.0, 4.0)),
        PhysicalDefence => (
            Defensive,
            "physical damage reduction",
            "physical_defence*0.004 + block_efficiency*0.010 + crit_reduction*0.005 + max_hp*0.0008 + hp_regen*0.020",
            DEFENCE_REDUCTION,
        ),
        MagicalDefence => (
            Defensive,
            "magical damage reduction",
            "magical_defence*0.004 + block_efficiency*0.006 + crit_reduction*0.005 + max_hp*0.0008 + hp_regen*0.020",
            DEFENCE_REDUCTION,
        ),
        BlockEfficiency => (Defensive, "damage reduction", "block_efficiency*0.010 (magical *0.006)", DEFENCE_REDUCTION),
        CritReduction => (Defensive, "damage reduction", "crit_reduction*0.005", DEFENCE_REDUCTION),
        ReflectDamage => (Defensive, "fraction of melee damage reflected", "reflect_damage", (0.0, 0.75)),
        MaxHp => (Total, "flat max HP bonus", "max_hp", UNBOUNDED),
        HpRegen => (Total, "HP regenerated per second", "hp_regen", UNBOUNDED),
        HealingPower => (Total, "healing multiplier", "1 + healing_power*0.05", (1.0, 3.0)),
        HealingCritChance => (Total, "healing crit chance", "healing_crit_chance", CRIT_CHANCE),
        HealingCritBonus => (Total, "extra healing on crit", "healing_crit_bonus", (0.0, 2.0)),
        ManaCostReduction => (Total, "mana cost reduction", "mana_cost_reduction", (0.0, 0.75)),
        ManaRegen => (Total, "mana regenerated per second", "mana_regen", UNBOUNDED),
        StaminaRegen => (Total, "stamina regenerated per second", "stamina_regen", UNBOUNDED),
        MovementSpeed => (Total, "movement speed bonus", "movement_speed", SPEED),
        AttackSpeed => (Total, "attack speed bonus", "attack_speed", SPEED),
        CastSpeed => (Total, "cast speed bonus", "cast_speed", SPEED),
        BlockBreakSpeed => (Held, "block break speed bonus", "block_break_speed", (0.0, 1.5)),
        RareDropChance => (Held, "chance to roll on the rare drop table", "rare_drop_chance", (0.0, 0.75)),
        DoubleDropChance => (Held, "chance to double a gathered drop", "double_drop_chance", CRIT_CHANCE),
    };

    StatContract {
        stat,
        pool,
        effect,
        formula,
        min,
        max,
    }
}

/// The full contract table, in stat order
pub fn stat_contracts() -> Vec<StatContract> {
    ItemizedStat::ALL.iter().map(|s| stat_contract(*s)).collect()
}
