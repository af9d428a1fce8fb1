//! Itemization configuration tables
//!
//! Every numeric table the engine reads. Loaded from RON, every section falls
//! back to the compile-time defaults below when missing.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::items::{Archetype, CatalystAffinity, ItemizedStat, Rarity, RollSource};

/// Root configuration snapshot passed into every engine call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemizationConfig {
    /// Log every roll, queue and apply at info level
    pub debug_logging: bool,
    pub eligibility: EligibilityConfig,
    pub rarity_model: RarityModelConfig,
    pub stats: SpecializedStatsConfig,
    pub prefixes: PrefixConfig,
    pub gem_sockets: GemSocketConfig,
    pub catalyst: CatalystConfig,
}

impl Default for ItemizationConfig {
    fn default() -> Self {
        Self {
            debug_logging: false,
            eligibility: EligibilityConfig::default(),
            rarity_model: RarityModelConfig::default(),
            stats: SpecializedStatsConfig::default(),
            prefixes: PrefixConfig::default(),
            gem_sockets: GemSocketConfig::default(),
            catalyst: CatalystConfig::default(),
        }
    }
}

// ============================================================================
// Eligibility
// ============================================================================

/// Which item ids receive rolls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EligibilityConfig {
    pub eligible_prefixes: Vec<String>,
    pub excluded_prefixes: Vec<String>,
    /// Exact ids that never roll
    pub excluded_item_ids: Vec<String>,
}

impl Default for EligibilityConfig {
    fn default() -> Self {
        Self {
            eligible_prefixes: strings(&["weapon_", "armor_", "tool_"]),
            excluded_prefixes: strings(&[
                "weapon_bomb_",
                "weapon_grenade_",
                "weapon_poison_flask_",
                "weapon_dev_",
                "armor_dev_",
                "tool_dev_",
                "test_",
                "special_",
            ]),
            excluded_item_ids: Vec::new(),
        }
    }
}

// ============================================================================
// Rarity model
// ============================================================================

/// Six-tier weight vector, Common first
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RarityWeights {
    pub common: f64,
    pub uncommon: f64,
    pub rare: f64,
    pub epic: f64,
    pub legendary: f64,
    pub mythic: f64,
}

impl RarityWeights {
    pub const fn new(common: f64, uncommon: f64, rare: f64, epic: f64, legendary: f64, mythic: f64) -> Self {
        Self { common, uncommon, rare, epic, legendary, mythic }
    }

    /// Weights in tier order, negatives treated as zero
    pub fn to_array(&self) -> [f64; Rarity::COUNT] {
        [self.common, self.uncommon, self.rare, self.epic, self.legendary, self.mythic]
            .map(|w| if w.is_finite() { w.max(0.0) } else { 0.0 })
    }
}

impl Default for RarityWeights {
    fn default() -> Self {
        CRAFTED_RARITY_WEIGHTS
    }
}

pub const CRAFTED_RARITY_WEIGHTS: RarityWeights = RarityWeights::new(0.700, 0.180, 0.075, 0.030, 0.010, 0.005);
pub const DROPPED_RARITY_WEIGHTS: RarityWeights = RarityWeights::new(0.760, 0.160, 0.055, 0.018, 0.006, 0.001);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RarityModelConfig {
    /// How strongly the rarity score tilts the weight vector
    pub shift_strength: f64,
    pub min_score: f64,
    pub max_score: f64,
    pub max_profession_level: u32,
    /// Used for any source without its own vector
    pub default_weights: RarityWeights,
    pub source_weights: BTreeMap<RollSource, RarityWeights>,
    /// Keyed by upper-case skill name
    pub profession_bonus_per_level: BTreeMap<String, f64>,
    pub bench_tier_bonus: BTreeMap<u32, f64>,
}

impl Default for RarityModelConfig {
    fn default() -> Self {
        Self {
            shift_strength: 0.22,
            min_score: -1.5,
            max_score: 1.5,
            max_profession_level: 99,
            default_weights: CRAFTED_RARITY_WEIGHTS,
            source_weights: BTreeMap::from([
                (RollSource::Crafted, CRAFTED_RARITY_WEIGHTS),
                (RollSource::Dropped, DROPPED_RARITY_WEIGHTS),
            ]),
            profession_bonus_per_level: BTreeMap::from([
                ("WEAPONSMITHING".to_string(), 0.0040),
                ("ARMORSMITHING".to_string(), 0.0040),
                ("ARCANE_ENGINEERING".to_string(), 0.0035),
                ("LEATHERWORKING".to_string(), 0.0030),
                ("SMELTING".to_string(), 0.0025),
                ("ARCHITECT".to_string(), 0.0020),
            ]),
            bench_tier_bonus: BTreeMap::from([
                (1, 0.0),
                (2, 0.08),
                (3, 0.16),
                (4, 0.24),
                (5, 0.32),
                (6, 0.40),
            ]),
        }
    }
}

impl RarityModelConfig {
    /// Base weight vector for a source
    pub fn weights_for(&self, source: RollSource) -> [f64; Rarity::COUNT] {
        self.source_weights
            .get(&source)
            .unwrap_or(&self.default_weights)
            .to_array()
    }
}

// ============================================================================
// Specialized stats
// ============================================================================

/// Which kind of roll a stat may receive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RollConstraint {
    FlatOnly,
    PercentOnly,
    #[default]
    Either,
}

/// Range and tier sensitivity of a percent roll
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PercentRollDefinition {
    pub min: f64,
    pub max: f64,
    pub tier_influence: f64,
}

impl PercentRollDefinition {
    /// Clamp into sane bounds and order min/max
    pub fn sanitized(&self) -> Self {
        let clamp = |v: f64, lo: f64, hi: f64| if v.is_finite() { v.clamp(lo, hi) } else { lo };
        let a = clamp(self.min, 0.0001, 10.0);
        let b = clamp(self.max, 0.0001, 10.0);
        Self {
            min: a.min(b),
            max: a.max(b),
            tier_influence: clamp(self.tier_influence, 0.0, 5.0),
        }
    }
}

/// Relative odds of flat vs percent for stats that allow either
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RollTypeWeights {
    pub flat: f64,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpecializedStatsConfig {
    pub stats_per_rarity: BTreeMap<Rarity, u32>,
    /// Final multiplier applied during resolution
    pub rarity_scalar: BTreeMap<Rarity, f64>,
    /// Material keyword -> tier multiplier, matched as a substring of the item id
    pub tier_scalar_by_keyword: BTreeMap<String, f64>,
    pub base_stats_by_archetype: BTreeMap<Archetype, BTreeMap<ItemizedStat, f64>>,
    pub pool_by_archetype: BTreeMap<Archetype, Vec<ItemizedStat>>,
    pub pool_by_prefix: BTreeMap<String, Vec<ItemizedStat>>,
    /// Extra pick weight for a stat by its rank in the prefix pool (1-based)
    pub prefix_priority_weight_by_rank: BTreeMap<u32, f64>,
    pub stat_weights: BTreeMap<ItemizedStat, f64>,
    pub roll_type_weights: RollTypeWeights,
    /// Keyed by stat id; `crit_chance` covers every `*_crit_chance` stat.
    /// Unlisted stats may roll either way.
    pub roll_constraints: BTreeMap<String, RollConstraint>,
    pub flat_roll_min_scalar: f64,
    pub flat_roll_max_scalar: f64,
    pub percent_roll: PercentRollDefinition,
    pub percent_roll_by_stat: BTreeMap<ItemizedStat, PercentRollDefinition>,
    /// Pick weight multipliers applied while rolling an imbued item
    pub catalyst_stat_bias: BTreeMap<CatalystAffinity, BTreeMap<ItemizedStat, f64>>,
}

impl Default for SpecializedStatsConfig {
    fn default() -> Self {
        use ItemizedStat::*;

        Self {
            stats_per_rarity: BTreeMap::from([
                (Rarity::Common, 1),
                (Rarity::Uncommon, 2),
                (Rarity::Rare, 3),
                (Rarity::Epic, 4),
                (Rarity::Legendary, 5),
                (Rarity::Mythic, 6),
            ]),
            rarity_scalar: BTreeMap::from([
                (Rarity::Common, 1.00),
                (Rarity::Uncommon, 1.05),
                (Rarity::Rare, 1.10),
                (Rarity::Epic, 1.18),
                (Rarity::Legendary, 1.28),
                (Rarity::Mythic, 1.40),
            ]),
            tier_scalar_by_keyword: keyword_scalars(&[
                ("crude", 0.80),
                ("wood", 0.85),
                ("wool", 0.90),
                ("copper", 1.00),
                ("linen", 1.00),
                ("leather", 1.00),
                ("bronze", 1.10),
                ("iron", 1.20),
                ("silk", 1.30),
                ("steel", 1.35),
                ("silversteel", 1.50),
                ("cobalt", 1.60),
                ("cindercloth", 1.60),
                ("thorium", 1.75),
                ("adamantite", 1.95),
                ("shadoweave", 2.00),
                ("mithril", 2.20),
                ("onyxium", 2.50),
                ("prisma", 2.80),
            ]),
            base_stats_by_archetype: BTreeMap::from([
                (
                    Archetype::WeaponMelee,
                    stat_map(&[
                        (PhysicalDamage, 10.0),
                        (PhysicalPenetration, 0.04),
                        (PhysicalCritChance, 0.03),
                        (CritBonus, 0.10),
                        (AttackSpeed, 0.02),
                    ]),
                ),
                (
                    Archetype::WeaponRanged,
                    stat_map(&[
                        (PhysicalDamage, 8.0),
                        (PhysicalPenetration, 0.05),
                        (PhysicalCritChance, 0.05),
                        (CritBonus, 0.15),
                        (AttackSpeed, 0.02),
                    ]),
                ),
                (
                    Archetype::WeaponMagic,
                    stat_map(&[
                        (MagicalDamage, 9.0),
                        (MagicalPenetration, 0.04),
                        (MagicalCritChance, 0.04),
                        (CastSpeed, 0.03),
                        (ManaRegen, 0.05),
                    ]),
                ),
                (
                    Archetype::WeaponShield,
                    stat_map(&[
                        (PhysicalDefence, 7.0),
                        (MagicalDefence, 4.0),
                        (BlockEfficiency, 0.08),
                        (ReflectDamage, 0.02),
                    ]),
                ),
                (
                    Archetype::ArmorHeavy,
                    stat_map(&[
                        (PhysicalDefence, 8.0),
                        (MagicalDefence, 3.0),
                        (MaxHp, 10.0),
                        (CritReduction, 0.03),
                        (HpRegen, 0.05),
                    ]),
                ),
                (
                    Archetype::ArmorLight,
                    stat_map(&[
                        (PhysicalDefence, 5.0),
                        (MagicalDefence, 4.0),
                        (MovementSpeed, 0.02),
                        (StaminaRegen, 0.06),
                    ]),
                ),
                (
                    Archetype::ArmorMagic,
                    stat_map(&[
                        (PhysicalDefence, 2.0),
                        (MagicalDefence, 7.0),
                        (ManaRegen, 0.08),
                        (HealingPower, 0.10),
                    ]),
                ),
                (
                    Archetype::Tool,
                    stat_map(&[(BlockBreakSpeed, 0.10), (RareDropChance, 0.02), (DoubleDropChance, 0.02)]),
                ),
            ]),
            pool_by_archetype: BTreeMap::from([
                (
                    Archetype::WeaponMelee,
                    vec![PhysicalDamage, PhysicalCritChance, CritBonus, PhysicalPenetration, AttackSpeed, MaxHp, HpRegen],
                ),
                (
                    Archetype::WeaponRanged,
                    vec![PhysicalDamage, PhysicalCritChance, CritBonus, PhysicalPenetration, AttackSpeed, MovementSpeed],
                ),
                (
                    Archetype::WeaponMagic,
                    vec![
                        MagicalDamage,
                        MagicalCritChance,
                        MagicalPenetration,
                        CastSpeed,
                        ManaRegen,
                        ManaCostReduction,
                        HealingPower,
                    ],
                ),
                (
                    Archetype::WeaponShield,
                    vec![PhysicalDefence, MagicalDefence, BlockEfficiency, ReflectDamage, MaxHp, HpRegen],
                ),
                (
                    Archetype::ArmorHeavy,
                    vec![PhysicalDefence, MagicalDefence, MaxHp, HpRegen, CritReduction, ReflectDamage],
                ),
                (
                    Archetype::ArmorLight,
                    vec![PhysicalDefence, MagicalDefence, MovementSpeed, StaminaRegen, CritReduction, AttackSpeed],
                ),
                (
                    Archetype::ArmorMagic,
                    vec![
                        MagicalDefence,
                        ManaRegen,
                        ManaCostReduction,
                        HealingPower,
                        HealingCritChance,
                        HealingCritBonus,
                    ],
                ),
                (Archetype::Tool, vec![BlockBreakSpeed, RareDropChance, DoubleDropChance, StaminaRegen]),
                (Archetype::Generic, vec![MaxHp, HpRegen, StaminaRegen]),
            ]),
            pool_by_prefix: BTreeMap::from([
                ("Keen".to_string(), vec![PhysicalCritChance, CritBonus, PhysicalPenetration, MagicalCritChance]),
                ("Brutal".to_string(), vec![PhysicalDamage, CritBonus, AttackSpeed]),
                ("Arcane".to_string(), vec![MagicalDamage, MagicalPenetration, CastSpeed, ManaCostReduction]),
                (
                    "Warding".to_string(),
                    vec![PhysicalDefence, MagicalDefence, BlockEfficiency, CritReduction],
                ),
                ("Vital".to_string(), vec![MaxHp, HpRegen, StaminaRegen]),
                (
                    "Blessed".to_string(),
                    vec![HealingPower, HealingCritChance, HealingCritBonus, ManaRegen],
                ),
                ("Swift".to_string(), vec![MovementSpeed, AttackSpeed, CastSpeed]),
                ("Lucky".to_string(), vec![RareDropChance, DoubleDropChance, BlockBreakSpeed]),
            ]),
            prefix_priority_weight_by_rank: BTreeMap::from([(1, 1.6), (2, 1.3), (3, 1.1), (4, 1.0)]),
            stat_weights: stat_map(&[(MaxHp, 1.2), (PhysicalDamage, 1.1), (MagicalDamage, 1.1), (ReflectDamage, 0.7)]),
            roll_type_weights: RollTypeWeights { flat: 0.65, percent: 0.35 },
            roll_constraints: BTreeMap::from([(HpRegen.id().to_string(), RollConstraint::PercentOnly)]),
            flat_roll_min_scalar: 0.35,
            flat_roll_max_scalar: 0.85,
            percent_roll: PercentRollDefinition { min: 0.03, max: 0.10, tier_influence: 0.25 },
            percent_roll_by_stat: BTreeMap::new(),
            catalyst_stat_bias: BTreeMap::from([
                (CatalystAffinity::Fire, stat_map(&[(PhysicalDamage, 1.5), (MagicalDamage, 1.5)])),
                (CatalystAffinity::Water, stat_map(&[(HealingPower, 1.5), (ManaRegen, 1.5)])),
                (
                    CatalystAffinity::Air,
                    stat_map(&[(MovementSpeed, 1.5), (AttackSpeed, 1.5), (CastSpeed, 1.5)]),
                ),
                (CatalystAffinity::Earth, stat_map(&[(PhysicalDefence, 1.5), (MagicalDefence, 1.5)])),
            ]),
        }
    }
}

impl SpecializedStatsConfig {
    /// Rows rolled for a rarity, falling back to Common, at least 1
    pub fn stats_for_rarity(&self, rarity: Rarity) -> u32 {
        if self.stats_per_rarity.is_empty() {
            return 1;
        }
        self.stats_per_rarity
            .get(&rarity)
            .or_else(|| self.stats_per_rarity.get(&Rarity::Common))
            .copied()
            .unwrap_or(1)
            .max(1)
    }

    pub fn rarity_scalar(&self, rarity: Rarity) -> f64 {
        match self.rarity_scalar.get(&rarity) {
            Some(v) if v.is_finite() => v.max(0.0),
            _ => 1.0,
        }
    }

    /// Highest keyword multiplier contained in the id, clamped to [0.25, 5.0]
    pub fn tier_scalar(&self, item_id: &str) -> f64 {
        let id = item_id.trim().to_ascii_lowercase();
        if id.is_empty() {
            return 1.0;
        }
        let best = self
            .tier_scalar_by_keyword
            .iter()
            .filter(|(keyword, value)| !keyword.is_empty() && value.is_finite() && **value > 0.0)
            .filter(|(keyword, _)| id.contains(keyword.to_ascii_lowercase().as_str()))
            .map(|(_, value)| *value)
            .fold(None, |best: Option<f64>, v| Some(best.map_or(v, |b| b.max(v))));
        best.unwrap_or(1.0).clamp(0.25, 5.0)
    }

    /// Archetype base table with disallowed stats removed, falling back to generic
    pub fn base_stats_for(&self, archetype: Archetype) -> BTreeMap<ItemizedStat, f64> {
        let table = self
            .base_stats_by_archetype
            .get(&archetype)
            .filter(|t| !t.is_empty())
            .or_else(|| self.base_stats_by_archetype.get(&Archetype::Generic));
        table
            .map(|t| {
                t.iter()
                    .filter(|(stat, _)| stat.allowed_for(archetype))
                    .map(|(stat, value)| (*stat, if value.is_finite() { value.max(0.0) } else { 0.0 }))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Flat-roll base: configured archetype value, else the stat's reference magnitude
    pub fn base_value_for(&self, archetype: Archetype, stat: ItemizedStat) -> f64 {
        let configured = self.base_stats_for(archetype).get(&stat).copied().unwrap_or(0.0);
        if configured > 0.0 {
            configured
        } else {
            stat.flat_reference().max(0.0001)
        }
    }

    pub fn pool_for_archetype(&self, archetype: Archetype) -> Vec<ItemizedStat> {
        let raw = self
            .pool_by_archetype
            .get(&archetype)
            .filter(|p| !p.is_empty())
            .or_else(|| self.pool_by_archetype.get(&Archetype::Generic));
        let mut out = Vec::new();
        for stat in raw.into_iter().flatten() {
            if stat.allowed_for(archetype) && !out.contains(stat) {
                out.push(*stat);
            }
        }
        out
    }

    /// Prefix pool, matched case-insensitively. Archetype restrictions are
    /// applied by the caller.
    pub fn pool_for_prefix(&self, prefix: &str) -> Vec<ItemizedStat> {
        let prefix = prefix.trim();
        if prefix.is_empty() {
            return Vec::new();
        }
        let raw = self
            .pool_by_prefix
            .iter()
            .find(|(key, _)| key.trim().eq_ignore_ascii_case(prefix))
            .map(|(_, pool)| pool);
        let mut out = Vec::new();
        for stat in raw.into_iter().flatten() {
            if !out.contains(stat) {
                out.push(*stat);
            }
        }
        out
    }

    pub fn prefix_priority_weight(&self, prefix: &str, stat: ItemizedStat) -> f64 {
        let pool = self.pool_for_prefix(prefix);
        let Some(position) = pool.iter().position(|s| *s == stat) else {
            return 1.0;
        };
        let rank = u32::try_from(position + 1).unwrap_or(u32::MAX);
        if let Some(weight) = self.prefix_priority_weight_by_rank.get(&rank) {
            return weight.max(0.0);
        }
        // ranks past the table reuse the last configured weight
        self.prefix_priority_weight_by_rank
            .iter()
            .filter(|(r, _)| **r > 0)
            .next_back()
            .map(|(_, w)| w.max(0.0))
            .unwrap_or(1.0)
    }

    pub fn stat_weight(&self, stat: ItemizedStat) -> f64 {
        self.stat_weights.get(&stat).map_or(1.0, |w| w.max(0.0))
    }

    pub fn roll_constraint(&self, stat: ItemizedStat) -> RollConstraint {
        let lookup = |key: &str| {
            self.roll_constraints
                .iter()
                .find(|(k, _)| k.trim().eq_ignore_ascii_case(key))
                .map(|(_, c)| *c)
        };
        lookup(stat.id())
            .or_else(|| stat.id().ends_with("_crit_chance").then(|| lookup("crit_chance")).flatten())
            .unwrap_or_default()
    }

    pub fn percent_roll_for(&self, stat: ItemizedStat) -> PercentRollDefinition {
        self.percent_roll_by_stat
            .get(&stat)
            .unwrap_or(&self.percent_roll)
            .sanitized()
    }

    pub fn catalyst_bias(&self, affinity: CatalystAffinity, stat: ItemizedStat) -> f64 {
        self.catalyst_stat_bias
            .get(&affinity)
            .and_then(|m| m.get(&stat))
            .map_or(1.0, |w| w.max(0.0))
    }
}

// ============================================================================
// Prefixes and naming
// ============================================================================

/// One rollable prefix word
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrefixWord {
    pub word: String,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrefixConfig {
    pub words: Vec<PrefixWord>,
    /// Material words that anchor inserted name words
    pub tier_tokens: Vec<String>,
}

impl Default for PrefixConfig {
    fn default() -> Self {
        let words = [
            ("Keen", 1.0),
            ("Brutal", 1.0),
            ("Arcane", 1.0),
            ("Warding", 1.0),
            ("Vital", 1.0),
            ("Blessed", 1.0),
            ("Swift", 1.0),
            ("Lucky", 0.5),
        ]
        .into_iter()
        .map(|(word, weight)| PrefixWord { word: word.to_string(), weight })
        .collect();

        Self {
            words,
            tier_tokens: strings(&[
                "crude", "wood", "copper", "bronze", "iron", "steel", "silversteel", "silver", "gold", "cobalt",
                "thorium", "adamantite", "mithril", "onyxium", "prisma", "wool", "linen", "silk", "cotton",
                "leather", "raven", "cindercloth", "shadoweave", "doomed", "ancient", "runic", "frost", "bone",
                "tribal", "void",
            ]),
        }
    }
}

// ============================================================================
// Gem sockets
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GemSocketConfig {
    pub enabled: bool,
    pub sockets_by_rarity: BTreeMap<Rarity, u32>,
    /// Fallback bonus when no pattern table applies
    pub max_hp_per_socketed_gem: f64,
    /// Id patterns (one `*` allowed) recognised as gems
    pub gem_item_patterns: Vec<String>,
    /// Pattern -> archetype -> stat bonus per socketed gem
    pub bonuses_by_pattern: BTreeMap<String, BTreeMap<Archetype, BTreeMap<ItemizedStat, f64>>>,
    /// Items that can pull gems back out of a host
    pub remover_item_ids: Vec<String>,
}

impl Default for GemSocketConfig {
    fn default() -> Self {
        use ItemizedStat::*;

        let gem = |generic: &[(ItemizedStat, f64)], extra: &[(Archetype, &[(ItemizedStat, f64)])]| {
            let mut table = BTreeMap::from([(Archetype::Generic, stat_map(generic))]);
            for (archetype, bonus) in extra {
                table.insert(*archetype, stat_map(bonus));
            }
            table
        };

        Self {
            enabled: true,
            sockets_by_rarity: BTreeMap::from([
                (Rarity::Common, 0),
                (Rarity::Uncommon, 1),
                (Rarity::Rare, 1),
                (Rarity::Epic, 2),
                (Rarity::Legendary, 2),
                (Rarity::Mythic, 3),
            ]),
            max_hp_per_socketed_gem: 12.0,
            gem_item_patterns: strings(&["rock_gem_*"]),
            bonuses_by_pattern: BTreeMap::from([
                (
                    "rock_gem_ruby*".to_string(),
                    gem(
                        &[(PhysicalDamage, 1.5)],
                        &[
                            (Archetype::WeaponMagic, &[(MagicalDamage, 1.5)]),
                            (Archetype::ArmorHeavy, &[(MaxHp, 15.0)]),
                        ],
                    ),
                ),
                (
                    "rock_gem_sapphire*".to_string(),
                    gem(&[(ManaRegen, 0.05)], &[(Archetype::WeaponMagic, &[(MagicalPenetration, 0.02)])]),
                ),
                (
                    "rock_gem_emerald*".to_string(),
                    gem(&[(HpRegen, 0.05)], &[(Archetype::ArmorMagic, &[(HealingPower, 0.08)])]),
                ),
                (
                    "rock_gem_topaz*".to_string(),
                    gem(&[(MovementSpeed, 0.01)], &[(Archetype::Tool, &[(BlockBreakSpeed, 0.05)])]),
                ),
                (
                    "rock_gem_diamond*".to_string(),
                    gem(&[(PhysicalDefence, 1.5), (MagicalDefence, 1.5)], &[]),
                ),
            ]),
            remover_item_ids: strings(&["ingredient_bar_copper"]),
        }
    }
}

// ============================================================================
// Catalysts
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalystConfig {
    pub allow_overwrite: bool,
    pub enable_reimbue_cost: bool,
    pub reimbue_currency_cost: u32,
    pub reimbue_currency_name: String,
    pub enforce_currency_balance: bool,
    /// Catalyst item id -> affinity it imbues
    pub catalyst_items: BTreeMap<String, CatalystAffinity>,
}

impl Default for CatalystConfig {
    fn default() -> Self {
        Self {
            allow_overwrite: true,
            enable_reimbue_cost: true,
            reimbue_currency_cost: 250,
            reimbue_currency_name: "Gold".to_string(),
            enforce_currency_balance: false,
            catalyst_items: BTreeMap::from([
                ("ingredient_fire_essence".to_string(), CatalystAffinity::Fire),
                ("ingredient_water_essence".to_string(), CatalystAffinity::Water),
                ("ingredient_lightning_essence".to_string(), CatalystAffinity::Air),
                ("ingredient_life_essence".to_string(), CatalystAffinity::Earth),
            ]),
        }
    }
}

impl CatalystConfig {
    /// Affinity for a catalyst item id, None when it isn't a catalyst
    pub fn affinity_for(&self, item_id: &str) -> CatalystAffinity {
        let id = item_id.trim().to_ascii_lowercase();
        self.catalyst_items
            .iter()
            .find(|(key, _)| key.trim().eq_ignore_ascii_case(&id))
            .map(|(_, affinity)| *affinity)
            .unwrap_or_default()
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn stat_map(entries: &[(ItemizedStat, f64)]) -> BTreeMap<ItemizedStat, f64> {
    entries.iter().copied().collect()
}

fn keyword_scalars(entries: &[(&str, f64)]) -> BTreeMap<String, f64> {
    entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}
