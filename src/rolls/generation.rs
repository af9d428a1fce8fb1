//! Item generation
//!
//! First-time rolling of an item instance: rarity, specialized stat pool,
//! sockets, prefix word and legacy summary rolls.

use std::collections::HashSet;

use rand::Rng;

use crate::data::{ItemizationConfig, RollConstraint, SpecializedStatsConfig};
use crate::items::{
    is_eligible, migrate, Archetype, CatalystAffinity, ItemInstanceMetadata, ItemStack, ItemizedStat,
    ItemizedStatBlock, LegacyRolls, RollSource, CURRENT_SCHEMA_VERSION,
};

use super::diagnostics::GenerationDiagnostics;
use super::rarity_model::{roll_rarity, GenerationContext};

/// Stat penalty carried by gear from the dropped channel
pub const DROPPED_GEAR_STAT_PENALTY: f64 = 0.10;

/// Upper bound for legacy summary rolls
pub const LEGACY_ROLL_MAX: f64 = 0.10;

/// Hard cap on stat rows per item
pub const MAX_STAT_ROWS: u32 = 6;

/// Where a stat row draws its candidates from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatLane {
    Archetype,
    Prefix,
    Intersection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RollKind {
    Flat,
    Percent,
}

/// One picked stat, kept for debug logging
#[derive(Debug, Clone, PartialEq)]
pub struct RowSelection {
    pub row: u32,
    pub lane: StatLane,
    pub stat: ItemizedStat,
    pub kind: RollKind,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatPoolRoll {
    pub flat: ItemizedStatBlock,
    pub percent: ItemizedStatBlock,
    pub rows: Vec<RowSelection>,
}

/// Lane for a 1-based row given the number of rows being picked
pub fn lane_for_row(row: u32, picks: u32) -> StatLane {
    match picks {
        0 | 1 => StatLane::Archetype,
        2 | 3 => {
            if row == 1 {
                StatLane::Archetype
            } else {
                StatLane::Prefix
            }
        }
        _ => match row {
            1 | 2 => StatLane::Archetype,
            3 | 4 => StatLane::Prefix,
            _ => StatLane::Intersection,
        },
    }
}

/// Draw a prefix word from the configured weighted list
pub fn roll_prefix(config: &ItemizationConfig, rng: &mut impl Rng) -> String {
    let words: Vec<_> = config
        .prefixes
        .words
        .iter()
        .filter(|w| !w.word.trim().is_empty())
        .collect();
    if words.is_empty() {
        return String::new();
    }

    let weights: Vec<f64> = words
        .iter()
        .map(|w| if w.weight.is_finite() { w.weight.max(0.0) } else { 0.0 })
        .collect();
    let index = weighted_index(&weights, rng).unwrap_or_else(|| rng.gen_range(0..words.len()));
    words[index].word.trim().to_string()
}

/// Roll the specialized stat rows for an item
pub fn roll_stat_pool(
    stats: &SpecializedStatsConfig,
    item_id: &str,
    archetype: Archetype,
    prefix: &str,
    catalyst: CatalystAffinity,
    stat_count: u32,
    rng: &mut impl Rng,
) -> StatPoolRoll {
    let archetype_pool = stats.pool_for_archetype(archetype);
    let prefix_pool: Vec<ItemizedStat> = stats
        .pool_for_prefix(prefix)
        .into_iter()
        .filter(|s| s.allowed_for(archetype))
        .collect();
    let intersect_pool: Vec<ItemizedStat> = archetype_pool
        .iter()
        .copied()
        .filter(|s| prefix_pool.contains(s))
        .collect();

    let mut out = StatPoolRoll::default();
    if (archetype_pool.is_empty() && prefix_pool.is_empty()) || stat_count == 0 {
        return out;
    }

    let tier_scalar = stats.tier_scalar(item_id);
    let picks = stat_count.min(MAX_STAT_ROWS);
    let mut selected: HashSet<ItemizedStat> = HashSet::new();

    for row in 1..=picks {
        let remaining = |pool: &[ItemizedStat]| -> Vec<ItemizedStat> {
            pool.iter().copied().filter(|s| !selected.contains(s)).collect()
        };

        // each lane falls back to the others when exhausted
        let lane = lane_for_row(row, picks);
        let order: &[(StatLane, bool)] = match lane {
            StatLane::Archetype => &[(StatLane::Archetype, false), (StatLane::Prefix, true)],
            StatLane::Prefix => &[(StatLane::Prefix, true), (StatLane::Archetype, false)],
            StatLane::Intersection => &[
                (StatLane::Intersection, true),
                (StatLane::Prefix, true),
                (StatLane::Archetype, false),
            ],
        };
        let found = order.iter().find_map(|(lane, use_priority)| {
            let pool: &[ItemizedStat] = match lane {
                StatLane::Archetype => &archetype_pool,
                StatLane::Prefix => &prefix_pool,
                StatLane::Intersection => &intersect_pool,
            };
            let candidates = remaining(pool);
            (!candidates.is_empty()).then_some((*lane, *use_priority, candidates))
        });
        let Some((used_lane, use_priority, candidates)) = found else {
            break;
        };

        let weights: Vec<f64> = candidates
            .iter()
            .map(|stat| {
                let priority = if use_priority { stats.prefix_priority_weight(prefix, *stat) } else { 1.0 };
                (stats.stat_weight(*stat) * priority * stats.catalyst_bias(catalyst, *stat)).max(0.0)
            })
            .collect();
        let index = weighted_index(&weights, rng).unwrap_or_else(|| rng.gen_range(0..candidates.len()));
        let stat = candidates[index];
        selected.insert(stat);

        let kind = roll_kind(stats, stat, rng);
        match kind {
            RollKind::Flat => {
                let base = stats.base_value_for(archetype, stat);
                let scalar = uniform(stats.flat_roll_min_scalar, stats.flat_roll_max_scalar, rng);
                out.flat.set(stat, round4(base * scalar * tier_scalar));
            }
            RollKind::Percent => {
                let def = stats.percent_roll_for(stat);
                let tier_factor = (1.0 + (tier_scalar - 1.0) * def.tier_influence).max(0.10);
                out.percent.set(stat, round4(uniform(def.min, def.max, rng) * tier_factor));
            }
        }
        out.rows.push(RowSelection { row, lane: used_lane, stat, kind });
    }

    out
}

/// Roll a brand-new metadata record. Callers check eligibility and that the
/// stack has no metadata yet; this never looks at existing state.
pub fn roll_new_instance(
    item_id: &str,
    source: RollSource,
    catalyst: CatalystAffinity,
    context: &GenerationContext,
    config: &ItemizationConfig,
    rng: &mut impl Rng,
) -> ItemInstanceMetadata {
    let rarity_result = roll_rarity(&config.rarity_model, source, item_id, context, rng);
    let rarity = rarity_result.rarity;

    let prefix = if source == RollSource::Crafted {
        roll_prefix(config, rng)
    } else {
        String::new()
    };

    let archetype = Archetype::resolve(item_id);
    let stat_count = config.stats.stats_for_rarity(rarity);
    let pool = roll_stat_pool(&config.stats, item_id, archetype, &prefix, catalyst, stat_count, rng);

    let mut metadata = ItemInstanceMetadata::new(rarity, source);
    metadata.version = CURRENT_SCHEMA_VERSION;
    metadata.catalyst = catalyst;
    metadata.seed = rng.gen();
    metadata.prefix = prefix;
    metadata.legacy = LegacyRolls {
        damage: rng.gen_range(0.0..LEGACY_ROLL_MAX),
        defence: rng.gen_range(0.0..LEGACY_ROLL_MAX),
        healing: rng.gen_range(0.0..LEGACY_ROLL_MAX),
        utility: rng.gen_range(0.0..LEGACY_ROLL_MAX),
    };
    metadata.flat_rolls = pool.flat;
    metadata.percent_rolls = pool.percent;
    metadata.set_socket_capacity(crate::crafting::gems::sockets_for_rarity(&config.gem_sockets, rarity));
    metadata.dropped_penalty = if source == RollSource::Dropped {
        DROPPED_GEAR_STAT_PENALTY
    } else {
        0.0
    };

    let rows = pool
        .rows
        .iter()
        .map(|r| format!("{}:{:?}:{}{}", r.row, r.lane, r.stat.id(), if r.kind == RollKind::Percent { "%" } else { "F" }))
        .collect::<Vec<_>>()
        .join("|");
    let message = format!(
        "[Roll] item={} src={} rarity={} score={:.3} prefix={} arch={} rows={} reason={}",
        item_id,
        source.id(),
        rarity,
        rarity_result.trace.score_clamped,
        if metadata.prefix.is_empty() { "none" } else { metadata.prefix.as_str() },
        archetype.id(),
        if rows.is_empty() { "none".to_string() } else { rows },
        context.reason
    );
    if config.debug_logging {
        log::info!("{}", message);
    } else {
        log::debug!("{}", message);
    }

    metadata
}

/// Roll a stack if it is eligible and not yet rolled.
///
/// Already-rolled stacks are migrated and returned; they are never re-rolled.
pub fn roll_if_eligible(
    stack: ItemStack,
    source: RollSource,
    context: &GenerationContext,
    config: &ItemizationConfig,
    diagnostics: &GenerationDiagnostics,
    rng: &mut impl Rng,
) -> ItemStack {
    if stack.is_empty() {
        return stack;
    }
    diagnostics.record_attempt(source);

    if !is_eligible(&stack.item_id, &config.eligibility) {
        diagnostics.record_ineligible(source);
        return stack;
    }

    if let Some(existing) = &stack.metadata {
        diagnostics.record_already_rolled(source);
        if existing.is_current() {
            return stack;
        }
        let migrated = migrate(existing);
        return stack.with_metadata(migrated);
    }

    let metadata = roll_new_instance(&stack.item_id, source, CatalystAffinity::None, context, config, rng);
    diagnostics.record_rolled(source, metadata.rarity);
    stack.with_metadata(metadata)
}

/// New crafted stack, rolled if eligible
pub fn create_crafted_item(
    item_id: &str,
    quantity: u32,
    config: &ItemizationConfig,
    diagnostics: &GenerationDiagnostics,
    rng: &mut impl Rng,
) -> ItemStack {
    let context = GenerationContext::new("create_crafted_item");
    roll_if_eligible(ItemStack::new(item_id, quantity), RollSource::Crafted, &context, config, diagnostics, rng)
}

/// New dropped-loot stack, rolled if eligible
pub fn create_dropped_item(
    item_id: &str,
    quantity: u32,
    config: &ItemizationConfig,
    diagnostics: &GenerationDiagnostics,
    rng: &mut impl Rng,
) -> ItemStack {
    let context = GenerationContext::new("create_dropped_item");
    roll_if_eligible(ItemStack::new(item_id, quantity), RollSource::Dropped, &context, config, diagnostics, rng)
}

fn roll_kind(stats: &SpecializedStatsConfig, stat: ItemizedStat, rng: &mut impl Rng) -> RollKind {
    match stats.roll_constraint(stat) {
        RollConstraint::FlatOnly => RollKind::Flat,
        RollConstraint::PercentOnly => RollKind::Percent,
        RollConstraint::Either => {
            let flat = stats.roll_type_weights.flat.max(0.0);
            let percent = stats.roll_type_weights.percent.max(0.0);
            let total = flat + percent;
            if !total.is_finite() || total <= 1e-9 {
                return RollKind::Flat;
            }
            if rng.gen_range(0.0..total) < flat {
                RollKind::Flat
            } else {
                RollKind::Percent
            }
        }
    }
}

/// Index picked proportionally to weight, None when all weights are zero
fn weighted_index(weights: &[f64], rng: &mut impl Rng) -> Option<usize> {
    let usable = |w: f64| w.is_finite() && w > 0.0;
    let total: f64 = weights.iter().copied().filter(|w| usable(*w)).sum();
    if !total.is_finite() || total <= 0.0 {
        return None;
    }
    let roll = rng.gen_range(0.0..total);
    let mut cursor = 0.0;
    let mut last = None;
    for (i, w) in weights.iter().copied().enumerate().filter(|(_, w)| usable(*w)) {
        cursor += w;
        last = Some(i);
        if roll < cursor {
            return Some(i);
        }
    }
    last
}

fn uniform(a: f64, b: f64, rng: &mut impl Rng) -> f64 {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    if (hi - lo).abs() < 1e-9 {
        return lo;
    }
    rng.gen_range(lo..hi)
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
