//! Rarity roll model
//!
//! Weighted categorical sampling over the six rarity tiers, tilted towards
//! higher tiers by profession skill and bench tier.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::data::RarityModelConfig;
use crate::items::{ActorId, Rarity, RollSource};

/// Who and what triggered a roll. Everything but `reason` is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationContext {
    pub reason: String,
    pub actor_id: Option<ActorId>,
    pub trigger_id: Option<String>,
    pub profession_skill: Option<String>,
    pub profession_level: Option<u32>,
    pub bench_tier: Option<u32>,
}

impl GenerationContext {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            ..Self::default()
        }
    }

    /// Context for a crafted item with profession input
    pub fn crafting(
        reason: impl Into<String>,
        actor_id: ActorId,
        trigger_id: impl Into<String>,
        profession_skill: Option<String>,
        profession_level: u32,
        bench_tier: u32,
    ) -> Self {
        Self {
            reason: reason.into(),
            actor_id: Some(actor_id),
            trigger_id: Some(trigger_id.into()),
            profession_skill,
            profession_level: Some(profession_level),
            bench_tier: Some(bench_tier),
        }
    }
}

/// Intermediate values of one roll, for logs and debug commands. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RarityRollTrace {
    pub profession_bonus: f64,
    pub bench_bonus: f64,
    pub score_raw: f64,
    pub score_clamped: f64,
    /// Normalized weights, Common first
    pub weights: [f64; Rarity::COUNT],
    pub roll: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RarityRollResult {
    pub rarity: Rarity,
    pub trace: RarityRollTrace,
}

/// Bonus from the crafter's profession level
pub fn profession_bonus(config: &RarityModelConfig, context: &GenerationContext) -> f64 {
    let Some(skill) = context.profession_skill.as_deref() else {
        return 0.0;
    };
    let skill = skill.trim().to_ascii_uppercase();
    if skill.is_empty() {
        return 0.0;
    }
    let per_level = config
        .profession_bonus_per_level
        .get(&skill)
        .copied()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0);
    let cap = config.max_profession_level.max(1);
    let level = context.profession_level.unwrap_or(0).min(cap);
    per_level * f64::from(level)
}

/// Bonus from the crafting bench tier, 0 when unconfigured
pub fn bench_bonus(config: &RarityModelConfig, context: &GenerationContext) -> f64 {
    context
        .bench_tier
        .and_then(|tier| config.bench_tier_bonus.get(&tier))
        .copied()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Tilt and normalize a base weight vector for a rarity score.
///
/// Each tier is scaled by `max(0.05, 1 + score * shift * (i - midpoint))`.
/// A vector that sums to zero becomes 100% Common.
pub fn adjusted_weights(base: [f64; Rarity::COUNT], score: f64, shift_strength: f64) -> [f64; Rarity::COUNT] {
    let midpoint = (Rarity::COUNT as f64 - 1.0) / 2.0;
    let mut weights = base;
    for (i, w) in weights.iter_mut().enumerate() {
        let factor = (1.0 + score * shift_strength * (i as f64 - midpoint)).max(0.05);
        *w = (w.max(0.0) * factor).max(0.0);
    }

    let sum: f64 = weights.iter().sum();
    if !sum.is_finite() || sum <= 0.0 {
        let mut fallback = [0.0; Rarity::COUNT];
        fallback[0] = 1.0;
        return fallback;
    }
    weights.map(|w| w / sum)
}

/// Walk the cumulative weights and return the first tier whose cursor reaches `roll`
pub fn sample(weights: &[f64; Rarity::COUNT], roll: f64) -> Rarity {
    let mut cursor = 0.0;
    for (i, w) in weights.iter().enumerate() {
        cursor += w;
        if roll <= cursor {
            return Rarity::from_index(i).unwrap_or_default();
        }
    }
    Rarity::Common
}

/// Roll a rarity for a new item instance
pub fn roll_rarity(
    config: &RarityModelConfig,
    source: RollSource,
    item_id: &str,
    context: &GenerationContext,
    rng: &mut impl Rng,
) -> RarityRollResult {
    let profession_bonus = profession_bonus(config, context);
    let bench_bonus = bench_bonus(config, context);
    let score_raw = profession_bonus + bench_bonus;
    let (lo, hi) = if config.min_score <= config.max_score {
        (config.min_score, config.max_score)
    } else {
        (config.max_score, config.min_score)
    };
    let score_clamped = score_raw.clamp(lo, hi);

    let weights = adjusted_weights(config.weights_for(source), score_clamped, config.shift_strength);
    let roll: f64 = rng.gen();
    let rarity = sample(&weights, roll);

    log::trace!(
        "rarity roll item={} src={} score={:.3} roll={:.4} -> {}",
        item_id,
        source.id(),
        score_clamped,
        roll,
        rarity
    );

    RarityRollResult {
        rarity,
        trace: RarityRollTrace {
            profession_bonus,
            bench_bonus,
            score_raw,
            score_clamped,
            weights,
            roll,
        },
    }
}
