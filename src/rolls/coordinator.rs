//! Pending roll coordinator
//!
//! Crafting events queue rolls for items that land in an inventory a tick
//! later. Queues merge per (actor, item); `apply` rolls matching unrolled
//! stacks and keeps any remainder for the next call.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use dashmap::DashMap;
use rand::Rng;

use crate::data::ItemizationConfig;
use crate::items::{is_eligible, ActorId, CatalystAffinity, ItemContainer, RollSource};

use super::diagnostics::GenerationDiagnostics;
use super::generation::roll_new_instance;
use super::rarity_model::GenerationContext;

/// Accumulated craft rolls for one item id
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingCraftRoll {
    pub quantity: u32,
    pub profession_skill: Option<String>,
    pub profession_level: u32,
    pub bench_tier: u32,
}

impl PendingCraftRoll {
    /// Fold another request in: quantities sum, level and bench keep the maximum
    fn absorb(&mut self, other: PendingCraftRoll) {
        self.quantity = self.quantity.saturating_add(other.quantity);
        if other.profession_skill.as_deref().is_some_and(|s| !s.trim().is_empty()) {
            self.profession_skill = other.profession_skill;
        }
        self.profession_level = self.profession_level.max(other.profession_level);
        self.bench_tier = self.bench_tier.max(other.bench_tier);
    }

    /// Fold back a leftover from an earlier queue. Only the quantity is
    /// taken; this entry's context is newer.
    fn absorb_leftover(&mut self, leftover: PendingCraftRoll) {
        self.quantity = self.quantity.saturating_add(leftover.quantity);
        if self.profession_skill.as_deref().map_or(true, |s| s.trim().is_empty()) {
            self.profession_skill = leftover.profession_skill;
        }
    }
}

/// Per-actor pending craft rolls, safe to share between threads
#[derive(Debug, Default)]
pub struct PendingRollCoordinator {
    pending: DashMap<ActorId, HashMap<String, PendingCraftRoll>>,
}

impl PendingRollCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `quantity` crafted rolls for an item. Ineligible ids are ignored.
    pub fn queue(
        &self,
        actor: ActorId,
        item_id: &str,
        quantity: u32,
        profession_skill: Option<&str>,
        profession_level: u32,
        bench_tier: u32,
        config: &ItemizationConfig,
    ) {
        let item_id = item_id.trim().to_ascii_lowercase();
        if item_id.is_empty() || quantity == 0 || !is_eligible(&item_id, &config.eligibility) {
            return;
        }

        let request = PendingCraftRoll {
            quantity,
            profession_skill: profession_skill.map(str::to_string),
            profession_level,
            bench_tier,
        };

        // entry() holds the shard lock, so concurrent queues never lose an increment
        let pending_after = {
            let mut entry = self.pending.entry(actor).or_default();
            let roll = entry.entry(item_id.clone()).or_default();
            roll.absorb(request);
            roll.quantity
        };

        let message = format!(
            "[Queue] +{} item={} actor={} pending={}",
            quantity, item_id, actor, pending_after
        );
        if config.debug_logging {
            log::info!("{}", message);
        } else {
            log::debug!("{}", message);
        }
    }

    /// Roll unrolled stacks matching this actor's queue, with thread-local randomness
    pub fn apply(
        &self,
        actor: ActorId,
        container: &mut impl ItemContainer,
        config: &ItemizationConfig,
        diagnostics: &GenerationDiagnostics,
    ) -> usize {
        self.apply_with_rng(actor, container, config, diagnostics, &mut rand::thread_rng())
    }

    /// Roll unrolled stacks matching this actor's queue.
    ///
    /// Returns the number of stacks rolled. Each rolled stack consumes its
    /// quantity (at least 1) from the queue; leftovers stay queued.
    pub fn apply_with_rng(
        &self,
        actor: ActorId,
        container: &mut impl ItemContainer,
        config: &ItemizationConfig,
        diagnostics: &GenerationDiagnostics,
        rng: &mut impl Rng,
    ) -> usize {
        // take the actor's queue out; anything queued meanwhile lands in a fresh entry
        let Some((_, mut pending)) = self.pending.remove(&actor) else {
            return 0;
        };

        let mut applied = 0;
        for slot in 0..container.capacity() {
            if pending.is_empty() {
                break;
            }
            let Some(current) = container.get(slot) else { continue };
            if current.is_empty() || current.metadata.is_some() {
                continue;
            }
            let item_id = current.normalized_id();
            let Some(roll) = pending.get(&item_id) else { continue };
            if roll.quantity == 0 || !is_eligible(&item_id, &config.eligibility) {
                continue;
            }

            let context = GenerationContext::crafting(
                "craft_queue_apply",
                actor,
                item_id.clone(),
                roll.profession_skill.clone(),
                roll.profession_level,
                roll.bench_tier,
            );
            let expected = current.clone();
            let consumed = expected.quantity.max(1);
            let metadata = roll_new_instance(&item_id, RollSource::Crafted, CatalystAffinity::None, &context, config, rng);
            let rarity = metadata.rarity;
            if !container.replace_in_slot(slot, &expected, Some(expected.with_metadata(metadata))) {
                log::warn!("Slot {} changed during roll apply for actor {}", slot, actor);
                continue;
            }
            diagnostics.record_attempt(RollSource::Crafted);
            diagnostics.record_rolled(RollSource::Crafted, rarity);
            applied += 1;

            let remaining = roll.quantity.saturating_sub(consumed);
            if remaining > 0 {
                if let Some(roll) = pending.get_mut(&item_id) {
                    roll.quantity = remaining;
                }
            } else {
                pending.remove(&item_id);
            }
        }

        let left: u32 = pending.values().map(|r| r.quantity).sum();
        self.requeue(actor, pending);

        let message = format!("[QueueApply] actor={} applied={} pending_after={}", actor, applied, left);
        if config.debug_logging {
            log::info!("{}", message);
        } else {
            log::debug!("{}", message);
        }
        applied
    }

    /// Put leftovers back, under anything queued while they were out
    fn requeue(&self, actor: ActorId, leftovers: HashMap<String, PendingCraftRoll>) {
        if leftovers.is_empty() {
            return;
        }
        let mut queued = self.pending.entry(actor).or_default();
        for (item_id, leftover) in leftovers {
            match queued.entry(item_id) {
                Entry::Occupied(mut newer) => newer.get_mut().absorb_leftover(leftover),
                Entry::Vacant(slot) => {
                    slot.insert(leftover);
                }
            }
        }
    }

    /// Pending quantity for one item of one actor
    pub fn pending_quantity(&self, actor: ActorId, item_id: &str) -> u32 {
        let item_id = item_id.trim().to_ascii_lowercase();
        self.pending
            .get(&actor)
            .and_then(|m| m.get(&item_id).map(|r| r.quantity))
            .unwrap_or(0)
    }

    /// Copy of an actor's queue
    pub fn pending_for(&self, actor: ActorId) -> HashMap<String, PendingCraftRoll> {
        self.pending.get(&actor).map(|m| m.clone()).unwrap_or_default()
    }

    /// Drop everything queued for an actor
    pub fn clear(&self, actor: ActorId) {
        self.pending.remove(&actor);
    }
}
