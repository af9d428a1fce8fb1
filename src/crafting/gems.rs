//! Gem sockets
//!
//! Socket capacity comes from rarity at roll time. Gems are matched against
//! configured id patterns to find their per-archetype bonus.

use crate::data::{GemSocketConfig, ItemizationConfig};
use crate::items::{
    is_eligible, migrate, Archetype, ItemContainer, ItemInstanceMetadata, ItemStack, ItemizedStat, ItemizedStatBlock,
    Rarity,
};

use super::ActionOutcome;

/// Score for a pattern without wildcard that equals the id
const EXACT_MATCH_SCORE: usize = 10_000;

/// Ids that are always gems, whatever the pattern list says
const GEM_ID_PREFIX: &str = "rock_gem_";

const MAX_HP_PER_GEM_LIMIT: f64 = 1000.0;

/// Sockets a freshly rolled item of this rarity gets
pub fn sockets_for_rarity(config: &GemSocketConfig, rarity: Rarity) -> u32 {
    if !config.enabled {
        return 0;
    }
    config
        .sockets_by_rarity
        .get(&rarity)
        .or_else(|| config.sockets_by_rarity.get(&Rarity::Common))
        .copied()
        .unwrap_or(0)
}

/// Fallback max-HP bonus per socketed gem
pub fn max_hp_per_gem(config: &GemSocketConfig) -> f64 {
    if config.max_hp_per_socketed_gem.is_finite() {
        config.max_hp_per_socketed_gem.clamp(0.0, MAX_HP_PER_GEM_LIMIT)
    } else {
        0.0
    }
}

/// How well `pattern` matches `gem_id`; higher is more specific.
///
/// A pattern without `*` must equal the id. A pattern with one `*` scores the
/// length of the fixed text around it. None when it doesn't match.
pub fn pattern_match_score(gem_id: &str, pattern: &str) -> Option<usize> {
    let id = gem_id.trim().to_ascii_lowercase();
    let pattern = pattern.trim().to_ascii_lowercase();
    if id.is_empty() || pattern.is_empty() {
        return None;
    }

    match pattern.split_once('*') {
        None => (id == pattern).then_some(EXACT_MATCH_SCORE + pattern.len()),
        Some((prefix, suffix)) => {
            if suffix.contains('*') {
                return None;
            }
            let fits = id.len() >= prefix.len() + suffix.len() && id.starts_with(prefix) && id.ends_with(suffix);
            fits.then_some(prefix.len() + suffix.len())
        }
    }
}

/// Whether an item id is a socketable gem
pub fn is_gem_item(config: &GemSocketConfig, item_id: &str) -> bool {
    let id = item_id.trim().to_ascii_lowercase();
    if id.is_empty() {
        return false;
    }
    id.starts_with(GEM_ID_PREFIX)
        || config
            .gem_item_patterns
            .iter()
            .any(|p| pattern_match_score(&id, p).is_some())
}

/// Most specific bonus pattern for a gem id
fn best_pattern<'a>(config: &'a GemSocketConfig, gem_id: &str) -> Option<&'a str> {
    let mut best: Option<(&str, usize)> = None;
    for pattern in config.bonuses_by_pattern.keys() {
        let Some(score) = pattern_match_score(gem_id, pattern) else { continue };
        if best.map_or(true, |(_, s)| score > s) {
            best = Some((pattern.as_str(), score));
        }
    }
    best.map(|(p, _)| p)
}

/// Bonus one socketed gem gives an item of this archetype
pub fn bonus_for(config: &GemSocketConfig, gem_id: &str, archetype: Archetype) -> ItemizedStatBlock {
    let mut out = ItemizedStatBlock::new();

    let table = best_pattern(config, gem_id)
        .and_then(|p| config.bonuses_by_pattern.get(p))
        .and_then(|by_archetype| {
            by_archetype
                .get(&archetype)
                .or_else(|| by_archetype.get(&Archetype::Generic))
        });

    match table {
        Some(bonus) => {
            for (stat, value) in bonus {
                if stat.allowed_for(archetype) && value.is_finite() {
                    out.add(*stat, *value);
                }
            }
        }
        None => out.set(ItemizedStat::MaxHp, max_hp_per_gem(config)),
    }
    out
}

/// Summed bonus of every socketed gem
pub fn socket_bonuses(config: &GemSocketConfig, archetype: Archetype, gems: &[String]) -> ItemizedStatBlock {
    let mut out = ItemizedStatBlock::new();
    if !config.enabled {
        return out;
    }
    for gem in gems {
        out.merge(&bonus_for(config, gem, archetype));
    }
    out
}

/// Put a gem into the next open socket. False when there is no capacity.
pub fn insert_gem(metadata: &mut ItemInstanceMetadata, gem_id: &str) -> bool {
    if metadata.socket_capacity() == 0 {
        return false;
    }
    metadata.push_socketed_gem(gem_id)
}

/// One-line description of a gem bonus for player messages
pub fn describe_bonus(bonus: &ItemizedStatBlock) -> String {
    if bonus.is_empty() {
        return "none".to_string();
    }
    bonus
        .iter()
        .map(|(stat, value)| format!("{} {:+}", stat.id(), value))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Socket one gem from the container into the rolled item in `slot`
pub fn apply_gem_to_slot(
    container: &mut impl ItemContainer,
    slot: usize,
    gem_item_id: &str,
    config: &ItemizationConfig,
) -> ActionOutcome {
    if slot >= container.capacity() {
        return ActionOutcome::fail("Invalid receiver slot.");
    }
    let gem_id = gem_item_id.trim().to_ascii_lowercase();
    if !is_gem_item(&config.gem_sockets, &gem_id) {
        return ActionOutcome::fail("Held item is not recognized as a gem.");
    }

    let Some(receiver) = container.get(slot).filter(|s| !s.is_empty()).cloned() else {
        return ActionOutcome::fail("No receiver item selected.");
    };
    if !is_eligible(&receiver.item_id, &config.eligibility) {
        return ActionOutcome::fail("Receiver item is not eligible for itemization.");
    }
    let Some(existing) = receiver.metadata.as_ref() else {
        return ActionOutcome::fail("Receiver item has no roll metadata. Generate the item first.");
    };

    let mut metadata = migrate(existing);
    if metadata.socket_capacity() == 0 {
        return ActionOutcome::fail("Receiver has no sockets.");
    }
    if metadata.open_sockets() == 0 {
        return ActionOutcome::fail("All sockets are already filled.");
    }
    if !insert_gem(&mut metadata, &gem_id) {
        return ActionOutcome::fail("Unable to socket gem.");
    }

    if !container.remove_item(&gem_id, 1).succeeded {
        return ActionOutcome::fail(format!("You need 1x {} to socket.", gem_id));
    }
    let updated = receiver.with_metadata(metadata);
    if !container.replace_in_slot(slot, &receiver, Some(updated.clone())) {
        // receiver moved while we worked; hand the gem back
        if !container.add_item(ItemStack::new(gem_id.as_str(), 1)).succeeded {
            log::warn!("Could not return {} after failed socket into slot {}", gem_id, slot);
        }
        return ActionOutcome::fail("Receiver item changed. Try again.");
    }

    let archetype = Archetype::resolve(&receiver.item_id);
    let bonus = describe_bonus(&bonus_for(&config.gem_sockets, &gem_id, archetype));
    let (socketed, capacity) = updated
        .metadata
        .as_ref()
        .map_or((0, 0), |m| (m.socketed_count(), m.socket_capacity()));
    log::debug!("Socketed {} into {} slot {} ({}/{})", gem_id, receiver.item_id, slot, socketed, capacity);

    ActionOutcome::success(format!(
        "Socketed {} into {} ({}/{}). Gem bonus: {}.",
        gem_id, receiver.item_id, socketed, capacity, bonus
    ))
}

/// Pull every gem out of the item in `slot`, consuming one remover item and
/// destroying the host.
///
/// Space for all gems is checked up front, but gems are returned one at a
/// time afterwards. If the container fills up in between, the host stays
/// destroyed and only part of the gems come back.
pub fn remove_all_and_destroy(
    container: &mut impl ItemContainer,
    slot: usize,
    remover_item_id: &str,
    config: &ItemizationConfig,
) -> ActionOutcome {
    if slot >= container.capacity() {
        return ActionOutcome::fail("Invalid receiver slot.");
    }
    let remover_id = remover_item_id.trim().to_ascii_lowercase();
    let is_remover = config
        .gem_sockets
        .remover_item_ids
        .iter()
        .any(|r| r.trim().eq_ignore_ascii_case(&remover_id));
    if remover_id.is_empty() || !is_remover {
        return ActionOutcome::fail("Select a valid removal material first.");
    }

    let Some(host) = container.get(slot).filter(|s| !s.is_empty()).cloned() else {
        return ActionOutcome::fail("No receiver item selected.");
    };
    let Some(existing) = host.metadata.as_ref() else {
        return ActionOutcome::fail("Receiver item has no roll metadata. Generate the item first.");
    };
    let gems = migrate(existing).socketed_gems().to_vec();
    if gems.is_empty() {
        return ActionOutcome::fail("Receiver has no socketed gems.");
    }

    let returns: Vec<ItemStack> = gems.iter().map(|g| ItemStack::new(g.as_str(), 1)).collect();
    if !container.can_add_all(&returns) {
        return ActionOutcome::fail(format!("Not enough inventory space to return {} gem(s).", gems.len()));
    }

    if !container.remove_item(&remover_id, 1).succeeded {
        return ActionOutcome::fail(format!("You need 1x {} to remove gems.", remover_id));
    }
    if !container.replace_in_slot(slot, &host, None) {
        if !container.add_item(ItemStack::new(remover_id.as_str(), 1)).succeeded {
            log::warn!("Could not return {} after failed gem removal in slot {}", remover_id, slot);
        }
        return ActionOutcome::fail("Receiver item changed. Try again.");
    }

    let mut returned = 0;
    for stack in returns {
        let gem = stack.item_id.clone();
        if container.add_item(stack).succeeded {
            returned += 1;
        } else {
            log::warn!("Lost gem {} while unsocketing {} (slot {})", gem, host.item_id, slot);
        }
    }

    if returned < gems.len() {
        log::warn!(
            "Partial gem return for {}: {}/{} returned, host destroyed",
            host.item_id,
            returned,
            gems.len()
        );
        return ActionOutcome::fail(format!(
            "Only {}/{} gem(s) could be returned. {} was destroyed.",
            returned,
            gems.len(),
            host.item_id
        ));
    }

    log::debug!("Unsocketed {} gem(s) from {}, host destroyed", returned, host.item_id);
    ActionOutcome::success(format!("Recovered {} gem(s). {} was destroyed.", returned, host.item_id))
}
