//! Catalyst imbuing
//!
//! Writes an elemental affinity onto a rolled item. The last imbue wins;
//! overwriting an existing affinity is governed by `CatalystConfig`.

use crate::data::{CatalystConfig, ItemizationConfig};
use crate::items::naming::{catalyst_name, prefixed_name};
use crate::items::{is_eligible, migrate, CatalystAffinity, ItemContainer, ItemInstanceMetadata, ItemStack};

use super::ActionOutcome;

/// Metadata after a successful imbue
#[derive(Debug, Clone, PartialEq)]
pub struct Imbued {
    pub metadata: ItemInstanceMetadata,
    /// The item already carried a different affinity
    pub reimbued: bool,
}

/// Apply an affinity to item metadata.
///
/// Errors carry the message shown to the player.
pub fn imbue(
    metadata: Option<&ItemInstanceMetadata>,
    affinity: CatalystAffinity,
    config: &CatalystConfig,
) -> Result<Imbued, String> {
    if affinity.is_none() {
        return Err("Invalid catalyst.".to_string());
    }
    let Some(existing) = metadata else {
        return Err("Receiver item has no roll metadata. Generate the item first.".to_string());
    };

    let mut metadata = migrate(existing);
    let previous = metadata.catalyst;
    if previous == affinity {
        return Err("Receiver already has this catalyst.".to_string());
    }

    let reimbued = !previous.is_none();
    if reimbued && !config.allow_overwrite {
        return Err("Overwrite is disabled for already-imbued items.".to_string());
    }
    if reimbued
        && config.enable_reimbue_cost
        && config.enforce_currency_balance
        && !try_consume_reimbue_currency(config.reimbue_currency_cost, &config.reimbue_currency_name)
    {
        return Err(format!(
            "Need {} {} to re-imbue.",
            config.reimbue_currency_cost, config.reimbue_currency_name
        ));
    }

    metadata.catalyst = affinity;
    Ok(Imbued { metadata, reimbued })
}

/// Currency is not wired to any wallet, so enforced re-imbue costs can never be paid.
fn try_consume_reimbue_currency(_amount: u32, _currency: &str) -> bool {
    false
}

/// Display name of an item once imbued
pub fn imbued_display_name(item_id: &str, metadata: &ItemInstanceMetadata, config: &ItemizationConfig) -> String {
    let tier_tokens = &config.prefixes.tier_tokens;
    let base = prefixed_name(item_id, &metadata.prefix, tier_tokens);
    catalyst_name(&base, metadata.catalyst.display_word(), tier_tokens)
}

/// Consume one catalyst item and imbue the rolled item in `slot`
pub fn apply_catalyst_to_slot(
    container: &mut impl ItemContainer,
    slot: usize,
    catalyst_item_id: &str,
    config: &ItemizationConfig,
) -> ActionOutcome {
    if slot >= container.capacity() {
        return ActionOutcome::fail("Invalid receiver slot.");
    }
    let catalyst_id = catalyst_item_id.trim().to_ascii_lowercase();
    let affinity = config.catalyst.affinity_for(&catalyst_id);
    if affinity.is_none() {
        return ActionOutcome::fail("Invalid catalyst.");
    }

    let Some(receiver) = container.get(slot).filter(|s| !s.is_empty()).cloned() else {
        return ActionOutcome::fail("No receiver item selected.");
    };
    if !is_eligible(&receiver.item_id, &config.eligibility) {
        return ActionOutcome::fail("Receiver item is not eligible for itemization.");
    }

    let imbued = match imbue(receiver.metadata.as_ref(), affinity, &config.catalyst) {
        Ok(imbued) => imbued,
        Err(message) => return ActionOutcome::fail(message),
    };

    if !container.remove_item(&catalyst_id, 1).succeeded {
        return ActionOutcome::fail(format!("You need 1x {} to imbue.", catalyst_id));
    }
    let name = imbued_display_name(&receiver.item_id, &imbued.metadata, config);
    let updated = receiver.with_metadata(imbued.metadata);
    if !container.replace_in_slot(slot, &receiver, Some(updated)) {
        if !container.add_item(ItemStack::new(catalyst_id.as_str(), 1)).succeeded {
            log::warn!("Could not return {} after failed imbue in slot {}", catalyst_id, slot);
        }
        return ActionOutcome::fail("Receiver item changed. Try again.");
    }

    log::debug!(
        "Imbued {} slot {} with {} (reimbued={})",
        receiver.item_id,
        slot,
        affinity.id(),
        imbued.reimbued
    );

    let mut message = format!("Imbued: {} ({})", name, affinity.id());
    if imbued.reimbued {
        message.push_str(" (re-imbued)");
    }
    message.push('.');
    if imbued.reimbued && config.catalyst.enable_reimbue_cost {
        message.push_str(&format!(
            " Re-imbue cost: {} {}{}",
            config.catalyst.reimbue_currency_cost,
            config.catalyst.reimbue_currency_name,
            if config.catalyst.enforce_currency_balance { "." } else { " (not charged)." }
        ));
    }
    ActionOutcome::success(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::{Rarity, RollSource, SlotContainer};

    fn rolled(catalyst: CatalystAffinity) -> ItemInstanceMetadata {
        let mut meta = ItemInstanceMetadata::new(Rarity::Rare, RollSource::Crafted);
        meta.catalyst = catalyst;
        meta
    }

    #[test]
    fn test_imbue_sets_affinity() {
        let config = CatalystConfig::default();
        let meta = rolled(CatalystAffinity::None);
        let imbued = imbue(Some(&meta), CatalystAffinity::Fire, &config).unwrap();
        assert_eq!(imbued.metadata.catalyst, CatalystAffinity::Fire);
        assert!(!imbued.reimbued);
        assert_eq!(meta.catalyst, CatalystAffinity::None);
    }

    #[test]
    fn test_imbue_rejects_same_affinity() {
        let config = CatalystConfig::default();
        let meta = rolled(CatalystAffinity::Water);
        assert_eq!(
            imbue(Some(&meta), CatalystAffinity::Water, &config).unwrap_err(),
            "Receiver already has this catalyst."
        );
    }

    #[test]
    fn test_imbue_rejections() {
        let mut config = CatalystConfig::default();
        assert_eq!(imbue(None, CatalystAffinity::Fire, &config).unwrap_err(), "Receiver item has no roll metadata. Generate the item first.");
        assert_eq!(imbue(Some(&rolled(CatalystAffinity::None)), CatalystAffinity::None, &config).unwrap_err(), "Invalid catalyst.");

        config.allow_overwrite = false;
        assert_eq!(
            imbue(Some(&rolled(CatalystAffinity::Fire)), CatalystAffinity::Air, &config).unwrap_err(),
            "Overwrite is disabled for already-imbued items."
        );
        assert!(imbue(Some(&rolled(CatalystAffinity::None)), CatalystAffinity::Air, &config).is_ok());
    }

    #[test]
    fn test_enforced_reimbue_cost_is_never_payable() {
        let mut config = CatalystConfig::default();
        config.enforce_currency_balance = true;
        assert_eq!(
            imbue(Some(&rolled(CatalystAffinity::Fire)), CatalystAffinity::Earth, &config).unwrap_err(),
            "Need 250 Gold to re-imbue."
        );
        // first imbue costs nothing
        assert!(imbue(Some(&rolled(CatalystAffinity::None)), CatalystAffinity::Earth, &config).is_ok());

        config.enable_reimbue_cost = false;
        assert!(imbue(Some(&rolled(CatalystAffinity::Fire)), CatalystAffinity::Earth, &config).is_ok());
    }

    #[test]
    fn test_apply_catalyst_to_slot() {
        let config = ItemizationConfig::default();
        let mut container = SlotContainer::new(3);
        let mut meta = rolled(CatalystAffinity::None);
        meta.prefix = "Keen".to_string();
        container.set(0, Some(ItemStack::new("weapon_sword_iron", 1).with_metadata(meta)));
        container.set(1, Some(ItemStack::new("ingredient_fire_essence", 2)));

        let outcome = apply_catalyst_to_slot(&mut container, 0, "Ingredient_Fire_Essence", &config);
        assert!(outcome.success, "{}", outcome.message);
        assert_eq!(outcome.message, "Imbued: Iron Flame Keen Sword (FIRE).");
        assert_eq!(container.count_of("ingredient_fire_essence"), 1);

        let outcome = apply_catalyst_to_slot(&mut container, 0, "ingredient_fire_essence", &config);
        assert_eq!(outcome.message, "Receiver already has this catalyst.");
        assert_eq!(container.count_of("ingredient_fire_essence"), 1);
    }

    #[test]
    fn test_reimbue_message_and_consumption() {
        let config = ItemizationConfig::default();
        let mut container = SlotContainer::new(3);
        container.set(0, Some(ItemStack::new("armor_iron_chest", 1).with_metadata(rolled(CatalystAffinity::Fire))));

        let outcome = apply_catalyst_to_slot(&mut container, 0, "ingredient_water_essence", &config);
        assert_eq!(outcome.message, "You need 1x ingredient_water_essence to imbue.");

        container.set(1, Some(ItemStack::new("ingredient_water_essence", 1)));
        let outcome = apply_catalyst_to_slot(&mut container, 0, "ingredient_water_essence", &config);
        assert!(outcome.success);
        assert!(outcome.message.starts_with("Imbued: Iron Wave Chest (WATER) (re-imbued)."));
        let meta = container.get(0).unwrap().metadata.as_ref().unwrap();
        assert_eq!(meta.catalyst, CatalystAffinity::Water);
    }

    #[test]
    fn test_apply_catalyst_rejects_unknown_item() {
        let config = ItemizationConfig::default();
        let mut container = SlotContainer::new(1);
        let outcome = apply_catalyst_to_slot(&mut container, 0, "rock_gem_ruby", &config);
        assert_eq!(outcome.message, "Invalid catalyst.");
    }
}
