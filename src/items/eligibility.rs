//! Roll eligibility
//!
//! Default-deny filter over item ids. Exclusions always beat inclusions.

use crate::data::EligibilityConfig;

/// Whether an item id should receive rolls
pub fn is_eligible(item_id: &str, config: &EligibilityConfig) -> bool {
    let id = item_id.trim().to_ascii_lowercase();
    if id.is_empty() {
        return false;
    }

    if config
        .excluded_item_ids
        .iter()
        .any(|excluded| excluded.trim().eq_ignore_ascii_case(&id))
    {
        return false;
    }

    if matches_any_prefix(&id, &config.excluded_prefixes) {
        return false;
    }

    matches_any_prefix(&id, &config.eligible_prefixes)
}

fn matches_any_prefix(id: &str, prefixes: &[String]) -> bool {
    prefixes
        .iter()
        .map(|p| p.trim().to_ascii_lowercase())
        .any(|p| !p.is_empty() && id.starts_with(&p))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prefixes() {
        let config = EligibilityConfig::default();
        assert!(is_eligible("weapon_sword_iron", &config));
        assert!(is_eligible("Armor_Iron_Chest", &config));
        assert!(is_eligible("tool_pickaxe_copper", &config));
        assert!(!is_eligible("ingredient_bar_copper", &config));
        assert!(!is_eligible("   ", &config));
    }

    #[test]
    fn test_exclusions_win() {
        let mut config = EligibilityConfig::default();
        config.excluded_item_ids.push("weapon_sword_ceremonial".into());
        assert!(!is_eligible("weapon_bomb_fire", &config));
        assert!(!is_eligible("weapon_dev_hammer", &config));
        assert!(!is_eligible("WEAPON_SWORD_CEREMONIAL", &config));
        assert!(is_eligible("weapon_sword_ceremonial_two", &config));
    }

    #[test]
    fn test_empty_config_denies_everything() {
        let config = EligibilityConfig {
            eligible_prefixes: Vec::new(),
            excluded_prefixes: Vec::new(),
            excluded_item_ids: Vec::new(),
        };
        assert!(!is_eligible("weapon_sword_iron", &config));
    }
}
