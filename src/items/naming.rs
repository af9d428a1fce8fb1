//! Display names
//!
//! Builds human-readable names from item ids, with prefix and catalyst words
//! slotted in next to the material word.

const CATEGORY_PREFIXES: &[&str] = &["weapon_", "armor_", "tool_"];

/// Title-cased name with the category prefix stripped
pub fn base_display_name(item_id: &str) -> String {
    let trimmed = item_id.trim();
    if trimmed.is_empty() {
        return "Unknown Item".to_string();
    }

    let lower = trimmed.to_ascii_lowercase();
    let stripped = CATEGORY_PREFIXES
        .iter()
        .find(|p| lower.starts_with(*p))
        .map_or(lower.as_str(), |p| &lower[p.len()..]);

    stripped
        .split('_')
        .filter(|t| !t.is_empty())
        .map(title_case)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Name with a rolled prefix word.
///
/// "Iron Sword" + "Keen" -> "Iron Keen Sword"; the word lands after the tier
/// token, else after the first word, and single words get it prepended.
pub fn prefixed_name(item_id: &str, prefix: &str, tier_tokens: &[String]) -> String {
    let base = base_display_name(item_id);
    let prefix = prefix.trim();
    if prefix.is_empty() {
        return base;
    }

    let words: Vec<&str> = base.split_whitespace().collect();
    if words.len() <= 1 {
        return format!("{} {}", prefix, base);
    }

    if let Some(tier) = find_tier_index(&words, tier_tokens) {
        let rest: Vec<&str> = words
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != tier)
            .map(|(_, w)| *w)
            .collect();
        return format!("{} {} {}", words[tier], prefix, rest.join(" "));
    }

    format!("{} {} {}", words[0], prefix, words[1..].join(" "))
}

/// Name with a catalyst word inserted right after the tier token, else prepended
pub fn catalyst_name(base: &str, word: &str, tier_tokens: &[String]) -> String {
    let word = word.trim();
    if word.is_empty() {
        return base.to_string();
    }

    let words: Vec<&str> = base.split_whitespace().collect();
    match find_tier_index(&words, tier_tokens) {
        Some(tier) => {
            let mut out: Vec<&str> = Vec::with_capacity(words.len() + 1);
            out.extend_from_slice(&words[..=tier]);
            out.push(word);
            out.extend_from_slice(&words[tier + 1..]);
            out.join(" ")
        }
        None => format!("{} {}", word, base),
    }
}

fn find_tier_index(words: &[&str], tier_tokens: &[String]) -> Option<usize> {
    words
        .iter()
        .position(|w| tier_tokens.iter().any(|t| t.eq_ignore_ascii_case(w)))
}

fn title_case(token: &str) -> String {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::PrefixConfig;

    fn tokens() -> Vec<String> {
        PrefixConfig::default().tier_tokens
    }

    #[test]
    fn test_base_display_name() {
        assert_eq!(base_display_name("weapon_sword_iron"), "Sword Iron");
        assert_eq!(base_display_name("Armor_Leather_Raven__Legs"), "Leather Raven Legs");
        assert_eq!(base_display_name("ingredient_bar_copper"), "Ingredient Bar Copper");
        assert_eq!(base_display_name(""), "Unknown Item");
    }

    #[test]
    fn test_prefixed_name() {
        let tokens = tokens();
        assert_eq!(prefixed_name("weapon_sword_iron", "Keen", &tokens), "Iron Keen Sword");
        assert_eq!(prefixed_name("weapon_great_axe", "Brutal", &tokens), "Great Brutal Axe");
        assert_eq!(prefixed_name("weapon_club", "Brutal", &tokens), "Brutal Club");
        assert_eq!(prefixed_name("weapon_club", "", &tokens), "Club");
    }

    #[test]
    fn test_catalyst_name() {
        let tokens = tokens();
        assert_eq!(catalyst_name("Iron Sword", "Flame", &tokens), "Iron Flame Sword");
        assert_eq!(catalyst_name("Sword Iron", "Flame", &tokens), "Sword Iron Flame");
        assert_eq!(catalyst_name("Great Axe", "Wave", &tokens), "Wave Great Axe");
    }
}
