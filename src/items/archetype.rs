//! Item archetypes
//!
//! Coarse role classification derived from an item id. Archetypes pick the
//! base stat table, the roll pool and which specialized stats are allowed.

use serde::{Deserialize, Serialize};

const WEAPON_PREFIX: &str = "weapon_";
const ARMOR_PREFIX: &str = "armor_";
const TOOL_PREFIX: &str = "tool_";

const MAGIC_WEAPON_KEYWORDS: &[&str] = &["staff", "wand", "spellbook", "scepter", "grimoire"];
const RANGED_WEAPON_KEYWORDS: &[&str] = &["shortbow", "longbow", "crossbow", "gun", "sling"];
const SHIELD_KEYWORDS: &[&str] = &["shield"];
const MAGIC_ARMOR_KEYWORDS: &[&str] = &["robe", "cloth", "mage", "wizard"];
const LIGHT_ARMOR_KEYWORDS: &[&str] = &["leather", "light"];

/// Item role used for base stats and roll pools
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum Archetype {
    WeaponShield,
    WeaponMelee,
    WeaponRanged,
    WeaponMagic,
    ArmorHeavy,
    ArmorLight,
    ArmorMagic,
    Tool,
    #[default]
    Generic,
}

impl Archetype {
    pub const ALL: [Archetype; 9] = [
        Archetype::WeaponShield,
        Archetype::WeaponMelee,
        Archetype::WeaponRanged,
        Archetype::WeaponMagic,
        Archetype::ArmorHeavy,
        Archetype::ArmorLight,
        Archetype::ArmorMagic,
        Archetype::Tool,
        Archetype::Generic,
    ];

    /// Configuration id
    pub fn id(&self) -> &'static str {
        match self {
            Archetype::WeaponShield => "weapon_shield",
            Archetype::WeaponMelee => "weapon_melee",
            Archetype::WeaponRanged => "weapon_ranged",
            Archetype::WeaponMagic => "weapon_magic",
            Archetype::ArmorHeavy => "armor_heavy",
            Archetype::ArmorLight => "armor_light",
            Archetype::ArmorMagic => "armor_magic",
            Archetype::Tool => "tool",
            Archetype::Generic => "generic",
        }
    }

    pub fn from_id(raw: &str) -> Option<Archetype> {
        let normalized = raw.trim().to_ascii_lowercase();
        Self::ALL.iter().copied().find(|a| a.id() == normalized)
    }

    pub fn is_weapon(&self) -> bool {
        matches!(
            self,
            Archetype::WeaponShield | Archetype::WeaponMelee | Archetype::WeaponRanged | Archetype::WeaponMagic
        )
    }

    pub fn is_armor(&self) -> bool {
        matches!(self, Archetype::ArmorHeavy | Archetype::ArmorLight | Archetype::ArmorMagic)
    }

    /// Classify an item id. Case-insensitive, first match wins.
    pub fn resolve(item_id: &str) -> Archetype {
        let id = item_id.trim().to_ascii_lowercase();

        if id.starts_with(WEAPON_PREFIX) {
            if contains_any(&id, MAGIC_WEAPON_KEYWORDS) {
                return Archetype::WeaponMagic;
            }
            if contains_any(&id, RANGED_WEAPON_KEYWORDS) {
                return Archetype::WeaponRanged;
            }
            if contains_any(&id, SHIELD_KEYWORDS) {
                return Archetype::WeaponShield;
            }
            return Archetype::WeaponMelee;
        }

        if id.starts_with(ARMOR_PREFIX) {
            if contains_any(&id, MAGIC_ARMOR_KEYWORDS) {
                return Archetype::ArmorMagic;
            }
            if contains_any(&id, LIGHT_ARMOR_KEYWORDS) {
                return Archetype::ArmorLight;
            }
            return Archetype::ArmorHeavy;
        }

        if id.starts_with(TOOL_PREFIX) {
            return Archetype::Tool;
        }

        Archetype::Generic
    }
}

fn contains_any(id: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| id.contains(k))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weapon_split() {
        assert_eq!(Archetype::resolve("Weapon_Staff_Crystal"), Archetype::WeaponMagic);
        assert_eq!(Archetype::resolve("weapon_grimoire_void"), Archetype::WeaponMagic);
        assert_eq!(Archetype::resolve("weapon_longbow_iron"), Archetype::WeaponRanged);
        assert_eq!(Archetype::resolve("weapon_shield_cobalt"), Archetype::WeaponShield);
        assert_eq!(Archetype::resolve("weapon_sword_iron"), Archetype::WeaponMelee);
    }

    #[test]
    fn test_magic_beats_ranged() {
        // both keyword sets present, magic is checked first
        assert_eq!(Archetype::resolve("weapon_wand_sling"), Archetype::WeaponMagic);
    }

    #[test]
    fn test_armor_split() {
        assert_eq!(Archetype::resolve("armor_cloth_cindercloth_chest"), Archetype::ArmorMagic);
        assert_eq!(Archetype::resolve("armor_leather_raven_legs"), Archetype::ArmorLight);
        assert_eq!(Archetype::resolve("armor_iron_head"), Archetype::ArmorHeavy);
    }

    #[test]
    fn test_other_categories() {
        assert_eq!(Archetype::resolve("tool_pickaxe_iron"), Archetype::Tool);
        assert_eq!(Archetype::resolve("ingredient_bar_copper"), Archetype::Generic);
        assert_eq!(Archetype::resolve(""), Archetype::Generic);
    }

    #[test]
    fn test_id_round_trip() {
        for archetype in Archetype::ALL {
            assert_eq!(Archetype::from_id(archetype.id()), Some(archetype));
        }
    }
}
