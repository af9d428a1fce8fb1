//! Equipment view
//!
//! The held item plus armor slots of one actor, as read by the player stat
//! aggregation.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::stack::ItemStack;

/// Armor slots, in fingerprint order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArmorSlot {
    Head,
    Chest,
    Hands,
    Legs,
}

impl ArmorSlot {
    pub fn name(&self) -> &'static str {
        match self {
            ArmorSlot::Head => "Head",
            ArmorSlot::Chest => "Chest",
            ArmorSlot::Hands => "Hands",
            ArmorSlot::Legs => "Legs",
        }
    }

    /// Get all slots in display order
    pub fn all() -> &'static [ArmorSlot] {
        &[ArmorSlot::Head, ArmorSlot::Chest, ArmorSlot::Hands, ArmorSlot::Legs]
    }
}

/// What an actor has equipped
#[derive(Debug, Clone, Default)]
pub struct Equipment {
    held: Option<ItemStack>,
    armor: HashMap<ArmorSlot, ItemStack>,
}

impl Equipment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the held item, returning the previous one
    pub fn hold(&mut self, stack: Option<ItemStack>) -> Option<ItemStack> {
        std::mem::replace(&mut self.held, stack.filter(|s| !s.is_empty()))
    }

    /// Equip armor into a slot, returning the previously equipped piece
    pub fn equip(&mut self, slot: ArmorSlot, stack: ItemStack) -> Option<ItemStack> {
        if stack.is_empty() {
            return self.armor.remove(&slot);
        }
        self.armor.insert(slot, stack)
    }

    pub fn unequip(&mut self, slot: ArmorSlot) -> Option<ItemStack> {
        self.armor.remove(&slot)
    }

    pub fn held(&self) -> Option<&ItemStack> {
        self.held.as_ref()
    }

    pub fn armor(&self, slot: ArmorSlot) -> Option<&ItemStack> {
        self.armor.get(&slot)
    }

    /// Armor pieces in slot order, with empty slots as None
    pub fn armor_slots(&self) -> impl Iterator<Item = (ArmorSlot, Option<&ItemStack>)> {
        ArmorSlot::all().iter().map(move |slot| (*slot, self.armor.get(slot)))
    }

    /// Equipped armor pieces in slot order
    pub fn armor_pieces(&self) -> impl Iterator<Item = &ItemStack> {
        self.armor_slots().filter_map(|(_, stack)| stack)
    }

    pub fn is_empty(&self) -> bool {
        self.held.is_none() && self.armor.is_empty()
    }
}
