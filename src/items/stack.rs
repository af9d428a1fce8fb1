//! Item stacks and containers
//!
//! The stack value engine operations read and replace, plus the container
//! interface they run against. `SlotContainer` is a plain slot-array
//! implementation for embedders and tests.

use serde::{Deserialize, Serialize};

use super::metadata::ItemInstanceMetadata;

/// Default per-slot stack limit
pub const DEFAULT_MAX_STACK: u32 = 64;

/// A quantity of one item id, optionally carrying roll metadata
#[derive(Debug, Clone, PartialEq, Hash)]
pub struct ItemStack {
    pub item_id: String,
    pub quantity: u32,
    pub metadata: Option<ItemInstanceMetadata>,
}

impl ItemStack {
    pub fn new(item_id: impl Into<String>, quantity: u32) -> Self {
        Self {
            item_id: item_id.into(),
            quantity,
            metadata: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.quantity == 0 || self.item_id.trim().is_empty()
    }

    /// Copy of this stack with new metadata
    pub fn with_metadata(&self, metadata: ItemInstanceMetadata) -> Self {
        Self {
            item_id: self.item_id.clone(),
            quantity: self.quantity,
            metadata: Some(metadata),
        }
    }

    pub fn normalized_id(&self) -> String {
        self.item_id.trim().to_ascii_lowercase()
    }

    /// Same item and same metadata, so quantities may merge
    pub fn can_stack_with(&self, other: &ItemStack) -> bool {
        self.normalized_id() == other.normalized_id() && self.metadata == other.metadata
    }
}

/// Result of a remove/add request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub succeeded: bool,
    /// Units that could not be moved
    pub remainder: u32,
}

impl Transaction {
    pub fn complete() -> Self {
        Self { succeeded: true, remainder: 0 }
    }

    pub fn failed(remainder: u32) -> Self {
        Self { succeeded: false, remainder }
    }
}

/// Inventory surface the engine operates on
pub trait ItemContainer {
    /// Number of slots
    fn capacity(&self) -> usize;

    fn get(&self, slot: usize) -> Option<&ItemStack>;

    /// Remove `quantity` units of an item id. All-or-nothing.
    fn remove_item(&mut self, item_id: &str, quantity: u32) -> Transaction;

    /// Add a stack, merging where possible. All-or-nothing.
    fn add_item(&mut self, stack: ItemStack) -> Transaction;

    /// Whether every stack could be added together
    fn can_add_all(&self, stacks: &[ItemStack]) -> bool;

    /// Replace the slot only if it still holds `expected`
    fn replace_in_slot(&mut self, slot: usize, expected: &ItemStack, replacement: Option<ItemStack>) -> bool;
}

/// Fixed-size slot array
#[derive(Debug, Clone, Default)]
pub struct SlotContainer {
    slots: Vec<Option<ItemStack>>,
    max_stack: u32,
}

impl SlotContainer {
    /// Create a container with `capacity` empty slots
    pub fn new(capacity: usize) -> Self {
        Self::with_max_stack(capacity, DEFAULT_MAX_STACK)
    }

    pub fn with_max_stack(capacity: usize, max_stack: u32) -> Self {
        Self {
            slots: vec![None; capacity],
            max_stack: max_stack.max(1),
        }
    }

    /// Put a stack straight into a slot, returning what was there
    pub fn set(&mut self, slot: usize, stack: Option<ItemStack>) -> Option<ItemStack> {
        self.slots.get_mut(slot).and_then(|s| std::mem::replace(s, stack))
    }

    /// Total units of an item id across all slots
    pub fn count_of(&self, item_id: &str) -> u32 {
        let id = item_id.trim().to_ascii_lowercase();
        self.slots
            .iter()
            .flatten()
            .filter(|s| s.normalized_id() == id)
            .map(|s| s.quantity)
            .sum()
    }

    pub fn stacks(&self) -> impl Iterator<Item = (usize, &ItemStack)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|s| (i, s)))
    }

    /// Units of `stack` this layout could absorb
    fn room_for(slots: &[Option<ItemStack>], stack: &ItemStack, max_stack: u32) -> u32 {
        slots
            .iter()
            .map(|slot| match slot {
                None => max_stack,
                Some(existing) if existing.can_stack_with(stack) => max_stack.saturating_sub(existing.quantity),
                Some(_) => 0,
            })
            .fold(0u32, |acc, r| acc.saturating_add(r))
    }

    fn insert_into(slots: &mut [Option<ItemStack>], mut stack: ItemStack, max_stack: u32) -> u32 {
        // top up matching stacks first, then fill empty slots
        for slot in slots.iter_mut().flatten() {
            if stack.quantity == 0 {
                return 0;
            }
            if slot.can_stack_with(&stack) {
                let moved = max_stack.saturating_sub(slot.quantity).min(stack.quantity);
                slot.quantity += moved;
                stack.quantity -= moved;
            }
        }
        for slot in slots.iter_mut() {
            if stack.quantity == 0 {
                return 0;
            }
            if slot.is_none() {
                let moved = max_stack.min(stack.quantity);
                let mut placed = stack.clone();
                placed.quantity = moved;
                *slot = Some(placed);
                stack.quantity -= moved;
            }
        }
        stack.quantity
    }
}

impl ItemContainer for SlotContainer {
    fn capacity(&self) -> usize {
        self.slots.len()
    }

    fn get(&self, slot: usize) -> Option<&ItemStack> {
        self.slots.get(slot).and_then(|s| s.as_ref())
    }

    fn remove_item(&mut self, item_id: &str, quantity: u32) -> Transaction {
        let available = self.count_of(item_id);
        if available < quantity {
            return Transaction::failed(quantity);
        }

        let id = item_id.trim().to_ascii_lowercase();
        let mut needed = quantity;
        for slot in self.slots.iter_mut() {
            if needed == 0 {
                break;
            }
            let Some(stack) = slot.as_mut() else { continue };
            if stack.normalized_id() != id {
                continue;
            }
            let taken = stack.quantity.min(needed);
            stack.quantity -= taken;
            needed -= taken;
            if stack.quantity == 0 {
                *slot = None;
            }
        }
        Transaction::complete()
    }

    fn add_item(&mut self, stack: ItemStack) -> Transaction {
        if stack.is_empty() {
            return Transaction::complete();
        }
        if Self::room_for(&self.slots, &stack, self.max_stack) < stack.quantity {
            return Transaction::failed(stack.quantity);
        }
        let remainder = Self::insert_into(&mut self.slots, stack, self.max_stack);
        if remainder == 0 {
            Transaction::complete()
        } else {
            Transaction::failed(remainder)
        }
    }

    fn can_add_all(&self, stacks: &[ItemStack]) -> bool {
        // simulate on a scratch copy so merges between the stacks count
        let mut scratch = self.slots.clone();
        stacks
            .iter()
            .filter(|s| !s.is_empty())
            .all(|s| Self::insert_into(&mut scratch, s.clone(), self.max_stack) == 0)
    }

    fn replace_in_slot(&mut self, slot: usize, expected: &ItemStack, replacement: Option<ItemStack>) -> bool {
        match self.slots.get_mut(slot) {
            Some(current) if current.as_ref() == Some(expected) => {
                *current = replacement.filter(|s| !s.is_empty());
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::{Rarity, RollSource};

    #[test]
    fn test_add_merges_then_fills() {
        let mut container = SlotContainer::with_max_stack(3, 10);
        assert!(container.add_item(ItemStack::new("rock_gem_ruby", 6)).succeeded);
        assert!(container.add_item(ItemStack::new("rock_gem_ruby", 6)).succeeded);
        assert_eq!(container.get(0).unwrap().quantity, 10);
        assert_eq!(container.get(1).unwrap().quantity, 2);
        assert_eq!(container.count_of("rock_gem_ruby"), 12);
    }

    #[test]
    fn test_add_is_all_or_nothing() {
        let mut container = SlotContainer::with_max_stack(1, 5);
        let tx = container.add_item(ItemStack::new("rock_gem_ruby", 7));
        assert!(!tx.succeeded);
        assert_eq!(tx.remainder, 7);
        assert!(container.get(0).is_none());
    }

    #[test]
    fn test_rolled_stacks_do_not_merge() {
        let mut container = SlotContainer::new(2);
        let rolled = ItemStack::new("weapon_sword_iron", 1)
            .with_metadata(crate::items::ItemInstanceMetadata::new(Rarity::Rare, RollSource::Crafted));
        container.add_item(rolled);
        container.add_item(ItemStack::new("weapon_sword_iron", 1));
        assert!(container.get(0).unwrap().metadata.is_some());
        assert!(container.get(1).unwrap().metadata.is_none());
    }

    #[test]
    fn test_remove_spans_slots() {
        let mut container = SlotContainer::with_max_stack(3, 4);
        container.add_item(ItemStack::new("ingredient_bar_copper", 6));
        assert!(container.remove_item("Ingredient_Bar_Copper", 5).succeeded);
        assert_eq!(container.count_of("ingredient_bar_copper"), 1);
        assert!(!container.remove_item("ingredient_bar_copper", 2).succeeded);
        assert_eq!(container.count_of("ingredient_bar_copper"), 1);
    }

    #[test]
    fn test_can_add_all_accounts_for_each_other() {
        let mut container = SlotContainer::with_max_stack(2, 64);
        container.set(0, Some(ItemStack::new("weapon_sword_iron", 1)));
        let gems = vec![ItemStack::new("rock_gem_ruby", 1), ItemStack::new("rock_gem_topaz", 1)];
        assert!(!container.can_add_all(&gems));
        assert!(container.can_add_all(&gems[..1]));
    }

    #[test]
    fn test_replace_checks_expected() {
        let mut container = SlotContainer::new(1);
        let original = ItemStack::new("weapon_sword_iron", 1);
        container.set(0, Some(original.clone()));

        let stale = ItemStack::new("weapon_sword_iron", 2);
        assert!(!container.replace_in_slot(0, &stale, None));
        assert!(container.replace_in_slot(0, &original, None));
        assert!(container.get(0).is_none());
    }
}
