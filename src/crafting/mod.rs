//! Crafting actions
//!
//! Slot-in modifications applied to rolled items: gem sockets and
//! elemental catalysts.

pub mod catalyst;
pub mod gems;

use serde::{Deserialize, Serialize};

pub use catalyst::{apply_catalyst_to_slot, imbue, imbued_display_name, Imbued};
pub use gems::{apply_gem_to_slot, bonus_for, insert_gem, is_gem_item, remove_all_and_destroy, socket_bonuses, sockets_for_rarity};

/// Result of a player-facing action. The message is shown to the player as is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionOutcome {
    pub success: bool,
    pub message: String,
}

impl ActionOutcome {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}
