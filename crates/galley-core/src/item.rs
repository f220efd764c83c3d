//! Items: world entities owned by exactly one of the ground, an agent's
//! carry slot, or a station slot. Ownership transfer is the unit of every
//! operation in the kernel; ownership changes are atomic.

use contracts::{ItemKind, OwnerRef};

use crate::geometry::Position;

/// Current owner of an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOwner {
    Ground,
    Agent { agent_id: String, slot: u8 },
    Station { station_id: String },
}

impl ItemOwner {
    pub fn to_owner_ref(&self) -> OwnerRef {
        match self {
            Self::Ground => OwnerRef::Ground,
            Self::Agent { agent_id, slot } => OwnerRef::Agent {
                agent_id: agent_id.clone(),
                slot: *slot,
            },
            Self::Station { station_id } => OwnerRef::Station {
                station_id: station_id.clone(),
            },
        }
    }
}

/// One item instance. Identity is the `item_id` string; a transformation
/// (chop, cook, combine) destroys the input instance and spawns a new one,
/// so stale cached references can never resurface as the wrong item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub item_id: String,
    pub kind: ItemKind,
    pub position: Position,
    pub owner: ItemOwner,
    /// Cleared while the item is owned by a station so it cannot be picked
    /// up directly; retrieval must go through the station transfer protocol.
    pub independently_interactable: bool,
}

impl Item {
    pub fn loose(item_id: impl Into<String>, kind: ItemKind, position: Position) -> Self {
        Self {
            item_id: item_id.into(),
            kind,
            position,
            owner: ItemOwner::Ground,
            independently_interactable: true,
        }
    }

    pub fn is_loose(&self) -> bool {
        self.owner == ItemOwner::Ground
    }

    pub fn is_carried_by(&self, agent_id: &str) -> bool {
        matches!(&self.owner, ItemOwner::Agent { agent_id: id, .. } if id == agent_id)
    }

    pub fn is_on_station(&self, station_id: &str) -> bool {
        matches!(&self.owner, ItemOwner::Station { station_id: id } if id == station_id)
    }

    /// Whether a loose pickup may target this item right now.
    pub fn available_for_pickup(&self) -> bool {
        self.is_loose() && self.independently_interactable
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tomato() -> Item {
        Item::loose("item_000001", ItemKind::Tomato, Position::new(10, 10))
    }

    #[test]
    fn loose_item_is_available_for_pickup() {
        let item = tomato();
        assert!(item.is_loose());
        assert!(item.available_for_pickup());
    }

    #[test]
    fn station_owned_item_is_not_independently_interactable() {
        let mut item = tomato();
        item.owner = ItemOwner::Station {
            station_id: "station:counter_1".to_string(),
        };
        item.independently_interactable = false;
        assert!(!item.available_for_pickup());
        assert!(item.is_on_station("station:counter_1"));
        assert!(!item.is_on_station("station:board_1"));
    }

    #[test]
    fn owner_ref_conversion_preserves_slot() {
        let owner = ItemOwner::Agent {
            agent_id: "chef_001".to_string(),
            slot: 0,
        };
        assert_eq!(
            owner.to_owner_ref(),
            OwnerRef::Agent {
                agent_id: "chef_001".to_string(),
                slot: 0,
            }
        );
    }
}
