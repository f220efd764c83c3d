//! The interactable capability surface: a closed set of target classes with
//! an explicit, tested priority policy, and the ordered candidate entries
//! agents cache. There is no inheritance chain here; every concrete variant
//! is a tagged class and the world dispatches on it.

use std::cmp::Ordering;

use contracts::TargetRef;

/// Closed set of interactable variants an agent can face empty-handed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetClass {
    /// Occupied processing station whose occupant this agent could process
    /// or retrieve.
    ProcessableStation,
    /// Occupied plain station the agent may retrieve from.
    StationRetrieve,
    /// Occupied serving window the agent may retrieve from (unusual; most
    /// layouts deny removal here).
    ServingRetrieve,
    /// Loose item on the ground.
    LooseItem,
    /// Passive display; never actionable, lowest priority by policy.
    Display,
}

impl TargetClass {
    /// The explicit priority policy. Higher wins; ties break by squared
    /// distance ascending, then id ascending.
    pub fn priority(self) -> i64 {
        match self {
            Self::ProcessableStation => 30,
            Self::StationRetrieve => 20,
            Self::ServingRetrieve => 15,
            Self::LooseItem => 10,
            Self::Display => 0,
        }
    }
}

/// One cached candidate in an agent's interactable list. Candidate lists are
/// caches, not live queries; entries are purged lazily on read and rebuilt
/// by invalidation broadcasts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateEntry {
    pub target: TargetRef,
    pub priority: i64,
    pub distance_sq: i64,
}

impl CandidateEntry {
    pub fn new(target: TargetRef, class: TargetClass, distance_sq: i64) -> Self {
        Self {
            target,
            priority: class.priority(),
            distance_sq,
        }
    }
}

impl Ord for CandidateEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .priority
            .cmp(&self.priority)
            .then(self.distance_sq.cmp(&other.distance_sq))
            .then_with(|| self.target.cmp(&other.target))
    }
}

impl PartialOrd for CandidateEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item_entry(id: &str, class: TargetClass, distance_sq: i64) -> CandidateEntry {
        CandidateEntry::new(TargetRef::Item(id.to_string()), class, distance_sq)
    }

    fn station_entry(id: &str, class: TargetClass, distance_sq: i64) -> CandidateEntry {
        CandidateEntry::new(TargetRef::Station(id.to_string()), class, distance_sq)
    }

    #[test]
    fn higher_priority_beats_closer_distance() {
        let board = station_entry("station:board_1", TargetClass::ProcessableStation, 10_000);
        let tomato = item_entry("item_000001", TargetClass::LooseItem, 1);
        let mut entries = vec![tomato.clone(), board.clone()];
        entries.sort();
        assert_eq!(entries, vec![board, tomato]);
    }

    #[test]
    fn equal_priority_sorts_by_distance() {
        let near = item_entry("item_000002", TargetClass::LooseItem, 4);
        let far = item_entry("item_000001", TargetClass::LooseItem, 400);
        let mut entries = vec![far.clone(), near.clone()];
        entries.sort();
        assert_eq!(entries, vec![near, far]);
    }

    #[test]
    fn full_tie_breaks_by_target_id() {
        let a = item_entry("item_000001", TargetClass::LooseItem, 25);
        let b = item_entry("item_000002", TargetClass::LooseItem, 25);
        let mut entries = vec![b.clone(), a.clone()];
        entries.sort();
        assert_eq!(entries, vec![a, b]);
    }

    #[test]
    fn policy_order_is_stable() {
        assert!(TargetClass::ProcessableStation.priority() > TargetClass::StationRetrieve.priority());
        assert!(TargetClass::StationRetrieve.priority() > TargetClass::ServingRetrieve.priority());
        assert!(TargetClass::ServingRetrieve.priority() > TargetClass::LooseItem.priority());
        assert!(TargetClass::LooseItem.priority() > TargetClass::Display.priority());
    }
}
