use crate::domain::model::{ExclusionGroup, ParticipantId};
use std::collections::{BTreeSet, HashMap};

/// Per-participant effective forbidden set. Participants in no group have no
/// entry and are treated as having an empty set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForbiddenMap {
    sets: HashMap<ParticipantId, BTreeSet<ParticipantId>>,
}

impl ForbiddenMap {
    pub fn get(&self, id: ParticipantId) -> Option<&BTreeSet<ParticipantId>> {
        self.sets.get(&id)
    }

    pub fn is_forbidden(&self, source: ParticipantId, destination: ParticipantId) -> bool {
        self.sets
            .get(&source)
            .is_some_and(|set| set.contains(&destination))
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}

/// Union of every group containing a participant, minus the participant.
pub fn resolve(groups: &[ExclusionGroup]) -> ForbiddenMap {
    let mut sets: HashMap<ParticipantId, BTreeSet<ParticipantId>> = HashMap::new();
    for group in groups {
        for member in group.members() {
            let set = sets.entry(member).or_default();
            set.extend(group.members().filter(|other| *other != member));
        }
    }
    ForbiddenMap { sets }
}
