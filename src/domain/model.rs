use crate::utils::error::{ExchangeError, Result};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;

/// Registry 內的索引；Registry 依名稱排序，所以 id 順序即名稱順序
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ParticipantId(pub usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub name: String,
    pub contact: String,
}

impl Participant {
    pub fn new(name: impl Into<String>, contact: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            contact: contact.into(),
        }
    }
}

impl fmt::Display for Participant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Owns every participant of one run, in canonical (sorted by name) order.
#[derive(Debug, Clone)]
pub struct Registry {
    participants: Vec<Participant>,
}

impl Registry {
    pub fn new(mut participants: Vec<Participant>) -> Result<Self> {
        participants.sort_by(|a, b| a.name.cmp(&b.name));
        if let Some(pair) = participants.windows(2).find(|w| w[0].name == w[1].name) {
            return Err(ExchangeError::DuplicateParticipant {
                name: pair[0].name.clone(),
            });
        }
        Ok(Self { participants })
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    pub fn get(&self, id: ParticipantId) -> &Participant {
        &self.participants[id.0]
    }

    /// Exact, case-sensitive lookup.
    pub fn lookup(&self, name: &str) -> Option<ParticipantId> {
        self.participants
            .binary_search_by(|p| p.name.as_str().cmp(name))
            .ok()
            .map(ParticipantId)
    }

    /// Ids in canonical processing order.
    pub fn ids(&self) -> impl Iterator<Item = ParticipantId> + '_ {
        (0..self.participants.len()).map(ParticipantId)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ParticipantId, &Participant)> {
        self.participants
            .iter()
            .enumerate()
            .map(|(i, p)| (ParticipantId(i), p))
    }

    pub fn names<'a>(&'a self, ids: &'a [ParticipantId]) -> Vec<&'a str> {
        ids.iter().map(|id| self.get(*id).name.as_str()).collect()
    }
}

/// A set of participants who must not be matched to one another.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExclusionGroup {
    members: BTreeSet<ParticipantId>,
}

impl ExclusionGroup {
    pub fn new(members: impl IntoIterator<Item = ParticipantId>) -> Self {
        Self {
            members: members.into_iter().collect(),
        }
    }

    /// 名稱必須完全符合；大小寫正規化是設定載入器的責任
    pub fn from_names<S: AsRef<str>>(registry: &Registry, group: usize, names: &[S]) -> Result<Self> {
        let members = names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                registry
                    .lookup(name)
                    .ok_or_else(|| ExchangeError::UnknownParticipant {
                        group,
                        name: name.to_string(),
                    })
            })
            .collect::<Result<BTreeSet<_>>>()?;
        Ok(Self { members })
    }

    pub fn members(&self) -> impl Iterator<Item = ParticipantId> + '_ {
        self.members.iter().copied()
    }

    pub fn contains(&self, id: ParticipantId) -> bool {
        self.members.contains(&id)
    }
}

/// Result of the matcher: source -> destination, iterated in canonical order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Matching {
    pairs: BTreeMap<ParticipantId, ParticipantId>,
}

impl Matching {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record(&mut self, source: ParticipantId, destination: ParticipantId) {
        self.pairs.insert(source, destination);
    }

    pub fn get(&self, source: ParticipantId) -> Option<ParticipantId> {
        self.pairs.get(&source).copied()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn pairs(&self) -> impl Iterator<Item = (ParticipantId, ParticipantId)> + '_ {
        self.pairs.iter().map(|(s, d)| (*s, *d))
    }

    /// Checks totality, bijection, irreflexivity and exclusion safety.
    pub fn verify(
        &self,
        registry: &Registry,
        forbidden: &crate::core::exclusion::ForbiddenMap,
    ) -> Result<()> {
        if self.pairs.len() != registry.len() {
            return Err(ExchangeError::InvalidMatching {
                message: format!(
                    "{} of {} participants matched",
                    self.pairs.len(),
                    registry.len()
                ),
            });
        }

        let mut used = HashSet::with_capacity(self.pairs.len());
        for (source, destination) in self.pairs() {
            let src = registry.get(source);
            let dst = registry.get(destination);
            if source == destination {
                return Err(ExchangeError::InvalidMatching {
                    message: format!("{} is matched to themself", src),
                });
            }
            if !used.insert(destination) {
                return Err(ExchangeError::InvalidMatching {
                    message: format!("{} is the destination of more than one participant", dst),
                });
            }
            if forbidden.is_forbidden(source, destination) {
                return Err(ExchangeError::InvalidMatching {
                    message: format!("{} -> {} violates an exclusion group", src, dst),
                });
            }
        }
        Ok(())
    }

    pub fn assignments(&self, registry: &Registry) -> Vec<Assignment> {
        self.pairs()
            .map(|(s, d)| Assignment {
                source: registry.get(s).clone(),
                destination: registry.get(d).clone(),
            })
            .collect()
    }

    /// 人類可讀的配對清單，依名稱排序
    pub fn describe(&self, registry: &Registry) -> Vec<String> {
        self.pairs()
            .map(|(s, d)| format!("{} -> {}", registry.get(s), registry.get(d)))
            .collect()
    }
}

/// One delivery unit handed to the dispatch pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub source: Participant,
    pub destination: Participant,
}
