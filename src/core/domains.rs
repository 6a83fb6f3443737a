use crate::core::exclusion::ForbiddenMap;
use crate::domain::model::{ParticipantId, Registry};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Ordered candidate list per participant, indexed by `ParticipantId`.
/// Built once per run and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateDomains {
    domains: Vec<Vec<ParticipantId>>,
}

impl CandidateDomains {
    pub fn get(&self, id: ParticipantId) -> &[ParticipantId] {
        &self.domains[id.0]
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    /// 第一個候選清單為空的參與者
    pub fn first_empty(&self) -> Option<ParticipantId> {
        self.domains
            .iter()
            .position(|d| d.is_empty())
            .map(ParticipantId)
    }
}

/// The seeded generator for one run. Only the domain-building phase owns it.
pub fn seeded_rng(seed: i64) -> StdRng {
    StdRng::seed_from_u64(seed as u64)
}

/// Builds the shuffled candidate domain of every participant.
///
/// Participants are processed in canonical name order and share one generator,
/// so a given seed and membership always yields the same domains.
pub fn build(registry: &Registry, forbidden: &ForbiddenMap, seed: i64) -> CandidateDomains {
    let mut rng = seeded_rng(seed);
    let mut order: Vec<ParticipantId> = registry.ids().collect();
    order.sort_by(|a, b| registry.get(*a).name.cmp(&registry.get(*b).name));

    let mut domains = vec![Vec::new(); registry.len()];
    for id in order {
        let excluded = forbidden.get(id);
        let mut pool: Vec<ParticipantId> = registry
            .ids()
            .filter(|other| *other != id)
            .filter(|other| !excluded.is_some_and(|set| set.contains(other)))
            .collect();

        pool.sort_by(|a, b| registry.get(*a).name.cmp(&registry.get(*b).name));
        shuffle(&mut pool, &mut rng);

        tracing::info!(
            "Domain for {}: {:?}",
            registry.get(id),
            registry.names(&pool)
        );
        domains[id.0] = pool;
    }

    CandidateDomains { domains }
}

/// Fisher-Yates, walking from the back.
fn shuffle<T, R: Rng>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.gen_range(0..=i);
        items.swap(i, j);
    }
}
