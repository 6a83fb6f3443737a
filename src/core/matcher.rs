use crate::core::domains::CandidateDomains;
use crate::domain::model::{Matching, ParticipantId, Registry};
use std::collections::HashSet;

/// Depth-first search for a matching over the canonical participant order.
///
/// Returns `None` when no assignment satisfies every domain; that is an
/// expected outcome, not an error.
pub fn solve(registry: &Registry, domains: &CandidateDomains) -> Option<Matching> {
    let order: Vec<ParticipantId> = registry.ids().collect();
    let mut used = HashSet::with_capacity(order.len());
    let matching = place(&order, 0, domains, &mut used);

    match &matching {
        Some(m) => tracing::debug!("Found matching for {} participants", m.len()),
        None => tracing::debug!("Search exhausted for {} participants", order.len()),
    }
    matching
}

fn place(
    order: &[ParticipantId],
    cur: usize,
    domains: &CandidateDomains,
    used: &mut HashSet<ParticipantId>,
) -> Option<Matching> {
    if cur == order.len() {
        return Some(Matching::new());
    }

    let source = order[cur];
    for &candidate in domains.get(source) {
        if used.contains(&candidate) {
            continue;
        }

        used.insert(candidate);
        if let Some(mut matching) = place(order, cur + 1, domains, used) {
            // 由下往上組裝結果
            matching.record(source, candidate);
            return Some(matching);
        }
        used.remove(&candidate);
    }

    None
}
