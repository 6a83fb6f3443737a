use gift_exchange::core::domains::build;
use gift_exchange::core::exclusion::resolve;
use gift_exchange::core::matcher::solve;
use gift_exchange::{ExclusionGroup, Participant, ParticipantId, Registry};
use proptest::prelude::*;
use std::collections::HashSet;

fn registry(names: &[&str]) -> Registry {
    Registry::new(
        names
            .iter()
            .map(|n| Participant::new(*n, format!("{}@example.com", n.to_lowercase())))
            .collect(),
    )
    .unwrap()
}

fn groups(reg: &Registry, groups: &[&[&str]]) -> Vec<ExclusionGroup> {
    groups
        .iter()
        .enumerate()
        .map(|(i, g)| ExclusionGroup::from_names(reg, i, &g[..]).unwrap())
        .collect()
}

#[test]
fn test_abcd_seed_42_is_reproducible_and_valid() {
    let reg = registry(&["A", "B", "C", "D"]);
    let forbidden = resolve(&[]);

    let first = solve(&reg, &build(&reg, &forbidden, 42)).expect("solvable");
    let second = solve(&reg, &build(&reg, &forbidden, 42)).expect("solvable");

    assert_eq!(first.describe(&reg), second.describe(&reg));
    assert_eq!(first.len(), 4);
    for (source, destination) in first.pairs() {
        assert_ne!(source, destination);
    }
    first.verify(&reg, &forbidden).unwrap();
}

#[test]
fn test_insertion_order_does_not_change_result() {
    let reg_a = registry(&["Dave", "Alice", "Carol", "Bob", "Erin"]);
    let reg_b = registry(&["Erin", "Bob", "Carol", "Alice", "Dave"]);
    let g_a = groups(&reg_a, &[&["Alice", "Bob"], &["Carol", "Dave"]]);
    let g_b = groups(&reg_b, &[&["Carol", "Dave"], &["Alice", "Bob"]]);

    let m_a = solve(&reg_a, &build(&reg_a, &resolve(&g_a), 9)).unwrap();
    let m_b = solve(&reg_b, &build(&reg_b, &resolve(&g_b), 9)).unwrap();
    assert_eq!(m_a.describe(&reg_a), m_b.describe(&reg_b));
}

#[test]
fn test_mutual_exclusion_of_two_is_infeasible() {
    let reg = registry(&["A", "B"]);
    let forbidden = resolve(&groups(&reg, &[&["A", "B"]]));
    assert!(solve(&reg, &build(&reg, &forbidden, 42)).is_none());
}

#[test]
fn test_group_covering_everyone_is_infeasible() {
    let reg = registry(&["A", "B", "C", "D", "E"]);
    let forbidden = resolve(&groups(&reg, &[&["A", "B", "C", "D", "E"]]));
    assert!(solve(&reg, &build(&reg, &forbidden, 1)).is_none());
}

#[test]
fn test_exclusion_closure_is_union_of_groups() {
    let reg = registry(&["A", "B", "C", "D", "E"]);
    let forbidden = resolve(&groups(&reg, &[&["A", "B"], &["A", "C", "D"]]));

    let a = reg.lookup("A").unwrap();
    let expected: HashSet<ParticipantId> = ["B", "C", "D"]
        .iter()
        .map(|n| reg.lookup(n).unwrap())
        .collect();
    let actual: HashSet<ParticipantId> = forbidden.get(a).unwrap().iter().copied().collect();
    assert_eq!(actual, expected);
    assert!(forbidden.get(reg.lookup("E").unwrap()).is_none());
}

/// Random registries of 2..10 people with up to 4 small exclusion groups.
fn scenario() -> impl Strategy<Value = (usize, Vec<Vec<usize>>, i64)> {
    (2usize..10).prop_flat_map(|n| {
        (
            Just(n),
            prop::collection::vec(prop::collection::vec(0..n, 2..4), 0..4),
            any::<i64>(),
        )
    })
}

proptest! {
    #[test]
    fn prop_solutions_are_valid_bijections((n, raw_groups, seed) in scenario()) {
        let names: Vec<String> = (0..n).map(|i| format!("P{:02}", i)).collect();
        let reg = Registry::new(
            names.iter().map(|n| Participant::new(n.clone(), format!("{}@x", n))).collect(),
        ).unwrap();
        let groups: Vec<ExclusionGroup> = raw_groups
            .iter()
            .map(|g| ExclusionGroup::new(g.iter().map(|i| ParticipantId(*i))))
            .collect();
        let forbidden = resolve(&groups);
        let domains = build(&reg, &forbidden, seed);

        if let Some(matching) = solve(&reg, &domains) {
            prop_assert_eq!(matching.len(), n);
            let mut destinations = HashSet::new();
            for (source, destination) in matching.pairs() {
                prop_assert_ne!(source, destination);
                prop_assert!(destinations.insert(destination));
                prop_assert!(!forbidden.is_forbidden(source, destination));
            }
            prop_assert!(matching.verify(&reg, &forbidden).is_ok());
        }
    }

    #[test]
    fn prop_same_seed_same_matching((n, raw_groups, seed) in scenario()) {
        let reg = Registry::new(
            (0..n).map(|i| Participant::new(format!("P{:02}", i), "x")).collect(),
        ).unwrap();
        let groups: Vec<ExclusionGroup> = raw_groups
            .iter()
            .map(|g| ExclusionGroup::new(g.iter().map(|i| ParticipantId(*i))))
            .collect();
        let forbidden = resolve(&groups);

        let first = solve(&reg, &build(&reg, &forbidden, seed));
        let second = solve(&reg, &build(&reg, &forbidden, seed));
        prop_assert_eq!(first, second);
    }
}
