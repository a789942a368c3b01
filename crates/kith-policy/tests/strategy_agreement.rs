//! Every strategy must reach the same verdict from the same facts.

use kith_core::{FailureReason, KithConfig, StrategyKind, UserName, Verdict};
use kith_policy::{Facts, PolicyEvaluator, PolicyName};
use kith_social::FriendshipGraph;
use proptest::prelude::*;

const NODES: u8 = 6;

fn evaluators() -> Vec<PolicyEvaluator> {
    StrategyKind::ALL
        .into_iter()
        .map(|kind| PolicyEvaluator::with_strategy(kind, &KithConfig::default()).unwrap())
        .collect()
}

fn name(i: u8) -> UserName {
    UserName::new(format!("u{i}"))
}

/// The verdict every strategy reached, asserting they agree on outcome.
fn agreed(evaluators: &[PolicyEvaluator], policy: PolicyName, facts: &Facts) -> Verdict {
    let verdicts: Vec<(StrategyKind, Verdict)> = evaluators
        .iter()
        .map(|e| (e.strategy_kind(), e.evaluate(policy, facts)))
        .collect();
    let (_, first) = &verdicts[0];
    for (kind, verdict) in &verdicts {
        assert_eq!(
            (verdict.allowed, verdict.failure),
            (first.allowed, first.failure),
            "{kind} disagrees on {policy} with {}",
            facts.to_json()
        );
    }
    first.clone()
}

fn reference_graph() -> FriendshipGraph {
    let mut graph = FriendshipGraph::from_declarations([
        ("Alice", "Bob"),
        ("Bob", "Alice"),
        ("Bob", "Charlie"),
        ("Charlie", "Bob"),
        ("Charlie", "Edward"),
        ("Edward", "Charlie"),
    ]);
    graph.add_user(UserName::from("Dennis"));
    graph
}

#[test]
fn reference_friend_requests() {
    let evaluators = evaluators();
    let cases = [
        ("Alice", "Charlie", true),
        ("Alice", "Edward", true),
        ("Edward", "Alice", true),
        ("Alice", "Dennis", false),
        ("Dennis", "Alice", false),
        ("Alice", "Alice", true),
        ("Dennis", "Dennis", false),
        ("Alice", "Mallory", false),
    ];

    for (actor, target, expected) in cases {
        let facts = Facts::friend_request(
            &UserName::from(actor),
            &UserName::from(target),
            reference_graph(),
        );
        let verdict = agreed(&evaluators, PolicyName::FriendRequest, &facts);
        assert_eq!(verdict.allowed, expected, "{actor} -> {target}");
    }
}

#[test]
fn reference_entry_reads_and_identity() {
    let evaluators = evaluators();
    let alice = UserName::from("Alice");
    let bob = UserName::from("Bob");

    assert!(agreed(&evaluators, PolicyName::EntryRead, &Facts::entry_read(&alice, &alice)).allowed);
    assert!(!agreed(&evaluators, PolicyName::EntryRead, &Facts::entry_read(&bob, &alice)).allowed);
    assert!(
        agreed(&evaluators, PolicyName::IdentityMatch, &Facts::identity_match("123", "123"))
            .allowed
    );
    assert!(
        !agreed(&evaluators, PolicyName::IdentityMatch, &Facts::identity_match("123", "12"))
            .allowed
    );
}

#[test]
fn missing_bindings_fail_closed_everywhere() {
    let evaluators = evaluators();
    let facts = Facts::new().with_text("actor", "Alice").with_text("target", "Bob");
    let verdict = agreed(&evaluators, PolicyName::FriendRequest, &facts);
    assert!(verdict.is_internal_failure());
}

fn chain(len: usize) -> FriendshipGraph {
    FriendshipGraph::from_declarations(
        (0..len).map(|i| (format!("n{i}"), format!("n{}", i + 1))),
    )
}

#[test]
fn dense_cliques_deny_an_outsider_everywhere() {
    let evaluators = evaluators();
    let members: Vec<String> = (0..9).map(|i| format!("c{i}")).collect();
    let mut graph = FriendshipGraph::new();
    for a in &members {
        for b in &members {
            if a != b {
                graph.declare(a.as_str(), b.as_str());
            }
        }
    }
    graph.add_user(UserName::from("outsider"));

    for member in &members {
        let facts = Facts::friend_request(
            &UserName::from(member.as_str()),
            &UserName::from("outsider"),
            graph.clone(),
        );
        let verdict = agreed(&evaluators, PolicyName::FriendRequest, &facts);
        assert_eq!(verdict.failure, Some(FailureReason::Denied), "{member} -> outsider");
    }

    let facts = Facts::friend_request(&UserName::from("c0"), &UserName::from("c8"), graph);
    assert!(agreed(&evaluators, PolicyName::FriendRequest, &facts).allowed);
}

#[test]
fn long_chains_are_allowed_everywhere() {
    let evaluators = evaluators();
    let facts = Facts::friend_request(&UserName::from("n0"), &UserName::from("n80"), chain(80));
    assert!(agreed(&evaluators, PolicyName::FriendRequest, &facts).allowed);

    // Datalog rescans every fact on each round, so its chains stay short.
    let goal_provers: Vec<PolicyEvaluator> = evaluators
        .into_iter()
        .filter(|e| e.strategy_kind() != StrategyKind::Datalog)
        .collect();
    let (start, end) = (UserName::from("n0"), UserName::from("n301"));
    for (actor, target) in [(&start, &end), (&end, &start)] {
        let facts = Facts::friend_request(actor, target, chain(301));
        assert!(agreed(&goal_provers, PolicyName::FriendRequest, &facts).allowed);
    }
}

fn arb_graph() -> impl Strategy<Value = FriendshipGraph> {
    prop::collection::vec((0..NODES, 0..NODES), 0..10).prop_map(|pairs| {
        let mut graph = FriendshipGraph::new();
        for i in 0..NODES {
            graph.add_user(name(i));
        }
        for (from, to) in pairs {
            graph.declare(name(from), name(to));
        }
        graph
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn strategies_agree_on_every_pair(graph in arb_graph()) {
        let evaluators = evaluators();
        for a in 0..NODES {
            for b in 0..NODES {
                let facts = Facts::friend_request(&name(a), &name(b), graph.clone());
                let verdict = agreed(&evaluators, PolicyName::FriendRequest, &facts);
                prop_assert!(!verdict.is_internal_failure());
                prop_assert_eq!(
                    verdict.allowed,
                    kith_social::connected(&name(a), &name(b), &graph)
                );
            }
        }
    }

    #[test]
    fn strategies_agree_on_arbitrary_text(actor in "[A-Za-z\"' ]{0,6}", owner in "[A-Za-z\"' ]{0,6}") {
        let evaluators = evaluators();
        let facts = Facts::entry_read(&UserName::new(actor.clone()), &UserName::new(owner.clone()));
        let verdict = agreed(&evaluators, PolicyName::EntryRead, &facts);
        prop_assert_eq!(verdict.allowed, actor == owner);
    }
}
