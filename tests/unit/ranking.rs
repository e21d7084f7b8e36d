//! Ranking properties over tallies built the way the page loop builds them

use std::collections::HashMap;
use studio_activity::tally::{rank, ActivityTally};

fn build(events: &[(&str, bool)]) -> ActivityTally {
    let mut tally = ActivityTally::new();
    for (name, is_reply) in events {
        if *is_reply {
            tally.record_secondary(name);
        } else {
            tally.record_primary(name);
        }
    }
    tally
}

fn mixed_events() -> Vec<(&'static str, bool)> {
    vec![
        ("mia", false),
        ("leo", false),
        ("mia", true),
        ("ava", true),
        ("leo", true),
        ("zoe", false),
        ("ava", false),
        ("mia", false),
        ("kai", true),
        ("zoe", true),
    ]
}

#[test]
fn test_sums_match_totals() {
    let tally = build(&mixed_events());
    let ranking = tally.ranking();

    let primary: u64 = ranking.iter().map(|u| u.primary_count).sum();
    let secondary: u64 = ranking.iter().map(|u| u.secondary_count).sum();
    assert_eq!(primary, tally.total_primary());
    assert_eq!(secondary, tally.total_secondary());
    assert_eq!(primary, 5);
    assert_eq!(secondary, 5);
}

#[test]
fn test_sorted_non_increasing_with_first_seen_ties() {
    let tally = build(&mixed_events());
    let ranking = tally.ranking();

    for pair in ranking.windows(2) {
        assert!(pair[0].total() >= pair[1].total());
    }

    let order: Vec<_> = ranking.iter().map(|u| u.username.as_str()).collect();
    // mia 3; leo, ava, zoe 2 each in first-seen order; kai 1
    assert_eq!(order, vec!["mia", "leo", "ava", "zoe", "kai"]);
}

#[test]
fn test_every_ranked_user_has_activity() {
    let mut primary = HashMap::new();
    primary.insert("ghost".to_string(), 0);
    primary.insert("real".to_string(), 1);
    let order = vec!["ghost".to_string(), "real".to_string()];

    let ranking = rank(&primary, &HashMap::new(), &order);
    assert_eq!(ranking.len(), 1);
    assert_eq!(ranking[0].username, "real");
}

#[test]
fn test_rank_is_deterministic() {
    let tally = build(&mixed_events());
    let first = rank(
        tally.primary_counts(),
        tally.secondary_counts(),
        tally.first_seen(),
    );
    for _ in 0..10 {
        let again = rank(
            tally.primary_counts(),
            tally.secondary_counts(),
            tally.first_seen(),
        );
        assert_eq!(again, first);
    }
}

#[test]
fn test_usernames_are_opaque() {
    let tally = build(&[("Ünïcødé_user", false), ("with space", true), ("", false)]);
    let names: Vec<_> = tally
        .ranking()
        .into_iter()
        .map(|u| u.username)
        .collect();
    assert_eq!(names, vec!["Ünïcødé_user", "with space", ""]);
}
