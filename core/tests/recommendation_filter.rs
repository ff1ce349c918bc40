//! Recency filter over AI recommendations.

use std::collections::HashSet;
use trainsim_core::recommendation::{filter_recent, Recommendation};

fn recs(employee_id: u64, ids: &[u64]) -> Vec<Recommendation> {
    ids.iter()
        .map(|&id| Recommendation::new(employee_id, id, format!("Item {id}")))
        .collect()
}

#[test]
fn recently_completed_content_is_dropped() {
    let recent: HashSet<u64> = [555].into();
    let kept = filter_recent(recs(2000, &[555, 777]), &recent);
    assert_eq!(kept, recs(2000, &[777]));
}

#[test]
fn empty_recency_set_keeps_everything() {
    let input = recs(2000, &[3, 1, 2]);
    assert_eq!(filter_recent(input.clone(), &HashSet::new()), input);
}

#[test]
fn order_is_preserved() {
    let recent: HashSet<u64> = [2, 4].into();
    let kept = filter_recent(recs(1, &[5, 4, 3, 2, 1]), &recent);
    let ids: Vec<_> = kept.iter().map(|r| r.content_id).collect();
    assert_eq!(ids, vec![5, 3, 1]);
}

#[test]
fn filtering_twice_changes_nothing() {
    let recent: HashSet<u64> = [10, 30].into();
    let once = filter_recent(recs(1, &[10, 20, 30, 40]), &recent);
    let twice = filter_recent(once.clone(), &recent);
    assert_eq!(once, twice);
}

#[test]
fn everything_recent_leaves_nothing() {
    let recent: HashSet<u64> = [1, 2].into();
    assert!(filter_recent(recs(1, &[1, 2, 1]), &recent).is_empty());
}
