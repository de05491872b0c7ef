//! Property tests for chain construction and tamper detection.

use hl_ledger::{
    parse_record, verify_chain, ChainBuilder, Entry, FailureKind, HashAlgorithm, Payload,
    Timestamp, GENESIS_HASH,
};
use proptest::prelude::*;
use serde_json::Value;

fn leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        (-1.0e12f64..1.0e12).prop_map(Value::from),
        "\\PC{0,12}".prop_map(Value::from),
    ]
}

fn value() -> impl Strategy<Value = Value> {
    leaf().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::from),
            prop::collection::btree_map("[a-z_]{1,6}", inner, 0..4)
                .prop_map(|map| Value::Object(map.into_iter().collect())),
        ]
    })
}

fn payload() -> impl Strategy<Value = Payload> {
    prop::collection::btree_map("[a-z_]{1,8}", value(), 0..5)
        .prop_map(|map| map.into_iter().collect())
}

fn records() -> impl Strategy<Value = Vec<(f64, String, Payload)>> {
    prop::collection::vec((0.0f64..120.0, "[a-z0-9-]{1,12}", payload()), 1..8)
}

fn build(records: Vec<(f64, String, Payload)>) -> Vec<Entry> {
    let builder = ChainBuilder::new(HashAlgorithm::Sha256);
    let mut tip = GENESIS_HASH.to_string();
    let mut clock = 1_700_000_000.0;
    let mut entries = Vec::new();
    for (step, task_id, payload) in records {
        clock += step;
        let entry = builder
            .append(&tip, Timestamp::from_secs_f64(clock).unwrap(), task_id, payload)
            .unwrap();
        tip = entry.current_hash.clone();
        entries.push(entry);
    }
    entries
}

proptest! {
    #[test]
    fn built_entries_rehash_to_their_stored_hash(records in records()) {
        for entry in build(records) {
            prop_assert!(entry.is_consistent(HashAlgorithm::Sha256));

            let line = entry.to_canonical_line().unwrap();
            let parsed = parse_record(1, &line).unwrap();
            prop_assert!(parsed.is_consistent(HashAlgorithm::Sha256));
        }
    }

    #[test]
    fn built_chain_verifies(records in records()) {
        let entries = build(records);
        let report = verify_chain(&entries, HashAlgorithm::Sha256).unwrap();
        prop_assert!(report.is_valid());
        prop_assert_eq!(report.entries_verified, entries.len());
    }

    #[test]
    fn edited_task_id_fails_at_that_entry(records in records(), pick in any::<prop::sample::Index>()) {
        let mut entries = build(records);
        let idx = pick.index(entries.len());
        entries[idx].task_id.push('!');

        let report = verify_chain(&entries, HashAlgorithm::Sha256).unwrap();
        let failure = report.failure.unwrap();
        prop_assert_eq!(failure.kind(), FailureKind::ContentHashMismatch);
        prop_assert_eq!(failure.position().index, idx);
        prop_assert_eq!(report.entries_verified, idx);
    }

    #[test]
    fn edited_payload_fails_at_that_entry(records in records(), pick in any::<prop::sample::Index>()) {
        let mut entries = build(records);
        let idx = pick.index(entries.len());
        entries[idx].payload.insert("__edited".to_string(), Value::Bool(true));

        let failure = verify_chain(&entries, HashAlgorithm::Sha256).unwrap().failure.unwrap();
        prop_assert_eq!(failure.kind(), FailureKind::ContentHashMismatch);
        prop_assert_eq!(failure.position().index, idx);
    }

    #[test]
    fn edited_timestamp_fails_at_that_entry(records in records(), pick in any::<prop::sample::Index>()) {
        let mut entries = build(records);
        let idx = pick.index(entries.len());
        let bumped = entries[idx].timestamp.as_f64() + 0.5;
        entries[idx].timestamp = Timestamp::from_secs_f64(bumped).unwrap();

        let failure = verify_chain(&entries, HashAlgorithm::Sha256).unwrap().failure.unwrap();
        prop_assert_eq!(failure.kind(), FailureKind::ContentHashMismatch);
        prop_assert_eq!(failure.position().index, idx);
    }

    #[test]
    fn removed_entry_breaks_the_next_link(
        records in prop::collection::vec((0.0f64..120.0, "[a-z]{1,6}", payload()), 3..8),
        pick in any::<prop::sample::Index>(),
    ) {
        let mut entries = build(records);
        // Dropping the final entry is a truncation, which the chain cannot see.
        let idx = pick.index(entries.len() - 1);
        entries.remove(idx);

        let failure = verify_chain(&entries, HashAlgorithm::Sha256).unwrap().failure.unwrap();
        prop_assert_eq!(failure.kind(), FailureKind::ParentLinkMismatch);
        prop_assert_eq!(failure.position().index, idx);
    }

    #[test]
    fn swapped_entries_break_the_first_link(
        records in prop::collection::vec((0.0f64..120.0, "[a-z]{1,6}", payload()), 3..8),
        a in any::<prop::sample::Index>(),
        b in any::<prop::sample::Index>(),
    ) {
        let mut entries = build(records);
        let (i, j) = (a.index(entries.len()), b.index(entries.len()));
        prop_assume!(i != j);
        entries.swap(i, j);

        let failure = verify_chain(&entries, HashAlgorithm::Sha256).unwrap().failure.unwrap();
        prop_assert_eq!(failure.kind(), FailureKind::ParentLinkMismatch);
        prop_assert_eq!(failure.position().index, i.min(j));
    }
}
