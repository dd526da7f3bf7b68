use super::*;

use crate::arena::{NIL, ROOT};
use proptest::prelude::*;
use proptest_derive::Arbitrary;
use std::collections::BTreeMap;

fn validate_trie(t: &XorTrie) {
    let arena = t.arena();
    let mut stack = vec![(ROOT, t.levels())];
    let mut leaf_total = 0usize;
    while let Some((idx, depth)) = stack.pop() {
        assert!(idx != NIL && (idx as usize) <= arena.used(), "index {idx} out of range");
        let node = arena.node(idx);
        if depth == 0 {
            assert_eq!(node.children, [NIL; 2], "leaf {idx} has children");
            leaf_total += node.pass;
            continue;
        }
        let below: usize = node.children.iter().map(|&c| arena.pass(c)).sum();
        assert_eq!(node.pass, below, "pass count of node {idx} must match children");
        for &c in &node.children {
            if c != NIL {
                stack.push((c, depth - 1));
            }
        }
    }
    assert_eq!(leaf_total, t.len(), "leaf multiplicities must sum to len");
}

#[derive(Clone, Debug, Arbitrary)]
enum Op {
    #[proptest(weight = 5)]
    Insert(#[proptest(strategy = "0u32..64")] u32),
    #[proptest(weight = 3)]
    Remove(#[proptest(strategy = "0u32..64")] u32),
    #[proptest(weight = 2)]
    MaxXor(#[proptest(strategy = "0u32..256")] u32),
    #[proptest(weight = 2)]
    CountAtMost(
        #[proptest(strategy = "0u32..256")] u32,
        #[proptest(strategy = "-2i64..300")] i64,
    ),
    #[proptest(weight = 1)]
    Build,
    #[proptest(weight = 1)]
    Clear,
}

fn brute_max(values: &[u32], probe: u32) -> Option<u32> {
    values.iter().map(|v| v ^ probe).max()
}

fn brute_count(values: &[u32], probe: u32, k: i64) -> usize {
    values.iter().filter(|&&v| i64::from(v ^ probe) <= k).count()
}

fn filled(levels: u32, values: &[u32]) -> XorTrie {
    let mut t = XorTrie::with_config(TrieConfig::for_insertions(levels, values.len())).unwrap();
    for &v in values {
        t.insert(v).unwrap();
    }
    t
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 10_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_equivalence_multiset(ops in prop::collection::vec(any::<Op>(), 0..=400)) {
        let mut t = XorTrie::with_config(TrieConfig::for_insertions(6, 400)).unwrap();
        let mut m: BTreeMap<u32, usize> = BTreeMap::new();

        for op in ops {
            match op {
                Op::Insert(v) => {
                    t.insert(v).unwrap();
                    *m.entry(v).or_default() += 1;
                }
                Op::Remove(v) => {
                    let expected = match m.get_mut(&v) {
                        Some(c) => {
                            *c -= 1;
                            if *c == 0 {
                                m.remove(&v);
                            }
                            Ok(())
                        }
                        None => Err(Error::NotPresent { key: v }),
                    };
                    prop_assert_eq!(t.remove(v), expected);
                }
                Op::MaxXor(p) => {
                    let got = m.keys().map(|v| v ^ p).max();
                    prop_assert_eq!(t.max_xor(p), got);
                }
                Op::CountAtMost(p, k) => {
                    let got: usize = m
                        .iter()
                        .filter(|(&v, _)| i64::from(v ^ p) <= k)
                        .map(|(_, &c)| c)
                        .sum();
                    prop_assert_eq!(t.count_xor_at_most(p, k), got);
                }
                Op::Build => {
                    t.build();
                    m.clear();
                }
                Op::Clear => {
                    t.clear();
                    m.clear();
                }
            }
            prop_assert_eq!(t.len(), m.values().sum::<usize>());
        }

        validate_trie(&t);
        let got: Vec<(u32, usize)> = t.iter().collect();
        let expected: Vec<(u32, usize)> = m.into_iter().collect();
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn prop_max_xor_brute_force(values in prop::collection::vec(0u32..1 << 16, 1..=12)) {
        let t = filled(16, &values);
        for &v in &values {
            prop_assert_eq!(t.max_xor(v), brute_max(&values, v));
        }
        let pair_max = values.iter().map(|&v| brute_max(&values, v)).max().flatten();
        prop_assert_eq!(offline::max_pairwise_xor(&values).unwrap().max(Some(0)), pair_max);
    }

    #[test]
    fn prop_count_brute_force(
        values in prop::collection::vec(0u32..1 << 16, 0..=12),
        probe in 0u32..1 << 16,
        k in -1i64..1 << 17,
    ) {
        let t = filled(32, &values);
        prop_assert_eq!(t.count_xor_at_most(probe, k), brute_count(&values, probe, k));
        prop_assert_eq!(t.count_xor_below(probe, k), brute_count(&values, probe, k - 1));
    }

    #[test]
    fn prop_truncated_levels_accept_wide_probes(
        values in prop::collection::vec(0u32..1 << 8, 1..=12),
        probe in any::<u32>(),
        k in any::<u32>(),
    ) {
        let t = filled(8, &values);
        let k = i64::from(k);
        prop_assert_eq!(t.max_xor(probe), brute_max(&values, probe));
        prop_assert_eq!(t.min_xor(probe), values.iter().map(|v| v ^ probe).min());
        prop_assert_eq!(t.count_xor_at_most(probe, k), brute_count(&values, probe, k));
    }

    #[test]
    fn prop_insert_remove_round_trip(
        values in prop::collection::vec(0u32..1 << 10, 0..=12),
        extra in 0u32..1 << 10,
    ) {
        let mut t = XorTrie::with_config(TrieConfig::for_insertions(10, values.len() + 1)).unwrap();
        for &v in &values {
            t.insert(v).unwrap();
        }
        let before = t.arena().slots().to_vec();
        let used_before = t.arena().used();

        t.insert(extra).unwrap();
        let used_after_insert = t.arena().used();
        t.remove(extra).unwrap();

        prop_assert_eq!(t.arena().used(), used_after_insert);
        let now = t.arena().slots();
        for idx in 1..=used_before {
            prop_assert_eq!(now[idx].pass, before[idx].pass);
        }
        validate_trie(&t);
    }

    #[test]
    fn prop_offline_brute_force(
        data in prop::collection::vec(0u32..1 << 12, 0..=16),
        queries in prop::collection::vec((0u32..1 << 12, 0u32..1 << 12, -1i64..1 << 12), 0..=16),
    ) {
        let max_queries: Vec<(u32, u32)> = queries.iter().map(|&(p, b, _)| (p, b)).collect();
        let got = offline::max_xor_with_bound(&data, &max_queries).unwrap();
        for (i, &(p, b)) in max_queries.iter().enumerate() {
            let eligible: Vec<u32> = data.iter().copied().filter(|&v| v <= b).collect();
            prop_assert_eq!(got[i], brute_max(&eligible, p));
        }

        let count_queries: Vec<BoundedCount> = queries
            .iter()
            .map(|&(probe, bound, limit)| BoundedCount { probe, bound, limit })
            .collect();
        let got = offline::count_xor_with_bound(&data, &count_queries).unwrap();
        for (i, q) in count_queries.iter().enumerate() {
            let eligible: Vec<u32> = data.iter().copied().filter(|&v| v <= q.bound).collect();
            prop_assert_eq!(got[i], brute_count(&eligible, q.probe, q.limit));
        }
    }

    #[test]
    fn prop_count_pairs_brute_force(
        values in prop::collection::vec(0u32..1 << 10, 0..=20),
        lo in 0u32..1 << 10,
        hi in 0u32..1 << 10,
    ) {
        let mut expected = 0u64;
        for i in 0..values.len() {
            for j in i + 1..values.len() {
                let x = values[i] ^ values[j];
                if lo <= x && x <= hi {
                    expected += 1;
                }
            }
        }
        prop_assert_eq!(offline::count_pairs_with_xor_in_range(&values, lo, hi).unwrap(), expected);
    }
}

#[test]
fn clear_twice_and_on_fresh_arena() {
    let mut t = XorTrie::with_config(TrieConfig::for_insertions(32, 4)).unwrap();
    t.clear();
    assert_eq!(t.len(), 0);
    for v in [1, 2, 3, 4] {
        t.insert(v).unwrap();
    }
    t.clear();
    t.clear();
    assert_eq!(t.len(), 0);
    validate_trie(&t);

    // The full capacity is available again after a clear.
    for v in [u32::MAX, 0, 1 << 31, 12345] {
        t.insert(v).unwrap();
    }
    validate_trie(&t);
}

#[test]
fn root_path_queries_match_brute_force() {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    let mut rng = StdRng::seed_from_u64(1938);
    let mut scheduler = OfflineScheduler::new();
    for _ in 0..50 {
        let n = rng.gen_range(1..40usize);
        let parents: Vec<Option<usize>> = (0..n)
            .map(|i| if i == 0 || rng.gen_bool(0.1) { None } else { Some(rng.gen_range(0..i)) })
            .collect();
        let queries: Vec<(usize, u32)> = (0..20)
            .map(|_| (rng.gen_range(0..n), rng.gen_range(0..1 << 8)))
            .collect();

        let got = scheduler.max_xor_on_root_paths(&parents, &queries).unwrap();
        for (i, &(node, probe)) in queries.iter().enumerate() {
            let mut best = 0;
            let mut cur = Some(node);
            while let Some(c) = cur {
                best = best.max(probe ^ c as u32);
                cur = parents[c];
            }
            assert_eq!(got[i], best, "query {i}");
        }
    }
}
