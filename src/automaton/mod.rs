//! Deterministic dictionary automaton: prefix-tree construction, suffix-chain
//! compression into a DAG, and concurrent exact matching.
//!
//! Construction runs in strict phases: targets are inserted longest-first
//! into a prefix tree whose final transitions all land on one shared sink;
//! maximal linear suffix chains are discovered bottom-up and duplicates are
//! merged onto canonical chains; the structure is verified and frozen. The
//! frozen automaton is immutable, so matching needs no coordination at all.

mod builder;
mod edges;
mod error;
mod graph;
mod matcher;
mod store;
mod suffix;

pub use builder::{build, build_with, BuildOptions};
pub use error::{Error, Result};
pub use graph::{EdgeRecord, Vertex, VertexKind};
pub use store::Phase;

use store::{NodeId, Store};

/// A frozen, read-only dictionary automaton.
///
/// Built by [`build`] or [`build_with`]. Matching and enumeration are pure
/// reads and may run from any number of threads; dropping the automaton
/// releases the whole node store at once.
pub struct Automaton {
    store: Store,
    root: NodeId,
    sink: NodeId,
}

impl Automaton {
    pub(crate) fn new(store: Store, root: NodeId, sink: NodeId) -> Self {
        debug_assert_eq!(store.phase(), Phase::Frozen);
        Automaton { store, root, sink }
    }

    /// Structural statistics of the frozen graph.
    ///
    /// # Examples
    ///
    /// ```
    /// use wordgraph::automaton::build;
    ///
    /// let automaton = build(["page", "pages"]).unwrap();
    /// let metrics = automaton.info();
    /// assert_eq!(metrics.nodes, 6);
    /// assert_eq!(metrics.terminals, 2);
    /// assert_eq!(metrics.leaves, 1);
    /// assert_eq!(metrics.roots, 1);
    /// ```
    pub fn info(&self) -> Metrics {
        let mut metrics = Metrics::default();
        let mut indegree = vec![0usize; self.store.capacity()];
        for id in self.store.ids() {
            let out = self.store.out(id);
            metrics.nodes += 1;
            metrics.edges += out.len();
            if out.is_empty() {
                metrics.leaves += 1;
            }
            if out.len() > 1 {
                metrics.branches += 1;
            }
            if self.store.terminal(id) {
                metrics.terminals += 1;
            }
            for (_, child) in out.iter() {
                indegree[child as usize] += 1;
            }
        }
        metrics.heads = self.store.out(self.root).len();
        metrics.roots = self
            .store
            .ids()
            .filter(|&id| indegree[id as usize] == 0)
            .count();
        metrics
    }
}

impl std::fmt::Debug for Automaton {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Automaton")
            .field("nodes", &self.store.len())
            .finish()
    }
}

/// Aggregate counts describing a frozen automaton.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Metrics {
    /// Live nodes.
    pub nodes: usize,
    /// Forward transitions.
    pub edges: usize,
    /// Outgoing transitions of the root.
    pub heads: usize,
    /// Terminal nodes.
    pub terminals: usize,
    /// Nodes with more than one outgoing transition.
    pub branches: usize,
    /// Nodes with no outgoing transitions; always exactly one, the sink.
    pub leaves: usize,
    /// Nodes with no incoming transitions; always exactly one, the root.
    pub roots: usize,
}

#[cfg(test)]
mod test {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn exact_membership_with_nested_prefixes() {
        let automaton = build(["abc", "a", "xyz", "abcdef", "abcpqr"]).unwrap();
        for hit in ["a", "abc", "abcdef", "abcpqr", "xyz"] {
            assert!(automaton.is_match(hit), "{hit}");
        }
        for miss in ["", "x", "b", "ab", "abcd", "abcdxyz", "xyzabc"] {
            assert!(!automaton.is_match(miss), "{miss}");
        }
    }

    #[test]
    fn multi_byte_code_points_match_exactly() {
        let automaton = build(["好久不见", "龙年"]).unwrap();
        assert!(automaton.is_match("好久不见"));
        assert!(automaton.is_match("龙年"));
        assert!(!automaton.is_match("好久"));
        assert!(!automaton.is_match("龙"));
        assert!(!automaton.is_match("黑龙江"));
        assert!(!automaton.is_match(""));
    }

    #[test]
    fn unicode_tails_share_nodes() {
        // both words end with the same single-transition tail into the sink
        let automaton = build(["大猫", "小猫"]).unwrap();
        assert_eq!(automaton.info().nodes, 3);
        assert!(automaton.is_match("大猫"));
        assert!(automaton.is_match("小猫"));
        assert!(!automaton.is_match("猫"));
    }

    #[test]
    fn verb_dictionary_compresses_to_known_shape() {
        let targets = [
            "walk", "talk", "walking", "talking", "wall", "king", "page", "pages", "paging",
            "wag", "wage", "wages",
        ];
        let automaton = build(targets).unwrap();
        assert_eq!(
            automaton.info(),
            Metrics {
                nodes: 19,
                edges: 24,
                heads: 4,
                terminals: 6,
                branches: 4,
                leaves: 1,
                roots: 1,
            }
        );
        for word in targets {
            assert!(automaton.is_match(word), "{word}");
        }
        for miss in ["wa", "walki", "alking", "kin", "pagin", "wages "] {
            assert!(!automaton.is_match(miss), "{miss}");
        }
    }

    #[test]
    fn words_without_shared_tails_stay_separate() {
        let automaton = build(["ab", "cd"]).unwrap();
        assert!(automaton.is_match("ab"));
        assert!(automaton.is_match("cd"));
        assert!(!automaton.is_match("ac"));
        // root, sink, and one interior node per word
        assert_eq!(automaton.info().nodes, 4);
    }

    fn tokenize(text: &str) -> Vec<(String, (usize, usize))> {
        let mut tokens = Vec::new();
        for (line_no, line) in text.lines().enumerate() {
            let mut token = String::new();
            let mut start = 0;
            for (col, c) in line.chars().enumerate() {
                if c.is_alphabetic() {
                    if token.is_empty() {
                        start = col;
                    }
                    token.push(c);
                } else if !token.is_empty() {
                    tokens.push((std::mem::take(&mut token), (line_no, start)));
                }
            }
            if !token.is_empty() {
                tokens.push((token, (line_no, start)));
            }
        }
        tokens
    }

    #[test]
    fn bulk_matching_over_tokenized_text() {
        let text = "lorem ipsum dolor sit amet nunc\nnulla facilisi magna nunc sed ipsum";
        let targets = ["nunc", "nulla", "magna", "ipsum"];
        let automaton = build(targets).unwrap();
        let tokens = tokenize(text);

        let mut expected: HashMap<String, Vec<(usize, usize)>> = HashMap::new();
        for (token, at) in &tokens {
            if targets.contains(&token.as_str()) {
                expected.entry(token.clone()).or_default().push(*at);
            }
        }

        let hits = automaton.match_many(tokens);
        assert_eq!(hits, expected);
        assert_eq!(hits["nunc"], vec![(0, 27), (1, 21)]);
        assert!(!hits.contains_key("dolor"));
    }

    #[test]
    fn insertion_order_does_not_affect_matching() {
        use itertools::Itertools;

        let targets = ["walk", "walking", "king", "wag"];
        let probes = [
            "walk", "walking", "king", "wag", "", "w", "wa", "walkin", "walkings", "kin", "ing",
        ];
        let baseline: Vec<bool> = {
            let automaton = build(targets).unwrap();
            probes.iter().map(|q| automaton.is_match(q)).collect()
        };
        for permutation in targets.iter().permutations(targets.len()) {
            let automaton = build(permutation).unwrap();
            let outcomes: Vec<bool> = probes.iter().map(|q| automaton.is_match(q)).collect();
            assert_eq!(outcomes, baseline);
        }
    }

    #[test]
    fn automaton_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Automaton>();
    }

    #[test]
    fn matching_is_safe_across_threads() {
        let automaton = build(["walk", "talk", "walking"]).unwrap();
        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    for _ in 0..100 {
                        assert!(automaton.is_match("walking"));
                        assert!(!automaton.is_match("walkings"));
                    }
                });
            }
        });
    }

    mod property {
        use proptest::prelude::*;

        use super::super::build;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(64))]

            #[test]
            fn round_trip(
                words in prop::collection::vec("[a-d]{1,7}", 1..12),
                probes in prop::collection::vec("[a-e]{0,8}", 0..20),
            ) {
                let automaton = build(&words).unwrap();
                for word in &words {
                    prop_assert!(automaton.is_match(word));
                }
                for probe in &probes {
                    prop_assert_eq!(automaton.is_match(probe), words.contains(probe));
                }
            }

            #[test]
            fn accepted_language_is_exactly_the_input(
                words in prop::collection::vec("[a-c]{1,6}", 1..10),
            ) {
                let automaton = build(&words).unwrap();
                let mut expected = words.clone();
                expected.sort();
                expected.dedup();
                prop_assert_eq!(automaton.words(), expected);
            }

            #[test]
            fn never_larger_than_the_prefix_tree(
                words in prop::collection::vec("[ab]{1,6}", 1..10),
            ) {
                let automaton = build(&words).unwrap();
                let mut prefixes = std::collections::HashSet::new();
                for word in &words {
                    let chars: Vec<char> = word.chars().collect();
                    for end in 1..chars.len() {
                        prefixes.insert(chars[..end].iter().collect::<String>());
                    }
                }
                // root and sink plus at most one interior node per strict prefix
                prop_assert!(automaton.info().nodes <= prefixes.len() + 2);
            }

            #[test]
            fn structural_counts_hold(
                words in prop::collection::vec("[a-d]{1,7}", 1..12),
            ) {
                let metrics = build(&words).unwrap().info();
                prop_assert_eq!(metrics.leaves, 1);
                prop_assert_eq!(metrics.roots, 1);
                prop_assert!(metrics.terminals >= 1);
                prop_assert!(metrics.nodes >= 2);
                prop_assert!(metrics.heads >= 1);
            }
        }
    }
}
