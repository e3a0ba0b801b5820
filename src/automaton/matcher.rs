use std::collections::HashMap;

use rayon::prelude::*;

use super::store::NodeId;
use super::Automaton;

impl Automaton {
    /// Returns true if `query` is exactly one of the dictionary targets.
    ///
    /// The walk consumes one Unicode scalar value at a time; a missing
    /// transition fails immediately and a fully consumed query succeeds only
    /// on a terminal node. The empty query never matches.
    ///
    /// # Examples
    ///
    /// ```
    /// use wordgraph::automaton::build;
    ///
    /// let automaton = build(["好久不见", "龙年"]).unwrap();
    /// assert!(automaton.is_match("龙年"));
    /// assert!(!automaton.is_match("龙"));
    /// assert!(!automaton.is_match(""));
    /// ```
    pub fn is_match(&self, query: &str) -> bool {
        let mut node = self.root;
        for c in query.chars() {
            match self.store.child(node, c) {
                Some(next) => node = next,
                None => return false,
            }
        }
        self.store.terminal(node)
    }

    /// Returns true if at least one target starts with `prefix`.
    ///
    /// The empty prefix is trivially true.
    pub fn has_prefix(&self, prefix: &str) -> bool {
        let mut node = self.root;
        for c in prefix.chars() {
            match self.store.child(node, c) {
                Some(next) => node = next,
                None => return false,
            }
        }
        true
    }

    /// Matches many independent `(query, reference)` pairs in parallel.
    ///
    /// Every matched query becomes a key mapping to its references in input
    /// order; unmatched pairs are omitted. References are opaque to the
    /// automaton — byte offsets, `(line, column)` pairs, whatever the caller
    /// carries.
    ///
    /// # Examples
    ///
    /// ```
    /// use wordgraph::automaton::build;
    ///
    /// let automaton = build(["nunc", "nulla"]).unwrap();
    /// let hits = automaton.match_many([("nunc", 0), ("ipsum", 6), ("nunc", 12)]);
    /// assert_eq!(hits.len(), 1);
    /// assert_eq!(hits["nunc"], vec![0, 12]);
    /// ```
    pub fn match_many<Q, R>(&self, pairs: impl IntoIterator<Item = (Q, R)>) -> HashMap<String, Vec<R>>
    where
        Q: AsRef<str> + Send,
        R: Send,
    {
        let pairs: Vec<(Q, R)> = pairs.into_iter().collect();
        let mut hits: Vec<(usize, Q, R)> = pairs
            .into_par_iter()
            .enumerate()
            .filter_map(|(position, (query, reference))| {
                if self.is_match(query.as_ref()) {
                    Some((position, query, reference))
                } else {
                    None
                }
            })
            .collect();
        hits.sort_unstable_by_key(|&(position, _, _)| position);

        let mut grouped: HashMap<String, Vec<R>> = HashMap::new();
        for (_, query, reference) in hits {
            grouped
                .entry(query.as_ref().to_string())
                .or_default()
                .push(reference);
        }
        grouped
    }

    /// Lists every target accepted by the automaton, in lexicographic order.
    pub fn words(&self) -> Vec<String> {
        let mut words = Vec::new();
        let mut prefix = String::new();
        self.collect_words(self.root, &mut prefix, &mut words);
        words
    }

    fn collect_words(&self, node: NodeId, prefix: &mut String, words: &mut Vec<String>) {
        if self.store.terminal(node) {
            words.push(prefix.clone());
        }
        for (c, child) in self.store.out(node).iter() {
            prefix.push(c);
            self.collect_words(child, prefix, words);
            prefix.pop();
        }
    }
}

#[cfg(test)]
mod test {
    use super::super::build;

    #[test]
    fn walks_fail_on_missing_transitions() {
        let automaton = build(["walk", "wall"]).unwrap();
        assert!(automaton.is_match("walk"));
        assert!(automaton.is_match("wall"));
        assert!(!automaton.is_match("walks"));
        assert!(!automaton.is_match("wal"));
        assert!(!automaton.is_match("w"));
        assert!(!automaton.is_match("talk"));
    }

    #[test]
    fn empty_query_never_matches() {
        let automaton = build(["walk"]).unwrap();
        assert!(!automaton.is_match(""));
    }

    #[test]
    fn prefix_lookup() {
        let automaton = build(["walk", "wall"]).unwrap();
        assert!(automaton.has_prefix(""));
        assert!(automaton.has_prefix("wa"));
        assert!(automaton.has_prefix("walk"));
        assert!(!automaton.has_prefix("walks"));
        assert!(!automaton.has_prefix("t"));
    }

    #[test]
    fn match_many_groups_references_in_input_order() {
        let automaton = build(["walk", "talk"]).unwrap();
        let pairs = [
            ("talk", 10),
            ("walk", 20),
            ("stalk", 30),
            ("talk", 40),
            ("walk", 50),
        ];
        let hits = automaton.match_many(pairs);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits["talk"], vec![10, 40]);
        assert_eq!(hits["walk"], vec![20, 50]);
        assert!(!hits.contains_key("stalk"));
    }

    #[test]
    fn match_many_agrees_with_sequential_matching() {
        let automaton = build(["ab", "abc", "b", "cccc"]).unwrap();
        let pairs: Vec<(String, usize)> = ["ab", "x", "b", "abc", "ab", "", "cccc", "bb"]
            .iter()
            .enumerate()
            .map(|(i, q)| (q.to_string(), i))
            .collect();

        let mut expected: std::collections::HashMap<String, Vec<usize>> = Default::default();
        for (query, reference) in &pairs {
            if automaton.is_match(query) {
                expected.entry(query.clone()).or_default().push(*reference);
            }
        }
        assert_eq!(automaton.match_many(pairs), expected);
    }

    #[test]
    fn match_many_on_empty_input_is_empty() {
        let automaton = build(["walk"]).unwrap();
        let hits = automaton.match_many(Vec::<(String, u32)>::new());
        assert!(hits.is_empty());
    }

    #[test]
    fn words_lists_the_language_in_order() {
        let targets = ["pages", "walk", "page", "talk", "paging"];
        let automaton = build(targets).unwrap();
        assert_eq!(
            automaton.words(),
            vec!["page", "pages", "paging", "talk", "walk"]
        );
    }

    #[test]
    fn words_survive_suffix_sharing() {
        let automaton = build(["walking", "talking", "king"]).unwrap();
        assert_eq!(automaton.words(), vec!["king", "talking", "walking"]);
    }
}
