//! # wordgraph
//!
//! Exact whole-string membership testing against a fixed dictionary.
//!
//! [`build`](automaton::build) inserts every target string into a prefix tree
//! rooted at a start node, with each word's final transition landing on one
//! shared sink. Common non-branching, non-terminal suffix chains are then
//! merged into shared tails, turning the tree into a compact DAG. The frozen
//! automaton answers a membership query in O(query length) and matches bulk
//! query batches in parallel.
//!
//! ## Quick start
//!
//! ```
//! use wordgraph::automaton::build;
//!
//! let automaton = build(["walk", "walking", "wall", "king"]).unwrap();
//!
//! assert!(automaton.is_match("walking"));
//! assert!(!automaton.is_match("walkin"));
//! assert!(!automaton.is_match(""));
//! ```
//!
//! ## Bulk matching
//!
//! Many `(query, reference)` pairs are matched in parallel; every matched
//! query maps to its references in input order, and unmatched queries are
//! omitted:
//!
//! ```
//! use wordgraph::automaton::build;
//!
//! let automaton = build(["nunc", "magna"]).unwrap();
//! let hits = automaton.match_many([("nunc", 3), ("lorem", 9), ("nunc", 17)]);
//! assert_eq!(hits["nunc"], vec![3, 17]);
//! assert!(!hits.contains_key("lorem"));
//! ```
//!
//! ## Inspecting the graph
//!
//! [`info`](automaton::Automaton::info) reports structural counts, and
//! [`enumerate`](automaton::Automaton::enumerate) lists vertices and edges
//! for external diagramming:
//!
//! ```
//! use wordgraph::automaton::build;
//!
//! let automaton = build(["page", "pages"]).unwrap();
//! assert_eq!(automaton.info().nodes, 6);
//! let (vertices, edges) = automaton.enumerate();
//! assert_eq!(vertices.len(), 6);
//! assert_eq!(edges.len(), 5);
//! ```

#![warn(missing_docs)]

/// Dictionary automaton: node store, construction pipeline, matching, and
/// structural enumeration.
pub mod automaton;
