//! Bottom-up suffix-chain discovery and merging.
//!
//! A *shareable suffix chain* is a maximal path ending at the sink whose
//! intermediate nodes are all non-terminal with exactly one outgoing and one
//! incoming transition. Two chains carrying the same code-point label accept
//! the same way and can share a single canonical copy.

use std::time::{Duration, Instant};

use hashbrown::HashMap;

use super::error::{Error, Result};
use super::store::{NodeId, Store};

/// Label of a chain: the code points read from its head node down to the sink.
pub(crate) type ChainLabel = Box<[char]>;

/// Chain label → canonical head node.
pub(crate) type SuffixIndex = HashMap<ChainLabel, NodeId>;

/// Walks upward from every incoming transition of the sink and records each
/// maximal linear chain under its label.
///
/// The first walk to see a label establishes its canonical node. A walk that
/// dead-ends (terminal node, branching node, or the parentless root) purges
/// every recorded label ending with the dead tail: such labels pass through a
/// node that is not linear and non-terminal all the way up, so sharing across
/// them would be unsound. A later walk may re-register a purged label.
pub(crate) fn build_suffix_index(
    store: &Store,
    sink: NodeId,
    timeout: Duration,
) -> Result<SuffixIndex> {
    let deadline = Instant::now() + timeout;
    let mut index = SuffixIndex::new();
    let entries: Vec<(char, NodeId)> = store.parents(sink).to_vec();
    for (c0, start) in entries {
        if Instant::now() >= deadline {
            return Err(Error::Timeout(timeout));
        }
        let mut tail: Vec<char> = vec![c0];
        let mut node = start;
        loop {
            let linear = !store.terminal(node)
                && store.out(node).len() == 1
                && store.parents(node).len() == 1;
            if !linear {
                index.retain(|label, _| !ends_with(label, &tail));
                break;
            }
            if !index.contains_key(tail.as_slice()) {
                index.insert(tail.clone().into_boxed_slice(), node);
            }
            let (c, parent) = store.parents(node)[0];
            tail.insert(0, c);
            node = parent;
        }
    }
    tracing::trace!(chains = index.len(), "suffix index built");
    Ok(index)
}

/// Rewires duplicate suffix chains onto their canonical copies and deletes
/// the replaced nodes.
///
/// For every incoming transition of the sink, the walk collects the linear
/// chain above it, then picks the longest tail whose canonical node differs
/// from the node actually sitting there. The transition above that node is
/// redirected onto the canonical chain and the whole replaced segment is
/// removed top-down. Index entries whose canonical node is deleted are
/// scrubbed so no later walk can rewire onto a dead node.
pub(crate) fn merge_suffixes(
    store: &mut Store,
    sink: NodeId,
    index: &mut SuffixIndex,
    timeout: Duration,
) -> Result<()> {
    let deadline = Instant::now() + timeout;
    let entries: Vec<(char, NodeId)> = store.parents(sink).to_vec();
    let mut removed = 0usize;
    for (c0, start) in entries {
        if Instant::now() >= deadline {
            return Err(Error::Timeout(timeout));
        }
        // A previous merge may have deleted this branch's bottom node.
        if !store.is_live(start) || store.child(start, c0) != Some(sink) {
            continue;
        }

        let mut chain: Vec<(NodeId, Vec<char>)> = Vec::new();
        let mut tail = vec![c0];
        let mut node = start;
        while !store.terminal(node)
            && store.out(node).len() == 1
            && store.parents(node).len() == 1
        {
            chain.push((node, tail.clone()));
            let (c, parent) = store.parents(node)[0];
            let mut up = Vec::with_capacity(tail.len() + 1);
            up.push(c);
            up.extend_from_slice(&tail);
            tail = up;
            node = parent;
        }

        let mut found: Option<(usize, NodeId)> = None;
        for (depth, (n, label)) in chain.iter().enumerate() {
            if let Some(&canonical) = index.get(label.as_slice()) {
                if canonical != *n {
                    found = Some((depth, canonical));
                }
            }
        }
        let Some((depth, canonical)) = found else {
            continue;
        };

        let (head, _) = chain[depth];
        let (c_up, parent) = store.parents(head)[0];
        store.replace_forward(parent, c_up, canonical)?;
        index.retain(|_, n| !chain[..=depth].iter().any(|(dup, _)| *dup == *n));
        for &(doomed, _) in chain[..=depth].iter().rev() {
            store.remove_node(doomed)?;
            removed += 1;
        }
    }
    tracing::debug!(removed, "duplicate suffix chains merged");
    Ok(())
}

fn ends_with(label: &[char], tail: &[char]) -> bool {
    label.len() >= tail.len() && label[label.len() - tail.len()..] == tail[..]
}
