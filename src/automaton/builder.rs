use std::cmp::Reverse;
use std::time::{Duration, Instant};

use itertools::{Itertools, Position};
use smallvec::SmallVec;

use super::error::{Error, Result};
use super::store::{NodeId, Phase, Store};
use super::suffix;
use super::Automaton;

/// Construction options.
#[derive(Clone, Copy, Debug)]
pub struct BuildOptions {
    /// Upper bound on the wall-clock time of each construction phase.
    ///
    /// Exceeding it aborts the whole build with [`Error::Timeout`].
    pub phase_timeout: Duration,
}

impl Default for BuildOptions {
    fn default() -> Self {
        BuildOptions {
            phase_timeout: Duration::from_secs(5),
        }
    }
}

type Word = SmallVec<[char; 32]>;

/// Builds an automaton from `targets` with default options.
///
/// Targets must be non-empty strings; duplicates are idempotent and insertion
/// order does not affect which queries match.
///
/// # Errors
///
/// Returns [`Error::EmptyInput`] for an empty target list,
/// [`Error::EmptyTarget`] if any target is the empty string, and
/// [`Error::Timeout`] or [`Error::InvariantViolation`] if construction goes
/// wrong internally.
///
/// # Examples
///
/// ```
/// use wordgraph::automaton::build;
///
/// let automaton = build(["walk", "walking", "wall"]).unwrap();
/// assert!(automaton.is_match("walking"));
/// assert!(!automaton.is_match("walkin"));
/// ```
pub fn build<I, S>(targets: I) -> Result<Automaton>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    build_with(targets, BuildOptions::default())
}

/// Builds an automaton from `targets` under explicit [`BuildOptions`].
pub fn build_with<I, S>(targets: I, options: BuildOptions) -> Result<Automaton>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut words: Vec<Word> = Vec::new();
    for target in targets {
        let word: Word = target.as_ref().chars().collect();
        if word.is_empty() {
            return Err(Error::EmptyTarget);
        }
        words.push(word);
    }
    if words.is_empty() {
        return Err(Error::EmptyInput);
    }

    let mut builder = Builder::new(options.phase_timeout)?;
    builder.insert_all(words)?;
    let Builder {
        mut store,
        root,
        sink,
        timeout,
    } = builder;

    store.advance(Phase::Index);
    let mut index = suffix::build_suffix_index(&store, sink, timeout)?;

    store.advance(Phase::Merge);
    suffix::merge_suffixes(&mut store, sink, &mut index, timeout)?;

    verify(&store, root, sink)?;
    store.freeze();
    Ok(Automaton::new(store, root, sink))
}

/// Inserts targets into a prefix tree whose final transitions all land on a
/// single shared sink.
struct Builder {
    store: Store,
    root: NodeId,
    sink: NodeId,
    timeout: Duration,
}

impl Builder {
    fn new(timeout: Duration) -> Result<Self> {
        let mut store = Store::new();
        let root = store.new_node(false)?;
        let sink = store.new_node(true)?;
        Ok(Builder {
            store,
            root,
            sink,
            timeout,
        })
    }

    fn insert_all(&mut self, mut words: Vec<Word>) -> Result<()> {
        let deadline = Instant::now() + self.timeout;
        // Longest first: a shorter word that prefixes an already-inserted
        // longer one only has to flag an existing node as terminal.
        words.sort_by_key(|word| Reverse(word.len()));
        for word in &words {
            if Instant::now() >= deadline {
                return Err(Error::Timeout(self.timeout));
            }
            self.insert(word)?;
        }
        tracing::debug!(
            targets = words.len(),
            nodes = self.store.len(),
            "prefix tree built"
        );
        Ok(())
    }

    fn insert(&mut self, word: &[char]) -> Result<()> {
        let mut cur = self.root;
        let mut consumed = 0;
        while consumed < word.len() {
            match self.store.child(cur, word[consumed]) {
                Some(next) => {
                    cur = next;
                    consumed += 1;
                }
                None => break,
            }
        }
        if consumed == word.len() {
            // The whole word already exists as a path; its endpoint becomes
            // terminal (a no-op for duplicates ending at the sink).
            return self.store.set_terminal(cur);
        }
        if cur == self.sink {
            return Err(Error::InvariantViolation(
                "walk reached the sink with input remaining".to_string(),
            ));
        }
        for (position, c) in word[consumed..].iter().copied().with_position() {
            match position {
                Position::Last | Position::Only => {
                    self.store.add_forward(cur, c, self.sink)?;
                }
                Position::First | Position::Middle => {
                    let next = self.store.new_node(false)?;
                    self.store.add_forward(cur, c, next)?;
                    cur = next;
                }
            }
        }
        Ok(())
    }
}

/// Structural checks run right before freezing.
///
/// The forward graph must be a DAG rooted at `root` in which every node is
/// reachable from the root and reaches the sink, and the sink must be the one
/// and only node without outgoing transitions.
fn verify(store: &Store, root: NodeId, sink: NodeId) -> Result<()> {
    if store.terminal(root) {
        return Err(Error::InvariantViolation("root must not be terminal".into()));
    }
    if !store.terminal(sink) {
        return Err(Error::InvariantViolation("sink must be terminal".into()));
    }
    for id in store.ids() {
        if store.out(id).is_empty() && id != sink {
            return Err(Error::InvariantViolation(format!(
                "node {id} has no outgoing transitions but is not the sink"
            )));
        }
    }

    // Depth-first walk from the root: every live node must be visited exactly
    // once and no back edge may exist.
    let mut state = vec![0u8; store.capacity()]; // 0 new, 1 open, 2 done
    let mut stack: Vec<(NodeId, usize)> = vec![(root, 0)];
    state[root as usize] = 1;
    let mut reached = 1usize;
    while let Some(top) = stack.last_mut() {
        let (node, index) = *top;
        match store.out(node).entry(index) {
            Some((_, child)) => {
                top.1 += 1;
                match state[child as usize] {
                    0 => {
                        state[child as usize] = 1;
                        reached += 1;
                        stack.push((child, 0));
                    }
                    1 => {
                        return Err(Error::InvariantViolation(format!(
                            "cycle through node {child}"
                        )));
                    }
                    _ => {}
                }
            }
            None => {
                state[node as usize] = 2;
                stack.pop();
            }
        }
    }
    if reached != store.len() {
        return Err(Error::InvariantViolation(format!(
            "{} nodes are unreachable from the root",
            store.len() - reached
        )));
    }

    // Ascend the reverse index from the sink: every node must reach it.
    let mut seen = vec![false; store.capacity()];
    let mut stack = vec![sink];
    seen[sink as usize] = true;
    let mut reaching = 1usize;
    while let Some(node) = stack.pop() {
        for &(_, parent) in store.parents(node) {
            if !seen[parent as usize] {
                seen[parent as usize] = true;
                reaching += 1;
                stack.push(parent);
            }
        }
    }
    if reaching != store.len() {
        return Err(Error::InvariantViolation(format!(
            "{} nodes cannot reach the sink",
            store.len() - reaching
        )));
    }
    Ok(())
}
