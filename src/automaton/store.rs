use smallvec::SmallVec;

use super::edges::Edges;
use super::error::{Error, Result};

/// Stable, dense node identifier.
pub(crate) type NodeId = u32;

/// Incoming transitions of a node, insertion-ordered and de-duplicated.
///
/// Kept only while the automaton is under construction; discarded at freeze.
type RevEdges = SmallVec<[(char, NodeId); 2]>;

/// Lifecycle phase of an automaton's node store.
///
/// Phases advance strictly forward; once [`Phase::Frozen`] is reached the
/// store is read-only and any mutation is rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Prefix-tree insertion.
    Build,
    /// Suffix-chain discovery.
    Index,
    /// Suffix-chain merging.
    Merge,
    /// Read-only; the reverse-edge index has been discarded.
    Frozen,
}

#[derive(Debug)]
struct Node {
    terminal: bool,
    out: Edges,
}

/// Central owner of all automaton nodes, keyed by dense integer identifiers.
///
/// Identifiers are stable for the lifetime of the store: deleting a node
/// leaves a permanent hole rather than shifting its successors.
#[derive(Debug)]
pub(crate) struct Store {
    slots: Vec<Option<Node>>,
    rev: Option<Vec<RevEdges>>,
    phase: Phase,
    live: usize,
}

impl Store {
    pub(crate) fn new() -> Self {
        Store {
            slots: Vec::new(),
            rev: Some(Vec::new()),
            phase: Phase::Build,
            live: 0,
        }
    }

    pub(crate) fn phase(&self) -> Phase {
        self.phase
    }

    pub(crate) fn advance(&mut self, phase: Phase) {
        tracing::debug!(?phase, nodes = self.live, "phase transition");
        self.phase = phase;
    }

    fn mutable(&self) -> Result<()> {
        if self.phase == Phase::Frozen {
            return Err(Error::Phase(self.phase));
        }
        Ok(())
    }

    /// Allocates a node with empty forward and reverse maps.
    pub(crate) fn new_node(&mut self, terminal: bool) -> Result<NodeId> {
        self.mutable()?;
        let id = self.slots.len() as NodeId;
        self.slots.push(Some(Node { terminal, out: Edges::None }));
        if let Some(rev) = &mut self.rev {
            rev.push(RevEdges::new());
        }
        self.live += 1;
        Ok(id)
    }

    pub(crate) fn is_live(&self, id: NodeId) -> bool {
        self.slots.get(id as usize).is_some_and(|slot| slot.is_some())
    }

    fn node(&self, id: NodeId) -> &Node {
        self.slots[id as usize].as_ref().expect("node slot is live")
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        self.slots[id as usize].as_mut().expect("node slot is live")
    }

    pub(crate) fn terminal(&self, id: NodeId) -> bool {
        self.node(id).terminal
    }

    pub(crate) fn set_terminal(&mut self, id: NodeId) -> Result<()> {
        self.mutable()?;
        self.node_mut(id).terminal = true;
        Ok(())
    }

    pub(crate) fn out(&self, id: NodeId) -> &Edges {
        &self.node(id).out
    }

    pub(crate) fn child(&self, id: NodeId, c: char) -> Option<NodeId> {
        self.node(id).out.get(c)
    }

    /// Sets `parent --c--> child`.
    ///
    /// Setting an already-present mapping to the same child is a no-op;
    /// pointing it somewhere else is an inconsistency and fails, keeping
    /// transitions deterministic.
    pub(crate) fn add_forward(&mut self, parent: NodeId, c: char, child: NodeId) -> Result<()> {
        self.mutable()?;
        if let Some(existing) = self.child(parent, c) {
            if existing == child {
                return Ok(());
            }
            return Err(Error::InvariantViolation(format!(
                "transition {c:?} from node {parent} already leads to node {existing}, not {child}"
            )));
        }
        self.node_mut(parent).out.insert(c, child);
        self.link_reverse(child, c, parent);
        Ok(())
    }

    /// Redirects the existing transition `parent --c-->` onto `new_child`,
    /// returning the prior child.
    pub(crate) fn replace_forward(
        &mut self,
        parent: NodeId,
        c: char,
        new_child: NodeId,
    ) -> Result<NodeId> {
        self.mutable()?;
        if self.child(parent, c).is_none() {
            return Err(Error::InvariantViolation(format!(
                "no transition {c:?} to redirect on node {parent}"
            )));
        }
        let old = self.node_mut(parent).out.replace(c, new_child);
        self.unlink_reverse(old, c, parent);
        self.link_reverse(new_child, c, parent);
        Ok(old)
    }

    /// Removes a node that no longer has any parents.
    pub(crate) fn remove_node(&mut self, id: NodeId) -> Result<()> {
        self.mutable()?;
        if !self.parents(id).is_empty() {
            return Err(Error::InvariantViolation(format!(
                "node {id} cannot be removed while it still has parents"
            )));
        }
        let node = self.slots[id as usize].take().expect("node slot is live");
        for (c, child) in node.out.iter() {
            self.unlink_reverse(child, c, id);
        }
        self.live -= 1;
        Ok(())
    }

    /// Incoming transitions of `id`, in insertion order.
    ///
    /// Only callable before freeze.
    pub(crate) fn parents(&self, id: NodeId) -> &[(char, NodeId)] {
        let rev = self.rev.as_ref().expect("reverse index present before freeze");
        &rev[id as usize]
    }

    fn link_reverse(&mut self, child: NodeId, c: char, parent: NodeId) {
        if let Some(rev) = &mut self.rev {
            let list = &mut rev[child as usize];
            if !list.contains(&(c, parent)) {
                list.push((c, parent));
            }
        }
    }

    fn unlink_reverse(&mut self, child: NodeId, c: char, parent: NodeId) {
        if let Some(rev) = &mut self.rev {
            let list = &mut rev[child as usize];
            if let Some(pos) = list.iter().position(|&entry| entry == (c, parent)) {
                list.remove(pos);
            }
        }
    }

    /// Discards the reverse-edge index and transitions to read-only.
    pub(crate) fn freeze(&mut self) {
        tracing::debug!(nodes = self.live, "store frozen");
        self.rev = None;
        self.phase = Phase::Frozen;
    }

    /// Number of live nodes.
    pub(crate) fn len(&self) -> usize {
        self.live
    }

    /// Upper bound on identifiers ever handed out (live or deleted).
    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Identifiers of all live nodes, ascending.
    pub(crate) fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|_| i as NodeId))
    }
}
