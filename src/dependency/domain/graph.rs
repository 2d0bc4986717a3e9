//! Arena-style adjacency index over dependency edges.
//!
//! Edges live in a flat map keyed by `(predecessor, successor)`; forward and
//! backward adjacency sets hold identity keys only, so relationships are index
//! lookups rather than object references.
//!
//! Every traversal is iterative with an explicit stack and a visited set. A
//! corrupt persisted cycle therefore cannot make a search loop forever.

use super::DependencyEdge;
use crate::task::domain::TaskIdentity;
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use std::fmt;

type EdgeKey = (TaskIdentity, TaskIdentity);

/// Ordered list of tasks forming a closed loop.
///
/// The first and last entries are the same task. For an edge `C -> A` added
/// on top of `A -> B -> C`, the path is `[C, A, B, C]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CyclePath(Vec<TaskIdentity>);

impl CyclePath {
    /// Returns the tasks along the loop, start task repeated at the end.
    #[must_use]
    pub const fn tasks(&self) -> &[TaskIdentity] {
        self.0.as_slice()
    }

    /// Number of distinct tasks in the loop.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len().saturating_sub(1)
    }

    /// Returns `true` when the path holds no loop.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for CyclePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for task in &self.0 {
            if !first {
                f.write_str(" -> ")?;
            }
            write!(f, "{task}")?;
            first = false;
        }
        Ok(())
    }
}

/// In-memory adjacency index of the dependency graph.
#[derive(Debug, Clone, Default)]
pub struct DependencyIndex {
    edges: HashMap<EdgeKey, DependencyEdge>,
    successors: HashMap<TaskIdentity, BTreeSet<TaskIdentity>>,
    predecessors: HashMap<TaskIdentity, BTreeSet<TaskIdentity>>,
}

impl DependencyIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an index from a set of edges, as loaded from storage.
    ///
    /// No acyclicity check is applied; use [`Self::is_acyclic`] to detect
    /// corrupt input.
    #[must_use]
    pub fn from_edges(edges: impl IntoIterator<Item = DependencyEdge>) -> Self {
        let mut index = Self::new();
        for edge in edges {
            index.insert(edge);
        }
        index
    }

    /// Number of edges in the index.
    #[must_use]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Returns `true` when the index has no edges.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Returns the edge between two tasks, if present.
    #[must_use]
    pub fn edge(
        &self,
        predecessor: &TaskIdentity,
        successor: &TaskIdentity,
    ) -> Option<&DependencyEdge> {
        self.edges.get(&(predecessor.clone(), successor.clone()))
    }

    /// Iterates over every edge in unspecified order.
    pub fn edges(&self) -> impl Iterator<Item = &DependencyEdge> {
        self.edges.values()
    }

    /// Inserts an edge, returning the edge it replaced for the same pair.
    pub fn insert(&mut self, edge: DependencyEdge) -> Option<DependencyEdge> {
        let predecessor = edge.predecessor().clone();
        let successor = edge.successor().clone();
        self.successors
            .entry(predecessor.clone())
            .or_default()
            .insert(successor.clone());
        self.predecessors
            .entry(successor.clone())
            .or_default()
            .insert(predecessor.clone());
        self.edges.insert((predecessor, successor), edge)
    }

    /// Removes the edge between two tasks, returning it if present.
    pub fn remove(
        &mut self,
        predecessor: &TaskIdentity,
        successor: &TaskIdentity,
    ) -> Option<DependencyEdge> {
        let removed = self
            .edges
            .remove(&(predecessor.clone(), successor.clone()))?;
        detach(&mut self.successors, predecessor, successor);
        detach(&mut self.predecessors, successor, predecessor);
        Some(removed)
    }

    /// Direct predecessors of `task`.
    #[must_use]
    pub fn predecessors_of(&self, task: &TaskIdentity) -> BTreeSet<TaskIdentity> {
        self.predecessors.get(task).cloned().unwrap_or_default()
    }

    /// Direct successors of `task`.
    #[must_use]
    pub fn successors_of(&self, task: &TaskIdentity) -> BTreeSet<TaskIdentity> {
        self.successors.get(task).cloned().unwrap_or_default()
    }

    /// Edges pointing into `task`, ordered by predecessor.
    #[must_use]
    pub fn incoming_edges(&self, task: &TaskIdentity) -> Vec<DependencyEdge> {
        self.predecessors
            .get(task)
            .into_iter()
            .flatten()
            .filter_map(|predecessor| self.edge(predecessor, task).cloned())
            .collect()
    }

    /// Returns whether a directed path leads from `from` to `to`.
    ///
    /// A task always reaches itself.
    #[must_use]
    pub fn is_reachable(&self, from: &TaskIdentity, to: &TaskIdentity) -> bool {
        self.find_path(from, to).is_some()
    }

    /// Finds a directed path from `from` to `to`, both endpoints included.
    ///
    /// Depth-first with an explicit stack; each task is expanded at most once,
    /// so the search is O(V+E) and terminates on any input.
    #[must_use]
    pub fn find_path(&self, from: &TaskIdentity, to: &TaskIdentity) -> Option<Vec<TaskIdentity>> {
        if from == to {
            return Some(vec![from.clone()]);
        }

        let mut visited: HashSet<&TaskIdentity> = HashSet::from([from]);
        let mut parent: HashMap<&TaskIdentity, &TaskIdentity> = HashMap::new();
        let mut stack: Vec<&TaskIdentity> = vec![from];

        while let Some(current) = stack.pop() {
            let Some(next) = self.successors.get(current) else {
                continue;
            };
            for successor in next {
                if !visited.insert(successor) {
                    continue;
                }
                parent.insert(successor, current);
                if successor == to {
                    return Some(reconstruct_path(&parent, from, to));
                }
                stack.push(successor);
            }
        }

        None
    }

    /// Returns the loop that inserting `predecessor -> successor` would close.
    ///
    /// The edge closes a loop exactly when `predecessor` is already reachable
    /// from `successor`.
    #[must_use]
    pub fn cycle_closed_by(
        &self,
        predecessor: &TaskIdentity,
        successor: &TaskIdentity,
    ) -> Option<CyclePath> {
        let path = self.find_path(successor, predecessor)?;
        let mut cycle = Vec::with_capacity(path.len() + 1);
        cycle.push(predecessor.clone());
        cycle.extend(path);
        Some(CyclePath(cycle))
    }

    /// Returns `true` when the indexed edges form no directed cycle.
    ///
    /// Uses Kahn's algorithm, so it is safe to run on corrupt input.
    #[must_use]
    pub fn is_acyclic(&self) -> bool {
        let mut in_degree: HashMap<&TaskIdentity, usize> = HashMap::new();
        for (predecessor, successor) in self.edges.keys() {
            in_degree.entry(predecessor).or_insert(0);
            *in_degree.entry(successor).or_insert(0) += 1;
        }

        let mut ready: VecDeque<&TaskIdentity> = in_degree
            .iter()
            .filter(|(_, degree)| **degree == 0)
            .map(|(task, _)| *task)
            .collect();
        let mut drained = 0_usize;

        while let Some(task) = ready.pop_front() {
            drained += 1;
            for successor in self.successors.get(task).into_iter().flatten() {
                if let Some(degree) = in_degree.get_mut(successor) {
                    *degree = degree.saturating_sub(1);
                    if *degree == 0 {
                        ready.push_back(successor);
                    }
                }
            }
        }

        drained == in_degree.len()
    }
}

fn detach(
    adjacency: &mut HashMap<TaskIdentity, BTreeSet<TaskIdentity>>,
    key: &TaskIdentity,
    neighbour: &TaskIdentity,
) {
    if let Some(neighbours) = adjacency.get_mut(key) {
        neighbours.remove(neighbour);
        if neighbours.is_empty() {
            adjacency.remove(key);
        }
    }
}

fn reconstruct_path(
    parent: &HashMap<&TaskIdentity, &TaskIdentity>,
    from: &TaskIdentity,
    to: &TaskIdentity,
) -> Vec<TaskIdentity> {
    let mut path = vec![to.clone()];
    let mut current = to;
    while current != from {
        let Some(&previous) = parent.get(current) else {
            break;
        };
        path.push(previous.clone());
        current = previous;
    }
    path.reverse();
    path
}
