//! Dependency index over a snapshot's task set.
//!
//! This module provides the DependencyGraph structure: the single
//! authoritative view of task dependencies, built once per snapshot from
//! each task's `dependency_ids`. The inverse relation (who waits on whom) is
//! read off the same graph, so it cannot drift from the forward edges.
//!
//! Upstream data is not trusted to be acyclic or closed: dangling ids are
//! recorded and skipped, cycles and self-loops are kept so the analyzer can
//! report them. Every traversal uses an explicit stack.

use crate::core::task::{Task, TaskId, TaskStatus};
use crate::error::{Error, Result};
use crate::clog_warn;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap, HashSet};

/// Node payload: the fields graph checks need, copied out of the task.
#[derive(Debug, Clone)]
struct TaskNode {
    id: TaskId,
    status: TaskStatus,
}

/// A `dependency_ids` entry naming a task that is not in the snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DanglingReference {
    pub task: TaskId,
    pub missing: TaskId,
}

/// Difference between a task's declared `dependent_task_ids` and the
/// transpose computed from every task's `dependency_ids`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MirrorDivergence {
    pub task: TaskId,
    /// Dependents present in the edges but absent from the declared list.
    pub missing: Vec<TaskId>,
    /// Declared dependents with no matching edge.
    pub unexpected: Vec<TaskId>,
}

/// Dependency graph of a task set.
///
/// Edges point from a task to each of its direct dependencies, so outgoing
/// neighbors are dependencies and incoming neighbors are dependents.
pub struct DependencyGraph {
    graph: DiGraph<TaskNode, ()>,
    task_index: HashMap<TaskId, NodeIndex>,
    dangling: Vec<DanglingReference>,
}

impl DependencyGraph {
    /// Build the index from a task list.
    ///
    /// Nodes keep the order of `tasks`. A repeated task id keeps its first
    /// record; repeated dependency ids collapse into one edge.
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let mut graph = DiGraph::with_capacity(tasks.len(), tasks.len());
        let mut task_index = HashMap::with_capacity(tasks.len());

        for task in tasks {
            if task_index.contains_key(&task.id) {
                clog_warn!("DependencyGraph: duplicate task id {}, keeping first", task.id);
                continue;
            }
            let index = graph.add_node(TaskNode {
                id: task.id.clone(),
                status: task.status,
            });
            task_index.insert(task.id.clone(), index);
        }

        let mut dangling = Vec::new();
        let mut linked: HashSet<&TaskId> = HashSet::with_capacity(tasks.len());
        for task in tasks {
            if !linked.insert(&task.id) {
                continue;
            }
            let from = task_index[&task.id];
            for dep in &task.dependency_ids {
                match task_index.get(dep) {
                    Some(&to) => {
                        if graph.find_edge(from, to).is_none() {
                            graph.add_edge(from, to, ());
                        }
                    }
                    None => dangling.push(DanglingReference {
                        task: task.id.clone(),
                        missing: dep.clone(),
                    }),
                }
            }
        }

        if !dangling.is_empty() {
            clog_warn!(
                "DependencyGraph: {} dangling dependency reference(s) ignored",
                dangling.len()
            );
        }

        Self {
            graph,
            task_index,
            dangling,
        }
    }

    /// Number of distinct tasks.
    pub fn task_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of resolved dependency edges.
    pub fn dependency_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn contains(&self, id: &TaskId) -> bool {
        self.task_index.contains_key(id)
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Task ids in snapshot order.
    pub fn task_ids(&self) -> impl Iterator<Item = &TaskId> {
        self.graph.node_weights().map(|node| &node.id)
    }

    pub fn status(&self, id: &TaskId) -> Option<TaskStatus> {
        self.task_index.get(id).map(|&index| self.graph[index].status)
    }

    /// Dependency references that name unknown tasks.
    pub fn dangling(&self) -> &[DanglingReference] {
        &self.dangling
    }

    /// Direct dependencies of `id`, in declaration order.
    pub fn dependencies(&self, id: &TaskId) -> Vec<&TaskId> {
        match self.task_index.get(id) {
            Some(&index) => self.ids(self.direct(index)),
            None => Vec::new(),
        }
    }

    /// Tasks that list `id` as a direct dependency, in snapshot order.
    pub fn dependents(&self, id: &TaskId) -> Vec<&TaskId> {
        match self.task_index.get(id) {
            Some(&index) => {
                let mut dependents: Vec<NodeIndex> = self
                    .graph
                    .neighbors_directed(index, Direction::Incoming)
                    .collect();
                dependents.sort();
                self.ids(dependents)
            }
            None => Vec::new(),
        }
    }

    /// Number of tasks waiting directly on `id`.
    pub fn dependent_count(&self, id: &TaskId) -> usize {
        self.task_index
            .get(id)
            .map(|&index| {
                self.graph
                    .neighbors_directed(index, Direction::Incoming)
                    .count()
            })
            .unwrap_or(0)
    }

    /// Every task reachable from `id` by following one or more dependency
    /// edges, in snapshot order. Contains `id` itself only when `id` sits
    /// on a cycle.
    pub fn reachable_from(&self, id: &TaskId) -> Vec<&TaskId> {
        match self.task_index.get(id) {
            Some(&index) => {
                let mut reached: Vec<NodeIndex> = self.closure(index).into_iter().collect();
                reached.sort();
                self.ids(reached)
            }
            None => Vec::new(),
        }
    }

    /// Whether some direct dependency of `id` is not `done`.
    ///
    /// Dangling references do not count: an unknown task cannot be shown to
    /// be unfinished.
    pub fn is_blocked_by_dependency(&self, id: &TaskId) -> bool {
        match self.task_index.get(id) {
            Some(&index) => self
                .graph
                .neighbors(index)
                .any(|dep| self.graph[dep].status != TaskStatus::Done),
            None => false,
        }
    }

    /// First dependency cycle found by depth-first search.
    ///
    /// Roots are tried in snapshot order and dependencies in declaration
    /// order. The returned path starts at the task the back-edge points to
    /// and follows dependency edges around the cycle; a self-loop yields a
    /// single task.
    pub fn find_cycle(&self) -> Option<Vec<TaskId>> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Unvisited,
            OnStack,
            Finished,
        }

        let mut marks = vec![Mark::Unvisited; self.graph.node_count()];

        for root in self.graph.node_indices() {
            if marks[root.index()] != Mark::Unvisited {
                continue;
            }

            // (node, its dependencies, next dependency to visit)
            let mut stack: Vec<(NodeIndex, Vec<NodeIndex>, usize)> =
                vec![(root, self.direct(root), 0)];
            marks[root.index()] = Mark::OnStack;

            while let Some(top) = stack.len().checked_sub(1) {
                let (node, next) = {
                    let frame = &mut stack[top];
                    let next = frame.1.get(frame.2).copied();
                    frame.2 += 1;
                    (frame.0, next)
                };

                let Some(next) = next else {
                    marks[node.index()] = Mark::Finished;
                    stack.pop();
                    continue;
                };

                match marks[next.index()] {
                    Mark::Unvisited => {
                        marks[next.index()] = Mark::OnStack;
                        stack.push((next, self.direct(next), 0));
                    }
                    Mark::OnStack => {
                        let start = stack.iter().position(|(n, _, _)| *n == next).unwrap_or(0);
                        return Some(
                            stack[start..]
                                .iter()
                                .map(|(n, _, _)| self.graph[*n].id.clone())
                                .collect(),
                        );
                    }
                    Mark::Finished => {}
                }
            }
        }

        None
    }

    /// Direct dependencies of `id` already implied by another of its
    /// direct dependencies.
    ///
    /// `D` is redundant when it is reachable from some other direct
    /// dependency `O`. Each `O` gets its own traversal, so the reachable
    /// sets never share visited state.
    pub fn redundant_dependencies(&self, id: &TaskId) -> Vec<&TaskId> {
        let Some(&index) = self.task_index.get(id) else {
            return Vec::new();
        };
        let direct = self.direct(index);
        if direct.len() < 2 {
            return Vec::new();
        }

        let closures: Vec<HashSet<NodeIndex>> =
            direct.iter().map(|&dep| self.closure(dep)).collect();

        let redundant = direct
            .iter()
            .enumerate()
            .filter(|(i, dep)| {
                closures
                    .iter()
                    .enumerate()
                    .any(|(j, closure)| j != *i && closure.contains(*dep))
            })
            .map(|(_, &dep)| dep)
            .collect();
        self.ids(redundant)
    }

    /// Compare each task's declared `dependent_task_ids` with the computed
    /// dependents. Tasks missing from the graph are skipped.
    pub fn mirror_divergences(&self, tasks: &[Task]) -> Vec<MirrorDivergence> {
        let mut divergences = Vec::new();
        for task in tasks {
            if !self.contains(&task.id) {
                continue;
            }
            let declared: BTreeSet<&TaskId> = task.dependent_task_ids.iter().collect();
            let computed: BTreeSet<&TaskId> = self.dependents(&task.id).into_iter().collect();
            if declared == computed {
                continue;
            }
            divergences.push(MirrorDivergence {
                task: task.id.clone(),
                missing: computed.difference(&declared).map(|id| (*id).clone()).collect(),
                unexpected: declared.difference(&computed).map(|id| (*id).clone()).collect(),
            });
        }
        if !divergences.is_empty() {
            clog_warn!(
                "DependencyGraph: dependent_task_ids diverge from dependency edges on {} task(s)",
                divergences.len()
            );
        }
        divergences
    }

    /// Task ids ordered so every task comes after all of its dependencies.
    ///
    /// # Errors
    /// Returns `Error::CycleDetected` when the graph is cyclic.
    pub fn topological_order(&self) -> Result<Vec<&TaskId>> {
        let sorted = toposort(&self.graph, None).map_err(|cycle| Error::CycleDetected {
            task: self.graph[cycle.node_id()].id.clone(),
        })?;
        // Edges point at dependencies, so toposort lists dependents first.
        Ok(sorted
            .into_iter()
            .rev()
            .map(|index| &self.graph[index].id)
            .collect())
    }

    /// Outgoing neighbors in edge insertion (declaration) order.
    fn direct(&self, index: NodeIndex) -> Vec<NodeIndex> {
        let mut edges: Vec<_> = self
            .graph
            .edges_directed(index, Direction::Outgoing)
            .map(|edge| (edge.id(), edge.target()))
            .collect();
        edges.sort_by_key(|(edge, _)| *edge);
        edges.into_iter().map(|(_, target)| target).collect()
    }

    /// Nodes reachable from `start` through at least one edge.
    fn closure(&self, start: NodeIndex) -> HashSet<NodeIndex> {
        let mut seen = HashSet::new();
        let mut stack: Vec<NodeIndex> = self.graph.neighbors(start).collect();
        while let Some(node) = stack.pop() {
            if seen.insert(node) {
                stack.extend(self.graph.neighbors(node));
            }
        }
        seen
    }

    fn ids(&self, indices: Vec<NodeIndex>) -> Vec<&TaskId> {
        indices
            .into_iter()
            .map(|index| &self.graph[index].id)
            .collect()
    }
}

impl std::fmt::Debug for DependencyGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DependencyGraph")
            .field("tasks", &self.task_count())
            .field("dependencies", &self.dependency_count())
            .field("dangling", &self.dangling.len())
            .finish()
    }
}
