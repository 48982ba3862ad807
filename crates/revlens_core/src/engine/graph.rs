//! Explicit dependency graph and propagation scheduler.
//!
//! # Responsibility
//! - Record which state fields and derived values each derived value reads.
//! - Fix a topological evaluation order once, at build time.
//! - Decide, per mutation, which derived values must be recomputed.
//!
//! # Invariants
//! - A built graph is acyclic and every dependency is declared.
//! - During one propagation pass each node is visited at most once, after
//!   all of its dependencies.
//! - A node is recomputed only when at least one dependency changed in the
//!   same pass; a recompute that yields an equal value does not dirty its
//!   dependents (early cutoff).

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};

/// One input of a derived node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Dependency<F, D> {
    Field(F),
    Derived(D),
}

/// Graph construction errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    DuplicateNode(String),
    UnknownDependency { node: String, dependency: String },
    Cycle(Vec<String>),
}

impl Display for GraphError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateNode(node) => write!(f, "derived node declared twice: {node}"),
            Self::UnknownDependency { node, dependency } => {
                write!(f, "derived node {node} depends on undeclared {dependency}")
            }
            Self::Cycle(nodes) => write!(f, "dependency cycle among: {}", nodes.join(", ")),
        }
    }
}

impl Error for GraphError {}

/// Collects field and node declarations before validation.
#[derive(Debug)]
pub struct GraphBuilder<F, D> {
    fields: BTreeSet<F>,
    nodes: Vec<(D, Vec<Dependency<F, D>>)>,
}

impl<F, D> Default for GraphBuilder<F, D> {
    fn default() -> Self {
        Self {
            fields: BTreeSet::new(),
            nodes: Vec::new(),
        }
    }
}

impl<F, D> GraphBuilder<F, D>
where
    F: Copy + Ord + Debug,
    D: Copy + Ord + Debug,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a state field that derived nodes may read.
    pub fn field(mut self, field: F) -> Self {
        self.fields.insert(field);
        self
    }

    /// Declares a derived node and its inputs.
    pub fn node(
        mut self,
        node: D,
        dependencies: impl IntoIterator<Item = Dependency<F, D>>,
    ) -> Self {
        self.nodes.push((node, dependencies.into_iter().collect()));
        self
    }

    /// Validates declarations and computes the evaluation order.
    ///
    /// Ties in the order follow declaration order, so the result is
    /// deterministic.
    pub fn build(self) -> Result<DependencyGraph<F, D>, GraphError> {
        let mut index = BTreeMap::<D, usize>::new();
        for (position, (node, _)) in self.nodes.iter().enumerate() {
            if index.insert(*node, position).is_some() {
                return Err(GraphError::DuplicateNode(format!("{node:?}")));
            }
        }

        let mut indegree = vec![0usize; self.nodes.len()];
        let mut dependents = vec![Vec::<usize>::new(); self.nodes.len()];
        for (position, (node, dependencies)) in self.nodes.iter().enumerate() {
            for dependency in dependencies {
                match dependency {
                    Dependency::Field(field) if self.fields.contains(field) => {}
                    Dependency::Derived(upstream) if index.contains_key(upstream) => {
                        indegree[position] += 1;
                        dependents[index[upstream]].push(position);
                    }
                    other => {
                        return Err(GraphError::UnknownDependency {
                            node: format!("{node:?}"),
                            dependency: format!("{other:?}"),
                        });
                    }
                }
            }
        }

        let mut ready: VecDeque<usize> = (0..self.nodes.len())
            .filter(|position| indegree[*position] == 0)
            .collect();
        let mut order = Vec::with_capacity(self.nodes.len());
        while let Some(position) = ready.pop_front() {
            order.push(position);
            for dependent in &dependents[position] {
                indegree[*dependent] -= 1;
                if indegree[*dependent] == 0 {
                    ready.push_back(*dependent);
                }
            }
        }

        if order.len() != self.nodes.len() {
            let stuck = (0..self.nodes.len())
                .filter(|position| indegree[*position] > 0)
                .map(|position| format!("{:?}", self.nodes[position].0))
                .collect();
            return Err(GraphError::Cycle(stuck));
        }

        let order: Vec<D> = order
            .into_iter()
            .map(|position| self.nodes[position].0)
            .collect();
        Ok(DependencyGraph {
            dependencies: self.nodes.into_iter().collect(),
            order,
        })
    }
}

/// Validated, acyclic dependency graph.
#[derive(Debug, Clone)]
pub struct DependencyGraph<F, D> {
    dependencies: BTreeMap<D, Vec<Dependency<F, D>>>,
    order: Vec<D>,
}

impl<F, D> DependencyGraph<F, D>
where
    F: Copy + Ord + Debug,
    D: Copy + Ord + Debug,
{
    /// Derived nodes in evaluation order.
    pub fn order(&self) -> &[D] {
        &self.order
    }

    pub fn dependencies(&self, node: D) -> &[Dependency<F, D>] {
        self.dependencies
            .get(&node)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Runs one propagation pass for the given changed fields.
    ///
    /// `recompute` is called for each stale node in evaluation order and
    /// returns whether the node's value changed. Returns the recomputed nodes
    /// in call order.
    pub fn propagate(
        &self,
        changed_fields: impl IntoIterator<Item = F>,
        mut recompute: impl FnMut(D) -> bool,
    ) -> Vec<D> {
        let mut dirty: BTreeSet<Dependency<F, D>> =
            changed_fields.into_iter().map(Dependency::Field).collect();
        let mut recomputed = Vec::new();
        if dirty.is_empty() {
            return recomputed;
        }

        for node in &self.order {
            let stale = self
                .dependencies(*node)
                .iter()
                .any(|dependency| dirty.contains(dependency));
            if !stale {
                continue;
            }

            recomputed.push(*node);
            if recompute(*node) {
                dirty.insert(Dependency::Derived(*node));
            }
        }
        recomputed
    }
}
