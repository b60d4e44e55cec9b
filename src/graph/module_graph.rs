//! Module dependency graph built from a [`ModuleManifest`] + petgraph
//!
//! ## Graph Structure
//!
//! - **Directed Graph**: `A → B` means "A depends on B"
//! - **Nodes**: Modules (one per manifest entry, never duplicated)
//! - **Edges**: Dependency relationships, collapsed to one edge per pair
//! - **Index**: Fast lookups by module id
//! - **Ownership**: Module roots sorted longest-first for file → module mapping
//! - **Cycles**: Detected once at build time (Tarjan SCC), kept as warnings

use super::manifest::{Capability, ModuleManifest};
use crate::core::error::{GraphError, SkippyResult};
use crate::utils::is_within;
use petgraph::Direction;
use petgraph::algo;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

/// A module node in the dependency graph.
#[derive(Debug, Clone)]
pub struct ModuleNode {
  pub id: String,
  pub root: String,
  pub capabilities: BTreeSet<Capability>,
}

/// Module dependency graph.
///
/// Immutable once built; safe to share across threads.
pub struct ModuleGraph {
  graph: DiGraph<ModuleNode, ()>,

  /// Index: module id → node index
  id_to_node: HashMap<String, NodeIndex>,

  /// Module roots, longest first, for longest-prefix ownership
  roots: Vec<(String, NodeIndex)>,

  /// Dependency cycles (each sorted), found at build time
  cycles: Vec<Vec<String>>,
}

impl ModuleGraph {
  /// Build the graph from module metadata.
  ///
  /// # Errors
  /// Duplicate ids, duplicate roots and dependencies on unknown modules.
  /// Cycles are not errors: they are logged and kept in [`ModuleGraph::cycles`].
  pub fn build(manifest: &ModuleManifest) -> SkippyResult<Self> {
    let mut graph = DiGraph::new();
    let mut id_to_node: HashMap<String, NodeIndex> = HashMap::new();
    let mut root_owner: HashMap<&str, &str> = HashMap::new();

    for module in &manifest.modules {
      if id_to_node.contains_key(&module.id) {
        return Err(GraphError::DuplicateModule { id: module.id.clone() }.into());
      }
      if let Some(first) = root_owner.insert(module.root.as_str(), module.id.as_str()) {
        return Err(
          GraphError::DuplicateRoot {
            root: module.root.clone(),
            first: first.to_string(),
            second: module.id.clone(),
          }
          .into(),
        );
      }

      let node_idx = graph.add_node(ModuleNode {
        id: module.id.clone(),
        root: module.root.clone(),
        capabilities: module.capabilities.clone(),
      });
      id_to_node.insert(module.id.clone(), node_idx);
    }

    for module in &manifest.modules {
      let from_idx = id_to_node[&module.id];
      for dependency in &module.dependencies {
        let to_idx = id_to_node.get(dependency).copied().ok_or_else(|| GraphError::UnknownDependency {
          module: module.id.clone(),
          dependency: dependency.clone(),
        })?;
        // update_edge keeps a single edge per (from, to) pair
        graph.update_edge(from_idx, to_idx, ());
      }
    }

    let mut roots: Vec<(String, NodeIndex)> = graph
      .node_indices()
      .map(|idx| (graph[idx].root.clone(), idx))
      .collect();
    roots.sort_by(|(a, _), (b, _)| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

    let mut module_graph = Self {
      graph,
      id_to_node,
      roots,
      cycles: Vec::new(),
    };
    module_graph.cycles = module_graph.detect_cycles();

    for cycle in &module_graph.cycles {
      tracing::warn!(modules = %cycle.join(" → "), "CycleDetected: modules in this cycle are treated as mutually affected");
    }

    Ok(module_graph)
  }

  /// Number of modules.
  pub fn module_count(&self) -> usize {
    self.graph.node_count()
  }

  /// All module ids, sorted.
  pub fn module_ids(&self) -> Vec<String> {
    let mut ids: Vec<_> = self.id_to_node.keys().cloned().collect();
    ids.sort();
    ids
  }

  /// All modules, sorted by id.
  pub fn modules(&self) -> Vec<&ModuleNode> {
    let mut nodes: Vec<_> = self.graph.node_weights().collect();
    nodes.sort_by(|a, b| a.id.cmp(&b.id));
    nodes
  }

  pub fn module(&self, id: &str) -> Option<&ModuleNode> {
    self.id_to_node.get(id).map(|idx| &self.graph[*idx])
  }

  pub fn has_capability(&self, id: &str, capability: Capability) -> bool {
    self
      .module(id)
      .is_some_and(|node| node.capabilities.contains(&capability))
  }

  /// Dependency cycles found at build time.
  pub fn cycles(&self) -> &[Vec<String>] {
    &self.cycles
  }

  /// Map a normalized repository-relative path to its owning module.
  ///
  /// The longest module root containing the path wins.
  pub fn owner_of(&self, path: &str) -> Option<&str> {
    self
      .roots
      .iter()
      .find(|(root, _)| is_within(path, root))
      .map(|(_, idx)| self.graph[*idx].id.as_str())
  }

  /// Direct dependencies of a module (what it uses), sorted.
  pub fn direct_dependencies(&self, id: &str) -> SkippyResult<Vec<String>> {
    self.neighbors(id, Direction::Outgoing)
  }

  /// Direct dependents of a module (what uses it), sorted.
  pub fn direct_dependents(&self, id: &str) -> SkippyResult<Vec<String>> {
    self.neighbors(id, Direction::Incoming)
  }

  /// Full dependency closure of a module, excluding the module itself
  /// unless it sits on a cycle.
  pub fn dependency_closure(&self, id: &str) -> SkippyResult<BTreeSet<String>> {
    let start = self.find_node(id)?;
    Ok(self.reachable(&[start], Direction::Outgoing, false))
  }

  /// Every module that transitively depends on any of `ids`, plus `ids` themselves.
  ///
  /// Breadth-first over reverse edges until no new module is added; the
  /// visited set makes this terminate on cycles. Unknown ids are ignored.
  pub fn dependent_closure<'a>(&self, ids: impl IntoIterator<Item = &'a str>) -> BTreeSet<String> {
    let starts: Vec<NodeIndex> = ids
      .into_iter()
      .filter_map(|id| self.id_to_node.get(id).copied())
      .collect();
    self.reachable(&starts, Direction::Incoming, true)
  }

  /// Get topological order of modules (build order).
  ///
  /// Returns modules in dependency order: if A depends on B, B appears before A.
  ///
  /// # Errors
  /// Returns error if the dependency graph contains cycles.
  pub fn topological_order(&self) -> SkippyResult<Vec<String>> {
    let topo = algo::toposort(&self.graph, None).map_err(|cycle| GraphError::Cycle {
      module: self.graph[cycle.node_id()].id.clone(),
    })?;

    // toposort lists dependents first for A → B edges
    Ok(topo.into_iter().rev().map(|idx| self.graph[idx].id.clone()).collect())
  }

  /// Find dependency path: why does `from` depend on `to`?
  ///
  /// Returns the shortest dependency chain, or None if no dependency exists.
  pub fn why_depends_on(&self, from: &str, to: &str) -> SkippyResult<Option<Vec<String>>> {
    let from_idx = self.find_node(from)?;
    let to_idx = self.find_node(to)?;

    let mut queue = VecDeque::new();
    let mut visited = HashMap::new();

    queue.push_back(from_idx);
    visited.insert(from_idx, None);

    while let Some(current) = queue.pop_front() {
      if current == to_idx {
        let mut path = vec![];
        let mut node = Some(current);

        while let Some(idx) = node {
          path.push(self.graph[idx].id.clone());
          node = visited[&idx];
        }

        path.reverse();
        return Ok(Some(path));
      }

      for neighbor in self.graph.neighbors_directed(current, Direction::Outgoing) {
        if let std::collections::hash_map::Entry::Vacant(e) = visited.entry(neighbor) {
          e.insert(Some(current));
          queue.push_back(neighbor);
        }
      }
    }

    Ok(None)
  }

  /// Export graph to DOT format (Graphviz).
  ///
  /// Modules on a cycle are highlighted.
  pub fn to_dot(&self) -> String {
    use petgraph::dot::{Config, Dot};

    let on_cycle: HashSet<&str> = self.cycles.iter().flatten().map(String::as_str).collect();

    // Getters borrow `on_cycle` and must live until the format call returns
    format!(
      "{:?}",
      Dot::with_attr_getters(
        &self.graph,
        &[Config::EdgeNoLabel, Config::NodeNoLabel],
        &|_, _| String::new(),
        &|_, (_idx, node)| {
          if on_cycle.contains(node.id.as_str()) {
            format!("label=\"{}\" shape=box style=filled fillcolor=salmon", node.id)
          } else {
            format!("label=\"{}\" shape=box", node.id)
          }
        },
      )
    )
  }

  fn neighbors(&self, id: &str, direction: Direction) -> SkippyResult<Vec<String>> {
    let node_idx = self.find_node(id)?;

    let mut ids: Vec<String> = self
      .graph
      .neighbors_directed(node_idx, direction)
      .map(|idx| self.graph[idx].id.clone())
      .collect();

    ids.sort();
    ids.dedup();
    Ok(ids)
  }

  fn reachable(&self, starts: &[NodeIndex], direction: Direction, include_starts: bool) -> BTreeSet<String> {
    let mut visited: HashSet<NodeIndex> = HashSet::new();
    let mut queue: VecDeque<NodeIndex> = VecDeque::new();
    let mut out = BTreeSet::new();

    for start in starts {
      if include_starts {
        out.insert(self.graph[*start].id.clone());
      }
      queue.push_back(*start);
    }

    while let Some(node_idx) = queue.pop_front() {
      if !visited.insert(node_idx) {
        continue;
      }
      for neighbor in self.graph.neighbors_directed(node_idx, direction) {
        out.insert(self.graph[neighbor].id.clone());
        queue.push_back(neighbor);
      }
    }

    out
  }

  /// Strongly connected components with more than one module, plus self-loops.
  fn detect_cycles(&self) -> Vec<Vec<String>> {
    let mut cycles: Vec<Vec<String>> = algo::tarjan_scc(&self.graph)
      .into_iter()
      .filter(|component| {
        component.len() > 1 || self.graph.contains_edge(component[0], component[0])
      })
      .map(|component| {
        let mut ids: Vec<String> = component.into_iter().map(|idx| self.graph[idx].id.clone()).collect();
        ids.sort();
        ids
      })
      .collect();

    cycles.sort();
    cycles
  }

  fn find_node(&self, id: &str) -> SkippyResult<NodeIndex> {
    self.id_to_node.get(id).copied().ok_or_else(|| {
      GraphError::UnknownModule {
        id: id.to_string(),
        available: self.module_ids(),
      }
      .into()
    })
  }
}
