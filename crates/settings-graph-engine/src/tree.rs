//! The settings tree: node arena, dependency graph and collections.
//!
//! Edges in the dependency graph point from a dependency to its dependent, so
//! a walk along outgoing edges visits everything that must be re-evaluated
//! after a change. Evaluation order is a topological order with ties broken by
//! registration order (lowest [`SettingId`] first).

use std::cmp::Reverse;
use std::collections::{BTreeSet, BinaryHeap, HashMap};
use std::fmt;

use petgraph::algo::has_path_connecting;
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::Direction;
use settings_graph_core::{
    EditState, OracleContext, SettingId, SettingPresentation, SettingValue,
};
use tracing::{debug, trace};

use crate::condition::{ConditionContext, EditCondition, SettingLookup};
use crate::error::{SettingsError, SettingsResult};
use crate::history::{ChangeReason, ValueHistory};
use crate::node::{CommitContext, SettingBuilder, SettingNode};

/// Named group of settings, e.g. `Video/Display`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SettingCollection {
    /// Slash separated path, unique within the tree.
    pub path: String,
    pub display_name: String,
    /// Member settings in registration order.
    pub settings: Vec<SettingId>,
}

impl SettingCollection {
    /// Path of the enclosing collection, if any.
    pub fn parent(&self) -> Option<&str> {
        self.path.rsplit_once('/').map(|(parent, _)| parent)
    }
}

/// Owns every setting of a menu together with the store they write to and
/// the oracle snapshot their conditions read.
pub struct SettingsTree<S> {
    store: S,
    oracle: OracleContext,
    nodes: Vec<SettingNode<S>>,
    by_name: HashMap<String, SettingId>,
    graph: StableDiGraph<SettingId, ()>,
    indices: Vec<NodeIndex>,
    order: Vec<SettingId>,
    position: Vec<usize>,
    collections: Vec<SettingCollection>,
    history_window: usize,
}

impl<S> SettingsTree<S> {
    pub fn new(store: S, oracle: OracleContext) -> Self {
        Self {
            store,
            oracle,
            nodes: Vec::new(),
            by_name: HashMap::new(),
            graph: StableDiGraph::new(),
            indices: Vec::new(),
            order: Vec::new(),
            position: Vec::new(),
            collections: Vec::new(),
            history_window: ValueHistory::DEFAULT_WINDOW,
        }
    }

    /// Window used for the value history of settings registered afterwards.
    pub fn with_history_window(mut self, window: usize) -> Self {
        self.history_window = window.max(1);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Direct store access. Call [`sync_from_store`](Self::sync_from_store)
    /// afterwards so cached values follow.
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn oracle(&self) -> &OracleContext {
        &self.oracle
    }

    /// Flag from the oracle snapshot; `OracleUnavailable` when never supplied.
    pub fn oracle_flag(&self, name: &str) -> SettingsResult<bool> {
        Ok(self.oracle.flag(name)?)
    }

    pub fn oracle_fact(&self, name: &str) -> SettingsResult<&str> {
        Ok(self.oracle.fact(name)?)
    }

    pub fn oracle_metric(&self, name: &str) -> SettingsResult<f64> {
        Ok(self.oracle.metric(name)?)
    }

    /// Replace the oracle snapshot. Edit states are not recomputed here.
    pub fn set_oracle(&mut self, oracle: OracleContext) {
        self.oracle = oracle;
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All ids in registration order.
    pub fn ids(&self) -> impl Iterator<Item = SettingId> + '_ {
        self.nodes.iter().map(|n| n.id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &SettingNode<S>> {
        self.nodes.iter()
    }

    pub fn node(&self, id: SettingId) -> Option<&SettingNode<S>> {
        self.nodes.get(id.0 as usize)
    }

    pub fn node_by_name(&self, name: &str) -> Option<&SettingNode<S>> {
        self.id_of(name).and_then(|id| self.node(id))
    }

    pub fn id_of(&self, name: &str) -> Option<SettingId> {
        self.by_name.get(name).copied()
    }

    /// Like [`id_of`](Self::id_of) but failing with `UnknownName`.
    pub fn require(&self, name: &str) -> SettingsResult<SettingId> {
        self.id_of(name).ok_or_else(|| SettingsError::UnknownName {
            name: name.to_string(),
        })
    }

    pub fn value(&self, id: SettingId) -> Option<&SettingValue> {
        self.node(id).and_then(|n| n.value.as_ref())
    }

    pub fn edit_state(&self, id: SettingId) -> Option<&EditState> {
        self.node(id).map(|n| &n.edit_state)
    }

    /// Every node in evaluation order.
    pub fn topological_order(&self) -> &[SettingId] {
        &self.order
    }

    /// Number of dependency edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    // -------------------------------------------------------------------------
    // Construction
    // -------------------------------------------------------------------------

    /// Add a setting. Nothing is changed when this fails.
    pub fn register(&mut self, builder: SettingBuilder<S>) -> SettingsResult<SettingId> {
        if self.by_name.contains_key(&builder.name) {
            return Err(SettingsError::DuplicateName { name: builder.name });
        }
        if let Some(path) = &builder.collection {
            if self.collection_index(path).is_none() {
                return Err(SettingsError::CollectionNotFound { path: path.clone() });
            }
        }
        if let Some(default) = &builder.default_value {
            builder
                .domain
                .check(default)
                .map_err(|reason| SettingsError::InvalidValue {
                    setting: builder.name.clone(),
                    value: default.to_string(),
                    reason,
                })?;
        }

        let mut dependencies: Vec<SettingId> = Vec::new();
        let reads = builder.conditions.iter().flat_map(EditCondition::reads);
        for dep in builder.depends_on.iter().copied().chain(reads) {
            self.require_node(dep)?;
            if !dependencies.contains(&dep) {
                dependencies.push(dep);
            }
        }

        let id = SettingId(self.nodes.len() as u64);
        let value = match builder.accessor {
            Some(accessor) => (accessor.get)(&self.store).or_else(|| builder.default_value.clone()),
            None => builder.default_value.clone(),
        };

        let node = SettingNode {
            id,
            display_name: builder.display_name.unwrap_or_else(|| builder.name.clone()),
            name: builder.name,
            description: builder.description,
            domain: builder.domain,
            initial_value: value.clone(),
            value,
            default_value: builder.default_value,
            conditions: builder.conditions,
            dependencies: Vec::new(),
            dependents: Vec::new(),
            edit_state: EditState::allowed(),
            dirty: true,
            history: ValueHistory::new(self.history_window),
            accessor: builder.accessor,
            on_committed: builder.on_committed,
            action: builder.action,
            collection: builder.collection,
        };

        self.by_name.insert(node.name.clone(), id);
        if let Some(index) = node
            .collection
            .as_deref()
            .and_then(|path| self.collection_index(path))
        {
            self.collections[index].settings.push(id);
        }
        debug!(setting = %id, name = %node.name, "setting_registered");
        self.nodes.push(node);
        self.indices.push(self.graph.add_node(id));

        // A fresh node has no dependents, so none of these edges can close a cycle.
        for dep in dependencies {
            self.link(dep, id);
        }
        self.recompute_order();

        Ok(id)
    }

    /// Record that `this` reads `other`.
    ///
    /// Returns `Ok(false)` when the edge already existed. Fails with
    /// `Cycle` when `other` already depends on `this`, leaving the graph
    /// unchanged.
    pub fn add_dependency(&mut self, this: SettingId, other: SettingId) -> SettingsResult<bool> {
        let this_idx = self.index_of(this)?;
        let other_idx = self.index_of(other)?;

        if this == other || has_path_connecting(&self.graph, this_idx, other_idx, None) {
            return Err(SettingsError::Cycle {
                from: self.nodes[this.0 as usize].name.clone(),
                to: self.nodes[other.0 as usize].name.clone(),
            });
        }
        if self.graph.contains_edge(other_idx, this_idx) {
            return Ok(false);
        }

        self.link(other, this);
        self.nodes[this.0 as usize].dirty = true;
        self.recompute_order();
        Ok(true)
    }

    /// Attach a condition to an existing setting, adding the dependencies it
    /// reads. Nothing is changed when any of those would close a cycle.
    pub fn add_condition(&mut self, id: SettingId, condition: EditCondition) -> SettingsResult<()> {
        let this_idx = self.index_of(id)?;
        let reads = condition.reads();
        for dep in &reads {
            let dep_idx = self.index_of(*dep)?;
            if *dep == id || has_path_connecting(&self.graph, this_idx, dep_idx, None) {
                return Err(SettingsError::Cycle {
                    from: self.nodes[id.0 as usize].name.clone(),
                    to: self.nodes[dep.0 as usize].name.clone(),
                });
            }
        }

        for dep in reads {
            if !self.graph.contains_edge(self.indices[dep.0 as usize], this_idx) {
                self.link(dep, id);
            }
        }
        let node = &mut self.nodes[id.0 as usize];
        node.conditions.push(condition);
        node.dirty = true;
        self.recompute_order();
        Ok(())
    }

    /// Add a collection. Parents must exist before their children.
    pub fn add_collection(
        &mut self,
        path: impl Into<String>,
        display_name: impl Into<String>,
    ) -> SettingsResult<()> {
        let path = path.into();
        if self.collection_index(&path).is_some() {
            return Err(SettingsError::DuplicateName { name: path });
        }
        if let Some((parent, _)) = path.rsplit_once('/') {
            if self.collection_index(parent).is_none() {
                return Err(SettingsError::CollectionNotFound {
                    path: parent.to_string(),
                });
            }
        }
        self.collections.push(SettingCollection {
            path,
            display_name: display_name.into(),
            settings: Vec::new(),
        });
        Ok(())
    }

    pub fn collections(&self) -> &[SettingCollection] {
        &self.collections
    }

    pub fn collection(&self, path: &str) -> Option<&SettingCollection> {
        self.collection_index(path).map(|i| &self.collections[i])
    }

    /// Direct sub-collections of `path`, in insertion order.
    pub fn child_collections<'a>(
        &'a self,
        path: &'a str,
    ) -> impl Iterator<Item = &'a SettingCollection> + 'a {
        self.collections
            .iter()
            .filter(move |c| c.parent() == Some(path))
    }

    /// A collection is visible while any member or sub-collection is.
    pub fn collection_visible(&self, path: &str) -> bool {
        let Some(collection) = self.collection(path) else {
            return false;
        };
        collection
            .settings
            .iter()
            .any(|id| self.nodes[id.0 as usize].edit_state.is_visible())
            || self
                .child_collections(path)
                .any(|child| self.collection_visible(&child.path))
    }

    // -------------------------------------------------------------------------
    // Mutation
    // -------------------------------------------------------------------------

    /// Commit a new value.
    ///
    /// Returns every setting whose edit state is now stale, in evaluation
    /// order: the setting itself, settings whose stored value changed as a
    /// side effect, and all of their transitive dependents. Edit states are
    /// not enforced here; callers gate user input on
    /// [`EditState::is_enabled`].
    pub fn set_value(
        &mut self,
        id: SettingId,
        value: SettingValue,
    ) -> SettingsResult<Vec<SettingId>> {
        self.commit(id, value, ChangeReason::Change)
    }

    /// Commit the default value. A no-op when already at the default.
    pub fn reset_to_default(&mut self, id: SettingId) -> SettingsResult<Vec<SettingId>> {
        let node = self.require_node(id)?;
        match node.default_value.clone() {
            Some(default) if node.value.as_ref() != Some(&default) => {
                self.commit(id, default, ChangeReason::ResetToDefault)
            }
            _ => Ok(Vec::new()),
        }
    }

    /// Commit the value captured by the last [`store_initial`](Self::store_initial).
    pub fn restore_to_initial(&mut self, id: SettingId) -> SettingsResult<Vec<SettingId>> {
        let node = self.require_node(id)?;
        match node.initial_value.clone() {
            Some(initial) if node.value.as_ref() != Some(&initial) => {
                self.commit(id, initial, ChangeReason::RestoreToInitial)
            }
            _ => Ok(Vec::new()),
        }
    }

    /// Restore every changed setting, in evaluation order.
    pub fn restore_all_to_initial(&mut self) -> SettingsResult<Vec<SettingId>> {
        let mut dirty = BTreeSet::new();
        for id in self.order.clone() {
            dirty.extend(self.restore_to_initial(id)?);
        }
        Ok(self.sorted(dirty))
    }

    /// Capture every current value as the initial value.
    pub fn store_initial(&mut self) {
        for node in &mut self.nodes {
            node.initial_value = node.value.clone();
        }
        debug!(settings = self.nodes.len(), "initial_values_stored");
    }

    /// Settings whose value differs from the captured initial value.
    pub fn changed_since_initial(&self) -> Vec<SettingId> {
        self.nodes
            .iter()
            .filter(|n| n.changed_since_initial())
            .map(|n| n.id)
            .collect()
    }

    /// Run an action setting, then pick up whatever it wrote to the store.
    pub fn run_action(&mut self, id: SettingId) -> SettingsResult<Vec<SettingId>> {
        let node = self.require_node(id)?;
        let action = node.action.ok_or_else(|| SettingsError::NotAnAction {
            setting: node.name.clone(),
        })?;
        let name = node.name.clone();

        action(&mut self.store, &self.oracle).map_err(|source| SettingsError::AccessorWrite {
            setting: name.clone(),
            source,
        })?;
        debug!(setting = %id, name = %name, "setting_action_run");

        let mut seeds = vec![id];
        seeds.extend(self.sync_from_store());
        Ok(self.mark_dirty(seeds))
    }

    /// Re-read every bound setting from the store. Returns the settings
    /// whose cached value changed.
    pub fn sync_from_store(&mut self) -> Vec<SettingId> {
        let mut changed = Vec::new();
        for node in &mut self.nodes {
            let Some(accessor) = node.accessor else {
                continue;
            };
            // A getter with nothing to report keeps the cached value.
            let Some(current) = (accessor.get)(&self.store) else {
                continue;
            };
            if node.value.as_ref() != Some(&current) {
                trace!(
                    setting = %node.id,
                    name = %node.name,
                    value = %current,
                    "setting_value_synced"
                );
                node.history
                    .record(Some(current.clone()), ChangeReason::DependencyChanged);
                node.value = Some(current);
                changed.push(node.id);
            }
        }
        changed
    }

    fn commit(
        &mut self,
        id: SettingId,
        value: SettingValue,
        reason: ChangeReason,
    ) -> SettingsResult<Vec<SettingId>> {
        let node = self.require_node(id)?;
        node.domain
            .check(&value)
            .map_err(|why| SettingsError::InvalidValue {
                setting: node.name.clone(),
                value: value.to_string(),
                reason: why,
            })?;
        let accessor = node.accessor;
        let hook = node.on_committed;
        let name = node.name.clone();

        if let Some(accessor) = accessor {
            (accessor.set)(&mut self.store, &value).map_err(|source| {
                SettingsError::AccessorWrite {
                    setting: name.clone(),
                    source,
                }
            })?;
        }

        let node = &mut self.nodes[id.0 as usize];
        node.history.record(Some(value.clone()), reason);
        node.value = Some(value.clone());

        if let Some(hook) = hook {
            let ctx = CommitContext {
                setting: id,
                name: &name,
                value: &value,
                reason,
            };
            hook(&mut self.store, &ctx);
        }
        debug!(
            setting = %id,
            name = %name,
            value = %value,
            reason = reason.label(),
            "setting_value_set"
        );

        let mut seeds = vec![id];
        seeds.extend(self.sync_from_store());
        Ok(self.mark_dirty(seeds))
    }

    // -------------------------------------------------------------------------
    // Evaluation support
    // -------------------------------------------------------------------------

    /// `seeds` plus everything that transitively depends on them, in
    /// evaluation order, each id once.
    pub fn dependents_closure(&self, seeds: impl IntoIterator<Item = SettingId>) -> Vec<SettingId> {
        let mut seen = BTreeSet::new();
        let mut stack: Vec<SettingId> = seeds
            .into_iter()
            .filter(|id| self.node(*id).is_some())
            .collect();

        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            let idx = self.indices[id.0 as usize];
            for next in self.graph.neighbors_directed(idx, Direction::Outgoing) {
                let dependent = self.graph[next];
                if !seen.contains(&dependent) {
                    stack.push(dependent);
                }
            }
        }

        self.sorted(seen)
    }

    /// Settings whose cached edit state is stale, in evaluation order.
    pub fn dirty(&self) -> Vec<SettingId> {
        self.sorted(self.nodes.iter().filter(|n| n.dirty).map(|n| n.id))
    }

    /// Settings with at least one oracle-reading condition.
    pub fn oracle_readers(&self) -> Vec<SettingId> {
        self.nodes
            .iter()
            .filter(|n| n.uses_oracle())
            .map(|n| n.id)
            .collect()
    }

    /// Compute a setting's edit state from the current oracle and the cached
    /// values and edit states of its dependencies. Pure.
    pub fn compute_edit_state(&self, id: SettingId) -> SettingsResult<EditState> {
        let node = self.require_node(id)?;
        let ctx = ConditionContext::new(id, &self.oracle, self);
        Ok(node.evaluate(&ctx))
    }

    /// Store a computed edit state and clear the dirty flag. Returns whether
    /// the state changed.
    pub(crate) fn apply_edit_state(&mut self, id: SettingId, state: EditState) -> bool {
        let node = &mut self.nodes[id.0 as usize];
        node.dirty = false;
        if node.edit_state == state {
            return false;
        }
        node.edit_state = state;
        true
    }

    pub fn presentation(&self, id: SettingId) -> Option<SettingPresentation> {
        self.node(id).map(|n| {
            SettingPresentation::new(n.id, n.name.clone(), n.value.clone(), &n.edit_state)
        })
    }

    /// Rows for every setting, in registration order.
    pub fn presentations(&self) -> Vec<SettingPresentation> {
        self.nodes
            .iter()
            .map(|n| SettingPresentation::new(n.id, n.name.clone(), n.value.clone(), &n.edit_state))
            .collect()
    }

    // -------------------------------------------------------------------------
    // Internal helpers
    // -------------------------------------------------------------------------

    fn require_node(&self, id: SettingId) -> SettingsResult<&SettingNode<S>> {
        self.node(id).ok_or(SettingsError::SettingNotFound { id })
    }

    fn index_of(&self, id: SettingId) -> SettingsResult<NodeIndex> {
        self.indices
            .get(id.0 as usize)
            .copied()
            .ok_or(SettingsError::SettingNotFound { id })
    }

    fn collection_index(&self, path: &str) -> Option<usize> {
        self.collections.iter().position(|c| c.path == path)
    }

    fn link(&mut self, dependency: SettingId, dependent: SettingId) {
        let from = self.indices[dependency.0 as usize];
        let to = self.indices[dependent.0 as usize];
        self.graph.add_edge(from, to, ());
        self.nodes[dependent.0 as usize].dependencies.push(dependency);
        self.nodes[dependency.0 as usize].dependents.push(dependent);
    }

    fn mark_dirty(&mut self, seeds: Vec<SettingId>) -> Vec<SettingId> {
        let dirty = self.dependents_closure(seeds);
        for id in &dirty {
            self.nodes[id.0 as usize].dirty = true;
        }
        dirty
    }

    fn sorted(&self, ids: impl IntoIterator<Item = SettingId>) -> Vec<SettingId> {
        let mut ids: Vec<SettingId> = ids.into_iter().collect();
        ids.sort_by_key(|id| self.position[id.0 as usize]);
        ids.dedup();
        ids
    }

    /// Kahn's algorithm, always taking the lowest ready id.
    fn recompute_order(&mut self) {
        let mut in_degree: Vec<usize> = self
            .indices
            .iter()
            .map(|idx| {
                self.graph
                    .neighbors_directed(*idx, Direction::Incoming)
                    .count()
            })
            .collect();

        let mut ready: BinaryHeap<Reverse<SettingId>> = in_degree
            .iter()
            .enumerate()
            .filter(|(_, d)| **d == 0)
            .map(|(i, _)| Reverse(SettingId(i as u64)))
            .collect();

        let mut order = Vec::with_capacity(self.nodes.len());
        while let Some(Reverse(id)) = ready.pop() {
            order.push(id);
            let idx = self.indices[id.0 as usize];
            for next in self.graph.neighbors_directed(idx, Direction::Outgoing) {
                let dependent = self.graph[next];
                let degree = &mut in_degree[dependent.0 as usize];
                *degree -= 1;
                if *degree == 0 {
                    ready.push(Reverse(dependent));
                }
            }
        }

        let mut position = vec![0; order.len()];
        for (pos, id) in order.iter().enumerate() {
            position[id.0 as usize] = pos;
        }
        self.order = order;
        self.position = position;
    }
}

impl<S> SettingLookup for SettingsTree<S> {
    fn value_of(&self, id: SettingId) -> Option<&SettingValue> {
        self.value(id)
    }

    fn edit_state_of(&self, id: SettingId) -> Option<&EditState> {
        self.edit_state(id)
    }
}

impl<S> fmt::Debug for SettingsTree<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SettingsTree")
            .field("settings", &self.nodes.len())
            .field("edges", &self.graph.edge_count())
            .field("collections", &self.collections.len())
            .finish()
    }
}
