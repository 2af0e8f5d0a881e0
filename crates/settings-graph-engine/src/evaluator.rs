//! Dependency evaluator that keeps edit states up to date.
//!
//! The `DependencyEvaluator` owns a [`SettingsTree`] and turns every change
//! (a value, the oracle, the store) into one evaluation pass over exactly the
//! affected settings, in dependency order.

use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use settings_graph_core::{OracleContext, SettingId, SettingPresentation, SettingValue};
use tracing::{debug, info};

use crate::error::{SettingsError, SettingsResult};
use crate::tree::SettingsTree;

/// Configuration for the evaluator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluatorConfig {
    /// Number of past passes to keep.
    pub pass_history: usize,

    /// Collect presentation rows for evaluated settings.
    pub collect_rows: bool,

    /// Log every edit-state change at info level.
    pub log_changes: bool,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            pass_history: 32,
            collect_rows: true,
            log_changes: false,
        }
    }
}

impl EvaluatorConfig {
    /// No rows, tiny history. For batch use.
    pub fn quiet() -> Self {
        Self {
            pass_history: 4,
            collect_rows: false,
            ..Default::default()
        }
    }

    /// Long history with every change logged.
    pub fn verbose() -> Self {
        Self {
            pass_history: 128,
            log_changes: true,
            ..Default::default()
        }
    }
}

/// What started an evaluation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "trigger", content = "setting", rename_all = "snake_case")]
pub enum EvaluationTrigger {
    Initial,
    ValueChanged(SettingId),
    OracleChanged,
    StoreChanged,
    Action(SettingId),
    Reset(SettingId),
    Restore(SettingId),
    RestoreAll,
    Dirty,
}

/// Result of one evaluation pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationPass {
    /// Pass number (0-indexed).
    pub pass: u64,

    pub trigger: EvaluationTrigger,

    /// Settings evaluated, in evaluation order.
    pub evaluated: Vec<SettingId>,

    /// Subset of `evaluated` whose edit state changed.
    pub changed: Vec<SettingId>,

    /// Presentation rows for `evaluated`, when collected.
    pub rows: Vec<SettingPresentation>,

    pub duration: Duration,
}

impl EvaluationPass {
    pub fn had_changes(&self) -> bool {
        !self.changed.is_empty()
    }

    pub fn was_evaluated(&self, id: SettingId) -> bool {
        self.evaluated.contains(&id)
    }
}

/// Keeps the edit states of a settings tree consistent with its values and
/// the oracle.
pub struct DependencyEvaluator<S> {
    tree: SettingsTree<S>,
    config: EvaluatorConfig,
    passes: u64,
    pass_history: Vec<EvaluationPass>,
    counts: HashMap<SettingId, u64>,
}

impl<S> DependencyEvaluator<S> {
    /// Create an evaluator with default configuration.
    pub fn new(tree: SettingsTree<S>) -> Self {
        Self::with_config(tree, EvaluatorConfig::default())
    }

    pub fn with_config(tree: SettingsTree<S>, config: EvaluatorConfig) -> Self {
        Self {
            tree,
            config,
            passes: 0,
            pass_history: Vec::new(),
            counts: HashMap::new(),
        }
    }

    pub fn tree(&self) -> &SettingsTree<S> {
        &self.tree
    }

    /// Mutable tree access. Follow up with [`evaluate_dirty`](Self::evaluate_dirty).
    pub fn tree_mut(&mut self) -> &mut SettingsTree<S> {
        &mut self.tree
    }

    pub fn into_tree(self) -> SettingsTree<S> {
        self.tree
    }

    pub fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    /// Number of passes run so far.
    pub fn pass_count(&self) -> u64 {
        self.passes
    }

    /// Recent passes, oldest first.
    pub fn pass_history(&self) -> &[EvaluationPass] {
        &self.pass_history
    }

    /// How many times a setting has been evaluated.
    pub fn evaluation_count(&self, id: SettingId) -> u64 {
        self.counts.get(&id).copied().unwrap_or(0)
    }

    /// Evaluate every setting (initial construction).
    pub fn evaluate_all(&mut self) -> SettingsResult<EvaluationPass> {
        let order = self.tree.topological_order().to_vec();
        self.run_pass(order, EvaluationTrigger::Initial)
    }

    /// Evaluate whatever the tree has marked dirty.
    pub fn evaluate_dirty(&mut self) -> SettingsResult<EvaluationPass> {
        let dirty = self.tree.dirty();
        self.run_pass(dirty, EvaluationTrigger::Dirty)
    }

    /// Re-evaluate `id` and everything that transitively depends on it.
    pub fn on_value_changed(&mut self, id: SettingId) -> SettingsResult<EvaluationPass> {
        if self.tree.node(id).is_none() {
            return Err(SettingsError::SettingNotFound { id });
        }
        let closure = self.tree.dependents_closure([id]);
        self.run_pass(closure, EvaluationTrigger::ValueChanged(id))
    }

    /// Commit a value and re-evaluate what it affects in one pass.
    pub fn set_value(
        &mut self,
        id: SettingId,
        value: impl Into<SettingValue>,
    ) -> SettingsResult<EvaluationPass> {
        let dirty = self.tree.set_value(id, value.into())?;
        self.run_pass(dirty, EvaluationTrigger::ValueChanged(id))
    }

    pub fn set_value_by_name(
        &mut self,
        name: &str,
        value: impl Into<SettingValue>,
    ) -> SettingsResult<EvaluationPass> {
        let id = self.tree.require(name)?;
        self.set_value(id, value)
    }

    /// Swap the oracle snapshot and re-evaluate every oracle reader and its
    /// dependents.
    pub fn on_oracle_changed(&mut self, oracle: OracleContext) -> SettingsResult<EvaluationPass> {
        self.tree.set_oracle(oracle);
        let closure = self.tree.dependents_closure(self.tree.oracle_readers());
        self.run_pass(closure, EvaluationTrigger::OracleChanged)
    }

    /// Pick up values written to the store from outside the tree.
    pub fn on_store_changed(&mut self) -> SettingsResult<EvaluationPass> {
        let changed = self.tree.sync_from_store();
        let closure = self.tree.dependents_closure(changed);
        self.run_pass(closure, EvaluationTrigger::StoreChanged)
    }

    pub fn run_action(&mut self, id: SettingId) -> SettingsResult<EvaluationPass> {
        let dirty = self.tree.run_action(id)?;
        self.run_pass(dirty, EvaluationTrigger::Action(id))
    }

    pub fn reset_to_default(&mut self, id: SettingId) -> SettingsResult<EvaluationPass> {
        let dirty = self.tree.reset_to_default(id)?;
        self.run_pass(dirty, EvaluationTrigger::Reset(id))
    }

    pub fn restore_to_initial(&mut self, id: SettingId) -> SettingsResult<EvaluationPass> {
        let dirty = self.tree.restore_to_initial(id)?;
        self.run_pass(dirty, EvaluationTrigger::Restore(id))
    }

    /// Undo the whole session back to the captured initial values.
    pub fn restore_all_to_initial(&mut self) -> SettingsResult<EvaluationPass> {
        let dirty = self.tree.restore_all_to_initial()?;
        self.run_pass(dirty, EvaluationTrigger::RestoreAll)
    }

    // Internal helpers

    /// Evaluate `ids` in the given order. Each id must appear once, after
    /// every dependency that is also in the list.
    fn run_pass(
        &mut self,
        ids: Vec<SettingId>,
        trigger: EvaluationTrigger,
    ) -> SettingsResult<EvaluationPass> {
        let started = Instant::now();
        debug!(
            pass = self.passes,
            trigger = ?trigger,
            settings = ids.len(),
            "evaluation_pass_start"
        );

        let mut changed = Vec::new();
        let mut rows = Vec::new();

        for id in &ids {
            let state = self.tree.compute_edit_state(*id)?;
            if self.tree.apply_edit_state(*id, state) {
                if self.config.log_changes {
                    if let Some(node) = self.tree.node(*id) {
                        info!(
                            setting = %id,
                            name = node.name(),
                            severity = node.edit_state().severity().label(),
                            reason = %node.edit_state().reason_text(),
                            "edit_state_changed"
                        );
                    }
                }
                changed.push(*id);
            }
            *self.counts.entry(*id).or_insert(0) += 1;

            if self.config.collect_rows {
                if let Some(row) = self.tree.presentation(*id) {
                    rows.push(row);
                }
            }
        }

        let duration = started.elapsed();
        let pass = EvaluationPass {
            pass: self.passes,
            trigger,
            evaluated: ids,
            changed,
            rows,
            duration,
        };

        self.passes += 1;
        self.pass_history.push(pass.clone());
        if self.pass_history.len() > self.config.pass_history {
            let overflow = self.pass_history.len() - self.config.pass_history;
            self.pass_history.drain(0..overflow);
        }

        debug!(
            pass = pass.pass,
            evaluated = pass.evaluated.len(),
            changed = pass.changed.len(),
            duration_us = duration.as_micros() as u64,
            "evaluation_pass_complete"
        );

        Ok(pass)
    }
}

impl<S> fmt::Debug for DependencyEvaluator<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DependencyEvaluator")
            .field("tree", &self.tree)
            .field("config", &self.config)
            .field("passes", &self.passes)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{diamond_tree, window_tree};
    use settings_graph_core::Severity;

    #[test]
    fn test_evaluate_all_visits_every_setting_once() {
        let mut evaluator = DependencyEvaluator::new(diamond_tree());
        let pass = evaluator.evaluate_all().unwrap();

        assert_eq!(pass.evaluated.len(), 4);
        assert_eq!(pass.rows.len(), 4);
        assert!(pass.changed.is_empty());
        assert!(evaluator.tree().dirty().is_empty());
        for id in &pass.evaluated {
            assert_eq!(evaluator.evaluation_count(*id), 1);
        }
    }

    #[test]
    fn test_diamond_evaluates_sink_once_with_updated_inputs() {
        let mut evaluator = DependencyEvaluator::new(diamond_tree());
        evaluator.evaluate_all().unwrap();
        let a = evaluator.tree().id_of("A").unwrap();
        let b = evaluator.tree().id_of("B").unwrap();
        let d = evaluator.tree().id_of("D").unwrap();

        let pass = evaluator.set_value(a, false).unwrap();
        assert_eq!(pass.evaluated.first(), Some(&a));
        assert_eq!(pass.evaluated.last(), Some(&d));
        assert_eq!(evaluator.evaluation_count(d), 2);

        // B and C are disabled but still hold `true`, so D stays allowed.
        assert_eq!(
            evaluator.tree().edit_state(b).unwrap().severity(),
            Severity::Disabled
        );
        assert!(evaluator.tree().edit_state(d).unwrap().is_enabled());

        let pass = evaluator.set_value(b, false).unwrap();
        assert_eq!(pass.evaluated, vec![b, d]);
        assert_eq!(pass.changed, vec![d]);
        assert_eq!(
            evaluator.tree().edit_state(d).unwrap().reason_text(),
            "B is off"
        );
    }

    #[test]
    fn test_invalid_value_runs_no_pass() {
        let mut evaluator = DependencyEvaluator::new(window_tree());
        evaluator.evaluate_all().unwrap();
        let mode = evaluator.tree().id_of("WindowMode").unwrap();

        assert!(evaluator
            .set_value(mode, SettingValue::enumeration("Borderless"))
            .is_err());
        assert_eq!(evaluator.pass_count(), 1);
    }

    #[test]
    fn test_pass_history_is_bounded() {
        let mut evaluator =
            DependencyEvaluator::with_config(window_tree(), EvaluatorConfig::quiet());
        for _ in 0..10 {
            evaluator.evaluate_all().unwrap();
        }
        assert_eq!(evaluator.pass_count(), 10);
        assert_eq!(evaluator.pass_history().len(), 4);
        assert_eq!(evaluator.pass_history()[0].pass, 6);
        assert!(evaluator.pass_history()[0].rows.is_empty());
    }

    #[test]
    fn test_unknown_name() {
        let mut evaluator = DependencyEvaluator::new(window_tree());
        let err = evaluator.set_value_by_name("Nope", true).unwrap_err();
        assert!(matches!(err, SettingsError::UnknownName { .. }));
    }
}
