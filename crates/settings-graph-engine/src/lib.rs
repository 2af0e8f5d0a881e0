//! Dependency graph and edit-condition engine for settings menus.
//!
//! A menu is a set of settings whose visibility and editability depend on
//! the platform and on each other: the resolution can only be picked in
//! fullscreen, DLSS sharpness is meaningless while DLSS is off, a quality
//! preset tracks five individual quality levels. This crate keeps those
//! relationships in a graph and re-evaluates exactly the affected settings
//! whenever something changes.
//!
//! ## Core Concepts
//!
//! - **SettingNode**: one setting with a value domain, a cached value and a
//!   list of edit conditions
//! - **EditCondition**: a pure rule producing a verdict (`Allowed`,
//!   `Disabled(reason)` or `Hidden(reason)`) from the oracle and other values
//! - **SettingsTree**: arena of nodes plus the dependency graph, owning the
//!   external store the settings read and write
//! - **DependencyEvaluator**: turns changes into evaluation passes in
//!   dependency order
//!
//! ## The Evaluation Model
//!
//! ```text
//! change ──> dirty = {changed} ∪ dependents*(changed)
//!        ──> for id in topo_order(dirty):
//!                edit_state[id] = merge(condition.evaluate(ctx) for condition in id)
//! ```
//!
//! `merge` takes the most restrictive severity and the union of reasons, so
//! the result does not depend on condition order.

mod condition;
mod error;
mod evaluator;
mod history;
mod node;
mod tree;

#[cfg(test)]
mod test_fixtures;

pub use condition::{
    CapabilityGate, CompositeWhen, ConditionContext, EditCondition, FactMatch, MatchPolarity,
    SettingLookup, TraitRequired, ValueMatch, WhenPredicate,
};
pub use error::{SettingsError, SettingsResult, WriteError};
pub use evaluator::{DependencyEvaluator, EvaluationPass, EvaluationTrigger, EvaluatorConfig};
pub use history::{ChangeReason, ValueChange, ValueHistory};
pub use node::{
    Accessor, ActionFn, CommitContext, CommitHook, Getter, SettingBuilder, SettingNode, Setter,
};
pub use tree::{SettingCollection, SettingsTree};

// Core types, re-exported so downstream crates need a single import.
pub use settings_graph_core::{
    EditState, OracleContext, OracleError, OracleResult, SettingId, SettingOption,
    SettingPresentation, SettingValue, Severity, ValueDomain, Verdict,
};
