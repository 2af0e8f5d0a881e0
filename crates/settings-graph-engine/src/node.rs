//! Setting nodes and the hooks that bind them to an external store.

use std::fmt;

use settings_graph_core::{EditState, OracleContext, SettingId, SettingValue, ValueDomain};

use crate::condition::{ConditionContext, EditCondition};
use crate::error::WriteError;
use crate::history::{ChangeReason, ValueHistory};

/// Reads a setting's value out of the store.
pub type Getter<S> = fn(&S) -> Option<SettingValue>;

/// Writes a validated value into the store.
pub type Setter<S> = fn(&mut S, &SettingValue) -> Result<(), WriteError>;

/// Runs after a value has been committed. Never called during evaluation.
pub type CommitHook<S> = fn(&mut S, &CommitContext<'_>);

/// Store mutation performed by an action setting. Receives the current
/// oracle so the action and its edit conditions see the same platform.
pub type ActionFn<S> = fn(&mut S, &OracleContext) -> Result<(), WriteError>;

/// Typed getter/setter pair for one setting.
pub struct Accessor<S> {
    pub get: Getter<S>,
    pub set: Setter<S>,
}

impl<S> Accessor<S> {
    pub fn new(get: Getter<S>, set: Setter<S>) -> Self {
        Self { get, set }
    }
}

impl<S> Clone for Accessor<S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S> Copy for Accessor<S> {}

/// What a commit hook gets to see.
#[derive(Debug, Clone, Copy)]
pub struct CommitContext<'a> {
    pub setting: SettingId,
    pub name: &'a str,
    pub value: &'a SettingValue,
    pub reason: ChangeReason,
}

/// One user-facing setting.
pub struct SettingNode<S> {
    pub(crate) id: SettingId,
    pub(crate) name: String,
    pub(crate) display_name: String,
    pub(crate) description: String,
    pub(crate) domain: ValueDomain,
    pub(crate) value: Option<SettingValue>,
    pub(crate) default_value: Option<SettingValue>,
    pub(crate) initial_value: Option<SettingValue>,
    pub(crate) conditions: Vec<EditCondition>,
    pub(crate) dependencies: Vec<SettingId>,
    pub(crate) dependents: Vec<SettingId>,
    pub(crate) edit_state: EditState,
    pub(crate) dirty: bool,
    pub(crate) history: ValueHistory,
    pub(crate) accessor: Option<Accessor<S>>,
    pub(crate) on_committed: Option<CommitHook<S>>,
    pub(crate) action: Option<ActionFn<S>>,
    pub(crate) collection: Option<String>,
}

impl<S> SettingNode<S> {
    pub fn id(&self) -> SettingId {
        self.id
    }

    /// Stable dev name, unique within a tree.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn domain(&self) -> &ValueDomain {
        &self.domain
    }

    /// Cached value; `None` for actions.
    pub fn value(&self) -> Option<&SettingValue> {
        self.value.as_ref()
    }

    pub fn default_value(&self) -> Option<&SettingValue> {
        self.default_value.as_ref()
    }

    pub fn initial_value(&self) -> Option<&SettingValue> {
        self.initial_value.as_ref()
    }

    /// Label of the current value for discrete domains, or its plain text.
    pub fn value_label(&self) -> Option<String> {
        let value = self.value.as_ref()?;
        Some(
            self.domain
                .label_of(value)
                .map(str::to_string)
                .unwrap_or_else(|| value.to_string()),
        )
    }

    pub fn conditions(&self) -> &[EditCondition] {
        &self.conditions
    }

    /// Settings this one reads, in the order they were added.
    pub fn dependencies(&self) -> &[SettingId] {
        &self.dependencies
    }

    /// Settings that read this one.
    pub fn dependents(&self) -> &[SettingId] {
        &self.dependents
    }

    pub fn edit_state(&self) -> &EditState {
        &self.edit_state
    }

    /// Whether the cached edit state is stale.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn history(&self) -> &ValueHistory {
        &self.history
    }

    pub fn collection(&self) -> Option<&str> {
        self.collection.as_deref()
    }

    pub fn is_action(&self) -> bool {
        self.domain.is_action()
    }

    pub fn has_accessor(&self) -> bool {
        self.accessor.is_some()
    }

    /// Whether any condition consults the oracle.
    pub fn uses_oracle(&self) -> bool {
        self.conditions.iter().any(EditCondition::uses_oracle)
    }

    /// Merge the verdicts of every condition. No side effects.
    pub fn evaluate(&self, ctx: &ConditionContext<'_>) -> EditState {
        self.conditions.iter().map(|c| c.evaluate(ctx)).collect()
    }

    pub(crate) fn changed_since_initial(&self) -> bool {
        self.value != self.initial_value
    }
}

impl<S> fmt::Debug for SettingNode<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SettingNode")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("value", &self.value)
            .field("conditions", &self.conditions.len())
            .field("dependencies", &self.dependencies)
            .field("edit_state", &self.edit_state)
            .field("dirty", &self.dirty)
            .finish()
    }
}

/// Declarative description of a setting, consumed by
/// [`SettingsTree::register`](crate::SettingsTree::register).
pub struct SettingBuilder<S> {
    pub(crate) name: String,
    pub(crate) display_name: Option<String>,
    pub(crate) description: String,
    pub(crate) domain: ValueDomain,
    pub(crate) default_value: Option<SettingValue>,
    pub(crate) collection: Option<String>,
    pub(crate) accessor: Option<Accessor<S>>,
    pub(crate) on_committed: Option<CommitHook<S>>,
    pub(crate) action: Option<ActionFn<S>>,
    pub(crate) conditions: Vec<EditCondition>,
    pub(crate) depends_on: Vec<SettingId>,
}

impl<S> SettingBuilder<S> {
    pub fn new(name: impl Into<String>, domain: ValueDomain) -> Self {
        Self {
            name: name.into(),
            display_name: None,
            description: String::new(),
            domain,
            default_value: None,
            collection: None,
            accessor: None,
            on_committed: None,
            action: None,
            conditions: Vec::new(),
            depends_on: Vec::new(),
        }
    }

    pub fn discrete(
        name: impl Into<String>,
        options: impl IntoIterator<Item = settings_graph_core::SettingOption>,
    ) -> Self {
        Self::new(name, ValueDomain::discrete(options))
    }

    pub fn toggle(name: impl Into<String>) -> Self {
        Self::new(name, ValueDomain::toggle())
    }

    pub fn scalar(name: impl Into<String>, min: f64, max: f64) -> Self {
        Self::new(name, ValueDomain::scalar(min, max))
    }

    /// Button-like setting that mutates the store when run.
    pub fn action(name: impl Into<String>, action: ActionFn<S>) -> Self {
        let mut builder = Self::new(name, ValueDomain::Action);
        builder.action = Some(action);
        builder
    }

    pub fn display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Snap a scalar domain to `step`.
    pub fn step(mut self, step: f64) -> Self {
        self.domain = self.domain.with_step(step);
        self
    }

    pub fn default_value(mut self, value: impl Into<SettingValue>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Place the setting in a collection path such as `Video/Display`.
    pub fn in_collection(mut self, path: impl Into<String>) -> Self {
        self.collection = Some(path.into());
        self
    }

    pub fn accessor(mut self, get: Getter<S>, set: Setter<S>) -> Self {
        self.accessor = Some(Accessor::new(get, set));
        self
    }

    pub fn on_committed(mut self, hook: CommitHook<S>) -> Self {
        self.on_committed = Some(hook);
        self
    }

    /// Attach an edit condition. Settings it reads become dependencies.
    pub fn condition(mut self, condition: impl Into<EditCondition>) -> Self {
        self.conditions.push(condition.into());
        self
    }

    pub fn depends_on(mut self, id: SettingId) -> Self {
        self.depends_on.push(id);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<S> fmt::Debug for SettingBuilder<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SettingBuilder")
            .field("name", &self.name)
            .field("domain", &self.domain)
            .field("default_value", &self.default_value)
            .field("collection", &self.collection)
            .field("conditions", &self.conditions.len())
            .field("depends_on", &self.depends_on)
            .finish()
    }
}
