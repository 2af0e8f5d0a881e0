//! Edit conditions: rules that gate whether a setting is shown or editable.
//!
//! Conditions read the oracle snapshot and the values of other settings, and
//! produce a [`Verdict`]. They are a closed set dispatched by `match`; the
//! [`CompositeWhen`] variant is the escape hatch for anything else.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use settings_graph_core::{
    EditState, OracleContext, OracleError, SettingId, SettingValue, Severity, Verdict,
};
use tracing::warn;

/// Read access to other settings while a condition is evaluated.
pub trait SettingLookup {
    fn value_of(&self, id: SettingId) -> Option<&SettingValue>;

    /// Edit state of a setting. Dependencies are evaluated first, so this is
    /// already up to date for anything the condition declares in `reads`.
    fn edit_state_of(&self, id: SettingId) -> Option<&EditState>;
}

/// Everything a condition may look at.
pub struct ConditionContext<'a> {
    /// The setting being evaluated.
    pub setting: SettingId,
    pub oracle: &'a OracleContext,
    lookup: &'a dyn SettingLookup,
}

impl<'a> ConditionContext<'a> {
    pub fn new(
        setting: SettingId,
        oracle: &'a OracleContext,
        lookup: &'a dyn SettingLookup,
    ) -> Self {
        Self {
            setting,
            oracle,
            lookup,
        }
    }

    pub fn value_of(&self, id: SettingId) -> Option<&SettingValue> {
        self.lookup.value_of(id)
    }

    /// Enumeration key of another setting's value.
    pub fn enum_value(&self, id: SettingId) -> Option<&str> {
        self.value_of(id).and_then(SettingValue::as_enum)
    }

    pub fn edit_state_of(&self, id: SettingId) -> Option<&EditState> {
        self.lookup.edit_state_of(id)
    }

    /// Verdict for an oracle query that could not be answered: hidden with
    /// the error text, logged at warn.
    pub fn unavailable(&self, err: OracleError) -> Verdict {
        warn!(setting = %self.setting, error = %err, "oracle_unavailable");
        Verdict::hidden(err.to_string())
    }
}

/// Whether a match enables or disables the setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchPolarity {
    /// Allowed only while the value matches.
    EnableIf,
    /// Blocked while the value matches.
    DisableIf,
}

impl MatchPolarity {
    fn violated(self, matches: bool) -> bool {
        match self {
            MatchPolarity::EnableIf => !matches,
            MatchPolarity::DisableIf => matches,
        }
    }
}

/// Blocked unless a platform trait is present.
#[derive(Debug, Clone, PartialEq)]
pub struct TraitRequired {
    pub trait_name: String,
    pub severity: Severity,
    pub reason: String,
}

/// Compares another setting's value against a constant.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueMatch {
    pub dependency: SettingId,
    pub expected: SettingValue,
    pub polarity: MatchPolarity,
    pub severity: Severity,
    pub reason: String,
}

/// Blocked unless every listed capability flag has the required value, and
/// (optionally) a setting is not at its "off" value.
#[derive(Debug, Clone, PartialEq)]
pub struct CapabilityGate {
    pub capabilities: Vec<String>,
    pub required: bool,
    pub off_sentinel: Option<(SettingId, SettingValue)>,
    pub severity: Severity,
    pub reason: String,
}

impl CapabilityGate {
    /// Disabled unless `capability` is reported as supported.
    pub fn new(capability: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            capabilities: vec![capability.into()],
            required: true,
            off_sentinel: None,
            severity: Severity::Disabled,
            reason: reason.into(),
        }
    }

    /// Require another capability flag as well.
    pub fn and(mut self, capability: impl Into<String>) -> Self {
        self.capabilities.push(capability.into());
        self
    }

    /// Also block while `dependency` holds `off`.
    pub fn unless_value(mut self, dependency: SettingId, off: impl Into<SettingValue>) -> Self {
        self.off_sentinel = Some((dependency, off.into()));
        self
    }

    /// Require the flags to be `value` instead of `true`.
    pub fn expecting(mut self, value: bool) -> Self {
        self.required = value;
        self
    }

    pub fn hide(mut self) -> Self {
        self.severity = Severity::Hidden;
        self
    }
}

/// Compares an enumerated oracle fact against a desired value.
#[derive(Debug, Clone, PartialEq)]
pub struct FactMatch {
    pub fact: String,
    pub expected: String,
    pub polarity: MatchPolarity,
    pub severity: Severity,
    pub reason: String,
}

/// Predicate used by [`CompositeWhen`].
pub type WhenPredicate = Arc<dyn Fn(&ConditionContext<'_>) -> Verdict + Send + Sync>;

/// Arbitrary pure predicate over the oracle and other settings.
#[derive(Clone)]
pub struct CompositeWhen {
    pub label: String,
    /// Settings the predicate reads; registered as dependencies.
    pub reads: Vec<SettingId>,
    /// Whether the predicate consults the oracle. Assumed `true` unless cleared.
    pub uses_oracle: bool,
    predicate: WhenPredicate,
}

impl CompositeWhen {
    pub fn new<F>(label: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&ConditionContext<'_>) -> Verdict + Send + Sync + 'static,
    {
        Self {
            label: label.into(),
            reads: Vec::new(),
            uses_oracle: true,
            predicate: Arc::new(predicate),
        }
    }

    pub fn reading(mut self, ids: impl IntoIterator<Item = SettingId>) -> Self {
        self.reads.extend(ids);
        self
    }

    pub fn without_oracle(mut self) -> Self {
        self.uses_oracle = false;
        self
    }
}

impl fmt::Debug for CompositeWhen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeWhen")
            .field("label", &self.label)
            .field("reads", &self.reads)
            .field("uses_oracle", &self.uses_oracle)
            .finish()
    }
}

/// A rule gating one setting.
#[derive(Debug, Clone)]
pub enum EditCondition {
    TraitRequired(TraitRequired),
    ValueMatch(ValueMatch),
    CapabilityGate(CapabilityGate),
    FactMatch(FactMatch),
    CompositeWhen(CompositeWhen),
}

impl EditCondition {
    /// Hidden when the platform lacks `trait_name`.
    pub fn hide_if_trait_missing(trait_name: impl Into<String>, reason: impl Into<String>) -> Self {
        EditCondition::TraitRequired(TraitRequired {
            trait_name: trait_name.into(),
            severity: Severity::Hidden,
            reason: reason.into(),
        })
    }

    /// Disabled unless `dependency` currently equals `expected`.
    pub fn enable_if_value(
        dependency: SettingId,
        expected: impl Into<SettingValue>,
        reason: impl Into<String>,
    ) -> Self {
        Self::value_match(dependency, expected, MatchPolarity::EnableIf, reason)
    }

    /// Disabled while `dependency` currently equals `expected`.
    pub fn disable_if_value(
        dependency: SettingId,
        expected: impl Into<SettingValue>,
        reason: impl Into<String>,
    ) -> Self {
        Self::value_match(dependency, expected, MatchPolarity::DisableIf, reason)
    }

    fn value_match(
        dependency: SettingId,
        expected: impl Into<SettingValue>,
        polarity: MatchPolarity,
        reason: impl Into<String>,
    ) -> Self {
        EditCondition::ValueMatch(ValueMatch {
            dependency,
            expected: expected.into(),
            polarity,
            severity: Severity::Disabled,
            reason: reason.into(),
        })
    }

    /// Hidden unless (or while, for `DisableIf`) the oracle fact equals `expected`.
    pub fn fact(
        fact: impl Into<String>,
        expected: impl Into<String>,
        polarity: MatchPolarity,
        reason: impl Into<String>,
    ) -> Self {
        EditCondition::FactMatch(FactMatch {
            fact: fact.into(),
            expected: expected.into(),
            polarity,
            severity: Severity::Hidden,
            reason: reason.into(),
        })
    }

    pub fn when<F>(label: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&ConditionContext<'_>) -> Verdict + Send + Sync + 'static,
    {
        EditCondition::CompositeWhen(CompositeWhen::new(label, predicate))
    }

    /// Override the severity used when the condition is violated.
    /// Composite predicates choose their own verdict and are left untouched.
    pub fn with_severity(mut self, severity: Severity) -> Self {
        match &mut self {
            EditCondition::TraitRequired(c) => c.severity = severity,
            EditCondition::ValueMatch(c) => c.severity = severity,
            EditCondition::CapabilityGate(c) => c.severity = severity,
            EditCondition::FactMatch(c) => c.severity = severity,
            EditCondition::CompositeWhen(_) => {}
        }
        self
    }

    /// Settings this condition reads.
    pub fn reads(&self) -> Vec<SettingId> {
        match self {
            EditCondition::ValueMatch(c) => vec![c.dependency],
            EditCondition::CapabilityGate(c) => {
                c.off_sentinel.iter().map(|(id, _)| *id).collect()
            }
            EditCondition::CompositeWhen(c) => c.reads.clone(),
            EditCondition::TraitRequired(_) | EditCondition::FactMatch(_) => Vec::new(),
        }
    }

    pub fn uses_oracle(&self) -> bool {
        match self {
            EditCondition::TraitRequired(_)
            | EditCondition::CapabilityGate(_)
            | EditCondition::FactMatch(_) => true,
            EditCondition::ValueMatch(_) => false,
            EditCondition::CompositeWhen(c) => c.uses_oracle,
        }
    }

    /// Short label for logs.
    pub fn describe(&self) -> String {
        match self {
            EditCondition::TraitRequired(c) => format!("trait_required({})", c.trait_name),
            EditCondition::ValueMatch(c) => {
                format!("value_match({} {:?} {})", c.dependency, c.polarity, c.expected)
            }
            EditCondition::CapabilityGate(c) => {
                format!("capability_gate({})", c.capabilities.join("+"))
            }
            EditCondition::FactMatch(c) => {
                format!("fact_match({} {:?} {})", c.fact, c.polarity, c.expected)
            }
            EditCondition::CompositeWhen(c) => format!("when({})", c.label),
        }
    }

    pub fn evaluate(&self, ctx: &ConditionContext<'_>) -> Verdict {
        match self {
            EditCondition::TraitRequired(c) => {
                if ctx.oracle.has_trait(&c.trait_name) {
                    Verdict::Allowed
                } else {
                    Verdict::with_severity(c.severity, c.reason.clone())
                }
            }
            EditCondition::ValueMatch(c) => {
                let matches = ctx.value_of(c.dependency) == Some(&c.expected);
                if c.polarity.violated(matches) {
                    Verdict::with_severity(c.severity, c.reason.clone())
                } else {
                    Verdict::Allowed
                }
            }
            EditCondition::CapabilityGate(c) => {
                for capability in &c.capabilities {
                    match ctx.oracle.flag(capability) {
                        Ok(value) if value == c.required => {}
                        Ok(_) => return Verdict::with_severity(c.severity, c.reason.clone()),
                        Err(err) => return ctx.unavailable(err),
                    }
                }
                match &c.off_sentinel {
                    Some((id, off)) if ctx.value_of(*id) == Some(off) => {
                        Verdict::with_severity(c.severity, c.reason.clone())
                    }
                    _ => Verdict::Allowed,
                }
            }
            EditCondition::FactMatch(c) => match ctx.oracle.fact(&c.fact) {
                Ok(actual) => {
                    if c.polarity.violated(actual == c.expected) {
                        Verdict::with_severity(c.severity, c.reason.clone())
                    } else {
                        Verdict::Allowed
                    }
                }
                Err(err) => ctx.unavailable(err),
            },
            EditCondition::CompositeWhen(c) => (c.predicate)(ctx),
        }
    }
}

impl From<CapabilityGate> for EditCondition {
    fn from(gate: CapabilityGate) -> Self {
        EditCondition::CapabilityGate(gate)
    }
}

impl From<CompositeWhen> for EditCondition {
    fn from(when: CompositeWhen) -> Self {
        EditCondition::CompositeWhen(when)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[derive(Default)]
    struct MapLookup {
        values: HashMap<SettingId, SettingValue>,
        states: HashMap<SettingId, EditState>,
    }

    impl SettingLookup for MapLookup {
        fn value_of(&self, id: SettingId) -> Option<&SettingValue> {
            self.values.get(&id)
        }

        fn edit_state_of(&self, id: SettingId) -> Option<&EditState> {
            self.states.get(&id)
        }
    }

    fn lookup_with(id: SettingId, value: SettingValue) -> MapLookup {
        let mut lookup = MapLookup::default();
        lookup.values.insert(id, value);
        lookup
    }

    #[test]
    fn test_trait_required() {
        let condition = EditCondition::hide_if_trait_missing(
            "Platform.Trait.SupportsWindowedMode",
            "Platform does not support window mode",
        );
        let lookup = MapLookup::default();

        let without = OracleContext::new();
        let ctx = ConditionContext::new(SettingId(0), &without, &lookup);
        assert_eq!(
            condition.evaluate(&ctx),
            Verdict::hidden("Platform does not support window mode")
        );

        let with = OracleContext::new().with_trait("Platform.Trait.SupportsWindowedMode");
        let ctx = ConditionContext::new(SettingId(0), &with, &lookup);
        assert_eq!(condition.evaluate(&ctx), Verdict::Allowed);
    }

    #[test]
    fn test_value_match_polarity() {
        let mode = SettingId(1);
        let oracle = OracleContext::new();
        let lookup = lookup_with(mode, SettingValue::enumeration("WindowedFullscreen"));
        let ctx = ConditionContext::new(SettingId(2), &oracle, &lookup);

        let disable = EditCondition::disable_if_value(
            mode,
            SettingValue::enumeration("WindowedFullscreen"),
            "native resolution only",
        );
        assert_eq!(disable.evaluate(&ctx).severity(), Severity::Disabled);

        let enable = EditCondition::enable_if_value(
            mode,
            SettingValue::enumeration("Fullscreen"),
            "fullscreen only",
        );
        assert_eq!(enable.evaluate(&ctx), Verdict::disabled("fullscreen only"));

        let hidden = enable.clone().with_severity(Severity::Hidden);
        assert_eq!(hidden.evaluate(&ctx), Verdict::hidden("fullscreen only"));
        assert_eq!(enable.reads(), vec![mode]);
        assert!(!enable.uses_oracle());
    }

    #[test]
    fn test_value_match_without_value_never_matches() {
        let oracle = OracleContext::new();
        let lookup = MapLookup::default();
        let ctx = ConditionContext::new(SettingId(2), &oracle, &lookup);

        let disable = EditCondition::disable_if_value(SettingId(1), true, "blocked");
        assert!(disable.evaluate(&ctx).is_allowed());
        let enable = EditCondition::enable_if_value(SettingId(1), true, "blocked");
        assert!(!enable.evaluate(&ctx).is_allowed());
    }

    #[test]
    fn test_capability_gate_with_off_sentinel() {
        let mode = SettingId(0);
        let gate: EditCondition = CapabilityGate::new("DLSSSupported", "needs DLSS and not off")
            .unless_value(mode, SettingValue::enumeration("Off"))
            .into();
        assert_eq!(gate.reads(), vec![mode]);

        let supported = OracleContext::new().with_flag("DLSSSupported", true);
        let off = lookup_with(mode, SettingValue::enumeration("Off"));
        let quality = lookup_with(mode, SettingValue::enumeration("Quality"));

        let ctx = ConditionContext::new(SettingId(1), &supported, &off);
        assert_eq!(gate.evaluate(&ctx), Verdict::disabled("needs DLSS and not off"));

        let ctx = ConditionContext::new(SettingId(1), &supported, &quality);
        assert!(gate.evaluate(&ctx).is_allowed());

        let unsupported = OracleContext::new().with_flag("DLSSSupported", false);
        let ctx = ConditionContext::new(SettingId(1), &unsupported, &quality);
        assert_eq!(gate.evaluate(&ctx).severity(), Severity::Disabled);
    }

    #[test]
    fn test_capability_gate_requires_all_flags() {
        let gate: EditCondition = CapabilityGate::new("DLSSSupported", "incompatible")
            .and("DLSSHardwareCompatible")
            .into();
        let lookup = MapLookup::default();

        let partial = OracleContext::new()
            .with_flag("DLSSSupported", true)
            .with_flag("DLSSHardwareCompatible", false);
        let ctx = ConditionContext::new(SettingId(0), &partial, &lookup);
        assert_eq!(gate.evaluate(&ctx), Verdict::disabled("incompatible"));

        let full = partial.clone().with_flag("DLSSHardwareCompatible", true);
        let ctx = ConditionContext::new(SettingId(0), &full, &lookup);
        assert!(gate.evaluate(&ctx).is_allowed());
    }

    #[test]
    fn test_unavailable_oracle_is_most_restrictive() {
        let gate: EditCondition = CapabilityGate::new("DLSSSupported", "needs DLSS").into();
        let oracle = OracleContext::new();
        let lookup = MapLookup::default();
        let ctx = ConditionContext::new(SettingId(0), &oracle, &lookup);

        let verdict = gate.evaluate(&ctx);
        assert_eq!(verdict.severity(), Severity::Hidden);
        assert!(verdict.reason().unwrap().contains("DLSSSupported"));

        let fact = EditCondition::fact(
            "FramePacingMode",
            "DesktopStyle",
            MatchPolarity::EnableIf,
            "desktop only",
        );
        assert_eq!(fact.evaluate(&ctx).severity(), Severity::Hidden);
    }

    #[test]
    fn test_fact_match_polarity() {
        let console = OracleContext::new().with_fact("FramePacingMode", "ConsoleStyle");
        let lookup = MapLookup::default();
        let ctx = ConditionContext::new(SettingId(0), &console, &lookup);

        let disable_on_console = EditCondition::fact(
            "FramePacingMode",
            "ConsoleStyle",
            MatchPolarity::DisableIf,
            "not on console",
        );
        assert_eq!(disable_on_console.evaluate(&ctx), Verdict::hidden("not on console"));

        let enable_on_desktop = EditCondition::fact(
            "FramePacingMode",
            "DesktopStyle",
            MatchPolarity::EnableIf,
            "desktop only",
        )
        .with_severity(Severity::Disabled);
        assert_eq!(enable_on_desktop.evaluate(&ctx), Verdict::disabled("desktop only"));
    }

    #[test]
    fn test_composite_when_reads_edit_state() {
        let parent = SettingId(0);
        let mut lookup = MapLookup::default();
        lookup
            .states
            .insert(parent, EditState::from_verdict(Verdict::hidden("gone")));

        let condition: EditCondition = CompositeWhen::new("follow_parent", move |ctx| {
            match ctx.edit_state_of(parent) {
                Some(state) if !state.is_visible() => Verdict::hidden("parent hidden"),
                _ => Verdict::Allowed,
            }
        })
        .reading([parent])
        .without_oracle()
        .into();

        let oracle = OracleContext::new();
        let ctx = ConditionContext::new(SettingId(1), &oracle, &lookup);
        assert_eq!(condition.evaluate(&ctx), Verdict::hidden("parent hidden"));
        assert_eq!(condition.reads(), vec![parent]);
        assert!(!condition.uses_oracle());
        assert_eq!(condition.describe(), "when(follow_parent)");
    }
}
