//! Core domain types shared across the settings-graph workspace.
//!
//! Nothing in here knows about dependency graphs or evaluation order; these are
//! the plain values that nodes hold, the domains that constrain them, the
//! verdicts that edit conditions produce and the oracle snapshot that
//! conditions consult.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// Identifiers
// =============================================================================

/// Identifier for settings within a settings tree.
///
/// Ids are handed out sequentially, so comparing two ids compares their
/// registration order.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct SettingId(pub u64);

impl fmt::Display for SettingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// =============================================================================
// Values and domains
// =============================================================================

/// The value held by a setting.
///
/// Enumerations are carried by their stable key (`"WindowedFullscreen"`), not
/// by a discriminant, so values survive reordering of the option list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum SettingValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Enum(String),
}

impl SettingValue {
    /// Create an enumeration value from its key.
    pub fn enumeration(key: impl Into<String>) -> Self {
        Self::Enum(key.into())
    }

    /// Short name of the value's type, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            SettingValue::Bool(_) => "bool",
            SettingValue::Int(_) => "int",
            SettingValue::Float(_) => "float",
            SettingValue::Enum(_) => "enum",
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SettingValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            SettingValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            SettingValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<&str> {
        match self {
            SettingValue::Enum(key) => Some(key),
            _ => None,
        }
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingValue::Bool(b) => write!(f, "{}", b),
            SettingValue::Int(i) => write!(f, "{}", i),
            SettingValue::Float(v) => write!(f, "{}", v),
            SettingValue::Enum(key) => write!(f, "{}", key),
        }
    }
}

impl From<bool> for SettingValue {
    fn from(b: bool) -> Self {
        SettingValue::Bool(b)
    }
}

impl From<i64> for SettingValue {
    fn from(i: i64) -> Self {
        SettingValue::Int(i)
    }
}

impl From<i32> for SettingValue {
    fn from(i: i32) -> Self {
        SettingValue::Int(i64::from(i))
    }
}

impl From<f64> for SettingValue {
    fn from(v: f64) -> Self {
        SettingValue::Float(v)
    }
}

/// One legal choice of a discrete setting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingOption {
    /// The value stored when this option is picked.
    pub value: SettingValue,
    /// User-facing label.
    pub label: String,
}

impl SettingOption {
    pub fn new(value: impl Into<SettingValue>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }

    /// Enumeration option whose key and label differ.
    pub fn enumeration(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: SettingValue::Enum(key.into()),
            label: label.into(),
        }
    }
}

/// Tolerance used when checking that a scalar sits on its step grid.
const STEP_TOLERANCE: f64 = 1e-6;

/// The set of values a setting accepts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValueDomain {
    /// Exactly one of the listed options.
    Discrete { options: Vec<SettingOption> },
    /// A float in `[min, max]`, optionally snapped to `step`.
    Scalar {
        min: f64,
        max: f64,
        #[serde(default)]
        step: Option<f64>,
    },
    /// A button-like entry without a value.
    Action,
}

impl ValueDomain {
    pub fn discrete(options: impl IntoIterator<Item = SettingOption>) -> Self {
        Self::Discrete {
            options: options.into_iter().collect(),
        }
    }

    /// Discrete on/off domain.
    pub fn toggle() -> Self {
        Self::discrete([
            SettingOption::new(false, "Off"),
            SettingOption::new(true, "On"),
        ])
    }

    /// Integer options `min..=max`, each labelled with its number.
    pub fn int_range(min: i64, max: i64) -> Self {
        Self::discrete((min..=max).map(|i| SettingOption::new(i, i.to_string())))
    }

    pub fn scalar(min: f64, max: f64) -> Self {
        Self::Scalar {
            min,
            max,
            step: None,
        }
    }

    /// Set the step of a scalar domain. No effect on other domains.
    pub fn with_step(self, step: f64) -> Self {
        match self {
            ValueDomain::Scalar { min, max, .. } => ValueDomain::Scalar {
                min,
                max,
                step: Some(step),
            },
            other => other,
        }
    }

    pub fn is_action(&self) -> bool {
        matches!(self, ValueDomain::Action)
    }

    /// Options of a discrete domain; empty for the other kinds.
    pub fn options(&self) -> &[SettingOption] {
        match self {
            ValueDomain::Discrete { options } => options,
            _ => &[],
        }
    }

    /// Label of the option holding `value`, if this is a discrete domain.
    pub fn label_of(&self, value: &SettingValue) -> Option<&str> {
        self.options()
            .iter()
            .find(|o| &o.value == value)
            .map(|o| o.label.as_str())
    }

    /// Check that `value` is legal, returning the rejection reason otherwise.
    pub fn check(&self, value: &SettingValue) -> Result<(), String> {
        match self {
            ValueDomain::Discrete { options } => {
                if options.iter().any(|o| &o.value == value) {
                    Ok(())
                } else {
                    Err(format!("{} is not one of the declared options", value))
                }
            }
            ValueDomain::Scalar { min, max, step } => {
                let v = value
                    .as_float()
                    .ok_or_else(|| format!("expected a float, got {}", value.kind()))?;
                if !(*min <= v && v <= *max) {
                    return Err(format!("{} is outside [{}, {}]", v, min, max));
                }
                if let Some(step) = step.filter(|s| *s > 0.0) {
                    let steps = (v - min) / step;
                    if (steps - steps.round()).abs() > STEP_TOLERANCE {
                        return Err(format!("{} is not a multiple of step {}", v, step));
                    }
                }
                Ok(())
            }
            ValueDomain::Action => Err("action settings do not hold a value".to_string()),
        }
    }

    /// Parse user input into a value of this domain.
    ///
    /// Discrete domains match an option's value or label (case-insensitive);
    /// scalar domains parse a float. The result is not range-checked.
    pub fn parse(&self, input: &str) -> Option<SettingValue> {
        let input = input.trim();
        match self {
            ValueDomain::Discrete { options } => options
                .iter()
                .find(|o| {
                    o.value.to_string().eq_ignore_ascii_case(input)
                        || o.label.eq_ignore_ascii_case(input)
                })
                .map(|o| o.value.clone()),
            ValueDomain::Scalar { .. } => input.parse::<f64>().ok().map(SettingValue::Float),
            ValueDomain::Action => None,
        }
    }
}

// =============================================================================
// Verdicts
// =============================================================================

/// How restrictive a verdict is. `Hidden > Disabled > Allowed`.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Severity {
    #[default]
    Allowed,
    Disabled,
    Hidden,
}

impl Severity {
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Allowed => "allowed",
            Severity::Disabled => "disabled",
            Severity::Hidden => "hidden",
        }
    }
}

/// Outcome of evaluating one edit condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", content = "reason", rename_all = "snake_case")]
pub enum Verdict {
    Allowed,
    Disabled(String),
    Hidden(String),
}

impl Verdict {
    pub fn disabled(reason: impl Into<String>) -> Self {
        Verdict::Disabled(reason.into())
    }

    pub fn hidden(reason: impl Into<String>) -> Self {
        Verdict::Hidden(reason.into())
    }

    /// Build a verdict of the given severity. The reason is dropped for `Allowed`.
    pub fn with_severity(severity: Severity, reason: impl Into<String>) -> Self {
        match severity {
            Severity::Allowed => Verdict::Allowed,
            Severity::Disabled => Verdict::Disabled(reason.into()),
            Severity::Hidden => Verdict::Hidden(reason.into()),
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Verdict::Allowed => Severity::Allowed,
            Verdict::Disabled(_) => Severity::Disabled,
            Verdict::Hidden(_) => Severity::Hidden,
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Verdict::Allowed => None,
            Verdict::Disabled(reason) | Verdict::Hidden(reason) => Some(reason),
        }
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, Verdict::Allowed)
    }
}

/// Combined edit state of a setting: the most restrictive severity seen plus
/// every non-allowed reason.
///
/// Reasons are kept sorted and deduplicated so that merging is associative and
/// commutative, with [`EditState::allowed`] as identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditState {
    severity: Severity,
    reasons: BTreeSet<String>,
}

impl EditState {
    pub fn allowed() -> Self {
        Self::default()
    }

    pub fn from_verdict(verdict: Verdict) -> Self {
        let mut state = Self::allowed();
        state.gather(verdict);
        state
    }

    /// Fold one verdict into this state.
    pub fn gather(&mut self, verdict: Verdict) {
        self.severity = self.severity.max(verdict.severity());
        match verdict {
            Verdict::Allowed => {}
            Verdict::Disabled(reason) | Verdict::Hidden(reason) => {
                if !reason.is_empty() {
                    self.reasons.insert(reason);
                }
            }
        }
    }

    pub fn merge(mut self, other: EditState) -> Self {
        self.severity = self.severity.max(other.severity);
        self.reasons.extend(other.reasons);
        self
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn is_visible(&self) -> bool {
        self.severity < Severity::Hidden
    }

    pub fn is_enabled(&self) -> bool {
        self.severity == Severity::Allowed
    }

    pub fn reasons(&self) -> impl Iterator<Item = &str> {
        self.reasons.iter().map(String::as_str)
    }

    /// All reasons joined by newlines; empty when allowed.
    pub fn reason_text(&self) -> String {
        self.reasons
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Summary verdict carrying the joined reason text.
    pub fn verdict(&self) -> Verdict {
        Verdict::with_severity(self.severity, self.reason_text())
    }
}

impl FromIterator<Verdict> for EditState {
    fn from_iter<I: IntoIterator<Item = Verdict>>(iter: I) -> Self {
        let mut state = EditState::allowed();
        for verdict in iter {
            state.gather(verdict);
        }
        state
    }
}

// =============================================================================
// Oracle
// =============================================================================

/// Result type for oracle queries.
pub type OracleResult<T> = Result<T, OracleError>;

/// Errors raised by oracle queries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OracleError {
    /// The fact was never supplied, so the question cannot be answered.
    #[error("oracle fact `{key}` is unavailable")]
    Unavailable { key: String },
}

/// Snapshot of platform and hardware facts consulted by edit conditions.
///
/// Traits are a plain set: absence means "not present". Flags, facts and
/// metrics distinguish "false" from "never reported", and querying a missing
/// key yields [`OracleError::Unavailable`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OracleContext {
    /// Platform traits, e.g. `Platform.Trait.SupportsWindowedMode`.
    #[serde(default)]
    pub traits: BTreeSet<String>,
    /// Boolean capabilities, e.g. `DLSSSupported`.
    #[serde(default)]
    pub flags: BTreeMap<String, bool>,
    /// Enumerated facts, e.g. `FramePacingMode = DesktopStyle`.
    #[serde(default)]
    pub facts: BTreeMap<String, String>,
    /// Numeric facts such as display metrics.
    #[serde(default)]
    pub metrics: BTreeMap<String, f64>,
}

impl OracleContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_trait(mut self, name: impl Into<String>) -> Self {
        self.traits.insert(name.into());
        self
    }

    pub fn with_flag(mut self, name: impl Into<String>, value: bool) -> Self {
        self.flags.insert(name.into(), value);
        self
    }

    pub fn with_fact(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.facts.insert(name.into(), value.into());
        self
    }

    pub fn with_metric(mut self, name: impl Into<String>, value: f64) -> Self {
        self.metrics.insert(name.into(), value);
        self
    }

    pub fn add_trait(&mut self, name: impl Into<String>) {
        self.traits.insert(name.into());
    }

    pub fn remove_trait(&mut self, name: &str) {
        self.traits.remove(name);
    }

    pub fn set_flag(&mut self, name: impl Into<String>, value: bool) {
        self.flags.insert(name.into(), value);
    }

    pub fn set_fact(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.facts.insert(name.into(), value.into());
    }

    pub fn set_metric(&mut self, name: impl Into<String>, value: f64) {
        self.metrics.insert(name.into(), value);
    }

    pub fn has_trait(&self, name: &str) -> bool {
        self.traits.contains(name)
    }

    pub fn flag(&self, name: &str) -> OracleResult<bool> {
        self.flags
            .get(name)
            .copied()
            .ok_or_else(|| OracleError::Unavailable {
                key: name.to_string(),
            })
    }

    pub fn fact(&self, name: &str) -> OracleResult<&str> {
        self.facts
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| OracleError::Unavailable {
                key: name.to_string(),
            })
    }

    pub fn metric(&self, name: &str) -> OracleResult<f64> {
        self.metrics
            .get(name)
            .copied()
            .ok_or_else(|| OracleError::Unavailable {
                key: name.to_string(),
            })
    }
}

// =============================================================================
// Presentation
// =============================================================================

/// What the presentation layer needs to render one setting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingPresentation {
    pub id: SettingId,
    /// Stable dev name of the setting.
    pub name: String,
    /// Current value; `None` for actions.
    pub value: Option<SettingValue>,
    pub visible: bool,
    pub enabled: bool,
    /// Joined reasons when not enabled, empty otherwise.
    pub reason: String,
}

impl SettingPresentation {
    pub fn new(
        id: SettingId,
        name: impl Into<String>,
        value: Option<SettingValue>,
        state: &EditState,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            value,
            visible: state.is_visible(),
            enabled: state.is_enabled(),
            reason: state.reason_text(),
        }
    }
}
