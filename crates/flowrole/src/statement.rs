//! Policy statements and their AWS JSON representation.

use std::collections::BTreeMap;

use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

/// Whether a statement grants or refuses its actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Effect {
    /// Grant the actions.
    Allow,
    /// Refuse the actions, overriding any allow.
    Deny,
}

impl std::fmt::Display for Effect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Effect::Allow => write!(f, "Allow"),
            Effect::Deny => write!(f, "Deny"),
        }
    }
}

/// A condition block entry: `<operator>: { <key>: [values] }`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Condition {
    /// Condition operator, e.g. `ArnLike` or `StringEquals`.
    pub operator: String,
    /// Context key the operator tests, e.g. `ecs:cluster`.
    pub key: String,
    /// Values compared against the key.
    pub values: Vec<String>,
}

impl Condition {
    /// Create a condition with an arbitrary operator.
    pub fn new(
        operator: impl Into<String>,
        key: impl Into<String>,
        values: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            operator: operator.into(),
            key: key.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// `ArnLike` condition.
    pub fn arn_like(
        key: impl Into<String>,
        values: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self::new("ArnLike", key, values)
    }
}

/// A principal entry: `<type>: [identifiers]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Principal {
    /// Principal type, e.g. `Service` or `AWS`.
    pub principal_type: String,
    /// Principal identifiers.
    pub identifiers: Vec<String>,
}

impl Principal {
    /// A service principal such as `ecs-tasks.amazonaws.com`.
    pub fn service(identifier: impl Into<String>) -> Self {
        Self {
            principal_type: "Service".to_string(),
            identifiers: vec![identifier.into()],
        }
    }
}

/// A single policy statement.
///
/// Statements are assembled with the consuming builder methods and are
/// read-only afterwards. `actions` and `resources` keep insertion order so
/// rendered documents are stable across runs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PolicyStatement {
    #[serde(rename = "Effect")]
    effect: Effect,
    #[serde(rename = "Action")]
    actions: Vec<String>,
    #[serde(rename = "Resource", skip_serializing_if = "Vec::is_empty")]
    resources: Vec<String>,
    #[serde(
        rename = "Principal",
        skip_serializing_if = "Vec::is_empty",
        serialize_with = "serialize_principals"
    )]
    principals: Vec<Principal>,
    #[serde(
        rename = "Condition",
        skip_serializing_if = "Vec::is_empty",
        serialize_with = "serialize_conditions"
    )]
    conditions: Vec<Condition>,
}

impl PolicyStatement {
    /// Start a statement with the given effect and actions.
    pub fn new(effect: Effect, actions: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            effect,
            actions: actions.into_iter().map(Into::into).collect(),
            resources: Vec::new(),
            principals: Vec::new(),
            conditions: Vec::new(),
        }
    }

    /// Start an `Allow` statement.
    pub fn allow(actions: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self::new(Effect::Allow, actions)
    }

    /// Start a `Deny` statement.
    pub fn deny(actions: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self::new(Effect::Deny, actions)
    }

    /// Append resources.
    pub fn on(mut self, resources: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.resources.extend(resources.into_iter().map(Into::into));
        self
    }

    /// Append a condition.
    pub fn when(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Append a principal (trust policies only).
    pub fn for_principal(mut self, principal: Principal) -> Self {
        self.principals.push(principal);
        self
    }

    /// The statement's effect.
    pub fn effect(&self) -> Effect {
        self.effect
    }

    /// Actions, in authoring order.
    pub fn actions(&self) -> &[String] {
        &self.actions
    }

    /// Resource patterns, in authoring order.
    pub fn resources(&self) -> &[String] {
        &self.resources
    }

    /// Conditions, possibly empty.
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// Principals, possibly empty.
    pub fn principals(&self) -> &[Principal] {
        &self.principals
    }

    /// Whether `action` is listed verbatim.
    pub fn grants(&self, action: &str) -> bool {
        self.actions.iter().any(|a| a == action)
    }

    /// Whether the statement applies to every resource.
    pub fn is_unrestricted(&self) -> bool {
        self.resources.iter().any(|r| r == crate::arn::ALL_RESOURCES)
    }
}

// Principals sharing a type are merged: {"Service": ["a", "b"]}.
fn serialize_principals<S: Serializer>(principals: &[Principal], s: S) -> Result<S::Ok, S::Error> {
    let mut grouped: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for principal in principals {
        grouped
            .entry(principal.principal_type.as_str())
            .or_default()
            .extend(principal.identifiers.iter().map(String::as_str));
    }
    let mut map = s.serialize_map(Some(grouped.len()))?;
    for (kind, identifiers) in &grouped {
        map.serialize_entry(kind, identifiers)?;
    }
    map.end()
}

// Conditions are grouped by operator, then key: {"ArnLike": {"ecs:cluster": [...]}}.
fn serialize_conditions<S: Serializer>(conditions: &[Condition], s: S) -> Result<S::Ok, S::Error> {
    let mut grouped: BTreeMap<&str, BTreeMap<&str, Vec<&str>>> = BTreeMap::new();
    for condition in conditions {
        grouped
            .entry(condition.operator.as_str())
            .or_default()
            .entry(condition.key.as_str())
            .or_default()
            .extend(condition.values.iter().map(String::as_str));
    }
    let mut map = s.serialize_map(Some(grouped.len()))?;
    for (operator, keys) in &grouped {
        map.serialize_entry(operator, keys)?;
    }
    map.end()
}
