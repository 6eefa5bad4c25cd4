//! IAM policy documents
//!
//! Models the subset of the IAM policy grammar used for SQS access policies.
//! IAM accepts several encodings for the same document (a lone string or a
//! one-element array, a single statement object or a list of statements),
//! so every multi-valued field is normalized into a [`StringSet`] on parse.
//! Two documents that differ only in encoding therefore compare equal.

mod string_set;

pub use string_set::StringSet;

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Policy language version written into new documents
pub const POLICY_VERSION: &str = "2012-10-17";

/// Effect of a policy statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    Allow,
    Deny,
}

/// Principal of a policy statement, keyed by principal type
/// (e.g. "Service", "AWS").
///
/// The wildcard principal `"*"` is stored as `{"AWS": ["*"]}`, which IAM
/// treats as equivalent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Principal(BTreeMap<String, StringSet>);

impl Principal {
    /// A service principal such as "s3.amazonaws.com"
    pub fn service(name: impl Into<String>) -> Self {
        let mut map = BTreeMap::new();
        map.insert("Service".to_string(), StringSet::from_iter([name.into()]));
        Self(map)
    }

    /// Anyone
    pub fn any() -> Self {
        let mut map = BTreeMap::new();
        map.insert("AWS".to_string(), StringSet::from_iter(["*".to_string()]));
        Self(map)
    }

    pub fn get(&self, principal_type: &str) -> Option<&StringSet> {
        self.0.get(principal_type)
    }
}

impl<'de> Deserialize<'de> for Principal {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Wildcard(String),
            Map(BTreeMap<String, StringSet>),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Wildcard(s) if s == "*" => Ok(Principal::any()),
            Repr::Wildcard(s) => Err(serde::de::Error::custom(format!(
                "invalid principal {:?}",
                s
            ))),
            Repr::Map(map) => Ok(Principal(map)),
        }
    }
}

/// Statement conditions: operator → condition key → values
pub type Conditions = BTreeMap<String, BTreeMap<String, StringSet>>;

/// A single policy statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyStatement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,

    pub effect: Effect,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub principal: Option<Principal>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub condition: Conditions,

    #[serde(default, skip_serializing_if = "StringSet::is_empty")]
    pub action: StringSet,

    #[serde(default, skip_serializing_if = "StringSet::is_empty")]
    pub resource: StringSet,
}

impl PolicyStatement {
    /// Create an empty statement with the given effect
    pub fn new(effect: Effect) -> Self {
        Self {
            sid: None,
            effect,
            principal: None,
            condition: Conditions::new(),
            action: StringSet::default(),
            resource: StringSet::default(),
        }
    }

    pub fn with_principal(mut self, principal: Principal) -> Self {
        self.principal = Some(principal);
        self
    }

    /// Add a condition, e.g. `("ArnEquals", "aws:SourceArn", bucket_arn)`
    pub fn with_condition(
        mut self,
        operator: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.condition
            .entry(operator.into())
            .or_default()
            .entry(key.into())
            .or_default()
            .insert(value.into());
        self
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action.insert(action.into());
        self
    }

    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource.insert(resource.into());
        self
    }
}

/// An IAM policy document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Policy {
    #[serde(default = "default_version")]
    pub version: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, deserialize_with = "one_or_many_statements")]
    pub statement: Vec<PolicyStatement>,
}

fn default_version() -> String {
    POLICY_VERSION.to_string()
}

fn one_or_many_statements<'de, D>(deserializer: D) -> Result<Vec<PolicyStatement>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        One(PolicyStatement),
        Many(Vec<PolicyStatement>),
    }

    Ok(match Repr::deserialize(deserializer)? {
        Repr::One(statement) => vec![statement],
        Repr::Many(statements) => statements,
    })
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            version: default_version(),
            id: None,
            statement: Vec::new(),
        }
    }
}

impl Policy {
    /// Create a policy from a list of statements
    pub fn new(statements: impl IntoIterator<Item = PolicyStatement>) -> Self {
        Self {
            statement: statements.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Parse a policy document, treating empty or malformed input as a
    /// policy without statements.
    pub fn parse_lenient(raw: &str) -> Self {
        if raw.trim().is_empty() {
            return Self::default();
        }
        match serde_json::from_str(raw) {
            Ok(policy) => policy,
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring unparseable policy document");
                Self::default()
            }
        }
    }

    /// Serialize to the JSON document expected by the provider APIs
    pub fn to_json(&self) -> Result<String, crate::Error> {
        Ok(serde_json::to_string(self)?)
    }

    /// Whether two policies are semantically equal.
    ///
    /// Only the first statement is compared: the policies managed here
    /// always consist of a single statement.
    pub fn semantically_equals(&self, other: &Policy) -> bool {
        if self.statement.len() != other.statement.len() {
            return false;
        }

        let (a, b) = match (self.statement.first(), other.statement.first()) {
            (Some(a), Some(b)) => (a, b),
            _ => return true,
        };

        a.principal == b.principal
            && a.condition == b.condition
            && a.action == b.action
            && a.resource == b.resource
    }
}
