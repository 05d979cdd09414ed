//! Builtin bucket policy model and anonymous-access evaluation.
//!
//! Supports the JSON subset public buckets actually use: `Effect`, a wildcard
//! `Principal`, and `Action` / `Resource` patterns with `*` and `?` globbing.
//! Statements with a `Condition` block are never applied, since conditions
//! cannot be evaluated without request context this gate does not carry.

use std::collections::HashMap;

use s3gate_model::{S3Action, S3Error};
use serde::{Deserialize, Serialize};

/// A value that may be written as a single item or as a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    /// A single item.
    One(T),
    /// A list of items.
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    /// Iterate over the contained items.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        match self {
            Self::One(item) => std::slice::from_ref(item).iter(),
            Self::Many(items) => items.iter(),
        }
    }
}

/// Statement effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    /// Grant the matched actions.
    Allow,
    /// Explicitly refuse the matched actions.
    Deny,
}

/// Statement principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Principal {
    /// A bare string, only meaningful as `"*"`.
    Wildcard(String),
    /// A map such as `{"AWS": ["*"]}`.
    Map(HashMap<String, OneOrMany<String>>),
}

impl Principal {
    /// Whether the principal covers anonymous callers.
    #[must_use]
    pub fn includes_anonymous(&self) -> bool {
        match self {
            Self::Wildcard(p) => p == "*",
            Self::Map(map) => map
                .get("AWS")
                .is_some_and(|ids| ids.iter().any(|id| id == "*")),
        }
    }
}

/// One statement of a bucket policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyStatement {
    /// Optional statement identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,
    /// Allow or Deny.
    pub effect: Effect,
    /// Who the statement applies to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub principal: Option<Principal>,
    /// IAM action patterns (e.g. `s3:Get*`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<OneOrMany<String>>,
    /// Resource ARN patterns (e.g. `arn:aws:s3:::bucket/*`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<OneOrMany<String>>,
    /// Condition block; its presence disables the statement.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<serde_json::Value>,
}

impl PolicyStatement {
    fn applies_to(&self, action: S3Action, resource_arn: &str) -> bool {
        if self.condition.is_some() {
            return false;
        }
        let principal_ok = self
            .principal
            .as_ref()
            .is_some_and(Principal::includes_anonymous);
        let action_ok = self.action.as_ref().is_some_and(|patterns| {
            patterns
                .iter()
                .any(|p| glob_match(&p.to_ascii_lowercase(), &action.as_str().to_ascii_lowercase()))
        });
        let resource_ok = self
            .resource
            .as_ref()
            .is_some_and(|patterns| patterns.iter().any(|p| glob_match(p, resource_arn)));

        principal_ok && action_ok && resource_ok
    }
}

/// The result of evaluating a policy for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyDecision {
    /// At least one Allow statement matched and no Deny did.
    Allow,
    /// A Deny statement matched.
    ExplicitDeny,
    /// No statement matched.
    ImplicitDeny,
}

/// A parsed bucket policy document.
///
/// # Examples
///
/// ```
/// use s3gate_core::policy::{BucketPolicy, PolicyDecision};
/// use s3gate_model::S3Action;
///
/// let policy = BucketPolicy::parse(br#"{
///     "Version": "2012-10-17",
///     "Statement": [{
///         "Effect": "Allow",
///         "Principal": "*",
///         "Action": "s3:GetObject",
///         "Resource": "arn:aws:s3:::site/*"
///     }]
/// }"#).unwrap();
///
/// assert_eq!(
///     policy.evaluate_anonymous("site", "index.html", S3Action::GetObject),
///     PolicyDecision::Allow,
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BucketPolicy {
    /// Policy language version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Policy statements.
    pub statement: OneOrMany<PolicyStatement>,
}

impl BucketPolicy {
    /// Parse a JSON policy document.
    pub fn parse(document: &[u8]) -> Result<Self, S3Error> {
        serde_json::from_slice(document)
            .map_err(|e| S3Error::malformed_policy(format!("invalid bucket policy: {e}")))
    }

    /// Evaluate the policy for an anonymous caller. Explicit Deny wins over Allow.
    #[must_use]
    pub fn evaluate_anonymous(
        &self,
        bucket: &str,
        object: &str,
        action: S3Action,
    ) -> PolicyDecision {
        let arn = resource_arn(bucket, object, action);
        let mut allowed = false;
        for statement in self.statement.iter() {
            if !statement.applies_to(action, &arn) {
                continue;
            }
            match statement.effect {
                Effect::Deny => return PolicyDecision::ExplicitDeny,
                Effect::Allow => allowed = true,
            }
        }

        if allowed {
            PolicyDecision::Allow
        } else {
            PolicyDecision::ImplicitDeny
        }
    }
}

/// The ARN a statement's `Resource` is matched against.
#[must_use]
pub fn resource_arn(bucket: &str, object: &str, action: S3Action) -> String {
    if object.is_empty() || !action.is_object_action() {
        format!("arn:aws:s3:::{bucket}")
    } else {
        format!("arn:aws:s3:::{bucket}/{object}")
    }
}

/// Match `text` against a pattern where `*` matches any run of characters and
/// `?` matches exactly one.
#[must_use]
pub fn glob_match(pattern: &str, text: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let t: Vec<char> = text.chars().collect();
    let (mut pi, mut ti) = (0, 0);
    let mut star: Option<(usize, usize)> = None;

    while ti < t.len() {
        if pi < p.len() && (p[pi] == '?' || p[pi] == t[ti]) {
            pi += 1;
            ti += 1;
        } else if pi < p.len() && p[pi] == '*' {
            star = Some((pi, ti));
            pi += 1;
        } else if let Some((star_pi, star_ti)) = star {
            // Let the last `*` absorb one more character.
            pi = star_pi + 1;
            ti = star_ti + 1;
            star = Some((star_pi, star_ti + 1));
        } else {
            return false;
        }
    }

    p[pi..].iter().all(|&c| c == '*')
}
