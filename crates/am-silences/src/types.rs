//! Core types shared by the silence workflow.
//!
//! - [`Matcher`]: a single label condition
//! - [`MatcherGroup`]: the set of matchers scoping one silence
//! - [`Silence`]: a silence as sent to and received from Alertmanager

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::expiry::SilenceWindow;

/// A label condition, either literal equality or a regular expression.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Matcher {
    /// Label name.
    pub name: String,
    /// Expected value, or the pattern when `is_regex` is set.
    pub value: String,
    /// Whether `value` is a regular expression.
    #[serde(default)]
    pub is_regex: bool,
}

impl Matcher {
    /// Creates an equality matcher.
    pub fn equal(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            is_regex: false,
        }
    }

    /// Creates a regex matcher.
    pub fn regex(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            is_regex: true,
        }
    }
}

impl fmt::Display for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = if self.is_regex { "=~" } else { "=" };
        write!(f, "{}{}{:?}", self.name, op, self.value)
    }
}

/// An unordered set of matchers. Two groups are equal when they hold the same matchers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatcherGroup(BTreeSet<Matcher>);

impl MatcherGroup {
    /// Creates an empty group.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a matcher, returning the group for chaining.
    #[must_use]
    pub fn with(mut self, matcher: Matcher) -> Self {
        self.0.insert(matcher);
        self
    }

    /// Adds a matcher in place.
    pub fn insert(&mut self, matcher: Matcher) {
        self.0.insert(matcher);
    }

    /// Iterates the matchers in a stable order.
    pub fn iter(&self) -> impl Iterator<Item = &Matcher> {
        self.0.iter()
    }

    /// Number of matchers in the group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the group holds no matchers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Matcher> for MatcherGroup {
    fn from_iter<I: IntoIterator<Item = Matcher>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for MatcherGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, matcher) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{matcher}")?;
        }
        f.write_str("}")
    }
}

/// A silence suppressing every alert that satisfies all of its matchers.
///
/// Locally built silences carry no `id`; the server assigns one on creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Silence {
    /// Server-assigned identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Matchers scoping the silence.
    pub matchers: MatcherGroup,
    /// When the silence starts.
    pub starts_at: DateTime<Utc>,
    /// When the silence ends.
    pub ends_at: DateTime<Utc>,
    /// Who created the silence.
    #[serde(default)]
    pub created_by: String,
    /// Comment explaining the silence.
    #[serde(default)]
    pub comment: String,
}

impl Silence {
    /// Creates a new, not yet submitted silence over `window`.
    pub fn new(
        matchers: MatcherGroup,
        window: SilenceWindow,
        created_by: impl Into<String>,
        comment: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            matchers,
            starts_at: window.starts_at(),
            ends_at: window.ends_at(),
            created_by: created_by.into(),
            comment: comment.into(),
        }
    }

    /// Whether the silence has not expired at `now`.
    ///
    /// Silences scheduled to start in the future count as active.
    #[must_use]
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.ends_at > now
    }
}
