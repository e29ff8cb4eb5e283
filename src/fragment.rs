//! Policy fragments carried by UPDATE and REPLACE overrides.

use indexmap::IndexMap;

use crate::directive;
use crate::error::ConfigurationError;
use crate::policy::{self, DirectiveValue, SourceValue};

/// A fragment value as supplied by the caller.
///
/// Mirrors [`SourceValue`] and adds the explicit removal sentinel used by
/// REPLACE overrides. "Remove this directive" is deliberately a distinct
/// variant rather than an `Option`, so a fragment can tell a removed
/// directive apart from one it simply does not mention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FragmentValue {
    /// A single source expression, treated as a one-element list.
    Source(String),
    /// An ordered list of source expressions.
    List(Vec<String>),
    /// A boolean for flag directives.
    Flag(bool),
    /// Remove the directive from the effective policy (REPLACE only).
    Remove,
}

impl From<&str> for FragmentValue {
    fn from(source: &str) -> Self {
        FragmentValue::Source(source.to_string())
    }
}

impl From<String> for FragmentValue {
    fn from(source: String) -> Self {
        FragmentValue::Source(source)
    }
}

impl From<Vec<String>> for FragmentValue {
    fn from(sources: Vec<String>) -> Self {
        FragmentValue::List(sources)
    }
}

impl From<Vec<&str>> for FragmentValue {
    fn from(sources: Vec<&str>) -> Self {
        FragmentValue::List(sources.into_iter().map(str::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for FragmentValue {
    fn from(sources: [&str; N]) -> Self {
        FragmentValue::List(sources.iter().map(|s| s.to_string()).collect())
    }
}

impl From<bool> for FragmentValue {
    fn from(flag: bool) -> Self {
        FragmentValue::Flag(flag)
    }
}

impl From<SourceValue> for FragmentValue {
    fn from(value: SourceValue) -> Self {
        match value {
            SourceValue::Source(s) => FragmentValue::Source(s),
            SourceValue::List(l) => FragmentValue::List(l),
            SourceValue::Flag(f) => FragmentValue::Flag(f),
        }
    }
}

/// A validated fragment entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FragmentEntry {
    /// A normalized directive value.
    Value(DirectiveValue),
    /// Remove the directive.
    Remove,
}

/// A partial policy attached to an UPDATE or REPLACE override.
///
/// An ordered mapping from canonical directive name to a validated value or
/// the removal sentinel. Fragments are validated at construction, so a
/// malformed override fails where the handler is wired up, not while a
/// request is in flight. An empty fragment is valid and merges as a no-op.
///
/// # Examples
///
/// ```
/// use csp_policy::{FragmentValue, PolicyFragment};
///
/// let fragment = PolicyFragment::builder()
///     .directive("img-src", "imgsrv.example.com")
///     .directive("object-src", FragmentValue::Remove)
///     .build()
///     .expect("well-formed fragment");
///
/// assert_eq!(fragment.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PolicyFragment {
    entries: IndexMap<String, FragmentEntry>,
}

impl PolicyFragment {
    /// Creates an empty fragment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts building a fragment.
    pub fn builder() -> PolicyFragmentBuilder {
        PolicyFragmentBuilder {
            entries: Vec::new(),
        }
    }

    /// Returns the entry for a directive, accepting any name alias.
    pub fn get(&self, name: &str) -> Option<&FragmentEntry> {
        self.entries.get(directive::normalize(name).as_str())
    }

    /// Returns the number of directives the fragment mentions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the fragment mentions no directives.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FragmentEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Builder for [`PolicyFragment`].
///
/// Same shape as [`crate::PolicyConfig::builder`]: entries accumulate
/// unchecked and `build()` validates them all, failing fast.
#[derive(Debug, Default)]
pub struct PolicyFragmentBuilder {
    entries: Vec<(String, FragmentValue)>,
}

impl PolicyFragmentBuilder {
    /// Adds a directive entry. The value may be a string, a list of
    /// strings, a boolean for flag directives, or
    /// [`FragmentValue::Remove`].
    pub fn directive(mut self, name: impl Into<String>, value: impl Into<FragmentValue>) -> Self {
        self.entries.push((name.into(), value.into()));
        self
    }

    /// Marks a directive for removal. Shorthand for
    /// `.directive(name, FragmentValue::Remove)`.
    pub fn remove(self, name: impl Into<String>) -> Self {
        self.directive(name, FragmentValue::Remove)
    }

    /// Validates all entries and produces the fragment.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigurationError` under the same conditions as
    /// [`crate::PolicyConfig::builder`].
    pub fn build(self) -> Result<PolicyFragment, ConfigurationError> {
        let mut fragment = PolicyFragment::new();
        for (name, value) in self.entries {
            let canonical = directive::canonicalize(&name)?;
            let entry = match value {
                FragmentValue::Remove => FragmentEntry::Remove,
                FragmentValue::Source(s) => {
                    FragmentEntry::Value(policy::normalize_value(&canonical, SourceValue::Source(s))?)
                }
                FragmentValue::List(l) => {
                    FragmentEntry::Value(policy::normalize_value(&canonical, SourceValue::List(l))?)
                }
                FragmentValue::Flag(f) => {
                    FragmentEntry::Value(policy::normalize_value(&canonical, SourceValue::Flag(f))?)
                }
            };
            fragment.entries.insert(canonical, entry);
        }
        Ok(fragment)
    }
}
