//! Policy configuration: an ordered mapping from directive name to value.

use std::fmt;

use indexmap::IndexMap;

use crate::directive;
use crate::error::{ConfigurationError, ConfigurationErrorKind};

/// A directive value as supplied by the caller.
///
/// Source lists may be given as a bare string (normalized to a one-element
/// list), a list of strings, or a boolean for flag directives such as
/// `upgrade-insecure-requests`. Conversions exist for the common shapes so
/// builder calls stay terse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceValue {
    /// A single source expression, treated as a one-element list.
    Source(String),
    /// An ordered list of source expressions.
    List(Vec<String>),
    /// A boolean for flag directives.
    Flag(bool),
}

impl From<&str> for SourceValue {
    fn from(source: &str) -> Self {
        SourceValue::Source(source.to_string())
    }
}

impl From<String> for SourceValue {
    fn from(source: String) -> Self {
        SourceValue::Source(source)
    }
}

impl From<Vec<String>> for SourceValue {
    fn from(sources: Vec<String>) -> Self {
        SourceValue::List(sources)
    }
}

impl From<Vec<&str>> for SourceValue {
    fn from(sources: Vec<&str>) -> Self {
        SourceValue::List(sources.into_iter().map(str::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for SourceValue {
    fn from(sources: [&str; N]) -> Self {
        SourceValue::List(sources.iter().map(|s| s.to_string()).collect())
    }
}

impl From<bool> for SourceValue {
    fn from(flag: bool) -> Self {
        SourceValue::Flag(flag)
    }
}

/// A validated, normalized directive value stored in a [`PolicyConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectiveValue {
    /// An ordered source list (bare strings already expanded).
    Sources(Vec<String>),
    /// A boolean flag directive value.
    Flag(bool),
}

impl DirectiveValue {
    /// Returns the source list, or `None` for flag values.
    pub fn sources(&self) -> Option<&[String]> {
        match self {
            DirectiveValue::Sources(list) => Some(list),
            DirectiveValue::Flag(_) => None,
        }
    }

    /// Returns the flag value, or `None` for source lists.
    pub fn flag(&self) -> Option<bool> {
        match self {
            DirectiveValue::Sources(_) => None,
            DirectiveValue::Flag(flag) => Some(*flag),
        }
    }
}

/// Validates a single source expression.
///
/// Rejects empty tokens and characters that would corrupt the serialized
/// header (`;`, `,`, whitespace, control characters).
pub(crate) fn validate_source(directive: &str, source: &str) -> Result<(), ConfigurationError> {
    if source.is_empty() {
        return Err(ConfigurationError::new(
            ConfigurationErrorKind::InvalidSource,
            format!("empty source expression in '{}'", directive),
        ));
    }
    if source
        .chars()
        .any(|c| c.is_whitespace() || c.is_control() || c == ';' || c == ',')
    {
        return Err(ConfigurationError::new(
            ConfigurationErrorKind::InvalidSource,
            format!("source {:?} in '{}' contains forbidden characters", source, directive),
        ));
    }
    Ok(())
}

/// Normalizes a caller-supplied value for the given canonical directive.
pub(crate) fn normalize_value(
    directive: &str,
    value: SourceValue,
) -> Result<DirectiveValue, ConfigurationError> {
    match value {
        SourceValue::Flag(flag) => {
            if !directive::is_flag(directive) {
                return Err(ConfigurationError::new(
                    ConfigurationErrorKind::UnexpectedFlagValue,
                    format!("'{}' takes a source list, not a boolean", directive),
                ));
            }
            Ok(DirectiveValue::Flag(flag))
        }
        SourceValue::Source(source) => {
            if directive::is_flag(directive) {
                return Err(ConfigurationError::new(
                    ConfigurationErrorKind::UnexpectedSourceValue,
                    format!("'{}' takes a boolean, not a source list", directive),
                ));
            }
            validate_source(directive, &source)?;
            Ok(DirectiveValue::Sources(vec![source]))
        }
        SourceValue::List(sources) => {
            if directive::is_flag(directive) {
                return Err(ConfigurationError::new(
                    ConfigurationErrorKind::UnexpectedSourceValue,
                    format!("'{}' takes a boolean, not a source list", directive),
                ));
            }
            if sources.is_empty() {
                return Err(ConfigurationError::new(
                    ConfigurationErrorKind::EmptySourceList,
                    format!("'{}' has an empty source list", directive),
                ));
            }
            for source in &sources {
                validate_source(directive, source)?;
            }
            Ok(DirectiveValue::Sources(sources))
        }
    }
}

/// A complete Content-Security-Policy configuration.
///
/// An ordered mapping from canonical directive name to a validated value.
/// Directive names are unique; lookups accept any alias accepted by
/// [`directive::normalize`]. Directives never inherit from one another:
/// a directive absent from the config is never backfilled from
/// `default-src`.
///
/// A config is immutable once built. Construction goes through
/// [`PolicyConfig::builder`], which validates every entry and fails fast on
/// the first malformed one.
///
/// # Examples
///
/// ```
/// use csp_policy::PolicyConfig;
///
/// let policy = PolicyConfig::builder()
///     .directive("default-src", "'self'")
///     .directive("img-src", ["'self'", "imgsrv.example.com"])
///     .directive("upgrade-insecure-requests", true)
///     .build()
///     .expect("well-formed policy");
///
/// assert_eq!(policy.sources("IMG_SRC").unwrap().len(), 2);
/// assert_eq!(policy.flag("upgrade-insecure-requests"), Some(true));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PolicyConfig {
    directives: IndexMap<String, DirectiveValue>,
}

impl PolicyConfig {
    /// Creates an empty policy configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts building a policy configuration.
    pub fn builder() -> PolicyConfigBuilder {
        PolicyConfigBuilder {
            entries: Vec::new(),
        }
    }

    /// The default shipped policy: `default-src 'self'`.
    ///
    /// # Examples
    ///
    /// ```
    /// use csp_policy::PolicyConfig;
    ///
    /// let policy = PolicyConfig::default_policy();
    /// assert_eq!(policy.sources("default-src").unwrap(), ["'self'"]);
    /// ```
    pub fn default_policy() -> Self {
        let mut directives = IndexMap::new();
        directives.insert(
            "default-src".to_string(),
            DirectiveValue::Sources(vec!["'self'".to_string()]),
        );
        Self { directives }
    }

    /// Returns the value for a directive, accepting any name alias.
    pub fn get(&self, name: &str) -> Option<&DirectiveValue> {
        self.directives.get(directive::normalize(name).as_str())
    }

    /// Returns the source list for a directive, if present and not a flag.
    pub fn sources(&self, name: &str) -> Option<&[String]> {
        self.get(name).and_then(DirectiveValue::sources)
    }

    /// Returns the flag value for a directive, if present and a flag.
    pub fn flag(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(DirectiveValue::flag)
    }

    /// Returns whether the config contains the directive.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Returns the number of directives.
    pub fn len(&self) -> usize {
        self.directives.len()
    }

    /// Returns whether the config has no directives.
    pub fn is_empty(&self) -> bool {
        self.directives.is_empty()
    }

    /// Iterates directives in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &DirectiveValue)> {
        self.directives.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub(crate) fn insert(&mut self, name: String, value: DirectiveValue) {
        self.directives.insert(name, value);
    }

    pub(crate) fn remove(&mut self, name: &str) {
        self.directives.shift_remove(name);
    }

    pub(crate) fn get_mut(&mut self, name: &str) -> Option<&mut DirectiveValue> {
        self.directives.get_mut(name)
    }
}

impl fmt::Display for PolicyConfig {
    /// Renders the directive names only, for log output. Use
    /// [`crate::header::render_policy`] for the header value.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.directives.keys().map(String::as_str).collect();
        write!(f, "PolicyConfig[{}]", names.join(", "))
    }
}

/// Builder for [`PolicyConfig`].
///
/// Entries accumulate unchecked; `build()` normalizes and validates every
/// one, failing on the first malformed entry. A directive named twice keeps
/// the later value.
#[derive(Debug, Default)]
pub struct PolicyConfigBuilder {
    entries: Vec<(String, SourceValue)>,
}

impl PolicyConfigBuilder {
    /// Adds a directive entry. The value may be a string, a list of
    /// strings, or a boolean for flag directives.
    pub fn directive(mut self, name: impl Into<String>, value: impl Into<SourceValue>) -> Self {
        self.entries.push((name.into(), value.into()));
        self
    }

    /// Validates all entries and produces the policy configuration.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigurationError` for an unknown or empty directive
    /// name, an empty source list, a malformed source expression, or a
    /// value shape that does not fit the directive.
    pub fn build(self) -> Result<PolicyConfig, ConfigurationError> {
        let mut config = PolicyConfig::new();
        for (name, value) in self.entries {
            let canonical = directive::canonicalize(&name)?;
            let normalized = normalize_value(&canonical, value)?;
            config.insert(canonical, normalized);
        }
        Ok(config)
    }
}
