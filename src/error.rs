use std::fmt;

/// Error returned when a policy, fragment, or settings value is malformed.
///
/// Configuration errors are raised while a policy or override is being
/// constructed, before any request is served. They are never deferred to
/// request time and never downgraded into a permissive fallback policy.
///
/// # Examples
///
/// ```
/// use csp_policy::{ConfigurationError, ConfigurationErrorKind};
///
/// let error = ConfigurationError::new(
///     ConfigurationErrorKind::UnknownDirective,
///     "no such directive 'imgsrc'",
/// );
/// assert_eq!(error.kind(), ConfigurationErrorKind::UnknownDirective);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigurationError {
    kind: ConfigurationErrorKind,
    message: String,
}

impl ConfigurationError {
    /// Creates a new configuration error.
    pub fn new(kind: ConfigurationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Returns the error kind.
    pub fn kind(&self) -> ConfigurationErrorKind {
        self.kind
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid CSP configuration ({}): {}",
            self.kind, self.message
        )
    }
}

impl std::error::Error for ConfigurationError {}

/// Kind of configuration error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigurationErrorKind {
    /// Directive name is empty after normalization.
    EmptyDirectiveName,
    /// Directive name is not a known CSP directive.
    UnknownDirective,
    /// Source list is empty.
    EmptySourceList,
    /// A source expression is empty or contains characters that would
    /// corrupt the serialized header.
    InvalidSource,
    /// A boolean value was given for a directive that takes a source list.
    UnexpectedFlagValue,
    /// A source list was given for a boolean flag directive.
    UnexpectedSourceValue,
}

impl fmt::Display for ConfigurationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyDirectiveName => write!(f, "empty directive name"),
            Self::UnknownDirective => write!(f, "unknown directive"),
            Self::EmptySourceList => write!(f, "empty source list"),
            Self::InvalidSource => write!(f, "invalid source expression"),
            Self::UnexpectedFlagValue => write!(f, "unexpected boolean value"),
            Self::UnexpectedSourceValue => write!(f, "unexpected source list"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_error_display_includes_kind_and_message() {
        let error =
            ConfigurationError::new(ConfigurationErrorKind::InvalidSource, "source contains ';'");
        let rendered = format!("{}", error);
        assert!(rendered.contains("invalid source expression"));
        assert!(rendered.contains("source contains ';'"));
    }

    #[test]
    fn configuration_error_exposes_kind() {
        let error =
            ConfigurationError::new(ConfigurationErrorKind::EmptySourceList, "img-src is empty");
        assert_eq!(error.kind(), ConfigurationErrorKind::EmptySourceList);
        assert_eq!(error.message(), "img-src is empty");
    }
}
