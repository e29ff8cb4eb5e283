//! Deserializable settings for the process-wide CSP configuration.
//!
//! Mirrors the shape applications keep in their configuration files: a
//! `directives` mapping whose values may be a bare string, a list of
//! strings, or a boolean for flag directives, plus the report-only switch,
//! URL prefix exclusions, and nonce placement list. Settings are inert
//! until validated into typed policy values; validation fails fast at
//! startup, never at request time.

use indexmap::IndexMap;
use serde::Deserialize;

use crate::directive;
use crate::error::ConfigurationError;
use crate::policy::{PolicyConfig, SourceValue};
use crate::resolver::Resolver;

/// A directive value as written in configuration.
///
/// Accepts `true`/`false`, `"'self'"`, or `["'self'", "cdn.example.com"]`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum DirectiveSetting {
    /// Boolean flag directive value.
    Flag(bool),
    /// A single source expression.
    Source(String),
    /// An ordered list of source expressions.
    List(Vec<String>),
}

impl From<DirectiveSetting> for SourceValue {
    fn from(setting: DirectiveSetting) -> Self {
        match setting {
            DirectiveSetting::Flag(flag) => SourceValue::Flag(flag),
            DirectiveSetting::Source(source) => SourceValue::Source(source),
            DirectiveSetting::List(list) => SourceValue::List(list),
        }
    }
}

/// Process-wide CSP settings.
///
/// # Examples
///
/// ```
/// use csp_policy::CspSettings;
///
/// let settings: CspSettings = serde_json::from_str(
///     r#"{
///         "report_only": false,
///         "directives": {
///             "default-src": "'self'",
///             "img-src": ["'self'", "imgsrv.example.com"],
///             "upgrade-insecure-requests": true
///         }
///     }"#,
/// ).unwrap();
///
/// let resolver = settings.resolver().expect("valid settings");
/// assert_eq!(resolver.base().sources("img-src").unwrap().len(), 2);
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CspSettings {
    /// Emit `Content-Security-Policy-Report-Only` instead of the enforcing
    /// header.
    pub report_only: bool,
    /// Request path prefixes for which no header is emitted.
    pub exclude_url_prefixes: Vec<String>,
    /// Directives that receive the per-request nonce at render time.
    pub include_nonce_in: Vec<String>,
    /// The base policy directives.
    pub directives: IndexMap<String, DirectiveSetting>,
}

impl Default for CspSettings {
    /// The shipped defaults: enforcing mode, no exclusions, nonce in
    /// `default-src`, and a `default-src 'self'` policy.
    fn default() -> Self {
        let mut directives = IndexMap::new();
        directives.insert(
            "default-src".to_string(),
            DirectiveSetting::Source("'self'".to_string()),
        );
        Self {
            report_only: false,
            exclude_url_prefixes: Vec::new(),
            include_nonce_in: vec!["default-src".to_string()],
            directives,
        }
    }
}

impl CspSettings {
    /// Validates the directive map into a typed base policy.
    ///
    /// # Errors
    ///
    /// Returns the first `ConfigurationError` found, with the offending
    /// directive named in the message.
    pub fn policy(&self) -> Result<PolicyConfig, ConfigurationError> {
        let mut builder = PolicyConfig::builder();
        for (name, setting) in &self.directives {
            builder = builder.directive(name.clone(), SourceValue::from(setting.clone()));
        }
        builder.build()
    }

    /// Validates the nonce placement list into canonical directive names.
    pub fn nonce_directives(&self) -> Result<Vec<String>, ConfigurationError> {
        self.include_nonce_in
            .iter()
            .map(|name| directive::canonicalize(name))
            .collect()
    }

    /// Validates the settings and builds a [`Resolver`] over the base
    /// policy.
    pub fn resolver(&self) -> Result<Resolver, ConfigurationError> {
        Ok(Resolver::new(self.policy()?))
    }
}
