//! Framework-agnostic response glue.
//!
//! This module is the boundary between HTTP frameworks and the resolver.
//! It contains no framework-specific code: integrations build a
//! [`ResponseState`] from their own request/response types, attach any
//! override the handler declared, and ask the [`HeaderWriter`] for the
//! header to write.
//!
//! # Design Principles
//!
//! 1. **Explicit state, no attribute injection**: the override and the
//!    exemption flag travel as values on `ResponseState`, threaded through
//!    the request-handling call.
//! 2. **Last wins**: attaching a second override replaces the first.
//!    Exactly one declaration reaches the resolver.
//! 3. **Never overwrite**: a response that already carries a CSP header is
//!    left untouched.
//!
//! # Integration Flow
//!
//! ```text
//! HTTP response ready
//!   v
//! Framework code builds ResponseState (path, existing-header check)
//!   v
//! Handler-attached override / exempt flag applied to the state
//!   v
//! HeaderWriter::header_for(&state, nonce)
//!   v
//! Some(CspHeader) written onto the response, or nothing
//! ```

use crate::declaration::CspOverride;
use crate::error::ConfigurationError;
use crate::header;
use crate::resolver::{EffectivePolicy, Resolver};
use crate::settings::CspSettings;

/// Per-response state consumed by the header writer.
///
/// Owned by a single request-handling invocation; nothing here is shared
/// between requests.
///
/// # Examples
///
/// ```
/// use csp_policy::{CspOverride, ResponseState};
///
/// let mut state = ResponseState::new("/dashboard");
/// state.set_override(CspOverride::exempt());
/// assert!(state.declaration().is_some());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ResponseState {
    request_path: String,
    declaration: Option<CspOverride>,
    exempt: bool,
    header_present: bool,
}

impl ResponseState {
    /// Creates state for a response to the given request path.
    pub fn new(request_path: impl Into<String>) -> Self {
        Self {
            request_path: request_path.into(),
            declaration: None,
            exempt: false,
            header_present: false,
        }
    }

    /// Attaches an override declaration. A declaration attached earlier is
    /// replaced: stacking is explicitly last-wins.
    pub fn set_override(&mut self, declaration: CspOverride) {
        if let Some(previous) = &self.declaration {
            tracing::debug!(
                previous = previous.mode(),
                replacement = declaration.mode(),
                "replacing attached CSP override (last wins)"
            );
        }
        self.declaration = Some(declaration);
    }

    /// Sets the direct exemption flag. When true the response behaves as
    /// EXEMPT with no declaration involved.
    pub fn set_exempt(&mut self, exempt: bool) {
        self.exempt = exempt;
    }

    /// Records that the response already carries a CSP header, which must
    /// not be overwritten.
    pub fn mark_header_present(&mut self) {
        self.header_present = true;
    }

    /// The request path, used for URL prefix exclusion.
    pub fn request_path(&self) -> &str {
        &self.request_path
    }

    /// The attached declaration, if any.
    pub fn declaration(&self) -> Option<&CspOverride> {
        self.declaration.as_ref()
    }

    /// The direct exemption flag.
    pub fn is_exempt(&self) -> bool {
        self.exempt
    }
}

/// A computed header ready to be written onto a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CspHeader {
    /// The header name (enforcing or report-only).
    pub name: &'static str,
    /// The serialized policy.
    pub value: String,
}

/// Computes the CSP header for responses, if one should be written.
///
/// Built once at startup from validated settings and shared read-only for
/// the process lifetime.
///
/// # Examples
///
/// ```
/// use csp_policy::{CspSettings, HeaderWriter, ResponseState};
///
/// let writer = HeaderWriter::from_settings(&CspSettings::default())?;
/// let state = ResponseState::new("/");
///
/// let header = writer.header_for(&state, None).expect("header expected");
/// assert_eq!(header.name, "Content-Security-Policy");
/// assert_eq!(header.value, "default-src 'self'");
/// # Ok::<(), csp_policy::ConfigurationError>(())
/// ```
#[derive(Debug, Clone)]
pub struct HeaderWriter {
    resolver: Resolver,
    report_only: bool,
    exclude_url_prefixes: Vec<String>,
    include_nonce_in: Vec<String>,
}

impl HeaderWriter {
    /// Creates a writer over a resolver with default behavior: enforcing
    /// header, no exclusions, nonce placed in `default-src`.
    pub fn new(resolver: Resolver) -> Self {
        Self {
            resolver,
            report_only: false,
            exclude_url_prefixes: Vec::new(),
            include_nonce_in: vec!["default-src".to_string()],
        }
    }

    /// Validates settings and builds a writer.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigurationError` if the directive map or nonce
    /// placement list is malformed.
    pub fn from_settings(settings: &CspSettings) -> Result<Self, ConfigurationError> {
        Ok(Self {
            resolver: settings.resolver()?,
            report_only: settings.report_only,
            exclude_url_prefixes: settings.exclude_url_prefixes.clone(),
            include_nonce_in: settings.nonce_directives()?,
        })
    }

    /// Returns the resolver this writer serializes for.
    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Computes the header for one response.
    ///
    /// Returns `None` when no header should be written: the response
    /// already carries one, the request path matches an excluded prefix,
    /// the exemption flag is set, or the attached declaration is EXEMPT.
    pub fn header_for(&self, state: &ResponseState, nonce: Option<&str>) -> Option<CspHeader> {
        if state.header_present {
            tracing::debug!(path = state.request_path(), "existing CSP header kept");
            return None;
        }
        if self
            .exclude_url_prefixes
            .iter()
            .any(|prefix| state.request_path().starts_with(prefix.as_str()))
        {
            tracing::debug!(path = state.request_path(), "path excluded from CSP");
            return None;
        }
        if state.is_exempt() {
            tracing::debug!(path = state.request_path(), "response flagged CSP-exempt");
            return None;
        }

        let effective = self.resolver.resolve(state.declaration());
        let policy = match &effective {
            EffectivePolicy::Absent => return None,
            EffectivePolicy::Policy(policy) => policy,
        };

        let value = match nonce {
            Some(nonce) => header::render_policy_with_nonce(policy, nonce, &self.include_nonce_in),
            None => header::render_policy(policy),
        };
        Some(CspHeader {
            name: header::header_name(self.report_only),
            value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PolicyConfig, PolicyFragment};

    fn writer() -> HeaderWriter {
        HeaderWriter::new(Resolver::new(PolicyConfig::default_policy()))
    }

    #[test]
    fn writes_base_policy_without_override() {
        let header = writer().header_for(&ResponseState::new("/"), None).unwrap();
        assert_eq!(header.name, "Content-Security-Policy");
        assert_eq!(header.value, "default-src 'self'");
    }

    #[test]
    fn report_only_selects_report_only_header_name() {
        let settings: CspSettings =
            serde_json::from_str(r#"{ "report_only": true }"#).unwrap();
        let writer = HeaderWriter::from_settings(&settings).unwrap();

        let header = writer.header_for(&ResponseState::new("/"), None).unwrap();
        assert_eq!(header.name, "Content-Security-Policy-Report-Only");
    }

    #[test]
    fn existing_header_suppresses_output() {
        let mut state = ResponseState::new("/");
        state.mark_header_present();
        assert_eq!(writer().header_for(&state, None), None);
    }

    #[test]
    fn excluded_prefix_suppresses_output() {
        let settings: CspSettings = serde_json::from_str(
            r#"{ "exclude_url_prefixes": ["/admin"] }"#,
        )
        .unwrap();
        let writer = HeaderWriter::from_settings(&settings).unwrap();

        assert_eq!(writer.header_for(&ResponseState::new("/admin/users"), None), None);
        assert!(writer.header_for(&ResponseState::new("/app"), None).is_some());
    }

    #[test]
    fn exempt_flag_suppresses_output() {
        let mut state = ResponseState::new("/");
        state.set_exempt(true);
        assert_eq!(writer().header_for(&state, None), None);
    }

    #[test]
    fn exempt_declaration_suppresses_output() {
        let mut state = ResponseState::new("/");
        state.set_override(CspOverride::exempt());
        assert_eq!(writer().header_for(&state, None), None);
    }

    #[test]
    fn attached_override_shapes_the_header() {
        let fragment = PolicyFragment::builder()
            .directive("img-src", "imgsrv.example.com")
            .build()
            .unwrap();
        let mut state = ResponseState::new("/");
        state.set_override(CspOverride::update(fragment));

        let header = writer().header_for(&state, None).unwrap();
        assert_eq!(
            header.value,
            "default-src 'self'; img-src imgsrv.example.com"
        );
    }

    #[test]
    fn second_attached_override_wins() {
        let update = PolicyFragment::builder()
            .directive("img-src", "first.example.com")
            .build()
            .unwrap();
        let replace = PolicyFragment::builder()
            .directive("default-src", "'none'")
            .build()
            .unwrap();

        let mut state = ResponseState::new("/");
        state.set_override(CspOverride::update(update));
        state.set_override(CspOverride::replace(replace));

        let header = writer().header_for(&state, None).unwrap();
        assert_eq!(header.value, "default-src 'none'");
    }

    #[test]
    fn nonce_is_placed_in_configured_directives() {
        let header = writer()
            .header_for(&ResponseState::new("/"), Some("r4nd0m"))
            .unwrap();
        assert_eq!(header.value, "default-src 'self' 'nonce-r4nd0m'");
    }
}
