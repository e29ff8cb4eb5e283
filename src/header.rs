//! Serialization of an effective policy into a header value.
//!
//! The resolver stays pure; this module turns its output into the string a
//! middleware integration writes onto the response. Directives render in
//! insertion order, joined by `"; "`, with `report-uri` always last. Flag
//! directives render as the bare directive name when true and are omitted
//! when false.

use indexmap::IndexMap;

use crate::policy::{DirectiveValue, PolicyConfig};
use crate::resolver::EffectivePolicy;

/// The enforcing header name.
pub const CONTENT_SECURITY_POLICY: &str = "Content-Security-Policy";

/// The report-only header name.
pub const CONTENT_SECURITY_POLICY_REPORT_ONLY: &str = "Content-Security-Policy-Report-Only";

/// Selects the header name for the configured mode.
pub fn header_name(report_only: bool) -> &'static str {
    if report_only {
        CONTENT_SECURITY_POLICY_REPORT_ONLY
    } else {
        CONTENT_SECURITY_POLICY
    }
}

/// Renders a policy to a header value.
///
/// # Examples
///
/// ```
/// use csp_policy::{header, PolicyConfig};
///
/// let policy = PolicyConfig::builder()
///     .directive("default-src", "'self'")
///     .directive("img-src", ["'self'", "imgsrv.example.com"])
///     .build()?;
///
/// assert_eq!(
///     header::render_policy(&policy),
///     "default-src 'self'; img-src 'self' imgsrv.example.com"
/// );
/// # Ok::<(), csp_policy::ConfigurationError>(())
/// ```
pub fn render_policy(policy: &PolicyConfig) -> String {
    render(policy, None, &[])
}

/// Renders a policy to a header value, appending a caller-supplied nonce.
///
/// The nonce is appended as `'nonce-<value>'` to each directive named in
/// `include_nonce_in`. A named directive absent from the policy gains a
/// part containing only the nonce source. Nonce generation is the caller's
/// concern; this function only places an existing value.
pub fn render_policy_with_nonce(
    policy: &PolicyConfig,
    nonce: &str,
    include_nonce_in: &[String],
) -> String {
    render(policy, Some(nonce), include_nonce_in)
}

/// Renders an effective policy, returning `None` for the absent sentinel.
pub fn render_effective(effective: &EffectivePolicy) -> Option<String> {
    effective.policy().map(render_policy)
}

fn render(policy: &PolicyConfig, nonce: Option<&str>, include_nonce_in: &[String]) -> String {
    // report-uri is held back and appended last, matching the conventional
    // header layout.
    let mut parts: IndexMap<&str, String> = IndexMap::new();
    let mut report_uri: Option<String> = None;

    for (name, value) in policy.iter() {
        let rendered = match value {
            DirectiveValue::Sources(sources) => sources.join(" "),
            DirectiveValue::Flag(true) => String::new(),
            DirectiveValue::Flag(false) => continue,
        };
        if name == "report-uri" {
            report_uri = Some(rendered);
        } else {
            parts.insert(name, rendered);
        }
    }

    if let Some(nonce) = nonce {
        let source = format!("'nonce-{}'", nonce);
        for name in include_nonce_in {
            let part = parts.entry(name.as_str()).or_default();
            if part.is_empty() {
                *part = source.clone();
            } else {
                part.push(' ');
                part.push_str(&source);
            }
        }
    }

    if let Some(uri) = report_uri {
        parts.insert("report-uri", uri);
    }

    let rendered: Vec<String> = parts
        .iter()
        .map(|(name, part)| {
            if part.is_empty() {
                name.to_string()
            } else {
                format!("{} {}", name, part)
            }
        })
        .collect();

    let value = rendered.join("; ");
    tracing::trace!(header_len = value.len(), "rendered CSP header value");
    value
}
