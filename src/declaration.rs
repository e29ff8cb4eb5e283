//! Per-handler override declarations.

use crate::fragment::PolicyFragment;
use crate::policy::PolicyConfig;

/// A per-handler override of the globally configured policy.
///
/// Exactly one declaration applies per handler invocation. The variants are
/// a closed set so merge handling in the resolver is exhaustive:
///
/// - [`Exempt`](CspOverride::Exempt): the response carries no CSP header.
/// - [`Update`](CspOverride::Update): fragment lists are appended to the
///   corresponding base lists.
/// - [`Replace`](CspOverride::Replace): fragment lists replace the base
///   lists wholesale; the removal sentinel deletes a directive.
/// - [`Set`](CspOverride::Set): the fragment becomes the entire policy.
///
/// # Examples
///
/// ```
/// use csp_policy::{CspOverride, PolicyFragment};
///
/// let fragment = PolicyFragment::builder()
///     .directive("img-src", "imgsrv.example.com")
///     .build()?;
/// let declaration = CspOverride::update(fragment);
/// assert_eq!(declaration.mode(), "update");
/// # Ok::<(), csp_policy::ConfigurationError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CspOverride {
    /// Emit no CSP header for this response.
    Exempt,
    /// Append the fragment's source lists to the base policy.
    Update(PolicyFragment),
    /// Replace mentioned directives wholesale; `Remove` entries delete.
    Replace(PolicyFragment),
    /// Discard the base policy and use this configuration verbatim.
    Set(PolicyConfig),
}

impl CspOverride {
    /// Declares the response exempt from CSP entirely.
    pub fn exempt() -> Self {
        CspOverride::Exempt
    }

    /// Declares an append-style override.
    pub fn update(fragment: PolicyFragment) -> Self {
        CspOverride::Update(fragment)
    }

    /// Declares a replace-style override.
    pub fn replace(fragment: PolicyFragment) -> Self {
        CspOverride::Replace(fragment)
    }

    /// Declares a wholesale policy override.
    pub fn set(config: PolicyConfig) -> Self {
        CspOverride::Set(config)
    }

    /// The mode name, for log fields.
    pub fn mode(&self) -> &'static str {
        match self {
            CspOverride::Exempt => "exempt",
            CspOverride::Update(_) => "update",
            CspOverride::Replace(_) => "replace",
            CspOverride::Set(_) => "set",
        }
    }
}
