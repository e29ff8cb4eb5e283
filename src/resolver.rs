//! The policy override resolver.
//!
//! `resolve` is a pure function: given the process-wide base policy and an
//! optional per-handler declaration, it computes the effective policy for
//! one response. It performs no I/O, touches no shared mutable state, and
//! cannot fail. Malformed input is impossible here because policies and
//! fragments validate at construction time.

use crate::declaration::CspOverride;
use crate::fragment::FragmentEntry;
use crate::policy::{DirectiveValue, PolicyConfig};

/// The policy handed to the header-serialization layer, or the absent
/// sentinel meaning "write no header".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EffectivePolicy {
    /// No CSP header is emitted for this response.
    Absent,
    /// The policy to serialize.
    Policy(PolicyConfig),
}

impl EffectivePolicy {
    /// Returns whether no header should be emitted.
    pub fn is_absent(&self) -> bool {
        matches!(self, EffectivePolicy::Absent)
    }

    /// Returns the policy, if one is present.
    pub fn policy(&self) -> Option<&PolicyConfig> {
        match self {
            EffectivePolicy::Absent => None,
            EffectivePolicy::Policy(config) => Some(config),
        }
    }

    /// Consumes self, returning the policy if one is present.
    pub fn into_policy(self) -> Option<PolicyConfig> {
        match self {
            EffectivePolicy::Absent => None,
            EffectivePolicy::Policy(config) => Some(config),
        }
    }
}

/// Computes the effective policy for one response.
///
/// Resolution by declaration mode:
///
/// | Declaration | Result |
/// |---|---|
/// | `None` | `base` unchanged |
/// | `Exempt` | [`EffectivePolicy::Absent`] |
/// | `Update(f)` | per-directive append, base sources first |
/// | `Replace(f)` | per-directive replacement, `Remove` deletes |
/// | `Set(c)` | `c` exactly, `base` ignored |
///
/// The base config is never mutated; a fresh effective policy is produced
/// per call. Directives the fragment does not mention pass through
/// unchanged, and no directive ever inherits sources from `default-src`.
///
/// # Examples
///
/// ```
/// use csp_policy::{resolve, CspOverride, PolicyConfig, PolicyFragment};
///
/// let base = PolicyConfig::builder()
///     .directive("img-src", "'self'")
///     .build()?;
/// let fragment = PolicyFragment::builder()
///     .directive("img-src", "imgsrv.example.com")
///     .build()?;
///
/// let effective = resolve(&base, Some(&CspOverride::update(fragment)));
/// let policy = effective.policy().unwrap();
/// assert_eq!(policy.sources("img-src").unwrap(), ["'self'", "imgsrv.example.com"]);
/// # Ok::<(), csp_policy::ConfigurationError>(())
/// ```
pub fn resolve(base: &PolicyConfig, declaration: Option<&CspOverride>) -> EffectivePolicy {
    let Some(declaration) = declaration else {
        return EffectivePolicy::Policy(base.clone());
    };

    tracing::debug!(mode = declaration.mode(), "resolving CSP override");

    match declaration {
        CspOverride::Exempt => EffectivePolicy::Absent,
        CspOverride::Update(fragment) => {
            let mut effective = base.clone();
            for (name, entry) in fragment.iter() {
                let FragmentEntry::Value(value) = entry else {
                    // A removal sentinel has no append semantics; skipped,
                    // matching the original behavior for null update values.
                    continue;
                };
                if !effective.contains(name) {
                    effective.insert(name.to_string(), value.clone());
                    continue;
                }
                match (effective.get_mut(name), value) {
                    (Some(DirectiveValue::Sources(existing)), DirectiveValue::Sources(added)) => {
                        existing.extend(added.iter().cloned());
                    }
                    _ => {
                        // Appending to a flag directive (or a flag onto an
                        // existing value) leaves the base value in place.
                        tracing::debug!(directive = name, "update ignored for flag directive");
                    }
                }
            }
            EffectivePolicy::Policy(effective)
        }
        CspOverride::Replace(fragment) => {
            let mut effective = base.clone();
            for (name, entry) in fragment.iter() {
                match entry {
                    FragmentEntry::Remove => effective.remove(name),
                    FragmentEntry::Value(value) => {
                        effective.insert(name.to_string(), value.clone());
                    }
                }
            }
            EffectivePolicy::Policy(effective)
        }
        CspOverride::Set(config) => EffectivePolicy::Policy(config.clone()),
    }
}

/// Holds the immutable process-wide base policy and resolves overrides
/// against it.
///
/// The resolver is built once at startup and shared read-only for the
/// process lifetime; concurrent requests may call [`Resolver::resolve`]
/// freely.
///
/// # Examples
///
/// ```
/// use csp_policy::{CspOverride, PolicyConfig, Resolver};
///
/// let resolver = Resolver::new(PolicyConfig::default_policy());
/// assert!(resolver.resolve(None).policy().is_some());
/// assert!(resolver.resolve(Some(&CspOverride::exempt())).is_absent());
/// ```
#[derive(Debug, Clone)]
pub struct Resolver {
    base: PolicyConfig,
}

impl Resolver {
    /// Creates a resolver over the given base policy.
    pub fn new(base: PolicyConfig) -> Self {
        Self { base }
    }

    /// Returns the base policy.
    pub fn base(&self) -> &PolicyConfig {
        &self.base
    }

    /// Resolves a declaration against the base policy.
    pub fn resolve(&self, declaration: Option<&CspOverride>) -> EffectivePolicy {
        resolve(&self.base, declaration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fragment::PolicyFragment;

    fn base() -> PolicyConfig {
        PolicyConfig::builder()
            .directive("default-src", "'self'")
            .directive("img-src", "'self'")
            .build()
            .unwrap()
    }

    #[test]
    fn absent_declaration_returns_base_unchanged() {
        let base = base();
        let effective = resolve(&base, None);
        assert_eq!(effective.policy().unwrap(), &base);
    }

    #[test]
    fn exempt_returns_absent_regardless_of_base() {
        assert!(resolve(&base(), Some(&CspOverride::exempt())).is_absent());
        assert!(resolve(&PolicyConfig::new(), Some(&CspOverride::exempt())).is_absent());
    }

    #[test]
    fn update_with_empty_fragment_returns_base() {
        let base = base();
        let declaration = CspOverride::update(PolicyFragment::new());
        let effective = resolve(&base, Some(&declaration));
        assert_eq!(effective.policy().unwrap(), &base);
    }

    #[test]
    fn update_appends_after_base_sources() {
        let base = PolicyConfig::builder()
            .directive("img-src", "'self'")
            .build()
            .unwrap();
        let fragment = PolicyFragment::builder()
            .directive("img-src", "imgsrv.example.com")
            .build()
            .unwrap();

        let effective = resolve(&base, Some(&CspOverride::update(fragment)));
        assert_eq!(
            effective.policy().unwrap().sources("img-src").unwrap(),
            ["'self'", "imgsrv.example.com"]
        );
    }

    #[test]
    fn update_inserts_directive_absent_from_base() {
        let fragment = PolicyFragment::builder()
            .directive("script-src", ["cdn.example.com", "'unsafe-inline'"])
            .build()
            .unwrap();

        let effective = resolve(&base(), Some(&CspOverride::update(fragment)));
        let policy = effective.policy().unwrap();
        assert_eq!(
            policy.sources("script-src").unwrap(),
            ["cdn.example.com", "'unsafe-inline'"]
        );
        // Untouched directives pass through.
        assert_eq!(policy.sources("img-src").unwrap(), ["'self'"]);
    }

    #[test]
    fn update_does_not_deduplicate_sources() {
        let base = PolicyConfig::builder()
            .directive("img-src", "'self'")
            .build()
            .unwrap();
        let fragment = PolicyFragment::builder()
            .directive("img-src", "'self'")
            .build()
            .unwrap();

        let effective = resolve(&base, Some(&CspOverride::update(fragment)));
        assert_eq!(
            effective.policy().unwrap().sources("img-src").unwrap(),
            ["'self'", "'self'"]
        );
    }

    #[test]
    fn update_keeps_flag_directive_over_appended_flag() {
        let base = PolicyConfig::builder()
            .directive("upgrade-insecure-requests", true)
            .build()
            .unwrap();
        let fragment = PolicyFragment::builder()
            .directive("upgrade-insecure-requests", false)
            .build()
            .unwrap();

        let effective = resolve(&base, Some(&CspOverride::update(fragment)));
        assert_eq!(
            effective.policy().unwrap().flag("upgrade-insecure-requests"),
            Some(true)
        );
    }

    #[test]
    fn update_ignores_removal_sentinel() {
        let base = base();
        let fragment = PolicyFragment::builder().remove("img-src").build().unwrap();

        let effective = resolve(&base, Some(&CspOverride::update(fragment)));
        assert_eq!(effective.policy().unwrap(), &base);
    }

    #[test]
    fn replace_swaps_source_list_wholesale() {
        let fragment = PolicyFragment::builder()
            .directive("img-src", "imgsrv2.example.com")
            .build()
            .unwrap();

        let effective = resolve(&base(), Some(&CspOverride::replace(fragment)));
        let policy = effective.policy().unwrap();
        assert_eq!(policy.sources("img-src").unwrap(), ["imgsrv2.example.com"]);
        assert_eq!(policy.sources("default-src").unwrap(), ["'self'"]);
    }

    #[test]
    fn replace_remove_deletes_directive() {
        let fragment = PolicyFragment::builder().remove("img-src").build().unwrap();

        let effective = resolve(&base(), Some(&CspOverride::replace(fragment)));
        let policy = effective.policy().unwrap();
        assert!(!policy.contains("img-src"));
        assert_eq!(policy.sources("default-src").unwrap(), ["'self'"]);
    }

    #[test]
    fn replace_inserts_directive_absent_from_base() {
        let fragment = PolicyFragment::builder()
            .directive("frame-ancestors", "'none'")
            .build()
            .unwrap();

        let effective = resolve(&base(), Some(&CspOverride::replace(fragment)));
        assert_eq!(
            effective.policy().unwrap().sources("frame-ancestors").unwrap(),
            ["'none'"]
        );
    }

    #[test]
    fn set_ignores_base_entirely() {
        let replacement = PolicyConfig::builder()
            .directive("default-src", "'self'")
            .directive("img-src", "imgsrv.example.com")
            .build()
            .unwrap();

        let effective = resolve(&base(), Some(&CspOverride::set(replacement.clone())));
        assert_eq!(effective.policy().unwrap(), &replacement);
    }

    #[test]
    fn resolve_does_not_mutate_base() {
        let base = base();
        let snapshot = base.clone();
        let fragment = PolicyFragment::builder()
            .directive("img-src", "added.example.com")
            .build()
            .unwrap();

        let _ = resolve(&base, Some(&CspOverride::update(fragment)));
        assert_eq!(base, snapshot);
    }

    #[test]
    fn resolver_holds_base_and_delegates() {
        let resolver = Resolver::new(base());
        assert_eq!(resolver.base(), &base());
        assert!(resolver.resolve(Some(&CspOverride::exempt())).is_absent());
        assert_eq!(resolver.resolve(None).policy().unwrap(), &base());
    }

    #[test]
    fn effective_policy_accessors() {
        let effective = EffectivePolicy::Policy(base());
        assert!(!effective.is_absent());
        assert!(effective.policy().is_some());
        assert_eq!(effective.into_policy().unwrap(), base());
        assert!(EffectivePolicy::Absent.into_policy().is_none());
    }
}
