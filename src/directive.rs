//! Canonical CSP directive names and name normalization.
//!
//! Directive names are matched case-insensitively and accept underscores in
//! place of hyphens, so `IMG_SRC`, `Img-Src`, and `img-src` all refer to the
//! same directive. Unknown names are rejected at configuration time.

use crate::error::{ConfigurationError, ConfigurationErrorKind};

/// All directive names this crate recognizes.
///
/// Matches the directive set of CSP Level 3 plus the deprecated directives
/// still seen in the wild (`plugin-types`, `prefetch-src`,
/// `block-all-mixed-content`).
pub const KNOWN_DIRECTIVES: &[&str] = &[
    // Fetch directives
    "child-src",
    "connect-src",
    "default-src",
    "font-src",
    "frame-src",
    "img-src",
    "manifest-src",
    "media-src",
    "object-src",
    "prefetch-src",
    "script-src",
    "script-src-attr",
    "script-src-elem",
    "style-src",
    "style-src-attr",
    "style-src-elem",
    "worker-src",
    // Document directives
    "base-uri",
    "plugin-types",
    "sandbox",
    // Navigation directives
    "form-action",
    "frame-ancestors",
    "navigate-to",
    // Reporting directives
    "report-to",
    "report-uri",
    "require-sri-for",
    // Trusted Types directives
    "require-trusted-types-for",
    "trusted-types",
    // Other directives
    "webrtc",
    "upgrade-insecure-requests",
    "block-all-mixed-content",
];

/// Directives that carry a boolean flag instead of a source list.
///
/// A true flag serializes as the bare directive name; a false flag is
/// omitted from the header entirely.
pub const FLAG_DIRECTIVES: &[&str] = &["upgrade-insecure-requests", "block-all-mixed-content"];

/// Normalizes a directive name alias to its canonical spelling.
///
/// Lowercases the name, trims surrounding whitespace, and maps underscores
/// to hyphens. Does not check whether the result is a known directive; use
/// [`canonicalize`] for validated lookup.
///
/// # Examples
///
/// ```
/// use csp_policy::directive::normalize;
///
/// assert_eq!(normalize("IMG_SRC"), "img-src");
/// assert_eq!(normalize("  default-src "), "default-src");
/// ```
pub fn normalize(name: &str) -> String {
    name.trim().to_ascii_lowercase().replace('_', "-")
}

/// Returns whether `name` (already normalized) is a known directive.
pub fn is_known(name: &str) -> bool {
    KNOWN_DIRECTIVES.contains(&name)
}

/// Returns whether `name` (already normalized) is a boolean flag directive.
pub fn is_flag(name: &str) -> bool {
    FLAG_DIRECTIVES.contains(&name)
}

/// Normalizes a directive name and validates it against the known set.
///
/// # Errors
///
/// Returns a `ConfigurationError` if the normalized name is empty or is not
/// a known CSP directive.
///
/// # Examples
///
/// ```
/// use csp_policy::directive::canonicalize;
///
/// assert_eq!(canonicalize("Script_Src").unwrap(), "script-src");
/// assert!(canonicalize("scriptsrc").is_err());
/// ```
pub fn canonicalize(name: &str) -> Result<String, ConfigurationError> {
    let normalized = normalize(name);
    if normalized.is_empty() {
        return Err(ConfigurationError::new(
            ConfigurationErrorKind::EmptyDirectiveName,
            "directive name is empty",
        ));
    }
    if !is_known(&normalized) {
        return Err(ConfigurationError::new(
            ConfigurationErrorKind::UnknownDirective,
            format!("no such directive '{}'", normalized),
        ));
    }
    Ok(normalized)
}
