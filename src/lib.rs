//! Content-Security-Policy configuration with per-handler overrides.
//!
//! This crate computes the effective CSP for each response from two
//! inputs: the process-wide base policy and an optional override the
//! handler declared. The core is a single pure function, [`resolve`];
//! around it sit the validated configuration types, a header serializer,
//! and framework-agnostic response glue.
//!
//! # Core Types
//!
//! - [`PolicyConfig`]: ordered, validated directive-to-source-list mapping
//! - [`PolicyFragment`]: partial policy carried by UPDATE/REPLACE overrides
//! - [`CspOverride`]: the closed set of override modes
//!   (exempt / update / replace / set)
//! - [`EffectivePolicy`]: a policy, or the absent sentinel meaning
//!   "write no header"
//! - [`Resolver`]: the immutable base policy plus [`resolve`]
//! - [`HeaderWriter`] / [`ResponseState`]: middleware-facing glue
//!
//! Policies and fragments validate at construction, so a malformed
//! override fails where the handler is wired up. Resolution itself is
//! total: it performs no I/O and cannot fail.
//!
//! # Examples
//!
//! ```
//! use csp_policy::{resolve, CspOverride, PolicyConfig, PolicyFragment};
//!
//! let base = PolicyConfig::builder()
//!     .directive("default-src", "'self'")
//!     .directive("img-src", "'self'")
//!     .build()?;
//!
//! // A handler that also loads images from a CDN:
//! let fragment = PolicyFragment::builder()
//!     .directive("img-src", "imgsrv.example.com")
//!     .build()?;
//! let effective = resolve(&base, Some(&CspOverride::update(fragment)));
//!
//! let policy = effective.policy().unwrap();
//! assert_eq!(policy.sources("img-src").unwrap(), ["'self'", "imgsrv.example.com"]);
//! # Ok::<(), csp_policy::ConfigurationError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod declaration;
pub mod directive;
mod error;
mod fragment;
pub mod header;
mod middleware;
mod policy;
mod resolver;
mod settings;

pub use declaration::CspOverride;
pub use error::{ConfigurationError, ConfigurationErrorKind};
pub use fragment::{FragmentEntry, FragmentValue, PolicyFragment, PolicyFragmentBuilder};
pub use middleware::{CspHeader, HeaderWriter, ResponseState};
pub use policy::{DirectiveValue, PolicyConfig, PolicyConfigBuilder, SourceValue};
pub use resolver::{resolve, EffectivePolicy, Resolver};
pub use settings::{CspSettings, DirectiveSetting};
