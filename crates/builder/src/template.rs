//! Action template rendering
//!
//! Phase actions are shell snippets with two kinds of placeholders:
//! - `%{field}` expands to a package metadata field (`%{name}`, `%{version}`, ...)
//! - `${VAR}` expands to a build environment variable
//!
//! `%%` produces a literal `%`. A `${VAR}` with no binding is kept as-is so
//! the shell can still expand it from the process environment.
//!
//! Substitution is textual: values are spliced in without shell quoting, so
//! the action decides the quoting context. A value containing a quote
//! character (a vendor such as `O'Brien`) cannot sit inside the same kind of
//! quotes; prefer `"${NAME}"`-style variables, which the shell receives
//! through the process environment as well.

use pkgdesc_errors::{BuildError, Error};
use pkgdesc_types::{LifecyclePhase, PackageMetadata};
use regex::{Captures, Regex};
use std::collections::BTreeMap;
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"%%|%\{([A-Za-z_]+)\}|\$\{([A-Za-z_][A-Za-z0-9_]*)\}")
        .expect("Invalid placeholder regex")
});

/// Render an action template for `phase`
///
/// # Errors
///
/// Returns `BuildError::TemplateError` if the template references an unknown
/// metadata macro.
pub fn render(
    phase: LifecyclePhase,
    template: &str,
    metadata: &PackageMetadata,
    vars: &BTreeMap<String, String>,
) -> Result<String, Error> {
    let mut unknown: Option<String> = None;
    let rendered = PLACEHOLDER.replace_all(template, |caps: &Captures<'_>| {
        if let Some(field) = caps.get(1) {
            if let Some(value) = metadata.field(field.as_str()) {
                return value.to_string();
            }
            unknown.get_or_insert_with(|| field.as_str().to_string());
            return caps[0].to_string();
        }
        if let Some(var) = caps.get(2) {
            return vars
                .get(var.as_str())
                .cloned()
                .unwrap_or_else(|| caps[0].to_string());
        }
        "%".to_string()
    });

    if let Some(field) = unknown {
        return Err(BuildError::TemplateError {
            phase: phase.to_string(),
            message: format!("unknown macro %{{{field}}}"),
        }
        .into());
    }

    Ok(rendered.into_owned())
}
