//! Placeholder substitution with handlebars.
//!
//! Launcher scripts and packager arguments are plain text, so HTML escaping
//! is disabled and unknown placeholders render as empty strings.

use crate::error::Result;
use handlebars::Handlebars;
use serde::Serialize;

/// Render `template` with the fields of `data` available as `{{name}}`.
pub fn render<T: Serialize>(template: &str, data: &T) -> Result<String> {
    let mut registry = Handlebars::new();
    registry.register_escape_fn(handlebars::no_escape);
    Ok(registry.render_template(template, data)?)
}
