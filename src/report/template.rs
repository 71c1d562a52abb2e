//! HTML report template.
//!
//! Supports `{{ path.to.value }}` (HTML-escaped) and non-nested
//! `{{#each path}} ... {{this.field}} ... {{/each}}` blocks. Unknown paths
//! render as empty strings.

use std::fs;
use std::path::Path;

use regex::{Captures, Regex};
use serde_json::Value;

use super::render::RenderError;

const BUILTIN_TEMPLATE: &str = include_str!("../../templates/review_report.html");

#[derive(Debug, Clone)]
pub struct ReportTemplate {
    source: String,
    each_block: Regex,
    placeholder: Regex,
}

impl ReportTemplate {
    pub fn new(source: impl Into<String>) -> Result<Self, RenderError> {
        let source = source.into();
        let opens = source.matches("{{#each").count();
        let closes = source.matches("{{/each}}").count();
        if opens != closes {
            return Err(RenderError::Template(format!(
                "unbalanced each blocks: {} opened, {} closed",
                opens, closes
            )));
        }

        let each_block = Regex::new(r"(?s)\{\{#each\s+([\w.]+)\s*\}\}(.*?)\{\{/each\}\}")
            .map_err(|e| RenderError::Template(e.to_string()))?;
        let placeholder = Regex::new(r"\{\{\s*([\w.@]+)\s*\}\}")
            .map_err(|e| RenderError::Template(e.to_string()))?;

        Ok(Self {
            source,
            each_block,
            placeholder,
        })
    }

    pub fn builtin() -> Result<Self, RenderError> {
        Self::new(BUILTIN_TEMPLATE)
    }

    pub fn from_path(path: &Path) -> Result<Self, RenderError> {
        let source = fs::read_to_string(path).map_err(|e| {
            RenderError::Template(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::new(source)
    }

    /// Fills the template with `data` (the serialised `{ info, result }` record).
    pub fn render(&self, data: &Value) -> String {
        let expanded = self.each_block.replace_all(&self.source, |caps: &Captures| {
            let items = lookup(data, &caps[1])
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default();
            let body = &caps[2];
            items
                .iter()
                .enumerate()
                .map(|(i, item)| self.fill(body, data, Some((i, item))))
                .collect::<String>()
        });

        self.fill(&expanded, data, None)
    }

    fn fill(&self, text: &str, root: &Value, item: Option<(usize, &Value)>) -> String {
        self.placeholder
            .replace_all(text, |caps: &Captures| {
                let path = &caps[1];
                let resolved = match (item, path) {
                    (Some((i, _)), "@index") => return (i + 1).to_string(),
                    (Some((_, current)), "this") => Some(current),
                    (Some((_, current)), p) if p.starts_with("this.") => lookup(current, &p[5..]),
                    _ => lookup(root, path),
                };
                resolved.map(display_value).map(|s| escape_html(&s)).unwrap_or_default()
            })
            .into_owned()
    }
}

fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .filter(|segment| !segment.is_empty())
        .try_fold(value, |current, segment| current.get(segment))
}

fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
