//! `$<n>` placeholders in filter GLSL templates.

use std::sync::OnceLock;

use regex::{Captures, Regex};

/// Name of the flattened `vec4` parameter array in synthesized programs.
pub const PARAM_ARRAY: &str = "_p";

fn placeholder() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$(\d+)").expect("placeholder pattern is valid"))
}

/// Local slot indices referenced by a template, in order of appearance.
pub fn placeholder_indices(template: &str) -> Vec<usize> {
    placeholder()
        .captures_iter(template)
        .filter_map(|caps| caps[1].parse().ok())
        .collect()
}

/// Rewrites every `$<n>` into `_p[<base + n>]`.
pub fn rewrite_placeholders(template: &str, base: usize) -> String {
    placeholder()
        .replace_all(template, |caps: &Captures<'_>| match caps[1].parse::<usize>() {
            Ok(local) => format!("{PARAM_ARRAY}[{}]", base + local),
            Err(_) => caps[0].to_string(),
        })
        .into_owned()
}
