//! `${name}` placeholder substitution for bootstrap scripts.
//!
//! Substitution is keyed by the caller's map, not by a placeholder grammar:
//! any key, dotted or dashed, is matched as the literal token `${key}`.
//! The template is scanned once and values are inserted literally and never
//! re-scanned, so a value that itself looks like a placeholder stays as
//! written. Placeholders without a matching key are left verbatim.

use std::collections::HashMap;
use std::sync::OnceLock;

use log::warn;
use regex::{Captures, Regex, escape};

/// Any `${...}` token, used only to report leftovers after rendering.
const PLACEHOLDER_PATTERN: &str = r"\$\{(?P<name>[^${}\s]+)\}";
const PLACEHOLDER_CAPTURE_NAME: &str = "name";
const PLACEHOLDER_PREFIX: &str = "${";
const PLACEHOLDER_SUFFIX: &str = "}";

static PLACEHOLDER_REGEX: OnceLock<Regex> = OnceLock::new();

pub(crate) fn get_placeholder_regex() -> &'static Regex {
    PLACEHOLDER_REGEX.get_or_init(|| Regex::new(PLACEHOLDER_PATTERN).expect("valid regex pattern"))
}

fn placeholder(key: &str) -> String {
    format!("{PLACEHOLDER_PREFIX}{key}{PLACEHOLDER_SUFFIX}")
}

/// Alternation of every escaped `${key}` token, longest first.
fn substitution_pattern(substitutions: &HashMap<String, String>) -> String {
    let mut keys: Vec<&String> = substitutions.keys().collect();
    keys.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

    keys.iter()
        .map(|key| escape(&placeholder(key)))
        .collect::<Vec<_>>()
        .join("|")
}

/// Replace every `${key}` in `template` whose key is in `substitutions`.
pub fn render(template: &str, substitutions: &HashMap<String, String>) -> String {
    if substitutions.is_empty() {
        return template.to_string();
    }

    let matcher = match Regex::new(&substitution_pattern(substitutions)) {
        Ok(matcher) => matcher,
        Err(e) => {
            warn!("Falling back to sequential substitution: {e}");
            return render_sequential(template, substitutions);
        }
    };

    let prefix_len = PLACEHOLDER_PREFIX.len();
    let suffix_len = PLACEHOLDER_SUFFIX.len();

    matcher
        .replace_all(template, |caps: &Captures<'_>| {
            let token = &caps[0];
            let key = &token[prefix_len..token.len() - suffix_len];
            substitutions
                .get(key)
                .cloned()
                .unwrap_or_else(|| token.to_string())
        })
        .into_owned()
}

/// Only reached when the key set is too large to compile into one matcher.
fn render_sequential(template: &str, substitutions: &HashMap<String, String>) -> String {
    substitutions
        .iter()
        .fold(template.to_string(), |text, (key, value)| {
            text.replace(&placeholder(key), value)
        })
}

/// Names of placeholders still present in `text`, in order of first appearance.
pub fn unresolved_placeholders(text: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();

    for caps in get_placeholder_regex().captures_iter(text) {
        let name = &caps[PLACEHOLDER_CAPTURE_NAME];
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }

    names
}
