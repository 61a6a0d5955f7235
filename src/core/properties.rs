use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;

pub type PropertyMap = HashMap<String, String>;

/// Upper bound on substitution passes, so self-referencing or looping
/// properties terminate.
pub const MAX_SUBSTITUTIONS: usize = 10;

/// Substitutes `${key}` placeholders in `raw` using `properties`.
///
/// Each pass resolves the first placeholder found and replaces every
/// occurrence of it. Resolution stops at the first unknown key or after
/// [`MAX_SUBSTITUTIONS`] passes; whatever is left unresolved stays in the
/// returned string verbatim.
pub fn resolve_placeholders(raw: &str, properties: &PropertyMap) -> String {
    let mut result = raw.to_string();
    for _ in 0..MAX_SUBSTITUTIONS {
        let key = match placeholder_pattern().captures(&result) {
            Some(caps) => caps[1].to_string(),
            None => break,
        };
        let value = match properties.get(&key) {
            Some(value) => value,
            None => break,
        };
        result = result.replace(&format!("${{{key}}}"), value);
    }
    result
}

pub fn has_placeholder(value: &str) -> bool {
    placeholder_pattern().is_match(value)
}

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("valid placeholder pattern"))
}
