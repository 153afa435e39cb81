//! Header import stripping
//!
//! Removes the import directives naming types known to be unresolvable in
//! the current environment, leaving every other line untouched. Operates on
//! raw text so it works on documents that cannot be loaded yet.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

static IMPORT_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*<\?\s*import\s+([A-Za-z_][A-Za-z0-9_.]*)\s*\?>\s*$")
        .expect("import pattern compiles")
});

/// Strip the import directives whose type name is in `unresolved`,
/// reporting each removed name. Returns the input unchanged when the set
/// is empty.
pub fn remove_imports(
    text: &str,
    unresolved: &BTreeSet<String>,
    mut on_removed: impl FnMut(&str),
) -> String {
    if unresolved.is_empty() {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    for line in text.split_inclusive('\n') {
        if let Some(captures) = IMPORT_LINE.captures(line) {
            let name = &captures[1];
            if unresolved.contains(name) {
                tracing::debug!(%name, "removing unresolvable import");
                on_removed(name);
                continue;
            }
        }
        out.push_str(line);
    }
    out
}
