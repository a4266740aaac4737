//! String helpers shared by the emitter.

/// Spaces per indentation level inside declarations.
pub const INDENT: &str = "    ";

/// Check if a property name must be quoted.
///
/// Returns true if the name:
/// - Is empty
/// - Doesn't start with a letter, underscore, or dollar sign
/// - Contains characters other than alphanumeric, underscore, or dollar sign
pub fn needs_quoting(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return true;
    };
    !(first.is_ascii_alphabetic() || first == '_' || first == '$')
        || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// JSON-style double-quoted string literal.
pub fn quote(s: &str) -> String {
    serde_json::Value::String(s.to_owned()).to_string()
}

/// Quote a property name if it is not a valid identifier.
pub fn quote_if_needed(name: &str) -> String {
    if needs_quoting(name) {
        quote(name)
    } else {
        name.to_string()
    }
}

/// Prefix every line that has non-whitespace content with `count` spaces.
pub fn indent(text: &str, count: usize) -> String {
    let prefix = " ".repeat(count);
    text.split('\n')
        .map(|line| {
            if line.trim().is_empty() {
                line.to_string()
            } else {
                format!("{prefix}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Replace CRLF line endings with LF.
pub fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n")
}
