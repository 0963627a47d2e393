//! Identifier and keyword helpers used while stubbing Go declarations.

/// Go reserved words; none of them can name a package, type or function.
pub const RESERVED_WORDS: &[&str] = &[
    "break",
    "case",
    "chan",
    "const",
    "continue",
    "default",
    "defer",
    "else",
    "fallthrough",
    "for",
    "func",
    "go",
    "goto",
    "if",
    "import",
    "interface",
    "map",
    "package",
    "range",
    "return",
    "select",
    "struct",
    "switch",
    "type",
    "var",
];

/// Determine whether `ident` is a Go keyword.
pub fn is_reserved_word(ident: &str) -> bool {
    RESERVED_WORDS.contains(&ident)
}

/// Go exports a name when its first character is an upper case letter.
pub fn is_exported(ident: &str) -> bool {
    ident.chars().next().is_some_and(char::is_uppercase)
}

/// Whether `s` is a valid, non-keyword Go identifier.
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first == '_' || first.is_alphabetic())
        && chars.all(|c| c == '_' || c.is_alphanumeric())
        && !is_reserved_word(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_exported() {
        assert!(is_exported("Foo"));
        assert!(is_exported("Ünicode"));
        assert!(!is_exported("foo"));
        assert!(!is_exported("_Foo"));
        assert!(!is_exported(""));
    }

    #[test]
    fn test_is_identifier() {
        assert!(is_identifier("corev1"));
        assert!(is_identifier("_"));
        assert!(!is_identifier("yaml.v3"));
        assert!(!is_identifier("1abc"));
        assert!(!is_identifier("func"));
        assert!(!is_identifier(""));
    }
}
