use crate::error::{CoreError, Result};
use regex::Regex;
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Java identifier validation
// ---------------------------------------------------------------------------

static IDENT_RE: OnceLock<Regex> = OnceLock::new();

fn ident_re() -> &'static Regex {
    IDENT_RE.get_or_init(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").unwrap())
}

const RESERVED: &[&str] = &[
    "abstract",
    "assert",
    "boolean",
    "break",
    "byte",
    "case",
    "catch",
    "char",
    "class",
    "const",
    "continue",
    "default",
    "do",
    "double",
    "else",
    "enum",
    "extends",
    "false",
    "final",
    "finally",
    "float",
    "for",
    "goto",
    "if",
    "implements",
    "import",
    "instanceof",
    "int",
    "interface",
    "long",
    "native",
    "new",
    "null",
    "package",
    "private",
    "protected",
    "public",
    "return",
    "short",
    "static",
    "strictfp",
    "super",
    "switch",
    "synchronized",
    "this",
    "throw",
    "throws",
    "transient",
    "true",
    "try",
    "void",
    "volatile",
    "while",
];

pub fn is_java_ident(s: &str) -> bool {
    ident_re().is_match(s) && !RESERVED.contains(&s)
}

pub fn validate_ident(s: &str) -> Result<()> {
    if is_java_ident(s) {
        return Ok(());
    }
    Err(CoreError::InvalidIdentifier(s.to_string()))
}

// ---------------------------------------------------------------------------
// Casing
// ---------------------------------------------------------------------------

/// Converts a display name into a lowerCamelCase identifier: `"An action"`
/// becomes `anAction`, `"actuator setValue"` becomes `actuatorSetValue`.
/// Interior casing of each word is preserved. A leading digit is escaped
/// with an underscore; an empty input yields `_`.
pub fn lower_camel(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut first_word = true;
    for word in name.split(|c: char| !c.is_ascii_alphanumeric()) {
        let mut chars = word.chars();
        let Some(head) = chars.next() else { continue };
        if first_word {
            out.push(head.to_ascii_lowercase());
            first_word = false;
        } else {
            out.push(head.to_ascii_uppercase());
        }
        out.push_str(chars.as_str());
    }
    if out.is_empty() {
        out.push('_');
    } else if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
