//! Name conversion for generated declarations
//!
//! `pascal_case` builds declaration names from dotted path segments and
//! `camel_case` builds property and enum member names from single tokens.
//! The two are not inverses of each other.

/// Capitalize the first letter of a string
pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}

/// Join path segments, capitalizing the first character of each.
///
/// `["patient", "contact"]` becomes `"PatientContact"`.
pub fn pascal_case<S: AsRef<str>>(segments: &[S]) -> String {
    segments
        .iter()
        .map(|segment| capitalize_first(segment.as_ref()))
        .collect()
}

/// `pascal_case` over the segments of a dotted path
pub fn pascal_case_path(path: &str) -> String {
    let segments: Vec<&str> = path.split('.').collect();
    pascal_case(&segments)
}

/// Camel-case a token.
///
/// Fully upper-case tokens (acronyms such as `UUID`) are returned unchanged.
/// Otherwise the first word character is lower-cased, each character starting
/// a new word is upper-cased, and whitespace, underscores and hyphens are
/// removed: `"entered-in-error"` becomes `"enteredInError"`.
pub fn camel_case(token: &str) -> String {
    if token == token.to_uppercase() {
        return token.to_string();
    }

    let mut out = String::with_capacity(token.len());
    let mut prev_is_word = false;

    for (index, ch) in token.chars().enumerate() {
        let is_word = is_word_char(ch);
        let mapped = if index == 0 && is_word {
            ch.to_ascii_lowercase()
        } else if ch.is_ascii_uppercase() {
            ch
        } else if is_word && !prev_is_word {
            ch.to_ascii_uppercase()
        } else {
            ch
        };
        out.push(mapped);
        prev_is_word = is_word;
    }

    out.retain(|c| !(c.is_whitespace() || c == '_' || c == '-'));
    out
}

/// Whether `s` can be used as a bare identifier in the generated output
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' || first == '$' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        }
        _ => false,
    }
}

fn is_word_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}
