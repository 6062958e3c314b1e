//! Token-level helpers for PHPDoc type expressions.
//!
//! These work on raw strings only; turning a token into a [`Type`](crate::php_type::Type)
//! is the job of the [`TypeResolver`](crate::type_resolver::TypeResolver).

/// Split off the first type token from `s`, respecting `<…>`, `(…)` and
/// `{…}` nesting.
///
/// Returns `(type_token, remainder)` where `type_token` is the full type
/// (e.g. `Collection<int, User>` or `array{id: int}`) and `remainder` is
/// whatever follows.
pub(crate) fn split_type_token(s: &str) -> (&str, &str) {
    let mut depth = 0i32;
    for (i, c) in s.char_indices() {
        match c {
            '<' | '(' | '{' => depth += 1,
            '>' | ')' | '}' => depth -= 1,
            c if c.is_whitespace() && depth <= 0 => {
                return (&s[..i], &s[i..]);
            }
            _ => {}
        }
    }
    (s, "")
}

/// Split a type expression on top-level `|` separators.
///
/// `array<int|string, Foo>|null` → `["array<int|string, Foo>", "null"]`
pub(crate) fn split_union(s: &str) -> Vec<&str> {
    split_depth0(s, '|')
}

/// Split on top-level commas, e.g. generic arguments or `@method`
/// parameter lists.
pub(crate) fn split_commas(s: &str) -> Vec<&str> {
    split_depth0(s, ',')
}

fn split_depth0(s: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;

    for (i, ch) in s.char_indices() {
        match ch {
            '<' | '(' | '{' | '[' => depth += 1,
            '>' | ')' | '}' | ']' => depth -= 1,
            c if c == separator && depth == 0 => {
                parts.push(s[start..i].trim());
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(s[start..].trim());
    parts
}

/// Strip a leading `\` (PHP fully-qualified prefix) and trailing
/// punctuation that leaks from prose (`Foo.` at the end of a sentence).
pub(crate) fn clean_type(raw: &str) -> &str {
    let s = raw.trim();
    let s = s.strip_prefix('\\').unwrap_or(s);
    s.trim_end_matches(['.', ','])
}

/// Whether `name` is syntactically a PHP class name, optionally
/// namespaced (`Foo`, `App\Models\User`, `_Private`).
pub(crate) fn is_class_name(name: &str) -> bool {
    let name = name.strip_prefix('\\').unwrap_or(name);
    if name.is_empty() {
        return false;
    }
    name.split('\\').all(|segment| {
        let mut chars = segment.chars();
        match chars.next() {
            Some(first) if first == '_' || first.is_alphabetic() => {
                chars.all(|c| c == '_' || c.is_alphanumeric())
            }
            _ => false,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_type_token_keeps_generics_together() {
        assert_eq!(
            split_type_token("Collection<int, User> $users"),
            ("Collection<int, User>", " $users")
        );
        assert_eq!(split_type_token("array{id: int} $row"), ("array{id: int}", " $row"));
        assert_eq!(split_type_token("string"), ("string", ""));
    }

    #[test]
    fn split_union_respects_nesting() {
        assert_eq!(
            split_union("array<int|string, Foo>|null"),
            vec!["array<int|string, Foo>", "null"]
        );
        assert_eq!(split_union("string"), vec!["string"]);
    }

    #[test]
    fn class_name_validation() {
        assert!(is_class_name("Foobar"));
        assert!(is_class_name("\\App\\Models\\User"));
        assert!(!is_class_name("App\\"));
        assert!(!is_class_name("1Foo"));
        assert!(!is_class_name("foo-bar"));
        assert!(!is_class_name(""));
    }
}
