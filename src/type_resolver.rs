//! Type expression resolution.
//!
//! Turns the raw strings found in native hints (`?string`, `int|false`)
//! and docblock tags (`Foobar[]`, `list<User>`, `string|bool|null`) into a
//! canonical [`Type`].  Resolution never fails: an expression that cannot
//! be understood degrades to [`Type::Unknown`] or [`Type::Mixed`] as
//! described on [`UnresolvedTokenPolicy`].

use serde::Deserialize;

use crate::docblock::types::{clean_type, is_class_name, split_commas, split_union};
use crate::php_type::Type;

/// Built-in type keywords and the canonical name each one resolves to.
const SCALAR_ALIASES: &[(&str, &str)] = &[
    ("int", "int"),
    ("integer", "int"),
    ("float", "float"),
    ("double", "float"),
    ("string", "string"),
    ("bool", "bool"),
    ("boolean", "bool"),
    ("array", "array"),
    ("callable", "callable"),
    ("iterable", "iterable"),
    ("object", "object"),
    ("void", "void"),
    ("never", "never"),
    ("null", "null"),
    ("false", "false"),
    ("true", "true"),
    ("resource", "resource"),
    ("array-key", "array-key"),
    ("class-string", "class-string"),
    ("list", "list"),
    ("non-empty-string", "non-empty-string"),
    ("positive-int", "positive-int"),
];

/// Generic bases whose last type argument is the element type.
const ITERABLE_GENERICS: &[&str] = &[
    "array",
    "list",
    "iterable",
    "non-empty-array",
    "non-empty-list",
];

/// What an unrecognised token inside a multi-token union turns into.
///
/// A lone unrecognised token (`@var 12abc`) is always [`Type::Unknown`]:
/// it is most likely a typo.  Inside a union the author documented several
/// alternatives on purpose, so by default the token is taken to mean
/// "anything" and the union collapses to `mixed`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnresolvedTokenPolicy {
    /// The token becomes `mixed`, absorbing the whole union.
    #[default]
    Mixed,
    /// The token is dropped; a union with nothing left is `mixed`.
    Ignore,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TypeResolver {
    policy: UnresolvedTokenPolicy,
}

impl TypeResolver {
    pub fn new(policy: UnresolvedTokenPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> UnresolvedTokenPolicy {
        self.policy
    }

    /// Resolve a single type expression.
    pub fn resolve(&self, expression: &str) -> Type {
        let expression = expression.trim();
        if expression.is_empty() {
            return Type::Unknown;
        }

        let tokens = split_union(expression);
        if tokens.len() == 1 {
            return self.resolve_token(tokens[0]).unwrap_or(Type::Unknown);
        }

        let mut members = Vec::with_capacity(tokens.len());
        for token in tokens {
            match self.resolve_token(token) {
                Some(ty) => members.push(ty),
                None => {
                    tracing::debug!("unrecognised type token {token:?} in union {expression:?}");
                    if self.policy == UnresolvedTokenPolicy::Mixed {
                        members.push(Type::Mixed);
                    }
                }
            }
        }

        if members.is_empty() {
            return Type::Mixed;
        }
        Type::union(members)
    }

    /// Resolve several alternative expressions for the same value into one
    /// union (e.g. the types offered by two docblock tags).
    pub fn resolve_all<'a>(&self, expressions: impl IntoIterator<Item = &'a str>) -> Type {
        Type::union(expressions.into_iter().map(|e| self.resolve(e)))
    }

    /// Combine a native type hint with a documented type.
    ///
    /// The documented type replaces a broad native hint (`array` →
    /// `Foo[]`); otherwise the two are merged into a union, which is a
    /// no-op when they agree.
    pub fn resolve_declared(&self, native: Option<&str>, documented: Option<&str>) -> Type {
        match (native, documented) {
            (None, None) => Type::Unknown,
            (Some(native), None) => self.resolve(native),
            (None, Some(documented)) => self.resolve(documented),
            (Some(native), Some(documented)) => {
                let native = self.resolve(native);
                let documented = self.resolve(documented);
                if documented.is_unknown() {
                    native
                } else if native.is_refinable() {
                    documented
                } else {
                    Type::union([native, documented])
                }
            }
        }
    }

    /// Resolve one union member.  `None` means the token is not a type.
    fn resolve_token(&self, token: &str) -> Option<Type> {
        let token = clean_type(token);
        if token.is_empty() {
            return None;
        }

        if let Some(inner) = token.strip_prefix('(').and_then(|t| t.strip_suffix(')')) {
            return match self.resolve(inner) {
                Type::Unknown => None,
                ty => Some(ty),
            };
        }

        if let Some(rest) = token.strip_prefix('?') {
            return self.resolve_token(rest).map(Type::nullable);
        }

        if let Some(base) = token.strip_suffix("[]") {
            return self.resolve_token(base).map(Type::array_of);
        }

        if let Some(open) = token.find(['<', '{', '(']) {
            return self.resolve_compound(&token[..open], &token[open..]);
        }

        let lower = token.to_ascii_lowercase();
        if lower == "mixed" {
            return Some(Type::Mixed);
        }
        if let Some((_, canonical)) = SCALAR_ALIASES.iter().find(|(alias, _)| *alias == lower) {
            return Some(Type::scalar(*canonical));
        }
        if is_class_name(token) {
            return Some(Type::class(token));
        }
        None
    }

    /// `array<int, Foo>`, `list<Foo>`, `array{id: int}`, `callable(int): void`,
    /// `Collection<Foo>`.
    fn resolve_compound(&self, base: &str, rest: &str) -> Option<Type> {
        let lower = base.to_ascii_lowercase();

        if rest.starts_with('<') {
            let args = rest.strip_prefix('<')?.strip_suffix('>')?;
            if ITERABLE_GENERICS.contains(&lower.as_str()) {
                let value = split_commas(args).last().copied().unwrap_or_default();
                let element = match self.resolve(value) {
                    Type::Unknown => Type::Mixed,
                    ty => ty,
                };
                return Some(Type::array_of(element));
            }
            if lower == "class-string" {
                return Some(Type::scalar("class-string"));
            }
            return is_class_name(base).then(|| Type::class(base));
        }

        if rest.starts_with('{') {
            return match lower.as_str() {
                "array" | "list" => Some(Type::scalar("array")),
                "object" => Some(Type::scalar("object")),
                _ => None,
            };
        }

        // Callable signatures: only the base matters for display.
        match lower.as_str() {
            "callable" => Some(Type::scalar("callable")),
            "closure" => Some(Type::class("Closure")),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(s: &str) -> Type {
        TypeResolver::default().resolve(s)
    }

    #[test]
    fn scalar_aliases_are_canonicalised() {
        assert_eq!(resolve("integer"), Type::scalar("int"));
        assert_eq!(resolve("Boolean"), Type::scalar("bool"));
        assert_eq!(resolve("double"), Type::scalar("float"));
    }

    #[test]
    fn class_names_lose_leading_backslash() {
        assert_eq!(resolve("\\App\\User"), Type::class("App\\User"));
    }

    #[test]
    fn generic_iterables_become_array_of() {
        assert_eq!(resolve("list<User>"), Type::array_of(Type::class("User")));
        assert_eq!(
            resolve("array<int, User>"),
            Type::array_of(Type::class("User"))
        );
        assert_eq!(resolve("Collection<User>"), Type::class("Collection"));
    }

    #[test]
    fn single_garbage_token_is_unknown() {
        assert_eq!(resolve("12abc"), Type::Unknown);
        assert_eq!(resolve(""), Type::Unknown);
    }

    #[test]
    fn garbage_inside_union_is_mixed() {
        assert_eq!(resolve("string|12abc"), Type::Mixed);
        assert_eq!(resolve("1a|2b"), Type::Mixed);
    }

    #[test]
    fn ignore_policy_drops_garbage_tokens() {
        let resolver = TypeResolver::new(UnresolvedTokenPolicy::Ignore);
        assert_eq!(resolver.resolve("string|12abc"), Type::scalar("string"));
        assert_eq!(resolver.resolve("1a|2b"), Type::Mixed);
        assert_eq!(resolver.resolve("12abc"), Type::Unknown);
    }

    #[test]
    fn documented_type_refines_broad_native_hint() {
        let resolver = TypeResolver::default();
        assert_eq!(
            resolver.resolve_declared(Some("array"), Some("Foobar[]")),
            Type::array_of(Type::class("Foobar"))
        );
        assert_eq!(
            resolver.resolve_declared(Some("string"), Some("string")),
            Type::scalar("string")
        );
        assert_eq!(
            resolver
                .resolve_declared(Some("int"), Some("string"))
                .to_string(),
            "int|string"
        );
    }

    #[test]
    fn resolve_all_merges_alternatives() {
        let ty = TypeResolver::default().resolve_all(["string", "int|string", "?Foo"]);
        assert_eq!(ty.to_string(), "string|int|Foo|null");
    }
}
