//! The canonical PHP type value.
//!
//! Every declared hint and documented `@var` / `@param` / `@return` type is
//! reduced to a [`Type`] by the [`TypeResolver`](crate::type_resolver::TypeResolver).
//! The constructors on this type keep the value canonical:
//!
//!   - a union is never empty and never has a single member,
//!   - nested unions are flattened and duplicates removed (first wins),
//!   - `mixed` absorbs every union it appears in,
//!   - a `null` member turns the rest of the union into [`Type::Nullable`].

use std::fmt;

/// A resolved PHP type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    /// A built-in type such as `string`, `int`, `array` or `void`.
    Scalar(String),
    /// A class, interface, trait or enum name (leading `\` stripped).
    ClassReference(String),
    /// A documented array of values (`Foo[]`, `list<Foo>`, `array<int, Foo>`).
    ArrayOf(Box<Type>),
    /// Two or more distinct member types.
    Union(Vec<Type>),
    /// The wrapped type or `null`.
    Nullable(Box<Type>),
    /// Explicitly anything.
    Mixed,
    /// No usable type information.
    Unknown,
}

impl Type {
    pub fn scalar(name: impl Into<String>) -> Self {
        Type::Scalar(name.into())
    }

    pub fn class(name: impl Into<String>) -> Self {
        let name = name.into();
        match name.strip_prefix('\\') {
            Some(stripped) => Type::ClassReference(stripped.to_string()),
            None => Type::ClassReference(name),
        }
    }

    pub fn array_of(inner: Type) -> Self {
        Type::ArrayOf(Box::new(inner))
    }

    /// Wrap `inner` in [`Type::Nullable`], keeping the result canonical.
    pub fn nullable(inner: Type) -> Self {
        match inner {
            Type::Mixed => Type::Mixed,
            Type::Unknown => Type::Unknown,
            Type::Nullable(_) => inner,
            Type::Scalar(ref name) if name == "null" => inner,
            other => Type::Nullable(Box::new(other)),
        }
    }

    /// Build a canonical union out of `members`.
    ///
    /// `Unknown` members are dropped when anything else is present; an
    /// entirely empty input collapses to `Unknown`.
    pub fn union(members: impl IntoIterator<Item = Type>) -> Self {
        let mut flat: Vec<Type> = Vec::new();
        let mut has_null = false;
        let mut saw_unknown = false;

        fn push(flat: &mut Vec<Type>, has_null: &mut bool, unknown: &mut bool, ty: Type) {
            match ty {
                Type::Union(inner) => {
                    for member in inner {
                        push(flat, has_null, unknown, member);
                    }
                }
                Type::Nullable(inner) => {
                    *has_null = true;
                    push(flat, has_null, unknown, *inner);
                }
                Type::Scalar(ref name) if name == "null" => *has_null = true,
                Type::Unknown => *unknown = true,
                other => {
                    if !flat.contains(&other) {
                        flat.push(other);
                    }
                }
            }
        }

        for member in members {
            push(&mut flat, &mut has_null, &mut saw_unknown, member);
        }

        if flat.contains(&Type::Mixed) {
            return Type::Mixed;
        }

        let base = match flat.len() {
            0 if has_null => return Type::scalar("null"),
            0 => return Type::Unknown,
            1 => flat.remove(0),
            _ => Type::Union(flat),
        };

        if has_null {
            Type::nullable(base)
        } else {
            base
        }
    }

    pub fn is_mixed(&self) -> bool {
        matches!(self, Type::Mixed)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Type::Unknown)
    }

    /// Whether a documented type may replace this declared type outright
    /// instead of being merged with it.
    ///
    /// Broad hints (`array`, `iterable`, `object`, `mixed`, class names) are
    /// routinely refined by docblocks (`array` → `Foo[]`).
    pub fn is_refinable(&self) -> bool {
        match self {
            Type::Scalar(name) => matches!(name.as_str(), "array" | "iterable" | "object"),
            Type::ClassReference(_) | Type::Mixed | Type::Unknown => true,
            Type::ArrayOf(_) | Type::Union(_) | Type::Nullable(_) => false,
        }
    }

    /// Short lowercase label for the variant, exposed to templates.
    pub fn kind(&self) -> &'static str {
        match self {
            Type::Scalar(_) => "scalar",
            Type::ClassReference(_) => "class",
            Type::ArrayOf(_) => "array",
            Type::Union(_) => "union",
            Type::Nullable(_) => "nullable",
            Type::Mixed => "mixed",
            Type::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Scalar(name) | Type::ClassReference(name) => f.write_str(name),
            Type::ArrayOf(inner) => match inner.as_ref() {
                Type::Union(_) | Type::Nullable(_) => write!(f, "({})[]", inner),
                _ => write!(f, "{}[]", inner),
            },
            Type::Union(members) => {
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        f.write_str("|")?;
                    }
                    write!(f, "{}", member)?;
                }
                Ok(())
            }
            Type::Nullable(inner) => match inner.as_ref() {
                Type::Union(_) => write!(f, "{}|null", inner),
                _ => write!(f, "?{}", inner),
            },
            Type::Mixed => f.write_str("mixed"),
            Type::Unknown => f.write_str("<unknown>"),
        }
    }
}
