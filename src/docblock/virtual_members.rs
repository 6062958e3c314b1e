//! Virtual member tag extraction (`@property`, `@method`).
//!
//! This submodule turns class-level PHPDoc tags into typed intermediate
//! records:
//!
//!   - `@property Type $name` / `@property-read` / `@property-write`
//!   - `@method ReturnType methodName(ParamType $param, ...)`
//!   - `@method static ReturnType methodName(...)`
//!
//! Type strings are left raw; the member provider resolves them.  A tag
//! that is missing its name is skipped.

use super::tags::DocBlock;
use super::types::{clean_type, split_commas, split_type_token};
use crate::types::PropertyAccess;

/// A `@property` family tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyTag {
    /// Property name without the `$` prefix.
    pub name: String,
    /// Raw type expression, `None` for `@property $name`.
    pub type_expr: Option<String>,
    pub access: PropertyAccess,
}

/// One parameter of a `@method` tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodTagParameter {
    /// Parameter name without the `$` prefix.
    pub name: String,
    pub type_expr: Option<String>,
    /// Source text of the default value, if one was written.
    pub default: Option<String>,
    pub is_variadic: bool,
    pub is_reference: bool,
}

/// A `@method` tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodTag {
    pub name: String,
    pub is_static: bool,
    pub return_type: Option<String>,
    pub parameters: Vec<MethodTagParameter>,
}

// ─── @property Tags ─────────────────────────────────────────────────────────

/// Extract all `@property`, `@property-read` and `@property-write` tags.
pub fn property_tags(doc: &DocBlock) -> Vec<PropertyTag> {
    let mut results = Vec::new();

    for tag in &doc.tags {
        let access = match tag.name.as_str() {
            "property" | "phpstan-property" | "psalm-property" => PropertyAccess::ReadWrite,
            "property-read" | "phpstan-property-read" | "psalm-property-read" => {
                PropertyAccess::ReadOnly
            }
            "property-write" | "phpstan-property-write" | "psalm-property-write" => {
                PropertyAccess::WriteOnly
            }
            _ => continue,
        };

        let body = tag.body.trim();
        if body.is_empty() {
            tracing::debug!("skipping empty @{} tag", tag.name);
            continue;
        }

        // Format: @property Type $name  (or)  @property $name
        let (type_expr, remainder) = if body.starts_with('$') {
            (None, body)
        } else {
            let (type_token, remainder) = split_type_token(body);
            (Some(clean_type(type_token).to_string()), remainder)
        };

        let Some(prop_name) = remainder.split_whitespace().find(|t| t.starts_with('$')) else {
            tracing::debug!("skipping @{} tag without a $name: {body:?}", tag.name);
            continue;
        };
        let name = prop_name.trim_start_matches('$');
        if name.is_empty() {
            continue;
        }

        results.push(PropertyTag {
            name: name.to_string(),
            type_expr,
            access,
        });
    }

    results
}

// ─── @method Tags ───────────────────────────────────────────────────────────

/// Extract all `@method` tags.
///
/// Accepted forms:
///
///   - `@method ReturnType methodName(ParamType $param, ...)`
///   - `@method static ReturnType methodName(...)`
///   - `@method methodName(...)`  (no return type)
pub fn method_tags(doc: &DocBlock) -> Vec<MethodTag> {
    let mut results = Vec::new();

    for tag in doc.tags_named("method") {
        let rest = tag.body.trim();
        if rest.is_empty() {
            continue;
        }

        // `static` must be followed by whitespace so that a method called
        // `staticFoo` is not mistaken for the keyword.
        let (is_static, rest) = match rest.strip_prefix("static") {
            Some(after) if after.starts_with(char::is_whitespace) => (true, after.trim_start()),
            _ => (false, rest),
        };

        let Some(paren_pos) = rest.find('(') else {
            tracing::debug!("skipping @method tag without a parameter list: {rest:?}");
            continue;
        };

        let before_paren = rest[..paren_pos].trim();
        let after_paren = &rest[paren_pos + 1..];
        if before_paren.is_empty() {
            continue;
        }

        // The method name is the last whitespace-delimited token.
        let (return_type, method_name) = match before_paren.rfind(char::is_whitespace) {
            Some(last_space) => (
                Some(clean_type(&before_paren[..last_space]).to_string()),
                before_paren[last_space..].trim(),
            ),
            None => (None, before_paren),
        };
        if method_name.is_empty() || !method_name.chars().all(|c| c == '_' || c.is_alphanumeric())
        {
            continue;
        }

        let params_str = match after_paren.rfind(')') {
            Some(close) => after_paren[..close].trim(),
            None => after_paren.trim(),
        };

        results.push(MethodTag {
            name: method_name.to_string(),
            is_static,
            return_type: return_type.filter(|t| !t.is_empty()),
            parameters: parse_method_tag_params(params_str),
        });
    }

    results
}

// ─── Internal Helpers ───────────────────────────────────────────────────────

/// Parse the parameter list from a `@method` tag.
///
/// Handles formats like:
///   - `string $abstract, callable():mixed $mockDefinition = null`
///   - `array<string, mixed> $data, string $connection = null`
fn parse_method_tag_params(params_str: &str) -> Vec<MethodTagParameter> {
    if params_str.is_empty() {
        return Vec::new();
    }

    let mut result = Vec::new();
    for part in split_commas(params_str) {
        if part.is_empty() {
            continue;
        }

        let (declaration, default) = match part.split_once('=') {
            Some((decl, default)) => (decl.trim(), Some(default.trim().to_string())),
            None => (part, None),
        };

        // No `$` means there is no name to show; skip the parameter.
        let Some(dollar) = declaration.rfind('$') else {
            continue;
        };
        let name = declaration[dollar + 1..].trim();
        if name.is_empty() {
            continue;
        }

        let before = declaration[..dollar].trim();
        let is_variadic = before.ends_with("...");
        let before = before.trim_end_matches("...").trim_end();
        let is_reference = before.ends_with('&');
        let before = before.trim_end_matches('&').trim_end();

        result.push(MethodTagParameter {
            name: name.to_string(),
            type_expr: (!before.is_empty()).then(|| clean_type(before).to_string()),
            default,
            is_variadic,
            is_reference,
        });
    }

    result
}
