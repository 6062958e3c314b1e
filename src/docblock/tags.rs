//! PHPDoc block parsing.
//!
//! A [`DocBlock`] is the tolerant, typed intermediate form of a `/** ... */`
//! comment: free text split into summary and description, followed by the
//! list of `@tags` in source order.  Nothing here fails; text that does not
//! look like a tag is treated as prose and a tag without a body is kept
//! with an empty body for callers to skip.

use mago_span::HasSpan;
use mago_syntax::ast::*;

use super::types::{clean_type, split_type_token};

/// One `@name body` entry.  Continuation lines are folded into `body`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    /// Tag name without the `@` (e.g. `"param"`, `"property-read"`).
    pub name: String,
    pub body: String,
}

/// A parsed doc comment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocBlock {
    pub summary: String,
    pub description: String,
    pub tags: Vec<Tag>,
}

impl DocBlock {
    /// Parse the raw text of a doc comment, delimiters included.
    pub fn parse(raw: &str) -> DocBlock {
        let inner = raw.trim();
        let inner = inner.strip_prefix("/**").unwrap_or(inner);
        let inner = inner.strip_suffix("*/").unwrap_or(inner);

        let mut paragraphs: Vec<Vec<&str>> = vec![Vec::new()];
        let mut tags: Vec<Tag> = Vec::new();

        for line in inner.lines() {
            let trimmed = line.trim().trim_start_matches('*').trim();

            if let Some(rest) = trimmed.strip_prefix('@') {
                let (name, body) = match rest.find(char::is_whitespace) {
                    Some(pos) => (&rest[..pos], rest[pos..].trim()),
                    None => (rest, ""),
                };
                if !name.is_empty() {
                    tags.push(Tag {
                        name: name.to_string(),
                        body: body.to_string(),
                    });
                    continue;
                }
            }

            if let Some(tag) = tags.last_mut() {
                if !trimmed.is_empty() {
                    if !tag.body.is_empty() {
                        tag.body.push(' ');
                    }
                    tag.body.push_str(trimmed);
                }
                continue;
            }

            if trimmed.is_empty() {
                if paragraphs.last().is_some_and(|p| !p.is_empty()) {
                    paragraphs.push(Vec::new());
                }
            } else if let Some(current) = paragraphs.last_mut() {
                current.push(trimmed);
            }
        }

        let mut paragraphs = paragraphs
            .into_iter()
            .filter(|p| !p.is_empty())
            .map(|p| p.join("\n"));

        let summary = paragraphs.next().unwrap_or_default();
        let description = paragraphs.collect::<Vec<_>>().join("\n\n");

        DocBlock {
            summary,
            description,
            tags,
        }
    }

    /// All tags called `name` (without `@`), in source order.
    pub fn tags_named<'a, 'n>(
        &'a self,
        name: &'n str,
    ) -> impl Iterator<Item = &'a Tag> + use<'a, 'n> {
        self.tags.iter().filter(move |t| t.name == name)
    }

    /// Whether the block carries `@deprecated`.
    pub fn is_deprecated(&self) -> bool {
        self.tags_named("deprecated").next().is_some()
    }

    /// The type documented by `@param <type> $name`.
    ///
    /// `var_name` may be given with or without the `$` prefix.
    pub fn param_type(&self, var_name: &str) -> Option<&str> {
        let wanted = var_name.strip_prefix('$').unwrap_or(var_name);
        self.tags_named("param").find_map(|tag| {
            let (type_token, remainder) = split_type_token(&tag.body);
            if type_token.starts_with('$') {
                return None;
            }
            let name = remainder.split_whitespace().next()?;
            let name = name.trim_start_matches('&').trim_start_matches("...");
            (name.strip_prefix('$') == Some(wanted)).then(|| clean_type(type_token))
        })
    }

    /// The type documented by the first `@var <type> [$name]`.
    pub fn var_type(&self) -> Option<&str> {
        self.first_tag_type("var")
    }

    /// The type documented by `@return <type>`.
    pub fn return_type(&self) -> Option<&str> {
        self.first_tag_type("return")
    }

    fn first_tag_type(&self, name: &str) -> Option<&str> {
        self.tags_named(name).find_map(|tag| {
            let (type_token, _) = split_type_token(&tag.body);
            // Conditional return types `($x is Foo ? A : B)` are not
            // resolvable from text alone.
            if type_token.is_empty() || type_token.starts_with('$') || tag.body.starts_with("($")
            {
                return None;
            }
            Some(clean_type(type_token))
        })
    }
}

/// Find the doc comment attached to `node` and return its raw text.
///
/// Uses the program's trivia list to find the `/** ... */` comment that
/// immediately precedes the node.  Only whitespace and ordinary comments
/// may sit between the two.
pub(crate) fn docblock_text_for_node<'a>(
    trivia: &'a [Trivia<'a>],
    content: &str,
    node: &impl HasSpan,
) -> Option<&'a str> {
    let node_start = node.span().start.offset;
    let candidate_idx = trivia.partition_point(|t| t.span.start.offset < node_start);
    if candidate_idx == 0 {
        return None;
    }

    let content_bytes = content.as_bytes();
    let mut covered_from = node_start;

    for i in (0..candidate_idx).rev() {
        let t = &trivia[i];
        let t_end = t.span.end.offset;

        let gap = content_bytes
            .get(t_end as usize..covered_from as usize)
            .unwrap_or(&[]);
        if !gap.iter().all(u8::is_ascii_whitespace) {
            return None;
        }

        match t.kind {
            TriviaKind::DocBlockComment => return Some(t.value),
            TriviaKind::WhiteSpace
            | TriviaKind::SingleLineComment
            | TriviaKind::MultiLineComment
            | TriviaKind::HashComment => {
                covered_from = t.span.start.offset;
            }
        }
    }

    None
}

/// Remove inline HTML tags from documentation prose.
///
/// `<p>There are my docs</p>` → `There are my docs`.  A `<` that never
/// closes is kept verbatim.
pub fn strip_html_tags(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(open) = rest.find('<') {
        let after = &rest[open + 1..];
        let looks_like_tag = after
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '/' || c == '!');
        match after.find('>') {
            Some(close) if looks_like_tag => {
                out.push_str(&rest[..open]);
                rest = &after[close + 1..];
            }
            _ => {
                out.push_str(&rest[..=open]);
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_and_description_are_split_on_blank_line() {
        let doc = DocBlock::parse(
            "/**\n * This is my method\n *\n * It does things.\n * Many things.\n *\n * @param bool|string $foo\n */",
        );
        assert_eq!(doc.summary, "This is my method");
        assert_eq!(doc.description, "It does things.\nMany things.");
        assert_eq!(doc.tags.len(), 1);
        assert_eq!(doc.param_type("$foo"), Some("bool|string"));
    }

    #[test]
    fn single_line_docblock_has_only_a_tag() {
        let doc = DocBlock::parse("/** @var \\App\\User */");
        assert!(doc.summary.is_empty());
        assert_eq!(doc.var_type(), Some("App\\User"));
    }

    #[test]
    fn tag_continuation_lines_fold_into_body() {
        let doc = DocBlock::parse("/**\n * @deprecated use\n *   something else\n */");
        assert!(doc.is_deprecated());
        assert_eq!(doc.tags[0].body, "use something else");
    }

    #[test]
    fn tag_bodies_outlive_the_name_used_to_find_them() {
        let doc = DocBlock::parse("/**\n * @return int\n * @see Other\n */");
        let body = {
            let name = String::from("see");
            doc.tags_named(&name).next().map(|tag| tag.body.as_str())
        };
        assert_eq!(body, Some("Other"));
        assert_eq!(doc.return_type(), Some("int"));
    }

    #[test]
    fn param_without_type_is_ignored() {
        let doc = DocBlock::parse("/** @param $foo the foo */");
        assert_eq!(doc.param_type("foo"), None);
    }

    #[test]
    fn variadic_and_reference_params_match() {
        let doc = DocBlock::parse("/**\n * @param int ...$ids\n * @param array &$out\n */");
        assert_eq!(doc.param_type("ids"), Some("int"));
        assert_eq!(doc.param_type("$out"), Some("array"));
    }

    #[test]
    fn conditional_return_is_skipped() {
        let doc = DocBlock::parse("/** @return ($x is string ? int : bool) */");
        assert_eq!(doc.return_type(), None);
    }

    #[test]
    fn html_tags_are_stripped() {
        assert_eq!(strip_html_tags("<p>There are my docs</p>"), "There are my docs");
        assert_eq!(strip_html_tags("a < b"), "a < b");
        assert_eq!(strip_html_tags("x<br/>y"), "xy");
    }
}
