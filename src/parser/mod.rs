/// PHP parsing and AST extraction.
///
/// This module parses PHP source text with the mago_syntax parser and
/// copies what hover needs out of the arena-backed AST into the owned
/// symbol model: class-likes with their concrete members, free functions,
/// and the variable scope around a cursor offset.
///
/// Sub-modules:
/// - [`classes`]: Class, interface, trait, and enum extraction
/// - [`functions`]: Standalone function extraction
/// - [`imports`]: `use` imports and namespace-relative class names
/// - [`offset`]: Enclosing declaration and local variable scan
mod classes;
mod functions;
mod imports;
mod offset;

use std::borrow::Cow;

use bumpalo::Bump;
use mago_span::{HasSpan, Span};
use mago_syntax::ast::*;
use mago_syntax::error::ParseError;
use mago_syntax::parser::parse_file_content;
use mago_syntax::token::TokenKind;

use crate::docblock::{self, DocBlock};
use crate::error::ReflectionError;
use crate::php_type::Type;
use crate::type_resolver::TypeResolver;
use crate::types as model;

pub(crate) use offset::{Enclosing, ScopeScan};

/// A class-like together with its parsed doc comment, which member
/// providers still need after extraction.
#[derive(Debug, Clone)]
pub(crate) struct ParsedClass {
    pub class: model::ClassLike,
    pub docblock: DocBlock,
}

/// Everything extracted from one source text.
#[derive(Debug, Clone, Default)]
pub(crate) struct ParsedFile {
    pub classes: Vec<ParsedClass>,
    pub functions: Vec<model::Function>,
}

/// Context for resolving PHPDoc type annotations from docblock comments.
///
/// Bundles the program's trivia (comments/whitespace) and the raw source
/// text so that extraction functions can look up the `/** ... */` comment
/// preceding any AST node.
pub(crate) struct DocblockCtx<'a> {
    pub trivias: &'a [Trivia<'a>],
    pub content: &'a str,
}

/// Walks one parsed program and builds owned model values.
pub(crate) struct Extractor<'a> {
    ctx: DocblockCtx<'a>,
    resolver: &'a TypeResolver,
}

/// Parse `content` and extract every class-like and function declaration.
///
/// The parser recovers from syntax errors on its own; the only failure is
/// a parser panic, which is caught and reported as
/// [`ReflectionError::Parse`].
pub(crate) fn parse_source(
    content: &str,
    resolver: &TypeResolver,
) -> Result<ParsedFile, ReflectionError> {
    // Wrap in catch_unwind so a mago-syntax parser panic surfaces as an
    // error instead of taking the caller down with it.
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        let arena = Bump::new();
        let parsed = parse_repaired(&arena, content);

        let extractor = Extractor {
            ctx: DocblockCtx {
                trivias: parsed.program.trivia.as_slice(),
                content: &parsed.text,
            },
            resolver,
        };

        let mut file = ParsedFile::default();
        extractor.extract_classes_from_statements(
            parsed.program.statements.iter(),
            None,
            &mut file.classes,
        );
        extractor.extract_functions_from_statements(
            parsed.program.statements.iter(),
            None,
            &mut file.functions,
        );
        file
    }));

    result.map_err(|panic| parse_panic("parse_source", panic))
}

/// Parse `content` and scan the scope around `offset`.
pub(crate) fn scan_offset(
    content: &str,
    offset: u32,
    resolver: &TypeResolver,
) -> Result<ScopeScan, ReflectionError> {
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        let arena = Bump::new();
        let parsed = parse_repaired(&arena, content);
        let offset = parsed.shifted(offset);

        let extractor = Extractor {
            ctx: DocblockCtx {
                trivias: parsed.program.trivia.as_slice(),
                content: &parsed.text,
            },
            resolver,
        };
        extractor.scan_scope(parsed.program.statements.iter(), offset)
    }));

    result.map_err(|panic| parse_panic("scan_offset", panic))
}

/// A program parsed from `text`, which is the caller's source with a `;`
/// inserted at each of `inserted` (ascending byte positions).
struct Repaired<'arena, 'c> {
    program: &'arena Program<'arena>,
    text: Cow<'c, str>,
    inserted: Vec<usize>,
}

impl Repaired<'_, '_> {
    /// Map an offset in the original source onto `text`.
    fn shifted(&self, offset: u32) -> u32 {
        let before = self.inserted.iter().filter(|&&p| p <= offset as usize).count();
        offset + before as u32
    }
}

/// Parse `content`.  The parser drops a method whose header is not
/// followed by `;` or a body (`abstract function foo()` then `}`), so such
/// headers are terminated and the source is parsed again.  Both the
/// class-like and the offset scan go through here, so spans from either
/// refer to the same text.
fn parse_repaired<'arena, 'c>(arena: &'arena Bump, content: &'c str) -> Repaired<'arena, 'c> {
    let file_id = mago_database::file::FileId::new("input.php");
    let program = parse_file_content(arena, file_id, content);
    let inserted = bodyless_method_headers(content, &program.errors);
    if inserted.is_empty() {
        return Repaired {
            program,
            text: Cow::Borrowed(content),
            inserted,
        };
    }

    tracing::debug!("terminating {} method header(s) without a body", inserted.len());
    let mut text = String::with_capacity(content.len() + inserted.len());
    let mut last = 0;
    for &position in &inserted {
        text.push_str(&content[last..position]);
        text.push(';');
        last = position;
    }
    text.push_str(&content[last..]);

    Repaired {
        program: parse_file_content(arena, file_id, &text),
        text: Cow::Owned(text),
        inserted,
    }
}

/// Byte positions right after each `function` header that the parser
/// expected a `{` for.
fn bodyless_method_headers(content: &str, errors: &[ParseError]) -> Vec<usize> {
    let mut positions: Vec<usize> = errors
        .iter()
        .filter_map(|error| {
            let ParseError::UnexpectedToken(expected, _, span) = error else {
                return None;
            };
            if !matches!(&**expected, [TokenKind::LeftBrace]) {
                return None;
            }
            let before = content.get(..span.start.offset as usize)?;
            let header_start = before.rfind(['{', '}', ';']).map_or(0, |i| i + 1);
            let header = before[header_start..].trim_end();
            let ends_signature = header
                .ends_with(|c: char| c == ')' || c == '_' || c == '\\' || c.is_alphanumeric());
            (header.contains("function") && ends_signature).then_some(header_start + header.len())
        })
        .collect();
    positions.sort_unstable();
    positions.dedup();
    positions
}

fn parse_panic(context: &str, panic: Box<dyn std::any::Any + Send>) -> ReflectionError {
    let message = panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "parser panicked".to_string());
    tracing::error!("parser panicked in {context}: {message}");
    ReflectionError::Parse(message)
}

impl<'a> Extractor<'a> {
    /// Source text covered by `span`.
    pub(crate) fn text(&self, span: Span) -> &'a str {
        self.ctx
            .content
            .get(span.start.offset as usize..span.end.offset as usize)
            .unwrap_or("")
    }

    /// The parsed doc comment attached to `node`, if there is one.
    pub(crate) fn docblock_for(&self, node: &impl HasSpan) -> Option<DocBlock> {
        docblock::docblock_text_for_node(self.ctx.trivias, self.ctx.content, node)
            .map(DocBlock::parse)
    }

    /// Extract visibility from a set of modifiers.
    /// Defaults to `Public` if no visibility modifier is present.
    pub(crate) fn visibility<'m>(
        modifiers: impl Iterator<Item = &'m Modifier<'m>>,
    ) -> model::Visibility {
        for m in modifiers {
            if m.is_private() {
                return model::Visibility::Private;
            }
            if m.is_protected() {
                return model::Visibility::Protected;
            }
            if m.is_public() {
                return model::Visibility::Public;
            }
        }
        model::Visibility::Public
    }

    /// Extract parameters, typing each from its native hint and the
    /// matching `@param` tag of `doc`.
    pub(crate) fn parameters(
        &self,
        parameter_list: &FunctionLikeParameterList,
        doc: Option<&DocBlock>,
    ) -> Vec<model::Parameter> {
        parameter_list
            .parameters
            .iter()
            .map(|param| {
                let raw_name = param.variable.name;
                let native = param.hint.as_ref().map(|h| self.text(h.span()));
                let documented = doc.and_then(|d| d.param_type(raw_name));
                let default = param
                    .default_value
                    .as_ref()
                    .map(|d| self.text(d.value.span()).to_string());

                model::Parameter {
                    name: raw_name.trim_start_matches('$').to_string(),
                    ty: self.resolver.resolve_declared(native, documented),
                    has_default: default.is_some(),
                    default,
                    is_variadic: param.ellipsis.is_some(),
                    is_reference: param.ampersand.is_some(),
                }
            })
            .collect()
    }

    /// Best-effort type of a value expression, without evaluating it.
    ///
    /// `locals` lets a plain variable copy the type of an earlier binding.
    pub(crate) fn infer_expression_type(
        &self,
        expr: &Expression,
        locals: Option<&indexmap::IndexMap<String, Type>>,
    ) -> Type {
        match expr {
            Expression::Literal(literal) => match literal {
                Literal::String(_) => Type::scalar("string"),
                Literal::Integer(_) => Type::scalar("int"),
                Literal::Float(_) => Type::scalar("float"),
                Literal::True(_) | Literal::False(_) => Type::scalar("bool"),
                Literal::Null(_) => Type::scalar("null"),
                #[allow(unreachable_patterns)]
                _ => Type::Unknown,
            },
            Expression::Array(_) | Expression::LegacyArray(_) => Type::scalar("array"),
            Expression::Instantiation(inst) => match inst.class {
                Expression::Identifier(ident) => Type::class(ident.value()),
                _ => Type::Unknown,
            },
            Expression::Closure(_) | Expression::ArrowFunction(_) => Type::class("Closure"),
            Expression::Parenthesized(inner) => self.infer_expression_type(inner.expression, locals),
            Expression::Assignment(assignment) => {
                self.infer_expression_type(assignment.rhs, locals)
            }
            Expression::Variable(Variable::Direct(dv)) => locals
                .and_then(|l| l.get(dv.name.trim_start_matches('$')))
                .cloned()
                .unwrap_or(Type::Unknown),
            _ => Type::Unknown,
        }
    }
}
