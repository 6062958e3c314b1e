/// Standalone function extraction.
///
/// Free functions are collected from the top level, from namespace
/// bodies, and from `{ ... }` / `if` blocks, which is where polyfills
/// conventionally declare them (`if (!function_exists('foo')) { ... }`).
use mago_syntax::ast::*;
use mago_span::HasSpan;

use crate::types::{self as model, Documentation};

use super::Extractor;

impl<'a> Extractor<'a> {
    /// Reflect every free function in `statements`, tagging each with the
    /// namespace it is declared in.
    pub(crate) fn extract_functions_from_statements<'s>(
        &self,
        statements: impl Iterator<Item = &'s Statement<'s>>,
        namespace: Option<&str>,
        functions: &mut Vec<model::Function>,
    ) {
        for statement in statements {
            match statement {
                Statement::Function(func) => {
                    let doc = self.docblock_for(func);
                    let native_return = func
                        .return_type_hint
                        .as_ref()
                        .map(|rth| self.text(rth.hint.span()));

                    functions.push(model::Function {
                        name: func.name.value.to_string(),
                        namespace: namespace.map(str::to_string),
                        parameters: self.parameters(&func.parameter_list, doc.as_ref()),
                        return_type: self.resolver.resolve_declared(
                            native_return,
                            doc.as_ref().and_then(|d| d.return_type()),
                        ),
                        docs: doc.as_ref().map(Documentation::from_docblock).unwrap_or_default(),
                    });
                }
                Statement::Namespace(ns) => {
                    let ns_name = ns
                        .name
                        .as_ref()
                        .map(|ident| ident.value().to_string())
                        .filter(|s| !s.is_empty());
                    let effective = ns_name.as_deref().or(namespace);
                    self.extract_functions_from_statements(
                        ns.statements().iter(),
                        effective,
                        functions,
                    );
                }
                Statement::Block(block) => {
                    self.extract_functions_from_statements(
                        block.statements.iter(),
                        namespace,
                        functions,
                    );
                }
                Statement::If(if_stmt) => {
                    self.extract_functions_from_if_body(&if_stmt.body, namespace, functions);
                }
                _ => {}
            }
        }
    }

    /// Every branch of an `if`, in either brace or colon syntax.
    fn extract_functions_from_if_body<'s>(
        &self,
        body: &'s IfBody<'s>,
        namespace: Option<&str>,
        functions: &mut Vec<model::Function>,
    ) {
        match body {
            IfBody::Statement(body) => {
                self.extract_functions_from_statements(
                    std::iter::once(body.statement),
                    namespace,
                    functions,
                );
                for else_if in body.else_if_clauses.iter() {
                    self.extract_functions_from_statements(
                        std::iter::once(else_if.statement),
                        namespace,
                        functions,
                    );
                }
                if let Some(else_clause) = &body.else_clause {
                    self.extract_functions_from_statements(
                        std::iter::once(else_clause.statement),
                        namespace,
                        functions,
                    );
                }
            }
            IfBody::ColonDelimited(body) => {
                self.extract_functions_from_statements(body.statements.iter(), namespace, functions);
                for else_if in body.else_if_clauses.iter() {
                    self.extract_functions_from_statements(
                        else_if.statements.iter(),
                        namespace,
                        functions,
                    );
                }
                if let Some(else_clause) = &body.else_clause {
                    self.extract_functions_from_statements(
                        else_clause.statements.iter(),
                        namespace,
                        functions,
                    );
                }
            }
        }
    }
}
