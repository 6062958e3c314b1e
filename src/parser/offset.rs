/// Scope scanning at a cursor offset.
///
/// Finds the innermost declaration (class-like, method or function) that
/// contains the offset and collects the local variables bound before it,
/// respecting PHP scoping rules:
///   - parameters are only visible inside their function or method body,
///   - `$this` is only visible inside non-static methods,
///   - a closure starts a fresh scope seeded with its `use` variables,
///   - an arrow function sees its parent scope plus its own parameters.
///
/// Assignments are visited in source order, so a later assignment to the
/// same variable overwrites the type recorded for it.
use indexmap::IndexMap;
use mago_span::{HasSpan, Span};
use mago_syntax::ast::*;

use crate::docblock::DocBlock;
use crate::php_type::Type;
use crate::types::qualify;

use super::Extractor;
use super::imports::Imports;

/// Which declaration contains the offset.  Class-likes are identified by
/// the offset of their opening brace, which is unique within a source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Enclosing {
    ClassLike {
        start_offset: u32,
    },
    Method {
        class_start_offset: u32,
        name: String,
    },
    Function {
        name: String,
        namespace: Option<String>,
    },
}

#[derive(Debug, Clone, Default)]
pub(crate) struct ScopeScan {
    pub enclosing: Option<Enclosing>,
    /// Variable name (without `$`) to the type of its latest binding.
    pub locals: IndexMap<String, Type>,
    /// Set once the offset was found inside a closure or arrow function;
    /// nothing after that point belongs to the scope.
    closed: bool,
    imports: Imports,
    /// Fully qualified name of the enclosing class-like, for `new self`.
    class_fqn: Option<String>,
}

/// Whether `offset` lies within the declaration covered by `span`.
fn encloses(span: Span, offset: u32) -> bool {
    span.start.offset <= offset && offset < span.end.offset
}

/// Whether `offset` lies between a body's braces.
fn inside_body(left_brace: Span, right_brace: Span, offset: u32) -> bool {
    offset >= left_brace.end.offset && offset <= right_brace.start.offset
}

impl<'a> Extractor<'a> {
    /// Walk top-level statements to find the scope enclosing `offset`,
    /// then collect the variables bound in that scope.
    pub(crate) fn scan_scope<'s>(
        &self,
        statements: impl Iterator<Item = &'s Statement<'s>>,
        offset: u32,
    ) -> ScopeScan {
        let mut scan = ScopeScan::default();
        self.find_scope(statements, offset, None, &mut scan);
        tracing::debug!(
            "offset {offset}: enclosing {:?}, {} locals",
            scan.enclosing,
            scan.locals.len()
        );
        scan
    }

    fn find_scope<'s>(
        &self,
        statements: impl Iterator<Item = &'s Statement<'s>>,
        offset: u32,
        namespace: Option<&str>,
        scan: &mut ScopeScan,
    ) {
        let stmts: Vec<&Statement> = statements.collect();
        scan.imports = Imports::new(namespace);
        scan.imports.collect(stmts.iter().copied());

        // First pass: check if the offset is inside a declaration.
        for &stmt in &stmts {
            if let Statement::Namespace(ns) = stmt
                && encloses(ns.span(), offset)
            {
                let ns_name = ns.name.as_ref().map(|ident| ident.value().to_string());
                let effective = ns_name.as_deref().filter(|s| !s.is_empty()).or(namespace);
                self.find_scope(ns.statements().iter(), offset, effective, scan);
                return;
            }
            if self.enter_declaration(stmt, offset, namespace, scan) {
                return;
            }
        }

        // The span of an unbraced namespace (`namespace Foo;`) may stop
        // short of trailing whitespace at EOF.  Recurse into the last
        // namespace so variables declared inside it are still visible.
        if let Some(&Statement::Namespace(ns)) = stmts.last()
            && offset >= ns.span().end.offset
        {
            let ns_name = ns.name.as_ref().map(|ident| ident.value().to_string());
            let effective = ns_name.as_deref().filter(|s| !s.is_empty()).or(namespace);
            self.find_scope(ns.statements().iter(), offset, effective, scan);
            return;
        }

        // Top-level code.
        self.collect_from_statements(stmts.into_iter(), offset, scan);
    }

    /// Enter the class-like or function declared by `stmt` if it contains
    /// `offset`.  Returns whether it did.
    fn enter_declaration(
        &self,
        stmt: &Statement,
        offset: u32,
        namespace: Option<&str>,
        scan: &mut ScopeScan,
    ) -> bool {
        if !encloses(stmt.span(), offset) {
            return false;
        }
        match stmt {
            Statement::Class(class) => {
                let fqn = qualify(namespace, class.name.value);
                let start = class.left_brace.start.offset;
                self.scan_class_members(class.members.iter(), start, &fqn, offset, scan);
            }
            Statement::Interface(iface) => {
                let fqn = qualify(namespace, iface.name.value);
                let start = iface.left_brace.start.offset;
                self.scan_class_members(iface.members.iter(), start, &fqn, offset, scan);
            }
            Statement::Trait(trait_def) => {
                let fqn = qualify(namespace, trait_def.name.value);
                let start = trait_def.left_brace.start.offset;
                self.scan_class_members(trait_def.members.iter(), start, &fqn, offset, scan);
            }
            Statement::Enum(enum_def) => {
                let fqn = qualify(namespace, enum_def.name.value);
                let start = enum_def.left_brace.start.offset;
                self.scan_class_members(enum_def.members.iter(), start, &fqn, offset, scan);
            }
            Statement::Function(func) => {
                scan.enclosing = Some(Enclosing::Function {
                    name: func.name.value.to_string(),
                    namespace: namespace.map(str::to_string),
                });
                if inside_body(func.body.left_brace, func.body.right_brace, offset) {
                    let doc = self.docblock_for(func);
                    self.bind_parameters(&func.parameter_list, doc.as_ref(), scan);
                    self.collect_from_statements(func.body.statements.iter(), offset, scan);
                }
            }
            _ => return false,
        }
        true
    }

    /// Find the method containing `offset`, if any, and collect its scope.
    /// Outside every method the class-like itself is the enclosing symbol
    /// and no variables are in scope.
    fn scan_class_members<'s>(
        &self,
        members: impl Iterator<Item = &'s ClassLikeMember<'s>>,
        class_start_offset: u32,
        class_fqn: &str,
        offset: u32,
        scan: &mut ScopeScan,
    ) {
        scan.enclosing = Some(Enclosing::ClassLike {
            start_offset: class_start_offset,
        });
        scan.class_fqn = Some(class_fqn.to_string());

        for member in members {
            let ClassLikeMember::Method(method) = member else {
                continue;
            };
            if !encloses(method.span(), offset) {
                continue;
            }

            scan.enclosing = Some(Enclosing::Method {
                class_start_offset,
                name: method.name.value.to_string(),
            });

            if let MethodBody::Concrete(block) = &method.body
                && inside_body(block.left_brace, block.right_brace, offset)
            {
                let is_static = method
                    .modifiers
                    .iter()
                    .any(|m| matches!(m, Modifier::Static(_)));
                if !is_static {
                    scan.locals.insert("this".to_string(), Type::class(class_fqn));
                }
                let doc = self.docblock_for(method);
                self.bind_parameters(&method.parameter_list, doc.as_ref(), scan);
                self.collect_from_statements(block.statements.iter(), offset, scan);
            }
            return;
        }
    }

    /// Bind parameters typed from their hints and `@param` tags.  Inside
    /// the body a variadic parameter is an array of its declared type.
    fn bind_parameters(
        &self,
        params: &FunctionLikeParameterList,
        doc: Option<&DocBlock>,
        scan: &mut ScopeScan,
    ) {
        for param in self.parameters(params, doc) {
            let ty = if param.is_variadic {
                match param.ty {
                    Type::Unknown => Type::scalar("array"),
                    ty => Type::array_of(ty),
                }
            } else {
                param.ty
            };
            scan.locals.insert(param.name, ty);
        }
    }

    /// Walk statements within a scope collecting variable bindings.
    ///
    /// Only bindings completed before the offset are recorded.
    fn collect_from_statements<'s>(
        &self,
        statements: impl Iterator<Item = &'s Statement<'s>>,
        offset: u32,
        scan: &mut ScopeScan,
    ) {
        for stmt in statements {
            if scan.closed || stmt.span().start.offset > offset {
                return;
            }

            match stmt {
                Statement::Expression(expr_stmt) => {
                    self.collect_from_expression(expr_stmt.expression, offset, scan);
                }
                Statement::Block(block) => {
                    self.collect_from_statements(block.statements.iter(), offset, scan);
                }
                Statement::If(if_stmt) => {
                    self.collect_from_expression(if_stmt.condition, offset, scan);
                    match &if_stmt.body {
                        IfBody::Statement(body) => {
                            self.collect_from_statement(body.statement, offset, scan);
                            for else_if in body.else_if_clauses.iter() {
                                self.collect_from_expression(else_if.condition, offset, scan);
                                self.collect_from_statement(else_if.statement, offset, scan);
                            }
                            if let Some(else_clause) = &body.else_clause {
                                self.collect_from_statement(else_clause.statement, offset, scan);
                            }
                        }
                        IfBody::ColonDelimited(body) => {
                            self.collect_from_statements(body.statements.iter(), offset, scan);
                            for else_if in body.else_if_clauses.iter() {
                                self.collect_from_expression(else_if.condition, offset, scan);
                                self.collect_from_statements(
                                    else_if.statements.iter(),
                                    offset,
                                    scan,
                                );
                            }
                            if let Some(else_clause) = &body.else_clause {
                                self.collect_from_statements(
                                    else_clause.statements.iter(),
                                    offset,
                                    scan,
                                );
                            }
                        }
                    }
                }
                Statement::Foreach(foreach) => {
                    self.collect_from_expression(foreach.expression, offset, scan);
                    if scan.closed {
                        return;
                    }
                    let element = match self
                        .infer_expression_type(foreach.expression, Some(&scan.locals))
                    {
                        Type::ArrayOf(inner) => *inner,
                        _ => Type::Mixed,
                    };

                    // The iteration variables only exist inside the body, but
                    // assignments made in the body stay visible after the loop.
                    let body_span = foreach.body.span();
                    let in_body = offset >= body_span.start.offset && offset <= body_span.end.offset;
                    let mut targets = Vec::new();
                    if let Some(key_expr) = foreach.target.key() {
                        targets.push((key_expr, Type::Mixed));
                    }
                    targets.push((foreach.target.value(), element));
                    let shadowed: Vec<(String, Option<Type>)> = if in_body {
                        Vec::new()
                    } else {
                        targets
                            .iter()
                            .flat_map(|(target, _)| target_names(target))
                            .map(|name| {
                                let previous = scan.locals.get(&name).cloned();
                                (name, previous)
                            })
                            .collect()
                    };
                    for (target, ty) in targets {
                        self.bind_target(target, ty, scan);
                    }
                    for inner in foreach.body.statements() {
                        self.collect_from_statement(inner, offset, scan);
                    }
                    for (name, previous) in shadowed {
                        match previous {
                            Some(ty) => {
                                scan.locals.insert(name, ty);
                            }
                            None => {
                                scan.locals.shift_remove(&name);
                            }
                        }
                    }
                }
                Statement::For(for_stmt) => {
                    for init_expr in for_stmt.initializations.iter() {
                        self.collect_from_expression(init_expr, offset, scan);
                    }
                    match &for_stmt.body {
                        ForBody::Statement(inner) => {
                            self.collect_from_statement(inner, offset, scan);
                        }
                        ForBody::ColonDelimited(body) => {
                            self.collect_from_statements(body.statements.iter(), offset, scan);
                        }
                    }
                }
                Statement::While(while_stmt) => match &while_stmt.body {
                    WhileBody::Statement(inner) => {
                        self.collect_from_statement(inner, offset, scan);
                    }
                    WhileBody::ColonDelimited(body) => {
                        self.collect_from_statements(body.statements.iter(), offset, scan);
                    }
                },
                Statement::DoWhile(dw) => {
                    self.collect_from_statement(dw.statement, offset, scan);
                }
                Statement::Try(try_stmt) => {
                    self.collect_from_statements(try_stmt.block.statements.iter(), offset, scan);
                    for catch in try_stmt.catch_clauses.iter() {
                        if catch.span().start.offset > offset {
                            break;
                        }
                        if let Some(ref var) = catch.variable {
                            let caught = self.resolver.resolve(self.text(catch.hint.span()));
                            scan.locals
                                .insert(var.name.trim_start_matches('$').to_string(), caught);
                        }
                        self.collect_from_statements(catch.block.statements.iter(), offset, scan);
                    }
                    if let Some(finally) = &try_stmt.finally_clause
                        && finally.span().start.offset <= offset
                    {
                        self.collect_from_statements(finally.block.statements.iter(), offset, scan);
                    }
                }
                Statement::Global(global) => {
                    for var in global.variables.iter() {
                        if let Variable::Direct(dv) = var {
                            scan.locals
                                .insert(dv.name.trim_start_matches('$').to_string(), Type::Mixed);
                        }
                    }
                }
                Statement::Static(static_stmt) => {
                    for item in static_stmt.items.iter() {
                        let name = item.variable().name.trim_start_matches('$').to_string();
                        scan.locals.entry(name).or_insert(Type::Mixed);
                    }
                }
                Statement::Return(ret) => {
                    if let Some(expr) = ret.value {
                        self.collect_from_expression(expr, offset, scan);
                    }
                }
                Statement::Echo(echo) => {
                    for expr in echo.values.iter() {
                        self.collect_from_expression(expr, offset, scan);
                    }
                }
                Statement::Switch(switch) => {
                    self.collect_from_expression(switch.expression, offset, scan);
                    match &switch.body {
                        SwitchBody::BraceDelimited(body) => {
                            for case in body.cases.iter() {
                                self.collect_from_statements(case.statements().iter(), offset, scan);
                            }
                        }
                        SwitchBody::ColonDelimited(body) => {
                            for case in body.cases.iter() {
                                self.collect_from_statements(case.statements().iter(), offset, scan);
                            }
                        }
                    }
                }
                // Declarations nested in blocks (`if (!class_exists(..))`)
                // have their own scope.
                Statement::Class(_)
                | Statement::Interface(_)
                | Statement::Trait(_)
                | Statement::Enum(_)
                | Statement::Function(_)
                    if encloses(stmt.span(), offset) =>
                {
                    let namespace = scan.imports.namespace().map(str::to_string);
                    scan.locals.clear();
                    self.enter_declaration(stmt, offset, namespace.as_deref(), scan);
                    scan.closed = true;
                }
                _ => {}
            }
        }
    }

    fn collect_from_statement<'s>(
        &self,
        stmt: &'s Statement<'s>,
        offset: u32,
        scan: &mut ScopeScan,
    ) {
        self.collect_from_statements(std::iter::once(stmt), offset, scan);
    }

    /// Record assignments and enter closures that contain the offset.
    fn collect_from_expression(&self, expr: &Expression, offset: u32, scan: &mut ScopeScan) {
        if scan.closed {
            return;
        }

        match expr {
            Expression::Assignment(assignment) => {
                // `$a = $b = 1` binds `$b` first.
                self.collect_from_expression(assignment.rhs, offset, scan);
                if scan.closed || assignment.span().end.offset > offset {
                    return;
                }
                let ty = self.infer_local_type(assignment.rhs, scan);
                self.bind_target(assignment.lhs, ty, scan);
            }
            Expression::Parenthesized(inner) => {
                self.collect_from_expression(inner.expression, offset, scan);
            }
            Expression::Closure(closure) => {
                if !inside_body(closure.body.left_brace, closure.body.right_brace, offset) {
                    return;
                }
                // A closure sees only its `use` variables and parameters.
                let outer = std::mem::take(&mut scan.locals);
                if let Some(ref use_clause) = closure.use_clause {
                    for use_var in use_clause.variables.iter() {
                        let name = use_var.variable.name.trim_start_matches('$');
                        let ty = outer.get(name).cloned().unwrap_or(Type::Unknown);
                        scan.locals.insert(name.to_string(), ty);
                    }
                }
                self.bind_parameters(&closure.parameter_list, None, scan);
                self.collect_from_statements(closure.body.statements.iter(), offset, scan);
                scan.closed = true;
            }
            Expression::ArrowFunction(arrow) => {
                if !encloses(arrow.span(), offset) {
                    return;
                }
                self.bind_parameters(&arrow.parameter_list, None, scan);
                self.collect_from_expression(arrow.expression, offset, scan);
                scan.closed = true;
            }
            Expression::Call(call) => {
                let arguments = match call {
                    Call::Function(c) => {
                        self.collect_from_expression(c.function, offset, scan);
                        &c.argument_list
                    }
                    Call::Method(c) => {
                        self.collect_from_expression(c.object, offset, scan);
                        &c.argument_list
                    }
                    Call::NullSafeMethod(c) => {
                        self.collect_from_expression(c.object, offset, scan);
                        &c.argument_list
                    }
                    Call::StaticMethod(c) => {
                        self.collect_from_expression(c.class, offset, scan);
                        &c.argument_list
                    }
                };
                self.collect_from_arguments(arguments, offset, scan);
            }
            Expression::Instantiation(instantiation) => {
                if let Some(arguments) = &instantiation.argument_list {
                    self.collect_from_arguments(arguments, offset, scan);
                }
            }
            Expression::Array(array) => {
                self.collect_from_array_elements(array.elements.iter(), offset, scan);
            }
            Expression::LegacyArray(array) => {
                self.collect_from_array_elements(array.elements.iter(), offset, scan);
            }
            Expression::Binary(binary) => {
                self.collect_from_expression(binary.lhs, offset, scan);
                self.collect_from_expression(binary.rhs, offset, scan);
            }
            Expression::Conditional(conditional) => {
                self.collect_from_expression(conditional.condition, offset, scan);
                if let Some(then) = conditional.then {
                    self.collect_from_expression(then, offset, scan);
                }
                self.collect_from_expression(conditional.r#else, offset, scan);
            }
            Expression::UnaryPrefix(unary) => {
                self.collect_from_expression(unary.operand, offset, scan);
            }
            Expression::Throw(throw) => {
                self.collect_from_expression(throw.exception, offset, scan);
            }
            _ => {}
        }
    }

    fn collect_from_arguments(&self, arguments: &ArgumentList, offset: u32, scan: &mut ScopeScan) {
        for argument in arguments.arguments.iter() {
            self.collect_from_expression(argument.value(), offset, scan);
        }
    }

    fn collect_from_array_elements<'s>(
        &self,
        elements: impl Iterator<Item = &'s ArrayElement<'s>>,
        offset: u32,
        scan: &mut ScopeScan,
    ) {
        for element in elements {
            match element {
                ArrayElement::KeyValue(kv) => {
                    self.collect_from_expression(kv.key, offset, scan);
                    self.collect_from_expression(kv.value, offset, scan);
                }
                ArrayElement::Value(val) => self.collect_from_expression(val.value, offset, scan),
                ArrayElement::Variadic(variadic) => {
                    self.collect_from_expression(variadic.value, offset, scan);
                }
                ArrayElement::Missing(_) => {}
            }
        }
    }

    /// Type of an assigned value.  Instantiated class names are resolved
    /// against the imports and namespace of the scope.
    fn infer_local_type(&self, expr: &Expression, scan: &ScopeScan) -> Type {
        match expr {
            Expression::Instantiation(inst) => match inst.class {
                Expression::Identifier(ident) if ident.is_fully_qualified() => {
                    Type::class(ident.value().trim_start_matches('\\'))
                }
                Expression::Identifier(ident) => {
                    Type::class(scan.imports.resolve_class(ident.value()))
                }
                Expression::Self_(_) | Expression::Static(_) => {
                    scan.class_fqn.as_deref().map_or(Type::Unknown, Type::class)
                }
                _ => Type::Unknown,
            },
            Expression::Parenthesized(inner) => self.infer_local_type(inner.expression, scan),
            Expression::Assignment(assignment) => self.infer_local_type(assignment.rhs, scan),
            _ => self.infer_expression_type(expr, Some(&scan.locals)),
        }
    }

    /// Bind the variables on the left of an assignment (or a foreach
    /// target).  Destructured elements cannot be typed and become `mixed`.
    fn bind_target(&self, target: &Expression, ty: Type, scan: &mut ScopeScan) {
        match target {
            Expression::Variable(Variable::Direct(dv)) => {
                scan.locals
                    .insert(dv.name.trim_start_matches('$').to_string(), ty);
            }
            Expression::List(list) => {
                for element in list.elements.iter() {
                    self.bind_array_element(element, scan);
                }
            }
            Expression::Array(array) => {
                for element in array.elements.iter() {
                    self.bind_array_element(element, scan);
                }
            }
            _ => {}
        }
    }

    fn bind_array_element(&self, element: &ArrayElement, scan: &mut ScopeScan) {
        match element {
            ArrayElement::KeyValue(kv) => self.bind_target(kv.value, Type::Mixed, scan),
            ArrayElement::Value(val) => self.bind_target(val.value, Type::Mixed, scan),
            _ => {}
        }
    }
}

/// Names of the plain variables a foreach target binds.
fn target_names(target: &Expression) -> Vec<String> {
    let elements = match target {
        Expression::Variable(Variable::Direct(dv)) => {
            return vec![dv.name.trim_start_matches('$').to_string()];
        }
        Expression::List(list) => list.elements.iter().collect::<Vec<_>>(),
        Expression::Array(array) => array.elements.iter().collect::<Vec<_>>(),
        _ => return Vec::new(),
    };
    elements
        .into_iter()
        .flat_map(|element| match element {
            ArrayElement::KeyValue(kv) => target_names(kv.value),
            ArrayElement::Value(val) => target_names(val.value),
            _ => Vec::new(),
        })
        .collect()
}
