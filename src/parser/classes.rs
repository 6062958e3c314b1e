/// Class, interface, trait, and enum extraction.
///
/// Each class-like declaration becomes a [`model::ClassLike`] carrying its
/// concrete members only.  Virtual members from docblock tags are added
/// later by the reflector's member providers, which is why the parsed
/// class-level [`DocBlock`] travels alongside it in [`ParsedClass`].
use mago_span::HasSpan;
use mago_syntax::ast::*;

use crate::docblock::DocBlock;
use crate::php_type::Type;
use crate::types::{self as model, ClassLikeKind, Collection, Documentation, Supertype};

use super::{Extractor, ParsedClass};

/// The declaration-level facts that differ between class-like kinds.
struct Header<'h> {
    kind: ClassLikeKind,
    name: String,
    namespace: Option<&'h str>,
    extends: Vec<String>,
    implements: Vec<String>,
    is_abstract: bool,
    is_final: bool,
    start_offset: u32,
    end_offset: u32,
}

/// Concrete members of one class-like body, in declaration order.
#[derive(Default)]
struct Members {
    methods: Collection<model::Method>,
    properties: Collection<model::Property>,
    constants: Collection<model::Constant>,
    traits: Vec<Supertype>,
}

impl<'a> Extractor<'a> {
    /// Recursively walk statements and extract class-like declarations.
    /// This handles declarations at the top level as well as those nested
    /// inside namespace declarations, plain blocks and `if` branches.
    pub(crate) fn extract_classes_from_statements<'s>(
        &self,
        statements: impl Iterator<Item = &'s Statement<'s>>,
        namespace: Option<&str>,
        classes: &mut Vec<ParsedClass>,
    ) {
        for statement in statements {
            match statement {
                Statement::Class(class) => {
                    let header = Header {
                        kind: ClassLikeKind::Class,
                        name: class.name.value.to_string(),
                        namespace,
                        extends: class
                            .extends
                            .as_ref()
                            .map(|ext| ext.types.iter().map(|i| i.value().to_string()).collect())
                            .unwrap_or_default(),
                        implements: class
                            .implements
                            .as_ref()
                            .map(|imp| imp.types.iter().map(|i| i.value().to_string()).collect())
                            .unwrap_or_default(),
                        is_abstract: class.modifiers.contains_abstract(),
                        is_final: class.modifiers.contains_final(),
                        start_offset: class.left_brace.start.offset,
                        end_offset: class.right_brace.end.offset,
                    };
                    let members = self.extract_class_like_members(class.members.iter(), &header);
                    classes.push(self.build_class(header, members, class));
                }
                Statement::Interface(iface) => {
                    let header = Header {
                        kind: ClassLikeKind::Interface,
                        name: iface.name.value.to_string(),
                        namespace,
                        // Interfaces use `extends` for any number of parents.
                        extends: iface
                            .extends
                            .as_ref()
                            .map(|ext| ext.types.iter().map(|i| i.value().to_string()).collect())
                            .unwrap_or_default(),
                        implements: Vec::new(),
                        is_abstract: false,
                        is_final: false,
                        start_offset: iface.left_brace.start.offset,
                        end_offset: iface.right_brace.end.offset,
                    };
                    let members = self.extract_class_like_members(iface.members.iter(), &header);
                    classes.push(self.build_class(header, members, iface));
                }
                Statement::Trait(trait_def) => {
                    let header = Header {
                        kind: ClassLikeKind::Trait,
                        name: trait_def.name.value.to_string(),
                        namespace,
                        extends: Vec::new(),
                        implements: Vec::new(),
                        is_abstract: false,
                        is_final: false,
                        start_offset: trait_def.left_brace.start.offset,
                        end_offset: trait_def.right_brace.end.offset,
                    };
                    let members =
                        self.extract_class_like_members(trait_def.members.iter(), &header);
                    classes.push(self.build_class(header, members, trait_def));
                }
                Statement::Enum(enum_def) => {
                    let header = Header {
                        kind: ClassLikeKind::Enum,
                        name: enum_def.name.value.to_string(),
                        namespace,
                        extends: Vec::new(),
                        implements: enum_def
                            .implements
                            .as_ref()
                            .map(|imp| imp.types.iter().map(|i| i.value().to_string()).collect())
                            .unwrap_or_default(),
                        is_abstract: false,
                        // Enums are implicitly final and cannot be extended.
                        is_final: true,
                        start_offset: enum_def.left_brace.start.offset,
                        end_offset: enum_def.right_brace.end.offset,
                    };
                    let members =
                        self.extract_class_like_members(enum_def.members.iter(), &header);
                    classes.push(self.build_class(header, members, enum_def));
                }
                Statement::Namespace(ns) => {
                    let ns_name = ns
                        .name
                        .as_ref()
                        .map(|ident| ident.value().to_string())
                        .filter(|s| !s.is_empty());
                    let effective = ns_name.as_deref().or(namespace);
                    self.extract_classes_from_statements(ns.statements().iter(), effective, classes);
                }
                Statement::Block(block) => {
                    self.extract_classes_from_statements(block.statements.iter(), namespace, classes);
                }
                Statement::If(if_stmt) => {
                    self.extract_classes_from_if_body(&if_stmt.body, namespace, classes);
                }
                _ => {}
            }
        }
    }

    /// Class-likes declared conditionally, e.g. behind `class_exists()`.
    fn extract_classes_from_if_body<'s>(
        &self,
        body: &'s IfBody<'s>,
        namespace: Option<&str>,
        classes: &mut Vec<ParsedClass>,
    ) {
        match body {
            IfBody::Statement(body) => {
                let branches = std::iter::once(body.statement)
                    .chain(body.else_if_clauses.iter().map(|clause| clause.statement))
                    .chain(body.else_clause.iter().map(|clause| clause.statement));
                self.extract_classes_from_statements(branches, namespace, classes);
            }
            IfBody::ColonDelimited(body) => {
                let branches = body
                    .statements
                    .iter()
                    .chain(body.else_if_clauses.iter().flat_map(|clause| clause.statements.iter()))
                    .chain(body.else_clause.iter().flat_map(|clause| clause.statements.iter()));
                self.extract_classes_from_statements(branches, namespace, classes);
            }
        }
    }

    fn build_class(&self, header: Header<'_>, members: Members, node: &impl HasSpan) -> ParsedClass {
        let docblock = self.docblock_for(node).unwrap_or_default();
        let class = model::ClassLike {
            kind: header.kind,
            name: header.name,
            namespace: header.namespace.map(str::to_string),
            is_abstract: header.is_abstract,
            is_final: header.is_final,
            extends: header.extends.into_iter().map(Supertype::unresolved).collect(),
            implements: header
                .implements
                .into_iter()
                .map(Supertype::unresolved)
                .collect(),
            traits: members.traits,
            methods: members.methods,
            properties: members.properties,
            constants: members.constants,
            docs: Documentation::from_docblock(&docblock),
            start_offset: header.start_offset,
            end_offset: header.end_offset,
        };
        tracing::debug!(
            "extracted {} {} ({} methods, {} properties, {} constants)",
            class.kind,
            class.name,
            class.methods.len(),
            class.properties.len(),
            class.constants.len()
        );
        ParsedClass { class, docblock }
    }

    /// Extract methods, properties, constants, and used trait names from
    /// class-like members.
    ///
    /// PHPDoc `@param`, `@return` and `@var` tags refine (or supply) the
    /// types of the members they document.
    fn extract_class_like_members<'s>(
        &self,
        members: impl Iterator<Item = &'s ClassLikeMember<'s>>,
        header: &Header<'_>,
    ) -> Members {
        let class_name = header.name.as_str();
        let mut out = Members::default();

        for member in members {
            match member {
                ClassLikeMember::Method(method) => {
                    let doc = self.docblock_for(method);
                    let name = method.name.value.to_string();
                    let parameters = self.parameters(&method.parameter_list, doc.as_ref());
                    let native_return = method
                        .return_type_hint
                        .as_ref()
                        .map(|rth| self.text(rth.hint.span()));
                    let return_type = self.resolver.resolve_declared(
                        native_return,
                        doc.as_ref().and_then(|d| d.return_type()),
                    );

                    // Constructor-promoted parameters are properties too.
                    if name.eq_ignore_ascii_case("__construct") {
                        for (param, reflected) in
                            method.parameter_list.parameters.iter().zip(&parameters)
                        {
                            if !param.is_promoted_property() {
                                continue;
                            }
                            let is_readonly = param
                                .modifiers
                                .iter()
                                .any(|m| matches!(m, Modifier::Readonly(_)));
                            out.properties.insert_if_absent(model::Property {
                                name: reflected.name.clone(),
                                class_name: class_name.to_string(),
                                visibility: Self::visibility(param.modifiers.iter()),
                                is_static: false,
                                is_virtual: false,
                                is_readonly,
                                access: if is_readonly {
                                    model::PropertyAccess::ReadOnly
                                } else {
                                    model::PropertyAccess::ReadWrite
                                },
                                ty: reflected.ty.clone(),
                                default: None,
                                docs: Documentation::default(),
                            });
                        }
                    }

                    out.methods.insert_if_absent(model::Method {
                        name,
                        class_name: class_name.to_string(),
                        visibility: Self::visibility(method.modifiers.iter()),
                        is_static: method.modifiers.iter().any(|m| m.is_static()),
                        is_abstract: method
                            .modifiers
                            .iter()
                            .any(|m| matches!(m, Modifier::Abstract(_))),
                        is_final: method
                            .modifiers
                            .iter()
                            .any(|m| matches!(m, Modifier::Final(_))),
                        is_virtual: false,
                        parameters,
                        return_type,
                        docs: doc.as_ref().map(Documentation::from_docblock).unwrap_or_default(),
                    });
                }
                ClassLikeMember::Property(property) => {
                    let doc = self.docblock_for(member);
                    let native = property.hint().map(|h| self.text(h.span()));
                    let ty = self
                        .resolver
                        .resolve_declared(native, doc.as_ref().and_then(|d| d.var_type()));
                    let docs = doc.as_ref().map(Documentation::from_docblock).unwrap_or_default();

                    let modifiers = property.modifiers();
                    let visibility = Self::visibility(modifiers.iter());
                    let is_static = modifiers.iter().any(|m| m.is_static());
                    let is_readonly = modifiers
                        .iter()
                        .any(|m| matches!(m, Modifier::Readonly(_)));

                    // Default values only exist on plain (non-hooked) items.
                    let defaults: Vec<Option<String>> = match property {
                        Property::Plain(plain) => plain
                            .items
                            .iter()
                            .map(|item| match item {
                                PropertyItem::Concrete(concrete) => {
                                    Some(self.text(concrete.value.span()).to_string())
                                }
                                PropertyItem::Abstract(_) => None,
                            })
                            .collect(),
                        _ => Vec::new(),
                    };

                    for (index, var) in property.variables().iter().enumerate() {
                        out.properties.insert_if_absent(model::Property {
                            name: var.name.trim_start_matches('$').to_string(),
                            class_name: class_name.to_string(),
                            visibility,
                            is_static,
                            is_virtual: false,
                            is_readonly,
                            access: if is_readonly {
                                model::PropertyAccess::ReadOnly
                            } else {
                                model::PropertyAccess::ReadWrite
                            },
                            ty: ty.clone(),
                            default: defaults.get(index).cloned().flatten(),
                            docs: docs.clone(),
                        });
                    }
                }
                ClassLikeMember::Constant(constant) => {
                    let doc = self.docblock_for(member);
                    let native = constant.hint.as_ref().map(|h| self.text(h.span()));
                    let documented = doc.as_ref().and_then(DocBlock::var_type);
                    let visibility = Self::visibility(constant.modifiers.iter());
                    let docs = doc.as_ref().map(Documentation::from_docblock).unwrap_or_default();

                    for item in constant.items.iter() {
                        // Untyped constants take the type of their literal.
                        let ty = match (native, documented) {
                            (None, None) => self.infer_expression_type(&item.value, None),
                            _ => self.resolver.resolve_declared(native, documented),
                        };
                        out.constants.insert_if_absent(model::Constant {
                            name: item.name.value.to_string(),
                            class_name: class_name.to_string(),
                            visibility,
                            is_virtual: false,
                            ty,
                            value: self.text(item.value.span()).to_string(),
                            docs: docs.clone(),
                        });
                    }
                }
                ClassLikeMember::EnumCase(enum_case) => {
                    let case_name = enum_case.item.name().value.to_string();
                    // Backed cases show their value; pure cases only have a name.
                    let item_text = self.text(enum_case.item.span());
                    let value = match item_text.split_once('=') {
                        Some((_, backing_value)) => backing_value.trim().to_string(),
                        None => format!("{class_name}::{case_name}"),
                    };
                    let docs = self
                        .docblock_for(member)
                        .as_ref()
                        .map(Documentation::from_docblock)
                        .unwrap_or_default();
                    out.constants.insert_if_absent(model::Constant {
                        name: case_name,
                        class_name: class_name.to_string(),
                        visibility: model::Visibility::Public,
                        is_virtual: false,
                        ty: Type::class(class_name),
                        value,
                        docs,
                    });
                }
                ClassLikeMember::TraitUse(trait_use) => {
                    for trait_name_ident in trait_use.trait_names.iter() {
                        out.traits
                            .push(Supertype::unresolved(trait_name_ident.value().to_string()));
                    }
                }
            }
        }

        out
    }
}
