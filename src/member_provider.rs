//! Pluggable sources of virtual members.
//!
//! The [`Reflector`](crate::Reflector) collects a class-like's concrete
//! members first and then asks every registered [`MemberProvider`] for
//! more.  A provided member whose name is already taken is discarded, and
//! every member that survives is marked `is_virtual`.

use crate::docblock::{self, DocBlock};
use crate::php_type::Type;
use crate::type_resolver::TypeResolver;
use crate::types::{
    ClassLike, Documentation, Member, Method, Parameter, Property, PropertyAccess, Visibility,
};

/// What a provider gets to look at: the class-like with its concrete
/// members, its parsed doc comment, and the resolver for type strings.
pub struct ClassLikeDeclaration<'a> {
    pub class: &'a ClassLike,
    pub docblock: &'a DocBlock,
    pub resolver: &'a TypeResolver,
}

pub trait MemberProvider: Send + Sync {
    fn provide(&self, declaration: &ClassLikeDeclaration<'_>) -> Vec<Member>;
}

impl<F> MemberProvider for F
where
    F: Fn(&ClassLikeDeclaration<'_>) -> Vec<Member> + Send + Sync,
{
    fn provide(&self, declaration: &ClassLikeDeclaration<'_>) -> Vec<Member> {
        self(declaration)
    }
}

/// Contributes `@property`, `@property-read`, `@property-write` and
/// `@method` tags from the class-level doc comment.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocblockMemberProvider;

impl MemberProvider for DocblockMemberProvider {
    fn provide(&self, declaration: &ClassLikeDeclaration<'_>) -> Vec<Member> {
        let class_name = &declaration.class.name;
        let resolver = declaration.resolver;
        let mut members = Vec::new();

        for tag in docblock::property_tags(declaration.docblock) {
            let ty = match tag.type_expr.as_deref() {
                None => Type::Mixed,
                Some(expr) => resolver.resolve(expr),
            };
            if ty.is_unknown() {
                tracing::warn!("skipping @property ${} on {class_name}: unresolvable type", tag.name);
                continue;
            }

            members.push(Member::Property(Property {
                name: tag.name,
                class_name: class_name.clone(),
                visibility: Visibility::Public,
                is_static: false,
                is_virtual: true,
                is_readonly: tag.access == PropertyAccess::ReadOnly,
                access: tag.access,
                ty,
                default: None,
                docs: Documentation::default(),
            }));
        }

        for tag in docblock::method_tags(declaration.docblock) {
            // A missing return type is fine; one that is present but
            // cannot be resolved makes the whole tag suspect.
            let return_type = match tag.return_type.as_deref() {
                None => Type::Unknown,
                Some(expr) => match resolver.resolve(expr) {
                    Type::Unknown => {
                        tracing::warn!(
                            "skipping @method {}() on {class_name}: unresolvable return type {expr:?}",
                            tag.name
                        );
                        continue;
                    }
                    ty => ty,
                },
            };

            let parameters = tag
                .parameters
                .into_iter()
                .map(|param| Parameter {
                    name: param.name,
                    ty: param
                        .type_expr
                        .as_deref()
                        .map_or(Type::Unknown, |expr| resolver.resolve(expr)),
                    has_default: param.default.is_some(),
                    default: param.default,
                    is_variadic: param.is_variadic,
                    is_reference: param.is_reference,
                })
                .collect();

            members.push(Member::Method(Method {
                name: tag.name,
                class_name: class_name.clone(),
                visibility: Visibility::Public,
                is_static: tag.is_static,
                is_abstract: false,
                is_final: false,
                is_virtual: true,
                parameters,
                return_type,
                docs: Documentation::default(),
            }));
        }

        members
    }
}
