//! One-line PHP-like signatures.
//!
//! Unknown types are left out entirely rather than printed as
//! `<unknown>`, so an untyped parameter reads `$foo` just like the source.

use crate::php_type::Type;
use crate::types::{ClassLike, ClassLikeKind, Constant, Function, Method, Parameter, Property};

fn known(ty: &Type) -> Option<String> {
    (!ty.is_unknown()).then(|| ty.to_string())
}

/// `[type ][&][...]$name[ = default]`
pub fn parameter(param: &Parameter) -> String {
    let mut out = String::new();
    if let Some(ty) = known(&param.ty) {
        out.push_str(&ty);
        out.push(' ');
    }
    if param.is_reference {
        out.push('&');
    }
    if param.is_variadic {
        out.push_str("...");
    }
    out.push('$');
    out.push_str(&param.name);
    if let Some(default) = &param.default {
        out.push_str(" = ");
        out.push_str(default);
    }
    out
}

fn parameter_list(params: &[Parameter]) -> String {
    params.iter().map(parameter).collect::<Vec<_>>().join(", ")
}

fn return_suffix(ty: &Type) -> String {
    known(ty).map(|ty| format!(": {ty}")).unwrap_or_default()
}

/// `[final ][abstract ]visibility [static ]function name(params)[: type]`
pub fn method(method: &Method) -> String {
    let mut out = String::new();
    if method.is_final {
        out.push_str("final ");
    }
    if method.is_abstract {
        out.push_str("abstract ");
    }
    out.push_str(method.visibility.as_str());
    out.push(' ');
    if method.is_static {
        out.push_str("static ");
    }
    out.push_str(&format!(
        "function {}({}){}",
        method.name,
        parameter_list(&method.parameters),
        return_suffix(&method.return_type)
    ));
    out
}

/// `function name(params)[: type]`
pub fn function(function: &Function) -> String {
    format!(
        "function {}({}){}",
        function.name,
        parameter_list(&function.parameters),
        return_suffix(&function.return_type)
    )
}

/// `visibility [static ][readonly ][type ]$name[ = default]`
pub fn property(property: &Property) -> String {
    let mut out = format!("{} ", property.visibility);
    if property.is_static {
        out.push_str("static ");
    }
    if property.is_readonly {
        out.push_str("readonly ");
    }
    if let Some(ty) = known(&property.ty) {
        out.push_str(&ty);
        out.push(' ');
    }
    out.push('$');
    out.push_str(&property.name);
    if let Some(default) = &property.default {
        out.push_str(" = ");
        out.push_str(default);
    }
    out
}

/// `visibility const NAME = value`
pub fn constant(constant: &Constant) -> String {
    format!("{} const {} = {}", constant.visibility, constant.name, constant.value)
}

/// The declaration header, e.g.
/// `abstract class Foo extends Bar implements Baz, Qux`.
pub fn class_like(class: &ClassLike) -> String {
    let mut out = String::new();
    if class.kind == ClassLikeKind::Class {
        if class.is_final {
            out.push_str("final ");
        }
        if class.is_abstract {
            out.push_str("abstract ");
        }
    }
    out.push_str(class.kind.keyword());
    out.push(' ');
    out.push_str(&class.name);

    let names = |supertypes: &[crate::types::Supertype]| {
        supertypes
            .iter()
            .map(|s| s.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    };
    if !class.extends.is_empty() {
        out.push_str(" extends ");
        out.push_str(&names(&class.extends));
    }
    if !class.implements.is_empty() {
        out.push_str(" implements ");
        out.push_str(&names(&class.implements));
    }
    out
}
