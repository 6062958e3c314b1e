//! The data each template is rendered against.
//!
//! Views are plain `Serialize` structs borrowing from the symbol.  Member
//! lists carry pre-rendered signatures, and an unknown type is bound as
//! `null` so templates can leave it out with `{{#if type}}`.

use serde::Serialize;

use super::signature;
use crate::docblock::strip_html_tags;
use crate::php_type::Type;
use crate::types::{
    ClassLike, ClassLikeKind, Constant, Documentation, Function, HoverInformation, Method,
    OffsetResolution, Parameter, Property, PropertyAccess, Supertype, Symbol,
};

#[derive(Debug, Serialize)]
pub(crate) struct ClassView<'a> {
    name: &'a str,
    fqn: String,
    namespace: Option<&'a str>,
    kind: &'static str,
    signature: String,
    docs: String,
    is_deprecated: bool,
    is_abstract: bool,
    is_final: bool,
    supertypes: Vec<SupertypeView<'a>>,
    constants: Vec<MemberView<'a>>,
    properties: Vec<MemberView<'a>>,
    methods: Vec<MemberView<'a>>,
}

#[derive(Debug, Serialize)]
struct SupertypeView<'a> {
    /// `extends`, `implements` or `uses`.
    relation: &'static str,
    /// e.g. `abstract class`; `None` when unresolved.
    label: Option<&'static str>,
    name: &'a str,
}

#[derive(Debug, Serialize)]
struct MemberView<'a> {
    name: &'a str,
    signature: String,
    visibility: &'static str,
    is_static: bool,
    is_abstract: bool,
    is_final: bool,
    is_virtual: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct MethodView<'a> {
    name: &'a str,
    class_name: &'a str,
    signature: String,
    visibility: &'static str,
    is_static: bool,
    is_abstract: bool,
    is_final: bool,
    is_virtual: bool,
    parameters: Vec<ParameterView<'a>>,
    return_type: Option<String>,
    docs: String,
    is_deprecated: bool,
}

#[derive(Debug, Serialize)]
struct ParameterView<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    ty: Option<String>,
    default: Option<&'a str>,
    is_variadic: bool,
    is_reference: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct PropertyView<'a> {
    name: &'a str,
    class_name: &'a str,
    signature: String,
    visibility: &'static str,
    is_static: bool,
    is_readonly: bool,
    access: &'static str,
    is_virtual: bool,
    #[serde(rename = "type")]
    ty: Option<String>,
    default: Option<&'a str>,
    docs: String,
    is_deprecated: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct ConstantView<'a> {
    name: &'a str,
    class_name: &'a str,
    signature: String,
    visibility: &'static str,
    is_virtual: bool,
    #[serde(rename = "type")]
    ty: Option<String>,
    value: &'a str,
    docs: String,
    is_deprecated: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct FunctionView<'a> {
    name: &'a str,
    fqn: String,
    namespace: Option<&'a str>,
    signature: String,
    parameters: Vec<ParameterView<'a>>,
    return_type: Option<String>,
    docs: String,
    is_deprecated: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct TypeView {
    name: String,
    kind: &'static str,
}

#[derive(Debug, Serialize)]
pub(crate) struct OffsetView<'a> {
    enclosing_kind: Option<&'static str>,
    enclosing_name: Option<String>,
    locals: Vec<LocalView<'a>>,
}

#[derive(Debug, Serialize)]
struct LocalView<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    ty: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct HoverView<'a> {
    title: &'a str,
    docs: String,
    /// The wrapped symbol, already rendered.
    symbol: &'a str,
}

fn known(ty: &Type) -> Option<String> {
    (!ty.is_unknown()).then(|| ty.to_string())
}

/// Summary and description as one block of text.
fn docs_text(docs: &Documentation) -> String {
    [docs.summary.trim(), docs.description.trim()]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn supertype_view<'a>(relation: &'static str, supertype: &'a Supertype) -> SupertypeView<'a> {
    let label = supertype.kind.map(|kind| match kind {
        ClassLikeKind::Class if supertype.is_abstract => "abstract class",
        other => other.keyword(),
    });
    SupertypeView {
        relation,
        label,
        name: &supertype.name,
    }
}

fn parameter_view(param: &Parameter) -> ParameterView<'_> {
    ParameterView {
        name: &param.name,
        ty: known(&param.ty),
        default: param.default.as_deref(),
        is_variadic: param.is_variadic,
        is_reference: param.is_reference,
    }
}

pub(crate) fn class_view(class: &ClassLike) -> ClassView<'_> {
    let supertypes = class
        .extends
        .iter()
        .map(|s| supertype_view("extends", s))
        .chain(class.implements.iter().map(|s| supertype_view("implements", s)))
        .chain(class.traits.iter().map(|s| supertype_view("uses", s)))
        .collect();

    ClassView {
        name: &class.name,
        fqn: class.fqn(),
        namespace: class.namespace.as_deref(),
        kind: class.kind.keyword(),
        signature: signature::class_like(class),
        docs: docs_text(&class.docs),
        is_deprecated: class.docs.is_deprecated,
        is_abstract: class.is_abstract,
        is_final: class.is_final,
        supertypes,
        constants: class
            .constants
            .iter()
            .map(|c| MemberView {
                name: &c.name,
                signature: signature::constant(c),
                visibility: c.visibility.as_str(),
                is_static: true,
                is_abstract: false,
                is_final: false,
                is_virtual: c.is_virtual,
            })
            .collect(),
        properties: class
            .properties
            .iter()
            .map(|p| MemberView {
                name: &p.name,
                signature: signature::property(p),
                visibility: p.visibility.as_str(),
                is_static: p.is_static,
                is_abstract: false,
                is_final: false,
                is_virtual: p.is_virtual,
            })
            .collect(),
        methods: class
            .methods
            .iter()
            .map(|m| MemberView {
                name: &m.name,
                signature: signature::method(m),
                visibility: m.visibility.as_str(),
                is_static: m.is_static,
                is_abstract: m.is_abstract,
                is_final: m.is_final,
                is_virtual: m.is_virtual,
            })
            .collect(),
    }
}

pub(crate) fn method_view(method: &Method) -> MethodView<'_> {
    MethodView {
        name: &method.name,
        class_name: &method.class_name,
        signature: signature::method(method),
        visibility: method.visibility.as_str(),
        is_static: method.is_static,
        is_abstract: method.is_abstract,
        is_final: method.is_final,
        is_virtual: method.is_virtual,
        parameters: method.parameters.iter().map(parameter_view).collect(),
        return_type: known(&method.return_type),
        docs: docs_text(&method.docs),
        is_deprecated: method.docs.is_deprecated,
    }
}

pub(crate) fn property_view(property: &Property) -> PropertyView<'_> {
    PropertyView {
        name: &property.name,
        class_name: &property.class_name,
        signature: signature::property(property),
        visibility: property.visibility.as_str(),
        is_static: property.is_static,
        is_readonly: property.is_readonly,
        access: match property.access {
            PropertyAccess::ReadWrite => "read-write",
            PropertyAccess::ReadOnly => "read-only",
            PropertyAccess::WriteOnly => "write-only",
        },
        is_virtual: property.is_virtual,
        ty: known(&property.ty),
        default: property.default.as_deref(),
        docs: docs_text(&property.docs),
        is_deprecated: property.docs.is_deprecated,
    }
}

pub(crate) fn constant_view(constant: &Constant) -> ConstantView<'_> {
    ConstantView {
        name: &constant.name,
        class_name: &constant.class_name,
        signature: signature::constant(constant),
        visibility: constant.visibility.as_str(),
        is_virtual: constant.is_virtual,
        ty: known(&constant.ty),
        value: &constant.value,
        docs: docs_text(&constant.docs),
        is_deprecated: constant.docs.is_deprecated,
    }
}

pub(crate) fn function_view(function: &Function) -> FunctionView<'_> {
    FunctionView {
        name: &function.name,
        fqn: function.fqn(),
        namespace: function.namespace.as_deref(),
        signature: signature::function(function),
        parameters: function.parameters.iter().map(parameter_view).collect(),
        return_type: known(&function.return_type),
        docs: docs_text(&function.docs),
        is_deprecated: function.docs.is_deprecated,
    }
}

pub(crate) fn type_view(ty: &Type) -> TypeView {
    TypeView {
        name: ty.to_string(),
        kind: ty.kind(),
    }
}

pub(crate) fn offset_view(resolution: &OffsetResolution) -> OffsetView<'_> {
    let enclosing_name = resolution.enclosing.as_ref().map(|symbol| match symbol {
        Symbol::ClassLike(class) => class.fqn(),
        Symbol::Function(function) => function.fqn(),
        Symbol::Method(method) => format!("{}::{}", method.class_name, method.name),
        Symbol::Property(property) => format!("{}::${}", property.class_name, property.name),
        Symbol::Constant(constant) => format!("{}::{}", constant.class_name, constant.name),
    });

    OffsetView {
        enclosing_kind: resolution.enclosing.as_ref().map(Symbol::kind_label),
        enclosing_name,
        locals: resolution
            .locals
            .iter()
            .map(|(name, ty)| LocalView {
                name: name.as_str(),
                ty: ty.to_string(),
            })
            .collect(),
    }
}

/// Hover docs may carry HTML from external documentation sources.
pub(crate) fn hover_view<'a>(hover: &'a HoverInformation, rendered_symbol: &'a str) -> HoverView<'a> {
    HoverView {
        title: &hover.title,
        docs: strip_html_tags(&hover.docs).trim().to_string(),
        symbol: rendered_symbol.trim_end(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn docs_text_joins_non_empty_parts() {
        let docs = Documentation {
            summary: "Summary.".to_string(),
            description: String::new(),
            is_deprecated: false,
        };
        assert_eq!(docs_text(&docs), "Summary.");

        let docs = Documentation {
            summary: "Summary.".to_string(),
            description: "More.".to_string(),
            is_deprecated: false,
        };
        assert_eq!(docs_text(&docs), "Summary.\n\nMore.");
    }

    #[test]
    fn abstract_class_supertype_label() {
        let supertype = Supertype {
            name: "SomeAbstract".to_string(),
            kind: Some(ClassLikeKind::Class),
            is_abstract: true,
        };
        let view = supertype_view("extends", &supertype);
        assert_eq!(view.label, Some("abstract class"));

        let unresolved = Supertype::unresolved("\\Missing");
        assert_eq!(supertype_view("implements", &unresolved).label, None);
    }
}
