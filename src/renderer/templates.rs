use super::VariantKey;

/// The bundled markdown templates.  There is no `enum` template:
/// enums render through the interface candidate.
pub(crate) const DEFAULT_TEMPLATES: &[(VariantKey, &str)] = &[
    (VariantKey::Class, include_str!("../../templates/markdown/class.md.hbs")),
    (VariantKey::Interface, include_str!("../../templates/markdown/interface.md.hbs")),
    (VariantKey::Trait, include_str!("../../templates/markdown/trait.md.hbs")),
    (VariantKey::Method, include_str!("../../templates/markdown/method.md.hbs")),
    (VariantKey::Property, include_str!("../../templates/markdown/property.md.hbs")),
    (VariantKey::Constant, include_str!("../../templates/markdown/constant.md.hbs")),
    (VariantKey::Function, include_str!("../../templates/markdown/function.md.hbs")),
    (
        VariantKey::OffsetResolution,
        include_str!("../../templates/markdown/offset-resolution.md.hbs"),
    ),
    (VariantKey::Type, include_str!("../../templates/markdown/type.md.hbs")),
    (
        VariantKey::HoverInformation,
        include_str!("../../templates/markdown/hover-information.md.hbs"),
    ),
];
