//! Markdown rendering of reflected symbols.
//!
//! Every renderable value has a [`VariantKey`].  The [`ObjectRenderer`]
//! looks the key up in its template registry and renders the template
//! against a serialisable view of the value (see [`bindings`]).  When
//! interface candidates are enabled, a class-like whose exact key has no
//! template is rendered with the `interface` template instead.
//!
//! Sub-modules:
//! - [`bindings`]: Data exposed to templates, per variant
//! - [`signature`]: PHP-like one-line signatures of symbols
//! - [`templates`]: The bundled markdown templates

mod bindings;
pub mod signature;
mod templates;

use std::fmt;
use std::path::{Path, PathBuf};

use handlebars::Handlebars;
use serde::Serialize;

use crate::error::RenderError;
use crate::php_type::Type;
use crate::types::{
    ClassLike, ClassLikeKind, Constant, Function, HoverInformation, Method, OffsetResolution,
    Property, Symbol,
};

/// Template registry key, one per renderable variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariantKey {
    Class,
    Interface,
    Trait,
    Enum,
    Method,
    Property,
    Constant,
    Function,
    OffsetResolution,
    Type,
    HoverInformation,
}

impl VariantKey {
    pub const ALL: [VariantKey; 11] = [
        VariantKey::Class,
        VariantKey::Interface,
        VariantKey::Trait,
        VariantKey::Enum,
        VariantKey::Method,
        VariantKey::Property,
        VariantKey::Constant,
        VariantKey::Function,
        VariantKey::OffsetResolution,
        VariantKey::Type,
        VariantKey::HoverInformation,
    ];

    /// Stable kebab-case name, also the template file stem.
    pub fn as_str(self) -> &'static str {
        match self {
            VariantKey::Class => "class",
            VariantKey::Interface => "interface",
            VariantKey::Trait => "trait",
            VariantKey::Enum => "enum",
            VariantKey::Method => "method",
            VariantKey::Property => "property",
            VariantKey::Constant => "constant",
            VariantKey::Function => "function",
            VariantKey::OffsetResolution => "offset-resolution",
            VariantKey::Type => "type",
            VariantKey::HoverInformation => "hover-information",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.as_str() == name)
    }

    /// The generic key a variant may fall back to.
    fn interface_candidate(self) -> Option<VariantKey> {
        match self {
            VariantKey::Class | VariantKey::Trait | VariantKey::Enum => Some(VariantKey::Interface),
            _ => None,
        }
    }
}

impl From<ClassLikeKind> for VariantKey {
    fn from(kind: ClassLikeKind) -> Self {
        match kind {
            ClassLikeKind::Class => VariantKey::Class,
            ClassLikeKind::Interface => VariantKey::Interface,
            ClassLikeKind::Trait => VariantKey::Trait,
            ClassLikeKind::Enum => VariantKey::Enum,
        }
    }
}

impl fmt::Display for VariantKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Anything the renderer accepts, borrowed.
#[derive(Debug, Clone, Copy)]
pub enum Renderable<'a> {
    ClassLike(&'a ClassLike),
    Function(&'a Function),
    Method(&'a Method),
    Property(&'a Property),
    Constant(&'a Constant),
    Type(&'a Type),
    OffsetResolution(&'a OffsetResolution),
    HoverInformation(&'a HoverInformation),
}

impl Renderable<'_> {
    pub fn variant_key(&self) -> VariantKey {
        match self {
            Renderable::ClassLike(class) => class.kind.into(),
            Renderable::Function(_) => VariantKey::Function,
            Renderable::Method(_) => VariantKey::Method,
            Renderable::Property(_) => VariantKey::Property,
            Renderable::Constant(_) => VariantKey::Constant,
            Renderable::Type(_) => VariantKey::Type,
            Renderable::OffsetResolution(_) => VariantKey::OffsetResolution,
            Renderable::HoverInformation(_) => VariantKey::HoverInformation,
        }
    }
}

impl<'a> From<&'a Symbol> for Renderable<'a> {
    fn from(symbol: &'a Symbol) -> Self {
        match symbol {
            Symbol::ClassLike(class) => Renderable::ClassLike(class),
            Symbol::Function(function) => Renderable::Function(function),
            Symbol::Method(method) => Renderable::Method(method),
            Symbol::Property(property) => Renderable::Property(property),
            Symbol::Constant(constant) => Renderable::Constant(constant),
        }
    }
}

macro_rules! renderable_from {
    ($($ty:ident => $variant:ident),* $(,)?) => {
        $(
            impl<'a> From<&'a $ty> for Renderable<'a> {
                fn from(value: &'a $ty) -> Self {
                    Renderable::$variant(value)
                }
            }
        )*
    };
}

renderable_from! {
    ClassLike => ClassLike,
    Function => Function,
    Method => Method,
    Property => Property,
    Constant => Constant,
    Type => Type,
    OffsetResolution => OffsetResolution,
    HoverInformation => HoverInformation,
}

/// Where templates come from, applied in registration order so a later
/// source overrides an earlier one for the same key.
#[derive(Debug, Clone)]
enum TemplateSource {
    Defaults,
    Directory(PathBuf),
    Inline(VariantKey, String),
}

#[derive(Debug, Clone, Default)]
pub struct ObjectRendererBuilder {
    sources: Vec<TemplateSource>,
    interface_candidates: bool,
}

impl ObjectRendererBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the bundled markdown templates.
    pub fn with_default_templates(mut self) -> Self {
        self.sources.push(TemplateSource::Defaults);
        self
    }

    /// Register every `<variant-key>.md.hbs` file found in `dir`.
    pub fn add_template_path(mut self, dir: impl Into<PathBuf>) -> Self {
        self.sources.push(TemplateSource::Directory(dir.into()));
        self
    }

    pub fn add_template(mut self, key: VariantKey, source: impl Into<String>) -> Self {
        self.sources.push(TemplateSource::Inline(key, source.into()));
        self
    }

    pub fn enable_interface_candidates(mut self) -> Self {
        self.interface_candidates = true;
        self
    }

    /// Compile every registered template.
    pub fn build(self) -> Result<ObjectRenderer, RenderError> {
        let mut handlebars = Handlebars::new();

        // Output is markdown, not HTML.
        handlebars.register_escape_fn(handlebars::no_escape);

        for source in &self.sources {
            match source {
                TemplateSource::Defaults => {
                    for (key, template) in templates::DEFAULT_TEMPLATES {
                        register(&mut handlebars, *key, template)?;
                    }
                }
                TemplateSource::Directory(dir) => register_directory(&mut handlebars, dir)?,
                TemplateSource::Inline(key, template) => register(&mut handlebars, *key, template)?,
            }
        }

        tracing::debug!(
            "object renderer ready with {} templates, interface candidates {}",
            handlebars.get_templates().len(),
            if self.interface_candidates { "enabled" } else { "disabled" }
        );

        Ok(ObjectRenderer {
            handlebars,
            interface_candidates: self.interface_candidates,
        })
    }
}

fn register(handlebars: &mut Handlebars<'static>, key: VariantKey, template: &str) -> Result<(), RenderError> {
    handlebars
        .register_template_string(key.as_str(), template)
        .map_err(|e| RenderError::Template {
            name: key.to_string(),
            message: e.to_string(),
        })
}

/// Missing files are fine: a directory only has to provide the templates
/// it wants to override.
fn register_directory(handlebars: &mut Handlebars<'static>, dir: &Path) -> Result<(), RenderError> {
    let mut found = 0;
    for key in VariantKey::ALL {
        let path = dir.join(format!("{}.md.hbs", key.as_str()));
        if !path.is_file() {
            continue;
        }
        let template = std::fs::read_to_string(&path).map_err(|source| RenderError::Io {
            path: path.clone(),
            source,
        })?;
        register(handlebars, key, &template)?;
        found += 1;
    }
    if found == 0 {
        tracing::warn!("no templates found in {}", dir.display());
    }
    Ok(())
}

pub struct ObjectRenderer {
    handlebars: Handlebars<'static>,
    interface_candidates: bool,
}

impl ObjectRenderer {
    pub fn builder() -> ObjectRendererBuilder {
        ObjectRendererBuilder::new()
    }

    pub fn has_template(&self, key: VariantKey) -> bool {
        self.handlebars.has_template(key.as_str())
    }

    /// Render `value` to markdown.
    pub fn render<'a>(&self, value: impl Into<Renderable<'a>>) -> Result<String, RenderError> {
        let value = value.into();
        match value {
            Renderable::ClassLike(class) => self.render_view(value, &bindings::class_view(class)),
            Renderable::Function(function) => {
                self.render_view(value, &bindings::function_view(function))
            }
            Renderable::Method(method) => self.render_view(value, &bindings::method_view(method)),
            Renderable::Property(property) => {
                self.render_view(value, &bindings::property_view(property))
            }
            Renderable::Constant(constant) => {
                self.render_view(value, &bindings::constant_view(constant))
            }
            Renderable::Type(ty) => self.render_view(value, &bindings::type_view(ty)),
            Renderable::OffsetResolution(resolution) => {
                self.render_view(value, &bindings::offset_view(resolution))
            }
            Renderable::HoverInformation(hover) => {
                let symbol = self.render(&hover.symbol)?;
                self.render_view(value, &bindings::hover_view(hover, &symbol))
            }
        }
    }

    /// The key whose template renders `key`: the key itself, or its
    /// interface candidate when enabled.
    pub fn template_for(&self, key: VariantKey) -> Result<VariantKey, RenderError> {
        if self.has_template(key) {
            return Ok(key);
        }
        if self.interface_candidates
            && let Some(candidate) = key.interface_candidate()
            && self.has_template(candidate)
        {
            tracing::debug!("no {key} template, rendering with {candidate}");
            return Ok(candidate);
        }
        Err(RenderError::TemplateNotFound(key))
    }

    fn render_view(&self, value: Renderable<'_>, data: &impl Serialize) -> Result<String, RenderError> {
        let key = self.template_for(value.variant_key())?;
        self.handlebars
            .render(key.as_str(), data)
            .map_err(|e| RenderError::Template {
                name: key.to_string(),
                message: e.to_string(),
            })
    }
}
