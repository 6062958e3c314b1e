//! PHP symbol reflection and markdown hover rendering.
//!
//! A [`Reflector`] parses PHP source into an owned symbol model (class-likes,
//! functions, their members, docblock-declared virtual members, and the
//! variable scope at a cursor offset).  An [`ObjectRenderer`] turns any of
//! those values into markdown through a registry of Handlebars templates
//! keyed by [`VariantKey`].
//!
//! ```no_run
//! use phpantom_hover::{DocblockMemberProvider, ObjectRendererBuilder, ReflectorBuilder};
//!
//! let reflector = ReflectorBuilder::new()
//!     .add_member_provider(DocblockMemberProvider)
//!     .enable_contextual_source_location()
//!     .build();
//! let renderer = ObjectRendererBuilder::new()
//!     .with_default_templates()
//!     .enable_interface_candidates()
//!     .build()?;
//!
//! let classes = reflector.reflect_classes_in("<?php class Foobar {}")?;
//! let markdown = renderer.render(classes.first()?)?;
//! assert_eq!(markdown, "```php\nclass Foobar\n```\n");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod docblock;
pub mod error;
pub mod locator;
pub mod member_provider;
mod parser;
pub mod php_type;
pub mod reflector;
pub mod renderer;
pub mod type_resolver;
pub mod types;

pub use error::{ReflectionError, RenderError};
pub use locator::{DirectorySourceLocator, SourceLocator, TemporarySourceLocator};
pub use member_provider::{ClassLikeDeclaration, DocblockMemberProvider, MemberProvider};
pub use php_type::Type;
pub use reflector::{Reflector, ReflectorBuilder};
pub use renderer::{ObjectRenderer, ObjectRendererBuilder, Renderable, VariantKey};
pub use type_resolver::{TypeResolver, UnresolvedTokenPolicy};
pub use types::{
    ClassLike, ClassLikeKind, Collection, Constant, Documentation, Function, HoverInformation,
    Member, Method, Named, OffsetResolution, Parameter, Property, PropertyAccess, Supertype,
    Symbol, Visibility,
};
