//! Reflection entry points.
//!
//! A [`Reflector`] turns PHP source text into the owned symbol model:
//!
//!   1. the source is parsed (or taken from the cache) into class-likes
//!      with their concrete members and free functions,
//!   2. every registered [`MemberProvider`] contributes virtual members,
//!      which lose to concrete members of the same name,
//!   3. supertype names are looked up, in the snippet itself when
//!      contextual source location is enabled and then through the
//!      [`SourceLocator`]s in registration order, to learn their kind.
//!
//! An unknown supertype is not an error; it simply stays unresolved.

use std::collections::HashMap;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::ReflectionError;
use crate::locator::SourceLocator;
use crate::member_provider::{ClassLikeDeclaration, MemberProvider};
use crate::parser::{self, Enclosing, ParsedClass, ParsedFile};
use crate::type_resolver::{TypeResolver, UnresolvedTokenPolicy};
use crate::types::{
    ClassLike, Collection, Function, Member, Named, OffsetResolution, Supertype, Symbol,
};

#[derive(Default)]
pub struct ReflectorBuilder {
    locators: Vec<Arc<dyn SourceLocator>>,
    providers: Vec<Arc<dyn MemberProvider>>,
    contextual: bool,
    cache: bool,
    policy: UnresolvedTokenPolicy,
}

impl ReflectorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Locators are consulted in the order they were added.
    pub fn add_locator(mut self, locator: impl SourceLocator + 'static) -> Self {
        self.locators.push(Arc::new(locator));
        self
    }

    /// Providers run in the order they were added; an earlier provider's
    /// member wins over a later one of the same name.
    pub fn add_member_provider(mut self, provider: impl MemberProvider + 'static) -> Self {
        self.providers.push(Arc::new(provider));
        self
    }

    /// Look up supertypes in the reflected snippet before asking the
    /// locators.
    pub fn enable_contextual_source_location(mut self) -> Self {
        self.contextual = true;
        self
    }

    pub fn with_cache(mut self, enabled: bool) -> Self {
        self.cache = enabled;
        self
    }

    pub fn unresolved_token_policy(mut self, policy: UnresolvedTokenPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn build(self) -> Reflector {
        tracing::debug!(
            "building reflector: {} locators, {} member providers, contextual={}, cache={}",
            self.locators.len(),
            self.providers.len(),
            self.contextual,
            self.cache
        );
        Reflector {
            locators: self.locators,
            providers: self.providers,
            contextual: self.contextual,
            resolver: TypeResolver::new(self.policy),
            cache: self.cache.then(|| RwLock::new(HashMap::new())),
        }
    }
}

pub struct Reflector {
    locators: Vec<Arc<dyn SourceLocator>>,
    providers: Vec<Arc<dyn MemberProvider>>,
    contextual: bool,
    resolver: TypeResolver,
    /// Parsed sources keyed by a hash of their text.
    cache: Option<RwLock<HashMap<u64, Arc<ParsedFile>>>>,
}

impl Reflector {
    pub fn builder() -> ReflectorBuilder {
        ReflectorBuilder::new()
    }

    pub fn resolver(&self) -> &TypeResolver {
        &self.resolver
    }

    /// Every class, interface, trait and enum declared in `source`, in
    /// declaration order.
    pub fn reflect_classes_in(&self, source: &str) -> Result<Collection<ClassLike>, ReflectionError> {
        let parsed = self.parse(source)?;
        let context = self.contextual.then_some(parsed.as_ref());
        Ok(parsed
            .classes
            .iter()
            .map(|class| self.complete_class(class, context))
            .collect())
    }

    /// Every free function declared in `source`, in declaration order.
    pub fn reflect_functions_in(&self, source: &str) -> Result<Collection<Function>, ReflectionError> {
        let parsed = self.parse(source)?;
        Ok(parsed.functions.iter().cloned().collect())
    }

    /// The enclosing declaration and the local variables visible at
    /// `offset`, a byte offset into `source`.
    ///
    /// Any offset from 0 to `source.len()` inclusive is valid as long as it
    /// falls on a character boundary.
    pub fn reflect_offset(
        &self,
        source: &str,
        offset: usize,
    ) -> Result<OffsetResolution, ReflectionError> {
        let invalid = || ReflectionError::InvalidOffset {
            offset,
            len: source.len(),
        };
        if offset > source.len() || !source.is_char_boundary(offset) {
            return Err(invalid());
        }
        let offset32 = u32::try_from(offset).map_err(|_| invalid())?;

        let scan = parser::scan_offset(source, offset32, &self.resolver)?;
        let enclosing = match scan.enclosing {
            None => None,
            Some(enclosing) => self.enclosing_symbol(source, enclosing)?,
        };

        Ok(OffsetResolution {
            enclosing,
            locals: scan.locals,
        })
    }

    /// Locate `name` through the source locators and reflect it.
    pub fn reflect_class(&self, name: &str) -> Result<ClassLike, ReflectionError> {
        for locator in &self.locators {
            let Ok(source) = locator.locate(name) else {
                continue;
            };
            if let Some(class) = self.reflect_classes_in(&source)?.find(name) {
                return Ok(class.clone());
            }
        }
        Err(ReflectionError::not_found(ClassLike::KIND, name))
    }

    /// Locate `name` through the source locators and reflect it.
    pub fn reflect_function(&self, name: &str) -> Result<Function, ReflectionError> {
        for locator in &self.locators {
            let Ok(source) = locator.locate(name) else {
                continue;
            };
            if let Some(function) = self.reflect_functions_in(&source)?.find(name) {
                return Ok(function.clone());
            }
        }
        Err(ReflectionError::not_found(Function::KIND, name))
    }

    /// Number of parsed sources currently cached.
    pub fn cache_len(&self) -> usize {
        self.cache.as_ref().map_or(0, |cache| cache.read().len())
    }

    fn parse(&self, source: &str) -> Result<Arc<ParsedFile>, ReflectionError> {
        let Some(cache) = &self.cache else {
            return parser::parse_source(source, &self.resolver).map(Arc::new);
        };

        let key = source_hash(source);
        if let Some(parsed) = cache.read().get(&key) {
            tracing::debug!("reflection cache hit for {key:016x}");
            return Ok(Arc::clone(parsed));
        }

        let parsed = Arc::new(parser::parse_source(source, &self.resolver)?);
        cache.write().insert(key, Arc::clone(&parsed));
        Ok(parsed)
    }

    /// Attach virtual members and resolve supertypes.
    fn complete_class(&self, parsed: &ParsedClass, context: Option<&ParsedFile>) -> ClassLike {
        let mut class = parsed.class.clone();

        for provider in &self.providers {
            let provided = provider.provide(&ClassLikeDeclaration {
                class: &class,
                docblock: &parsed.docblock,
                resolver: &self.resolver,
            });
            for member in provided {
                merge_virtual_member(&mut class, member);
            }
        }

        for supertype in class
            .extends
            .iter_mut()
            .chain(class.implements.iter_mut())
            .chain(class.traits.iter_mut())
        {
            self.resolve_supertype(supertype, context);
        }

        class
    }

    fn resolve_supertype(&self, supertype: &mut Supertype, context: Option<&ParsedFile>) {
        if let Some(found) = context.and_then(|file| find_class(file, &supertype.name)) {
            supertype.kind = Some(found.kind);
            supertype.is_abstract = found.is_abstract;
            return;
        }

        for locator in &self.locators {
            let Ok(source) = locator.locate(&supertype.name) else {
                continue;
            };
            let parsed = match self.parse(&source) {
                Ok(parsed) => parsed,
                Err(e) => {
                    tracing::warn!("failed to parse located source for {}: {e}", supertype.name);
                    continue;
                }
            };
            if let Some(found) = find_class(&parsed, &supertype.name) {
                supertype.kind = Some(found.kind);
                supertype.is_abstract = found.is_abstract;
                return;
            }
        }

        tracing::debug!("supertype {} left unresolved", supertype.name);
    }

    fn enclosing_symbol(
        &self,
        source: &str,
        enclosing: Enclosing,
    ) -> Result<Option<Symbol>, ReflectionError> {
        let symbol = match enclosing {
            Enclosing::ClassLike { start_offset } => self
                .reflect_classes_in(source)?
                .into_iter()
                .find(|class| class.start_offset == start_offset)
                .map(Symbol::ClassLike),
            Enclosing::Method {
                class_start_offset,
                name,
            } => self
                .reflect_classes_in(source)?
                .into_iter()
                .find(|class| class.start_offset == class_start_offset)
                .and_then(|class| class.methods.find(&name).cloned())
                .map(Symbol::Method),
            Enclosing::Function { name, namespace } => self
                .reflect_functions_in(source)?
                .into_iter()
                .find(|function| function.name == name && function.namespace == namespace)
                .map(Symbol::Function),
        };
        Ok(symbol)
    }
}

fn source_hash(source: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    source.hash(&mut hasher);
    hasher.finish()
}

fn find_class<'f>(file: &'f ParsedFile, name: &str) -> Option<&'f ClassLike> {
    file.classes
        .iter()
        .map(|parsed| &parsed.class)
        .find(|class| class.matches(name))
}

/// Add a provided member unless the name is taken.  Survivors are always
/// marked virtual, whatever the provider set.
fn merge_virtual_member(class: &mut ClassLike, member: Member) {
    let (kind, name, added) = match member {
        Member::Method(mut method) => {
            method.is_virtual = true;
            let name = method.name.clone();
            ("method", name, class.methods.insert_if_absent(method))
        }
        Member::Property(mut property) => {
            property.is_virtual = true;
            let name = property.name.clone();
            ("property", name, class.properties.insert_if_absent(property))
        }
        Member::Constant(mut constant) => {
            constant.is_virtual = true;
            let name = constant.name.clone();
            ("constant", name, class.constants.insert_if_absent(constant))
        }
    };
    if !added {
        tracing::debug!("virtual {kind} {name} on {} shadowed by declaration", class.name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DocblockMemberProvider;
    use crate::locator::TemporarySourceLocator;
    use crate::php_type::Type;
    use crate::types::ClassLikeKind;

    fn reflector() -> Reflector {
        ReflectorBuilder::new()
            .add_member_provider(DocblockMemberProvider)
            .enable_contextual_source_location()
            .build()
    }

    #[test]
    fn concrete_property_wins_over_tag() {
        let classes = reflector()
            .reflect_classes_in(
                "<?php\n/** @property int $foobar */\nclass OneClass { public string $foobar; }",
            )
            .unwrap();
        let class = classes.first().unwrap();
        assert_eq!(class.properties.len(), 1);
        let prop = class.properties.get("foobar").unwrap();
        assert!(!prop.is_virtual);
        assert_eq!(prop.ty, Type::scalar("string"));
    }

    #[test]
    fn supertypes_resolve_from_snippet() {
        let classes = reflector()
            .reflect_classes_in(
                "<?php\ninterface DoesThis {}\nabstract class SomeAbstract {}\nclass Concrete extends SomeAbstract implements DoesThis, Missing {}",
            )
            .unwrap();
        let concrete = classes.get("Concrete").unwrap();
        assert_eq!(concrete.extends[0].kind, Some(ClassLikeKind::Class));
        assert!(concrete.extends[0].is_abstract);
        assert_eq!(concrete.implements[0].kind, Some(ClassLikeKind::Interface));
        assert!(!concrete.implements[1].is_resolved());
    }

    #[test]
    fn supertypes_resolve_through_locator() {
        let locator = Arc::new(TemporarySourceLocator::new());
        let reflector = ReflectorBuilder::new().add_locator(Arc::clone(&locator)).build();
        // Registered after the reflector was built.
        locator.set_source("<?php abstract class Base {}");

        let classes = reflector
            .reflect_classes_in("<?php class Child extends Base {}")
            .unwrap();
        let child = classes.first().unwrap();
        assert!(child.extends[0].is_abstract);
    }

    #[test]
    fn cache_is_keyed_by_source() {
        let reflector = ReflectorBuilder::new().with_cache(true).build();
        let a = reflector.reflect_classes_in("<?php class A {}").unwrap();
        let again = reflector.reflect_classes_in("<?php class A {}").unwrap();
        assert_eq!(a, again);
        assert_eq!(reflector.cache_len(), 1);
        reflector.reflect_classes_in("<?php class B {}").unwrap();
        assert_eq!(reflector.cache_len(), 2);
    }

    #[test]
    fn no_cache_by_default() {
        let reflector = ReflectorBuilder::new().build();
        reflector.reflect_classes_in("<?php class A {}").unwrap();
        assert_eq!(reflector.cache_len(), 0);
    }

    #[test]
    fn offset_past_end_is_invalid() {
        let err = reflector().reflect_offset("<?php", 6).unwrap_err();
        assert!(matches!(err, ReflectionError::InvalidOffset { offset: 6, len: 5 }));
    }

    #[test]
    fn offset_inside_multibyte_char_is_invalid() {
        let source = "<?php $é = 1;";
        let inside = source.find('é').unwrap() + 1;
        assert!(matches!(
            reflector().reflect_offset(source, inside),
            Err(ReflectionError::InvalidOffset { .. })
        ));
    }

    #[test]
    fn reflect_class_by_name() {
        let locator = TemporarySourceLocator::new();
        locator.set_source("<?php namespace Acme; final class Widget {}");
        let reflector = ReflectorBuilder::new().add_locator(locator).build();

        let widget = reflector.reflect_class("Acme\\Widget").unwrap();
        assert!(widget.is_final);
        assert!(matches!(
            reflector.reflect_class("Gadget"),
            Err(ReflectionError::NotFound { kind: "class", .. })
        ));
    }
}
