//! The reflected symbol model.
//!
//! Everything here is an owned, immutable value built once per reflection
//! call, so nothing depends on the parser's arena lifetime.  Members record
//! the name of their declaring class-like as a plain string instead of a
//! back-reference.

use std::fmt;

use indexmap::IndexMap;

use crate::docblock::DocBlock;
use crate::error::ReflectionError;
use crate::php_type::Type;

/// Visibility of a class member (method, property, or constant).
///
/// In PHP, members without an explicit visibility modifier default to `Public`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Private,
}

impl Visibility {
    pub fn as_str(self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Protected => "protected",
            Visibility::Private => "private",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The syntactic kind of a class-like declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassLikeKind {
    Class,
    Interface,
    Trait,
    Enum,
}

impl ClassLikeKind {
    /// The PHP keyword that introduces the declaration.
    pub fn keyword(self) -> &'static str {
        match self {
            ClassLikeKind::Class => "class",
            ClassLikeKind::Interface => "interface",
            ClassLikeKind::Trait => "trait",
            ClassLikeKind::Enum => "enum",
        }
    }
}

impl fmt::Display for ClassLikeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// How a property may be accessed from outside.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PropertyAccess {
    #[default]
    ReadWrite,
    /// `@property-read` or a `readonly` declaration.
    ReadOnly,
    /// `@property-write`.
    WriteOnly,
}

/// Free text taken from a doc comment.  Both fields may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Documentation {
    pub summary: String,
    pub description: String,
    pub is_deprecated: bool,
}

impl Documentation {
    pub fn from_docblock(doc: &DocBlock) -> Self {
        Documentation {
            summary: doc.summary.clone(),
            description: doc.description.clone(),
            is_deprecated: doc.is_deprecated(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.summary.is_empty() && self.description.is_empty()
    }
}

/// One parameter of a method or function.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    /// The parameter name WITHOUT the `$` prefix.
    pub name: String,
    pub ty: Type,
    pub has_default: bool,
    /// Source text of the default value, for display only.
    pub default: Option<String>,
    pub is_variadic: bool,
    pub is_reference: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Method {
    pub name: String,
    /// Name of the declaring class-like.
    pub class_name: String,
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_abstract: bool,
    pub is_final: bool,
    /// Contributed by a member provider rather than declared in code.
    pub is_virtual: bool,
    pub parameters: Vec<Parameter>,
    pub return_type: Type,
    pub docs: Documentation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    /// The property name WITHOUT the `$` prefix (e.g. "name", "age").
    /// This matches PHP access syntax: `$this->name` not `$this->$name`.
    pub name: String,
    pub class_name: String,
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_virtual: bool,
    pub is_readonly: bool,
    pub access: PropertyAccess,
    pub ty: Type,
    /// Source text of the default value, for display only.
    pub default: Option<String>,
    pub docs: Documentation,
}

/// A class constant or enum case.
#[derive(Debug, Clone, PartialEq)]
pub struct Constant {
    pub name: String,
    pub class_name: String,
    pub visibility: Visibility,
    pub is_virtual: bool,
    pub ty: Type,
    /// Source text of the value; never evaluated.
    pub value: String,
    pub docs: Documentation,
}

/// A free (non-method) function.
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: String,
    pub namespace: Option<String>,
    pub parameters: Vec<Parameter>,
    pub return_type: Type,
    pub docs: Documentation,
}

impl Function {
    /// Fully-qualified name, without a leading `\`.
    pub fn fqn(&self) -> String {
        qualify(self.namespace.as_deref(), &self.name)
    }
}

/// A name from an `extends`, `implements` or trait `use` clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Supertype {
    /// The name as written in source, leading `\` stripped.
    pub name: String,
    /// `None` when the declaration could not be located.
    pub kind: Option<ClassLikeKind>,
    pub is_abstract: bool,
}

impl Supertype {
    pub fn unresolved(name: impl Into<String>) -> Self {
        let name = name.into();
        Supertype {
            name: name.trim_start_matches('\\').to_string(),
            kind: None,
            is_abstract: false,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.kind.is_some()
    }
}

/// A class, interface, trait or enum.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassLike {
    pub kind: ClassLikeKind,
    pub name: String,
    pub namespace: Option<String>,
    pub is_abstract: bool,
    pub is_final: bool,
    /// Parent class for classes; parent interfaces for interfaces.
    pub extends: Vec<Supertype>,
    pub implements: Vec<Supertype>,
    pub traits: Vec<Supertype>,
    pub methods: Collection<Method>,
    pub properties: Collection<Property>,
    pub constants: Collection<Constant>,
    pub docs: Documentation,
    /// Byte offset where the class body starts (left brace).
    pub start_offset: u32,
    /// Byte offset where the class body ends (right brace).
    pub end_offset: u32,
}

impl ClassLike {
    /// Fully-qualified name, without a leading `\`.
    pub fn fqn(&self) -> String {
        qualify(self.namespace.as_deref(), &self.name)
    }

    /// Every declared supertype in `extends`, `implements`, `use` order.
    pub fn supertypes(&self) -> impl Iterator<Item = &Supertype> {
        self.extends
            .iter()
            .chain(self.implements.iter())
            .chain(self.traits.iter())
    }
}

pub(crate) fn qualify(namespace: Option<&str>, name: &str) -> String {
    match namespace {
        Some(ns) if !ns.is_empty() => format!("{ns}\\{name}"),
        _ => name.to_string(),
    }
}

/// A virtual member contributed by a [`MemberProvider`](crate::MemberProvider).
#[derive(Debug, Clone, PartialEq)]
pub enum Member {
    Method(Method),
    Property(Property),
    Constant(Constant),
}

/// Any reflected code entity.
#[derive(Debug, Clone, PartialEq)]
pub enum Symbol {
    ClassLike(ClassLike),
    Function(Function),
    Method(Method),
    Property(Property),
    Constant(Constant),
}

impl Symbol {
    pub fn name(&self) -> &str {
        match self {
            Symbol::ClassLike(c) => &c.name,
            Symbol::Function(f) => &f.name,
            Symbol::Method(m) => &m.name,
            Symbol::Property(p) => &p.name,
            Symbol::Constant(c) => &c.name,
        }
    }

    /// Top-level functions and class-likes are always public.
    pub fn visibility(&self) -> Visibility {
        match self {
            Symbol::ClassLike(_) | Symbol::Function(_) => Visibility::Public,
            Symbol::Method(m) => m.visibility,
            Symbol::Property(p) => p.visibility,
            Symbol::Constant(c) => c.visibility,
        }
    }

    /// Short lowercase label such as `"class"`, `"method"` or `"function"`.
    pub fn kind_label(&self) -> &'static str {
        match self {
            Symbol::ClassLike(c) => c.kind.keyword(),
            Symbol::Function(_) => "function",
            Symbol::Method(_) => "method",
            Symbol::Property(_) => "property",
            Symbol::Constant(_) => "constant",
        }
    }
}

impl From<ClassLike> for Symbol {
    fn from(value: ClassLike) -> Self {
        Symbol::ClassLike(value)
    }
}

impl From<Function> for Symbol {
    fn from(value: Function) -> Self {
        Symbol::Function(value)
    }
}

impl From<Method> for Symbol {
    fn from(value: Method) -> Self {
        Symbol::Method(value)
    }
}

impl From<Property> for Symbol {
    fn from(value: Property) -> Self {
        Symbol::Property(value)
    }
}

impl From<Constant> for Symbol {
    fn from(value: Constant) -> Self {
        Symbol::Constant(value)
    }
}

/// Presentation wrapper built ad hoc by the hover feature.
#[derive(Debug, Clone, PartialEq)]
pub struct HoverInformation {
    pub title: String,
    /// Free text that may contain markup; not a documentation symbol.
    pub docs: String,
    pub symbol: Symbol,
}

impl HoverInformation {
    pub fn new(title: impl Into<String>, docs: impl Into<String>, symbol: impl Into<Symbol>) -> Self {
        HoverInformation {
            title: title.into(),
            docs: docs.into(),
            symbol: symbol.into(),
        }
    }
}

/// The result of reflecting at a cursor offset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OffsetResolution {
    /// Innermost class-like, method or function containing the offset.
    pub enclosing: Option<Symbol>,
    /// Variables bound before the offset, in first-assignment order, each
    /// with the type of its most recent assignment.
    pub locals: IndexMap<String, Type>,
}

impl OffsetResolution {
    /// Type of local `$name` (with or without the `$`).
    pub fn local(&self, name: &str) -> Option<&Type> {
        self.locals.get(name.strip_prefix('$').unwrap_or(name))
    }
}

// ─── Collections ────────────────────────────────────────────────────────────

/// A symbol that can be looked up by name in a [`Collection`].
pub trait Named {
    /// Label used in `NotFound` errors.
    const KIND: &'static str;
    /// PHP matches class, function and method names case-insensitively.
    const CASE_SENSITIVE: bool;

    fn name(&self) -> &str;

    fn matches(&self, name: &str) -> bool {
        if Self::CASE_SENSITIVE {
            self.name() == name
        } else {
            self.name().eq_ignore_ascii_case(name)
        }
    }
}

impl Named for ClassLike {
    const KIND: &'static str = "class";
    const CASE_SENSITIVE: bool = false;

    fn name(&self) -> &str {
        &self.name
    }

    /// Accepts the short name or the fully-qualified name.
    fn matches(&self, name: &str) -> bool {
        let name = name.strip_prefix('\\').unwrap_or(name);
        self.name.eq_ignore_ascii_case(name) || self.fqn().eq_ignore_ascii_case(name)
    }
}

impl Named for Function {
    const KIND: &'static str = "function";
    const CASE_SENSITIVE: bool = false;

    fn name(&self) -> &str {
        &self.name
    }

    fn matches(&self, name: &str) -> bool {
        let name = name.strip_prefix('\\').unwrap_or(name);
        self.name.eq_ignore_ascii_case(name) || self.fqn().eq_ignore_ascii_case(name)
    }
}

impl Named for Method {
    const KIND: &'static str = "method";
    const CASE_SENSITIVE: bool = false;

    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for Property {
    const KIND: &'static str = "property";
    const CASE_SENSITIVE: bool = true;

    fn name(&self) -> &str {
        &self.name
    }

    fn matches(&self, name: &str) -> bool {
        self.name == name.strip_prefix('$').unwrap_or(name)
    }
}

impl Named for Constant {
    const KIND: &'static str = "constant";
    const CASE_SENSITIVE: bool = true;

    fn name(&self) -> &str {
        &self.name
    }
}

/// An ordered collection of symbols with name lookup.
///
/// Order is declaration order, which is also the order rendered output
/// lists members in.
#[derive(Debug, Clone, PartialEq)]
pub struct Collection<T> {
    items: Vec<T>,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Collection { items: Vec::new() }
    }
}

impl<T: Named> Collection<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// The first element in declaration order.
    pub fn first(&self) -> Result<&T, ReflectionError> {
        self.items.first().ok_or(ReflectionError::NotFound {
            kind: T::KIND,
            name: None,
        })
    }

    /// The element called `name`.
    pub fn get(&self, name: &str) -> Result<&T, ReflectionError> {
        self.find(name)
            .ok_or_else(|| ReflectionError::not_found(T::KIND, name))
    }

    pub fn find(&self, name: &str) -> Option<&T> {
        self.items.iter().find(|item| item.matches(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    pub fn push(&mut self, item: T) {
        self.items.push(item);
    }

    /// Add `item` unless an element with the same name is already present.
    /// Returns whether it was added.
    pub fn insert_if_absent(&mut self, item: T) -> bool {
        if self.contains(item.name()) {
            return false;
        }
        self.items.push(item);
        true
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_vec(self) -> Vec<T> {
        self.items
    }
}

impl<T> FromIterator<T> for Collection<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Collection {
            items: iter.into_iter().collect(),
        }
    }
}

impl<'a, T> IntoIterator for &'a Collection<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T> IntoIterator for Collection<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}
