/// Source location for cross-file references.
///
/// A [`SourceLocator`] maps a symbol name (class-like or function) to the
/// full source text that declares it.  The [`Reflector`](crate::Reflector)
/// uses locators to find out what an `extends`/`implements`/`use` name
/// refers to, and to serve `reflect_class` / `reflect_function`.
///
/// Sub-modules:
/// - [`memory`]: In-memory name → source map
/// - [`directory`]: PSR-4 style lookup with a lazy index of a source tree
mod directory;
mod memory;

pub use directory::DirectorySourceLocator;
pub use memory::TemporarySourceLocator;

use crate::error::ReflectionError;
use crate::parser;
use crate::type_resolver::TypeResolver;

pub trait SourceLocator: Send + Sync {
    /// Return the source text declaring `name`, or `NotFound`.
    ///
    /// `name` may be short or fully qualified, with or without a leading
    /// `\`.  I/O failures are reported as `NotFound` too.
    fn locate(&self, name: &str) -> Result<String, ReflectionError>;
}

/// A shared locator can be registered while the caller keeps a handle to
/// fill it later.
impl<T: SourceLocator + ?Sized> SourceLocator for std::sync::Arc<T> {
    fn locate(&self, name: &str) -> Result<String, ReflectionError> {
        (**self).locate(name)
    }
}

/// Normalise a symbol name into an index key: leading `\` stripped and
/// lowercased, since PHP class and function names are case-insensitive.
pub(crate) fn index_key(name: &str) -> String {
    name.trim_start_matches('\\').to_ascii_lowercase()
}

/// Every class-like and function name declared in `source`, both short
/// and fully qualified, as index keys.
///
/// A source the parser gives up on declares nothing.
pub(crate) fn declared_names(source: &str) -> Vec<String> {
    let parsed = match parser::parse_source(source, &TypeResolver::default()) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::warn!("not indexing unparseable source: {e}");
            return Vec::new();
        }
    };

    let mut names = Vec::new();
    let qualified = parsed
        .classes
        .iter()
        .map(|parsed| (parsed.class.name.as_str(), parsed.class.fqn()))
        .chain(parsed.functions.iter().map(|f| (f.name.as_str(), f.fqn())));
    for (short, fqn) in qualified {
        let short = index_key(short);
        let fqn = index_key(&fqn);
        if fqn != short {
            names.push(fqn);
        }
        names.push(short);
    }
    names
}
