/// Directory-backed source location.
///
/// A name like `Acme\Model\User` is resolved by:
///   1. Converting namespace separators to directory separators
///   2. Appending `.php`
///   3. Prepending each root in turn
///
/// Result: `<root>/Acme/Model/User.php`
///
/// Files that do not follow that layout (several classes per file, free
/// functions, fixture directories) are found through an index of every
/// `*.php` file under the roots.  The index is built on the first miss and
/// kept for the lifetime of the locator.
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;

use super::{SourceLocator, declared_names, index_key};
use crate::error::ReflectionError;

#[derive(Debug)]
pub struct DirectorySourceLocator {
    roots: Vec<PathBuf>,
    /// Index key to declaring file, `None` until first needed.
    index: RwLock<Option<HashMap<String, PathBuf>>>,
}

impl DirectorySourceLocator {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_roots([root.into()])
    }

    pub fn with_roots(roots: impl IntoIterator<Item = PathBuf>) -> Self {
        DirectorySourceLocator {
            roots: roots.into_iter().collect(),
            index: RwLock::new(None),
        }
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// `<root>/Foo/Bar.php` for `Foo\Bar`, if such a file exists.
    ///
    /// Names that could step outside a root (`..`, `/`, empty segments)
    /// have no conventional path.
    fn conventional_path(&self, name: &str) -> Option<PathBuf> {
        let segments: Vec<&str> = name.trim_start_matches('\\').split('\\').collect();
        let valid = segments.iter().all(|segment| {
            !segment.is_empty()
                && *segment != "."
                && *segment != ".."
                && !segment.contains(['/', '\0'])
        });
        if !valid {
            return None;
        }
        let relative = segments.join("/");
        self.roots
            .iter()
            .map(|root| root.join(format!("{relative}.php")))
            .find(|path| path.is_file())
    }

    fn indexed_path(&self, name: &str) -> Option<PathBuf> {
        let key = index_key(name);
        if let Some(index) = self.index.read().as_ref() {
            return index.get(&key).cloned();
        }

        let mut guard = self.index.write();
        // Another reader may have built it while we waited for the lock.
        let index = guard.get_or_insert_with(|| build_index(&self.roots));
        index.get(&key).cloned()
    }
}

/// Walk every root (respecting `.gitignore`) and index the names declared
/// by each `*.php` file.  The first file to declare a name keeps it.
fn build_index(roots: &[PathBuf]) -> HashMap<String, PathBuf> {
    let mut index = HashMap::new();
    for root in roots {
        if !root.is_dir() {
            tracing::warn!("source root {} is not a directory", root.display());
            continue;
        }
        for entry in ignore::WalkBuilder::new(root).build().filter_map(|e| e.ok()) {
            let path = entry.path();
            if !is_php_file(path) {
                continue;
            }
            let source = match std::fs::read_to_string(path) {
                Ok(source) => source,
                Err(e) => {
                    tracing::warn!("skipping {}: {e}", path.display());
                    continue;
                }
            };
            for name in declared_names(&source) {
                index.entry(name).or_insert_with(|| path.to_path_buf());
            }
        }
    }
    tracing::debug!("indexed {} names under {} roots", index.len(), roots.len());
    index
}

fn is_php_file(path: &Path) -> bool {
    path.is_file() && path.extension().is_some_and(|ext| ext == "php")
}

impl SourceLocator for DirectorySourceLocator {
    fn locate(&self, name: &str) -> Result<String, ReflectionError> {
        let not_found = || ReflectionError::not_found("source", name.trim_start_matches('\\'));

        let path = self
            .conventional_path(name)
            .or_else(|| self.indexed_path(name))
            .ok_or_else(not_found)?;

        std::fs::read_to_string(&path).map_err(|e| {
            tracing::warn!("failed to read {}: {e}", path.display());
            not_found()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    /// Helper: a temporary source tree.
    struct TestTree {
        dir: tempfile::TempDir,
    }

    impl TestTree {
        fn new() -> Self {
            TestTree {
                dir: tempfile::tempdir().expect("failed to create temp dir"),
            }
        }

        fn root(&self) -> &Path {
            self.dir.path()
        }

        fn create_php_file(&self, relative_path: &str, content: &str) {
            let full_path = self.dir.path().join(relative_path);
            if let Some(parent) = full_path.parent() {
                fs::create_dir_all(parent).expect("failed to create dirs");
            }
            fs::write(&full_path, content).expect("failed to write PHP file");
        }
    }

    #[test]
    fn resolves_conventional_layout() {
        let tree = TestTree::new();
        tree.create_php_file("Acme/User.php", "<?php namespace Acme; class User {}");
        let locator = DirectorySourceLocator::new(tree.root());

        let source = locator.locate("\\Acme\\User").expect("should locate");
        assert!(source.contains("class User"));
        // The index is never needed for a conventional hit.
        assert!(locator.index.read().is_none());
    }

    #[test]
    fn falls_back_to_index() {
        let tree = TestTree::new();
        tree.create_php_file(
            "fixtures/classes.php",
            "<?php\nclass SomeAbstract {}\ninterface DoesThis {}\nfunction helper() {}\n",
        );
        let locator = DirectorySourceLocator::new(tree.root());

        assert!(locator.locate("DoesThis").is_ok());
        assert!(locator.locate("helper").is_ok());
        assert!(locator.locate("someabstract").is_ok());
    }

    #[test]
    fn missing_name_is_not_found() {
        let tree = TestTree::new();
        tree.create_php_file("a.php", "<?php class A {}");
        let locator = DirectorySourceLocator::new(tree.root());
        assert!(matches!(
            locator.locate("B"),
            Err(ReflectionError::NotFound { kind: "source", .. })
        ));
    }

    #[test]
    fn names_cannot_escape_the_root() {
        let tree = TestTree::new();
        tree.create_php_file("secret.php", "<?php");
        tree.create_php_file("src/Acme/User.php", "<?php namespace Acme; class User {}");
        let locator = DirectorySourceLocator::new(tree.root().join("src"));

        let escaping = [
            "..\\secret",
            "Acme\\..\\..\\secret",
            "../secret",
            "Acme\\\\User",
            "Acme\\.\\User",
            "",
        ];
        for name in escaping {
            assert_eq!(locator.conventional_path(name), None, "{name:?}");
        }
        assert!(locator.locate("..\\secret").is_err());
        assert!(locator.conventional_path("Acme\\User").is_some());
    }

    #[test]
    fn missing_root_is_not_found() {
        let locator = DirectorySourceLocator::new("/nonexistent/phpantom-hover-root");
        assert!(locator.locate("Anything").is_err());
    }
}
