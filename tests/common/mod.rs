#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use phpantom_hover::{
    DocblockMemberProvider, ObjectRenderer, ObjectRendererBuilder, Reflector, ReflectorBuilder,
};

/// Marker for the cursor position in test sources.
pub const CURSOR: &str = "<>";

/// A reflector configured the way the hover feature uses it: docblock
/// virtual members and supertypes resolved from the snippet itself.
pub fn create_test_reflector() -> Reflector {
    ReflectorBuilder::new()
        .add_member_provider(DocblockMemberProvider)
        .enable_contextual_source_location()
        .build()
}

/// A renderer with the bundled templates and interface candidates enabled.
pub fn create_test_renderer() -> ObjectRenderer {
    ObjectRendererBuilder::new()
        .with_default_templates()
        .enable_interface_candidates()
        .build()
        .expect("bundled templates should compile")
}

/// Remove the `<>` cursor marker from `source` and return the cleaned
/// source with the marker's byte offset.
pub fn extract_offset(source: &str) -> (String, usize) {
    let offset = source
        .find(CURSOR)
        .unwrap_or_else(|| panic!("no {CURSOR} marker in source:\n{source}"));
    let mut cleaned = String::with_capacity(source.len() - CURSOR.len());
    cleaned.push_str(&source[..offset]);
    cleaned.push_str(&source[offset + CURSOR.len()..]);
    (cleaned, offset)
}

/// Directory of the bundled markdown templates.
pub fn templates_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("templates").join("markdown")
}

/// Helper: create a temp directory holding the given PHP files.
pub fn create_source_tree(files: &[(&str, &str)]) -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    for (rel_path, content) in files {
        let full = dir.path().join(rel_path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).expect("failed to create dirs");
        }
        fs::write(&full, content).expect("failed to write PHP file");
    }
    dir
}
