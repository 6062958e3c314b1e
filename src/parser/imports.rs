/// Class name resolution against `use` imports and the current namespace.
use std::collections::HashMap;

use mago_syntax::ast::*;

use crate::types::qualify;

/// Class imports visible at one statement level, keyed by the lowercased
/// short name (or alias).
#[derive(Debug, Clone, Default)]
pub(crate) struct Imports {
    namespace: Option<String>,
    classes: HashMap<String, String>,
}

impl Imports {
    pub(crate) fn new(namespace: Option<&str>) -> Self {
        Self {
            namespace: namespace.map(str::to_string),
            classes: HashMap::new(),
        }
    }

    pub(crate) fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Collect the class imports declared directly in `statements`.
    /// Function and constant imports do not name classes and are skipped.
    pub(crate) fn collect<'s>(&mut self, statements: impl Iterator<Item = &'s Statement<'s>>) {
        for statement in statements {
            let Statement::Use(use_stmt) = statement else {
                continue;
            };
            match &use_stmt.items {
                UseItems::Sequence(seq) => {
                    for item in seq.items.iter() {
                        self.register(item, None);
                    }
                }
                UseItems::TypedSequence(_) | UseItems::TypedList(_) => {}
                UseItems::MixedList(list) => {
                    let prefix = list.namespace.value();
                    for maybe_typed in list.items.iter() {
                        if maybe_typed.r#type.is_none() {
                            self.register(&maybe_typed.item, Some(prefix));
                        }
                    }
                }
            }
        }
    }

    fn register(&mut self, item: &UseItem, group_prefix: Option<&str>) {
        let name = item.name.value().trim_start_matches('\\');
        let fqn = match group_prefix {
            Some(prefix) => format!("{}\\{name}", prefix.trim_start_matches('\\')),
            None => name.to_string(),
        };
        let alias = match &item.alias {
            Some(alias) => alias.identifier.value.to_string(),
            None => fqn.rsplit('\\').next().unwrap_or(&fqn).to_string(),
        };
        self.classes.insert(alias.to_ascii_lowercase(), fqn);
    }

    /// Fully qualified form of the class `name` as written in source.
    pub(crate) fn resolve_class(&self, name: &str) -> String {
        if let Some(fully_qualified) = name.strip_prefix('\\') {
            return fully_qualified.to_string();
        }
        let (first, rest) = match name.split_once('\\') {
            Some((first, rest)) => (first, Some(rest)),
            None => (name, None),
        };
        match (self.classes.get(&first.to_ascii_lowercase()), rest) {
            (Some(imported), Some(rest)) => format!("{imported}\\{rest}"),
            (Some(imported), None) => imported.clone(),
            (None, _) => qualify(self.namespace.as_deref(), name),
        }
    }
}
