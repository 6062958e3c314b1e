//! Configuration file support for phpantom-hover
//!
//! Loads `.phpantom-hover.toml` from the current directory or its parents,
//! falling back to `phpantom-hover/config.toml` in the user config
//! directory.

use anyhow::{Context, Result};
use etcetera::BaseStrategy;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use phpantom_hover::UnresolvedTokenPolicy;

pub const FILE_NAME: &str = ".phpantom-hover.toml";

/// Configuration file structure
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub templates: TemplatesConfig,
    pub types: TypesConfig,
    pub cache: CacheConfig,
    pub locator: LocatorConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TemplatesConfig {
    /// Directory of `<variant-key>.md.hbs` files overriding the bundled ones
    pub path: Option<PathBuf>,
    /// Render class-likes without a template through the interface template
    pub interface_candidates: bool,
}

impl Default for TemplatesConfig {
    fn default() -> Self {
        Self {
            path: None,
            interface_candidates: true,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TypesConfig {
    /// What an unrecognised token inside a union becomes: "mixed" or "ignore"
    pub unresolved_in_union: UnresolvedTokenPolicy,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LocatorConfig {
    /// Source roots used to resolve supertypes declared in other files
    pub roots: Vec<PathBuf>,
}

impl Config {
    /// Load config searching from the current directory upward, then the
    /// user config directory.
    pub fn load() -> Result<Option<(Config, PathBuf)>> {
        if let Some(found) = Self::load_from(std::env::current_dir()?)? {
            return Ok(Some(found));
        }
        let Some(path) = user_config_path().filter(|p| p.is_file()) else {
            return Ok(None);
        };
        Ok(Some((Self::load_path(&path)?, path)))
    }

    /// Load config searching from the given directory upward
    pub fn load_from(start_dir: PathBuf) -> Result<Option<(Config, PathBuf)>> {
        let mut current = Some(start_dir.as_path());

        while let Some(dir) = current {
            let config_path = dir.join(FILE_NAME);
            if config_path.is_file() {
                let config = Self::load_path(&config_path)?;
                return Ok(Some((config, config_path)));
            }
            current = dir.parent();
        }

        Ok(None)
    }

    /// Load config from a specific path.  Relative paths inside the file
    /// are taken relative to the file's directory.
    pub fn load_path(path: &Path) -> Result<Config> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let mut config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        if let Some(base) = path.parent() {
            config.rebase(base);
        }
        Ok(config)
    }

    fn rebase(&mut self, base: &Path) {
        if let Some(templates) = self.templates.path.as_mut()
            && templates.is_relative()
        {
            *templates = base.join(&*templates);
        }
        for root in &mut self.locator.roots {
            if root.is_relative() {
                *root = base.join(&*root);
            }
        }
    }
}

fn user_config_path() -> Option<PathBuf> {
    let strategy = etcetera::choose_base_strategy().ok()?;
    Some(strategy.config_dir().join("phpantom-hover").join("config.toml"))
}
