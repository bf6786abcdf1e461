//! Session configuration for filter chains.
//!
//! ```toml
//! version = 1
//!
//! [seed]
//! hue = 30
//! saturation = 1.0
//! lightness = 0.75
//!
//! [chain]
//! name = "Warm"
//! preset = "posterize:5;blend_multiply:ff8000,40;~Warm"
//!
//! [menu]
//! order = ["posterize", "blend_multiply"]
//! ```
//!
//! Every section is optional. `preset` accepts either encoding understood by
//! [`FilterChain::decode`]; when it carries a name, that name wins over
//! `chain.name`.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use huechain::catalog::{builtin_definitions, MENU_ORDER};
use huechain::{CodecError, FilterChain, FilterRegistry, RegistryError};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to read configuration at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
    #[error("preset does not decode: {0}")]
    Preset(#[source] CodecError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionConfig {
    pub version: u32,
    #[serde(default)]
    pub seed: Seed,
    #[serde(default)]
    pub chain: ChainDefaults,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub menu: Option<MenuOverride>,
}

/// Base color in degrees / unit saturation / unit lightness.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Seed {
    pub hue: f32,
    pub saturation: f32,
    pub lightness: f32,
}

impl Default for Seed {
    fn default() -> Self {
        Self {
            hue: huechain::chain::DEFAULT_HUE,
            saturation: huechain::chain::DEFAULT_SATURATION,
            lightness: huechain::chain::DEFAULT_LIGHTNESS,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ChainDefaults {
    pub name: Option<String>,
    pub preset: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MenuOverride {
    pub order: Vec<String>,
}

impl SessionConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let raw: SessionConfig = toml::from_str(input)?;
        raw.validate()?;
        Ok(raw)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let input = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&input)?;
        debug!(path = %path.display(), "loaded session config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != 1 {
            return Err(ConfigError::Invalid(format!(
                "unsupported config version {}; expected 1",
                self.version
            )));
        }

        if !self.seed.hue.is_finite() {
            return Err(ConfigError::Invalid("seed hue must be finite".into()));
        }
        for (field, value) in [
            ("saturation", self.seed.saturation),
            ("lightness", self.seed.lightness),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid(format!(
                    "seed {field} must be within 0..=1, got {value}"
                )));
            }
        }

        if let Some(menu) = &self.menu {
            let builtin = FilterRegistry::builtin();
            for (index, id) in menu.order.iter().enumerate() {
                if !builtin.contains(id) {
                    return Err(ConfigError::Invalid(format!(
                        "menu entry '{id}' is not a known filter"
                    )));
                }
                if menu.order[..index].contains(id) {
                    return Err(ConfigError::Invalid(format!(
                        "menu entry '{id}' is listed twice"
                    )));
                }
            }
        }

        if let Some(preset) = &self.chain.preset {
            FilterChain::new()
                .decode(preset)
                .map_err(ConfigError::Preset)?;
        }
        Ok(())
    }

    /// Menu order, falling back to the compiled-in one.
    pub fn menu(&self) -> Vec<String> {
        match &self.menu {
            Some(menu) => menu.order.clone(),
            None => MENU_ORDER.iter().map(|id| id.to_string()).collect(),
        }
    }

    /// The built-in registry, or a copy carrying the configured menu order.
    /// Filters left out of the override are still registered, only unlisted.
    pub fn registry(&self) -> Result<Arc<FilterRegistry>, ConfigError> {
        if self.menu.is_none() {
            return Ok(FilterRegistry::builtin());
        }
        let mut registry = FilterRegistry::new();
        for definition in builtin_definitions() {
            registry.register(definition)?;
        }
        registry.set_menu(self.menu());
        Ok(Arc::new(registry))
    }

    /// A fresh chain with the seed, name and preset applied.
    pub fn build_chain(&self) -> Result<FilterChain, ConfigError> {
        let mut chain = FilterChain::with_registry(self.registry()?);
        chain.set_base_hsl(self.seed.hue, self.seed.saturation, self.seed.lightness);
        if let Some(name) = &self.chain.name {
            chain.set_name(name.clone());
        }
        if let Some(preset) = &self.chain.preset {
            chain.decode(preset).map_err(ConfigError::Preset)?;
        }
        Ok(chain)
    }
}
