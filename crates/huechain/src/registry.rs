//! Id -> definition lookup plus the ordered "add filter" menu.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use thiserror::Error;
use tracing::{error, warn};

use crate::catalog::{builtin_definitions, MENU_ORDER};
use crate::definition::FilterDefinition;

#[derive(Debug, Error, PartialEq)]
pub enum RegistryError {
    #[error("filter '{id}' is invalid: {reason}")]
    InvalidDefinition { id: String, reason: String },
    #[error("filter '{0}' is already registered")]
    Duplicate(String),
}

/// Registry entries and menu entries that do not line up.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MenuReport {
    /// Registered but absent from the menu.
    pub unlisted: Vec<String>,
    /// Listed in the menu but not registered; these are skipped.
    pub unknown: Vec<String>,
}

impl MenuReport {
    pub fn is_clean(&self) -> bool {
        self.unlisted.is_empty() && self.unknown.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct FilterRegistry {
    definitions: HashMap<String, Arc<FilterDefinition>>,
    /// Registration order.
    ids: Vec<String>,
    menu: Vec<String>,
}

impl FilterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The compiled-in catalog with its menu order. Built once.
    pub fn builtin() -> Arc<FilterRegistry> {
        static BUILTIN: OnceLock<Arc<FilterRegistry>> = OnceLock::new();
        BUILTIN
            .get_or_init(|| {
                let mut registry = FilterRegistry::new();
                for definition in builtin_definitions() {
                    if let Err(err) = registry.register(definition) {
                        error!(error = %err, "skipping built-in filter");
                    }
                }
                registry.set_menu(MENU_ORDER.iter().map(|id| id.to_string()));
                Arc::new(registry)
            })
            .clone()
    }

    /// Validates the slot contract and stores the definition.
    pub fn register(&mut self, definition: FilterDefinition) -> Result<(), RegistryError> {
        definition.validate()?;
        let id = definition.id().to_string();
        if self.definitions.contains_key(&id) {
            return Err(RegistryError::Duplicate(id));
        }
        self.ids.push(id.clone());
        self.definitions.insert(id, Arc::new(definition));
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&Arc<FilterDefinition>> {
        self.definitions.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.definitions.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Registered ids in registration order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    /// Menu entries that resolve to a definition, in menu order.
    pub fn menu(&self) -> impl Iterator<Item = &Arc<FilterDefinition>> {
        self.menu.iter().filter_map(|id| self.definitions.get(id))
    }

    /// Replaces the menu order. Mismatches are logged, never rejected.
    pub fn set_menu<I, S>(&mut self, ids: I) -> MenuReport
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.menu = ids.into_iter().map(Into::into).collect();
        let report = self.menu_report();
        for id in &report.unlisted {
            warn!(filter = %id, "filter is registered but missing from the menu");
        }
        for id in &report.unknown {
            warn!(filter = %id, "menu references an unregistered filter");
        }
        report
    }

    pub fn menu_report(&self) -> MenuReport {
        MenuReport {
            unlisted: self
                .ids
                .iter()
                .filter(|id| !self.menu.contains(id))
                .cloned()
                .collect(),
            unknown: self
                .menu
                .iter()
                .filter(|id| !self.definitions.contains_key(id.as_str()))
                .cloned()
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::BlendOptions;
    use crate::math::Vec3;

    fn screen() -> FilterDefinition {
        FilterDefinition::blend(BlendOptions {
            id: "blend_screen",
            name: "Blend Screen",
            default_color: Vec3::ONE,
            default_opacity: 100.0,
            expression: "1.0 - (1.0 - a) * (1.0 - b)",
            blend: |a, b| 1.0 - (1.0 - a) * (1.0 - b),
        })
    }

    #[test]
    fn builtin_registers_full_catalog() {
        let registry = FilterRegistry::builtin();
        assert_eq!(registry.len(), MENU_ORDER.len());
        assert!(registry.menu_report().is_clean());
        assert_eq!(
            registry.menu().map(|def| def.id()).collect::<Vec<_>>(),
            MENU_ORDER
        );
        assert!(registry.get("posterize").is_some());
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut registry = FilterRegistry::new();
        registry.register(screen()).unwrap();
        assert_eq!(
            registry.register(screen()),
            Err(RegistryError::Duplicate("blend_screen".into()))
        );
    }

    #[test]
    fn menu_mismatch_is_reported_not_fatal() {
        let mut registry = FilterRegistry::new();
        registry.register(screen()).unwrap();
        let report = registry.set_menu(["blend_missing"]);
        assert_eq!(report.unlisted, vec!["blend_screen".to_string()]);
        assert_eq!(report.unknown, vec!["blend_missing".to_string()]);
        assert_eq!(registry.menu().count(), 0);
        assert!(registry.contains("blend_screen"));
    }
}
