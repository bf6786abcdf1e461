//! The editable filter chain and its scalar evaluator.
//!
//! Evaluation seeds an RGB color from the base hue (degrees), saturation and
//! lightness, then folds the visible filters left to right. Each filter's
//! output is clamped to `[0, 1]` before the next one reads it, mirroring the
//! per-filter clamp in synthesized shader programs.

use std::sync::Arc;

use thiserror::Error;

use crate::control::{ControlError, ControlValue};
use crate::filter::{FilterKey, ParameterizedFilter};
use crate::math::{clamp, hsl_degrees_to_rgb, Vec3, Vec4};
use crate::registry::FilterRegistry;

pub const DEFAULT_NAME: &str = "Unnamed";
pub const DEFAULT_HUE: f32 = 30.0;
pub const DEFAULT_SATURATION: f32 = 1.0;
pub const DEFAULT_LIGHTNESS: f32 = 0.75;

#[derive(Debug, Error, PartialEq)]
pub enum ChainError {
    #[error("unknown filter '{0}'")]
    UnknownFilter(String),
    #[error("no filter with key {0}")]
    UnknownKey(FilterKey),
    #[error("index {index} is out of range for a chain of {len} filters")]
    IndexOutOfRange { index: usize, len: usize },
    #[error(transparent)]
    Control(#[from] ControlError),
}

#[derive(Debug, Clone)]
pub struct FilterChain {
    pub(crate) name: String,
    hue: f32,
    saturation: f32,
    lightness: f32,
    pub(crate) filters: Vec<ParameterizedFilter>,
    pub(crate) next_key: u64,
    registry: Arc<FilterRegistry>,
}

impl Default for FilterChain {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for FilterChain {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.hue == other.hue
            && self.saturation == other.saturation
            && self.lightness == other.lightness
            && self.filters == other.filters
    }
}

impl FilterChain {
    /// Empty chain over the built-in registry with the default seed.
    pub fn new() -> Self {
        Self::with_registry(FilterRegistry::builtin())
    }

    pub fn with_registry(registry: Arc<FilterRegistry>) -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            hue: DEFAULT_HUE,
            saturation: DEFAULT_SATURATION,
            lightness: DEFAULT_LIGHTNESS,
            filters: Vec::new(),
            next_key: 0,
            registry,
        }
    }

    pub fn registry(&self) -> &Arc<FilterRegistry> {
        &self.registry
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Base color as `(hue in degrees, saturation, lightness)`.
    pub fn base_hsl(&self) -> (f32, f32, f32) {
        (self.hue, self.saturation, self.lightness)
    }

    /// Base color as a normalized `(hue, saturation, lightness)` vector.
    pub fn base_hsl_normalized(&self) -> Vec3 {
        Vec3::new(self.hue / 360.0, self.saturation, self.lightness)
    }

    pub fn set_base_hsl(&mut self, hue: f32, saturation: f32, lightness: f32) {
        self.hue = hue;
        self.saturation = saturation;
        self.lightness = lightness;
    }

    pub fn filters(&self) -> &[ParameterizedFilter] {
        &self.filters
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn get(&self, key: FilterKey) -> Option<&ParameterizedFilter> {
        self.filters.iter().find(|filter| filter.key() == key)
    }

    pub fn position(&self, key: FilterKey) -> Option<usize> {
        self.filters.iter().position(|filter| filter.key() == key)
    }

    pub(crate) fn allocate_key(&mut self) -> FilterKey {
        let key = FilterKey(self.next_key);
        self.next_key += 1;
        key
    }

    /// Appends a filter with its definition's default values.
    pub fn add_filter(&mut self, id: &str) -> Result<FilterKey, ChainError> {
        let index = self.filters.len();
        self.insert_filter(index, id)
    }

    pub fn insert_filter(&mut self, index: usize, id: &str) -> Result<FilterKey, ChainError> {
        if index > self.filters.len() {
            return Err(ChainError::IndexOutOfRange {
                index,
                len: self.filters.len(),
            });
        }
        let definition = self
            .registry
            .get(id)
            .cloned()
            .ok_or_else(|| ChainError::UnknownFilter(id.to_string()))?;
        let key = self.allocate_key();
        self.filters
            .insert(index, ParameterizedFilter::new(key, definition));
        Ok(key)
    }

    pub fn remove_filter(&mut self, key: FilterKey) -> Result<ParameterizedFilter, ChainError> {
        let index = self.position(key).ok_or(ChainError::UnknownKey(key))?;
        Ok(self.filters.remove(index))
    }

    /// Moves the filter at `from` so that it ends up at `to`.
    pub fn move_filter(&mut self, from: usize, to: usize) -> Result<(), ChainError> {
        let len = self.filters.len();
        for index in [from, to] {
            if index >= len {
                return Err(ChainError::IndexOutOfRange { index, len });
            }
        }
        let filter = self.filters.remove(from);
        self.filters.insert(to, filter);
        Ok(())
    }

    pub fn set_visible(&mut self, key: FilterKey, visible: bool) -> Result<(), ChainError> {
        self.filter_mut(key)?.visible = visible;
        Ok(())
    }

    pub fn set_value(
        &mut self,
        key: FilterKey,
        control: usize,
        value: ControlValue,
    ) -> Result<(), ChainError> {
        self.filter_mut(key)?.set_value(control, value)?;
        Ok(())
    }

    pub fn clear(&mut self) {
        self.filters.clear();
    }

    fn filter_mut(&mut self, key: FilterKey) -> Result<&mut ParameterizedFilter, ChainError> {
        self.filters
            .iter_mut()
            .find(|filter| filter.key() == key)
            .ok_or(ChainError::UnknownKey(key))
    }

    /// Seed color in RGB, before any filter.
    pub fn base_color(&self) -> Vec3 {
        hsl_degrees_to_rgb(self.hue, self.saturation, self.lightness)
    }

    /// Final RGB after folding every visible filter, each clamped to `[0, 1]`.
    pub fn computed_color(&self) -> Vec3 {
        self.apply_filters(self.base_color())
    }

    /// Folds the visible filters over `color` instead of the seed.
    pub fn apply_filters(&self, color: Vec3) -> Vec3 {
        self.filters
            .iter()
            .filter(|filter| filter.visible)
            .fold(color, |color, filter| clamp(filter.apply(color), 0.0, 1.0))
    }

    /// Alias of [`FilterChain::computed_color`] used by swatch previews.
    pub fn filtered_color(&self) -> Vec3 {
        self.computed_color()
    }

    /// Structural id sequence, the only input that forces a shader rebuild.
    pub fn filter_ids(&self) -> Vec<String> {
        self.filters
            .iter()
            .map(|filter| filter.id().to_string())
            .collect()
    }

    /// All filters' slots back to back, hidden filters included.
    pub fn parameter_slots(&self) -> Vec<Vec4> {
        self.filters.iter().flat_map(|filter| filter.slots()).collect()
    }

    pub fn visibility(&self) -> Vec<bool> {
        self.filters.iter().map(|filter| filter.visible).collect()
    }
}
