use std::fmt;
use std::sync::Arc;

use crate::control::{ControlError, ControlValue};
use crate::definition::FilterDefinition;
use crate::math::{Vec3, Vec4};

/// Chain-unique handle that stays attached to a filter across reorders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FilterKey(pub u64);

impl fmt::Display for FilterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "filter#{}", self.0)
    }
}

/// A definition bound to concrete control values and a visibility flag.
#[derive(Debug, Clone)]
pub struct ParameterizedFilter {
    key: FilterKey,
    definition: Arc<FilterDefinition>,
    values: Vec<ControlValue>,
    pub visible: bool,
}

impl ParameterizedFilter {
    /// Binds `definition` to its default values, visible.
    pub fn new(key: FilterKey, definition: Arc<FilterDefinition>) -> Self {
        let values = definition.default_values();
        Self {
            key,
            definition,
            values,
            visible: true,
        }
    }

    /// Binds explicit values; each must match its control's kind.
    pub fn with_values(
        key: FilterKey,
        definition: Arc<FilterDefinition>,
        values: Vec<ControlValue>,
    ) -> Result<Self, ControlError> {
        let mut filter = Self::new(key, definition);
        for (index, value) in values.into_iter().enumerate() {
            filter.set_value(index, value)?;
        }
        Ok(filter)
    }

    pub fn key(&self) -> FilterKey {
        self.key
    }

    pub fn id(&self) -> &str {
        self.definition.id()
    }

    pub fn definition(&self) -> &Arc<FilterDefinition> {
        &self.definition
    }

    pub fn values(&self) -> &[ControlValue] {
        &self.values
    }

    /// Sets the value of control `index`. Numbers are clamped into the control's range.
    pub fn set_value(&mut self, index: usize, value: ControlValue) -> Result<(), ControlError> {
        let control = self
            .definition
            .controls()
            .get(index)
            .ok_or(ControlError::UnknownControl(index))?;
        self.values[index] = control.accept(value)?;
        Ok(())
    }

    pub fn slots(&self) -> Vec<Vec4> {
        self.definition.vectorize(&self.values)
    }

    /// Unclamped result of this filter on `color`, regardless of visibility.
    pub fn apply(&self, color: Vec3) -> Vec3 {
        self.definition.apply(color, &self.slots())
    }
}

impl PartialEq for ParameterizedFilter {
    /// Compares what the filter does, not which list entry it is.
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id() && self.values == other.values && self.visible == other.visible
    }
}
