use huechain::Vec4;

use crate::synth::{ProgramLayout, SynthError};

/// CPU copy of the `FilterParams` block: `_params` followed by `_visible`.
///
/// Both arrays hold `vec4`s, so under std140 the block is a tight run of
/// 16-byte words and can be uploaded as is.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterUniforms {
    words: Vec<Vec4>,
    param_len: usize,
    slot_count: usize,
    filter_count: usize,
}

impl FilterUniforms {
    /// Zeroed block for `layout`; every filter starts hidden.
    pub fn new(layout: &ProgramLayout) -> Self {
        Self {
            words: vec![Vec4::ZERO; layout.param_len() + layout.visible_len()],
            param_len: layout.param_len(),
            slot_count: layout.slot_count,
            filter_count: layout.filter_count(),
        }
    }

    /// Copies flattened slots and per-filter visibility into the block.
    pub fn write(&mut self, slots: &[Vec4], visibility: &[bool]) -> Result<(), SynthError> {
        if slots.len() != self.slot_count {
            return Err(SynthError::UniformMismatch {
                what: "slots",
                expected: self.slot_count,
                found: slots.len(),
            });
        }
        if visibility.len() != self.filter_count {
            return Err(SynthError::UniformMismatch {
                what: "filters",
                expected: self.filter_count,
                found: visibility.len(),
            });
        }

        self.words[..slots.len()].copy_from_slice(slots);
        let (_, visible) = self.words.split_at_mut(self.param_len);
        visible.fill(Vec4::ZERO);
        for (index, shown) in visibility.iter().enumerate() {
            let word = &mut visible[index / 4];
            let value = if *shown { 1.0 } else { 0.0 };
            match index % 4 {
                0 => word.x = value,
                1 => word.y = value,
                2 => word.z = value,
                _ => word.w = value,
            }
        }
        Ok(())
    }

    pub fn params(&self) -> &[Vec4] {
        &self.words[..self.param_len]
    }

    pub fn visible(&self) -> &[Vec4] {
        &self.words[self.param_len..]
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.words)
    }
}
