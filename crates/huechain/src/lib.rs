//! Ordered color filter chains over an HSL seed.
//!
//! A [`FilterChain`] holds a base hue/saturation/lightness and a list of
//! [`ParameterizedFilter`]s, each one a registered [`FilterDefinition`] bound
//! to control values. The chain evaluates on the host through
//! [`FilterChain::computed_color`]; the `renderer` crate synthesizes the same
//! chain into a GLSL fragment program from [`FilterDefinition::template`] and
//! [`FilterChain::parameter_slots`].
//!
//! ```text
//!   seed hsl ─▶ hsl2rgb ─▶ filter 0 ─▶ clamp ─▶ filter 1 ─▶ clamp ─▶ …
//! ```
//!
//! Chains serialize to compact text (`id:v0,v1;…;~name`) and to JSON, see
//! [`FilterChain::encode`] and [`FilterChain::save_filters`].
//! [`render_spectrum`] rasterizes a chain over a sweep of seeds.

pub mod catalog;
pub mod chain;
pub mod codec;
pub mod control;
pub mod definition;
pub mod filter;
pub mod math;
pub mod registry;
pub mod spectrum;
pub mod template;

pub use chain::{ChainError, FilterChain};
pub use codec::{CodecError, SavedChain, SavedFilter};
pub use control::{
    color_to_hex, parse_hex_color, Control, ControlError, ControlKind, ControlValue, NumericRange,
};
pub use definition::{BlendOptions, FilterDefinition};
pub use filter::{FilterKey, ParameterizedFilter};
pub use math::{Vec3, Vec4};
pub use registry::{FilterRegistry, MenuReport, RegistryError};
pub use spectrum::{render_spectrum, SpectrumAxis};
