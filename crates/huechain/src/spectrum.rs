//! Host-side spectrum rasters: a chain evaluated over a sweep of seeds.
//!
//! Each image axis may drive one HSL component from 0 at the left (top) edge
//! to 1 at the right (bottom) edge, or the reverse when inverted. Components
//! no axis drives keep the chain's base value. Pixels are sampled at their
//! centers, the same points a rasterized quad shades.

use crate::chain::FilterChain;
use crate::math::Vec3;

/// HSL component swept along one image axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpectrumAxis {
    #[default]
    None,
    Hue,
    Saturation,
    Lightness,
}

impl SpectrumAxis {
    /// Overrides this axis' component of a normalized HSL vector with `t`.
    pub fn sweep(self, hsl: Vec3, t: f32) -> Vec3 {
        match self {
            SpectrumAxis::None => hsl,
            SpectrumAxis::Hue => Vec3::new(t, hsl.y, hsl.z),
            SpectrumAxis::Saturation => Vec3::new(hsl.x, t, hsl.z),
            SpectrumAxis::Lightness => Vec3::new(hsl.x, hsl.y, t),
        }
    }
}

/// Position in `[0, 1]` of pixel `index`'s center along an axis of `extent`.
pub fn axis_position(index: usize, extent: usize, invert: bool) -> f32 {
    let t = (index as f32 + 0.5) / extent as f32;
    if invert {
        1.0 - t
    } else {
        t
    }
}

/// Renders `chain` over a `width` x `height` sweep as tightly packed RGBA8
/// rows, top row first. Hidden filters are skipped as in
/// [`FilterChain::computed_color`].
pub fn render_spectrum(
    chain: &FilterChain,
    width: usize,
    height: usize,
    x_axis: SpectrumAxis,
    invert_x: bool,
    y_axis: SpectrumAxis,
    invert_y: bool,
) -> Vec<u8> {
    let base = chain.base_hsl_normalized();
    let mut data = Vec::with_capacity(width * height * 4);
    for row in 0..height {
        let row_hsl = y_axis.sweep(base, axis_position(row, height, invert_y));
        for column in 0..width {
            let hsl = x_axis.sweep(row_hsl, axis_position(column, width, invert_x));
            let color = chain.apply_filters(crate::math::hsl2rgb(hsl));
            data.extend_from_slice(&[
                to_byte(color.x),
                to_byte(color.y),
                to_byte(color.z),
                u8::MAX,
            ]);
        }
    }
    data
}

fn to_byte(channel: f32) -> u8 {
    (channel.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::hsl2rgb;

    fn pixel(data: &[u8], width: usize, column: usize, row: usize) -> [u8; 4] {
        let at = (row * width + column) * 4;
        [data[at], data[at + 1], data[at + 2], data[at + 3]]
    }

    #[test]
    fn axes_override_only_their_component() {
        let hsl = Vec3::new(0.1, 0.2, 0.3);
        assert_eq!(SpectrumAxis::None.sweep(hsl, 0.9), hsl);
        assert_eq!(SpectrumAxis::Hue.sweep(hsl, 0.9), Vec3::new(0.9, 0.2, 0.3));
        assert_eq!(SpectrumAxis::Saturation.sweep(hsl, 0.9), Vec3::new(0.1, 0.9, 0.3));
        assert_eq!(SpectrumAxis::Lightness.sweep(hsl, 0.9), Vec3::new(0.1, 0.2, 0.9));
    }

    #[test]
    fn positions_are_pixel_centers() {
        assert_eq!(axis_position(0, 4, false), 0.125);
        assert_eq!(axis_position(3, 4, false), 0.875);
        assert_eq!(axis_position(0, 4, true), 0.875);
        assert_eq!(axis_position(3, 4, true), 0.125);
    }

    #[test]
    fn no_axes_fill_with_the_computed_color() {
        let mut chain = FilterChain::new();
        chain.add_filter("posterize").unwrap();
        let data = render_spectrum(
            &chain,
            3,
            2,
            SpectrumAxis::None,
            false,
            SpectrumAxis::None,
            true,
        );
        assert_eq!(data.len(), 3 * 2 * 4);
        let expected = chain.computed_color();
        let first = pixel(&data, 3, 0, 0);
        assert_eq!(
            first,
            [to_byte(expected.x), to_byte(expected.y), to_byte(expected.z), 255]
        );
        assert!(data.chunks(4).all(|chunk| chunk == first));
    }

    #[test]
    fn lightness_runs_down_and_inverts() {
        let mut chain = FilterChain::new();
        chain.set_base_hsl(0.0, 0.0, 0.5);
        let down = render_spectrum(
            &chain,
            1,
            4,
            SpectrumAxis::None,
            false,
            SpectrumAxis::Lightness,
            false,
        );
        let rows: Vec<u8> = (0..4).map(|row| pixel(&down, 1, 0, row)[0]).collect();
        assert_eq!(rows, vec![32, 96, 159, 223]);

        let up = render_spectrum(
            &chain,
            1,
            4,
            SpectrumAxis::None,
            false,
            SpectrumAxis::Lightness,
            true,
        );
        let rows: Vec<u8> = (0..4).map(|row| pixel(&up, 1, 0, row)[0]).collect();
        assert_eq!(rows, vec![223, 159, 96, 32]);
    }

    #[test]
    fn hue_sweeps_across_columns() {
        let chain = FilterChain::new();
        let width = 6;
        let data = render_spectrum(
            &chain,
            width,
            1,
            SpectrumAxis::Hue,
            false,
            SpectrumAxis::None,
            false,
        );
        let (_, saturation, lightness) = chain.base_hsl();
        for column in 0..width {
            let hue = axis_position(column, width, false);
            let expected = hsl2rgb(Vec3::new(hue, saturation, lightness));
            assert_eq!(
                pixel(&data, width, column, 0),
                [to_byte(expected.x), to_byte(expected.y), to_byte(expected.z), 255]
            );
        }
        let mirrored = render_spectrum(
            &chain,
            width,
            1,
            SpectrumAxis::Hue,
            true,
            SpectrumAxis::None,
            false,
        );
        assert_eq!(pixel(&mirrored, width, 0, 0), pixel(&data, width, width - 1, 0));
    }

    #[test]
    fn both_axes_combine_and_filters_apply() {
        let mut chain = FilterChain::new();
        chain.set_base_hsl(200.0, 0.5, 0.5);
        let key = chain.add_filter("blend_darken").unwrap();
        let data = render_spectrum(
            &chain,
            2,
            2,
            SpectrumAxis::Saturation,
            false,
            SpectrumAxis::Lightness,
            false,
        );
        let hsl = Vec3::new(200.0 / 360.0, 0.75, 0.75);
        let expected = chain.apply_filters(hsl2rgb(hsl));
        assert_eq!(
            pixel(&data, 2, 1, 1),
            [to_byte(expected.x), to_byte(expected.y), to_byte(expected.z), 255]
        );

        chain.set_visible(key, false).unwrap();
        let plain = render_spectrum(
            &chain,
            2,
            2,
            SpectrumAxis::Saturation,
            false,
            SpectrumAxis::Lightness,
            false,
        );
        let seed = hsl2rgb(hsl);
        assert_eq!(
            pixel(&plain, 2, 1, 1),
            [to_byte(seed.x), to_byte(seed.y), to_byte(seed.z), 255]
        );
    }
}
