use std::sync::Arc;

use huechain::math::{hsl2rgb, rgb2hsl};
use huechain::{
    ControlKind, ControlValue, FilterChain, FilterDefinition, FilterRegistry, Vec3, Vec4,
};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing_subscriber::EnvFilter;

const NAME_CHARS: &[char] = &['a', 'Z', ' ', '~', ';', ',', ':', '{', '7', 'é'];

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}

fn definitions() -> Vec<Arc<FilterDefinition>> {
    FilterRegistry::builtin().menu().cloned().collect()
}

/// A value already quantized to what the encodings can carry exactly.
fn random_value(rng: &mut StdRng, kind: ControlKind) -> ControlValue {
    match kind {
        ControlKind::Color { .. } => {
            let mut channel = || f32::from(rng.gen::<u8>()) / 255.0;
            ControlValue::Color(Vec3::new(channel(), channel(), channel()))
        }
        ControlKind::Number { range, .. } | ControlKind::Slider { range, .. } => {
            let scale = 10i32.pow(range.precision);
            let low = (range.min * scale as f32).round() as i32;
            let high = (range.max * scale as f32).round() as i32;
            ControlValue::Number(rng.gen_range(low..=high) as f32 / scale as f32)
        }
    }
}

fn random_name(rng: &mut StdRng) -> String {
    let len = rng.gen_range(0..12);
    (0..len)
        .map(|_| *NAME_CHARS.choose(rng).unwrap())
        .collect()
}

fn random_chain(rng: &mut StdRng) -> FilterChain {
    let definitions = definitions();
    let mut chain = FilterChain::new();
    chain.set_name(random_name(rng));
    for _ in 0..rng.gen_range(0..8) {
        let definition = definitions.choose(rng).unwrap();
        let key = chain.add_filter(definition.id()).unwrap();
        for (index, control) in definition.controls().iter().enumerate() {
            let value = random_value(rng, control.kind);
            chain.set_value(key, index, value).unwrap();
        }
    }
    chain
}

fn assert_in_unit_cube(color: Vec3, context: &str) {
    for channel in color.to_array() {
        assert!((0.0..=1.0).contains(&channel), "{context}: {color:?}");
    }
}

#[test]
fn posterize_floor_quantizes_the_default_seed() {
    let mut chain = FilterChain::new();
    chain.decode("posterize:5;~p").unwrap();
    assert_eq!(chain.base_hsl(), (30.0, 1.0, 0.75));
    assert_eq!(chain.parameter_slots(), vec![Vec4::new(5.0, 4.0, 0.0, 0.0)]);
    // floor((1, .75, .5) * 5) / 4 = (1.25, .75, .5), then clamped.
    assert_eq!(chain.computed_color(), Vec3::new(1.0, 0.75, 0.5));
}

#[test]
fn decodes_a_half_opacity_red_blend() {
    init_tracing();
    let mut chain = FilterChain::new();
    chain.decode("blend_normal:ff0000,50;~Test").unwrap();

    assert_eq!(chain.name(), "Test");
    assert_eq!(chain.filter_ids(), vec!["blend_normal"]);
    let filter = &chain.filters()[0];
    assert_eq!(
        filter.values(),
        &[
            ControlValue::Color(Vec3::new(1.0, 0.0, 0.0)),
            ControlValue::Number(50.0)
        ]
    );
    assert_eq!(filter.slots(), vec![Vec4::new(1.0, 0.0, 0.0, 0.5)]);
}

#[test]
fn unknown_ids_leave_the_chain_untouched() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut chain = random_chain(&mut rng);
    chain.add_filter("blend_overlay").unwrap();
    let before = chain.clone();
    let encoded = chain.encode();

    assert!(chain.decode("posterize:4;sparkle:1;~Other").is_err());
    assert_eq!(chain, before);

    let json = r##"{"name": "Other", "filters": [
        {"id": "posterize", "args": {"levels": 4}},
        {"id": "sparkle", "args": {}}
    ]}"##;
    assert!(chain.decode(json).is_err());
    assert_eq!(chain, before);
    assert_eq!(chain.encode(), encoded);
}

#[test]
fn compact_text_round_trips() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for _ in 0..200 {
        let chain = random_chain(&mut rng);
        let encoded = chain.encode();
        let mut decoded = FilterChain::new();
        decoded
            .decode(&encoded)
            .unwrap_or_else(|err| panic!("{encoded}: {err}"));
        assert_eq!(decoded, chain, "{encoded}");
    }
}

#[test]
fn json_round_trips() {
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..200 {
        let chain = random_chain(&mut rng);

        let mut loaded = FilterChain::new();
        let value = serde_json::to_value(chain.save_filters()).unwrap();
        loaded.load_filters(&value).unwrap();
        assert_eq!(loaded.filter_ids(), chain.filter_ids());
        assert_eq!(loaded.encode(), chain.encode());

        let text = chain.to_json().unwrap();
        let mut decoded = FilterChain::new();
        decoded.decode(&text).unwrap();
        assert_eq!(decoded.name(), chain.name());
        assert_eq!(decoded.encode(), chain.encode());
    }
}

#[test]
fn evaluation_stays_in_unit_cube() {
    let mut rng = StdRng::seed_from_u64(99);
    for definition in definitions() {
        for _ in 0..100 {
            let values: Vec<ControlValue> = definition
                .controls()
                .iter()
                .map(|control| random_value(&mut rng, control.kind))
                .collect();
            let color = Vec3::new(rng.gen(), rng.gen(), rng.gen());
            let out = huechain::math::clamp(definition.evaluate(color, &values), 0.0, 1.0);
            assert_in_unit_cube(out, definition.id());
        }
    }

    for _ in 0..100 {
        let mut chain = random_chain(&mut rng);
        // The seed itself is not clamped, only filter outputs are.
        chain.add_filter("hsl_adjust").unwrap();
        chain.set_base_hsl(
            rng.gen_range(-360.0..720.0),
            rng.gen_range(0.0..=1.0),
            rng.gen_range(0.0..=1.0),
        );
        assert_in_unit_cube(chain.computed_color(), &chain.encode());
    }
}

#[test]
fn hsl_round_trips_for_chromatic_colors() {
    let mut rng = StdRng::seed_from_u64(3);
    for _ in 0..1000 {
        let hsl = Vec3::new(
            rng.gen_range(0.0..1.0),
            rng.gen_range(0.1..=1.0),
            rng.gen_range(0.1..=0.9),
        );
        let back = rgb2hsl(hsl2rgb(hsl));
        let hue_error = (back.x - hsl.x).abs();
        assert!(hue_error.min(1.0 - hue_error) < 1e-3, "{hsl:?} -> {back:?}");
        assert!((back.y - hsl.y).abs() < 1e-3, "{hsl:?} -> {back:?}");
        assert!((back.z - hsl.z).abs() < 1e-3, "{hsl:?} -> {back:?}");
    }
}

#[test]
fn achromatic_colors_drop_hue() {
    let mut rng = StdRng::seed_from_u64(4);
    for _ in 0..100 {
        let hsl = Vec3::new(rng.gen(), 0.0, rng.gen());
        let back = rgb2hsl(hsl2rgb(hsl));
        assert_eq!(back.x, 0.0);
        assert_eq!(back.y, 0.0);
        assert!((back.z - hsl.z).abs() < 1e-6);
    }
}

#[test]
fn visibility_and_values_do_not_change_structure() {
    let mut chain = FilterChain::new();
    let a = chain.add_filter("hsl_adjust").unwrap();
    chain.add_filter("blend_burn").unwrap();
    let ids = chain.filter_ids();

    chain.set_visible(a, false).unwrap();
    chain.set_value(a, 0, ControlValue::Number(90.0)).unwrap();
    assert_eq!(chain.filter_ids(), ids);
    assert_eq!(chain.visibility(), vec![false, true]);
    assert_eq!(chain.parameter_slots()[0].x, 0.25);
}
