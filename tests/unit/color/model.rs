use super::*;
use serde_json::json;

#[test]
fn parses_and_formats_hex() {
    let c = Color::from_hex("#ADFF5C").unwrap();
    assert_eq!(c.rgb(), [173.0, 255.0, 92.0]);
    assert_eq!(c.hex(), "#adff5c");

    assert_eq!(Color::from_hex("fab").unwrap().hex(), "#ffaabb");
    assert_eq!(Color::from_hex("#0000ff80").unwrap().hex(), "#0000ff80");
    assert!(Color::from_hex("#12345").is_err());
    assert!(Color::from_hex("#gg0000").is_err());
}

#[test]
fn channels_are_clamped_and_rounded_on_output() {
    let c = Color::from_rgb(-20.0, 127.6, 300.0);
    assert_eq!(c.rgb(), [0.0, 128.0, 255.0]);
    assert_eq!(c.to_rgba8(), [0, 128, 255, 255]);
}

#[test]
fn luminance_matches_reference_points() {
    assert_eq!(Color::BLACK.luminance(), 0.0);
    assert!((Color::WHITE.luminance() - 1.0).abs() < 1e-12);
    let red = Color::from_rgb(255.0, 0.0, 0.0);
    assert!((red.luminance() - 0.2126).abs() < 1e-9);
}

#[test]
fn with_luminance_hits_extremes_exactly_and_bisects_between() {
    let c = Color::from_hex("#336699").unwrap();
    assert_eq!(c.with_luminance(0.0), Color::BLACK);
    assert_eq!(c.with_luminance(1.0), Color::WHITE);

    let mid = c.with_luminance(0.5);
    assert!((mid.luminance() - 0.5).abs() < 1e-3);
}

#[test]
fn full_desaturation_is_gray_and_keeps_lightness() {
    let red = Color::from_hex("#ad0000").unwrap();
    let gray = red.desaturate(255.0);
    let [r, g, b] = gray.rgb();
    assert!((r - g).abs() <= 1.0 && (g - b).abs() <= 1.0);

    let [l_before, _, _] = red.to_lab();
    let [l_after, c_after, _] = gray.to_lch();
    assert!((l_before - l_after).abs() < 0.5);
    assert!(c_after < 0.5);
}

#[test]
fn lab_roundtrip_is_stable_for_primaries() {
    for hex in ["#ff0000", "#00ff00", "#0000ff", "#adadad", "#fab000"] {
        let c = Color::from_hex(hex).unwrap();
        let [l, a, b] = c.to_lab();
        assert_eq!(Color::from_lab(l, a, b, 1.0).hex(), hex);
    }
}

#[test]
fn lch_lerp_hits_endpoints_and_stays_between_grays() {
    let a = Color::from_hex("#adadad").unwrap();
    let b = Color::from_hex("#adff5c").unwrap();
    assert_eq!(Color::lerp_lch(a, b, 0.0), a);
    assert_eq!(Color::lerp_lch(a, b, 1.0), b);

    let black = Color::BLACK;
    let white = Color::WHITE;
    let mid = Color::lerp_lch(black, white, 0.5);
    let [r, g, b] = mid.rgb();
    assert!(r > 0.0 && r < 255.0);
    assert!((r - g).abs() <= 1.0 && (g - b).abs() <= 1.0);
}

#[test]
fn serde_accepts_hex_and_arrays() {
    let c: Color = serde_json::from_value(json!("#222222")).unwrap();
    assert_eq!(c.rgb(), [34.0, 34.0, 34.0]);

    let c: Color = serde_json::from_value(json!([255, 0, 255])).unwrap();
    assert_eq!(c.hex(), "#ff00ff");

    assert!(serde_json::from_value::<Color>(json!([1, 2])).is_err());
    assert_eq!(serde_json::to_value(c).unwrap(), json!("#ff00ff"));
}
