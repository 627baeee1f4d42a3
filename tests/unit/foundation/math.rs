use super::*;

#[test]
fn map_interpolates_between_bounds() {
    assert_eq!(map(0.1, 0.9, 0.0), 0.1);
    assert_eq!(map(0.1, 0.9, 1.0), 0.9);
    assert!((map(0.1, 0.9, 0.5) - 0.5).abs() < 1e-12);
}

#[test]
fn flatten_premul_alpha_0_returns_bg() {
    let src = vec![0u8, 0, 0, 0];
    let mut dst = vec![0u8; 4];
    flatten_premul_over_bg(&mut dst, &src, [10, 20, 30, 255]);
    assert_eq!(dst, vec![10, 20, 30, 255]);
}

#[test]
fn flatten_premul_half_red_over_black() {
    let src = vec![128u8, 0, 0, 128];
    let mut dst = vec![0u8; 4];
    flatten_premul_over_bg(&mut dst, &src, [0, 0, 0, 255]);
    assert_eq!(dst, vec![128, 0, 0, 255]);
}
