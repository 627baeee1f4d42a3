use super::*;

#[test]
fn fps_rejects_zero_parts() {
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(30, 0).is_err());
}

#[test]
fn fps_frames_secs_roundtrip_floor() {
    let fps = Fps::new(30000, 1001).unwrap();
    let secs = fps.frames_to_secs(123);
    assert_eq!(fps.secs_to_frames_floor(secs), 123);
}

#[test]
fn canvas_defaults_to_full_hd_and_validates() {
    let canvas = Canvas::default();
    assert_eq!(canvas.size(), Vec2::new(1920.0, 1080.0));
    assert!(canvas.validate().is_ok());
    assert!(
        Canvas {
            width: 0,
            height: 10
        }
        .validate()
        .is_err()
    );
}
