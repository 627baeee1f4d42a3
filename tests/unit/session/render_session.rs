use super::*;
use crate::{
    encode::sink::InMemorySink,
    foundation::core::{Canvas, Fps},
};

fn tiny() -> RenderConfig {
    RenderConfig {
        canvas: Canvas {
            width: 32,
            height: 18,
        },
        fps: Fps::new(1, 1).unwrap(),
        ..RenderConfig::default()
    }
}

#[test]
fn renders_every_frame_in_order() {
    let session = RenderSession::new(tiny()).unwrap();
    let expected = session.duration_frames().unwrap();
    assert!((85..=87).contains(&expected), "{expected}");

    let mut sink = InMemorySink::new();
    let stats = session.render_all(&mut sink).unwrap();
    assert_eq!(stats.frames, expected);
    assert!((stats.duration_secs - 85.0).abs() <= 1.0);
    assert!(sink.is_ended());

    let frames = sink.frames();
    assert_eq!(frames.len() as u64, expected);
    for (i, (idx, frame)) in frames.iter().enumerate() {
        assert_eq!(idx.0, i as u64);
        assert_eq!((frame.width, frame.height), (32, 18));
    }
    // The view background fills the corner.
    assert_eq!(frames[0].1.pixel(0, 0), Some([0x22, 0x22, 0x22, 255]));

    let single = session.render_frame(FrameIndex(3)).unwrap();
    assert_eq!(single, frames[3].1);
}

#[test]
fn frames_past_the_end_are_rejected() {
    let session = RenderSession::new(tiny()).unwrap();
    let total = session.duration_frames().unwrap();
    assert!(session.render_frame(FrameIndex(total)).is_err());
}

#[test]
fn invalid_config_is_rejected() {
    let mut cfg = tiny();
    cfg.reference_height = 0.0;
    assert!(RenderSession::new(cfg).is_err());
}
