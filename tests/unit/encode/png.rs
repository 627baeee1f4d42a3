use super::*;
use crate::foundation::core::Fps;

fn scratch_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("recalc-{name}-{}", std::process::id()))
}

fn cfg() -> SinkConfig {
    SinkConfig {
        width: 2,
        height: 2,
        fps: Fps::new(30, 1).unwrap(),
    }
}

#[test]
fn writes_numbered_flattened_pngs() {
    let dir = scratch_dir("png-seq");
    let mut sink = PngSequenceSink::new(&dir, [0x22, 0x22, 0x22, 255]);
    sink.begin(cfg()).unwrap();

    let mut data = vec![0u8; 16];
    data[..4].copy_from_slice(&[255, 0, 0, 255]);
    let frame = FrameRGBA {
        width: 2,
        height: 2,
        data,
        premultiplied: true,
    };
    sink.push_frame(FrameIndex(0), &frame).unwrap();
    sink.push_frame(FrameIndex(1), &frame).unwrap();
    sink.end().unwrap();
    assert_eq!(sink.written(), 2);

    let first = sink.frame_path(FrameIndex(0));
    assert!(first.ends_with("frame_000000.png"));
    assert!(sink.frame_path(FrameIndex(1)).is_file());

    let img = image::open(&first).unwrap().to_rgba8();
    assert_eq!(img.get_pixel(0, 0).0, [255, 0, 0, 255]);
    assert_eq!(img.get_pixel(1, 1).0, [0x22, 0x22, 0x22, 255]);

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn push_before_begin_fails() {
    let mut sink = PngSequenceSink::new(scratch_dir("png-unstarted"), [0, 0, 0, 255]);
    let frame = FrameRGBA {
        width: 2,
        height: 2,
        data: vec![0; 16],
        premultiplied: true,
    };
    assert!(sink.push_frame(FrameIndex(0), &frame).is_err());
    assert!(sink.end().is_err());
}
