use std::{
    io::{Read, Write},
    path::PathBuf,
    process::{Child, ChildStdin, Command, Stdio},
    thread::JoinHandle,
};

use crate::{
    encode::sink::{FrameSink, SinkConfig, check_frame, check_order, ensure_parent_dir},
    foundation::{
        core::FrameIndex,
        error::{RecalcError, RecalcResult},
        math::flatten_premul_over_bg,
    },
    render::frame::FrameRGBA,
};

/// Options for [`FfmpegSink`].
#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    /// Output MP4 path.
    pub out_path: PathBuf,
    /// Replace an existing file.
    pub overwrite: bool,
    /// Opaque color that translucent pixels are flattened over.
    pub bg_rgba: [u8; 4],
}

impl FfmpegSinkOpts {
    /// Overwriting MP4 output at `out_path` over black.
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        Self {
            out_path: out_path.into(),
            overwrite: true,
            bg_rgba: [0, 0, 0, 255],
        }
    }
}

/// H.264 MP4 writer that pipes raw RGBA frames into the system `ffmpeg`.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,
    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<JoinHandle<std::io::Result<Vec<u8>>>>,
    scratch: Vec<u8>,
    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
}

impl FfmpegSink {
    /// Sink writing to `opts.out_path`; nothing is spawned until `begin`.
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            child: None,
            stdin: None,
            stderr_drain: None,
            scratch: Vec::new(),
            cfg: None,
            last_idx: None,
        }
    }

    fn command(&self, cfg: &SinkConfig) -> Command {
        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .arg(if self.opts.overwrite { "-y" } else { "-n" })
            .args([
                "-loglevel",
                "error",
                "-f",
                "rawvideo",
                "-pix_fmt",
                "rgba",
                "-s",
                &format!("{}x{}", cfg.width, cfg.height),
                "-r",
                &format!("{}/{}", cfg.fps.num, cfg.fps.den),
                "-i",
                "pipe:0",
                "-an",
                "-c:v",
                "libx264",
                "-pix_fmt",
                "yuv420p",
                "-movflags",
                "+faststart",
            ])
            .arg(&self.opts.out_path);
        cmd
    }
}

impl FrameSink for FfmpegSink {
    fn begin(&mut self, cfg: SinkConfig) -> RecalcResult<()> {
        if cfg.width == 0 || cfg.height == 0 {
            return Err(RecalcError::validation(
                "ffmpeg sink width/height must be non-zero",
            ));
        }
        if !cfg.width.is_multiple_of(2) || !cfg.height.is_multiple_of(2) {
            return Err(RecalcError::validation(
                "ffmpeg sink width/height must be even (required for yuv420p mp4 output)",
            ));
        }
        ensure_parent_dir(&self.opts.out_path)?;
        if !self.opts.overwrite && self.opts.out_path.exists() {
            return Err(RecalcError::validation(format!(
                "output file '{}' already exists",
                self.opts.out_path.display()
            )));
        }
        if !is_ffmpeg_on_path() {
            return Err(RecalcError::evaluation(
                "ffmpeg is required for MP4 encoding, but was not found on PATH",
            ));
        }

        let mut child = self.command(&cfg).spawn().map_err(|e| {
            RecalcError::evaluation(format!("failed to spawn ffmpeg: {e}"))
        })?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| RecalcError::evaluation("failed to open ffmpeg stdin"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| RecalcError::evaluation("failed to open ffmpeg stderr"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut bytes = Vec::new();
            stderr.read_to_end(&mut bytes)?;
            Ok(bytes)
        });

        tracing::debug!(out = %self.opts.out_path.display(), width = cfg.width, height = cfg.height, "ffmpeg started");
        self.scratch = vec![0u8; (cfg.width as usize) * (cfg.height as usize) * 4];
        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stderr_drain = Some(stderr_drain);
        self.cfg = Some(cfg);
        self.last_idx = None;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> RecalcResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| RecalcError::evaluation("ffmpeg sink not started"))?;
        check_order(self.last_idx, idx)?;
        check_frame(cfg, frame)?;
        self.last_idx = Some(idx);

        flatten_premul_over_bg(&mut self.scratch, &frame.data, self.opts.bg_rgba);
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| RecalcError::evaluation("ffmpeg sink is already finalized"))?;
        stdin.write_all(&self.scratch).map_err(|e| {
            RecalcError::evaluation(format!("failed to write frame to ffmpeg stdin: {e}"))
        })
    }

    fn end(&mut self) -> RecalcResult<()> {
        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| RecalcError::evaluation("ffmpeg sink not started"))?;
        let status = child
            .wait()
            .map_err(|e| RecalcError::evaluation(format!("failed to wait for ffmpeg: {e}")))?;
        let stderr_bytes = match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| RecalcError::evaluation("ffmpeg stderr drain thread panicked"))?
                .map_err(|e| RecalcError::evaluation(format!("ffmpeg stderr read failed: {e}")))?,
            None => Vec::new(),
        };
        self.cfg = None;

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(RecalcError::evaluation(format!(
                "ffmpeg exited with status {status}: {}",
                stderr.trim()
            )));
        }
        Ok(())
    }
}

/// `true` when `ffmpeg -version` runs successfully.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
