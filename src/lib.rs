//! `recalc` renders an animated explainer of recalculate-on-change data flow.
//!
//! A small directed graph of colored nodes derives each node's color from its upstream nodes
//! through a combinator function. A fixed, narrated timeline changes a root color, sends markers
//! along the edges and recomputes the downstream nodes one wave at a time.
//!
//! The crate carries the engine pieces the story needs:
//!
//! - a scene arena with pull-based bindings ([`Scene`], [`Signal`])
//! - cooperative timeline tasks ([`Task`], [`Timeline`], [`tween`])
//! - the graph builder and edge traveler ([`Graph`], [`travel_along`])
//! - SVG compilation and CPU rasterization ([`scene_to_svg`], [`SvgRasterizer`])
//! - frame sinks for PNG sequences and MP4 ([`PngSequenceSink`], [`FfmpegSink`])
//! - a session that drives it all ([`RenderSession`])
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod animation;
mod color;
mod encode;
mod foundation;
mod graph;
mod render;
mod scene;
mod session;
mod timeline;

/// Render configuration.
pub mod config;
pub mod story;
pub mod travel;

pub use crate::foundation::core::{Canvas, Fps, FrameIndex, Point, Vec2};
pub use crate::foundation::error::{RecalcError, RecalcResult};

pub use crate::animation::{ease::Ease, lerp::Lerp};
pub use crate::color::{
    contrast::{LIGHT_THRESHOLD, opposite_extreme},
    model::{Color, Rgb},
};
pub use crate::config::RenderConfig;
pub use crate::encode::{
    ffmpeg::{FfmpegSink, FfmpegSinkOpts, is_ffmpeg_on_path},
    png::PngSequenceSink,
    sink::{FrameSink, InMemorySink, SinkConfig, ensure_parent_dir},
};
pub use crate::graph::{
    builder::{
        Combinator, DEFAULT_DIAMETER, DEFAULT_REFERENCE_HEIGHT, Graph, GraphNode, GraphSnapshot,
        GraphWarning, NodeDescriptor, NodeSnapshot,
    },
    combinators,
};
pub use crate::render::{frame::FrameRGBA, raster::SvgRasterizer, svg::scene_to_svg};
pub use crate::scene::{
    model::{
        CircleShape, ColorSource, Element, ElementId, ElementKind, LineShape, NumberSource,
        PointSource, PositionSource, RectShape, Scene, TextShape, TextSource,
    },
    resolve::{point_along_polyline, polyline_length},
    signal::{Signal, SignalStore, SignalValue},
};
pub use crate::session::render_session::{RenderSession, RenderStats};
pub use crate::story::Story;
pub use crate::timeline::{
    flow::{all, call, chain, defer, set, spawn, wait},
    scheduler::Timeline,
    task::{BoxTask, Progress, Task, TaskCtx},
    tween::tween,
};
pub use crate::travel::{DEFAULT_MARKER_SIZE, travel_along};
