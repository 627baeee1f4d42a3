use std::{path::Path, sync::Arc};

use crate::{
    foundation::error::{RecalcError, RecalcResult},
    render::frame::FrameRGBA,
    scene::model::Scene,
};

/// Largest frame edge the rasterizer accepts.
const MAX_DIM: u32 = 16_384;

/// CPU rasterizer for compiled scene SVGs.
///
/// System fonts and any configured font directories are loaded once, when the rasterizer is
/// created.
pub struct SvgRasterizer {
    options: usvg::Options<'static>,
}

impl SvgRasterizer {
    /// Load system fonts plus `.ttf`/`.otf`/`.ttc` files found directly in `font_dirs`.
    #[tracing::instrument(skip(font_dirs))]
    pub fn new<P: AsRef<Path>>(font_dirs: &[P]) -> Self {
        let mut db = usvg::fontdb::Database::new();
        db.load_system_fonts();
        for dir in font_dirs {
            load_fonts_from_dir(&mut db, dir.as_ref());
        }
        tracing::debug!(faces = db.len(), "font database ready");

        Self {
            options: usvg::Options {
                fontdb: Arc::new(db),
                font_resolver: font_resolver(),
                ..Default::default()
            },
        }
    }

    /// Number of font faces available to text.
    pub fn font_faces(&self) -> usize {
        self.options.fontdb.len()
    }

    /// Rasterize an SVG document to a premultiplied frame of `width` x `height`.
    pub fn rasterize(&self, svg: &str, width: u32, height: u32) -> RecalcResult<FrameRGBA> {
        if width == 0 || height == 0 || width > MAX_DIM || height > MAX_DIM {
            return Err(RecalcError::validation(format!(
                "raster size {width}x{height} out of range (1..={MAX_DIM})"
            )));
        }
        let tree = usvg::Tree::from_str(svg, &self.options)
            .map_err(|e| RecalcError::evaluation(format!("parse svg tree: {e}")))?;

        let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
            .ok_or_else(|| RecalcError::evaluation("failed to allocate pixmap"))?;
        let sx = (width as f32) / tree.size().width();
        let sy = (height as f32) / tree.size().height();
        resvg::render(
            &tree,
            resvg::tiny_skia::Transform::from_scale(sx, sy),
            &mut pixmap.as_mut(),
        );

        Ok(FrameRGBA {
            width,
            height,
            data: pixmap.take(),
            premultiplied: true,
        })
    }

    /// Compile and rasterize the current state of `scene` at its canvas size.
    pub fn render_scene(&self, scene: &Scene) -> RecalcResult<FrameRGBA> {
        let canvas = scene.canvas();
        let svg = crate::render::svg::scene_to_svg(scene)?;
        self.rasterize(&svg, canvas.width, canvas.height)
    }
}

fn load_fonts_from_dir(db: &mut usvg::fontdb::Database, dir: &Path) {
    let Ok(rd) = std::fs::read_dir(dir) else {
        tracing::warn!(dir = %dir.display(), "font directory not readable");
        return;
    };

    for entry in rd.flatten() {
        let path = entry.path();
        let is_font = path
            .extension()
            .and_then(|s| s.to_str())
            .map(|ext| matches!(ext.to_ascii_lowercase().as_str(), "ttf" | "otf" | "ttc"))
            .unwrap_or(false);
        if is_font
            && path.is_file()
            && let Err(e) = db.load_font_file(&path)
        {
            tracing::warn!(path = %path.display(), error = %e, "skipping font file");
        }
    }
}

/// Resolve CSS family lists, falling back to any installed face.
fn font_resolver() -> usvg::FontResolver<'static> {
    usvg::FontResolver {
        select_font: Box::new(|font, fontdb| {
            let mut families: Vec<usvg::fontdb::Family<'_>> = font
                .families()
                .iter()
                .map(|family| match family {
                    usvg::FontFamily::Serif => usvg::fontdb::Family::Serif,
                    usvg::FontFamily::SansSerif => usvg::fontdb::Family::SansSerif,
                    usvg::FontFamily::Cursive => usvg::fontdb::Family::Cursive,
                    usvg::FontFamily::Fantasy => usvg::fontdb::Family::Fantasy,
                    usvg::FontFamily::Monospace => usvg::fontdb::Family::Monospace,
                    usvg::FontFamily::Named(name) => usvg::fontdb::Family::Name(name),
                })
                .collect();
            families.push(usvg::fontdb::Family::SansSerif);

            let query = usvg::fontdb::Query {
                families: &families,
                weight: usvg::fontdb::Weight(font.weight()),
                stretch: usvg::fontdb::Stretch::Normal,
                style: usvg::fontdb::Style::Normal,
            };
            fontdb
                .query(&query)
                .or_else(|| fontdb.faces().next().map(|f| f.id))
        }),
        select_fallback: usvg::FontResolver::default_fallback_selector(),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/raster.rs"]
mod tests;
