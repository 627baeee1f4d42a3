//! Scene to SVG compilation.
//!
//! Every element is emitted in world coordinates with the view origin at the canvas center.
//! Opacity nests through `<g>` groups so it multiplies down the tree like the scene does.

use crate::{
    color::model::Color,
    foundation::{
        core::{Point, Vec2},
        error::{RecalcError, RecalcResult},
    },
    scene::model::{CircleShape, ElementId, ElementKind, LineShape, RectShape, Scene, TextShape},
};

/// Compile the current state of `scene` into a standalone SVG document.
pub fn scene_to_svg(scene: &Scene) -> RecalcResult<String> {
    let canvas = scene.canvas();
    let (w, h) = (f64::from(canvas.width), f64::from(canvas.height));

    let mut doc = SvgDoc::default();
    doc.element(scene, scene.root())?;

    let mut out = String::with_capacity(doc.body.len() + doc.defs.len() + 256);
    out.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="{} {} {} {}">"#,
        canvas.width,
        canvas.height,
        num(-w / 2.0),
        num(-h / 2.0),
        num(w),
        num(h),
    ));
    if !doc.defs.is_empty() {
        out.push_str("<defs>");
        out.push_str(&doc.defs);
        out.push_str("</defs>");
    }
    out.push_str(&doc.body);
    out.push_str("</svg>");
    Ok(out)
}

#[derive(Default)]
struct SvgDoc {
    defs: String,
    body: String,
    filters: usize,
}

impl SvgDoc {
    fn element(&mut self, scene: &Scene, id: ElementId) -> RecalcResult<()> {
        let el = scene.element(id)?;
        let opacity = scene.number(el.opacity)?.clamp(0.0, 1.0);
        if opacity <= 0.0 {
            return Ok(());
        }

        let grouped = opacity < 1.0;
        if grouped {
            self.body
                .push_str(&format!(r#"<g opacity="{}">"#, num(opacity)));
        }

        let at = finite_vec(scene.world_position(id)?, id)?;
        match &el.kind {
            ElementKind::Group => {}
            ElementKind::Rect(r) => self.rect(scene, r, at)?,
            ElementKind::Circle(c) => self.circle(scene, c, at, id)?,
            ElementKind::Text(t) => self.text(scene, t, at)?,
            ElementKind::Line(l) => {
                let origin = match el.parent() {
                    Some(p) => scene.world_position(p)?,
                    None => Vec2::ZERO,
                };
                let points = scene
                    .line_points(id)?
                    .into_iter()
                    .map(|p| finite_point(p + origin, id))
                    .collect::<RecalcResult<Vec<_>>>()?;
                self.line(scene, l, &points)?;
            }
        }

        for child in el.children() {
            self.element(scene, *child)?;
        }
        if grouped {
            self.body.push_str("</g>");
        }
        Ok(())
    }

    fn rect(&mut self, scene: &Scene, r: &RectShape, at: Vec2) -> RecalcResult<()> {
        let Some(fill) = r.fill.as_ref() else {
            return Ok(());
        };
        let fill = scene.color(fill)?;
        self.body.push_str(&format!(
            r#"<rect x="{}" y="{}" width="{}" height="{}"{}/>"#,
            num(at.x - r.size.x / 2.0),
            num(at.y - r.size.y / 2.0),
            num(r.size.x),
            num(r.size.y),
            paint("fill", fill),
        ));
        Ok(())
    }

    fn circle(&mut self, scene: &Scene, c: &CircleShape, at: Vec2, id: ElementId) -> RecalcResult<()> {
        let size = scene.number(c.size)?;
        if !size.is_finite() || size <= 0.0 {
            return Ok(());
        }

        let mut attrs = String::new();
        match c.fill.as_ref() {
            Some(fill) => attrs.push_str(&paint("fill", scene.color(fill)?)),
            None => attrs.push_str(r#" fill="none""#),
        }
        if let Some(stroke) = c.stroke.as_ref()
            && c.line_width > 0.0
        {
            attrs.push_str(&paint("stroke", scene.color(stroke)?));
            attrs.push_str(&format!(r#" stroke-width="{}""#, num(c.line_width)));
            if c.stroke_first {
                attrs.push_str(r#" paint-order="stroke""#);
            }
        }

        let blur = scene.number(c.shadow_blur)?;
        if blur.is_finite() && blur > 0.0 {
            let glow = scene.color(&c.shadow_color)?;
            let filter = self.glow_filter(blur, glow, id);
            attrs.push_str(&format!(r#" filter="url(#{filter})""#));
        }

        self.body.push_str(&format!(
            r#"<circle cx="{}" cy="{}" r="{}"{attrs}/>"#,
            num(at.x),
            num(at.y),
            num(size / 2.0),
        ));
        Ok(())
    }

    fn glow_filter(&mut self, blur: f64, color: Color, id: ElementId) -> String {
        let name = format!("glow-{}-{}", id.0, self.filters);
        self.filters += 1;
        let [r, g, b] = color.rgb().map(|c| c as u8);
        self.defs.push_str(&format!(
            concat!(
                r#"<filter id="{name}" x="-200%" y="-200%" width="500%" height="500%">"#,
                r##"<feDropShadow dx="0" dy="0" stdDeviation="{sd}" flood-color="#{r:02x}{g:02x}{b:02x}" flood-opacity="{a}"/>"##,
                "</filter>"
            ),
            name = name,
            sd = num(blur / 2.0),
            r = r,
            g = g,
            b = b,
            a = num(color.alpha()),
        ));
        name
    }

    fn text(&mut self, scene: &Scene, t: &TextShape, at: Vec2) -> RecalcResult<()> {
        let text = scene.text(&t.text)?;
        if text.is_empty() {
            return Ok(());
        }
        let fill = scene.color(&t.fill)?;
        self.body.push_str(&format!(
            r#"<text x="{}" y="{}" font-family="{}" font-size="{}" font-weight="{}" text-anchor="middle" dominant-baseline="central"{}>{}</text>"#,
            num(at.x),
            num(at.y),
            escape(&t.font_family),
            num(t.font_size),
            t.font_weight,
            paint("fill", fill),
            escape(&text),
        ));
        Ok(())
    }

    fn line(&mut self, scene: &Scene, l: &LineShape, points: &[Point]) -> RecalcResult<()> {
        if points.len() < 2 || l.line_width <= 0.0 {
            return Ok(());
        }
        let stroke = scene.color(&l.stroke)?;

        let mut shaft = points.to_vec();
        let mut head = None;
        if l.end_arrow && l.arrow_size > 0.0 {
            let n = shaft.len();
            let tip = shaft[n - 1];
            let dir = tip - shaft[n - 2];
            let len = dir.hypot();
            if len > f64::EPSILON {
                let dir = dir / len;
                let size = l.arrow_size.min(len);
                let base = tip - dir * size;
                let side = Vec2::new(-dir.y, dir.x) * (size / 2.0);
                shaft[n - 1] = base;
                head = Some([tip, base + side, base - side]);
            }
        }

        self.body.push_str(&format!(
            r#"<polyline points="{}" fill="none"{} stroke-width="{}" stroke-linecap="round" stroke-linejoin="round"/>"#,
            point_list(&shaft),
            paint("stroke", stroke),
            num(l.line_width),
        ));
        if let Some(head) = head {
            self.body.push_str(&format!(
                r#"<polygon points="{}"{}/>"#,
                point_list(&head),
                paint("fill", stroke),
            ));
        }
        Ok(())
    }
}

fn paint(attr: &str, color: Color) -> String {
    let [r, g, b] = color.rgb().map(|c| c as u8);
    let mut out = format!(r##" {attr}="#{r:02x}{g:02x}{b:02x}""##);
    if color.alpha() < 1.0 {
        out.push_str(&format!(r#" {attr}-opacity="{}""#, num(color.alpha())));
    }
    out
}

fn point_list(points: &[Point]) -> String {
    points
        .iter()
        .map(|p| format!("{},{}", num(p.x), num(p.y)))
        .collect::<Vec<_>>()
        .join(" ")
}

fn num(v: f64) -> String {
    let s = format!("{v:.3}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".to_string() } else { s.to_string() }
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

fn finite_vec(v: Vec2, id: ElementId) -> RecalcResult<Vec2> {
    if v.x.is_finite() && v.y.is_finite() {
        Ok(v)
    } else {
        Err(RecalcError::evaluation(format!(
            "non-finite position for {id:?}"
        )))
    }
}

fn finite_point(p: Point, id: ElementId) -> RecalcResult<Point> {
    Ok(finite_vec(p.to_vec2(), id)?.to_point())
}

#[cfg(test)]
#[path = "../../tests/unit/render/svg.rs"]
mod tests;
