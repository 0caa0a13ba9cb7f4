//! # SVG Output
//!
//! Serializes a finished layout tree to an SVG document. Glyph outlines
//! are extracted from the font in font units and emitted once as
//! `<symbol>` elements, then referenced with `<use>` and a
//! translate+scale transform (the negative y scale flips the font's
//! y-up coordinates into SVG's y-down space). Viewers that cannot handle
//! SVG 2 symbol reuse get inline `<path>` elements instead when
//! `symbol_reuse` is off.
//!
//! The expression's baseline sits at y = 0 in the document; the viewBox
//! is the layout bounding box padded by one unit on every side.

use std::collections::HashMap;
use std::fmt::Write as _;

use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::Writer;
use ttf_parser::GlyphId;

use crate::config::RenderConfig;
use crate::error::MathError;
use crate::font::{GlyphRef, MathFont};
use crate::layout::drawable::{Drawable, GlyphDrawable};
use crate::layout::{ChildItem, LayoutNode};

/// Format a coordinate with limited precision and trailing zeros trimmed.
fn fmt(value: f64, precision: usize) -> String {
    let mut s = format!("{value:.precision$}");
    if s.contains('.') {
        let trimmed = s.trim_end_matches('0').trim_end_matches('.').len();
        s.truncate(trimmed);
    }
    if s == "-0" {
        s = "0".to_string();
    }
    s
}

/// Collects glyph outlines as SVG path data, in font units.
#[derive(Default)]
struct PathBuilder {
    data: String,
}

impl ttf_parser::OutlineBuilder for PathBuilder {
    fn move_to(&mut self, x: f32, y: f32) {
        let _ = write!(self.data, "M{x} {y} ");
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let _ = write!(self.data, "L{x} {y} ");
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let _ = write!(self.data, "Q{x1} {y1} {x} {y} ");
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let _ = write!(self.data, "C{x1} {y1} {x2} {y2} {x} {y} ");
    }

    fn close(&mut self) {
        self.data.push_str("Z ");
    }
}

/// Flat drawing operation with absolute document coordinates.
enum RenderOp {
    Glyph {
        glyph: GlyphId,
        x: f64,
        y: f64,
        scale: f64,
        fill: Option<String>,
    },
    /// Filled rectangle; `y` is the top edge.
    FillRect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        fill: Option<String>,
    },
    /// Stroked rectangle; `y` is the top edge.
    StrokeRect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        thickness: f64,
        corner_radius: Option<f64>,
        stroke: Option<String>,
    },
    Ellipse {
        cx: f64,
        cy: f64,
        rx: f64,
        ry: f64,
        thickness: f64,
        stroke: Option<String>,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        thickness: f64,
        stroke: Option<String>,
        arrow: bool,
    },
}

struct Renderer<'a, 'f> {
    font: &'f MathFont<'a>,
    config: &'f RenderConfig,
    ops: Vec<RenderOp>,
    /// Path data per glyph id; None for glyphs with no outline (spaces).
    paths: HashMap<u16, Option<String>>,
    /// Glyph ids with outlines, in first-use order.
    order: Vec<u16>,
    has_arrow: bool,
}

impl<'a, 'f> Renderer<'a, 'f> {
    fn walk(&mut self, node: &LayoutNode, x: f64, y: f64, parent_background: Option<&str>) {
        let bbox = node.bbox;
        if let Some(bg) = &node.style.background {
            if Some(bg.as_str()) != parent_background && !node.phantom {
                self.ops.push(RenderOp::FillRect {
                    x: x + bbox.xmin,
                    y: y - bbox.ymax,
                    width: bbox.width(),
                    height: bbox.height(),
                    fill: Some(bg.clone()),
                });
            }
        }
        if self.config.debug_bbox {
            self.ops.push(RenderOp::StrokeRect {
                x: x + bbox.xmin,
                y: y - bbox.ymax,
                width: bbox.width(),
                height: bbox.height(),
                thickness: 0.5,
                corner_radius: None,
                stroke: Some("blue".to_string()),
            });
        }
        if self.config.debug_baseline {
            self.ops.push(RenderOp::Line {
                x1: x + bbox.xmin,
                y1: y,
                x2: x + bbox.xmax,
                y2: y,
                thickness: 0.5,
                stroke: Some("red".to_string()),
                arrow: false,
            });
        }
        let background = node.style.background.as_deref().or(parent_background);
        for child in &node.children {
            let cx = x + child.dx;
            let cy = y + child.dy;
            match &child.item {
                ChildItem::Node(sub) => self.walk(sub, cx, cy, background),
                ChildItem::Draw(drawable) => self.draw(drawable, cx, cy, node),
            }
        }
    }

    fn draw(&mut self, drawable: &Drawable, x: f64, y: f64, node: &LayoutNode) {
        if node.phantom {
            return;
        }
        let color = node
            .style
            .color
            .clone()
            .or_else(|| self.config.color.clone());
        match drawable {
            Drawable::Glyph(g) => self.glyph(g, x, y, color),
            Drawable::HLine { length, thickness } => self.ops.push(RenderOp::FillRect {
                x,
                y: y - thickness / 2.0,
                width: *length,
                height: *thickness,
                fill: color,
            }),
            Drawable::VLine { height, thickness } => self.ops.push(RenderOp::FillRect {
                x: x - thickness / 2.0,
                y,
                width: *thickness,
                height: *height,
                fill: color,
            }),
            Drawable::Rect {
                width,
                height,
                thickness,
                corner_radius,
            } => self.ops.push(RenderOp::StrokeRect {
                x,
                y: y - height,
                width: *width,
                height: *height,
                thickness: *thickness,
                corner_radius: *corner_radius,
                stroke: color,
            }),
            Drawable::Ellipse {
                width,
                height,
                thickness,
            } => self.ops.push(RenderOp::Ellipse {
                cx: x + width / 2.0,
                cy: y - height / 2.0,
                rx: width / 2.0,
                ry: height / 2.0,
                thickness: *thickness,
                stroke: color,
            }),
            Drawable::Diagonal {
                width,
                height,
                thickness,
                arrow,
            } => {
                self.has_arrow |= *arrow;
                self.ops.push(RenderOp::Line {
                    x1: x,
                    y1: y - height,
                    x2: x + width,
                    y2: y,
                    thickness: *thickness,
                    stroke: color,
                    arrow: *arrow,
                });
            }
        }
    }

    fn glyph(&mut self, g: &GlyphDrawable, x: f64, y: f64, fill: Option<String>) {
        match &g.glyph.gref {
            GlyphRef::Real(id) => self.glyph_at(*id, x, y, g.em_scale, fill),
            GlyphRef::Assembled(assembly) => {
                for part in &assembly.parts {
                    self.glyph_at(
                        part.glyph,
                        x + part.dx * g.em_scale,
                        y - part.dy * g.em_scale,
                        g.em_scale,
                        fill.clone(),
                    );
                }
            }
        }
    }

    fn glyph_at(&mut self, id: GlyphId, x: f64, y: f64, scale: f64, fill: Option<String>) {
        if !self.paths.contains_key(&id.0) {
            let mut builder = PathBuilder::default();
            let data = if self.font.outline(id, &mut builder) && !builder.data.is_empty() {
                Some(builder.data.trim_end().to_string())
            } else {
                None
            };
            if data.is_some() {
                self.order.push(id.0);
            }
            self.paths.insert(id.0, data);
        }
        // Glyphs without an outline (spaces) take up room but draw nothing.
        if self.paths[&id.0].is_some() {
            self.ops.push(RenderOp::Glyph {
                glyph: id,
                x,
                y,
                scale,
                fill,
            });
        }
    }
}

fn emit<W: std::io::Write>(writer: &mut Writer<W>, event: Event) -> Result<(), MathError> {
    writer
        .write_event(event)
        .map_err(|e| MathError::Render(e.to_string()))
}

fn write_symbols<W: std::io::Write>(
    writer: &mut Writer<W>,
    renderer: &Renderer,
) -> Result<(), MathError> {
    for id in &renderer.order {
        if let Some(data) = &renderer.paths[id] {
            let mut symbol = BytesStart::new("symbol");
            let sid = format!("g{id}");
            symbol.push_attribute(("id", sid.as_str()));
            symbol.push_attribute(("overflow", "visible"));
            emit(writer, Event::Start(symbol))?;
            let mut path = BytesStart::new("path");
            path.push_attribute(("d", data.as_str()));
            emit(writer, Event::Empty(path))?;
            emit(writer, Event::End(BytesEnd::new("symbol")))?;
        }
    }
    Ok(())
}

fn write_arrow_marker<W: std::io::Write>(writer: &mut Writer<W>) -> Result<(), MathError> {
    let mut marker = BytesStart::new("marker");
    marker.push_attribute(("id", "arrowhead"));
    marker.push_attribute(("markerWidth", "10"));
    marker.push_attribute(("markerHeight", "7"));
    marker.push_attribute(("refX", "0"));
    marker.push_attribute(("refY", "3.5"));
    marker.push_attribute(("orient", "auto"));
    emit(writer, Event::Start(marker))?;
    let mut polygon = BytesStart::new("polygon");
    polygon.push_attribute(("points", "0 0 10 3.5 0 7"));
    emit(writer, Event::Empty(polygon))?;
    emit(writer, Event::End(BytesEnd::new("marker")))
}

/// Glyph transform: translate to the drawing position, scale font units
/// down to pixels and flip y.
fn glyph_transform(x: f64, y: f64, scale: f64, precision: usize) -> String {
    format!(
        "translate({} {}) scale({} {})",
        fmt(x, precision),
        fmt(y, precision),
        fmt(scale, 6),
        fmt(-scale, 6),
    )
}

/// Serialize a laid-out expression to a complete SVG document.
pub fn render_svg(
    root: &LayoutNode,
    font: &MathFont,
    config: &RenderConfig,
) -> Result<String, MathError> {
    let mut renderer = Renderer {
        font,
        config,
        ops: Vec::new(),
        paths: HashMap::new(),
        order: Vec::new(),
        has_arrow: false,
    };
    renderer.walk(root, 0.0, 0.0, None);

    let p = config.precision;
    let bbox = root.bbox;
    let width = bbox.width() + 2.0;
    let height = bbox.height() + 2.0;
    let view_x = bbox.xmin - 1.0;
    let view_y = -bbox.ymax - 1.0;
    let view_box = format!(
        "{} {} {} {}",
        fmt(view_x, p),
        fmt(view_y, p),
        fmt(width, p),
        fmt(height, p)
    );

    let mut writer = Writer::new(Vec::new());
    let mut svg = BytesStart::new("svg");
    svg.push_attribute(("xmlns", "http://www.w3.org/2000/svg"));
    if config.symbol_reuse {
        svg.push_attribute(("xmlns:xlink", "http://www.w3.org/1999/xlink"));
    }
    svg.push_attribute(("width", fmt(width, p).as_str()));
    svg.push_attribute(("height", fmt(height, p).as_str()));
    svg.push_attribute(("viewBox", view_box.as_str()));
    emit(&mut writer, Event::Start(svg))?;

    if let Some(bg) = &config.background {
        let mut rect = BytesStart::new("rect");
        rect.push_attribute(("x", fmt(view_x, p).as_str()));
        rect.push_attribute(("y", fmt(view_y, p).as_str()));
        rect.push_attribute(("width", fmt(width, p).as_str()));
        rect.push_attribute(("height", fmt(height, p).as_str()));
        rect.push_attribute(("fill", bg.as_str()));
        emit(&mut writer, Event::Empty(rect))?;
    }

    let symbols = config.symbol_reuse && !renderer.order.is_empty();
    let symbols_in_defs = symbols && config.defs;
    if renderer.has_arrow || symbols_in_defs {
        emit(&mut writer, Event::Start(BytesStart::new("defs")))?;
        if renderer.has_arrow {
            write_arrow_marker(&mut writer)?;
        }
        if symbols_in_defs {
            write_symbols(&mut writer, &renderer)?;
        }
        emit(&mut writer, Event::End(BytesEnd::new("defs")))?;
    }
    if symbols && !symbols_in_defs {
        write_symbols(&mut writer, &renderer)?;
    }

    for op in &renderer.ops {
        match op {
            RenderOp::Glyph {
                glyph,
                x,
                y,
                scale,
                fill,
            } => {
                let transform = glyph_transform(*x, *y, *scale, p);
                if config.symbol_reuse {
                    let mut use_el = BytesStart::new("use");
                    let href = format!("#g{}", glyph.0);
                    use_el.push_attribute(("xlink:href", href.as_str()));
                    use_el.push_attribute(("transform", transform.as_str()));
                    if let Some(fill) = fill {
                        use_el.push_attribute(("fill", fill.as_str()));
                    }
                    emit(&mut writer, Event::Empty(use_el))?;
                } else if let Some(data) = &renderer.paths[&glyph.0] {
                    let mut path = BytesStart::new("path");
                    path.push_attribute(("d", data.as_str()));
                    path.push_attribute(("transform", transform.as_str()));
                    if let Some(fill) = fill {
                        path.push_attribute(("fill", fill.as_str()));
                    }
                    emit(&mut writer, Event::Empty(path))?;
                }
            }
            RenderOp::FillRect {
                x,
                y,
                width,
                height,
                fill,
            } => {
                let mut rect = BytesStart::new("rect");
                rect.push_attribute(("x", fmt(*x, p).as_str()));
                rect.push_attribute(("y", fmt(*y, p).as_str()));
                rect.push_attribute(("width", fmt(*width, p).as_str()));
                rect.push_attribute(("height", fmt(*height, p).as_str()));
                if let Some(fill) = fill {
                    rect.push_attribute(("fill", fill.as_str()));
                }
                emit(&mut writer, Event::Empty(rect))?;
            }
            RenderOp::StrokeRect {
                x,
                y,
                width,
                height,
                thickness,
                corner_radius,
                stroke,
            } => {
                let mut rect = BytesStart::new("rect");
                rect.push_attribute(("x", fmt(*x, p).as_str()));
                rect.push_attribute(("y", fmt(*y, p).as_str()));
                rect.push_attribute(("width", fmt(*width, p).as_str()));
                rect.push_attribute(("height", fmt(*height, p).as_str()));
                if let Some(radius) = corner_radius {
                    rect.push_attribute(("rx", fmt(*radius, p).as_str()));
                }
                rect.push_attribute(("fill", "none"));
                rect.push_attribute(("stroke", stroke.as_deref().unwrap_or("black")));
                rect.push_attribute(("stroke-width", fmt(*thickness, p).as_str()));
                emit(&mut writer, Event::Empty(rect))?;
            }
            RenderOp::Ellipse {
                cx,
                cy,
                rx,
                ry,
                thickness,
                stroke,
            } => {
                let mut ellipse = BytesStart::new("ellipse");
                ellipse.push_attribute(("cx", fmt(*cx, p).as_str()));
                ellipse.push_attribute(("cy", fmt(*cy, p).as_str()));
                ellipse.push_attribute(("rx", fmt(*rx, p).as_str()));
                ellipse.push_attribute(("ry", fmt(*ry, p).as_str()));
                ellipse.push_attribute(("fill", "none"));
                ellipse.push_attribute(("stroke", stroke.as_deref().unwrap_or("black")));
                ellipse.push_attribute(("stroke-width", fmt(*thickness, p).as_str()));
                emit(&mut writer, Event::Empty(ellipse))?;
            }
            RenderOp::Line {
                x1,
                y1,
                x2,
                y2,
                thickness,
                stroke,
                arrow,
            } => {
                let mut line = BytesStart::new("line");
                line.push_attribute(("x1", fmt(*x1, p).as_str()));
                line.push_attribute(("y1", fmt(*y1, p).as_str()));
                line.push_attribute(("x2", fmt(*x2, p).as_str()));
                line.push_attribute(("y2", fmt(*y2, p).as_str()));
                line.push_attribute(("stroke", stroke.as_deref().unwrap_or("black")));
                line.push_attribute(("stroke-width", fmt(*thickness, p).as_str()));
                if *arrow {
                    line.push_attribute(("marker-end", "url(#arrowhead)"));
                }
                emit(&mut writer, Event::Empty(line))?;
            }
        }
    }

    emit(&mut writer, Event::End(BytesEnd::new("svg")))?;
    String::from_utf8(writer.into_inner()).map_err(|e| MathError::Render(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ttf_parser::OutlineBuilder;

    #[test]
    fn test_fmt_trims_trailing_zeros() {
        assert_eq!(fmt(1.5, 4), "1.5");
        assert_eq!(fmt(2.0, 4), "2");
        assert_eq!(fmt(1.23456, 2), "1.23");
        assert_eq!(fmt(-0.00001, 2), "0");
        assert_eq!(fmt(10.0, 0), "10");
    }

    #[test]
    fn test_path_builder_commands() {
        let mut b = PathBuilder::default();
        b.move_to(10.0, 20.0);
        b.line_to(30.0, 20.0);
        b.quad_to(40.0, 25.0, 50.0, 20.0);
        b.close();
        assert_eq!(b.data.trim_end(), "M10 20 L30 20 Q40 25 50 20 Z");
    }

    #[test]
    fn test_glyph_transform_flips_y() {
        let t = glyph_transform(12.0, -3.5, 0.024, 4);
        assert_eq!(t, "translate(12 -3.5) scale(0.024 -0.024)");
    }
}
