//! # Layout Engine
//!
//! Turns a parsed MathML tree into a tree of positioned boxes.
//!
//! Every element becomes a [`LayoutNode`] whose children are placed at
//! offsets relative to the node's own origin. Two coordinate conventions
//! coexist and must not be mixed up:
//!
//! - Bounding boxes are y-up, relative to the node's baseline. A glyph
//!   ascender has a positive `ymax`, a descender a negative `ymin`.
//! - Child offsets `(dx, dy)` are in output (SVG) coordinates, so a
//!   positive `dy` moves a child *down*.
//!
//! Layout is recursive: a node lays out its children first, then positions
//! them using their bounding boxes plus the font's MATH constants. The
//! input tree is never mutated; constructs that need synthetic structure
//! (auto-fencing, sqrt row wrapping) build local elements on the fly.

pub mod accents;
pub mod drawable;
pub mod enclose;
pub mod fenced;
pub mod frac;
pub mod operators;
pub mod radical;
pub mod scripts;
pub mod spacing;
pub mod table;

use crate::font::variants::stretched_glyph;
use crate::font::{BBox, MathFont};
use crate::model::{ElementKind, MathElement};
use crate::style::{unicode, MathStyle};
pub(crate) use drawable::{Drawable, GlyphDrawable};
pub(crate) use operators::{Form, OpParams};

/// Shared inputs for one layout run.
pub struct LayoutCtx<'f, 'a> {
    pub font: &'f MathFont<'a>,
    /// Glyph size at script level zero, in pixels.
    pub base_size: f64,
    /// Floor for script scaling, as a fraction of `base_size`.
    pub min_size_fraction: f64,
}

impl LayoutCtx<'_, '_> {
    /// Glyph size at the given script level: each level scales by the
    /// font's scriptPercentScaleDown, floored at the minimum fraction.
    pub fn glyph_size(&self, style: &MathStyle) -> f64 {
        let scale = self.font.consts().script_percent_scale_down / 100.0;
        let mut size = (self.base_size * scale.powi(i32::from(style.script_level)))
            .max(self.base_size * self.min_size_fraction);
        if let Some(ms) = &style.math_size {
            size = spacing::size_px(ms, size);
        }
        size
    }
}

/// Placement context passed down from parent constructs.
///
/// These propagate through the whole subtree (a superscript's operators
/// stay tightened all the way down), except `form`, `tight` and `sibling`
/// which only apply to the directly built element.
#[derive(Debug, Clone, Copy, Default)]
pub struct LayoutFlags {
    /// Subtree is a superscript: scripts shape with `ssty` and operator
    /// padding is suppressed.
    pub sup: bool,
    /// Subtree is a subscript.
    pub sub: bool,
    /// Subtree is inside a fraction (cramps nested fraction script levels).
    pub frac: bool,
    /// Subtree renders invisibly but still occupies space.
    pub phantom: bool,
    /// Stretch glyphs horizontally to this pixel width (accents over a
    /// wide base).
    pub stretch_width: Option<f64>,
    /// Operator form fixed by the enclosing row; `None` lets the operator
    /// default to prefix.
    pub form: Option<Form>,
    /// Direct child of a script construct: identifiers skip their
    /// trailing padding space.
    pub tight: bool,
    /// Kind of the sibling laid out immediately before, for fraction
    /// lead-in spacing.
    pub sibling: Option<ElementKind>,
}

impl LayoutFlags {
    /// Flags as inherited by a child subtree: per-element placement hints
    /// are cleared, sticky ones carried.
    pub fn inherit(&self) -> LayoutFlags {
        LayoutFlags {
            sup: self.sup,
            sub: self.sub,
            frac: self.frac,
            phantom: self.phantom,
            stretch_width: None,
            form: None,
            tight: false,
            sibling: None,
        }
    }

    pub fn in_script(&self) -> bool {
        self.sup || self.sub
    }
}

/// A positioned child: either a laid-out subtree or a drawing primitive.
#[derive(Debug)]
pub enum ChildItem {
    Node(LayoutNode),
    Draw(Drawable),
}

/// Child with its offset from the parent origin, in SVG coordinates
/// (positive `dy` is down).
#[derive(Debug)]
pub struct Child {
    pub item: ChildItem,
    pub dx: f64,
    pub dy: f64,
}

/// One laid-out element.
#[derive(Debug)]
pub struct LayoutNode {
    pub kind: ElementKind,
    pub style: MathStyle,
    /// Pixel size glyphs in this node render at.
    pub glyph_size: f64,
    /// `glyph_size` / units-per-em: converts font units to pixels.
    pub em_scale: f64,
    pub bbox: BBox,
    pub children: Vec<Child>,
    /// Operator parameters, for operator nodes only. Script placement
    /// looks at these on its base.
    pub op: Option<OpParams>,
    /// Node draws nothing but keeps its metrics.
    pub phantom: bool,
    /// Styled text of a leaf text node.
    pub text: String,
    /// Multi-character identifier; scripts pad the advance after it.
    pub multichar: bool,
}

impl LayoutNode {
    pub fn new(kind: ElementKind, style: MathStyle, ctx: &LayoutCtx) -> Self {
        let glyph_size = ctx.glyph_size(&style);
        let em_scale = glyph_size / ctx.font.units_per_em();
        LayoutNode {
            kind,
            style,
            glyph_size,
            em_scale,
            bbox: BBox::ZERO,
            children: Vec::new(),
            op: None,
            phantom: false,
            text: String::new(),
            multichar: false,
        }
    }

    /// Convert a width in ems to pixels at this node's glyph size.
    pub fn ems_px(&self, ems: f64) -> f64 {
        ems * self.glyph_size
    }

    pub fn push_node(&mut self, node: LayoutNode, dx: f64, dy: f64) {
        self.children.push(Child {
            item: ChildItem::Node(node),
            dx,
            dy,
        });
    }

    pub fn push_draw(&mut self, draw: Drawable, dx: f64, dy: f64) {
        self.children.push(Child {
            item: ChildItem::Draw(draw),
            dx,
            dy,
        });
    }

    /// First glyph in reading order, recursing through subtrees.
    pub fn first_glyph(&self) -> Option<&GlyphDrawable> {
        for child in &self.children {
            match &child.item {
                ChildItem::Node(n) => return n.first_glyph(),
                ChildItem::Draw(Drawable::Glyph(g)) => return Some(g),
                ChildItem::Draw(_) => continue,
            }
        }
        None
    }

    /// Last glyph in reading order.
    pub fn last_glyph(&self) -> Option<&GlyphDrawable> {
        for child in self.children.iter().rev() {
            match &child.item {
                ChildItem::Node(n) => return n.last_glyph(),
                ChildItem::Draw(Drawable::Glyph(g)) => return Some(g),
                ChildItem::Draw(_) => continue,
            }
        }
        None
    }

    /// Last character drawn, used to special-case integral bases.
    pub fn last_char(&self) -> Option<char> {
        for child in self.children.iter().rev() {
            match &child.item {
                ChildItem::Node(n) => return n.last_char(),
                ChildItem::Draw(Drawable::Glyph(_)) => break,
                ChildItem::Draw(_) => continue,
            }
        }
        self.text.chars().last()
    }
}

/// Lay out a parsed document. The root carries the `display` attribute
/// and styles cascade from it.
pub fn layout(root: &MathElement, ctx: &LayoutCtx) -> LayoutNode {
    build(root, ctx, None, 0, LayoutFlags::default())
}

/// Lay out one element against its parent's resolved style.
///
/// `script_level` is the level the element lands on when it carries no
/// explicit `scriptlevel` attribute.
pub fn build(
    element: &MathElement,
    ctx: &LayoutCtx,
    parent: Option<&MathStyle>,
    script_level: u8,
    flags: LayoutFlags,
) -> LayoutNode {
    let mut style = MathStyle::resolve(element, parent);
    if element.attr("scriptlevel").is_none() {
        style.script_level = script_level;
    }

    match element.kind {
        ElementKind::Mrow
        | ElementKind::Mstyle
        | ElementKind::Merror
        | ElementKind::Mtr
        | ElementKind::Mtd => layout_row(element, ctx, style, flags),
        ElementKind::Mi if operators::is_function_name(&element.text) => {
            layout_operator(element, ctx, style, flags)
        }
        ElementKind::Mi => layout_text(element, ctx, style, flags, true),
        ElementKind::Mn | ElementKind::Mtext => layout_text(element, ctx, style, flags, false),
        ElementKind::Mo => layout_operator(element, ctx, style, flags),
        ElementKind::Mspace => layout_space(element, ctx, style),
        ElementKind::Mpadded => layout_padded(element, ctx, style, flags),
        ElementKind::Mphantom => {
            let mut inherited = flags;
            inherited.phantom = true;
            let mut node = layout_row(element, ctx, style, inherited);
            node.phantom = true;
            node
        }
        ElementKind::Msub | ElementKind::Msup | ElementKind::Msubsup => {
            scripts::layout_scripts(element, ctx, style, flags)
        }
        ElementKind::Mover | ElementKind::Munder | ElementKind::Munderover => {
            accents::layout_accents(element, ctx, style, flags)
        }
        ElementKind::Mfrac => frac::layout_frac(element, ctx, style, flags),
        ElementKind::Msqrt | ElementKind::Mroot => {
            radical::layout_radical(element, ctx, style, flags)
        }
        ElementKind::Mfenced => fenced::layout_fenced(element, ctx, style, flags),
        ElementKind::Menclose => enclose::layout_enclose(element, ctx, style, flags),
        ElementKind::Mtable => table::layout_table(element, ctx, style, flags),
    }
}

/// Whether a child splits the row into a new line.
fn is_newline(element: &MathElement) -> bool {
    element.kind == ElementKind::Mspace && element.attr("linebreak") == Some("newline")
}

fn layout_row(
    element: &MathElement,
    ctx: &LayoutCtx,
    style: MathStyle,
    flags: LayoutFlags,
) -> LayoutNode {
    let lines: Vec<&[MathElement]> = element.children.split(is_newline).collect();
    if lines.len() > 1 {
        return layout_lines(&lines, ctx, style, flags);
    }
    let mut node = LayoutNode::new(ElementKind::Mrow, style, ctx);
    node.phantom = flags.phantom;
    layout_row_into(&mut node, &element.children, ctx, flags);
    node
}

/// Stack line fragments vertically, separated by the font's math leading.
fn layout_lines(
    lines: &[&[MathElement]],
    ctx: &LayoutCtx,
    style: MathStyle,
    flags: LayoutFlags,
) -> LayoutNode {
    let mut node = LayoutNode::new(ElementKind::Mrow, style, ctx);
    node.phantom = flags.phantom;
    let leading = ctx.font.consts().math_leading * node.em_scale * 2.0;
    let mut y = 0.0;
    let mut xmax = 0.0f64;
    let mut first_ymax = 0.0;
    let mut last_ymin = 0.0;
    let mut prev_ymin: Option<f64> = None;
    for (i, line) in lines.iter().enumerate() {
        let mut sub = LayoutNode::new(ElementKind::Mrow, node.style.clone(), ctx);
        sub.phantom = flags.phantom;
        layout_row_into(&mut sub, line, ctx, flags);
        if let Some(prev) = prev_ymin {
            y += sub.bbox.ymax - prev + leading;
        }
        xmax = xmax.max(sub.bbox.xmax);
        if i == 0 {
            first_ymax = sub.bbox.ymax;
        }
        last_ymin = sub.bbox.ymin;
        prev_ymin = Some(sub.bbox.ymin);
        node.push_node(sub, 0.0, y);
    }
    node.bbox = BBox::new(0.0, xmax, -y + last_ymin, first_ymax);
    node
}

/// Operator form when the element does not fix one itself.
fn infer_form(i: usize, count: usize, flags: &LayoutFlags) -> Form {
    if flags.tight || i == 0 {
        Form::Prefix
    } else if i == count - 1 {
        Form::Postfix
    } else {
        Form::Infix
    }
}

fn child_form(child: &MathElement, i: usize, count: usize, flags: &LayoutFlags) -> Form {
    child
        .attr("form")
        .and_then(Form::from_attr)
        .unwrap_or_else(|| infer_form(i, count, flags))
}

/// Whether an operator element opens an implicit fence: a stretchy fence
/// character in prefix position.
fn opens_fence(child: &MathElement, form: Form) -> bool {
    if form != Form::Prefix || child.attr("stretchy") == Some("false") {
        return false;
    }
    if child.text.is_empty() {
        return false;
    }
    let params = operators::get_params(&child.text, Form::Prefix);
    params.fence && params.stretchy
}

/// The element kind a following sibling sees, drilling through rows to
/// their trailing child.
pub(crate) fn trailing_kind(node: &LayoutNode) -> ElementKind {
    if node.kind == ElementKind::Mrow {
        for child in node.children.iter().rev() {
            if let ChildItem::Node(n) = &child.item {
                return trailing_kind(n);
            }
        }
    }
    node.kind
}

/// Lay out a sequence of elements left to right into `node`.
fn layout_row_into(
    node: &mut LayoutNode,
    kids: &[MathElement],
    ctx: &LayoutCtx,
    flags: LayoutFlags,
) {
    let mut x = 0.0f64;
    let mut ymin = f64::INFINITY;
    let mut ymax = f64::NEG_INFINITY;
    let mut sibling: Option<ElementKind> = None;
    let mut i = 0;
    while i < kids.len() {
        let child = &kids[i];
        let mut child_flags = flags.inherit();
        child_flags.sibling = sibling;

        let sub = if child.kind == ElementKind::Mo {
            if child.text.chars().all(operators::is_invisible_char) {
                i += 1;
                continue;
            }
            let form = child_form(child, i, kids.len(), &flags);
            if opens_fence(child, form) {
                let (fence, resume) = synthesize_fence(kids, i, &flags);
                i = resume;
                build(
                    &fence,
                    ctx,
                    Some(&node.style),
                    node.style.script_level,
                    child_flags,
                )
            } else {
                child_flags.form = Some(form);
                i += 1;
                build(
                    child,
                    ctx,
                    Some(&node.style),
                    node.style.script_level,
                    child_flags,
                )
            }
        } else {
            i += 1;
            build(
                child,
                ctx,
                Some(&node.style),
                node.style.script_level,
                child_flags,
            )
        };

        sibling = Some(trailing_kind(&sub));
        ymin = ymin.min(sub.bbox.ymin);
        ymax = ymax.max(sub.bbox.ymax);
        let advance = sub.bbox.xmax;
        node.push_node(sub, x, 0.0);
        x += advance;
    }
    if ymin > ymax {
        ymin = 0.0;
        ymax = 0.0;
    }
    node.bbox = BBox::new(0.0, x, ymin, ymax);
}

/// Build a synthetic `mfenced` from an opening operator at `i`, scanning
/// for the matching postfix close. Returns the element and the index to
/// resume at.
fn synthesize_fence(kids: &[MathElement], i: usize, flags: &LayoutFlags) -> (MathElement, usize) {
    let open = &kids[i];
    let mut close: Option<&MathElement> = None;
    let mut end = kids.len();
    for (j, cand) in kids.iter().enumerate().skip(i + 1) {
        if cand.kind != ElementKind::Mo
            || child_form(cand, j, kids.len(), flags) != Form::Postfix
        {
            continue;
        }
        // Only a fence operator closes the group; a postfix "!" does not.
        if !operators::get_params(&cand.text, Form::Postfix).fence {
            continue;
        }
        close = Some(cand);
        end = j;
        break;
    }
    let mut fence = MathElement::new(ElementKind::Mfenced);
    fence.attrs = open.attrs.clone();
    fence.attrs.insert("open".to_string(), open.text.clone());
    fence.attrs.insert(
        "close".to_string(),
        close.map(|c| c.text.clone()).unwrap_or_default(),
    );
    fence.attrs.insert("separators".to_string(), String::new());
    let mut inner = MathElement::new(ElementKind::Mrow);
    inner.children = kids[i + 1..end].to_vec();
    fence.children.push(inner);
    let resume = if close.is_some() { end + 1 } else { end };
    (fence, resume)
}

fn layout_text(
    element: &MathElement,
    ctx: &LayoutCtx,
    style: MathStyle,
    flags: LayoutFlags,
    identifier: bool,
) -> LayoutNode {
    let mut style = style;
    let mut text = element.text.clone();
    let mut multichar = false;
    if identifier {
        if text.chars().count() == 1 {
            if !style.variant.italic && !style.variant.normal {
                style.variant.italic = true;
            }
        } else if !text.is_empty() {
            // Padded with thin spaces, except tight against a script.
            text.insert(0, '\u{2009}');
            if !flags.tight {
                text.push('\u{2009}');
            }
            multichar = true;
        }
    }
    let mut node = LayoutNode::new(element.kind, style, ctx);
    node.phantom = flags.phantom;
    node.multichar = multichar;
    node.text = unicode::styled_str(&text, &node.style.variant);

    let run = ctx.font.shape_run(&node.text, flags.in_script());
    let mut x = 0.0f64;
    let mut ymin = f64::INFINITY;
    let mut ymax = f64::NEG_INFINITY;
    let mut xmin = 0.0;
    let mut last = None;
    for sg in run {
        let scaled = sg.glyph.bbox.scaled(node.em_scale);
        if last.is_none() {
            xmin = scaled.xmin;
        }
        ymin = ymin.min(scaled.ymin);
        ymax = ymax.max(scaled.ymax);
        let advance = sg.x_advance * node.em_scale;
        last = Some((x, scaled.xmax, advance));
        node.push_draw(
            Drawable::Glyph(GlyphDrawable {
                glyph: sg.glyph,
                size: node.glyph_size,
                em_scale: node.em_scale,
            }),
            x,
            0.0,
        );
        x += advance;
    }
    node.bbox = match last {
        Some((start, glyph_xmax, advance)) => {
            BBox::new(xmin, start + glyph_xmax.max(advance), ymin, ymax)
        }
        None => BBox::ZERO,
    };
    node
}

fn layout_operator(
    element: &MathElement,
    ctx: &LayoutCtx,
    style: MathStyle,
    flags: LayoutFlags,
) -> LayoutNode {
    let mut node = LayoutNode::new(ElementKind::Mo, style, ctx);
    node.phantom = flags.phantom;
    let form = element
        .attr("form")
        .and_then(Form::from_attr)
        .or(flags.form)
        .unwrap_or(Form::Prefix);
    let text: String = element
        .text
        .chars()
        .filter(|c| !operators::is_invisible_char(*c))
        .collect();
    let mut params = operators::get_params(&text, form);
    operators::apply_attrs(&mut params, element);
    node.text = unicode::styled_str(&text, &node.style.variant);

    let mut x = 0.0f64;
    if !flags.in_script() {
        x += node.ems_px(params.lspace);
    }
    let run = ctx.font.shape_run(&node.text, flags.in_script());
    let mut ymin = f64::INFINITY;
    let mut ymax = f64::NEG_INFINITY;
    let mut xmin = None;
    for sg in run {
        let mut glyph = sg.glyph;
        let mut advance = sg.x_advance;
        if params.largeop && node.style.display_style {
            let min_height = ctx.font.consts().display_operator_min_height;
            glyph = stretched_glyph(ctx.font, &glyph, min_height, true);
            advance = glyph.advance;
        }
        if let Some(width) = flags.stretch_width {
            glyph = stretched_glyph(ctx.font, &glyph, width / node.em_scale, false);
            advance = glyph.advance;
        }
        let scaled = glyph.bbox.scaled(node.em_scale);
        if xmin.is_none() {
            xmin = Some(scaled.xmin);
        }
        ymin = ymin.min(scaled.ymin);
        ymax = ymax.max(scaled.ymax);
        node.push_draw(
            Drawable::Glyph(GlyphDrawable {
                glyph,
                size: node.glyph_size,
                em_scale: node.em_scale,
            }),
            x,
            0.0,
        );
        x += advance * node.em_scale;
    }
    if !flags.in_script() {
        x += node.ems_px(params.rspace);
    }
    if ymin > ymax {
        ymin = 0.0;
        ymax = 0.0;
    }
    node.bbox = BBox::new(xmin.unwrap_or(0.0), x, ymin, ymax);
    node.op = Some(params);
    node
}

fn layout_space(element: &MathElement, ctx: &LayoutCtx, style: MathStyle) -> LayoutNode {
    let mut node = LayoutNode::new(ElementKind::Mspace, style, ctx);
    let dim = |name: &str| {
        element
            .attr(name)
            .map(|a| spacing::size_px(a, node.glyph_size))
            .unwrap_or(0.0)
    };
    let width = dim("width");
    let height = dim("height");
    let depth = dim("depth");
    node.bbox = BBox::new(0.0, width, -depth, height);
    node
}

/// Apply an mpadded adjustment: `+`/`-` offset the current value, a `%`
/// suffix scales it, anything else replaces it.
fn padded_adjust(attr: &str, current: f64, glyph_size: f64) -> f64 {
    let attr = attr.trim();
    if let Some(pct) = attr.strip_suffix('%') {
        return pct
            .trim()
            .parse::<f64>()
            .map(|p| current * p / 100.0)
            .unwrap_or(current);
    }
    if let Some(rest) = attr.strip_prefix('+') {
        return current + spacing::size_px(rest, glyph_size);
    }
    if let Some(rest) = attr
        .strip_prefix('-')
        .or_else(|| attr.strip_prefix('\u{2212}'))
    {
        return current - spacing::size_px(rest, glyph_size);
    }
    spacing::size_px(attr, glyph_size)
}

fn layout_padded(
    element: &MathElement,
    ctx: &LayoutCtx,
    style: MathStyle,
    flags: LayoutFlags,
) -> LayoutNode {
    let mut node = layout_row(element, ctx, style, flags);
    node.kind = ElementKind::Mpadded;
    let mut bbox = node.bbox;
    if let Some(attr) = element.attr("width") {
        bbox.xmax = padded_adjust(attr, bbox.xmax, node.glyph_size);
    }
    if let Some(attr) = element.attr("height") {
        bbox.ymax = padded_adjust(attr, bbox.ymax, node.glyph_size);
    }
    if let Some(attr) = element.attr("depth") {
        bbox.ymin = -padded_adjust(attr, -bbox.ymin, node.glyph_size);
    }
    if let Some(attr) = element.attr("lspace") {
        let shift = spacing::size_px(attr, node.glyph_size);
        for child in &mut node.children {
            child.dx += shift;
        }
        bbox.xmax += shift;
    }
    node.bbox = bbox;
    node
}
