//! Table layout (`mtable`).
//!
//! Rows share baselines; the whole table is centered vertically on the
//! math axis. Column alignment cascades cell > row > table, with the
//! last entry of a row's `columnalign` list repeating.

use crate::font::BBox;
use crate::model::{ElementKind, MathElement};
use crate::style::MathStyle;

use super::{build, LayoutCtx, LayoutFlags, LayoutNode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Center,
    Right,
}

impl Align {
    fn from_attr(attr: &str) -> Align {
        match attr {
            "left" => Align::Left,
            "right" => Align::Right,
            _ => Align::Center,
        }
    }
}

/// Alignment for column `c` from a space-separated list, repeating the
/// last entry past the end.
fn align_at(list: &str, c: usize) -> Option<Align> {
    let entries: Vec<&str> = list.split_whitespace().collect();
    if entries.is_empty() {
        return None;
    }
    Some(Align::from_attr(entries.get(c).unwrap_or(
        entries.last().unwrap(),
    )))
}

pub fn layout_table(
    element: &MathElement,
    ctx: &LayoutCtx,
    style: MathStyle,
    flags: LayoutFlags,
) -> LayoutNode {
    let mut node = LayoutNode::new(ElementKind::Mtable, style, ctx);
    node.phantom = flags.phantom;
    let table_align = element.attr("columnalign").unwrap_or("center").to_string();

    let mut rows: Vec<Vec<(LayoutNode, Align)>> = Vec::new();
    for row_el in &element.children {
        if row_el.kind != ElementKind::Mtr {
            continue;
        }
        let row_align = row_el.attr("columnalign");
        let mut cells = Vec::new();
        for (c, cell_el) in row_el.children.iter().enumerate() {
            if cell_el.kind != ElementKind::Mtd {
                continue;
            }
            let align = cell_el
                .attr("columnalign")
                .map(Align::from_attr)
                .or_else(|| row_align.and_then(|a| align_at(a, c)))
                .or_else(|| align_at(&table_align, c))
                .unwrap_or(Align::Center);
            let cell = build(
                cell_el,
                ctx,
                Some(&node.style),
                node.style.script_level,
                flags.inherit(),
            );
            cells.push((cell, align));
        }
        rows.push(cells);
    }
    rows.retain(|r| !r.is_empty());
    if rows.is_empty() {
        return node;
    }

    let row_space = node.ems_px(0.2);
    let col_space = node.ems_px(0.2);

    let mut row_heights: Vec<f64> = Vec::with_capacity(rows.len());
    let mut row_depths: Vec<f64> = Vec::with_capacity(rows.len());
    for row in &rows {
        row_heights.push(
            row.iter()
                .map(|(c, _)| c.bbox.ymax)
                .fold(f64::NEG_INFINITY, f64::max),
        );
        row_depths.push(row.iter().map(|(c, _)| c.bbox.ymin).fold(f64::INFINITY, f64::min));
    }
    let ncols = rows.iter().map(Vec::len).max().unwrap_or(0);
    let mut col_widths = vec![0.0f64; ncols];
    for row in &rows {
        for (c, (cell, _)) in row.iter().enumerate() {
            col_widths[c] = col_widths[c].max(cell.bbox.width());
        }
    }

    if element.attr("equalrows") == Some("true") {
        let h = row_heights.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let d = row_depths.iter().copied().fold(f64::INFINITY, f64::min);
        row_heights.iter_mut().for_each(|v| *v = h);
        row_depths.iter_mut().for_each(|v| *v = d);
    }
    if element.attr("equalcolumns") == Some("true") {
        let w = col_widths.iter().copied().fold(0.0f64, f64::max);
        col_widths.iter_mut().for_each(|v| *v = w);
    }

    let total_height: f64 = row_heights.iter().sum::<f64>() - row_depths.iter().sum::<f64>()
        + row_space * (rows.len() - 1) as f64;
    let width: f64 = col_widths.iter().sum::<f64>() + col_space * ncols as f64;

    // Baseline of the table sits on the math axis, half way down.
    let ytop = -total_height / 2.0 - ctx.font.consts().axis_height * node.em_scale;
    let mut baselines = Vec::with_capacity(rows.len());
    let mut y = ytop;
    for (h, d) in row_heights.iter().zip(&row_depths) {
        baselines.push(y + h);
        y += h - d + row_space;
    }

    let mut ymin = f64::INFINITY;
    let mut ymax = f64::NEG_INFINITY;
    let last_baseline = *baselines.last().unwrap();
    let first_baseline = baselines[0];
    for (r, row) in rows.into_iter().enumerate() {
        let mut x = col_space / 2.0;
        for (c, (cell, align)) in row.into_iter().enumerate() {
            let cellw = cell.bbox.width();
            let xcell = match align {
                Align::Center => x + col_widths[c] / 2.0 - cellw / 2.0,
                Align::Right => x + col_widths[c] - cellw,
                Align::Left => x,
            };
            if r == 0 {
                ymax = ymax.max(-first_baseline + cell.bbox.ymax);
            }
            if baselines.len() == r + 1 {
                ymin = ymin.min(cell.bbox.ymin - last_baseline);
            }
            node.push_node(cell, xcell, baselines[r]);
            x += col_widths[c] + col_space;
        }
    }
    node.bbox = BBox::new(0.0, width, ymin, ymax);
    node
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_align_list_repeats_last() {
        assert_eq!(align_at("left center right", 0), Some(Align::Left));
        assert_eq!(align_at("left center right", 2), Some(Align::Right));
        assert_eq!(align_at("left center", 5), Some(Align::Center));
        assert_eq!(align_at("", 0), None);
    }

    #[test]
    fn test_align_unknown_defaults_center() {
        assert_eq!(Align::from_attr("middle"), Align::Center);
    }
}
