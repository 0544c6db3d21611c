//! SVG rendering of a [`Figure`].

use std::fmt::{self, Write};

use eframe::egui::Color32;

use super::camera::{cube_edges, Bounds, Camera, Viewport};
use super::config::MarkerShape;
use super::figure::Figure;
use super::legend::{self, LegendBox};
use crate::color::to_hex;

const AXIS_COLOR: &str = "#9a9a9a";
const TEXT_COLOR: &str = "#222222";
const TICK_OFFSET: f64 = 16.0;
const LABEL_OFFSET: f64 = 36.0;

/// A marker already mapped to pixel space.
struct ScreenMarker {
    x: f64,
    y: f64,
    depth: f64,
    color: Color32,
    marker: MarkerShape,
    size: f64,
}

/// Render `figure` as a standalone SVG document.
pub fn render(figure: &Figure) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_document(&mut out, figure);
    out
}

fn write_document(out: &mut String, figure: &Figure) -> fmt::Result {
    let (w, h) = (figure.config.width as f64, figure.config.height as f64);
    let viewport = Viewport::new(w, h);
    let bounds = figure.bounds();
    let camera = figure.camera;

    writeln!(out, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
    writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="sans-serif" font-size="12">"#
    )?;
    writeln!(out, r#"<rect width="100%" height="100%" fill="white"/>"#)?;

    write_axes(out, &camera, &viewport, &bounds)?;

    let markers = screen_markers(figure, &camera, &viewport, &bounds);
    writeln!(out, r#"<g class="markers">"#)?;
    for m in &markers {
        write_marker(out, "marker", m.marker, m.x, m.y, m.size, m.color)?;
    }
    writeln!(out, "</g>")?;

    let labels: Vec<&str> = figure.groups.iter().map(|g| g.label.as_str()).collect();
    let centers: Vec<(f64, f64)> = markers.iter().map(|m| (m.x, m.y)).collect();
    let legend = legend::place_best(&labels, (w, h), &centers);
    write_legend(out, figure, &legend)?;

    writeln!(out, "</svg>")
}

/// Project every finite point, painted far-to-near.
fn screen_markers(
    figure: &Figure,
    camera: &Camera,
    viewport: &Viewport,
    bounds: &Bounds,
) -> Vec<ScreenMarker> {
    let mut markers: Vec<ScreenMarker> = figure
        .groups
        .iter()
        .flat_map(|g| g.points.iter().map(move |p| (g, p)))
        .filter(|(_, p)| p.iter().all(|c| c.is_finite()))
        .map(|(g, p)| {
            let projected = camera.project(bounds.normalize(*p));
            let (x, y) = viewport.to_screen(projected);
            ScreenMarker {
                x,
                y,
                depth: projected.depth,
                color: g.color,
                marker: g.marker,
                size: g.size as f64,
            }
        })
        .collect();
    markers.sort_by(|a, b| a.depth.total_cmp(&b.depth));
    markers
}

// ---------------------------------------------------------------------------
// Axes box, ticks and labels
// ---------------------------------------------------------------------------

fn write_axes(
    out: &mut String,
    camera: &Camera,
    viewport: &Viewport,
    bounds: &Bounds,
) -> fmt::Result {
    let screen = |p: [f64; 3]| viewport.to_screen(camera.project(p));

    writeln!(out, r#"<g class="axes" stroke="{AXIS_COLOR}" stroke-width="1">"#)?;
    for (a, b) in cube_edges() {
        let (x1, y1) = screen(a);
        let (x2, y2) = screen(b);
        writeln!(
            out,
            r#"<line x1="{x1:.2}" y1="{y1:.2}" x2="{x2:.2}" y2="{y2:.2}"/>"#
        )?;
    }
    writeln!(out, "</g>")?;

    let origin = screen([0.0; 3]);
    writeln!(out, r#"<g class="ticks" fill="{TEXT_COLOR}" text-anchor="middle">"#)?;
    for axis in 0..3 {
        let edge = tick_edge(axis, camera);
        for t in [-0.5, 0.0, 0.5] {
            let mut p = edge;
            p[axis] = t;
            let (x, y) = push_out(screen(p), origin, TICK_OFFSET);
            let value = format_tick(bounds.denormalize(axis, t));
            writeln!(
                out,
                r#"<text x="{x:.2}" y="{:.2}">{}</text>"#,
                y + 4.0,
                escape(&value)
            )?;
        }
    }
    writeln!(out, "</g>")?;

    writeln!(
        out,
        r#"<g class="axis-labels" fill="{TEXT_COLOR}" font-size="14" text-anchor="middle">"#
    )?;
    for (axis, name) in ["x", "y", "z"].into_iter().enumerate() {
        let mut p = tick_edge(axis, camera);
        p[axis] = 0.0;
        let (x, y) = push_out(screen(p), origin, LABEL_OFFSET);
        writeln!(
            out,
            r#"<text class="axis-label" x="{x:.2}" y="{:.2}">{name}</text>"#,
            y + 5.0
        )?;
    }
    writeln!(out, "</g>")
}

/// A point on the cube edge that carries the ticks for `axis`.
///
/// x and y ticks run along the bottom face on the side nearest the viewer;
/// z ticks run up the leftmost vertical edge.
fn tick_edge(axis: usize, camera: &Camera) -> [f64; 3] {
    let nearer = |a: [f64; 3], b: [f64; 3]| {
        if camera.project(a).depth >= camera.project(b).depth {
            a
        } else {
            b
        }
    };
    match axis {
        0 => nearer([0.0, -0.5, -0.5], [0.0, 0.5, -0.5]),
        1 => nearer([-0.5, 0.0, -0.5], [0.5, 0.0, -0.5]),
        _ => [[-0.5, -0.5], [-0.5, 0.5], [0.5, -0.5], [0.5, 0.5]]
            .into_iter()
            .map(|[x, y]| [x, y, 0.0])
            .min_by(|a, b| camera.project(*a).u.total_cmp(&camera.project(*b).u))
            .unwrap_or([-0.5, -0.5, 0.0]),
    }
}

/// Move `p` away from `origin` by `dist` pixels.
fn push_out(p: (f64, f64), origin: (f64, f64), dist: f64) -> (f64, f64) {
    let (dx, dy) = (p.0 - origin.0, p.1 - origin.1);
    let len = dx.hypot(dy);
    if len < f64::EPSILON {
        return (p.0, p.1 + dist);
    }
    (p.0 + dx / len * dist, p.1 + dy / len * dist)
}

/// Short tick label: up to three decimals, scientific for very large or small values.
pub fn format_tick(v: f64) -> String {
    let a = v.abs();
    if a != 0.0 && !(1e-3..1e5).contains(&a) {
        return format!("{v:.2e}");
    }
    let s = format!("{v:.3}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

// ---------------------------------------------------------------------------
// Markers and legend
// ---------------------------------------------------------------------------

fn write_marker(
    out: &mut String,
    class: &str,
    shape: MarkerShape,
    x: f64,
    y: f64,
    r: f64,
    color: Color32,
) -> fmt::Result {
    let fill = to_hex(color);
    match shape {
        MarkerShape::Circle => writeln!(
            out,
            r#"<circle class="{class}" cx="{x:.2}" cy="{y:.2}" r="{r:.2}" fill="{fill}"/>"#
        ),
        MarkerShape::Square => writeln!(
            out,
            r#"<rect class="{class}" x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="{fill}"/>"#,
            x - r,
            y - r,
            2.0 * r,
            2.0 * r
        ),
        MarkerShape::Triangle => writeln!(
            out,
            r#"<polygon class="{class}" points="{:.2},{:.2} {:.2},{:.2} {:.2},{:.2}" fill="{fill}"/>"#,
            x,
            y - r,
            x - r,
            y + r,
            x + r,
            y + r
        ),
        MarkerShape::Diamond => writeln!(
            out,
            r#"<polygon class="{class}" points="{:.2},{:.2} {:.2},{:.2} {:.2},{:.2} {:.2},{:.2}" fill="{fill}"/>"#,
            x,
            y - r,
            x + r,
            y,
            x,
            y + r,
            x - r,
            y
        ),
        MarkerShape::Cross => writeln!(
            out,
            r#"<path class="{class}" d="M{:.2} {:.2}L{:.2} {:.2}M{:.2} {:.2}L{:.2} {:.2}" stroke="{fill}" stroke-width="1.5" fill="none"/>"#,
            x - r,
            y - r,
            x + r,
            y + r,
            x - r,
            y + r,
            x + r,
            y - r
        ),
    }
}

fn write_legend(out: &mut String, figure: &Figure, legend: &LegendBox) -> fmt::Result {
    writeln!(out, r#"<g class="legend">"#)?;
    writeln!(
        out,
        r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="white" fill-opacity="0.8" stroke="{AXIS_COLOR}" rx="3"/>"#,
        legend.x, legend.y, legend.width, legend.height
    )?;
    for (i, group) in figure.groups.iter().enumerate() {
        let cy = legend.row_center(i);
        let r = (group.size as f64).min(6.0);
        write_marker(
            out,
            "legend-marker",
            group.marker,
            legend.swatch_x(),
            cy,
            r,
            group.color,
        )?;
        writeln!(
            out,
            r#"<text x="{:.2}" y="{:.2}" fill="{TEXT_COLOR}">{}</text>"#,
            legend.text_x(),
            cy + 4.0,
            escape(&group.label)
        )?;
    }
    writeln!(out, "</g>")
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}
