//! SVG visualization of mask geometry.
//!
//! Draws one annotated panel: the viewport, the footprint of the scaled
//! source, and every fill primitive in paint order (base shape, corner
//! patches, band passes). Useful for eyeballing why a corner is square or
//! where a band starts.
//!
//! # Example
//!
//! ```
//! use zenmask::{CornerRadii, FitPolicy, Gravity, MaskSpec, Size, build_mask, compute_fit};
//! use zenmask::svg::render_mask_svg;
//!
//! let viewport = Size::new(400, 300);
//! let source = Size::new(1600, 900);
//! let fit = compute_fit(source, viewport, FitPolicy::CoverCropped, Gravity::Center).unwrap();
//! let radii = CornerRadii::new(Some(24.0), 24.0, 0.0, 24.0, 24.0);
//! let prims = build_mask(viewport, &MaskSpec::Rounded(radii), source, &fit);
//!
//! let svg = render_mask_svg(viewport, source, &prims);
//! assert!(svg.contains("top-right patch"));
//! ```

use crate::geometry::{RectF, Size};
use crate::mask::{Corner, FillPrimitive, Role, Shape, Tone};

/// Maximum pixel width of the viewport panel.
const MAX_PANEL_W: f64 = 300.0;
/// Maximum pixel height of the viewport panel.
const MAX_PANEL_H: f64 = 200.0;
/// Horizontal margin.
const MARGIN_X: f64 = 50.0;
/// Top margin.
const MARGIN_TOP: f64 = 30.0;
/// Height of the label text area above the panel.
const LABEL_H: f64 = 22.0;
/// Height of one legend line below the panel.
const LEGEND_LINE_H: f64 = 16.0;

/// Render a complete SVG document of `primitives` painted into `viewport`.
///
/// `source` is the size of the source buffer the primitives sample; its
/// scaled footprint is drawn dashed behind the fills.
pub fn render_mask_svg(viewport: Size, source: Size, primitives: &[FillPrimitive]) -> String {
    let (pw, ph, scale) = scale_to_fit(viewport);
    let total_w = MAX_PANEL_W.max(pw) + 2.0 * MARGIN_X;
    let legend_h = (primitives.len() as f64 + 1.0) * LEGEND_LINE_H;
    let total_h = MARGIN_TOP + LABEL_H + MAX_PANEL_H + legend_h + MARGIN_TOP;

    let mut svg = String::with_capacity(2048);
    svg.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">"#,
        total_w as u32, total_h as u32, total_w, total_h
    ));
    svg.push('\n');

    // Light/dark mode via prefers-color-scheme
    svg.push_str(r##"<style>
  text { font-family: "Consolas", "DejaVu Sans Mono", "Courier New", monospace; }
  .label { font-size: 13px; font-weight: bold; fill: #333; }
  .annotation { font-size: 11px; fill: #666; }
  .viewport { fill: #e8e8e8; stroke: #999; stroke-width: 1; }
  .footprint { fill: none; stroke: #999; stroke-width: 1; stroke-dasharray: 4,2; }
  .base { fill: #6ba3d6; fill-opacity: 0.85; stroke: #2c6faa; stroke-width: 1.5; }
  .patch { fill: #d6906b; fill-opacity: 0.85; stroke: #aa552c; stroke-width: 1; }
  .gray { fill: #a0a0a0; fill-opacity: 0.85; stroke: #777; stroke-width: 1; }
  .band { fill: #7fc47f; fill-opacity: 0.85; stroke: #3f8f3f; stroke-width: 1.5; }
  @media (prefers-color-scheme: dark) {
    .label { fill: #e0e0e0; }
    .annotation { fill: #aaa; }
    .viewport { fill: #2d2d2d; stroke: #555; }
    .footprint { stroke: #777; }
    .base { fill: #3a72a4; stroke: #5a9fd4; }
    .patch { fill: #a4603a; stroke: #d4905a; }
    .gray { fill: #555; stroke: #888; }
    .band { fill: #3f7f3f; stroke: #6fbf6f; }
  }
</style>
"##);

    let center_x = total_w / 2.0;
    let mut y = MARGIN_TOP;

    svg.push_str(&format!(
        r#"<text x="{}" y="{}" class="label" text-anchor="middle">{}</text>"#,
        center_x,
        y + 14.0,
        escape_xml(&format!("Viewport  {}×{}", viewport.width, viewport.height))
    ));
    svg.push('\n');
    y += LABEL_H;

    let ox = center_x - pw / 2.0;
    let oy = y;
    svg.push_str(&format!(
        r#"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" class="viewport"/>"#,
        ox, oy, pw, ph
    ));
    svg.push('\n');

    // Clip the footprint and fills to the viewport panel.
    svg.push_str(&format!(
        r#"<clipPath id="vp"><rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}"/></clipPath>"#,
        ox, oy, pw, ph
    ));
    svg.push_str("\n<g clip-path=\"url(#vp)\">\n");

    if let Some(first) = primitives.first() {
        let footprint = first.transform.map_rect(RectF::from_size(source));
        push_rect(&mut svg, footprint, ox, oy, scale, "footprint");
    }
    for p in primitives {
        push_shape(&mut svg, &p.shape, ox, oy, scale, class_of(p));
    }
    svg.push_str("</g>\n");

    // Legend: one line per primitive, in paint order.
    y += MAX_PANEL_H + LEGEND_LINE_H;
    let summary = match primitives.first() {
        Some(p) => format!(
            "source {}×{}, scale {:.3}×{:.3}",
            source.width, source.height, p.transform.sx, p.transform.sy
        ),
        None => format!("source {}×{}, nothing painted", source.width, source.height),
    };
    push_annotation(&mut svg, center_x, y, &summary);
    for (i, p) in primitives.iter().enumerate() {
        y += LEGEND_LINE_H;
        push_annotation(&mut svg, center_x, y, &format!("{}. {}", i + 1, describe(p)));
    }

    svg.push_str("</svg>\n");
    svg
}

/// Scale a Size to fit within MAX_PANEL_W × MAX_PANEL_H, preserving aspect ratio.
fn scale_to_fit(size: Size) -> (f64, f64, f64) {
    let w = size.width as f64;
    let h = size.height as f64;
    if w == 0.0 || h == 0.0 {
        return (1.0, 1.0, 1.0);
    }
    let scale = (MAX_PANEL_W / w).min(MAX_PANEL_H / h);
    (w * scale, h * scale, scale)
}

fn class_of(p: &FillPrimitive) -> &'static str {
    match (p.role, p.tone) {
        (Role::CornerPatch(_), _) => "patch",
        (_, Tone::Desaturated) => "gray",
        (Role::BandOverlay, _) => "band",
        _ => "base",
    }
}

fn describe(p: &FillPrimitive) -> String {
    let what = match p.role {
        Role::Base => String::from("base"),
        Role::CornerPatch(c) => format!("{} patch", corner_name(c)),
        Role::BandBase => String::from("band base"),
        Role::BandOverlay => String::from("band overlay"),
        Role::PassThrough => String::from("pass-through"),
    };
    let shape = match p.shape {
        Shape::Circle { radius, .. } => format!("circle r={radius}"),
        Shape::RoundRect { rect, radius } => {
            format!("round rect {}×{} r={radius}", rect.width(), rect.height())
        }
        Shape::Rect(r) => format!("rect {}×{} at ({}, {})", r.width(), r.height(), r.left, r.top),
    };
    let tone = match p.tone {
        Tone::Full => "",
        Tone::Desaturated => ", desaturated",
    };
    let clip = match p.source_clip {
        Some(c) => format!(", source rows {}..{}", c.y, c.y + c.height),
        None => String::new(),
    };
    format!("{what}: {shape}{tone}{clip}")
}

fn corner_name(c: Corner) -> &'static str {
    match c {
        Corner::TopLeft => "top-left",
        Corner::TopRight => "top-right",
        Corner::BottomLeft => "bottom-left",
        Corner::BottomRight => "bottom-right",
    }
}

fn push_shape(svg: &mut String, shape: &Shape, ox: f64, oy: f64, scale: f64, class: &str) {
    match *shape {
        Shape::Circle { center, radius } => {
            svg.push_str(&format!(
                r#"<circle cx="{:.1}" cy="{:.1}" r="{:.1}" class="{}"/>"#,
                ox + center.x as f64 * scale,
                oy + center.y as f64 * scale,
                radius as f64 * scale,
                class
            ));
            svg.push('\n');
        }
        Shape::RoundRect { rect, radius } => {
            svg.push_str(&format!(
                r#"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" rx="{:.1}" class="{}"/>"#,
                ox + rect.left as f64 * scale,
                oy + rect.top as f64 * scale,
                rect.width() as f64 * scale,
                rect.height() as f64 * scale,
                radius as f64 * scale,
                class
            ));
            svg.push('\n');
        }
        Shape::Rect(rect) => push_rect(svg, rect, ox, oy, scale, class),
    }
}

fn push_rect(svg: &mut String, rect: RectF, ox: f64, oy: f64, scale: f64, class: &str) {
    svg.push_str(&format!(
        r#"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" class="{}"/>"#,
        ox + rect.left as f64 * scale,
        oy + rect.top as f64 * scale,
        rect.width() as f64 * scale,
        rect.height() as f64 * scale,
        class
    ));
    svg.push('\n');
}

fn push_annotation(svg: &mut String, x: f64, y: f64, text: &str) {
    svg.push_str(&format!(
        r#"<text x="{}" y="{:.1}" class="annotation" text-anchor="middle">{}</text>"#,
        x,
        y,
        escape_xml(text)
    ));
    svg.push('\n');
}

/// Escape special characters for XML text content.
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fit::{FitPolicy, Gravity, compute_fit};
    use crate::mask::{CornerRadii, MaskSpec, build_mask};

    fn svg_for(spec: MaskSpec, policy: FitPolicy, source: Size, viewport: Size) -> String {
        let fit = compute_fit(source, viewport, policy, Gravity::Center).unwrap();
        let prims = build_mask(viewport, &spec, source, &fit);
        render_mask_svg(viewport, source, &prims)
    }

    #[test]
    fn svg_circle() {
        let svg = svg_for(
            MaskSpec::Circle,
            FitPolicy::CircleCover,
            Size::new(300, 200),
            Size::new(100, 100),
        );
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("Viewport  100×100"));
        assert!(svg.contains("<circle"));
        assert!(svg.contains("1. base: circle r=50"));
        assert!(svg.ends_with("</svg>\n"));
    }

    #[test]
    fn svg_rounded_lists_patches_in_order() {
        let radii = CornerRadii::new(Some(10.0), 0.0, 10.0, 10.0, 0.0);
        let svg = svg_for(
            MaskSpec::Rounded(radii),
            FitPolicy::CoverCropped,
            Size::new(400, 200),
            Size::new(200, 100),
        );
        let tl = svg.find("top-left patch").unwrap();
        let br = svg.find("bottom-right patch").unwrap();
        assert!(tl < br);
        assert!(!svg.contains("top-right patch"));
        assert!(svg.contains(r#"class="patch""#));
    }

    #[test]
    fn svg_band_shows_rows() {
        let svg = svg_for(
            MaskSpec::Band { fraction: 0.25 },
            FitPolicy::ContainScaled,
            Size::new(50, 200),
            Size::new(100, 100),
        );
        assert!(svg.contains("desaturated"));
        assert!(svg.contains("source rows 150..200"));
        assert!(svg.contains(r#"class="band""#));
    }

    #[test]
    fn svg_empty_primitive_list() {
        let svg = render_mask_svg(Size::new(10, 10), Size::new(5, 5), &[]);
        assert!(svg.contains("nothing painted"));
        assert!(svg.ends_with("</svg>\n"));
    }

    #[test]
    fn svg_is_valid_xml() {
        let svg = svg_for(
            MaskSpec::CenterCropBand,
            FitPolicy::VerticalCoverCenterCrop,
            Size::new(720, 1280),
            Size::new(360, 360),
        );
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("</svg>"));
        // No unescaped angle brackets in text
        assert!(!svg.contains("<<"));
    }
}
