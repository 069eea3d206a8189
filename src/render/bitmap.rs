// Rasterize a recorded scene into PNG bytes

use super::recording::{Node, RecordingRenderer, Shape};
use super::Renderer;
use crate::geometry::{corners, path_vertices, Point, Rect};
use anyhow::{Context, Result};
use image::ImageEncoder;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

type Canvas<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

const DEFAULT_FONT_SIZE: f64 = 12.0;

/// Draw every visible element of `scene` on a white background and encode
/// the result as PNG
pub fn render_png(scene: &RecordingRenderer) -> Result<Vec<u8>> {
    let surface = scene
        .surface()
        .context("Cannot rasterize a scene without a mounted surface")?;
    let width = surface.width.round() as u32;
    let height = surface.height.round() as u32;
    if width == 0 || height == 0 {
        anyhow::bail!("Cannot rasterize an empty {}x{} surface", width, height);
    }

    let len = buffer_len(width, height)
        .with_context(|| format!("A {}x{} surface is too large to rasterize", width, height))?;
    let mut buffer = vec![0u8; len];

    {
        let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();

        root.fill(&WHITE).context("Failed to fill background")?;

        for node in scene.nodes() {
            let opacity = node.attrs.opacity.unwrap_or(1.0);
            if !node.visible || opacity <= 0.0 {
                continue;
            }
            draw_node(&root, node, opacity)?;
        }

        root.present().context("Failed to present drawing")?;
    }

    let mut png_bytes = Vec::new();
    {
        let encoder = image::codecs::png::PngEncoder::new(&mut png_bytes);
        encoder
            .write_image(&buffer, width, height, image::ColorType::Rgb8)
            .context("Failed to encode PNG")?;
    }

    tracing::debug!(width, height, bytes = png_bytes.len(), "encoded PNG");
    Ok(png_bytes)
}

fn draw_node(root: &Canvas<'_>, node: &Node, opacity: f64) -> Result<()> {
    let fill = node.attrs.fill.as_deref().filter(|f| *f != "none").map(color_or_black);
    let stroke = color_or_black(node.attrs.stroke.as_deref().unwrap_or("#000"));
    let stroke_width = node.attrs.stroke_width.unwrap_or(1.0);
    let fill_alpha = opacity * node.attrs.fill_opacity.unwrap_or(1.0);

    match &node.shape {
        Shape::Path(commands) => {
            for subpath in path_vertices(commands) {
                let points = to_pixels(node, &subpath);
                if let Some(fill) = fill {
                    if points.len() >= 3 && fill_alpha > 0.0 {
                        root.draw(&Polygon::new(points.clone(), fill.mix(fill_alpha).filled()))
                            .context("Failed to fill path")?;
                    }
                }
                if stroke_width > 0.0 {
                    root.draw(&PathElement::new(points, stroke.mix(opacity).stroke_width(pixel_width(stroke_width))))
                        .context("Failed to stroke path")?;
                }
            }
        }
        Shape::Rect { x, y, width, height, .. } => {
            let mut outline = corners(Rect::from_origin_size((*x, *y), (*width, *height))).to_vec();
            outline.push(outline[0]);
            let points = to_pixels(node, &outline);
            if let Some(fill) = fill {
                if fill_alpha > 0.0 {
                    root.draw(&Polygon::new(points.clone(), fill.mix(fill_alpha).filled()))
                        .context("Failed to fill rect")?;
                }
            }
            if stroke_width > 0.0 {
                root.draw(&PathElement::new(points, stroke.mix(opacity).stroke_width(pixel_width(stroke_width))))
                    .context("Failed to stroke rect")?;
            }
        }
        Shape::Circle { cx, cy, r } => {
            let center = to_pixels(node, &[Point::new(*cx, *cy)])[0];
            let radius = (r * node.transform.determinant().abs().sqrt()).round().max(0.0) as u32;
            if let Some(fill) = fill {
                if fill_alpha > 0.0 {
                    root.draw(&Circle::new(center, radius, fill.mix(fill_alpha).filled()))
                        .context("Failed to fill circle")?;
                }
            }
            if stroke_width > 0.0 {
                root.draw(&Circle::new(center, radius, stroke.mix(opacity).stroke_width(pixel_width(stroke_width))))
                    .context("Failed to stroke circle")?;
            }
        }
        Shape::Text { x, y, content } => {
            // Glyphs are drawn upright at the transformed anchor; rotation only moves them.
            let anchor = to_pixels(node, &[Point::new(*x, *y)])[0];
            let font_size = node.attrs.font_size.unwrap_or(DEFAULT_FONT_SIZE);
            let color = fill.unwrap_or(BLACK).mix(opacity);
            let style = ("sans-serif", font_size)
                .into_font()
                .color(&color)
                .pos(Pos::new(HPos::Center, VPos::Center));
            if let Err(err) = root.draw(&Text::new(content.clone(), anchor, style)) {
                tracing::warn!(%err, text = %content, "skipping text that could not be rasterized");
            }
        }
    }

    Ok(())
}

fn to_pixels(node: &Node, points: &[Point]) -> Vec<(i32, i32)> {
    points
        .iter()
        .map(|p| {
            let p = node.transform * *p;
            (p.x.round() as i32, p.y.round() as i32)
        })
        .collect()
}

/// Bytes of an RGB buffer, `None` when it does not fit in memory
fn buffer_len(width: u32, height: u32) -> Option<usize> {
    usize::try_from(width)
        .ok()?
        .checked_mul(usize::try_from(height).ok()?)?
        .checked_mul(3)
}

fn pixel_width(width: f64) -> u32 {
    width.round().max(1.0) as u32
}

fn color_or_black(spec: &str) -> RGBColor {
    parse_color(spec).unwrap_or_else(|| {
        tracing::warn!(color = spec, "unknown color, using black");
        BLACK
    })
}

/// Parse `#rgb`, `#rrggbb` or a small set of colour names
pub fn parse_color(spec: &str) -> Option<RGBColor> {
    let spec = spec.trim();
    if let Some(hex) = spec.strip_prefix('#') {
        let digits: Vec<u8> = hex
            .chars()
            .map(|c| c.to_digit(16).map(|d| d as u8))
            .collect::<Option<Vec<u8>>>()?;
        return match digits.as_slice() {
            [r, g, b] => Some(RGBColor(r * 17, g * 17, b * 17)),
            [r1, r2, g1, g2, b1, b2] => Some(RGBColor(r1 * 16 + r2, g1 * 16 + g2, b1 * 16 + b2)),
            _ => None,
        };
    }

    let named = match spec.to_ascii_lowercase().as_str() {
        "black" => RGBColor(0, 0, 0),
        "white" => RGBColor(255, 255, 255),
        "gray" | "grey" => RGBColor(128, 128, 128),
        "red" => RGBColor(255, 0, 0),
        "green" => RGBColor(0, 128, 0),
        "blue" => RGBColor(0, 0, 255),
        "orange" => RGBColor(255, 165, 0),
        "purple" => RGBColor(128, 0, 128),
        "brown" => RGBColor(165, 42, 42),
        "pink" => RGBColor(255, 192, 203),
        "olive" => RGBColor(128, 128, 0),
        "cyan" => RGBColor(0, 255, 255),
        _ => return None,
    };
    Some(named)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Attrs;

    fn is_valid_png(bytes: &[u8]) -> bool {
        bytes.len() > 8 && bytes[0..8] == [137, 80, 78, 71, 13, 10, 26, 10]
    }

    #[test]
    fn test_parse_color() {
        assert_eq!(parse_color("#ccc"), Some(RGBColor(204, 204, 204)));
        assert_eq!(parse_color("#1f77b4"), Some(RGBColor(31, 119, 180)));
        assert_eq!(parse_color("Gray"), Some(RGBColor(128, 128, 128)));
        assert_eq!(parse_color("#12"), None);
        assert_eq!(parse_color("mauve-ish"), None);
    }

    #[test]
    fn test_render_shapes_to_png() {
        let mut scene = RecordingRenderer::new(40.0, 30.0);
        let rect = scene.draw_rect(2.0, 2.0, 10.0, 10.0, Some(2.0));
        scene.set_attributes(rect, &Attrs::new().fill("#1f77b4").stroke_width(0.0));
        let circle = scene.draw_circle(20.0, 15.0, 4.0);
        scene.set_attributes(circle, &Attrs::new().fill("red"));
        let hidden = scene.draw_circle(30.0, 15.0, 4.0);
        scene.hide(hidden);

        let png = render_png(&scene).unwrap();
        assert!(is_valid_png(&png));
    }

    #[test]
    fn test_buffer_len_is_checked() {
        assert_eq!(buffer_len(40, 30), Some(3600));
        assert_eq!(buffer_len(u32::MAX, u32::MAX), None);
    }

    #[test]
    fn test_oversized_surface_is_an_error() {
        let scene = RecordingRenderer::new(f64::from(u32::MAX), f64::from(u32::MAX));
        let err = render_png(&scene).unwrap_err();
        assert!(err.to_string().contains("too large"));
    }

    #[test]
    fn test_render_requires_surface() {
        assert!(render_png(&RecordingRenderer::unmounted()).is_err());
    }
}
