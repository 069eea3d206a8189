// Tooltip bubbles: an arrow pointing at an anchor plus a padded text box

use crate::geometry::{PathCommand, Point, Rect};
use crate::render::{AfterAnimation, Attrs, Easing, Handle, Renderer};
use serde::Deserialize;

pub const ARROW_WIDTH: f64 = 5.0;
/// Space between the border and the text
pub const PADDING: f64 = 10.0;
pub const FONT_SIZE: f64 = 12.0;
pub const FADE_MS: u32 = 100;

/// Where the box sits relative to the anchor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    #[default]
    Top,
    Right,
    Bottom,
    Left,
}

/// Outline of a tooltip and the box its text goes into
#[derive(Debug, Clone, PartialEq)]
pub struct Bubble {
    pub path: Vec<PathCommand>,
    pub bbox: Rect,
}

/// Bubble outline starting and ending at `anchor`.
///
/// Both content dimensions grow by `2 * padding`; the one the arrow sits on
/// is at least two arrow widths.
pub fn compute_bubble(anchor: Point, content_width: f64, content_height: f64, padding: f64, side: Side) -> Bubble {
    use PathCommand::*;

    let a = ARROW_WIDTH;
    let Point { x, y } = anchor;
    let mut w = content_width + 2.0 * padding;
    let mut h = content_height + 2.0 * padding;

    let (edges, left, top) = match side {
        Side::Right => {
            h = h.max(2.0 * a);
            (
                [
                    LineBy(a, -a),
                    VerticalBy(-(h / 2.0 - a)),
                    HorizontalBy(w),
                    VerticalBy(h),
                    HorizontalBy(-w),
                    VerticalBy(-(h / 2.0 - a)),
                    LineBy(-a, -a),
                ],
                x + a,
                y - h / 2.0,
            )
        }
        Side::Top => {
            w = w.max(2.0 * a);
            (
                [
                    LineBy(-a, -a),
                    HorizontalBy(-(w / 2.0 - a)),
                    VerticalBy(-h),
                    HorizontalBy(w),
                    VerticalBy(h),
                    HorizontalBy(-(w / 2.0 - a)),
                    LineBy(-a, a),
                ],
                x - w / 2.0,
                y - a - h,
            )
        }
        Side::Left => {
            h = h.max(2.0 * a);
            (
                [
                    LineBy(-a, a),
                    VerticalBy(h / 2.0 - a),
                    HorizontalBy(-w),
                    VerticalBy(-h),
                    HorizontalBy(w),
                    VerticalBy(h / 2.0 - a),
                    LineBy(a, a),
                ],
                x - a - w,
                y - h / 2.0,
            )
        }
        Side::Bottom => {
            w = w.max(2.0 * a);
            (
                [
                    LineBy(a, a),
                    HorizontalBy(w / 2.0 - a),
                    VerticalBy(h),
                    HorizontalBy(-w),
                    VerticalBy(-h),
                    HorizontalBy(w / 2.0 - a),
                    LineBy(a, -a),
                ],
                x - w / 2.0,
                y + a,
            )
        }
    };

    let mut path = Vec::with_capacity(edges.len() + 2);
    path.push(MoveTo(x, y));
    path.extend(edges);
    path.push(Close);

    Bubble {
        path,
        bbox: Rect::from_origin_size((left, top), (w, h)),
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum TooltipState {
    #[default]
    Hidden,
    Visible {
        path: Handle,
        labels: Vec<Handle>,
        bbox: Rect,
        line_height: f64,
    },
}

/// Show/hide controller for one tooltip owner
#[derive(Debug, Clone, Default)]
pub struct Tooltip {
    state: TooltipState,
}

impl Tooltip {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &TooltipState {
        &self.state
    }

    pub fn is_visible(&self) -> bool {
        matches!(self.state, TooltipState::Visible { .. })
    }

    /// Show `lines` in a bubble pointing at `anchor`.
    ///
    /// A visible tooltip keeps its bubble and only has its text replaced.
    pub fn show<S: AsRef<str>>(&mut self, renderer: &mut dyn Renderer, anchor: Point, lines: &[S], side: Side) {
        if let TooltipState::Visible {
            labels,
            bbox,
            line_height,
            ..
        } = &mut self.state
        {
            for (i, line) in lines.iter().enumerate() {
                match labels.get(i) {
                    Some(&label) => renderer.set_attributes(label, &Attrs::new().text(line.as_ref())),
                    None => {
                        let (x, y) = line_position(bbox, *line_height, i);
                        let label = renderer.draw_text(x, y, line.as_ref());
                        renderer.set_attributes(label, &Attrs::new().font_size(FONT_SIZE));
                        labels.push(label);
                    }
                }
            }
            return;
        }

        let mut labels = Vec::with_capacity(lines.len());
        let mut content_width: f64 = 0.0;
        let mut line_height: f64 = 0.0;
        for line in lines {
            let label = renderer.draw_text(anchor.x, -100.0, line.as_ref());
            renderer.set_attributes(label, &Attrs::new().opacity(0.0).font_size(FONT_SIZE));
            let size = renderer.measure_bounds(label);
            content_width = content_width.max(size.width);
            line_height = line_height.max(size.height);
            labels.push(label);
        }

        let bubble = compute_bubble(anchor, content_width, lines.len() as f64 * line_height, PADDING, side);
        let path = renderer.draw_path(&bubble.path);
        renderer.set_attributes(
            path,
            &Attrs::new()
                .fill("#000000")
                .stroke_width(4.0)
                .fill_opacity(0.1)
                .stroke_linejoin("round")
                .stroke("#666")
                .opacity(0.0),
        );

        let fade_in = Attrs::new().opacity(1.0);
        renderer.animate(path, &fade_in, FADE_MS, None, None);
        for (i, &label) in labels.iter().enumerate() {
            let (x, y) = line_position(&bubble.bbox, line_height, i);
            renderer.set_attributes(label, &Attrs::new().position(x, y));
            renderer.animate(label, &fade_in, FADE_MS, None, None);
        }

        tracing::trace!(?side, bbox = ?bubble.bbox, lines = labels.len(), "tooltip shown");
        self.state = TooltipState::Visible {
            path,
            labels,
            bbox: bubble.bbox,
            line_height,
        };
    }

    /// Fade out and hide the bubble. Does nothing when already hidden.
    pub fn hide(&mut self, renderer: &mut dyn Renderer) {
        let TooltipState::Visible { path, labels, .. } = std::mem::take(&mut self.state) else {
            return;
        };
        let fade_out = Attrs::new().opacity(0.0);
        for handle in std::iter::once(path).chain(labels) {
            renderer.animate(handle, &fade_out, FADE_MS, Some(Easing::Linear), Some(AfterAnimation::Hide));
        }
    }
}

fn line_position(bbox: &Rect, line_height: f64, line: usize) -> (f64, f64) {
    (
        bbox.center().x,
        bbox.y0 + (line as f64 + 0.5) * line_height + PADDING,
    )
}
