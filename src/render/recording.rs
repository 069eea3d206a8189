// Headless renderer: keeps every element in memory instead of drawing it

use super::{AfterAnimation, Attrs, Easing, Handle, PointerEvent, Renderer};
use crate::geometry::{
    bounding, corners, path_vertices, rotation_about, scale_about, Affine, PathCommand, Point, Rect, Size,
};

/// Average glyph advance at font size 12
pub const DEFAULT_CHAR_WIDTH: f64 = 7.0;
/// Line box height at font size 12
pub const DEFAULT_LINE_HEIGHT: f64 = 16.0;
const REFERENCE_FONT_SIZE: f64 = 12.0;

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Path(Vec<PathCommand>),
    Text { x: f64, y: f64, content: String },
    Rect { x: f64, y: f64, width: f64, height: f64, corner_radius: Option<f64> },
    Circle { cx: f64, cy: f64, r: f64 },
}

/// A recorded element with its accumulated state
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub shape: Shape,
    pub attrs: Attrs,
    pub transform: Affine,
    pub visible: bool,
    pub listeners: Vec<PointerEvent>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Animation {
    pub handle: Handle,
    pub attrs: Attrs,
    pub duration_ms: u32,
    pub easing: Easing,
    pub on_complete: Option<AfterAnimation>,
}

/// Renderer that records the scene.
///
/// Text is measured with a fixed advance per character scaled by font size.
/// Animations jump straight to their final state and are kept in a log.
#[derive(Debug, Clone)]
pub struct RecordingRenderer {
    surface: Option<Size>,
    nodes: Vec<Node>,
    animations: Vec<Animation>,
    char_width: f64,
    line_height: f64,
}

impl RecordingRenderer {
    pub fn new(width: f64, height: f64) -> Self {
        RecordingRenderer {
            surface: Some(Size::new(width, height)),
            nodes: Vec::new(),
            animations: Vec::new(),
            char_width: DEFAULT_CHAR_WIDTH,
            line_height: DEFAULT_LINE_HEIGHT,
        }
    }

    /// A renderer with nothing mounted
    pub fn unmounted() -> Self {
        RecordingRenderer {
            surface: None,
            ..Self::new(0.0, 0.0)
        }
    }

    pub fn with_text_metrics(mut self, char_width: f64, line_height: f64) -> Self {
        self.char_width = char_width;
        self.line_height = line_height;
        self
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node(&self, handle: Handle) -> Option<&Node> {
        self.nodes.get(handle.0)
    }

    pub fn animations(&self) -> &[Animation] {
        &self.animations
    }

    pub fn is_visible(&self, handle: Handle) -> bool {
        self.node(handle).map_or(false, |n| n.visible)
    }

    pub fn has_listener(&self, handle: Handle, event: PointerEvent) -> bool {
        self.node(handle).map_or(false, |n| n.listeners.contains(&event))
    }

    /// Anchor of an element after its transform: text position, rect
    /// top-left corner, circle centre or the first path vertex
    pub fn anchor(&self, handle: Handle) -> Option<Point> {
        let node = self.node(handle)?;
        let local = match &node.shape {
            Shape::Path(commands) => *path_vertices(commands).first()?.first()?,
            Shape::Text { x, y, .. } => Point::new(*x, *y),
            Shape::Rect { x, y, .. } => Point::new(*x, *y),
            Shape::Circle { cx, cy, .. } => Point::new(*cx, *cy),
        };
        Some(node.transform * local)
    }

    /// Outline vertices of an element in surface coordinates
    pub fn outline(&self, handle: Handle) -> Vec<Point> {
        let Some(node) = self.node(handle) else {
            return Vec::new();
        };
        self.local_outline(node)
            .into_iter()
            .map(|p| node.transform * p)
            .collect()
    }

    /// Bounding box in surface coordinates
    pub fn bounds(&self, handle: Handle) -> Option<Rect> {
        bounding(self.outline(handle))
    }

    pub fn text_of(&self, handle: Handle) -> Option<&str> {
        match &self.node(handle)?.shape {
            Shape::Text { content, .. } => Some(content),
            _ => None,
        }
    }

    fn text_size(&self, content: &str, font_size: Option<f64>) -> Size {
        let factor = font_size.unwrap_or(REFERENCE_FONT_SIZE) / REFERENCE_FONT_SIZE;
        let longest = content.lines().map(|l| l.chars().count()).max().unwrap_or(0);
        let lines = content.lines().count().max(1);
        Size::new(
            longest as f64 * self.char_width * factor,
            lines as f64 * self.line_height * factor,
        )
    }

    fn local_outline(&self, node: &Node) -> Vec<Point> {
        match &node.shape {
            Shape::Path(commands) => path_vertices(commands).into_iter().flatten().collect(),
            Shape::Text { x, y, content } => {
                let size = self.text_size(content, node.attrs.font_size);
                let center = Point::new(*x, *y);
                corners(Rect::from_center_size(center, size)).to_vec()
            }
            Shape::Rect { x, y, width, height, .. } => {
                corners(Rect::from_origin_size((*x, *y), (*width, *height))).to_vec()
            }
            Shape::Circle { cx, cy, r } => {
                corners(Rect::from_center_size((*cx, *cy), (2.0 * r, 2.0 * r))).to_vec()
            }
        }
    }

    fn push(&mut self, shape: Shape) -> Handle {
        let handle = Handle(self.nodes.len());
        self.nodes.push(Node {
            shape,
            attrs: Attrs::default(),
            transform: Affine::IDENTITY,
            visible: true,
            listeners: Vec::new(),
        });
        handle
    }

    fn node_mut(&mut self, handle: Handle) -> Option<&mut Node> {
        let node = self.nodes.get_mut(handle.0);
        if node.is_none() {
            tracing::warn!(?handle, "unknown handle");
        }
        node
    }
}

impl Renderer for RecordingRenderer {
    fn surface(&self) -> Option<Size> {
        self.surface
    }

    fn draw_path(&mut self, path: &[PathCommand]) -> Handle {
        self.push(Shape::Path(path.to_vec()))
    }

    fn draw_text(&mut self, x: f64, y: f64, content: &str) -> Handle {
        self.push(Shape::Text {
            x,
            y,
            content: content.to_string(),
        })
    }

    fn draw_rect(&mut self, x: f64, y: f64, width: f64, height: f64, corner_radius: Option<f64>) -> Handle {
        self.push(Shape::Rect {
            x,
            y,
            width,
            height,
            corner_radius,
        })
    }

    fn draw_circle(&mut self, cx: f64, cy: f64, r: f64) -> Handle {
        self.push(Shape::Circle { cx, cy, r })
    }

    fn set_attributes(&mut self, handle: Handle, attrs: &Attrs) {
        let Some(node) = self.node_mut(handle) else {
            return;
        };
        match &mut node.shape {
            Shape::Text { x, y, content } => {
                if let Some(text) = &attrs.text {
                    *content = text.clone();
                }
                *x = attrs.x.unwrap_or(*x);
                *y = attrs.y.unwrap_or(*y);
            }
            Shape::Rect { x, y, .. } => {
                *x = attrs.x.unwrap_or(*x);
                *y = attrs.y.unwrap_or(*y);
            }
            Shape::Circle { cx, cy, .. } => {
                *cx = attrs.x.unwrap_or(*cx);
                *cy = attrs.y.unwrap_or(*cy);
            }
            Shape::Path(_) => {}
        }
        node.attrs.merge(attrs);
    }

    fn measure_bounds(&self, handle: Handle) -> Size {
        self.bounds(handle).map(|r| r.size()).unwrap_or_default()
    }

    fn translate(&mut self, handle: Handle, dx: f64, dy: f64) {
        if let Some(node) = self.node_mut(handle) {
            node.transform = Affine::translate((dx, dy)) * node.transform;
        }
    }

    fn rotate(&mut self, handle: Handle, degrees: f64, about_x: f64, about_y: f64) {
        if let Some(node) = self.node_mut(handle) {
            node.transform = node.transform * rotation_about(degrees, Point::new(about_x, about_y));
        }
    }

    fn scale(&mut self, handle: Handle, sx: f64, sy: f64, about_x: f64, about_y: f64) {
        if let Some(node) = self.node_mut(handle) {
            node.transform = node.transform * scale_about(sx, sy, Point::new(about_x, about_y));
        }
    }

    fn hide(&mut self, handle: Handle) {
        if let Some(node) = self.node_mut(handle) {
            node.visible = false;
        }
    }

    fn animate(
        &mut self,
        handle: Handle,
        attrs: &Attrs,
        duration_ms: u32,
        easing: Option<Easing>,
        on_complete: Option<AfterAnimation>,
    ) {
        self.set_attributes(handle, attrs);
        if let Some(AfterAnimation::Hide) = on_complete {
            self.hide(handle);
        }
        self.animations.push(Animation {
            handle,
            attrs: attrs.clone(),
            duration_ms,
            easing: easing.unwrap_or_default(),
            on_complete,
        });
    }

    fn on_pointer_event(&mut self, handle: Handle, event: PointerEvent) {
        if let Some(node) = self.node_mut(handle) {
            if !node.listeners.contains(&event) {
                node.listeners.push(event);
            }
        }
    }
}
