// Rendering capability injected into every layout component

pub mod bitmap;
pub mod recording;

pub use recording::RecordingRenderer;

use crate::geometry::{PathCommand, Size};

/// Opaque reference to a drawn element, only meaningful to the renderer that
/// created it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(pub usize);

/// Visual attributes. Unset fields are left untouched when applied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attrs {
    pub fill: Option<String>,
    pub stroke: Option<String>,
    pub stroke_width: Option<f64>,
    pub stroke_linejoin: Option<String>,
    pub opacity: Option<f64>,
    pub fill_opacity: Option<f64>,
    pub font_size: Option<f64>,
    pub text: Option<String>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub cursor: Option<String>,
}

impl Attrs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fill(mut self, color: impl Into<String>) -> Self {
        self.fill = Some(color.into());
        self
    }

    pub fn stroke(mut self, color: impl Into<String>) -> Self {
        self.stroke = Some(color.into());
        self
    }

    pub fn stroke_width(mut self, width: f64) -> Self {
        self.stroke_width = Some(width);
        self
    }

    pub fn stroke_linejoin(mut self, join: impl Into<String>) -> Self {
        self.stroke_linejoin = Some(join.into());
        self
    }

    pub fn opacity(mut self, opacity: f64) -> Self {
        self.opacity = Some(opacity);
        self
    }

    pub fn fill_opacity(mut self, opacity: f64) -> Self {
        self.fill_opacity = Some(opacity);
        self
    }

    pub fn font_size(mut self, size: f64) -> Self {
        self.font_size = Some(size);
        self
    }

    pub fn text(mut self, content: impl Into<String>) -> Self {
        self.text = Some(content.into());
        self
    }

    pub fn position(mut self, x: f64, y: f64) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self
    }

    pub fn cursor(mut self, cursor: impl Into<String>) -> Self {
        self.cursor = Some(cursor.into());
        self
    }

    /// Overwrite every field that `other` sets
    pub fn merge(&mut self, other: &Attrs) {
        macro_rules! take {
            ($($field:ident),*) => {
                $(if other.$field.is_some() {
                    self.$field = other.$field.clone();
                })*
            };
        }
        take!(fill, stroke, stroke_width, stroke_linejoin, opacity, fill_opacity, font_size, text, x, y, cursor);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    #[default]
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
}

/// What the renderer does once an animation finishes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AfterAnimation {
    Hide,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerEvent {
    Click,
    MouseOver,
    MouseOut,
}

/// Drawing surface used by the layout components.
///
/// Translation happens in surface coordinates. Rotation and scaling compose
/// inside whatever transform the element already carries, so their pivot is
/// given in the element's own coordinates. Angles are clockwise on screen.
pub trait Renderer {
    /// Size of the mounted surface, `None` when nothing is mounted
    fn surface(&self) -> Option<Size>;

    fn draw_path(&mut self, path: &[PathCommand]) -> Handle;

    /// Text centred on `(x, y)`
    fn draw_text(&mut self, x: f64, y: f64, content: &str) -> Handle;

    fn draw_rect(&mut self, x: f64, y: f64, width: f64, height: f64, corner_radius: Option<f64>) -> Handle;

    fn draw_circle(&mut self, cx: f64, cy: f64, r: f64) -> Handle;

    fn set_attributes(&mut self, handle: Handle, attrs: &Attrs);

    /// Size of the element's bounding box after its transform
    fn measure_bounds(&self, handle: Handle) -> Size;

    fn translate(&mut self, handle: Handle, dx: f64, dy: f64);

    fn rotate(&mut self, handle: Handle, degrees: f64, about_x: f64, about_y: f64);

    fn scale(&mut self, handle: Handle, sx: f64, sy: f64, about_x: f64, about_y: f64);

    fn hide(&mut self, handle: Handle);

    /// Fire-and-forget transition towards `attrs`
    fn animate(
        &mut self,
        handle: Handle,
        attrs: &Attrs,
        duration_ms: u32,
        easing: Option<Easing>,
        on_complete: Option<AfterAnimation>,
    );

    /// Ask the host to report `event` on `handle` back to the chart
    fn on_pointer_event(&mut self, handle: Handle, event: PointerEvent);
}
