// Legend: one swatch and label per series bucket inside a rounded border

use crate::axis::{AxisLayout, Tick};
use crate::config::{Direction, ItemType, LegendConfig, Placement};
use crate::geometry::{Point, Size};
use crate::render::{Attrs, Handle, PointerEvent, Renderer};
use crate::series::DataSeries;
use crate::value::Value;

pub const SWATCH_SIZE: f64 = 15.0;
pub const LINE_HEIGHT: f64 = 20.0;
/// Gap between a swatch and its text
pub const SPACING: f64 = 10.0;
pub const PADDING: f64 = 10.0;
/// Distance kept from the surface edge by keyword placements
pub const MARGIN: f64 = 10.0;
const BORDER_RADIUS: f64 = 5.0;
const BORDER_COLOR: &str = "gray";
/// Swatch fill of a toggled-off item
pub const INACTIVE_COLOR: &str = "gray";

#[derive(Debug, Clone, PartialEq)]
pub struct LegendItem {
    pub name: String,
    pub color: String,
    pub active: bool,
    pub swatch: Handle,
    pub text: Handle,
}

/// Result of activating a legend item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleChange {
    pub index: usize,
    pub active: bool,
}

#[derive(Debug, Clone)]
pub struct Legend {
    items: Vec<LegendItem>,
    border: Handle,
    total_width: f64,
    total_height: f64,
    offset: Point,
}

/// Display name of every bucket.
///
/// A bucket's own name wins. Numeric scalars fall back to the series label at
/// their index, then to the x tick at that index. Everything else is blank.
pub fn display_names(series: &DataSeries, ticks: &[Tick]) -> Vec<String> {
    let labels = series.labels();
    series
        .buckets()
        .iter()
        .enumerate()
        .map(|(j, bucket)| match (&bucket.name, &bucket.data) {
            (Some(name), _) => name.clone(),
            (None, Value::Number(_)) => labels
                .get(j)
                .filter(|l| !l.is_empty())
                .cloned()
                .or_else(|| ticks.get(j).map(Tick::to_string).filter(|t| !t.is_empty()))
                .unwrap_or_default(),
            _ => String::new(),
        })
        .collect()
}

impl Legend {
    /// Lay out and draw the legend, then move it to its configured position.
    ///
    /// `x_axis` supplies fallback names for unnamed scalar buckets.
    pub fn new(
        series: &DataSeries,
        colors: &[String],
        x_axis: Option<&AxisLayout>,
        config: &LegendConfig,
        surface: Size,
        renderer: &mut dyn Renderer,
    ) -> Self {
        let ticks = x_axis.map(|a| a.ticks.as_slice()).unwrap_or(&[]);
        let names = display_names(series, ticks);
        let vertical = config.direction == Direction::Vertical;

        let mut items = Vec::with_capacity(names.len());
        let mut text_widths = Vec::with_capacity(names.len());
        let mut start_x = 0.0;

        for (i, name) in names.into_iter().enumerate() {
            let (x, y) = if vertical {
                (PADDING, PADDING + i as f64 * LINE_HEIGHT)
            } else {
                (start_x + PADDING, PADDING)
            };

            let swatch = match config.item_type {
                ItemType::Rect => renderer.draw_rect(x, y, SWATCH_SIZE, SWATCH_SIZE, None),
                ItemType::Circle => renderer.draw_circle(
                    x + SWATCH_SIZE / 2.0,
                    y + SWATCH_SIZE / 2.0,
                    SWATCH_SIZE / 2.0,
                ),
            };

            let content = config.format.replace("{name}", &name);
            let text_y = if vertical {
                PADDING + i as f64 * LINE_HEIGHT + SWATCH_SIZE / 2.0
            } else {
                PADDING + LINE_HEIGHT / 2.0
            };
            let text = renderer.draw_text(start_x + SWATCH_SIZE + SPACING + PADDING, text_y, &content);
            renderer.set_attributes(text, &Attrs::new().font_size(config.font_size));

            // Texts are centred on their anchor; shift them to start there
            let text_width = renderer.measure_bounds(text).width;
            renderer.translate(text, text_width / 2.0, 0.0);
            if !vertical {
                start_x += SWATCH_SIZE + PADDING + SPACING + text_width;
            }

            let color = colors.get(i).cloned().unwrap_or_else(|| INACTIVE_COLOR.to_string());
            renderer.set_attributes(
                swatch,
                &Attrs::new().fill(color.clone()).stroke_width(0.0).cursor("pointer"),
            );
            renderer.on_pointer_event(swatch, PointerEvent::Click);

            text_widths.push(text_width);
            items.push(LegendItem {
                name,
                color,
                active: true,
                swatch,
                text,
            });
        }

        let count = items.len() as f64;
        let (total_width, total_height) = if vertical {
            let widest = text_widths.iter().copied().fold(0.0, f64::max);
            (
                widest + SWATCH_SIZE + SPACING + PADDING * 2.0,
                LINE_HEIGHT * count + PADDING * 2.0,
            )
        } else {
            (
                (SWATCH_SIZE + SPACING) * count + (count + 1.0) * PADDING + text_widths.iter().sum::<f64>(),
                PADDING * 2.0 + LINE_HEIGHT,
            )
        };

        let border = renderer.draw_rect(0.0, 0.0, total_width, total_height, Some(BORDER_RADIUS));
        renderer.set_attributes(border, &Attrs::new().stroke_width(1.0).stroke(BORDER_COLOR));

        let mut legend = Legend {
            items,
            border,
            total_width,
            total_height,
            offset: Point::default(),
        };

        let left = resolve_horizontal(&config.position.0, surface.width, total_width);
        let top = resolve_vertical(&config.position.1, surface.height, total_height);
        legend.set_position(left, top, renderer);

        tracing::debug!(
            items = legend.items.len(),
            total_width,
            total_height,
            left,
            top,
            "legend laid out"
        );
        legend
    }

    /// Translate the legend by `(left, top)` relative to where it is now
    pub fn set_position(&mut self, left: f64, top: f64, renderer: &mut dyn Renderer) {
        for item in &self.items {
            renderer.translate(item.swatch, left, top);
            renderer.translate(item.text, left, top);
        }
        renderer.translate(self.border, left, top);
        self.offset = Point::new(self.offset.x + left, self.offset.y + top);
    }

    /// Flip an item between active and dimmed
    pub fn toggle(&mut self, index: usize, renderer: &mut dyn Renderer) -> Option<ToggleChange> {
        let item = self.items.get_mut(index)?;
        item.active = !item.active;
        let fill = if item.active { item.color.as_str() } else { INACTIVE_COLOR };
        renderer.set_attributes(item.swatch, &Attrs::new().fill(fill));
        tracing::trace!(index, active = item.active, "legend item toggled");
        Some(ToggleChange {
            index,
            active: item.active,
        })
    }

    /// Route a pointer event; a click on a swatch toggles its item
    pub fn handle_pointer(
        &mut self,
        handle: Handle,
        event: PointerEvent,
        renderer: &mut dyn Renderer,
    ) -> Option<ToggleChange> {
        if event != PointerEvent::Click {
            return None;
        }
        let index = self.item_index(handle)?;
        self.toggle(index, renderer)
    }

    pub fn item_index(&self, swatch: Handle) -> Option<usize> {
        self.items.iter().position(|item| item.swatch == swatch)
    }

    pub fn is_active(&self, index: usize) -> bool {
        self.items.get(index).map_or(true, |item| item.active)
    }

    pub fn items(&self) -> &[LegendItem] {
        &self.items
    }

    pub fn border(&self) -> Handle {
        self.border
    }

    pub fn total_width(&self) -> f64 {
        self.total_width
    }

    pub fn total_height(&self) -> f64 {
        self.total_height
    }

    /// Accumulated translation from the layout origin
    pub fn offset(&self) -> Point {
        self.offset
    }
}

fn resolve_horizontal(placement: &Placement, surface_width: f64, total_width: f64) -> f64 {
    match placement {
        Placement::Offset(left) => *left,
        Placement::Keyword(k) if k == "right" => surface_width - total_width - MARGIN,
        Placement::Keyword(k) if k == "center" => surface_width / 2.0 - total_width / 2.0,
        Placement::Keyword(_) => MARGIN,
    }
}

fn resolve_vertical(placement: &Placement, surface_height: f64, total_height: f64) -> f64 {
    match placement {
        Placement::Offset(top) => *top,
        Placement::Keyword(k) if k == "bottom" => surface_height - total_height - MARGIN,
        Placement::Keyword(k) if k == "center" => surface_height / 2.0 - total_height / 2.0,
        Placement::Keyword(_) => MARGIN,
    }
}
