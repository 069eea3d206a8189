// Background gridlines aligned with the axis ticks

use crate::axis::AxisLayout;
use crate::config::GridConfig;
use crate::geometry::PathCommand;
use crate::render::{Attrs, Handle, Renderer};

/// Line positions in surface coordinates
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GridLines {
    /// y of every horizontal line
    pub rows: Vec<f64>,
    /// x of every vertical line
    pub columns: Vec<f64>,
    /// Length of a row
    pub width: f64,
    /// Length of a column
    pub height: f64,
    /// Where rows start
    pub x_offset: f64,
    /// Where columns start; they run upwards from here
    pub y_offset: f64,
}

impl GridLines {
    /// Rows follow the y axis ticks and span the x axis; columns follow the
    /// x axis ticks and span the y axis. Disabled directions stay empty.
    pub fn from_axes(config: &GridConfig, x: Option<&AxisLayout>, y: Option<&AxisLayout>) -> Self {
        let mut lines = GridLines::default();

        if config.enable_row {
            if let Some(y) = y {
                lines.rows = y.tick_positions.y.clone();
                lines.x_offset = y.origin.x;
                lines.width = x.map_or(0.0, |x| x.axis_length);
            }
        }
        if config.enable_column {
            if let Some(x) = x {
                lines.columns = x.tick_positions.x.clone();
                lines.y_offset = x.origin.y;
                lines.height = y.map_or(0.0, |y| y.axis_length);
            }
        }

        lines
    }
}

#[derive(Debug, Clone, Default)]
pub struct Grid {
    rows: Vec<Handle>,
    columns: Vec<Handle>,
}

impl Grid {
    pub fn new(config: &GridConfig, lines: &GridLines, renderer: &mut dyn Renderer) -> Self {
        let attrs = Attrs::new()
            .stroke(config.color.clone())
            .stroke_width(config.stroke_width)
            .opacity(config.opacity);

        let mut draw = |commands: [PathCommand; 2]| {
            let handle = renderer.draw_path(&commands);
            renderer.set_attributes(handle, &attrs);
            handle
        };

        let rows = lines
            .rows
            .iter()
            .map(|&row| {
                draw([
                    PathCommand::MoveTo(lines.x_offset, row),
                    PathCommand::HorizontalBy(lines.width),
                ])
            })
            .collect();
        let columns = lines
            .columns
            .iter()
            .map(|&column| {
                draw([
                    PathCommand::MoveTo(column, lines.y_offset),
                    PathCommand::VerticalBy(-lines.height),
                ])
            })
            .collect();

        let grid = Grid { rows, columns };
        tracing::debug!(rows = grid.rows.len(), columns = grid.columns.len(), "grid drawn");
        grid
    }

    pub fn rows(&self) -> &[Handle] {
        &self.rows
    }

    pub fn columns(&self) -> &[Handle] {
        &self.columns
    }
}
