// Built-in chart types: `line` and `bar`

use crate::axis::{Axis, Tick};
use crate::chart::{ChartContext, ChartType, ChartTypeRegistry};
use crate::error::Result;
use crate::geometry::{PathCommand, Point};
use crate::render::Attrs;
use crate::series::ValueKey;
use crate::value::Value;
use serde::Deserialize;

impl ChartTypeRegistry {
    /// Registry with `line` and `bar`
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("line", LineChart);
        registry.register("bar", BarChart);
        registry
    }
}

/// A data point placed on the surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mark {
    /// Series bucket the value came from
    pub bucket: usize,
    /// Position along the x axis
    pub slot: usize,
    pub point: Point,
}

/// Place every numeric value of the series.
///
/// Scalar buckets sit at their own index; sequence buckets spread their
/// elements over the slots; mapping buckets use the x tick matching each key.
pub fn place_marks(ctx: &ChartContext<'_>, x: &Axis, y: &Axis) -> Vec<Mark> {
    let mut marks = Vec::new();
    for (i, bucket) in ctx.series.buckets().iter().enumerate() {
        match &bucket.data {
            Value::List(items) => {
                for j in 0..items.len() {
                    if let Some(py) = y.get_y(i, Some(&ValueKey::Index(j))) {
                        marks.push(Mark {
                            bucket: i,
                            slot: j,
                            point: Point::new(x.get_x(j as f64), py),
                        });
                    }
                }
            }
            Value::Map(map) => {
                for (j, key) in map.keys().enumerate() {
                    let Some(py) = y.get_y(i, Some(&ValueKey::Name(key.clone()))) else {
                        continue;
                    };
                    let px = x
                        .get_x_for_tick(&Tick::Label(key.clone()))
                        .unwrap_or_else(|| x.get_x(j as f64));
                    marks.push(Mark {
                        bucket: i,
                        slot: j,
                        point: Point::new(px, py),
                    });
                }
            }
            _ => {
                if let Some(py) = y.get_y(i, None) {
                    marks.push(Mark {
                        bucket: i,
                        slot: i,
                        point: Point::new(x.get_x(i as f64), py),
                    });
                }
            }
        }
    }
    marks
}

fn axes<'c>(ctx: &'c ChartContext<'_>, x: &str, y: &str, chart: &str) -> Option<(&'c Axis, &'c Axis)> {
    match (ctx.axis(x), ctx.axis(y)) {
        (Some(x), Some(y)) => Some((x, y)),
        _ => {
            tracing::warn!(chart, x, y, "chart type needs both axes, skipping");
            None
        }
    }
}

fn default_x_axis() -> String {
    "x".to_string()
}

fn default_y_axis() -> String {
    "y".to_string()
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct LineOptions {
    #[serde(default = "default_x_axis")]
    pub x_axis: String,
    #[serde(default = "default_y_axis")]
    pub y_axis: String,
    pub stroke_width: f64,
    /// Draw a dot on every point
    pub dots: bool,
    pub dot_radius: f64,
}

impl Default for LineOptions {
    fn default() -> Self {
        LineOptions {
            x_axis: default_x_axis(),
            y_axis: default_y_axis(),
            stroke_width: 2.0,
            dots: false,
            dot_radius: 3.0,
        }
    }
}

/// Polyline per sequence or mapping bucket; all scalar buckets together form
/// one line in the first color.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineChart;

impl ChartType for LineChart {
    fn draw(&self, ctx: &mut ChartContext<'_>, options: &serde_json::Value) -> Result<()> {
        let options = parse_options::<LineOptions>(options, "line");
        let Some((x, y)) = axes(ctx, &options.x_axis, &options.y_axis, "line") else {
            return Ok(());
        };
        let marks = place_marks(ctx, x, y);

        // (color index, points) per line
        let mut lines: Vec<(usize, Vec<Point>)> = Vec::new();
        for (i, bucket) in ctx.series.buckets().iter().enumerate() {
            let key = if bucket.data.is_scalar() { 0 } else { i };
            let points = marks.iter().filter(|m| m.bucket == i).map(|m| m.point);
            match lines.iter_mut().find(|(k, _)| *k == key) {
                Some((_, existing)) => existing.extend(points),
                None => lines.push((key, points.collect())),
            }
        }

        for (color_index, points) in lines {
            let Some((first, rest)) = points.split_first() else {
                continue;
            };
            let color = ctx.color(color_index).to_string();
            let mut commands = vec![PathCommand::MoveTo(first.x, first.y)];
            let mut last = *first;
            for p in rest {
                commands.push(PathCommand::LineBy(p.x - last.x, p.y - last.y));
                last = *p;
            }
            let path = ctx.renderer.draw_path(&commands);
            ctx.renderer.set_attributes(
                path,
                &Attrs::new()
                    .stroke(color.clone())
                    .stroke_width(options.stroke_width)
                    .stroke_linejoin("round"),
            );

            if options.dots {
                for p in &points {
                    let dot = ctx.renderer.draw_circle(p.x, p.y, options.dot_radius);
                    ctx.renderer
                        .set_attributes(dot, &Attrs::new().fill(color.clone()).stroke_width(0.0));
                }
            }
            tracing::trace!(points = points.len(), color = %color, "line drawn");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct BarOptions {
    #[serde(default = "default_x_axis")]
    pub x_axis: String,
    #[serde(default = "default_y_axis")]
    pub y_axis: String,
    pub bar_width: f64,
}

impl Default for BarOptions {
    fn default() -> Self {
        BarOptions {
            x_axis: default_x_axis(),
            y_axis: default_y_axis(),
            bar_width: 10.0,
        }
    }
}

/// One bar per value rising from the y axis origin. Bars of sequence and
/// mapping buckets are grouped side by side within a slot.
#[derive(Debug, Clone, Copy, Default)]
pub struct BarChart;

impl ChartType for BarChart {
    fn draw(&self, ctx: &mut ChartContext<'_>, options: &serde_json::Value) -> Result<()> {
        let options = parse_options::<BarOptions>(options, "bar");
        let Some((x, y)) = axes(ctx, &options.x_axis, &options.y_axis, "bar") else {
            return Ok(());
        };
        let marks = place_marks(ctx, x, y);
        let baseline = y.origin().y;

        let grouped: Vec<usize> = ctx
            .series
            .buckets()
            .iter()
            .enumerate()
            .filter(|(_, b)| !b.data.is_scalar())
            .map(|(i, _)| i)
            .collect();
        let group_center = (grouped.len().max(1) - 1) as f64 / 2.0;

        for mark in &marks {
            let offset = match grouped.iter().position(|&i| i == mark.bucket) {
                Some(rank) => (rank as f64 - group_center) * options.bar_width,
                None => 0.0,
            };
            let top = mark.point.y.min(baseline);
            let height = (baseline - mark.point.y).abs();
            let left = mark.point.x + offset - options.bar_width / 2.0;

            let bar = ctx.renderer.draw_rect(left, top, options.bar_width, height, None);
            let color = ctx.color(mark.bucket).to_string();
            ctx.renderer
                .set_attributes(bar, &Attrs::new().fill(color).stroke_width(0.0));
        }
        tracing::trace!(bars = marks.len(), "bars drawn");
        Ok(())
    }
}

/// Chart-type options, `true` and unreadable objects fall back to defaults
fn parse_options<T: Default + for<'de> Deserialize<'de>>(value: &serde_json::Value, chart: &str) -> T {
    if !value.is_object() {
        return T::default();
    }
    serde_json::from_value(value.clone()).unwrap_or_else(|err| {
        tracing::warn!(chart, %err, "invalid chart options, using defaults");
        T::default()
    })
}
